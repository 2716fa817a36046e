pub mod models;

use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::sql_query;
use log::info;

use std::env;

use crate::errors::ServiceError;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

fn postgres_url() -> String {
    let default_postgres_host = String::from("localhost");
    let default_postgres_port = String::from("5432");
    let default_postgres_pw = String::from("default_pw");

    format!(
        "postgres://booking:{}@{}:{}/booking",
        env::var("POSTGRES_BOOKING_PASSWORD").unwrap_or(default_postgres_pw),
        env::var("POSTGRES_HOST").unwrap_or(default_postgres_host),
        env::var("POSTGRES_PORT").unwrap_or(default_postgres_port)
    )
}

pub fn open_pool() -> Result<DbPool, r2d2::Error> {
    let postgres_url = postgres_url();
    info!("Connecting to postgres database {}", &postgres_url);

    r2d2::Pool::builder().build(ConnectionManager::<PgConnection>::new(postgres_url))
}

/// Idempotent schema bootstrap, run once before the server binds.
pub fn create_tables(pool: &DbPool) -> Result<(), ServiceError> {
    let mut conn = pool.get()?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS crew (
            id              SERIAL PRIMARY KEY,
            first_name      TEXT NOT NULL,
            last_name       TEXT NOT NULL
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS stations (
            id              SERIAL PRIMARY KEY,
            name            TEXT NOT NULL UNIQUE,
            latitude        DOUBLE PRECISION NOT NULL,
            longitude       DOUBLE PRECISION NOT NULL
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS train_types (
            id              SERIAL PRIMARY KEY,
            name            TEXT NOT NULL UNIQUE
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS trains (
            id              SERIAL PRIMARY KEY,
            name            TEXT NOT NULL,
            cargo_num       INT NOT NULL,
            places_in_cargo INT NOT NULL,
            train_type_id   INT NOT NULL REFERENCES train_types (id),
            image           TEXT
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS routes (
            id              SERIAL PRIMARY KEY,
            source_id       INT NOT NULL REFERENCES stations (id),
            destination_id  INT NOT NULL REFERENCES stations (id),
            distance        INT NOT NULL
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS journeys (
            id              SERIAL PRIMARY KEY,
            route_id        INT NOT NULL REFERENCES routes (id),
            train_id        INT NOT NULL REFERENCES trains (id),
            departure_time  TIMESTAMP NOT NULL,
            arrival_time    TIMESTAMP NOT NULL
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS journey_crew (
            journey_id      INT NOT NULL REFERENCES journeys (id) ON DELETE CASCADE,
            crew_id         INT NOT NULL REFERENCES crew (id),
            PRIMARY KEY (journey_id, crew_id)
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS orders (
            id              SERIAL PRIMARY KEY,
            created_at      TIMESTAMP NOT NULL
          )",
    )
    .execute(&mut conn)?;

    sql_query(
        "CREATE TABLE IF NOT EXISTS tickets (
            id              SERIAL PRIMARY KEY,
            cargo           INT NOT NULL,
            seat            INT NOT NULL,
            journey_id      INT NOT NULL REFERENCES journeys (id) ON DELETE CASCADE,
            order_id        INT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
            CONSTRAINT tickets_journey_cargo_seat_key UNIQUE (journey_id, cargo, seat)
          )",
    )
    .execute(&mut conn)?;

    Ok(())
}
