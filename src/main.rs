mod database;
mod errors;
mod routes;
mod schema;
mod storage;
mod structs;

use actix_web::{middleware, web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use clap::Parser;
use log::info;

use structs::Args;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let pool = database::open_pool().expect("cannot open postgres connection pool");
    database::create_tables(&pool).expect("cannot create database tables");

    let prometheus = PrometheusMetricsBuilder::new("station_booking")
        .endpoint("/metrics")
        .build()
        .expect("cannot build prometheus middleware");

    info!("Listening on: {}:{}", args.host, args.port);
    HttpServer::new(move || {
        App::new()
            .wrap(prometheus.clone())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .route("/crew", web::post().to(routes::crew::create))
            .route("/crew", web::get().to(routes::crew::list))
            .route("/stations", web::post().to(routes::station::create))
            .route("/stations", web::get().to(routes::station::list))
            .route("/routes", web::post().to(routes::route::create))
            .route("/routes", web::get().to(routes::route::list))
            .route("/routes/{id}", web::get().to(routes::route::retrieve))
            .route("/train_types", web::post().to(routes::train_type::create))
            .route("/train_types", web::get().to(routes::train_type::list))
            .route("/trains", web::post().to(routes::train::create))
            .route("/trains", web::get().to(routes::train::list))
            .route("/trains/{id}", web::get().to(routes::train::retrieve))
            .route("/trains/{id}", web::put().to(routes::train::update))
            .route("/trains/{id}", web::delete().to(routes::train::delete))
            .route("/trains/{id}/image", web::post().to(routes::train::upload_image))
            .route("/journeys", web::post().to(routes::journey::create))
            .route("/journeys", web::get().to(routes::journey::list))
            .route("/journeys/{id}", web::get().to(routes::journey::retrieve))
            .route("/journeys/{id}", web::put().to(routes::journey::update))
            .route("/journeys/{id}", web::delete().to(routes::journey::delete))
            .route("/orders", web::post().to(routes::order::create))
            .route("/orders", web::get().to(routes::order::list))
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}
