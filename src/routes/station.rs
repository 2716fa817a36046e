use actix_web::{web, HttpResponse};
use diesel::prelude::*;

use crate::database::models::{NewStation, Station};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::schema::stations;

pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<NewStation>,
) -> Result<HttpResponse, ServiceError> {
    let station = payload.into_inner();
    station.validate()?;

    let created = blocking(pool, move |conn| {
        Ok(diesel::insert_into(stations::table)
            .values(&station)
            .get_result::<Station>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let all = blocking(pool, |conn| {
        Ok(stations::table.order(stations::id.asc()).load::<Station>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(all))
}
