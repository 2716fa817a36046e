use actix_web::{web, HttpResponse};
use diesel::prelude::*;

use crate::database::models::{NewTrainType, TrainType};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::schema::train_types;

pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<NewTrainType>,
) -> Result<HttpResponse, ServiceError> {
    let train_type = payload.into_inner();
    train_type.validate()?;

    let created = blocking(pool, move |conn| {
        Ok(diesel::insert_into(train_types::table)
            .values(&train_type)
            .get_result::<TrainType>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let all = blocking(pool, |conn| {
        Ok(train_types::table
            .order(train_types::id.asc())
            .load::<TrainType>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(all))
}
