use actix_web::{web, HttpResponse};
use diesel::prelude::*;

use crate::database::models::{CrewMember, NewCrewMember};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::schema::crew;

pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<NewCrewMember>,
) -> Result<HttpResponse, ServiceError> {
    let member = payload.into_inner();
    member.validate()?;

    let created = blocking(pool, move |conn| {
        Ok(diesel::insert_into(crew::table)
            .values(&member)
            .get_result::<CrewMember>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let members = blocking(pool, |conn| {
        Ok(crew::table.order(crew::id.asc()).load::<CrewMember>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(members))
}
