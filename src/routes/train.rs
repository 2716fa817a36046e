use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use diesel::prelude::*;
use serde::Serialize;

use std::collections::HashMap;

use crate::database::models::{NewTrain, Train};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::schema::{trains, train_types};
use crate::storage::ImageStore;

#[derive(Serialize, Debug)]
pub struct TrainResponse {
    pub id: i32,
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type: i32,
    pub capacity: i64,
}

impl From<Train> for TrainResponse {
    fn from(train: Train) -> TrainResponse {
        TrainResponse {
            id: train.id,
            capacity: train.capacity(),
            name: train.name,
            cargo_num: train.cargo_num,
            places_in_cargo: train.places_in_cargo,
            train_type: train.train_type_id,
        }
    }
}

/// List form: train type reference replaced by its name.
#[derive(Serialize, Debug)]
pub struct TrainListResponse {
    pub id: i32,
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type: String,
    pub capacity: i64,
}

#[derive(Serialize, Debug)]
pub struct TrainDetailResponse {
    pub id: i32,
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type: String,
    pub capacity: i64,
    pub image: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct TrainImageResponse {
    pub id: i32,
    pub image: Option<String>,
}

pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<NewTrain>,
) -> Result<HttpResponse, ServiceError> {
    let train = payload.into_inner();
    train.validate()?;

    let created = blocking(pool, move |conn| {
        Ok(diesel::insert_into(trains::table)
            .values(&train)
            .get_result::<Train>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(TrainResponse::from(created)))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let labeled = blocking(pool, |conn| {
        let all = trains::table.order(trains::id.asc()).load::<Train>(conn)?;
        let type_names: HashMap<i32, String> = train_types::table
            .select((train_types::id, train_types::name))
            .load::<(i32, String)>(conn)?
            .into_iter()
            .collect();

        Ok(all
            .into_iter()
            .map(|train| TrainListResponse {
                id: train.id,
                capacity: train.capacity(),
                train_type: type_names.get(&train.train_type_id).cloned().unwrap_or_default(),
                name: train.name,
                cargo_num: train.cargo_num,
                places_in_cargo: train.places_in_cargo,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(HttpResponse::Ok().json(labeled))
}

pub async fn retrieve(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    let detail = blocking(pool, move |conn| {
        let train = trains::table.find(id).first::<Train>(conn)?;
        let type_name = train_types::table
            .find(train.train_type_id)
            .select(train_types::name)
            .first::<String>(conn)?;

        Ok(TrainDetailResponse {
            id: train.id,
            capacity: train.capacity(),
            train_type: type_name,
            name: train.name,
            cargo_num: train.cargo_num,
            places_in_cargo: train.places_in_cargo,
            image: train.image,
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(detail))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    payload: web::Json<NewTrain>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    let train = payload.into_inner();
    train.validate()?;

    let updated = blocking(pool, move |conn| {
        Ok(diesel::update(trains::table.find(id))
            .set(&train)
            .get_result::<Train>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(TrainResponse::from(updated)))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    blocking(pool, move |conn| {
        let deleted = diesel::delete(trains::table.find(id)).execute(conn)?;
        if deleted == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    })
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Narrow endpoint: accepts only the raw image bytes for an existing train.
pub async fn upload_image(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    request: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let extension = ImageStore::extension_for(content_type).ok_or_else(|| {
        ServiceError::validation("image", "only image/png and image/jpeg bodies are accepted")
    })?;
    if body.is_empty() {
        return Err(ServiceError::validation("image", "image body must not be empty"));
    }

    let store = ImageStore::from_env();
    let updated = blocking(pool, move |conn| {
        let train = trains::table.find(id).first::<Train>(conn)?;
        let stored_path = store.save(train.id, extension, &body)?;

        Ok(diesel::update(trains::table.find(train.id))
            .set(trains::image.eq(stored_path))
            .get_result::<Train>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(TrainImageResponse {
        id: updated.id,
        image: updated.image,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_derived_capacity() {
        let train = Train {
            id: 1,
            name: String::from("Intercity 12"),
            cargo_num: 5,
            places_in_cargo: 20,
            train_type_id: 3,
            image: None,
        };

        let json = serde_json::to_value(TrainResponse::from(train)).unwrap();
        assert_eq!(json["capacity"], 100);
        assert_eq!(json["train_type"], 3);
    }
}
