use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::Serialize;

use std::collections::HashMap;

use crate::database::models::{NewRoute, Route};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::schema::{routes, stations};

/// List form: station references replaced by their display names.
#[derive(Serialize, Debug)]
pub struct RouteListResponse {
    pub id: i32,
    pub source: String,
    pub destination: String,
    pub distance: i32,
}

impl RouteListResponse {
    pub fn build(route: &Route, station_names: &HashMap<i32, String>) -> RouteListResponse {
        RouteListResponse {
            id: route.id,
            source: station_names.get(&route.source_id).cloned().unwrap_or_default(),
            destination: station_names
                .get(&route.destination_id)
                .cloned()
                .unwrap_or_default(),
            distance: route.distance,
        }
    }
}

pub fn station_names(conn: &mut PgConnection) -> Result<HashMap<i32, String>, ServiceError> {
    Ok(stations::table
        .select((stations::id, stations::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect())
}

pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<NewRoute>,
) -> Result<HttpResponse, ServiceError> {
    let route = payload.into_inner();
    route.validate()?;

    let created = blocking(pool, move |conn| {
        Ok(diesel::insert_into(routes::table)
            .values(&route)
            .get_result::<Route>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let labeled = blocking(pool, |conn| {
        let all = routes::table.order(routes::id.asc()).load::<Route>(conn)?;
        let names = station_names(conn)?;

        Ok(all
            .iter()
            .map(|route| RouteListResponse::build(route, &names))
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

    let route = blocking(pool, move |conn| {
        Ok(routes::table.find(id).first::<Route>(conn)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(route))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_form_substitutes_station_names() {
        let route = Route {
            id: 1,
            source_id: 10,
            destination_id: 20,
            distance: 100,
        };
        let names = HashMap::from([
            (10, String::from("Kyiv")),
            (20, String::from("Lviv")),
        ]);

        let labeled = RouteListResponse::build(&route, &names);
        let json = serde_json::to_value(&labeled).unwrap();
        assert_eq!(json["source"], "Kyiv");
        assert_eq!(json["destination"], "Lviv");
        assert_eq!(json["distance"], 100);
    }
}
