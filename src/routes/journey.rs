use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::database::models::{
    CrewMember, Journey, JourneyCrew, NewJourney, Route, Ticket, Train,
};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::routes::route::{station_names, RouteListResponse};
use crate::routes::train::TrainResponse;
use crate::schema::{crew, journey_crew, journeys, routes, tickets, trains};

#[derive(Deserialize, Debug)]
pub struct JourneyPayload {
    pub route: i32,
    pub train: i32,
    #[serde(default)]
    pub crew: Vec<i32>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

impl JourneyPayload {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.arrival_time <= self.departure_time {
            return Err(ServiceError::validation(
                "arrival_time",
                "arrival_time must be later than departure_time",
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Debug)]
pub struct JourneyResponse {
    pub id: i32,
    pub route: i32,
    pub train: i32,
    pub crew: Vec<i32>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

/// List form: references replaced by display labels, availability derived.
#[derive(Serialize, Debug)]
pub struct JourneyListResponse {
    pub id: i32,
    pub route: String,
    pub train: String,
    pub crew: Vec<String>,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub tickets_available: i64,
}

#[derive(Serialize, Debug)]
pub struct TakenSeat {
    pub cargo: i32,
    pub seat: i32,
}

/// Detail form nests everything a client needs to render a seat map.
#[derive(Serialize, Debug)]
pub struct JourneyDetailResponse {
    pub route: RouteListResponse,
    pub train: TrainResponse,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub taken_seats: Vec<TakenSeat>,
}

fn insert_roster(
    conn: &mut PgConnection,
    journey_id: i32,
    crew_ids: &[i32],
) -> Result<(), ServiceError> {
    let roster: Vec<JourneyCrew> = crew_ids
        .iter()
        .map(|&crew_id| JourneyCrew { journey_id, crew_id })
        .collect();

    if !roster.is_empty() {
        diesel::insert_into(journey_crew::table)
            .values(&roster)
            .execute(conn)?;
    }
    Ok(())
}

pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<JourneyPayload>,
) -> Result<HttpResponse, ServiceError> {
    let payload = payload.into_inner();
    payload.validate()?;

    let response = blocking(pool, move |conn| {
        conn.transaction::<JourneyResponse, ServiceError, _>(|conn| {
            let journey: Journey = diesel::insert_into(journeys::table)
                .values(&NewJourney {
                    route_id: payload.route,
                    train_id: payload.train,
                    departure_time: payload.departure_time,
                    arrival_time: payload.arrival_time,
                })
                .get_result(conn)?;
            insert_roster(conn, journey.id, &payload.crew)?;

            Ok(JourneyResponse {
                id: journey.id,
                route: journey.route_id,
                train: journey.train_id,
                crew: payload.crew,
                departure_time: journey.departure_time,
                arrival_time: journey.arrival_time,
            })
        })
    })
    .await?;

    Ok(HttpResponse::Created().json(response))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let labeled = blocking(pool, |conn| {
        let all = journeys::table.order(journeys::id.asc()).load::<Journey>(conn)?;

        let names = station_names(conn)?;
        let route_labels: HashMap<i32, String> = routes::table
            .load::<Route>(conn)?
            .into_iter()
            .map(|route| {
                let label = Route::full_route(
                    names.get(&route.source_id).map(String::as_str).unwrap_or_default(),
                    names
                        .get(&route.destination_id)
                        .map(String::as_str)
                        .unwrap_or_default(),
                );
                (route.id, label)
            })
            .collect();

        let train_index: HashMap<i32, Train> = trains::table
            .load::<Train>(conn)?
            .into_iter()
            .map(|train| (train.id, train))
            .collect();

        let mut rosters: HashMap<i32, Vec<String>> = HashMap::new();
        for (assignment, member) in journey_crew::table
            .inner_join(crew::table)
            .load::<(JourneyCrew, CrewMember)>(conn)?
        {
            rosters
                .entry(assignment.journey_id)
                .or_default()
                .push(member.full_name());
        }

        // Recomputed on every request so the count tracks concurrent bookings.
        let mut booked: HashMap<i32, i64> = HashMap::new();
        for journey_id in tickets::table.select(tickets::journey_id).load::<i32>(conn)? {
            *booked.entry(journey_id).or_insert(0) += 1;
        }

        Ok(all
            .into_iter()
            .map(|journey| {
                let sold = booked.get(&journey.id).copied().unwrap_or(0);
                JourneyListResponse {
                    id: journey.id,
                    route: route_labels.get(&journey.route_id).cloned().unwrap_or_default(),
                    train: train_index
                        .get(&journey.train_id)
                        .map(|train| train.name.clone())
                        .unwrap_or_default(),
                    crew: rosters.remove(&journey.id).unwrap_or_default(),
                    departure_time: journey.departure_time,
                    arrival_time: journey.arrival_time,
                    tickets_available: train_index
                        .get(&journey.train_id)
                        .map(|train| train.tickets_available(sold))
                        .unwrap_or(0),
                }
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
        let journey = journeys::table.find(id).first::<Journey>(conn)?;
        let route = routes::table.find(journey.route_id).first::<Route>(conn)?;
        let names = station_names(conn)?;
        let train = trains::table.find(journey.train_id).first::<Train>(conn)?;

        let taken_seats = tickets::table
            .filter(tickets::journey_id.eq(journey.id))
            .order((tickets::cargo.asc(), tickets::seat.asc()))
            .load::<Ticket>(conn)?
            .into_iter()
            .map(|ticket| TakenSeat {
                cargo: ticket.cargo,
                seat: ticket.seat,
            })
            .collect();

        Ok(JourneyDetailResponse {
            route: RouteListResponse::build(&route, &names),
            train: TrainResponse::from(train),
            departure_time: journey.departure_time,
            arrival_time: journey.arrival_time,
            taken_seats,
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(detail))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    payload: web::Json<JourneyPayload>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();
    let payload = payload.into_inner();
    payload.validate()?;

    let response = blocking(pool, move |conn| {
        conn.transaction::<JourneyResponse, ServiceError, _>(|conn| {
            let journey: Journey = diesel::update(journeys::table.find(id))
                .set((
                    journeys::route_id.eq(payload.route),
                    journeys::train_id.eq(payload.train),
                    journeys::departure_time.eq(payload.departure_time),
                    journeys::arrival_time.eq(payload.arrival_time),
                ))
                .get_result(conn)?;

            diesel::delete(journey_crew::table.filter(journey_crew::journey_id.eq(id)))
                .execute(conn)?;
            insert_roster(conn, journey.id, &payload.crew)?;

            Ok(JourneyResponse {
                id: journey.id,
                route: journey.route_id,
                train: journey.train_id,
                crew: payload.crew,
                departure_time: journey.departure_time,
                arrival_time: journey.arrival_time,
            })
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let id = path.into_inner();

    blocking(pool, move |conn| {
        let deleted = diesel::delete(journeys::table.find(id)).execute(conn)?;
        if deleted == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    })
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn arrival_must_follow_departure() {
        let payload = JourneyPayload {
            route: 1,
            train: 1,
            crew: vec![],
            departure_time: at(12),
            arrival_time: at(10),
        };
        let err = payload.validate().unwrap_err();
        match err {
            ServiceError::Validation { field, .. } => assert_eq!(field, "arrival_time"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn zero_length_journeys_are_rejected() {
        let payload = JourneyPayload {
            route: 1,
            train: 1,
            crew: vec![],
            departure_time: at(10),
            arrival_time: at(10),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn forward_time_window_is_accepted() {
        let payload = JourneyPayload {
            route: 1,
            train: 1,
            crew: vec![2, 3],
            departure_time: at(10),
            arrival_time: at(12),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn crew_defaults_to_empty_roster() {
        let payload: JourneyPayload = serde_json::from_str(
            r#"{"route": 1, "train": 2,
                "departure_time": "2024-06-01T10:00:00",
                "arrival_time": "2024-06-01T12:00:00"}"#,
        )
        .unwrap();
        assert!(payload.crew.is_empty());
    }

    #[test]
    fn list_form_exposes_availability() {
        let entry = JourneyListResponse {
            id: 1,
            route: String::from("Kyiv → Lviv"),
            train: String::from("Intercity 12"),
            crew: vec![String::from("Ada Nowak")],
            departure_time: at(10),
            arrival_time: at(12),
            tickets_available: 97,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["route"], "Kyiv → Lviv");
        assert_eq!(json["tickets_available"], 97);
    }
}
