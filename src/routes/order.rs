use actix_web::{web, HttpResponse};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use crate::database::models::{Journey, NewOrder, NewTicket, Order, Route, Ticket, Train};
use crate::database::DbPool;
use crate::errors::ServiceError;
use crate::routes::blocking;
use crate::routes::route::station_names;
use crate::schema::{journeys, orders, routes, tickets, trains};

#[derive(Deserialize, Debug)]
pub struct TicketPayload {
    pub cargo: i32,
    pub seat: i32,
    pub journey: i32,
}

#[derive(Deserialize, Debug)]
pub struct OrderPayload {
    pub tickets: Vec<TicketPayload>,
}

impl OrderPayload {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.tickets.is_empty() {
            return Err(ServiceError::validation(
                "tickets",
                "an order must contain at least one ticket",
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Debug)]
pub struct TicketResponse {
    pub id: i32,
    pub cargo: i32,
    pub seat: i32,
    pub journey: i32,
    pub order: i32,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> TicketResponse {
        TicketResponse {
            id: ticket.id,
            cargo: ticket.cargo,
            seat: ticket.seat,
            journey: ticket.journey_id,
            order: ticket.order_id,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct OrderResponse {
    pub id: i32,
    pub tickets: Vec<TicketResponse>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Debug)]
pub struct TicketJourneyResponse {
    pub route: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

#[derive(Serialize, Debug)]
pub struct OrderTicketResponse {
    pub id: i32,
    pub cargo: i32,
    pub seat: i32,
    pub journey: TicketJourneyResponse,
    pub order: i32,
}

#[derive(Serialize, Debug)]
pub struct OrderListResponse {
    pub id: i32,
    pub tickets: Vec<OrderTicketResponse>,
    pub created_at: NaiveDateTime,
}

/// The whole batch commits or rolls back as one transaction; a failing
/// ticket leaves neither the order row nor any sibling tickets behind.
pub async fn create(
    pool: web::Data<DbPool>,
    payload: web::Json<OrderPayload>,
) -> Result<HttpResponse, ServiceError> {
    let payload = payload.into_inner();
    payload.validate()?;

    let response = blocking(pool, move |conn| {
        conn.transaction::<OrderResponse, ServiceError, _>(|conn| {
            let order: Order = diesel::insert_into(orders::table)
                .values(&NewOrder {
                    created_at: Utc::now().naive_utc(),
                })
                .get_result(conn)?;

            let mut booked = Vec::with_capacity(payload.tickets.len());
            for item in &payload.tickets {
                let journey = journeys::table
                    .find(item.journey)
                    .first::<Journey>(conn)
                    .optional()?
                    .ok_or_else(|| {
                        ServiceError::validation(
                            "journey",
                            format!("journey {} does not exist", item.journey),
                        )
                    })?;
                let train = trains::table.find(journey.train_id).first::<Train>(conn)?;
                Ticket::validate(item.cargo, item.seat, &train)?;

                let ticket: Ticket = diesel::insert_into(tickets::table)
                    .values(&NewTicket {
                        cargo: item.cargo,
                        seat: item.seat,
                        journey_id: journey.id,
                        order_id: order.id,
                    })
                    .get_result(conn)?;
                booked.push(TicketResponse::from(ticket));
            }

            Ok(OrderResponse {
                id: order.id,
                tickets: booked,
                created_at: order.created_at,
            })
        })
    })
    .await?;

    Ok(HttpResponse::Created().json(response))
}

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ServiceError> {
    let all = blocking(pool, |conn| {
        let order_rows = orders::table.order(orders::id.asc()).load::<Order>(conn)?;

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
        let journey_index: HashMap<i32, Journey> = journeys::table
            .load::<Journey>(conn)?
            .into_iter()
            .map(|journey| (journey.id, journey))
            .collect();

        let mut by_order: HashMap<i32, Vec<OrderTicketResponse>> = HashMap::new();
        for ticket in tickets::table.order(tickets::id.asc()).load::<Ticket>(conn)? {
            let journey = match journey_index.get(&ticket.journey_id) {
                Some(journey) => TicketJourneyResponse {
                    route: route_labels.get(&journey.route_id).cloned().unwrap_or_default(),
                    departure_time: journey.departure_time,
                    arrival_time: journey.arrival_time,
                },
                None => continue,
            };
            by_order.entry(ticket.order_id).or_default().push(OrderTicketResponse {
                id: ticket.id,
                cargo: ticket.cargo,
                seat: ticket.seat,
                journey,
                order: ticket.order_id,
            });
        }

        Ok(order_rows
            .into_iter()
            .map(|order| OrderListResponse {
                id: order.id,
                tickets: by_order.remove(&order.id).unwrap_or_default(),
                created_at: order.created_at,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(HttpResponse::Ok().json(all))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_orders_are_rejected() {
        let payload = OrderPayload { tickets: vec![] };
        let err = payload.validate().unwrap_err();
        match err {
            ServiceError::Validation { field, .. } => assert_eq!(field, "tickets"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn payload_deserializes_nested_tickets() {
        let payload: OrderPayload = serde_json::from_str(
            r#"{"tickets": [{"cargo": 1, "seat": 1, "journey": 4},
                            {"cargo": 2, "seat": 5, "journey": 4}]}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.tickets.len(), 2);
        assert_eq!(payload.tickets[1].seat, 5);
    }

    #[test]
    fn ticket_response_echoes_references() {
        let ticket = Ticket {
            id: 9,
            cargo: 1,
            seat: 2,
            journey_id: 4,
            order_id: 3,
        };
        let json = serde_json::to_value(TicketResponse::from(ticket)).unwrap();
        assert_eq!(json["journey"], 4);
        assert_eq!(json["order"], 3);
    }
}
