use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::schema::{crew, journey_crew, journeys, orders, routes, stations, tickets, trains, train_types};

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct CrewMember {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl CrewMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crew)]
pub struct NewCrewMember {
    pub first_name: String,
    pub last_name: String,
}

impl NewCrewMember {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.first_name.trim().is_empty() {
            return Err(ServiceError::validation("first_name", "first_name must not be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ServiceError::validation("last_name", "last_name must not be empty"));
        }
        Ok(())
    }
}

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = stations)]
pub struct NewStation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewStation {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::validation("name", "name must not be empty"));
        }
        Ok(())
    }
}

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct TrainType {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = train_types)]
pub struct NewTrainType {
    pub name: String,
}

impl NewTrainType {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::validation("name", "name must not be empty"));
        }
        Ok(())
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Train {
    pub id: i32,
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    pub train_type_id: i32,
    pub image: Option<String>,
}

impl Train {
    pub fn capacity(&self) -> i64 {
        self.cargo_num as i64 * self.places_in_cargo as i64
    }

    /// Seats still free on a journey, given how many tickets it has sold.
    /// Always recomputed per request, never cached.
    pub fn tickets_available(&self, booked: i64) -> i64 {
        self.capacity() - booked
    }
}

#[derive(Insertable, AsChangeset, Deserialize, Debug)]
#[diesel(table_name = trains)]
pub struct NewTrain {
    pub name: String,
    pub cargo_num: i32,
    pub places_in_cargo: i32,
    #[diesel(column_name = train_type_id)]
    pub train_type: i32,
}

impl NewTrain {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::validation("name", "name must not be empty"));
        }
        if self.cargo_num < 1 {
            return Err(ServiceError::validation("cargo_num", "cargo_num must be at least 1"));
        }
        if self.places_in_cargo < 1 {
            return Err(ServiceError::validation(
                "places_in_cargo",
                "places_in_cargo must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Route {
    pub id: i32,
    #[serde(rename = "source")]
    pub source_id: i32,
    #[serde(rename = "destination")]
    pub destination_id: i32,
    pub distance: i32,
}

impl Route {
    pub fn full_route(source: &str, destination: &str) -> String {
        format!("{} → {}", source, destination)
    }
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = routes)]
pub struct NewRoute {
    #[diesel(column_name = source_id)]
    pub source: i32,
    #[diesel(column_name = destination_id)]
    pub destination: i32,
    pub distance: i32,
}

impl NewRoute {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.source == self.destination {
            return Err(ServiceError::validation(
                "destination",
                "destination must differ from source",
            ));
        }
        if self.distance < 1 {
            return Err(ServiceError::validation("distance", "distance must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct Journey {
    pub id: i32,
    pub route_id: i32,
    pub train_id: i32,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = journeys)]
pub struct NewJourney {
    pub route_id: i32,
    pub train_id: i32,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = journey_crew)]
pub struct JourneyCrew {
    pub journey_id: i32,
    pub crew_id: i32,
}

#[derive(Queryable, Debug, Clone)]
pub struct Order {
    pub id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Debug, Clone)]
pub struct Ticket {
    pub id: i32,
    pub cargo: i32,
    pub seat: i32,
    pub journey_id: i32,
    pub order_id: i32,
}

impl Ticket {
    /// Bounds check against the train layout of the booked journey. Seat
    /// uniqueness within the journey is left to the storage constraint.
    pub fn validate(cargo: i32, seat: i32, train: &Train) -> Result<(), ServiceError> {
        if cargo < 1 || cargo > train.cargo_num {
            return Err(ServiceError::validation(
                "cargo",
                format!("cargo must be within [1, {}], got {}", train.cargo_num, cargo),
            ));
        }
        if seat < 1 || seat > train.places_in_cargo {
            return Err(ServiceError::validation(
                "seat",
                format!("seat must be within [1, {}], got {}", train.places_in_cargo, seat),
            ));
        }
        Ok(())
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tickets)]
pub struct NewTicket {
    pub cargo: i32,
    pub seat: i32,
    pub journey_id: i32,
    pub order_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn express_train() -> Train {
        Train {
            id: 1,
            name: String::from("Intercity 12"),
            cargo_num: 5,
            places_in_cargo: 20,
            train_type_id: 1,
            image: None,
        }
    }

    fn field_of(err: ServiceError) -> &'static str {
        match err {
            ServiceError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn capacity_is_cargo_times_places() {
        assert_eq!(express_train().capacity(), 100);
    }

    #[test]
    fn tickets_available_subtracts_booked_seats() {
        assert_eq!(express_train().tickets_available(3), 97);
        assert_eq!(express_train().tickets_available(0), 100);
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let member = CrewMember {
            id: 1,
            first_name: String::from("Ada"),
            last_name: String::from("Nowak"),
        };
        assert_eq!(member.full_name(), "Ada Nowak");
    }

    #[test]
    fn full_route_joins_station_names() {
        assert_eq!(Route::full_route("Kyiv", "Lviv"), "Kyiv → Lviv");
    }

    #[test]
    fn ticket_within_bounds_is_accepted() {
        let train = express_train();
        assert!(Ticket::validate(1, 1, &train).is_ok());
        assert!(Ticket::validate(5, 20, &train).is_ok());
    }

    #[test]
    fn ticket_cargo_out_of_bounds_is_rejected() {
        let train = express_train();
        assert_eq!(field_of(Ticket::validate(0, 1, &train).unwrap_err()), "cargo");
        assert_eq!(field_of(Ticket::validate(6, 1, &train).unwrap_err()), "cargo");
    }

    #[test]
    fn ticket_seat_out_of_bounds_is_rejected() {
        let train = express_train();
        assert_eq!(field_of(Ticket::validate(1, 0, &train).unwrap_err()), "seat");
        assert_eq!(field_of(Ticket::validate(1, 21, &train).unwrap_err()), "seat");
    }

    #[test]
    fn ticket_error_names_the_bounds() {
        let err = Ticket::validate(6, 1, &express_train()).unwrap_err();
        assert_eq!(err.to_string(), "cargo must be within [1, 5], got 6");
    }

    #[test]
    fn new_train_requires_positive_layout() {
        let mut train = NewTrain {
            name: String::from("Intercity 12"),
            cargo_num: 0,
            places_in_cargo: 20,
            train_type: 1,
        };
        assert_eq!(field_of(train.validate().unwrap_err()), "cargo_num");

        train.cargo_num = 5;
        train.places_in_cargo = 0;
        assert_eq!(field_of(train.validate().unwrap_err()), "places_in_cargo");

        train.places_in_cargo = 20;
        assert!(train.validate().is_ok());
    }

    #[test]
    fn new_route_rejects_loops_onto_itself() {
        let route = NewRoute {
            source: 3,
            destination: 3,
            distance: 100,
        };
        assert_eq!(field_of(route.validate().unwrap_err()), "destination");
    }

    #[test]
    fn new_route_rejects_nonpositive_distance() {
        let route = NewRoute {
            source: 1,
            destination: 2,
            distance: 0,
        };
        assert_eq!(field_of(route.validate().unwrap_err()), "distance");
    }

    #[test]
    fn new_station_rejects_blank_name() {
        let station = NewStation {
            name: String::from("  "),
            latitude: 50.45,
            longitude: 30.52,
        };
        assert_eq!(field_of(station.validate().unwrap_err()), "name");
    }

    #[test]
    fn route_serializes_reference_ids() {
        let route = Route {
            id: 7,
            source_id: 1,
            destination_id: 2,
            distance: 100,
        };
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["source"], 1);
        assert_eq!(json["destination"], 2);
    }

    #[test]
    fn new_train_deserializes_train_type_reference() {
        let train: NewTrain = serde_json::from_str(
            r#"{"name": "Intercity 12", "cargo_num": 5, "places_in_cargo": 20, "train_type": 3}"#,
        )
        .unwrap();
        assert_eq!(train.train_type, 3);
        assert!(train.validate().is_ok());
    }
}
