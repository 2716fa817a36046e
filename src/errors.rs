use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Name of the storage-level constraint guarding against double booking.
/// Concurrent orders for the same seat race on this constraint instead of
/// any application-level lock.
pub const SEAT_CONSTRAINT: &str = "tickets_journey_cargo_seat_key";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("not found")]
    NotFound,

    #[error("seat is already taken on this journey")]
    SeatTaken,

    #[error("database error: {0}")]
    Database(diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("blocking task canceled")]
    Canceled,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
    message: String,
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> ServiceError {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            ServiceError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::SeatTaken => StatusCode::CONFLICT,
            ServiceError::Database(_)
            | ServiceError::Pool(_)
            | ServiceError::Storage(_)
            | ServiceError::Canceled => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            field: self.field(),
            message: self.to_string(),
        })
    }
}

/// A unique violation on the ticket constraint means two bookings collided on
/// one seat; every other unique index here guards a name column.
fn classify_unique_violation(constraint: Option<&str>, message: &str) -> ServiceError {
    if constraint == Some(SEAT_CONSTRAINT) {
        ServiceError::SeatTaken
    } else {
        ServiceError::validation("name", message.to_string())
    }
}

impl From<diesel::result::Error> for ServiceError {
    fn from(err: diesel::result::Error) -> ServiceError {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::NotFound => ServiceError::NotFound,
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                classify_unique_violation(info.constraint_name(), info.message())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                ServiceError::validation("reference", info.message().to_string())
            }
            other => ServiceError::Database(other),
        }
    }
}

impl From<actix_web::error::BlockingError> for ServiceError {
    fn from(_: actix_web::error::BlockingError) -> ServiceError {
        ServiceError::Canceled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ServiceError::validation("cargo", "cargo must be within [1, 5], got 6");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field(), Some("cargo"));
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ServiceError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn seat_taken_maps_to_conflict() {
        assert_eq!(ServiceError::SeatTaken.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn pool_errors_are_internal() {
        let err = ServiceError::Canceled;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn diesel_not_found_becomes_not_found() {
        let err = ServiceError::from(diesel::result::Error::NotFound);
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[test]
    fn seat_constraint_violation_becomes_seat_taken() {
        let err = classify_unique_violation(Some(SEAT_CONSTRAINT), "duplicate key value");
        assert!(matches!(err, ServiceError::SeatTaken));
    }

    #[test]
    fn other_unique_violation_becomes_validation() {
        let err = classify_unique_violation(Some("stations_name_key"), "duplicate key value");
        match err {
            ServiceError::Validation { field, .. } => assert_eq!(field, "name"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn error_body_names_the_field() {
        let err = ServiceError::validation("seat", "seat must be within [1, 20], got 0");
        let resp = err.error_response();
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["field"], "seat");
        assert_eq!(body["message"], "seat must be within [1, 20], got 0");
    }
}
