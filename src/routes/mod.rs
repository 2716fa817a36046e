pub mod crew;
pub mod journey;
pub mod order;
pub mod route;
pub mod station;
pub mod train;
pub mod train_type;

use actix_web::web;
use diesel::PgConnection;

use crate::database::DbPool;
use crate::errors::ServiceError;

/// Runs a diesel closure on the blocking thread pool with a pooled
/// connection checked out for its duration.
pub async fn blocking<T, F>(pool: web::Data<DbPool>, f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> Result<T, ServiceError> + Send + 'static,
{
    web::block(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await?
}
