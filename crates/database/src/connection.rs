use crate::error::DbError;
use sqlx::any::install_default_drivers;
use sqlx::{AnyConnection, Connection};

/// Opens a single, unpooled connection to the database at `database_url`.
///
/// The URL scheme picks the driver (`postgres://` in deployments). The
/// caller owns the connection and is expected to close it when done.
pub async fn connect(database_url: &str) -> Result<AnyConnection, DbError> {
    if database_url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "DATABASE_URL must be set.".to_string(),
        ));
    }

    install_default_drivers();

    AnyConnection::connect(database_url)
        .await
        .map_err(DbError::ConnectionError)
}
