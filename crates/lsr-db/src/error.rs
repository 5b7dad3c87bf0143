use thiserror::Error;

/// Failures of the persistence layer.
///
/// The scheduling core never fails; anything surfacing here comes from the
/// store and the caller is expected to retry the whole operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Malformed stored record '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
