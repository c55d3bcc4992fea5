use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid menu item: {0}")]
    InvalidItem(String),

    #[error("could not create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task did not complete: {0}")]
    Background(#[from] tokio::task::JoinError),
}
