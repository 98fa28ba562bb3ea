use crate::types::EntryRef;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, CarnetError>;

#[derive(Debug, Error)]
pub enum CarnetError {
    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage operation error: {0}")]
    StorageOperation(#[from] redb::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryRef),

    #[error("Link not found: {0}")]
    LinkNotFound(Uuid),

    #[error("Invalid link: {reason}")]
    InvalidLink { reason: String },

    #[error("Entry {0} belongs to another user")]
    Forbidden(EntryRef),

    #[error("Validation error: {0}")]
    Validation(String),
}
