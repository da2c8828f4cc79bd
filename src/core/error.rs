//! Error types shared by the storage, repository and viewer layers

use thiserror::Error;

/// Errors surfaced by the vault's core components
#[derive(Debug, Error)]
pub enum VaultError {
    /// The key-value backend failed an I/O operation
    #[error("storage backend failure: {0}")]
    Storage(String),

    /// A stored record's JSON value could not be deserialized
    #[error("record {0} is malformed")]
    MalformedRecord(String),

    /// The record's `data` field is not a data URI
    #[error("stored payload is not a data URI")]
    InvalidDataUri,

    /// The base64 payload failed to decode
    #[error("payload failed to decode: {0}")]
    Payload(#[from] base64::DecodeError),

    /// The rendering engine could not be initialized
    #[error("rendering engine unavailable: {0}")]
    EngineInit(String),

    /// The document bytes could not be parsed by the rendering engine
    #[error("document could not be opened: {0}")]
    BadDocument(String),

    /// A page index outside `1..=page_count` was requested
    #[error("page {0} is out of range")]
    PageOutOfRange(u16),

    /// A viewer operation that requires an open document ran against a
    /// closed session
    #[error("no document is open")]
    NoOpenDocument,
}

impl From<sled::Error> for VaultError {
    fn from(err: sled::Error) -> Self {
        VaultError::Storage(err.to_string())
    }
}

/// Convenience alias used throughout the core modules
pub type Result<T> = std::result::Result<T, VaultError>;
