//! Error types for the repository HTTP client, authentication, and
//! transaction lifecycle.

use thiserror::Error;

/// Errors from the core (non-transactional) HTTP client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{method} {uri} returned {status}: {reason}")]
    Protocol { method: String, uri: String, status: u16, reason: String },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource gone: {0}")]
    Gone(String),

    #[error("invalid repository configuration: {0}")]
    Configuration(String),

    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("RDF parse error: {0}")]
    RdfParse(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("JWT encoding failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("no usable credentials found in configuration")]
    NoCredentials,

    #[error("client certificate/key could not be read: {0}")]
    Cert(String),
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("a transaction is already active on this client")]
    AlreadyActive,

    #[error("no transaction is active")]
    NotActive,

    #[error("transaction keep-alive failed, the transaction can no longer be used")]
    KeepAliveFailed,

    #[error("transaction could not be created: {0}")]
    CreateFailed(String),

    #[error("transaction commit failed: {0}")]
    CommitFailed(String),

    #[error("transaction rollback failed: {0}")]
    RollbackFailed(String),

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}
