//! Errors surfaced by the repository facade and walker.

use ldprepo_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A resource's description could not be read into a usable graph
    /// (malformed RDF, missing required triples for the requested content
    /// model). Grounded on `repo/__init__.py::DataReadError`.
    #[error("could not read data for {uri}: {reason}")]
    DataRead { uri: String, reason: String },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource gone: {0}")]
    Gone(String),

    #[error("not a binary resource: {0}")]
    NotBinary(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
