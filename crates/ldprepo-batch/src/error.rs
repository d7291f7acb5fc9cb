//! Batch-engine error taxonomy.

use crate::log::ItemLogError;
use ldprepo_repo::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Log(#[from] ItemLogError),

    /// An item's source data could not be read (missing/unreadable file,
    /// malformed extra-triples, etc.) — advance without marking it
    /// completed or failed. Grounded on `repo/__init__.py::DataReadError`.
    #[error("could not read data for item {item}: {reason}")]
    DataRead { item: String, reason: String },

    /// The resource failed content-model validation and the batch
    /// configuration does not permit saving invalid resources.
    #[error("item {item} failed validation: {reason}")]
    Validation { item: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type BatchResult<T> = Result<T, BatchError>;
