//! Errors from the handle registry client and the publication workflow.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandleError {
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("handle service returned {status} for {uri}: {body}")]
    Registry { uri: String, status: u16, body: String },

    #[error("malformed handle service response: {0}")]
    MalformedResponse(String),
}

pub type HandleResult<T> = Result<T, HandleError>;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error(transparent)]
    Repository(#[from] ldprepo_repo::RepositoryError),

    #[error("resource has no public URL and none could be computed: {reason}")]
    NoPublicUrl { reason: String },
}

pub type PublishResult<T> = Result<T, PublishError>;
