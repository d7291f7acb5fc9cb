//! HTTP access to an LDP/Fedora-4-style repository: authentication,
//! request/response plumbing, and transaction lifecycle management.
//!
//! Built against [`ldprepo`]'s RDF graph and resource model; the rest of
//! the workspace (`ldprepo-repo`, `ldprepo-batch`, `ldprepo-publish`) talks
//! to the repository exclusively through [`Client`]/[`TransactionClient`].

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod transaction;

pub use auth::{AuthConfig, Authenticator, JwtAuth};
pub use client::{Client, MemberKind, Structure};
pub use endpoint::Endpoint;
pub use error::{AuthError, ClientError, ClientResult, TransactionError};
pub use transaction::{Transaction, TransactionClient, DEFAULT_KEEP_ALIVE_INTERVAL};
