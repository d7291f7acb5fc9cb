//! The repository facade: resource handles, bounded traversal, and binary
//! content sources layered over [`ldprepo_client::Client`].
//!
//! Grounded on `repo/__init__.py::Repository`.

pub mod error;
pub mod files;
pub mod resource;
pub mod walker;

pub use error::{RepositoryError, RepositoryResult};
pub use files::{BinarySource, BytesSource, FileSource};
pub use resource::RepositoryResource;
pub use walker::{walk, WalkEntry};

use ldprepo_client::{Client, DEFAULT_KEEP_ALIVE_INTERVAL};
use std::sync::Arc;
use std::time::Duration;

/// A handle onto a repository: wraps the shared [`Client`] and mints
/// [`RepositoryResource`] handles by path/URI. Grounded on
/// `repo/__init__.py::Repository.__getitem__`.
#[derive(Clone)]
pub struct Repository {
    client: Arc<Client>,
    keep_alive_interval: Duration,
}

impl Repository {
    pub fn new(client: Client) -> Self {
        Repository { client: Arc::new(client), keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL }
    }

    /// Overrides the keep-alive interval used by the transactions this
    /// repository opens on behalf of `RepositoryResource::update`/`delete`
    /// (and any caller-driven `Transaction::scope`). Grounded on spec.md
    /// §4.F/§5's configurable keep-alive interval (default 90 s) and E2E
    /// scenario 1, which exercises a 1 s interval.
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    pub fn keep_alive_interval(&self) -> Duration {
        self.keep_alive_interval
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// A handle onto the resource at `path` (relative to the endpoint's
    /// default container) or a full URI if `path` already looks like one.
    pub fn resource(&self, path: &str) -> RepositoryResource {
        let uri = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.client.endpoint().container_uri(path)
        };
        RepositoryResource::new(self.clone(), uri)
    }

    /// A handle onto an embedded fragment of `path`, at `<path>#<fragment>`.
    pub fn fragment(&self, path: &str, fragment: &str) -> RepositoryResource {
        let base = self.resource(path);
        RepositoryResource::new(self.clone(), format!("{}#{fragment}", base.uri()))
    }
}
