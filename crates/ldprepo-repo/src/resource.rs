//! Repository-backed resource handles.
//!
//! Grounded on `repo/__init__.py`'s `RepositoryResource`/`DescribableResource`
//! /`BinaryResource`. A handle is a URI plus a lazily-populated, borrowed
//! view of the repository — `describe()` fetches and caches the resource's
//! graph the first time it's needed.

use crate::error::{RepositoryError, RepositoryResult};
use crate::Repository;
use ldprepo::resource::{ContentModel, Resource};
use ldprepo::rdf::NamedNode;
use ldprepo_client::{ClientError, ClientResult, Transaction, TransactionClient};

/// A handle onto a single LDP resource, not yet necessarily fetched.
pub struct RepositoryResource {
    repo: Repository,
    uri: String,
    cached: Option<Resource>,
}

impl RepositoryResource {
    pub(crate) fn new(repo: Repository, uri: impl Into<String>) -> Self {
        RepositoryResource { repo, uri, cached: None }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// `true` if this is a fragment URI (`<base>#<id>`) rather than a
    /// top-level LDP resource.
    pub fn is_fragment(&self) -> bool {
        self.uri.contains('#')
    }

    /// Fetches (if not already cached) and returns the resource described
    /// under `model`. Grounded on `repo/__init__.py::Repository.__getitem__`
    /// 's `RepositoryResource[ContentModel]` indexing.
    pub async fn describe(&mut self, model: &'static ContentModel) -> RepositoryResult<&Resource> {
        if self.cached.is_none() {
            let graph = self
                .repo
                .client()
                .get_graph(&self.uri, false)
                .await
                .map_err(RepositoryError::Client)?;
            let subject = NamedNode::new(self.uri.clone())
                .map_err(|e| RepositoryError::DataRead { uri: self.uri.clone(), reason: e.to_string() })?;
            self.cached = Some(Resource::from_graph(model, subject, graph));
        }
        Ok(self.cached.as_ref().expect("just populated"))
    }

    /// Persists any pending changes on the cached resource back to the
    /// repository as a SPARQL Update issued through `txn`, then marks the
    /// graph unchanged. Used both by [`Self::update`] (which opens its own
    /// transaction) and by callers that already hold one open, e.g. a
    /// batch job updating a resource and its annotations together.
    /// Grounded on spec.md §4.H step 3's "within a transaction scope ...
    /// update the resource and its annotations, commit."
    pub async fn update_via(&mut self, txn: &TransactionClient) -> ClientResult<()> {
        let Some(resource) = &mut self.cached else {
            return Ok(());
        };
        if !resource.has_changes() {
            return Ok(());
        }
        let graph = resource.graph();
        let (delete_graph, insert_graph) = {
            let g = graph.borrow();
            let mut deletes = ldprepo::rdf::Graph::new();
            for t in g.deletes() {
                deletes.insert(t);
            }
            let mut inserts = ldprepo::rdf::Graph::new();
            for t in g.inserts() {
                inserts.insert(t);
            }
            (deletes, inserts)
        };
        let body = txn.build_sparql_update(&delete_graph, &insert_graph);
        if !body.is_empty() {
            let response = txn.patch(&self.uri, body).await?;
            if !response.status().is_success() {
                return Err(protocol_error("PATCH", &self.uri, response.status().as_u16()));
            }
        }
        graph.borrow_mut().apply_changes();
        Ok(())
    }

    /// Persists any pending changes within a dedicated transaction: opens
    /// one on this resource's client (kept alive at the repository's
    /// configured interval), applies [`Self::update_via`], commits on
    /// success, rolls back on any failure.
    pub async fn update(&mut self) -> RepositoryResult<()> {
        if !self.cached.as_ref().is_some_and(|r| r.has_changes()) {
            return Ok(());
        }
        let client = self.repo.client().clone();
        let interval = self.repo.keep_alive_interval();
        Transaction::scope(client, interval, |txn| async move { self.update_via(&txn).await })
            .await
            .map_err(RepositoryError::Client)
    }

    /// Deletes this resource through `txn`, a transaction the caller
    /// already has open (e.g. a recursive delete walking a whole subtree
    /// in one transaction). `404`/`410` are treated as success, matching
    /// spec.md §6's "deletion ... 404/410 treated as success by higher
    /// layers" for idempotent deletes.
    pub async fn delete_via(&self, txn: &TransactionClient) -> ClientResult<()> {
        match txn.delete(&self.uri).await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) if matches!(response.status().as_u16(), 404 | 410) => Ok(()),
            Ok(response) => Err(protocol_error("DELETE", &self.uri, response.status().as_u16())),
            Err(ClientError::NotFound(_)) | Err(ClientError::Gone(_)) => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// Deletes this resource within a dedicated transaction, committing on
    /// success and rolling back on any failure.
    pub async fn delete(&mut self) -> RepositoryResult<()> {
        let client = self.repo.client().clone();
        let interval = self.repo.keep_alive_interval();
        Transaction::scope(client, interval, |txn| async move { self.delete_via(&txn).await })
            .await
            .map_err(RepositoryError::Client)?;
        self.cached = None;
        Ok(())
    }

    pub async fn exists(&self) -> RepositoryResult<bool> {
        let response = self.repo.client().head(&self.uri).await.map_err(RepositoryError::Client)?;
        Ok(response.status().is_success())
    }
}

fn protocol_error(method: &str, uri: &str, status_code: u16) -> ClientError {
    match status_code {
        404 => ClientError::NotFound(uri.to_string()),
        410 => ClientError::Gone(uri.to_string()),
        code => ClientError::Protocol {
            method: method.to_string(),
            uri: uri.to_string(),
            status: code,
            reason: "request failed".to_string(),
        },
    }
}
