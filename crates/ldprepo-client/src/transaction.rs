//! Transactional client and keep-alive supervisor.
//!
//! Grounded on `plastron.client.client.Transaction`/`TransactionClient`/
//! `TransactionKeepAlive`: an LDP transaction is a sub-path (`fcr:tx/<id>`)
//! under which every request is rewritten, kept alive by a periodic `POST`,
//! and finally committed or rolled back.

use crate::client::Client;
use crate::error::{ClientError, ClientResult, TransactionError};
use ldprepo::rdf::Graph;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The keep-alive interval used when a caller doesn't configure one
/// explicitly. Matches spec.md §4.F/§5's "default 90 s", which must stay
/// strictly less than the server's transaction expiry.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(90);

/// A live LDP transaction: its base URI plus the lock-free flags the
/// keep-alive task and the foreground client coordinate through.
pub struct Transaction {
    uri: String,
    active: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    keep_alive: Option<JoinHandle<()>>,
}

impl Transaction {
    /// Begins a transaction against `client`, returning a `TransactionClient`
    /// that rewrites URIs into the transaction and a keep-alive task running
    /// in the background at the given `interval` (it must stay strictly
    /// less than the server's transaction expiry; [`DEFAULT_KEEP_ALIVE_INTERVAL`]
    /// is a reasonable default). Fails with `AlreadyActive` if `client`
    /// already has one open (enforced by the caller holding at most one
    /// `Transaction` at a time; this type itself does not track a global
    /// flag).
    pub async fn begin(client: Client, interval: Duration) -> ClientResult<(Transaction, TransactionClient)> {
        let endpoint = client.endpoint().transaction_endpoint();
        let response = client
            .http()
            .post(&endpoint)
            .send()
            .await
            .map_err(TransactionError::Network)?;

        if !response.status().is_success() {
            return Err(TransactionError::CreateFailed(format!(
                "POST {} returned {}",
                endpoint,
                response.status()
            ))
            .into());
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or(endpoint);

        let active = Arc::new(AtomicBool::new(true));
        let failed = Arc::new(AtomicBool::new(false));

        let keep_alive = spawn_keep_alive(
            client.http().clone(),
            location.clone(),
            Arc::clone(&active),
            Arc::clone(&failed),
            interval,
        );

        let txn = Transaction {
            uri: location.clone(),
            active: Arc::clone(&active),
            failed: Arc::clone(&failed),
            keep_alive: Some(keep_alive),
        };
        let txn_client = TransactionClient::new(client, location, Arc::clone(&failed));

        tracing::info!(transaction = %txn.uri, "transaction started");
        Ok((txn, txn_client))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    async fn stop_keep_alive(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.keep_alive.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Commits the transaction: stops the keep-alive task, then `POST`s
    /// `fcr:tx/fcr:commit`, expecting `204`.
    pub async fn commit(mut self, txn_client: &TransactionClient) -> ClientResult<()> {
        self.stop_keep_alive().await;
        let endpoint = format!("{}/fcr:tx/fcr:commit", self.uri);
        let response = txn_client
            .client
            .http()
            .post(&endpoint)
            .send()
            .await
            .map_err(TransactionError::Network)?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            tracing::info!(transaction = %self.uri, "transaction committed");
            Ok(())
        } else {
            Err(TransactionError::CommitFailed(format!(
                "POST {} returned {}",
                endpoint,
                response.status()
            ))
            .into())
        }
    }

    /// Rolls back the transaction: stops the keep-alive task, then `POST`s
    /// `fcr:tx/fcr:rollback`, expecting `204`.
    pub async fn rollback(mut self, txn_client: &TransactionClient) -> ClientResult<()> {
        self.stop_keep_alive().await;
        let endpoint = format!("{}/fcr:tx/fcr:rollback", self.uri);
        let response = txn_client
            .client
            .http()
            .post(&endpoint)
            .send()
            .await
            .map_err(TransactionError::Network)?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            tracing::info!(transaction = %self.uri, "transaction rolled back");
            Ok(())
        } else {
            Err(TransactionError::RollbackFailed(format!(
                "POST {} returned {}",
                endpoint,
                response.status()
            ))
            .into())
        }
    }

    /// Runs `body` inside a fresh transaction against `client`, kept alive
    /// at `interval`, committing on `Ok` and rolling back on `Err`; the
    /// keep-alive task is stopped on every exit path regardless of
    /// outcome. Grounded on `client.py::Client.transaction`'s
    /// `@contextmanager`.
    pub async fn scope<F, Fut, T>(client: Client, interval: Duration, body: F) -> ClientResult<T>
    where
        F: FnOnce(TransactionClient) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let (txn, txn_client) = Transaction::begin(client, interval).await?;
        match body(txn_client.clone()).await {
            Ok(value) => {
                txn.commit(&txn_client).await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback(&txn_client).await {
                    tracing::error!(error = %rollback_err, "rollback failed after body error");
                }
                Err(err)
            }
        }
    }
}

fn spawn_keep_alive(
    http: reqwest::Client,
    txn_uri: String,
    active: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let endpoint = format!("{txn_uri}/fcr:tx");
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            ticker.tick().await;
            if !active.load(Ordering::SeqCst) {
                return;
            }
            match http.post(&endpoint).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(transaction = %txn_uri, "transaction kept alive");
                }
                Ok(response) => {
                    tracing::error!(
                        transaction = %txn_uri,
                        status = %response.status(),
                        "keep-alive request rejected"
                    );
                    failed.store(true, Ordering::SeqCst);
                    return;
                }
                Err(error) => {
                    tracing::error!(transaction = %txn_uri, %error, "keep-alive request failed");
                    failed.store(true, Ordering::SeqCst);
                    return;
                }
            }
        }
    })
}

/// A [`Client`] whose requests are transparently rewritten into and out of
/// a transaction. Grounded on `client.py::TransactionClient`.
#[derive(Clone)]
pub struct TransactionClient {
    client: Client,
    txn_uri: String,
    failed: Arc<AtomicBool>,
}

impl TransactionClient {
    fn new(client: Client, txn_uri: String, failed: Arc<AtomicBool>) -> Self {
        TransactionClient { client, txn_uri, failed }
    }

    fn check_failed(&self) -> ClientResult<()> {
        if self.failed.load(Ordering::SeqCst) {
            Err(TransactionError::KeepAliveFailed.into())
        } else {
            Ok(())
        }
    }

    /// Rewrites a repository URI to point inside this transaction, e.g.
    /// `http://host/rest/obj` -> `http://host/rest/tx:abc-123/obj`.
    /// Mirrors `TransactionClient.insert_transaction_uri`.
    pub fn insert_transaction_uri(&self, uri: &str) -> String {
        let base = self.client.endpoint().url.as_str().trim_end_matches('/');
        if let Some(rest) = uri.strip_prefix(base) {
            format!("{}{}", self.txn_uri, rest)
        } else {
            uri.to_string()
        }
    }

    /// Reverses [`Self::insert_transaction_uri`], used when reading back
    /// `Location`/`describedby` headers so callers see repository-level
    /// URIs. Mirrors `TransactionClient.remove_transaction_uri`.
    pub fn remove_transaction_uri(&self, uri: &str) -> String {
        let base = self.client.endpoint().url.as_str().trim_end_matches('/');
        if let Some(rest) = uri.strip_prefix(self.txn_uri.as_str()) {
            format!("{base}{rest}")
        } else {
            uri.to_string()
        }
    }

    pub async fn head(&self, uri: &str) -> ClientResult<reqwest::Response> {
        self.check_failed()?;
        self.client.head(&self.insert_transaction_uri(uri)).await
    }

    pub async fn get(&self, uri: &str) -> ClientResult<reqwest::Response> {
        self.check_failed()?;
        self.client.get(&self.insert_transaction_uri(uri)).await
    }

    /// Fetches and parses `uri`'s RDF description, rewriting it into the
    /// transaction namespace first. Lets resource-level callers (e.g.
    /// `RepositoryResource::describe`) read within an open transaction
    /// instead of only through the plain [`Client`].
    pub async fn get_graph(&self, uri: &str, include_server_managed: bool) -> ClientResult<Graph> {
        self.check_failed()?;
        self.client.get_graph(&self.insert_transaction_uri(uri), include_server_managed).await
    }

    /// Assembles a SPARQL-Update body; pure and URI-free, so it's simply
    /// delegated to the wrapped [`Client`].
    pub fn build_sparql_update(&self, delete_graph: &Graph, insert_graph: &Graph) -> String {
        self.client.build_sparql_update(delete_graph, insert_graph)
    }

    pub async fn post(&self, uri: &str, body: String, content_type: &str) -> ClientResult<reqwest::Response> {
        self.check_failed()?;
        self.client.post(&self.insert_transaction_uri(uri), body, content_type).await
    }

    pub async fn put(&self, uri: &str, body: String, content_type: &str) -> ClientResult<reqwest::Response> {
        self.check_failed()?;
        self.client.put(&self.insert_transaction_uri(uri), body, content_type).await
    }

    pub async fn patch(&self, uri: &str, body: String) -> ClientResult<reqwest::Response> {
        self.check_failed()?;
        self.client.patch(&self.insert_transaction_uri(uri), body).await
    }

    pub async fn delete(&self, uri: &str) -> ClientResult<reqwest::Response> {
        self.check_failed()?;
        self.client.delete(&self.insert_transaction_uri(uri)).await
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl From<TransactionError> for ClientError {
    fn from(e: TransactionError) -> Self {
        ClientError::Transaction(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;

    fn txn_client_for(base: &str, txn_uri: &str) -> TransactionClient {
        let endpoint = Endpoint::new(base, "/", None).unwrap();
        let client = Client::new(endpoint, reqwest::Client::new(), crate::client::Structure::Flat);
        TransactionClient::new(client, txn_uri.to_string(), Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn test_insert_transaction_uri() {
        let tc = txn_client_for(
            "http://localhost:8080/rest",
            "http://localhost:8080/rest/tx:abc-123",
        );
        assert_eq!(
            tc.insert_transaction_uri("http://localhost:8080/rest/obj1"),
            "http://localhost:8080/rest/tx:abc-123/obj1"
        );
    }

    #[test]
    fn test_remove_transaction_uri_round_trips() {
        let tc = txn_client_for(
            "http://localhost:8080/rest",
            "http://localhost:8080/rest/tx:abc-123",
        );
        let inside = tc.insert_transaction_uri("http://localhost:8080/rest/obj1");
        assert_eq!(tc.remove_transaction_uri(&inside), "http://localhost:8080/rest/obj1");
    }

    #[test]
    fn test_uri_outside_endpoint_is_unchanged() {
        let tc = txn_client_for(
            "http://localhost:8080/rest",
            "http://localhost:8080/rest/tx:abc-123",
        );
        assert_eq!(tc.insert_transaction_uri("http://other/obj1"), "http://other/obj1");
    }

    #[test]
    fn test_check_failed_surfaces_keep_alive_error() {
        let tc = TransactionClient::new(
            Client::new(
                Endpoint::new("http://localhost:8080/rest", "/", None).unwrap(),
                reqwest::Client::new(),
                crate::client::Structure::Flat,
            ),
            "http://localhost:8080/rest/tx:abc-123".to_string(),
            Arc::new(AtomicBool::new(true)),
        );
        assert!(tc.check_failed().is_err());
    }
}
