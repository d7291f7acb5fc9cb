//! The repository's base URL and the (optional) externally-visible URL a
//! reverse proxy exposes it as. Grounded on `plastron.client.Repository`
//! (called "Endpoint" per the project's naming).

use crate::error::{ClientError, ClientResult};
use url::Url;

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: Url,
    pub default_path: String,
    pub external_url: Option<Url>,
}

impl Endpoint {
    pub fn new(
        url: &str,
        default_path: impl Into<String>,
        external_url: Option<&str>,
    ) -> ClientResult<Self> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUri(e.to_string()))?;
        let mut default_path = default_path.into();
        if !default_path.starts_with('/') {
            default_path.insert(0, '/');
        }
        let external_url = external_url
            .map(Url::parse)
            .transpose()
            .map_err(|e| ClientError::InvalidUri(e.to_string()))?;
        Ok(Endpoint { url, default_path, external_url })
    }

    /// `true` if `uri` lives under this repository's endpoint or its
    /// external URL, if one is configured.
    pub fn contains(&self, uri: &str) -> bool {
        uri.starts_with(self.url.as_str())
            || self.external_url.as_ref().is_some_and(|e| uri.starts_with(e.as_str()))
    }

    /// The path portion of `uri` with whichever of endpoint/external URL
    /// it's prefixed by stripped off. Prefers the external URL, matching
    /// the original client's "external URL wins if configured" rule.
    pub fn repo_path(&self, uri: &str) -> String {
        if let Some(external) = &self.external_url {
            if let Some(stripped) = uri.strip_prefix(external.as_str()) {
                return stripped.to_string();
            }
        }
        uri.strip_prefix(self.url.as_str()).unwrap_or(uri).to_string()
    }

    pub fn transaction_endpoint(&self) -> String {
        join(self.url.as_str(), "fcr:tx")
    }

    /// The default container's full URI (endpoint + `default_path`).
    pub fn default_container_uri(&self) -> String {
        join(self.url.as_str(), self.default_path.trim_start_matches('/'))
    }

    pub fn container_uri(&self, path: &str) -> String {
        join(self.url.as_str(), path.trim_start_matches('/'))
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
