//! A client for the external persistent-identifier ("handle") registry
//! service.
//!
//! `plastron.handles` itself was filtered out of the retrieval pack, but
//! its public contract (the `HandleInfo` shape and the four REST calls) is
//! fully pinned down by `plastron-models/tests/test_handles.py`'s fixtures
//! and `httpretty`-mocked expectations, which this module reproduces.

use crate::error::{HandleError, HandleResult};
use serde::{Deserialize, Serialize};

/// What the handle registry knows about one persistent identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandleInfo {
    pub exists: bool,
    pub prefix: String,
    pub suffix: String,
    pub url: String,
    /// The repository instance this handle was minted for (distinguishes
    /// staging/production registrations of the same identifier scheme).
    pub repo: Option<String>,
    /// The repository-internal id (e.g. a UUID or fcrepo path) this handle
    /// currently targets.
    pub repo_id: Option<String>,
}

impl HandleInfo {
    /// The `hdl:<prefix>/<suffix>` URI form stored on the resource as a
    /// typed literal (`umdtype:handle`).
    pub fn hdl_uri(&self) -> String {
        format!("hdl:{}/{}", self.prefix, self.suffix)
    }
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    exists: bool,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    suffix: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    repo: Option<String>,
    #[serde(default)]
    repo_id: Option<String>,
}

/// An HTTP client for the handle registry's `GET/POST/PATCH /handles`
/// endpoints, authenticated with a bearer token.
pub struct HandleServiceClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl HandleServiceClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client, token: Option<String>) -> Self {
        HandleServiceClient { base_url: base_url.into(), http, token }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET /handles/exists?repo_id=<repo_id>` — looks up a handle already
    /// registered for a repository-internal id, if any.
    pub async fn find_handle(&self, repo_id: &str) -> HandleResult<Option<HandleInfo>> {
        let uri = format!("{}/handles/exists", self.base_url.trim_end_matches('/'));
        let response = self
            .authorized(self.http.get(&uri).query(&[("repo_id", repo_id)]))
            .send()
            .await?;
        self.parse_find_response(&uri, response).await
    }

    /// `GET /handles/exists?url=<url>` — looks up a handle registered for a
    /// public-facing URL.
    pub async fn find_handle_by_url(&self, url: &str) -> HandleResult<Option<HandleInfo>> {
        let uri = format!("{}/handles/exists", self.base_url.trim_end_matches('/'));
        let response = self.authorized(self.http.get(&uri).query(&[("url", url)])).send().await?;
        self.parse_find_response(&uri, response).await
    }

    async fn parse_find_response(
        &self,
        uri: &str,
        response: reqwest::Response,
    ) -> HandleResult<Option<HandleInfo>> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HandleError::Registry { uri: uri.to_string(), status, body });
        }
        let found: FindResponse = response
            .json()
            .await
            .map_err(|e| HandleError::MalformedResponse(e.to_string()))?;
        if !found.exists {
            return Ok(None);
        }
        Ok(Some(HandleInfo {
            exists: true,
            prefix: found.prefix.unwrap_or_default(),
            suffix: found.suffix.unwrap_or_default(),
            url: found.url.unwrap_or_default(),
            repo: found.repo,
            repo_id: found.repo_id,
        }))
    }

    /// `GET /handles/<prefix>/<suffix>` — full info for a known handle.
    pub async fn get_info(&self, prefix: &str, suffix: &str) -> HandleResult<HandleInfo> {
        let uri = format!("{}/handles/{prefix}/{suffix}", self.base_url.trim_end_matches('/'));
        let response = self.authorized(self.http.get(&uri)).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HandleError::Registry { uri, status, body });
        }
        let found: FindResponse =
            response.json().await.map_err(|e| HandleError::MalformedResponse(e.to_string()))?;
        Ok(HandleInfo {
            exists: found.exists,
            prefix: found.prefix.unwrap_or_else(|| prefix.to_string()),
            suffix: found.suffix.unwrap_or_else(|| suffix.to_string()),
            url: found.url.unwrap_or_default(),
            repo: found.repo,
            repo_id: found.repo_id,
        })
    }

    /// `POST /handles` — mints a brand-new handle pointing at `url` for
    /// `repo_id`.
    pub async fn create_handle(&self, repo_id: &str, url: &str) -> HandleResult<HandleInfo> {
        let uri = format!("{}/handles", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({ "repo_id": repo_id, "url": url });
        let response = self.authorized(self.http.post(&uri).json(&body)).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HandleError::Registry { uri, status, body });
        }
        let found: FindResponse =
            response.json().await.map_err(|e| HandleError::MalformedResponse(e.to_string()))?;
        Ok(HandleInfo {
            exists: true,
            prefix: found.prefix.unwrap_or_default(),
            suffix: found.suffix.unwrap_or_default(),
            url: found.url.unwrap_or_else(|| url.to_string()),
            repo: found.repo,
            repo_id: Some(found.repo_id.unwrap_or_else(|| repo_id.to_string())),
        })
    }

    /// `PATCH /handles/<prefix>/<suffix>` — updates one or more fields of
    /// an existing handle (used to correct a stale `url`/`repo_id`).
    pub async fn update_handle(
        &self,
        info: &HandleInfo,
        fields: &[(&str, &str)],
    ) -> HandleResult<HandleInfo> {
        let uri = format!(
            "{}/handles/{}/{}",
            self.base_url.trim_end_matches('/'),
            info.prefix,
            info.suffix
        );
        let body: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        let response = self.authorized(self.http.patch(&uri).json(&body)).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HandleError::Registry { uri, status, body });
        }
        let found: FindResponse =
            response.json().await.map_err(|e| HandleError::MalformedResponse(e.to_string()))?;
        Ok(HandleInfo {
            exists: true,
            prefix: found.prefix.unwrap_or_else(|| info.prefix.clone()),
            suffix: found.suffix.unwrap_or_else(|| info.suffix.clone()),
            url: found.url.unwrap_or_else(|| info.url.clone()),
            repo: found.repo.or_else(|| info.repo.clone()),
            repo_id: found.repo_id.or_else(|| info.repo_id.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_hdl_uri_format() {
        let info = HandleInfo {
            exists: true,
            prefix: "1903.1".into(),
            suffix: "1234".into(),
            url: "https://example.org/obj1".into(),
            repo: Some("fcrepo".into()),
            repo_id: Some("obj1".into()),
        };
        assert_eq!(info.hdl_uri(), "hdl:1903.1/1234");
    }

    #[tokio::test]
    async fn test_find_handle_returns_none_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handles/exists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"exists": false})))
            .mount(&server)
            .await;

        let client = HandleServiceClient::new(server.uri(), reqwest::Client::new(), None);
        assert_eq!(client.find_handle("obj1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_handle_returns_info_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handles/exists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exists": true,
                "prefix": "1903.1",
                "suffix": "1234",
                "url": "https://example.org/obj1",
                "repo": "fcrepo",
                "repo_id": "obj1",
            })))
            .mount(&server)
            .await;

        let client = HandleServiceClient::new(server.uri(), reqwest::Client::new(), None);
        let info = client.find_handle("obj1").await.unwrap().unwrap();
        assert_eq!(info.hdl_uri(), "hdl:1903.1/1234");
        assert_eq!(info.repo.as_deref(), Some("fcrepo"));
    }

    #[tokio::test]
    async fn test_get_info_surfaces_registry_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/handles/1903.1/1234"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = HandleServiceClient::new(server.uri(), reqwest::Client::new(), None);
        let error = client.get_info("1903.1", "1234").await.unwrap_err();
        assert!(matches!(error, HandleError::Registry { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_create_handle_posts_repo_id_and_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/handles"))
            .and(body_partial_json(serde_json::json!({"repo_id": "obj1", "url": "https://example.org/obj1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "exists": true,
                "prefix": "1903.1",
                "suffix": "1234",
                "url": "https://example.org/obj1",
            })))
            .mount(&server)
            .await;

        let client = HandleServiceClient::new(server.uri(), reqwest::Client::new(), None);
        let info = client.create_handle("obj1", "https://example.org/obj1").await.unwrap();
        assert_eq!(info.repo_id.as_deref(), Some("obj1"));
    }

    #[tokio::test]
    async fn test_update_handle_patches_corrected_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/handles/1903.1/1234"))
            .and(body_partial_json(serde_json::json!({"repo": "fcrepo-prod"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exists": true,
                "prefix": "1903.1",
                "suffix": "1234",
                "url": "https://example.org/obj1",
                "repo": "fcrepo-prod",
            })))
            .mount(&server)
            .await;

        let client = HandleServiceClient::new(server.uri(), reqwest::Client::new(), None);
        let info = HandleInfo {
            exists: true,
            prefix: "1903.1".into(),
            suffix: "1234".into(),
            url: "https://example.org/obj1".into(),
            repo: Some("fcrepo-staging".into()),
            repo_id: Some("obj1".into()),
        };
        let updated = client.update_handle(&info, &[("repo", "fcrepo-prod")]).await.unwrap();
        assert_eq!(updated.repo.as_deref(), Some("fcrepo-prod"));
    }
}
