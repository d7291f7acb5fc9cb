//! The core (non-transactional) HTTP client: thin request wrappers, RDF
//! description fetching, resource creation, and SPARQL-Update assembly.
//!
//! Grounded on `plastron.client.client.Client`.

use crate::auth::Authenticator;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, ClientResult};
use ldprepo::rdf::serialization::{self, RdfFormat};
use ldprepo::rdf::Graph;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION,
};
use reqwest::{Response, StatusCode};
use std::sync::Arc;
use tokio::sync::Mutex;

const NTRIPLES_MIME: &str = "application/n-triples";
const SERVER_MANAGED_PREFER: &str =
    r#"return=representation; omit="http://fedora.info/definitions/v4/repository#ServerManaged""#;

/// Where newly created member/file/proxy/annotation resources are placed
/// relative to their container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// Members, files, proxies, and annotations are created as direct
    /// children of the same container.
    Flat,
    /// Members, files, proxies, and annotations are created under
    /// dedicated `m/`, `f/`, `x/`, `a/` sub-containers.
    Hierarchical,
}

impl Structure {
    /// The path segment prepended to a child path for the given kind of
    /// related resource, or `None` for a flat layout.
    fn subcontainer(self, kind: MemberKind) -> Option<&'static str> {
        match self {
            Structure::Flat => None,
            Structure::Hierarchical => Some(match kind {
                MemberKind::Member => "m",
                MemberKind::File => "f",
                MemberKind::Proxy => "x",
                MemberKind::Annotation => "a",
            }),
        }
    }
}

/// The category of related resource being created, used to pick a
/// sub-container under [`Structure::Hierarchical`].
#[derive(Debug, Clone, Copy)]
pub enum MemberKind {
    Member,
    File,
    Proxy,
    Annotation,
}

/// The core HTTP client for a repository endpoint.
#[derive(Clone)]
pub struct Client {
    endpoint: Endpoint,
    http: reqwest::Client,
    structure: Structure,
    authenticator: Option<Arc<Mutex<Authenticator>>>,
}

impl Client {
    pub fn new(endpoint: Endpoint, http: reqwest::Client, structure: Structure) -> Self {
        Client { endpoint, http, structure, authenticator: None }
    }

    pub fn with_authenticator(mut self, authenticator: Authenticator) -> Self {
        self.authenticator = Some(Arc::new(Mutex::new(authenticator)));
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }

    async fn request(
        &self,
        method: reqwest::Method,
        uri: &str,
        body: Option<String>,
        mut headers: HeaderMap,
    ) -> ClientResult<Response> {
        if let Some(authenticator) = &self.authenticator {
            let mut authenticator = authenticator.lock().await;
            if let Some(value) = authenticator.authorization_header()? {
                headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).map_err(invalid_header)?);
            }
        }
        if let Some(external) = &self.endpoint.external_url {
            if let Some(host) = external.host_str() {
                headers.insert(
                    HeaderName::from_static("x-forwarded-host"),
                    HeaderValue::from_str(host).map_err(invalid_header)?,
                );
                headers.insert(
                    HeaderName::from_static("x-forwarded-proto"),
                    HeaderValue::from_str(external.scheme()).map_err(invalid_header)?,
                );
            }
        }

        tracing::debug!(%method, %uri, "request");
        let mut builder = self.http.request(method.clone(), uri).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(ClientError::Network)?;
        tracing::debug!(%method, %uri, status = %response.status(), "response");
        Ok(response)
    }

    pub async fn head(&self, uri: &str) -> ClientResult<Response> {
        self.request(reqwest::Method::HEAD, uri, None, HeaderMap::new()).await
    }

    pub async fn get(&self, uri: &str) -> ClientResult<Response> {
        self.request(reqwest::Method::GET, uri, None, HeaderMap::new()).await
    }

    pub async fn post(&self, uri: &str, body: String, content_type: &str) -> ClientResult<Response> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).map_err(invalid_header)?);
        self.request(reqwest::Method::POST, uri, Some(body), headers).await
    }

    pub async fn put(&self, uri: &str, body: String, content_type: &str) -> ClientResult<Response> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).map_err(invalid_header)?);
        self.request(reqwest::Method::PUT, uri, Some(body), headers).await
    }

    pub async fn patch(&self, uri: &str, body: String) -> ClientResult<Response> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/sparql-update"),
        );
        self.request(reqwest::Method::PATCH, uri, Some(body), headers).await
    }

    pub async fn delete(&self, uri: &str) -> ClientResult<Response> {
        self.request(reqwest::Method::DELETE, uri, None, HeaderMap::new()).await
    }

    /// Follows the `describedby` Link header of `uri` (or fetches `uri`
    /// itself if it has none) and returns the raw N-Triples body, the
    /// description's own URI, and the response status — used by
    /// [`Self::get_graph`]. When `include_server_managed` is `false`, a
    /// `Prefer` header asks the repository to omit server-managed triples.
    pub async fn get_description(
        &self,
        uri: &str,
        include_server_managed: bool,
    ) -> ClientResult<(String, String)> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(NTRIPLES_MIME));
        if !include_server_managed {
            headers.insert(
                HeaderName::from_static("prefer"),
                HeaderValue::from_static(SERVER_MANAGED_PREFER),
            );
        }

        let head = self.head(uri).await?;
        let description_uri = find_describedby(&head).unwrap_or_else(|| uri.to_string());

        let response = self.request(reqwest::Method::GET, &description_uri, None, headers).await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await.map_err(ClientError::Network)?;
                Ok((body, description_uri))
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(description_uri)),
            StatusCode::GONE => Err(ClientError::Gone(description_uri)),
            status => Err(protocol_error("GET", &description_uri, status)),
        }
    }

    /// Fetches and parses the RDF description of `uri` into a [`Graph`].
    pub async fn get_graph(&self, uri: &str, include_server_managed: bool) -> ClientResult<Graph> {
        let (body, _description_uri) = self.get_description(uri, include_server_managed).await?;
        let triples = serialization::parse(&body, RdfFormat::NTriples)
            .map_err(|e| ClientError::RdfParse(e.to_string()))?;
        Ok(Graph::from_triples(triples))
    }

    /// Creates a resource: `POST` to `container` if no slug/path is implied,
    /// `PUT` to a fully-qualified URI otherwise. Returns `(location,
    /// description_uri)` read off a successful `201 Created` response.
    pub async fn create(
        &self,
        container: &str,
        body: String,
        content_type: &str,
        slug: Option<&str>,
    ) -> ClientResult<(String, String)> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).map_err(invalid_header)?);
        if let Some(slug) = slug {
            headers.insert(
                HeaderName::from_static("slug"),
                HeaderValue::from_str(slug).map_err(invalid_header)?,
            );
        }
        let response = self.request(reqwest::Method::POST, container, Some(body), headers).await?;
        match response.status() {
            StatusCode::CREATED => {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
                    .ok_or_else(|| ClientError::Protocol {
                        method: "POST".into(),
                        uri: container.into(),
                        status: 201,
                        reason: "missing Location header".into(),
                    })?;
                let description_uri = find_describedby(&response).unwrap_or_else(|| location.clone());
                Ok((location, description_uri))
            }
            status => Err(protocol_error("POST", container, status)),
        }
    }

    /// Ensures every ancestor container named by `path` exists, creating
    /// missing ones leaf-last (direct `PUT` to each segment URI in turn),
    /// then creates the leaf container itself. Mirrors
    /// `Client.create_at_path`.
    pub async fn create_at_path(&self, path: &str) -> ClientResult<String> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
        let mut built = String::new();
        for segment in segments {
            built.push('/');
            built.push_str(segment);
            let uri = self.endpoint.container_uri(&built);
            match self.head(&uri).await?.status() {
                StatusCode::OK => continue,
                _ => {
                    let response = self
                        .put(&uri, String::new(), "text/turtle")
                        .await?;
                    if !response.status().is_success() {
                        return Err(protocol_error("PUT", &uri, response.status()));
                    }
                }
            }
        }
        Ok(self.endpoint.container_uri(&built))
    }

    /// The sub-container path segment for `kind` under this client's
    /// structure strategy, applied to `container_path`.
    pub fn member_path(&self, container_path: &str, kind: MemberKind) -> String {
        match self.structure.subcontainer(kind) {
            Some(sub) => format!("{}/{sub}", container_path.trim_end_matches('/')),
            None => container_path.to_string(),
        }
    }

    /// Assembles a SPARQL-Update request body from a delete graph and an
    /// insert graph: `DELETE {...} INSERT {...} WHERE {}` when both are
    /// non-empty, `DELETE DATA {...}`/`INSERT DATA {...}` when only one is,
    /// and an empty string when neither has triples. Grounded on
    /// `Client.build_sparql_update`.
    pub fn build_sparql_update(&self, delete_graph: &Graph, insert_graph: &Graph) -> String {
        let deletes: Vec<_> = delete_graph.iter().cloned().collect();
        let inserts: Vec<_> = insert_graph.iter().cloned().collect();

        if deletes.is_empty() && inserts.is_empty() {
            return String::new();
        }

        let delete_block = serialization::serialize_n_triples(&deletes)
            .expect("in-memory triples always serialize");
        let insert_block = serialization::serialize_n_triples(&inserts)
            .expect("in-memory triples always serialize");

        match (deletes.is_empty(), inserts.is_empty()) {
            (false, false) => {
                format!("DELETE {{\n{delete_block}}}\nINSERT {{\n{insert_block}}}\nWHERE {{}}")
            }
            (false, true) => format!("DELETE DATA {{\n{delete_block}}}"),
            (true, false) => format!("INSERT DATA {{\n{insert_block}}}"),
            (true, true) => unreachable!(),
        }
    }

    /// Verifies connectivity by `HEAD`ing the repository root.
    pub async fn test_connection(&self) -> ClientResult<()> {
        let uri = self.endpoint.url.as_str();
        let response = self.head(uri).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(protocol_error("HEAD", uri, response.status()))
        }
    }
}

fn find_describedby(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(parse_describedby_link)
}

fn parse_describedby_link(link_header: &str) -> Option<String> {
    for link in link_header.split(',') {
        if link.contains("rel=\"describedby\"") {
            let start = link.find('<')?;
            let end = link.find('>')?;
            return Some(link[start + 1..end].to_string());
        }
    }
    None
}

fn protocol_error(method: &str, uri: &str, status: StatusCode) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(uri.to_string()),
        StatusCode::GONE => ClientError::Gone(uri.to_string()),
        status => ClientError::Protocol {
            method: method.to_string(),
            uri: uri.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        },
    }
}

fn invalid_header(e: reqwest::header::InvalidHeaderValue) -> ClientError {
    ClientError::Configuration(format!("invalid header value: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldprepo::rdf::{NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};

    fn client(structure: Structure) -> Client {
        let endpoint = Endpoint::new("http://localhost:8080/rest", "/", None).unwrap();
        Client::new(endpoint, reqwest::Client::new(), structure)
    }

    #[test]
    fn test_member_path_flat() {
        let c = client(Structure::Flat);
        assert_eq!(c.member_path("/obj1", MemberKind::File), "/obj1");
    }

    #[test]
    fn test_member_path_hierarchical() {
        let c = client(Structure::Hierarchical);
        assert_eq!(c.member_path("/obj1", MemberKind::File), "/obj1/f");
        assert_eq!(c.member_path("/obj1", MemberKind::Member), "/obj1/m");
        assert_eq!(c.member_path("/obj1", MemberKind::Proxy), "/obj1/x");
        assert_eq!(c.member_path("/obj1", MemberKind::Annotation), "/obj1/a");
    }

    #[test]
    fn test_build_sparql_update_empty() {
        let c = client(Structure::Flat);
        assert_eq!(c.build_sparql_update(&Graph::new(), &Graph::new()), "");
    }

    fn sample_triple() -> Triple {
        Triple::new(
            RdfSubject::NamedNode(NamedNode::new("http://example.org/obj1").unwrap()),
            RdfPredicate::new("http://purl.org/dc/terms/title").unwrap(),
            RdfObject::Literal(ldprepo::rdf::Literal::new_simple_literal("Title")),
        )
    }

    #[test]
    fn test_build_sparql_update_insert_only() {
        let c = client(Structure::Flat);
        let mut insert_graph = Graph::new();
        insert_graph.insert(sample_triple());
        let update = c.build_sparql_update(&Graph::new(), &insert_graph);
        assert!(update.starts_with("INSERT DATA {"));
    }

    #[test]
    fn test_build_sparql_update_delete_and_insert() {
        let c = client(Structure::Flat);
        let mut delete_graph = Graph::new();
        delete_graph.insert(sample_triple());
        let mut insert_graph = Graph::new();
        insert_graph.insert(sample_triple());
        let update = c.build_sparql_update(&delete_graph, &insert_graph);
        assert!(update.starts_with("DELETE {"));
        assert!(update.contains("INSERT {"));
        assert!(update.ends_with("WHERE {}"));
    }

    #[test]
    fn test_parse_describedby_link() {
        let header = r#"<http://localhost:8080/rest/obj1/fcr:metadata>; rel="describedby""#;
        assert_eq!(
            parse_describedby_link(header),
            Some("http://localhost:8080/rest/obj1/fcr:metadata".to_string())
        );
    }

    #[test]
    fn test_parse_describedby_link_absent() {
        let header = r#"<http://localhost:8080/rest/obj1/fcr:versions>; rel="version-history""#;
        assert_eq!(parse_describedby_link(header), None);
    }
}
