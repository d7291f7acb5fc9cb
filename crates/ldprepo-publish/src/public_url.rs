//! Derives a resource's public-facing URL from a configurable pattern.
//!
//! Grounded 1:1 on `plastron.context.PlastronContext.get_public_url`: the
//! pattern is a template with `{path}`/`{container_path}`/`{relpath}`/
//! `{uuid}` fields, only computed on demand (so a pattern with no `{uuid}`
//! field never requires the resource's URI to contain one).

use crate::error::{PublishError, PublishResult};
use ldprepo::rdf::vocab::fedora_has_parent;
use ldprepo::rdf::RdfObject;
use ldprepo::resource::Resource;
use ldprepo_client::Endpoint;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn field_pattern() -> &'static Regex {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    FIELD.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid field regex"))
}

fn uuid_pattern() -> &'static Regex {
    static UUID: OnceLock<Regex> = OnceLock::new();
    UUID.get_or_init(|| {
        Regex::new(
            r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        )
        .expect("valid uuid regex")
    })
}

/// The repository container a resource sits under, read off its
/// `fedora:hasParent` triple (populated by the server on every non-root
/// resource's description).
fn parent_uri(resource: &Resource) -> Option<String> {
    let graph = resource.graph();
    let graph = graph.borrow();
    graph
        .triples_with_subject_predicate(&resource.subject(), &fedora_has_parent().into())
        .into_iter()
        .find_map(|o| match o {
            RdfObject::NamedNode(n) => Some(n.as_str().to_string()),
            _ => None,
        })
}

/// Extracts the (case-insensitive) UUID substring from `uri`, lower-cased,
/// mirroring `get_uuid_from_uri`.
fn uuid_from_uri(uri: &str) -> Option<String> {
    uuid_pattern().find(uri).map(|m| m.as_str().to_lowercase())
}

/// Builds a resource's public URL by substituting `pattern`'s `{path}`/
/// `{container_path}`/`{relpath}`/`{uuid}` fields with values derived from
/// `resource` and the repository `endpoint` it lives under. A field the
/// pattern asks for that can't be resolved (no parent triple, no UUID in
/// the URI) fails with [`PublishError::NoPublicUrl`]; fields the pattern
/// doesn't reference are never computed.
pub fn build_public_url(
    pattern: &str,
    endpoint: &Endpoint,
    resource: &Resource,
) -> PublishResult<String> {
    let fields: HashSet<&str> =
        field_pattern().captures_iter(pattern).map(|c| c.get(1).unwrap().as_str()).collect();

    let mut data: HashMap<&str, String> = HashMap::new();

    if fields.contains("path") {
        data.insert("path", endpoint.repo_path(resource.uri().as_str()));
    }

    if fields.contains("container_path") || fields.contains("relpath") {
        let parent = parent_uri(resource).ok_or_else(|| PublishError::NoPublicUrl {
            reason: format!("unable to retrieve container path for {}", resource.uri()),
        })?;
        let container_path = endpoint.repo_path(&parent);
        if fields.contains("container_path") {
            data.insert("container_path", container_path.clone());
        }
        if fields.contains("relpath") {
            data.insert("relpath", container_path.trim_start_matches('/').to_string());
        }
    }

    if fields.contains("uuid") {
        let uuid = uuid_from_uri(resource.uri().as_str()).ok_or_else(|| PublishError::NoPublicUrl {
            reason: format!("cannot create public URL; unable to find UUID in {}", resource.uri()),
        })?;
        data.insert("uuid", uuid);
    }

    Ok(field_pattern()
        .replace_all(pattern, |caps: &regex::Captures| {
            data.get(caps.get(1).unwrap().as_str()).cloned().unwrap_or_default()
        })
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldprepo::resource::ContentModel;
    use ldprepo::rdf::{NamedNode, Triple};

    static MODEL: ContentModel =
        ContentModel { properties: &[], default_values: &[], validators: &[], rdf_type: None };

    fn endpoint() -> Endpoint {
        Endpoint::new("http://fcrepo-test/fcrepo/rest", "/", None).unwrap()
    }

    fn resource_at(uri: &str) -> Resource {
        Resource::new_with_uri(&MODEL, NamedNode::new(uri).unwrap())
    }

    #[test]
    fn test_uuid_field() {
        let r = resource_at(
            "http://fcrepo-test/fcrepo/rest/pcdm/f4/f0/46/77/f4f04677-6ebe-4166-b30d-232fd2ad4e10",
        );
        let url = build_public_url("http://digital-test/result/id/{uuid}", &endpoint(), &r).unwrap();
        assert_eq!(url, "http://digital-test/result/id/f4f04677-6ebe-4166-b30d-232fd2ad4e10");
    }

    #[test]
    fn test_container_path_field() {
        let r = resource_at(
            "http://fcrepo-test/fcrepo/rest/pcdm/f4/f0/46/77/f4f04677-6ebe-4166-b30d-232fd2ad4e10",
        );
        r.graph().borrow_mut().insert(Triple::new(
            r.subject(),
            fedora_has_parent().into(),
            RdfObject::NamedNode(NamedNode::new("http://fcrepo-test/fcrepo/rest/pcdm").unwrap()),
        ));
        let url = build_public_url(
            "http://digital-test/result/id/{uuid}?relpath={container_path}",
            &endpoint(),
            &r,
        )
        .unwrap();
        assert_eq!(
            url,
            "http://digital-test/result/id/f4f04677-6ebe-4166-b30d-232fd2ad4e10?relpath=/pcdm"
        );
    }

    #[test]
    fn test_relpath_field_omits_leading_slash() {
        let r = resource_at(
            "http://fcrepo-test/fcrepo/rest/pcdm/f4/f0/46/77/f4f04677-6ebe-4166-b30d-232fd2ad4e10",
        );
        r.graph().borrow_mut().insert(Triple::new(
            r.subject(),
            fedora_has_parent().into(),
            RdfObject::NamedNode(NamedNode::new("http://fcrepo-test/fcrepo/rest/pcdm").unwrap()),
        ));
        let url =
            build_public_url("http://digital-test/result/id/{uuid}?relpath={relpath}", &endpoint(), &r)
                .unwrap();
        assert_eq!(
            url,
            "http://digital-test/result/id/f4f04677-6ebe-4166-b30d-232fd2ad4e10?relpath=pcdm"
        );
    }

    #[test]
    fn test_path_field() {
        let r = resource_at(
            "http://fcrepo-test/fcrepo/rest/pcdm/f4/f0/46/77/f4f04677-6ebe-4166-b30d-232fd2ad4e10",
        );
        let url = build_public_url("http://digital-test/result/?path={path}", &endpoint(), &r).unwrap();
        assert_eq!(
            url,
            "http://digital-test/result/?path=/pcdm/f4/f0/46/77/f4f04677-6ebe-4166-b30d-232fd2ad4e10"
        );
    }

    #[test]
    fn test_missing_uuid_fails() {
        let r = resource_at("http://fcrepo-test/fcrepo/rest/no-uuid-here");
        assert!(build_public_url("http://digital-test/result/id/{uuid}", &endpoint(), &r).is_err());
    }

    #[test]
    fn test_missing_container_path_fails() {
        let r = resource_at("http://fcrepo-test/fcrepo/rest/obj1");
        assert!(build_public_url("http://digital-test/result/?p={container_path}", &endpoint(), &r)
            .is_err());
    }
}
