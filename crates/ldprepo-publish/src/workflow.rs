//! The publication state machine and the publish/unpublish algorithms.
//!
//! Grounded 1:1 on `repo/publish.py::get_publication_status`/
//! `PublishableResource.publish`/`.unpublish`. Operates directly on a
//! resource's [`Graph`](ldprepo::rdf::Graph) via `rdf:type`
//! (`umdaccess:Published`/`umdaccess:Hidden`) and a `dcterms:identifier`
//! literal typed `umdtype:handle`, rather than through a content-model's
//! declared properties — publication status applies uniformly to any
//! resource type, so it is not expressed as a per-model `PropertyDef`.

use crate::error::{PublishError, PublishResult};
use crate::handle::{HandleInfo, HandleServiceClient};
use ldprepo::rdf::vocab::{rdf_type, umdaccess, umdtype};
use ldprepo::rdf::{Literal, NamedNode, RdfObject};
use ldprepo::resource::Resource;

fn identifier_predicate() -> ldprepo::rdf::RdfPredicate {
    ldprepo::rdf::RdfPredicate::new("http://purl.org/dc/terms/identifier")
        .expect("dcterms:identifier is a well-formed IRI")
}

/// The four-state publication lifecycle of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationStatus {
    Unpublished,
    UnpublishedHidden,
    Published,
    PublishedHidden,
}

/// Reads the `rdf:type` triples for the UMD access vocabulary and derives
/// the resource's publication state. Grounded 1:1 on
/// `repo/publish.py::get_publication_status`.
pub fn publication_status(resource: &Resource) -> PublicationStatus {
    let types = rdf_types_of(resource);
    let published = types.contains(&umdaccess::published());
    let hidden = types.contains(&umdaccess::hidden());
    match (published, hidden) {
        (true, true) => PublicationStatus::PublishedHidden,
        (true, false) => PublicationStatus::Published,
        (false, true) => PublicationStatus::UnpublishedHidden,
        (false, false) => PublicationStatus::Unpublished,
    }
}

fn rdf_types_of(resource: &Resource) -> Vec<NamedNode> {
    let graph = resource.graph();
    let graph = graph.borrow();
    graph
        .triples_with_subject_predicate(&resource.subject(), &rdf_type().into())
        .into_iter()
        .filter_map(|o| match o {
            RdfObject::NamedNode(n) => Some(n.clone()),
            _ => None,
        })
        .collect()
}

fn existing_handle(resource: &Resource) -> Option<(String, String)> {
    let graph = resource.graph();
    let graph = graph.borrow();
    graph
        .triples_with_subject_predicate(&resource.subject(), &identifier_predicate())
        .into_iter()
        .find_map(|o| match o {
            RdfObject::Literal(l) if l.datatype() == umdtype::handle() => parse_hdl_uri(l.value()),
            _ => None,
        })
}

fn parse_hdl_uri(value: &str) -> Option<(String, String)> {
    let rest = value.strip_prefix("hdl:")?;
    let (prefix, suffix) = rest.split_once('/')?;
    Some((prefix.to_string(), suffix.to_string()))
}

fn set_rdf_type(resource: &Resource, iri: &NamedNode, present: bool) {
    let graph = resource.graph();
    let mut graph = graph.borrow_mut();
    let triple = ldprepo::rdf::Triple::new(
        resource.subject(),
        rdf_type().into(),
        RdfObject::NamedNode(iri.clone()),
    );
    if present {
        graph.insert(triple);
    } else {
        graph.remove(&triple);
    }
}

fn set_identifier(resource: &Resource, hdl_uri: &str) {
    let graph = resource.graph();
    let mut graph = graph.borrow_mut();
    let predicate = identifier_predicate();
    let existing: Vec<_> = graph
        .triples_with_subject_predicate(&resource.subject(), &predicate)
        .into_iter()
        .cloned()
        .collect();
    for old in existing {
        if let RdfObject::Literal(l) = &old {
            if l.datatype() == umdtype::handle() {
                graph.remove(&ldprepo::rdf::Triple::new(resource.subject(), predicate.clone(), old));
            }
        }
    }
    let literal = Literal::new_typed_literal(hdl_uri.to_string(), umdtype::handle());
    graph.insert(ldprepo::rdf::Triple::new(resource.subject(), predicate, RdfObject::Literal(literal)));
}

/// Registers (or corrects) a handle for `resource` and marks it published,
/// applying `force_hidden`/`force_visible` to the `Hidden` access class.
/// Grounded 1:1 on `repo/publish.py::PublishableResource.publish`:
///
/// 1. If the resource already carries a handle, look it up by repository
///    id and correct a stale `url`/`repo_id`/`repo` with a targeted `PATCH`.
/// 2. Otherwise look up an existing handle by the resource's public URL.
/// 3. Otherwise mint a brand-new handle.
/// 4. Write the `hdl:` URI into the resource graph.
/// 5. Add `Published`, and `Hidden`/remove `Hidden` per the flags.
/// 6. The caller persists the resource (e.g. via
///    `RepositoryResource::update`) — this function only edits the
///    in-memory graph.
pub async fn publish(
    resource: &Resource,
    handle_client: &HandleServiceClient,
    repo_id: &str,
    default_repo: &str,
    public_url: &str,
    force_hidden: bool,
    force_visible: bool,
) -> PublishResult<HandleInfo> {
    let info = if let Some((prefix, suffix)) = existing_handle(resource) {
        let mut info = handle_client.get_info(&prefix, &suffix).await?;
        let mut corrections = Vec::new();
        if info.url != public_url {
            corrections.push(("url", public_url));
        }
        if info.repo_id.as_deref() != Some(repo_id) {
            corrections.push(("repo_id", repo_id));
        }
        if info.repo.as_deref() != Some(default_repo) {
            corrections.push(("repo", default_repo));
        }
        if !corrections.is_empty() {
            info = handle_client.update_handle(&info, &corrections).await?;
        }
        info
    } else if let Some(info) = handle_client.find_handle_by_url(public_url).await? {
        info
    } else {
        handle_client.create_handle(repo_id, public_url).await?
    };

    set_identifier(resource, &info.hdl_uri());
    set_rdf_type(resource, &umdaccess::published(), true);
    if force_hidden {
        set_rdf_type(resource, &umdaccess::hidden(), true);
    } else if force_visible {
        set_rdf_type(resource, &umdaccess::hidden(), false);
    }

    Ok(info)
}

/// Removes the `Published` access class from `resource`. Mirrors the
/// inverse of steps 5-6 of [`publish`] — the handle registration itself is
/// left in place, matching `PublishableResource.unpublish`.
pub fn unpublish(resource: &Resource, force_hidden: bool, force_visible: bool) {
    set_rdf_type(resource, &umdaccess::published(), false);
    if force_hidden {
        set_rdf_type(resource, &umdaccess::hidden(), true);
    } else if force_visible {
        set_rdf_type(resource, &umdaccess::hidden(), false);
    }
}
