//! The RDF-described resource model: an in-memory resource backed by a
//! shared, change-tracking graph, described by a static
//! [`ContentModel`] of property definitions, default values, and
//! whole-resource validators.
//!
//! Grounded on `plastron.rdfmapping.resources` (`RDFResourceBase`,
//! `RDFResource`) and `embed.py` (`EmbeddedObject`), redesigned around a
//! static registration table per the project's design notes rather than
//! Python's `__init_subclass__` MRO walk.

use crate::properties::{PropertyDef, PropertyView};
use crate::rdf::{Graph, Literal, NamedNode, RdfObject, RdfSubject, Triple};
use crate::validation::{ValidationOutcome, ValidationResults};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// A value to assert by default at construction time, if the caller
/// doesn't override it.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Uri(&'static str),
    Literal(&'static str),
}

/// The full static description of a resource type: its properties, the
/// values new instances start with, and validators that look at more than
/// one property at once.
pub struct ContentModel {
    pub properties: &'static [PropertyDef],
    pub default_values: &'static [(&'static str, DefaultValue)],
    /// Name, predicate function. Each runs against the whole resource and
    /// is recorded in [`ValidationResults`] under `_name`.
    pub validators: &'static [(&'static str, fn(&Resource) -> bool)],
    pub rdf_type: Option<&'static str>,
}

pub trait DescribesResource {
    fn model() -> &'static ContentModel;
}

/// An in-memory RDF-described resource: a URI, a model describing its
/// properties, and a handle to the (possibly shared) graph backing it.
///
/// Fragments are plain `Resource`s whose URI is `<parent>#<fragment-id>`
/// and whose `graph` is the same `Rc` as their parent's — the "arena"
/// pattern described in the design notes, replacing Python's
/// `get_fragment_resource`.
#[derive(Clone)]
pub struct Resource {
    uri: NamedNode,
    graph: Rc<RefCell<Graph>>,
    model: &'static ContentModel,
}

impl Resource {
    /// A brand-new resource with a `urn:uuid:` placeholder subject, its
    /// model's default values applied, and its own fresh graph.
    pub fn new(model: &'static ContentModel) -> Self {
        let uri = NamedNode::new(format!("urn:uuid:{}", Uuid::new_v4()))
            .expect("uuid urn is always a valid IRI");
        Resource::new_with_uri(model, uri)
    }

    pub fn new_with_uri(model: &'static ContentModel, uri: NamedNode) -> Self {
        let resource = Resource { uri, graph: Rc::new(RefCell::new(Graph::new())), model };
        resource.apply_default_values();
        resource
    }

    /// A resource already known to live at `uri`, described against an
    /// existing graph (e.g. one just parsed from a server response).
    pub fn from_graph(model: &'static ContentModel, uri: NamedNode, graph: Graph) -> Self {
        Resource { uri, graph: Rc::new(RefCell::new(graph)), model }
    }

    fn apply_default_values(&self) {
        for (name, default) in self.model.default_values {
            let view = self.property(name).expect("default_values name a declared property");
            if view.is_empty() {
                match default {
                    DefaultValue::Uri(iri) => {
                        view.add(NamedNode::new(*iri).expect("default URI is well-formed"));
                    }
                    DefaultValue::Literal(value) => {
                        view.add(Literal::new_simple_literal(*value));
                    }
                }
            }
        }
        if let Some(rdf_type) = self.model.rdf_type {
            if let Some(view) = self.property("rdf_type") {
                let node = NamedNode::new(rdf_type).expect("rdf_type IRI is well-formed");
                if !view.values().contains(&RdfObject::NamedNode(node.clone())) {
                    view.add(node);
                }
            }
        }
    }

    pub fn uri(&self) -> &NamedNode {
        &self.uri
    }

    /// Rewrites every triple referencing the old URI to the new one (the
    /// primary means by which a resource switches identity, e.g. once a
    /// server assigns it a real URI at creation time) and updates the
    /// local handle.
    pub fn set_uri(&mut self, new_uri: NamedNode) {
        self.graph.borrow_mut().change_uri(&self.uri, &new_uri);
        self.uri = new_uri;
    }

    pub fn subject(&self) -> RdfSubject {
        RdfSubject::NamedNode(self.uri.clone())
    }

    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        Rc::clone(&self.graph)
    }

    pub fn property(&self, name: &str) -> Option<PropertyView> {
        self.model
            .properties
            .iter()
            .find(|def| def.name == name)
            .map(|def| PropertyView::new(Rc::clone(&self.graph), self.subject(), def))
    }

    pub fn properties(&self) -> Vec<PropertyView> {
        self.model
            .properties
            .iter()
            .map(|def| PropertyView::new(Rc::clone(&self.graph), self.subject(), def))
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.graph.borrow().has_changes()
    }

    pub fn apply_changes(&self) {
        self.graph.borrow_mut().apply_changes();
    }

    pub fn validate(&self) -> ValidationResults {
        let mut results = ValidationResults::new();
        for view in self.properties() {
            let outcome = match view.is_valid() {
                Ok(()) => ValidationOutcome::Valid,
                Err(e) => ValidationOutcome::Invalid(e.to_string()),
            };
            results.insert(view.name(), outcome);
        }
        for (name, validator) in self.model.validators {
            let outcome = if validator(self) {
                ValidationOutcome::Valid
            } else {
                ValidationOutcome::Invalid(format!("failed {name}"))
            };
            results.insert(format!("_{name}"), outcome);
        }
        results
    }

    pub fn is_valid(&self) -> bool {
        self.validate().ok()
    }

    /// A view over the same graph under a different content model, e.g.
    /// to read a member resource as a more specific type once its
    /// `rdf:type` is known.
    pub fn redescribe(&self, model: &'static ContentModel) -> Resource {
        Resource { uri: self.uri.clone(), graph: Rc::clone(&self.graph), model }
    }

    /// An embedded fragment of this resource, sharing its graph, at
    /// `<uri>#<fragment_id>` (a fresh UUID if none is given).
    pub fn fragment(&self, model: &'static ContentModel, fragment_id: Option<String>) -> Resource {
        let id = fragment_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let uri = NamedNode::new(format!("{}#{id}", self.uri))
            .expect("parent URI plus a fragment id is a valid IRI");
        let resource = Resource { uri, graph: Rc::clone(&self.graph), model };
        resource.apply_default_values();
        resource
    }

    /// Subjects in the graph that are fragments of this resource's URI.
    pub fn fragment_triples(&self) -> Vec<Triple> {
        self.graph
            .borrow()
            .iter()
            .filter(|t| match &t.subject {
                RdfSubject::NamedNode(n) => n.is_fragment_of(&self.uri),
                RdfSubject::BlankNode(_) => false,
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyKind;

    static TITLE: PropertyDef = PropertyDef {
        name: "title",
        predicate: "http://purl.org/dc/terms/title",
        kind: PropertyKind::Data { datatype: "http://www.w3.org/2001/XMLSchema#string" },
        required: true,
        repeatable: false,
        values_from: None,
        validate: None,
    };

    static MODEL: ContentModel = ContentModel {
        properties: &[TITLE],
        default_values: &[],
        validators: &[],
        rdf_type: Some("http://pcdm.org/models#Object"),
    };

    fn has_title(r: &Resource) -> bool {
        r.property("title").unwrap().value().is_some()
    }

    static MODEL_WITH_VALIDATOR: ContentModel = ContentModel {
        properties: &[TITLE],
        default_values: &[],
        validators: &[("has_title", has_title)],
        rdf_type: None,
    };

    #[test]
    fn test_new_resource_gets_uuid_urn_and_rdf_type() {
        let r = Resource::new(&MODEL);
        assert!(r.uri().as_str().starts_with("urn:uuid:"));
        let types = r.property("rdf_type");
        assert!(types.is_none()); // rdf_type isn't a declared property here
    }

    #[test]
    fn test_required_property_fails_validation_until_set() {
        let r = Resource::new(&MODEL);
        assert!(!r.is_valid());
        r.property("title").unwrap().add(Literal::new_simple_literal("A Title"));
        assert!(r.is_valid());
    }

    #[test]
    fn test_set_uri_rewrites_graph_and_tracks_change() {
        let mut r = Resource::new(&MODEL);
        r.property("title").unwrap().add(Literal::new_simple_literal("A Title"));
        r.apply_changes();

        let old_uri = r.uri().clone();
        let new_uri = NamedNode::new("http://example.org/final").unwrap();
        r.set_uri(new_uri.clone());

        assert_eq!(r.uri(), &new_uri);
        assert!(r.has_changes());
        assert!(r.graph().borrow().deletes().iter().any(|t| t.subject == RdfSubject::NamedNode(old_uri.clone())));
        assert!(r.graph().borrow().inserts().iter().any(|t| t.subject == RdfSubject::NamedNode(new_uri.clone())));
    }

    #[test]
    fn test_whole_resource_validator() {
        let r = Resource::new(&MODEL_WITH_VALIDATOR);
        let results = r.validate();
        assert_eq!(results.get("_has_title").unwrap().is_valid(), false);
        r.property("title").unwrap().add(Literal::new_simple_literal("set"));
        let results = r.validate();
        assert!(results.get("_has_title").unwrap().is_valid());
    }

    #[test]
    fn test_fragment_shares_graph_and_uri_prefix() {
        let r = Resource::new(&MODEL);
        let frag = r.fragment(&MODEL, Some("page1".to_string()));
        assert_eq!(frag.uri().as_str(), format!("{}#page1", r.uri()));
        frag.property("title").unwrap().add(Literal::new_simple_literal("Fragment title"));
        // shared graph: the parent sees the fragment's triples too.
        assert_eq!(r.graph().borrow().len(), frag.graph().borrow().len());
    }

    #[test]
    fn test_redescribe_shares_graph_under_new_model() {
        let r = Resource::new(&MODEL);
        let other = r.redescribe(&MODEL_WITH_VALIDATOR);
        assert_eq!(other.uri(), r.uri());
        r.property("title").unwrap().add(Literal::new_simple_literal("shared"));
        assert_eq!(other.property("title").unwrap().value(), r.property("title").unwrap().value());
    }
}
