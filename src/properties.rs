//! Property descriptors: a static registration table describing which RDF
//! predicates a resource type exposes, their cardinality and datatype/
//! object constraints, and a borrowing [`PropertyView`] for reading and
//! mutating them against a resource's [`Graph`](crate::rdf::Graph).
//!
//! Grounded on `plastron.rdfmapping.properties`/`descriptors.py`, redesigned
//! per the project's static-registration-table approach (Rust has no
//! metaclass/descriptor protocol to hang per-instance property objects off
//! of, so content models declare a `&'static [PropertyDef]` instead of
//! Python class attributes discovered via `__set_name__`).

use crate::rdf::{Graph, NamedNode, RdfObject, RdfPredicate, RdfSubject};
use std::cell::RefCell;
use std::rc::Rc;

/// What kind of values a property holds, and the constraints specific to
/// that kind.
#[derive(Debug, Clone, Copy)]
pub enum PropertyKind {
    /// No type constraint beyond being present.
    Generic,
    /// Values are filtered to literals of the declared datatype at read
    /// time; a mismatched value is invisible rather than invalid.
    Data { datatype: &'static str },
    /// Must be a URI or blank node, optionally of a particular content
    /// model (used by [`crate::resource::Resource::redescribe`] call sites
    /// to know which model to construct lazily).
    Object { object_class: Option<&'static str> },
}

/// A single property's shape, as declared by a content model's
/// `DescribesResource` impl.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    pub name: &'static str,
    pub predicate: &'static str,
    pub kind: PropertyKind,
    pub required: bool,
    pub repeatable: bool,
    /// If set, every value must be one of these IRIs/literal forms.
    pub values_from: Option<&'static [&'static str]>,
    /// An additional predicate over and above the structural checks.
    pub validate: Option<fn(&RdfObject) -> bool>,
}

impl PropertyDef {
    pub fn predicate(&self) -> RdfPredicate {
        RdfPredicate::new(self.predicate).expect("property IRIs are well-formed")
    }
}

/// A single property's failure reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    Required,
    NotRepeatable,
    NotInVocabulary,
    FailedCustomValidation,
    NotUriOrBlankNode,
}

impl std::fmt::Display for PropertyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            PropertyError::Required => "is required",
            PropertyError::NotRepeatable => "is not repeatable",
            PropertyError::NotInVocabulary => "is not in the allowed vocabulary",
            PropertyError::FailedCustomValidation => "failed validation",
            PropertyError::NotUriOrBlankNode => "must be a URI or blank node",
        };
        write!(f, "{msg}")
    }
}

/// A borrowed view over one property of one resource: the subject + graph
/// it reads and writes against, and the static definition describing it.
#[derive(Clone)]
pub struct PropertyView {
    graph: Rc<RefCell<Graph>>,
    subject: RdfSubject,
    def: &'static PropertyDef,
}

impl PropertyView {
    pub fn new(graph: Rc<RefCell<Graph>>, subject: RdfSubject, def: &'static PropertyDef) -> Self {
        PropertyView { graph, subject, def }
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// All values currently asserted for this property. Data properties
    /// filter at read time: a value that isn't a literal of the declared
    /// `datatype` is invisible here rather than surfacing as a validation
    /// error, mirroring `RDFDataProperty.values`'s
    /// `filter(lambda v: v.datatype == self.datatype, ...)`.
    pub fn values(&self) -> Vec<RdfObject> {
        let graph = self.graph.borrow();
        let raw = graph.triples_with_subject_predicate(&self.subject, &self.def.predicate());
        match self.def.kind {
            PropertyKind::Data { datatype } => {
                raw.into_iter().filter(|v| data_value_matches(v, datatype)).cloned().collect()
            }
            _ => raw.into_iter().cloned().collect(),
        }
    }

    pub fn value(&self) -> Option<RdfObject> {
        self.values().into_iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Language tags of the literal values (data properties only).
    pub fn languages(&self) -> Vec<String> {
        self.values()
            .into_iter()
            .filter_map(|v| match v {
                RdfObject::Literal(l) => l.language().map(str::to_owned),
                _ => None,
            })
            .collect()
    }

    pub fn add(&self, value: impl Into<RdfObject>) {
        let triple = crate::rdf::Triple::new(self.subject.clone(), self.def.predicate(), value.into());
        self.graph.borrow_mut().insert(triple);
    }

    pub fn remove(&self, value: &RdfObject) {
        let triple = crate::rdf::Triple::new(self.subject.clone(), self.def.predicate(), value.clone());
        self.graph.borrow_mut().remove(&triple);
    }

    pub fn clear(&self) {
        for v in self.values() {
            self.remove(&v);
        }
    }

    pub fn update(&self, values: impl IntoIterator<Item = RdfObject>) {
        self.clear();
        self.extend(values);
    }

    pub fn extend(&self, values: impl IntoIterator<Item = RdfObject>) {
        for v in values {
            self.add(v);
        }
    }

    /// Validate in the order: required, repeatable (data properties with
    /// distinct language tags are exempt), values_from membership, custom
    /// `validate`, and URI-or-blank-node-only (object properties). Data
    /// properties need no literal/datatype check here: `values()` already
    /// filtered out anything that wouldn't pass.
    pub fn is_valid(&self) -> Result<(), PropertyError> {
        let values = self.values();

        if self.def.required && values.is_empty() {
            return Err(PropertyError::Required);
        }

        if !self.def.repeatable && values.len() > 1 {
            let all_distinct_languages = matches!(self.def.kind, PropertyKind::Data { .. })
                && {
                    let mut langs: Vec<Option<&str>> =
                        values.iter().map(object_language).collect();
                    langs.sort();
                    let before = langs.len();
                    langs.dedup();
                    langs.len() == before && langs.iter().all(Option::is_some)
                };
            if !all_distinct_languages {
                return Err(PropertyError::NotRepeatable);
            }
        }

        if let Some(allowed) = self.def.values_from {
            for v in &values {
                if !allowed.contains(&object_iri_or_value(v).as_str()) {
                    return Err(PropertyError::NotInVocabulary);
                }
            }
        }

        if let Some(validate) = self.def.validate {
            for v in &values {
                if !validate(v) {
                    return Err(PropertyError::FailedCustomValidation);
                }
            }
        }

        match self.def.kind {
            // `values()` already filtered to literals of the declared datatype;
            // a mismatch is invisible rather than a validation failure, per
            // the property descriptor's read-time filtering contract.
            PropertyKind::Data { .. } => {}
            PropertyKind::Object { .. } => {
                for v in &values {
                    if matches!(v, RdfObject::Literal(_)) {
                        return Err(PropertyError::NotUriOrBlankNode);
                    }
                }
            }
            PropertyKind::Generic => {}
        }

        Ok(())
    }
}

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Whether a literal belongs to a data property declared with `datatype`.
/// An exact datatype match always counts; a language-tagged literal (RDF
/// 1.1's implicit `rdf:langString`) also counts against a property declared
/// as plain `xsd:string`, since that's how multi-language text properties
/// (e.g. titles) are modeled — their declared datatype is the "plain text"
/// one, and language variants of that text remain visible.
fn data_value_matches(v: &RdfObject, datatype: &str) -> bool {
    match v {
        RdfObject::Literal(l) => {
            l.datatype().as_str() == datatype || (l.language().is_some() && datatype == XSD_STRING)
        }
        _ => false,
    }
}

fn object_language(o: &RdfObject) -> Option<&str> {
    match o {
        RdfObject::Literal(l) => l.language(),
        _ => None,
    }
}

fn object_iri_or_value(o: &RdfObject) -> String {
    match o {
        RdfObject::NamedNode(n) => n.as_str().to_owned(),
        RdfObject::BlankNode(b) => b.as_str().to_owned(),
        RdfObject::Literal(l) => l.value().to_owned(),
    }
}

/// Helper for content models composing a base model's properties with
/// their own additions, mirroring the set-union inheritance of
/// `RDFResourceBase.__init_subclass__`.
/// `own` must be non-empty (its first element seeds the uninitialized
/// slots before they're overwritten) — every content model declares at
/// least one property of its own, so this holds in practice.
pub const fn concat<const N: usize, const M: usize>(
    base: [PropertyDef; N],
    own: [PropertyDef; M],
) -> [PropertyDef; N + M] {
    let mut out = [own[0]; N + M];
    let mut i = 0;
    while i < N {
        out[i] = base[i];
        i += 1;
    }
    let mut j = 0;
    while j < M {
        out[N + j] = own[j];
        j += 1;
    }
    out
}

pub fn named_node(o: &RdfObject) -> Option<NamedNode> {
    match o {
        RdfObject::NamedNode(n) => Some(n.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::Literal;

    static TITLE: PropertyDef = PropertyDef {
        name: "title",
        predicate: "http://purl.org/dc/terms/title",
        kind: PropertyKind::Data { datatype: "http://www.w3.org/2001/XMLSchema#string" },
        required: true,
        repeatable: false,
        values_from: None,
        validate: None,
    };

    static MULTI_LANG_TITLE: PropertyDef = PropertyDef {
        name: "title",
        predicate: "http://purl.org/dc/terms/title",
        kind: PropertyKind::Data { datatype: "http://www.w3.org/2001/XMLSchema#string" },
        required: false,
        repeatable: false,
        values_from: None,
        validate: None,
    };

    static RDF_TYPE: PropertyDef = PropertyDef {
        name: "rdf_type",
        predicate: "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
        kind: PropertyKind::Object { object_class: None },
        required: false,
        repeatable: true,
        values_from: None,
        validate: None,
    };

    fn subject() -> RdfSubject {
        RdfSubject::NamedNode(NamedNode::new("http://example.org/obj1").unwrap())
    }

    #[test]
    fn test_required_property_missing() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &TITLE);
        assert_eq!(view.is_valid(), Err(PropertyError::Required));
    }

    #[test]
    fn test_add_and_read_back() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &TITLE);
        view.add(Literal::new_simple_literal("Hello"));
        assert_eq!(view.is_valid(), Ok(()));
        assert_eq!(view.value().unwrap(), RdfObject::Literal(Literal::new_simple_literal("Hello")));
    }

    #[test]
    fn test_not_repeatable_rejects_two_plain_values() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &MULTI_LANG_TITLE);
        view.add(Literal::new_simple_literal("Hello"));
        view.add(Literal::new_simple_literal("World"));
        assert_eq!(view.is_valid(), Err(PropertyError::NotRepeatable));
    }

    #[test]
    fn test_not_repeatable_allows_distinct_language_tags() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &MULTI_LANG_TITLE);
        view.add(Literal::new_language_tagged_literal("Hello", "en").unwrap());
        view.add(Literal::new_language_tagged_literal("Bonjour", "fr").unwrap());
        assert_eq!(view.is_valid(), Ok(()));
    }

    #[test]
    fn test_object_property_rejects_literal() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &RDF_TYPE);
        view.add(Literal::new_simple_literal("not a uri"));
        assert_eq!(view.is_valid(), Err(PropertyError::NotUriOrBlankNode));
    }

    #[test]
    fn test_data_property_wrong_datatype_is_invisible_not_invalid() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &TITLE);
        let dt = NamedNode::new("http://www.w3.org/2001/XMLSchema#integer").unwrap();
        view.add(Literal::new_typed_literal("5", dt));
        // the mismatched-datatype value is filtered out of `values()`
        // entirely, so `title` (required) reports missing rather than
        // reporting the wrong-datatype value as invalid.
        assert!(view.values().is_empty());
        assert_eq!(view.is_valid(), Err(PropertyError::Required));
    }

    #[test]
    fn test_data_property_keeps_matching_datatype_alongside_mismatched() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &MULTI_LANG_TITLE);
        let int_dt = NamedNode::new("http://www.w3.org/2001/XMLSchema#integer").unwrap();
        view.add(Literal::new_typed_literal("5", int_dt));
        view.add(Literal::new_simple_literal("Hello"));
        assert_eq!(view.values(), vec![RdfObject::Literal(Literal::new_simple_literal("Hello"))]);
    }

    #[test]
    fn test_clear_and_update() {
        let graph = Rc::new(RefCell::new(Graph::new()));
        let view = PropertyView::new(graph, subject(), &RDF_TYPE);
        let a = NamedNode::new("http://example.org/A").unwrap();
        let b = NamedNode::new("http://example.org/B").unwrap();
        view.add(a.clone());
        view.update([RdfObject::NamedNode(b.clone())]);
        assert_eq!(view.values(), vec![RdfObject::NamedNode(b)]);
    }
}
