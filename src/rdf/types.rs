//! Core RDF terms: IRIs, blank nodes, literals, triples and quads.
//!
//! Thin wrappers around `oxrdf`'s term types. Kept as wrappers (rather than
//! re-exporting `oxrdf` directly) so the rest of the crate can implement
//! `Display`/`Hash`/ordering the way the repository client needs without
//! reaching into a third-party crate's trait impls.

use oxrdf::{
    BlankNode as OxBlankNode, Literal as OxLiteral, NamedNode as OxNamedNode,
};
use std::fmt;
use thiserror::Error;

/// Errors constructing RDF terms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfError {
    #[error("invalid IRI: {0}")]
    InvalidIri(String),

    #[error("invalid blank node identifier: {0}")]
    InvalidBlankNode(String),

    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
}

pub type RdfResult<T> = Result<T, RdfError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedNode(OxNamedNode);

impl NamedNode {
    pub fn new(iri: impl Into<String>) -> RdfResult<Self> {
        let iri = iri.into();
        OxNamedNode::new(&iri)
            .map(NamedNode)
            .map_err(|e| RdfError::InvalidIri(format!("{iri}: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `true` if `self` is `base#fragment` of `base`.
    pub fn is_fragment_of(&self, base: &NamedNode) -> bool {
        self.as_str()
            .strip_prefix(base.as_str())
            .is_some_and(|rest| rest.starts_with('#'))
    }
}

impl fmt::Display for NamedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for OxNamedNode {
    fn from(n: NamedNode) -> Self {
        n.0
    }
}

impl From<OxNamedNode> for NamedNode {
    fn from(n: OxNamedNode) -> Self {
        NamedNode(n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankNode(OxBlankNode);

impl BlankNode {
    pub fn new_unique() -> Self {
        BlankNode(OxBlankNode::default())
    }

    pub fn from_str(id: impl Into<String>) -> RdfResult<Self> {
        let id = id.into();
        OxBlankNode::new(&id)
            .map(BlankNode)
            .map_err(|e| RdfError::InvalidBlankNode(format!("{id}: {e}")))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(OxLiteral);

impl Literal {
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Literal(OxLiteral::new_simple_literal(value))
    }

    pub fn new_typed_literal(value: impl Into<String>, datatype: NamedNode) -> Self {
        Literal(OxLiteral::new_typed_literal(value, OxNamedNode::from(datatype)))
    }

    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> RdfResult<Self> {
        let language = language.into();
        OxLiteral::new_language_tagged_literal(value, &language)
            .map(Literal)
            .map_err(|e| RdfError::InvalidLiteral(format!("{language}: {e}")))
    }

    pub fn value(&self) -> &str {
        self.0.value()
    }

    pub fn datatype(&self) -> NamedNode {
        NamedNode(self.0.datatype().into_owned())
    }

    pub fn language(&self) -> Option<&str> {
        self.0.language()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfSubject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
}

impl fmt::Display for RdfSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfSubject::NamedNode(n) => write!(f, "{n}"),
            RdfSubject::BlankNode(b) => write!(f, "{b}"),
        }
    }
}

impl From<NamedNode> for RdfSubject {
    fn from(n: NamedNode) -> Self {
        RdfSubject::NamedNode(n)
    }
}

impl From<BlankNode> for RdfSubject {
    fn from(b: BlankNode) -> Self {
        RdfSubject::BlankNode(b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RdfPredicate(NamedNode);

impl RdfPredicate {
    pub fn new(iri: impl Into<String>) -> RdfResult<Self> {
        Ok(RdfPredicate(NamedNode::new(iri)?))
    }

    pub fn as_named_node(&self) -> &NamedNode {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RdfPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NamedNode> for RdfPredicate {
    fn from(n: NamedNode) -> Self {
        RdfPredicate(n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfObject {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfObject::NamedNode(n) => write!(f, "{n}"),
            RdfObject::BlankNode(b) => write!(f, "{b}"),
            RdfObject::Literal(l) => write!(f, "{l}"),
        }
    }
}

impl From<NamedNode> for RdfObject {
    fn from(n: NamedNode) -> Self {
        RdfObject::NamedNode(n)
    }
}

impl From<BlankNode> for RdfObject {
    fn from(b: BlankNode) -> Self {
        RdfObject::BlankNode(b)
    }
}

impl From<Literal> for RdfObject {
    fn from(l: Literal) -> Self {
        RdfObject::Literal(l)
    }
}

/// A term in any position, used for uniform URI-rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RdfTerm {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl From<RdfSubject> for RdfTerm {
    fn from(s: RdfSubject) -> Self {
        match s {
            RdfSubject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfSubject::BlankNode(b) => RdfTerm::BlankNode(b),
        }
    }
}

impl From<RdfObject> for RdfTerm {
    fn from(o: RdfObject) -> Self {
        match o {
            RdfObject::NamedNode(n) => RdfTerm::NamedNode(n),
            RdfObject::BlankNode(b) => RdfTerm::BlankNode(b),
            RdfObject::Literal(l) => RdfTerm::Literal(l),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: RdfSubject,
    pub predicate: RdfPredicate,
    pub object: RdfObject,
}

impl Triple {
    pub fn new(subject: RdfSubject, predicate: RdfPredicate, object: RdfObject) -> Self {
        Triple { subject, predicate, object }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quad {
    pub subject: RdfSubject,
    pub predicate: RdfPredicate,
    pub object: RdfObject,
    pub graph_name: Option<NamedNode>,
}

impl Quad {
    pub fn new(
        subject: RdfSubject,
        predicate: RdfPredicate,
        object: RdfObject,
        graph_name: Option<NamedNode>,
    ) -> Self {
        Quad { subject, predicate, object, graph_name }
    }

    pub fn into_triple(self) -> Triple {
        Triple::new(self.subject, self.predicate, self.object)
    }
}

/// A `None` field matches any term in that position.
#[derive(Debug, Clone, Default)]
pub struct TriplePattern {
    pub subject: Option<RdfSubject>,
    pub predicate: Option<RdfPredicate>,
    pub object: Option<RdfObject>,
}

impl TriplePattern {
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().is_none_or(|s| s == &triple.subject)
            && self.predicate.as_ref().is_none_or(|p| p == &triple.predicate)
            && self.object.as_ref().is_none_or(|o| o == &triple.object)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuadPattern {
    pub subject: Option<RdfSubject>,
    pub predicate: Option<RdfPredicate>,
    pub object: Option<RdfObject>,
    pub graph_name: Option<Option<NamedNode>>,
}

impl QuadPattern {
    pub fn matches(&self, quad: &Quad) -> bool {
        self.subject.as_ref().is_none_or(|s| s == &quad.subject)
            && self.predicate.as_ref().is_none_or(|p| p == &quad.predicate)
            && self.object.as_ref().is_none_or(|o| o == &quad.object)
            && self.graph_name.as_ref().is_none_or(|g| g == &quad.graph_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_node() {
        let n = NamedNode::new("http://example.org/alice").unwrap();
        assert_eq!(n.as_str(), "http://example.org/alice");
        assert!(NamedNode::new("not an iri").is_err());
    }

    #[test]
    fn test_fragment_of() {
        let base = NamedNode::new("http://example.org/obj").unwrap();
        let frag = NamedNode::new("http://example.org/obj#page1").unwrap();
        let other = NamedNode::new("http://example.org/obj2").unwrap();
        assert!(frag.is_fragment_of(&base));
        assert!(!other.is_fragment_of(&base));
        assert!(!base.is_fragment_of(&base));
    }

    #[test]
    fn test_blank_node() {
        let b = BlankNode::from_str("b1").unwrap();
        assert_eq!(b.as_str(), "b1");
    }

    #[test]
    fn test_literal() {
        let l = Literal::new_simple_literal("hello");
        assert_eq!(l.value(), "hello");
        assert_eq!(l.datatype().as_str(), "http://www.w3.org/2001/XMLSchema#string");

        let tagged = Literal::new_language_tagged_literal("bonjour", "fr").unwrap();
        assert_eq!(tagged.language(), Some("fr"));
    }

    #[test]
    fn test_triple() {
        let s = NamedNode::new("http://example.org/a").unwrap();
        let p = RdfPredicate::new("http://example.org/b").unwrap();
        let o = Literal::new_simple_literal("c");
        let t = Triple::new(s.into(), p, o.into());
        assert_eq!(t.to_string(), "http://example.org/a http://example.org/b \"c\" .");
    }

    #[test]
    fn test_triple_pattern_matching() {
        let s = NamedNode::new("http://example.org/a").unwrap();
        let p = RdfPredicate::new("http://example.org/b").unwrap();
        let o = Literal::new_simple_literal("c");
        let t = Triple::new(s.clone().into(), p.clone(), o.into());

        let pattern = TriplePattern { subject: Some(s.into()), ..Default::default() };
        assert!(pattern.matches(&t));

        let other_pred = RdfPredicate::new("http://example.org/other").unwrap();
        let pattern2 = TriplePattern { predicate: Some(other_pred), ..Default::default() };
        assert!(!pattern2.matches(&t));
    }

    #[test]
    fn test_quad() {
        let s = NamedNode::new("http://example.org/a").unwrap();
        let p = RdfPredicate::new("http://example.org/b").unwrap();
        let o = Literal::new_simple_literal("c");
        let g = NamedNode::new("http://example.org/g").unwrap();
        let q = Quad::new(s.into(), p, o.into(), Some(g));
        assert!(q.graph_name.is_some());
    }
}
