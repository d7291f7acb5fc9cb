//! An RDF graph that tracks the edits made to it against its original
//! snapshot, so that a client can build a minimal SPARQL Update diff.
//!
//! Grounded on `samyama`'s `RdfStore` (indexed `HashSet<Triple>` with
//! subject/predicate/object lookup tables) and on `plastron.rdfmapping.
//! graph.TrackChangesGraph`'s `original`/`inserts`/`deletes`/`change_uri`
//! semantics.

use super::types::{NamedNode, RdfObject, RdfPredicate, RdfSubject, RdfTerm, Triple};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("triple not found: {0}")]
    TripleNotFound(Triple),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// A mutable set of triples plus the snapshot it was constructed (or last
/// reconciled) from.
///
/// `original` is never rewritten by [`Graph::change_uri`] — that is the
/// whole point: after a subject's URI changes, diffing `current` against
/// `original` reports the old URI's triples as deleted and the new URI's
/// triples as inserted, which is exactly the SPARQL Update a server needs
/// to reflect a resource's identity change at creation time.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    current: HashSet<Triple>,
    original: HashSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// A graph whose `original` snapshot is `triples` (i.e. freshly parsed
    /// from a server response, with no local edits yet).
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let current: HashSet<Triple> = triples.into_iter().collect();
        let original = current.clone();
        Graph { current, original }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.current.contains(triple)
    }

    pub fn insert(&mut self, triple: Triple) -> bool {
        self.current.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.current.remove(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.current.iter()
    }

    pub fn triples_with_subject(&self, subject: &RdfSubject) -> Vec<&Triple> {
        self.current.iter().filter(|t| &t.subject == subject).collect()
    }

    pub fn triples_with_predicate(&self, predicate: &RdfPredicate) -> Vec<&Triple> {
        self.current.iter().filter(|t| &t.predicate == predicate).collect()
    }

    pub fn triples_with_subject_predicate(
        &self,
        subject: &RdfSubject,
        predicate: &RdfPredicate,
    ) -> Vec<&RdfObject> {
        self.current
            .iter()
            .filter(|t| &t.subject == subject && &t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Triples present in `current` but not in `original`.
    pub fn inserts(&self) -> HashSet<Triple> {
        self.current.difference(&self.original).cloned().collect()
    }

    /// Triples present in `original` but not in `current`.
    pub fn deletes(&self) -> HashSet<Triple> {
        self.original.difference(&self.current).cloned().collect()
    }

    pub fn has_changes(&self) -> bool {
        self.current != self.original
    }

    /// Resets `original` to the current state, discarding the change
    /// history (called once a server confirms a SPARQL Update applied).
    pub fn apply_changes(&mut self) {
        self.original = self.current.clone();
    }

    /// Rewrite every triple whose subject, predicate, or object is `old`
    /// or a `old#fragment` of it, to use `new` in its place. `original` is
    /// deliberately left untouched.
    pub fn change_uri(&mut self, old: &NamedNode, new: &NamedNode) {
        let rewritten: HashSet<Triple> = self
            .current
            .iter()
            .map(|t| rewrite_triple(t, old, new))
            .collect();
        self.current = rewritten;
    }
}

fn matches_or_fragment(node: &NamedNode, old: &NamedNode) -> bool {
    node == old || node.is_fragment_of(old)
}

fn rewrite_named_node(node: &NamedNode, old: &NamedNode, new: &NamedNode) -> NamedNode {
    if node == old {
        return new.clone();
    }
    if let Some(fragment) = node.as_str().strip_prefix(old.as_str()) {
        if fragment.starts_with('#') {
            return NamedNode::new(format!("{new}{fragment}"))
                .expect("rewriting a valid IRI with a valid IRI prefix stays valid");
        }
    }
    node.clone()
}

fn rewrite_triple(triple: &Triple, old: &NamedNode, new: &NamedNode) -> Triple {
    let subject = match &triple.subject {
        RdfSubject::NamedNode(n) if matches_or_fragment(n, old) => {
            RdfSubject::NamedNode(rewrite_named_node(n, old, new))
        }
        other => other.clone(),
    };
    let predicate = {
        let n = triple.predicate.as_named_node();
        if matches_or_fragment(n, old) {
            RdfPredicate::from(rewrite_named_node(n, old, new))
        } else {
            triple.predicate.clone()
        }
    };
    let object = match &triple.object {
        RdfObject::NamedNode(n) if matches_or_fragment(n, old) => {
            RdfObject::NamedNode(rewrite_named_node(n, old, new))
        }
        other => other.clone(),
    };
    Triple::new(subject, predicate, object)
}

/// Collects the distinct terms appearing in a triple set, for convenience
/// call sites that need to enumerate subjects or objects (e.g. discovering
/// embedded fragment identifiers).
pub fn terms_of(triples: &HashSet<Triple>) -> HashSet<RdfTerm> {
    let mut terms = HashSet::new();
    for t in triples {
        terms.insert(RdfTerm::from(t.subject.clone()));
        terms.insert(RdfTerm::from(t.object.clone()));
    }
    terms
}
