//! Well-known IRI constants used by the resource and publication layers.
//!
//! Grounded on `plastron.namespaces`: the repository's code does not need a
//! general-purpose namespace manager to talk about `rdf:type` or the access
//! classes used for publication, so these are plain constant functions
//! rather than entries in [`super::namespace::NamespaceManager`], which is
//! reserved for user-facing prefix expansion/compaction.

use super::types::NamedNode;

fn n(iri: &str) -> NamedNode {
    NamedNode::new(iri).expect("vocabulary IRIs are well-formed")
}

pub fn rdf_type() -> NamedNode {
    n("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")
}

pub fn ldp_contains() -> NamedNode {
    n("http://www.w3.org/ns/ldp#contains")
}

pub fn ldp_member() -> NamedNode {
    n("http://www.w3.org/ns/ldp#member")
}

pub fn fedora_created() -> NamedNode {
    n("http://fedora.info/definitions/v4/repository#created")
}

pub fn fedora_has_parent() -> NamedNode {
    n("http://fedora.info/definitions/v4/repository#hasParent")
}

pub fn pcdm_has_member() -> NamedNode {
    n("http://pcdm.org/models#hasMember")
}

pub fn pcdm_has_file() -> NamedNode {
    n("http://pcdm.org/models#hasFile")
}

pub fn pcdm_has_related_object() -> NamedNode {
    n("http://pcdm.org/models#hasRelatedObject")
}

pub fn ore_proxy_for() -> NamedNode {
    n("http://www.openarchives.org/ore/terms/proxyFor")
}

pub fn iana_describedby() -> NamedNode {
    n("http://www.iana.org/assignments/relation/describedby")
}

/// UMD access-class vocabulary used by the publication state machine.
pub mod umdaccess {
    use super::{n, NamedNode};

    pub fn published() -> NamedNode {
        n("http://vocab.lib.umd.edu/access#Published")
    }

    pub fn hidden() -> NamedNode {
        n("http://vocab.lib.umd.edu/access#Hidden")
    }
}

/// UMD custom datatypes, e.g. the handle-URI literal datatype.
pub mod umdtype {
    use super::{n, NamedNode};

    pub fn handle() -> NamedNode {
        n("http://vocab.lib.umd.edu/datatype#handle")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_constants() {
        assert_eq!(rdf_type().as_str(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
        assert_eq!(umdaccess::published().as_str(), "http://vocab.lib.umd.edu/access#Published");
        assert_eq!(umdaccess::hidden().as_str(), "http://vocab.lib.umd.edu/access#Hidden");
        assert_eq!(
            fedora_has_parent().as_str(),
            "http://fedora.info/definitions/v4/repository#hasParent"
        );
    }
}
