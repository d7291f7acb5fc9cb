//! RDF (de)serialization: N-Triples (the repository's wire format) and
//! RDF/XML (one of the extra-triples file formats accepted by the batch
//! loader).

mod ntriples;
mod rdfxml;

use crate::rdf::types::Triple;
use thiserror::Error;

/// The format an "extra triples" file on disk is in, selected by file
/// extension the way the original loader's `load_item_internal` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// `.nt`, and also used for the repository's own N-Triples wire body.
    NTriples,
    /// `.ttl`/`.n3`.
    Turtle,
    /// `.rdf`/`.xml`.
    RdfXml,
}

impl RdfFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "nt" => Some(RdfFormat::NTriples),
            "ttl" | "n3" => Some(RdfFormat::Turtle),
            "rdf" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("parse error: {0}")]
    Parse(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

pub fn parse(input: &str, format: RdfFormat) -> ParseResult<Vec<Triple>> {
    match format {
        RdfFormat::NTriples | RdfFormat::Turtle => ntriples::parse(input),
        RdfFormat::RdfXml => rdfxml::parse(input),
    }
}

pub fn serialize_n_triples(triples: &[Triple]) -> SerializeResult<String> {
    ntriples::serialize(triples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RdfFormat::from_extension("ttl"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("NT"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_extension("rdf"), Some(RdfFormat::RdfXml));
        assert_eq!(RdfFormat::from_extension("csv"), None);
    }
}
