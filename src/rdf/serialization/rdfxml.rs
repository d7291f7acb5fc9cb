//! RDF/XML parsing via `rio_xml`, for `.rdf`/`.xml` extra-triples files.
//! The repository itself never emits RDF/XML, so only parsing is needed.

use super::ParseError;
use crate::rdf::types::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlError, RdfXmlParser};
use std::io::Cursor;

pub fn parse(input: &str) -> super::ParseResult<Vec<Triple>> {
    let cursor = Cursor::new(input.as_bytes());
    let mut parser = RdfXmlParser::new(cursor, None);
    let mut triples = Vec::new();

    let result: Result<(), RdfXmlError> = parser.parse_all(&mut |t| {
        triples.push(Triple::new(
            convert_subject(t.subject)?,
            convert_predicate(t.predicate)?,
            convert_object(t.object)?,
        ));
        Ok(())
    });

    result.map_err(|e| ParseError::Parse(e.to_string()))?;
    Ok(triples)
}

fn convert_subject(s: rio_api::model::Subject) -> Result<RdfSubject, RdfXmlError> {
    match s {
        rio_api::model::Subject::NamedNode(n) => {
            Ok(RdfSubject::NamedNode(NamedNode::new(n.iri).map_err(invalid)?))
        }
        rio_api::model::Subject::BlankNode(b) => {
            Ok(RdfSubject::BlankNode(BlankNode::from_str(b.id).map_err(invalid)?))
        }
        _ => Err(invalid_str("unsupported subject term")),
    }
}

fn convert_predicate(p: rio_api::model::NamedNode) -> Result<RdfPredicate, RdfXmlError> {
    RdfPredicate::new(p.iri).map_err(invalid)
}

fn convert_object(o: rio_api::model::Term) -> Result<RdfObject, RdfXmlError> {
    match o {
        rio_api::model::Term::NamedNode(n) => {
            Ok(RdfObject::NamedNode(NamedNode::new(n.iri).map_err(invalid)?))
        }
        rio_api::model::Term::BlankNode(b) => {
            Ok(RdfObject::BlankNode(BlankNode::from_str(b.id).map_err(invalid)?))
        }
        rio_api::model::Term::Literal(l) => match l {
            rio_api::model::Literal::Simple { value } => {
                Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
            }
            rio_api::model::Literal::LanguageTaggedString { value, language } => Ok(
                RdfObject::Literal(Literal::new_language_tagged_literal(value, language).map_err(invalid)?),
            ),
            rio_api::model::Literal::Typed { value, datatype } => {
                let dt = NamedNode::new(datatype.iri).map_err(invalid)?;
                Ok(RdfObject::Literal(Literal::new_typed_literal(value, dt)))
            }
        },
        _ => Err(invalid_str("unsupported object term")),
    }
}

fn invalid(e: impl std::fmt::Display) -> RdfXmlError {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()).into()
}

fn invalid_str(msg: &str) -> RdfXmlError {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_rdf_xml() {
        let input = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about="http://example.org/a">
    <dc:title>A title</dc:title>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse(input).unwrap();
        assert_eq!(triples.len(), 1);
        let RdfObject::Literal(l) = &triples[0].object else { panic!("expected literal") };
        assert_eq!(l.value(), "A title");
    }
}
