//! N-Triples and Turtle parsing/serialization via `rio_turtle`/`rio_api`.
//!
//! N-Triples is a strict subset of Turtle, so `rio_turtle::TurtleParser`
//! (with no base IRI) handles both; the repository only ever emits
//! N-Triples, so only `NTriplesFormatter` is used for output. Grounded on
//! `samyama`'s `TurtleParserWrapper`/`TurtleSerializerWrapper`.

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::types::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, TurtleError, TurtleParser};
use std::io::{BufReader, Cursor};

pub fn parse(input: &str) -> ParseResult<Vec<Triple>> {
    let cursor = Cursor::new(input);
    let mut reader = BufReader::new(cursor);
    let mut parser = TurtleParser::new(&mut reader, None);
    let mut triples = Vec::new();

    let result: Result<(), TurtleError> = parser.parse_all(&mut |t| {
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

pub fn serialize(triples: &[Triple]) -> SerializeResult<String> {
    let mut output = Vec::new();
    let mut formatter = NTriplesFormatter::new(&mut output);

    for triple in triples {
        let rio_triple = to_rio_triple(triple);
        formatter
            .format(&rio_triple)
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;
    }
    formatter.finish().map_err(|e| SerializeError::Serialize(e.to_string()))?;
    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

fn to_rio_triple(triple: &Triple) -> rio_api::model::Triple<'_> {
    let subject = match &triple.subject {
        RdfSubject::NamedNode(n) => {
            rio_api::model::Subject::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
        }
        RdfSubject::BlankNode(b) => {
            rio_api::model::Subject::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
        }
    };
    let predicate = rio_api::model::NamedNode { iri: triple.predicate.as_str() };
    let object = match &triple.object {
        RdfObject::NamedNode(n) => {
            rio_api::model::Term::NamedNode(rio_api::model::NamedNode { iri: n.as_str() })
        }
        RdfObject::BlankNode(b) => {
            rio_api::model::Term::BlankNode(rio_api::model::BlankNode { id: b.as_str() })
        }
        RdfObject::Literal(l) => {
            if let Some(lang) = l.language() {
                rio_api::model::Term::Literal(rio_api::model::Literal::LanguageTaggedString {
                    value: l.value(),
                    language: lang,
                })
            } else if l.datatype().as_str() == "http://www.w3.org/2001/XMLSchema#string" {
                rio_api::model::Term::Literal(rio_api::model::Literal::Simple { value: l.value() })
            } else {
                rio_api::model::Term::Literal(rio_api::model::Literal::Typed {
                    value: l.value(),
                    datatype: rio_api::model::NamedNode { iri: l.datatype().as_str() },
                })
            }
        }
    };
    rio_api::model::Triple { subject, predicate, object }
}

fn convert_subject(s: rio_api::model::Subject) -> Result<RdfSubject, TurtleError> {
    match s {
        rio_api::model::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(
            NamedNode::new(n.iri).map_err(invalid)?,
        )),
        rio_api::model::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(
            BlankNode::from_str(b.id).map_err(invalid)?,
        )),
        _ => Err(invalid_str("unsupported subject term")),
    }
}

fn convert_predicate(p: rio_api::model::NamedNode) -> Result<RdfPredicate, TurtleError> {
    RdfPredicate::new(p.iri).map_err(invalid)
}

fn convert_object(o: rio_api::model::Term) -> Result<RdfObject, TurtleError> {
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
            rio_api::model::Literal::LanguageTaggedString { value, language } => {
                Ok(RdfObject::Literal(
                    Literal::new_language_tagged_literal(value, language).map_err(invalid)?,
                ))
            }
            rio_api::model::Literal::Typed { value, datatype } => {
                let dt = NamedNode::new(datatype.iri).map_err(invalid)?;
                Ok(RdfObject::Literal(Literal::new_typed_literal(value, dt)))
            }
        },
        _ => Err(invalid_str("unsupported object term")),
    }
}

fn invalid(e: impl std::fmt::Display) -> TurtleError {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()).into()
}

fn invalid_str(msg: &str) -> TurtleError {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg).into()
}
