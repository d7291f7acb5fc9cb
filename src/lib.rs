//! `ldprepo`: RDF data model and resource layer for an LDP/Fedora
//! repository batch client.
//!
//! This crate carries the parts of the client that don't need an HTTP
//! connection: RDF terms and a change-tracking [`rdf::Graph`], property
//! descriptors (a static registration table, see [`properties`]), and an
//! in-memory [`resource::Resource`] built on top of them. The HTTP-facing
//! layers (endpoint/auth/transactions, repository traversal, batch
//! processing, publication) live in their own crates alongside this one.

pub mod properties;
pub mod rdf;
pub mod resource;
pub mod validation;

pub use properties::{PropertyDef, PropertyError, PropertyKind, PropertyView};
pub use rdf::{Graph, NamedNode, Triple};
pub use resource::{ContentModel, DefaultValue, DescribesResource, Resource};
pub use validation::{ValidationOutcome, ValidationResults};
