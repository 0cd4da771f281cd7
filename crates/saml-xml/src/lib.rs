//! Owned XML element tree for SAML metadata processing.
//!
//! This crate provides the small DOM the metadata codec works against:
//!
//! - [`XmlElement`] / [`XmlNode`] - an owned, namespace-aware element tree
//! - [`XmlElement::parse`] - parsing built on the `quick-xml` pull reader
//! - [`XmlElement::to_xml_string`] - deterministic serialization that declares
//!   namespaces where they are first needed
//! - [`canonicalize`] - exclusive XML canonicalization used as signature input
//!
//! Text between elements is retained as read, whitespace included, so a
//! parsed document re-serializes and canonicalizes the way it was written.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod c14n;
mod element;
mod error;
mod reader;
mod writer;

pub use c14n::{canonicalize, canonicalize_excluding};
pub use element::{NamespaceDecl, QualifiedName, XmlAttribute, XmlElement, XmlNode};
pub use error::{XmlError, XmlResult};

/// Namespace bound to the reserved `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of namespace declaration attributes.
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";
