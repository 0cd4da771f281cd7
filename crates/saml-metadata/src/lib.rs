//! SAML 2.0 federation metadata for Rust.
//!
//! This crate provides a typed object model for SAML V2.0 metadata with a
//! lossless XML codec:
//!
//! - **Entity and role descriptors** - IDP, SP, authority and PDP roles, affiliations and entity groups
//! - **Validated construction** - the same invariants apply to built and decoded values
//! - **Extensibility** - namespaced attributes and unknown elements survive a round trip
//! - **Pluggable decoding** - a registry maps element names to decoders
//! - **XML signature** - enveloped signing on encode and verification of decoded documents
//!
//! # Architecture
//!
//! - [`types`] - Metadata element types
//! - [`registry`] - Decode dispatch for role descriptors and Extensions content
//! - [`signature`] - XML signature creation and validation
//! - [`codec`] - Attribute, boolean, timestamp and list primitives
//! - [`error`] - Error types for metadata operations
//!
//! # Example
//!
//! ```rust,ignore
//! use saml_metadata::{EntityDescriptor, MetadataElement};
//!
//! let entity = EntityDescriptor::from_xml_str(&xml)?;
//! if let Some(idp) = entity.idp_sso_descriptor() {
//!     println!("{} SSO endpoints", idp.single_sign_on_services().len());
//! }
//! ```
//!
//! # Specifications
//!
//! - [SAML 2.0 Metadata](https://docs.oasis-open.org/security/saml/v2.0/saml-metadata-2.0-os.pdf)
//! - [SAML Metadata Extensions for Registration and Publication Information](https://docs.oasis-open.org/security/saml/Post2.0/saml-metadata-rpi/v1.0/saml-metadata-rpi-v1.0.html)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod document;
pub mod element;
pub mod error;
pub mod extensible;
pub mod registry;
pub mod signature;
pub mod types;

pub use document::{DocumentFields, MetadataDocument};
pub use element::MetadataElement;
pub use error::{MetadataError, MetadataResult};
pub use extensible::{ExtensibleAttributes, ExtensionAttribute};
pub use registry::MetadataRegistry;
pub use saml_xml::XmlElement;
pub use types::*;
