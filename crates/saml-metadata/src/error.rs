//! Metadata error types.
//!
//! Every decoder and constructor reports invariant violations through
//! [`MetadataError`], naming the offending element and attribute so malformed
//! federation metadata can be diagnosed without re-reading the document.

use saml_xml::XmlError;
use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Metadata codec errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A required attribute is absent.
    #[error("missing required attribute '{attribute}' on {element}")]
    MissingRequiredAttribute {
        /// Qualified name of the element.
        element: String,
        /// Name of the missing attribute.
        attribute: String,
    },

    /// An attribute value does not have the expected lexical form.
    #[error("invalid '{attribute}' on {element}: {reason}")]
    InvalidAttributeFormat {
        /// Qualified name of the element.
        element: String,
        /// Name of the attribute.
        attribute: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// An element was decoded as the wrong type.
    #[error("unexpected element {actual}, expected {expected}")]
    UnexpectedElementName {
        /// Name that was found.
        actual: String,
        /// Name that was expected.
        expected: String,
    },

    /// More children of one kind than the schema allows.
    #[error("{element} allows at most {max} {child} element(s)")]
    TooManyChildren {
        /// Qualified name of the parent.
        element: String,
        /// Qualified name of the repeated child.
        child: String,
        /// Allowed maximum.
        max: usize,
    },

    /// A singleton child appeared a second time.
    #[error("more than one {child} in {element}")]
    DuplicateSingletonElement {
        /// Qualified name of the parent.
        element: String,
        /// Qualified name of the duplicated child.
        child: String,
    },

    /// A required child list is empty.
    #[error("{element} requires at least {min_count} {child} element(s)")]
    MissingRequiredChild {
        /// Qualified name of the parent.
        element: String,
        /// Qualified name of the required child.
        child: String,
        /// Required minimum.
        min_count: usize,
    },

    /// An EntityDescriptor must hold role descriptors or an affiliation, not both or neither.
    #[error(
        "EntityDescriptor must contain either role descriptors or an AffiliationDescriptor \
         (roles present: {has_roles}, affiliation present: {has_affiliation})"
    )]
    InvalidRoleComposition {
        /// Whether role descriptors were supplied.
        has_roles: bool,
        /// Whether an AffiliationDescriptor was supplied.
        has_affiliation: bool,
    },

    /// A required value is the empty string.
    #[error("{field} on {element} must not be empty")]
    EmptyRequiredValue {
        /// Qualified name of the element.
        element: String,
        /// Field or attribute that is empty.
        field: String,
    },

    /// An extension attribute name has no namespace prefix.
    #[error("not a qualified name: {0}")]
    NotQualifiedName(String),

    /// The input could not be read as XML.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Producing a signature failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// A signature did not verify.
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// An algorithm URI is unknown or not supported.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl MetadataError {
    pub(crate) fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingRequiredAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    pub(crate) fn invalid_attribute(
        element: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidAttributeFormat {
            element: element.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn empty_value(element: impl Into<String>, field: impl Into<String>) -> Self {
        Self::EmptyRequiredValue {
            element: element.into(),
            field: field.into(),
        }
    }

    pub(crate) fn missing_child(
        element: impl Into<String>,
        child: impl Into<String>,
        min_count: usize,
    ) -> Self {
        Self::MissingRequiredChild {
            element: element.into(),
            child: child.into(),
            min_count,
        }
    }

    /// Returns true for errors caused by the shape or content of the input document.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        !matches!(
            self,
            Self::SignatureCreation(_) | Self::SignatureInvalid(_) | Self::UnsupportedAlgorithm(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_element_and_attribute() {
        let err = MetadataError::missing_attribute("md:ArtifactResolutionService", "index");
        assert_eq!(
            err.to_string(),
            "missing required attribute 'index' on md:ArtifactResolutionService"
        );

        let err = MetadataError::missing_child("md:IDPSSODescriptor", "md:SingleSignOnService", 1);
        assert_eq!(
            err.to_string(),
            "md:IDPSSODescriptor requires at least 1 md:SingleSignOnService element(s)"
        );
    }

    #[test]
    fn decode_error_classification() {
        assert!(MetadataError::NotQualifiedName("x".to_string()).is_decode_error());
        assert!(MetadataError::from(XmlError::NoRootElement).is_decode_error());
        assert!(!MetadataError::SignatureInvalid("digest".to_string()).is_decode_error());
    }
}
