//! Language-tagged strings (`xml:lang` plus text).

use saml_xml::{XmlElement, XML_NS};

use crate::codec::require_non_empty;
use crate::error::{MetadataError, MetadataResult};

/// A string value tagged with a language.
///
/// Used for OrganizationName, ServiceName, RegistrationPolicy and the other
/// localized name/URI elements. The language tag must be non-empty; the value
/// may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    language: String,
    value: String,
}

impl LocalizedString {
    /// Creates a localized string.
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> MetadataResult<Self> {
        let language = language.into();
        require_non_empty("LocalizedString", "xml:lang", &language)?;
        Ok(Self {
            language,
            value: value.into(),
        })
    }

    /// Returns the language tag.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Decodes any element carrying `xml:lang` and text content.
    pub fn from_xml(element: &XmlElement) -> MetadataResult<Self> {
        let language = element
            .attribute_ns(XML_NS, "lang")
            .ok_or_else(|| MetadataError::missing_attribute(element.qualified_name(), "xml:lang"))?;
        require_non_empty(&element.qualified_name(), "xml:lang", language)?;
        Ok(Self {
            language: language.to_string(),
            value: element.text(),
        })
    }
}
