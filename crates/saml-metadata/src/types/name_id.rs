//! The `saml:NameID` element.
//!
//! Name identifiers appear in metadata where an entity names a subject, for
//! example inside extension content or attribute values.

use saml_xml::XmlElement;

use crate::codec::optional_attribute;
use crate::element::{expect_element, MetadataElement};
use crate::error::MetadataResult;
use crate::registry::MetadataRegistry;

use super::{NameIdFormat, NS_SAML, PREFIX_SAML};

/// SAML Name ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameId {
    value: String,
    format: Option<String>,
    name_qualifier: Option<String>,
    sp_name_qualifier: Option<String>,
    sp_provided_id: Option<String>,
}

impl NameId {
    /// Creates a new name ID with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
            name_qualifier: None,
            sp_name_qualifier: None,
            sp_provided_id: None,
        }
    }

    /// Sets the format.
    #[must_use]
    pub fn with_format(mut self, format: NameIdFormat) -> Self {
        self.format = Some(format.uri().to_string());
        self
    }

    /// Sets the format from a URI that may not be a well-known format.
    #[must_use]
    pub fn with_format_uri(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the name qualifier.
    #[must_use]
    pub fn with_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.name_qualifier = Some(qualifier.into());
        self
    }

    /// Sets the SP name qualifier.
    #[must_use]
    pub fn with_sp_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.sp_name_qualifier = Some(qualifier.into());
        self
    }

    /// Sets the SP provided ID.
    #[must_use]
    pub fn with_sp_provided_id(mut self, id: impl Into<String>) -> Self {
        self.sp_provided_id = Some(id.into());
        self
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the format URI.
    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Returns the name qualifier.
    #[must_use]
    pub fn name_qualifier(&self) -> Option<&str> {
        self.name_qualifier.as_deref()
    }

    /// Returns the SP name qualifier.
    #[must_use]
    pub fn sp_name_qualifier(&self) -> Option<&str> {
        self.sp_name_qualifier.as_deref()
    }

    /// Returns the SP provided ID.
    #[must_use]
    pub fn sp_provided_id(&self) -> Option<&str> {
        self.sp_provided_id.as_deref()
    }

    /// Returns the parsed format; unknown or absent formats are `Unspecified`.
    #[must_use]
    pub fn parsed_format(&self) -> NameIdFormat {
        self.format
            .as_deref()
            .and_then(NameIdFormat::from_uri)
            .unwrap_or_default()
    }
}

impl MetadataElement for NameId {
    const NAMESPACE: &'static str = NS_SAML;
    const PREFIX: &'static str = PREFIX_SAML;
    const LOCAL_NAME: &'static str = "NameID";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            value: element.text(),
            format: optional_attribute(element, "Format"),
            name_qualifier: optional_attribute(element, "NameQualifier"),
            sp_name_qualifier: optional_attribute(element, "SPNameQualifier"),
            sp_provided_id: optional_attribute(element, "SPProvidedID"),
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        for (name, value) in [
            ("NameQualifier", &self.name_qualifier),
            ("SPNameQualifier", &self.sp_name_qualifier),
            ("Format", &self.format),
            ("SPProvidedID", &self.sp_provided_id),
        ] {
            if let Some(value) = value {
                e.set_attribute(name, value.as_str());
            }
        }
        e.set_text(self.value.as_str());
        Ok(e)
    }
}
