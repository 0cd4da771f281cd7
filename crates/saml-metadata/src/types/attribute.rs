//! SAML attributes as they appear in metadata.
//!
//! `saml:Attribute` is advertised by identity providers and attribute
//! authorities; `md:RequestedAttribute` is listed by service providers inside
//! an `md:AttributeConsumingService`. Attribute values are kept as raw
//! `saml:AttributeValue` trees since their content model is open.

use saml_xml::XmlElement;

use crate::codec::{
    append_localized, boolean_attribute, boolean_literal, extract_localized, optional_attribute,
    require_non_empty, required_attribute,
};
use crate::element::{append_all, expect_element, required_children, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::extensible::ExtensibleAttributes;
use crate::registry::MetadataRegistry;
use crate::types::endpoint::{decode_index, encode_index};

use super::{LocalizedString, NS_MD, NS_SAML, PREFIX_MD, PREFIX_SAML};

/// `saml:Attribute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    name_format: Option<String>,
    friendly_name: Option<String>,
    values: Vec<XmlElement>,
    attributes: ExtensibleAttributes,
}

impl Attribute {
    /// Creates an attribute with a non-empty name.
    pub fn new(name: impl Into<String>) -> MetadataResult<Self> {
        Self::checked(&Self::qualified_name(), name.into())
    }

    fn checked(element: &str, name: String) -> MetadataResult<Self> {
        require_non_empty(element, "Name", &name)?;
        Ok(Self {
            name,
            name_format: None,
            friendly_name: None,
            values: Vec::new(),
            attributes: ExtensibleAttributes::new(),
        })
    }

    /// Sets the name format URI.
    #[must_use]
    pub fn with_name_format(mut self, name_format: impl Into<String>) -> Self {
        self.name_format = Some(name_format.into());
        self
    }

    /// Sets the friendly name.
    #[must_use]
    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    /// Adds a string `saml:AttributeValue`.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        let mut element = XmlElement::new_ns(NS_SAML, &format!("{PREFIX_SAML}:AttributeValue"));
        element.set_text(value.into());
        self.values.push(element);
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name format URI.
    #[must_use]
    pub fn name_format(&self) -> Option<&str> {
        self.name_format.as_deref()
    }

    /// Returns the friendly name.
    #[must_use]
    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    /// Returns the raw `saml:AttributeValue` elements.
    #[must_use]
    pub fn values(&self) -> &[XmlElement] {
        &self.values
    }

    /// Returns the text content of each value.
    #[must_use]
    pub fn string_values(&self) -> Vec<String> {
        self.values.iter().map(XmlElement::text).collect()
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }

    fn decode_fields(element: &XmlElement) -> MetadataResult<Self> {
        let name = required_attribute(element, "Name")?.to_string();
        let mut attribute = Self::checked(&element.qualified_name(), name)?;
        attribute.name_format = optional_attribute(element, "NameFormat");
        attribute.friendly_name = optional_attribute(element, "FriendlyName");
        attribute.values = element
            .children_named(NS_SAML, "AttributeValue")
            .map(|value| {
                let mut value = value.detached();
                value.drop_implied_declarations();
                value
            })
            .collect();
        attribute.attributes = ExtensibleAttributes::from_xml(element);
        Ok(attribute)
    }

    fn encode_fields(&self, element: &mut XmlElement) {
        element.set_attribute("Name", self.name.as_str());
        if let Some(name_format) = &self.name_format {
            element.set_attribute("NameFormat", name_format.as_str());
        }
        if let Some(friendly_name) = &self.friendly_name {
            element.set_attribute("FriendlyName", friendly_name.as_str());
        }
        self.attributes.apply_to(element);
        for value in &self.values {
            element.append_child(value.clone());
        }
    }
}

impl MetadataElement for Attribute {
    const NAMESPACE: &'static str = NS_SAML;
    const PREFIX: &'static str = PREFIX_SAML;
    const LOCAL_NAME: &'static str = "Attribute";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Self::decode_fields(element)
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.encode_fields(&mut e);
        Ok(e)
    }
}

/// `md:RequestedAttribute`: an attribute a service provider asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedAttribute {
    attribute: Attribute,
    is_required: Option<bool>,
}

impl RequestedAttribute {
    /// Creates a requested attribute with a non-empty name.
    pub fn new(name: impl Into<String>) -> MetadataResult<Self> {
        Ok(Self {
            attribute: Attribute::checked(&Self::qualified_name(), name.into())?,
            is_required: None,
        })
    }

    /// Wraps an attribute.
    #[must_use]
    pub const fn from_attribute(attribute: Attribute) -> Self {
        Self {
            attribute,
            is_required: None,
        }
    }

    /// Sets `isRequired`.
    #[must_use]
    pub const fn with_required(mut self, is_required: bool) -> Self {
        self.is_required = Some(is_required);
        self
    }

    /// Returns the attribute fields.
    #[must_use]
    pub const fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    /// Returns `isRequired`, if specified.
    #[must_use]
    pub const fn is_required(&self) -> Option<bool> {
        self.is_required
    }
}

impl MetadataElement for RequestedAttribute {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "RequestedAttribute";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            attribute: Attribute::decode_fields(element)?,
            is_required: boolean_attribute(element, "isRequired")?,
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.attribute.encode_fields(&mut e);
        if let Some(is_required) = self.is_required {
            e.set_attribute("isRequired", boolean_literal(is_required));
        }
        Ok(e)
    }
}

/// `md:AttributeConsumingService`: a named set of requested attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeConsumingService {
    index: u16,
    is_default: Option<bool>,
    service_names: Vec<LocalizedString>,
    service_descriptions: Vec<LocalizedString>,
    requested_attributes: Vec<RequestedAttribute>,
}

impl AttributeConsumingService {
    /// Creates a service. Names and requested attributes must be non-empty.
    pub fn new(
        index: u16,
        service_names: Vec<LocalizedString>,
        requested_attributes: Vec<RequestedAttribute>,
    ) -> MetadataResult<Self> {
        let element = Self::qualified_name();
        if service_names.is_empty() {
            return Err(MetadataError::missing_child(element.as_str(), "md:ServiceName", 1));
        }
        if requested_attributes.is_empty() {
            return Err(MetadataError::missing_child(
                element.as_str(),
                RequestedAttribute::qualified_name(),
                1,
            ));
        }
        Ok(Self {
            index,
            is_default: None,
            service_names,
            service_descriptions: Vec::new(),
            requested_attributes,
        })
    }

    /// Sets `isDefault`.
    #[must_use]
    pub const fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    /// Adds a service description.
    #[must_use]
    pub fn with_description(mut self, description: LocalizedString) -> Self {
        self.service_descriptions.push(description);
        self
    }

    /// Returns the index.
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Returns `isDefault`, if specified.
    #[must_use]
    pub const fn is_default(&self) -> Option<bool> {
        self.is_default
    }

    /// Returns the service names.
    #[must_use]
    pub fn service_names(&self) -> &[LocalizedString] {
        &self.service_names
    }

    /// Returns the service descriptions.
    #[must_use]
    pub fn service_descriptions(&self) -> &[LocalizedString] {
        &self.service_descriptions
    }

    /// Returns the requested attributes.
    #[must_use]
    pub fn requested_attributes(&self) -> &[RequestedAttribute] {
        &self.requested_attributes
    }
}

impl MetadataElement for AttributeConsumingService {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "AttributeConsumingService";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let index = decode_index(element)?;
        let service = Self::new(
            index,
            extract_localized(element, NS_MD, "ServiceName")?,
            required_children::<RequestedAttribute>(element, registry, 1)?,
        )?;
        Ok(Self {
            is_default: boolean_attribute(element, "isDefault")?,
            service_descriptions: extract_localized(element, NS_MD, "ServiceDescription")?,
            ..service
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        encode_index(&mut e, self.index, self.is_default);
        append_localized(&mut e, NS_MD, "md:ServiceName", &self.service_names);
        append_localized(&mut e, NS_MD, "md:ServiceDescription", &self.service_descriptions);
        append_all(&mut e, &self.requested_attributes)?;
        Ok(e)
    }
}
