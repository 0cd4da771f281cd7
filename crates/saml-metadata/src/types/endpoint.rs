//! Endpoint types.
//!
//! Every endpoint element shares the same content: a binding, a location,
//! an optional response location and extension attributes. Indexed endpoints
//! add an `index` and an optional `isDefault` flag. The concrete element types
//! differ only by their wire name and are generated from one definition.

use std::ops::Deref;

use saml_xml::XmlElement;

use crate::codec::{boolean_attribute, boolean_literal, optional_attribute, require_non_empty, required_attribute};
use crate::element::{expect_element, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::extensible::ExtensibleAttributes;
use crate::registry::MetadataRegistry;

use super::{NS_MD, PREFIX_MD};

/// Binding and location of a protocol endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    binding: String,
    location: String,
    response_location: Option<String>,
    attributes: ExtensibleAttributes,
}

impl Endpoint {
    /// Creates an endpoint. Binding and location must be non-empty.
    pub fn new(binding: impl Into<String>, location: impl Into<String>) -> MetadataResult<Self> {
        Self::checked("md:Endpoint", binding.into(), location.into())
    }

    fn checked(element: &str, binding: String, location: String) -> MetadataResult<Self> {
        require_non_empty(element, "Binding", &binding)?;
        require_non_empty(element, "Location", &location)?;
        Ok(Self {
            binding,
            location,
            response_location: None,
            attributes: ExtensibleAttributes::new(),
        })
    }

    /// Sets the response location.
    #[must_use]
    pub fn with_response_location(mut self, response_location: impl Into<String>) -> Self {
        self.response_location = Some(response_location.into());
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the binding URI.
    #[must_use]
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// Returns the location URI.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the response location URI.
    #[must_use]
    pub fn response_location(&self) -> Option<&str> {
        self.response_location.as_deref()
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }

    fn decode(element: &XmlElement) -> MetadataResult<Self> {
        let binding = required_attribute(element, "Binding")?.to_string();
        let location = required_attribute(element, "Location")?.to_string();
        let mut endpoint = Self::checked(&element.qualified_name(), binding, location)?;
        endpoint.response_location = optional_attribute(element, "ResponseLocation");
        endpoint.attributes = ExtensibleAttributes::from_xml(element);
        Ok(endpoint)
    }

    fn encode(&self, element: &mut XmlElement) {
        element.set_attribute("Binding", self.binding.as_str());
        element.set_attribute("Location", self.location.as_str());
        if let Some(response_location) = &self.response_location {
            element.set_attribute("ResponseLocation", response_location.as_str());
        }
        self.attributes.apply_to(element);
    }
}

/// An endpoint with an `index` and an optional default flag.
///
/// Zero is a legal index. `is_default` is a tri-state: unspecified is
/// distinct from `false` and is not emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEndpoint {
    endpoint: Endpoint,
    index: u16,
    is_default: Option<bool>,
}

impl IndexedEndpoint {
    /// Creates an indexed endpoint.
    #[must_use]
    pub const fn new(endpoint: Endpoint, index: u16) -> Self {
        Self {
            endpoint,
            index,
            is_default: None,
        }
    }

    /// Sets the `isDefault` flag.
    #[must_use]
    pub const fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    /// Returns the underlying endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the index.
    #[must_use]
    pub const fn index(&self) -> u16 {
        self.index
    }

    /// Returns the `isDefault` flag, if specified.
    #[must_use]
    pub const fn is_default(&self) -> Option<bool> {
        self.is_default
    }

    fn decode(element: &XmlElement) -> MetadataResult<Self> {
        let endpoint = Endpoint::decode(element)?;
        let index = decode_index(element)?;
        let is_default = boolean_attribute(element, "isDefault")?;
        Ok(Self {
            endpoint,
            index,
            is_default,
        })
    }

    fn encode(&self, element: &mut XmlElement) {
        self.endpoint.encode(element);
        encode_index(element, self.index, self.is_default);
    }
}

impl Deref for IndexedEndpoint {
    type Target = Endpoint;

    fn deref(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Decodes the required `index` attribute of an indexed element.
pub(crate) fn decode_index(element: &XmlElement) -> MetadataResult<u16> {
    let raw = required_attribute(element, "index")?;
    raw.parse::<u16>().map_err(|_| {
        MetadataError::invalid_attribute(
            element.qualified_name(),
            "index",
            format!("'{raw}' is not an unsigned short integer"),
        )
    })
}

/// Writes `index` and, when specified, `isDefault`.
pub(crate) fn encode_index(element: &mut XmlElement, index: u16, is_default: Option<bool>) {
    element.set_attribute("index", index.to_string());
    if let Some(is_default) = is_default {
        element.set_attribute("isDefault", boolean_literal(is_default));
    }
}

macro_rules! endpoint_types {
    ($($(#[$meta:meta])* $name:ident => $local:literal;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(Endpoint);

        impl $name {
            /// Creates the endpoint. Binding and location must be non-empty.
            pub fn new(binding: impl Into<String>, location: impl Into<String>) -> MetadataResult<Self> {
                Endpoint::checked(&Self::qualified_name(), binding.into(), location.into()).map(Self)
            }

            /// Wraps an already validated endpoint.
            #[must_use]
            pub const fn from_endpoint(endpoint: Endpoint) -> Self {
                Self(endpoint)
            }

            /// Sets the response location.
            #[must_use]
            pub fn with_response_location(self, response_location: impl Into<String>) -> Self {
                Self(self.0.with_response_location(response_location))
            }

            /// Replaces the extension attributes.
            #[must_use]
            pub fn with_attributes(self, attributes: ExtensibleAttributes) -> Self {
                Self(self.0.with_attributes(attributes))
            }
        }

        impl Deref for $name {
            type Target = Endpoint;

            fn deref(&self) -> &Endpoint {
                &self.0
            }
        }

        impl MetadataElement for $name {
            const NAMESPACE: &'static str = NS_MD;
            const PREFIX: &'static str = PREFIX_MD;
            const LOCAL_NAME: &'static str = $local;

            fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
                expect_element::<Self>(element)?;
                Endpoint::decode(element).map(Self)
            }

            fn to_xml(&self) -> MetadataResult<XmlElement> {
                let mut element = Self::create_element();
                self.0.encode(&mut element);
                Ok(element)
            }
        }
    )+};
}

macro_rules! indexed_endpoint_types {
    ($($(#[$meta:meta])* $name:ident => $local:literal;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(IndexedEndpoint);

        impl $name {
            /// Creates the endpoint. Binding and location must be non-empty.
            pub fn new(
                binding: impl Into<String>,
                location: impl Into<String>,
                index: u16,
            ) -> MetadataResult<Self> {
                let endpoint = Endpoint::checked(&Self::qualified_name(), binding.into(), location.into())?;
                Ok(Self(IndexedEndpoint::new(endpoint, index)))
            }

            /// Wraps an already validated indexed endpoint.
            #[must_use]
            pub const fn from_indexed(endpoint: IndexedEndpoint) -> Self {
                Self(endpoint)
            }

            /// Sets the `isDefault` flag.
            #[must_use]
            pub fn with_default(self, is_default: bool) -> Self {
                Self(self.0.with_default(is_default))
            }

            /// Sets the response location.
            #[must_use]
            pub fn with_response_location(mut self, response_location: impl Into<String>) -> Self {
                self.0.endpoint = self.0.endpoint.with_response_location(response_location);
                self
            }

            /// Replaces the extension attributes.
            #[must_use]
            pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
                self.0.endpoint = self.0.endpoint.with_attributes(attributes);
                self
            }

            /// Returns the index.
            #[must_use]
            pub const fn index(&self) -> u16 {
                self.0.index
            }

            /// Returns the `isDefault` flag, if specified.
            #[must_use]
            pub const fn is_default(&self) -> Option<bool> {
                self.0.is_default
            }
        }

        impl Deref for $name {
            type Target = Endpoint;

            fn deref(&self) -> &Endpoint {
                &self.0.endpoint
            }
        }

        impl MetadataElement for $name {
            const NAMESPACE: &'static str = NS_MD;
            const PREFIX: &'static str = PREFIX_MD;
            const LOCAL_NAME: &'static str = $local;

            fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
                expect_element::<Self>(element)?;
                IndexedEndpoint::decode(element).map(Self)
            }

            fn to_xml(&self) -> MetadataResult<XmlElement> {
                let mut element = Self::create_element();
                self.0.encode(&mut element);
                Ok(element)
            }
        }
    )+};
}

endpoint_types! {
    /// `md:SingleSignOnService`.
    SingleSignOnService => "SingleSignOnService";
    /// `md:SingleLogoutService`.
    SingleLogoutService => "SingleLogoutService";
    /// `md:ManageNameIDService`.
    ManageNameIdService => "ManageNameIDService";
    /// `md:NameIDMappingService`.
    NameIdMappingService => "NameIDMappingService";
    /// `md:AssertionIDRequestService`.
    AssertionIdRequestService => "AssertionIDRequestService";
    /// `md:AttributeService`.
    AttributeService => "AttributeService";
    /// `md:AuthnQueryService`.
    AuthnQueryService => "AuthnQueryService";
    /// `md:AuthzService`.
    AuthzService => "AuthzService";
}

indexed_endpoint_types! {
    /// `md:ArtifactResolutionService`.
    ArtifactResolutionService => "ArtifactResolutionService";
    /// `md:AssertionConsumerService`.
    AssertionConsumerService => "AssertionConsumerService";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SamlBinding;

    const POST: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST";

    #[test]
    fn endpoint_requires_binding_and_location() {
        assert!(matches!(
            SingleSignOnService::new("", "https://idp.example.org/sso"),
            Err(MetadataError::EmptyRequiredValue { ref element, ref field })
                if element == "md:SingleSignOnService" && field == "Binding"
        ));
        assert!(SingleSignOnService::new(POST, "").is_err());
    }

    #[test]
    fn endpoint_encodes_attributes_in_order() {
        let attrs = ExtensibleAttributes::new().with("urn:x-test", "test:attr", "value").unwrap();
        let sso = SingleSignOnService::new(POST, "https://idp.example.org/sso")
            .unwrap()
            .with_response_location("https://idp.example.org/sso/response")
            .with_attributes(attrs);
        assert_eq!(
            sso.to_xml_string().unwrap(),
            r#"<md:SingleSignOnService xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:test="urn:x-test" Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="https://idp.example.org/sso" ResponseLocation="https://idp.example.org/sso/response" test:attr="value"/>"#
        );
        let decoded = SingleSignOnService::from_xml(&sso.to_xml().unwrap()).unwrap();
        assert_eq!(decoded, sso);
        assert_eq!(SamlBinding::from_uri(decoded.binding()), Some(SamlBinding::HttpPost));
    }

    #[test]
    fn wrong_element_name_is_rejected() {
        let slo = SingleLogoutService::new(POST, "https://idp.example.org/slo").unwrap();
        let err = SingleSignOnService::from_xml(&slo.to_xml().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnexpectedElementName { ref actual, ref expected }
                if actual.ends_with("}SingleLogoutService") && expected.ends_with("}SingleSignOnService")
        ));
    }

    #[test]
    fn indexed_endpoint_emits_index_and_explicit_default() {
        let acs = AssertionConsumerService::new(POST, "https://sp.example.org/acs", 0)
            .unwrap()
            .with_default(false);
        assert_eq!(
            acs.to_xml_string().unwrap(),
            r#"<md:AssertionConsumerService xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="https://sp.example.org/acs" index="0" isDefault="false"/>"#
        );

        let unspecified = AssertionConsumerService::new(POST, "https://sp.example.org/acs", 3).unwrap();
        let xml = unspecified.to_xml().unwrap();
        assert_eq!(xml.attribute("index"), Some("3"));
        assert!(!xml.has_attribute("isDefault"));
        assert_eq!(AssertionConsumerService::from_xml(&xml).unwrap().is_default(), None);
    }

    #[test]
    fn missing_index_fails_decode() {
        let xml = format!(
            r#"<md:ArtifactResolutionService xmlns:md="{NS_MD}" Binding="{POST}" Location="https://idp.example.org/ars"/>"#
        );
        let err = ArtifactResolutionService::from_xml_str(&xml).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::MissingRequiredAttribute { ref element, ref attribute }
                if element == "md:ArtifactResolutionService" && attribute == "index"
        ));
    }

    #[test]
    fn non_numeric_index_fails_decode() {
        for bad in ["one", "-1", "70000", ""] {
            let xml = format!(
                r#"<md:ArtifactResolutionService xmlns:md="{NS_MD}" Binding="{POST}" Location="l" index="{bad}"/>"#
            );
            assert!(matches!(
                ArtifactResolutionService::from_xml_str(&xml),
                Err(MetadataError::InvalidAttributeFormat { ref attribute, .. }) if attribute == "index"
            ));
        }
    }

    #[test]
    fn is_default_accepts_numeric_literals() {
        let xml = format!(
            r#"<md:AssertionConsumerService xmlns:md="{NS_MD}" Binding="{POST}" Location="l" index="1" isDefault="1"/>"#
        );
        let acs = AssertionConsumerService::from_xml_str(&xml).unwrap();
        assert_eq!(acs.is_default(), Some(true));
        assert_eq!(acs.to_xml().unwrap().attribute("isDefault"), Some("true"));
    }
}
