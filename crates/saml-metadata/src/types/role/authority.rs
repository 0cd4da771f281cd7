//! Authority and policy decision point roles.

use saml_xml::XmlElement;

use crate::codec::{append_strings, extract_strings};
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{append_all, children_of, expect_element, require_count, required_children, MetadataElement};
use crate::error::MetadataResult;
use crate::registry::MetadataRegistry;
use crate::types::{
    AssertionIdRequestService, Attribute, AttributeService, AuthnQueryService, AuthzService, NS_MD,
    PREFIX_MD,
};

use super::{decode_name_id_formats, encode_name_id_formats, RoleDescriptorBase};

/// `md:AuthnAuthorityDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthnAuthorityDescriptor {
    role: RoleDescriptorBase,
    authn_query_services: Vec<AuthnQueryService>,
    assertion_id_request_services: Vec<AssertionIdRequestService>,
    name_id_formats: Vec<String>,
}

impl AuthnAuthorityDescriptor {
    /// Creates the descriptor. At least one authn query service is required.
    pub fn new(
        role: RoleDescriptorBase,
        authn_query_services: Vec<AuthnQueryService>,
    ) -> MetadataResult<Self> {
        require_count::<AuthnQueryService, _>(&Self::qualified_name(), &authn_query_services, 1)?;
        Ok(Self {
            role,
            authn_query_services,
            assertion_id_request_services: Vec::new(),
            name_id_formats: Vec::new(),
        })
    }

    /// Adds an assertion ID request service.
    #[must_use]
    pub fn with_assertion_id_request_service(mut self, service: AssertionIdRequestService) -> Self {
        self.assertion_id_request_services.push(service);
        self
    }

    /// Adds a supported name ID format.
    pub fn with_name_id_format(mut self, format: impl Into<String>) -> MetadataResult<Self> {
        let format = format.into();
        crate::codec::require_non_empty(&Self::qualified_name(), "md:NameIDFormat", &format)?;
        self.name_id_formats.push(format);
        Ok(self)
    }

    /// Returns the common role fields.
    #[must_use]
    pub const fn role(&self) -> &RoleDescriptorBase {
        &self.role
    }

    /// Returns the authn query services.
    #[must_use]
    pub fn authn_query_services(&self) -> &[AuthnQueryService] {
        &self.authn_query_services
    }

    /// Returns the assertion ID request services.
    #[must_use]
    pub fn assertion_id_request_services(&self) -> &[AssertionIdRequestService] {
        &self.assertion_id_request_services
    }

    /// Returns the supported name ID formats.
    #[must_use]
    pub fn name_id_formats(&self) -> &[String] {
        &self.name_id_formats
    }
}

impl MetadataElement for AuthnAuthorityDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "AuthnAuthorityDescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            role: RoleDescriptorBase::decode(element, registry)?,
            authn_query_services: required_children(element, registry, 1)?,
            assertion_id_request_services: children_of(element, registry)?,
            name_id_formats: decode_name_id_formats(element)?,
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.role.encode(&mut e)?;
        append_all(&mut e, &self.authn_query_services)?;
        append_all(&mut e, &self.assertion_id_request_services)?;
        encode_name_id_formats(&mut e, &self.name_id_formats);
        self.role.finish(&mut e)?;
        Ok(e)
    }
}

/// `md:AttributeAuthorityDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAuthorityDescriptor {
    role: RoleDescriptorBase,
    attribute_services: Vec<AttributeService>,
    assertion_id_request_services: Vec<AssertionIdRequestService>,
    name_id_formats: Vec<String>,
    attribute_profiles: Vec<String>,
    attributes: Vec<Attribute>,
}

impl AttributeAuthorityDescriptor {
    /// Creates the descriptor. At least one attribute service is required.
    pub fn new(role: RoleDescriptorBase, attribute_services: Vec<AttributeService>) -> MetadataResult<Self> {
        require_count::<AttributeService, _>(&Self::qualified_name(), &attribute_services, 1)?;
        Ok(Self {
            role,
            attribute_services,
            assertion_id_request_services: Vec::new(),
            name_id_formats: Vec::new(),
            attribute_profiles: Vec::new(),
            attributes: Vec::new(),
        })
    }

    /// Adds an assertion ID request service.
    #[must_use]
    pub fn with_assertion_id_request_service(mut self, service: AssertionIdRequestService) -> Self {
        self.assertion_id_request_services.push(service);
        self
    }

    /// Adds a supported name ID format.
    pub fn with_name_id_format(mut self, format: impl Into<String>) -> MetadataResult<Self> {
        let format = format.into();
        crate::codec::require_non_empty(&Self::qualified_name(), "md:NameIDFormat", &format)?;
        self.name_id_formats.push(format);
        Ok(self)
    }

    /// Adds a supported attribute profile.
    #[must_use]
    pub fn with_attribute_profile(mut self, profile: impl Into<String>) -> Self {
        self.attribute_profiles.push(profile.into());
        self
    }

    /// Adds an attribute the authority can provide.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Returns the common role fields.
    #[must_use]
    pub const fn role(&self) -> &RoleDescriptorBase {
        &self.role
    }

    /// Returns the attribute services.
    #[must_use]
    pub fn attribute_services(&self) -> &[AttributeService] {
        &self.attribute_services
    }

    /// Returns the assertion ID request services.
    #[must_use]
    pub fn assertion_id_request_services(&self) -> &[AssertionIdRequestService] {
        &self.assertion_id_request_services
    }

    /// Returns the supported name ID formats.
    #[must_use]
    pub fn name_id_formats(&self) -> &[String] {
        &self.name_id_formats
    }

    /// Returns the attribute profiles.
    #[must_use]
    pub fn attribute_profiles(&self) -> &[String] {
        &self.attribute_profiles
    }

    /// Returns the attributes.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl MetadataElement for AttributeAuthorityDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "AttributeAuthorityDescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            role: RoleDescriptorBase::decode(element, registry)?,
            attribute_services: required_children(element, registry, 1)?,
            assertion_id_request_services: children_of(element, registry)?,
            name_id_formats: decode_name_id_formats(element)?,
            attribute_profiles: extract_strings(element, NS_MD, "AttributeProfile"),
            attributes: children_of(element, registry)?,
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.role.encode(&mut e)?;
        append_all(&mut e, &self.attribute_services)?;
        append_all(&mut e, &self.assertion_id_request_services)?;
        encode_name_id_formats(&mut e, &self.name_id_formats);
        append_strings(&mut e, NS_MD, "md:AttributeProfile", &self.attribute_profiles);
        append_all(&mut e, &self.attributes)?;
        self.role.finish(&mut e)?;
        Ok(e)
    }
}

/// `md:PDPDescriptor`: a policy decision point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdpDescriptor {
    role: RoleDescriptorBase,
    authz_services: Vec<AuthzService>,
    assertion_id_request_services: Vec<AssertionIdRequestService>,
    name_id_formats: Vec<String>,
}

impl PdpDescriptor {
    /// Creates the descriptor. At least one authz service is required.
    pub fn new(role: RoleDescriptorBase, authz_services: Vec<AuthzService>) -> MetadataResult<Self> {
        require_count::<AuthzService, _>(&Self::qualified_name(), &authz_services, 1)?;
        Ok(Self {
            role,
            authz_services,
            assertion_id_request_services: Vec::new(),
            name_id_formats: Vec::new(),
        })
    }

    /// Adds an assertion ID request service.
    #[must_use]
    pub fn with_assertion_id_request_service(mut self, service: AssertionIdRequestService) -> Self {
        self.assertion_id_request_services.push(service);
        self
    }

    /// Adds a supported name ID format.
    pub fn with_name_id_format(mut self, format: impl Into<String>) -> MetadataResult<Self> {
        let format = format.into();
        crate::codec::require_non_empty(&Self::qualified_name(), "md:NameIDFormat", &format)?;
        self.name_id_formats.push(format);
        Ok(self)
    }

    /// Returns the common role fields.
    #[must_use]
    pub const fn role(&self) -> &RoleDescriptorBase {
        &self.role
    }

    /// Returns the authz services.
    #[must_use]
    pub fn authz_services(&self) -> &[AuthzService] {
        &self.authz_services
    }

    /// Returns the assertion ID request services.
    #[must_use]
    pub fn assertion_id_request_services(&self) -> &[AssertionIdRequestService] {
        &self.assertion_id_request_services
    }

    /// Returns the supported name ID formats.
    #[must_use]
    pub fn name_id_formats(&self) -> &[String] {
        &self.name_id_formats
    }
}

impl MetadataElement for PdpDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "PDPDescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            role: RoleDescriptorBase::decode(element, registry)?,
            authz_services: required_children(element, registry, 1)?,
            assertion_id_request_services: children_of(element, registry)?,
            name_id_formats: decode_name_id_formats(element)?,
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.role.encode(&mut e)?;
        append_all(&mut e, &self.authz_services)?;
        append_all(&mut e, &self.assertion_id_request_services)?;
        encode_name_id_formats(&mut e, &self.name_id_formats);
        self.role.finish(&mut e)?;
        Ok(e)
    }
}

macro_rules! role_document_fields {
    ($($ty:ty),+) => {$(
        impl DocumentFields for $ty {
            fn document(&self) -> &MetadataDocument {
                &self.role.document
            }

            fn document_mut(&mut self) -> &mut MetadataDocument {
                &mut self.role.document
            }

            fn element_name(&self) -> String {
                <$ty as MetadataElement>::qualified_name()
            }
        }
    )+};
}

role_document_fields!(AuthnAuthorityDescriptor, AttributeAuthorityDescriptor, PdpDescriptor);
