use saml_xml::XmlElement;

use crate::codec::{boolean_attribute, boolean_literal};
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{append_all, children_of, expect_element, require_count, required_children, MetadataElement};
use crate::error::MetadataResult;
use crate::registry::MetadataRegistry;
use crate::types::{AssertionConsumerService, AttributeConsumingService, NS_MD, PREFIX_MD};

use super::SsoDescriptorBase;

/// `md:SPSSODescriptor`: a service provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpSsoDescriptor {
    sso: SsoDescriptorBase,
    authn_requests_signed: Option<bool>,
    want_assertions_signed: Option<bool>,
    assertion_consumer_services: Vec<AssertionConsumerService>,
    attribute_consuming_services: Vec<AttributeConsumingService>,
}

impl SpSsoDescriptor {
    /// Creates an SP descriptor. At least one assertion consumer service is required.
    pub fn new(
        sso: SsoDescriptorBase,
        assertion_consumer_services: Vec<AssertionConsumerService>,
    ) -> MetadataResult<Self> {
        require_count::<AssertionConsumerService, _>(
            &Self::qualified_name(),
            &assertion_consumer_services,
            1,
        )?;
        Ok(Self {
            sso,
            authn_requests_signed: None,
            want_assertions_signed: None,
            assertion_consumer_services,
            attribute_consuming_services: Vec::new(),
        })
    }

    /// Sets AuthnRequestsSigned.
    #[must_use]
    pub const fn with_authn_requests_signed(mut self, signed: bool) -> Self {
        self.authn_requests_signed = Some(signed);
        self
    }

    /// Sets WantAssertionsSigned.
    #[must_use]
    pub const fn with_want_assertions_signed(mut self, want: bool) -> Self {
        self.want_assertions_signed = Some(want);
        self
    }

    /// Adds an attribute consuming service.
    #[must_use]
    pub fn with_attribute_consuming_service(mut self, service: AttributeConsumingService) -> Self {
        self.attribute_consuming_services.push(service);
        self
    }

    /// Returns the SSO fields.
    #[must_use]
    pub const fn sso(&self) -> &SsoDescriptorBase {
        &self.sso
    }

    /// Returns AuthnRequestsSigned as written.
    #[must_use]
    pub const fn authn_requests_signed(&self) -> Option<bool> {
        self.authn_requests_signed
    }

    /// Returns WantAssertionsSigned as written.
    #[must_use]
    pub const fn want_assertions_signed(&self) -> Option<bool> {
        self.want_assertions_signed
    }

    /// Returns the assertion consumer services.
    #[must_use]
    pub fn assertion_consumer_services(&self) -> &[AssertionConsumerService] {
        &self.assertion_consumer_services
    }

    /// Returns the service flagged `isDefault="true"`, else the first one not
    /// flagged false, else the first one.
    #[must_use]
    pub fn default_assertion_consumer_service(&self) -> Option<&AssertionConsumerService> {
        let services = &self.assertion_consumer_services;
        services
            .iter()
            .find(|s| s.is_default() == Some(true))
            .or_else(|| services.iter().find(|s| s.is_default().is_none()))
            .or_else(|| services.first())
    }

    /// Returns the attribute consuming services.
    #[must_use]
    pub fn attribute_consuming_services(&self) -> &[AttributeConsumingService] {
        &self.attribute_consuming_services
    }
}

impl DocumentFields for SpSsoDescriptor {
    fn document(&self) -> &MetadataDocument {
        &self.sso.role.document
    }

    fn document_mut(&mut self) -> &mut MetadataDocument {
        &mut self.sso.role.document
    }

    fn element_name(&self) -> String {
        Self::qualified_name()
    }
}

impl MetadataElement for SpSsoDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "SPSSODescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            sso: SsoDescriptorBase::decode(element, registry)?,
            authn_requests_signed: boolean_attribute(element, "AuthnRequestsSigned")?,
            want_assertions_signed: boolean_attribute(element, "WantAssertionsSigned")?,
            assertion_consumer_services: required_children(element, registry, 1)?,
            attribute_consuming_services: children_of(element, registry)?,
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.sso.encode(&mut e)?;
        if let Some(signed) = self.authn_requests_signed {
            e.set_attribute("AuthnRequestsSigned", boolean_literal(signed));
        }
        if let Some(want) = self.want_assertions_signed {
            e.set_attribute("WantAssertionsSigned", boolean_literal(want));
        }
        append_all(&mut e, &self.assertion_consumer_services)?;
        append_all(&mut e, &self.attribute_consuming_services)?;
        self.sso.role.finish(&mut e)?;
        Ok(e)
    }
}
