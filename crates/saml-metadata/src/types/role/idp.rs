use saml_xml::XmlElement;

use crate::codec::{append_strings, boolean_attribute, boolean_literal, extract_strings};
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{append_all, children_of, expect_element, require_count, required_children, MetadataElement};
use crate::error::MetadataResult;
use crate::registry::MetadataRegistry;
use crate::types::{
    AssertionIdRequestService, Attribute, NameIdMappingService, SingleSignOnService, NS_MD, PREFIX_MD,
};

use super::SsoDescriptorBase;

/// `md:IDPSSODescriptor`: an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdpSsoDescriptor {
    sso: SsoDescriptorBase,
    want_authn_requests_signed: Option<bool>,
    single_sign_on_services: Vec<SingleSignOnService>,
    name_id_mapping_services: Vec<NameIdMappingService>,
    assertion_id_request_services: Vec<AssertionIdRequestService>,
    attribute_profiles: Vec<String>,
    attributes: Vec<Attribute>,
}

impl IdpSsoDescriptor {
    /// Creates an IDP descriptor. At least one SSO service is required.
    pub fn new(
        sso: SsoDescriptorBase,
        single_sign_on_services: Vec<SingleSignOnService>,
    ) -> MetadataResult<Self> {
        require_count::<SingleSignOnService, _>(&Self::qualified_name(), &single_sign_on_services, 1)?;
        Ok(Self {
            sso,
            want_authn_requests_signed: None,
            single_sign_on_services,
            name_id_mapping_services: Vec::new(),
            assertion_id_request_services: Vec::new(),
            attribute_profiles: Vec::new(),
            attributes: Vec::new(),
        })
    }

    /// Sets WantAuthnRequestsSigned.
    #[must_use]
    pub const fn with_want_authn_requests_signed(mut self, want: bool) -> Self {
        self.want_authn_requests_signed = Some(want);
        self
    }

    /// Adds a name ID mapping service.
    #[must_use]
    pub fn with_name_id_mapping_service(mut self, service: NameIdMappingService) -> Self {
        self.name_id_mapping_services.push(service);
        self
    }

    /// Adds an assertion ID request service.
    #[must_use]
    pub fn with_assertion_id_request_service(mut self, service: AssertionIdRequestService) -> Self {
        self.assertion_id_request_services.push(service);
        self
    }

    /// Adds a supported attribute profile URI.
    #[must_use]
    pub fn with_attribute_profile(mut self, profile: impl Into<String>) -> Self {
        self.attribute_profiles.push(profile.into());
        self
    }

    /// Adds an attribute the IDP is willing to assert.
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Returns the SSO fields.
    #[must_use]
    pub const fn sso(&self) -> &SsoDescriptorBase {
        &self.sso
    }

    /// Returns WantAuthnRequestsSigned as written; `None` when absent.
    #[must_use]
    pub const fn want_authn_requests_signed(&self) -> Option<bool> {
        self.want_authn_requests_signed
    }

    /// Returns the SSO services.
    #[must_use]
    pub fn single_sign_on_services(&self) -> &[SingleSignOnService] {
        &self.single_sign_on_services
    }

    /// Returns the first SSO service with the given binding.
    #[must_use]
    pub fn single_sign_on_service(&self, binding: &str) -> Option<&SingleSignOnService> {
        self.single_sign_on_services
            .iter()
            .find(|service| service.binding() == binding)
    }

    /// Returns the name ID mapping services.
    #[must_use]
    pub fn name_id_mapping_services(&self) -> &[NameIdMappingService] {
        &self.name_id_mapping_services
    }

    /// Returns the assertion ID request services.
    #[must_use]
    pub fn assertion_id_request_services(&self) -> &[AssertionIdRequestService] {
        &self.assertion_id_request_services
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

impl DocumentFields for IdpSsoDescriptor {
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

impl MetadataElement for IdpSsoDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "IDPSSODescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Ok(Self {
            sso: SsoDescriptorBase::decode(element, registry)?,
            want_authn_requests_signed: boolean_attribute(element, "WantAuthnRequestsSigned")?,
            single_sign_on_services: required_children(element, registry, 1)?,
            name_id_mapping_services: children_of(element, registry)?,
            assertion_id_request_services: children_of(element, registry)?,
            attribute_profiles: extract_strings(element, NS_MD, "AttributeProfile"),
            attributes: children_of(element, registry)?,
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.sso.encode(&mut e)?;
        if let Some(want) = self.want_authn_requests_signed {
            e.set_attribute("WantAuthnRequestsSigned", boolean_literal(want));
        }
        append_all(&mut e, &self.single_sign_on_services)?;
        append_all(&mut e, &self.name_id_mapping_services)?;
        append_all(&mut e, &self.assertion_id_request_services)?;
        append_strings(&mut e, NS_MD, "md:AttributeProfile", &self.attribute_profiles);
        append_all(&mut e, &self.attributes)?;
        self.sso.role.finish(&mut e)?;
        Ok(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use crate::types::{RoleDescriptorBase, SamlBinding};

    fn sso_service() -> SingleSignOnService {
        SingleSignOnService::new(SamlBinding::HttpRedirect.uri(), "https://idp.example.org/sso").unwrap()
    }

    #[test]
    fn requires_a_single_sign_on_service() {
        let err = IdpSsoDescriptor::new(SsoDescriptorBase::new(RoleDescriptorBase::saml20()), Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::MissingRequiredChild { ref child, min_count: 1, .. } if child == "md:SingleSignOnService"
        ));
    }

    #[test]
    fn encodes_flag_after_base_attributes() {
        let idp = IdpSsoDescriptor::new(SsoDescriptorBase::new(RoleDescriptorBase::saml20()), vec![sso_service()])
            .unwrap()
            .with_want_authn_requests_signed(true)
            .with_id("_idp");
        assert_eq!(
            idp.to_xml_string().unwrap(),
            r#"<md:IDPSSODescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" ID="_idp" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol" WantAuthnRequestsSigned="true"><md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="https://idp.example.org/sso"/></md:IDPSSODescriptor>"#
        );
    }

    #[test]
    fn decode_without_sso_service_fails() {
        let xml = r#"<md:IDPSSODescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol"/>"#;
        assert!(matches!(
            IdpSsoDescriptor::from_xml_str(xml),
            Err(MetadataError::MissingRequiredChild { .. })
        ));
    }

    #[test]
    fn round_trip_keeps_children_in_schema_order() {
        let xml = r#"<md:IDPSSODescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol" WantAuthnRequestsSigned="false"><md:SingleLogoutService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="https://idp.example.org/slo"/><md:NameIDFormat>urn:oasis:names:tc:SAML:2.0:nameid-format:persistent</md:NameIDFormat><md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="https://idp.example.org/sso"/><md:AttributeProfile>urn:oasis:names:tc:SAML:2.0:profiles:attribute:basic</md:AttributeProfile><saml:Attribute xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" Name="mail"/></md:IDPSSODescriptor>"#;
        let idp = IdpSsoDescriptor::from_xml_str(xml).unwrap();
        assert_eq!(idp.want_authn_requests_signed(), Some(false));
        assert_eq!(idp.sso().single_logout_services().len(), 1);
        assert_eq!(idp.sso().name_id_formats().len(), 1);
        assert_eq!(idp.attributes()[0].name(), "mail");
        assert!(idp
            .single_sign_on_service(SamlBinding::HttpRedirect.uri())
            .is_some());
        assert_eq!(idp.to_xml_string().unwrap(), xml);
    }
}
