//! Role descriptors.
//!
//! The `md:RoleDescriptor` substitution group is modelled as the closed
//! [`RoleDescriptor`] enum. Every variant embeds a [`RoleDescriptorBase`]
//! with the fields common to all roles; the SSO roles additionally embed an
//! [`SsoDescriptorBase`]. Elements in role position that no decoder is
//! registered for become [`UnknownRoleDescriptor`] and round-trip verbatim.

mod authority;
mod idp;
mod sp;
mod unknown;

pub use authority::{AttributeAuthorityDescriptor, AuthnAuthorityDescriptor, PdpDescriptor};
pub use idp::IdpSsoDescriptor;
pub use sp::SpSsoDescriptor;
pub use unknown::UnknownRoleDescriptor;

use saml_xml::XmlElement;

use crate::codec::{append_strings, extract_strings, join_uri_list, require_non_empty, required_attribute, split_uri_list};
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{append_all, children_of, optional_child, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::extensible::ExtensibleAttributes;
use crate::registry::MetadataRegistry;

use super::{
    ArtifactResolutionService, ContactPerson, KeyDescriptor, ManageNameIdService, Organization,
    SingleLogoutService, NS_MD, SAML20_PROTOCOL,
};

/// Fields common to every role descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDescriptorBase {
    document: MetadataDocument,
    protocol_support: Vec<String>,
    error_url: Option<String>,
    key_descriptors: Vec<KeyDescriptor>,
    organization: Option<Organization>,
    contacts: Vec<ContactPerson>,
    attributes: ExtensibleAttributes,
}

impl RoleDescriptorBase {
    /// Creates a base supporting the given protocols. The list must be non-empty.
    pub fn new<I, S>(protocol_support: I) -> MetadataResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::checked(
            "md:RoleDescriptor",
            protocol_support.into_iter().map(Into::into).collect(),
        )
    }

    /// Creates a base supporting only the SAML 2.0 protocol.
    #[must_use]
    pub fn saml20() -> Self {
        Self {
            document: MetadataDocument::default(),
            protocol_support: vec![SAML20_PROTOCOL.to_string()],
            error_url: None,
            key_descriptors: Vec::new(),
            organization: None,
            contacts: Vec::new(),
            attributes: ExtensibleAttributes::new(),
        }
    }

    fn checked(element: &str, protocol_support: Vec<String>) -> MetadataResult<Self> {
        if protocol_support.is_empty() {
            return Err(MetadataError::empty_value(element, "protocolSupportEnumeration"));
        }
        for protocol in &protocol_support {
            require_non_empty(element, "protocolSupportEnumeration", protocol)?;
        }
        Ok(Self {
            protocol_support,
            ..Self::saml20()
        })
    }

    /// Sets the error URL.
    #[must_use]
    pub fn with_error_url(mut self, error_url: impl Into<String>) -> Self {
        self.error_url = Some(error_url.into());
        self
    }

    /// Adds a key descriptor.
    #[must_use]
    pub fn with_key_descriptor(mut self, key_descriptor: KeyDescriptor) -> Self {
        self.key_descriptors.push(key_descriptor);
        self
    }

    /// Sets the organization.
    #[must_use]
    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Adds a contact person.
    #[must_use]
    pub fn with_contact(mut self, contact: ContactPerson) -> Self {
        self.contacts.push(contact);
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the supported protocol URIs.
    #[must_use]
    pub fn protocol_support(&self) -> &[String] {
        &self.protocol_support
    }

    /// Returns true if `protocol` is listed in protocolSupportEnumeration.
    #[must_use]
    pub fn supports_protocol(&self, protocol: &str) -> bool {
        self.protocol_support.iter().any(|p| p == protocol)
    }

    /// Returns the error URL.
    #[must_use]
    pub fn error_url(&self) -> Option<&str> {
        self.error_url.as_deref()
    }

    /// Returns the key descriptors.
    #[must_use]
    pub fn key_descriptors(&self) -> &[KeyDescriptor] {
        &self.key_descriptors
    }

    /// Returns the organization.
    #[must_use]
    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    /// Returns the contact persons.
    #[must_use]
    pub fn contacts(&self) -> &[ContactPerson] {
        &self.contacts
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }

    pub(crate) fn decode(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        let protocols = split_uri_list(required_attribute(element, "protocolSupportEnumeration")?);
        let base = Self::checked(&element.qualified_name(), protocols)?;
        Ok(Self {
            document: MetadataDocument::decode(element, registry)?,
            error_url: element.attribute("errorURL").map(str::to_string),
            key_descriptors: children_of::<KeyDescriptor>(element, registry)?,
            organization: optional_child::<Organization>(element, registry)?,
            contacts: children_of::<ContactPerson>(element, registry)?,
            attributes: ExtensibleAttributes::from_xml(element),
            ..base
        })
    }

    /// Writes the common attributes and leading children.
    pub(crate) fn encode(&self, element: &mut XmlElement) -> MetadataResult<()> {
        self.document.encode_attributes(element)?;
        element.set_attribute("protocolSupportEnumeration", join_uri_list(&self.protocol_support));
        if let Some(error_url) = &self.error_url {
            element.set_attribute("errorURL", error_url.as_str());
        }
        self.attributes.apply_to(element);

        self.document.encode_extensions(element)?;
        append_all(element, &self.key_descriptors)?;
        if let Some(organization) = &self.organization {
            organization.append_to(element)?;
        }
        append_all(element, &self.contacts)
    }

    pub(crate) fn finish(&self, element: &mut XmlElement) -> MetadataResult<()> {
        self.document.finish(element)
    }
}

impl DocumentFields for RoleDescriptorBase {
    fn document(&self) -> &MetadataDocument {
        &self.document
    }

    fn document_mut(&mut self) -> &mut MetadataDocument {
        &mut self.document
    }

    fn element_name(&self) -> String {
        "md:RoleDescriptor".to_string()
    }
}

/// Fields shared by the IDP and SP SSO descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoDescriptorBase {
    role: RoleDescriptorBase,
    artifact_resolution_services: Vec<ArtifactResolutionService>,
    single_logout_services: Vec<SingleLogoutService>,
    manage_name_id_services: Vec<ManageNameIdService>,
    name_id_formats: Vec<String>,
}

impl SsoDescriptorBase {
    /// Wraps the common role fields.
    #[must_use]
    pub fn new(role: RoleDescriptorBase) -> Self {
        Self {
            role,
            artifact_resolution_services: Vec::new(),
            single_logout_services: Vec::new(),
            manage_name_id_services: Vec::new(),
            name_id_formats: Vec::new(),
        }
    }

    /// Adds an artifact resolution service.
    #[must_use]
    pub fn with_artifact_resolution_service(mut self, service: ArtifactResolutionService) -> Self {
        self.artifact_resolution_services.push(service);
        self
    }

    /// Adds a single logout service.
    #[must_use]
    pub fn with_single_logout_service(mut self, service: SingleLogoutService) -> Self {
        self.single_logout_services.push(service);
        self
    }

    /// Adds a manage name ID service.
    #[must_use]
    pub fn with_manage_name_id_service(mut self, service: ManageNameIdService) -> Self {
        self.manage_name_id_services.push(service);
        self
    }

    /// Adds a supported name ID format URI.
    pub fn with_name_id_format(mut self, format: impl Into<String>) -> MetadataResult<Self> {
        let format = format.into();
        require_non_empty("md:SSODescriptor", "md:NameIDFormat", &format)?;
        self.name_id_formats.push(format);
        Ok(self)
    }

    /// Returns the common role fields.
    #[must_use]
    pub const fn role(&self) -> &RoleDescriptorBase {
        &self.role
    }

    /// Returns the artifact resolution services.
    #[must_use]
    pub fn artifact_resolution_services(&self) -> &[ArtifactResolutionService] {
        &self.artifact_resolution_services
    }

    /// Returns the single logout services.
    #[must_use]
    pub fn single_logout_services(&self) -> &[SingleLogoutService] {
        &self.single_logout_services
    }

    /// Returns the manage name ID services.
    #[must_use]
    pub fn manage_name_id_services(&self) -> &[ManageNameIdService] {
        &self.manage_name_id_services
    }

    /// Returns the supported name ID formats.
    #[must_use]
    pub fn name_id_formats(&self) -> &[String] {
        &self.name_id_formats
    }

    pub(crate) fn decode(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        Ok(Self {
            role: RoleDescriptorBase::decode(element, registry)?,
            artifact_resolution_services: children_of(element, registry)?,
            single_logout_services: children_of(element, registry)?,
            manage_name_id_services: children_of(element, registry)?,
            name_id_formats: decode_name_id_formats(element)?,
        })
    }

    pub(crate) fn encode(&self, element: &mut XmlElement) -> MetadataResult<()> {
        self.role.encode(element)?;
        append_all(element, &self.artifact_resolution_services)?;
        append_all(element, &self.single_logout_services)?;
        append_all(element, &self.manage_name_id_services)?;
        encode_name_id_formats(element, &self.name_id_formats);
        Ok(())
    }
}

/// Decodes the `md:NameIDFormat` children; each value must be non-empty.
pub(crate) fn decode_name_id_formats(element: &XmlElement) -> MetadataResult<Vec<String>> {
    let formats = extract_strings(element, NS_MD, "NameIDFormat");
    for format in &formats {
        require_non_empty(&element.qualified_name(), "md:NameIDFormat", format)?;
    }
    Ok(formats)
}

pub(crate) fn encode_name_id_formats(element: &mut XmlElement, formats: &[String]) {
    append_strings(element, NS_MD, "md:NameIDFormat", formats);
}

/// A role descriptor of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleDescriptor {
    /// `md:IDPSSODescriptor`.
    IdpSso(IdpSsoDescriptor),
    /// `md:SPSSODescriptor`.
    SpSso(SpSsoDescriptor),
    /// `md:AuthnAuthorityDescriptor`.
    AuthnAuthority(AuthnAuthorityDescriptor),
    /// `md:AttributeAuthorityDescriptor`.
    AttributeAuthority(AttributeAuthorityDescriptor),
    /// `md:PDPDescriptor`.
    Pdp(PdpDescriptor),
    /// An element without a registered decoder, kept verbatim.
    Unknown(UnknownRoleDescriptor),
}

impl RoleDescriptor {
    /// Encodes the descriptor.
    pub fn to_xml(&self) -> MetadataResult<XmlElement> {
        match self {
            Self::IdpSso(role) => role.to_xml(),
            Self::SpSso(role) => role.to_xml(),
            Self::AuthnAuthority(role) => role.to_xml(),
            Self::AttributeAuthority(role) => role.to_xml(),
            Self::Pdp(role) => role.to_xml(),
            Self::Unknown(role) => Ok(role.to_xml()),
        }
    }

    /// Encodes the descriptor under `parent`.
    pub fn append_to<'a>(&self, parent: &'a mut XmlElement) -> MetadataResult<&'a mut XmlElement> {
        Ok(parent.append_child(self.to_xml()?))
    }

    /// Returns the element's local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        match self {
            Self::IdpSso(_) => IdpSsoDescriptor::LOCAL_NAME,
            Self::SpSso(_) => SpSsoDescriptor::LOCAL_NAME,
            Self::AuthnAuthority(_) => AuthnAuthorityDescriptor::LOCAL_NAME,
            Self::AttributeAuthority(_) => AttributeAuthorityDescriptor::LOCAL_NAME,
            Self::Pdp(_) => PdpDescriptor::LOCAL_NAME,
            Self::Unknown(role) => role.element().local_name(),
        }
    }

    /// Returns the common role fields; `None` for unknown descriptors.
    #[must_use]
    pub fn base(&self) -> Option<&RoleDescriptorBase> {
        match self {
            Self::IdpSso(role) => Some(role.sso().role()),
            Self::SpSso(role) => Some(role.sso().role()),
            Self::AuthnAuthority(role) => Some(role.role()),
            Self::AttributeAuthority(role) => Some(role.role()),
            Self::Pdp(role) => Some(role.role()),
            Self::Unknown(_) => None,
        }
    }

    /// Returns the IDP SSO descriptor, if this is one.
    #[must_use]
    pub const fn as_idp_sso(&self) -> Option<&IdpSsoDescriptor> {
        match self {
            Self::IdpSso(role) => Some(role),
            _ => None,
        }
    }

    /// Returns the SP SSO descriptor, if this is one.
    #[must_use]
    pub const fn as_sp_sso(&self) -> Option<&SpSsoDescriptor> {
        match self {
            Self::SpSso(role) => Some(role),
            _ => None,
        }
    }

    /// Returns true if the descriptor was kept verbatim.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

macro_rules! role_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {$(
        impl From<$ty> for RoleDescriptor {
            fn from(role: $ty) -> Self {
                Self::$variant(role)
            }
        }
    )+};
}

role_from! {
    IdpSso(IdpSsoDescriptor),
    SpSso(SpSsoDescriptor),
    AuthnAuthority(AuthnAuthorityDescriptor),
    AttributeAuthority(AttributeAuthorityDescriptor),
    Pdp(PdpDescriptor),
    Unknown(UnknownRoleDescriptor),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_support_must_be_non_empty() {
        assert!(matches!(
            RoleDescriptorBase::new(Vec::<String>::new()),
            Err(MetadataError::EmptyRequiredValue { ref field, .. }) if field == "protocolSupportEnumeration"
        ));
        assert!(RoleDescriptorBase::new([""]).is_err());
        let base = RoleDescriptorBase::new(["urn:a", "urn:b"]).unwrap();
        assert!(base.supports_protocol("urn:b"));
        assert!(!base.supports_protocol(SAML20_PROTOCOL));
    }

    #[test]
    fn whitespace_only_protocol_list_fails_decode() {
        let xml = r#"<md:PDPDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" protocolSupportEnumeration="   "/>"#;
        let element = XmlElement::parse(xml).unwrap();
        assert!(matches!(
            RoleDescriptorBase::decode(&element, MetadataRegistry::global()),
            Err(MetadataError::EmptyRequiredValue { .. })
        ));
    }

    #[test]
    fn two_organizations_are_rejected() {
        let xml = r#"<md:PDPDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol"><md:Organization/><md:Organization/></md:PDPDescriptor>"#;
        let element = XmlElement::parse(xml).unwrap();
        assert!(matches!(
            RoleDescriptorBase::decode(&element, MetadataRegistry::global()),
            Err(MetadataError::TooManyChildren { ref child, .. }) if child == "md:Organization"
        ));
    }

    #[test]
    fn empty_name_id_format_is_rejected() {
        assert!(SsoDescriptorBase::new(RoleDescriptorBase::saml20())
            .with_name_id_format("")
            .is_err());
    }
}
