//! `md:EntityDescriptor`: the metadata of one SAML entity.

use saml_xml::XmlElement;
use tracing::debug;

use crate::codec::{require_non_empty, required_attribute};
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{append_all, expect_element, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::extensible::ExtensibleAttributes;
use crate::registry::MetadataRegistry;

use super::{
    AdditionalMetadataLocation, AffiliationDescriptor, ContactPerson, IdpSsoDescriptor, Organization,
    RoleDescriptor, SpSsoDescriptor, NS_DS, NS_MD, PREFIX_MD,
};

/// `md:EntityDescriptor`.
///
/// Holds either one or more role descriptors or a single affiliation, never
/// both and never neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    document: MetadataDocument,
    entity_id: String,
    roles: Vec<RoleDescriptor>,
    affiliation: Option<AffiliationDescriptor>,
    organization: Option<Organization>,
    contacts: Vec<ContactPerson>,
    additional_metadata_locations: Vec<AdditionalMetadataLocation>,
    attributes: ExtensibleAttributes,
}

impl EntityDescriptor {
    /// Creates an entity from its ID and either roles or an affiliation.
    pub fn new(
        entity_id: impl Into<String>,
        roles: Vec<RoleDescriptor>,
        affiliation: Option<AffiliationDescriptor>,
    ) -> MetadataResult<Self> {
        let entity_id = entity_id.into();
        require_non_empty(&Self::qualified_name(), "entityID", &entity_id)?;
        let has_roles = !roles.is_empty();
        let has_affiliation = affiliation.is_some();
        if has_roles == has_affiliation {
            return Err(MetadataError::InvalidRoleComposition {
                has_roles,
                has_affiliation,
            });
        }
        Ok(Self {
            document: MetadataDocument::default(),
            entity_id,
            roles,
            affiliation,
            organization: None,
            contacts: Vec::new(),
            additional_metadata_locations: Vec::new(),
            attributes: ExtensibleAttributes::new(),
        })
    }

    /// Creates an entity with role descriptors.
    pub fn with_roles(entity_id: impl Into<String>, roles: Vec<RoleDescriptor>) -> MetadataResult<Self> {
        Self::new(entity_id, roles, None)
    }

    /// Creates an entity describing an affiliation.
    pub fn with_affiliation(
        entity_id: impl Into<String>,
        affiliation: AffiliationDescriptor,
    ) -> MetadataResult<Self> {
        Self::new(entity_id, Vec::new(), Some(affiliation))
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

    /// Adds an additional metadata location.
    #[must_use]
    pub fn with_additional_metadata_location(mut self, location: AdditionalMetadataLocation) -> Self {
        self.additional_metadata_locations.push(location);
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the entity ID.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Returns the role descriptors in document order.
    #[must_use]
    pub fn roles(&self) -> &[RoleDescriptor] {
        &self.roles
    }

    /// Returns the affiliation.
    #[must_use]
    pub fn affiliation(&self) -> Option<&AffiliationDescriptor> {
        self.affiliation.as_ref()
    }

    /// Returns the first IDP SSO descriptor.
    #[must_use]
    pub fn idp_sso_descriptor(&self) -> Option<&IdpSsoDescriptor> {
        self.roles.iter().find_map(RoleDescriptor::as_idp_sso)
    }

    /// Returns the first SP SSO descriptor.
    #[must_use]
    pub fn sp_sso_descriptor(&self) -> Option<&SpSsoDescriptor> {
        self.roles.iter().find_map(RoleDescriptor::as_sp_sso)
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

    /// Returns the additional metadata locations.
    #[must_use]
    pub fn additional_metadata_locations(&self) -> &[AdditionalMetadataLocation] {
        &self.additional_metadata_locations
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }
}

impl DocumentFields for EntityDescriptor {
    fn document(&self) -> &MetadataDocument {
        &self.document
    }

    fn document_mut(&mut self) -> &mut MetadataDocument {
        &mut self.document
    }

    fn element_name(&self) -> String {
        Self::qualified_name()
    }
}

impl MetadataElement for EntityDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "EntityDescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let entity_id = required_attribute(element, "entityID")?;

        let mut roles = Vec::new();
        let mut affiliation = None;
        let mut organization = None;
        let mut contacts = Vec::new();
        let mut locations = Vec::new();

        let duplicate = |child: &str| MetadataError::DuplicateSingletonElement {
            element: element.qualified_name(),
            child: child.to_string(),
        };

        for child in element.child_elements() {
            let Some(namespace) = child.namespace_uri() else {
                debug!(child = %child.local_name(), "ignoring unqualified child of EntityDescriptor");
                continue;
            };
            match (namespace, child.local_name()) {
                // Extensions and Signature are read as document fields.
                (NS_MD, "Extensions") | (NS_DS, "Signature") => {}
                (NS_MD, "AffiliationDescriptor") => {
                    if affiliation.is_some() {
                        return Err(duplicate("md:AffiliationDescriptor"));
                    }
                    affiliation = Some(AffiliationDescriptor::from_xml_with(child, registry)?);
                }
                (NS_MD, "Organization") => {
                    if organization.is_some() {
                        return Err(duplicate("md:Organization"));
                    }
                    organization = Some(Organization::from_xml_with(child, registry)?);
                }
                (NS_MD, "ContactPerson") => contacts.push(ContactPerson::from_xml_with(child, registry)?),
                (NS_MD, "AdditionalMetadataLocation") => {
                    locations.push(AdditionalMetadataLocation::from_xml_with(child, registry)?);
                }
                _ => roles.push(registry.decode_role(child)?),
            }
        }

        Ok(Self {
            document: MetadataDocument::decode(element, registry)?,
            organization,
            contacts,
            additional_metadata_locations: locations,
            attributes: ExtensibleAttributes::from_xml(element),
            ..Self::new(entity_id, roles, affiliation)?
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        e.set_attribute("entityID", self.entity_id.as_str());
        self.document.encode_attributes(&mut e)?;
        self.attributes.apply_to(&mut e);
        self.document.encode_extensions(&mut e)?;
        for role in &self.roles {
            role.append_to(&mut e)?;
        }
        if let Some(affiliation) = &self.affiliation {
            affiliation.append_to(&mut e)?;
        }
        if let Some(organization) = &self.organization {
            organization.append_to(&mut e)?;
        }
        append_all(&mut e, &self.contacts)?;
        append_all(&mut e, &self.additional_metadata_locations)?;
        self.document.finish(&mut e)?;
        Ok(e)
    }
}
