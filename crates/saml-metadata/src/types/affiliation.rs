//! `md:AffiliationDescriptor`: a group of entities acting under one owner.

use saml_xml::XmlElement;

use crate::codec::{append_strings, extract_strings, require_non_empty, required_attribute};
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{append_all, children_of, expect_element, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::extensible::ExtensibleAttributes;
use crate::registry::MetadataRegistry;

use super::{KeyDescriptor, NS_MD, PREFIX_MD};

/// `md:AffiliationDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationDescriptor {
    document: MetadataDocument,
    owner_id: String,
    members: Vec<String>,
    key_descriptors: Vec<KeyDescriptor>,
    attributes: ExtensibleAttributes,
}

impl AffiliationDescriptor {
    /// Creates an affiliation. The owner must be non-empty and there must be
    /// at least one member, none of them empty.
    pub fn new<I, S>(owner_id: impl Into<String>, members: I) -> MetadataResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::checked(owner_id.into(), members.into_iter().map(Into::into).collect())
    }

    fn checked(owner_id: String, members: Vec<String>) -> MetadataResult<Self> {
        let element = Self::qualified_name();
        require_non_empty(&element, "affiliationOwnerID", &owner_id)?;
        if members.is_empty() {
            return Err(MetadataError::missing_child(element, "md:AffiliateMember", 1));
        }
        for member in &members {
            require_non_empty(&element, "md:AffiliateMember", member)?;
        }
        Ok(Self {
            document: MetadataDocument::default(),
            owner_id,
            members,
            key_descriptors: Vec::new(),
            attributes: ExtensibleAttributes::new(),
        })
    }

    /// Adds a key descriptor.
    #[must_use]
    pub fn with_key_descriptor(mut self, key_descriptor: KeyDescriptor) -> Self {
        self.key_descriptors.push(key_descriptor);
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the owner entity ID.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Returns the member entity IDs.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns true if `entity_id` is a member.
    #[must_use]
    pub fn is_member(&self, entity_id: &str) -> bool {
        self.members.iter().any(|member| member == entity_id)
    }

    /// Returns the key descriptors.
    #[must_use]
    pub fn key_descriptors(&self) -> &[KeyDescriptor] {
        &self.key_descriptors
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }
}

impl DocumentFields for AffiliationDescriptor {
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

impl MetadataElement for AffiliationDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "AffiliationDescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let owner_id = required_attribute(element, "affiliationOwnerID")?.to_string();
        let members = extract_strings(element, NS_MD, "AffiliateMember");
        Ok(Self {
            document: MetadataDocument::decode(element, registry)?,
            key_descriptors: children_of(element, registry)?,
            attributes: ExtensibleAttributes::from_xml(element),
            ..Self::checked(owner_id, members)?
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        e.set_attribute("affiliationOwnerID", self.owner_id.as_str());
        self.document.encode_attributes(&mut e)?;
        self.attributes.apply_to(&mut e);
        self.document.encode_extensions(&mut e)?;
        append_strings(&mut e, NS_MD, "md:AffiliateMember", &self.members);
        append_all(&mut e, &self.key_descriptors)?;
        self.document.finish(&mut e)?;
        Ok(e)
    }
}
