//! `md:EntitiesDescriptor`: a named group of entities, as published by
//! federations in aggregate metadata.

use saml_xml::XmlElement;

use crate::codec::optional_attribute;
use crate::document::{DocumentFields, MetadataDocument};
use crate::element::{expect_element, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::registry::MetadataRegistry;

use super::{EntityDescriptor, NS_MD, PREFIX_MD};

/// A member of an [`EntitiesDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntitiesMember {
    /// A single entity.
    Entity(Box<EntityDescriptor>),
    /// A nested group.
    Group(Box<EntitiesDescriptor>),
}

impl EntitiesMember {
    fn to_xml(&self) -> MetadataResult<XmlElement> {
        match self {
            Self::Entity(entity) => entity.to_xml(),
            Self::Group(group) => group.to_xml(),
        }
    }
}

impl From<EntityDescriptor> for EntitiesMember {
    fn from(entity: EntityDescriptor) -> Self {
        Self::Entity(Box::new(entity))
    }
}

impl From<EntitiesDescriptor> for EntitiesMember {
    fn from(group: EntitiesDescriptor) -> Self {
        Self::Group(Box::new(group))
    }
}

/// `md:EntitiesDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitiesDescriptor {
    document: MetadataDocument,
    name: Option<String>,
    members: Vec<EntitiesMember>,
}

impl EntitiesDescriptor {
    /// Creates a group. At least one member is required.
    pub fn new(members: Vec<EntitiesMember>) -> MetadataResult<Self> {
        if members.is_empty() {
            return Err(MetadataError::missing_child(
                Self::qualified_name(),
                EntityDescriptor::qualified_name(),
                1,
            ));
        }
        Ok(Self {
            document: MetadataDocument::default(),
            name: None,
            members,
        })
    }

    /// Sets the group name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the direct members in document order.
    #[must_use]
    pub fn members(&self) -> &[EntitiesMember] {
        &self.members
    }

    /// Returns every entity in the group, descending into nested groups.
    #[must_use]
    pub fn entities(&self) -> Vec<&EntityDescriptor> {
        let mut out = Vec::new();
        self.collect_entities(&mut out);
        out
    }

    fn collect_entities<'a>(&'a self, out: &mut Vec<&'a EntityDescriptor>) {
        for member in &self.members {
            match member {
                EntitiesMember::Entity(entity) => out.push(entity),
                EntitiesMember::Group(group) => group.collect_entities(out),
            }
        }
    }

    /// Finds an entity by ID anywhere in the group.
    #[must_use]
    pub fn find_entity(&self, entity_id: &str) -> Option<&EntityDescriptor> {
        self.entities()
            .into_iter()
            .find(|entity| entity.entity_id() == entity_id)
    }
}

impl DocumentFields for EntitiesDescriptor {
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

impl MetadataElement for EntitiesDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "EntitiesDescriptor";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let mut members = Vec::new();
        for child in element.child_elements() {
            if child.is(NS_MD, EntityDescriptor::LOCAL_NAME) {
                members.push(EntityDescriptor::from_xml_with(child, registry)?.into());
            } else if child.is(NS_MD, Self::LOCAL_NAME) {
                members.push(Self::from_xml_with(child, registry)?.into());
            }
        }
        Ok(Self {
            document: MetadataDocument::decode(element, registry)?,
            name: optional_attribute(element, "Name"),
            ..Self::new(members)?
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.document.encode_attributes(&mut e)?;
        if let Some(name) = &self.name {
            e.set_attribute("Name", name.as_str());
        }
        self.document.encode_extensions(&mut e)?;
        for member in &self.members {
            e.append_child(member.to_xml()?);
        }
        self.document.finish(&mut e)?;
        Ok(e)
    }
}
