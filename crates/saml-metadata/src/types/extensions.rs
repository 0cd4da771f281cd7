//! The `md:Extensions` container.

use saml_xml::XmlElement;

use crate::element::{expect_element, MetadataElement};
use crate::error::MetadataResult;
use crate::registry::MetadataRegistry;

use super::{PublicationInfo, RegistrationInfo, NS_MD, PREFIX_MD};

/// One element inside `md:Extensions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionElement {
    /// `mdrpi:RegistrationInfo`.
    RegistrationInfo(RegistrationInfo),
    /// `mdrpi:PublicationInfo`.
    PublicationInfo(PublicationInfo),
    /// Any element without a registered decoder, kept verbatim.
    Unknown(XmlElement),
}

impl ExtensionElement {
    /// Encodes the element.
    pub fn to_xml(&self) -> MetadataResult<XmlElement> {
        match self {
            Self::RegistrationInfo(info) => info.to_xml(),
            Self::PublicationInfo(info) => info.to_xml(),
            Self::Unknown(element) => Ok(element.clone()),
        }
    }
}

impl From<RegistrationInfo> for ExtensionElement {
    fn from(info: RegistrationInfo) -> Self {
        Self::RegistrationInfo(info)
    }
}

impl From<PublicationInfo> for ExtensionElement {
    fn from(info: PublicationInfo) -> Self {
        Self::PublicationInfo(info)
    }
}

/// `md:Extensions`: ordered extension elements attached to a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    elements: Vec<ExtensionElement>,
}

impl Extensions {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extension element.
    #[must_use]
    pub fn with(mut self, element: impl Into<ExtensionElement>) -> Self {
        self.elements.push(element.into());
        self
    }

    /// Returns the extension elements in document order.
    #[must_use]
    pub fn elements(&self) -> &[ExtensionElement] {
        &self.elements
    }

    /// Returns the first `mdrpi:RegistrationInfo`, if any.
    #[must_use]
    pub fn registration_info(&self) -> Option<&RegistrationInfo> {
        self.elements.iter().find_map(|e| match e {
            ExtensionElement::RegistrationInfo(info) => Some(info),
            _ => None,
        })
    }

    /// Returns the first `mdrpi:PublicationInfo`, if any.
    #[must_use]
    pub fn publication_info(&self) -> Option<&PublicationInfo> {
        self.elements.iter().find_map(|e| match e {
            ExtensionElement::PublicationInfo(info) => Some(info),
            _ => None,
        })
    }

    /// Returns true if the container holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl MetadataElement for Extensions {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "Extensions";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let elements = element
            .child_elements()
            .map(|child| registry.decode_extension(child))
            .collect::<MetadataResult<Vec<_>>>()?;
        Ok(Self { elements })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        for element in &self.elements {
            e.append_child(element.to_xml()?);
        }
        Ok(e)
    }
}
