use saml_xml::XmlElement;

/// A role descriptor with no registered decoder, such as an `xsi:type`
/// extension of `md:RoleDescriptor` or a vendor element.
///
/// The element is kept as parsed and re-emitted unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoleDescriptor {
    element: XmlElement,
}

impl UnknownRoleDescriptor {
    /// Wraps a raw element.
    #[must_use]
    pub const fn new(element: XmlElement) -> Self {
        Self { element }
    }

    /// Returns the raw element.
    #[must_use]
    pub const fn element(&self) -> &XmlElement {
        &self.element
    }

    /// Consumes the wrapper, returning the raw element.
    #[must_use]
    pub fn into_element(self) -> XmlElement {
        self.element
    }

    /// Returns a copy of the raw element.
    #[must_use]
    pub fn to_xml(&self) -> XmlElement {
        self.element.clone()
    }
}
