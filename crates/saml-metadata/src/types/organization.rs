//! Organization, contact and metadata-location elements.

use std::fmt;
use std::str::FromStr;

use saml_xml::XmlElement;

use crate::codec::{append_localized, append_strings, extract_localized, extract_strings, require_non_empty, required_attribute};
use crate::element::{expect_element, optional_child, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::extensible::ExtensibleAttributes;
use crate::registry::MetadataRegistry;

use super::{Extensions, LocalizedString, NS_MD, PREFIX_MD};

/// `md:Organization`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    extensions: Option<Extensions>,
    names: Vec<LocalizedString>,
    display_names: Vec<LocalizedString>,
    urls: Vec<LocalizedString>,
    attributes: ExtensibleAttributes,
}

impl Organization {
    /// Creates an organization. Each list needs at least one entry.
    pub fn new(
        names: Vec<LocalizedString>,
        display_names: Vec<LocalizedString>,
        urls: Vec<LocalizedString>,
    ) -> MetadataResult<Self> {
        let element = Self::qualified_name();
        for (list, child) in [
            (&names, "md:OrganizationName"),
            (&display_names, "md:OrganizationDisplayName"),
            (&urls, "md:OrganizationURL"),
        ] {
            if list.is_empty() {
                return Err(MetadataError::missing_child(element.as_str(), child, 1));
            }
        }
        Ok(Self {
            extensions: None,
            names,
            display_names,
            urls,
            attributes: ExtensibleAttributes::new(),
        })
    }

    /// Sets the Extensions block.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the Extensions block.
    #[must_use]
    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    /// Returns the organization names.
    #[must_use]
    pub fn names(&self) -> &[LocalizedString] {
        &self.names
    }

    /// Returns the display names.
    #[must_use]
    pub fn display_names(&self) -> &[LocalizedString] {
        &self.display_names
    }

    /// Returns the organization URLs.
    #[must_use]
    pub fn urls(&self) -> &[LocalizedString] {
        &self.urls
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }
}

impl MetadataElement for Organization {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "Organization";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let organization = Self::new(
            extract_localized(element, NS_MD, "OrganizationName")?,
            extract_localized(element, NS_MD, "OrganizationDisplayName")?,
            extract_localized(element, NS_MD, "OrganizationURL")?,
        )?;
        Ok(Self {
            extensions: optional_child::<Extensions>(element, registry)?,
            attributes: ExtensibleAttributes::from_xml(element),
            ..organization
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        self.attributes.apply_to(&mut e);
        if let Some(extensions) = &self.extensions {
            extensions.append_to(&mut e)?;
        }
        append_localized(&mut e, NS_MD, "md:OrganizationName", &self.names);
        append_localized(&mut e, NS_MD, "md:OrganizationDisplayName", &self.display_names);
        append_localized(&mut e, NS_MD, "md:OrganizationURL", &self.urls);
        Ok(e)
    }
}

/// The `contactType` of a contact person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactType {
    /// Technical contact.
    Technical,
    /// Support contact.
    Support,
    /// Administrative contact.
    Administrative,
    /// Billing contact.
    Billing,
    /// Any other contact.
    Other,
}

impl ContactType {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Support => "support",
            Self::Administrative => "administrative",
            Self::Billing => "billing",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(Self::Technical),
            "support" => Ok(Self::Support),
            "administrative" => Ok(Self::Administrative),
            "billing" => Ok(Self::Billing),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown contact type '{other}'")),
        }
    }
}

/// `md:ContactPerson`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPerson {
    contact_type: ContactType,
    extensions: Option<Extensions>,
    company: Option<String>,
    given_name: Option<String>,
    sur_name: Option<String>,
    email_addresses: Vec<String>,
    telephone_numbers: Vec<String>,
    attributes: ExtensibleAttributes,
}

impl ContactPerson {
    /// Creates a contact of the given type.
    #[must_use]
    pub fn new(contact_type: ContactType) -> Self {
        Self {
            contact_type,
            extensions: None,
            company: None,
            given_name: None,
            sur_name: None,
            email_addresses: Vec::new(),
            telephone_numbers: Vec::new(),
            attributes: ExtensibleAttributes::new(),
        }
    }

    /// Sets the Extensions block.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Sets the company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Sets the given name.
    #[must_use]
    pub fn with_given_name(mut self, given_name: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self
    }

    /// Sets the surname.
    #[must_use]
    pub fn with_sur_name(mut self, sur_name: impl Into<String>) -> Self {
        self.sur_name = Some(sur_name.into());
        self
    }

    /// Adds an email address.
    #[must_use]
    pub fn with_email_address(mut self, email: impl Into<String>) -> Self {
        self.email_addresses.push(email.into());
        self
    }

    /// Adds a telephone number.
    #[must_use]
    pub fn with_telephone_number(mut self, number: impl Into<String>) -> Self {
        self.telephone_numbers.push(number.into());
        self
    }

    /// Replaces the extension attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: ExtensibleAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the contact type.
    #[must_use]
    pub const fn contact_type(&self) -> ContactType {
        self.contact_type
    }

    /// Returns the Extensions block.
    #[must_use]
    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    /// Returns the company.
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Returns the given name.
    #[must_use]
    pub fn given_name(&self) -> Option<&str> {
        self.given_name.as_deref()
    }

    /// Returns the surname.
    #[must_use]
    pub fn sur_name(&self) -> Option<&str> {
        self.sur_name.as_deref()
    }

    /// Returns the email addresses.
    #[must_use]
    pub fn email_addresses(&self) -> &[String] {
        &self.email_addresses
    }

    /// Returns the telephone numbers.
    #[must_use]
    pub fn telephone_numbers(&self) -> &[String] {
        &self.telephone_numbers
    }

    /// Returns the extension attributes.
    #[must_use]
    pub fn attributes(&self) -> &ExtensibleAttributes {
        &self.attributes
    }
}

fn single_text(element: &XmlElement, local_name: &str) -> MetadataResult<Option<String>> {
    let mut values = extract_strings(element, NS_MD, local_name).into_iter();
    let first = values.next();
    if values.next().is_some() {
        return Err(MetadataError::TooManyChildren {
            element: element.qualified_name(),
            child: format!("{PREFIX_MD}:{local_name}"),
            max: 1,
        });
    }
    Ok(first)
}

impl MetadataElement for ContactPerson {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "ContactPerson";

    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let raw = required_attribute(element, "contactType")?;
        let contact_type = raw.parse::<ContactType>().map_err(|reason| {
            MetadataError::invalid_attribute(element.qualified_name(), "contactType", reason)
        })?;

        Ok(Self {
            contact_type,
            extensions: optional_child::<Extensions>(element, registry)?,
            company: single_text(element, "Company")?,
            given_name: single_text(element, "GivenName")?,
            sur_name: single_text(element, "SurName")?,
            email_addresses: extract_strings(element, NS_MD, "EmailAddress"),
            telephone_numbers: extract_strings(element, NS_MD, "TelephoneNumber"),
            attributes: ExtensibleAttributes::from_xml(element),
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        e.set_attribute("contactType", self.contact_type.as_str());
        self.attributes.apply_to(&mut e);
        if let Some(extensions) = &self.extensions {
            extensions.append_to(&mut e)?;
        }
        for (value, name) in [
            (&self.company, "md:Company"),
            (&self.given_name, "md:GivenName"),
            (&self.sur_name, "md:SurName"),
        ] {
            if let Some(value) = value {
                e.append_element_ns(NS_MD, name).set_text(value.as_str());
            }
        }
        append_strings(&mut e, NS_MD, "md:EmailAddress", &self.email_addresses);
        append_strings(&mut e, NS_MD, "md:TelephoneNumber", &self.telephone_numbers);
        Ok(e)
    }
}

/// `md:AdditionalMetadataLocation`: where metadata in another namespace lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalMetadataLocation {
    namespace: String,
    location: String,
}

impl AdditionalMetadataLocation {
    /// Creates a location. Both values must be non-empty.
    pub fn new(namespace: impl Into<String>, location: impl Into<String>) -> MetadataResult<Self> {
        let namespace = namespace.into();
        let location = location.into();
        let element = Self::qualified_name();
        require_non_empty(&element, "namespace", &namespace)?;
        require_non_empty(&element, "location", &location)?;
        Ok(Self { namespace, location })
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the location URI.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl MetadataElement for AdditionalMetadataLocation {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "AdditionalMetadataLocation";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        Self::new(required_attribute(element, "namespace")?, element.text())
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        e.set_attribute("namespace", self.namespace.as_str());
        e.set_text(self.location.as_str());
        Ok(e)
    }
}
