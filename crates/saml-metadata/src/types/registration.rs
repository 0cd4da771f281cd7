//! Metadata registration and publication info (`mdrpi`).

use saml_xml::XmlElement;

use crate::codec::{
    append_localized, check_timestamp, extract_localized, optional_attribute, require_non_empty,
    required_attribute, set_timestamp_attribute, timestamp_attribute,
};
use crate::element::{expect_element, MetadataElement};
use crate::error::MetadataResult;
use crate::registry::MetadataRegistry;

use super::{LocalizedString, NS_MDRPI, PREFIX_MDRPI};

/// `mdrpi:RegistrationInfo`: who registered an entity and under which policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInfo {
    registration_authority: String,
    registration_instant: Option<i64>,
    registration_policy: Vec<LocalizedString>,
}

impl RegistrationInfo {
    /// Creates registration info for a non-empty authority.
    pub fn new(registration_authority: impl Into<String>) -> MetadataResult<Self> {
        let registration_authority = registration_authority.into();
        require_non_empty(&Self::qualified_name(), "registrationAuthority", &registration_authority)?;
        Ok(Self {
            registration_authority,
            registration_instant: None,
            registration_policy: Vec::new(),
        })
    }

    /// Sets the registration instant (Unix seconds).
    pub fn with_registration_instant(mut self, instant: i64) -> MetadataResult<Self> {
        self.registration_instant = Some(check_timestamp(
            &Self::qualified_name(),
            "registrationInstant",
            instant,
        )?);
        Ok(self)
    }

    /// Adds a registration policy URL for a language.
    #[must_use]
    pub fn with_registration_policy(mut self, policy: LocalizedString) -> Self {
        self.registration_policy.push(policy);
        self
    }

    /// Returns the registration authority.
    #[must_use]
    pub fn registration_authority(&self) -> &str {
        &self.registration_authority
    }

    /// Returns the registration instant.
    #[must_use]
    pub const fn registration_instant(&self) -> Option<i64> {
        self.registration_instant
    }

    /// Returns the registration policy URLs by language.
    #[must_use]
    pub fn registration_policy(&self) -> &[LocalizedString] {
        &self.registration_policy
    }
}

impl MetadataElement for RegistrationInfo {
    const NAMESPACE: &'static str = NS_MDRPI;
    const PREFIX: &'static str = PREFIX_MDRPI;
    const LOCAL_NAME: &'static str = "RegistrationInfo";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let mut info = Self::new(required_attribute(element, "registrationAuthority")?)?;
        info.registration_instant = timestamp_attribute(element, "registrationInstant")?;
        info.registration_policy = extract_localized(element, NS_MDRPI, "RegistrationPolicy")?;
        Ok(info)
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        e.set_attribute("registrationAuthority", self.registration_authority.as_str());
        if let Some(instant) = self.registration_instant {
            set_timestamp_attribute(&mut e, "registrationInstant", instant)?;
        }
        append_localized(&mut e, NS_MDRPI, "mdrpi:RegistrationPolicy", &self.registration_policy);
        Ok(e)
    }
}

/// `mdrpi:PublicationInfo`: who published a metadata document and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationInfo {
    publisher: String,
    creation_instant: Option<i64>,
    publication_id: Option<String>,
    usage_policy: Vec<LocalizedString>,
}

impl PublicationInfo {
    /// Creates publication info for a non-empty publisher.
    pub fn new(publisher: impl Into<String>) -> MetadataResult<Self> {
        let publisher = publisher.into();
        require_non_empty(&Self::qualified_name(), "publisher", &publisher)?;
        Ok(Self {
            publisher,
            creation_instant: None,
            publication_id: None,
            usage_policy: Vec::new(),
        })
    }

    /// Sets the creation instant (Unix seconds).
    pub fn with_creation_instant(mut self, instant: i64) -> MetadataResult<Self> {
        self.creation_instant = Some(check_timestamp(&Self::qualified_name(), "creationInstant", instant)?);
        Ok(self)
    }

    /// Sets the publication identifier.
    #[must_use]
    pub fn with_publication_id(mut self, publication_id: impl Into<String>) -> Self {
        self.publication_id = Some(publication_id.into());
        self
    }

    /// Adds a usage policy URL for a language.
    #[must_use]
    pub fn with_usage_policy(mut self, policy: LocalizedString) -> Self {
        self.usage_policy.push(policy);
        self
    }

    /// Returns the publisher.
    #[must_use]
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Returns the creation instant.
    #[must_use]
    pub const fn creation_instant(&self) -> Option<i64> {
        self.creation_instant
    }

    /// Returns the publication identifier.
    #[must_use]
    pub fn publication_id(&self) -> Option<&str> {
        self.publication_id.as_deref()
    }

    /// Returns the usage policy URLs by language.
    #[must_use]
    pub fn usage_policy(&self) -> &[LocalizedString] {
        &self.usage_policy
    }
}

impl MetadataElement for PublicationInfo {
    const NAMESPACE: &'static str = NS_MDRPI;
    const PREFIX: &'static str = PREFIX_MDRPI;
    const LOCAL_NAME: &'static str = "PublicationInfo";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;
        let mut info = Self::new(required_attribute(element, "publisher")?)?;
        info.creation_instant = timestamp_attribute(element, "creationInstant")?;
        info.publication_id = optional_attribute(element, "publicationId");
        info.usage_policy = extract_localized(element, NS_MDRPI, "UsagePolicy")?;
        Ok(info)
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        e.set_attribute("publisher", self.publisher.as_str());
        if let Some(instant) = self.creation_instant {
            set_timestamp_attribute(&mut e, "creationInstant", instant)?;
        }
        if let Some(id) = &self.publication_id {
            e.set_attribute("publicationId", id.as_str());
        }
        append_localized(&mut e, NS_MDRPI, "mdrpi:UsagePolicy", &self.usage_policy);
        Ok(e)
    }
}
