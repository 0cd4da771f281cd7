//! `md:KeyDescriptor`: a key an entity uses for signing or encryption.
//!
//! The `ds:KeyInfo` and `md:EncryptionMethod` content is kept as raw element
//! trees; only the X.509 certificates are surfaced as typed values.

use saml_xml::XmlElement;

use crate::element::{clark_name, expect_element, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::registry::MetadataRegistry;

use super::{NS_DS, NS_MD, PREFIX_DS, PREFIX_MD};

/// The `use` attribute of a key descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUse {
    /// Signing key.
    Signing,
    /// Encryption key.
    Encryption,
}

impl KeyUse {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Signing => "signing",
            Self::Encryption => "encryption",
        }
    }

    fn parse(element: &XmlElement, value: &str) -> MetadataResult<Self> {
        match value {
            "signing" => Ok(Self::Signing),
            "encryption" => Ok(Self::Encryption),
            other => Err(MetadataError::invalid_attribute(
                element.qualified_name(),
                "use",
                format!("expected 'signing' or 'encryption', found '{other}'"),
            )),
        }
    }
}

/// `md:KeyDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    key_use: Option<KeyUse>,
    key_info: XmlElement,
    encryption_methods: Vec<XmlElement>,
}

impl KeyDescriptor {
    /// Creates a key descriptor around a `ds:KeyInfo` element.
    pub fn new(key_info: XmlElement) -> MetadataResult<Self> {
        if !key_info.is(NS_DS, "KeyInfo") {
            return Err(MetadataError::UnexpectedElementName {
                actual: clark_name(&key_info),
                expected: format!("{{{NS_DS}}}KeyInfo"),
            });
        }
        Ok(Self {
            key_use: None,
            key_info,
            encryption_methods: Vec::new(),
        })
    }

    /// Creates a key descriptor carrying one base64 DER certificate.
    #[must_use]
    pub fn with_certificate(certificate_b64: &str) -> Self {
        let mut key_info = XmlElement::new_ns(NS_DS, &format!("{PREFIX_DS}:KeyInfo"));
        key_info
            .append_element_ns(NS_DS, "ds:X509Data")
            .append_element_ns(NS_DS, "ds:X509Certificate")
            .set_text(certificate_b64);
        Self {
            key_use: None,
            key_info,
            encryption_methods: Vec::new(),
        }
    }

    /// Sets the `use` attribute.
    #[must_use]
    pub const fn with_use(mut self, key_use: KeyUse) -> Self {
        self.key_use = Some(key_use);
        self
    }

    /// Adds an `md:EncryptionMethod` element.
    pub fn with_encryption_method(mut self, method: XmlElement) -> MetadataResult<Self> {
        if !method.is(NS_MD, "EncryptionMethod") {
            return Err(MetadataError::UnexpectedElementName {
                actual: clark_name(&method),
                expected: format!("{{{NS_MD}}}EncryptionMethod"),
            });
        }
        self.encryption_methods.push(method);
        Ok(self)
    }

    /// Returns the `use` attribute; `None` means the key serves both purposes.
    #[must_use]
    pub const fn key_use(&self) -> Option<KeyUse> {
        self.key_use
    }

    /// Returns the raw `ds:KeyInfo` element.
    #[must_use]
    pub fn key_info(&self) -> &XmlElement {
        &self.key_info
    }

    /// Returns the raw `md:EncryptionMethod` elements.
    #[must_use]
    pub fn encryption_methods(&self) -> &[XmlElement] {
        &self.encryption_methods
    }

    /// Returns true if the key may be used for `purpose`.
    #[must_use]
    pub fn can_be_used_for(&self, purpose: KeyUse) -> bool {
        self.key_use.map_or(true, |key_use| key_use == purpose)
    }

    /// Returns every X.509 certificate in the key info, whitespace removed.
    #[must_use]
    pub fn certificates(&self) -> Vec<String> {
        self.key_info
            .children_named(NS_DS, "X509Data")
            .flat_map(|data| data.children_named(NS_DS, "X509Certificate"))
            .map(|cert| cert.text().chars().filter(|c| !c.is_whitespace()).collect())
            .collect()
    }
}

impl MetadataElement for KeyDescriptor {
    const NAMESPACE: &'static str = NS_MD;
    const PREFIX: &'static str = PREFIX_MD;
    const LOCAL_NAME: &'static str = "KeyDescriptor";

    fn from_xml_with(element: &XmlElement, _registry: &MetadataRegistry) -> MetadataResult<Self> {
        expect_element::<Self>(element)?;

        let mut key_infos = element.children_named(NS_DS, "KeyInfo");
        let key_info = key_infos.next().ok_or_else(|| {
            MetadataError::missing_child(element.qualified_name(), "ds:KeyInfo", 1)
        })?;
        if key_infos.next().is_some() {
            return Err(MetadataError::TooManyChildren {
                element: element.qualified_name(),
                child: "ds:KeyInfo".to_string(),
                max: 1,
            });
        }

        let mut key_info = key_info.detached();
        key_info.drop_implied_declarations();
        Ok(Self {
            key_use: element
                .attribute("use")
                .map(|value| KeyUse::parse(element, value))
                .transpose()?,
            key_info,
            encryption_methods: element
                .children_named(NS_MD, "EncryptionMethod")
                .map(|method| {
                    let mut method = method.detached();
                    method.drop_implied_declarations();
                    method
                })
                .collect(),
        })
    }

    fn to_xml(&self) -> MetadataResult<XmlElement> {
        let mut e = Self::create_element();
        if let Some(key_use) = self.key_use {
            e.set_attribute("use", key_use.as_str());
        }
        e.append_child(self.key_info.clone());
        for method in &self.encryption_methods {
            e.append_child(method.clone());
        }
        Ok(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificate_key_descriptor_round_trip() {
        let kd = KeyDescriptor::with_certificate("MIIBsjCCARugAwIBAgIJ").with_use(KeyUse::Signing);
        let xml = kd.to_xml_string().unwrap();
        assert_eq!(
            xml,
            r#"<md:KeyDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" use="signing"><ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:X509Data><ds:X509Certificate>MIIBsjCCARugAwIBAgIJ</ds:X509Certificate></ds:X509Data></ds:KeyInfo></md:KeyDescriptor>"#
        );
        let decoded = KeyDescriptor::from_xml_str(&xml).unwrap();
        assert_eq!(decoded, kd);
        assert_eq!(decoded.certificates(), vec!["MIIBsjCCARugAwIBAgIJ"]);
        assert!(decoded.can_be_used_for(KeyUse::Signing));
        assert!(!decoded.can_be_used_for(KeyUse::Encryption));
        assert_eq!(decoded.to_xml_string().unwrap(), xml);
    }

    #[test]
    fn key_info_is_required() {
        let xml = r#"<md:KeyDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" use="signing"/>"#;
        assert!(matches!(
            KeyDescriptor::from_xml_str(xml),
            Err(MetadataError::MissingRequiredChild { ref child, .. }) if child == "ds:KeyInfo"
        ));
    }

    #[test]
    fn invalid_use_is_rejected() {
        let xml = r#"<md:KeyDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:ds="http://www.w3.org/2000/09/xmldsig#" use="both"><ds:KeyInfo/></md:KeyDescriptor>"#;
        assert!(matches!(
            KeyDescriptor::from_xml_str(xml),
            Err(MetadataError::InvalidAttributeFormat { ref attribute, .. }) if attribute == "use"
        ));
    }

    #[test]
    fn encryption_methods_are_kept_verbatim() {
        let xml = r#"<md:KeyDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" use="encryption"><ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:KeyName>enc</ds:KeyName></ds:KeyInfo><md:EncryptionMethod Algorithm="http://www.w3.org/2009/xmlenc11#aes256-gcm"/></md:KeyDescriptor>"#;
        let kd = KeyDescriptor::from_xml_str(xml).unwrap();
        assert_eq!(kd.encryption_methods().len(), 1);
        assert!(kd.certificates().is_empty());
        assert_eq!(kd.to_xml_string().unwrap(), xml);
    }

    #[test]
    fn new_requires_key_info() {
        assert!(KeyDescriptor::new(XmlElement::new_ns(NS_DS, "ds:Signature")).is_err());
    }
}
