//! XML Signature creation.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use saml_xml::{canonicalize, XmlElement};
use tracing::debug;

use crate::error::{MetadataError, MetadataResult};
use crate::types::{NS_DS, TRANSFORM_ENVELOPED_SIGNATURE};

use super::{compute_digest, SignatureConfig, SigningKey};

/// Produces enveloped signatures over metadata elements.
pub struct XmlSigner {
    key: Arc<dyn SigningKey>,
    config: SignatureConfig,
}

impl XmlSigner {
    /// Creates a signer with the default configuration.
    pub fn new(key: Arc<dyn SigningKey>) -> Self {
        Self {
            key,
            config: SignatureConfig::default(),
        }
    }

    /// Sets the signature configuration.
    #[must_use]
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the signature configuration.
    #[must_use]
    pub const fn config(&self) -> &SignatureConfig {
        &self.config
    }

    /// Signs `element` in place.
    ///
    /// Any `ds:Signature` child is replaced. The reference points at the
    /// element's `ID` attribute, or is empty when the element has none. The
    /// new signature becomes the first child.
    pub fn sign_element(&self, element: &mut XmlElement) -> MetadataResult<()> {
        let config = &self.config;
        if !config.canonicalization.is_supported() {
            return Err(MetadataError::UnsupportedAlgorithm(
                config.canonicalization.uri().to_string(),
            ));
        }
        if config.algorithm.is_deprecated() {
            return Err(MetadataError::UnsupportedAlgorithm(config.algorithm.uri().to_string()));
        }

        let removed = element.remove_children_named(NS_DS, "Signature");
        if removed > 0 {
            debug!(element = %element.qualified_name(), removed, "replacing existing signature");
        }

        let reference = element
            .attribute("ID")
            .map(|id| format!("#{id}"))
            .unwrap_or_default();
        let digest = compute_digest(config.algorithm.digest_uri(), canonicalize(element).as_bytes())?;
        let signed_info = build_signed_info(&reference, &STANDARD.encode(digest), config);

        let value = self
            .key
            .sign(config.algorithm, canonicalize(&signed_info).as_bytes())?;
        if value.is_empty() {
            return Err(MetadataError::SignatureCreation(
                "key produced an empty signature".to_string(),
            ));
        }

        let mut signature = XmlElement::new_ns(NS_DS, "ds:Signature");
        signature.append_child(signed_info);
        signature
            .append_element_ns(NS_DS, "ds:SignatureValue")
            .set_text(STANDARD.encode(value));
        if config.include_certificate {
            if let Some(cert) = self.key.certificate_der() {
                signature
                    .append_element_ns(NS_DS, "ds:KeyInfo")
                    .append_element_ns(NS_DS, "ds:X509Data")
                    .append_element_ns(NS_DS, "ds:X509Certificate")
                    .set_text(STANDARD.encode(cert));
            }
        }

        element.insert_child(0, signature);
        Ok(())
    }
}

impl fmt::Debug for XmlSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlSigner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn build_signed_info(reference_uri: &str, digest_b64: &str, config: &SignatureConfig) -> XmlElement {
    let c14n = config.canonicalization.uri();
    let mut signed_info = XmlElement::new_ns(NS_DS, "ds:SignedInfo");
    signed_info
        .append_element_ns(NS_DS, "ds:CanonicalizationMethod")
        .set_attribute("Algorithm", c14n);
    signed_info
        .append_element_ns(NS_DS, "ds:SignatureMethod")
        .set_attribute("Algorithm", config.algorithm.uri());

    let reference = signed_info.append_element_ns(NS_DS, "ds:Reference");
    reference.set_attribute("URI", reference_uri);
    let transforms = reference.append_element_ns(NS_DS, "ds:Transforms");
    transforms
        .append_element_ns(NS_DS, "ds:Transform")
        .set_attribute("Algorithm", TRANSFORM_ENVELOPED_SIGNATURE);
    transforms
        .append_element_ns(NS_DS, "ds:Transform")
        .set_attribute("Algorithm", c14n);
    reference
        .append_element_ns(NS_DS, "ds:DigestMethod")
        .set_attribute("Algorithm", config.algorithm.digest_uri());
    reference
        .append_element_ns(NS_DS, "ds:DigestValue")
        .set_text(digest_b64);
    signed_info
}

#[cfg(test)]
pub(crate) mod test_keys {
    use sha2::{Digest, Sha256};

    use super::*;
    use crate::signature::{SignatureAlgorithm, VerificationKey};

    /// Keyed hash standing in for an asymmetric key pair.
    pub(crate) struct SharedSecretKey(pub &'static [u8]);

    impl SharedSecretKey {
        fn mac(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> Vec<u8> {
            let mut hasher = Sha256::new();
            hasher.update(self.0);
            hasher.update(algorithm.uri().as_bytes());
            hasher.update(data);
            hasher.finalize().to_vec()
        }
    }

    impl SigningKey for SharedSecretKey {
        fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> MetadataResult<Vec<u8>> {
            Ok(self.mac(algorithm, data))
        }

        fn certificate_der(&self) -> Option<Vec<u8>> {
            Some(b"test certificate".to_vec())
        }
    }

    impl VerificationKey for SharedSecretKey {
        fn verify(&self, algorithm: SignatureAlgorithm, data: &[u8], signature: &[u8]) -> MetadataResult<bool> {
            Ok(self.mac(algorithm, data) == signature)
        }
    }

    pub(crate) fn signer() -> XmlSigner {
        XmlSigner::new(Arc::new(SharedSecretKey(b"secret")))
    }
}
