//! XML Signature validation.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use saml_xml::{canonicalize, canonicalize_excluding, XmlElement};
use tracing::{debug, warn};

use crate::error::{MetadataError, MetadataResult};
use crate::types::{canonicalization_algorithms, NS_DS, TRANSFORM_ENVELOPED_SIGNATURE};

use super::{compute_digest, VerificationKey, XmlSignature};

/// Verifies enveloped signatures against a set of trusted keys.
pub struct XmlSignatureValidator {
    keys: Vec<Arc<dyn VerificationKey>>,
    /// Whether to allow SHA-1 signatures (deprecated but sometimes needed).
    allow_sha1: bool,
}

impl XmlSignatureValidator {
    /// Creates a validator trusting one key.
    pub fn new(key: Arc<dyn VerificationKey>) -> Self {
        Self {
            keys: vec![key],
            allow_sha1: false,
        }
    }

    /// Trusts an additional key.
    #[must_use]
    pub fn with_key(mut self, key: Arc<dyn VerificationKey>) -> Self {
        self.keys.push(key);
        self
    }

    /// Allows SHA-1 based signature methods (not recommended).
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Validates the enveloped signature of `element`.
    ///
    /// The element must carry exactly one `ds:Signature` child whose reference
    /// is empty or names the element's `ID`. Returns the parsed signature.
    pub fn validate(&self, element: &XmlElement) -> MetadataResult<XmlSignature> {
        let mut signatures = element.children_named(NS_DS, "Signature");
        let signature_element = signatures
            .next()
            .ok_or_else(|| invalid(format!("{} is not signed", element.qualified_name())))?;
        if signatures.next().is_some() {
            return Err(invalid("more than one enveloped signature"));
        }

        let signature = XmlSignature::from_xml(signature_element)?;
        if signature.algorithm.is_deprecated() && !self.allow_sha1 {
            return Err(invalid("SHA-1 signatures are not allowed"));
        }
        if !signature.canonicalization.is_supported() {
            return Err(MetadataError::UnsupportedAlgorithm(
                signature.canonicalization.uri().to_string(),
            ));
        }
        check_transforms(&signature.transforms)?;
        check_reference(element, &signature.reference_uri)?;

        let canonical = canonicalize_excluding(element, |e| std::ptr::eq(e, signature_element));
        let digest = compute_digest(&signature.digest_algorithm, canonical.as_bytes())?;
        let expected = decode(&signature.digest_value, "digest value")?;
        if digest != expected {
            warn!(element = %element.qualified_name(), "signature digest mismatch");
            return Err(invalid("digest value mismatch"));
        }

        let signed_info = signature_element
            .first_child_named(NS_DS, "SignedInfo")
            .ok_or_else(|| invalid("missing ds:SignedInfo"))?;
        let data = canonicalize(signed_info);
        let value = decode(&signature.signature_value, "signature value")?;
        for key in &self.keys {
            if key.verify(signature.algorithm, data.as_bytes(), &value)? {
                debug!(element = %element.qualified_name(), reference = %signature.reference_uri, "signature verified");
                return Ok(signature);
            }
        }
        Err(invalid("signature verification failed with all trusted keys"))
    }
}

impl fmt::Debug for XmlSignatureValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlSignatureValidator")
            .field("keys", &self.keys.len())
            .field("allow_sha1", &self.allow_sha1)
            .finish()
    }
}

fn invalid(reason: impl Into<String>) -> MetadataError {
    MetadataError::SignatureInvalid(reason.into())
}

fn decode(value: &str, what: &str) -> MetadataResult<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| invalid(format!("invalid {what} encoding: {e}")))
}

fn check_transforms(transforms: &[String]) -> MetadataResult<()> {
    for transform in transforms {
        match transform.as_str() {
            TRANSFORM_ENVELOPED_SIGNATURE | canonicalization_algorithms::EXCLUSIVE_C14N => {}
            other => return Err(MetadataError::UnsupportedAlgorithm(other.to_string())),
        }
    }
    Ok(())
}

fn check_reference(element: &XmlElement, reference_uri: &str) -> MetadataResult<()> {
    if reference_uri.is_empty() {
        return Ok(());
    }
    let target = reference_uri
        .strip_prefix('#')
        .ok_or_else(|| invalid(format!("unsupported reference '{reference_uri}'")))?;
    match element.attribute("ID") {
        Some(id) if id == target => Ok(()),
        _ => Err(invalid(format!(
            "reference '{reference_uri}' does not name the signed element"
        ))),
    }
}
