//! Enveloped XML signatures for metadata documents.
//!
//! Signing and verification operate on element trees. The digest covers the
//! exclusive canonical form of the signed element with its own `ds:Signature`
//! removed; the signature value covers the canonical `ds:SignedInfo`.
//!
//! Key material stays behind the [`SigningKey`] and [`VerificationKey`]
//! traits so callers can plug in whichever crypto backend they already use.
//!
//! # Signing Algorithms
//!
//! - RSA-SHA256 (default)
//! - RSA-SHA384
//! - RSA-SHA512
//! - ECDSA-SHA256
//! - ECDSA-SHA384
//! - ECDSA-SHA512
//!
//! Legacy SHA-1 is never used for signing and is refused during verification
//! unless explicitly allowed.

mod signer;
mod validator;

pub use signer::*;
pub use validator::*;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use saml_xml::XmlElement;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{MetadataError, MetadataResult};
use crate::types::{canonicalization_algorithms, digest_algorithms, signature_algorithms, NS_DS};

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256 (recommended).
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
    /// ECDSA with SHA-256.
    EcdsaSha256,
    /// ECDSA with SHA-384.
    EcdsaSha384,
    /// ECDSA with SHA-512.
    EcdsaSha512,
    /// Legacy RSA with SHA-1 (not recommended).
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::EcdsaSha256 => signature_algorithms::ECDSA_SHA256,
            Self::EcdsaSha384 => signature_algorithms::ECDSA_SHA384,
            Self::EcdsaSha512 => signature_algorithms::ECDSA_SHA512,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// Returns the corresponding digest algorithm URI.
    #[must_use]
    pub const fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 | Self::EcdsaSha256 => digest_algorithms::SHA256,
            Self::RsaSha384 | Self::EcdsaSha384 => digest_algorithms::SHA384,
            Self::RsaSha512 | Self::EcdsaSha512 => digest_algorithms::SHA512,
            Self::RsaSha1 => digest_algorithms::SHA1,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_algorithms::RSA_SHA256 => Some(Self::RsaSha256),
            signature_algorithms::RSA_SHA384 => Some(Self::RsaSha384),
            signature_algorithms::RSA_SHA512 => Some(Self::RsaSha512),
            signature_algorithms::ECDSA_SHA256 => Some(Self::EcdsaSha256),
            signature_algorithms::ECDSA_SHA384 => Some(Self::EcdsaSha384),
            signature_algorithms::ECDSA_SHA512 => Some(Self::EcdsaSha512),
            signature_algorithms::RSA_SHA1 => Some(Self::RsaSha1),
            _ => None,
        }
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }
}

/// Canonicalization algorithm selection.
///
/// Only exclusive C14N without comments is implemented; the other variants
/// are recognised so they can be reported as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CanonicalizationAlgorithm {
    /// Exclusive C14N without comments (recommended).
    #[default]
    #[serde(rename = "exc-c14n")]
    ExclusiveC14N,
    /// Exclusive C14N with comments.
    #[serde(rename = "exc-c14n-with-comments")]
    ExclusiveC14NWithComments,
    /// C14N without comments.
    #[serde(rename = "c14n")]
    C14N,
    /// C14N with comments.
    #[serde(rename = "c14n-with-comments")]
    C14NWithComments,
}

impl CanonicalizationAlgorithm {
    /// Returns the URI for this canonicalization algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::ExclusiveC14N => canonicalization_algorithms::EXCLUSIVE_C14N,
            Self::ExclusiveC14NWithComments => {
                canonicalization_algorithms::EXCLUSIVE_C14N_WITH_COMMENTS
            }
            Self::C14N => canonicalization_algorithms::C14N,
            Self::C14NWithComments => canonicalization_algorithms::C14N_WITH_COMMENTS,
        }
    }

    /// Parses a canonicalization algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            canonicalization_algorithms::EXCLUSIVE_C14N => Some(Self::ExclusiveC14N),
            canonicalization_algorithms::EXCLUSIVE_C14N_WITH_COMMENTS => {
                Some(Self::ExclusiveC14NWithComments)
            }
            canonicalization_algorithms::C14N => Some(Self::C14N),
            canonicalization_algorithms::C14N_WITH_COMMENTS => Some(Self::C14NWithComments),
            _ => None,
        }
    }

    /// Returns true if this crate can produce the canonical form.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::ExclusiveC14N)
    }
}

/// A private key that produces raw signature bytes.
pub trait SigningKey: Send + Sync {
    /// Signs `data` (the canonical `ds:SignedInfo`) with `algorithm`.
    fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> MetadataResult<Vec<u8>>;

    /// Returns the DER certificate to publish in `ds:KeyInfo`, if any.
    fn certificate_der(&self) -> Option<Vec<u8>> {
        None
    }
}

/// A public key that checks raw signature bytes.
pub trait VerificationKey: Send + Sync {
    /// Returns true if `signature` is valid for `data` under `algorithm`.
    fn verify(&self, algorithm: SignatureAlgorithm, data: &[u8], signature: &[u8]) -> MetadataResult<bool>;
}

/// The parts of a `ds:Signature` element needed for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// The signature algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// The canonicalization algorithm used.
    pub canonicalization: CanonicalizationAlgorithm,
    /// The reference URI (`#` followed by the signed element's ID, or empty).
    pub reference_uri: String,
    /// Transform algorithm URIs, in order.
    pub transforms: Vec<String>,
    /// The digest algorithm URI.
    pub digest_algorithm: String,
    /// The digest value (base64 encoded).
    pub digest_value: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// Optional X.509 certificate (base64 encoded, DER format).
    pub x509_certificate: Option<String>,
}

impl XmlSignature {
    /// Reads a `ds:Signature` element.
    pub fn from_xml(signature: &XmlElement) -> MetadataResult<Self> {
        let invalid = |reason: &str| MetadataError::SignatureInvalid(reason.to_string());
        if !signature.is(NS_DS, "Signature") {
            return Err(invalid("not a ds:Signature element"));
        }
        let signed_info = signature
            .first_child_named(NS_DS, "SignedInfo")
            .ok_or_else(|| invalid("missing ds:SignedInfo"))?;

        let c14n_uri = algorithm_of(signed_info, "CanonicalizationMethod")?;
        let canonicalization = CanonicalizationAlgorithm::from_uri(c14n_uri)
            .ok_or_else(|| MetadataError::UnsupportedAlgorithm(c14n_uri.to_string()))?;
        let signature_uri = algorithm_of(signed_info, "SignatureMethod")?;
        let algorithm = SignatureAlgorithm::from_uri(signature_uri)
            .ok_or_else(|| MetadataError::UnsupportedAlgorithm(signature_uri.to_string()))?;

        let mut references = signed_info.children_named(NS_DS, "Reference");
        let reference = references.next().ok_or_else(|| invalid("missing ds:Reference"))?;
        if references.next().is_some() {
            return Err(invalid("more than one ds:Reference"));
        }
        let transforms = reference
            .children_named(NS_DS, "Transforms")
            .flat_map(|t| t.children_named(NS_DS, "Transform"))
            .filter_map(|t| t.attribute("Algorithm"))
            .map(str::to_string)
            .collect();

        let digest_value = reference
            .first_child_named(NS_DS, "DigestValue")
            .ok_or_else(|| invalid("missing ds:DigestValue"))?;
        let signature_value = signature
            .first_child_named(NS_DS, "SignatureValue")
            .ok_or_else(|| invalid("missing ds:SignatureValue"))?;
        let x509_certificate = signature
            .first_child_named(NS_DS, "KeyInfo")
            .and_then(|k| k.first_child_named(NS_DS, "X509Data"))
            .and_then(|d| d.first_child_named(NS_DS, "X509Certificate"))
            .map(|c| strip_whitespace(&c.text()));

        Ok(Self {
            algorithm,
            canonicalization,
            reference_uri: reference.attribute("URI").unwrap_or_default().to_string(),
            transforms,
            digest_algorithm: algorithm_of(reference, "DigestMethod")?.to_string(),
            digest_value: strip_whitespace(&digest_value.text()),
            signature_value: strip_whitespace(&signature_value.text()),
            x509_certificate,
        })
    }

    /// Decodes the embedded certificate.
    pub fn certificate_der(&self) -> MetadataResult<Option<Vec<u8>>> {
        self.x509_certificate
            .as_deref()
            .map(|cert| {
                STANDARD.decode(cert).map_err(|e| {
                    MetadataError::SignatureInvalid(format!("invalid certificate encoding: {e}"))
                })
            })
            .transpose()
    }
}

fn algorithm_of<'a>(parent: &'a XmlElement, local_name: &str) -> MetadataResult<&'a str> {
    parent
        .first_child_named(NS_DS, local_name)
        .and_then(|e| e.attribute("Algorithm"))
        .ok_or_else(|| MetadataError::SignatureInvalid(format!("missing ds:{local_name} Algorithm")))
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Computes a digest by algorithm URI. SHA-1 digests are not available.
pub(crate) fn compute_digest(algorithm_uri: &str, data: &[u8]) -> MetadataResult<Vec<u8>> {
    match algorithm_uri {
        digest_algorithms::SHA256 => Ok(Sha256::digest(data).to_vec()),
        digest_algorithms::SHA384 => Ok(Sha384::digest(data).to_vec()),
        digest_algorithms::SHA512 => Ok(Sha512::digest(data).to_vec()),
        other => Err(MetadataError::UnsupportedAlgorithm(other.to_string())),
    }
}

/// Configuration for signature creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// The signature algorithm to use.
    pub algorithm: SignatureAlgorithm,
    /// The canonicalization algorithm to use.
    pub canonicalization: CanonicalizationAlgorithm,
    /// Whether to include the X.509 certificate in the signature.
    pub include_certificate: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self::with_algorithm(SignatureAlgorithm::RsaSha256)
    }
}

impl SignatureConfig {
    /// Creates a new signature configuration with the given algorithm.
    #[must_use]
    pub const fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            canonicalization: CanonicalizationAlgorithm::ExclusiveC14N,
            include_certificate: true,
        }
    }
}
