//! Shared fixtures for the metadata integration tests.

use std::sync::Arc;

use saml_metadata::signature::{SignatureAlgorithm, SigningKey, VerificationKey, XmlSigner, XmlSignatureValidator};
use saml_metadata::{
    AssertionConsumerService, ContactPerson, ContactType, DocumentFields, EntityDescriptor, IdpSsoDescriptor,
    KeyDescriptor, KeyUse, LocalizedString, MetadataResult, NameIdFormat, Organization, RoleDescriptorBase,
    SamlBinding, SingleLogoutService, SingleSignOnService, SpSsoDescriptor, SsoDescriptorBase,
};
use sha2::{Digest, Sha256};

/// Installs a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("saml_metadata=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A keyed SHA-256 standing in for an asymmetric key pair.
pub struct TestKey {
    secret: Vec<u8>,
}

impl TestKey {
    /// Creates a key from a shared secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    fn mac(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(algorithm.uri().as_bytes());
        hasher.update(data);
        hasher.finalize().to_vec()
    }
}

impl SigningKey for TestKey {
    fn sign(&self, algorithm: SignatureAlgorithm, data: &[u8]) -> MetadataResult<Vec<u8>> {
        Ok(self.mac(algorithm, data))
    }

    fn certificate_der(&self) -> Option<Vec<u8>> {
        Some(b"integration test certificate".to_vec())
    }
}

impl VerificationKey for TestKey {
    fn verify(&self, algorithm: SignatureAlgorithm, data: &[u8], signature: &[u8]) -> MetadataResult<bool> {
        Ok(self.mac(algorithm, data) == signature)
    }
}

/// A signer backed by [`TestKey`].
pub fn signer(secret: &[u8]) -> Arc<XmlSigner> {
    Arc::new(XmlSigner::new(Arc::new(TestKey::new(secret))))
}

/// A validator trusting [`TestKey`].
pub fn validator(secret: &[u8]) -> XmlSignatureValidator {
    XmlSignatureValidator::new(Arc::new(TestKey::new(secret)))
}

/// A representative identity provider entity.
pub fn idp_entity() -> anyhow::Result<EntityDescriptor> {
    let organization = Organization::new(
        vec![LocalizedString::new("en", "Example")?],
        vec![LocalizedString::new("en", "Example Identity")?],
        vec![LocalizedString::new("en", "https://example.org")?],
    )?;
    let role = RoleDescriptorBase::saml20()
        .with_key_descriptor(KeyDescriptor::with_certificate("MIIBsjCCARugAwIBAgIJ").with_use(KeyUse::Signing));
    let sso = SsoDescriptorBase::new(role)
        .with_single_logout_service(SingleLogoutService::new(
            SamlBinding::HttpRedirect.uri(),
            "https://idp.example.org/slo",
        )?)
        .with_name_id_format(NameIdFormat::Persistent.uri())?;
    let idp = IdpSsoDescriptor::new(
        sso,
        vec![
            SingleSignOnService::new(SamlBinding::HttpRedirect.uri(), "https://idp.example.org/sso")?,
            SingleSignOnService::new(SamlBinding::HttpPost.uri(), "https://idp.example.org/sso")?,
        ],
    )?
    .with_want_authn_requests_signed(true);

    Ok(EntityDescriptor::with_roles("https://idp.example.org", vec![idp.into()])?
        .with_organization(organization)
        .with_contact(
            ContactPerson::new(ContactType::Technical)
                .with_given_name("Ops")
                .with_email_address("mailto:ops@example.org"),
        )
        .with_id("_idp-metadata")
        .with_cache_duration("PT12H"))
}

/// A representative service provider entity.
pub fn sp_entity(entity_id: &str) -> anyhow::Result<EntityDescriptor> {
    let acs = AssertionConsumerService::new(SamlBinding::HttpPost.uri(), format!("{entity_id}/acs"), 0)?
        .with_default(true);
    let sp = SpSsoDescriptor::new(SsoDescriptorBase::new(RoleDescriptorBase::saml20()), vec![acs])?
        .with_want_assertions_signed(true);
    Ok(EntityDescriptor::with_roles(entity_id, vec![sp.into()])?)
}
