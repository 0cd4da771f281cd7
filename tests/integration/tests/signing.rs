//! Enveloped signatures on encoded documents.

use std::sync::Arc;

use metadata_integration_tests::{idp_entity, init_tracing, signer, validator, TestKey};
use saml_metadata::signature::{SignatureAlgorithm, SignatureConfig, XmlSigner};
use saml_metadata::{
    AssertionConsumerService, DocumentFields, EntityDescriptor, MetadataElement, MetadataError,
    RoleDescriptorBase, SamlBinding, SpSsoDescriptor, SsoDescriptorBase, XmlElement, NS_DS, NS_MD,
};

const INDENTED: &str = "<md:EntityDescriptor xmlns:md=\"urn:oasis:names:tc:SAML:2.0:metadata\" ID=\"_indented\" entityID=\"https://sp.example.org\">
  <md:SPSSODescriptor protocolSupportEnumeration=\"urn:oasis:names:tc:SAML:2.0:protocol\">
    <md:AssertionConsumerService Binding=\"urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST\" Location=\"https://sp.example.org/acs\" index=\"0\"/>
  </md:SPSSODescriptor>
</md:EntityDescriptor>";

#[test]
fn signed_entity_validates_after_parsing() -> anyhow::Result<()> {
    init_tracing();
    let xml = idp_entity()?.with_signer(signer(b"federation-key")).to_xml_string()?;
    let element = XmlElement::parse(&xml)?;

    let first = element.child_elements().next().expect("child");
    assert!(first.is(NS_DS, "Signature"), "{xml}");

    let signature = validator(b"federation-key").validate(&element)?;
    assert_eq!(signature.reference_uri, "#_idp-metadata");
    assert_eq!(signature.algorithm, SignatureAlgorithm::RsaSha256);
    assert_eq!(
        signature.certificate_der()?.as_deref(),
        Some(&b"integration test certificate"[..])
    );
    Ok(())
}

#[test]
fn tampered_content_is_rejected() -> anyhow::Result<()> {
    init_tracing();
    let xml = idp_entity()?.with_signer(signer(b"federation-key")).to_xml_string()?;
    let tampered = xml.replace("https://idp.example.org/slo", "https://attacker.example.org/slo");
    assert_ne!(tampered, xml);

    let err = validator(b"federation-key")
        .validate(&XmlElement::parse(&tampered)?)
        .unwrap_err();
    assert!(matches!(err, MetadataError::SignatureInvalid(ref reason) if reason.contains("digest")));
    Ok(())
}

#[test]
fn untrusted_key_is_rejected() -> anyhow::Result<()> {
    init_tracing();
    let xml = idp_entity()?.with_signer(signer(b"federation-key")).to_xml_string()?;
    let element = XmlElement::parse(&xml)?;

    assert!(matches!(
        validator(b"someone-else").validate(&element),
        Err(MetadataError::SignatureInvalid(_))
    ));
    let rotated = validator(b"someone-else").with_key(Arc::new(TestKey::new(b"federation-key")));
    assert!(rotated.validate(&element).is_ok());
    Ok(())
}

#[test]
fn decoded_signature_is_kept_until_dropped() -> anyhow::Result<()> {
    init_tracing();
    let xml = idp_entity()?.with_signer(signer(b"federation-key")).to_xml_string()?;
    let decoded = EntityDescriptor::from_xml_str(&xml)?;
    assert!(decoded.document().signature().is_some());

    let reencoded = decoded.to_xml_string()?;
    validator(b"federation-key").validate(&XmlElement::parse(&reencoded)?)?;

    let unsigned = decoded.without_signature().to_xml_string()?;
    assert!(!unsigned.contains("ds:Signature"));
    assert!(matches!(
        validator(b"federation-key").validate(&XmlElement::parse(&unsigned)?),
        Err(MetadataError::SignatureInvalid(_))
    ));
    Ok(())
}

#[test]
fn nested_role_signature_is_covered_by_the_entity_signature() -> anyhow::Result<()> {
    init_tracing();
    let acs = AssertionConsumerService::new(SamlBinding::HttpPost.uri(), "https://sp.example.org/acs", 0)?;
    let sp = SpSsoDescriptor::new(SsoDescriptorBase::new(RoleDescriptorBase::saml20()), vec![acs])?
        .with_signer(signer(b"role-key"));
    let entity = EntityDescriptor::with_roles("https://sp.example.org", vec![sp.into()])?
        .with_id("_sp")
        .with_signer(signer(b"entity-key"));

    let element = XmlElement::parse(&entity.to_xml_string()?)?;
    validator(b"entity-key").validate(&element)?;

    let role = element
        .first_child_named(NS_MD, "SPSSODescriptor")
        .expect("role element");
    let signature = validator(b"role-key").validate(role)?;
    assert_eq!(signature.reference_uri, "");
    Ok(())
}

#[test]
fn sha1_is_refused_for_signing() -> anyhow::Result<()> {
    init_tracing();
    let sha1 = Arc::new(
        XmlSigner::new(Arc::new(TestKey::new(b"k")))
            .with_config(SignatureConfig::with_algorithm(SignatureAlgorithm::RsaSha1)),
    );
    let err = idp_entity()?.with_signer(sha1).to_xml_string().unwrap_err();
    assert!(matches!(err, MetadataError::UnsupportedAlgorithm(_)));
    Ok(())
}

#[test]
fn stronger_digest_configuration_round_trips() -> anyhow::Result<()> {
    init_tracing();
    let strong = Arc::new(
        XmlSigner::new(Arc::new(TestKey::new(b"k")))
            .with_config(SignatureConfig::with_algorithm(SignatureAlgorithm::EcdsaSha512)),
    );
    let xml = idp_entity()?.with_signer(strong).to_xml_string()?;
    assert!(xml.contains("http://www.w3.org/2001/04/xmlenc#sha512"), "{xml}");
    let signature = validator(b"k").validate(&XmlElement::parse(&xml)?)?;
    assert_eq!(signature.algorithm, SignatureAlgorithm::EcdsaSha512);
    Ok(())
}

#[test]
fn indented_signed_document_validates_as_written() -> anyhow::Result<()> {
    init_tracing();
    let mut element = XmlElement::parse(INDENTED)?;
    XmlSigner::new(Arc::new(TestKey::new(b"federation-key"))).sign_element(&mut element)?;
    let signed = element.to_xml_string();
    assert!(signed.contains("\n    <md:AssertionConsumerService"), "{signed}");

    let signature = validator(b"federation-key").validate(&XmlElement::parse(&signed)?)?;
    assert_eq!(signature.reference_uri, "#_indented");

    let entity = EntityDescriptor::from_xml_str(&signed)?;
    assert!(entity.document().signature().is_some());
    let sp = entity.sp_sso_descriptor().expect("sp role");
    assert_eq!(sp.assertion_consumer_services().len(), 1);

    let collapsed = signed
        .replace("\n    ", "")
        .replace("\n  ", "")
        .replace("\n", "");
    assert_ne!(collapsed, signed);
    let err = validator(b"federation-key")
        .validate(&XmlElement::parse(&collapsed)?)
        .unwrap_err();
    assert!(matches!(err, MetadataError::SignatureInvalid(ref reason) if reason.contains("digest")));
    Ok(())
}
