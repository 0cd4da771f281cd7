//! Construction and decoding reject the same invalid shapes.

use metadata_integration_tests::{init_tracing, sp_entity};
use saml_metadata::{
    AffiliationDescriptor, AssertionConsumerService, EntityDescriptor, IdpSsoDescriptor, MetadataElement,
    MetadataError, RoleDescriptorBase, SsoDescriptorBase,
};

fn sp_role() -> anyhow::Result<saml_metadata::RoleDescriptor> {
    let entity = sp_entity("https://sp.example.org")?;
    Ok(entity.roles()[0].clone())
}

#[test]
fn empty_entity_id_is_rejected() -> anyhow::Result<()> {
    init_tracing();
    let err = EntityDescriptor::new("", vec![sp_role()?], None).unwrap_err();
    assert!(matches!(err, MetadataError::EmptyRequiredValue { ref field, .. } if field == "entityID"));

    let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID=""><md:AffiliationDescriptor affiliationOwnerID="o"><md:AffiliateMember>a</md:AffiliateMember></md:AffiliationDescriptor></md:EntityDescriptor>"#;
    assert!(matches!(
        EntityDescriptor::from_xml_str(xml),
        Err(MetadataError::EmptyRequiredValue { .. })
    ));
    Ok(())
}

#[test]
fn entity_needs_exactly_one_of_roles_or_affiliation() -> anyhow::Result<()> {
    init_tracing();
    assert!(matches!(
        EntityDescriptor::new("id", Vec::new(), None),
        Err(MetadataError::InvalidRoleComposition { has_roles: false, has_affiliation: false })
    ));

    let affiliation = AffiliationDescriptor::new("o", ["a"])?;
    assert!(matches!(
        EntityDescriptor::new("id", vec![sp_role()?], Some(affiliation)),
        Err(MetadataError::InvalidRoleComposition { has_roles: true, has_affiliation: true })
    ));

    let both = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="id"><md:SPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol"><md:AssertionConsumerService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="https://sp.example.org/acs" index="0"/></md:SPSSODescriptor><md:AffiliationDescriptor affiliationOwnerID="o"><md:AffiliateMember>a</md:AffiliateMember></md:AffiliationDescriptor></md:EntityDescriptor>"#;
    assert!(matches!(
        EntityDescriptor::from_xml_str(both),
        Err(MetadataError::InvalidRoleComposition { has_roles: true, has_affiliation: true })
    ));
    Ok(())
}

#[test]
fn affiliation_owner_and_members_are_checked() {
    init_tracing();
    assert!(matches!(
        AffiliationDescriptor::new("", ["a"]),
        Err(MetadataError::EmptyRequiredValue { .. })
    ));
    assert!(matches!(
        AffiliationDescriptor::new("o", Vec::<String>::new()),
        Err(MetadataError::MissingRequiredChild { .. })
    ));
    assert!(matches!(
        AffiliationDescriptor::new("o", ["a", ""]),
        Err(MetadataError::EmptyRequiredValue { .. })
    ));

    let no_members = r#"<md:AffiliationDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" affiliationOwnerID="o"/>"#;
    assert!(matches!(
        AffiliationDescriptor::from_xml_str(no_members),
        Err(MetadataError::MissingRequiredChild { .. })
    ));
}

#[test]
fn indexed_endpoint_without_index_fails_decode() {
    init_tracing();
    let xml = r#"<md:AssertionConsumerService xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="https://sp.example.org/acs"/>"#;
    let err = AssertionConsumerService::from_xml_str(xml).unwrap_err();
    assert!(matches!(
        err,
        MetadataError::MissingRequiredAttribute { ref element, ref attribute }
            if attribute == "index" && element == "md:AssertionConsumerService"
    ));
}

#[test]
fn idp_without_sso_endpoint_fails_both_ways() {
    init_tracing();
    let sso = SsoDescriptorBase::new(RoleDescriptorBase::saml20());
    assert!(matches!(
        IdpSsoDescriptor::new(sso, Vec::new()),
        Err(MetadataError::MissingRequiredChild { .. })
    ));

    let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example.org"><md:IDPSSODescriptor protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol"><md:NameIDFormat>urn:oasis:names:tc:SAML:2.0:nameid-format:transient</md:NameIDFormat></md:IDPSSODescriptor></md:EntityDescriptor>"#;
    assert!(matches!(
        EntityDescriptor::from_xml_str(xml),
        Err(MetadataError::MissingRequiredChild { ref child, .. }) if child == "md:SingleSignOnService"
    ));
}

#[test]
fn wrong_root_element_is_reported() {
    init_tracing();
    let xml = r#"<md:EntitiesDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata"/>"#;
    let err = EntityDescriptor::from_xml_str(xml).unwrap_err();
    assert!(matches!(
        err,
        MetadataError::UnexpectedElementName { ref actual, ref expected }
            if actual.ends_with("EntitiesDescriptor") && expected.ends_with("EntityDescriptor")
    ));
}

#[test]
fn malformed_xml_is_an_xml_error() {
    init_tracing();
    let err = EntityDescriptor::from_xml_str("<md:EntityDescriptor").unwrap_err();
    assert!(matches!(err, MetadataError::Xml(_)));
    assert!(err.is_decode_error());
}
