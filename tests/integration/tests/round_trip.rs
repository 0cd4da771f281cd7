//! Encode/decode idempotence on whole documents.

use metadata_integration_tests::{idp_entity, init_tracing, sp_entity};
use saml_metadata::{
    AffiliationDescriptor, AttributeConsumingService, DocumentFields, EntitiesDescriptor, EntityDescriptor,
    ExtensibleAttributes, Extensions, LocalizedString, MetadataElement, PublicationInfo, RegistrationInfo,
    RequestedAttribute, SamlBinding,
};

const AFFILIATION: &str = r#"<md:AffiliationDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" affiliationOwnerID="TheOwner" ID="TheID" validUntil="2009-02-13T23:31:30Z" cacheDuration="PT5000S"><md:AffiliateMember>Member</md:AffiliateMember><md:AffiliateMember>OtherMember</md:AffiliateMember></md:AffiliationDescriptor>"#;

#[test]
fn affiliation_descriptor_end_to_end() -> anyhow::Result<()> {
    init_tracing();
    let affiliation = AffiliationDescriptor::from_xml_str(AFFILIATION)?;
    assert_eq!(affiliation.owner_id(), "TheOwner");
    assert_eq!(affiliation.id(), Some("TheID"));
    assert_eq!(affiliation.valid_until(), Some(1_234_567_890));
    assert_eq!(affiliation.cache_duration(), Some("PT5000S"));
    assert_eq!(affiliation.members(), ["Member", "OtherMember"]);
    assert_eq!(affiliation.to_xml_string()?, AFFILIATION);
    Ok(())
}

#[test]
fn built_and_decoded_documents_agree() -> anyhow::Result<()> {
    init_tracing();
    let entity = idp_entity()?;
    let xml = entity.to_xml_string()?;
    let decoded = EntityDescriptor::from_xml_str(&xml)?;

    assert_eq!(decoded, entity);
    assert_eq!(decoded.to_xml_string()?, xml);

    let idp = decoded.idp_sso_descriptor().expect("idp role");
    assert_eq!(idp.want_authn_requests_signed(), Some(true));
    assert_eq!(idp.single_sign_on_services().len(), 2);
    assert!(idp.single_sign_on_service(SamlBinding::HttpPost.uri()).is_some());
    assert_eq!(
        idp.sso().role().key_descriptors()[0].certificates(),
        vec!["MIIBsjCCARugAwIBAgIJ"]
    );
    Ok(())
}

#[test]
fn entity_children_follow_schema_order() -> anyhow::Result<()> {
    init_tracing();
    let xml = idp_entity()?.to_xml_string()?;
    let positions: Vec<usize> = [
        "<md:IDPSSODescriptor",
        "<md:Organization>",
        "<md:ContactPerson",
    ]
    .iter()
    .map(|tag| xml.find(tag).expect("tag present"))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{xml}");

    let role_start = positions[0];
    let idp_section = &xml[role_start..positions[1]];
    let order = [
        "<md:KeyDescriptor",
        "<md:SingleLogoutService",
        "<md:NameIDFormat",
        "<md:SingleSignOnService",
    ];
    let found: Vec<usize> = order
        .iter()
        .map(|tag| idp_section.find(tag).expect("tag present"))
        .collect();
    assert!(found.windows(2).all(|w| w[0] < w[1]), "{idp_section}");
    Ok(())
}

#[test]
fn extensions_and_extension_attributes_survive() -> anyhow::Result<()> {
    init_tracing();
    let extensions = Extensions::new()
        .with(
            RegistrationInfo::new("https://federation.example.org")?
                .with_registration_instant(1_234_567_890)?
                .with_registration_policy(LocalizedString::new("en", "https://federation.example.org/policy")?),
        )
        .with(PublicationInfo::new("https://federation.example.org")?.with_publication_id("pub-1"));
    let attributes = ExtensibleAttributes::new().with("urn:x-example", "ex:tier", "gold")?;

    let entity = sp_entity("https://sp.example.org")?
        .with_extensions(extensions)
        .with_attributes(attributes);
    let xml = entity.to_xml_string()?;
    assert!(xml.contains(r#"xmlns:ex="urn:x-example""#), "{xml}");
    assert!(xml.contains(r#"ex:tier="gold""#), "{xml}");

    let decoded = EntityDescriptor::from_xml_str(&xml)?;
    assert_eq!(decoded, entity);
    let extensions = decoded.extensions().expect("extensions");
    assert_eq!(
        extensions.registration_info().map(|r| r.registration_authority()),
        Some("https://federation.example.org")
    );
    assert_eq!(
        extensions.publication_info().and_then(|p| p.publication_id()),
        Some("pub-1")
    );
    assert_eq!(
        decoded.attributes().get("urn:x-example", "tier").map(|a| a.value()),
        Some("gold")
    );
    assert_eq!(decoded.to_xml_string()?, xml);
    Ok(())
}

#[test]
fn unknown_extension_content_is_kept_verbatim() -> anyhow::Result<()> {
    init_tracing();
    let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example.org"><md:Extensions><shibmd:Scope xmlns:shibmd="urn:mace:shibboleth:metadata:1.0" regexp="false">example.org</shibmd:Scope></md:Extensions><md:AffiliationDescriptor affiliationOwnerID="o"><md:AffiliateMember>a</md:AffiliateMember></md:AffiliationDescriptor></md:EntityDescriptor>"#;
    let entity = EntityDescriptor::from_xml_str(xml)?;
    assert_eq!(entity.extensions().map(|e| e.elements().len()), Some(1));
    assert_eq!(entity.to_xml_string()?, xml);
    Ok(())
}

#[test]
fn attribute_consuming_service_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let service = AttributeConsumingService::new(
        1,
        vec![LocalizedString::new("en", "Portal")?],
        vec![RequestedAttribute::new("urn:oid:0.9.2342.19200300.100.1.3")?
            .with_required(true)],
    )?
    .with_default(true);
    let xml = service.to_xml_string()?;
    let decoded = AttributeConsumingService::from_xml_str(&xml)?;
    assert_eq!(decoded, service);
    assert_eq!(decoded.requested_attributes()[0].is_required(), Some(true));
    Ok(())
}

#[test]
fn aggregate_metadata_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let nested = EntitiesDescriptor::new(vec![sp_entity("https://sp2.example.org")?.into()])?;
    let aggregate = EntitiesDescriptor::new(vec![
        idp_entity()?.into(),
        sp_entity("https://sp1.example.org")?.into(),
        nested.into(),
    ])?
    .with_name("https://federation.example.org")
    .with_valid_until(1_900_000_000)?;

    let xml = aggregate.to_xml_string()?;
    let decoded = EntitiesDescriptor::from_xml_str(&xml)?;
    assert_eq!(decoded, aggregate);
    assert_eq!(decoded.entities().len(), 3);
    assert!(decoded.find_entity("https://sp2.example.org").is_some());
    assert_eq!(decoded.to_xml_string()?, xml);
    Ok(())
}
