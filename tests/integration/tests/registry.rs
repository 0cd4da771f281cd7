//! Decoding through caller-supplied registries.

use metadata_integration_tests::{init_tracing, sp_entity};
use saml_metadata::{
    EntityDescriptor, ExtensionElement, MetadataElement, MetadataError, MetadataRegistry, MetadataResult,
    RoleDescriptor, UnknownRoleDescriptor, XmlElement, NS_MD, NS_XSI,
};

const WSFED: &str = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://sts.example.org"><md:RoleDescriptor xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:fed="http://docs.oasis-open.org/wsfed/federation/200706" xsi:type="fed:SecurityTokenServiceType" protocolSupportEnumeration="http://docs.oasis-open.org/wsfed/federation/200706"><fed:ClaimTypesOffered/></md:RoleDescriptor></md:EntityDescriptor>"#;

const FED: &str = "http://docs.oasis-open.org/wsfed/federation/200706";

const ROOT_DECLARED: &str = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:fed="http://docs.oasis-open.org/wsfed/federation/200706" xmlns:mdattr="urn:oasis:names:tc:SAML:metadata:attribute" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" entityID="https://sts.example.org"><md:Extensions><mdattr:EntityAttributes><saml:Attribute Name="http://macedir.org/entity-category"><saml:AttributeValue xsi:type="xs:string">http://refeds.org/category/research-and-scholarship</saml:AttributeValue></saml:Attribute></mdattr:EntityAttributes></md:Extensions><md:RoleDescriptor xsi:type="fed:SecurityTokenServiceType" protocolSupportEnumeration="http://docs.oasis-open.org/wsfed/federation/200706"><fed:ClaimTypesOffered/></md:RoleDescriptor></md:EntityDescriptor>"#;

fn security_token_service(element: &XmlElement, _: &MetadataRegistry) -> MetadataResult<RoleDescriptor> {
    match element.attribute_ns(NS_XSI, "type") {
        Some(kind) if kind.ends_with(":SecurityTokenServiceType") => {
            Ok(UnknownRoleDescriptor::new(element.clone()).into())
        }
        _ => Err(MetadataError::MissingRequiredAttribute {
            element: element.qualified_name(),
            attribute: "xsi:type".to_string(),
        }),
    }
}

#[test]
fn custom_role_decoder_is_consulted() -> anyhow::Result<()> {
    init_tracing();
    let mut registry = MetadataRegistry::with_defaults();
    registry.register_role(NS_MD, "RoleDescriptor", security_token_service);
    assert!(registry.has_role(NS_MD, "RoleDescriptor"));

    let entity = EntityDescriptor::from_xml_with(&XmlElement::parse(WSFED)?, &registry)?;
    assert!(entity.roles()[0].is_unknown());
    assert_eq!(entity.to_xml_string()?, WSFED);

    let untyped = WSFED.replace(r#" xsi:type="fed:SecurityTokenServiceType""#, "");
    assert!(matches!(
        EntityDescriptor::from_xml_with(&XmlElement::parse(&untyped)?, &registry),
        Err(MetadataError::MissingRequiredAttribute { ref attribute, .. }) if attribute == "xsi:type"
    ));
    // The shared registry keeps unregistered roles without checking them.
    assert!(EntityDescriptor::from_xml_str(&untyped).is_ok());
    Ok(())
}

#[test]
fn empty_registry_keeps_every_role_verbatim() -> anyhow::Result<()> {
    init_tracing();
    let xml = sp_entity("https://sp.example.org")?.to_xml_string()?;
    let registry = MetadataRegistry::empty();
    let entity = EntityDescriptor::from_xml_with(&XmlElement::parse(&xml)?, &registry)?;

    match &entity.roles()[0] {
        RoleDescriptor::Unknown(role) => assert_eq!(role.element().local_name(), "SPSSODescriptor"),
        other => panic!("expected a verbatim role, got {other:?}"),
    }
    assert!(entity.sp_sso_descriptor().is_none());
    assert_eq!(entity.to_xml_string()?, xml);
    Ok(())
}

#[test]
fn custom_extension_decoder_applies_inside_entities() -> anyhow::Result<()> {
    init_tracing();
    fn scope(element: &XmlElement, _: &MetadataRegistry) -> MetadataResult<ExtensionElement> {
        if element.text().trim().is_empty() {
            return Err(MetadataError::EmptyRequiredValue {
                element: element.qualified_name(),
                field: "Scope".to_string(),
            });
        }
        Ok(ExtensionElement::Unknown(element.clone()))
    }

    let mut registry = MetadataRegistry::with_defaults();
    registry.register_extension("urn:mace:shibboleth:metadata:1.0", "Scope", scope);

    let xml = r#"<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="https://idp.example.org"><md:Extensions><shibmd:Scope xmlns:shibmd="urn:mace:shibboleth:metadata:1.0" regexp="false"></shibmd:Scope></md:Extensions><md:AffiliationDescriptor affiliationOwnerID="o"><md:AffiliateMember>a</md:AffiliateMember></md:AffiliationDescriptor></md:EntityDescriptor>"#;
    let element = XmlElement::parse(xml)?;
    assert!(matches!(
        EntityDescriptor::from_xml_with(&element, &registry),
        Err(MetadataError::EmptyRequiredValue { ref field, .. }) if field == "Scope"
    ));
    assert!(EntityDescriptor::from_xml_with(&element, MetadataRegistry::global()).is_ok());
    Ok(())
}

#[test]
fn prefixes_declared_only_on_the_root_survive_re_encoding() -> anyhow::Result<()> {
    init_tracing();
    let entity = EntityDescriptor::from_xml_str(ROOT_DECLARED)?;
    match &entity.roles()[0] {
        RoleDescriptor::Unknown(role) => {
            assert_eq!(role.element().declared_namespace(Some("fed")), Some(FED));
            assert_eq!(
                role.element().to_xml_string(),
                r#"<md:RoleDescriptor xmlns:fed="http://docs.oasis-open.org/wsfed/federation/200706" xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="fed:SecurityTokenServiceType" protocolSupportEnumeration="http://docs.oasis-open.org/wsfed/federation/200706"><fed:ClaimTypesOffered/></md:RoleDescriptor>"#
            );
        }
        other => panic!("expected a verbatim role, got {other:?}"),
    }

    let xml = entity.to_xml_string()?;
    assert!(xml.contains(r#"<md:RoleDescriptor xmlns:fed="http://docs.oasis-open.org/wsfed/federation/200706""#), "{xml}");
    assert!(xml.contains(r#"<mdattr:EntityAttributes xmlns:xs="http://www.w3.org/2001/XMLSchema""#), "{xml}");

    let reparsed = XmlElement::parse(&xml)?;
    let role = reparsed
        .first_child_named(NS_MD, "RoleDescriptor")
        .expect("role element");
    assert_eq!(role.attribute_ns(NS_XSI, "type"), Some("fed:SecurityTokenServiceType"));
    assert_eq!(role.declared_namespace(Some("fed")), Some(FED));
    assert_eq!(EntityDescriptor::from_xml_str(&xml)?.to_xml_string()?, xml);
    Ok(())
}
