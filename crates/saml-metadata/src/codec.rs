//! Codec primitives shared by every metadata element.
//!
//! Attribute extraction with required/optional/default semantics, the
//! boolean and xs:dateTime lexical forms used on the wire, whitespace
//! separated URI lists, and string/localized-string child lists.

use chrono::{DateTime, NaiveDateTime};
use saml_xml::{XmlElement, XML_NS};
use thiserror::Error;

use crate::error::{MetadataError, MetadataResult};
use crate::types::LocalizedString;

/// Earliest instant expressible as a four-digit-year xs:dateTime.
pub const MIN_TIMESTAMP: i64 = -62_167_219_200;

/// Latest instant expressible as a four-digit-year xs:dateTime.
pub const MAX_TIMESTAMP: i64 = 253_402_300_799;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A boolean attribute value other than `true`, `1`, `false` or `0`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid boolean literal '{0}'")]
pub struct InvalidBoolean(pub String);

/// A value that is not a UTC xs:dateTime in `YYYY-MM-DDThh:mm:ss[.fff]Z` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp '{0}'")]
pub struct InvalidTimestamp(pub String);

/// Returns the unqualified attribute `name`, failing when it is absent.
pub fn required_attribute<'a>(element: &'a XmlElement, name: &str) -> MetadataResult<&'a str> {
    element
        .attribute(name)
        .ok_or_else(|| MetadataError::missing_attribute(element.qualified_name(), name))
}

/// Returns the unqualified attribute `name` as an owned string, if present.
#[must_use]
pub fn optional_attribute(element: &XmlElement, name: &str) -> Option<String> {
    element.attribute(name).map(str::to_string)
}

/// Returns the unqualified attribute `name`, or `default` when absent.
#[must_use]
pub fn attribute_or(element: &XmlElement, name: &str, default: &str) -> String {
    element.attribute(name).unwrap_or(default).to_string()
}

/// Parses an xs:boolean literal.
///
/// `true` and `1` are true, `false` and `0` are false. Surrounding whitespace
/// is not accepted.
pub fn parse_boolean(value: &str) -> Result<bool, InvalidBoolean> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(InvalidBoolean(other.to_string())),
    }
}

/// Returns the wire literal for a boolean.
#[must_use]
pub const fn boolean_literal(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Decodes the optional boolean attribute `name`.
pub fn boolean_attribute(element: &XmlElement, name: &str) -> MetadataResult<Option<bool>> {
    element
        .attribute(name)
        .map(|value| {
            parse_boolean(value).map_err(|err| {
                MetadataError::invalid_attribute(element.qualified_name(), name, err.to_string())
            })
        })
        .transpose()
}

/// Parses a UTC xs:dateTime into Unix seconds.
///
/// Only the `Z` designator is accepted. Fractional seconds are truncated.
pub fn timestamp_from_xml(value: &str) -> Result<i64, InvalidTimestamp> {
    let invalid = || InvalidTimestamp(value.to_string());

    let body = value.strip_suffix('Z').ok_or_else(invalid)?;
    let (main, fraction) = match body.split_once('.') {
        Some((main, fraction)) => (main, Some(fraction)),
        None => (body, None),
    };
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
    }
    if !has_datetime_shape(main) {
        return Err(invalid());
    }

    NaiveDateTime::parse_from_str(main, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| invalid())
}

fn has_datetime_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Formats Unix seconds as `YYYY-MM-DDThh:mm:ssZ`.
pub fn timestamp_to_xml(timestamp: i64) -> Result<String, InvalidTimestamp> {
    if !(MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&timestamp) {
        return Err(InvalidTimestamp(timestamp.to_string()));
    }
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| format!("{}Z", dt.format(TIMESTAMP_FORMAT)))
        .ok_or_else(|| InvalidTimestamp(timestamp.to_string()))
}

/// Rejects timestamps that cannot be written as an xs:dateTime.
pub fn check_timestamp(element: &str, field: &str, timestamp: i64) -> MetadataResult<i64> {
    timestamp_to_xml(timestamp)
        .map(|_| timestamp)
        .map_err(|err| MetadataError::invalid_attribute(element, field, err.to_string()))
}

/// Decodes the optional xs:dateTime attribute `name`.
pub fn timestamp_attribute(element: &XmlElement, name: &str) -> MetadataResult<Option<i64>> {
    element
        .attribute(name)
        .map(|value| {
            timestamp_from_xml(value).map_err(|err| {
                MetadataError::invalid_attribute(element.qualified_name(), name, err.to_string())
            })
        })
        .transpose()
}

/// Writes `timestamp` as the attribute `name`.
pub fn set_timestamp_attribute(
    element: &mut XmlElement,
    name: &str,
    timestamp: i64,
) -> MetadataResult<()> {
    let value = timestamp_to_xml(timestamp).map_err(|err| {
        MetadataError::invalid_attribute(element.qualified_name(), name, err.to_string())
    })?;
    element.set_attribute(name, value);
    Ok(())
}

/// Splits a whitespace separated list of URIs.
#[must_use]
pub fn split_uri_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Joins URIs into a single space separated attribute value.
#[must_use]
pub fn join_uri_list(values: &[String]) -> String {
    values.join(" ")
}

/// Returns the text of every `{namespace}local_name` child, in document order.
#[must_use]
pub fn extract_strings(parent: &XmlElement, namespace: &str, local_name: &str) -> Vec<String> {
    parent
        .children_named(namespace, local_name)
        .map(XmlElement::text)
        .collect()
}

/// Appends one `qualified_name` child per value.
pub fn append_strings(parent: &mut XmlElement, namespace: &str, qualified_name: &str, values: &[String]) {
    for value in values {
        parent
            .append_element_ns(namespace, qualified_name)
            .set_text(value.as_str());
    }
}

/// Decodes every `{namespace}local_name` child as a localized string.
pub fn extract_localized(
    parent: &XmlElement,
    namespace: &str,
    local_name: &str,
) -> MetadataResult<Vec<LocalizedString>> {
    parent
        .children_named(namespace, local_name)
        .map(LocalizedString::from_xml)
        .collect()
}

/// Appends one `qualified_name` child per localized string.
pub fn append_localized(
    parent: &mut XmlElement,
    namespace: &str,
    qualified_name: &str,
    values: &[LocalizedString],
) {
    for value in values {
        let child = parent.append_element_ns(namespace, qualified_name);
        child.set_attribute_ns(XML_NS, "xml:lang", value.language());
        child.set_text(value.value());
    }
}

/// Fails with `EmptyRequiredValue` when `value` is empty.
pub fn require_non_empty(element: &str, field: &str, value: &str) -> MetadataResult<()> {
    if value.is_empty() {
        return Err(MetadataError::empty_value(element, field));
    }
    Ok(())
}

/// Generates a fresh document ID (`_` followed by a random UUID).
#[must_use]
pub fn generate_id() -> String {
    format!("_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_literals() {
        assert_eq!(parse_boolean("true"), Ok(true));
        assert_eq!(parse_boolean("1"), Ok(true));
        assert_eq!(parse_boolean("false"), Ok(false));
        assert_eq!(parse_boolean("0"), Ok(false));
        assert!(parse_boolean("TRUE").is_err());
        assert!(parse_boolean(" true").is_err());
        assert!(parse_boolean("").is_err());
    }

    #[test]
    fn boolean_attribute_reports_element() {
        let e = XmlElement::parse(r#"<md:X xmlns:md="urn:md" isDefault="yes"/>"#).unwrap();
        let err = boolean_attribute(&e, "isDefault").unwrap_err();
        assert!(matches!(
            err,
            MetadataError::InvalidAttributeFormat { ref element, ref attribute, .. }
                if element == "md:X" && attribute == "isDefault"
        ));
        assert_eq!(boolean_attribute(&e, "other").unwrap(), None);
    }

    #[test]
    fn timestamp_conversion() {
        assert_eq!(timestamp_from_xml("2009-02-13T23:31:30Z"), Ok(1_234_567_890));
        assert_eq!(timestamp_from_xml("1970-01-01T00:00:00Z"), Ok(0));
        assert_eq!(timestamp_from_xml("2009-02-13T23:31:30.987Z"), Ok(1_234_567_890));
        assert_eq!(timestamp_to_xml(1_234_567_890).unwrap(), "2009-02-13T23:31:30Z");
        assert_eq!(timestamp_to_xml(0).unwrap(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn malformed_timestamps_are_rejected() {
        for value in [
            "2009-02-13T23:31:30",
            "2009-02-13T23:31:30+01:00",
            "2009-02-13 23:31:30Z",
            "2009-2-13T23:31:30Z",
            "2009-02-30T23:31:30Z",
            "2009-02-13T23:31:30.Z",
            "+2009-02-13T23:31:30Z",
            "",
        ] {
            assert!(timestamp_from_xml(value).is_err(), "{value}");
        }
    }

    #[test]
    fn out_of_range_timestamps_are_rejected() {
        assert!(timestamp_to_xml(MAX_TIMESTAMP).is_ok());
        assert!(timestamp_to_xml(MAX_TIMESTAMP + 1).is_err());
        assert!(timestamp_to_xml(MIN_TIMESTAMP).is_ok());
        assert!(check_timestamp("md:EntityDescriptor", "validUntil", i64::MAX).is_err());
    }

    #[test]
    fn uri_lists() {
        let list = split_uri_list("  urn:a\turn:b\nurn:c ");
        assert_eq!(list, vec!["urn:a", "urn:b", "urn:c"]);
        assert_eq!(join_uri_list(&list), "urn:a urn:b urn:c");
        assert!(split_uri_list("   ").is_empty());
    }

    #[test]
    fn required_and_defaulted_attributes() {
        let e = XmlElement::parse(r#"<a x="1"/>"#).unwrap();
        assert_eq!(required_attribute(&e, "x").unwrap(), "1");
        assert!(matches!(
            required_attribute(&e, "y"),
            Err(MetadataError::MissingRequiredAttribute { .. })
        ));
        assert_eq!(optional_attribute(&e, "y"), None);
        assert_eq!(attribute_or(&e, "y", "dflt"), "dflt");
    }

    #[test]
    fn string_lists() {
        let mut parent = XmlElement::new_ns("urn:md", "md:P");
        append_strings(&mut parent, "urn:md", "md:NameIDFormat", &["a".to_string(), "b".to_string()]);
        assert_eq!(extract_strings(&parent, "urn:md", "NameIDFormat"), vec!["a", "b"]);
    }

    #[test]
    fn generated_ids_are_ncnames() {
        let id = generate_id();
        assert!(id.starts_with('_'));
        assert_eq!(id.len(), 33);
        assert_ne!(id, generate_id());
    }
}
