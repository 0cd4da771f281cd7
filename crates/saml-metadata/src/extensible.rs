//! Namespace-qualified extension attributes.
//!
//! Any metadata element may carry attributes from foreign namespaces. They
//! are kept in an [`ExtensibleAttributes`] bag, independent of the element's
//! schema fields, and written back with their original qualified names.

use saml_xml::{QualifiedName, XmlElement};

use crate::error::{MetadataError, MetadataResult};

/// One namespace-qualified attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionAttribute {
    qualified_name: String,
    namespace_uri: String,
    local_name: String,
    value: String,
}

impl ExtensionAttribute {
    /// Returns the `prefix:local` name.
    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Insertion-ordered bag of extension attributes keyed by `(namespace, local name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensibleAttributes {
    entries: Vec<ExtensionAttribute>,
}

impl ExtensibleAttributes {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, overwriting any entry with the same namespace and local name.
    ///
    /// `qualified_name` must carry a prefix.
    pub fn set(
        &mut self,
        namespace_uri: &str,
        qualified_name: &str,
        value: impl Into<String>,
    ) -> MetadataResult<()> {
        let name = QualifiedName::parse(qualified_name);
        if name.prefix().map_or(true, str::is_empty) || name.local_name().is_empty() {
            return Err(MetadataError::NotQualifiedName(qualified_name.to_string()));
        }

        let entry = ExtensionAttribute {
            qualified_name: qualified_name.to_string(),
            namespace_uri: namespace_uri.to_string(),
            local_name: name.local_name().to_string(),
            value: value.into(),
        };
        match self
            .entries
            .iter_mut()
            .find(|e| e.namespace_uri == entry.namespace_uri && e.local_name == entry.local_name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(
        mut self,
        namespace_uri: &str,
        qualified_name: &str,
        value: impl Into<String>,
    ) -> MetadataResult<Self> {
        self.set(namespace_uri, qualified_name, value)?;
        Ok(self)
    }

    /// Returns true if `{namespace_uri}local_name` is present.
    #[must_use]
    pub fn has(&self, namespace_uri: &str, local_name: &str) -> bool {
        self.get(namespace_uri, local_name).is_some()
    }

    /// Returns the entry for `{namespace_uri}local_name`.
    #[must_use]
    pub fn get(&self, namespace_uri: &str, local_name: &str) -> Option<&ExtensionAttribute> {
        self.entries
            .iter()
            .find(|e| e.namespace_uri == namespace_uri && e.local_name == local_name)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionAttribute> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collects the namespace-qualified attributes of `element`.
    ///
    /// Unqualified attributes belong to the element's schema and are skipped.
    #[must_use]
    pub fn from_xml(element: &XmlElement) -> Self {
        let entries = element
            .attributes()
            .iter()
            .filter_map(|attr| {
                let namespace_uri = attr.namespace.as_ref()?;
                Some(ExtensionAttribute {
                    qualified_name: attr.name.to_string(),
                    namespace_uri: namespace_uri.clone(),
                    local_name: attr.local_name().to_string(),
                    value: attr.value.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    /// Writes every entry onto `element`.
    pub fn apply_to(&self, element: &mut XmlElement) {
        for entry in &self.entries {
            element.set_attribute_ns(&entry.namespace_uri, &entry.qualified_name, entry.value.as_str());
        }
    }
}

impl<'a> IntoIterator for &'a ExtensibleAttributes {
    type Item = &'a ExtensionAttribute;
    type IntoIter = std::slice::Iter<'a, ExtensionAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:x-test";

    #[test]
    fn unqualified_names_are_rejected() {
        let mut attrs = ExtensibleAttributes::new();
        let err = attrs.set(NS, "attr", "v").unwrap_err();
        assert!(matches!(err, MetadataError::NotQualifiedName(name) if name == "attr"));
        assert!(attrs.set(NS, ":attr", "v").is_err());
        assert!(attrs.is_empty());
    }

    #[test]
    fn set_overwrites_same_namespace_and_local_name() {
        let mut attrs = ExtensibleAttributes::new();
        attrs.set(NS, "test:attr1", "a").unwrap();
        attrs.set(NS, "test:attr2", "b").unwrap();
        attrs.set(NS, "other:attr1", "c").unwrap();
        assert_eq!(attrs.len(), 2);
        let first = attrs.iter().next().unwrap();
        assert_eq!(first.qualified_name(), "other:attr1");
        assert_eq!(first.value(), "c");
        assert!(attrs.has(NS, "attr2"));
        assert!(!attrs.has("urn:other", "attr2"));
        assert!(attrs.get(NS, "missing").is_none());
    }

    #[test]
    fn decoding_keeps_only_qualified_attributes() {
        let e = XmlElement::parse(
            r#"<md:SingleSignOnService xmlns:md="urn:md" xmlns:test="urn:x-test" Binding="b" test:a="1" Location="l" test:b="2"/>"#,
        )
        .unwrap();
        let attrs = ExtensibleAttributes::from_xml(&e);
        let names: Vec<&str> = attrs.iter().map(ExtensionAttribute::qualified_name).collect();
        assert_eq!(names, vec!["test:a", "test:b"]);
        assert_eq!(attrs.get(NS, "b").map(ExtensionAttribute::value), Some("2"));
    }

    #[test]
    fn apply_writes_qualified_names() {
        let attrs = ExtensibleAttributes::new().with(NS, "test:attr", "v").unwrap();
        let mut e = XmlElement::new_ns("urn:md", "md:X");
        attrs.apply_to(&mut e);
        assert_eq!(e.attribute_ns(NS, "attr"), Some("v"));
        assert_eq!(
            e.to_xml_string(),
            r#"<md:X xmlns:md="urn:md" xmlns:test="urn:x-test" test:attr="v"/>"#
        );
    }
}
