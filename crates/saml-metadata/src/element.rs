//! The encode/decode contract shared by metadata element types.

use saml_xml::XmlElement;

use crate::error::{MetadataError, MetadataResult};
use crate::registry::MetadataRegistry;

/// A typed element with a fixed wire name.
///
/// Decoding validates the element name and every invariant the type's
/// constructor checks; encoding produces a fresh element tree.
pub trait MetadataElement: Sized {
    /// Namespace URI of the element.
    const NAMESPACE: &'static str;
    /// Prefix used when emitting the element.
    const PREFIX: &'static str;
    /// Local name of the element.
    const LOCAL_NAME: &'static str;

    /// Decodes `element`, dispatching nested elements through `registry`.
    fn from_xml_with(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self>;

    /// Encodes this value as a standalone element.
    fn to_xml(&self) -> MetadataResult<XmlElement>;

    /// Decodes `element` with the default registry.
    fn from_xml(element: &XmlElement) -> MetadataResult<Self> {
        Self::from_xml_with(element, MetadataRegistry::global())
    }

    /// Parses XML text and decodes its root element.
    fn from_xml_str(xml: &str) -> MetadataResult<Self> {
        Self::from_xml(&XmlElement::parse(xml)?)
    }

    /// Encodes this value under `parent` and returns the created element.
    fn append_to<'a>(&self, parent: &'a mut XmlElement) -> MetadataResult<&'a mut XmlElement> {
        Ok(parent.append_child(self.to_xml()?))
    }

    /// Encodes this value and serializes it.
    fn to_xml_string(&self) -> MetadataResult<String> {
        Ok(self.to_xml()?.to_xml_string())
    }

    /// Returns `prefix:local`.
    #[must_use]
    fn qualified_name() -> String {
        format!("{}:{}", Self::PREFIX, Self::LOCAL_NAME)
    }

    /// Creates an empty element with this type's name.
    #[must_use]
    fn create_element() -> XmlElement {
        XmlElement::new_ns(Self::NAMESPACE, &Self::qualified_name())
    }
}

/// Renders `{namespace}local` for diagnostics.
pub(crate) fn clark_name(element: &XmlElement) -> String {
    match element.namespace_uri() {
        Some(ns) => format!("{{{ns}}}{}", element.local_name()),
        None => element.local_name().to_string(),
    }
}

/// Fails unless `element` carries `T`'s namespace and local name.
pub(crate) fn expect_element<T: MetadataElement>(element: &XmlElement) -> MetadataResult<()> {
    if element.is(T::NAMESPACE, T::LOCAL_NAME) {
        return Ok(());
    }
    Err(MetadataError::UnexpectedElementName {
        actual: clark_name(element),
        expected: format!("{{{}}}{}", T::NAMESPACE, T::LOCAL_NAME),
    })
}

/// Decodes every child of `parent` named like `T`, in document order.
pub(crate) fn children_of<T: MetadataElement>(
    parent: &XmlElement,
    registry: &MetadataRegistry,
) -> MetadataResult<Vec<T>> {
    parent
        .children_named(T::NAMESPACE, T::LOCAL_NAME)
        .map(|child| T::from_xml_with(child, registry))
        .collect()
}

/// Decodes at most one child named like `T`.
pub(crate) fn optional_child<T: MetadataElement>(
    parent: &XmlElement,
    registry: &MetadataRegistry,
) -> MetadataResult<Option<T>> {
    let mut matches = parent.children_named(T::NAMESPACE, T::LOCAL_NAME);
    let first = matches.next();
    if matches.next().is_some() {
        return Err(MetadataError::TooManyChildren {
            element: parent.qualified_name(),
            child: T::qualified_name(),
            max: 1,
        });
    }
    first.map(|child| T::from_xml_with(child, registry)).transpose()
}

/// Decodes the children named like `T`, requiring at least `min`.
pub(crate) fn required_children<T: MetadataElement>(
    parent: &XmlElement,
    registry: &MetadataRegistry,
    min: usize,
) -> MetadataResult<Vec<T>> {
    let children = children_of::<T>(parent, registry)?;
    if children.len() < min {
        return Err(MetadataError::missing_child(
            parent.qualified_name(),
            T::qualified_name(),
            min,
        ));
    }
    Ok(children)
}

/// Fails with `MissingRequiredChild` when `items` has fewer than `min` entries.
pub(crate) fn require_count<T: MetadataElement, I>(
    element: &str,
    items: &[I],
    min: usize,
) -> MetadataResult<()> {
    if items.len() < min {
        return Err(MetadataError::missing_child(element, T::qualified_name(), min));
    }
    Ok(())
}

/// Encodes every item under `parent`.
pub(crate) fn append_all<T: MetadataElement>(
    parent: &mut XmlElement,
    items: &[T],
) -> MetadataResult<()> {
    for item in items {
        item.append_to(parent)?;
    }
    Ok(())
}
