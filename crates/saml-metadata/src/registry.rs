//! Decode dispatch tables.
//!
//! The registry maps `(namespace URI, local name)` to a decode function for
//! the two open positions in the metadata schema: role descriptors inside an
//! `md:EntityDescriptor` and elements inside `md:Extensions`. Elements with no
//! entry fall back to a verbatim copy instead of failing.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use saml_xml::XmlElement;
use tracing::debug;

use crate::element::{clark_name, MetadataElement};
use crate::error::MetadataResult;
use crate::types::{
    AttributeAuthorityDescriptor, AuthnAuthorityDescriptor, ExtensionElement, IdpSsoDescriptor,
    PdpDescriptor, PublicationInfo, RegistrationInfo, RoleDescriptor, SpSsoDescriptor,
    UnknownRoleDescriptor,
};

/// A decode function registered for one element name.
pub type DecodeFn<T> = fn(&XmlElement, &MetadataRegistry) -> MetadataResult<T>;

static GLOBAL: Lazy<MetadataRegistry> = Lazy::new(MetadataRegistry::with_defaults);

struct DispatchTable<T> {
    entries: HashMap<(String, String), DecodeFn<T>>,
}

impl<T> DispatchTable<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, namespace: &str, local_name: &str, decode: DecodeFn<T>) {
        self.entries
            .insert((namespace.to_string(), local_name.to_string()), decode);
    }

    fn lookup(&self, element: &XmlElement) -> Option<DecodeFn<T>> {
        let namespace = element.namespace_uri()?;
        self.entries
            .get(&(namespace.to_string(), element.local_name().to_string()))
            .copied()
    }

    fn contains(&self, namespace: &str, local_name: &str) -> bool {
        self.entries
            .contains_key(&(namespace.to_string(), local_name.to_string()))
    }
}

/// Decode-time configuration: which element names map to which typed decoders.
pub struct MetadataRegistry {
    roles: DispatchTable<RoleDescriptor>,
    extensions: DispatchTable<ExtensionElement>,
}

impl MetadataRegistry {
    /// Creates a registry with no entries; every element decodes verbatim.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            roles: DispatchTable::new(),
            extensions: DispatchTable::new(),
        }
    }

    /// Creates a registry with the standard role descriptors and mdrpi extensions.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register_role_type::<IdpSsoDescriptor>();
        registry.register_role_type::<SpSsoDescriptor>();
        registry.register_role_type::<AuthnAuthorityDescriptor>();
        registry.register_role_type::<AttributeAuthorityDescriptor>();
        registry.register_role_type::<PdpDescriptor>();
        registry.register_extension_type::<RegistrationInfo>();
        registry.register_extension_type::<PublicationInfo>();
        registry
    }

    /// Returns the shared default registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers a role descriptor decoder, replacing any previous entry.
    pub fn register_role(&mut self, namespace: &str, local_name: &str, decode: DecodeFn<RoleDescriptor>) {
        self.roles.insert(namespace, local_name, decode);
    }

    /// Registers an `md:Extensions` child decoder, replacing any previous entry.
    pub fn register_extension(
        &mut self,
        namespace: &str,
        local_name: &str,
        decode: DecodeFn<ExtensionElement>,
    ) {
        self.extensions.insert(namespace, local_name, decode);
    }

    fn register_role_type<T>(&mut self)
    where
        T: MetadataElement + Into<RoleDescriptor>,
    {
        self.register_role(T::NAMESPACE, T::LOCAL_NAME, |element, registry| {
            T::from_xml_with(element, registry).map(Into::into)
        });
    }

    fn register_extension_type<T>(&mut self)
    where
        T: MetadataElement + Into<ExtensionElement>,
    {
        self.register_extension(T::NAMESPACE, T::LOCAL_NAME, |element, registry| {
            T::from_xml_with(element, registry).map(Into::into)
        });
    }

    /// Returns true if a role decoder is registered for the name.
    #[must_use]
    pub fn has_role(&self, namespace: &str, local_name: &str) -> bool {
        self.roles.contains(namespace, local_name)
    }

    /// Returns true if an extension decoder is registered for the name.
    #[must_use]
    pub fn has_extension(&self, namespace: &str, local_name: &str) -> bool {
        self.extensions.contains(namespace, local_name)
    }

    /// Decodes an element in role descriptor position.
    ///
    /// Unregistered names decode as [`RoleDescriptor::Unknown`].
    pub fn decode_role(&self, element: &XmlElement) -> MetadataResult<RoleDescriptor> {
        match self.roles.lookup(element) {
            Some(decode) => decode(element, self),
            None => {
                debug!(element = %clark_name(element), "no role decoder registered, keeping element verbatim");
                Ok(RoleDescriptor::Unknown(UnknownRoleDescriptor::new(element.detached())))
            }
        }
    }

    /// Decodes an element inside `md:Extensions`.
    ///
    /// Unregistered names decode as [`ExtensionElement::Unknown`].
    pub fn decode_extension(&self, element: &XmlElement) -> MetadataResult<ExtensionElement> {
        match self.extensions.lookup(element) {
            Some(decode) => decode(element, self),
            None => {
                debug!(element = %clark_name(element), "no extension decoder registered, keeping element verbatim");
                Ok(ExtensionElement::Unknown(element.detached()))
            }
        }
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roles: Vec<_> = self.roles.entries.keys().collect();
        roles.sort();
        let mut extensions: Vec<_> = self.extensions.entries.keys().collect();
        extensions.sort();
        f.debug_struct("MetadataRegistry")
            .field("roles", &roles)
            .field("extensions", &extensions)
            .finish()
    }
}
