//! Fields shared by signable metadata documents and the signing hook.
//!
//! EntityDescriptor, EntitiesDescriptor, AffiliationDescriptor and every role
//! descriptor carry an optional ID, validity, cache duration, Extensions and
//! enveloped signature. [`MetadataDocument`] holds them; [`DocumentFields`]
//! exposes them uniformly.

use std::fmt;
use std::sync::Arc;

use saml_xml::XmlElement;
use tracing::debug;

use crate::codec::{
    check_timestamp, generate_id, optional_attribute, set_timestamp_attribute, timestamp_attribute,
};
use crate::element::{optional_child, MetadataElement};
use crate::error::{MetadataError, MetadataResult};
use crate::registry::MetadataRegistry;
use crate::signature::XmlSigner;
use crate::types::{Extensions, NS_DS};

/// A signer attached to a document, applied when the document is encoded.
#[derive(Clone)]
pub struct SigningContext(Arc<XmlSigner>);

impl SigningContext {
    /// Wraps a shared signer.
    #[must_use]
    pub fn new(signer: Arc<XmlSigner>) -> Self {
        Self(signer)
    }

    /// Returns the signer.
    #[must_use]
    pub fn signer(&self) -> &XmlSigner {
        &self.0
    }
}

impl PartialEq for SigningContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SigningContext {}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningContext")
            .field(&self.0.config().algorithm)
            .finish()
    }
}

/// ID, validity, cache duration, Extensions and signature of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDocument {
    id: Option<String>,
    valid_until: Option<i64>,
    cache_duration: Option<String>,
    extensions: Option<Extensions>,
    signature: Option<XmlElement>,
    signer: Option<SigningContext>,
}

impl MetadataDocument {
    /// Decodes the shared attributes, the Extensions child and a retained `ds:Signature`.
    pub(crate) fn decode(element: &XmlElement, registry: &MetadataRegistry) -> MetadataResult<Self> {
        let mut signatures = element.children_named(NS_DS, "Signature");
        let signature = signatures.next().map(XmlElement::detached);
        if signatures.next().is_some() {
            return Err(MetadataError::TooManyChildren {
                element: element.qualified_name(),
                child: "ds:Signature".to_string(),
                max: 1,
            });
        }

        Ok(Self {
            id: optional_attribute(element, "ID"),
            valid_until: timestamp_attribute(element, "validUntil")?,
            cache_duration: optional_attribute(element, "cacheDuration"),
            extensions: optional_child::<Extensions>(element, registry)?,
            signature,
            signer: None,
        })
    }

    /// Writes `ID`, `validUntil` and `cacheDuration` when present.
    pub(crate) fn encode_attributes(&self, element: &mut XmlElement) -> MetadataResult<()> {
        if let Some(id) = &self.id {
            element.set_attribute("ID", id.as_str());
        }
        if let Some(valid_until) = self.valid_until {
            set_timestamp_attribute(element, "validUntil", valid_until)?;
        }
        if let Some(cache_duration) = &self.cache_duration {
            element.set_attribute("cacheDuration", cache_duration.as_str());
        }
        Ok(())
    }

    /// Appends the Extensions child when present.
    pub(crate) fn encode_extensions(&self, element: &mut XmlElement) -> MetadataResult<()> {
        if let Some(extensions) = &self.extensions {
            extensions.append_to(element)?;
        }
        Ok(())
    }

    /// Signing hook, run once the element's full child tree is written.
    ///
    /// With a signer the element is signed and the new `ds:Signature` becomes
    /// its first child. Without one, a signature retained from decoding is
    /// re-inserted in the same position.
    pub(crate) fn finish(&self, element: &mut XmlElement) -> MetadataResult<()> {
        if let Some(context) = &self.signer {
            debug!(element = %element.qualified_name(), id = ?self.id, "signing metadata element");
            context.signer().sign_element(element)?;
        } else if let Some(signature) = &self.signature {
            element.insert_child(0, signature.clone());
        }
        Ok(())
    }

    /// Returns the ID.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the validUntil instant (Unix seconds).
    #[must_use]
    pub const fn valid_until(&self) -> Option<i64> {
        self.valid_until
    }

    /// Returns the cache duration (xs:duration lexical form).
    #[must_use]
    pub fn cache_duration(&self) -> Option<&str> {
        self.cache_duration.as_deref()
    }

    /// Returns the Extensions block.
    #[must_use]
    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    /// Returns the `ds:Signature` retained from decoding.
    #[must_use]
    pub fn signature(&self) -> Option<&XmlElement> {
        self.signature.as_ref()
    }

    /// Returns true if a signer is attached.
    #[must_use]
    pub const fn has_signer(&self) -> bool {
        self.signer.is_some()
    }
}

/// Builders and accessors for types that embed a [`MetadataDocument`].
pub trait DocumentFields: Sized {
    /// Returns the shared document fields.
    fn document(&self) -> &MetadataDocument;

    #[doc(hidden)]
    fn document_mut(&mut self) -> &mut MetadataDocument;

    /// Returns the element name used in error messages.
    fn element_name(&self) -> String;

    /// Returns the ID.
    fn id(&self) -> Option<&str> {
        self.document().id()
    }

    /// Returns the validUntil instant.
    fn valid_until(&self) -> Option<i64> {
        self.document().valid_until()
    }

    /// Returns the cache duration.
    fn cache_duration(&self) -> Option<&str> {
        self.document().cache_duration()
    }

    /// Returns the Extensions block.
    fn extensions(&self) -> Option<&Extensions> {
        self.document().extensions()
    }

    /// Sets the ID.
    #[must_use]
    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.document_mut().id = Some(id.into());
        self
    }

    /// Sets a freshly generated ID.
    #[must_use]
    fn with_generated_id(self) -> Self {
        self.with_id(generate_id())
    }

    /// Sets validUntil (Unix seconds). Fails if not representable as xs:dateTime.
    fn with_valid_until(mut self, valid_until: i64) -> MetadataResult<Self> {
        let valid_until = check_timestamp(&self.element_name(), "validUntil", valid_until)?;
        self.document_mut().valid_until = Some(valid_until);
        Ok(self)
    }

    /// Sets the cache duration.
    #[must_use]
    fn with_cache_duration(mut self, cache_duration: impl Into<String>) -> Self {
        self.document_mut().cache_duration = Some(cache_duration.into());
        self
    }

    /// Sets the Extensions block.
    #[must_use]
    fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.document_mut().extensions = Some(extensions);
        self
    }

    /// Attaches a signer; the document is signed each time it is encoded.
    #[must_use]
    fn with_signer(mut self, signer: Arc<XmlSigner>) -> Self {
        self.document_mut().signer = Some(SigningContext::new(signer));
        self
    }

    /// Drops a signature retained from decoding.
    #[must_use]
    fn without_signature(mut self) -> Self {
        self.document_mut().signature = None;
        self
    }
}
