//! SAML 2.0 metadata types.
//!
//! Every element type implements [`MetadataElement`](crate::MetadataElement)
//! for decoding from and encoding to an [`XmlElement`](saml_xml::XmlElement).

mod affiliation;
mod attribute;
mod constants;
mod entities;
mod entity;
pub(crate) mod endpoint;
mod extensions;
mod key_descriptor;
mod localized;
mod name_id;
mod organization;
mod registration;
mod role;

pub use affiliation::*;
pub use attribute::*;
pub use constants::*;
pub use endpoint::{
    ArtifactResolutionService, AssertionConsumerService, AssertionIdRequestService, AttributeService,
    AuthnQueryService, AuthzService, Endpoint, IndexedEndpoint, ManageNameIdService, NameIdMappingService,
    SingleLogoutService, SingleSignOnService,
};
pub use entities::*;
pub use entity::*;
pub use extensions::*;
pub use key_descriptor::*;
pub use localized::*;
pub use name_id::*;
pub use organization::*;
pub use registration::*;
pub use role::*;
