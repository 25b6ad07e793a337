//! Resource catalog domain module.
//!
//! This crate contains the catalog model (resources, their location and
//! metering characteristics), the field-level merge used by partial updates,
//! validation rules and the change event published for every mutation. It is
//! pure domain logic: no IO, no HTTP, no storage.

pub mod characteristic;
pub mod event;
pub mod location;
pub mod patch;
pub mod resource;

pub use characteristic::{Characteristic, CharacteristicType};
pub use event::{ResourceEvent, ResourceTopics};
pub use location::Location;
pub use patch::ResourcePatch;
pub use resource::{Resource, ResourceType};
