//! Domain layer: validated newtypes and domain errors.

pub mod errors;
pub mod newtypes;

pub use errors::DomainError;
pub use newtypes::{RelativePath, VolumePath};
