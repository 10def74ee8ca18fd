//! Core resource model
//!
//! A normalized view of a cluster object. Every other component operates on
//! this view only, never on raw wire payloads.

mod owner_kind;
mod resource;

pub use owner_kind::OwnerKind;
pub use resource::{
    Condition, LineageRef, OwnerRef, Resource, ResourceStatus, resource_key,
};
