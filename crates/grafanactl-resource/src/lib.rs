//! The Resource data model: an opaque Kubernetes-style document, its stable
//! reference, group/version/kind identity types, and the deduplicated
//! `ResourceSet` collection that owns them.

pub mod error;
pub mod gvk;
pub mod resource;
pub mod set;

pub use error::{ResourceError, Result};
pub use gvk::{Descriptor, GroupVersionKind, GroupVersionResource};
pub use resource::{ObjectMeta, Resource, ResourceRef, FOLDER_KIND, MANAGED_BY_ANNOTATION, MANAGED_BY_SELF};
pub use set::ResourceSet;
