//! Shared name types and the canonical type-descriptor codec.
//!
//! This crate is intentionally small and dependency-free (besides string
//! interning) so every other crate in the workspace can sit on top of it
//! without dragging in parsing or I/O concerns.

mod descriptor;
mod fs;
mod name;
mod namespace;

pub use crate::descriptor::{canonical, internal_to_canonical, parameter_types, return_type, to_descriptor};
pub use crate::fs::collect_files_with_extension;
pub use crate::name::Name;
pub use crate::namespace::is_runtime_namespace;
