// Copyright (c) 2024 Mike Tsao

//! Putting modules together: the registry and adjacency of a patch, and the
//! facade a user interface drives.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{ModuleGraph, ModuleSnapshot, Patch, PatchSnapshot};
}

pub use {
    graph::ModuleGraph,
    patch::{ModuleSnapshot, Patch, PatchSnapshot},
};

mod graph;
mod patch;
