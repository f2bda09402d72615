// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{PatchSettings, Rng};
}

pub use rng::Rng;
pub use settings::PatchSettings;

mod rng;
mod settings;
