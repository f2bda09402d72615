// Copyright (c) 2024 Mike Tsao

//! Modulation: letting a control module (an LFO or an Envelope) drive a
//! parameter of another module.
//!
//! Unlike an audio connection, a modulation route bypasses the target's
//! logical input and lands directly on one of its engine parameters, where
//! the engine sums it with the parameter's own value. Each control module has
//! at most one active route; routing it again replaces the old one.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{ModulatedParam, ModulationRoute, ModulationRouter};
}

pub use router::{ModulatedParam, ModulationRoute, ModulationRouter};

mod router;
