// Copyright (c) 2024 Mike Tsao

#![warn(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Patchcord is the core of a modular synthesizer whose signal graph can be
//! rewired while it plays.
//!
//! Modules (oscillators, filters, delays, envelopes, and so on) are built out
//! of primitives supplied by an [AudioEngine](engine::AudioEngine). The crate
//! never renders audio itself. It decides which primitives exist, how they
//! are wired, and what automation they should play, and it keeps that picture
//! consistent no matter what order the user creates, connects, modulates, and
//! deletes things in.
//!
//! * [Patch] is the usual entry point. Create modules, connect them, route
//!   LFOs and envelopes into parameters, trigger envelopes, and take
//!   [snapshots](Patch::snapshot()) for display.
//! * [ModuleGraph](orchestration::ModuleGraph) and
//!   [ModulationRouter](automation::ModulationRouter) are the two halves
//!   [Patch] coordinates, usable on their own.
//! * [VirtualEngine](engine::VirtualEngine) is a deterministic engine that
//!   records wiring and evaluates automation curves against a clock you
//!   advance by hand.
//!
//! ```
//! use patchcord::prelude::*;
//!
//! let mut patch = Patch::default();
//! let osc = patch.create_module(ModuleKind::Oscillator);
//! let filter = patch.create_module(ModuleKind::Filter);
//! let lfo = patch.create_module(ModuleKind::Lfo);
//! patch.connect(osc, filter);
//! patch.connect_to_output(filter);
//! patch.route_modulation(lfo, Some(filter), "cutoff");
//! assert_eq!(patch.outputs(osc), &[filter]);
//! ```

/// A collection of imports that are useful to users of this crate. `use
/// patchcord::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        automation::prelude::*, engine::prelude::*, modules::prelude::*,
        orchestration::prelude::*, types::prelude::*, util::prelude::*,
    };
}

pub use orchestration::Patch;

pub mod automation;
pub mod engine;
pub mod modules;
pub mod orchestration;
pub mod types;
pub mod util;
