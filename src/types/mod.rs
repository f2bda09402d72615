// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        FrequencyHz, IsUid, Normal, ParameterType, SampleRate, Seconds, Uid, UidFactory,
    };
}

pub use {
    numbers::{FrequencyHz, ParameterType},
    ranges::{Normal, RangedF64},
    time::{SampleRate, Seconds},
    uid::{IsUid, Uid, UidFactory},
};

mod numbers;
mod ranges;
mod time;
mod uid;
