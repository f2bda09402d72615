// Copyright (c) 2024 Mike Tsao

//! Configuration for a patch. Intended to be serialized.

use crate::types::prelude::*;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Knobs that shape how modules allocate their engine resources. Every field
/// has a sensible default, so a partial JSON document is fine.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct PatchSettings {
    /// The rate the engine is expected to run at.
    pub sample_rate: SampleRate,

    /// Length of the looping white-noise buffer.
    #[derivative(Default(value = "Seconds(2.0)"))]
    pub noise_seconds: Seconds,

    /// Length of the synthetic reverb impulse response.
    #[derivative(Default(value = "Seconds(2.5)"))]
    pub reverb_impulse_seconds: Seconds,

    /// Resolution of the distortion transfer curve.
    #[derivative(Default(value = "44100"))]
    pub distortion_curve_samples: usize,

    /// Longest delay the Delay module can be set to.
    #[derivative(Default(value = "Seconds(5.0)"))]
    pub delay_max_seconds: Seconds,

    /// Longest delay either Chorus voice can reach.
    #[derivative(Default(value = "Seconds(0.05)"))]
    pub chorus_max_delay_seconds: Seconds,

    /// Fixes the random stream for noise and impulses. None means a fresh seed
    /// from the OS.
    pub rng_seed: Option<u64>,
}
impl PatchSettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes settings to pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
