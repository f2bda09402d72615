// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use derive_more::{Add, Display, From, Sub};
use serde::{Deserialize, Serialize};

/// The type of every scalar that flows into an engine automation target.
pub type ParameterType = f64;

/// Frequency is usually measured in hertz (Hz), or cycles per second.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, PartialOrd, Add, Sub, Display, From, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyHz(pub ParameterType);
#[allow(missing_docs)]
impl FrequencyHz {
    /// Lowest frequency the filter/oscillator sliders offer.
    pub const MIN: FrequencyHz = FrequencyHz(0.1);
    /// Highest frequency the filter/oscillator sliders offer.
    pub const MAX: FrequencyHz = FrequencyHz(22050.0);

    /// Returns a copy that has been multiplied by the given ratio.
    pub fn scaled(&self, ratio: ParameterType) -> Self {
        Self(self.0 * ratio)
    }
}
impl From<f32> for FrequencyHz {
    fn from(value: f32) -> Self {
        Self(value as ParameterType)
    }
}
impl From<FrequencyHz> for f64 {
    fn from(value: FrequencyHz) -> Self {
        value.0
    }
}
