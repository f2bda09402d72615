// Copyright (c) 2024 Mike Tsao

use derivative::Derivative;
use derive_more::{Add, Display, From, Sub};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of
/// time. The engine clock, ramp durations, and delay times are all [Seconds].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, PartialOrd, Add, Sub, Display, From, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }

    /// Returns the larger of the two.
    pub fn max(self, other: Seconds) -> Seconds {
        Seconds(self.0.max(other.0))
    }
}
impl From<f32> for Seconds {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl From<Seconds> for f64 {
    fn from(value: Seconds) -> Self {
        value.0
    }
}

/// Samples per second. Always a positive integer; cannot be zero.
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(#[derivative(Default(value = "44100"))] pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 44100;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }

    /// The number of frames needed to hold the given duration at this rate.
    pub fn frames_for(&self, duration: Seconds) -> usize {
        (self.0 as f64 * duration.0) as usize
    }
}
impl From<SampleRate> for f64 {
    fn from(value: SampleRate) -> Self {
        value.0 as f64
    }
}
