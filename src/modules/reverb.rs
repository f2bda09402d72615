// Copyright (c) 2024 Mike Tsao

use super::{set_param, wire};
use crate::prelude::*;

/// Convolution reverb. The impulse response is two channels of white noise
/// under a quadratic decay, generated once at construction.
#[derive(Debug)]
pub struct ReverbCore {
    convolver: NodeId,
    wet: NodeId,
    output: NodeId,
    wet_level: Normal,
}
impl ReverbCore {
    #[allow(missing_docs)]
    pub const DEFAULT_WET: Normal = Normal::new_const(0.5);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine, impulse_seconds: Seconds, rng: &mut Rng) -> Self {
        let convolver = engine.create_node(NodeKind::Convolver);
        let wet = engine.create_node(NodeKind::Gain);
        let output = engine.create_node(NodeKind::Gain);
        engine
            .set_buffer(
                convolver,
                Self::impulse_response(engine.sample_rate(), impulse_seconds, rng),
            )
            .absorb("loading reverb impulse");
        wire(engine, convolver, wet);
        wire(engine, wet, output);

        let mut r = Self {
            convolver,
            wet,
            output,
            wet_level: Self::DEFAULT_WET,
        };
        r.set_wet(engine, r.wet_level);
        r
    }

    /// Builds a stereo impulse whose amplitude envelope is (1 - i/len)².
    pub fn impulse_response(sample_rate: SampleRate, seconds: Seconds, rng: &mut Rng) -> AudioBuffer {
        let mut buffer = AudioBuffer::new_with(2, sample_rate.frames_for(seconds), sample_rate);
        rng.fill_noise(&mut buffer, |i, len| {
            let remaining = 1.0 - i as f32 / len as f32;
            remaining * remaining
        });
        buffer
    }

    /// The convolver, which is also where input lands.
    pub fn input(&self) -> NodeId {
        self.convolver
    }

    #[allow(missing_docs)]
    pub fn output(&self) -> NodeId {
        self.output
    }

    #[allow(missing_docs)]
    pub fn wet(&self) -> Normal {
        self.wet_level
    }

    #[allow(missing_docs)]
    pub fn set_wet(&mut self, engine: &mut dyn AudioEngine, wet: Normal) {
        self.wet_level = wet;
        set_param(engine, self.wet, ParamName::Gain, wet.0);
    }
}
