// Copyright (c) 2024 Mike Tsao

use super::{set_param, wire, ContinuousSource};
use crate::prelude::*;

/// A sawtooth oscillator feeding an output level stage.
#[derive(Debug)]
pub struct OscillatorCore {
    osc: ContinuousSource,
    level: NodeId,
    frequency: FrequencyHz,
    gain: Normal,
}
impl OscillatorCore {
    #[allow(missing_docs)]
    pub const DEFAULT_FREQUENCY: FrequencyHz = FrequencyHz(220.0);
    #[allow(missing_docs)]
    pub const DEFAULT_GAIN: Normal = Normal::new_const(0.5);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine) -> Self {
        let osc = engine.create_node(NodeKind::Oscillator);
        let level = engine.create_node(NodeKind::Gain);
        engine
            .set_waveform(osc, Waveform::Sawtooth)
            .absorb("choosing oscillator waveform");
        wire(engine, osc, level);

        let mut r = Self {
            osc: ContinuousSource::new_with(osc),
            level,
            frequency: Self::DEFAULT_FREQUENCY,
            gain: Self::DEFAULT_GAIN,
        };
        r.set_frequency(engine, r.frequency);
        r.set_gain(engine, r.gain);
        r
    }

    /// The raw oscillator primitive.
    pub fn osc(&self) -> NodeId {
        self.osc.node()
    }

    #[allow(missing_docs)]
    pub fn output(&self) -> NodeId {
        self.level
    }

    #[allow(missing_docs)]
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }

    #[allow(missing_docs)]
    pub fn set_frequency(&mut self, engine: &mut dyn AudioEngine, frequency: FrequencyHz) {
        self.frequency = frequency;
        set_param(engine, self.osc.node(), ParamName::Frequency, frequency.0);
    }

    #[allow(missing_docs)]
    pub fn gain(&self) -> Normal {
        self.gain
    }

    #[allow(missing_docs)]
    pub fn set_gain(&mut self, engine: &mut dyn AudioEngine, gain: Normal) {
        self.gain = gain;
        set_param(engine, self.level, ParamName::Gain, gain.0);
    }

    #[allow(missing_docs)]
    pub fn source_state(&self) -> SourceState {
        self.osc.state()
    }

    pub(super) fn start(&mut self, engine: &mut dyn AudioEngine) -> bool {
        self.osc.start(engine)
    }

    pub(super) fn stop(&mut self, engine: &mut dyn AudioEngine) -> bool {
        self.osc.stop(engine)
    }

    pub(super) fn modulation_input(&self, param: ModulatedParam) -> Option<ParamId> {
        match param {
            ModulatedParam::Frequency => Some(ParamId::new(self.osc.node(), ParamName::Frequency)),
            ModulatedParam::Gain => Some(ParamId::new(self.level, ParamName::Gain)),
            ModulatedParam::Resonance => None,
        }
    }
}
