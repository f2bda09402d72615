// Copyright (c) 2024 Mike Tsao

use super::{set_param, wire, ContinuousSource};
use crate::prelude::*;

/// A sine LFO scaled by a depth gain. The depth gain is the module's output,
/// so routing it into a parameter adds `depth * sin(...)` to that parameter.
#[derive(Debug)]
pub struct LfoCore {
    osc: ContinuousSource,
    depth_gain: NodeId,
    frequency: FrequencyHz,
    depth: Normal,
}
impl LfoCore {
    #[allow(missing_docs)]
    pub const DEFAULT_FREQUENCY: FrequencyHz = FrequencyHz(2.0);
    #[allow(missing_docs)]
    pub const DEFAULT_DEPTH: Normal = Normal::new_const(0.5);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine) -> Self {
        let osc = engine.create_node(NodeKind::Oscillator);
        let depth_gain = engine.create_node(NodeKind::Gain);
        engine
            .set_waveform(osc, Waveform::Sine)
            .absorb("choosing LFO waveform");
        wire(engine, osc, depth_gain);

        let mut r = Self {
            osc: ContinuousSource::new_with(osc),
            depth_gain,
            frequency: Self::DEFAULT_FREQUENCY,
            depth: Self::DEFAULT_DEPTH,
        };
        r.set_frequency(engine, r.frequency);
        r.set_depth(engine, r.depth);
        r
    }

    #[allow(missing_docs)]
    pub fn osc(&self) -> NodeId {
        self.osc.node()
    }

    #[allow(missing_docs)]
    pub fn output(&self) -> NodeId {
        self.depth_gain
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
    pub fn depth(&self) -> Normal {
        self.depth
    }

    #[allow(missing_docs)]
    pub fn set_depth(&mut self, engine: &mut dyn AudioEngine, depth: Normal) {
        self.depth = depth;
        set_param(engine, self.depth_gain, ParamName::Gain, depth.0);
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lfo_defaults() {
        let mut engine = VirtualEngine::default();
        let mut core = LfoCore::new_with(&mut engine);
        assert_eq!(
            engine.node(core.osc()).unwrap().waveform(),
            Some(Waveform::Sine)
        );
        assert_eq!(
            engine
                .param_value(ParamId::new(core.osc(), ParamName::Frequency))
                .unwrap(),
            2.0
        );
        let depth = ParamId::new(core.output(), ParamName::Gain);
        assert_eq!(engine.param_value(depth).unwrap(), 0.5);

        core.set_depth(&mut engine, 0.2.into());
        core.set_frequency(&mut engine, FrequencyHz(6.0));
        assert_eq!(engine.param_value(depth).unwrap(), 0.2);
        assert_eq!(core.frequency(), FrequencyHz(6.0));
    }
}
