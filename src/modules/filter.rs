// Copyright (c) 2024 Mike Tsao

use super::set_param;
use crate::prelude::*;

/// A resonant lowpass biquad.
#[derive(Debug)]
pub struct FilterCore {
    node: NodeId,
    frequency: FrequencyHz,
    q: ParameterType,
}
impl FilterCore {
    #[allow(missing_docs)]
    pub const DEFAULT_FREQUENCY: FrequencyHz = FrequencyHz(800.0);
    #[allow(missing_docs)]
    pub const DEFAULT_Q: ParameterType = 1.0;

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine) -> Self {
        let node = engine.create_node(NodeKind::BiquadFilter);
        engine
            .set_filter_type(node, FilterType::Lowpass)
            .absorb("choosing filter response");
        let mut r = Self {
            node,
            frequency: Self::DEFAULT_FREQUENCY,
            q: Self::DEFAULT_Q,
        };
        r.set_frequency(engine, r.frequency);
        r.set_q(engine, r.q);
        r
    }

    #[allow(missing_docs)]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The cutoff.
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }

    #[allow(missing_docs)]
    pub fn set_frequency(&mut self, engine: &mut dyn AudioEngine, frequency: FrequencyHz) {
        self.frequency = frequency;
        set_param(engine, self.node, ParamName::Frequency, frequency.0);
    }

    /// The resonance.
    pub fn q(&self) -> ParameterType {
        self.q
    }

    #[allow(missing_docs)]
    pub fn set_q(&mut self, engine: &mut dyn AudioEngine, q: ParameterType) {
        self.q = q;
        set_param(engine, self.node, ParamName::Q, q);
    }

    pub(super) fn modulation_input(&self, param: ModulatedParam) -> Option<ParamId> {
        match param {
            ModulatedParam::Frequency => Some(ParamId::new(self.node, ParamName::Frequency)),
            ModulatedParam::Resonance => Some(ParamId::new(self.node, ParamName::Q)),
            ModulatedParam::Gain => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_and_setters() {
        let mut engine = VirtualEngine::default();
        let mut core = FilterCore::new_with(&mut engine);
        assert_eq!(
            engine.node(core.node()).unwrap().filter_type(),
            Some(FilterType::Lowpass)
        );
        let cutoff = ParamId::new(core.node(), ParamName::Frequency);
        assert_eq!(engine.param_value(cutoff).unwrap(), 800.0);

        core.set_frequency(&mut engine, FrequencyHz(1200.0));
        core.set_q(&mut engine, 4.5);
        assert_eq!(engine.param_value(cutoff).unwrap(), 1200.0);
        assert_eq!(
            engine
                .param_value(ParamId::new(core.node(), ParamName::Q))
                .unwrap(),
            4.5
        );
        assert_eq!(core.q(), 4.5);
    }
}
