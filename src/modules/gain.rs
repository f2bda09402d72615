// Copyright (c) 2024 Mike Tsao

use super::set_param;
use crate::prelude::*;

/// A single gain stage that multiplies the signal by a constant factor.
#[derive(Debug)]
pub struct GainCore {
    node: NodeId,
    gain: Normal,
}
impl GainCore {
    #[allow(missing_docs)]
    pub const DEFAULT_GAIN: Normal = Normal::new_const(0.5);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine) -> Self {
        let mut r = Self {
            node: engine.create_node(NodeKind::Gain),
            gain: Self::DEFAULT_GAIN,
        };
        r.set_gain(engine, r.gain);
        r
    }

    #[allow(missing_docs)]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[allow(missing_docs)]
    pub fn gain(&self) -> Normal {
        self.gain
    }

    #[allow(missing_docs)]
    pub fn set_gain(&mut self, engine: &mut dyn AudioEngine, gain: Normal) {
        self.gain = gain;
        set_param(engine, self.node, ParamName::Gain, gain.0);
    }

    pub(super) fn modulation_input(&self, param: ModulatedParam) -> Option<ParamId> {
        (param == ModulatedParam::Gain).then(|| ParamId::new(self.node, ParamName::Gain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_mainline() {
        let mut engine = VirtualEngine::default();
        let mut core = GainCore::new_with(&mut engine);
        let param = ParamId::new(core.node(), ParamName::Gain);
        assert_eq!(engine.param_value(param).unwrap(), 0.5);

        core.set_gain(&mut engine, 0.8.into());
        assert_eq!(engine.param_value(param).unwrap(), 0.8);

        core.set_gain(&mut engine, 3.0.into());
        assert_eq!(core.gain(), Normal::maximum(), "gain is clamped to [0, 1]");
    }
}
