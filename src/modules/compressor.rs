// Copyright (c) 2024 Mike Tsao

use super::set_param;
use crate::prelude::*;

/// A dynamics compressor. Threshold and knee are in dB; attack and release
/// are times.
#[derive(Debug)]
pub struct CompressorCore {
    node: NodeId,
    threshold: ParameterType,
    knee: ParameterType,
    ratio: ParameterType,
    attack: Seconds,
    release: Seconds,
}
impl CompressorCore {
    #[allow(missing_docs)]
    pub const DEFAULT_THRESHOLD: ParameterType = -24.0;
    #[allow(missing_docs)]
    pub const DEFAULT_KNEE: ParameterType = 30.0;
    #[allow(missing_docs)]
    pub const DEFAULT_RATIO: ParameterType = 12.0;
    #[allow(missing_docs)]
    pub const DEFAULT_ATTACK: Seconds = Seconds(0.003);
    #[allow(missing_docs)]
    pub const DEFAULT_RELEASE: Seconds = Seconds(0.25);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine) -> Self {
        let mut r = Self {
            node: engine.create_node(NodeKind::DynamicsCompressor),
            threshold: Self::DEFAULT_THRESHOLD,
            knee: Self::DEFAULT_KNEE,
            ratio: Self::DEFAULT_RATIO,
            attack: Self::DEFAULT_ATTACK,
            release: Self::DEFAULT_RELEASE,
        };
        r.set_threshold(engine, r.threshold);
        set_param(engine, r.node, ParamName::Knee, r.knee);
        r.set_ratio(engine, r.ratio);
        r.set_attack(engine, r.attack);
        r.set_release(engine, r.release);
        r
    }

    #[allow(missing_docs)]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[allow(missing_docs)]
    pub fn threshold(&self) -> ParameterType {
        self.threshold
    }

    #[allow(missing_docs)]
    pub fn set_threshold(&mut self, engine: &mut dyn AudioEngine, threshold: ParameterType) {
        self.threshold = threshold;
        set_param(engine, self.node, ParamName::Threshold, threshold);
    }

    /// Fixed at construction.
    pub fn knee(&self) -> ParameterType {
        self.knee
    }

    #[allow(missing_docs)]
    pub fn ratio(&self) -> ParameterType {
        self.ratio
    }

    #[allow(missing_docs)]
    pub fn set_ratio(&mut self, engine: &mut dyn AudioEngine, ratio: ParameterType) {
        self.ratio = ratio;
        set_param(engine, self.node, ParamName::Ratio, ratio);
    }

    #[allow(missing_docs)]
    pub fn attack(&self) -> Seconds {
        self.attack
    }

    #[allow(missing_docs)]
    pub fn set_attack(&mut self, engine: &mut dyn AudioEngine, attack: Seconds) {
        self.attack = attack;
        set_param(engine, self.node, ParamName::Attack, attack.0);
    }

    #[allow(missing_docs)]
    pub fn release(&self) -> Seconds {
        self.release
    }

    #[allow(missing_docs)]
    pub fn set_release(&mut self, engine: &mut dyn AudioEngine, release: Seconds) {
        self.release = release;
        set_param(engine, self.node, ParamName::Release, release.0);
    }
}
