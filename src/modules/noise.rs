// Copyright (c) 2024 Mike Tsao

use super::{set_param, wire, ContinuousSource};
use crate::prelude::*;

/// A looping buffer of white noise feeding an output level stage.
#[derive(Debug)]
pub struct NoiseCore {
    source: ContinuousSource,
    level: NodeId,
    buffer_seconds: Seconds,
    gain: Normal,
}
impl NoiseCore {
    #[allow(missing_docs)]
    pub const DEFAULT_GAIN: Normal = Normal::new_const(0.1);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine, buffer_seconds: Seconds, rng: &mut Rng) -> Self {
        let level = engine.create_node(NodeKind::Gain);
        let source = Self::new_source(engine, buffer_seconds, rng);
        wire(engine, source, level);
        let mut r = Self {
            source: ContinuousSource::new_with(source),
            level,
            buffer_seconds,
            gain: Self::DEFAULT_GAIN,
        };
        r.set_gain(engine, r.gain);
        r
    }

    fn new_source(engine: &mut dyn AudioEngine, seconds: Seconds, rng: &mut Rng) -> NodeId {
        let sample_rate = engine.sample_rate();
        let mut buffer = AudioBuffer::new_with(1, sample_rate.frames_for(seconds), sample_rate);
        rng.fill_noise(&mut buffer, |_, _| 1.0);

        let source = engine.create_node(NodeKind::BufferSource);
        engine
            .set_buffer(source, buffer)
            .absorb("loading noise buffer");
        engine
            .set_looping(source, true)
            .absorb("looping noise buffer");
        source
    }

    /// The buffer player currently feeding the output. Changes on
    /// [NoiseCore::restart()].
    pub fn source(&self) -> NodeId {
        self.source.node()
    }

    #[allow(missing_docs)]
    pub fn output(&self) -> NodeId {
        self.level
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
        self.source.state()
    }

    /// Swaps in a fresh noise realization. The old player is stopped, a new
    /// buffer is synthesized, and a new player is wired into the same output
    /// stage and started. Connections from the output are untouched. Does
    /// nothing unless the noise is running.
    pub fn restart(&mut self, engine: &mut dyn AudioEngine, rng: &mut Rng) -> bool {
        if !self.source.is_running() {
            return false;
        }
        let old = self.source.node();
        self.source.stop(engine);
        engine
            .disconnect(old, None)
            .absorb("detaching old noise player");

        let fresh = Self::new_source(engine, self.buffer_seconds, rng);
        wire(engine, fresh, self.level);
        self.source.replace(fresh);
        self.source.start(engine)
    }

    pub(super) fn start(&mut self, engine: &mut dyn AudioEngine) -> bool {
        self.source.start(engine)
    }

    pub(super) fn stop(&mut self, engine: &mut dyn AudioEngine) -> bool {
        self.source.stop(engine)
    }
}
