// Copyright (c) 2024 Mike Tsao

use super::{set_param, wire, ContinuousSource};
use crate::prelude::*;

/// One side of the stereo chorus: a short delay line whose delay time is
/// wobbled by its own sine LFO.
#[derive(Debug)]
struct ChorusVoice {
    delay: NodeId,
    lfo: ContinuousSource,
    lfo_gain: NodeId,
    rate_ratio: ParameterType,
}
impl ChorusVoice {
    fn new_with(
        engine: &mut dyn AudioEngine,
        max_delay: Seconds,
        base_delay: Seconds,
        rate_ratio: ParameterType,
    ) -> Self {
        let delay = engine.create_node(NodeKind::DelayLine { max_delay });
        let lfo = engine.create_node(NodeKind::Oscillator);
        let lfo_gain = engine.create_node(NodeKind::Gain);
        engine
            .set_waveform(lfo, Waveform::Sine)
            .absorb("choosing chorus LFO waveform");
        set_param(engine, delay, ParamName::DelayTime, base_delay.0);
        wire(engine, lfo, lfo_gain);
        engine
            .connect_param(lfo_gain, ParamId::new(delay, ParamName::DelayTime))
            .absorb("wiring chorus LFO into delay time");
        Self {
            delay,
            lfo: ContinuousSource::new_with(lfo),
            lfo_gain,
            rate_ratio,
        }
    }
}

/// A two-voice stereo chorus. The input is split into left and right, each
/// side runs through its own modulated delay, and the merged result is mixed
/// with the dry input.
///
/// The right voice's LFO runs 1.4 times faster than the left one, so the two
/// sides never line up.
#[derive(Debug)]
pub struct ChorusCore {
    input: NodeId,
    splitter: NodeId,
    voices: [ChorusVoice; 2],
    merger: NodeId,
    wet: NodeId,
    dry: NodeId,
    output: NodeId,
    rate: FrequencyHz,
    depth: Normal,
    mix: Normal,
}
impl ChorusCore {
    #[allow(missing_docs)]
    pub const DEFAULT_RATE: FrequencyHz = FrequencyHz(0.5);
    #[allow(missing_docs)]
    pub const DEFAULT_DEPTH: Normal = Normal::new_const(0.5);
    #[allow(missing_docs)]
    pub const DEFAULT_MIX: Normal = Normal::new_const(0.5);

    /// A depth of 1.0 swings the delay time by this many seconds.
    pub const DEPTH_SCALE: ParameterType = 0.01;

    const BASE_DELAYS: [Seconds; 2] = [Seconds(0.015), Seconds(0.025)];
    const RATE_RATIOS: [ParameterType; 2] = [1.0, 1.4];
    const INITIAL_DRY: ParameterType = 0.7;

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine, max_delay: Seconds) -> Self {
        let input = engine.create_node(NodeKind::Gain);
        let splitter = engine.create_node(NodeKind::ChannelSplitter { outputs: 2 });
        let voices = [0, 1].map(|i| {
            ChorusVoice::new_with(engine, max_delay, Self::BASE_DELAYS[i], Self::RATE_RATIOS[i])
        });
        let merger = engine.create_node(NodeKind::ChannelMerger { inputs: 2 });
        let wet = engine.create_node(NodeKind::Gain);
        let dry = engine.create_node(NodeKind::Gain);
        let output = engine.create_node(NodeKind::Gain);

        wire(engine, input, splitter);
        for (channel, voice) in voices.iter().enumerate() {
            engine
                .connect_channel(splitter, channel, voice.delay, 0)
                .absorb("splitting chorus input");
            engine
                .connect_channel(voice.delay, 0, merger, channel)
                .absorb("merging chorus voices");
        }
        wire(engine, merger, wet);
        wire(engine, input, dry);
        wire(engine, wet, output);
        wire(engine, dry, output);

        let mut r = Self {
            input,
            splitter,
            voices,
            merger,
            wet,
            dry,
            output,
            rate: Self::DEFAULT_RATE,
            depth: Self::DEFAULT_DEPTH,
            mix: Self::DEFAULT_MIX,
        };
        r.set_rate(engine, r.rate);
        r.set_depth(engine, r.depth);
        // Dry starts at 0.7, not 1 - mix. The first set_mix() rebalances both.
        set_param(engine, wet, ParamName::Gain, r.mix.0);
        set_param(engine, dry, ParamName::Gain, Self::INITIAL_DRY);
        r
    }

    #[allow(missing_docs)]
    pub fn input(&self) -> NodeId {
        self.input
    }

    #[allow(missing_docs)]
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// The left voice's LFO rate.
    pub fn rate(&self) -> FrequencyHz {
        self.rate
    }

    /// Sets the left LFO to `rate` and the right one proportionally faster.
    pub fn set_rate(&mut self, engine: &mut dyn AudioEngine, rate: FrequencyHz) {
        self.rate = rate;
        for voice in &self.voices {
            set_param(
                engine,
                voice.lfo.node(),
                ParamName::Frequency,
                rate.scaled(voice.rate_ratio).0,
            );
        }
    }

    #[allow(missing_docs)]
    pub fn depth(&self) -> Normal {
        self.depth
    }

    #[allow(missing_docs)]
    pub fn set_depth(&mut self, engine: &mut dyn AudioEngine, depth: Normal) {
        self.depth = depth;
        for voice in &self.voices {
            set_param(
                engine,
                voice.lfo_gain,
                ParamName::Gain,
                depth.scale(Self::DEPTH_SCALE),
            );
        }
    }

    #[allow(missing_docs)]
    pub fn mix(&self) -> Normal {
        self.mix
    }

    /// Crossfades: wet = mix, dry = 1 - mix.
    pub fn set_mix(&mut self, engine: &mut dyn AudioEngine, mix: Normal) {
        self.mix = mix;
        set_param(engine, self.wet, ParamName::Gain, mix.0);
        set_param(engine, self.dry, ParamName::Gain, mix.complement().0);
    }

    /// How many internal LFOs are currently running.
    pub fn running_lfos(&self) -> usize {
        self.voices.iter().filter(|v| v.lfo.is_running()).count()
    }

    pub(super) fn start(&mut self, engine: &mut dyn AudioEngine) -> usize {
        self.voices
            .iter_mut()
            .map(|v| v.lfo.start(engine))
            .filter(|started| *started)
            .count()
    }

    pub(super) fn stop(&mut self, engine: &mut dyn AudioEngine) -> usize {
        self.voices
            .iter_mut()
            .map(|v| v.lfo.stop(engine))
            .filter(|stopped| *stopped)
            .count()
    }

    #[cfg(test)]
    fn lfo_nodes(&self) -> [NodeId; 2] {
        [self.voices[0].lfo.node(), self.voices[1].lfo.node()]
    }
}
