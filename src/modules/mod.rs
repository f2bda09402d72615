// Copyright (c) 2024 Mike Tsao

//! The fixed catalog of modules that can be placed in a patch.
//!
//! Each kind has a `*Core` that allocates its engine primitives, wires any
//! internal sub-graph, and maps its named parameters onto engine automation
//! targets. [ModuleCore] is the closed tagged union over all of them, and
//! [Module] adds the identity and the logical ports that the
//! [ModuleGraph](crate::orchestration::ModuleGraph) connects.
//!
//! A module's logical input and output are fixed at construction. Simple kinds
//! expose their primary primitive; Delay, Reverb, and Chorus expose a
//! dedicated output mixer because their audible result comes from further down
//! their internal chain.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChorusCore, CompressorCore, ContinuousSource, DelayCore, DistortionCore, EnvelopeCore,
        EnvelopePhase, FilterCore, GainCore, LfoCore, Module, ModuleControl, ModuleCore,
        ModuleKind, NoiseCore, OscillatorCore, ReverbCore, SourceState,
    };
}

pub use {
    chorus::ChorusCore,
    compressor::CompressorCore,
    delay::DelayCore,
    distortion::{distortion_curve, DistortionCore},
    envelope::{EnvelopeCore, EnvelopePhase},
    filter::FilterCore,
    gain::GainCore,
    lfo::LfoCore,
    noise::NoiseCore,
    oscillator::OscillatorCore,
    reverb::ReverbCore,
    source::{ContinuousSource, SourceState},
};

mod chorus;
mod compressor;
mod delay;
mod distortion;
mod envelope;
mod filter;
mod gain;
mod lfo;
mod noise;
mod oscillator;
mod reverb;
mod source;

use crate::{
    automation::ModulatedParam,
    engine::{AudioEngine, EngineResultExt, NodeId, ParamId, ParamName},
    types::prelude::*,
    util::{PatchSettings, Rng},
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The closed set of module kinds.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum ModuleKind {
    /// A sawtooth oscillator with an output level.
    Oscillator,
    /// A plain amplifier.
    Gain,
    /// A resonant lowpass filter.
    Filter,
    /// An echo with an internal feedback loop.
    Delay,
    /// A convolution reverb with a synthetic impulse.
    Reverb,
    /// A static wave-shaping distortion.
    Distortion,
    /// A low-frequency sine oscillator for modulation.
    #[strum(to_string = "LFO")]
    Lfo,
    /// A dynamics compressor.
    Compressor,
    /// A stereo chorus with two modulated delay voices.
    Chorus,
    /// An ADSR contour applied to a gain stage.
    Envelope,
    /// Looping white noise with an output level.
    Noise,
}
impl ModuleKind {
    /// Whether the kind owns a continuously running source that is started at
    /// creation and stopped at deletion.
    pub fn has_continuous_source(&self) -> bool {
        matches!(self, ModuleKind::Oscillator | ModuleKind::Lfo | ModuleKind::Noise)
    }

    /// Whether the kind is a control-rate module that modulates parameters of
    /// other modules.
    pub fn is_modulation_source(&self) -> bool {
        matches!(self, ModuleKind::Lfo | ModuleKind::Envelope)
    }

    /// The named parameters a caller can set on this kind.
    pub fn controls(&self) -> &'static [ModuleControl] {
        use ModuleControl::*;
        match self {
            ModuleKind::Oscillator => &[Frequency, Gain],
            ModuleKind::Gain => &[Gain],
            ModuleKind::Filter => &[Frequency, Q],
            ModuleKind::Delay => &[DelayTime, Feedback],
            ModuleKind::Reverb => &[Wet],
            ModuleKind::Distortion => &[Amount],
            ModuleKind::Lfo => &[Frequency, Depth],
            ModuleKind::Compressor => &[Threshold, Ratio, Attack, Release],
            ModuleKind::Chorus => &[Rate, Depth, Mix],
            ModuleKind::Envelope => &[Attack, Decay, Sustain, Release],
            ModuleKind::Noise => &[Gain],
        }
    }
}

/// The name of one caller-settable parameter. Which ones apply depends on
/// the [ModuleKind].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[allow(missing_docs)]
pub enum ModuleControl {
    #[strum(to_string = "frequency", serialize = "freq", serialize = "cutoff")]
    Frequency,
    Gain,
    #[strum(to_string = "q", serialize = "resonance")]
    Q,
    #[strum(to_string = "delay-time", serialize = "delay")]
    DelayTime,
    Feedback,
    Wet,
    Amount,
    Depth,
    Threshold,
    Ratio,
    Attack,
    Decay,
    Sustain,
    Release,
    Rate,
    Mix,
}

/// One of every kind of module core.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum ModuleCore {
    Oscillator(OscillatorCore),
    Gain(GainCore),
    Filter(FilterCore),
    Delay(DelayCore),
    Reverb(ReverbCore),
    Distortion(DistortionCore),
    Lfo(LfoCore),
    Compressor(CompressorCore),
    Chorus(ChorusCore),
    Envelope(EnvelopeCore),
    Noise(NoiseCore),
}
impl ModuleCore {
    /// Allocates and wires the engine primitives for a new module of the
    /// given kind. Continuous sources are left stopped.
    pub fn new_with(
        kind: ModuleKind,
        engine: &mut dyn AudioEngine,
        settings: &PatchSettings,
        rng: &mut Rng,
    ) -> Self {
        match kind {
            ModuleKind::Oscillator => Self::Oscillator(OscillatorCore::new_with(engine)),
            ModuleKind::Gain => Self::Gain(GainCore::new_with(engine)),
            ModuleKind::Filter => Self::Filter(FilterCore::new_with(engine)),
            ModuleKind::Delay => {
                Self::Delay(DelayCore::new_with(engine, settings.delay_max_seconds))
            }
            ModuleKind::Reverb => Self::Reverb(ReverbCore::new_with(
                engine,
                settings.reverb_impulse_seconds,
                rng,
            )),
            ModuleKind::Distortion => Self::Distortion(DistortionCore::new_with(
                engine,
                settings.distortion_curve_samples,
            )),
            ModuleKind::Lfo => Self::Lfo(LfoCore::new_with(engine)),
            ModuleKind::Compressor => Self::Compressor(CompressorCore::new_with(engine)),
            ModuleKind::Chorus => Self::Chorus(ChorusCore::new_with(
                engine,
                settings.chorus_max_delay_seconds,
            )),
            ModuleKind::Envelope => Self::Envelope(EnvelopeCore::new_with(engine)),
            ModuleKind::Noise => {
                Self::Noise(NoiseCore::new_with(engine, settings.noise_seconds, rng))
            }
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleCore::Oscillator(_) => ModuleKind::Oscillator,
            ModuleCore::Gain(_) => ModuleKind::Gain,
            ModuleCore::Filter(_) => ModuleKind::Filter,
            ModuleCore::Delay(_) => ModuleKind::Delay,
            ModuleCore::Reverb(_) => ModuleKind::Reverb,
            ModuleCore::Distortion(_) => ModuleKind::Distortion,
            ModuleCore::Lfo(_) => ModuleKind::Lfo,
            ModuleCore::Compressor(_) => ModuleKind::Compressor,
            ModuleCore::Chorus(_) => ModuleKind::Chorus,
            ModuleCore::Envelope(_) => ModuleKind::Envelope,
            ModuleCore::Noise(_) => ModuleKind::Noise,
        }
    }

    /// The primitive that receives audio connected into this module, if any.
    /// Pure generators have none.
    pub fn logical_input(&self) -> Option<NodeId> {
        match self {
            ModuleCore::Oscillator(_) | ModuleCore::Lfo(_) | ModuleCore::Noise(_) => None,
            ModuleCore::Gain(c) => Some(c.node()),
            ModuleCore::Filter(c) => Some(c.node()),
            ModuleCore::Delay(c) => Some(c.input()),
            ModuleCore::Reverb(c) => Some(c.input()),
            ModuleCore::Distortion(c) => Some(c.node()),
            ModuleCore::Compressor(c) => Some(c.node()),
            ModuleCore::Chorus(c) => Some(c.input()),
            ModuleCore::Envelope(c) => Some(c.node()),
        }
    }

    /// The primitive whose output is this module's audible (or control)
    /// result.
    pub fn logical_output(&self) -> NodeId {
        match self {
            ModuleCore::Oscillator(c) => c.output(),
            ModuleCore::Gain(c) => c.node(),
            ModuleCore::Filter(c) => c.node(),
            ModuleCore::Delay(c) => c.output(),
            ModuleCore::Reverb(c) => c.output(),
            ModuleCore::Distortion(c) => c.node(),
            ModuleCore::Lfo(c) => c.output(),
            ModuleCore::Compressor(c) => c.node(),
            ModuleCore::Chorus(c) => c.output(),
            ModuleCore::Envelope(c) => c.node(),
            ModuleCore::Noise(c) => c.output(),
        }
    }

    /// Starts every continuous source the core owns. Starting a running
    /// source is a no-op.
    pub fn start_sources(&mut self, engine: &mut dyn AudioEngine) {
        match self {
            ModuleCore::Oscillator(c) => {
                c.start(engine);
            }
            ModuleCore::Lfo(c) => {
                c.start(engine);
            }
            ModuleCore::Noise(c) => {
                c.start(engine);
            }
            ModuleCore::Chorus(c) => {
                c.start(engine);
            }
            _ => {}
        }
    }

    /// Stops every continuous source the core owns, including Chorus's
    /// internal LFOs. Returns how many were actually running.
    pub fn stop_sources(&mut self, engine: &mut dyn AudioEngine) -> usize {
        match self {
            ModuleCore::Oscillator(c) => c.stop(engine) as usize,
            ModuleCore::Lfo(c) => c.stop(engine) as usize,
            ModuleCore::Noise(c) => c.stop(engine) as usize,
            ModuleCore::Chorus(c) => c.stop(engine),
            _ => 0,
        }
    }

    /// The lifecycle of the core's continuous sources, or None if it has
    /// none. Chorus counts as running while either internal LFO runs.
    pub fn source_state(&self) -> Option<SourceState> {
        match self {
            ModuleCore::Oscillator(c) => Some(c.source_state()),
            ModuleCore::Lfo(c) => Some(c.source_state()),
            ModuleCore::Noise(c) => Some(c.source_state()),
            ModuleCore::Chorus(c) => Some(if c.running_lfos() > 0 {
                SourceState::Running
            } else {
                SourceState::Stopped
            }),
            _ => None,
        }
    }

    /// The engine parameter that a modulation source of `source_kind` may
    /// drive when it targets `param` on this module, or None if that
    /// combination isn't eligible.
    pub fn modulation_input(
        &self,
        source_kind: ModuleKind,
        param: ModulatedParam,
    ) -> Option<ParamId> {
        let candidate = match self {
            ModuleCore::Oscillator(c) => c.modulation_input(param),
            ModuleCore::Gain(c) => c.modulation_input(param),
            ModuleCore::Filter(c) => c.modulation_input(param),
            _ => None,
        };
        match source_kind {
            ModuleKind::Lfo => candidate,
            // An envelope is a multiplicative contour, so it only makes sense
            // on a gain.
            ModuleKind::Envelope => candidate.filter(|_| param == ModulatedParam::Gain),
            _ => None,
        }
    }

    /// Returns the current value of a named parameter, or None if this kind
    /// doesn't have it.
    pub fn control_value(&self, control: ModuleControl) -> Option<ParameterType> {
        use ModuleControl as C;
        match (self, control) {
            (ModuleCore::Oscillator(c), C::Frequency) => Some(c.frequency().0),
            (ModuleCore::Oscillator(c), C::Gain) => Some(c.gain().0),
            (ModuleCore::Gain(c), C::Gain) => Some(c.gain().0),
            (ModuleCore::Filter(c), C::Frequency) => Some(c.frequency().0),
            (ModuleCore::Filter(c), C::Q) => Some(c.q()),
            (ModuleCore::Delay(c), C::DelayTime) => Some(c.delay_time().0),
            (ModuleCore::Delay(c), C::Feedback) => Some(c.feedback().0),
            (ModuleCore::Reverb(c), C::Wet) => Some(c.wet().0),
            (ModuleCore::Distortion(c), C::Amount) => Some(c.amount()),
            (ModuleCore::Lfo(c), C::Frequency) => Some(c.frequency().0),
            (ModuleCore::Lfo(c), C::Depth) => Some(c.depth().0),
            (ModuleCore::Compressor(c), C::Threshold) => Some(c.threshold()),
            (ModuleCore::Compressor(c), C::Ratio) => Some(c.ratio()),
            (ModuleCore::Compressor(c), C::Attack) => Some(c.attack().0),
            (ModuleCore::Compressor(c), C::Release) => Some(c.release().0),
            (ModuleCore::Chorus(c), C::Rate) => Some(c.rate().0),
            (ModuleCore::Chorus(c), C::Depth) => Some(c.depth().0),
            (ModuleCore::Chorus(c), C::Mix) => Some(c.mix().0),
            (ModuleCore::Envelope(c), C::Attack) => Some(c.attack().0),
            (ModuleCore::Envelope(c), C::Decay) => Some(c.decay().0),
            (ModuleCore::Envelope(c), C::Sustain) => Some(c.sustain().0),
            (ModuleCore::Envelope(c), C::Release) => Some(c.release_time().0),
            (ModuleCore::Noise(c), C::Gain) => Some(c.gain().0),
            _ => None,
        }
    }

    /// Sets a named parameter as an immediate value change. Returns false,
    /// changing nothing, if this kind doesn't have that parameter.
    pub fn set_control(
        &mut self,
        engine: &mut dyn AudioEngine,
        control: ModuleControl,
        value: ParameterType,
    ) -> bool {
        use ModuleControl as C;
        match (self, control) {
            (ModuleCore::Oscillator(c), C::Frequency) => c.set_frequency(engine, value.into()),
            (ModuleCore::Oscillator(c), C::Gain) => c.set_gain(engine, value.into()),
            (ModuleCore::Gain(c), C::Gain) => c.set_gain(engine, value.into()),
            (ModuleCore::Filter(c), C::Frequency) => c.set_frequency(engine, value.into()),
            (ModuleCore::Filter(c), C::Q) => c.set_q(engine, value),
            (ModuleCore::Delay(c), C::DelayTime) => c.set_delay_time(engine, value.into()),
            (ModuleCore::Delay(c), C::Feedback) => c.set_feedback(engine, value.into()),
            (ModuleCore::Reverb(c), C::Wet) => c.set_wet(engine, value.into()),
            (ModuleCore::Distortion(c), C::Amount) => c.set_amount(engine, value),
            (ModuleCore::Lfo(c), C::Frequency) => c.set_frequency(engine, value.into()),
            (ModuleCore::Lfo(c), C::Depth) => c.set_depth(engine, value.into()),
            (ModuleCore::Compressor(c), C::Threshold) => c.set_threshold(engine, value),
            (ModuleCore::Compressor(c), C::Ratio) => c.set_ratio(engine, value),
            (ModuleCore::Compressor(c), C::Attack) => c.set_attack(engine, value.into()),
            (ModuleCore::Compressor(c), C::Release) => c.set_release(engine, value.into()),
            (ModuleCore::Chorus(c), C::Rate) => c.set_rate(engine, value.into()),
            (ModuleCore::Chorus(c), C::Depth) => c.set_depth(engine, value.into()),
            (ModuleCore::Chorus(c), C::Mix) => c.set_mix(engine, value.into()),
            (ModuleCore::Envelope(c), C::Attack) => c.set_attack(value.into()),
            (ModuleCore::Envelope(c), C::Decay) => c.set_decay(value.into()),
            (ModuleCore::Envelope(c), C::Sustain) => c.set_sustain(value.into()),
            (ModuleCore::Envelope(c), C::Release) => c.set_release(value.into()),
            (ModuleCore::Noise(c), C::Gain) => c.set_gain(engine, value.into()),
            (core, control) => {
                log::warn!("{} has no parameter named {control}", core.kind());
                return false;
            }
        }
        true
    }
}

/// A module placed in a patch: identity, display name, logical ports, and the
/// kind-specific core.
#[derive(Debug)]
pub struct Module {
    uid: Uid,
    name: String,
    input: Option<NodeId>,
    output: NodeId,
    core: ModuleCore,
}
impl Module {
    /// Wraps a core. The logical ports are read from the core once, here, and
    /// never change afterward.
    pub fn new_with(uid: Uid, core: ModuleCore) -> Self {
        Self {
            uid,
            name: format!("{} #{}", core.kind(), uid),
            input: core.logical_input(),
            output: core.logical_output(),
            core,
        }
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> Uid {
        self.uid
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> ModuleKind {
        self.core.kind()
    }

    /// Where incoming audio lands, if this module accepts audio.
    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    /// What downstream modules (and modulation targets) are fed from.
    pub fn output(&self) -> NodeId {
        self.output
    }

    #[allow(missing_docs)]
    pub fn core(&self) -> &ModuleCore {
        &self.core
    }

    #[allow(missing_docs)]
    pub fn core_mut(&mut self) -> &mut ModuleCore {
        &mut self.core
    }

    /// The current value of every parameter this kind exposes, in display
    /// order.
    pub fn control_values(&self) -> Vec<(ModuleControl, ParameterType)> {
        self.kind()
            .controls()
            .iter()
            .filter_map(|c| self.core.control_value(*c).map(|v| (*c, v)))
            .collect()
    }
}

/// Applies an immediate value to a primitive's parameter, absorbing failure.
pub(crate) fn set_param(
    engine: &mut dyn AudioEngine,
    node: NodeId,
    name: ParamName,
    value: ParameterType,
) {
    engine
        .set_value(ParamId::new(node, name), value)
        .absorb("setting parameter");
}

/// Wires one primitive into another as part of a module's fixed internal
/// sub-graph.
pub(crate) fn wire(engine: &mut dyn AudioEngine, from: NodeId, to: NodeId) {
    engine.connect(from, to).absorb("wiring internal sub-graph");
}
