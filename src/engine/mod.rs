// Copyright (c) 2024 Mike Tsao

//! The boundary between the module graph and whatever actually renders audio.
//!
//! An [AudioEngine] supplies primitive processing units (oscillators, gain
//! stages, filters, delay lines, and so on), wires them together, and applies
//! time-stamped parameter automation against a single monotonic clock. The
//! rest of the crate never looks inside a primitive; it only holds [NodeId]s
//! and [ParamId]s and issues commands. Commands are fire-and-forget: nothing
//! here waits for the engine to render anything.
//!
//! [VirtualEngine] is a deterministic implementation that tracks the wiring
//! and evaluates automation curves without producing samples. It is what the
//! tests use, and it is handy for headless tools.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        AudioBuffer, AudioEngine, EngineError, EngineLifecycle, EngineResultExt, EngineState,
        FilterType, NodeId, NodeKind, Oversample, ParamId, ParamName, VirtualEngine, Waveform,
    };
}

pub use {
    automation::{AutomationEvent, AutomationTimeline},
    lifecycle::EngineLifecycle,
    virtual_engine::{Edge, EdgeTarget, Playback, VirtualEngine, VirtualNode},
};

mod automation;
mod lifecycle;
mod virtual_engine;

use crate::types::prelude::*;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};
use thiserror::Error;

/// Identifies one primitive allocated by an [AudioEngine].
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "node-{}", _0)]
pub struct NodeId(pub usize);

/// The automation targets a primitive can expose.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, StrumDisplay, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ParamName {
    /// Oscillator pitch, or filter cutoff.
    Frequency,
    /// Oscillator fine tuning, in cents.
    Detune,
    /// Gain-stage multiplier.
    Gain,
    /// Filter resonance.
    Q,
    /// Delay-line length.
    DelayTime,
    /// Compressor threshold, in dB.
    Threshold,
    /// Compressor knee, in dB.
    Knee,
    /// Compressor ratio.
    Ratio,
    /// Compressor attack, in seconds.
    Attack,
    /// Compressor release, in seconds.
    Release,
}

/// One automatable parameter of one primitive.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "{}.{}", node, name)]
pub struct ParamId {
    /// The primitive that owns the parameter.
    pub node: NodeId,
    /// Which of its parameters.
    pub name: ParamName,
}
impl ParamId {
    #[allow(missing_docs)]
    pub fn new(node: NodeId, name: ParamName) -> Self {
        Self { node, name }
    }
}

/// The kinds of primitive an [AudioEngine] can allocate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// A periodic waveform source.
    Oscillator,
    /// A multiplier.
    Gain,
    /// A second-order filter.
    BiquadFilter,
    /// A delay line whose delay time may never exceed `max_delay`.
    DelayLine {
        #[allow(missing_docs)]
        max_delay: Seconds,
    },
    /// Convolution with an impulse buffer.
    Convolver,
    /// A static transfer-curve distortion.
    WaveShaper,
    /// A dynamics compressor.
    DynamicsCompressor,
    /// Interleaves `inputs` mono signals into one multichannel signal.
    ChannelMerger {
        #[allow(missing_docs)]
        inputs: usize,
    },
    /// Splits a multichannel signal into `outputs` mono signals.
    ChannelSplitter {
        #[allow(missing_docs)]
        outputs: usize,
    },
    /// Plays an [AudioBuffer].
    BufferSource,
    /// The final output. Every engine has exactly one.
    Destination,
}
impl NodeKind {
    /// The automation targets this kind of primitive exposes, with their
    /// intrinsic values.
    pub fn default_params(&self) -> &'static [(ParamName, ParameterType)] {
        match self {
            NodeKind::Oscillator => &[(ParamName::Frequency, 440.0), (ParamName::Detune, 0.0)],
            NodeKind::Gain => &[(ParamName::Gain, 1.0)],
            NodeKind::BiquadFilter => &[
                (ParamName::Frequency, 350.0),
                (ParamName::Q, 1.0),
                (ParamName::Gain, 0.0),
                (ParamName::Detune, 0.0),
            ],
            NodeKind::DelayLine { .. } => &[(ParamName::DelayTime, 0.0)],
            NodeKind::DynamicsCompressor => &[
                (ParamName::Threshold, -24.0),
                (ParamName::Knee, 30.0),
                (ParamName::Ratio, 12.0),
                (ParamName::Attack, 0.003),
                (ParamName::Release, 0.25),
            ],
            NodeKind::Convolver
            | NodeKind::WaveShaper
            | NodeKind::ChannelMerger { .. }
            | NodeKind::ChannelSplitter { .. }
            | NodeKind::BufferSource
            | NodeKind::Destination => &[],
        }
    }

    /// Whether the primitive is a source that must be explicitly started.
    pub fn is_scheduled_source(&self) -> bool {
        matches!(self, NodeKind::Oscillator | NodeKind::BufferSource)
    }

    /// How many outputs the primitive exposes.
    pub fn output_count(&self) -> usize {
        match self {
            NodeKind::ChannelSplitter { outputs } => *outputs,
            NodeKind::Destination => 0,
            _ => 1,
        }
    }

    /// How many inputs the primitive exposes.
    pub fn input_count(&self) -> usize {
        match self {
            NodeKind::ChannelMerger { inputs } => *inputs,
            NodeKind::Oscillator | NodeKind::BufferSource => 0,
            _ => 1,
        }
    }
}

/// Oscillator waveforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, StrumDisplay, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Biquad filter responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, StrumDisplay, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
    Notch,
}

/// Wave-shaper oversampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, StrumDisplay, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Oversample {
    #[default]
    #[strum(serialize = "none")]
    None,
    #[strum(serialize = "2x")]
    X2,
    #[strum(serialize = "4x")]
    X4,
}

/// Whether the engine clock is advancing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, StrumDisplay, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EngineState {
    /// The clock is paused, typically until the first user gesture.
    #[default]
    Suspended,
    /// The clock is running and audio is rendering.
    Running,
    /// The engine has been shut down for good.
    Closed,
}

/// A block of non-interleaved samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioBuffer {
    sample_rate: SampleRate,
    channels: Vec<Vec<f32>>,
}
impl AudioBuffer {
    /// Allocates `channel_count` channels of `frames` silent samples each.
    pub fn new_with(channel_count: usize, frames: usize, sample_rate: SampleRate) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frames]; channel_count],
        }
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    #[allow(missing_docs)]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// The number of frames in each channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration of the buffer at its own sample rate.
    pub fn duration(&self) -> Seconds {
        Seconds(self.len() as f64 / f64::from(self.sample_rate))
    }

    #[allow(missing_docs)]
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(|c| c.as_slice())
    }

    #[allow(missing_docs)]
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(|c| c.as_mut_slice())
    }
}

/// Failures an [AudioEngine] can report. Most of these describe steady states
/// (an edge that was never made, a source that already stopped) that callers
/// are expected to absorb.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[allow(missing_docs)]
    #[error("{0} is not a node of this engine")]
    UnknownNode(NodeId),
    #[allow(missing_docs)]
    #[error("{0} is not an automatable parameter")]
    UnknownParam(ParamId),
    #[allow(missing_docs)]
    #[error("{from} is not connected to {to}")]
    NotConnected { from: NodeId, to: String },
    #[allow(missing_docs)]
    #[error("{node} has no channel {channel}")]
    InvalidChannel { node: NodeId, channel: usize },
    #[allow(missing_docs)]
    #[error("{0} has already been started")]
    AlreadyStarted(NodeId),
    #[allow(missing_docs)]
    #[error("{0} has not been started")]
    NotStarted(NodeId),
    #[allow(missing_docs)]
    #[error("{0} is not the kind of node that accepts that command")]
    WrongKind(NodeId),
    #[allow(missing_docs)]
    #[error("the engine has been closed")]
    Closed,
}

/// Convenience for the "absorb it and move on" handling that every
/// engine-level failure gets from the module graph.
pub trait EngineResultExt {
    /// Discards an error after logging it at debug level, returning whether
    /// the call succeeded.
    fn absorb(self, context: &str) -> bool;
}
impl<T> EngineResultExt for Result<T, EngineError> {
    fn absorb(self, context: &str) -> bool {
        match self {
            Ok(_) => true,
            Err(e) => {
                log::debug!("{context}: absorbed engine error: {e}");
                false
            }
        }
    }
}

/// The capability contract of the external audio renderer.
///
/// All methods are synchronous and non-blocking. Scheduling methods only
/// record intent; the engine applies them relative to
/// [AudioEngine::current_time()] in the order they were issued.
pub trait AudioEngine {
    /// Allocates a new primitive.
    fn create_node(&mut self, kind: NodeKind) -> NodeId;

    /// The engine's final output.
    fn destination(&self) -> NodeId;

    /// Wires output 0 of `from` into input 0 of `to`. Wiring an edge that
    /// already exists is not an error.
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), EngineError> {
        self.connect_channel(from, 0, to, 0)
    }

    /// Wires a specific output of `from` into a specific input of `to`.
    fn connect_channel(
        &mut self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> Result<(), EngineError>;

    /// Wires output 0 of `from` into a parameter's automation input, where it
    /// is summed with the parameter's scheduled value.
    fn connect_param(&mut self, from: NodeId, param: ParamId) -> Result<(), EngineError>;

    /// Severs every edge from `from` to `to`, or every outgoing edge of `from`
    /// (including parameter edges) when `to` is None.
    fn disconnect(&mut self, from: NodeId, to: Option<NodeId>) -> Result<(), EngineError>;

    /// Severs the edge from `from` into `param`.
    fn disconnect_param(&mut self, from: NodeId, param: ParamId) -> Result<(), EngineError>;

    /// Sets a parameter right now, as if by `set_value_at_time(value, now)`.
    fn set_value(&mut self, param: ParamId, value: ParameterType) -> Result<(), EngineError>;

    /// Schedules a step to `value` at `time`.
    fn set_value_at_time(
        &mut self,
        param: ParamId,
        value: ParameterType,
        time: Seconds,
    ) -> Result<(), EngineError>;

    /// Schedules a linear ramp that starts at the previous scheduled event and
    /// arrives at `value` at `time`.
    fn linear_ramp_to_value_at_time(
        &mut self,
        param: ParamId,
        value: ParameterType,
        time: Seconds,
    ) -> Result<(), EngineError>;

    /// Removes every scheduled event at or after `time`.
    fn cancel_scheduled_values(&mut self, param: ParamId, time: Seconds)
        -> Result<(), EngineError>;

    /// The parameter's instantaneous value at the current time.
    fn param_value(&self, param: ParamId) -> Result<ParameterType, EngineError>;

    /// The engine clock. Monotonic and shared by every primitive.
    fn current_time(&self) -> Seconds;

    #[allow(missing_docs)]
    fn sample_rate(&self) -> SampleRate;

    #[allow(missing_docs)]
    fn state(&self) -> EngineState;

    /// Lets the clock run. Resuming a running engine is a no-op.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Starts a scheduled source. A source can be started once.
    fn start(&mut self, node: NodeId) -> Result<(), EngineError>;

    /// Stops a started source. A stopped source can't be restarted.
    fn stop(&mut self, node: NodeId) -> Result<(), EngineError>;

    #[allow(missing_docs)]
    fn set_waveform(&mut self, node: NodeId, waveform: Waveform) -> Result<(), EngineError>;

    #[allow(missing_docs)]
    fn set_filter_type(&mut self, node: NodeId, filter_type: FilterType)
        -> Result<(), EngineError>;

    /// Attaches a buffer to a buffer source or a convolver.
    fn set_buffer(&mut self, node: NodeId, buffer: AudioBuffer) -> Result<(), EngineError>;

    #[allow(missing_docs)]
    fn set_looping(&mut self, node: NodeId, looping: bool) -> Result<(), EngineError>;

    /// Replaces a wave-shaper's transfer curve wholesale.
    fn set_curve(
        &mut self,
        node: NodeId,
        curve: Vec<f32>,
        oversample: Oversample,
    ) -> Result<(), EngineError>;
}
