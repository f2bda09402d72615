// Copyright (c) 2024 Mike Tsao

use super::{
    AudioBuffer, AudioEngine, AutomationTimeline, EngineError, EngineState, FilterType, NodeId,
    NodeKind, Oversample, ParamId, ParamName, Waveform,
};
use crate::types::prelude::*;
use rustc_hash::FxHashMap;

/// Where a scheduled source is in its one-way life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Playback {
    /// Allocated but never started.
    #[default]
    NotStarted,
    /// Producing signal.
    Playing,
    /// Stopped for good.
    Stopped,
}

/// Where an edge lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeTarget {
    /// A node's audio input.
    Node {
        #[allow(missing_docs)]
        node: NodeId,
        #[allow(missing_docs)]
        input: usize,
    },
    /// A parameter's automation input.
    Param(ParamId),
}

/// One wire in the [VirtualEngine].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    #[allow(missing_docs)]
    pub from: NodeId,
    #[allow(missing_docs)]
    pub output: usize,
    #[allow(missing_docs)]
    pub to: EdgeTarget,
}

/// The [VirtualEngine]'s record of one primitive.
#[derive(Clone, Debug)]
pub struct VirtualNode {
    kind: NodeKind,
    params: FxHashMap<ParamName, AutomationTimeline>,
    playback: Playback,
    stop_count: usize,
    waveform: Option<Waveform>,
    filter_type: Option<FilterType>,
    buffer: Option<AudioBuffer>,
    looping: bool,
    curve: Option<Vec<f32>>,
    oversample: Oversample,
}
#[allow(missing_docs)]
impl VirtualNode {
    fn new_with(kind: NodeKind) -> Self {
        Self {
            kind,
            params: kind
                .default_params()
                .iter()
                .map(|(name, value)| (*name, AutomationTimeline::new_with(*value)))
                .collect(),
            playback: Default::default(),
            stop_count: Default::default(),
            waveform: matches!(kind, NodeKind::Oscillator).then_some(Waveform::Sine),
            filter_type: matches!(kind, NodeKind::BiquadFilter).then_some(FilterType::Lowpass),
            buffer: Default::default(),
            looping: Default::default(),
            curve: Default::default(),
            oversample: Default::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// How many times the source actually went from playing to stopped.
    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    pub fn waveform(&self) -> Option<Waveform> {
        self.waveform
    }

    pub fn filter_type(&self) -> Option<FilterType> {
        self.filter_type
    }

    pub fn buffer(&self) -> Option<&AudioBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn curve(&self) -> Option<&[f32]> {
        self.curve.as_deref()
    }

    pub fn oversample(&self) -> Oversample {
        self.oversample
    }

    pub fn timeline(&self, name: ParamName) -> Option<&AutomationTimeline> {
        self.params.get(&name)
    }
}

/// An [AudioEngine] that renders nothing but remembers everything.
///
/// The clock moves only when the engine is running and the owner calls
/// [VirtualEngine::advance()]. Parameters are evaluated against their
/// [AutomationTimeline]s at the current time.
#[derive(Debug)]
pub struct VirtualEngine {
    sample_rate: SampleRate,
    state: EngineState,
    resume_count: usize,
    time: Seconds,

    next_node_id: usize,
    destination: NodeId,
    nodes: FxHashMap<NodeId, VirtualNode>,
    edges: Vec<Edge>,
}
impl Default for VirtualEngine {
    fn default() -> Self {
        Self::new_with(SampleRate::default())
    }
}
impl VirtualEngine {
    /// Creates a suspended engine with a clock at zero.
    pub fn new_with(sample_rate: SampleRate) -> Self {
        let mut r = Self {
            sample_rate,
            state: Default::default(),
            resume_count: Default::default(),
            time: Seconds::zero(),
            next_node_id: 0,
            destination: NodeId(0),
            nodes: Default::default(),
            edges: Default::default(),
        };
        r.destination = r.create_node(NodeKind::Destination);
        r
    }

    /// Moves the clock forward, if the engine is running.
    pub fn advance(&mut self, duration: Seconds) {
        if self.state == EngineState::Running && duration.0 > 0.0 {
            self.time = self.time + duration;
        }
    }

    /// Moves the clock to an absolute time, if the engine is running. The clock
    /// never runs backward.
    pub fn set_time(&mut self, time: Seconds) {
        if time > self.time {
            if self.state == EngineState::Running {
                self.time = time;
            }
        } else if time < self.time {
            log::debug!("ignoring request to move engine clock backward to {time}");
        }
    }

    /// Shuts the engine down. A closed engine can't be resumed or rewired.
    pub fn close(&mut self) {
        self.state = EngineState::Closed;
    }

    /// How many times the engine went from suspended to running.
    pub fn resume_count(&self) -> usize {
        self.resume_count
    }

    #[allow(missing_docs)]
    pub fn node(&self, id: NodeId) -> Option<&VirtualNode> {
        self.nodes.get(&id)
    }

    #[allow(missing_docs)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[allow(missing_docs)]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Whether any output of `from` feeds any input of `to`.
    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.edges
            .iter()
            .any(|e| e.from == from && matches!(e.to, EdgeTarget::Node { node, .. } if node == to))
    }

    /// Whether a specific output of `from` feeds a specific input of `to`.
    pub fn is_connected_channel(
        &self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> bool {
        self.edges.contains(&Edge {
            from,
            output,
            to: EdgeTarget::Node { node: to, input },
        })
    }

    #[allow(missing_docs)]
    pub fn is_connected_to_param(&self, from: NodeId, param: ParamId) -> bool {
        self.edges
            .iter()
            .any(|e| e.from == from && e.to == EdgeTarget::Param(param))
    }

    /// Every edge that lands on `node`, whether on its audio input or on one of
    /// its parameters.
    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| match e.to {
            EdgeTarget::Node { node: n, .. } => n == node,
            EdgeTarget::Param(p) => p.node == node,
        })
    }

    #[allow(missing_docs)]
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == node)
    }

    #[allow(missing_docs)]
    pub fn timeline(&self, param: ParamId) -> Option<&AutomationTimeline> {
        self.nodes
            .get(&param.node)
            .and_then(|n| n.params.get(&param.name))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut VirtualNode, EngineError> {
        self.nodes.get_mut(&id).ok_or(EngineError::UnknownNode(id))
    }

    fn timeline_mut(&mut self, param: ParamId) -> Result<&mut AutomationTimeline, EngineError> {
        self.node_mut(param.node)?
            .params
            .get_mut(&param.name)
            .ok_or(EngineError::UnknownParam(param))
    }

    fn check_open(&self) -> Result<(), EngineError> {
        if self.state == EngineState::Closed {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }

    fn add_edge(&mut self, edge: Edge) {
        if !self.edges.contains(&edge) {
            log::trace!("wiring {edge:?}");
            self.edges.push(edge);
        }
    }
}
impl AudioEngine for VirtualEngine {
    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, VirtualNode::new_with(kind));
        id
    }

    fn destination(&self) -> NodeId {
        self.destination
    }

    fn connect_channel(
        &mut self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> Result<(), EngineError> {
        self.check_open()?;
        let from_kind = self.nodes.get(&from).ok_or(EngineError::UnknownNode(from))?.kind;
        let to_kind = self.nodes.get(&to).ok_or(EngineError::UnknownNode(to))?.kind;
        if output >= from_kind.output_count() {
            return Err(EngineError::InvalidChannel {
                node: from,
                channel: output,
            });
        }
        if input >= to_kind.input_count() {
            return Err(EngineError::InvalidChannel {
                node: to,
                channel: input,
            });
        }
        self.add_edge(Edge {
            from,
            output,
            to: EdgeTarget::Node { node: to, input },
        });
        Ok(())
    }

    fn connect_param(&mut self, from: NodeId, param: ParamId) -> Result<(), EngineError> {
        self.check_open()?;
        let from_kind = self.nodes.get(&from).ok_or(EngineError::UnknownNode(from))?.kind;
        if from_kind.output_count() == 0 {
            return Err(EngineError::InvalidChannel {
                node: from,
                channel: 0,
            });
        }
        self.timeline_mut(param)?;
        self.add_edge(Edge {
            from,
            output: 0,
            to: EdgeTarget::Param(param),
        });
        Ok(())
    }

    fn disconnect(&mut self, from: NodeId, to: Option<NodeId>) -> Result<(), EngineError> {
        if !self.nodes.contains_key(&from) {
            return Err(EngineError::UnknownNode(from));
        }
        let before = self.edges.len();
        match to {
            Some(to) => {
                self.edges.retain(|e| {
                    !(e.from == from && matches!(e.to, EdgeTarget::Node { node, .. } if node == to))
                });
                if self.edges.len() == before {
                    return Err(EngineError::NotConnected {
                        from,
                        to: to.to_string(),
                    });
                }
            }
            None => self.edges.retain(|e| e.from != from),
        }
        Ok(())
    }

    fn disconnect_param(&mut self, from: NodeId, param: ParamId) -> Result<(), EngineError> {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.from == from && e.to == EdgeTarget::Param(param)));
        if self.edges.len() == before {
            Err(EngineError::NotConnected {
                from,
                to: param.to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn set_value(&mut self, param: ParamId, value: ParameterType) -> Result<(), EngineError> {
        let now = self.time;
        self.timeline_mut(param)?.set_value(value, now);
        Ok(())
    }

    fn set_value_at_time(
        &mut self,
        param: ParamId,
        value: ParameterType,
        time: Seconds,
    ) -> Result<(), EngineError> {
        self.timeline_mut(param)?.set_value_at_time(value, time);
        Ok(())
    }

    fn linear_ramp_to_value_at_time(
        &mut self,
        param: ParamId,
        value: ParameterType,
        time: Seconds,
    ) -> Result<(), EngineError> {
        self.timeline_mut(param)?
            .linear_ramp_to_value_at_time(value, time);
        Ok(())
    }

    fn cancel_scheduled_values(
        &mut self,
        param: ParamId,
        time: Seconds,
    ) -> Result<(), EngineError> {
        self.timeline_mut(param)?.cancel_scheduled_values(time);
        Ok(())
    }

    fn param_value(&self, param: ParamId) -> Result<ParameterType, EngineError> {
        self.timeline(param)
            .map(|t| t.value_at(self.time))
            .ok_or(EngineError::UnknownParam(param))
    }

    fn current_time(&self) -> Seconds {
        self.time
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Suspended => {
                self.state = EngineState::Running;
                self.resume_count += 1;
                Ok(())
            }
            EngineState::Running => Ok(()),
            EngineState::Closed => Err(EngineError::Closed),
        }
    }

    fn start(&mut self, node: NodeId) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        if !n.kind.is_scheduled_source() {
            return Err(EngineError::WrongKind(node));
        }
        match n.playback {
            Playback::NotStarted => {
                n.playback = Playback::Playing;
                Ok(())
            }
            Playback::Playing | Playback::Stopped => Err(EngineError::AlreadyStarted(node)),
        }
    }

    fn stop(&mut self, node: NodeId) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        if !n.kind.is_scheduled_source() {
            return Err(EngineError::WrongKind(node));
        }
        match n.playback {
            Playback::NotStarted => Err(EngineError::NotStarted(node)),
            Playback::Playing => {
                n.playback = Playback::Stopped;
                n.stop_count += 1;
                Ok(())
            }
            Playback::Stopped => Ok(()),
        }
    }

    fn set_waveform(&mut self, node: NodeId, waveform: Waveform) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        match n.kind {
            NodeKind::Oscillator => {
                n.waveform = Some(waveform);
                Ok(())
            }
            _ => Err(EngineError::WrongKind(node)),
        }
    }

    fn set_filter_type(
        &mut self,
        node: NodeId,
        filter_type: FilterType,
    ) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        match n.kind {
            NodeKind::BiquadFilter => {
                n.filter_type = Some(filter_type);
                Ok(())
            }
            _ => Err(EngineError::WrongKind(node)),
        }
    }

    fn set_buffer(&mut self, node: NodeId, buffer: AudioBuffer) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        match n.kind {
            NodeKind::BufferSource | NodeKind::Convolver => {
                n.buffer = Some(buffer);
                Ok(())
            }
            _ => Err(EngineError::WrongKind(node)),
        }
    }

    fn set_looping(&mut self, node: NodeId, looping: bool) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        match n.kind {
            NodeKind::BufferSource => {
                n.looping = looping;
                Ok(())
            }
            _ => Err(EngineError::WrongKind(node)),
        }
    }

    fn set_curve(
        &mut self,
        node: NodeId,
        curve: Vec<f32>,
        oversample: Oversample,
    ) -> Result<(), EngineError> {
        let n = self.node_mut(node)?;
        match n.kind {
            NodeKind::WaveShaper => {
                n.curve = Some(curve);
                n.oversample = oversample;
                Ok(())
            }
            _ => Err(EngineError::WrongKind(node)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_starts_suspended_with_destination() {
        let engine = VirtualEngine::default();
        assert_eq!(engine.state(), EngineState::Suspended);
        assert_eq!(engine.node_count(), 1);
        assert_eq!(
            engine.node(engine.destination()).map(|n| n.kind()),
            Some(NodeKind::Destination)
        );
    }

    #[test]
    fn clock_moves_only_while_running() {
        let mut engine = VirtualEngine::default();
        engine.advance(Seconds(1.0));
        assert_eq!(engine.current_time(), Seconds::zero());

        let _ = engine.resume();
        engine.advance(Seconds(1.0));
        assert_eq!(engine.current_time(), Seconds(1.0));
        engine.set_time(Seconds(0.5));
        assert_eq!(engine.current_time(), Seconds(1.0), "clock is monotonic");
    }

    #[test]
    fn duplicate_wiring_is_tolerated() {
        let mut engine = VirtualEngine::default();
        let a = engine.create_node(NodeKind::Gain);
        let b = engine.create_node(NodeKind::Gain);
        assert!(engine.connect(a, b).is_ok());
        assert!(engine.connect(a, b).is_ok());
        assert_eq!(engine.edges().len(), 1);

        assert!(engine.disconnect(a, Some(b)).is_ok());
        assert_eq!(
            engine.disconnect(a, Some(b)),
            Err(EngineError::NotConnected {
                from: a,
                to: b.to_string()
            })
        );
        assert!(
            engine.disconnect(a, None).is_ok(),
            "disconnecting everything from a node with no edges is fine"
        );
    }

    #[test]
    fn closed_engine_refuses_wiring() {
        let mut engine = VirtualEngine::default();
        let a = engine.create_node(NodeKind::Gain);
        let b = engine.create_node(NodeKind::Gain);
        engine.close();
        assert_eq!(engine.connect(a, b), Err(EngineError::Closed));
        assert_eq!(
            engine.connect_param(a, ParamId::new(b, ParamName::Gain)),
            Err(EngineError::Closed)
        );
        assert!(engine.edges().is_empty());
    }

    #[test]
    fn channel_bounds_are_checked() {
        let mut engine = VirtualEngine::default();
        let splitter = engine.create_node(NodeKind::ChannelSplitter { outputs: 2 });
        let merger = engine.create_node(NodeKind::ChannelMerger { inputs: 2 });
        let osc = engine.create_node(NodeKind::Oscillator);
        assert!(engine.connect_channel(splitter, 1, merger, 1).is_ok());
        assert!(engine.connect_channel(splitter, 2, merger, 0).is_err());
        assert!(
            engine.connect(merger, osc).is_err(),
            "oscillators have no audio input"
        );
    }

    #[test]
    fn param_edges() {
        let mut engine = VirtualEngine::default();
        let lfo = engine.create_node(NodeKind::Oscillator);
        let filter = engine.create_node(NodeKind::BiquadFilter);
        let q = ParamId::new(filter, ParamName::Q);
        assert!(engine.connect_param(lfo, q).is_ok());
        assert!(engine.is_connected_to_param(lfo, q));
        assert!(engine
            .connect_param(lfo, ParamId::new(filter, ParamName::Ratio))
            .is_err());
        assert!(engine.disconnect_param(lfo, q).is_ok());
        assert!(engine.disconnect_param(lfo, q).is_err());
    }

    #[test]
    fn sources_start_once_and_stop_once() {
        let mut engine = VirtualEngine::default();
        let osc = engine.create_node(NodeKind::Oscillator);
        assert_eq!(engine.stop(osc), Err(EngineError::NotStarted(osc)));
        assert!(engine.start(osc).is_ok());
        assert_eq!(engine.start(osc), Err(EngineError::AlreadyStarted(osc)));
        assert!(engine.stop(osc).is_ok());
        assert!(engine.stop(osc).is_ok());
        assert_eq!(engine.node(osc).map(|n| n.stop_count()), Some(1));

        let gain = engine.create_node(NodeKind::Gain);
        assert_eq!(engine.start(gain), Err(EngineError::WrongKind(gain)));
    }

    #[test]
    fn param_value_follows_clock() {
        let mut engine = VirtualEngine::default();
        let _ = engine.resume();
        let gain = engine.create_node(NodeKind::Gain);
        let p = ParamId::new(gain, ParamName::Gain);
        assert_eq!(engine.param_value(p), Ok(1.0));

        let _ = engine.set_value_at_time(p, 0.0, Seconds(0.0));
        let _ = engine.linear_ramp_to_value_at_time(p, 1.0, Seconds(1.0));
        engine.advance(Seconds(0.25));
        assert_eq!(engine.param_value(p), Ok(0.25));
    }
}
