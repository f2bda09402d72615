// Copyright (c) 2024 Mike Tsao

use crate::engine::{AudioEngine, NodeId};
use serde::{Deserialize, Serialize};

/// Whether a module's continuous source is currently producing signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceState {
    #[allow(missing_docs)]
    #[default]
    Stopped,
    #[allow(missing_docs)]
    Running,
}

/// A scheduled engine source (oscillator or buffer player) that a module keeps
/// running for as long as it exists. Tracks its own state so that a start or
/// a stop reaches the engine at most once.
#[derive(Debug)]
pub struct ContinuousSource {
    node: NodeId,
    state: SourceState,
}
impl ContinuousSource {
    #[allow(missing_docs)]
    pub fn new_with(node: NodeId) -> Self {
        Self {
            node,
            state: SourceState::Stopped,
        }
    }

    #[allow(missing_docs)]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> SourceState {
        self.state
    }

    #[allow(missing_docs)]
    pub fn is_running(&self) -> bool {
        self.state == SourceState::Running
    }

    /// Returns true if this call actually started the source.
    pub fn start(&mut self, engine: &mut dyn AudioEngine) -> bool {
        if self.is_running() {
            return false;
        }
        match engine.start(self.node) {
            Ok(_) => {
                self.state = SourceState::Running;
                true
            }
            Err(e) => {
                log::debug!("couldn't start {}: {e}", self.node);
                false
            }
        }
    }

    /// Returns true if this call actually stopped the source.
    pub fn stop(&mut self, engine: &mut dyn AudioEngine) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = SourceState::Stopped;
        if let Err(e) = engine.stop(self.node) {
            log::debug!("couldn't stop {}: {e}", self.node);
        }
        true
    }

    /// Points at a freshly allocated source node. Engine sources can't be
    /// restarted, so anything that wants to "restart" swaps in a new one.
    /// The old node should already be stopped.
    pub fn replace(&mut self, node: NodeId) {
        debug_assert!(!self.is_running());
        self.node = node;
        self.state = SourceState::Stopped;
    }
}
