// Copyright (c) 2024 Mike Tsao

use super::{AudioEngine, EngineResultExt, EngineState};

/// Tracks the one-time transition from a suspended engine clock to a running
/// one. Engines typically start suspended until the first user gesture;
/// after the first successful resume, further requests do nothing.
#[derive(Debug, Default)]
pub struct EngineLifecycle {
    started: bool,
}
impl EngineLifecycle {
    /// Resumes the engine if this is the first request and the engine isn't
    /// already running. Returns whether the engine is running afterward.
    pub fn ensure_started(&mut self, engine: &mut dyn AudioEngine) -> bool {
        if !self.started && engine.state() != EngineState::Running {
            if engine.resume().absorb("resuming engine") {
                log::info!("audio engine resumed");
                self.started = true;
            }
        }
        engine.state() == EngineState::Running
    }

    /// Whether this lifecycle has resumed the engine.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VirtualEngine;

    #[test]
    fn resumes_once() {
        let mut engine = VirtualEngine::default();
        let mut lifecycle = EngineLifecycle::default();
        assert_eq!(engine.state(), EngineState::Suspended);
        assert!(!lifecycle.is_started());

        assert!(lifecycle.ensure_started(&mut engine));
        assert!(lifecycle.is_started());
        assert_eq!(engine.resume_count(), 1);

        assert!(lifecycle.ensure_started(&mut engine));
        assert_eq!(
            engine.resume_count(),
            1,
            "subsequent start requests should not resume again"
        );
    }

    #[test]
    fn already_running_engine_is_left_alone() {
        let mut engine = VirtualEngine::default();
        let _ = engine.resume();
        let mut lifecycle = EngineLifecycle::default();
        assert!(lifecycle.ensure_started(&mut engine));
        assert_eq!(engine.resume_count(), 1);
        assert!(!lifecycle.is_started());
    }

    #[test]
    fn closed_engine_stays_closed() {
        let mut engine = VirtualEngine::default();
        engine.close();
        let mut lifecycle = EngineLifecycle::default();
        assert!(!lifecycle.ensure_started(&mut engine));
        assert!(!lifecycle.is_started());
    }
}
