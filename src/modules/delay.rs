// Copyright (c) 2024 Mike Tsao

use super::{set_param, wire};
use crate::prelude::*;

/// An echo. The delay line feeds itself through a feedback gain and reaches
/// the output through a wet gain.
///
/// ```text
/// input ─► delay ─► wet ─► output
///            ▲  │
///            └─ feedback
/// ```
#[derive(Debug)]
pub struct DelayCore {
    delay: NodeId,
    feedback: NodeId,
    output: NodeId,
    max_delay: Seconds,
    delay_time: Seconds,
    feedback_level: Normal,
    wet_level: Normal,
}
impl DelayCore {
    #[allow(missing_docs)]
    pub const DEFAULT_DELAY_TIME: Seconds = Seconds(0.3);
    #[allow(missing_docs)]
    pub const DEFAULT_FEEDBACK: Normal = Normal::new_const(0.3);
    #[allow(missing_docs)]
    pub const DEFAULT_WET: Normal = Normal::new_const(0.5);

    /// `max_delay` bounds what [DelayCore::set_delay_time()] accepts.
    pub fn new_with(engine: &mut dyn AudioEngine, max_delay: Seconds) -> Self {
        let delay = engine.create_node(NodeKind::DelayLine { max_delay });
        let feedback = engine.create_node(NodeKind::Gain);
        let wet = engine.create_node(NodeKind::Gain);
        let output = engine.create_node(NodeKind::Gain);
        wire(engine, delay, feedback);
        wire(engine, feedback, delay);
        wire(engine, delay, wet);
        wire(engine, wet, output);

        let mut r = Self {
            delay,
            feedback,
            output,
            max_delay,
            delay_time: Self::DEFAULT_DELAY_TIME,
            feedback_level: Self::DEFAULT_FEEDBACK,
            wet_level: Self::DEFAULT_WET,
        };
        r.set_delay_time(engine, r.delay_time);
        r.set_feedback(engine, r.feedback_level);
        set_param(engine, wet, ParamName::Gain, r.wet_level.0);
        r
    }

    /// The delay line, which is also where input lands.
    pub fn input(&self) -> NodeId {
        self.delay
    }

    #[allow(missing_docs)]
    pub fn output(&self) -> NodeId {
        self.output
    }

    #[allow(missing_docs)]
    pub fn delay_time(&self) -> Seconds {
        self.delay_time
    }

    /// Clamped to [0, max_delay].
    pub fn set_delay_time(&mut self, engine: &mut dyn AudioEngine, delay_time: Seconds) {
        self.delay_time = Seconds(delay_time.0.clamp(0.0, self.max_delay.0));
        set_param(engine, self.delay, ParamName::DelayTime, self.delay_time.0);
    }

    #[allow(missing_docs)]
    pub fn feedback(&self) -> Normal {
        self.feedback_level
    }

    #[allow(missing_docs)]
    pub fn set_feedback(&mut self, engine: &mut dyn AudioEngine, feedback: Normal) {
        self.feedback_level = feedback;
        set_param(engine, self.feedback, ParamName::Gain, feedback.0);
    }

    #[allow(missing_docs)]
    pub fn wet(&self) -> Normal {
        self.wet_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_wiring_has_a_feedback_loop() {
        let mut engine = VirtualEngine::default();
        let core = DelayCore::new_with(&mut engine, Seconds(5.0));
        let delay = core.input();
        let outgoing: Vec<_> = engine.outgoing_edges(delay).collect();
        assert_eq!(outgoing.len(), 2, "delay feeds both feedback and wet");
        assert!(engine
            .incoming_edges(delay)
            .any(|e| engine.is_connected(delay, e.from)));
        assert_eq!(engine.incoming_edges(core.output()).count(), 1);
    }

    #[test]
    fn delay_time_is_bounded() {
        let mut engine = VirtualEngine::default();
        let mut core = DelayCore::new_with(&mut engine, Seconds(5.0));
        let param = ParamId::new(core.input(), ParamName::DelayTime);
        assert_eq!(engine.param_value(param).unwrap(), 0.3);

        core.set_delay_time(&mut engine, Seconds(9.0));
        assert_eq!(core.delay_time(), Seconds(5.0));
        core.set_delay_time(&mut engine, Seconds(-1.0));
        assert_eq!(engine.param_value(param).unwrap(), 0.0);

        core.set_feedback(&mut engine, 0.9.into());
        assert_eq!(core.feedback(), Normal::from(0.9));
    }
}
