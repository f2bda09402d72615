// Copyright (c) 2024 Mike Tsao

use crate::types::prelude::*;
use serde::{Deserialize, Serialize};

/// One scheduled change to a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomationEvent {
    /// Jump to `value` at `time` and hold it.
    SetValue {
        #[allow(missing_docs)]
        value: ParameterType,
        #[allow(missing_docs)]
        time: Seconds,
    },
    /// Move linearly from the previous event's value to `value`, arriving at
    /// `time`.
    LinearRamp {
        #[allow(missing_docs)]
        value: ParameterType,
        #[allow(missing_docs)]
        time: Seconds,
    },
}
impl AutomationEvent {
    #[allow(missing_docs)]
    pub fn time(&self) -> Seconds {
        match self {
            AutomationEvent::SetValue { time, .. } | AutomationEvent::LinearRamp { time, .. } => {
                *time
            }
        }
    }

    #[allow(missing_docs)]
    pub fn value(&self) -> ParameterType {
        match self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::LinearRamp { value, .. } => *value,
        }
    }
}

/// The continuous-time automation curve of a single parameter.
///
/// Events stay sorted by time. Events with equal times keep their insertion
/// order, so a step followed by a ramp at the same instant behaves as
/// expected. Before the first event, the parameter has its intrinsic value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutomationTimeline {
    intrinsic: ParameterType,
    events: Vec<AutomationEvent>,
}
impl AutomationTimeline {
    /// Creates a timeline with no scheduled events.
    pub fn new_with(intrinsic: ParameterType) -> Self {
        Self {
            intrinsic,
            events: Default::default(),
        }
    }

    /// The value the parameter has before any event takes effect.
    pub fn intrinsic(&self) -> ParameterType {
        self.intrinsic
    }

    /// All scheduled events, in time order.
    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Sets the parameter immediately. If anything is scheduled, the change is
    /// recorded as a step at `now` so that it takes precedence over earlier
    /// events.
    pub fn set_value(&mut self, value: ParameterType, now: Seconds) {
        self.intrinsic = value;
        if !self.events.is_empty() {
            self.insert(AutomationEvent::SetValue { value, time: now });
        }
    }

    #[allow(missing_docs)]
    pub fn set_value_at_time(&mut self, value: ParameterType, time: Seconds) {
        self.insert(AutomationEvent::SetValue { value, time });
    }

    #[allow(missing_docs)]
    pub fn linear_ramp_to_value_at_time(&mut self, value: ParameterType, time: Seconds) {
        self.insert(AutomationEvent::LinearRamp { value, time });
    }

    /// Removes every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: Seconds) {
        self.events.retain(|e| e.time() < time);
    }

    /// The time at which the last scheduled event lands, if any.
    pub fn end_time(&self) -> Option<Seconds> {
        self.events.last().map(|e| e.time())
    }

    /// Evaluates the curve at `time`.
    pub fn value_at(&self, time: Seconds) -> ParameterType {
        // The last event that has already happened, and the first one that
        // hasn't.
        let split = self.events.partition_point(|e| e.time() <= time);
        let previous = split.checked_sub(1).map(|i| &self.events[i]);
        let next = self.events.get(split);

        if let Some(AutomationEvent::LinearRamp {
            value: end_value,
            time: end_time,
        }) = next
        {
            let (start_time, start_value) = match previous {
                Some(e) => (e.time(), e.value()),
                None => (Seconds::zero(), self.intrinsic),
            };
            let span = end_time.0 - start_time.0;
            if span <= 0.0 {
                return *end_value;
            }
            let progress = ((time.0 - start_time.0) / span).clamp(0.0, 1.0);
            return start_value + (end_value - start_value) * progress;
        }
        previous.map_or(self.intrinsic, |e| e.value())
    }

    fn insert(&mut self, event: AutomationEvent) {
        let index = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(index, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn intrinsic_value_without_events() {
        let mut t = AutomationTimeline::new_with(0.5);
        assert_eq!(t.value_at(Seconds(0.0)), 0.5);
        assert_eq!(t.value_at(Seconds(100.0)), 0.5);

        t.set_value(0.25, Seconds(3.0));
        assert!(
            t.events().is_empty(),
            "an immediate set with nothing scheduled shouldn't create an event"
        );
        assert_eq!(t.value_at(Seconds(0.0)), 0.25);
    }

    #[test]
    fn step_then_ramps() {
        let mut t = AutomationTimeline::new_with(0.0);
        t.set_value_at_time(0.0, Seconds(1.0));
        t.linear_ramp_to_value_at_time(1.0, Seconds(1.1));
        t.linear_ramp_to_value_at_time(0.7, Seconds(1.3));

        assert_eq!(t.value_at(Seconds(0.5)), 0.0);
        assert!(approx_eq!(f64, t.value_at(Seconds(1.05)), 0.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, t.value_at(Seconds(1.1)), 1.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, t.value_at(Seconds(1.2)), 0.85, epsilon = 1e-9));
        assert!(approx_eq!(f64, t.value_at(Seconds(1.35)), 0.7, epsilon = 1e-9));
        assert_eq!(t.end_time(), Some(Seconds(1.3)));
    }

    #[test]
    fn cancel_removes_pending_events_only() {
        let mut t = AutomationTimeline::new_with(0.0);
        t.set_value_at_time(0.0, Seconds(0.0));
        t.linear_ramp_to_value_at_time(1.0, Seconds(1.0));
        t.linear_ramp_to_value_at_time(0.5, Seconds(2.0));

        t.cancel_scheduled_values(Seconds(1.0));
        assert_eq!(t.events().len(), 1, "events at or after the cancel time go");
        assert_eq!(t.value_at(Seconds(5.0)), 0.0);
    }

    #[test]
    fn equal_times_keep_insertion_order() {
        let mut t = AutomationTimeline::new_with(0.0);
        t.set_value_at_time(0.8, Seconds(2.0));
        t.linear_ramp_to_value_at_time(0.0, Seconds(2.5));
        t.set_value_at_time(0.3, Seconds(2.0));

        assert_eq!(t.events()[0].value(), 0.8);
        assert_eq!(t.events()[1].value(), 0.3);
        assert!(approx_eq!(f64, t.value_at(Seconds(2.25)), 0.15, epsilon = 1e-9));
    }

    #[test]
    fn ramp_without_predecessor_starts_from_intrinsic_at_zero() {
        let mut t = AutomationTimeline::new_with(1.0);
        t.linear_ramp_to_value_at_time(0.0, Seconds(2.0));
        assert!(approx_eq!(f64, t.value_at(Seconds(1.0)), 0.5, epsilon = 1e-9));
        assert_eq!(t.value_at(Seconds(3.0)), 0.0);
    }
}
