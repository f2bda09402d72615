// Copyright (c) 2024 Mike Tsao

use super::set_param;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Where an [EnvelopeCore] is in its ADSR cycle at a given engine time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvelopePhase {
    /// Resting at whatever level the last release reached (normally zero).
    #[default]
    Idle,
    /// Ramping from 0 toward 1.
    Attacking,
    /// Ramping from 1 toward the sustain level.
    Decaying,
    /// Holding at the sustain level until released.
    Sustaining,
    /// Ramping toward 0 after a release.
    Releasing,
}
impl EnvelopePhase {
    /// Whether the envelope is between a trigger and a release.
    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            EnvelopePhase::Attacking | EnvelopePhase::Decaying | EnvelopePhase::Sustaining
        )
    }
}

/// The scheduled boundaries of the most recent trigger or release.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Schedule {
    #[default]
    None,
    Triggered {
        attack_end: Seconds,
        decay_end: Seconds,
    },
    Released {
        release_end: Seconds,
    },
}

/// An ADSR contour applied to a single gain stage.
///
/// [EnvelopeCore::trigger()] and [EnvelopeCore::release()] don't compute
/// anything per sample. They schedule linear ramps on the gain's automation
/// timeline and let the engine play them out. The engine evaluates them
/// against its own clock, so the exact sequence of cancel, pin, and ramp
/// calls matters.
///
/// Changing attack, decay, sustain, or release only affects the next
/// trigger or release. Anything already scheduled plays out as it was.
#[derive(Debug)]
pub struct EnvelopeCore {
    node: NodeId,
    attack: Seconds,
    decay: Seconds,
    sustain: Normal,
    release: Seconds,
    is_playing: bool,
    schedule: Schedule,
}
impl EnvelopeCore {
    #[allow(missing_docs)]
    pub const DEFAULT_ATTACK: Seconds = Seconds(0.1);
    #[allow(missing_docs)]
    pub const DEFAULT_DECAY: Seconds = Seconds(0.2);
    #[allow(missing_docs)]
    pub const DEFAULT_SUSTAIN: Normal = Normal::new_const(0.7);
    #[allow(missing_docs)]
    pub const DEFAULT_RELEASE: Seconds = Seconds(0.5);

    #[allow(missing_docs)]
    pub fn new_with(engine: &mut dyn AudioEngine) -> Self {
        let node = engine.create_node(NodeKind::Gain);
        set_param(engine, node, ParamName::Gain, 0.0);
        Self {
            node,
            attack: Self::DEFAULT_ATTACK,
            decay: Self::DEFAULT_DECAY,
            sustain: Self::DEFAULT_SUSTAIN,
            release: Self::DEFAULT_RELEASE,
            is_playing: false,
            schedule: Schedule::None,
        }
    }

    /// The contoured gain stage. Audio passes through it, and it is also
    /// what gets routed when the envelope modulates another module.
    pub fn node(&self) -> NodeId {
        self.node
    }

    fn gain_param(&self) -> ParamId {
        ParamId::new(self.node, ParamName::Gain)
    }

    /// Starts a new attack from zero, right now. Retriggering while playing
    /// restarts the attack.
    pub fn trigger(&mut self, engine: &mut dyn AudioEngine) {
        let param = self.gain_param();
        let now = engine.current_time();
        let attack_end = now + self.attack;
        let decay_end = attack_end + self.decay;

        engine
            .cancel_scheduled_values(param, now)
            .absorb("cancelling envelope automation");
        engine
            .set_value_at_time(param, 0.0, now)
            .absorb("pinning envelope level");
        engine
            .linear_ramp_to_value_at_time(param, 1.0, attack_end)
            .absorb("scheduling envelope attack");
        engine
            .linear_ramp_to_value_at_time(param, self.sustain.0, decay_end)
            .absorb("scheduling envelope decay");

        self.is_playing = true;
        self.schedule = Schedule::Triggered {
            attack_end,
            decay_end,
        };
    }

    /// Ramps to zero from wherever the level is right now. Returns false,
    /// scheduling nothing, if the envelope isn't playing.
    pub fn release(&mut self, engine: &mut dyn AudioEngine) -> bool {
        if !self.is_playing {
            return false;
        }
        let param = self.gain_param();
        let now = engine.current_time();
        let release_end = now + self.release;

        // Cancelling drops the ramp we're partway through, after which the
        // engine would report the last surviving event instead of the level
        // that's actually sounding. So read it first.
        let current = engine.param_value(param).unwrap_or(0.0);
        engine
            .cancel_scheduled_values(param, now)
            .absorb("cancelling envelope automation");
        engine
            .set_value_at_time(param, current, now)
            .absorb("pinning envelope level");
        engine
            .linear_ramp_to_value_at_time(param, 0.0, release_end)
            .absorb("scheduling envelope release");

        self.is_playing = false;
        self.schedule = Schedule::Released { release_end };
        true
    }

    /// True between a trigger and the following release.
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// The phase at engine time `now`, derived from what was last scheduled.
    pub fn phase(&self, now: Seconds) -> EnvelopePhase {
        match self.schedule {
            Schedule::None => EnvelopePhase::Idle,
            Schedule::Triggered {
                attack_end,
                decay_end,
            } => {
                if now < attack_end {
                    EnvelopePhase::Attacking
                } else if now < decay_end {
                    EnvelopePhase::Decaying
                } else {
                    EnvelopePhase::Sustaining
                }
            }
            Schedule::Released { release_end } => {
                if now < release_end {
                    EnvelopePhase::Releasing
                } else {
                    EnvelopePhase::Idle
                }
            }
        }
    }

    #[allow(missing_docs)]
    pub fn attack(&self) -> Seconds {
        self.attack
    }

    #[allow(missing_docs)]
    pub fn set_attack(&mut self, attack: Seconds) {
        self.attack = attack.max(Seconds::zero());
    }

    #[allow(missing_docs)]
    pub fn decay(&self) -> Seconds {
        self.decay
    }

    #[allow(missing_docs)]
    pub fn set_decay(&mut self, decay: Seconds) {
        self.decay = decay.max(Seconds::zero());
    }

    #[allow(missing_docs)]
    pub fn sustain(&self) -> Normal {
        self.sustain
    }

    #[allow(missing_docs)]
    pub fn set_sustain(&mut self, sustain: Normal) {
        self.sustain = sustain;
    }

    #[allow(missing_docs)]
    pub fn release_time(&self) -> Seconds {
        self.release
    }

    #[allow(missing_docs)]
    pub fn set_release(&mut self, release: Seconds) {
        self.release = release.max(Seconds::zero());
    }
}
