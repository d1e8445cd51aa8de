#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Commentary dispatcher turning internal cues into short, rate-limited
//! messages for the UI layer.

mod phrasebook;

use std::time::Duration;

use serde::Deserialize;
use snake_overseer_core::{
    Archetype, CommentaryEvent, Cue, EscalationLevel, Priority, RandomSource,
};

/// Cooldown and ambient chatter settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CommentaryTuning {
    /// Shortest cooldown after an emission.
    pub cooldown_min_ms: u64,
    /// Longest cooldown after an emission.
    pub cooldown_max_ms: u64,
    /// Probability per idle check of an ambient taunt.
    pub ambient_chance: f32,
}

impl Default for CommentaryTuning {
    fn default() -> Self {
        Self {
            cooldown_min_ms: 3_000,
            cooldown_max_ms: 5_000,
            ambient_chance: 0.2,
        }
    }
}

/// Stateful dispatcher remembering the last message and the cooldown window.
#[derive(Debug)]
pub struct Commentary {
    tuning: CommentaryTuning,
    last_message: Option<&'static str>,
    quiet_until: Duration,
}

impl Default for Commentary {
    fn default() -> Self {
        Self::new(CommentaryTuning::default())
    }
}

impl Commentary {
    /// Creates a dispatcher with an elapsed cooldown.
    #[must_use]
    pub fn new(tuning: CommentaryTuning) -> Self {
        Self {
            tuning,
            last_message: None,
            quiet_until: Duration::ZERO,
        }
    }

    /// Rolls for an ambient taunt during an idle check.
    pub fn ambient<R>(
        &self,
        level: EscalationLevel,
        archetype: Archetype,
        rng: &mut R,
        out: &mut Vec<Cue>,
    ) where
        R: RandomSource + ?Sized,
    {
        if level >= EscalationLevel::SubtleInterference && rng.chance(self.tuning.ambient_chance) {
            out.push(Cue::Ambient { archetype });
        }
    }

    /// Converts the cues raised during one tick into commentary events.
    ///
    /// Cues are reduced to one per category, then ordered by priority and
    /// registration order. High-priority cues always speak; the others only
    /// when the cooldown has elapsed. Every emission restarts the cooldown.
    pub fn dispatch<R>(
        &mut self,
        now: Duration,
        cues: &[Cue],
        rng: &mut R,
        out: &mut Vec<CommentaryEvent>,
    ) where
        R: RandomSource + ?Sized,
    {
        let mut candidates: Vec<Cue> = Vec::with_capacity(cues.len());
        for cue in cues {
            if !candidates
                .iter()
                .any(|candidate| candidate.category() == cue.category())
            {
                candidates.push(*cue);
            }
        }
        candidates.sort_by(|left, right| {
            right
                .priority()
                .cmp(&left.priority())
                .then(left.category().cmp(&right.category()))
        });

        for cue in candidates {
            let priority = cue.priority();
            if priority != Priority::High && now < self.quiet_until {
                continue;
            }

            let message = self.pick(&cue, rng);
            self.last_message = Some(message);
            self.quiet_until = now
                + rng.between(
                    Duration::from_millis(self.tuning.cooldown_min_ms),
                    Duration::from_millis(self.tuning.cooldown_max_ms),
                );
            tracing::debug!(category = ?cue.category(), ?priority, message, "commentary");
            out.push(CommentaryEvent {
                message: message.to_owned(),
                source: cue.category(),
                priority,
            });
        }
    }

    /// Last message emitted, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&'static str> {
        self.last_message
    }

    /// Host clock reading at which the cooldown elapses.
    #[must_use]
    pub const fn quiet_until(&self) -> Duration {
        self.quiet_until
    }

    fn pick<R>(&self, cue: &Cue, rng: &mut R) -> &'static str
    where
        R: RandomSource + ?Sized,
    {
        let pool = phrasebook::primary(cue);
        let choice = pool[rng.below(pool.len() as u32) as usize];
        if Some(choice) != self.last_message {
            return choice;
        }

        let alternates = phrasebook::alternate(cue.category());
        let index = rng.below(alternates.len() as u32) as usize;
        let fallback = alternates[index];
        if Some(fallback) != self.last_message {
            fallback
        } else {
            alternates[(index + 1) % alternates.len()]
        }
    }
}
