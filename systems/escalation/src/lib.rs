#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Escalation state machine advanced by survival time or snake length.
//!
//! Levels only ever move upward within a session and advance by at most one
//! step per evaluation. Only [`Escalation::reset`], called when a new session
//! starts, returns the machine to [`EscalationLevel::Observation`].

use std::time::Duration;

use serde::Deserialize;
use snake_overseer_core::EscalationLevel;

/// Thresholds that advance the escalation level. Each transition fires when
/// either its time or its length threshold is reached.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EscalationTuning {
    /// Survival time that moves observation to subtle interference.
    pub subtle_after_ms: u64,
    /// Snake length that moves observation to subtle interference.
    pub subtle_length: u32,
    /// Survival time that moves subtle interference to active manipulation.
    pub active_after_ms: u64,
    /// Snake length that moves subtle interference to active manipulation.
    pub active_length: u32,
    /// Survival time that moves active manipulation to hostile takeover.
    pub hostile_after_ms: u64,
    /// Snake length that moves active manipulation to hostile takeover.
    pub hostile_length: u32,
}

impl Default for EscalationTuning {
    fn default() -> Self {
        Self {
            subtle_after_ms: 10_000,
            subtle_length: 6,
            active_after_ms: 20_000,
            active_length: 11,
            hostile_after_ms: 30_000,
            hostile_length: 16,
        }
    }
}

impl EscalationTuning {
    fn threshold(&self, target: EscalationLevel) -> Option<(Duration, u32)> {
        match target {
            EscalationLevel::Observation => None,
            EscalationLevel::SubtleInterference => Some((
                Duration::from_millis(self.subtle_after_ms),
                self.subtle_length,
            )),
            EscalationLevel::ActiveManipulation => Some((
                Duration::from_millis(self.active_after_ms),
                self.active_length,
            )),
            EscalationLevel::HostileTakeover => Some((
                Duration::from_millis(self.hostile_after_ms),
                self.hostile_length,
            )),
        }
    }
}

/// Current level and the instant it became active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscalationState {
    level: EscalationLevel,
    entered_at: Duration,
}

impl EscalationState {
    /// Level currently active.
    #[must_use]
    pub const fn level(&self) -> EscalationLevel {
        self.level
    }

    /// Host clock reading when the level became active.
    #[must_use]
    pub const fn entered_at(&self) -> Duration {
        self.entered_at
    }
}

/// Monotonic four-level escalation machine.
#[derive(Debug)]
pub struct Escalation {
    tuning: EscalationTuning,
    state: EscalationState,
    transitions: u32,
}

impl Default for Escalation {
    fn default() -> Self {
        Self::new(EscalationTuning::default())
    }
}

impl Escalation {
    /// Creates a machine resting at observation.
    #[must_use]
    pub fn new(tuning: EscalationTuning) -> Self {
        Self {
            tuning,
            state: EscalationState {
                level: EscalationLevel::Observation,
                entered_at: Duration::ZERO,
            },
            transitions: 0,
        }
    }

    /// Returns the machine to observation for a session starting at `now`.
    pub fn reset(&mut self, now: Duration) {
        self.state = EscalationState {
            level: EscalationLevel::Observation,
            entered_at: now,
        };
        self.transitions = 0;
    }

    /// Evaluates the thresholds of the next level up.
    ///
    /// `elapsed` is the current session's survival time. Returns the newly
    /// entered level when a transition fired. Thresholds of levels beyond the
    /// next one are not considered, so a single call advances at most once.
    pub fn evaluate(
        &mut self,
        now: Duration,
        elapsed: Duration,
        length: u32,
    ) -> Option<EscalationLevel> {
        let next = self.state.level.next()?;
        let (after, min_length) = self.tuning.threshold(next)?;

        if elapsed < after && length < min_length {
            return None;
        }

        tracing::debug!(
            from = self.state.level.label(),
            to = next.label(),
            elapsed_ms = elapsed.as_millis() as u64,
            length,
            "escalation advanced"
        );
        self.state = EscalationState {
            level: next,
            entered_at: now,
        };
        self.transitions = self.transitions.saturating_add(1);
        Some(next)
    }

    /// Current state of the machine.
    #[must_use]
    pub const fn state(&self) -> EscalationState {
        self.state
    }

    /// Level currently active.
    #[must_use]
    pub const fn level(&self) -> EscalationLevel {
        self.state.level
    }

    /// Number of transitions fired since the last reset.
    #[must_use]
    pub const fn transitions(&self) -> u32 {
        self.transitions
    }
}
