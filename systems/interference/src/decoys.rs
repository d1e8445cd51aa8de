//! Decoy objectives: spawning, contact, expiry and flicker.

use std::time::Duration;

use serde::Deserialize;
use snake_overseer_core::{
    BoardState, CellCoord, Decoy, DecoyId, DecoyReason, Obstacle, RandomSource,
};

use crate::placement::sample_free_cell;

/// Rules and timings of the decoy spawner.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DecoyTuning {
    /// Probability per idle check that a decoy spawns while none is active.
    pub idle_chance: f32,
    /// Delay between a consumption and the forced decoy that follows it.
    pub consumption_delay_ms: u64,
    /// Comfort-zone size above which comfort is detected.
    pub comfort_threshold: f32,
    /// Risk tolerance below which comfort is detected.
    pub comfort_risk_ceiling: f32,
    /// Minimum time between two comfort-forced decoys.
    pub comfort_cooldown_ms: u64,
    /// Extra decoys allowed to coexist during a hostile takeover.
    pub hostile_extra: usize,
    /// Probability per idle check that a hostile extra spawns.
    pub hostile_chance: f32,
    /// How long a decoy stays on the board.
    pub lifetime_ms: u64,
    /// Delay before an expired decoy reappears during a hostile takeover.
    pub reappear_after_ms: u64,
    /// Upper bound on simultaneously active decoys.
    pub max_active: usize,
    /// Period of the flicker animation phase.
    pub flicker_period_ms: u64,
    /// Random candidates tried before a spawn is skipped.
    pub attempts: u32,
}

impl Default for DecoyTuning {
    fn default() -> Self {
        Self {
            idle_chance: 0.25,
            consumption_delay_ms: 600,
            comfort_threshold: 0.7,
            comfort_risk_ceiling: 0.2,
            comfort_cooldown_ms: 2_000,
            hostile_extra: 2,
            hostile_chance: 0.25,
            lifetime_ms: 8_000,
            reappear_after_ms: 1_500,
            max_active: 3,
            flicker_period_ms: 500,
            attempts: 50,
        }
    }
}

/// Active decoys of the current session.
#[derive(Debug, Default)]
pub(crate) struct DecoyField {
    active: Vec<Decoy>,
    next_id: u32,
    last_comfort_spawn: Option<Duration>,
}

impl DecoyField {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn active(&self) -> &[Decoy] {
        &self.active
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub(crate) fn count(&self, reason: DecoyReason) -> usize {
        self.active
            .iter()
            .filter(|decoy| decoy.reason == reason)
            .count()
    }

    /// Whether a comfort-forced decoy may spawn at `now`.
    pub(crate) fn comfort_ready(&self, now: Duration, tuning: &DecoyTuning) -> bool {
        if self.count(DecoyReason::Comfort) > 0 {
            return false;
        }
        self.last_comfort_spawn.map_or(true, |last| {
            now.saturating_sub(last) >= Duration::from_millis(tuning.comfort_cooldown_ms)
        })
    }

    /// Places a new decoy, preferring `preferred` when it is still free.
    ///
    /// Returns `None` when the field is full or no free cell was found.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn spawn<R>(
        &mut self,
        now: Duration,
        reason: DecoyReason,
        preferred: Option<CellCoord>,
        board: &BoardState,
        obstacles: &[Obstacle],
        tuning: &DecoyTuning,
        rng: &mut R,
    ) -> Option<Decoy>
    where
        R: RandomSource + ?Sized,
    {
        if self.active.len() >= tuning.max_active {
            return None;
        }

        let blocked = |cell: CellCoord| {
            !board.dimensions.contains(cell)
                || board.occupies(cell)
                || cell == board.objective
                || obstacles.iter().any(|obstacle| obstacle.position == cell)
                || self.active.iter().any(|decoy| decoy.position == cell)
        };
        let position = match preferred {
            Some(cell) if !blocked(cell) => Some(cell),
            _ => sample_free_cell(board.dimensions, tuning.attempts, rng, blocked),
        }?;

        self.next_id = self.next_id.wrapping_add(1);
        let decoy = Decoy {
            id: DecoyId::new(self.next_id),
            position,
            reason,
            expires_at: now + Duration::from_millis(tuning.lifetime_ms),
            flicker_phase: 0.0,
        };
        if reason == DecoyReason::Comfort {
            self.last_comfort_spawn = Some(now);
        }
        self.active.push(decoy);
        tracing::debug!(
            id = decoy.id.get(),
            column = position.column(),
            row = position.row(),
            ?reason,
            "decoy spawned"
        );
        Some(decoy)
    }

    /// Removes the decoy at `position`. A second contact finds nothing.
    pub(crate) fn consume_at(&mut self, position: CellCoord) -> Option<Decoy> {
        let index = self
            .active
            .iter()
            .position(|decoy| decoy.position == position)?;
        Some(self.active.remove(index))
    }

    /// Removes and returns every decoy whose lifetime ended.
    pub(crate) fn expire(&mut self, now: Duration) -> Vec<Decoy> {
        let mut expired = Vec::new();
        self.active.retain(|decoy| {
            if decoy.expires_at <= now {
                expired.push(*decoy);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Recomputes the flicker phase of every active decoy.
    pub(crate) fn refresh_flicker(&mut self, now: Duration, tuning: &DecoyTuning) {
        let period = tuning.flicker_period_ms.max(1);
        for decoy in &mut self.active {
            let remaining = decoy.expires_at.saturating_sub(now).as_millis() as u64;
            decoy.flicker_phase = (remaining % period) as f32 / period as f32;
        }
    }
}
