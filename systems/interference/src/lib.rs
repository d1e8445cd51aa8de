#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interference effect engine that perturbs the game in proportion to the
//! current escalation level.
//!
//! Each logic tick runs a fixed pipeline: consumption detection, the idle
//! check, deferred effects, decoy contact and expiry, velocity, decoy spawn
//! rules, placement bias and obstacles. Every noteworthy change is reported as
//! a [`Cue`] for the commentary dispatcher. Delayed effects are queued on a
//! per-session [`Scheduler`] that is cancelled on teardown.

mod decoys;
mod obstacles;
mod placement;
mod scheduler;
mod velocity;

use std::time::Duration;

use serde::Deserialize;
use snake_overseer_core::{
    BoardState, CellCoord, Cue, Decoy, DecoyReason, EscalationLevel, InterferenceBundle,
    MetricsSnapshot, PlacementBias, RandomSource, SessionId,
};

use crate::decoys::DecoyField;
use crate::obstacles::ObstacleField;
use crate::velocity::{Velocity, VelocityInputs};

pub use decoys::DecoyTuning;
pub use obstacles::{place_obstacle, ObstacleTuning};
pub use placement::{placement_bias, sample_free_cell, PlacementTuning};
pub use scheduler::Scheduler;
pub use velocity::VelocityTuning;

/// Tuning of every interference effect.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InterferenceTuning {
    /// Interval between two idle checks.
    pub idle_check_interval_ms: u64,
    /// Velocity multiplier model.
    pub velocity: VelocityTuning,
    /// Decoy spawner.
    pub decoys: DecoyTuning,
    /// Objective placement bias.
    pub placement: PlacementTuning,
    /// Obstacle spawner.
    pub obstacles: ObstacleTuning,
}

impl Default for InterferenceTuning {
    fn default() -> Self {
        Self {
            idle_check_interval_ms: 1_000,
            velocity: VelocityTuning::default(),
            decoys: DecoyTuning::default(),
            placement: PlacementTuning::default(),
            obstacles: ObstacleTuning::default(),
        }
    }
}

/// Read-only inputs for a single tick.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    /// Host clock reading.
    pub now: Duration,
    /// Survival time of the current session.
    pub elapsed: Duration,
    /// Escalation level in force for this tick.
    pub level: EscalationLevel,
    /// Metrics derived from telemetry.
    pub metrics: &'a MetricsSnapshot,
    /// Board reported by the host game.
    pub board: &'a BoardState,
}

/// What a tick observed, beyond the cues it emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Whether this tick ran the periodic idle check.
    pub idle_check: bool,
    /// Real objectives consumed since the previous tick.
    pub consumed: u32,
}

/// Effects that fire after a delay.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Deferred {
    SpawnDecoy {
        reason: DecoyReason,
        position: Option<CellCoord>,
    },
}

/// Owns the interference bundle of the current session.
#[derive(Debug)]
pub struct Interference {
    tuning: InterferenceTuning,
    session: Option<SessionId>,
    scheduler: Scheduler<Deferred>,
    velocity: Velocity,
    decoys: DecoyField,
    obstacles: ObstacleField,
    placement_bias: PlacementBias,
    last_idle_check: Duration,
    objectives_seen: u32,
}

impl Default for Interference {
    fn default() -> Self {
        Self::new(InterferenceTuning::default())
    }
}

impl Interference {
    /// Creates an engine with no active session.
    #[must_use]
    pub fn new(tuning: InterferenceTuning) -> Self {
        Self {
            tuning,
            session: None,
            scheduler: Scheduler::new(),
            velocity: Velocity::default(),
            decoys: DecoyField::default(),
            obstacles: ObstacleField::default(),
            placement_bias: PlacementBias::NEUTRAL,
            last_idle_check: Duration::ZERO,
            objectives_seen: 0,
        }
    }

    /// Prepares a clean bundle for `session` starting at `now`.
    pub fn begin_session<R>(&mut self, session: SessionId, now: Duration, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        self.session = Some(session);
        self.scheduler.begin(session);
        self.velocity.reset();
        self.decoys.reset();
        self.obstacles.reset(&self.tuning.obstacles, rng);
        self.placement_bias = PlacementBias::NEUTRAL;
        self.last_idle_check = now;
        self.objectives_seen = 0;
    }

    /// Tears the session down, cancelling delayed effects and zeroing the bundle.
    pub fn end_session(&mut self) {
        let cancelled = self.scheduler.end();
        if let Some(session) = self.session.take() {
            tracing::debug!(session = session.get(), cancelled, "interference torn down");
        }
        self.velocity.reset();
        self.decoys.reset();
        self.obstacles.clear();
        self.placement_bias = PlacementBias::NEUTRAL;
        self.objectives_seen = 0;
    }

    /// Advances every effect by one tick, pushing cues for noteworthy changes.
    pub fn tick<R>(&mut self, ctx: TickContext<'_>, rng: &mut R, out: &mut Vec<Cue>) -> TickReport
    where
        R: RandomSource + ?Sized,
    {
        if self.session.is_none() {
            return TickReport::default();
        }

        let consumed = ctx
            .board
            .objectives_consumed
            .saturating_sub(self.objectives_seen);
        self.objectives_seen = self.objectives_seen.max(ctx.board.objectives_consumed);

        let interval = Duration::from_millis(self.tuning.idle_check_interval_ms);
        let idle_check = ctx.now.saturating_sub(self.last_idle_check) >= interval;
        if idle_check {
            self.last_idle_check = ctx.now;
        }

        for effect in self.scheduler.drain_due(ctx.now) {
            match effect {
                Deferred::SpawnDecoy { reason, position } => {
                    self.spawn_decoy(ctx, reason, position, rng, out);
                }
            }
        }

        let _ = self.consume_decoy_at(ctx.board.head, out);

        for expired in self.decoys.expire(ctx.now) {
            if ctx.level == EscalationLevel::HostileTakeover {
                let due = ctx.now + Duration::from_millis(self.tuning.decoys.reappear_after_ms);
                let _ = self.scheduler.schedule(
                    due,
                    Deferred::SpawnDecoy {
                        reason: DecoyReason::Reappearance,
                        position: Some(expired.position),
                    },
                );
            }
        }

        let inputs = VelocityInputs {
            now: ctx.now,
            elapsed: ctx.elapsed,
            level: ctx.level,
            comfort_zone: ctx.metrics.comfort_zone,
            consumed: consumed > 0,
            idle_check,
        };
        if let Some(cause) = self.velocity.update(inputs, &self.tuning.velocity, rng) {
            out.push(Cue::SpeedChanged { cause });
        }

        self.apply_spawn_rules(ctx, consumed, idle_check, rng, out);
        self.decoys.refresh_flicker(ctx.now, &self.tuning.decoys);

        self.placement_bias = placement_bias(ctx.metrics, &self.tuning.placement);

        if consumed > 0 {
            let spawned = self.obstacles.on_consumed(
                consumed,
                ctx.level,
                ctx.board,
                &self.tuning.obstacles,
                rng,
            );
            if spawned.is_some() {
                out.push(Cue::ObstacleSpawned);
            }
        }

        TickReport {
            idle_check,
            consumed,
        }
    }

    /// Removes the decoy at `position`, if any, and pushes a single reaction cue.
    ///
    /// Repeated contact with the same cell finds nothing and emits nothing.
    pub fn consume_decoy_at(&mut self, position: CellCoord, out: &mut Vec<Cue>) -> Option<Decoy> {
        let decoy = self.decoys.consume_at(position)?;
        tracing::debug!(id = decoy.id.get(), "decoy consumed");
        out.push(Cue::DecoyConsumed);
        Some(decoy)
    }

    /// Current interference bundle.
    #[must_use]
    pub fn bundle(&self) -> InterferenceBundle {
        InterferenceBundle {
            velocity_multiplier: self.velocity.current(),
            decoys: self.decoys.active().to_vec(),
            obstacles: self.obstacles.placed().to_vec(),
            placement_bias: self.placement_bias,
        }
    }

    /// Number of delayed effects waiting to fire.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.scheduler.pending()
    }

    /// Session the engine is bound to.
    #[must_use]
    pub const fn session(&self) -> Option<SessionId> {
        self.session
    }

    fn apply_spawn_rules<R>(
        &mut self,
        ctx: TickContext<'_>,
        consumed: u32,
        idle_check: bool,
        rng: &mut R,
        out: &mut Vec<Cue>,
    ) where
        R: RandomSource + ?Sized,
    {
        let tuning = &self.tuning.decoys;

        if consumed > 0 && ctx.level >= EscalationLevel::ActiveManipulation {
            let due = ctx.now + Duration::from_millis(tuning.consumption_delay_ms);
            let _ = self.scheduler.schedule(
                due,
                Deferred::SpawnDecoy {
                    reason: DecoyReason::Consumption,
                    position: None,
                },
            );
        }

        let comfort_detected = ctx.metrics.comfort_zone > tuning.comfort_threshold
            && ctx.metrics.risk_tolerance < tuning.comfort_risk_ceiling;
        if comfort_detected && self.decoys.comfort_ready(ctx.now, tuning) {
            self.spawn_decoy(ctx, DecoyReason::Comfort, None, rng, out);
        }

        if !idle_check {
            return;
        }

        if ctx.level >= EscalationLevel::SubtleInterference
            && self.decoys.is_empty()
            && rng.chance(self.tuning.decoys.idle_chance)
        {
            self.spawn_decoy(ctx, DecoyReason::Idle, None, rng, out);
        }

        if ctx.level == EscalationLevel::HostileTakeover
            && self.decoys.count(DecoyReason::Hostile) < self.tuning.decoys.hostile_extra
            && rng.chance(self.tuning.decoys.hostile_chance)
        {
            self.spawn_decoy(ctx, DecoyReason::Hostile, None, rng, out);
        }
    }

    fn spawn_decoy<R>(
        &mut self,
        ctx: TickContext<'_>,
        reason: DecoyReason,
        position: Option<CellCoord>,
        rng: &mut R,
        out: &mut Vec<Cue>,
    ) where
        R: RandomSource + ?Sized,
    {
        let spawned = self.decoys.spawn(
            ctx.now,
            reason,
            position,
            ctx.board,
            self.obstacles.placed(),
            &self.tuning.decoys,
            rng,
        );
        if spawned.is_some() {
            out.push(Cue::DecoySpawned { reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Interference, TickContext};
    use snake_overseer_core::{
        BoardDimensions, BoardState, CellCoord, Cue, EscalationLevel, InterferenceBundle,
        MetricsSnapshot, RandomSource, SessionId, SpeedCause,
    };
    use std::time::Duration;

    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f32 {
            self.0
        }
    }

    fn board(consumed: u32) -> BoardState {
        BoardState {
            dimensions: BoardDimensions::new(10, 10),
            head: CellCoord::new(1, 1),
            body: vec![CellCoord::new(1, 1)],
            objective: CellCoord::new(8, 8),
            length: 1,
            objectives_consumed: consumed,
            win_reached: false,
        }
    }

    #[test]
    fn observation_level_never_spawns_decoys() {
        let mut engine = Interference::default();
        let mut rng = Fixed(0.0);
        engine.begin_session(SessionId::new(1), Duration::ZERO, &mut rng);
        let metrics = MetricsSnapshot::default();
        let board = board(0);
        let mut cues = Vec::new();

        for second in 1..10u64 {
            let ctx = TickContext {
                now: Duration::from_secs(second),
                elapsed: Duration::from_secs(second),
                level: EscalationLevel::Observation,
                metrics: &metrics,
                board: &board,
            };
            let report = engine.tick(ctx, &mut rng, &mut cues);
            assert!(report.idle_check);
        }
        assert!(engine.bundle().decoys.is_empty());
        assert!(cues.is_empty());
    }

    #[test]
    fn consumption_at_active_level_schedules_a_decoy() {
        let mut engine = Interference::default();
        let mut rng = Fixed(0.5);
        engine.begin_session(SessionId::new(1), Duration::ZERO, &mut rng);
        let metrics = MetricsSnapshot::default();
        let eaten = board(1);
        let mut cues = Vec::new();

        let ctx = TickContext {
            now: Duration::from_millis(100),
            elapsed: Duration::from_millis(100),
            level: EscalationLevel::ActiveManipulation,
            metrics: &metrics,
            board: &eaten,
        };
        let _ = engine.tick(ctx, &mut rng, &mut cues);
        assert_eq!(engine.pending_effects(), 1);
        assert!(cues.contains(&Cue::SpeedChanged {
            cause: SpeedCause::Surge
        }));

        let later = TickContext {
            now: Duration::from_millis(700),
            elapsed: Duration::from_millis(700),
            ..ctx
        };
        let _ = engine.tick(later, &mut rng, &mut cues);
        assert_eq!(engine.pending_effects(), 0);
        assert_eq!(engine.bundle().decoys.len(), 1);
    }

    #[test]
    fn teardown_zeroes_the_bundle() {
        let mut engine = Interference::default();
        let mut rng = Fixed(0.5);
        engine.begin_session(SessionId::new(4), Duration::ZERO, &mut rng);
        let metrics = MetricsSnapshot::default();
        let eaten = board(1);
        let ctx = TickContext {
            now: Duration::from_secs(20),
            elapsed: Duration::from_secs(20),
            level: EscalationLevel::HostileTakeover,
            metrics: &metrics,
            board: &eaten,
        };
        let _ = engine.tick(ctx, &mut rng, &mut Vec::new());
        assert!(engine.bundle().velocity_multiplier.get() > 1.0);

        engine.end_session();
        assert_eq!(engine.bundle(), InterferenceBundle::default());
        assert_eq!(engine.pending_effects(), 0);
        assert_eq!(engine.session(), None);
    }
}
