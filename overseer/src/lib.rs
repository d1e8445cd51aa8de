#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game-master orchestrator composing the overseer systems into lifecycle hooks.
//!
//! [`GameMaster`] is the only component that mutates session, escalation and
//! interference state. The host calls [`GameMaster::on_session_start`],
//! [`GameMaster::on_move`], [`GameMaster::on_tick`] and
//! [`GameMaster::on_session_end`] from its logic tick and hands the returned
//! [`OverseerSnapshot`] to rendering collaborators.

mod config;
mod post_mortem;

use std::time::Duration;

use snake_overseer_core::{
    Archetype, BoardState, CommentaryEvent, Cue, Direction, EscalationLevel, InterferenceBundle,
    MetricsSnapshot, MoveInput, MoveRecord, OverseerSnapshot, PostMortem, RandomSource,
    SeededRandom, SessionId, SessionRecord, TelemetryArchive, TerminationCause,
};
use snake_overseer_system_analytics::{classify, compute_metrics, detect_cycle, MetricsTuning};
use snake_overseer_system_commentary::Commentary;
use snake_overseer_system_escalation::Escalation;
use snake_overseer_system_interference::{Interference, TickContext};
use snake_overseer_system_telemetry::Telemetry;

pub use config::OverseerConfig;

/// Everything produced when a session ends.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    /// Completed session record.
    pub record: SessionRecord,
    /// Final snapshot, with the bundle zeroed and closing commentary attached.
    pub snapshot: OverseerSnapshot,
    /// Analysis shown to the player.
    pub post_mortem: PostMortem,
    /// Cross-session state to hand to persistence.
    pub archive: TelemetryArchive,
}

#[derive(Clone, Copy, Debug)]
struct ActiveSession {
    id: SessionId,
    started_at: Duration,
    archetype: Archetype,
}

/// Adaptive game-master for a single player.
#[derive(Debug)]
pub struct GameMaster<R = SeededRandom> {
    telemetry: Telemetry,
    metrics_tuning: MetricsTuning,
    escalation: Escalation,
    interference: Interference,
    commentary: Commentary,
    rng: R,
    active: Option<ActiveSession>,
    archetype: Archetype,
    snapshot: OverseerSnapshot,
}

impl<R: RandomSource> GameMaster<R> {
    /// Creates a game-master drawing every random decision from `rng`.
    #[must_use]
    pub fn new(config: OverseerConfig, rng: R) -> Self {
        Self {
            telemetry: Telemetry::new(config.telemetry),
            metrics_tuning: config.metrics,
            escalation: Escalation::new(config.escalation),
            interference: Interference::new(config.interference),
            commentary: Commentary::new(config.commentary),
            rng,
            active: None,
            archetype: Archetype::default(),
            snapshot: OverseerSnapshot::default(),
        }
    }

    /// Starts a session at `now`, classifying the player from their history.
    ///
    /// A session still open is abandoned: its deferred effects are cancelled
    /// and it never enters the rolling window.
    pub fn on_session_start(&mut self, now: Duration) -> OverseerSnapshot {
        if let Some(abandoned) = self.active.take() {
            tracing::debug!(session = abandoned.id.get(), "abandoning open session");
            self.interference.end_session();
        }

        let history = compute_metrics(&self.telemetry.view(), &self.metrics_tuning);
        self.archetype = classify(&history);

        let id = self.telemetry.start_session(now);
        self.escalation.reset(now);
        self.interference.begin_session(id, now, &mut self.rng);
        self.active = Some(ActiveSession {
            id,
            started_at: now,
            archetype: self.archetype,
        });

        tracing::info!(
            session = id.get(),
            archetype = self.archetype.label(),
            completed = history.completed_sessions,
            "session started"
        );

        let cues = [Cue::SessionStarted {
            completed_sessions: history.completed_sessions,
            archetype: self.archetype,
        }];
        let commentary = self.dispatch(now, &cues);
        self.publish(commentary)
    }

    /// Records an accepted move. Invalid moves and moves outside a session
    /// are ignored and yield `None`.
    pub fn on_move(&mut self, now: Duration, input: MoveInput) -> Option<MoveRecord> {
        let record = self.telemetry.record_move(now, &input)?;

        let recent: Vec<Direction> = self
            .telemetry
            .view()
            .recent_directions()
            .iter()
            .copied()
            .collect();
        if detect_cycle(&recent) && self.telemetry.mark_cyclic_detected() {
            tracing::debug!("cyclic movement pattern detected");
        }
        Some(record)
    }

    /// Advances escalation and interference for one logic tick.
    ///
    /// Outside a session this returns the last snapshot without commentary.
    pub fn on_tick(&mut self, now: Duration, board: &BoardState) -> OverseerSnapshot {
        let Some(active) = self.active else {
            self.snapshot.commentary.clear();
            return self.snapshot.clone();
        };

        let elapsed = now.saturating_sub(active.started_at);
        let mut cues = Vec::new();
        if let Some(level) = self.escalation.evaluate(now, elapsed, board.length) {
            cues.push(Cue::Escalated { level });
        }

        let metrics = compute_metrics(&self.telemetry.view(), &self.metrics_tuning);
        let level = self.escalation.level();
        let ctx = TickContext {
            now,
            elapsed,
            level,
            metrics: &metrics,
            board,
        };
        let report = self.interference.tick(ctx, &mut self.rng, &mut cues);
        if report.idle_check {
            self.commentary
                .ambient(level, active.archetype, &mut self.rng, &mut cues);
        }

        let commentary = self.dispatch(now, &cues);
        self.publish(commentary)
    }

    /// Ends the current session and returns the closing summary.
    ///
    /// Escalation and interference are zeroed synchronously. Returns `None`
    /// when no session is active.
    pub fn on_session_end(
        &mut self,
        now: Duration,
        final_score: u32,
        cause: TerminationCause,
    ) -> Option<SessionSummary> {
        let active = self.active.take()?;
        let peak = self.escalation.level();
        let record = self.telemetry.end_session(
            now,
            final_score,
            cause,
            self.escalation.transitions(),
        )?;

        self.interference.end_session();
        self.escalation.reset(now);

        let metrics = compute_metrics(&self.telemetry.view(), &self.metrics_tuning);
        self.archetype = classify(&metrics);
        let post_mortem = post_mortem::analyse(&record, peak, &metrics, self.archetype);

        tracing::info!(
            session = active.id.get(),
            peak = peak.label(),
            archetype = self.archetype.label(),
            "session closed"
        );

        let commentary = self.dispatch(now, &[Cue::SessionEnded { cause }]);
        let snapshot = self.publish(commentary);
        Some(SessionSummary {
            record,
            snapshot,
            post_mortem,
            archive: self.telemetry.archive(),
        })
    }

    /// Replaces the cross-session history with a persisted archive.
    pub fn restore(&mut self, archive: TelemetryArchive) {
        self.telemetry.restore(archive);
    }

    /// Cross-session history ready for persistence.
    #[must_use]
    pub fn archive(&self) -> TelemetryArchive {
        self.telemetry.archive()
    }

    /// Metrics derived from the history recorded so far.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        compute_metrics(&self.telemetry.view(), &self.metrics_tuning)
    }

    /// Most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &OverseerSnapshot {
        &self.snapshot
    }

    /// Session currently in progress, if any.
    #[must_use]
    pub fn session(&self) -> Option<SessionId> {
        self.active.map(|active| active.id)
    }

    /// Escalation level currently in force.
    #[must_use]
    pub fn escalation_level(&self) -> EscalationLevel {
        self.escalation.level()
    }

    fn dispatch(&mut self, now: Duration, cues: &[Cue]) -> Vec<CommentaryEvent> {
        let mut events = Vec::new();
        self.commentary
            .dispatch(now, cues, &mut self.rng, &mut events);
        events
    }

    fn publish(&mut self, commentary: Vec<CommentaryEvent>) -> OverseerSnapshot {
        let interference = if self.active.is_some() {
            self.interference.bundle()
        } else {
            InterferenceBundle::default()
        };
        self.snapshot = OverseerSnapshot {
            session: self.session(),
            escalation_level: self.escalation.level(),
            interference,
            archetype: self.archetype,
            commentary,
        };
        self.snapshot.clone()
    }
}

impl Default for GameMaster<SeededRandom> {
    fn default() -> Self {
        Self::new(OverseerConfig::default(), SeededRandom::new(0))
    }
}
