#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Telemetry recorder that turns accepted player moves into structured history.
//!
//! The recorder owns the current [`SessionRecord`], the bounded rolling window
//! of completed sessions and the process-wide counters that outlive any single
//! session. Everything it stores is append-only; derived signals are computed
//! elsewhere from the borrowed [`TelemetryView`].

use std::{collections::VecDeque, time::Duration};

use serde::Deserialize;
use snake_overseer_core::{
    Direction, MoveInput, MoveRecord, RollingCounters, SessionId, SessionRecord,
    TelemetryArchive, TerminationCause, TurnAngle,
};

/// Tuning knobs for the telemetry recorder.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryTuning {
    /// Completed sessions retained for cross-session metrics. The oldest is
    /// evicted first.
    pub window_capacity: usize,
    /// Capacity of the recent-direction ring buffer feeding the cycle detector.
    pub recent_direction_capacity: usize,
    /// Boundary distance at or below which a move counts as hugging the edge.
    pub near_boundary_distance: u32,
}

impl Default for TelemetryTuning {
    fn default() -> Self {
        Self {
            window_capacity: 20,
            recent_direction_capacity: 20,
            near_boundary_distance: 1,
        }
    }
}

/// Records per-move telemetry for the current session and the rolling window.
#[derive(Debug)]
pub struct Telemetry {
    tuning: TelemetryTuning,
    current: Option<SessionRecord>,
    window: VecDeque<SessionRecord>,
    counters: RollingCounters,
    recent_directions: VecDeque<Direction>,
    cyclic_detections: u32,
    sessions_started: u32,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(TelemetryTuning::default())
    }
}

impl Telemetry {
    /// Creates an empty recorder using the provided tuning.
    #[must_use]
    pub fn new(tuning: TelemetryTuning) -> Self {
        Self {
            window: VecDeque::with_capacity(tuning.window_capacity),
            recent_directions: VecDeque::with_capacity(tuning.recent_direction_capacity),
            tuning,
            current: None,
            counters: RollingCounters::default(),
            cyclic_detections: 0,
            sessions_started: 0,
        }
    }

    /// Opens a new session starting at `now` and returns its identifier.
    ///
    /// An unfinished session left open is discarded without entering the
    /// rolling window.
    pub fn start_session(&mut self, now: Duration) -> SessionId {
        if let Some(abandoned) = self.current.take() {
            tracing::debug!(
                session = abandoned.id.get(),
                "discarding unfinished session"
            );
        }

        self.sessions_started = self.sessions_started.saturating_add(1);
        let id = SessionId::new(u64::from(self.sessions_started));
        self.current = Some(SessionRecord::begin(id, now));
        id
    }

    /// Appends a move to the current session.
    ///
    /// Returns `None` without touching any state when no session is active,
    /// when the head lies outside the board, or when the move reverses into
    /// the snake's own body.
    pub fn record_move(&mut self, now: Duration, input: &MoveInput) -> Option<MoveRecord> {
        let session = self.current.as_mut()?;

        if !input.board.contains(input.head) {
            return None;
        }

        let previous = session.moves.last().copied();
        let turn_angle = previous.map_or(TurnAngle::Straight, |last| {
            last.direction.turn_to(input.direction)
        });
        if turn_angle == TurnAngle::Reverse && input.length > 1 {
            return None;
        }

        let since = previous.map_or(session.started_at, |last| last.timestamp);
        let reaction_latency = now.saturating_sub(since);
        let boundary_distance = input.board.boundary_distance(input.head);
        let near_boundary = boundary_distance <= self.tuning.near_boundary_distance;

        let record = MoveRecord {
            timestamp: now,
            direction: input.direction,
            position: input.head,
            distance_to_objective: input.head.manhattan_distance(input.objective),
            near_boundary,
            boundary_distance,
            turn_angle,
            reaction_latency,
            length: input.length,
        };

        // The first move of a session contributes no elapsed time.
        if previous.is_some() {
            self.counters.alive_time = self.counters.alive_time.saturating_add(reaction_latency);
            if near_boundary {
                self.counters.near_boundary_time = self
                    .counters
                    .near_boundary_time
                    .saturating_add(reaction_latency);
            }
        }

        let count = &mut self.counters.direction_counts[input.direction.index()];
        *count = count.saturating_add(1);

        if self.tuning.recent_direction_capacity > 0 {
            while self.recent_directions.len() >= self.tuning.recent_direction_capacity {
                let _ = self.recent_directions.pop_front();
            }
            self.recent_directions.push_back(input.direction);
        }

        session.max_length = session.max_length.max(input.length);
        session.moves.push(record);
        Some(record)
    }

    /// Notes that a cyclic pattern was observed in the current session.
    ///
    /// The persistent detection counter advances at most once per session.
    /// Returns `true` when this call was the session's first detection.
    pub fn mark_cyclic_detected(&mut self) -> bool {
        let Some(session) = self.current.as_mut() else {
            return false;
        };
        if session.cyclic_detected {
            return false;
        }

        session.cyclic_detected = true;
        self.cyclic_detections = self.cyclic_detections.saturating_add(1);
        true
    }

    /// Closes the current session and moves it into the rolling window.
    ///
    /// Returns the completed record, or `None` when no session was active.
    pub fn end_session(
        &mut self,
        now: Duration,
        final_score: u32,
        cause: TerminationCause,
        escalation_events: u32,
    ) -> Option<SessionRecord> {
        let mut session = self.current.take()?;
        session.ended_at = Some(now.max(session.started_at));
        session.final_score = final_score;
        session.termination = Some(cause);
        session.escalation_events = escalation_events;

        tracing::info!(
            session = session.id.get(),
            score = final_score,
            moves = session.moves.len(),
            ?cause,
            "session completed"
        );

        self.window.push_back(session.clone());
        self.evict_overflow();
        Some(session)
    }

    /// Reports whether a session is currently being recorded.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// Session currently being recorded, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<&SessionRecord> {
        self.current.as_ref()
    }

    /// Borrowed view consumed by the metrics engine.
    #[must_use]
    pub fn view(&self) -> TelemetryView<'_> {
        TelemetryView {
            completed: &self.window,
            current: self.current.as_ref(),
            counters: &self.counters,
            recent_directions: &self.recent_directions,
            cyclic_detections: self.cyclic_detections,
            sessions_started: self.sessions_started,
        }
    }

    /// Captures the cross-session state for persistence.
    #[must_use]
    pub fn archive(&self) -> TelemetryArchive {
        TelemetryArchive {
            sessions: self.window.iter().cloned().collect(),
            counters: self.counters.clone(),
            cyclic_detections: self.cyclic_detections,
            sessions_started: self.sessions_started,
        }
    }

    /// Replaces the cross-session state with a previously captured archive.
    ///
    /// The current session, if any, is left untouched. Archives holding more
    /// sessions than the window retains keep only the most recent ones.
    pub fn restore(&mut self, archive: TelemetryArchive) {
        let started = archive.sessions_started.max(archive.sessions.len() as u32);
        self.window = archive
            .sessions
            .into_iter()
            .filter(|session| session.ended_at.is_some())
            .collect();
        self.evict_overflow();
        self.counters = archive.counters;
        self.cyclic_detections = archive.cyclic_detections.min(started);
        self.sessions_started = self.sessions_started.max(started);

        tracing::info!(
            sessions = self.window.len(),
            started = self.sessions_started,
            "telemetry archive restored"
        );
    }

    fn evict_overflow(&mut self) {
        while self.window.len() > self.tuning.window_capacity {
            let _ = self.window.pop_front();
        }
    }
}

/// Read-only view over everything the recorder has accumulated.
#[derive(Clone, Copy, Debug)]
pub struct TelemetryView<'a> {
    completed: &'a VecDeque<SessionRecord>,
    current: Option<&'a SessionRecord>,
    counters: &'a RollingCounters,
    recent_directions: &'a VecDeque<Direction>,
    cyclic_detections: u32,
    sessions_started: u32,
}

impl<'a> TelemetryView<'a> {
    /// Completed sessions in the rolling window, oldest first.
    #[must_use]
    pub fn completed(&self) -> &'a VecDeque<SessionRecord> {
        self.completed
    }

    /// Session currently being recorded, if any.
    #[must_use]
    pub fn current(&self) -> Option<&'a SessionRecord> {
        self.current
    }

    /// Rolling counters accumulated across all sessions.
    #[must_use]
    pub fn counters(&self) -> &'a RollingCounters {
        self.counters
    }

    /// Most recent directions across sessions, oldest first.
    #[must_use]
    pub fn recent_directions(&self) -> &'a VecDeque<Direction> {
        self.recent_directions
    }

    /// Number of sessions in which a cyclic pattern was detected.
    #[must_use]
    pub const fn cyclic_detections(&self) -> u32 {
        self.cyclic_detections
    }

    /// Number of sessions started over the recorder's lifetime.
    #[must_use]
    pub const fn sessions_started(&self) -> u32 {
        self.sessions_started
    }

    /// Iterator over every move in the window followed by the current session's moves.
    pub fn moves(&self) -> impl DoubleEndedIterator<Item = &'a MoveRecord> + 'a {
        let completed = self.completed;
        let current = self.current;
        completed
            .iter()
            .flat_map(|session| session.moves.iter())
            .chain(current.into_iter().flat_map(|session| session.moves.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Telemetry, TelemetryTuning};
    use snake_overseer_core::{BoardDimensions, CellCoord, Direction, MoveInput, TerminationCause};
    use std::time::Duration;

    fn input(direction: Direction, column: u32, row: u32) -> MoveInput {
        MoveInput {
            direction,
            head: CellCoord::new(column, row),
            length: 3,
            objective: CellCoord::new(10, 10),
            board: BoardDimensions::new(20, 20),
        }
    }

    #[test]
    fn window_evicts_oldest_sessions() {
        let mut telemetry = Telemetry::new(TelemetryTuning {
            window_capacity: 2,
            ..TelemetryTuning::default()
        });

        for index in 0..3u64 {
            let start = Duration::from_secs(index * 100);
            let _ = telemetry.start_session(start);
            let _ = telemetry.end_session(
                start + Duration::from_secs(5),
                index as u32,
                TerminationCause::WallCollision,
                0,
            );
        }

        let scores: Vec<u32> = telemetry
            .view()
            .completed()
            .iter()
            .map(|session| session.final_score)
            .collect();
        assert_eq!(scores, vec![1, 2]);
        assert_eq!(telemetry.view().sessions_started(), 3);
    }

    #[test]
    fn ring_buffer_is_capped() {
        let mut telemetry = Telemetry::default();
        let _ = telemetry.start_session(Duration::ZERO);
        let directions = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];
        for step in 0..30u64 {
            let direction = directions[(step % 4) as usize];
            let at = Duration::from_millis(step * 100);
            let _ = telemetry.record_move(at, &input(direction, 5, 5));
        }
        assert_eq!(telemetry.view().recent_directions().len(), 20);
        assert_eq!(telemetry.view().counters().total_moves(), 30);
    }

    #[test]
    fn recent_directions_outlive_the_session() {
        let mut telemetry = Telemetry::default();
        let _ = telemetry.start_session(Duration::ZERO);
        let cycle = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];
        for step in 0..8u64 {
            let at = Duration::from_millis(step * 100);
            let _ = telemetry.record_move(at, &input(cycle[(step % 4) as usize], 5, 5));
        }
        let _ = telemetry.end_session(Duration::from_secs(1), 0, TerminationCause::ManualReset, 0);
        assert_eq!(telemetry.view().recent_directions().len(), 8);

        let _ = telemetry.start_session(Duration::from_secs(2));
        let carried: Vec<Direction> =
            telemetry.view().recent_directions().iter().copied().collect();
        assert_eq!(carried, [cycle, cycle].concat());
    }

    #[test]
    fn cyclic_detection_counts_once_per_session() {
        let mut telemetry = Telemetry::default();
        assert!(!telemetry.mark_cyclic_detected());
        let _ = telemetry.start_session(Duration::ZERO);
        assert!(telemetry.mark_cyclic_detected());
        assert!(!telemetry.mark_cyclic_detected());
        assert_eq!(telemetry.view().cyclic_detections(), 1);
    }
}
