#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake Overseer engine.
//!
//! This crate defines the vocabulary spoken between the game-master systems
//! and the orchestrator that owns them. The telemetry recorder appends
//! [`MoveRecord`] values to the current [`SessionRecord`], the analytics system
//! derives a [`MetricsSnapshot`] from those records, the escalation and
//! interference systems respond with an [`InterferenceBundle`], and the
//! orchestrator assembles everything into an immutable [`OverseerSnapshot`]
//! for rendering collaborators. Non-deterministic choices are always drawn
//! through a [`RandomSource`] so every system can be replayed exactly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod commentary;
mod interference;
mod random;

pub use commentary::{CommentaryEvent, Cue, Priority, SpeedCause, TriggerCategory};
pub use interference::{
    Decoy, DecoyId, DecoyReason, EscalationLevel, InterferenceBundle, Obstacle, PlacementBias,
    VelocityMultiplier,
};
pub use random::{RandomSource, SeededRandom};

/// Cardinal movement directions available to the snake, in clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// All directions in canonical clockwise compass order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Position of the direction on the clockwise compass, starting at `Up`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Angle turned when changing heading from `self` to `next`.
    ///
    /// The compass wraps, so a turn from `Left` to `Up` is a quarter turn
    /// rather than three quarters.
    #[must_use]
    pub const fn turn_to(self, next: Direction) -> TurnAngle {
        match (next.index() + 4 - self.index()) % 4 {
            0 => TurnAngle::Straight,
            2 => TurnAngle::Reverse,
            _ => TurnAngle::Quarter,
        }
    }
}

/// Heading change between two consecutive moves, measured on the shorter arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TurnAngle {
    /// No heading change.
    Straight,
    /// A 90 degree turn to either side.
    Quarter,
    /// A full reversal.
    Reverse,
}

impl TurnAngle {
    /// Turn expressed in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Straight => 0,
            Self::Quarter => 90,
            Self::Reverse => 180,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev (king-move) distance between two cell coordinates.
    ///
    /// A distance of one or less means `other` lies in the 8-neighbourhood of
    /// `self` or on `self` itself.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }
}

/// Dimensions of the playing board measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardDimensions {
    width: u32,
    height: u32,
}

impl BoardDimensions {
    /// Creates a new board descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Minimum number of cells separating `cell` from any of the four edges.
    ///
    /// Cells on the outermost ring have a distance of zero. Cells outside the
    /// board also report zero.
    #[must_use]
    pub fn boundary_distance(&self, cell: CellCoord) -> u32 {
        if !self.contains(cell) {
            return 0;
        }

        let right = self.width - 1 - cell.column();
        let bottom = self.height - 1 - cell.row();
        cell.column().min(cell.row()).min(right).min(bottom)
    }
}

/// Board state reported by the host game on every logic tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardState {
    /// Dimensions of the playing board.
    pub dimensions: BoardDimensions,
    /// Cell occupied by the snake's head.
    pub head: CellCoord,
    /// Every cell occupied by the snake, head included.
    pub body: Vec<CellCoord>,
    /// Cell holding the real objective.
    pub objective: CellCoord,
    /// Current snake length.
    pub length: u32,
    /// Number of real objectives consumed so far this session.
    pub objectives_consumed: u32,
    /// Whether the win condition has already been reached.
    pub win_reached: bool,
}

impl BoardState {
    /// Reports whether the snake occupies the provided cell.
    #[must_use]
    pub fn occupies(&self, cell: CellCoord) -> bool {
        self.head == cell || self.body.contains(&cell)
    }
}

/// Raw input forwarded by the input collaborator for each accepted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveInput {
    /// Heading selected by the player.
    pub direction: Direction,
    /// Cell occupied by the head after the move.
    pub head: CellCoord,
    /// Snake length at the time of the move.
    pub length: u32,
    /// Cell holding the real objective.
    pub objective: CellCoord,
    /// Dimensions of the board the move happened on.
    pub board: BoardDimensions,
}

/// Unique identifier assigned to a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Immutable telemetry captured for a single player move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Host clock reading when the move was recorded.
    pub timestamp: Duration,
    /// Heading selected by the move.
    pub direction: Direction,
    /// Head position after the move.
    pub position: CellCoord,
    /// Manhattan distance from the head to the real objective.
    pub distance_to_objective: u32,
    /// Whether the head sits within one cell of an edge.
    pub near_boundary: bool,
    /// Minimum distance from the head to any edge.
    pub boundary_distance: u32,
    /// Heading change relative to the previous move.
    pub turn_angle: TurnAngle,
    /// Time elapsed since the previous move, or since session start for the first move.
    pub reaction_latency: Duration,
    /// Snake length at the time of the move.
    pub length: u32,
}

/// Reasons a session may end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationCause {
    /// The head left the board.
    WallCollision,
    /// The head ran into the snake's own body.
    SelfCollision,
    /// The head ran into an obstacle.
    ObstacleCollision,
    /// The player reset the session manually.
    ManualReset,
    /// The player reached the win condition.
    Victory,
}

impl TerminationCause {
    /// Reports whether the session ended with the snake dying.
    #[must_use]
    pub const fn is_death(self) -> bool {
        matches!(
            self,
            Self::WallCollision | Self::SelfCollision | Self::ObstacleCollision
        )
    }

    /// Human readable description of the cause.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::WallCollision => "Crashed into the wall.",
            Self::SelfCollision => "Bit your own tail.",
            Self::ObstacleCollision => "Ran into an obstacle that was not there a moment ago.",
            Self::ManualReset => "Gave up and reset the board.",
            Self::Victory => "Filled the board. Impressive, for a human.",
        }
    }
}

/// Complete record of a single play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Identifier allocated when the session started.
    pub id: SessionId,
    /// Host clock reading when the session started.
    pub started_at: Duration,
    /// Host clock reading when the session ended, if it has.
    pub ended_at: Option<Duration>,
    /// Moves recorded during the session in arrival order.
    pub moves: Vec<MoveRecord>,
    /// Longest snake length observed during the session.
    pub max_length: u32,
    /// Score reported when the session ended.
    pub final_score: u32,
    /// Reason the session ended, if it has.
    pub termination: Option<TerminationCause>,
    /// Number of escalation transitions that fired during the session.
    pub escalation_events: u32,
    /// Whether a cyclic movement pattern was detected during the session.
    pub cyclic_detected: bool,
}

impl SessionRecord {
    /// Creates an empty session that started at the provided instant.
    #[must_use]
    pub fn begin(id: SessionId, started_at: Duration) -> Self {
        Self {
            id,
            started_at,
            ended_at: None,
            moves: Vec::new(),
            max_length: 0,
            final_score: 0,
            termination: None,
            escalation_events: 0,
            cyclic_detected: false,
        }
    }

    /// Time survived between start and end. Open sessions report zero.
    #[must_use]
    pub fn survival(&self) -> Duration {
        self.ended_at
            .map_or(Duration::ZERO, |ended| ended.saturating_sub(self.started_at))
    }

    /// Reports whether the session ended in a death.
    #[must_use]
    pub fn is_death(&self) -> bool {
        self.termination.is_some_and(TerminationCause::is_death)
    }
}

/// Process-wide counters accumulated across every recorded move.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingCounters {
    /// Time spent within one cell of an edge.
    pub near_boundary_time: Duration,
    /// Total time spent alive between consecutive moves.
    pub alive_time: Duration,
    /// Number of moves recorded per direction, indexed by [`Direction::index`].
    pub direction_counts: [u64; 4],
}

impl RollingCounters {
    /// Total number of moves recorded across all directions.
    #[must_use]
    pub fn total_moves(&self) -> u64 {
        self.direction_counts.iter().sum()
    }
}

/// Cross-session telemetry state that survives process restarts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryArchive {
    /// Most recent completed sessions, oldest first.
    pub sessions: Vec<SessionRecord>,
    /// Rolling counters accumulated across all sessions.
    pub counters: RollingCounters,
    /// Number of sessions in which a cyclic pattern was detected.
    pub cyclic_detections: u32,
    /// Number of sessions started over the archive's lifetime.
    pub sessions_started: u32,
}

/// Mutually exclusive play-style archetypes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Plays safe or has not played enough to tell.
    #[default]
    Cautious,
    /// Spends most of the time along the edges.
    WallHugger,
    /// Circles the board in a fixed rotation.
    SpiralAddict,
    /// Scores are climbing steadily.
    Improving,
    /// Grows fast and dies often.
    Greedy,
    /// Reacts slowly and strays close to danger.
    Erratic,
    /// Repeats the same move sequences.
    Predictable,
}

impl Archetype {
    /// Stable label used in commentary and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::WallHugger => "wall-hugger",
            Self::SpiralAddict => "spiral-addict",
            Self::Improving => "improving",
            Self::Greedy => "greedy",
            Self::Erratic => "erratic",
            Self::Predictable => "predictable",
        }
    }
}

/// Play-style signals derived from the telemetry history.
///
/// Ratios are dimensionless. Every field is a pure function of the move
/// history, so recomputing the snapshot never changes any state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Share of alive time spent within one cell of an edge, in `[0, 1]`.
    pub boundary_hugging_frequency: f32,
    /// Share of all moves per direction, indexed by [`Direction::index`].
    pub directional_bias: [f32; 4],
    /// Whether the most recent eight directions form a clockwise or counterclockwise cycle.
    pub cyclic_pattern: bool,
    /// Whether cyclic patterns were detected in more than 30% of sessions.
    pub spiral_habit: bool,
    /// Mean of maximum length per survival second across recent sessions.
    pub greed_ratio: f32,
    /// Share of 3-move direction windows that recur later, in `[0, 1]`.
    pub pattern_repetition: f32,
    /// Normalised mean distance to the edges over recent moves, in `[0, 1]`.
    pub comfort_zone: f32,
    /// Share of recent moves made close to an edge, in `[0, 1]`.
    pub risk_tolerance: f32,
    /// Relative change of recent scores against the preceding ones, in `[-1, 1]`.
    pub score_trend: f32,
    /// Number of completed sessions in the rolling window.
    pub completed_sessions: u32,
    /// Mean final score across the rolling window.
    pub average_score: f32,
    /// Share of completed sessions that ended in a death, in `[0, 1]`.
    pub death_rate: f32,
    /// Mean reaction latency across recent moves in milliseconds.
    pub average_reaction_latency_ms: f32,
}

impl MetricsSnapshot {
    /// Largest per-direction share.
    #[must_use]
    pub fn max_directional_bias(&self) -> f32 {
        self.directional_bias.iter().copied().fold(0.0, f32::max)
    }
}

/// Immutable view of the game-master state handed to rendering collaborators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverseerSnapshot {
    /// Session the snapshot belongs to, if one is active.
    pub session: Option<SessionId>,
    /// Escalation level active for the session.
    pub escalation_level: EscalationLevel,
    /// Live gameplay perturbations.
    pub interference: InterferenceBundle,
    /// Archetype the player was classified as when the session started.
    pub archetype: Archetype,
    /// Commentary emitted during the tick that produced the snapshot.
    pub commentary: Vec<CommentaryEvent>,
}

/// Short analysis presented after a session ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostMortem {
    /// What ended the session.
    pub cause_description: String,
    /// How far the game-master escalated, if it escalated at all.
    pub escalation_note: Option<String>,
    /// How the score compares to the player's history.
    pub score_note: String,
    /// Advice or a parting remark, when one applies.
    pub recommendation: Option<String>,
}
