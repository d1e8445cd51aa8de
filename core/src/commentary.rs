//! Commentary triggers and the events the dispatcher emits for them.

use crate::{Archetype, DecoyReason, EscalationLevel, TerminationCause};

/// Priority of a commentary event. High priority bypasses the cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    /// Background chatter.
    Low,
    /// Reactions to noticeable interference.
    Normal,
    /// Reactions that must always reach the player.
    High,
}

/// Category of a commentary trigger.
///
/// Declaration order is the registration order used to break ties between
/// triggers of equal priority within a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerCategory {
    /// A session started.
    SessionStart,
    /// A session ended.
    SessionEnd,
    /// The escalation level changed.
    EscalationChange,
    /// The player touched a decoy.
    DecoyConsumed,
    /// The velocity multiplier changed noticeably.
    SpeedChange,
    /// An obstacle appeared.
    ObstacleSpawn,
    /// A decoy appeared.
    DecoySpawn,
    /// Idle taunting.
    AmbientTaunt,
}

/// Reason behind a noticeable speed change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeedCause {
    /// The player stayed comfortable for too long.
    ComfortCreep,
    /// The post-consumption surge kicked in.
    Surge,
    /// A hostile fluctuation window opened.
    Fluctuation,
}

/// Internal trigger raised by a system for the commentary dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A session started.
    SessionStarted {
        /// Completed sessions known before this one.
        completed_sessions: u32,
        /// Archetype the player was classified as.
        archetype: Archetype,
    },
    /// A session ended.
    SessionEnded {
        /// Reason the session ended.
        cause: TerminationCause,
    },
    /// The escalation level advanced.
    Escalated {
        /// Level that became active.
        level: EscalationLevel,
    },
    /// The player touched a decoy.
    DecoyConsumed,
    /// The velocity multiplier changed noticeably.
    SpeedChanged {
        /// What changed the speed.
        cause: SpeedCause,
    },
    /// An obstacle appeared.
    ObstacleSpawned,
    /// A decoy appeared.
    DecoySpawned {
        /// Trigger that spawned the decoy.
        reason: DecoyReason,
    },
    /// Idle taunt aimed at the player's archetype.
    Ambient {
        /// Archetype the taunt is aimed at.
        archetype: Archetype,
    },
}

impl Cue {
    /// Category the cue belongs to.
    #[must_use]
    pub const fn category(&self) -> TriggerCategory {
        match self {
            Self::SessionStarted { .. } => TriggerCategory::SessionStart,
            Self::SessionEnded { .. } => TriggerCategory::SessionEnd,
            Self::Escalated { .. } => TriggerCategory::EscalationChange,
            Self::DecoyConsumed => TriggerCategory::DecoyConsumed,
            Self::SpeedChanged { .. } => TriggerCategory::SpeedChange,
            Self::ObstacleSpawned => TriggerCategory::ObstacleSpawn,
            Self::DecoySpawned { .. } => TriggerCategory::DecoySpawn,
            Self::Ambient { .. } => TriggerCategory::AmbientTaunt,
        }
    }

    /// Priority the dispatcher assigns to the cue.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        match self {
            Self::SessionStarted { .. }
            | Self::SessionEnded { .. }
            | Self::Escalated { .. }
            | Self::DecoyConsumed => Priority::High,
            Self::SpeedChanged { .. } | Self::ObstacleSpawned => Priority::Normal,
            Self::DecoySpawned { .. } | Self::Ambient { .. } => Priority::Low,
        }
    }
}

/// Short text event displayed by the UI layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentaryEvent {
    /// Message shown to the player.
    pub message: String,
    /// Category of the trigger that produced the message.
    pub source: TriggerCategory,
    /// Priority the message was dispatched with.
    pub priority: Priority,
}
