//! Value types describing escalation and the live perturbations it produces.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Escalation levels governing how aggressively the game-master interferes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EscalationLevel {
    /// The game-master only watches.
    #[default]
    Observation,
    /// Small nudges the player may not notice.
    SubtleInterference,
    /// Interference the player will definitely notice.
    ActiveManipulation,
    /// Everything at once.
    HostileTakeover,
}

impl EscalationLevel {
    /// Numeric value of the level in `0..=3`.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Observation => 0,
            Self::SubtleInterference => 1,
            Self::ActiveManipulation => 2,
            Self::HostileTakeover => 3,
        }
    }

    /// Level directly above this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Observation => Some(Self::SubtleInterference),
            Self::SubtleInterference => Some(Self::ActiveManipulation),
            Self::ActiveManipulation => Some(Self::HostileTakeover),
            Self::HostileTakeover => None,
        }
    }

    /// Name shown in logs and post-mortems.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::SubtleInterference => "subtle interference",
            Self::ActiveManipulation => "active manipulation",
            Self::HostileTakeover => "hostile takeover",
        }
    }
}

/// Game speed multiplier, always within `[MIN, MAX]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct VelocityMultiplier(f32);

impl VelocityMultiplier {
    /// Lowest multiplier the engine will ever report.
    pub const MIN: f32 = 0.5;
    /// Highest multiplier the engine will ever report.
    pub const MAX: f32 = 3.0;
    /// Multiplier that leaves the game speed untouched.
    pub const NEUTRAL: Self = Self(1.0);

    /// Clamps `value` into the permitted range. Non-finite values collapse to neutral.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_finite() {
            Self(value.clamp(Self::MIN, Self::MAX))
        } else {
            Self::NEUTRAL
        }
    }

    /// Retrieves the clamped multiplier.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }
}

impl Default for VelocityMultiplier {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Unique identifier assigned to a decoy objective within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecoyId(u32);

impl DecoyId {
    /// Creates a new decoy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Trigger that caused a decoy to appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecoyReason {
    /// Random spawn during an idle check.
    Idle,
    /// Forced spawn shortly after the real objective was consumed.
    Consumption,
    /// Forced spawn because the player was playing too comfortably.
    Comfort,
    /// Extra decoy added during a hostile takeover.
    Hostile,
    /// An expired decoy coming back.
    Reappearance,
}

/// Fake objective that disappears harmlessly on contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoy {
    /// Identifier allocated by the interference engine.
    pub id: DecoyId,
    /// Cell the decoy occupies.
    pub position: CellCoord,
    /// Trigger that spawned the decoy.
    pub reason: DecoyReason,
    /// Host clock reading after which the decoy vanishes.
    pub expires_at: Duration,
    /// Flicker phase in `[0, 1)` used by renderers to animate the decoy.
    pub flicker_phase: f32,
}

/// Transient cell blocked by the game-master.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Obstacle {
    /// Cell the obstacle occupies.
    pub position: CellCoord,
}

/// Weights consulted by the host's objective-placement routine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementBias {
    boundary_weight: f32,
    body_weight: f32,
}

impl PlacementBias {
    /// Bias that leaves placement uniform.
    pub const NEUTRAL: Self = Self {
        boundary_weight: 0.0,
        body_weight: 0.0,
    };

    /// Creates a bias with both weights clamped into `[0, 1]`.
    #[must_use]
    pub fn new(boundary_weight: f32, body_weight: f32) -> Self {
        Self {
            boundary_weight: clamp_unit(boundary_weight),
            body_weight: clamp_unit(body_weight),
        }
    }

    /// Pull of the objective toward the board edges.
    #[must_use]
    pub const fn boundary_weight(&self) -> f32 {
        self.boundary_weight
    }

    /// Pull of the objective toward the snake's body, forcing reversals.
    #[must_use]
    pub const fn body_weight(&self) -> f32 {
        self.body_weight
    }
}

impl Default for PlacementBias {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Live gameplay perturbations produced for a single tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterferenceBundle {
    /// Multiplier applied to the game's base speed.
    pub velocity_multiplier: VelocityMultiplier,
    /// Decoy objectives currently on the board.
    pub decoys: Vec<Decoy>,
    /// Obstacles currently on the board.
    pub obstacles: Vec<Obstacle>,
    /// Bias applied when the real objective is next placed.
    pub placement_bias: PlacementBias,
}
