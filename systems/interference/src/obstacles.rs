//! Obstacle cadence and placement.

use serde::Deserialize;
use snake_overseer_core::{BoardState, CellCoord, EscalationLevel, Obstacle, RandomSource};

use crate::placement::sample_free_cell;

/// Cadence and placement limits of the obstacle spawner.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// Consumptions between obstacles during active manipulation.
    pub active_every: u32,
    /// Fewest consumptions between obstacles during a hostile takeover.
    pub hostile_every_min: u32,
    /// Most consumptions between obstacles during a hostile takeover.
    pub hostile_every_max: u32,
    /// Random candidates tried before the spawn is skipped.
    pub attempts: u32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            active_every: 5,
            hostile_every_min: 2,
            hostile_every_max: 3,
            attempts: 50,
        }
    }
}

/// Picks a cell for a new obstacle by rejection sampling.
///
/// Candidates occupied by the snake, the objective or an existing obstacle are
/// rejected, as is every cell in the head's 8-neighbourhood. Returns `None`
/// once `attempts` candidates have been rejected.
pub fn place_obstacle<R>(
    board: &BoardState,
    existing: &[Obstacle],
    attempts: u32,
    rng: &mut R,
) -> Option<CellCoord>
where
    R: RandomSource + ?Sized,
{
    sample_free_cell(board.dimensions, attempts, rng, |cell| {
        board.occupies(cell)
            || cell == board.objective
            || existing.iter().any(|obstacle| obstacle.position == cell)
            || cell.chebyshev_distance(board.head) <= 1
    })
}

/// Per-session obstacle spawner.
#[derive(Debug, Default)]
pub(crate) struct ObstacleField {
    placed: Vec<Obstacle>,
    since_last: u32,
    hostile_target: u32,
}

impl ObstacleField {
    pub(crate) fn reset<R>(&mut self, tuning: &ObstacleTuning, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        self.placed.clear();
        self.since_last = 0;
        self.reroll(tuning, rng);
    }

    pub(crate) fn clear(&mut self) {
        self.placed.clear();
        self.since_last = 0;
    }

    pub(crate) fn placed(&self) -> &[Obstacle] {
        &self.placed
    }

    /// Registers `consumed` new consumptions and spawns an obstacle when the
    /// cadence for `level` is met.
    pub(crate) fn on_consumed<R>(
        &mut self,
        consumed: u32,
        level: EscalationLevel,
        board: &BoardState,
        tuning: &ObstacleTuning,
        rng: &mut R,
    ) -> Option<Obstacle>
    where
        R: RandomSource + ?Sized,
    {
        let target = match level {
            EscalationLevel::Observation | EscalationLevel::SubtleInterference => return None,
            EscalationLevel::ActiveManipulation => tuning.active_every,
            EscalationLevel::HostileTakeover => self.hostile_target,
        };
        self.since_last = self.since_last.saturating_add(consumed);
        if self.since_last < target.max(1) || board.win_reached {
            return None;
        }

        let Some(position) = place_obstacle(board, &self.placed, tuning.attempts, rng) else {
            tracing::debug!(attempts = tuning.attempts, "no free cell for obstacle");
            return None;
        };
        let obstacle = Obstacle { position };
        self.placed.push(obstacle);
        self.since_last = 0;
        self.reroll(tuning, rng);
        tracing::debug!(
            column = position.column(),
            row = position.row(),
            total = self.placed.len(),
            "obstacle spawned"
        );
        Some(obstacle)
    }

    fn reroll<R>(&mut self, tuning: &ObstacleTuning, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        let min = tuning.hostile_every_min;
        let span = tuning.hostile_every_max.saturating_sub(min);
        self.hostile_target = min + rng.below(span + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::{place_obstacle, ObstacleField, ObstacleTuning};
    use snake_overseer_core::{
        BoardDimensions, BoardState, CellCoord, EscalationLevel, RandomSource,
    };

    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f32 {
            self.0
        }
    }

    fn board() -> BoardState {
        BoardState {
            dimensions: BoardDimensions::new(12, 12),
            head: CellCoord::new(2, 2),
            body: vec![CellCoord::new(2, 2), CellCoord::new(1, 2)],
            objective: CellCoord::new(9, 9),
            length: 2,
            objectives_consumed: 0,
            win_reached: false,
        }
    }

    #[test]
    fn neighbourhood_of_head_is_rejected() {
        // 0.25 * 12 lands on (3, 3), diagonal to the head.
        assert_eq!(place_obstacle(&board(), &[], 50, &mut Fixed(0.25)), None);
        assert_eq!(
            place_obstacle(&board(), &[], 50, &mut Fixed(0.5)),
            Some(CellCoord::new(6, 6))
        );
    }

    #[test]
    fn cadence_follows_the_level() {
        let tuning = ObstacleTuning::default();
        let mut field = ObstacleField::default();
        let mut rng = Fixed(0.5);
        field.reset(&tuning, &mut rng);

        for _ in 0..4 {
            assert!(field
                .on_consumed(1, EscalationLevel::ActiveManipulation, &board(), &tuning, &mut rng)
                .is_none());
        }
        assert!(field
            .on_consumed(1, EscalationLevel::ActiveManipulation, &board(), &tuning, &mut rng)
            .is_some());
        assert!(field
            .on_consumed(9, EscalationLevel::SubtleInterference, &board(), &tuning, &mut rng)
            .is_none());
    }

    #[test]
    fn win_condition_suppresses_obstacles() {
        let tuning = ObstacleTuning::default();
        let mut field = ObstacleField::default();
        let mut rng = Fixed(0.5);
        field.reset(&tuning, &mut rng);
        let won = BoardState {
            win_reached: true,
            ..board()
        };
        assert!(field
            .on_consumed(10, EscalationLevel::HostileTakeover, &won, &tuning, &mut rng)
            .is_none());
        assert!(field.placed().is_empty());
    }
}
