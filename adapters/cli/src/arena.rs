//! Simulated snake board driven by the demo harness.

use std::collections::VecDeque;

use snake_overseer_core::{
    BoardDimensions, BoardState, CellCoord, Direction, MoveInput, Obstacle, PlacementBias,
    RandomSource, TerminationCause,
};
use snake_overseer_system_interference::sample_free_cell;

const STARTING_LENGTH: u32 = 3;
const PLACEMENT_CANDIDATES: usize = 8;
const PLACEMENT_ATTEMPTS: u32 = 50;

/// Result of advancing the snake by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// The snake moved; `ate` reports whether it consumed the objective.
    Moved { ate: bool },
    /// The snake died.
    Died(TerminationCause),
    /// No free cell is left for the objective.
    Won,
}

/// Minimal snake game used to exercise the game-master.
#[derive(Debug)]
pub(crate) struct Arena {
    dimensions: BoardDimensions,
    body: VecDeque<CellCoord>,
    heading: Direction,
    objective: CellCoord,
    consumed: u32,
    obstacles: Vec<CellCoord>,
}

impl Arena {
    /// Creates a board with a short snake in the middle heading right.
    pub(crate) fn new<R>(dimensions: BoardDimensions, rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        let row = dimensions.height() / 2;
        let column = (dimensions.width() / 2).max(STARTING_LENGTH);
        let body = (0..STARTING_LENGTH)
            .map(|offset| CellCoord::new(column - offset, row))
            .collect();
        let mut arena = Self {
            dimensions,
            body,
            heading: Direction::Right,
            objective: CellCoord::new(0, 0),
            consumed: 0,
            obstacles: Vec::new(),
        };
        if let Some(objective) = arena.place_objective(PlacementBias::NEUTRAL, rng) {
            arena.objective = objective;
        }
        arena
    }

    pub(crate) fn dimensions(&self) -> BoardDimensions {
        self.dimensions
    }

    pub(crate) fn head(&self) -> CellCoord {
        self.body.front().copied().unwrap_or(CellCoord::new(0, 0))
    }

    pub(crate) fn heading(&self) -> Direction {
        self.heading
    }

    pub(crate) fn objective(&self) -> CellCoord {
        self.objective
    }

    pub(crate) fn score(&self) -> u32 {
        self.consumed
    }

    fn length(&self) -> u32 {
        self.body.len() as u32
    }

    /// Cell one step from `cell` in `direction`, if it is on the board.
    pub(crate) fn neighbour(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (column, row) = (cell.column(), cell.row());
        let next = match direction {
            Direction::Up => CellCoord::new(column, row.checked_sub(1)?),
            Direction::Right => CellCoord::new(column + 1, row),
            Direction::Down => CellCoord::new(column, row + 1),
            Direction::Left => CellCoord::new(column.checked_sub(1)?, row),
        };
        self.dimensions.contains(next).then_some(next)
    }

    /// Whether moving into `cell` would kill the snake.
    pub(crate) fn is_blocked(&self, cell: CellCoord) -> bool {
        let tail = self.body.back().copied();
        self.obstacles.contains(&cell) || (self.body.contains(&cell) && Some(cell) != tail)
    }

    /// Replaces the obstacle set with the game-master's current one.
    pub(crate) fn set_obstacles(&mut self, obstacles: &[Obstacle]) {
        self.obstacles = obstacles.iter().map(|obstacle| obstacle.position).collect();
    }

    /// Moves the snake one cell in `direction`, placing a new objective with
    /// `bias` when the current one is eaten.
    pub(crate) fn advance<R>(
        &mut self,
        direction: Direction,
        bias: PlacementBias,
        rng: &mut R,
    ) -> Step
    where
        R: RandomSource + ?Sized,
    {
        let heading = if self.length() > 1 && direction == self.heading.opposite() {
            self.heading
        } else {
            direction
        };
        let Some(next) = self.neighbour(self.head(), heading) else {
            return Step::Died(TerminationCause::WallCollision);
        };
        if self.obstacles.contains(&next) {
            return Step::Died(TerminationCause::ObstacleCollision);
        }
        if self.is_blocked(next) {
            return Step::Died(TerminationCause::SelfCollision);
        }

        self.heading = heading;
        self.body.push_front(next);
        let ate = next == self.objective;
        if !ate {
            let _ = self.body.pop_back();
            return Step::Moved { ate };
        }

        self.consumed += 1;
        match self.place_objective(bias, rng) {
            Some(objective) => {
                self.objective = objective;
                Step::Moved { ate }
            }
            None => Step::Won,
        }
    }

    /// Board description handed to the game-master.
    pub(crate) fn board_state(&self, win_reached: bool) -> BoardState {
        BoardState {
            dimensions: self.dimensions,
            head: self.head(),
            body: self.body.iter().copied().collect(),
            objective: self.objective,
            length: self.length(),
            objectives_consumed: self.consumed,
            win_reached,
        }
    }

    /// Move description handed to the game-master after a step.
    pub(crate) fn move_input(&self) -> MoveInput {
        MoveInput {
            direction: self.heading,
            head: self.head(),
            length: self.length(),
            objective: self.objective,
            board: self.dimensions,
        }
    }

    /// Draws several free cells and keeps the one the bias favours most.
    fn place_objective<R>(&self, bias: PlacementBias, rng: &mut R) -> Option<CellCoord>
    where
        R: RandomSource + ?Sized,
    {
        let blocked =
            |cell: CellCoord| self.body.contains(&cell) || self.obstacles.contains(&cell);
        let candidates: Vec<CellCoord> = (0..PLACEMENT_CANDIDATES)
            .filter_map(|_| sample_free_cell(self.dimensions, PLACEMENT_ATTEMPTS, rng, blocked))
            .collect();

        let deepest = (self.dimensions.width().min(self.dimensions.height()) / 2).max(1) as f32;
        let span = (self.dimensions.width() + self.dimensions.height()).max(1) as f32;
        let weight = |cell: CellCoord| {
            let edge = 1.0 - self.dimensions.boundary_distance(cell) as f32 / deepest;
            let nearest_body = self
                .body
                .iter()
                .map(|part| part.manhattan_distance(cell))
                .min()
                .unwrap_or(0) as f32;
            bias.boundary_weight() * edge + bias.body_weight() * (1.0 - nearest_body / span)
        };

        candidates
            .into_iter()
            .fold(None, |best: Option<(CellCoord, f32)>, cell| {
                let score = weight(cell);
                match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((cell, score)),
                }
            })
            .map(|(cell, _)| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Step};
    use snake_overseer_core::{
        BoardDimensions, CellCoord, Direction, Obstacle, PlacementBias, SeededRandom,
        TerminationCause,
    };

    #[test]
    fn snake_starts_centred_and_heading_right() {
        let arena = Arena::new(BoardDimensions::new(20, 20), &mut SeededRandom::new(1));
        assert_eq!(arena.head(), CellCoord::new(10, 10));
        assert_eq!(arena.heading(), Direction::Right);
        assert!(!arena.board_state(false).body.contains(&arena.objective()));
    }

    #[test]
    fn reversal_keeps_the_current_heading() {
        let mut rng = SeededRandom::new(2);
        let mut arena = Arena::new(BoardDimensions::new(20, 20), &mut rng);
        let step = arena.advance(Direction::Left, PlacementBias::NEUTRAL, &mut rng);
        assert!(matches!(step, Step::Moved { .. }));
        assert_eq!(arena.head(), CellCoord::new(11, 10));
    }

    #[test]
    fn walls_and_obstacles_kill() {
        let mut rng = SeededRandom::new(3);
        let mut arena = Arena::new(BoardDimensions::new(20, 20), &mut rng);
        arena.set_obstacles(&[Obstacle {
            position: CellCoord::new(10, 9),
        }]);
        assert_eq!(
            arena.advance(Direction::Up, PlacementBias::NEUTRAL, &mut rng),
            Step::Died(TerminationCause::ObstacleCollision)
        );

        let mut edge = Arena::new(BoardDimensions::new(4, 1), &mut rng);
        assert_eq!(
            edge.advance(Direction::Right, PlacementBias::NEUTRAL, &mut rng),
            Step::Died(TerminationCause::WallCollision)
        );
    }

    #[test]
    fn edge_bias_pulls_objectives_outward() {
        let dimensions = BoardDimensions::new(30, 30);
        let mut rng = SeededRandom::new(4);
        let arena = Arena::new(dimensions, &mut rng);
        let edge_bias = PlacementBias::new(1.0, 0.0);

        let mut biased = 0;
        let mut neutral = 0;
        for _ in 0..40 {
            let pulled = arena.place_objective(edge_bias, &mut rng).expect("free cell");
            let plain = arena
                .place_objective(PlacementBias::NEUTRAL, &mut rng)
                .expect("free cell");
            biased += dimensions.boundary_distance(pulled);
            neutral += dimensions.boundary_distance(plain);
        }
        assert!(biased < neutral);
    }
}
