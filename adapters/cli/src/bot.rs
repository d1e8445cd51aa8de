//! Greedy autopilot steering the simulated snake.

use snake_overseer_core::{Direction, RandomSource, SeededRandom};

use crate::arena::Arena;

/// Picks the safe direction closest to the objective, wandering now and then.
#[derive(Debug)]
pub(crate) struct Bot {
    rng: SeededRandom,
    wander_chance: f32,
}

impl Bot {
    pub(crate) fn new(seed: u64, wander_chance: f32) -> Self {
        Self {
            rng: SeededRandom::new(seed),
            wander_chance,
        }
    }

    /// Chooses the next direction. Falls back to the current heading when
    /// every option is fatal.
    pub(crate) fn choose(&mut self, arena: &Arena) -> Direction {
        let head = arena.head();
        let safe: Vec<(Direction, u32)> = Direction::ALL
            .into_iter()
            .filter(|direction| *direction != arena.heading().opposite())
            .filter_map(|direction| {
                let next = arena.neighbour(head, direction)?;
                (!arena.is_blocked(next))
                    .then(|| (direction, next.manhattan_distance(arena.objective())))
            })
            .collect();

        if safe.is_empty() {
            return arena.heading();
        }
        if self.rng.chance(self.wander_chance) {
            let pick = self.rng.below(safe.len() as u32) as usize;
            return safe[pick].0;
        }
        safe.iter()
            .min_by_key(|(_, distance)| *distance)
            .map_or(arena.heading(), |(direction, _)| *direction)
    }
}
