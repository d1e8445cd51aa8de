//! Objective placement bias and rejection sampling of free cells.

use serde::Deserialize;
use snake_overseer_core::{BoardDimensions, CellCoord, MetricsSnapshot, PlacementBias, RandomSource};

/// Thresholds and weights shaping where the real objective is placed.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlacementTuning {
    /// Comfort-zone size above which the objective is pushed toward the edges.
    pub comfort_threshold: f32,
    /// Boundary weight applied when the player is too comfortable.
    pub comfort_boundary_weight: f32,
    /// Single-direction share above which the objective is placed to force reversals.
    pub direction_threshold: f32,
    /// Body weight applied when one direction dominates.
    pub body_weight: f32,
    /// Greed ratio above which edge placement is strengthened.
    pub greed_threshold: f32,
    /// Boundary-hugging frequency below which the greed rule applies.
    pub greed_hug_ceiling: f32,
    /// Boundary weight applied to greedy centre-dwellers.
    pub greed_boundary_weight: f32,
    /// Number of random candidates tried before giving up on a placement.
    pub attempts: u32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            comfort_threshold: 0.7,
            comfort_boundary_weight: 0.6,
            direction_threshold: 0.4,
            body_weight: 0.5,
            greed_threshold: 0.3,
            greed_hug_ceiling: 0.2,
            greed_boundary_weight: 0.8,
            attempts: 50,
        }
    }
}

/// Derives the placement bias for the real objective from the player's metrics.
#[must_use]
pub fn placement_bias(metrics: &MetricsSnapshot, tuning: &PlacementTuning) -> PlacementBias {
    let mut boundary = 0.0_f32;
    let mut body = 0.0_f32;

    if metrics.comfort_zone > tuning.comfort_threshold {
        boundary = tuning.comfort_boundary_weight;
    }
    if metrics.max_directional_bias() > tuning.direction_threshold {
        body = tuning.body_weight;
    }
    if metrics.greed_ratio > tuning.greed_threshold
        && metrics.boundary_hugging_frequency < tuning.greed_hug_ceiling
    {
        boundary = boundary.max(tuning.greed_boundary_weight);
    }

    PlacementBias::new(boundary, body)
}

/// Draws up to `attempts` uniformly random cells and returns the first one
/// `rejected` accepts. Returns `None` when every candidate was rejected.
pub fn sample_free_cell<R, F>(
    dimensions: BoardDimensions,
    attempts: u32,
    rng: &mut R,
    rejected: F,
) -> Option<CellCoord>
where
    R: RandomSource + ?Sized,
    F: Fn(CellCoord) -> bool,
{
    if dimensions.width() == 0 || dimensions.height() == 0 {
        return None;
    }

    (0..attempts)
        .map(|_| {
            let column = rng.below(dimensions.width());
            let row = rng.below(dimensions.height());
            CellCoord::new(column, row)
        })
        .find(|candidate| !rejected(*candidate))
}

#[cfg(test)]
mod tests {
    use super::{placement_bias, PlacementTuning};
    use snake_overseer_core::MetricsSnapshot;

    #[test]
    fn neutral_metrics_leave_placement_uniform() {
        let bias = placement_bias(&MetricsSnapshot::default(), &PlacementTuning::default());
        assert_eq!(bias.boundary_weight(), 0.0);
        assert_eq!(bias.body_weight(), 0.0);
    }

    #[test]
    fn comfort_and_direction_bias_combine() {
        let metrics = MetricsSnapshot {
            comfort_zone: 0.8,
            directional_bias: [0.1, 0.45, 0.25, 0.2],
            boundary_hugging_frequency: 0.5,
            ..MetricsSnapshot::default()
        };
        let bias = placement_bias(&metrics, &PlacementTuning::default());
        assert!((bias.boundary_weight() - 0.6).abs() < f32::EPSILON);
        assert!((bias.body_weight() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn greedy_centre_dwellers_get_the_strongest_push() {
        let metrics = MetricsSnapshot {
            comfort_zone: 0.8,
            greed_ratio: 0.4,
            boundary_hugging_frequency: 0.1,
            ..MetricsSnapshot::default()
        };
        let bias = placement_bias(&metrics, &PlacementTuning::default());
        assert!((bias.boundary_weight() - 0.8).abs() < f32::EPSILON);
    }
}
