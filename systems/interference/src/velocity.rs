//! Speed multiplier model: baseline creep, comfort creep, surge and fluctuation.

use std::f32::consts::TAU;
use std::time::Duration;

use serde::Deserialize;
use snake_overseer_core::{EscalationLevel, RandomSource, SpeedCause, VelocityMultiplier};

/// Constants shaping the velocity multiplier.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VelocityTuning {
    /// Survival time over which the baseline creep reaches its cap.
    pub creep_span_ms: u64,
    /// Maximum contribution of the baseline creep.
    pub creep_max: f32,
    /// Comfort-zone size above which the comfort creep accumulates.
    pub comfort_threshold: f32,
    /// Bonus added on every comfort creep step.
    pub comfort_step: f32,
    /// Minimum time between two comfort creep steps.
    pub comfort_interval_ms: u64,
    /// Factor applied right after an objective is consumed.
    pub surge_factor: f32,
    /// How long the full surge lasts.
    pub surge_ms: u64,
    /// Linear decay back to neutral once the surge ends.
    pub surge_decay_ms: u64,
    /// Probability per idle check that a fluctuation window opens.
    pub fluctuation_chance: f32,
    /// Length of a fluctuation window.
    pub fluctuation_window_ms: u64,
    /// Period of the fluctuation sinusoid.
    pub fluctuation_period_ms: u64,
    /// Lowest factor reached by the fluctuation.
    pub fluctuation_low: f32,
    /// Highest factor reached by the fluctuation.
    pub fluctuation_high: f32,
}

impl Default for VelocityTuning {
    fn default() -> Self {
        Self {
            creep_span_ms: 30_000,
            creep_max: 0.5,
            comfort_threshold: 0.6,
            comfort_step: 0.1,
            comfort_interval_ms: 3_000,
            surge_factor: 1.5,
            surge_ms: 800,
            surge_decay_ms: 400,
            fluctuation_chance: 0.15,
            fluctuation_window_ms: 3_000,
            fluctuation_period_ms: 400,
            fluctuation_low: 0.7,
            fluctuation_high: 1.8,
        }
    }
}

/// Inputs consumed by a single velocity update.
#[derive(Clone, Copy, Debug)]
pub(crate) struct VelocityInputs {
    pub(crate) now: Duration,
    pub(crate) elapsed: Duration,
    pub(crate) level: EscalationLevel,
    pub(crate) comfort_zone: f32,
    pub(crate) consumed: bool,
    pub(crate) idle_check: bool,
}

/// Per-session velocity state.
#[derive(Debug, Default)]
pub(crate) struct Velocity {
    comfort_bonus: f32,
    comfort_since: Option<Duration>,
    surge_from: Option<Duration>,
    fluctuation_from: Option<Duration>,
    current: VelocityMultiplier,
}

impl Velocity {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn current(&self) -> VelocityMultiplier {
        self.current
    }

    /// Advances the model and reports the most notable change, if any.
    pub(crate) fn update<R>(
        &mut self,
        inputs: VelocityInputs,
        tuning: &VelocityTuning,
        rng: &mut R,
    ) -> Option<SpeedCause>
    where
        R: RandomSource + ?Sized,
    {
        let mut cause = None;

        if inputs.comfort_zone > tuning.comfort_threshold {
            match self.comfort_since {
                None => self.comfort_since = Some(inputs.now),
                Some(since) => {
                    if inputs.now.saturating_sub(since)
                        >= Duration::from_millis(tuning.comfort_interval_ms)
                    {
                        self.comfort_bonus += tuning.comfort_step;
                        self.comfort_since = Some(inputs.now);
                        cause = Some(SpeedCause::ComfortCreep);
                    }
                }
            }
        } else {
            self.comfort_since = None;
        }

        if inputs.consumed && inputs.level >= EscalationLevel::ActiveManipulation {
            self.surge_from = Some(inputs.now);
            cause = Some(SpeedCause::Surge);
        }

        if let Some(from) = self.fluctuation_from {
            let window = Duration::from_millis(tuning.fluctuation_window_ms);
            if inputs.now.saturating_sub(from) >= window {
                self.fluctuation_from = None;
            }
        }
        if inputs.level == EscalationLevel::HostileTakeover
            && inputs.idle_check
            && self.fluctuation_from.is_none()
            && rng.chance(tuning.fluctuation_chance)
        {
            self.fluctuation_from = Some(inputs.now);
            cause = cause.or(Some(SpeedCause::Fluctuation));
        }
        if inputs.level < EscalationLevel::HostileTakeover {
            self.fluctuation_from = None;
        }

        let raw = (creep(inputs.elapsed, tuning) + self.comfort_bonus)
            * self.surge_factor(inputs.now, tuning)
            * self.fluctuation_factor(inputs.now, tuning);
        self.current = VelocityMultiplier::new(raw);
        cause
    }

    fn surge_factor(&self, now: Duration, tuning: &VelocityTuning) -> f32 {
        let Some(from) = self.surge_from else {
            return 1.0;
        };
        let since = now.saturating_sub(from).as_secs_f32() * 1_000.0;
        let hold = tuning.surge_ms as f32;
        let decay = tuning.surge_decay_ms as f32;
        if since < hold {
            tuning.surge_factor
        } else if decay > 0.0 && since < hold + decay {
            let progress = (since - hold) / decay;
            tuning.surge_factor + (1.0 - tuning.surge_factor) * progress
        } else {
            1.0
        }
    }

    fn fluctuation_factor(&self, now: Duration, tuning: &VelocityTuning) -> f32 {
        let Some(from) = self.fluctuation_from else {
            return 1.0;
        };
        let period = tuning.fluctuation_period_ms.max(1) as f32;
        let phase = now.saturating_sub(from).as_secs_f32() * 1_000.0 / period;
        let middle = (tuning.fluctuation_low + tuning.fluctuation_high) / 2.0;
        let amplitude = (tuning.fluctuation_high - tuning.fluctuation_low) / 2.0;
        middle + amplitude * (phase * TAU).sin()
    }
}

fn creep(elapsed: Duration, tuning: &VelocityTuning) -> f32 {
    if tuning.creep_span_ms == 0 {
        return 1.0 + tuning.creep_max;
    }
    let progress = elapsed.as_secs_f32() * 1_000.0 / tuning.creep_span_ms as f32;
    1.0 + progress.min(1.0) * tuning.creep_max
}

#[cfg(test)]
mod tests {
    use super::{Velocity, VelocityInputs, VelocityTuning};
    use snake_overseer_core::{EscalationLevel, RandomSource, SpeedCause};
    use std::time::Duration;

    struct Always(f32);

    impl RandomSource for Always {
        fn next_unit(&mut self) -> f32 {
            self.0
        }
    }

    fn inputs(now_ms: u64, level: EscalationLevel) -> VelocityInputs {
        VelocityInputs {
            now: Duration::from_millis(now_ms),
            elapsed: Duration::from_millis(now_ms),
            level,
            comfort_zone: 0.0,
            consumed: false,
            idle_check: false,
        }
    }

    #[test]
    fn baseline_creep_caps_after_thirty_seconds() {
        let tuning = VelocityTuning::default();
        let mut velocity = Velocity::default();
        let mut rng = Always(0.9);

        let _ = velocity.update(inputs(15_000, EscalationLevel::Observation), &tuning, &mut rng);
        assert!((velocity.current().get() - 1.25).abs() < 1e-4);

        let _ = velocity.update(inputs(90_000, EscalationLevel::Observation), &tuning, &mut rng);
        assert!((velocity.current().get() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn comfort_creep_steps_every_interval() {
        let tuning = VelocityTuning::default();
        let mut velocity = Velocity::default();
        let mut rng = Always(0.9);
        let comfy = |now_ms| VelocityInputs {
            comfort_zone: 0.9,
            elapsed: Duration::ZERO,
            ..inputs(now_ms, EscalationLevel::Observation)
        };

        assert_eq!(velocity.update(comfy(0), &tuning, &mut rng), None);
        assert_eq!(velocity.update(comfy(2_999), &tuning, &mut rng), None);
        assert_eq!(
            velocity.update(comfy(3_000), &tuning, &mut rng),
            Some(SpeedCause::ComfortCreep)
        );
        assert!((velocity.current().get() - 1.1).abs() < 1e-4);
    }

    #[test]
    fn surge_holds_then_decays_linearly() {
        let tuning = VelocityTuning::default();
        let mut velocity = Velocity::default();
        let mut rng = Always(0.9);
        let level = EscalationLevel::ActiveManipulation;
        let frozen = |now_ms| VelocityInputs {
            elapsed: Duration::ZERO,
            ..inputs(now_ms, level)
        };

        let consumed = VelocityInputs {
            consumed: true,
            ..frozen(1_000)
        };
        assert_eq!(
            velocity.update(consumed, &tuning, &mut rng),
            Some(SpeedCause::Surge)
        );
        assert!((velocity.current().get() - 1.5).abs() < 1e-4);

        let _ = velocity.update(frozen(2_000), &tuning, &mut rng);
        assert!((velocity.current().get() - 1.25).abs() < 1e-3);

        let _ = velocity.update(frozen(2_200), &tuning, &mut rng);
        assert!((velocity.current().get() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn surge_requires_active_manipulation() {
        let tuning = VelocityTuning::default();
        let mut velocity = Velocity::default();
        let consumed = VelocityInputs {
            consumed: true,
            elapsed: Duration::ZERO,
            ..inputs(0, EscalationLevel::SubtleInterference)
        };
        assert_eq!(velocity.update(consumed, &tuning, &mut Always(0.0)), None);
        assert_eq!(velocity.current().get(), 1.0);
    }

    #[test]
    fn fluctuation_swings_between_bounds() {
        let tuning = VelocityTuning::default();
        let mut velocity = Velocity::default();
        let level = EscalationLevel::HostileTakeover;
        let opening = VelocityInputs {
            idle_check: true,
            elapsed: Duration::ZERO,
            ..inputs(0, level)
        };
        assert_eq!(
            velocity.update(opening, &tuning, &mut Always(0.0)),
            Some(SpeedCause::Fluctuation)
        );

        let mut lowest = f32::MAX;
        let mut highest = f32::MIN;
        for now_ms in (0..3_000).step_by(20) {
            let step = VelocityInputs {
                elapsed: Duration::ZERO,
                ..inputs(now_ms, level)
            };
            let _ = velocity.update(step, &tuning, &mut Always(0.9));
            lowest = lowest.min(velocity.current().get());
            highest = highest.max(velocity.current().get());
        }
        assert!(lowest < 0.75 && lowest >= 0.7 - 1e-3);
        assert!(highest > 1.75 && highest <= 1.8 + 1e-3);
    }
}
