//! Aggregated tuning for every game-master system.

use serde::Deserialize;
use snake_overseer_system_analytics::MetricsTuning;
use snake_overseer_system_commentary::CommentaryTuning;
use snake_overseer_system_escalation::EscalationTuning;
use snake_overseer_system_interference::InterferenceTuning;
use snake_overseer_system_telemetry::TelemetryTuning;

/// Configuration consumed by [`crate::GameMaster::new`].
///
/// Every section falls back to its defaults when omitted, so an empty
/// document yields the stock game-master.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct OverseerConfig {
    /// Telemetry recorder.
    pub telemetry: TelemetryTuning,
    /// Metrics engine.
    pub metrics: MetricsTuning,
    /// Escalation thresholds.
    pub escalation: EscalationTuning,
    /// Interference effects.
    pub interference: InterferenceTuning,
    /// Commentary dispatcher.
    pub commentary: CommentaryTuning,
}

#[cfg(test)]
mod tests {
    use super::OverseerConfig;

    #[test]
    fn partial_documents_keep_defaults() {
        let config: OverseerConfig = toml::from_str(
            r#"
            [escalation]
            subtle_length = 4

            [interference.decoys]
            lifetime_ms = 5000
            "#,
        )
        .expect("valid configuration");

        assert_eq!(config.escalation.subtle_length, 4);
        assert_eq!(config.escalation.active_length, 11);
        assert_eq!(config.interference.decoys.lifetime_ms, 5_000);
        assert_eq!(config.interference.decoys.max_active, 3);
        assert_eq!(config.interference.idle_check_interval_ms, 1_000);
        assert_eq!(config.telemetry.window_capacity, 20);
    }
}
