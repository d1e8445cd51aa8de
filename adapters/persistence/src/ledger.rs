//! Versioned ledger schema, upgrade-on-load and the single-line encoding.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snake_overseer_core::{
    RollingCounters, SessionId, SessionRecord, TelemetryArchive, TerminationCause,
};

use crate::LedgerError;

/// Schema version written by this build.
pub const LEDGER_VERSION: u32 = 2;

const LEDGER_DOMAIN: &str = "overseer-ledger";
const FIELD_DELIMITER: char = ':';

/// Persisted cross-session state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionLedger {
    /// Schema version of the payload.
    pub version: u32,
    /// Telemetry history carried between runs.
    pub archive: TelemetryArchive,
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self::new(TelemetryArchive::default())
    }
}

impl SessionLedger {
    /// Wraps `archive` in a ledger of the current version.
    #[must_use]
    pub fn new(archive: TelemetryArchive) -> Self {
        Self {
            version: LEDGER_VERSION,
            archive,
        }
    }

    /// Encodes the ledger into a single line suitable for string stores.
    pub fn encode(&self) -> Result<String, LedgerError> {
        let json = serde_json::to_vec(self)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{LEDGER_DOMAIN}:v{LEDGER_VERSION}:{encoded}"))
    }

    /// Decodes a line produced by [`SessionLedger::encode`], upgrading older
    /// payloads to the current schema.
    pub fn decode(value: &str) -> Result<Self, LedgerError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Empty);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(LedgerError::MissingSegment("prefix"))?;
        let version = parts
            .next()
            .ok_or(LedgerError::MissingSegment("version"))?;
        let payload = parts
            .next()
            .ok_or(LedgerError::MissingSegment("payload"))?;

        if domain != LEDGER_DOMAIN {
            return Err(LedgerError::InvalidPrefix(domain.to_owned()));
        }
        let declared = version
            .strip_prefix('v')
            .and_then(|digits| digits.parse::<u64>().ok())
            .ok_or_else(|| LedgerError::InvalidPrefix(format!("{domain}:{version}")))?;
        if declared > u64::from(LEDGER_VERSION) {
            return Err(LedgerError::UnsupportedVersion {
                found: declared,
                expected: LEDGER_VERSION,
            });
        }

        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let value: Value = serde_json::from_slice(&bytes)?;
        upgrade(value)
    }
}

/// Brings a raw payload of any known version up to [`LEDGER_VERSION`].
///
/// Payloads without a `version` field are treated as the flat version 1
/// layout. Versions newer than this build are rejected.
pub fn upgrade(value: Value) -> Result<SessionLedger, LedgerError> {
    let found = value.get("version").and_then(Value::as_u64).unwrap_or(1);
    match found {
        1 => {
            let legacy: LegacyLedger = serde_json::from_value(value)?;
            let ledger = SessionLedger::new(legacy.into_archive());
            tracing::info!(
                from = found,
                to = LEDGER_VERSION,
                sessions = ledger.archive.sessions.len(),
                "migrated ledger"
            );
            Ok(ledger)
        }
        2 => Ok(serde_json::from_value(value)?),
        _ => Err(LedgerError::UnsupportedVersion {
            found,
            expected: LEDGER_VERSION,
        }),
    }
}

/// Flat version 1 layout. Times are milliseconds; keys not listed here are
/// obsolete and dropped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLedger {
    #[serde(default)]
    wall_hug_time: f64,
    #[serde(default)]
    total_time: f64,
    #[serde(default)]
    direction_counts: [u64; 4],
    #[serde(default)]
    spiral_detections: u32,
    #[serde(default)]
    sessions: Vec<LegacySession>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySession {
    #[serde(default)]
    start_time: f64,
    #[serde(default)]
    end_time: Option<f64>,
    #[serde(default)]
    final_score: u32,
    #[serde(default)]
    termination_cause: Option<String>,
    #[serde(default)]
    escalation_events: u32,
}

impl LegacyLedger {
    fn into_archive(self) -> TelemetryArchive {
        let sessions: Vec<SessionRecord> = self
            .sessions
            .into_iter()
            .filter(|session| session.end_time.is_some())
            .enumerate()
            .map(|(index, session)| session.into_record(index as u64 + 1))
            .collect();
        let sessions_started = sessions.len() as u32;

        TelemetryArchive {
            sessions,
            counters: RollingCounters {
                near_boundary_time: millis(self.wall_hug_time),
                alive_time: millis(self.total_time),
                direction_counts: self.direction_counts,
            },
            cyclic_detections: self.spiral_detections.min(sessions_started),
            sessions_started,
        }
    }
}

impl LegacySession {
    // Version 1 kept neither moves nor maximum length.
    fn into_record(self, id: u64) -> SessionRecord {
        SessionRecord {
            ended_at: self.end_time.map(millis),
            final_score: self.final_score,
            termination: Some(legacy_cause(self.termination_cause.as_deref())),
            escalation_events: self.escalation_events,
            ..SessionRecord::begin(SessionId::new(id), millis(self.start_time))
        }
    }
}

fn legacy_cause(cause: Option<&str>) -> TerminationCause {
    match cause {
        Some("wall") => TerminationCause::WallCollision,
        Some("self") => TerminationCause::SelfCollision,
        Some("obstacle") => TerminationCause::ObstacleCollision,
        Some("victory" | "win") => TerminationCause::Victory,
        _ => TerminationCause::ManualReset,
    }
}

// Negative, non-finite and out-of-range readings collapse to zero.
fn millis(value: f64) -> Duration {
    Duration::try_from_secs_f64(value / 1_000.0).unwrap_or(Duration::ZERO)
}
