use std::time::Duration;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde_json::json;
use snake_overseer_core::{
    RollingCounters, SessionId, SessionRecord, TelemetryArchive, TerminationCause,
};
use snake_overseer_persistence::{
    load_best_effort, save_best_effort, upgrade, FileStore, LedgerError, LedgerStore,
    MemoryStore, SessionLedger, LEDGER_VERSION,
};
use tempfile::TempDir;

fn sample_archive() -> TelemetryArchive {
    let session = SessionRecord {
        ended_at: Some(Duration::from_secs(42)),
        max_length: 9,
        final_score: 6,
        termination: Some(TerminationCause::SelfCollision),
        escalation_events: 2,
        ..SessionRecord::begin(SessionId::new(1), Duration::from_secs(2))
    };
    TelemetryArchive {
        sessions: vec![session],
        counters: RollingCounters {
            near_boundary_time: Duration::from_secs(12),
            alive_time: Duration::from_secs(40),
            direction_counts: [10, 4, 7, 3],
        },
        cyclic_detections: 1,
        sessions_started: 1,
    }
}

/// Store whose saves fail until told otherwise.
#[derive(Default)]
struct FlakyStore {
    broken: bool,
    inner: MemoryStore,
}

impl LedgerStore for FlakyStore {
    fn load(&mut self) -> Result<Option<SessionLedger>, LedgerError> {
        if self.broken {
            return Err(LedgerError::Empty);
        }
        self.inner.load()
    }

    fn save(&mut self, ledger: &SessionLedger) -> Result<(), LedgerError> {
        if self.broken {
            return Err(LedgerError::Io(std::io::Error::other("disk unplugged")));
        }
        self.inner.save(ledger)
    }
}

#[test]
fn memory_store_keeps_the_archive() {
    let mut store = MemoryStore::default();
    assert_eq!(load_best_effort(&mut store), TelemetryArchive::default());

    assert!(save_best_effort(&mut store, &sample_archive()));
    assert!(store
        .line()
        .is_some_and(|line| line.starts_with("overseer-ledger:v2:")));
    assert_eq!(load_best_effort(&mut store), sample_archive());
}

#[test]
fn version_one_blobs_are_upgraded_once() {
    let legacy = json!({
        "wallHugTime": 1500.0,
        "totalTime": 6000.0,
        "spiralDetections": 4,
        "soundEnabled": true,
        "sessions": [
            {
                "startTime": 0.0,
                "endTime": 30000.0,
                "finalScore": 12,
                "terminationCause": "wall"
            },
            { "startTime": 40000.0, "finalScore": 3 },
            {
                "startTime": 60000.0,
                "endTime": 65000.0,
                "finalScore": 1,
                "terminationCause": "self"
            }
        ]
    });

    let ledger = upgrade(legacy).expect("legacy ledger upgrades");
    assert_eq!(ledger.version, LEDGER_VERSION);

    let archive = &ledger.archive;
    assert_eq!(archive.sessions.len(), 2);
    assert_eq!(archive.sessions_started, 2);
    assert_eq!(archive.cyclic_detections, 2);
    assert_eq!(archive.counters.near_boundary_time, Duration::from_millis(1_500));
    assert_eq!(archive.counters.alive_time, Duration::from_secs(6));
    assert_eq!(archive.sessions[0].survival(), Duration::from_secs(30));
    assert_eq!(
        archive.sessions[1].termination,
        Some(TerminationCause::SelfCollision)
    );

    let line = ledger.encode().expect("upgraded ledger encodes");
    assert_eq!(SessionLedger::decode(&line).expect("round trip"), ledger);
}

#[test]
fn legacy_lines_decode_through_the_upgrade() {
    let payload = json!({ "wallHugTime": 250.0, "totalTime": 1000.0, "sessions": [] });
    let encoded = STANDARD_NO_PAD.encode(payload.to_string());
    let mut store = MemoryStore::with_line(format!("overseer-ledger:v1:{encoded}"));

    let archive = load_best_effort(&mut store);
    assert_eq!(archive.counters.alive_time, Duration::from_secs(1));
    assert!(archive.sessions.is_empty());
}

#[test]
fn oversized_legacy_times_do_not_abort_loading() {
    let payload = json!({
        "wallHugTime": 1e300,
        "totalTime": 1e300,
        "sessions": [
            { "startTime": 0.0, "endTime": 1e300, "finalScore": 4, "terminationCause": "wall" }
        ]
    });
    let encoded = STANDARD_NO_PAD.encode(payload.to_string());
    let mut store = MemoryStore::with_line(format!("overseer-ledger:v1:{encoded}"));

    let archive = load_best_effort(&mut store);
    assert_eq!(archive.counters.alive_time, Duration::ZERO);
    assert_eq!(archive.counters.near_boundary_time, Duration::ZERO);
    assert_eq!(archive.sessions.len(), 1);
    assert_eq!(archive.sessions[0].final_score, 4);
}

#[test]
fn future_versions_are_rejected() {
    let result = upgrade(json!({ "version": 7, "archive": {} }));
    assert!(matches!(
        result,
        Err(LedgerError::UnsupportedVersion { found: 7, .. })
    ));

    let mut store = MemoryStore::with_line("overseer-ledger:v9:e30");
    assert!(matches!(
        store.load(),
        Err(LedgerError::UnsupportedVersion { found: 9, .. })
    ));
    assert_eq!(load_best_effort(&mut store), TelemetryArchive::default());
}

#[test]
fn failed_saves_do_not_poison_later_ones() {
    let mut store = FlakyStore {
        broken: true,
        ..FlakyStore::default()
    };
    assert!(!save_best_effort(&mut store, &sample_archive()));
    assert_eq!(load_best_effort(&mut store), TelemetryArchive::default());

    store.broken = false;
    assert!(save_best_effort(&mut store, &sample_archive()));
    assert_eq!(load_best_effort(&mut store), sample_archive());
}

#[test]
fn file_store_round_trips_and_leaves_no_staging_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("ledger.txt");
    let mut store = FileStore::new(&path);

    assert!(store.load().expect("missing file is not an error").is_none());
    store
        .save(&SessionLedger::new(sample_archive()))
        .expect("ledger saves");

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let mut reopened = FileStore::new(&path);
    let ledger = reopened.load().expect("ledger loads").expect("ledger present");
    assert_eq!(ledger.archive, sample_archive());
}
