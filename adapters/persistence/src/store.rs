//! Storage backends and best-effort helpers used at session boundaries.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use snake_overseer_core::TelemetryArchive;

use crate::{LedgerError, SessionLedger};

/// Backend able to hold a single session ledger.
pub trait LedgerStore {
    /// Reads the stored ledger. Returns `Ok(None)` when nothing was stored yet.
    fn load(&mut self) -> Result<Option<SessionLedger>, LedgerError>;

    /// Replaces the stored ledger.
    fn save(&mut self, ledger: &SessionLedger) -> Result<(), LedgerError>;
}

/// In-process store holding the encoded ledger line.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    line: Option<String>,
}

impl MemoryStore {
    /// Creates a store pre-populated with an encoded line.
    #[must_use]
    pub fn with_line(line: impl Into<String>) -> Self {
        Self {
            line: Some(line.into()),
        }
    }

    /// Encoded line currently held, if any.
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&mut self) -> Result<Option<SessionLedger>, LedgerError> {
        self.line
            .as_deref()
            .map(SessionLedger::decode)
            .transpose()
    }

    fn save(&mut self, ledger: &SessionLedger) -> Result<(), LedgerError> {
        self.line = Some(ledger.encode()?);
        Ok(())
    }
}

/// Store writing the encoded ledger line to a file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the ledger is written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for FileStore {
    fn load(&mut self) -> Result<Option<SessionLedger>, LedgerError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let line = fs::read_to_string(&self.path)?;
        SessionLedger::decode(&line).map(Some)
    }

    fn save(&mut self, ledger: &SessionLedger) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let line = ledger.encode()?;
        let staging = self.path.with_extension("tmp");
        {
            let mut file = File::create(&staging)?;
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&staging, &self.path)?;

        tracing::debug!(path = %self.path.display(), bytes = line.len(), "ledger saved");
        Ok(())
    }
}

/// Loads the archive from `store`, falling back to an empty history.
///
/// Failures are logged and never propagated.
pub fn load_best_effort<S>(store: &mut S) -> TelemetryArchive
where
    S: LedgerStore + ?Sized,
{
    match store.load() {
        Ok(Some(ledger)) => ledger.archive,
        Ok(None) => TelemetryArchive::default(),
        Err(error) => {
            tracing::warn!(%error, "could not load session ledger; starting fresh");
            TelemetryArchive::default()
        }
    }
}

/// Saves `archive` to `store`, returning whether the write succeeded.
///
/// Each call is independent of earlier failures.
pub fn save_best_effort<S>(store: &mut S, archive: &TelemetryArchive) -> bool
where
    S: LedgerStore + ?Sized,
{
    match store.save(&SessionLedger::new(archive.clone())) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(%error, "could not save session ledger; continuing in memory");
            false
        }
    }
}
