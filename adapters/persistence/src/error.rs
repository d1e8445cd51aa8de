use thiserror::Error;

/// Failures raised while reading or writing a session ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The stored payload was empty or whitespace.
    #[error("ledger payload was empty")]
    Empty,

    /// A segment of the encoded line was missing.
    #[error("ledger line is missing the {0}")]
    MissingSegment(&'static str),

    /// The encoded line did not start with the ledger prefix.
    #[error("ledger prefix '{0}' is not supported")]
    InvalidPrefix(String),

    /// The ledger was written by a newer or unknown schema.
    #[error("ledger version {found} is not supported (current: {expected})")]
    UnsupportedVersion {
        /// Version found in the payload.
        found: u64,
        /// Version this build writes.
        expected: u32,
    },

    /// The base64 payload could not be decoded.
    #[error("could not decode ledger payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// The JSON payload did not match any known schema.
    #[error("could not parse ledger payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The backing file could not be read or written.
    #[error("ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
