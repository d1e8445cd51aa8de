#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session ledger persistence for the game-master's cross-session history.
//!
//! The ledger is versioned and upgraded once at load. Saving and loading are
//! best-effort: a failing backend is logged and the game keeps running on its
//! in-memory state.

mod error;
mod ledger;
mod store;

pub use error::LedgerError;
pub use ledger::{upgrade, SessionLedger, LEDGER_VERSION};
pub use store::{load_best_effort, save_best_effort, FileStore, LedgerStore, MemoryStore};
