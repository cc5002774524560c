//! File-backed daily mention history.
//!
//! The store is a single CSV file with columns `date,ticker,mentions`.
//! It has no locking: concurrent writers must be serialized by the caller.

mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use store::{HistorySnapshot, HistoryStore};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
