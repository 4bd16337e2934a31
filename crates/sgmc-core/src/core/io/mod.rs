//! # I/O Module
//!
//! Persistence collaborators for completed runs: XYZ structure snapshots and
//! tabular run histories. Formatting lives entirely here; the engine only
//! hands over data.

pub mod history;
pub mod xyz;

use thiserror::Error;

/// Errors produced while reading or writing structures and histories.
#[derive(Debug, Error)]
pub enum IoError {
    /// An underlying filesystem or stream operation failed.
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Writing tabular history data failed.
    #[error("history serialization failed: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// The input stream is not a well-formed XYZ file.
    #[error("malformed XYZ input at line {line}: {message}")]
    MalformedXyz {
        /// 1-based line number of the offending input.
        line: usize,
        /// Description of the problem.
        message: String,
    },
}
