use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// An error raised while building, persisting, restoring or querying an
/// index.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be used: wrong extension, missing file, or
    /// an I/O failure while reading or writing.
    #[error("cannot access {path}: {source}")]
    Input {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The FASTA input or the on-disk index directory is malformed.
    #[error("{0}")]
    Format(String),

    /// A query symbol does not occur in the indexed text.
    #[error("query symbol 0x{0:02x} does not occur in the indexed text")]
    UnknownSymbol(u8),

    /// An argument violates the documented constraints.
    #[error("{0}")]
    Argument(String),
}
