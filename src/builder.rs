use std::path::{Path, PathBuf};

use crate::fasta::Fasta;
use crate::index::{CompressedIndex, Orientation};
use crate::{Error, Idx};

/// Configures and builds a [`CompressedIndex`].
///
/// The default configuration indexes the text as-is with an unsampled
/// occurrence table (`M = 1`) and no attribution data: maximum query speed,
/// most memory. Raise the compression ratio to shrink the occurrence table
/// at the cost of a short BWT walk per rank query, enable `multiple` to
/// build the per-row record attribution used by the guess queries, and pick
/// [`Orientation::Reversed`] to index the reversed text.
///
/// ```rust
/// use fmdex::{Fasta, IndexBuilder};
///
/// let fasta = Fasta::from_records([("chr1", b"ACGTACGT")])?;
/// let index = IndexBuilder::new().compression_ratio(16).build(fasta)?;
/// assert_eq!(index.search(b"CGTA")?.count(), 1);
/// # Ok::<(), fmdex::Error>(())
/// ```
pub struct IndexBuilder {
    compression_ratio: Idx,
    multiple: bool,
    orientation: Orientation,
}

impl IndexBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> IndexBuilder {
        IndexBuilder {
            compression_ratio: 1,
            multiple: false,
            orientation: Orientation::Forward,
        }
    }

    /// Set the occurrence-table sampling interval `M` (at least 1). Larger
    /// values mean a smaller index and slower rank queries.
    pub fn compression_ratio(mut self, m: Idx) -> IndexBuilder {
        self.compression_ratio = m;
        self
    }

    /// Build the per-row attribution array mapping suffix-array rows to the
    /// record containing them; required by the guess queries.
    pub fn multiple(mut self, multiple: bool) -> IndexBuilder {
        self.multiple = multiple;
        self
    }

    /// Choose the text orientation baked into the index.
    pub fn orientation(mut self, orientation: Orientation) -> IndexBuilder {
        self.orientation = orientation;
        self
    }

    /// Read `path` and build an index over its records. The path is
    /// remembered so that [`CompressedIndex::save`] can derive the default
    /// index directory.
    pub fn build_from_fasta<P: AsRef<Path>>(self, path: P) -> Result<CompressedIndex, Error> {
        let fasta = Fasta::read(&path)?;
        self.build_inner(fasta, Some(path.as_ref().to_path_buf()))
    }

    /// Build an index over already-parsed records.
    pub fn build(self, fasta: Fasta) -> Result<CompressedIndex, Error> {
        self.build_inner(fasta, None)
    }

    fn build_inner(
        self,
        fasta: Fasta,
        input_file: Option<PathBuf>,
    ) -> Result<CompressedIndex, Error> {
        if self.compression_ratio < 1 {
            return Err(Error::Argument(format!(
                "compression ratio must be at least 1, got {}",
                self.compression_ratio
            )));
        }
        CompressedIndex::build(
            fasta,
            self.multiple,
            self.compression_ratio,
            self.orientation,
            input_file,
        )
    }
}

impl Default for IndexBuilder {
    fn default() -> IndexBuilder {
        IndexBuilder::new()
    }
}
