#![allow(clippy::len_without_is_empty)]

//! A compressed full-text substring index for byte sequences, built on the
//! Burrows-Wheeler transform and FM-index backward search with sampled
//! occurrence tables.
//!
//! The index is constructed from one or more FASTA records concatenated with
//! a `|` separator and terminated by a `$` sentinel. Besides exact substring
//! counting and locating, it supports attribution queries: guessing which of
//! the concatenated records a query (or a pair of queries drawn from the same
//! record at bounded distance) belongs to.
//!
//! ```rust
//! use fmdex::{Fasta, IndexBuilder};
//!
//! let fasta = Fasta::from_records([("chr1", b"ACGT"), ("chr2", b"ACGA")])?;
//! let index = IndexBuilder::new().multiple(true).build(fasta)?;
//!
//! assert_eq!(index.search(b"ACG")?.count(), 2);
//! assert_eq!(index.search(b"CGT")?.count(), 1);
//! # Ok::<(), fmdex::Error>(())
//! ```
//!
//! Indexes can be persisted to a partitioned directory layout and restored
//! either fully or count-only; see [`CompressedIndex::save_to`] and
//! [`CompressedIndex::load`].

mod builder;
mod error;
mod fasta;
mod guess;
mod index;
mod sais;
mod search;
mod store;
#[cfg(test)]
mod testutil;

pub use builder::IndexBuilder;
pub use error::Error;
pub use fasta::Fasta;
pub use index::{CompressedIndex, Orientation};
pub use search::Match;
pub use store::SaveOption;

/// Index and count type. Matches the on-disk 64-bit little-endian signed
/// encoding; signed so that the rank sentinel `occurrence(c, -1) = 0` needs
/// no special casing in the kernel.
pub type Idx = i64;

/// Sub-sequence ordinal type. The width caps the number of records that can
/// be indexed together (65,536 for `u16`) and sizes the attribution array at
/// two bytes per text position.
pub type SeqId = u16;
