use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::{Error, Idx};

/// Terminates the concatenated text; must stay lexicographically smaller
/// than every payload byte.
pub const SENTINEL: u8 = b'$';

/// Separates adjacent records in the concatenated text.
pub const SEPARATOR: u8 = b'|';

/// Parsed FASTA input: record identifiers, per-record byte lengths, and the
/// `|`-joined payload (without the trailing sentinel).
#[derive(Debug, Clone)]
pub struct Fasta {
    pub(crate) ids: Vec<String>,
    pub(crate) lens: Vec<Idx>,
    pub(crate) payload: Vec<u8>,
}

impl Fasta {
    /// Read and concatenate all records of a `.fasta` file.
    ///
    /// Header lines start with `>`; the following non-empty lines up to the
    /// next header are the record payload. Each line is stripped of newline,
    /// carriage-return and space bytes at both ends; empty lines are
    /// skipped.
    ///
    /// Fails with [`Error::Input`] if the path does not carry the `.fasta`
    /// extension or cannot be read, and with [`Error::Format`] if the first
    /// non-empty line is not a header or a record is malformed.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Fasta, Error> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("fasta") {
            return Err(Error::Input {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "expected a .fasta file"),
            });
        }
        let file = File::open(path).map_err(|e| Error::Input {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut reader = BufReader::new(file);
        let mut records: Vec<(String, Vec<u8>)> = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line).map_err(|e| Error::Input {
                path: path.to_path_buf(),
                source: e,
            })?;
            if read == 0 {
                break;
            }
            let trimmed = trim_line(&line);
            if trimmed.is_empty() {
                continue;
            }
            if trimmed[0] == b'>' {
                let id = String::from_utf8_lossy(&trimmed[1..]).into_owned();
                records.push((id, Vec::new()));
            } else {
                match records.last_mut() {
                    Some((_, seq)) => seq.extend_from_slice(trimmed),
                    None => {
                        return Err(Error::Format(format!(
                            "{}: first non-empty line is not a FASTA header",
                            path.display()
                        )))
                    }
                }
            }
        }
        Fasta::from_records(records)
    }

    /// Assemble a [`Fasta`] from in-memory records.
    ///
    /// Record payloads must consist of printable ASCII bytes strictly
    /// greater than the `$` sentinel and distinct from the `|` separator, so
    /// that the sentinel stays the unique lexicographic minimum of the
    /// concatenated text.
    pub fn from_records<I, N, S>(records: I) -> Result<Fasta, Error>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<[u8]>,
    {
        let mut ids = Vec::new();
        let mut lens = Vec::new();
        let mut payload = Vec::new();
        for (id, seq) in records {
            let id = id.into();
            let seq = seq.as_ref();
            if seq.is_empty() {
                return Err(Error::Format(format!("record {:?} has no sequence data", id)));
            }
            if let Some(&bad) = seq.iter().find(|&&b| !is_payload_byte(b)) {
                return Err(Error::Format(format!(
                    "record {:?} contains byte 0x{:02x}, which collides with the sentinel, \
                     the separator, or falls outside the printable ASCII alphabet",
                    id, bad
                )));
            }
            if !payload.is_empty() {
                payload.push(SEPARATOR);
            }
            ids.push(id);
            lens.push(seq.len() as Idx);
            payload.extend_from_slice(seq);
        }
        if ids.is_empty() {
            return Err(Error::Format("input contains no FASTA records".to_string()));
        }
        Ok(Fasta { ids, lens, payload })
    }

    /// Record identifiers, in order of appearance.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Per-record payload lengths in bytes.
    pub fn lens(&self) -> &[Idx] {
        &self.lens
    }
}

fn is_payload_byte(b: u8) -> bool {
    b > SENTINEL && b < 0x7f && b != SEPARATOR
}

fn trim_line(line: &[u8]) -> &[u8] {
    let is_pad = |b: &u8| matches!(b, b'\n' | b'\r' | b' ');
    let start = line.iter().position(|b| !is_pad(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !is_pad(b)).map_or(start, |e| e + 1);
    &line[start..end]
}
