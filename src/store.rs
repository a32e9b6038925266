//! Partitioned on-disk index layout.
//!
//! An index directory `<input>.fmi/` holds one file per component: a plain
//! text `others` with the scalar parameters and per-symbol tables, the raw
//! `bwt`, one little-endian `occ.<c>` slice per symbol, and, depending on
//! the save option, the `sa` slice and the raw `seq` text. Partition files
//! are written and read in parallel.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::index::{CompressedIndex, Orientation, DEFAULT_CANDIDATE_LIMIT};
use crate::{Error, Idx};

/// Which optional parts of an index are persisted alongside the always-saved
/// BWT and occurrence tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOption {
    /// Neither the suffix array nor the text: the reloaded index counts but
    /// cannot locate or self-check.
    CountOnly,
    /// The suffix array but not the text: the reloaded index can locate.
    SuffixArray,
    /// Suffix array and text: full functionality, including self-check.
    Full,
}

impl SaveOption {
    fn as_code(self) -> i64 {
        match self {
            SaveOption::CountOnly => 0,
            SaveOption::SuffixArray => 1,
            SaveOption::Full => 2,
        }
    }

    fn from_code(code: i64) -> Result<SaveOption, Error> {
        match code {
            0 => Ok(SaveOption::CountOnly),
            1 => Ok(SaveOption::SuffixArray),
            2 => Ok(SaveOption::Full),
            other => Err(Error::Format(format!("unknown save option {}", other))),
        }
    }
}

enum Part<'a> {
    Raw(&'a [u8]),
    Ints(&'a [Idx]),
}

impl CompressedIndex {
    /// Persist the index to `<input>.fmi` next to the input file it was
    /// built from, returning the directory path.
    pub fn save(&self, option: SaveOption) -> Result<PathBuf, Error> {
        let input = self.input_file.as_ref().ok_or_else(|| {
            Error::Argument(
                "index was not built from a file; use save_to with an explicit directory"
                    .to_string(),
            )
        })?;
        let mut dir = input.clone().into_os_string();
        dir.push(".fmi");
        let dir = PathBuf::from(dir);
        self.save_to(&dir, option)?;
        Ok(dir)
    }

    /// Persist the index to an explicit directory, creating it if needed.
    pub fn save_to<P: AsRef<Path>>(&self, dir: P, option: SaveOption) -> Result<(), Error> {
        let dir = dir.as_ref();
        if option != SaveOption::CountOnly && self.sa.is_empty() {
            return Err(Error::Argument(
                "suffix array unavailable: the index was restored count-only".to_string(),
            ));
        }
        if option == SaveOption::Full && self.seq.is_empty() {
            return Err(Error::Argument(
                "text unavailable: the index was restored without it".to_string(),
            ));
        }
        fs::create_dir_all(dir).map_err(|e| Error::Input {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut parts: Vec<(PathBuf, Part)> = vec![(dir.join("bwt"), Part::Raw(&self.bwt))];
        if option != SaveOption::CountOnly {
            parts.push((dir.join("sa"), Part::Ints(&self.sa)));
        }
        if option == SaveOption::Full {
            parts.push((dir.join("seq"), Part::Raw(&self.seq)));
        }
        for &s in &self.symbols {
            parts.push((
                dir.join(format!("occ.{}", s as char)),
                Part::Ints(&self.occ[s as usize]),
            ));
        }
        parts.into_par_iter().try_for_each(|(path, part)| {
            let result = match part {
                Part::Raw(bytes) => fs::write(&path, bytes),
                Part::Ints(ints) => fs::write(&path, encode_ints(ints)),
            };
            result.map_err(|e| Error::Input { path, source: e })
        })?;

        let mut others = format!(
            "{} {} {} {} {}\n",
            self.len,
            self.occ_size,
            self.end_pos,
            self.m,
            option.as_code()
        );
        for &s in &self.symbols {
            others.push_str(&format!(
                "{} {} {} {}\n",
                s as char, self.freq[s as usize], self.c[s as usize], self.ep[s as usize]
            ));
        }
        fs::write(dir.join("others"), others).map_err(|e| Error::Input {
            path: dir.join("others"),
            source: e,
        })
    }

    /// Restore an index saved from a forward-orientation build.
    ///
    /// The optional parts absent per the recorded save option stay empty:
    /// without `sa`, searches still count but cannot locate; without `seq`,
    /// the self-check is unavailable. Attribution data is never persisted,
    /// so the guess queries degrade to their no-attribution sentinel.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<CompressedIndex, Error> {
        CompressedIndex::load_oriented(dir, Orientation::Forward)
    }

    /// Restore an index, supplying the orientation it was built with. The
    /// on-disk layout does not record the orientation, so restoring a
    /// reversed index through [`CompressedIndex::load`] would search in the
    /// wrong direction.
    pub fn load_oriented<P: AsRef<Path>>(
        dir: P,
        orientation: Orientation,
    ) -> Result<CompressedIndex, Error> {
        let dir = dir.as_ref();
        let others_path = dir.join("others");
        let others = fs::read_to_string(&others_path).map_err(|e| {
            Error::Format(format!(
                "missing or unreadable index component {}: {}",
                others_path.display(),
                e
            ))
        })?;

        let mut lines = others.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::Format(format!("{}: empty file", others_path.display())))?;
        let fields = header
            .split_whitespace()
            .map(str::parse::<i64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Format(format!("{}: malformed header: {}", others_path.display(), e)))?;
        let [len, occ_size, end_pos, m, save_code] = fields[..] else {
            return Err(Error::Format(format!(
                "{}: header must hold 5 fields, found {}",
                others_path.display(),
                fields.len()
            )));
        };
        if len < 1 || m < 1 || end_pos < 0 || end_pos >= len {
            return Err(Error::Format(format!(
                "{}: inconsistent header values",
                others_path.display()
            )));
        }
        if occ_size < (len - 1) / m + 1 {
            return Err(Error::Format(format!(
                "{}: occurrence table too small for text length {} at ratio {}",
                others_path.display(),
                len,
                m
            )));
        }
        let option = SaveOption::from_code(save_code)?;

        let mut symbols = Vec::new();
        let mut freq = Box::new([0 as Idx; 256]);
        let mut c = Box::new([0 as Idx; 256]);
        let mut ep = Box::new([0 as Idx; 256]);
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let mut chars = line.chars();
            let symbol = match chars.next() {
                Some(ch) if ch.is_ascii() => ch as u8,
                _ => {
                    return Err(Error::Format(format!(
                        "{}: non-ASCII symbol in line {:?}",
                        others_path.display(),
                        line
                    )))
                }
            };
            let values = chars
                .as_str()
                .split_whitespace()
                .map(str::parse::<i64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    Error::Format(format!(
                        "{}: malformed symbol line {:?}: {}",
                        others_path.display(),
                        line,
                        e
                    ))
                })?;
            let [symbol_freq, symbol_c, symbol_ep] = values[..] else {
                return Err(Error::Format(format!(
                    "{}: symbol line {:?} must hold 3 values",
                    others_path.display(),
                    line
                )));
            };
            if symbols.last().is_some_and(|&prev| prev >= symbol) {
                return Err(Error::Format(format!(
                    "{}: symbols out of order at {:?}",
                    others_path.display(),
                    symbol as char
                )));
            }
            symbols.push(symbol);
            freq[symbol as usize] = symbol_freq;
            c[symbol as usize] = symbol_c;
            ep[symbol as usize] = symbol_ep;
        }
        if symbols.is_empty() {
            return Err(Error::Format(format!(
                "{}: no symbol lines",
                others_path.display()
            )));
        }

        let n = len as usize;
        let (main_parts, occ_rows) = rayon::join(
            || {
                let (bwt, (sa, seq)) = rayon::join(
                    || read_raw(dir.join("bwt"), n),
                    || {
                        rayon::join(
                            || {
                                if option != SaveOption::CountOnly {
                                    read_ints(dir.join("sa"), n)
                                } else {
                                    Ok(Vec::new())
                                }
                            },
                            || {
                                if option == SaveOption::Full {
                                    read_raw(dir.join("seq"), n)
                                } else {
                                    Ok(Vec::new())
                                }
                            },
                        )
                    },
                );
                Ok::<_, Error>((bwt?, sa?, seq?))
            },
            || {
                symbols
                    .par_iter()
                    .map(|&s| {
                        let row = read_ints(dir.join(format!("occ.{}", s as char)), occ_size as usize)?;
                        Ok((s, row))
                    })
                    .collect::<Result<Vec<_>, Error>>()
            },
        );
        let (bwt, sa, seq) = main_parts?;
        let mut occ: Vec<Vec<Idx>> = vec![Vec::new(); 256];
        for (s, row) in occ_rows? {
            occ[s as usize] = row;
        }

        Ok(CompressedIndex {
            seq,
            bwt,
            sa,
            ssa: Vec::new(),
            occ,
            symbols,
            freq,
            c,
            ep,
            len,
            occ_size,
            end_pos,
            m,
            orientation,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            ids: Vec::new(),
            lens: Vec::new(),
            input_file: None,
        })
    }
}

fn encode_ints(values: &[Idx]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 8);
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

fn read_raw(path: PathBuf, expected: usize) -> Result<Vec<u8>, Error> {
    let data = fs::read(&path).map_err(|e| {
        Error::Format(format!(
            "missing or unreadable index component {}: {}",
            path.display(),
            e
        ))
    })?;
    if data.len() != expected {
        return Err(Error::Format(format!(
            "{}: expected {} bytes, found {}",
            path.display(),
            expected,
            data.len()
        )));
    }
    Ok(data)
}

fn read_ints(path: PathBuf, expected: usize) -> Result<Vec<Idx>, Error> {
    let data = fs::read(&path).map_err(|e| {
        Error::Format(format!(
            "missing or unreadable index component {}: {}",
            path.display(),
            e
        ))
    })?;
    if data.len() != expected * 8 {
        return Err(Error::Format(format!(
            "{}: expected {} bytes, found {}",
            path.display(),
            expected * 8,
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(8)
        .map(|chunk| Idx::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}
