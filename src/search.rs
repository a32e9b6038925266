use crate::index::{CompressedIndex, Orientation};
use crate::{Error, Idx};

/// The suffix-array interval produced by narrowing the index over a query.
///
/// The interval `[sp, ep]` covers one suffix-array row per occurrence;
/// `count` is zero when the query does not occur.
pub struct Match<'a> {
    index: &'a CompressedIndex,
    sp: Idx,
    ep: Idx,
    last: usize,
}

impl<'a> Match<'a> {
    /// The raw `(sp, ep)` interval. `sp > ep` means no occurrence.
    pub fn range(&self) -> (Idx, Idx) {
        (self.sp, self.ep)
    }

    /// Number of occurrences of the query in the indexed text.
    pub fn count(&self) -> Idx {
        (self.ep - self.sp + 1).max(0)
    }

    /// Index of the last query symbol examined before the interval settled.
    pub fn last_index(&self) -> usize {
        self.last
    }

    /// Starting positions of the occurrences in the indexed text, in
    /// suffix-array order. `None` when the suffix array was not restored
    /// (count-only reload).
    pub fn locate(&self) -> Option<Vec<Idx>> {
        if self.index.sa.is_empty() {
            return None;
        }
        if self.sp > self.ep {
            return Some(Vec::new());
        }
        Some(self.index.sa[self.sp as usize..=self.ep as usize].to_vec())
    }
}

impl CompressedIndex {
    /// Narrow the suffix-array interval over `query`.
    ///
    /// Fails with [`Error::Argument`] on an empty query and with
    /// [`Error::UnknownSymbol`] if a query symbol does not occur in the
    /// indexed text.
    pub fn search(&self, query: &[u8]) -> Result<Match<'_>, Error> {
        if query.is_empty() {
            return Err(Error::Argument("empty query".to_string()));
        }
        let (sp, ep, last) = match self.orientation {
            Orientation::Forward => self.narrow_backward(query)?,
            Orientation::Reversed => self.narrow_forward(query)?,
        };
        Ok(Match {
            index: self,
            sp,
            ep,
            last,
        })
    }

    pub(crate) fn init(&self, symbol: u8) -> Result<(Idx, Idx), Error> {
        if !self.contains(symbol) {
            return Err(Error::UnknownSymbol(symbol));
        }
        Ok((self.c[symbol as usize], self.ep[symbol as usize]))
    }

    pub(crate) fn step(&self, symbol: u8, sp: Idx, ep: Idx) -> Result<(Idx, Idx), Error> {
        if !self.contains(symbol) {
            return Err(Error::UnknownSymbol(symbol));
        }
        let offset = self.c[symbol as usize];
        Ok((
            offset + self.occurrence(symbol, sp - 1),
            offset + self.occurrence(symbol, ep) - 1,
        ))
    }

    /// Narrow over `slice`, consuming symbols from last to first.
    pub(crate) fn narrow_backward(&self, slice: &[u8]) -> Result<(Idx, Idx, usize), Error> {
        let mut i = slice.len() - 1;
        let (mut sp, mut ep) = self.init(slice[i])?;
        while sp <= ep && i > 0 {
            i -= 1;
            (sp, ep) = self.step(slice[i], sp, ep)?;
        }
        Ok((sp, ep, i))
    }

    /// Narrow over `slice`, consuming symbols from first to last.
    pub(crate) fn narrow_forward(&self, slice: &[u8]) -> Result<(Idx, Idx, usize), Error> {
        let mut i = 0;
        let (mut sp, mut ep) = self.init(slice[i])?;
        while sp <= ep && i + 1 < slice.len() {
            i += 1;
            (sp, ep) = self.step(slice[i], sp, ep)?;
        }
        Ok((sp, ep, i))
    }
}
