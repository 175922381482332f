//! Coefficient arena slicing.
//!
//! A composite map owns one flat coefficient buffer; each component reads a
//! contiguous, non-overlapping [`CoeffRange`] of it. Ranges are computed once
//! by [`CoeffLayout`] from the per-component counts and every access is
//! bounds-checked, so a component can never observe a neighbour's slice.
use ndarray::{s, Array1, ArrayView1, ArrayViewMut1, ArrayViewMut2};

use crate::map::errors::{MapError, MapResult};

/// Half-open range `[start, end)` into a flat coefficient buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoeffRange {
    pub start: usize,
    pub end: usize,
}

impl CoeffRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn check(&self, len: usize) -> MapResult<()> {
        if self.end > len || self.start > self.end {
            return Err(MapError::CoeffRangeOutOfBounds { start: self.start, end: self.end, len });
        }
        Ok(())
    }

    /// Read-only view of this range of `buf`.
    pub fn view<'a>(&self, buf: &'a Array1<f64>) -> MapResult<ArrayView1<'a, f64>> {
        self.check(buf.len())?;
        Ok(buf.slice(s![self.start..self.end]))
    }

    /// Sub-view of an existing view.
    pub fn sub_view<'a>(&self, buf: ArrayView1<'a, f64>) -> MapResult<ArrayView1<'a, f64>> {
        self.check(buf.len())?;
        Ok(buf.slice_move(s![self.start..self.end]))
    }

    /// Mutable view of this range of `buf`.
    pub fn view_mut<'a>(&self, buf: &'a mut Array1<f64>) -> MapResult<ArrayViewMut1<'a, f64>> {
        self.check(buf.len())?;
        Ok(buf.slice_mut(s![self.start..self.end]))
    }

    /// Mutable band of rows `[start, end)` of a `(num_coeffs, n_pts)` output.
    pub fn rows_mut<'a>(
        &self, out: &'a mut ArrayViewMut2<'_, f64>,
    ) -> MapResult<ArrayViewMut2<'a, f64>> {
        self.check(out.nrows())?;
        Ok(out.slice_mut(s![self.start..self.end, ..]))
    }
}

/// Contiguous ranges for a sequence of coefficient counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoeffLayout {
    ranges: Vec<CoeffRange>,
    total: usize,
}

impl CoeffLayout {
    pub fn from_counts<I: IntoIterator<Item = usize>>(counts: I) -> Self {
        let mut ranges = Vec::new();
        let mut total = 0;
        for count in counts {
            ranges.push(CoeffRange { start: total, end: total + count });
            total += count;
        }
        CoeffLayout { ranges, total }
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn ranges(&self) -> &[CoeffRange] {
        &self.ranges
    }

    pub fn range(&self, index: usize) -> MapResult<CoeffRange> {
        self.ranges
            .get(index)
            .copied()
            .ok_or(MapError::ComponentIndexOutOfRange { index, count: self.ranges.len() })
    }
}
