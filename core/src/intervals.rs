//! Ordered, disjoint real intervals with ULP-tolerant merge operations (C2).
//!
//! Public API policy
//! -----------------
//! The reference implementation backs this with a fixed-size ring (max 400
//! intervals) and aborts the process on overflow. This implementation uses a
//! growable `Vec<Interval>` (per the "owning containers over raw arrays"
//! design note) but still enforces a configurable cap and reports
//! [`BandsError::CapacityExceeded`] rather than silently truncating or
//! panicking, so pathological fragmentation is observable.

use crate::error::BandsError;
use crate::geom::util;

/// Default capacity cap, matching the reference's `max_intervals = 400`.
pub const DEFAULT_CAPACITY: usize = 400;

/// A closed interval `[lo, hi]`. `lo > hi` denotes the empty interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    #[inline]
    pub fn new(lo: f64, hi: f64) -> Interval {
        Interval { lo, hi }
    }

    #[inline]
    pub fn empty() -> Interval {
        Interval { lo: 1.0, hi: 0.0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.lo <= self.hi)
    }

    /// A degenerate interval narrower than `width` (an exact point when
    /// `width == 0`).
    #[inline]
    pub fn is_single(&self, width: f64) -> bool {
        !self.is_empty() && self.hi - self.lo <= width
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        !self.is_empty() && self.lo <= x && x <= self.hi
    }
}

/// An ordered, pairwise-disjoint sequence of closed intervals: for all `i`,
/// `ranges[i].hi < ranges[i + 1].lo`.
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    ranges: Vec<Interval>,
    capacity: usize,
}

impl IntervalSet {
    pub fn new() -> IntervalSet {
        IntervalSet {
            ranges: Vec::new(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_capacity(capacity: usize) -> IntervalSet {
        IntervalSet {
            ranges: Vec::new(),
            capacity,
        }
    }

    pub fn from_intervals(ranges: Vec<Interval>) -> IntervalSet {
        IntervalSet {
            ranges,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.ranges
    }

    pub fn get(&self, i: usize) -> Interval {
        self.ranges.get(i).copied().unwrap_or_else(Interval::empty)
    }

    #[inline]
    pub fn membership(&self, x: f64) -> bool {
        self.order(x) >= 0
    }

    /// Index of the interval containing `x` if any (`>= 0`), else
    /// `-(insertion_index + 1)` where `insertion_index` is where an interval
    /// containing `x` would be inserted to keep the set sorted. Callers
    /// (`union`, `diff`) rely on this exact encoding.
    ///
    /// Binary search over the sorted, disjoint `ranges`: at each probe either
    /// `x` is inside the probed interval, below it (search the left half),
    /// or above it (search the right half, since disjointness guarantees
    /// `x > r.hi` whenever `x` is not below `r.lo` and not contained).
    pub fn order(&self, x: f64) -> i64 {
        let mut lo = 0usize;
        let mut hi = self.ranges.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let r = self.ranges[mid];
            if r.contains(x) {
                return mid as i64;
            } else if x < r.lo {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        -(lo as i64) - 1
    }

    fn insert_raw(&mut self, i: usize, iv: Interval) -> Result<(), BandsError> {
        if iv.is_empty() {
            return Ok(());
        }
        if self.ranges.len() >= self.capacity {
            return Err(BandsError::CapacityExceeded {
                limit: self.capacity,
            });
        }
        let i = i.min(self.ranges.len());
        self.ranges.insert(i, iv);
        Ok(())
    }

    fn remove_range(&mut self, start: usize, len: usize) {
        let end = (start + len).min(self.ranges.len());
        let start = start.min(end);
        self.ranges.drain(start..end);
    }

    /// Union this set with `iv`, merging any overlapping/touching intervals.
    /// Rejects (no-ops) an inverted `iv` (`iv.lo > iv.hi`).
    pub fn union(&mut self, iv: Interval) -> Result<(), BandsError> {
        if iv.is_empty() {
            return Ok(());
        }
        let i_low = self.order(iv.lo);
        let i_high = self.order(iv.hi);

        let (lo, start) = if i_low < 0 {
            (iv.lo, (-(i_low + 1)) as usize)
        } else {
            (self.ranges[i_low as usize].lo, i_low as usize)
        };
        let (hi, end) = if i_high < 0 {
            (iv.hi, ((-(i_high + 1)) as usize).saturating_sub(1))
        } else {
            (self.ranges[i_high as usize].hi, i_high as usize)
        };

        let end_excl = end + 1;
        let len = end_excl.saturating_sub(start);
        self.remove_range(start, len);
        self.insert_raw(start, Interval::new(lo, hi))
    }

    pub fn unions(&mut self, other: &IntervalSet) -> Result<(), BandsError> {
        for iv in &other.ranges.clone() {
            self.union(*iv)?;
        }
        Ok(())
    }

    /// Union using ULP-tolerant boundary comparisons: intervals whose
    /// endpoints are within 10 ULP of touching/overlapping are merged.
    pub fn almost_union(&mut self, mut l: f64, mut u: f64) -> Result<(), BandsError> {
        if !util::almost_less(l, u) {
            return Ok(());
        }
        let existing = std::mem::take(&mut self.ranges);
        let mut go = false;
        for ii in existing {
            if go {
                self.union(ii)?;
                continue;
            }
            if (util::almost_leq(ii.lo, l) && util::almost_leq(l, ii.hi))
                || (util::almost_leq(l, ii.lo) && util::almost_leq(ii.lo, u))
            {
                l = util::min(ii.lo, l);
                u = util::max(ii.hi, u);
            } else if util::almost_less(u, ii.lo) {
                self.union(Interval::new(l, u))?;
                self.union(ii)?;
                go = true;
            } else {
                self.union(ii)?;
            }
        }
        if !go {
            self.union(Interval::new(l, u))?;
        }
        Ok(())
    }

    /// Replace `self` with the ULP-tolerant intersection of `self` and
    /// `other`. `other` is unmodified.
    pub fn intersect_almost(&mut self, other: &IntervalSet) -> Result<(), BandsError> {
        let m = std::mem::take(&mut self.ranges);
        if m.is_empty() || other.ranges.is_empty() {
            return Ok(());
        }
        let (mut i, mut j) = (0usize, 0usize);
        while i < m.len() && j < other.ranges.len() {
            let ii = m[i];
            let jj = other.ranges[j];
            if util::almost_leq(jj.lo, ii.lo) && util::almost_less(ii.lo, jj.hi) {
                if util::almost_leq(ii.hi, jj.hi) {
                    self.union(ii)?;
                    i += 1;
                } else {
                    self.union(Interval::new(ii.lo, jj.hi))?;
                    j += 1;
                }
            } else if util::almost_leq(ii.lo, jj.lo) && util::almost_less(jj.lo, ii.hi) {
                if util::almost_leq(jj.hi, ii.hi) {
                    self.union(jj)?;
                    j += 1;
                } else {
                    self.union(Interval::new(jj.lo, ii.hi))?;
                    i += 1;
                }
            } else if util::almost_leq(ii.hi, jj.lo) {
                i += 1;
            } else if util::almost_leq(jj.hi, ii.lo) {
                j += 1;
            } else {
                // Disjoint, neither boundary case applies (should not
                // happen given the branches above, but avoid looping).
                i += 1;
            }
        }
        Ok(())
    }

    /// Remove the *open* interval `iv` from the set: `[1,2] \ (1,2) = {[1,1],
    /// [2,2]}`.
    pub fn difference(&mut self, iv: Interval) -> Result<(), BandsError> {
        if iv.is_empty() || iv.is_single(0.0) {
            return Ok(());
        }
        let i_low = self.order(iv.lo);
        let i_high = self.order(iv.hi);

        if i_low >= 0 && i_low == i_high {
            let idx = i_low as usize;
            let hi = self.ranges[idx].hi;
            let lo = self.ranges[idx].lo;
            self.ranges[idx] = Interval::new(lo, iv.lo);
            return self.insert_raw(idx + 1, Interval::new(iv.hi, hi));
        }

        let start;
        if i_low < 0 {
            start = (-(i_low + 1)) as usize;
        } else {
            let idx = i_low as usize;
            let lo = self.ranges[idx].lo;
            self.ranges[idx] = Interval::new(lo, iv.lo);
            start = idx + 1;
        }

        let end;
        if i_high < 0 {
            end = ((-(i_high + 1)) as i64 - 1).max(start as i64 - 1) as usize;
        } else {
            let idx = i_high as usize;
            let hi = self.ranges[idx].hi;
            self.ranges[idx] = Interval::new(iv.hi, hi);
            end = idx.saturating_sub(1);
        }

        if end + 1 > start {
            self.remove_range(start, end + 1 - start);
        }
        Ok(())
    }

    pub fn diffs(&mut self, other: &IntervalSet) -> Result<(), BandsError> {
        for iv in &other.ranges.clone() {
            self.difference(*iv)?;
        }
        Ok(())
    }

    /// Drop any interval narrower than `width`.
    pub fn sweep_singletons(&mut self, width: f64) {
        self.ranges.retain(|iv| !iv.is_single(width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ivs(pairs: &[(f64, f64)]) -> IntervalSet {
        IntervalSet::from_intervals(pairs.iter().map(|&(l, h)| Interval::new(l, h)).collect())
    }

    #[test]
    fn union_merges_overlap_s5() {
        let mut s = ivs(&[(1.0, 2.0), (3.0, 4.0)]);
        s.union(Interval::new(0.5, 3.0)).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(0), Interval::new(0.5, 4.0));
    }

    #[test]
    fn union_rejects_inverted_interval() {
        let mut s = ivs(&[(1.0, 2.0)]);
        s.union(Interval::new(5.0, 3.0)).unwrap();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn difference_splits_into_endpoints() {
        let mut s = ivs(&[(1.0, 2.0)]);
        s.difference(Interval::new(1.0, 2.0)).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(0), Interval::new(1.0, 1.0));
        assert_eq!(s.get(1), Interval::new(2.0, 2.0));
    }

    #[test]
    fn union_then_difference_is_identity_on_exterior_interval() {
        let mut s = ivs(&[(1.0, 2.0), (5.0, 6.0)]);
        let before = s.intervals().to_vec();
        s.union(Interval::new(3.0, 4.0)).unwrap();
        s.difference(Interval::new(3.0, 4.0)).unwrap();
        assert_eq!(s.intervals(), before.as_slice());
    }

    #[test]
    fn membership_uses_binary_ordering() {
        let s = ivs(&[(1.0, 2.0), (4.0, 5.0)]);
        assert!(s.membership(1.5));
        assert!(!s.membership(3.0));
        assert!(s.membership(4.0));
    }

    #[test]
    fn sweep_singletons_drops_narrow_intervals() {
        let mut s = ivs(&[(1.0, 1.0001), (4.0, 5.0)]);
        s.sweep_singletons(0.01);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(0), Interval::new(4.0, 5.0));
    }

    #[test]
    fn capacity_exceeded_is_reported_not_truncated() {
        let mut s = IntervalSet::with_capacity(2);
        s.union(Interval::new(0.0, 1.0)).unwrap();
        s.union(Interval::new(5.0, 6.0)).unwrap();
        let err = s.union(Interval::new(10.0, 11.0));
        assert!(matches!(err, Err(BandsError::CapacityExceeded { limit: 2 })));
    }

    #[test]
    fn intersect_almost_keeps_overlap_only() {
        let mut a = ivs(&[(0.0, 10.0)]);
        let b = ivs(&[(5.0, 15.0)]);
        a.intersect_almost(&b).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a.get(0), Interval::new(5.0, 10.0));
    }
}
