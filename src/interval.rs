//! Closed genomic intervals: exons, introns, promoters and poly-A regions.

use std::fmt;

/// A closed interval `[start, stop]` on one contig/strand, 0-based.
///
/// Ordering is by `(start, stop)`, which is the order exons take within a
/// transcript regardless of strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: i32,
    pub stop: i32,
}

/// An exon in a splice graph or transcript.
pub type Exon = Interval;

impl Interval {
    #[must_use]
    pub const fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }

    /// Number of bases covered (both ends inclusive).
    #[must_use]
    pub fn len(&self) -> u64 {
        (self.stop - self.start + 1).max(0) as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }

    #[must_use]
    pub fn contains(&self, other: &Interval) -> bool {
        other.start >= self.start && other.stop <= self.stop
    }

    #[must_use]
    pub fn overlaps(&self, start: i32, stop: i32) -> bool {
        self.start <= stop && start <= self.stop
    }
}

impl From<(i32, i32)> for Interval {
    fn from((start, stop): (i32, i32)) -> Self {
        Self { start, stop }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}

/// Total number of bases across a set of exons.
#[must_use]
pub fn total_length(exons: &[Exon]) -> u64 {
    exons.iter().map(Interval::len).sum()
}

/// Introns implied by consecutive exons of a position-sorted exon chain.
#[must_use]
pub fn introns_between(exons: &[Exon]) -> Vec<Interval> {
    exons
        .windows(2)
        .map(|w| Interval::new(w[0].stop + 1, w[1].start - 1))
        .collect()
}
