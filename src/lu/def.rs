// Copyright (C) 2016-2018 ERGO-Code
// Copyright (C) 2022-2023 Richard Lincoln
// Copyright (C) 2026 The etalu developers

/// Marks an index slot that does not refer to anything, e.g. the basis
/// position of a retired pivot column.
pub(crate) const NONE: usize = usize::MAX;

/// Stored in place of an exact zero so that a position stays on the nonzero
/// list of a work vector.
pub(crate) const TINY: f64 = 1.0e-100;

/// New pivots below this magnitude are only accepted when they agree with the
/// expected pivot to a very tight relative tolerance.
pub(crate) const SMALL_PIVOT: f64 = 1.0e-9;

/// Number of FTRAN calls after which the density statistics are folded into
/// running averages.
pub(crate) const STATISTICS_WINDOW: usize = 100;

/// Decay applied to the density counts after each averaging step.
pub(crate) const STATISTICS_DECAY: f64 = 0.8;

/// Columns per mark word in the bitmask (sparsish) strategies: 1 << 3 = 8.
pub(crate) const BITS_SHIFT: usize = 3;
pub(crate) const BITS_MASK: usize = (1 << BITS_SHIFT) - 1;

/// Extra elements given to a line of a data file when it is re-appended.
pub(crate) const PAD: usize = 4;
/// Extra space per line in relation to its length when a file is compressed.
pub(crate) const STRETCH: f64 = 0.3;

/// Entries reserved per allowed update in the U and R areas, beyond the
/// number of rows when that is smaller. Scaled by the area factor.
pub(crate) const UPDATE_FILL: usize = 1000;

// Weights of the R-step cost model. They are empirical performance knobs and
// carry no correctness meaning.
pub(crate) const COST_SET_MARK: f64 = 0.1;
pub(crate) const COST_TEST1: f64 = 1.0;
pub(crate) const COST_TEST_PIVOT: f64 = 2.0;
pub(crate) const COST_START_DOT: f64 = 2.0;

pub(crate) const DEFAULT_PIVOT_TOLERANCE: f64 = 0.1;
pub(crate) const DEFAULT_ZERO_TOLERANCE: f64 = 1.0e-13;
pub(crate) const DEFAULT_MAXIMUM_PIVOTS: usize = 200;
pub(crate) const DEFAULT_AREA_FACTOR: f64 = 2.0;

/// A pivot of the initial factorization must be larger than this in
/// absolute value.
pub(crate) const ABS_PIVOT_TOLERANCE: f64 = 1.0e-11;

/// Traversal used for a triangular solve with U (or L transposed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Scan every pivot position, testing each value.
    Densish,
    /// Scan only bitmask words that carry a mark.
    Sparsish,
    /// Depth first search of the reachable positions.
    Sparse,
}

/// Application of the Forrest-Tomlin etas in FTRAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RMethod {
    /// Scatter through the column copy of R, tracking the nonzero list with
    /// marks from the sparse area.
    MarkedScatter,
    /// Scatter through the column copy of R and pack the list afterwards.
    Scatter,
    /// One dot product per eta.
    DotProduct,
}

/// How the sparse thresholds are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SparseSetting {
    /// Thresholds derived from the number of rows at each factorization.
    #[default]
    Auto,
    /// Sparse solves switched off, no sparse area and no row copy of L.
    Disabled,
    /// Fixed thresholds for the sparse and the sparsish solves.
    Fixed(usize, usize),
}
