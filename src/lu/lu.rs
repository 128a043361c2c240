// Copyright (C) 2016-2018 ERGO-Code
// Copyright (C) 2022-2023 Richard Lincoln
// Copyright (C) 2026 The etalu developers

use crate::lu::def::*;

/// Scratch arrays for the sparse and sparsish strategies. Allocated by
/// [`go_sparse`](crate::lu::go_sparse) and dropped when sparse solves are
/// switched off.
#[derive(Debug, Clone, Default)]
pub(crate) struct SparseArea {
    /// Depth first search stack and output list, size `max_extra`.
    pub(crate) xi: Vec<usize>,
    /// Position within the adjacency list of each stack entry.
    pub(crate) pstack: Vec<usize>,
    /// Node `j` is marked iff `marked[j] == marker`.
    pub(crate) marked: Vec<usize>,
    pub(crate) marker: usize,
    /// One bit per pivot position, eight positions per word.
    pub(crate) bits: Vec<u8>,
    /// Position of each index within a nonzero list.
    pub(crate) spare: Vec<usize>,
}

impl SparseArea {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            xi: vec![0; n],
            pstack: vec![0; n],
            marked: vec![0; n],
            marker: 0,
            bits: vec![0; (n >> BITS_SHIFT) + 1],
            spare: vec![0; n],
        }
    }

    /// Start a new marking pass.
    pub(crate) fn next_marker(&mut self) -> usize {
        self.marker += 1;
        self.marker
    }
}

/// Nonzero counts seen at the stages of FTRAN and BTRAN, and the density
/// growth factors derived from them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Statistics {
    pub(crate) ftran_count_input: f64,
    pub(crate) ftran_count_after_l: f64,
    pub(crate) ftran_count_after_r: f64,
    pub(crate) ftran_count_after_u: f64,
    pub(crate) btran_count_input: f64,
    pub(crate) btran_count_after_u: f64,
    pub(crate) btran_count_after_r: f64,
    pub(crate) btran_count_after_l: f64,

    pub(crate) number_ftran_counts: usize,
    pub(crate) number_btran_counts: usize,

    pub(crate) ftran_average_after_l: f64,
    pub(crate) ftran_average_after_r: f64,
    pub(crate) ftran_average_after_u: f64,
    pub(crate) btran_average_after_u: f64,
    pub(crate) btran_average_after_r: f64,
    pub(crate) btran_average_after_l: f64,
}

/// Candidate U column left at the tail of the column file by FTRAN.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Spike {
    pub(crate) valid: bool,
    pub(crate) no_room: bool,
    pub(crate) begin: usize,
    pub(crate) len: usize,
}

/// Factorization state.
///
/// All indices into L, U and R are positions in *pivot order*. Natural rows
/// `0..m` map to pivot positions through `permute`; basis positions `0..m` map
/// to pivot positions through `pivot_column`. Each Forrest-Tomlin update
/// retires the pivot position of the replaced column and appends a new one at
/// `rows_extra`, so pivot positions range over `0..max_extra`.
///
/// Storage of the factors:
///
/// - L is unit lower triangular. Column `i` (multipliers below pivot `i`) is
///   `l_index[l_begin[i]..l_begin[i+1]]`, `l_value[..]`. When the row copy is
///   built, row `r` is `lt_index[lt_begin[r]..lt_begin[r+1]]`, `lt_value[..]`.
///
/// - U is stored as `U = V*D`, V unit upper triangular, D diagonal with
///   `pivot_recip[i] = 1/D[i]`. Column `i` of V is the line `i` of the column
///   file `u_begin`, `u_end`, `u_next`, `u_prev`, `u_index`, `u_value`.
///   Row `i` of V is line `i` of the row file `w_begin`, `w_end`, `w_next`,
///   `w_prev`, `w_index`; `w_cross[s]` is the column file slot holding the
///   value of row slot `s`.
///
/// - R holds one eta per update. Eta `t` has pivot `eta_row[t]` and entries
///   `r_index[r_begin[t]..r_begin[t+1]]`, `r_value[..]`. A Forrest-Tomlin eta
///   computes position `m+t` from its pivot and clears the pivot; a product
///   form eta rescales its pivot by `eta_pivot[t]`. The Forrest-Tomlin etas
///   are also kept column-wise in the file `rt_*` while `rt_valid`.
#[derive(Debug, Clone, Default)]
pub(crate) struct LU {
    // parameters //
    pub(crate) pivot_tolerance: f64,
    pub(crate) zero_tolerance: f64,
    pub(crate) slack_value: f64,
    pub(crate) maximum_pivots: usize,
    pub(crate) sparse_setting: SparseSetting,
    pub(crate) do_forrest_tomlin: bool,
    pub(crate) relax_check: f64,
    pub(crate) area_factor: f64,
    pub(crate) collect_statistics: bool,

    // dimensions //
    pub(crate) m: usize,
    pub(crate) max_extra: usize, // m + maximum_pivots at factorization
    pub(crate) max_eta: usize,   // eta capacity at factorization
    pub(crate) rows_extra: usize,
    pub(crate) num_slacks: usize,
    pub(crate) num_pivots: usize,
    pub(crate) num_eta: usize,
    pub(crate) factorized: bool,

    pub(crate) sparse_threshold: usize,
    pub(crate) sparse_threshold2: usize,

    // L //
    pub(crate) l_begin: Vec<usize>,
    pub(crate) l_index: Vec<usize>,
    pub(crate) l_value: Vec<f64>,
    pub(crate) lt_begin: Vec<usize>,
    pub(crate) lt_index: Vec<usize>,
    pub(crate) lt_value: Vec<f64>,
    pub(crate) l_row_copy: bool,

    // U //
    pub(crate) u_begin: Vec<usize>,
    pub(crate) u_end: Vec<usize>,
    pub(crate) u_next: Vec<usize>,
    pub(crate) u_prev: Vec<usize>,
    pub(crate) u_index: Vec<usize>,
    pub(crate) u_value: Vec<f64>,
    pub(crate) pivot_recip: Vec<f64>,

    pub(crate) w_begin: Vec<usize>,
    pub(crate) w_end: Vec<usize>,
    pub(crate) w_next: Vec<usize>,
    pub(crate) w_prev: Vec<usize>,
    pub(crate) w_index: Vec<usize>,
    pub(crate) w_cross: Vec<usize>,

    pub(crate) spike: Spike,

    // R //
    pub(crate) r_begin: Vec<usize>,
    pub(crate) r_index: Vec<usize>,
    pub(crate) r_value: Vec<f64>,
    pub(crate) eta_row: Vec<usize>,
    pub(crate) eta_pivot: Vec<f64>,

    pub(crate) rt_begin: Vec<usize>,
    pub(crate) rt_end: Vec<usize>,
    pub(crate) rt_next: Vec<usize>,
    pub(crate) rt_prev: Vec<usize>,
    pub(crate) rt_index: Vec<usize>,
    pub(crate) rt_value: Vec<f64>,
    pub(crate) rt_valid: bool,

    // permutations //
    pub(crate) permute: Vec<usize>,
    pub(crate) permute_back: Vec<usize>,
    pub(crate) pivot_column: Vec<usize>,
    pub(crate) pivot_column_back: Vec<usize>,

    // scratch //
    pub(crate) iwork0: Vec<usize>, // size max_extra, contents undefined
    pub(crate) sparse: Option<SparseArea>,

    // statistics //
    pub(crate) stats: Statistics,
    pub(crate) l_nz: usize, // nz in L excluding diagonal
    pub(crate) nfactorize: usize,
    pub(crate) nupdate_total: usize,
    pub(crate) nforrest_total: usize,
    pub(crate) time_factorize: f64,
    pub(crate) time_solve: f64,
    pub(crate) time_update: f64,
    pub(crate) time_factorize_total: f64,
    pub(crate) time_solve_total: f64,
    pub(crate) time_update_total: f64,
}

impl LU {
    pub(crate) fn new() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            zero_tolerance: DEFAULT_ZERO_TOLERANCE,
            slack_value: 1.0,
            maximum_pivots: DEFAULT_MAXIMUM_PIVOTS,
            sparse_setting: SparseSetting::Auto,
            do_forrest_tomlin: true,
            relax_check: 1.0,
            area_factor: DEFAULT_AREA_FACTOR,
            collect_statistics: true,
            ..Default::default()
        }
    }

    /// Nonzeros currently stored in the column view of U.
    pub(crate) fn u_elements(&self) -> usize {
        (0..self.rows_extra)
            .map(|i| self.u_end[i] - self.u_begin[i])
            .sum()
    }

    /// Nonzeros currently stored in R.
    pub(crate) fn r_elements(&self) -> usize {
        self.r_begin.get(self.num_eta).copied().unwrap_or(0)
    }

    /// Free elements at the tail of the column file.
    pub(crate) fn u_tail_room(&self) -> usize {
        let n = self.max_extra;
        self.u_end[n] - self.u_begin[n]
    }

    /// True when `i` is a pivot position in use.
    pub(crate) fn is_live_pivot(&self, i: usize) -> bool {
        i < self.rows_extra && self.pivot_column_back[i] != NONE
    }
}

/// Set `v` to `len` default values, reusing its capacity.
pub(crate) fn resize<T: Clone + Default>(v: &mut Vec<T>, len: usize) {
    v.clear();
    v.resize(len, T::default());
}
