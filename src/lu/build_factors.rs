// Copyright (C) 2016-2018 ERGO-Code
// Copyright (C) 2022-2023 Richard Lincoln
// Copyright (C) 2026 The etalu developers

use crate::lu::def::*;
use crate::lu::file::{file_compress, file_empty};
use crate::lu::lu::*;
use log::debug;

// Build the data structures for L, U, R and the permutations.
//
// The factorization is maintained in the form
//
//     P_r * B * P_c = L * R_1^-1 * ... * R_t^-1 * V * D
//
// in pivot order (product form etas appear after V*D instead). The
// permutations are stored as follows:
//
//     permute[row] = pivot position of natural row `row`,
//     permute_back[pos] = natural row of pivot position `pos < m`,
//     pivot_column[k] = pivot position of basis column `k`,
//     pivot_column_back[pos] = basis column of pivot position `pos`.
//
// Pivot positions m..max_extra are handed out one per Forrest-Tomlin update.
// `permute` and `permute_back` are the identity on them, so both pairs stay
// inverse over 0..rows_extra. A retired position has no basis column.

/// Factors computed by [`factorize`](crate::lu::factorize) in elimination
/// step numbering.
pub(crate) struct Factors {
    pub(crate) m: usize,
    pub(crate) num_slacks: usize,
    /// Elimination step of each natural row.
    pub(crate) row_step: Vec<usize>,
    /// Elimination step of each basis column.
    pub(crate) col_step: Vec<usize>,
    /// L by step, in natural row indices.
    pub(crate) l_begin: Vec<usize>,
    pub(crate) l_index: Vec<usize>,
    pub(crate) l_value: Vec<f64>,
    /// U by step, row steps and unscaled values.
    pub(crate) uc_begin: Vec<usize>,
    pub(crate) uc_row: Vec<usize>,
    pub(crate) uc_value: Vec<f64>,
    pub(crate) diag: Vec<f64>,
}

/// Install freshly computed factors, sizing all storage for up to
/// `maximum_pivots` updates.
pub(crate) fn build_factors(lu: &mut LU, f: Factors) {
    let m = f.m;
    let max_eta = lu.maximum_pivots;
    let max_extra = m + max_eta;
    let l_nz = f.l_index.len();
    let u_nz = f.uc_row.len();
    let area = lu.area_factor;

    // A Forrest-Tomlin update appends a column of up to m entries to U and a
    // product form update an eta of up to m entries to R.
    let update_fill = max_eta * usize::min(m, UPDATE_FILL);
    let u_mem = u_nz + (area * (u_nz + m + update_fill) as f64) as usize;
    let w_mem = u_mem + PAD * max_extra;
    let r_mem = m + (area * (l_nz + u_nz + m + update_fill) as f64) as usize;
    let rt_mem = r_mem + PAD * max_extra;

    lu.m = m;
    lu.max_extra = max_extra;
    lu.max_eta = max_eta;
    lu.rows_extra = m;
    lu.num_slacks = f.num_slacks;
    lu.num_pivots = 0;
    lu.num_eta = 0;
    lu.l_nz = l_nz;
    lu.spike = Spike::default();

    // Permutations //
    resize(&mut lu.permute, max_extra);
    resize(&mut lu.permute_back, max_extra);
    resize(&mut lu.pivot_column, m);
    resize(&mut lu.pivot_column_back, max_extra);
    for i in 0..m {
        lu.permute[i] = f.row_step[i];
        lu.permute_back[f.row_step[i]] = i;
        lu.pivot_column[i] = f.col_step[i];
        lu.pivot_column_back[f.col_step[i]] = i;
    }
    for e in m..max_extra {
        lu.permute[e] = e;
        lu.permute_back[e] = e;
        lu.pivot_column_back[e] = NONE;
    }

    // L //
    lu.l_begin = f.l_begin;
    lu.l_value = f.l_value;
    lu.l_index = f.l_index;
    for i in lu.l_index.iter_mut() {
        *i = f.row_step[*i];
    }
    lu.l_row_copy = false;

    // U, columnwise //
    resize(&mut lu.u_begin, max_extra + 1);
    resize(&mut lu.u_end, max_extra + 1);
    resize(&mut lu.u_next, max_extra + 1);
    resize(&mut lu.u_prev, max_extra + 1);
    resize(&mut lu.u_index, u_mem);
    resize(&mut lu.u_value, u_mem);
    resize(&mut lu.pivot_recip, max_extra);
    file_empty(
        max_extra,
        &mut lu.u_begin,
        &mut lu.u_end,
        &mut lu.u_next,
        &mut lu.u_prev,
        u_mem,
    );
    let mut put = 0;
    for s in 0..m {
        let recip = 1.0 / f.diag[s];
        lu.pivot_recip[s] = recip;
        lu.u_begin[s] = put;
        for p in f.uc_begin[s]..f.uc_begin[s + 1] {
            lu.u_index[put] = f.uc_row[p];
            lu.u_value[put] = f.uc_value[p] * recip;
            put += 1;
        }
        lu.u_end[s] = put;
    }
    for e in m..max_extra {
        lu.u_begin[e] = put;
        lu.u_end[e] = put;
    }
    lu.u_begin[max_extra] = put;

    // U, rowwise //
    resize(&mut lu.w_begin, max_extra + 1);
    resize(&mut lu.w_end, max_extra + 1);
    resize(&mut lu.w_next, max_extra + 1);
    resize(&mut lu.w_prev, max_extra + 1);
    resize(&mut lu.w_index, w_mem);
    resize(&mut lu.w_cross, w_mem);
    build_row_view(lu);

    // R //
    resize(&mut lu.r_begin, max_eta + 1);
    resize(&mut lu.r_index, r_mem);
    resize(&mut lu.r_value, r_mem);
    resize(&mut lu.eta_row, max_eta);
    resize(&mut lu.eta_pivot, max_eta);
    resize(&mut lu.rt_begin, max_extra + 1);
    resize(&mut lu.rt_end, max_extra + 1);
    resize(&mut lu.rt_next, max_extra + 1);
    resize(&mut lu.rt_prev, max_extra + 1);
    resize(&mut lu.rt_index, rt_mem);
    resize(&mut lu.rt_value, rt_mem);
    file_empty(
        max_extra,
        &mut lu.rt_begin,
        &mut lu.rt_end,
        &mut lu.rt_next,
        &mut lu.rt_prev,
        rt_mem,
    );
    lu.rt_valid = true;

    resize(&mut lu.iwork0, max_extra);
    lu.factorized = true;
}

/// Rebuild the row file of U and the cross references from the column file.
///
/// Rows are laid out in pivot order, each live row followed by `PAD` free
/// elements.
pub(crate) fn build_row_view(lu: &mut LU) {
    let nlines = lu.max_extra;
    let w_mem = lu.w_index.len();
    let rows_extra = lu.rows_extra;
    let u_begin = &lu.u_begin;
    let u_end = &lu.u_end;
    let u_index = &lu.u_index;
    let w_begin = &mut lu.w_begin;
    let w_end = &mut lu.w_end;
    let w_index = &mut lu.w_index;
    let w_cross = &mut lu.w_cross;

    file_empty(nlines, w_begin, w_end, &mut lu.w_next, &mut lu.w_prev, w_mem);

    // count into w_end
    for j in 0..rows_extra {
        for pos in u_begin[j]..u_end[j] {
            w_end[u_index[pos]] += 1;
        }
    }
    let mut put = 0;
    for i in 0..nlines {
        let count = w_end[i];
        w_begin[i] = put;
        w_end[i] = put;
        put += count;
        if i < rows_extra {
            put += PAD;
        }
    }
    assert!(put <= w_mem);
    w_begin[nlines] = put;

    for j in 0..rows_extra {
        for pos in u_begin[j]..u_end[j] {
            let i = u_index[pos];
            let put = w_end[i];
            w_index[put] = j;
            w_cross[put] = pos;
            w_end[i] += 1;
        }
    }
}

/// Squeeze the gaps left by retired columns out of the column file of U.
/// The row view points into the column file and is rebuilt; a stored
/// candidate column is lost.
pub(crate) fn compress_u(lu: &mut LU) {
    let nlines = lu.max_extra;
    let nz = file_compress(
        nlines,
        &mut lu.u_begin,
        &mut lu.u_end,
        &lu.u_next,
        &mut lu.u_index,
        &mut lu.u_value,
        0.0,
        0,
    );
    build_row_view(lu);
    lu.spike = Spike::default();
    debug!("column file of U compressed to {} entries", nz);
}
