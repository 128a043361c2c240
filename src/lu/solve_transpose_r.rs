// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::def::TINY;
use crate::lu::lu::*;

// Apply the Forrest-Tomlin etas transposed, newest first. For eta `t` with
// pivot r = eta_row[t] and e = m+t:
//
//     x[r] = x[e],    x[j] -= v_j * x[e] for each entry (j, v_j),    x[e] = 0.
//
// The retired pivot r holds zero when its eta is reached, since no later eta
// and no row of U refers to it.

/// Apply R transposed. On return every position at or past `m` is zero.
pub(crate) fn solve_transpose_r(lu: &mut LU, work: &mut IndexedVector) {
    if lu.num_eta == 0 {
        return;
    }
    let sparse =
        lu.sparse_threshold > 0 && work.num_elements() < lu.sparse_threshold.saturating_mul(4);
    match lu.sparse.take() {
        Some(mut area) if sparse => {
            solve_transpose_r_sparse(lu, &mut area, work);
            lu.sparse = Some(area);
        }
        other => {
            lu.sparse = other;
            solve_transpose_r_densish(lu, work);
        }
    }
}

fn solve_transpose_r_densish(lu: &LU, work: &mut IndexedVector) {
    let m = lu.m;
    let r_begin = &lu.r_begin;
    let r_index = &lu.r_index;
    let r_value = &lu.r_value;
    {
        let lhs = work.dense_vector_mut();
        for t in (0..lu.num_eta).rev() {
            let e = m + t;
            let x = lhs[e];
            if x == 0.0 {
                continue;
            }
            lhs[e] = 0.0;
            lhs[lu.eta_row[t]] = x;
            for pos in r_begin[t]..r_begin[t + 1] {
                lhs[r_index[pos]] -= r_value[pos] * x;
            }
        }
    }
    work.set_num_elements(0);
    work.scan(0, m, lu.zero_tolerance);
}

fn solve_transpose_r_sparse(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let m = lu.m;
    let r_begin = &lu.r_begin;
    let r_index = &lu.r_index;
    let r_value = &lu.r_value;
    let spare = &mut area.spare;
    let (lhs, pattern, nz) = work.parts_mut();

    for k in 0..*nz {
        spare[pattern[k]] = k;
    }
    for t in (0..lu.num_eta).rev() {
        let e = m + t;
        let x = lhs[e];
        if x == 0.0 {
            continue;
        }
        let r = lu.eta_row[t];
        lhs[e] = 0.0;
        lhs[r] = x;
        let slot = spare[e];
        pattern[slot] = r;
        spare[r] = slot;
        for pos in r_begin[t]..r_begin[t + 1] {
            let j = r_index[pos];
            let old = lhs[j];
            let new = old - r_value[pos] * x;
            if old == 0.0 {
                spare[j] = *nz;
                pattern[*nz] = j;
                *nz += 1;
            }
            lhs[j] = if new != 0.0 { new } else { TINY };
        }
    }
    // drop tiny values and entries that cancelled
    let mut put = 0;
    for k in 0..*nz {
        let i = pattern[k];
        if lhs[i].abs() > lu.zero_tolerance {
            pattern[put] = i;
            put += 1;
        } else {
            lhs[i] = 0.0;
        }
    }
    *nz = put;
}
