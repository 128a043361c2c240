// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::def::TINY;
use crate::lu::lu::LU;

// Product form etas. Eta `t` replaces the basis column pivoted at position
// p = eta_row[t]; it holds the solved entering column y divided by alpha,
// without the entry at p, and eta_pivot[t] = 1/alpha. Applied after U:
//
//     x[p] *= 1/alpha,    x[j] -= (y_j/alpha) * x[p]_old for each entry.

/// Apply the product form etas in creation order.
pub(crate) fn solve_pfi(lu: &LU, work: &mut IndexedVector) {
    let droptol = lu.zero_tolerance;
    let r_begin = &lu.r_begin;
    let r_index = &lu.r_index;
    let r_value = &lu.r_value;
    let (lhs, pattern, nz) = work.parts_mut();

    for t in 0..lu.num_eta {
        let p = lu.eta_row[t];
        let x = lhs[p];
        if x == 0.0 {
            continue;
        }
        for pos in r_begin[t]..r_begin[t + 1] {
            let j = r_index[pos];
            let old = lhs[j];
            let new = old - r_value[pos] * x;
            if old == 0.0 {
                pattern[*nz] = j;
                *nz += 1;
            }
            lhs[j] = if new != 0.0 { new } else { TINY };
        }
        let new = x * lu.eta_pivot[t];
        lhs[p] = if new != 0.0 { new } else { TINY };
    }
    drop_small(lhs, pattern, nz, droptol);
}

/// Apply the product form etas transposed, newest first.
pub(crate) fn solve_transpose_pfi(lu: &LU, work: &mut IndexedVector) {
    let droptol = lu.zero_tolerance;
    let r_begin = &lu.r_begin;
    let r_index = &lu.r_index;
    let r_value = &lu.r_value;
    let (lhs, pattern, nz) = work.parts_mut();

    for t in (0..lu.num_eta).rev() {
        let p = lu.eta_row[t];
        let old = lhs[p];
        let mut x = old * lu.eta_pivot[t];
        for pos in r_begin[t]..r_begin[t + 1] {
            x -= r_value[pos] * lhs[r_index[pos]];
        }
        if old == 0.0 {
            if x == 0.0 {
                continue;
            }
            pattern[*nz] = p;
            *nz += 1;
        }
        lhs[p] = if x != 0.0 { x } else { TINY };
    }
    drop_small(lhs, pattern, nz, droptol);
}

fn drop_small(lhs: &mut [f64], pattern: &mut [usize], nz: &mut usize, droptol: f64) {
    let mut put = 0;
    for k in 0..*nz {
        let i = pattern[k];
        if lhs[i].abs() > droptol {
            pattern[put] = i;
            put += 1;
        } else {
            lhs[i] = 0.0;
        }
    }
    *nz = put;
}
