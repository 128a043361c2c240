// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::def::Strategy;
use crate::lu::dfs::dfs;
use crate::lu::lu::*;

/// Backward substitution with L transposed.
///
/// Without the row copy of L each position takes a dot product with its
/// column. With the row copy the solve goes row by row, either scanning all
/// rows or, for a sparse vector, only the rows reachable from its pattern.
pub(crate) fn solve_transpose_l(lu: &mut LU, work: &mut IndexedVector, strategy: Strategy) {
    if !lu.l_row_copy {
        solve_transpose_l_by_column(lu, work);
        return;
    }
    match lu.sparse.take() {
        Some(mut area) if strategy == Strategy::Sparse => {
            solve_transpose_l_sparse(lu, &mut area, work);
            lu.sparse = Some(area);
        }
        other => {
            lu.sparse = other;
            solve_transpose_l_by_row(lu, work);
        }
    }
}

fn solve_transpose_l_by_column(lu: &LU, work: &mut IndexedVector) {
    let m = lu.m;
    let l_begin = &lu.l_begin;
    let l_index = &lu.l_index;
    let l_value = &lu.l_value;
    let last = work.indices().iter().copied().max().map_or(0, |i| i + 1);
    {
        let lhs = work.dense_vector_mut();
        for i in (lu.num_slacks..usize::min(last, m)).rev() {
            let mut x = lhs[i];
            for pos in l_begin[i]..l_begin[i + 1] {
                x -= l_value[pos] * lhs[l_index[pos]];
            }
            lhs[i] = x;
        }
    }
    work.set_num_elements(0);
    work.scan(0, m, lu.zero_tolerance);
}

fn solve_transpose_l_by_row(lu: &LU, work: &mut IndexedVector) {
    let m = lu.m;
    let droptol = lu.zero_tolerance;
    let lt_begin = &lu.lt_begin;
    let lt_index = &lu.lt_index;
    let lt_value = &lu.lt_value;
    let last = work.indices().iter().copied().max().map_or(0, |i| i + 1);
    {
        let (lhs, pattern, nz) = work.parts_mut();
        let mut put = 0;
        for r in (lu.num_slacks..usize::min(last, m)).rev() {
            let x = lhs[r];
            if x == 0.0 {
                continue;
            }
            if x.abs() > droptol {
                for pos in lt_begin[r]..lt_begin[r + 1] {
                    lhs[lt_index[pos]] -= lt_value[pos] * x;
                }
                pattern[put] = r;
                put += 1;
            } else {
                lhs[r] = 0.0;
            }
        }
        *nz = put;
    }
    // rows of slacks are empty but collect fill
    work.scan(0, lu.num_slacks, droptol);
}

fn solve_transpose_l_sparse(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let m = lu.m;
    let marker = area.next_marker();
    let (lhs, pattern, nz) = work.parts_mut();

    let mut top = m;
    for k in 0..*nz {
        top = dfs(
            pattern[k],
            &lu.lt_begin,
            &lu.lt_begin[1..],
            &lu.lt_index,
            top,
            &mut area.xi[..m],
            &mut area.pstack,
            &mut area.marked,
            marker,
        );
    }
    *nz = 0;
    for k in top..m {
        let r = area.xi[k];
        let x = lhs[r];
        if x == 0.0 {
            continue;
        }
        if x.abs() > lu.zero_tolerance {
            for pos in lu.lt_begin[r]..lu.lt_begin[r + 1] {
                lhs[lu.lt_index[pos]] -= lu.lt_value[pos] * x;
            }
            pattern[*nz] = r;
            *nz += 1;
        } else {
            lhs[r] = 0.0;
        }
    }
}
