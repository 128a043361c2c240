// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::lu::LU;

/// Forward substitution with L in pivot order.
///
/// The nonzero pattern of `work` is rebuilt by a scan over the first `m`
/// positions; entries at or below the zero tolerance are dropped. Columns of
/// slacks are empty, so the substitution starts at the first listed position
/// past them.
pub(crate) fn solve_l(lu: &LU, work: &mut IndexedVector) {
    let m = lu.m;
    let droptol = lu.zero_tolerance;
    let l_begin = &lu.l_begin;
    let l_index = &lu.l_index;
    let l_value = &lu.l_value;

    let first = work.indices().iter().copied().min().unwrap_or(m);
    let start = usize::max(first, lu.num_slacks);
    {
        let lhs = work.dense_vector_mut();
        for i in start..m {
            let x = lhs[i];
            if x == 0.0 {
                continue;
            }
            if x.abs() > droptol {
                for pos in l_begin[i]..l_begin[i + 1] {
                    lhs[l_index[pos]] -= l_value[pos] * x;
                }
            } else {
                lhs[i] = 0.0;
            }
        }
    }
    work.set_num_elements(0);
    work.scan(0, m, droptol);
}
