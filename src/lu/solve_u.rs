// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::def::*;
use crate::lu::dfs::dfs;
use crate::lu::lu::*;

// Backward substitution with U = V*D in pivot order. Each position, once
// final, is scattered along its column of V and then scaled by its pivot
// reciprocal. Values at or below the zero tolerance are dropped before they
// are scattered.

/// Solve with U using `strategy`. Falls back to the dense scan when no sparse
/// area exists.
pub(crate) fn solve_u(lu: &mut LU, work: &mut IndexedVector, strategy: Strategy) {
    if strategy == Strategy::Densish {
        solve_u_densish(lu, work);
        return;
    }
    match lu.sparse.take() {
        Some(mut area) => {
            if strategy == Strategy::Sparse {
                solve_u_sparse(lu, &mut area, work);
            } else {
                solve_u_sparsish(lu, &mut area, work);
            }
            lu.sparse = Some(area);
        }
        None => solve_u_densish(lu, work),
    }
}

#[inline]
fn eliminate(lu: &LU, ipivot: usize, lhs: &mut [f64]) -> bool {
    let x = lhs[ipivot];
    if x.abs() > lu.zero_tolerance {
        for pos in lu.u_begin[ipivot]..lu.u_end[ipivot] {
            lhs[lu.u_index[pos]] -= lu.u_value[pos] * x;
        }
        lhs[ipivot] = x * lu.pivot_recip[ipivot];
        true
    } else {
        lhs[ipivot] = 0.0;
        false
    }
}

fn solve_u_densish(lu: &LU, work: &mut IndexedVector) {
    let rows_extra = lu.rows_extra;
    let last = work.indices().iter().copied().max().map_or(0, |i| i + 1);
    {
        let lhs = work.dense_vector_mut();
        for ipivot in (0..usize::min(last, rows_extra)).rev() {
            if lhs[ipivot] != 0.0 {
                eliminate(lu, ipivot, lhs);
            }
        }
    }
    work.set_num_elements(0);
    work.scan(0, rows_extra, lu.zero_tolerance);
}

fn solve_u_sparsish(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let bits = &mut area.bits;
    let (lhs, pattern, nz) = work.parts_mut();

    let mut last_word = 0;
    for &i in pattern[..*nz].iter() {
        bits[i >> BITS_SHIFT] |= 1 << (i & BITS_MASK);
        last_word = usize::max(last_word, i >> BITS_SHIFT);
    }
    *nz = 0;
    for word in (0..=last_word).rev() {
        if bits[word] == 0 {
            continue;
        }
        for bit in (0..=BITS_MASK).rev() {
            // lower bits of the word may be set while it is scanned
            if bits[word] & (1 << bit) == 0 {
                continue;
            }
            let ipivot = (word << BITS_SHIFT) + bit;
            let x = lhs[ipivot];
            if x.abs() > lu.zero_tolerance {
                for pos in lu.u_begin[ipivot]..lu.u_end[ipivot] {
                    let i = lu.u_index[pos];
                    lhs[i] -= lu.u_value[pos] * x;
                    bits[i >> BITS_SHIFT] |= 1 << (i & BITS_MASK);
                }
                lhs[ipivot] = x * lu.pivot_recip[ipivot];
                pattern[*nz] = ipivot;
                *nz += 1;
            } else {
                lhs[ipivot] = 0.0;
            }
        }
        bits[word] = 0;
    }
}

fn solve_u_sparse(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let n = lu.max_extra;
    let marker = area.next_marker();
    let (lhs, pattern, nz) = work.parts_mut();

    let mut top = n;
    for k in 0..*nz {
        top = dfs(
            pattern[k],
            &lu.u_begin,
            &lu.u_end,
            &lu.u_index,
            top,
            &mut area.xi,
            &mut area.pstack,
            &mut area.marked,
            marker,
        );
    }
    *nz = 0;
    for k in top..n {
        let ipivot = area.xi[k];
        if lhs[ipivot] != 0.0 && eliminate(lu, ipivot, lhs) {
            pattern[*nz] = ipivot;
            *nz += 1;
        }
    }
}
