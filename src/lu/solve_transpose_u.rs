// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::def::*;
use crate::lu::dfs::dfs;
use crate::lu::lu::*;

// Forward substitution with V transposed, using the row file of U. Row `i` of
// V lists the columns `j > i` with an entry in row `i`; the value of row slot
// `s` is `u_value[w_cross[s]]`. V has unit diagonal, so the caller applies
// the pivot reciprocals of D beforehand when solving with U transposed.

/// Solve with V transposed using `strategy`.
pub(crate) fn solve_transpose_u(lu: &mut LU, work: &mut IndexedVector, strategy: Strategy) {
    if strategy == Strategy::Densish {
        solve_transpose_u_densish(lu, work);
        return;
    }
    match lu.sparse.take() {
        Some(mut area) => {
            if strategy == Strategy::Sparse {
                solve_transpose_u_sparse(lu, &mut area, work);
            } else {
                solve_transpose_u_sparsish(lu, &mut area, work);
            }
            lu.sparse = Some(area);
        }
        None => solve_transpose_u_densish(lu, work),
    }
}

#[inline]
fn scatter_row(lu: &LU, ipivot: usize, lhs: &mut [f64]) -> bool {
    let x = lhs[ipivot];
    if x.abs() > lu.zero_tolerance {
        for slot in lu.w_begin[ipivot]..lu.w_end[ipivot] {
            lhs[lu.w_index[slot]] -= lu.u_value[lu.w_cross[slot]] * x;
        }
        true
    } else {
        lhs[ipivot] = 0.0;
        false
    }
}

fn solve_transpose_u_densish(lu: &LU, work: &mut IndexedVector) {
    let rows_extra = lu.rows_extra;
    let first = work.indices().iter().copied().min().unwrap_or(rows_extra);
    {
        let lhs = work.dense_vector_mut();
        for ipivot in first..rows_extra {
            if lhs[ipivot] != 0.0 {
                scatter_row(lu, ipivot, lhs);
            }
        }
    }
    work.set_num_elements(0);
    work.scan(0, rows_extra, lu.zero_tolerance);
}

fn solve_transpose_u_sparsish(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let bits = &mut area.bits;
    let nwords = (lu.rows_extra >> BITS_SHIFT) + 1;
    let (lhs, pattern, nz) = work.parts_mut();

    let mut first_word = nwords;
    for &i in pattern[..*nz].iter() {
        bits[i >> BITS_SHIFT] |= 1 << (i & BITS_MASK);
        first_word = usize::min(first_word, i >> BITS_SHIFT);
    }
    *nz = 0;
    for word in first_word..nwords {
        if bits[word] == 0 {
            continue;
        }
        for bit in 0..=BITS_MASK {
            // higher bits of the word may be set while it is scanned
            if bits[word] & (1 << bit) == 0 {
                continue;
            }
            let ipivot = (word << BITS_SHIFT) + bit;
            let x = lhs[ipivot];
            if x.abs() > lu.zero_tolerance {
                for slot in lu.w_begin[ipivot]..lu.w_end[ipivot] {
                    let j = lu.w_index[slot];
                    lhs[j] -= lu.u_value[lu.w_cross[slot]] * x;
                    bits[j >> BITS_SHIFT] |= 1 << (j & BITS_MASK);
                }
                pattern[*nz] = ipivot;
                *nz += 1;
            } else {
                lhs[ipivot] = 0.0;
            }
        }
        bits[word] = 0;
    }
}

fn solve_transpose_u_sparse(lu: &LU, area: &mut SparseArea, work: &mut IndexedVector) {
    let n = lu.max_extra;
    let marker = area.next_marker();
    let (lhs, pattern, nz) = work.parts_mut();

    let mut top = n;
    for k in 0..*nz {
        top = dfs(
            pattern[k],
            &lu.w_begin,
            &lu.w_end,
            &lu.w_index,
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
        if lhs[ipivot] != 0.0 && scatter_row(lu, ipivot, lhs) {
            pattern[*nz] = ipivot;
            *nz += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lu::factorize::factorize;
    use crate::lu::go_sparse::go_sparse;
    use crate::sparse::CscMatrix;

    #[test]
    fn strategies_agree() {
        let m = 30;
        let mut t = vec![];
        for j in 0..m {
            t.push((j, j, 1.5 + (j % 4) as f64));
            if j >= 2 {
                t.push((j - 2, j, 0.75));
            }
            if j % 5 == 4 {
                t.push((0, j, -1.25));
            }
        }
        let basis = CscMatrix::from_triplets(m, m, &t).unwrap();

        let mut results = vec![];
        for strategy in [Strategy::Densish, Strategy::Sparsish, Strategy::Sparse] {
            let mut lu = LU::new();
            lu.sparse_setting = SparseSetting::Fixed(8, 8);
            factorize(&mut lu, &basis).unwrap();
            go_sparse(&mut lu);
            let mut work = IndexedVector::new(lu.max_extra);
            work.insert(0, 1.0);
            work.insert(5, -2.0);
            solve_transpose_u(&mut lu, &mut work, strategy);
            let listed = work.to_dense(lu.max_extra).iter().filter(|&&v| v != 0.0).count();
            assert_eq!(listed, work.num_elements());
            results.push(work.to_dense(lu.max_extra));
        }
        for other in &results[1..] {
            for (a, b) in results[0].iter().zip(other) {
                assert!((a - b).abs() <= 1e-12 * (1.0 + a.abs()));
            }
        }
    }
}
