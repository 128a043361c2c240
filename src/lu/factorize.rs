// Copyright (C) 2026 The etalu developers

use crate::error::{Error, Result};
use crate::lu::build_factors::{build_factors, Factors};
use crate::lu::def::*;
use crate::lu::dfs::dfs;
use crate::lu::go_sparse::{check_sparse, go_sparse};
use crate::lu::lu::LU;
use crate::sparse::SparseMatrix;
use log::{debug, warn};
use std::time::Instant;

/// Factorize the basis matrix from scratch.
///
/// Columns `slack_value * e_i` are slacks. They are pivoted first, in basis
/// order, and give empty columns in L and U. The remaining columns are taken
/// in order of increasing length and factorized left-looking: each column is
/// solved with the part of L computed so far (its nonzero pattern is the reach
/// of the column in the graph of L) and a pivot is chosen among the rows not
/// yet pivoted. Every row whose magnitude is at least `pivot_tolerance` times
/// the largest one is acceptable; among those the row with the fewest entries
/// in the basis wins, ties going to the larger magnitude.
///
/// On return R is empty, the pivot count is zero and the sparse thresholds
/// and row copy of L are refreshed. When the basis is singular the previous
/// factorization is kept and [`Error::SingularBasis`] names the first
/// dependent basis column.
pub(crate) fn factorize<M: SparseMatrix>(lu: &mut LU, basis: &M) -> Result<()> {
    let tic = Instant::now();
    let m = basis.rows();
    if basis.cols() != m {
        return Err(Error::DimensionMismatch {
            arg: "basis columns",
            expected: m,
            got: basis.cols(),
        });
    }
    let slack_value = lu.slack_value;
    let reltol = lu.pivot_tolerance;

    let mut row_step = vec![NONE; m];
    let mut col_step = vec![NONE; m];
    let mut diag = vec![0.0; m];

    // Slacks //
    let mut num_slacks = 0;
    for j in 0..m {
        if basis.col_len(j) == 1 && basis.col_values(j)[0] == slack_value {
            let i = basis.col_indices(j)[0];
            if row_step[i] == NONE {
                row_step[i] = num_slacks;
                col_step[j] = num_slacks;
                diag[num_slacks] = slack_value;
                num_slacks += 1;
            }
        }
    }

    let mut rest: Vec<usize> = (0..m).filter(|&j| col_step[j] == NONE).collect();
    rest.sort_by_key(|&j| basis.col_len(j));

    let mut row_count = vec![0usize; m];
    for j in 0..m {
        for &i in basis.col_indices(j) {
            row_count[i] += 1;
        }
    }

    // L columns are kept in natural row indices while factorizing. The L column
    // of a pivoted row is l_index[lr_begin[row]..lr_end[row]].
    let mut l_begin = vec![0; m + 1];
    let mut l_index: Vec<usize> = Vec::new();
    let mut l_value: Vec<f64> = Vec::new();
    let mut lr_begin = vec![0; m];
    let mut lr_end = vec![0; m];

    // U columns hold the pivot step of each row and the unscaled value.
    let mut uc_begin = vec![0; m + 1];
    let mut uc_row: Vec<usize> = Vec::new();
    let mut uc_value: Vec<f64> = Vec::new();

    let mut x = vec![0.0; m];
    let mut xi = vec![0; m];
    let mut pstack = vec![0; m];
    let mut marked = vec![0; m];

    for (n, &j) in rest.iter().enumerate() {
        let step = num_slacks + n;
        let marker = n + 1;

        // Symbolic: reach of the column in the graph of L.
        let mut top = m;
        for (&i, &v) in basis.col_indices(j).iter().zip(basis.col_values(j)) {
            x[i] = v;
            top = dfs(
                i,
                &lr_begin,
                &lr_end,
                &l_index,
                top,
                &mut xi,
                &mut pstack,
                &mut marked,
                marker,
            );
        }

        // Numeric: forward substitution with L in topological order.
        for &i in &xi[top..m] {
            if row_step[i] != NONE {
                let xk = x[i];
                if xk != 0.0 {
                    for p in lr_begin[i]..lr_end[i] {
                        x[l_index[p]] -= l_value[p] * xk;
                    }
                }
            }
        }

        let max = xi[top..m]
            .iter()
            .filter(|&&i| row_step[i] == NONE)
            .fold(0.0_f64, |acc, &i| acc.max(x[i].abs()));
        if max <= ABS_PIVOT_TOLERANCE {
            warn!(
                "basis column {} is dependent (largest candidate pivot {:.3e})",
                j, max
            );
            return Err(Error::SingularBasis { position: j });
        }

        let mut pivot = NONE;
        let mut best_count = usize::MAX;
        let mut best_abs = 0.0;
        for &i in &xi[top..m] {
            if row_step[i] != NONE {
                continue;
            }
            let a = x[i].abs();
            if a >= reltol * max
                && (row_count[i] < best_count || (row_count[i] == best_count && a > best_abs))
            {
                pivot = i;
                best_count = row_count[i];
                best_abs = a;
            }
        }
        let piv = x[pivot];

        let lstart = l_index.len();
        for &i in &xi[top..m] {
            let v = x[i];
            x[i] = 0.0;
            if v == 0.0 || i == pivot {
                continue;
            }
            if row_step[i] != NONE {
                uc_row.push(row_step[i]);
                uc_value.push(v);
            } else {
                l_index.push(i);
                l_value.push(v / piv);
            }
        }
        lr_begin[pivot] = lstart;
        lr_end[pivot] = l_index.len();
        l_begin[step + 1] = l_index.len();
        uc_begin[step + 1] = uc_row.len();

        row_step[pivot] = step;
        col_step[j] = step;
        diag[step] = piv;
    }
    debug!(
        "factorized basis of dimension {} ({} slacks, nnz(L) {}, nnz(U) {})",
        m,
        num_slacks,
        l_index.len(),
        uc_row.len()
    );

    build_factors(
        lu,
        Factors {
            m,
            num_slacks,
            row_step,
            col_step,
            l_begin,
            l_index,
            l_value,
            uc_begin,
            uc_row,
            uc_value,
            diag,
        },
    );
    check_sparse(lu);
    go_sparse(lu);

    let elapsed = tic.elapsed().as_secs_f64();
    lu.time_factorize = elapsed;
    lu.time_factorize_total += elapsed;
    lu.nfactorize += 1;
    Ok(())
}
