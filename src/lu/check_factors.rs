// Copyright (C) 2026 The etalu developers

use crate::lu::def::NONE;
use crate::lu::file::file_diff;
use crate::lu::lu::LU;
use log::error;

/// Count inconsistencies in the factorization: entries of U missing in one
/// of its two views, broken cross references, entries on or below the
/// diagonal of U, and permutations that are not inverse to each other.
pub(crate) fn check_factors(lu: &LU) -> usize {
    let n = lu.rows_extra;
    let mut nbad = 0;

    nbad += file_diff(n, &lu.w_begin, &lu.w_end, &lu.w_index, &lu.u_begin, &lu.u_end, &lu.u_index);
    nbad += file_diff(n, &lu.u_begin, &lu.u_end, &lu.u_index, &lu.w_begin, &lu.w_end, &lu.w_index);

    for i in 0..n {
        for slot in lu.w_begin[i]..lu.w_end[i] {
            let j = lu.w_index[slot];
            let pos = lu.w_cross[slot];
            if pos < lu.u_begin[j] || pos >= lu.u_end[j] || lu.u_index[pos] != i {
                error!("row {} slot {} has a bad cross reference", i, slot);
                nbad += 1;
            }
        }
    }
    for j in 0..n {
        for pos in lu.u_begin[j]..lu.u_end[j] {
            let i = lu.u_index[pos];
            if i >= j || !lu.is_live_pivot(i) {
                error!("column {} holds entry in row {}", j, i);
                nbad += 1;
            }
        }
        if lu.pivot_column_back[j] == NONE && lu.u_end[j] != lu.u_begin[j] {
            error!("retired column {} is not empty", j);
            nbad += 1;
        }
    }

    for i in 0..n {
        if lu.permute_back[lu.permute[i]] != i {
            nbad += 1;
        }
    }
    for k in 0..lu.m {
        let ipivot = lu.pivot_column[k];
        if ipivot >= n || lu.pivot_column_back[ipivot] != k {
            error!("basis position {} has a bad pivot {}", k, ipivot);
            nbad += 1;
        }
    }
    nbad
}
