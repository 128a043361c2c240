// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::lu::LU;
use crate::status::Status;
use log::warn;

/// Product form update: append the solved entering column as an eta applied
/// after U. The pivot positions and the permutations are unchanged.
pub(crate) fn replace_column_pfi(
    lu: &mut LU,
    column: &IndexedVector,
    k: usize,
    alpha: f64,
) -> Status {
    let abs_alpha = alpha.abs();
    let status = if lu.num_pivots == 0 {
        if abs_alpha < 1.0e-8 {
            Status::Singular
        } else {
            Status::Ok
        }
    } else if abs_alpha < 1.0e-7 {
        Status::Singular
    } else if abs_alpha < 1.0e-5 {
        Status::ProbablyOk
    } else {
        Status::Ok
    };
    if status == Status::Singular {
        return status;
    }

    let droptol = lu.zero_tolerance;
    let recip = 1.0 / alpha;
    let t = lu.num_eta;
    let start = lu.r_begin[t];
    let nentry = column
        .iter()
        .filter(|&(kk, y)| kk != k && (y * recip).abs() > droptol)
        .count();
    if start + nentry > lu.r_index.len() {
        return Status::NoRoom;
    }
    if status == Status::ProbablyOk {
        warn!("small pivot {:.3e} in product form update", alpha);
    }

    let mut put = start;
    for (kk, y) in column.iter() {
        let x = y * recip;
        if kk != k && x.abs() > droptol {
            lu.r_index[put] = lu.pivot_column[kk];
            lu.r_value[put] = x;
            put += 1;
        }
    }
    lu.eta_row[t] = lu.pivot_column[k];
    lu.eta_pivot[t] = recip;
    lu.r_begin[t + 1] = put;
    lu.num_eta += 1;
    lu.num_pivots += 1;
    status
}
