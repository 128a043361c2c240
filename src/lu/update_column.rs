// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::build_factors::compress_u;
use crate::lu::def::*;
use crate::lu::go_sparse::{check_sparse, choose_strategy};
use crate::lu::lu::*;
use crate::lu::solve_l::solve_l;
use crate::lu::solve_pfi::solve_pfi;
use crate::lu::solve_r::{choose_r_method, solve_r};
use crate::lu::solve_u::solve_u;
use log::trace;
use std::time::Instant;

/// Solve `B x = rhs` (FTRAN).
///
/// `rhs` holds the right-hand side in natural row indices and receives the
/// solution in basis positions, in the mode (packed or full) it came in.
/// With `no_permute` both sides are indexed by pivot position instead and
/// `rhs` must be sized for `max_extra` positions. `work` must be empty on
/// entry and is empty on return. When `save_spike` is set the vector after
/// L and R is kept at the tail of the column file of U for the next
/// Forrest-Tomlin update.
///
/// Returns the number of nonzeros in the solution.
pub(crate) fn update_column(
    lu: &mut LU,
    work: &mut IndexedVector,
    rhs: &mut IndexedVector,
    no_permute: bool,
    save_spike: bool,
) -> usize {
    let tic = Instant::now();
    if cfg!(feature = "debug_extra") {
        assert!(work.is_clean());
    }

    for (i, x) in rhs.iter() {
        if x != 0.0 {
            let ipivot = if no_permute { i } else { lu.permute[i] };
            work.insert(ipivot, x);
        }
    }
    rhs.clear();
    let nz_input = work.num_elements();

    solve_l(lu, work);
    let nz_after_l = work.num_elements();

    if lu.do_forrest_tomlin && lu.num_eta > 0 {
        let method = choose_r_method(lu, nz_after_l);
        trace!("R step by {:?} with {} nonzeros", method, nz_after_l);
        solve_r(lu, work, method);
    }
    if save_spike {
        store_spike(lu, work);
    }
    let nz_after_r = work.num_elements();

    let strategy = choose_strategy(lu, nz_after_r, lu.stats.ftran_average_after_u);
    solve_u(lu, work, strategy);

    if !lu.do_forrest_tomlin && lu.num_eta > 0 {
        solve_pfi(lu, work);
    }
    let nz_after_u = work.num_elements();

    let nz = unload(lu, work, rhs, no_permute);

    if lu.collect_statistics {
        let s = &mut lu.stats;
        s.ftran_count_input += nz_input as f64;
        s.ftran_count_after_l += nz_after_l as f64;
        s.ftran_count_after_r += nz_after_r as f64;
        s.ftran_count_after_u += nz_after_u as f64;
        s.number_ftran_counts += 1;
        if s.number_ftran_counts > STATISTICS_WINDOW {
            check_sparse(lu);
        }
    }

    let elapsed = tic.elapsed().as_secs_f64();
    lu.time_solve = elapsed;
    lu.time_solve_total += elapsed;
    nz
}

/// FTRAN that keeps the candidate column for the next update when the
/// Forrest-Tomlin protocol is active.
pub(crate) fn update_column_ft(
    lu: &mut LU,
    work: &mut IndexedVector,
    rhs: &mut IndexedVector,
) -> usize {
    let save = lu.do_forrest_tomlin;
    update_column(lu, work, rhs, false, save)
}

/// Two FTRANs in one call; only the first right-hand side becomes the
/// candidate column.
pub(crate) fn update_two_columns_ft(
    lu: &mut LU,
    work: &mut IndexedVector,
    rhs_ft: &mut IndexedVector,
    rhs_other: &mut IndexedVector,
) -> (usize, usize) {
    let nz_ft = update_column_ft(lu, work, rhs_ft);
    let nz_other = update_column(lu, work, rhs_other, false, false);
    (nz_ft, nz_other)
}

/// Copy the vector after L and R to the free space at the end of the column
/// file of U, compressing the file first if the space is short. Nothing is
/// copied when it still does not fit; the next update then reports that
/// there is no room.
fn store_spike(lu: &mut LU, work: &IndexedVector) {
    let nlines = lu.max_extra;
    let len = work.num_elements();
    if lu.u_tail_room() < len {
        compress_u(lu);
    }
    let begin = lu.u_begin[nlines];
    if lu.u_tail_room() < len {
        trace!("no room for spike of length {}", len);
        lu.spike = Spike {
            valid: false,
            no_room: true,
            begin,
            len: 0,
        };
        return;
    }
    let lhs = work.dense_vector();
    for (put, &i) in (begin..).zip(work.indices()) {
        lu.u_index[put] = i;
        lu.u_value[put] = lhs[i];
    }
    lu.spike = Spike {
        valid: true,
        no_room: false,
        begin,
        len,
    };
}

/// Move the solution from pivot positions into `rhs`, dropping small values.
fn unload(
    lu: &LU,
    work: &mut IndexedVector,
    rhs: &mut IndexedVector,
    no_permute: bool,
) -> usize {
    let droptol = lu.zero_tolerance;
    let packed = rhs.packed_mode();
    let (lhs, pattern, nz) = work.parts_mut();
    let (out, out_pattern, out_nz) = rhs.parts_mut();

    let mut put = 0;
    for &ipivot in pattern[..*nz].iter() {
        let x = lhs[ipivot];
        lhs[ipivot] = 0.0;
        if x.abs() <= droptol {
            continue;
        }
        let k = if no_permute {
            ipivot
        } else {
            lu.pivot_column_back[ipivot]
        };
        debug_assert_ne!(k, NONE);
        if packed {
            out[put] = x;
        } else {
            out[k] = x;
        }
        out_pattern[put] = k;
        put += 1;
    }
    *nz = 0;
    *out_nz = put;
    put
}
