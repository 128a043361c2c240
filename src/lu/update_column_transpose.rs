// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::go_sparse::choose_strategy;
use crate::lu::lu::LU;
use crate::lu::solve_pfi::solve_transpose_pfi;
use crate::lu::solve_transpose_l::solve_transpose_l;
use crate::lu::solve_transpose_r::solve_transpose_r;
use crate::lu::solve_transpose_u::solve_transpose_u;
use std::time::Instant;

/// Solve `B' y = rhs` (BTRAN).
///
/// `rhs` holds the right-hand side in basis positions and receives the
/// solution in natural row indices, in the mode it came in. `work` must be
/// empty on entry and is empty on return. Returns the number of nonzeros in
/// the solution.
pub(crate) fn update_column_transpose(
    lu: &mut LU,
    work: &mut IndexedVector,
    rhs: &mut IndexedVector,
) -> usize {
    let tic = Instant::now();
    if cfg!(feature = "debug_extra") {
        assert!(work.is_clean());
    }

    for (k, x) in rhs.iter() {
        if x != 0.0 {
            work.insert(lu.pivot_column[k], x);
        }
    }
    rhs.clear();
    let nz_input = work.num_elements();

    if !lu.do_forrest_tomlin && lu.num_eta > 0 {
        solve_transpose_pfi(lu, work);
    }
    {
        let (lhs, pattern, nz) = work.parts_mut();
        for &i in pattern[..*nz].iter() {
            lhs[i] *= lu.pivot_recip[i];
        }
    }
    let strategy = choose_strategy(lu, work.num_elements(), lu.stats.btran_average_after_u);
    solve_transpose_u(lu, work, strategy);
    let nz_after_u = work.num_elements();

    if lu.do_forrest_tomlin {
        solve_transpose_r(lu, work);
    }
    let nz_after_r = work.num_elements();

    let strategy = choose_strategy(lu, nz_after_r, lu.stats.btran_average_after_l);
    solve_transpose_l(lu, work, strategy);
    let nz_after_l = work.num_elements();

    let droptol = lu.zero_tolerance;
    let packed = rhs.packed_mode();
    let nz = {
        let (lhs, pattern, nz) = work.parts_mut();
        let (out, out_pattern, out_nz) = rhs.parts_mut();
        let mut put = 0;
        for &ipivot in pattern[..*nz].iter() {
            let x = lhs[ipivot];
            lhs[ipivot] = 0.0;
            if x.abs() <= droptol {
                continue;
            }
            let i = lu.permute_back[ipivot];
            if packed {
                out[put] = x;
            } else {
                out[i] = x;
            }
            out_pattern[put] = i;
            put += 1;
        }
        *nz = 0;
        *out_nz = put;
        put
    };

    if lu.collect_statistics {
        let s = &mut lu.stats;
        s.btran_count_input += nz_input as f64;
        s.btran_count_after_u += nz_after_u as f64;
        s.btran_count_after_r += nz_after_r as f64;
        s.btran_count_after_l += nz_after_l as f64;
        s.number_btran_counts += 1;
    }

    let elapsed = tic.elapsed().as_secs_f64();
    lu.time_solve = elapsed;
    lu.time_solve_total += elapsed;
    nz
}
