// Copyright (C) 2026 The etalu developers

use crate::indexed_vector::IndexedVector;
use crate::lu::build_factors::compress_u;
use crate::lu::check_factors::check_factors;
use crate::lu::check_pivot::check_pivot;
use crate::lu::def::*;
use crate::lu::edit_u::{remove_column, remove_row};
use crate::lu::file::file_reserve;
use crate::lu::go_sparse::choose_strategy;
use crate::lu::list::list_move;
use crate::lu::lu::*;
use crate::lu::replace_column_pfi::replace_column_pfi;
use crate::lu::solve_transpose_u::solve_transpose_u;
use crate::status::Status;
use log::{debug, warn};
use std::time::Instant;

/// Replace the column at basis position `k` by the column whose FTRAN is in
/// `column` (basis positions); `alpha` is its entry at position `k`.
///
/// Nothing is changed unless the returned status is accepted.
pub(crate) fn replace_column(
    lu: &mut LU,
    work: &mut IndexedVector,
    column: &IndexedVector,
    k: usize,
    alpha: f64,
) -> Status {
    let tic = Instant::now();
    let status = if lu.num_pivots >= usize::min(lu.maximum_pivots, lu.max_eta)
        || lu.rows_extra >= lu.max_extra
    {
        Status::TooManyPivots
    } else if lu.do_forrest_tomlin {
        replace_column_ft(lu, work, column, k, alpha)
    } else {
        replace_column_pfi(lu, column, k, alpha)
    };

    if status.is_accepted() {
        lu.nupdate_total += 1;
        if lu.do_forrest_tomlin {
            lu.nforrest_total += 1;
        }
        if cfg!(feature = "debug") {
            let nbad = check_factors(lu);
            assert_eq!(nbad, 0, "factors inconsistent after update");
        }
    } else {
        debug!("update of basis position {} rejected: {}", k, status);
    }
    let elapsed = tic.elapsed().as_secs_f64();
    lu.time_update = elapsed;
    lu.time_update_total += elapsed;
    status
}

/// Forrest-Tomlin update.
///
/// The candidate column (the entering column after L and R) replaces column
/// r = pivot_column[k] of U and moves to the new last pivot position
/// e = rows_extra. Row r of U then has entries right of the diagonal; they are
/// eliminated with the rows below it, which is the row eta
///
/// ```text
/// v' V_sub = V[r, :],
/// ```
///
/// appended to R. Row r becomes row e and the diagonal entry of the new
/// column is the candidate's entry in row r minus v' times the candidate.
fn replace_column_ft(
    lu: &mut LU,
    work: &mut IndexedVector,
    column: &IndexedVector,
    k: usize,
    alpha: f64,
) -> Status {
    let r = lu.pivot_column[k];
    let e = lu.rows_extra;
    let t = lu.num_eta;
    let nlines = lu.max_extra;

    if alpha.abs() <= SMALL_PIVOT {
        return Status::Singular;
    }
    if lu.spike.no_room {
        return Status::NoRoom;
    }
    if !lu.spike.valid || lu.spike.begin != lu.u_begin[nlines] {
        debug!("candidate column not stored, computing it from the solved column");
        if !spike_from_solution(lu, work, column) {
            return Status::NoRoom;
        }
    }
    let spike_begin = lu.spike.begin;
    let spike_end = spike_begin + lu.spike.len;

    // Row eta
    for slot in lu.w_begin[r]..lu.w_end[r] {
        work.insert(lu.w_index[slot], lu.u_value[lu.w_cross[slot]]);
    }
    let strategy = choose_strategy(lu, work.num_elements(), lu.stats.btran_average_after_u);
    solve_transpose_u(lu, work, strategy);

    let mut new_pivot = 0.0;
    {
        let v = work.dense_vector();
        for pos in spike_begin..spike_end {
            let i = lu.u_index[pos];
            if i == r {
                new_pivot += lu.u_value[pos];
            } else {
                new_pivot -= v[i] * lu.u_value[pos];
            }
        }
    }
    let expected = alpha / lu.pivot_recip[r];
    let status = check_pivot(new_pivot, expected, lu.num_pivots, lu.relax_check);
    match status {
        Status::Singular => {
            warn!(
                "pivot {:.6e} of update disagrees with expected {:.6e}",
                new_pivot, expected
            );
            work.clear();
            return status;
        }
        Status::ProbablyOk => {
            warn!(
                "inaccurate pivot {:.6e} of update, expected {:.6e}",
                new_pivot, expected
            );
        }
        _ => {}
    }

    // Room in R and in the rows receiving an entry of the new column.
    let nv = work.num_elements();
    if lu.r_begin[t] + nv > lu.r_index.len() {
        work.clear();
        return Status::NoRoom;
    }
    let mut lines = std::mem::take(&mut lu.iwork0);
    let mut nlines_spike = 0;
    for pos in spike_begin..spike_end {
        lines[nlines_spike] = lu.u_index[pos];
        nlines_spike += 1;
    }
    let room = file_reserve(
        nlines,
        &mut lu.w_begin,
        &mut lu.w_end,
        &mut lu.w_next,
        &mut lu.w_prev,
        &mut lu.w_index,
        &mut lu.w_cross,
        &lines[..nlines_spike],
        r,
        1,
    );
    lu.iwork0 = lines;
    if !room {
        debug!("no room in row file of U");
        work.clear();
        return Status::NoRoom;
    }

    // Commit //

    remove_column(lu, r);
    remove_row(lu, r);

    append_eta(lu, work, r);
    work.clear();

    // compact the candidate into column e
    let recip = 1.0 / new_pivot;
    let mut put = spike_begin;
    for pos in spike_begin..spike_end {
        let i = lu.u_index[pos];
        if i != r {
            lu.u_index[put] = i;
            lu.u_value[put] = lu.u_value[pos] * recip;
            put += 1;
        }
    }
    lu.u_begin[e] = spike_begin;
    lu.u_end[e] = put;
    lu.u_begin[nlines] = put;
    list_move(e, 0, &mut lu.u_next, &mut lu.u_prev, nlines);

    for pos in spike_begin..put {
        let i = lu.u_index[pos];
        let slot = lu.w_end[i];
        lu.w_index[slot] = e;
        lu.w_cross[slot] = pos;
        lu.w_end[i] += 1;
    }

    lu.pivot_recip[e] = recip;
    lu.pivot_recip[r] = 0.0;
    lu.pivot_column[k] = e;
    lu.pivot_column_back[e] = k;
    lu.pivot_column_back[r] = NONE;

    lu.rows_extra += 1;
    lu.num_eta += 1;
    lu.num_pivots += 1;
    lu.spike = Spike::default();
    status
}

/// Append the eta in `work` with pivot `r` to R and to its column copy.
fn append_eta(lu: &mut LU, work: &IndexedVector, r: usize) {
    let t = lu.num_eta;
    let v = work.dense_vector();
    let mut put = lu.r_begin[t];
    for &j in work.indices() {
        lu.r_index[put] = j;
        lu.r_value[put] = v[j];
        put += 1;
    }
    lu.eta_row[t] = r;
    lu.eta_pivot[t] = 1.0;
    lu.r_begin[t + 1] = put;

    if !lu.rt_valid {
        return;
    }
    let nlines = lu.max_extra;
    let room = file_reserve(
        nlines,
        &mut lu.rt_begin,
        &mut lu.rt_end,
        &mut lu.rt_next,
        &mut lu.rt_prev,
        &mut lu.rt_index,
        &mut lu.rt_value,
        work.indices(),
        NONE,
        1,
    );
    if !room {
        debug!("column copy of R dropped for lack of memory");
        lu.rt_valid = false;
        return;
    }
    for &j in work.indices() {
        let pos = lu.rt_end[j];
        lu.rt_index[pos] = t;
        lu.rt_value[pos] = v[j];
        lu.rt_end[j] += 1;
    }
}

/// Store `U * y` as candidate column, where `y` is the solved entering column
/// in basis positions. Returns false if it does not fit.
fn spike_from_solution(lu: &mut LU, work: &mut IndexedVector, column: &IndexedVector) -> bool {
    let rows_extra = lu.rows_extra;
    {
        let lhs = work.dense_vector_mut();
        for (kk, y) in column.iter() {
            let j = lu.pivot_column[kk];
            let x = y / lu.pivot_recip[j];
            lhs[j] += x;
            for pos in lu.u_begin[j]..lu.u_end[j] {
                lhs[lu.u_index[pos]] += lu.u_value[pos] * x;
            }
        }
    }
    work.set_num_elements(0);
    work.scan(0, rows_extra, lu.zero_tolerance);

    let nlines = lu.max_extra;
    let len = work.num_elements();
    if lu.u_tail_room() < len {
        compress_u(lu);
    }
    let begin = lu.u_begin[nlines];
    let fits = lu.u_tail_room() >= len;
    if fits {
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
    work.clear();
    fits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lu::factorize::factorize;
    use crate::lu::update_column::update_column_ft;
    use crate::sparse::CscMatrix;

    fn basis() -> CscMatrix {
        let t = [
            (0, 0, 4.0),
            (1, 0, 1.0),
            (1, 1, 3.0),
            (2, 1, -1.0),
            (0, 2, 2.0),
            (2, 2, 5.0),
            (3, 3, 1.0),
            (0, 3, 0.5),
        ];
        CscMatrix::from_triplets(4, 4, &t).unwrap()
    }

    fn ftran(lu: &mut LU, dense: &[f64]) -> IndexedVector {
        let mut work = IndexedVector::new(lu.max_extra);
        let mut rhs = IndexedVector::from_dense(dense);
        update_column_ft(lu, &mut work, &mut rhs);
        rhs
    }

    #[test]
    fn update_keeps_views_consistent() {
        let mut lu = LU::new();
        factorize(&mut lu, &basis()).unwrap();
        let a = [1.0, 2.0, 0.0, -1.0];
        let y = ftran(&mut lu, &a);
        let k = 1;
        let alpha = y.get(k);
        let mut work = IndexedVector::new(lu.max_extra);
        let status = replace_column(&mut lu, &mut work, &y, k, alpha);
        assert!(status.is_accepted());
        assert!(work.is_clean());
        assert_eq!(check_factors(&lu), 0);
        assert_eq!(lu.num_pivots, 1);
        assert_eq!(lu.rows_extra, 5);
        assert_eq!(lu.pivot_column[k], 4);
    }

    #[test]
    fn rebuilt_candidate_matches_stored_one() {
        let a = [0.0, 1.0, 1.0, 2.0];
        let mut stored = LU::new();
        factorize(&mut stored, &basis()).unwrap();
        let y = ftran(&mut stored, &a);
        let (begin, len) = (stored.spike.begin, stored.spike.len);
        let mut expect: Vec<(usize, f64)> = (begin..begin + len)
            .map(|p| (stored.u_index[p], stored.u_value[p]))
            .collect();

        let mut work = IndexedVector::new(stored.max_extra);
        stored.spike = Spike::default();
        assert!(spike_from_solution(&mut stored, &mut work, &y));
        let begin = stored.spike.begin;
        let mut got: Vec<(usize, f64)> = (begin..begin + stored.spike.len)
            .map(|p| (stored.u_index[p], stored.u_value[p]))
            .collect();
        expect.sort_by_key(|p| p.0);
        got.sort_by_key(|p| p.0);
        assert_eq!(expect.len(), got.len());
        for ((i, a), (j, b)) in expect.iter().zip(&got) {
            assert_eq!(i, j);
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn tail_one_short_of_candidate() {
        let mut lu = LU::new();
        factorize(&mut lu, &basis()).unwrap();
        let a = [1.0, 2.0, 0.0, -1.0];
        let k = 1;
        ftran(&mut lu, &a);
        let len = lu.spike.len;
        assert!(len > 0);
        let nlines = lu.max_extra;
        let tail_begin = lu.u_begin[nlines];
        let u_before = lu.u_elements();

        lu.u_end[nlines] = tail_begin + len - 1;
        let y = ftran(&mut lu, &a);
        assert!(lu.spike.no_room);
        let mut work = IndexedVector::new(lu.max_extra);
        assert_eq!(replace_column(&mut lu, &mut work, &y, k, y.get(k)), Status::NoRoom);
        assert!(work.is_clean());
        assert_eq!(lu.num_pivots, 0);
        assert_eq!(lu.rows_extra, 4);
        assert_eq!(lu.u_elements(), u_before);
        assert_eq!(check_factors(&lu), 0);

        lu.u_end[nlines] = tail_begin + len;
        let y = ftran(&mut lu, &a);
        assert!(lu.spike.valid);
        assert!(replace_column(&mut lu, &mut work, &y, k, y.get(k)).is_accepted());
        assert_eq!(lu.num_pivots, 1);
        assert_eq!(lu.rows_extra, 5);
        assert_eq!(check_factors(&lu), 0);
    }

    #[test]
    fn compression_keeps_solutions() {
        let mut lu = LU::new();
        factorize(&mut lu, &basis()).unwrap();
        let y = ftran(&mut lu, &[1.0, 2.0, 0.0, -1.0]);
        let mut work = IndexedVector::new(lu.max_extra);
        assert!(replace_column(&mut lu, &mut work, &y, 1, y.get(1)).is_accepted());

        let b = [0.5, -1.0, 2.0, 1.0];
        let before = ftran(&mut lu, &b).to_dense(4);
        let used = lu.u_begin[lu.max_extra];
        compress_u(&mut lu);
        assert!(lu.u_begin[lu.max_extra] <= used);
        assert!(!lu.spike.valid);
        assert_eq!(check_factors(&lu), 0);
        let after = ftran(&mut lu, &b).to_dense(4);
        for (x, z) in before.iter().zip(&after) {
            assert!((x - z).abs() < 1e-14);
        }
    }
}
