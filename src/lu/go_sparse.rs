// Copyright (C) 2026 The etalu developers

use crate::lu::def::*;
use crate::lu::lu::*;
use log::debug;

// Bases up to this size are solved with full scans when the thresholds are
// chosen automatically.
const SPARSE_SMALL: usize = 300;
const SPARSE_MEDIUM: usize = 10000;
const SPARSE_MIN_MEDIUM: usize = 500;
const SPARSE_DIV_MEDIUM: usize = 6;

/// Choose the sparse thresholds and, when they are positive, allocate the
/// sparse area and build the row copy of L.
///
/// Calling it again for the same factorization does nothing.
pub(crate) fn go_sparse(lu: &mut LU) {
    let m = lu.m;
    let (thres, thres2) = match lu.sparse_setting {
        SparseSetting::Disabled => (0, 0),
        SparseSetting::Fixed(thres, thres2) => (thres, thres2),
        SparseSetting::Auto if m > SPARSE_SMALL => {
            if m < SPARSE_MEDIUM {
                (usize::min(m / SPARSE_DIV_MEDIUM, SPARSE_MIN_MEDIUM), m / 2)
            } else {
                (SPARSE_MIN_MEDIUM, usize::max(SPARSE_MIN_MEDIUM, m >> 3))
            }
        }
        SparseSetting::Auto => (0, 0),
    };
    lu.sparse_threshold = thres;
    lu.sparse_threshold2 = thres2;

    if thres == 0 {
        lu.sparse = None;
        lu.l_row_copy = false;
        lu.lt_begin.clear();
        lu.lt_index.clear();
        lu.lt_value.clear();
        return;
    }
    if lu.sparse.as_ref().map_or(true, |area| area.xi.len() != lu.max_extra) {
        lu.sparse = Some(SparseArea::new(lu.max_extra));
    }
    if !lu.l_row_copy {
        build_l_row_copy(lu);
        debug!(
            "row copy of L built (sparse thresholds {} and {})",
            thres, thres2
        );
    }
}

/// Build L rowwise: row `r` lists the columns `i < r` with a multiplier in
/// row `r`, in decreasing column order.
fn build_l_row_copy(lu: &mut LU) {
    let m = lu.m;
    let l_begin = &lu.l_begin;
    let l_index = &lu.l_index;
    let l_value = &lu.l_value;
    let lt_begin = &mut lu.lt_begin;
    let lt_index = &mut lu.lt_index;
    let lt_value = &mut lu.lt_value;
    let nz = l_index.len();

    resize(lt_begin, m + 1);
    resize(lt_index, nz);
    resize(lt_value, nz);

    // counts
    for &r in l_index.iter() {
        lt_begin[r] += 1;
    }
    // convert count to ends
    let mut count = 0;
    for r in 0..m {
        count += lt_begin[r];
        lt_begin[r] = count;
    }
    lt_begin[m] = count;
    // now insert, walking back so each row ends up sorted by column
    for i in (0..m).rev() {
        for pos in l_begin[i]..l_begin[i + 1] {
            let r = l_index[pos];
            lt_begin[r] -= 1;
            let put = lt_begin[r];
            lt_index[put] = i;
            lt_value[put] = l_value[pos];
        }
    }
    lu.l_row_copy = true;
}

/// Fold the density counts into averages (once enough FTRANs were seen) and
/// decay the counts.
pub(crate) fn check_sparse(lu: &mut LU) {
    let s = &mut lu.stats;
    if s.number_ftran_counts > STATISTICS_WINDOW {
        s.ftran_count_input = f64::max(s.ftran_count_input, 1.0);
        s.ftran_average_after_l = f64::max(s.ftran_count_after_l / s.ftran_count_input, 1.0);
        s.ftran_average_after_r =
            f64::max(s.ftran_count_after_r / f64::max(s.ftran_count_after_l, 1.0), 1.0);
        s.ftran_average_after_u =
            f64::max(s.ftran_count_after_u / f64::max(s.ftran_count_after_r, 1.0), 1.0);
        if s.btran_count_input != 0.0 && s.btran_count_after_u != 0.0 && s.btran_count_after_r != 0.0
        {
            s.btran_average_after_u = f64::max(s.btran_count_after_u / s.btran_count_input, 1.0);
            s.btran_average_after_r = f64::max(s.btran_count_after_r / s.btran_count_after_u, 1.0);
            s.btran_average_after_l = f64::max(s.btran_count_after_l / s.btran_count_after_r, 1.0);
        } else {
            // no useful BTRANs seen
            s.btran_average_after_u = 1.0;
            s.btran_average_after_r = 1.0;
            s.btran_average_after_l = 1.0;
        }
        s.number_ftran_counts = 0;
        s.number_btran_counts = 0;
    }
    s.ftran_count_input *= STATISTICS_DECAY;
    s.ftran_count_after_l *= STATISTICS_DECAY;
    s.ftran_count_after_r *= STATISTICS_DECAY;
    s.ftran_count_after_u *= STATISTICS_DECAY;
    s.btran_count_input *= STATISTICS_DECAY;
    s.btran_count_after_u *= STATISTICS_DECAY;
    s.btran_count_after_r *= STATISTICS_DECAY;
    s.btran_count_after_l *= STATISTICS_DECAY;
}

/// Pick the traversal for a triangular solve with `nnz` nonzeros on input
/// whose density has grown by `average` in recent solves (0 when unknown).
pub(crate) fn choose_strategy(lu: &LU, nnz: usize, average: f64) -> Strategy {
    if lu.sparse_threshold == 0 || lu.sparse.is_none() {
        return Strategy::Densish;
    }
    let thres = lu.sparse_threshold as f64;
    if average > 0.0 {
        let predicted = nnz as f64 * average;
        if predicted < thres {
            Strategy::Sparse
        } else if predicted < lu.sparse_threshold2 as f64 {
            Strategy::Sparsish
        } else {
            Strategy::Densish
        }
    } else if (nnz as f64) < thres {
        Strategy::Sparse
    } else {
        Strategy::Densish
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn automatic_thresholds_depend_on_size() {
        let mut lu = LU::new();
        lu.m = 100;
        lu.max_extra = 100;
        go_sparse(&mut lu);
        assert_eq!(lu.sparse_threshold, 0);
        assert!(lu.sparse.is_none());

        lu.m = 1200;
        lu.max_extra = 1200;
        resize(&mut lu.l_begin, 1201);
        go_sparse(&mut lu);
        assert_eq!(lu.sparse_threshold, 200);
        assert_eq!(lu.sparse_threshold2, 600);
        assert!(lu.l_row_copy);

        lu.m = 20000;
        lu.max_extra = 20000;
        lu.l_row_copy = false;
        resize(&mut lu.l_begin, 20001);
        go_sparse(&mut lu);
        assert_eq!(lu.sparse_threshold, 500);
        assert_eq!(lu.sparse_threshold2, 2500);
    }

    #[test]
    fn strategy_follows_prediction() {
        let mut lu = LU::new();
        lu.m = 10;
        lu.max_extra = 10;
        lu.sparse_setting = SparseSetting::Fixed(4, 8);
        resize(&mut lu.l_begin, 11);
        go_sparse(&mut lu);
        assert_eq!((lu.sparse_threshold, lu.sparse_threshold2), (4, 8));
        assert_eq!(choose_strategy(&lu, 3, 0.0), Strategy::Sparse);
        assert_eq!(choose_strategy(&lu, 5, 0.0), Strategy::Densish);
        assert_eq!(choose_strategy(&lu, 3, 2.0), Strategy::Sparsish);
        assert_eq!(choose_strategy(&lu, 1, 2.0), Strategy::Sparse);
        assert_eq!(choose_strategy(&lu, 5, 2.0), Strategy::Densish);

        lu.sparse_setting = SparseSetting::Disabled;
        go_sparse(&mut lu);
        assert_eq!(choose_strategy(&lu, 1, 0.0), Strategy::Densish);
    }
}
