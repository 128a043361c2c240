// Copyright (C) 2026 The etalu developers

use crate::lu::def::SMALL_PIVOT;
use crate::status::Status;

/// Classify the pivot of a Forrest-Tomlin update.
///
/// `computed` is the new diagonal entry obtained from U, `expected` is the
/// same quantity obtained from the solved column (alpha times the old
/// pivot). The accepted relative disagreement shrinks as updates accumulate
/// and is scaled by `relax`.
pub(crate) fn check_pivot(computed: f64, expected: f64, num_pivots: usize, relax: f64) -> Status {
    let tolerance = relax
        * if num_pivots < 2 {
            1.0e-5
        } else if num_pivots < 10 {
            1.0e-6
        } else if num_pivots < 50 {
            1.0e-8
        } else {
            1.0e-10
        };
    let diff = (computed - expected).abs();
    let test = (1.0 - computed / expected).abs();

    if computed.abs() > SMALL_PIVOT {
        if test < tolerance {
            Status::Ok
        } else if diff < 1.0e-12 || test < 1.0e-8 {
            Status::ProbablyOk
        } else {
            Status::Singular
        }
    } else if test < 1.0e-10 {
        Status::Ok
    } else {
        Status::Singular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_tightens_with_updates() {
        let expected = 2.0;
        let computed = 2.0 * (1.0 + 5.0e-9);
        assert_eq!(check_pivot(computed, expected, 0, 1.0), Status::Ok);
        assert_eq!(check_pivot(computed, expected, 20, 1.0), Status::Ok);
        assert_eq!(check_pivot(computed, expected, 60, 1.0), Status::ProbablyOk);
        assert_eq!(check_pivot(computed, expected, 60, 1000.0), Status::Ok);
    }

    #[test]
    fn disagreement_is_singular() {
        assert_eq!(check_pivot(1.0, 1.1, 0, 1.0), Status::Singular);
        assert_eq!(check_pivot(-1.0, 1.0, 0, 1.0), Status::Singular);
    }

    #[test]
    fn tiny_pivots_need_close_agreement() {
        assert_eq!(check_pivot(1.0e-10, 1.0e-10, 0, 1.0), Status::Ok);
        assert_eq!(check_pivot(1.0e-10, 1.1e-10, 0, 1.0), Status::Singular);
    }
}
