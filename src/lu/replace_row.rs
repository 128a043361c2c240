// Copyright (C) 2026 The etalu developers

use crate::error::{Error, Result};
use crate::lu::build_factors::build_row_view;
use crate::lu::check_factors::check_factors;
use crate::lu::def::NONE;
use crate::lu::file::file_reserve;
use crate::lu::lu::*;
use crate::status::Status;
use log::debug;

// Both operations edit rows of U that belong to slacks. Such a row has a unit
// pivot and, as its column is empty, it can be filled or cleared without
// touching L or R. Indices are pivot positions.

fn check_slack_row(lu: &LU, row: usize) -> Result<()> {
    if !lu.is_live_pivot(row) {
        return Err(Error::InvalidRow {
            row,
            reason: "not a pivot position in use",
        });
    }
    if lu.pivot_recip[row].abs() != 1.0 || lu.u_end[row] != lu.u_begin[row] {
        return Err(Error::InvalidRow {
            row,
            reason: "pivot does not belong to a slack",
        });
    }
    Ok(())
}

/// Set the entries of U in slack pivot row `row`, which must be empty, to
/// `elements` at pivot positions `columns`. Every column must be a distinct
/// pivot position in use after `row`.
///
/// Returns [`Status::NoRoom`], with the factors unchanged, when the column
/// file cannot take the new entries even after compression.
pub(crate) fn replace_row(
    lu: &mut LU,
    row: usize,
    columns: &[usize],
    elements: &[f64],
) -> Result<Status> {
    if !lu.factorized {
        return Err(Error::NotFactorized);
    }
    check_slack_row(lu, row)?;
    if lu.w_end[row] != lu.w_begin[row] {
        return Err(Error::InvalidRow {
            row,
            reason: "row already holds entries",
        });
    }
    if columns.len() != elements.len() {
        return Err(Error::DimensionMismatch {
            arg: "elements",
            expected: columns.len(),
            got: elements.len(),
        });
    }
    let mut sorted = columns.to_vec();
    sorted.sort_unstable();
    let duplicate = sorted.windows(2).any(|w| w[0] == w[1]);
    if duplicate || columns.iter().any(|&j| j <= row || !lu.is_live_pivot(j)) {
        return Err(Error::InvalidRow {
            row,
            reason: "columns must be distinct pivots after the row",
        });
    }

    // the candidate column lives in space a compression may reuse
    lu.spike = Spike::default();

    let nlines = lu.max_extra;
    let room = file_reserve(
        nlines,
        &mut lu.u_begin,
        &mut lu.u_end,
        &mut lu.u_next,
        &mut lu.u_prev,
        &mut lu.u_index,
        &mut lu.u_value,
        columns,
        NONE,
        1,
    );
    if !room {
        // compression may have moved columns
        build_row_view(lu);
        debug!("no room in column file of U to replace row {}", row);
        return Ok(Status::NoRoom);
    }
    for (&j, &x) in columns.iter().zip(elements) {
        let pos = lu.u_end[j];
        lu.u_index[pos] = row;
        lu.u_value[pos] = x * lu.pivot_recip[j];
        lu.u_end[j] += 1;
    }
    build_row_view(lu);

    if cfg!(feature = "debug") {
        assert_eq!(check_factors(lu), 0);
    }
    Ok(Status::Ok)
}

/// Remove all entries of U in the given slack pivot rows.
pub(crate) fn empty_rows(lu: &mut LU, rows: &[usize]) -> Result<()> {
    if !lu.factorized {
        return Err(Error::NotFactorized);
    }
    for &row in rows {
        check_slack_row(lu, row)?;
    }
    let mut delete = vec![false; lu.rows_extra];
    for &row in rows {
        delete[row] = true;
    }
    for j in 0..lu.rows_extra {
        let mut put = lu.u_begin[j];
        for pos in lu.u_begin[j]..lu.u_end[j] {
            let i = lu.u_index[pos];
            if !delete[i] {
                lu.u_index[put] = i;
                lu.u_value[put] = lu.u_value[pos];
                put += 1;
            }
        }
        lu.u_end[j] = put;
    }
    lu.spike = Spike::default();
    build_row_view(lu);

    if cfg!(feature = "debug") {
        assert_eq!(check_factors(lu), 0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lu::factorize::factorize;
    use crate::sparse::CscMatrix;

    fn slack_basis(m: usize) -> CscMatrix {
        let t: Vec<_> = (0..m).map(|i| (i, i, 1.0)).collect();
        CscMatrix::from_triplets(m, m, &t).unwrap()
    }

    #[test]
    fn fill_and_clear_slack_row() {
        let mut lu = LU::new();
        factorize(&mut lu, &slack_basis(5)).unwrap();
        let status = replace_row(&mut lu, 1, &[3, 4], &[2.0, -1.0]).unwrap();
        assert_eq!(status, Status::Ok);
        assert_eq!(check_factors(&lu), 0);
        assert_eq!(lu.w_end[1] - lu.w_begin[1], 2);

        // the row now has entries
        assert!(replace_row(&mut lu, 1, &[2], &[1.0]).is_err());

        empty_rows(&mut lu, &[1]).unwrap();
        assert_eq!(check_factors(&lu), 0);
        assert_eq!(lu.u_elements(), 0);
        assert_eq!(lu.w_end[1], lu.w_begin[1]);
    }

    #[test]
    fn rejects_bad_columns() {
        let mut lu = LU::new();
        factorize(&mut lu, &slack_basis(4)).unwrap();
        assert!(replace_row(&mut lu, 2, &[1], &[1.0]).is_err());
        assert!(replace_row(&mut lu, 0, &[3, 3], &[1.0, 1.0]).is_err());
        assert!(replace_row(&mut lu, 0, &[3], &[]).is_err());
        assert!(replace_row(&mut lu, 9, &[3], &[1.0]).is_err());
        assert_eq!(check_factors(&lu), 0);
    }
}
