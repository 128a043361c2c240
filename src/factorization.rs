// Copyright (C) 2026 The etalu developers

use crate::error::{Error, Result};
use crate::indexed_vector::IndexedVector;
use crate::lu::def::SparseSetting;
use crate::lu::{
    empty_rows, factorize, go_sparse, replace_column, replace_row, update_column,
    update_column_ft, update_column_transpose, update_two_columns_ft, LU,
};
use crate::sparse::SparseMatrix;
use crate::status::Status;

/// LU factorization of a simplex basis with Forrest-Tomlin or product form
/// updates.
///
/// A factorization is built with [`factorize`](Self::factorize). It then
/// answers FTRAN ([`update_column`](Self::update_column)) and BTRAN
/// ([`update_column_transpose`](Self::update_column_transpose)) and accepts
/// basis column replacements until the caller refactorizes, typically when
/// an update returns a status that is not accepted.
///
/// Solves use a caller owned work vector that must hold at least
/// [`work_size`](Self::work_size) positions and be empty between calls;
/// [`new_work_vector`](Self::new_work_vector) creates a suitable one.
///
/// # Panics
///
/// Solves and updates panic when called before a successful
/// factorization or with vectors too small for the basis.
#[derive(Debug, Clone)]
pub struct Factorization {
    lu: LU,
}

impl Default for Factorization {
    fn default() -> Self {
        Self::new()
    }
}

impl Factorization {
    /// Create an engine with default parameters: pivot tolerance 0.1, zero
    /// tolerance 1e-13, slack value 1, at most 200 updates, Forrest-Tomlin
    /// updates, area factor 2 and automatic sparse thresholds.
    pub fn new() -> Self {
        Self { lu: LU::new() }
    }

    /// Factorize the square basis matrix `basis`.
    ///
    /// Discards all updates. On [`Error::SingularBasis`] the previous
    /// factorization is kept unchanged.
    pub fn factorize<M: SparseMatrix>(&mut self, basis: &M) -> Result<()> {
        factorize(&mut self.lu, basis)
    }

    fn check_vectors(&self, work: &IndexedVector, rhs: &IndexedVector, rhs_size: usize) {
        assert!(self.lu.factorized, "no factorization");
        assert!(work.size() >= self.lu.max_extra, "work vector too small");
        assert!(rhs.size() >= rhs_size, "vector too small");
    }

    /// FTRAN: overwrite `rhs` with the solution of `B x = rhs`.
    ///
    /// The right-hand side is given in natural row indices and the solution
    /// is returned in basis positions, in the same (packed or full) mode.
    /// With `no_permute` both are indexed by pivot position instead and
    /// `rhs` must be as large as the work vector. Returns the number of
    /// nonzeros in the solution.
    pub fn update_column(
        &mut self,
        work: &mut IndexedVector,
        rhs: &mut IndexedVector,
        no_permute: bool,
    ) -> usize {
        let size = if no_permute { self.lu.max_extra } else { self.lu.m };
        self.check_vectors(work, rhs, size);
        update_column(&mut self.lu, work, rhs, no_permute, false)
    }

    /// FTRAN of an entering column. With Forrest-Tomlin updates the
    /// partially transformed column is kept for the next
    /// [`replace_column`](Self::replace_column).
    pub fn update_column_ft(&mut self, work: &mut IndexedVector, rhs: &mut IndexedVector) -> usize {
        self.check_vectors(work, rhs, self.lu.m);
        update_column_ft(&mut self.lu, work, rhs)
    }

    /// FTRAN of an entering column and of a second right-hand side. Only the
    /// first is kept for the next update.
    pub fn update_two_columns_ft(
        &mut self,
        work: &mut IndexedVector,
        rhs_ft: &mut IndexedVector,
        rhs_other: &mut IndexedVector,
    ) -> (usize, usize) {
        self.check_vectors(work, rhs_ft, self.lu.m);
        self.check_vectors(work, rhs_other, self.lu.m);
        update_two_columns_ft(&mut self.lu, work, rhs_ft, rhs_other)
    }

    /// BTRAN: overwrite `rhs` with the solution of `B' y = rhs`.
    ///
    /// The right-hand side is given in basis positions and the solution is
    /// returned in natural row indices, in the same mode. Returns the number
    /// of nonzeros in the solution.
    pub fn update_column_transpose(
        &mut self,
        work: &mut IndexedVector,
        rhs: &mut IndexedVector,
    ) -> usize {
        self.check_vectors(work, rhs, self.lu.m);
        update_column_transpose(&mut self.lu, work, rhs)
    }

    /// Replace the basis column at position `k`.
    ///
    /// `column` is the FTRAN of the entering column (as returned by
    /// [`update_column_ft`](Self::update_column_ft)) and `alpha` its entry at
    /// position `k`. Unless the returned status is accepted the
    /// factorization is unchanged.
    pub fn replace_column(
        &mut self,
        work: &mut IndexedVector,
        column: &IndexedVector,
        k: usize,
        alpha: f64,
    ) -> Status {
        self.check_vectors(work, column, self.lu.m);
        assert!(k < self.lu.m, "basis position out of range");
        replace_column(&mut self.lu, work, column, k, alpha)
    }

    /// Fill the empty row of U at slack pivot position `row` with `elements`
    /// in the pivot positions `columns`.
    pub fn replace_row(&mut self, row: usize, columns: &[usize], elements: &[f64]) -> Result<Status> {
        replace_row(&mut self.lu, row, columns, elements)
    }

    /// Remove all entries of U in the given slack pivot rows.
    pub fn empty_rows(&mut self, rows: &[usize]) -> Result<()> {
        empty_rows(&mut self.lu, rows)
    }

    /// Set up the sparse solves (thresholds, scratch area and row copy of L)
    /// if that has not been done for the current factorization.
    pub fn go_sparse(&mut self) {
        if self.lu.factorized {
            go_sparse(&mut self.lu);
        }
    }

    /// An empty work vector of [`work_size`](Self::work_size) positions.
    pub fn new_work_vector(&self) -> IndexedVector {
        IndexedVector::new(self.work_size())
    }

    /// Positions a work vector needs: the number of rows plus the maximum
    /// number of updates.
    pub fn work_size(&self) -> usize {
        usize::max(self.lu.max_extra, self.lu.m + self.lu.maximum_pivots)
    }

    // Configuration //

    /// Relative threshold for pivots of the factorization, in (0,1].
    pub fn set_pivot_tolerance(&mut self, value: f64) -> Result<()> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(invalid("pivot_tolerance", value, "must be in (0,1]"));
        }
        self.lu.pivot_tolerance = value;
        Ok(())
    }

    /// Values at or below this magnitude are dropped, in (0,1).
    pub fn set_zero_tolerance(&mut self, value: f64) -> Result<()> {
        if !(value > 0.0 && value < 1.0) {
            return Err(invalid("zero_tolerance", value, "must be in (0,1)"));
        }
        self.lu.zero_tolerance = value;
        Ok(())
    }

    /// Value of the nonzero in slack columns, 1 or -1. Applies from the next
    /// factorization.
    pub fn set_slack_value(&mut self, value: f64) -> Result<()> {
        if value != 1.0 && value != -1.0 {
            return Err(invalid("slack_value", value, "must be 1 or -1"));
        }
        self.lu.slack_value = value;
        Ok(())
    }

    /// Number of updates before refactorization is required. Storage is
    /// sized for it at the next factorization.
    pub fn set_maximum_pivots(&mut self, value: usize) -> Result<()> {
        if value == 0 {
            return Err(invalid("maximum_pivots", 0.0, "must be positive"));
        }
        self.lu.maximum_pivots = value;
        Ok(())
    }

    /// Fix the sparse threshold: vectors with fewer nonzeros than `value`
    /// are solved by depth first search. Zero disables sparse solves.
    pub fn set_sparse_threshold(&mut self, value: usize) {
        self.lu.sparse_setting = if value == 0 {
            SparseSetting::Disabled
        } else {
            SparseSetting::Fixed(value, value)
        };
        self.lu.l_row_copy = false;
        self.go_sparse();
    }

    /// Fix both sparse thresholds. Once density statistics exist, triangular
    /// solves whose predicted result has fewer than `threshold` nonzeros use
    /// depth first search, those below `threshold2` the sparsish scan, and
    /// all others the full scan. `threshold2` must not be below `threshold`;
    /// a zero `threshold` disables sparse solves.
    pub fn set_sparse_thresholds(&mut self, threshold: usize, threshold2: usize) -> Result<()> {
        if threshold2 < threshold {
            return Err(invalid(
                "sparse_threshold2",
                threshold2 as f64,
                "must not be below the sparse threshold",
            ));
        }
        self.lu.sparse_setting = if threshold == 0 {
            SparseSetting::Disabled
        } else {
            SparseSetting::Fixed(threshold, threshold2)
        };
        self.lu.l_row_copy = false;
        self.go_sparse();
        Ok(())
    }

    /// Let the sparse thresholds follow the size of the basis (the default).
    pub fn set_sparse_threshold_auto(&mut self) {
        self.lu.sparse_setting = SparseSetting::Auto;
        self.go_sparse();
    }

    /// Choose between Forrest-Tomlin (`true`) and product form updates. Only
    /// possible while no update is pending.
    pub fn set_forrest_tomlin(&mut self, value: bool) -> Result<()> {
        if self.lu.num_pivots > 0 {
            return Err(invalid(
                "forrest_tomlin",
                self.lu.num_pivots as f64,
                "cannot change with updates pending",
            ));
        }
        self.lu.do_forrest_tomlin = value;
        self.lu.spike = Default::default();
        Ok(())
    }

    /// Factor on the tolerances of the Forrest-Tomlin pivot check, positive.
    pub fn set_relax_check(&mut self, value: f64) -> Result<()> {
        if !(value > 0.0 && value.is_finite()) {
            return Err(invalid("relax_check", value, "must be positive"));
        }
        self.lu.relax_check = value;
        Ok(())
    }

    /// Spare memory for updates in relation to the factor sizes. Applies from
    /// the next factorization.
    pub fn set_area_factor(&mut self, value: f64) -> Result<()> {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(invalid("area_factor", value, "must be nonnegative"));
        }
        self.lu.area_factor = value;
        Ok(())
    }

    /// Switch collection of the density statistics that guide the choice of
    /// solve strategies.
    pub fn set_collect_statistics(&mut self, value: bool) {
        self.lu.collect_statistics = value;
    }

    /// Forget the density statistics.
    pub fn reset_statistics(&mut self) {
        self.lu.stats = Default::default();
    }

    // Queries //

    pub fn pivot_tolerance(&self) -> f64 {
        self.lu.pivot_tolerance
    }

    pub fn zero_tolerance(&self) -> f64 {
        self.lu.zero_tolerance
    }

    pub fn slack_value(&self) -> f64 {
        self.lu.slack_value
    }

    pub fn maximum_pivots(&self) -> usize {
        self.lu.maximum_pivots
    }

    pub fn forrest_tomlin(&self) -> bool {
        self.lu.do_forrest_tomlin
    }

    pub fn relax_check(&self) -> f64 {
        self.lu.relax_check
    }

    pub fn area_factor(&self) -> f64 {
        self.lu.area_factor
    }

    /// Thresholds below which the sparse, respectively sparsish, solves are
    /// used. Zero when sparse solves are off.
    pub fn sparse_thresholds(&self) -> (usize, usize) {
        (self.lu.sparse_threshold, self.lu.sparse_threshold2)
    }

    /// True once the row copy of L and the sparse area exist.
    pub fn is_sparse(&self) -> bool {
        self.lu.sparse.is_some() && self.lu.l_row_copy
    }

    pub fn is_factorized(&self) -> bool {
        self.lu.factorized
    }

    /// Dimension of the basis.
    pub fn rows(&self) -> usize {
        self.lu.m
    }

    /// Pivot positions in use or retired: rows plus Forrest-Tomlin updates.
    pub fn rows_extra(&self) -> usize {
        self.lu.rows_extra
    }

    /// Updates since the last factorization.
    pub fn number_pivots(&self) -> usize {
        self.lu.num_pivots
    }

    /// Slack columns found by the last factorization.
    pub fn number_slacks(&self) -> usize {
        self.lu.num_slacks
    }

    /// Pivot position of each natural row, extended by the identity over
    /// the positions added by updates.
    pub fn permute(&self) -> &[usize] {
        &self.lu.permute[..self.lu.rows_extra]
    }

    /// Inverse of [`permute`](Self::permute).
    pub fn permute_back(&self) -> &[usize] {
        &self.lu.permute_back[..self.lu.rows_extra]
    }

    /// Pivot position of each basis position.
    pub fn pivot_column(&self) -> &[usize] {
        &self.lu.pivot_column[..self.lu.m]
    }

    /// Basis position of each pivot position; `usize::MAX` for positions
    /// retired by updates.
    pub fn pivot_column_back(&self) -> &[usize] {
        &self.lu.pivot_column_back[..self.lu.rows_extra]
    }

    /// Nonzeros in L, U and R, excluding diagonals.
    pub fn elements(&self) -> (usize, usize, usize) {
        if !self.lu.factorized {
            return (0, 0, 0);
        }
        (self.lu.l_nz, self.lu.u_elements(), self.lu.r_elements())
    }

    /// Factorizations, accepted updates and accepted Forrest-Tomlin updates
    /// since creation.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.lu.nfactorize, self.lu.nupdate_total, self.lu.nforrest_total)
    }

    /// Seconds spent in the last factorization, solve and update.
    pub fn time_last(&self) -> (f64, f64, f64) {
        (self.lu.time_factorize, self.lu.time_solve, self.lu.time_update)
    }

    /// Seconds spent in factorizations, solves and updates since creation.
    pub fn time_total(&self) -> (f64, f64, f64) {
        (
            self.lu.time_factorize_total,
            self.lu.time_solve_total,
            self.lu.time_update_total,
        )
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> Error {
    Error::InvalidParameter {
        name,
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_reject_invalid_values() {
        let mut f = Factorization::new();
        assert!(f.set_pivot_tolerance(0.0).is_err());
        assert!(f.set_pivot_tolerance(1.5).is_err());
        assert!(f.set_pivot_tolerance(f64::NAN).is_err());
        assert!(f.set_pivot_tolerance(1.0).is_ok());
        assert!(f.set_zero_tolerance(1.0).is_err());
        assert!(f.set_zero_tolerance(-1e-12).is_err());
        assert!(f.set_slack_value(0.5).is_err());
        assert!(f.set_slack_value(-1.0).is_ok());
        assert!(f.set_maximum_pivots(0).is_err());
        assert!(f.set_relax_check(0.0).is_err());
        assert!(f.set_area_factor(-1.0).is_err());
        assert!(f.set_sparse_thresholds(10, 9).is_err());
        assert!(f.set_sparse_thresholds(10, 10).is_ok());

        // rejected values leave the parameters as they were
        assert_eq!(f.pivot_tolerance(), 1.0);
        assert_eq!(f.zero_tolerance(), 1e-13);
        assert_eq!(f.slack_value(), -1.0);
        assert_eq!(f.maximum_pivots(), 200);
    }

    #[test]
    fn rejection_names_the_parameter() {
        let mut f = Factorization::new();
        match f.set_zero_tolerance(2.0) {
            Err(Error::InvalidParameter { name, value, .. }) => {
                assert_eq!(name, "zero_tolerance");
                assert_eq!(value, 2.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
