// Copyright (C) 2026 The etalu developers

use crate::error::{Error, Result};

/// Column access to a sparse matrix.
///
/// Column `j` holds the entries `indices()[k]`, `values()[k]` for
/// `k` in `col_start(j)..col_start(j) + col_len(j)`. Row indices need not be
/// sorted but must not repeat within a column.
pub trait SparseMatrix {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn col_start(&self, j: usize) -> usize;
    fn col_len(&self, j: usize) -> usize;
    fn indices(&self) -> &[usize];
    fn values(&self) -> &[f64];

    /// Row indices of column `j`.
    fn col_indices(&self, j: usize) -> &[usize] {
        let start = self.col_start(j);
        &self.indices()[start..start + self.col_len(j)]
    }

    /// Values of column `j`.
    fn col_values(&self, j: usize) -> &[f64] {
        let start = self.col_start(j);
        &self.values()[start..start + self.col_len(j)]
    }
}

/// Compressed sparse column matrix.
#[derive(Debug, Clone, Default)]
pub struct CscMatrix {
    nrows: usize,
    ncols: usize,
    colptr: Vec<usize>,
    rowidx: Vec<usize>,
    values: Vec<f64>,
}

impl CscMatrix {
    /// Build from column pointers, row indices and values.
    pub fn new(
        nrows: usize,
        ncols: usize,
        colptr: Vec<usize>,
        rowidx: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if colptr.len() != ncols + 1 {
            return Err(Error::DimensionMismatch {
                arg: "colptr",
                expected: ncols + 1,
                got: colptr.len(),
            });
        }
        let nnz = colptr[ncols];
        if rowidx.len() != nnz || values.len() != nnz {
            return Err(Error::DimensionMismatch {
                arg: "rowidx",
                expected: nnz,
                got: rowidx.len().min(values.len()),
            });
        }
        if let Some(&i) = rowidx.iter().find(|&&i| i >= nrows) {
            return Err(Error::DimensionMismatch {
                arg: "row index",
                expected: nrows,
                got: i,
            });
        }
        Ok(Self {
            nrows,
            ncols,
            colptr,
            rowidx,
            values,
        })
    }

    /// Build from `(row, col, value)` triplets. Duplicates are summed and
    /// explicit zeros dropped.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, f64)]) -> Result<Self> {
        let mut dense_cols: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ncols];
        for &(i, j, v) in triplets {
            if i >= nrows || j >= ncols {
                return Err(Error::DimensionMismatch {
                    arg: "triplet",
                    expected: nrows.max(ncols),
                    got: i.max(j),
                });
            }
            dense_cols[j].push((i, v));
        }
        let mut colptr = Vec::with_capacity(ncols + 1);
        let mut rowidx = Vec::new();
        let mut values = Vec::new();
        colptr.push(0);
        for mut col in dense_cols {
            col.sort_by_key(|&(i, _)| i);
            let mut k = 0;
            while k < col.len() {
                let i = col[k].0;
                let mut v = 0.0;
                while k < col.len() && col[k].0 == i {
                    v += col[k].1;
                    k += 1;
                }
                if v != 0.0 {
                    rowidx.push(i);
                    values.push(v);
                }
            }
            colptr.push(rowidx.len());
        }
        Self::new(nrows, ncols, colptr, rowidx, values)
    }

    /// Replace column `j` by the given entries.
    pub fn set_column(&mut self, j: usize, rows: &[usize], vals: &[f64]) {
        let start = self.colptr[j];
        let end = self.colptr[j + 1];
        let delta = rows.len() as isize - (end - start) as isize;
        self.rowidx.splice(start..end, rows.iter().copied());
        self.values.splice(start..end, vals.iter().copied());
        for p in &mut self.colptr[j + 1..] {
            *p = (*p as isize + delta) as usize;
        }
    }

    /// `y = A * x`
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.nrows];
        for j in 0..self.ncols {
            let xj = x[j];
            if xj != 0.0 {
                for p in self.colptr[j]..self.colptr[j + 1] {
                    y[self.rowidx[p]] += self.values[p] * xj;
                }
            }
        }
        y
    }

    /// `y = A' * x`
    pub fn mul_transpose_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.ncols)
            .map(|j| {
                (self.colptr[j]..self.colptr[j + 1])
                    .map(|p| self.values[p] * x[self.rowidx[p]])
                    .sum()
            })
            .collect()
    }
}

impl SparseMatrix for CscMatrix {
    fn rows(&self) -> usize {
        self.nrows
    }
    fn cols(&self) -> usize {
        self.ncols
    }
    fn col_start(&self, j: usize) -> usize {
        self.colptr[j]
    }
    fn col_len(&self, j: usize) -> usize {
        self.colptr[j + 1] - self.colptr[j]
    }
    fn indices(&self) -> &[usize] {
        &self.rowidx
    }
    fn values(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triplets_are_summed_and_sorted() {
        let a = CscMatrix::from_triplets(3, 2, &[(2, 0, 1.0), (0, 0, 2.0), (2, 0, 3.0), (1, 1, 0.0)])
            .unwrap();
        assert_eq!(a.col_indices(0), &[0, 2]);
        assert_eq!(a.col_values(0), &[2.0, 4.0]);
        assert_eq!(a.col_len(1), 0);
    }

    #[test]
    fn products() {
        let a = CscMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 0, 2.0), (0, 1, 3.0)]).unwrap();
        assert_eq!(a.mul_vec(&[1.0, 1.0]), vec![4.0, 2.0]);
        assert_eq!(a.mul_transpose_vec(&[1.0, 1.0]), vec![3.0, 3.0]);
    }

    #[test]
    fn set_column_shifts_pointers() {
        let mut a = CscMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 1, 2.0)]).unwrap();
        a.set_column(0, &[0, 1], &[5.0, 6.0]);
        assert_eq!(a.col_values(0), &[5.0, 6.0]);
        assert_eq!(a.col_values(1), &[2.0]);
    }

    #[test]
    fn rejects_bad_pointers() {
        assert!(CscMatrix::new(2, 2, vec![0, 1], vec![0], vec![1.0]).is_err());
    }
}
