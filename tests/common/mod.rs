// Copyright (C) 2026 The etalu developers

#![allow(dead_code)]

use etalu::{CscMatrix, Factorization, IndexedVector, SparseMatrix};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random nonsingular basis of dimension `m`: `nslack` unit columns and
/// columns with about `nnz_col` off-diagonal entries that are diagonally
/// dominant, with rows shuffled.
pub fn random_basis(rng: &mut StdRng, m: usize, nslack: usize, nnz_col: usize) -> CscMatrix {
    let mut rows: Vec<usize> = (0..m).collect();
    rows.shuffle(rng);
    let mut t = vec![];
    for j in 0..m {
        if j < nslack {
            t.push((rows[j], j, 1.0));
            continue;
        }
        let mut sum = 0.0;
        for _ in 0..nnz_col {
            let i = rows[rng.gen_range(0..m)];
            if i == rows[j] {
                continue;
            }
            let x: f64 = rng.gen_range(-1.0..1.0);
            sum += x.abs();
            t.push((i, j, x));
        }
        let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        t.push((rows[j], j, sign * (1.0 + sum + rng.gen::<f64>())));
    }
    CscMatrix::from_triplets(m, m, &t).unwrap()
}

/// Random sparse column with `nnz` entries (duplicates summed).
pub fn random_column(rng: &mut StdRng, m: usize, nnz: usize) -> (Vec<usize>, Vec<f64>) {
    let mut dense = vec![0.0; m];
    for _ in 0..nnz {
        dense[rng.gen_range(0..m)] += rng.gen_range(-2.0..2.0);
    }
    let mut rows = vec![];
    let mut vals = vec![];
    for (i, &x) in dense.iter().enumerate() {
        if x != 0.0 {
            rows.push(i);
            vals.push(x);
        }
    }
    (rows, vals)
}

pub fn random_dense(rng: &mut StdRng, m: usize, nnz: usize) -> Vec<f64> {
    let (rows, vals) = random_column(rng, m, nnz);
    let mut x = vec![0.0; m];
    for (i, v) in rows.into_iter().zip(vals) {
        x[i] = v;
    }
    x
}

pub fn column_dense(b: &CscMatrix, j: usize) -> Vec<f64> {
    let mut x = vec![0.0; b.rows()];
    for (&i, &v) in b.col_indices(j).iter().zip(b.col_values(j)) {
        x[i] = v;
    }
    x
}

/// Solve `B x = b` through the factorization.
pub fn ftran(f: &mut Factorization, b: &[f64]) -> Vec<f64> {
    let mut work = f.new_work_vector();
    let mut rhs = IndexedVector::from_dense(b);
    f.update_column(&mut work, &mut rhs, false);
    assert!(work.is_clean());
    rhs.to_dense(b.len())
}

/// Solve `B' y = c` through the factorization.
pub fn btran(f: &mut Factorization, c: &[f64]) -> Vec<f64> {
    let mut work = f.new_work_vector();
    let mut rhs = IndexedVector::from_dense(c);
    f.update_column_transpose(&mut work, &mut rhs);
    assert!(work.is_clean());
    rhs.to_dense(c.len())
}

pub fn max_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (x, y)| f64::max(acc, (x - y).abs()))
}

/// Check `B x = b` and `B' y = c` for a few random right-hand sides.
pub fn assert_solves(f: &mut Factorization, basis: &CscMatrix, rng: &mut StdRng) {
    let m = basis.rows();
    for nnz in [1, 3, m / 2 + 1] {
        let b = random_dense(rng, m, nnz);
        let x = ftran(f, &b);
        let r = basis.mul_vec(&x);
        assert!(max_diff(&r, &b) < 1e-9, "ftran residual {:e}", max_diff(&r, &b));

        let c = random_dense(rng, m, nnz);
        let y = btran(f, &c);
        let r = basis.mul_transpose_vec(&y);
        assert!(max_diff(&r, &c) < 1e-9, "btran residual {:e}", max_diff(&r, &c));
    }
}

pub fn assert_permutations(f: &Factorization) {
    let permute = f.permute();
    let permute_back = f.permute_back();
    for i in 0..f.rows_extra() {
        assert_eq!(permute_back[permute[i]], i);
    }
    let pivot_column = f.pivot_column();
    let pivot_column_back = f.pivot_column_back();
    for k in 0..f.rows() {
        assert_eq!(pivot_column_back[pivot_column[k]], k);
    }
    let live = pivot_column_back.iter().filter(|&&k| k != usize::MAX).count();
    assert_eq!(live, f.rows());
}
