// Copyright (C) 2026 The etalu developers

mod common;

use common::*;
use etalu::{CscMatrix, Error, Factorization, IndexedVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn round_trip_small_and_large() {
    init();
    let rng = &mut StdRng::seed_from_u64(0);
    for &(m, nslack) in &[(1, 0), (8, 3), (60, 20), (450, 150)] {
        let basis = random_basis(rng, m, nslack, 3);
        let mut f = Factorization::new();
        f.factorize(&basis).unwrap();
        assert_eq!(f.number_pivots(), 0);
        assert!(f.number_slacks() >= nslack);
        assert_solves(&mut f, &basis, rng);
        assert_permutations(&f);
    }
}

#[test]
fn automatic_sparse_setup_for_large_bases() {
    init();
    let rng = &mut StdRng::seed_from_u64(1);
    let mut f = Factorization::new();
    f.factorize(&random_basis(rng, 50, 10, 2)).unwrap();
    assert_eq!(f.sparse_thresholds(), (0, 0));
    assert!(!f.is_sparse());

    f.factorize(&random_basis(rng, 600, 200, 2)).unwrap();
    assert_eq!(f.sparse_thresholds(), (100, 300));
    assert!(f.is_sparse());
}

#[test]
fn slack_basis_scales_by_slack_value() {
    init();
    for slack_value in [1.0, -1.0] {
        let m = 6;
        let t: Vec<_> = (0..m).map(|i| (i, i, slack_value)).collect();
        let basis = CscMatrix::from_triplets(m, m, &t).unwrap();
        let mut f = Factorization::new();
        f.set_slack_value(slack_value).unwrap();
        f.factorize(&basis).unwrap();
        assert_eq!(f.number_slacks(), m);

        let b = [0.0, 2.0, 0.0, -3.0, 0.5, 0.0];
        let x = ftran(&mut f, &b);
        let y = btran(&mut f, &b);
        for i in 0..m {
            assert_eq!(x[i], b[i] * slack_value);
            assert_eq!(y[i], b[i] * slack_value);
        }
    }
}

#[test]
fn packed_and_full_mode_agree() {
    init();
    let rng = &mut StdRng::seed_from_u64(2);
    let m = 40;
    let basis = random_basis(rng, m, 10, 3);
    let mut f = Factorization::new();
    f.factorize(&basis).unwrap();

    let (rows, vals) = random_column(rng, m, 5);
    let entries: Vec<(usize, f64)> = rows.iter().copied().zip(vals.iter().copied()).collect();
    let mut dense = vec![0.0; m];
    for &(i, x) in &entries {
        dense[i] = x;
    }

    let mut work = f.new_work_vector();
    let mut packed = IndexedVector::from_packed(m, &entries);
    let nz = f.update_column(&mut work, &mut packed, false);
    assert!(packed.packed_mode());
    assert_eq!(nz, packed.num_elements());
    let full = ftran(&mut f, &dense);
    assert!(max_diff(&packed.to_dense(m), &full) < 1e-14);

    let mut packed = IndexedVector::from_packed(m, &entries);
    f.update_column_transpose(&mut work, &mut packed);
    let full = btran(&mut f, &dense);
    assert!(max_diff(&packed.to_dense(m), &full) < 1e-14);
}

#[test]
fn strategies_give_the_same_solutions() {
    init();
    let rng = &mut StdRng::seed_from_u64(3);
    let m = 120;
    let basis = random_basis(rng, m, 30, 3);
    let rhs: Vec<Vec<f64>> = (0..6).map(|k| random_dense(rng, m, 1 + 10 * k)).collect();

    let mut reference = Factorization::new();
    reference.set_sparse_threshold(0);
    reference.factorize(&basis).unwrap();
    assert!(!reference.is_sparse());

    // a huge threshold picks depth first search, a tiny one scans
    for threshold in [1, 8, 40, m * 10] {
        let mut f = Factorization::new();
        f.set_sparse_threshold(threshold);
        f.factorize(&basis).unwrap();
        assert!(f.is_sparse());
        for b in &rhs {
            let x0 = ftran(&mut reference, b);
            let x1 = ftran(&mut f, b);
            assert!(max_diff(&x0, &x1) < 1e-12);
            let y0 = btran(&mut reference, b);
            let y1 = btran(&mut f, b);
            assert!(max_diff(&y0, &y1) < 1e-12);
        }
    }
}

#[test]
fn sparsish_solves_agree_after_updates() {
    init();
    let rng = &mut StdRng::seed_from_u64(9);
    let m = 120;
    let mut basis = random_basis(rng, m, 30, 3);

    // full scans, depth first search, and (once the density statistics
    // exist) the sparsish scan for every triangular solve
    let mut engines: Vec<Factorization> = (0..3).map(|_| Factorization::new()).collect();
    engines[0].set_sparse_threshold(0);
    engines[1].set_sparse_thresholds(m * 100, m * 100).unwrap();
    engines[2].set_sparse_thresholds(1, usize::MAX).unwrap();
    for f in engines.iter_mut() {
        f.factorize(&basis).unwrap();
    }
    assert_eq!(engines[2].sparse_thresholds(), (1, usize::MAX));

    let warm_up: Vec<Vec<f64>> = (0..8).map(|k| random_dense(rng, m, 1 + 5 * k)).collect();
    for f in engines.iter_mut() {
        for n in 0..120 {
            let b = &warm_up[n % warm_up.len()];
            ftran(f, b);
            btran(f, b);
        }
    }

    for _ in 0..10 {
        let (rows, vals) = random_column(rng, m, 4);
        let mut a = vec![0.0; m];
        for (&i, &x) in rows.iter().zip(&vals) {
            a[i] = x;
        }
        let y = ftran(&mut engines[0], &a);
        let k = (0..m)
            .max_by(|&p, &q| y[p].abs().total_cmp(&y[q].abs()))
            .unwrap();
        for f in engines.iter_mut() {
            let mut work = f.new_work_vector();
            let mut col = IndexedVector::from_dense(&a);
            f.update_column_ft(&mut work, &mut col);
            let alpha = col.get(k);
            assert!(f.replace_column(&mut work, &col, k, alpha).is_accepted());
        }
        basis.set_column(k, &rows, &vals);

        let b = random_dense(rng, m, 6);
        let x0 = ftran(&mut engines[0], &b);
        let y0 = btran(&mut engines[0], &b);
        for f in engines[1..].iter_mut() {
            assert!(max_diff(&x0, &ftran(f, &b)) < 1e-12);
            assert!(max_diff(&y0, &btran(f, &b)) < 1e-12);
        }
    }
    assert_solves(&mut engines[2], &basis, rng);
}

#[test]
fn go_sparse_is_idempotent() {
    init();
    let rng = &mut StdRng::seed_from_u64(4);
    let m = 30;
    let basis = random_basis(rng, m, 5, 3);
    let mut f = Factorization::new();
    f.set_sparse_threshold(6);
    f.factorize(&basis).unwrap();
    let b = random_dense(rng, m, 4);
    let x = ftran(&mut f, &b);
    f.go_sparse();
    f.go_sparse();
    assert!(f.is_sparse());
    assert_eq!(f.sparse_thresholds(), (6, 6));
    assert_eq!(ftran(&mut f, &b), x);
}

#[test]
fn unpermuted_solve_uses_pivot_positions() {
    init();
    let rng = &mut StdRng::seed_from_u64(5);
    let m = 25;
    let basis = random_basis(rng, m, 5, 3);
    let mut f = Factorization::new();
    f.factorize(&basis).unwrap();

    let b = random_dense(rng, m, 6);
    let x = ftran(&mut f, &b);

    let permute = f.permute().to_vec();
    let pivot_column = f.pivot_column().to_vec();
    let mut work = f.new_work_vector();
    let mut rhs = f.new_work_vector();
    for i in 0..m {
        if b[i] != 0.0 {
            rhs.insert(permute[i], b[i]);
        }
    }
    f.update_column(&mut work, &mut rhs, true);
    let xp = rhs.to_dense(f.work_size());
    for k in 0..m {
        assert!((xp[pivot_column[k]] - x[k]).abs() < 1e-14);
    }
}

#[test]
fn singular_basis_keeps_previous_factorization() {
    init();
    let rng = &mut StdRng::seed_from_u64(6);
    let m = 10;
    let basis = random_basis(rng, m, 2, 2);
    let mut f = Factorization::new();
    f.factorize(&basis).unwrap();

    let mut singular = basis.clone();
    let first = column_dense(&basis, 4);
    let rows: Vec<usize> = (0..m).filter(|&i| first[i] != 0.0).collect();
    let vals: Vec<f64> = rows.iter().map(|&i| 2.0 * first[i]).collect();
    singular.set_column(7, &rows, &vals);

    match f.factorize(&singular) {
        Err(Error::SingularBasis { position }) => assert!(position == 4 || position == 7),
        other => panic!("expected a singular basis, got {:?}", other),
    }
    assert!(f.is_factorized());
    assert_solves(&mut f, &basis, rng);
}

#[test]
fn statistics_do_not_change_results() {
    init();
    let rng = &mut StdRng::seed_from_u64(7);
    let m = 400;
    let basis = random_basis(rng, m, 100, 3);
    let mut f = Factorization::new();
    f.factorize(&basis).unwrap();
    // enough solves to fold the density counts into averages twice
    for _ in 0..250 {
        let b = random_dense(rng, m, 3);
        let x = ftran(&mut f, &b);
        assert!(max_diff(&basis.mul_vec(&x), &b) < 1e-9);
    }
    f.reset_statistics();
    assert_solves(&mut f, &basis, rng);
}
