//! Algebraic property tests for the dense matrix library.
//!
//! Random operands come from a seeded generator so failures are reproducible.
//! Rank-deficient operands are built from small integers so that the linear
//! dependencies hold exactly in floating point.

use math_carto_matrix::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> Matrix {
    let values = (0..rows * cols)
        .map(|_| rng.random_range(-1.0..1.0))
        .collect();
    Matrix::from_vec(rows, cols, values).expect("shape matches element count")
}

fn integer_matrix(rows: usize, cols: usize, rng: &mut StdRng) -> Matrix {
    let values = (0..rows * cols)
        .map(|_| rng.random_range(-5..=5) as f64)
        .collect();
    Matrix::from_vec(rows, cols, values).expect("shape matches element count")
}

/// Diagonally dominant, hence well conditioned.
fn well_conditioned(n: usize, rng: &mut StdRng) -> Matrix {
    let noise = random_matrix(n, n, rng);
    noise
        .plus(&Matrix::with_diagonal(n, n, 0.0, n as f64 + 1.0))
        .unwrap()
}

fn assert_moore_penrose(a: &Matrix, tol: f64) {
    let p = a.pinv().expect("pinv should succeed");
    assert_eq!(p.shape(), (a.cols(), a.rows()));

    let apa = a.mult(&p).unwrap().mult(a).unwrap();
    assert!(
        apa.approx_eq(a, tol),
        "A pinv(A) A != A for\n{a}got\n{apa}"
    );

    let pap = p.mult(a).unwrap().mult(&p).unwrap();
    assert!(pap.approx_eq(&p, tol), "pinv(A) A pinv(A) != pinv(A)");

    let ap = a.mult(&p).unwrap();
    assert!(ap.approx_eq(&ap.trans(), tol), "A pinv(A) not symmetric");
    let pa = p.mult(a).unwrap();
    assert!(pa.approx_eq(&pa.trans(), tol), "pinv(A) A not symmetric");
}

#[test]
fn test_addition_properties() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let a = random_matrix(3, 4, &mut rng);
        let b = random_matrix(3, 4, &mut rng);
        let back = a.plus(&b).unwrap().minus(&b).unwrap();
        assert!(back.approx_eq(&a, 1e-14));
        assert!(a.plus(&b).unwrap().approx_eq(&b.plus(&a).unwrap(), 0.0));
    }
}

#[test]
fn test_multiplication_is_associative() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let a = random_matrix(3, 4, &mut rng);
        let b = random_matrix(4, 2, &mut rng);
        let c = random_matrix(2, 5, &mut rng);
        let left = a.mult(&b).unwrap().mult(&c).unwrap();
        let right = a.mult(&b.mult(&c).unwrap()).unwrap();
        assert!(left.approx_eq(&right, 1e-12));
    }
}

#[test]
fn test_transpose_involution() {
    let mut rng = StdRng::seed_from_u64(13);
    let a = random_matrix(4, 7, &mut rng);
    assert_eq!(a.trans().shape(), (7, 4));
    assert_eq!(a.trans().trans(), a);
}

#[test]
fn test_inverse_times_matrix_is_identity() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in [1, 2, 4, 6, 9] {
        let a = well_conditioned(n, &mut rng);
        let inv = a.inv().expect("well conditioned matrix should invert");
        let left = inv.mult(&a).unwrap();
        let right = a.mult(&inv).unwrap();
        assert!(left.approx_eq(&Matrix::identity(n), 1e-12));
        assert!(right.approx_eq(&Matrix::identity(n), 1e-12));
    }
}

#[test]
fn test_det_of_duplicated_row_is_zero() {
    let mut rng = StdRng::seed_from_u64(19);
    for n in [2, 3, 5] {
        let mut a = random_matrix(n, n, &mut rng);
        let first = a.row(0).unwrap();
        a.replace(&first, n - 1, 0).unwrap();
        assert!(a.det().unwrap().abs() < 1e-12);
    }
}

#[test]
fn test_det_is_multiplicative() {
    let mut rng = StdRng::seed_from_u64(23);
    let a = well_conditioned(4, &mut rng);
    let b = well_conditioned(4, &mut rng);
    let ab = a.mult(&b).unwrap();
    let lhs = ab.det().unwrap();
    let rhs = a.det().unwrap() * b.det().unwrap();
    assert!((lhs - rhs).abs() <= 1e-10 * rhs.abs());
}

#[test]
fn test_gram_schmidt_qr() {
    let mut rng = StdRng::seed_from_u64(29);
    for (m, n) in [(5, 3), (4, 4), (8, 2)] {
        let a = random_matrix(m, n, &mut rng);
        let qr = a.qr();
        assert_eq!(qr.q.shape(), (m, n));
        assert_eq!(qr.r.shape(), (n, n));
        assert!(qr.q.mult(&qr.r).unwrap().approx_eq(&a, 1e-13));
        let qtq = qr.q.trans().mult(&qr.q).unwrap();
        assert!(qtq.approx_eq(&Matrix::identity(n), 1e-13));
        for i in 0..n {
            for j in 0..i {
                assert_eq!(qr.r[(i, j)], 0.0);
            }
        }
    }
}

#[test]
fn test_gram_schmidt_nearly_dependent_columns() {
    // second column differs from the first by 1e-9: the first pass loses
    // more than an order of magnitude and triggers reorthogonalization
    let a = Matrix::from_vec(3, 2, vec![1.0, 1.0, 1.0, 1.0 + 1e-9, 1.0, 1.0]).unwrap();
    let qr = a.qr();
    let qtq = qr.q.trans().mult(&qr.q).unwrap();
    assert!(qtq.approx_eq(&Matrix::identity(2), 1e-12));
    assert!(qr.q.mult(&qr.r).unwrap().approx_eq(&a, 1e-14));
}

#[test]
fn test_pivoted_qr() {
    let mut rng = StdRng::seed_from_u64(31);
    for (m, n) in [(5, 3), (4, 4), (7, 1)] {
        let a = random_matrix(m, n, &mut rng);
        let qr = a.qr_pivoted().unwrap();
        assert_eq!(qr.q.shape(), (m, m));
        assert_eq!(qr.r.shape(), (m, n));
        let ap = a.mult(&qr.p).unwrap();
        assert!(qr.q.mult(&qr.r).unwrap().approx_eq(&ap, 1e-13));
        let qtq = qr.q.trans().mult(&qr.q).unwrap();
        assert!(qtq.approx_eq(&Matrix::identity(m), 1e-13));
        for i in 1..n {
            assert!(qr.r[(i, i)].abs() <= qr.r[(i - 1, i - 1)].abs() + 1e-14);
        }
        for j in 0..n {
            for i in (j + 1)..m {
                assert_eq!(qr.r[(i, j)], 0.0);
            }
        }
    }
}

#[test]
fn test_pinv_full_rank() {
    let mut rng = StdRng::seed_from_u64(37);
    assert_moore_penrose(&random_matrix(6, 3, &mut rng), 1e-12);
    assert_moore_penrose(&random_matrix(3, 5, &mut rng), 1e-12);
    assert_moore_penrose(&well_conditioned(4, &mut rng), 1e-12);
}

#[test]
fn test_pinv_rank_deficient_square() {
    let mut rng = StdRng::seed_from_u64(41);
    let mut a = integer_matrix(4, 4, &mut rng);
    let dup = a.col(0).unwrap();
    a.replace(&dup, 0, 3).unwrap();
    assert!(a.rank().unwrap() <= 3);
    assert_moore_penrose(&a, 1e-10);
}

#[test]
fn test_pinv_rank_deficient_tall() {
    let mut rng = StdRng::seed_from_u64(43);
    let mut a = integer_matrix(6, 4, &mut rng);
    for i in 0..6 {
        a[(i, 3)] = a[(i, 0)] - 2.0 * a[(i, 1)];
    }
    assert_eq!(a.rank().unwrap(), 3);
    assert_moore_penrose(&a, 1e-10);
}

#[test]
fn test_pinv_rank_deficient_wide() {
    let mut rng = StdRng::seed_from_u64(47);
    let mut a = integer_matrix(3, 5, &mut rng);
    for j in 0..5 {
        a[(2, j)] = a[(0, j)] + a[(1, j)];
    }
    assert_eq!(a.rank().unwrap(), 2);
    assert_moore_penrose(&a, 1e-10);
}
