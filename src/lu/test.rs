use super::*;
use crate::algebra::*;

// A =
//[ 4.0   ⋅    1.0   ⋅ ]
//[ 1.0  3.0    ⋅    ⋅ ]
//[  ⋅   2.0  5.0   1.0]
//[  ⋅    ⋅     ⋅   2.0]
fn unsym_4x4() -> CscMatrix<f64> {
    CscMatrix::from_dense_rows(&[
        vec![4., 0., 1., 0.],
        vec![1., 3., 0., 0.],
        vec![0., 2., 5., 1.],
        vec![0., 0., 0., 2.],
    ])
}

fn residual(A: &CscMatrix<f64>, x: &[f64], b: &[f64], transpose: bool) -> f64 {
    let mut r = b.to_vec();
    if transpose {
        A.t().gemv(&mut r, x, 1., -1.);
    } else {
        A.gemv(&mut r, x, 1., -1.);
    }
    r.norm_inf()
}

#[test]
fn test_dense_solves() {
    let A = unsym_4x4();
    let mut lu = SparseLU::factor(&A, &LuSettings::default()).unwrap();
    let b = vec![1., -2., 3., 4.];

    let mut x = b.clone();
    lu.solve(&mut x);
    assert!(residual(&A, &x, &b, false) < 1e-12);

    let mut x = b.clone();
    lu.solve_transpose(&mut x);
    assert!(residual(&A, &x, &b, true) < 1e-12);
}

#[test]
fn test_factor_is_triangular() {
    let A = unsym_4x4();
    let lu = SparseLU::factor(&A, &LuSettings::default()).unwrap();
    for j in 0..4 {
        assert!(lu.L.col(j).0.iter().all(|&r| r > j));
        assert!(lu.U.col(j).0.iter().all(|&r| r < j));
    }
    assert!(lu.L.check_format().is_ok());
    assert!(lu.U.check_format().is_ok());
}

#[test]
fn test_sparse_solve_matches_dense() {
    let A = unsym_4x4();
    let mut lu = SparseLU::factor(&A, &LuSettings::default()).unwrap();

    for &transpose in &[false, true] {
        let b = SparseVector::from_parts(4, vec![3], vec![2.]);
        let xs = lu.solve_sparse(&b, transpose);
        let mut xd = b.to_dense();
        if transpose {
            lu.solve_transpose(&mut xd);
        } else {
            lu.solve(&mut xd);
        }
        assert!(xs.to_dense().norm_inf_diff(&xd) < 1e-14);
        // indices are sorted and unique
        assert!(xs.index.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_sparse_solve_touches_reach_only() {
    // identity except a coupling between the first two columns
    let A = CscMatrix::from_dense_rows(&[
        vec![2., 1., 0., 0.],
        vec![0., 1., 0., 0.],
        vec![0., 0., 1., 0.],
        vec![0., 0., 0., 1.],
    ]);
    let settings = LuSettingsBuilder::default().ordering(false).build().unwrap();
    let mut lu = SparseLU::factor(&A, &settings).unwrap();
    let b = SparseVector::from_parts(4, vec![2], vec![5.]);
    let x = lu.solve_sparse(&b, false);
    assert_eq!(x.index, vec![2]);
    assert_eq!(x.values, vec![5.]);
}

#[test]
fn test_partial_pivoting_zero_diagonal() {
    // needs a row swap
    let A = CscMatrix::from_dense_rows(&[vec![0., 1.], vec![1., 1.]]);
    let settings = LuSettingsBuilder::default().ordering(false).build().unwrap();
    let mut lu = SparseLU::factor(&A, &settings).unwrap();
    assert_eq!(lu.pinv, vec![1, 0]);
    let mut x = vec![1., 2.];
    lu.solve(&mut x);
    assert!(x.norm_inf_diff(&[1., 1.]) < 1e-14);
}

#[test]
fn test_degenerate_matrix() {
    let A = CscMatrix::from_dense_rows(&[
        vec![1., 2., 0.],
        vec![2., 4., 0.],
        vec![0., 0., 1.],
    ]);
    let settings = LuSettingsBuilder::default().ordering(false).build().unwrap();
    match SparseLU::factor(&A, &settings) {
        Err(LuError::DegenerateMatrix {
            column,
            unpivoted_rows,
        }) => {
            assert_eq!(column, 1);
            assert_eq!(unpivoted_rows.len(), 2);
        }
        other => panic!("expected a degenerate matrix, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_not_square() {
    let A = CscMatrix::<f64>::spalloc(2, 3, 0);
    assert_eq!(
        SparseLU::factor(&A, &LuSettings::default()).err(),
        Some(LuError::IncompatibleDimension)
    );
}
