use super::*;
use crate::algebra::CscMatrix;

// A =
//[ 8.0  -3.0   2.0    ⋅ ]
//[  ⋅    8.0  -1.0    ⋅ ]
//[  ⋅     ⋅    8.0  -1.0]
//[  ⋅     ⋅     ⋅    1.0]
fn triu_4x4() -> CscMatrix<f64> {
    CscMatrix::new(
        4,
        4,
        vec![0, 1, 3, 6, 8],
        vec![0, 0, 1, 0, 1, 2, 2, 3],
        vec![8., -3., 8., 2., -1., 8., -1., 1.],
    )
}

// quasidefinite KKT-like matrix [I A'; A -I] with A = [1 2]
fn triu_kkt() -> CscMatrix<f64> {
    CscMatrix::new(
        3,
        3,
        vec![0, 1, 2, 5],
        vec![0, 1, 0, 1, 2],
        vec![1., 1., 1., 2., -1.],
    )
}

#[test]
fn test_invperm() {
    assert_eq!(invperm(&[3, 0, 2, 1]).unwrap(), vec![1, 3, 2, 0]);
    assert_eq!(invperm(&[3, 0, 2, 0]), Err(QDLDLError::InvalidPermutation));
    assert_eq!(invperm(&[4, 0, 2, 1]), Err(QDLDLError::InvalidPermutation));
}

#[test]
fn test_permute_pair() {
    let perm = [2, 0, 1];
    let b = [10., 20., 30.];
    let mut x = [0.; 3];
    let mut y = [0.; 3];
    permute(&mut x, &b, &perm);
    assert_eq!(x, [30., 10., 20.]);
    ipermute(&mut y, &x, &perm);
    assert_eq!(y, b);
}

#[test]
fn test_etree_counts() {
    let S = etree(&triu_4x4());
    assert_eq!(S.etree, vec![1, 2, 3, ETREE_ROOT]);
    assert_eq!(S.Lnz, vec![2, 1, 1, 0]);
}

#[test]
fn test_permute_symmetric_keeps_triu() {
    let A = triu_4x4();
    let iperm = [3, 1, 0, 2];
    let (P, map) = permute_symmetric(&A, &iperm);
    assert_eq!(P.nnz(), A.nnz());
    for col in 0..4 {
        for &row in P.col(col).0 {
            assert!(row <= col);
        }
    }
    // A[0,2] = 2 lands at P[iperm[0], iperm[2]] = P[2,3] (stored as (min,max))
    let slot = map[3];
    assert_eq!(P.nzval[slot], 2.);
}

#[test]
fn test_solve_posdef() {
    let A = triu_4x4();
    let mut f = QDLDLFactorisation::new(&A, None).unwrap();
    let x = vec![1., -2., 3., 0.5];
    let mut b = vec![0.; 4];
    A.sym().symv(&mut b, &x, 1., 0.);
    f.solve(&mut b);
    assert!(b.norm_inf_diff(&x) < 1e-12);
    assert_eq!(f.positive_inertia(), 4);
}

#[test]
fn test_solve_quasidefinite_with_signs() {
    let K = triu_kkt();
    let opts = QDLDLSettingsBuilder::default()
        .Dsigns(vec![1, 1, -1])
        .build()
        .unwrap();
    let mut f = QDLDLFactorisation::new(&K, Some(opts)).unwrap();
    assert_eq!(f.positive_inertia(), 2);
    assert_eq!(f.regularize_count(), 0);

    let x = vec![0.5, -1., 2.];
    let mut b = vec![0.; 3];
    K.sym().symv(&mut b, &x, 1., 0.);
    f.solve(&mut b);
    assert!(b.norm_inf_diff(&x) < 1e-12);
}

#[test]
fn test_update_and_refactor() {
    let A = triu_4x4();
    let mut f = QDLDLFactorisation::new(&A, None).unwrap();

    // double the last diagonal (entry 7 of the nonzero array)
    f.update_values(&[7], &[2.]);
    f.refactor().unwrap();

    let mut B = A.clone();
    B.nzval[7] = 2.;
    let x = vec![1., 1., 1., 1.];
    let mut b = vec![0.; 4];
    B.sym().symv(&mut b, &x, 1., 0.);
    f.solve(&mut b);
    assert!(b.norm_inf_diff(&x) < 1e-12);

    // scale and offset the diagonal back again
    f.scale_values(&[7], 0.5);
    f.offset_values(&[0], 1., &[1]);
    f.refactor().unwrap();
    let mut C = A.clone();
    C.nzval[0] = 9.;
    let mut b = vec![0.; 4];
    C.sym().symv(&mut b, &x, 1., 0.);
    f.solve(&mut b);
    assert!(b.norm_inf_diff(&x) < 1e-12);
}

#[test]
fn test_user_permutation() {
    let A = triu_4x4();
    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![3, 2, 1, 0])
        .build()
        .unwrap();
    let mut f = QDLDLFactorisation::new(&A, Some(opts)).unwrap();
    assert_eq!(f.perm, vec![3, 2, 1, 0]);
    let x = vec![0., 1., 0., 1.];
    let mut b = vec![0.; 4];
    A.sym().symv(&mut b, &x, 1., 0.);
    f.solve(&mut b);
    assert!(b.norm_inf_diff(&x) < 1e-12);
}

#[test]
fn test_zero_pivot_without_regularization() {
    // [0 1; 1 0] has a structural zero pivot
    let A = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![0., 1., 0.]);
    let opts = QDLDLSettingsBuilder::default()
        .regularize_enable(false)
        .perm(vec![0, 1])
        .build()
        .unwrap();
    assert_eq!(
        QDLDLFactorisation::new(&A, Some(opts)).err(),
        Some(QDLDLError::ZeroPivot(0))
    );
}

#[test]
fn test_structure_errors() {
    let L = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 1., 1.]);
    assert_eq!(
        QDLDLFactorisation::new(&L, None).err(),
        Some(QDLDLError::NotUpperTriangular)
    );

    let E = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![1.]);
    assert_eq!(
        QDLDLFactorisation::new(&E, None).err(),
        Some(QDLDLError::EmptyColumn)
    );

    let R = CscMatrix::<f64>::spalloc(2, 3, 0);
    assert_eq!(
        QDLDLFactorisation::new(&R, None).err(),
        Some(QDLDLError::IncompatibleDimension)
    );
}
