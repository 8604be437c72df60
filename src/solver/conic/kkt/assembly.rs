#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::conic::cones::*;

/// Positions of the problem data inside the nonzeros of the
/// assembled KKT matrix
pub(crate) struct KKTDataMap {
    pub P: Vec<usize>,
    pub A: Vec<usize>,
    /// indices of the lower right Hs blocks (by cone)
    pub Hsblocks: Vec<usize>,
    /// the full diagonal, including structural zeros
    pub diag_full: Vec<usize>,
    /// diagonal of the upper left block only
    pub diagP: Vec<usize>,
}

impl KKTDataMap {
    fn new<T: FloatT>(P: &CscMatrix<T>, A: &CscMatrix<T>, cones: &CompositeCone<T>) -> Self {
        let (m, n) = (A.m, P.n);
        Self {
            P: vec![0; P.nnz()],
            A: vec![0; A.nnz()],
            Hsblocks: allocate_kkt_Hsblocks::<T, usize>(cones),
            diag_full: vec![0; m + n],
            diagP: vec![0; n],
        }
    }
}

pub(crate) fn allocate_kkt_Hsblocks<T, Z>(cones: &CompositeCone<T>) -> Vec<Z>
where
    T: FloatT,
    Z: num_traits::Zero + Clone,
{
    let nnz = cones.rng_blocks.last().map_or(0, |rng| rng.end);
    vec![Z::zero(); nnz]
}

/// Assemble the upper triangle of the quasidefinite matrix
///
/// ```text
/// [ P   Aᵀ ]
/// [ A  -Hs ]
/// ```
///
/// with structural zeros on the whole diagonal and in the Hs blocks.
/// `P` must be upper triangular.
pub(crate) fn assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    cones: &CompositeCone<T>,
) -> (CscMatrix<T>, KKTDataMap) {
    let mut map = KKTDataMap::new(P, A, cones);
    let (m, n) = (A.m, A.n);

    let nnz_diagP = P.count_diagonal_entries();
    let nnz_Hsblocks = map.Hsblocks.len();

    let nnzKKT = P.nnz() + n - nnz_diagP + A.nnz() + nnz_Hsblocks;

    let mut K = CscMatrix::<T>::spalloc(m + n, m + n, nnzKKT);

    // column counts
    K.colptr.fill(0);
    K.colcount_block(P, 0, MatrixShape::N);
    K.colcount_missing_diag(P, 0);
    K.colcount_block(A, n, MatrixShape::T);

    for (i, cone) in cones.iter().enumerate() {
        let firstcol = cones.rng_cones[i].start + n;
        let blockdim = cone.numel();
        if cone.Hs_is_diagonal() {
            K.colcount_diag(firstcol, blockdim);
        } else {
            K.colcount_dense_triangle(firstcol, blockdim, MatrixTriangle::Triu);
        }
    }

    // fill, using colptr as the next free slot in each column
    K.colcount_to_colptr();
    K.fill_block(P, &mut map.P, 0, 0, MatrixShape::N);
    K.fill_missing_diag(P, 0);
    K.fill_block(A, &mut map.A, 0, n, MatrixShape::T);

    for (i, cone) in cones.iter().enumerate() {
        let row = cones.rng_cones[i].start + n;
        let blockdim = cone.numel();
        let block = &mut map.Hsblocks[cones.rng_blocks[i].clone()];
        if cone.Hs_is_diagonal() {
            K.fill_diag(block, row, blockdim);
        } else {
            K.fill_dense_triangle(block, row, blockdim, MatrixTriangle::Triu);
        }
    }

    K.backshift_colptrs();

    // triu, so the diagonal is last in every column
    for (d, &p) in map.diag_full.iter_mut().zip(&K.colptr[1..]) {
        *d = p - 1;
    }
    map.diagP.copy_from_slice(&map.diag_full[0..n]);

    (K, map)
}

#[test]
fn test_kkt_assembly() {
    let P = CscMatrix::from_dense_rows(&[
        vec![1., 2., 4.], //
        vec![0., 3., 5.], //
        vec![0., 0., 6.], //
    ]);
    let A = CscMatrix::from_dense_rows(&[
        vec![7., 0., 8.],  //
        vec![0., 9., 10.], //
        vec![1., 2., 3.],
    ]);

    let K_diag = CscMatrix::from_dense_rows(&[
        vec![1., 2., 4., 7., 0., 1.],  //
        vec![0., 3., 5., 0., 9., 2.],  //
        vec![0., 0., 6., 8., 10., 3.], //
        vec![0., 0., 0., -1., 0., 0.], //
        vec![0., 0., 0., 0., -1., 0.], //
        vec![0., 0., 0., 0., 0., -1.], //
    ]);

    let K_dense = CscMatrix::from_dense_rows(&[
        vec![1., 2., 4., 7., 0., 1.],    //
        vec![0., 3., 5., 0., 9., 2.],    //
        vec![0., 0., 6., 8., 10., 3.],   //
        vec![0., 0., 0., -1., -1., -1.], //
        vec![0., 0., 0., 0., -1., -1.],  //
        vec![0., 0., 0., 0., 0., -1.],   //
    ]);

    let cones = CompositeCone::new(&[SupportedConeT::NonnegativeConeT(3)]);
    let (mut K, map) = assemble_kkt_matrix(&P, &A, &cones);
    for i in map.Hsblocks {
        K.nzval[i] = -1.;
    }
    assert_eq!(K, K_diag);

    let cones = CompositeCone::new(&[SupportedConeT::ExponentialConeT()]);
    let (mut K, map) = assemble_kkt_matrix(&P, &A, &cones);
    for i in map.Hsblocks {
        K.nzval[i] = -1.;
    }
    assert_eq!(K, K_dense);
    assert_eq!(map.diag_full.len(), 6);
    assert!(map.diag_full.iter().enumerate().all(|(i, &p)| K.rowval[p] == i));

    // P with a missing diagonal gets a structural zero
    let P = CscMatrix::<f64>::zeros((3, 3));
    let cones = CompositeCone::new(&[SupportedConeT::SecondOrderConeT(3)]);
    let (K, map) = assemble_kkt_matrix(&P, &A, &cones);
    assert_eq!(K.nnz(), 3 + A.nnz() + 6);
    assert_eq!(map.diagP.len(), 3);
    assert!(K.check_format().is_ok());
}
