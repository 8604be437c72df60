use crate::algebra::{CscMatrix, FloatT, MatrixConcatenationError};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Horizontal concatenation `[A B]`
    pub fn hcat(A: &Self, B: &Self) -> Result<Self, MatrixConcatenationError> {
        if A.m != B.m {
            return Err(MatrixConcatenationError::IncompatibleDimension);
        }
        let mut colptr = A.colptr.clone();
        colptr.extend(B.colptr.iter().skip(1).map(|&p| p + A.nnz()));
        let mut rowval = A.rowval.clone();
        rowval.extend_from_slice(&B.rowval);
        let mut nzval = A.nzval.clone();
        nzval.extend_from_slice(&B.nzval);
        Ok(CscMatrix::new(A.m, A.n + B.n, colptr, rowval, nzval))
    }

    /// Vertical concatenation `[A; B]`
    pub fn vcat(A: &Self, B: &Self) -> Result<Self, MatrixConcatenationError> {
        if A.n != B.n {
            return Err(MatrixConcatenationError::IncompatibleDimension);
        }
        let nnz = A.nnz() + B.nnz();
        let mut colptr = Vec::with_capacity(A.n + 1);
        let mut rowval = Vec::with_capacity(nnz);
        let mut nzval = Vec::with_capacity(nnz);
        colptr.push(0);
        for col in 0..A.n {
            let (rows, vals) = A.col(col);
            rowval.extend_from_slice(rows);
            nzval.extend_from_slice(vals);
            let (rows, vals) = B.col(col);
            rowval.extend(rows.iter().map(|&r| r + A.m));
            nzval.extend_from_slice(vals);
            colptr.push(rowval.len());
        }
        Ok(CscMatrix::new(A.m + B.m, A.n, colptr, rowval, nzval))
    }

    /// Block diagonal concatenation
    pub fn blockdiag(mats: &[&Self]) -> Result<Self, MatrixConcatenationError> {
        if mats.is_empty() {
            return Err(MatrixConcatenationError::IncompatibleDimension);
        }
        let m = mats.iter().map(|M| M.m).sum();
        let n = mats.iter().map(|M| M.n).sum();
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        let mut rowoff = 0;
        for M in mats {
            for col in 0..M.n {
                let (rows, vals) = M.col(col);
                rowval.extend(rows.iter().map(|&r| r + rowoff));
                nzval.extend_from_slice(vals);
                colptr.push(rowval.len());
            }
            rowoff += M.m;
        }
        Ok(CscMatrix::new(m, n, colptr, rowval, nzval))
    }
}

#[test]
fn test_concatenate() {
    let I = CscMatrix::<f64>::identity(2);
    let mut J = CscMatrix::<f64>::identity(2);
    J.nzval[1] = 3.;

    let H = CscMatrix::hcat(&I, &J).unwrap();
    assert_eq!((H.m, H.n), (2, 4));
    assert_eq!(H.get_entry((1, 3)), Some(3.));

    let V = CscMatrix::vcat(&I, &J).unwrap();
    assert_eq!((V.m, V.n), (4, 2));
    assert_eq!(V.get_entry((3, 1)), Some(3.));
    assert!(V.check_format().is_ok());

    let D = CscMatrix::blockdiag(&[&I, &J]).unwrap();
    assert_eq!(D.get_entry((3, 3)), Some(3.));
    assert!(D.get_entry((0, 3)).is_none());

    let K = CscMatrix::<f64>::identity(3);
    assert!(CscMatrix::hcat(&I, &K).is_err());
}
