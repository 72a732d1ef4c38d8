use crate::StrError;
use russell_lab::Vector;
use russell_sparse::{CooMatrix, CsrMatrix, Sym};

/// Holds an assembled (read-only) sparse matrix in compressed-row format
///
/// Duplicate entries given to [SparseOperator::from_triplets] are summed up.
pub struct SparseOperator {
    /// Number of rows
    nrow: usize,

    /// Number of columns
    ncol: usize,

    /// Compressed-row matrix
    csr: CsrMatrix,

    /// Main diagonal (square matrices only)
    diagonal: Option<Vector>,
}

impl SparseOperator {
    /// Allocates a new instance from (i, j, aij) triplets
    pub fn from_triplets(nrow: usize, ncol: usize, triplets: &[(usize, usize, f64)]) -> Result<Self, StrError> {
        if nrow == 0 || ncol == 0 {
            return Err("nrow and ncol must be ≥ 1");
        }
        if triplets.len() == 0 {
            return Err("at least one entry is required to assemble a sparse operator");
        }
        let mut coo = CooMatrix::new(nrow, ncol, triplets.len(), Sym::No)?;
        let mut diagonal = if nrow == ncol { Some(Vector::new(nrow)) } else { None };
        for (i, j, aij) in triplets {
            coo.put(*i, *j, *aij)?;
            if i == j {
                if let Some(d) = diagonal.as_mut() {
                    d[*i] += *aij;
                }
            }
        }
        let csr = CsrMatrix::from_coo(&coo)?;
        Ok(SparseOperator {
            nrow,
            ncol,
            csr,
            diagonal,
        })
    }

    /// Returns the dimensions (nrow, ncol)
    pub fn dims(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    /// Returns the main diagonal (square matrices only)
    pub fn diagonal(&self) -> Option<&Vector> {
        self.diagonal.as_ref()
    }

    /// Performs the matrix-vector multiplication v = alpha · A · u
    pub fn mat_vec_mul(&self, v: &mut Vector, alpha: f64, u: &Vector) -> Result<(), StrError> {
        if v.dim() != self.nrow || u.dim() != self.ncol {
            return Err("vectors are incompatible with the sparse operator");
        }
        self.csr.mat_vec_mul(v, alpha, u)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
