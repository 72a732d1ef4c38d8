use super::SparseOperator;
use crate::base::ParamKrylov;
use crate::StrError;
use russell_lab::{vec_copy, vec_inner, vec_norm, vec_update, Norm, Vector};

/// Holds the outcome of an iterative solve
#[derive(Clone, Copy, Debug)]
pub struct KrylovStatus {
    /// Indicates that the residual norm reached the tolerance
    pub converged: bool,

    /// Number of iterations performed
    pub iterations: usize,

    /// Euclidean norm of the final residual
    pub residual: f64,
}

/// Implements the Jacobi-preconditioned conjugate gradient method for symmetric positive-definite systems
///
/// The preconditioner is built from the diagonal of the first matrix given to [KrylovSolver::solve]
/// and reused afterwards; thus, a solver instance must be dedicated to a single matrix.
///
/// Non-convergence is not an error: the last iterate is kept and reported via [KrylovStatus].
pub struct KrylovSolver {
    /// Parameters
    param: ParamKrylov,

    /// Inverse of the diagonal of the matrix
    inv_diagonal: Option<Vector>,

    /// Residual
    r: Vector,

    /// Preconditioned residual
    z: Vector,

    /// Search direction
    p: Vector,

    /// Matrix times search direction
    ap: Vector,
}

impl KrylovSolver {
    /// Allocates a new instance for systems of dimension n
    pub fn new(param: ParamKrylov, n: usize) -> Result<Self, StrError> {
        param.validate()?;
        if n == 0 {
            return Err("the dimension of the linear system must be ≥ 1");
        }
        Ok(KrylovSolver {
            param,
            inv_diagonal: None,
            r: Vector::new(n),
            z: Vector::new(n),
            p: Vector::new(n),
            ap: Vector::new(n),
        })
    }

    /// Solves A · x = b starting from x = 0
    pub fn solve(&mut self, a: &SparseOperator, x: &mut Vector, b: &Vector) -> Result<KrylovStatus, StrError> {
        let n = self.r.dim();
        if a.dims() != (n, n) {
            return Err("the matrix is incompatible with the solver");
        }
        if x.dim() != n || b.dim() != n {
            return Err("vectors are incompatible with the solver");
        }
        if self.inv_diagonal.is_none() {
            let diagonal = a.diagonal().ok_or("the matrix must be square")?;
            let mut inv = Vector::new(n);
            for i in 0..n {
                inv[i] = if diagonal[i] != 0.0 { 1.0 / diagonal[i] } else { 1.0 };
            }
            self.inv_diagonal = Some(inv);
        }
        let inv_diagonal = self.inv_diagonal.as_ref().ok_or("the preconditioner is not available")?;

        // tolerance
        x.fill(0.0);
        let norm_b = vec_norm(b, Norm::Euc);
        let tolerance = f64::max(self.param.tol_rel * norm_b, self.param.tol_abs);
        if norm_b <= tolerance {
            return Ok(KrylovStatus {
                converged: true,
                iterations: 0,
                residual: norm_b,
            });
        }

        // r = b;  z = M⁻¹ r;  p = z
        vec_copy(&mut self.r, b)?;
        for i in 0..n {
            self.z[i] = inv_diagonal[i] * self.r[i];
        }
        vec_copy(&mut self.p, &self.z)?;
        let mut rz = vec_inner(&self.r, &self.z);
        let mut residual = norm_b;

        // iterations
        for iteration in 1..(self.param.n_max_iterations + 1) {
            a.mat_vec_mul(&mut self.ap, 1.0, &self.p)?;
            let pap = vec_inner(&self.p, &self.ap);
            if pap <= 0.0 || !pap.is_finite() {
                return Ok(KrylovStatus {
                    converged: false,
                    iterations: iteration,
                    residual,
                });
            }
            let alpha = rz / pap;
            vec_update(x, alpha, &self.p)?;
            vec_update(&mut self.r, -alpha, &self.ap)?;
            residual = vec_norm(&self.r, Norm::Euc);
            if residual <= tolerance {
                return Ok(KrylovStatus {
                    converged: true,
                    iterations: iteration,
                    residual,
                });
            }
            for i in 0..n {
                self.z[i] = inv_diagonal[i] * self.r[i];
            }
            let rz_new = vec_inner(&self.r, &self.z);
            let beta = rz_new / rz;
            rz = rz_new;
            self.p.scale(beta);
            vec_update(&mut self.p, 1.0, &self.z)?;
        }
        Ok(KrylovStatus {
            converged: false,
            iterations: self.param.n_max_iterations,
            residual,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
