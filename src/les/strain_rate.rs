use super::{remove_trace, SymTensorField};
use crate::base::{ParamKrylov, TensorLayout};
use crate::fem::{assemble_derivative_matrices, FunctionSpace, KrylovSolver, MeshGeometry, SparseOperator};
use crate::StrError;
use russell_lab::{vec_update, Vector};

/// Reconstructs the nodal (CG1) rate-of-strain tensor from a velocity field
///
/// For each packed component k with velocity pair (a, b):
///
/// ```text
/// b_k = D_a u_a                         if a = b
/// b_k = ½ (D_b u_a + D_a u_b)           otherwise
///
/// G S_k = b_k
/// ```
///
/// where `(D_k)_ij = ∫ (∂φ_j/∂x_k) ψ_i dx` and G is the CG1 mass matrix.
/// The trace is removed afterwards.
pub struct StrainRateReconstructor {
    /// Packed layout
    layout: TensorLayout,

    /// Derivative matrices (one per direction)
    derivatives: Vec<SparseOperator>,

    /// Iterative solver shared by all components
    solver: KrylovSolver,

    /// Right-hand side
    rhs: Vector,

    /// Auxiliary product
    work: Vector,

    /// Total number of non-converged solves
    n_not_converged: usize,
}

impl StrainRateReconstructor {
    /// Allocates a new instance
    pub fn new(
        geo: &MeshGeometry,
        velocity_space: &FunctionSpace,
        cg1: &FunctionSpace,
        solver_param: ParamKrylov,
    ) -> Result<Self, StrError> {
        Ok(StrainRateReconstructor {
            layout: TensorLayout::from_ndim(geo.ndim)?,
            derivatives: assemble_derivative_matrices(geo, velocity_space, cg1)?,
            solver: KrylovSolver::new(solver_param, cg1.ndof)?,
            rhs: Vector::new(cg1.ndof),
            work: Vector::new(cg1.ndof),
            n_not_converged: 0,
        })
    }

    /// Computes the traceless rate-of-strain tensor
    ///
    /// Returns the number of non-converged solves in this call; the best iterates are kept.
    pub fn reconstruct(
        &mut self,
        sij: &mut SymTensorField,
        mass: &SparseOperator,
        velocity: &[Vector],
    ) -> Result<usize, StrError> {
        if velocity.len() != self.layout.ndim() {
            return Err("the number of velocity components must equal ndim");
        }
        if sij.layout != self.layout {
            return Err("the strain tensor layout is incompatible with the mesh");
        }
        let mut count = 0;
        for (k, (a, b)) in self.layout.pairs().iter().enumerate() {
            if a == b {
                self.derivatives[*a].mat_vec_mul(&mut self.rhs, 1.0, &velocity[*a])?;
            } else {
                self.derivatives[*b].mat_vec_mul(&mut self.rhs, 0.5, &velocity[*a])?;
                self.derivatives[*a].mat_vec_mul(&mut self.work, 0.5, &velocity[*b])?;
                vec_update(&mut self.rhs, 1.0, &self.work)?;
            }
            let status = self.solver.solve(mass, &mut sij.comps[k], &self.rhs)?;
            if !status.converged {
                count += 1;
            }
        }
        remove_trace(sij);
        if count > 0 {
            self.n_not_converged += count;
            log::debug!(
                "{} of {} strain-rate solves did not converge",
                count,
                self.layout.tensdim()
            );
        }
        Ok(count)
    }

    /// Returns the total number of non-converged solves since the allocation
    pub fn n_not_converged(&self) -> usize {
        self.n_not_converged
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
