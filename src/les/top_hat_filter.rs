use crate::fem::{assemble_basis_integrals, assemble_mass_matrix, FunctionSpace, MeshGeometry, SparseOperator};
use crate::StrError;
use russell_lab::{vec_copy, Vector};

/// Implements the discrete top-hat filter on the CG1 space
///
/// One pass computes the volume-weighted average of each field over the support
/// of the basis function ψ_i:
///
/// ```text
/// v ← w (G v) ⊙ G_under + (1 - w) v
///
/// G_ij = ∫ ψ_i ψ_j dx    G_under_i = 1 / ∫ ψ_i dx
/// ```
///
/// A weight w = 1 gives the test filter; w = 0.75 gives the (narrower) grid filter.
pub struct TopHatFilter {
    /// CG1 mass matrix
    mass: SparseOperator,

    /// Inverse of the integrals of the CG1 basis functions
    inv_integrals: Vector,

    /// Filtered values during the passes
    current: Vector,

    /// Mass matrix times the current values
    work: Vector,
}

impl TopHatFilter {
    /// Allocates a new instance
    pub fn new(geo: &MeshGeometry, cg1: &FunctionSpace) -> Result<Self, StrError> {
        let mass = assemble_mass_matrix(geo, cg1)?;
        let mut inv_integrals = assemble_basis_integrals(geo, cg1)?;
        for x in inv_integrals.as_mut_data() {
            *x = 1.0 / *x;
        }
        Ok(TopHatFilter {
            mass,
            inv_integrals,
            current: Vector::new(cg1.ndof),
            work: Vector::new(cg1.ndof),
        })
    }

    /// Returns the CG1 mass matrix G
    pub fn mass_matrix(&self) -> &SparseOperator {
        &self.mass
    }

    /// Filters a field
    ///
    /// The filter is applied `passes` times; `passes = 0` copies the input.
    pub fn apply(&mut self, filtered: &mut Vector, unfiltered: &Vector, weight: f64, passes: usize) -> Result<(), StrError> {
        vec_copy(&mut self.current, unfiltered)?;
        self.run(weight, passes)?;
        vec_copy(filtered, &self.current)
    }

    /// Filters a field onto itself
    pub fn apply_in_place(&mut self, field: &mut Vector, weight: f64, passes: usize) -> Result<(), StrError> {
        vec_copy(&mut self.current, field)?;
        self.run(weight, passes)?;
        vec_copy(field, &self.current)
    }

    /// Performs the filter passes on the current values
    fn run(&mut self, weight: f64, passes: usize) -> Result<(), StrError> {
        for _ in 0..passes {
            self.mass.mat_vec_mul(&mut self.work, 1.0, &self.current)?;
            for i in 0..self.current.dim() {
                self.current[i] = weight * self.work[i] * self.inv_integrals[i] + (1.0 - weight) * self.current[i];
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
