use super::{
    assemble_basis_integrals, assemble_cell_integrals, assemble_mass_matrix, project_cells_to_cg1, vec_clip_min,
    DirichletBc, FunctionSpace, KrylovSolver, MeshGeometry, SpaceKind, SparseOperator,
};
use crate::base::{NutMethod, ParamKrylov};
use crate::StrError;
use gemlab::mesh::CellId;
use russell_lab::Vector;

/// Defines an expression evaluated once per cell
pub trait CellForm {
    /// Returns the (representative) value of the expression in a cell
    fn eval(&self, cell_id: CellId) -> Result<f64, StrError>;
}

/// Holds the nodal projection of a cellwise expression onto the CG1 space
pub struct Cg1Function {
    /// Name of the field
    name: String,

    /// Mapping from cell values to nodal values
    method: NutMethod,

    /// Clips negative nodal values to zero
    bounded: bool,

    /// Boundary conditions applied after each update
    bcs: Vec<DirichletBc>,

    /// Geometry of the cells
    geo: MeshGeometry,

    /// CG1 space
    cg1: FunctionSpace,

    /// Integrals of the CG1 basis functions (WeightedAverage)
    weights: Vector,

    /// Consistent mass matrix and its solver (L2Projection)
    projection: Option<(SparseOperator, KrylovSolver)>,

    /// Values of the expression in each cell
    cell_values: Vector,

    /// Nodal values
    values: Vector,

    /// Number of non-converged projections
    n_not_converged: usize,
}

impl Cg1Function {
    /// Allocates a new instance with zero values
    pub fn new(
        name: &str,
        geo: &MeshGeometry,
        cg1: &FunctionSpace,
        method: NutMethod,
        bcs: Vec<DirichletBc>,
        bounded: bool,
        solver_param: ParamKrylov,
    ) -> Result<Self, StrError> {
        if cg1.kind != SpaceKind::Cg1 {
            return Err("managed functions require a CG1 space");
        }
        let projection = match method {
            NutMethod::WeightedAverage => None,
            NutMethod::L2Projection => Some((
                assemble_mass_matrix(geo, cg1)?,
                KrylovSolver::new(solver_param, cg1.ndof)?,
            )),
        };
        Ok(Cg1Function {
            name: name.to_string(),
            method,
            bounded,
            bcs,
            geo: geo.clone(),
            cg1: cg1.clone(),
            weights: assemble_basis_integrals(geo, cg1)?,
            projection,
            cell_values: Vector::new(geo.ncell()),
            values: Vector::new(cg1.ndof),
            n_not_converged: 0,
        })
    }

    /// Recomputes the nodal values from an expression
    ///
    /// ```text
    /// WeightedAverage:  v_i = Σ_T c_T ∫_T ψ_i dx / ∫ ψ_i dx
    /// L2Projection:     G v = b    with    b_i = Σ_T c_T ∫_T ψ_i dx
    /// ```
    ///
    /// Then, if bounded, negative values are set to zero; finally, the boundary conditions are applied.
    pub fn update(&mut self, form: &dyn CellForm) -> Result<(), StrError> {
        for cell_id in 0..self.geo.ncell() {
            self.cell_values[cell_id] = form.eval(cell_id)?;
        }
        match self.projection.as_mut() {
            None => {
                assemble_cell_integrals(&mut self.values, &self.geo, &self.cg1, &self.cell_values)?;
                for i in 0..self.values.dim() {
                    self.values[i] /= self.weights[i];
                }
            }
            Some((mass, solver)) => {
                let status = project_cells_to_cg1(&mut self.values, solver, mass, &self.geo, &self.cg1, &self.cell_values)?;
                if !status.converged {
                    self.n_not_converged += 1;
                    log::debug!(
                        "projection of {} did not converge after {} iterations (residual = {:e})",
                        self.name,
                        status.iterations,
                        status.residual
                    );
                }
            }
        }
        if self.bounded {
            vec_clip_min(&mut self.values, 0.0);
        }
        for bc in &self.bcs {
            bc.apply(&mut self.values)?;
        }
        Ok(())
    }

    /// Returns the nodal values
    pub fn values(&self) -> &Vector {
        &self.values
    }

    /// Returns the name of the field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the mapping method
    pub fn method(&self) -> NutMethod {
        self.method
    }

    /// Returns the number of non-converged projections since the allocation
    pub fn n_not_converged(&self) -> usize {
        self.n_not_converged
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{CellForm, Cg1Function};
    use crate::base::{NutMethod, ParamKrylov, SampleMeshes};
    use crate::fem::{BcValue, DirichletBc, FunctionSpace, MeshGeometry, SpaceKind};
    use crate::StrError;
    use gemlab::mesh::CellId;
    use russell_lab::{approx_eq, vec_approx_eq};

    struct Constant(f64);

    impl CellForm for Constant {
        fn eval(&self, _: CellId) -> Result<f64, StrError> {
            Ok(self.0)
        }
    }

    struct Centroid<'a>(&'a MeshGeometry);

    impl<'a> CellForm for Centroid<'a> {
        fn eval(&self, cell_id: CellId) -> Result<f64, StrError> {
            Ok(self.0.cells[cell_id].centroid[0] - 0.5)
        }
    }

    fn left(x: &[f64]) -> bool {
        x[0] < 1e-10
    }

    #[test]
    fn new_captures_errors() {
        let mesh = SampleMeshes::unit_square_tri3(1);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let dg0 = FunctionSpace::new(&mesh, SpaceKind::Dg0).unwrap();
        assert_eq!(
            Cg1Function::new("nut", &geo, &dg0, NutMethod::WeightedAverage, Vec::new(), true, ParamKrylov::sample()).err(),
            Some("managed functions require a CG1 space")
        );
    }

    #[test]
    fn constant_forms_are_reproduced() {
        let mesh = SampleMeshes::unit_square_tri3(3);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        for method in [NutMethod::WeightedAverage, NutMethod::L2Projection] {
            let mut nut = Cg1Function::new("nut", &geo, &cg1, method, Vec::new(), true, ParamKrylov::sample()).unwrap();
            assert_eq!(nut.name(), "nut");
            assert_eq!(nut.method(), method);
            nut.update(&Constant(0.02)).unwrap();
            vec_approx_eq(&nut.values(), &vec![0.02; cg1.ndof], 1e-10);
            assert_eq!(nut.n_not_converged(), 0);
        }
    }

    #[test]
    fn bounds_and_bcs_are_applied() {
        let mesh = SampleMeshes::unit_square_tri3(4);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let bcs = vec![DirichletBc::new(&cg1, BcValue::Constant(0.3), left).unwrap()];
        let mut nut =
            Cg1Function::new("nut", &geo, &cg1, NutMethod::WeightedAverage, bcs, true, ParamKrylov::sample()).unwrap();
        nut.update(&Centroid(&geo)).unwrap();
        for (i, x) in cg1.dof_coords.iter().enumerate() {
            let value = nut.values()[i];
            if x[0] < 1e-10 {
                approx_eq(value, 0.3, 1e-15);
            } else if x[0] < 0.4 {
                approx_eq(value, 0.0, 1e-15);
            } else {
                assert!(value >= 0.0);
            }
        }
        let mut unbounded =
            Cg1Function::new("f", &geo, &cg1, NutMethod::WeightedAverage, Vec::new(), false, ParamKrylov::sample())
                .unwrap();
        unbounded.update(&Centroid(&geo)).unwrap();
        assert!(unbounded.values()[0] < 0.0);
    }
}
