use super::{symmetric_tensor, velocity_gradient, LesInput, LesModel, Velocity};
use super::{AveragerPhase, LagrangianAverager, SymTensorField, TensorWorkspace};
use crate::base::ParamDynamicSmagorinsky;
use crate::fem::{assemble_mass_matrix, derived_bcs, interpolate, project_cells_to_cg1};
use crate::fem::{CellForm, Cg1Function, DirichletBc, FunctionSpace, KrylovSolver, MeshGeometry, SpaceKind};
use crate::StrError;
use gemlab::mesh::CellId;
use russell_lab::{vec_copy, vec_norm, Norm, Vector};
use russell_tensor::t2_ddot_t2;

/// Implements the dynamic Smagorinsky model with Lagrangian averaging
///
/// The eddy viscosity is:
///
/// ```text
/// nut = Cs² Δ² |S(u)|        |S| = sqrt(2 S:S)        Δ = |cell|^(1/dim)
/// ```
///
/// where the nodal coefficient Cs² = min(JLM / JMM, 0.1) comes from the Germano identity
/// tensors Lij and Mij averaged along pathlines. The coefficient is recomputed every
/// `cs_comp_step` time steps; in between, only the eddy viscosity is refreshed.
pub struct DynamicLagrangian {
    /// Parameters
    param: ParamDynamicSmagorinsky,

    /// Geometry of the cells
    geo: MeshGeometry,

    /// Velocity space
    velocity_space: FunctionSpace,

    /// CG1 space
    cg1: FunctionSpace,

    /// Velocity space equals the CG1 space
    vdegree: bool,

    /// Boundary conditions of each velocity component attached to the CG1 space
    bcs_u_cg1: Vec<Vec<DirichletBc>>,

    /// Filter width of each cell: Δ = |cell|^(1/dim)
    delta: Vector,

    /// Filter, strain reconstructor and scratch data
    workspace: TensorWorkspace,

    /// Lagrangian averages JLM and JMM
    averager: LagrangianAverager,

    /// Nodal dynamic coefficient Cs²
    cs: Vector,

    /// Velocity interpolated to CG1
    u_cg1: Vec<Vector>,

    /// Filtered CG1 velocity
    u_filtered: Vec<Vector>,

    /// Filtered velocity interpolated back to the velocity space
    u_filtered_v: Vec<Vector>,

    /// Resolved stress tensor
    lij: SymTensorField,

    /// Model tensor
    mij: SymTensorField,

    /// Eddy viscosity
    nut: Cg1Function,
}

/// Evaluates Cs² Δ² |S(u)| in a cell
struct SmagorinskyForm<'a> {
    geo: &'a MeshGeometry,
    velocity_space: &'a FunctionSpace,
    velocity: &'a [Vector],
    cg1: &'a FunctionSpace,
    cs: &'a Vector,
    delta: &'a Vector,
}

impl<'a> CellForm for SmagorinskyForm<'a> {
    fn eval(&self, cell_id: CellId) -> Result<f64, StrError> {
        let grad = velocity_gradient(self.geo, self.velocity_space, self.velocity, cell_id);
        let s = symmetric_tensor(&grad, self.geo.ndim)?;
        let mag_s = f64::sqrt(f64::max(2.0 * t2_ddot_t2(&s, &s), 0.0));
        let cs = self.cg1.cell_mean(cell_id, self.cs);
        let delta = self.delta[cell_id];
        Ok(cs * delta * delta * mag_s)
    }
}

impl DynamicLagrangian {
    /// Allocates a new instance
    pub fn setup(input: &LesInput) -> Result<Self, StrError> {
        input.validate()?;
        let config = input.config;
        let param = config.dynamic_smagorinsky;
        let ndim = input.mesh.ndim;
        let geo = MeshGeometry::new(input.mesh)?;
        let cg1 = FunctionSpace::new(input.mesh, SpaceKind::Cg1)?;
        let velocity_space = input.velocity_space.clone();

        // filter width on the cells and its square on the nodes
        let mut delta = Vector::new(geo.ncell());
        for cell_id in 0..geo.ncell() {
            delta[cell_id] = f64::powf(geo.volume(cell_id), 1.0 / (ndim as f64));
        }
        let mut delta_cg1_sq = Vector::new(cg1.ndof);
        let mass = assemble_mass_matrix(&geo, &cg1)?;
        let mut solver = KrylovSolver::new(config.nut_solver, cg1.ndof)?;
        let status = project_cells_to_cg1(&mut delta_cg1_sq, &mut solver, &mass, &geo, &cg1, &delta)?;
        if !status.converged {
            log::warn!(
                "projection of the filter width did not converge (residual = {:e})",
                status.residual
            );
        }
        for x in delta_cg1_sq.as_mut_data() {
            *x = *x * *x;
        }

        let workspace = TensorWorkspace::new(
            &geo,
            &velocity_space,
            &cg1,
            delta_cg1_sq,
            param.alpha,
            config.strain_solver,
        )?;

        let mut bcs_u_cg1 = Vec::with_capacity(ndim);
        for bcs in input.bcs {
            let mut bcs_cg1 = Vec::with_capacity(bcs.len());
            for bc in bcs {
                bcs_cg1.push(bc.rebuild_on(&cg1)?);
            }
            bcs_u_cg1.push(bcs_cg1);
        }

        let nut = Cg1Function::new(
            "nut",
            &geo,
            &cg1,
            config.nut_method,
            derived_bcs(&cg1, &input.bcs[0])?,
            true,
            config.nut_solver,
        )?;

        let vdegree = velocity_space.same_as(&cg1);
        let layout = workspace.layout;
        let n = cg1.ndof;
        log::info!(
            "dynamic Lagrangian model: {} cells, {} CG1 DOFs, {} velocity DOFs, vdegree = {}",
            geo.ncell(),
            n,
            velocity_space.ndof,
            vdegree
        );
        Ok(DynamicLagrangian {
            param,
            averager: LagrangianAverager::new(n, param.jlm_init, param.jmm_init),
            cs: Vector::new(n),
            u_cg1: (0..ndim).map(|_| Vector::new(n)).collect(),
            u_filtered: (0..ndim).map(|_| Vector::new(n)).collect(),
            u_filtered_v: (0..ndim).map(|_| velocity_space.new_vector()).collect(),
            lij: SymTensorField::new(layout, n),
            mij: SymTensorField::new(layout, n),
            geo,
            velocity_space,
            cg1,
            vdegree,
            bcs_u_cg1,
            delta,
            workspace,
            nut,
        })
    }

    /// Updates the model at the beginning of a time step
    ///
    /// The dynamic coefficient is recomputed only if `tstep` is a multiple of `cs_comp_step`.
    pub fn update(&mut self, tstep: usize, velocity: &Velocity) -> Result<(), StrError> {
        velocity.check(self.geo.ndim, self.velocity_space.ndof)?;
        if tstep % self.param.cs_comp_step != 0 {
            return self.update_nut(velocity.current);
        }
        self.velocity_operations(velocity.extrapolated)?;
        self.workspace.compute_lij(&mut self.lij, &self.u_cg1, &self.u_filtered)?;
        self.workspace.compute_mij(&mut self.mij, velocity.extrapolated, &self.u_filtered_v)?;
        self.averager
            .advance(&self.lij, &self.mij, &self.workspace.delta_cg1_sq, self.param.cs)?;
        self.averager.coefficient(&mut self.cs)?;
        self.update_nut(velocity.current)?;
        log::debug!(
            "tstep {}: max Cs² = {:e}, max nut = {:e}",
            tstep,
            vec_norm(&self.cs, Norm::Max),
            vec_norm(self.nut.values(), Norm::Max)
        );
        Ok(())
    }

    /// Interpolates the velocity to CG1, filters it, and interpolates the filtered velocity back
    fn velocity_operations(&mut self, u_ab: &[Vector]) -> Result<(), StrError> {
        for i in 0..self.geo.ndim {
            if self.vdegree {
                vec_copy(&mut self.u_cg1[i], &u_ab[i])?;
            } else {
                interpolate(&mut self.u_cg1[i], &self.cg1, &u_ab[i], &self.velocity_space)?;
                for bc in &self.bcs_u_cg1[i] {
                    bc.apply(&mut self.u_cg1[i])?;
                }
            }
            self.workspace
                .filter
                .apply(&mut self.u_filtered[i], &self.u_cg1[i], 1.0, 1)?;
            for bc in &self.bcs_u_cg1[i] {
                bc.apply(&mut self.u_filtered[i])?;
            }
            interpolate(&mut self.u_filtered_v[i], &self.velocity_space, &self.u_filtered[i], &self.cg1)?;
        }
        Ok(())
    }

    /// Recomputes the eddy viscosity from the current coefficient
    fn update_nut(&mut self, u: &[Vector]) -> Result<(), StrError> {
        let form = SmagorinskyForm {
            geo: &self.geo,
            velocity_space: &self.velocity_space,
            velocity: u,
            cg1: &self.cg1,
            cs: &self.cs,
            delta: &self.delta,
        };
        self.nut.update(&form)
    }

    /// Returns the nodal dynamic coefficient Cs²
    pub fn cs(&self) -> &Vector {
        &self.cs
    }

    /// Returns the Lagrangian average of L:M
    pub fn jlm(&self) -> &Vector {
        self.averager.jlm()
    }

    /// Returns the Lagrangian average of M:M
    pub fn jmm(&self) -> &Vector {
        self.averager.jmm()
    }

    /// Returns the phase of the Lagrangian averages
    pub fn phase(&self) -> AveragerPhase {
        self.averager.phase()
    }

    /// Returns the last Lij tensor
    pub fn lij(&self) -> &SymTensorField {
        &self.lij
    }

    /// Returns the last Mij tensor
    pub fn mij(&self) -> &SymTensorField {
        &self.mij
    }

    /// Returns the magnitude of the rate of strain of the last Mij computation
    pub fn mag_s(&self) -> &Vector {
        self.workspace.mag_s()
    }

    /// Returns the squared filter width on the CG1 space
    pub fn delta_cg1_sq(&self) -> &Vector {
        &self.workspace.delta_cg1_sq
    }

    /// Returns true if the velocity space equals the CG1 space
    pub fn vdegree(&self) -> bool {
        self.vdegree
    }

    /// Returns the filtered velocity interpolated to the velocity space
    pub fn u_filtered(&self) -> &[Vector] {
        &self.u_filtered_v
    }

    /// Returns the eddy-viscosity field
    pub fn nut_function(&self) -> &Cg1Function {
        &self.nut
    }
}

impl LesModel for DynamicLagrangian {
    fn update(&mut self, tstep: usize, velocity: &Velocity) -> Result<(), StrError> {
        DynamicLagrangian::update(self, tstep, velocity)
    }

    fn nut(&self) -> &Vector {
        self.nut.values()
    }

    fn name(&self) -> &str {
        "DynamicLagrangian"
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
