use super::{symmetric_tensor, velocity_gradient, LesInput, LesModel, Velocity};
use crate::fem::{derived_bcs, CellForm, Cg1Function, FunctionSpace, MeshGeometry, SpaceKind};
use crate::StrError;
use gemlab::mesh::CellId;
use russell_lab::Vector;
use russell_tensor::t2_ddot_t2;

/// Implements the wall-adapting local eddy-viscosity (WALE) model
///
/// ```text
///                          (Sd:Sd)^(3/2)
/// nut = Cw² Δ² ─────────────────────────────────      Δ² = |cell|^(2/dim)
///               (S:S)^(5/2) + (Sd:Sd)^(5/4)
///
/// S  = sym(∇u)
/// Sd = sym(∇u · ∇u) - (1/dim) tr(∇u · ∇u) I
/// ```
///
/// Cells where the denominator vanishes contribute zero.
pub struct Wale {
    /// WALE constant
    cw: f64,

    /// Geometry of the cells
    geo: MeshGeometry,

    /// Velocity space
    velocity_space: FunctionSpace,

    /// Eddy viscosity
    nut: Cg1Function,
}

/// Evaluates the WALE expression in a cell
struct WaleForm<'a> {
    cw: f64,
    geo: &'a MeshGeometry,
    velocity_space: &'a FunctionSpace,
    velocity: &'a [Vector],
}

impl<'a> CellForm for WaleForm<'a> {
    fn eval(&self, cell_id: CellId) -> Result<f64, StrError> {
        let ndim = self.geo.ndim;
        let grad = velocity_gradient(self.geo, self.velocity_space, self.velocity, cell_id);
        let mut grad_sq = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    grad_sq[i][j] += grad[i][k] * grad[k][j];
                }
            }
        }
        let trace = (0..ndim).map(|i| grad_sq[i][i]).sum::<f64>() / (ndim as f64);
        for i in 0..ndim {
            grad_sq[i][i] -= trace;
        }
        let s = symmetric_tensor(&grad, ndim)?;
        let sd = symmetric_tensor(&grad_sq, ndim)?;
        let ss = t2_ddot_t2(&s, &s);
        let sdsd = f64::max(t2_ddot_t2(&sd, &sd), 0.0);
        let denominator = f64::powf(ss, 2.5) + f64::powf(sdsd, 1.25);
        if denominator <= 0.0 {
            return Ok(0.0);
        }
        let delta_sq = f64::powf(self.geo.volume(cell_id), 2.0 / (ndim as f64));
        Ok(self.cw * self.cw * delta_sq * f64::powf(sdsd, 1.5) / denominator)
    }
}

impl Wale {
    /// Allocates a new instance
    pub fn setup(input: &LesInput) -> Result<Self, StrError> {
        input.validate()?;
        let config = input.config;
        let geo = MeshGeometry::new(input.mesh)?;
        let cg1 = FunctionSpace::new(input.mesh, SpaceKind::Cg1)?;
        let nut = Cg1Function::new(
            "nut",
            &geo,
            &cg1,
            config.nut_method,
            derived_bcs(&cg1, &input.bcs[0])?,
            true,
            config.nut_solver,
        )?;
        log::info!(
            "WALE model: {} cells, {} CG1 DOFs, Cw = {}",
            geo.ncell(),
            cg1.ndof,
            config.wale.cw
        );
        Ok(Wale {
            cw: config.wale.cw,
            geo,
            velocity_space: input.velocity_space.clone(),
            nut,
        })
    }

    /// Updates the eddy viscosity from the current velocity
    ///
    /// Nothing happens at the first time step.
    pub fn update(&mut self, tstep: usize, velocity: &Velocity) -> Result<(), StrError> {
        velocity.check(self.geo.ndim, self.velocity_space.ndof)?;
        if tstep <= 1 {
            return Ok(());
        }
        let form = WaleForm {
            cw: self.cw,
            geo: &self.geo,
            velocity_space: &self.velocity_space,
            velocity: velocity.current,
        };
        self.nut.update(&form)
    }

    /// Returns the eddy-viscosity field
    pub fn nut_function(&self) -> &Cg1Function {
        &self.nut
    }
}

impl LesModel for Wale {
    fn update(&mut self, tstep: usize, velocity: &Velocity) -> Result<(), StrError> {
        Wale::update(self, tstep, velocity)
    }

    fn nut(&self) -> &Vector {
        self.nut.values()
    }

    fn name(&self) -> &str {
        "Wale"
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
