use super::{DynamicLagrangian, Wale};
use crate::base::{Config, LesKind};
use crate::fem::{DirichletBc, FunctionSpace, MeshGeometry, SpaceKind};
use crate::StrError;
use gemlab::mesh::{CellId, Mesh};
use russell_lab::Vector;
use russell_tensor::{Mandel, Tensor2};

/// Holds the data given by the flow solver to set up a turbulence model
pub struct LesInput<'a> {
    /// Mesh (Tri3/Tri6 in 2D or Tet4/Tet10 in 3D)
    pub mesh: &'a Mesh,

    /// Velocity space (CG1 or CG2), shared by all velocity components
    pub velocity_space: &'a FunctionSpace,

    /// Dirichlet conditions of each velocity component (ndim lists)
    ///
    /// The conditions of the first component define the boundary values of the eddy viscosity.
    pub bcs: &'a [Vec<DirichletBc>],

    /// Configuration
    pub config: &'a Config,
}

/// Holds the velocity components given by the flow solver at each time step
pub struct Velocity<'a> {
    /// Current velocity u (feeds the eddy-viscosity expressions)
    pub current: &'a [Vector],

    /// Extrapolated velocity u_ab (feeds the dynamic procedure)
    pub extrapolated: &'a [Vector],
}

/// Defines the contract of the subgrid-scale models
pub trait LesModel {
    /// Updates the model at the beginning of a time step (tstep starts at 1)
    fn update(&mut self, tstep: usize, velocity: &Velocity) -> Result<(), StrError>;

    /// Returns the nodal (CG1) eddy viscosity
    fn nut(&self) -> &Vector;

    /// Returns the name of the model
    fn name(&self) -> &str;
}

/// Implements the absence of a subgrid-scale model (zero eddy viscosity)
pub struct NoModel {
    nut: Vector,
}

impl NoModel {
    /// Allocates a new instance
    pub fn new(input: &LesInput) -> Result<Self, StrError> {
        input.validate()?;
        let cg1 = FunctionSpace::new(input.mesh, SpaceKind::Cg1)?;
        Ok(NoModel {
            nut: Vector::new(cg1.ndof),
        })
    }
}

impl LesModel for NoModel {
    fn update(&mut self, _tstep: usize, _velocity: &Velocity) -> Result<(), StrError> {
        Ok(())
    }

    fn nut(&self) -> &Vector {
        &self.nut
    }

    fn name(&self) -> &str {
        "NoModel"
    }
}

/// Allocates a turbulence model
pub fn les_setup(kind: LesKind, input: &LesInput) -> Result<Box<dyn LesModel>, StrError> {
    log::info!("setting up the {} subgrid-scale model", kind);
    match kind {
        LesKind::NoModel => Ok(Box::new(NoModel::new(input)?)),
        LesKind::DynamicLagrangian => Ok(Box::new(DynamicLagrangian::setup(input)?)),
        LesKind::Wale => Ok(Box::new(Wale::setup(input)?)),
    }
}

impl<'a> LesInput<'a> {
    /// Checks the consistency of the input data
    pub fn validate(&self) -> Result<(), StrError> {
        let ndim = self.mesh.ndim;
        if ndim != 2 && ndim != 3 {
            return Err("ndim must be 2 or 3");
        }
        if self.velocity_space.ndim != ndim {
            return Err("the velocity space is incompatible with the mesh");
        }
        if self.velocity_space.kind == SpaceKind::Dg0 {
            return Err("the velocity space must be CG1 or CG2");
        }
        if self.velocity_space.ncell() != self.mesh.cells.len() {
            return Err("the velocity space is incompatible with the mesh");
        }
        if self.bcs.len() != ndim {
            return Err("one list of boundary conditions per velocity component is required");
        }
        self.config.validate()
    }
}

impl<'a> Velocity<'a> {
    /// Checks the number of components and their dimensions
    pub fn check(&self, ndim: usize, ndof: usize) -> Result<(), StrError> {
        if self.current.len() != ndim || self.extrapolated.len() != ndim {
            return Err("the number of velocity components must equal ndim");
        }
        for u in self.current.iter().chain(self.extrapolated) {
            if u.dim() != ndof {
                return Err("velocity components are incompatible with the velocity space");
            }
        }
        Ok(())
    }
}

/// Returns the velocity gradient L_ab = ∂u_a/∂x_b at the centroid of a cell
///
/// The third row and column are zero in 2D.
pub(crate) fn velocity_gradient(
    geo: &MeshGeometry,
    space: &FunctionSpace,
    velocity: &[Vector],
    cell_id: CellId,
) -> [[f64; 3]; 3] {
    let mut grad = [[0.0; 3]; 3];
    for (a, u) in velocity.iter().enumerate() {
        grad[a] = space.gradient_at_centroid(geo, cell_id, u);
    }
    grad
}

/// Returns the symmetric part of a 3 × 3 matrix as a second-order tensor
pub(crate) fn symmetric_tensor(mat: &[[f64; 3]; 3], ndim: usize) -> Result<Tensor2, StrError> {
    let mut sym = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            sym[i][j] = 0.5 * (mat[i][j] + mat[j][i]);
        }
    }
    let mandel = if ndim == 2 {
        Mandel::Symmetric2D
    } else {
        Mandel::Symmetric
    };
    Tensor2::from_matrix(&sym, mandel)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
