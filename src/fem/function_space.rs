use super::{cell_degree, MeshGeometry};
use crate::StrError;
use gemlab::mesh::{CellId, Mesh};
use russell_lab::Vector;

/// Defines the kinds of scalar function spaces
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpaceKind {
    /// Continuous piecewise-linear functions (DOFs at the corner points)
    Cg1,

    /// Continuous piecewise-quadratic functions (DOFs at the corner and mid-edge points)
    Cg2,

    /// Discontinuous piecewise-constant functions (one DOF per cell)
    Dg0,
}

/// Holds the degrees of freedom (DOF) of a scalar function space
#[derive(Clone, Debug)]
pub struct FunctionSpace {
    /// Kind of space
    pub kind: SpaceKind,

    /// Space dimension
    pub ndim: usize,

    /// Total number of DOFs
    pub ndof: usize,

    /// Local-to-global DOF numbers of each cell (ncell × n_local_dof)
    pub cell_dofs: Vec<Vec<usize>>,

    /// Coordinates of each DOF (ndof × ndim)
    pub dof_coords: Vec<Vec<f64>>,
}

impl FunctionSpace {
    /// Allocates a new instance
    ///
    /// The CG DOFs are numbered following the increasing order of the mesh point ids;
    /// hence, in a linear mesh without unused points, the CG1 DOF number equals the point id.
    pub fn new(mesh: &Mesh, kind: SpaceKind) -> Result<Self, StrError> {
        let ndim = mesh.ndim;
        if ndim != 2 && ndim != 3 {
            return Err("ndim must be 2 or 3");
        }
        if mesh.cells.len() == 0 {
            return Err("mesh must have at least one cell");
        }
        let mut mesh_degree = 0;
        for cell in &mesh.cells {
            let degree = cell_degree(ndim, cell.kind)?;
            if mesh_degree != 0 && degree != mesh_degree {
                return Err("all cells must have the same polynomial degree");
            }
            mesh_degree = degree;
        }
        let n_local = match kind {
            SpaceKind::Cg1 => ndim + 1,
            SpaceKind::Cg2 => {
                if mesh_degree < 2 {
                    return Err("CG2 space requires Tri6 or Tet10 cells");
                }
                if ndim == 2 {
                    6
                } else {
                    10
                }
            }
            SpaceKind::Dg0 => {
                let cell_dofs = (0..mesh.cells.len()).map(|c| vec![c]).collect();
                let dof_coords = mesh
                    .cells
                    .iter()
                    .map(|cell| {
                        let corners = &cell.points[0..(ndim + 1)];
                        (0..ndim)
                            .map(|i| corners.iter().map(|p| mesh.points[*p].coords[i]).sum::<f64>() / ((ndim + 1) as f64))
                            .collect()
                    })
                    .collect();
                return Ok(FunctionSpace {
                    kind,
                    ndim,
                    ndof: mesh.cells.len(),
                    cell_dofs,
                    dof_coords,
                });
            }
        };

        // compact numbering of the used points
        let mut point_to_dof = vec![usize::MAX; mesh.points.len()];
        for cell in &mesh.cells {
            for p in &cell.points[0..n_local] {
                point_to_dof[*p] = 0;
            }
        }
        let mut dof_coords = Vec::new();
        for (p, dof) in point_to_dof.iter_mut().enumerate() {
            if *dof == 0 {
                *dof = dof_coords.len();
                dof_coords.push(mesh.points[p].coords.clone());
            }
        }
        let cell_dofs = mesh
            .cells
            .iter()
            .map(|cell| cell.points[0..n_local].iter().map(|p| point_to_dof[*p]).collect())
            .collect();
        Ok(FunctionSpace {
            kind,
            ndim,
            ndof: dof_coords.len(),
            cell_dofs,
            dof_coords,
        })
    }

    /// Returns the polynomial degree (0, 1 or 2)
    pub fn degree(&self) -> usize {
        match self.kind {
            SpaceKind::Dg0 => 0,
            SpaceKind::Cg1 => 1,
            SpaceKind::Cg2 => 2,
        }
    }

    /// Returns the number of cells
    pub fn ncell(&self) -> usize {
        self.cell_dofs.len()
    }

    /// Returns true if both spaces have the same kind and number of DOFs
    pub fn same_as(&self, other: &FunctionSpace) -> bool {
        self.kind == other.kind && self.ndof == other.ndof
    }

    /// Returns a new vector with one entry per DOF
    pub fn new_vector(&self) -> Vector {
        Vector::new(self.ndof)
    }

    /// Returns the mean of the DOF values of a cell
    pub fn cell_mean(&self, cell_id: CellId, field: &Vector) -> f64 {
        let dofs = &self.cell_dofs[cell_id];
        dofs.iter().map(|d| field[*d]).sum::<f64>() / (dofs.len() as f64)
    }

    /// Returns the gradient of a field at the centroid of a cell
    ///
    /// The gradient of a DG0 field is zero. The third component is zero in 2D.
    pub fn gradient_at_centroid(&self, geo: &MeshGeometry, cell_id: CellId, field: &Vector) -> [f64; 3] {
        let mut grad = [0.0; 3];
        if self.kind == SpaceKind::Dg0 {
            return grad;
        }
        let gg = geo.centroid_gradients(cell_id, self.degree());
        for (m, dof) in self.cell_dofs[cell_id].iter().enumerate() {
            for j in 0..self.ndim {
                grad[j] += field[*dof] * gg.get(m, j);
            }
        }
        grad
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
