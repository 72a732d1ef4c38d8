use crate::StrError;
use gemlab::integ;
use gemlab::mesh::{Cell, CellId, Mesh};
use gemlab::shapes::{GeoKind, Scratchpad};
use russell_lab::{Matrix, Vector};

/// Reference coordinates of the centroid of the triangle
const TRI_CENTROID: [f64; 2] = [1.0 / 3.0, 1.0 / 3.0];

/// Reference coordinates of the centroid of the tetrahedron
const TET_CENTROID: [f64; 3] = [0.25, 0.25, 0.25];

/// Holds the geometry of a simplex (triangle or tetrahedron)
#[derive(Clone, Debug)]
pub struct CellGeometry {
    /// Area (2D) or volume (3D)
    pub volume: f64,

    /// Coordinates of the centroid (ndim)
    pub centroid: Vector,

    /// Integrals of the linear shape functions over the cell (ndim + 1)
    pub shape_integrals: Vector,

    /// Gradients of the linear shape functions at the centroid (ndim + 1 × ndim)
    pub gradient_linear: Matrix,

    /// Gradients of the quadratic shape functions at the centroid (empty in linear meshes)
    pub gradient_quadratic: Matrix,
}

/// Holds the geometry and the integration scratchpads of all cells of a simplicial mesh
///
/// Only the corner points define the geometry; thus, quadratic cells must have straight edges.
#[derive(Clone)]
pub struct MeshGeometry {
    /// Space dimension
    pub ndim: usize,

    /// Polynomial degree of the cells (1 for Tri3/Tet4; 2 for Tri6/Tet10)
    pub degree: usize,

    /// Geometry of each cell (ncell)
    pub cells: Vec<CellGeometry>,

    /// Scratchpads of the corner (Tri3/Tet4) shapes
    pads_linear: Vec<Scratchpad>,

    /// Scratchpads of the Tri6/Tet10 shapes (empty in linear meshes)
    pads_quadratic: Vec<Scratchpad>,
}

impl MeshGeometry {
    /// Computes the geometry of all cells
    pub fn new(mesh: &Mesh) -> Result<Self, StrError> {
        if mesh.ndim != 2 && mesh.ndim != 3 {
            return Err("ndim must be 2 or 3");
        }
        if mesh.cells.len() == 0 {
            return Err("mesh must have at least one cell");
        }
        let ndim = mesh.ndim;
        let degree = cell_degree(ndim, mesh.cells[0].kind)?;
        let ksi = centroid_ksi(ndim);
        let ncell = mesh.cells.len();
        let mut cells = Vec::with_capacity(ncell);
        let mut pads_linear = Vec::with_capacity(ncell);
        let mut pads_quadratic = Vec::with_capacity(if degree == 2 { ncell } else { 0 });
        for cell in &mesh.cells {
            if cell_degree(ndim, cell.kind)? != degree {
                return Err("all cells must have the same polynomial degree");
            }

            // corner shapes: volume, centroid, integrals and gradients
            let mut pad = new_pad(mesh, cell, simplex_kind(ndim, 1))?;
            let det_jac = pad
                .calc_gradient(ksi)
                .map_err(|_| "found a degenerate or inverted cell")?;
            if det_jac <= 0.0 {
                return Err("found a degenerate or inverted cell");
            }
            let gradient_linear = pad.gradient.clone();
            let mut centroid = Vector::new(ndim);
            pad.calc_coords(&mut centroid, ksi)?;
            let mut shape_integrals = Vector::new(ndim + 1);
            let ips = integ::default_points(pad.kind);
            let mut args = integ::CommonArgs::new(&mut pad, ips);
            integ::vec_01_ns(&mut shape_integrals, &mut args, |_, _| Ok(1.0))?;
            let volume = shape_integrals.as_data().iter().sum();
            pads_linear.push(pad);

            // quadratic shapes
            let gradient_quadratic = if degree == 2 {
                let mut pad = new_pad(mesh, cell, simplex_kind(ndim, 2))?;
                pad.calc_gradient(ksi)?;
                let gradient = pad.gradient.clone();
                pads_quadratic.push(pad);
                gradient
            } else {
                Matrix::new(0, 0)
            };

            cells.push(CellGeometry {
                volume,
                centroid,
                shape_integrals,
                gradient_linear,
                gradient_quadratic,
            });
        }
        Ok(MeshGeometry {
            ndim,
            degree,
            cells,
            pads_linear,
            pads_quadratic,
        })
    }

    /// Returns the number of cells
    pub fn ncell(&self) -> usize {
        self.cells.len()
    }

    /// Returns the volume of a cell
    pub fn volume(&self, cell_id: CellId) -> f64 {
        self.cells[cell_id].volume
    }

    /// Returns the sum of all cell volumes
    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(|c| c.volume).sum()
    }

    /// Returns the gradients of the shape functions of a given degree (1 or 2) at the centroid of a cell
    ///
    /// The rows follow the local nodes of gemlab's Tri3/Tet4 or Tri6/Tet10 shapes.
    pub fn centroid_gradients(&self, cell_id: CellId, degree: usize) -> &Matrix {
        if degree == 2 {
            &self.cells[cell_id].gradient_quadratic
        } else {
            &self.cells[cell_id].gradient_linear
        }
    }

    /// Returns a copy of the scratchpad of a cell for shapes of a given degree (1 or 2)
    pub fn scratchpad(&self, cell_id: CellId, degree: usize) -> Result<Scratchpad, StrError> {
        match degree {
            1 => Ok(self.pads_linear[cell_id].clone()),
            2 if self.degree == 2 => Ok(self.pads_quadratic[cell_id].clone()),
            _ => Err("shape functions of this degree are not available in this mesh"),
        }
    }
}

/// Returns the polynomial degree of a supported cell kind
pub(crate) fn cell_degree(ndim: usize, kind: GeoKind) -> Result<usize, StrError> {
    match (ndim, kind) {
        (2, GeoKind::Tri3) => Ok(1),
        (2, GeoKind::Tri6) => Ok(2),
        (3, GeoKind::Tet4) => Ok(1),
        (3, GeoKind::Tet10) => Ok(2),
        _ => Err("only Tri3 and Tri6 (2D) or Tet4 and Tet10 (3D) cells are supported"),
    }
}

/// Returns the simplex kind with the given space dimension (2 or 3) and degree (1 or 2)
pub fn simplex_kind(ndim: usize, degree: usize) -> GeoKind {
    match (ndim, degree) {
        (2, 1) => GeoKind::Tri3,
        (2, _) => GeoKind::Tri6,
        (_, 1) => GeoKind::Tet4,
        _ => GeoKind::Tet10,
    }
}

/// Returns the reference coordinates of the centroid
fn centroid_ksi(ndim: usize) -> &'static [f64] {
    if ndim == 2 {
        &TRI_CENTROID
    } else {
        &TET_CENTROID
    }
}

/// Allocates a scratchpad with the coordinates of the first nodes of a cell
fn new_pad(mesh: &Mesh, cell: &Cell, kind: GeoKind) -> Result<Scratchpad, StrError> {
    let mut pad = Scratchpad::new(mesh.ndim, kind)?;
    for m in 0..kind.nnode() {
        let x = &mesh.points[cell.points[m]].coords;
        for j in 0..mesh.ndim {
            pad.set_xx(m, j, x[j]);
        }
    }
    Ok(pad)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
