use gemlab::mesh::Mesh;
use russell_lab::Vector;

/// Returns a new empty 2D mesh
#[allow(dead_code)]
pub(crate) fn new_empty_mesh_2d() -> Mesh {
    Mesh {
        ndim: 2,
        points: Vec::new(),
        cells: Vec::new(),
    }
}

/// Returns a new empty 3D mesh
#[allow(dead_code)]
pub(crate) fn new_empty_mesh_3d() -> Mesh {
    Mesh {
        ndim: 3,
        points: Vec::new(),
        cells: Vec::new(),
    }
}

/// Evaluates a function of the coordinates at each DOF
#[allow(dead_code)]
pub(crate) fn nodal_values(dof_coords: &[Vec<f64>], f: impl Fn(&[f64]) -> f64) -> Vector {
    let mut values = Vector::new(dof_coords.len());
    for (i, x) in dof_coords.iter().enumerate() {
        values[i] = f(x);
    }
    values
}

