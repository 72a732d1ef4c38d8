use crate::StrError;
use gemlab::mesh::{Cell, Mesh, Point, PointId};
use gemlab::shapes::GeoKind;
use std::collections::HashMap;

/// Generates structured simplicial meshes for tests and demonstrations
pub struct SampleMeshes {}

impl SampleMeshes {
    /// Returns a mesh of the unit square with 2 × ndiv × ndiv triangles
    ///
    /// ```text
    ///  3-----2
    ///  | [1]/|   each square is split along
    ///  |  /  |   its (0,2) diagonal
    ///  |/ [0]|
    ///  0-----1
    /// ```
    pub fn unit_square_tri3(ndiv: usize) -> Mesh {
        let n = usize::max(ndiv, 1);
        let h = 1.0 / (n as f64);
        let id = |i: usize, j: usize| j * (n + 1) + i;
        let mut points = Vec::with_capacity((n + 1) * (n + 1));
        for j in 0..(n + 1) {
            for i in 0..(n + 1) {
                points.push(Point {
                    id: id(i, j),
                    marker: 0,
                    coords: vec![(i as f64) * h, (j as f64) * h],
                });
            }
        }
        let mut cells = Vec::with_capacity(2 * n * n);
        for j in 0..n {
            for i in 0..n {
                let (p0, p1, p2, p3) = (id(i, j), id(i + 1, j), id(i + 1, j + 1), id(i, j + 1));
                for triangle in [[p0, p1, p2], [p0, p2, p3]] {
                    cells.push(Cell {
                        id: cells.len(),
                        attribute: 1,
                        kind: GeoKind::Tri3,
                        points: triangle.to_vec(),
                    });
                }
            }
        }
        Mesh { ndim: 2, points, cells }
    }

    /// Returns a mesh of the unit cube with 6 × ndiv³ tetrahedra (Kuhn subdivision)
    pub fn unit_cube_tet4(ndiv: usize) -> Mesh {
        let n = usize::max(ndiv, 1);
        let h = 1.0 / (n as f64);
        let id = |i: usize, j: usize, k: usize| k * (n + 1) * (n + 1) + j * (n + 1) + i;
        let mut points = Vec::with_capacity((n + 1) * (n + 1) * (n + 1));
        for k in 0..(n + 1) {
            for j in 0..(n + 1) {
                for i in 0..(n + 1) {
                    points.push(Point {
                        id: id(i, j, k),
                        marker: 0,
                        coords: vec![(i as f64) * h, (j as f64) * h, (k as f64) * h],
                    });
                }
            }
        }
        // (permutation, odd parity)
        const PERMUTATIONS: [([usize; 3], bool); 6] = [
            ([0, 1, 2], false),
            ([0, 2, 1], true),
            ([1, 0, 2], true),
            ([1, 2, 0], false),
            ([2, 0, 1], false),
            ([2, 1, 0], true),
        ];
        let mut cells = Vec::with_capacity(6 * n * n * n);
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    for (perm, odd) in &PERMUTATIONS {
                        // walk from corner (0,0,0) to corner (1,1,1) along the permuted axes
                        let mut corner = [i, j, k];
                        let mut tet = vec![id(corner[0], corner[1], corner[2])];
                        for axis in perm {
                            corner[*axis] += 1;
                            tet.push(id(corner[0], corner[1], corner[2]));
                        }
                        // positive Jacobian determinant
                        if *odd {
                            tet.swap(1, 2);
                        }
                        cells.push(Cell {
                            id: cells.len(),
                            attribute: 1,
                            kind: GeoKind::Tet4,
                            points: tet,
                        });
                    }
                }
            }
        }
        Mesh { ndim: 3, points, cells }
    }

    /// Returns a copy of a linear mesh with mid-edge points (Tri3 → Tri6 and Tet4 → Tet10)
    ///
    /// Triangles are upgraded by [Mesh::convert_2d], which renumbers all points. In 3D, the
    /// original points are kept and the mid-edge points are appended following the local
    /// edge numbering of [GeoKind::Tet10].
    pub fn with_midside_points(mesh: &Mesh) -> Result<Mesh, StrError> {
        if mesh.cells.iter().any(|cell| cell.kind != GeoKind::Tri3 && cell.kind != GeoKind::Tet4) {
            return Err("only Tri3 and Tet4 cells can receive mid-edge points");
        }
        if mesh.ndim == 2 {
            return mesh.convert_2d(GeoKind::Tri6);
        }
        let target = GeoKind::Tet10;
        let mut points = mesh.points.clone();
        let mut cells = Vec::with_capacity(mesh.cells.len());
        let mut edge_to_point: HashMap<(PointId, PointId), PointId> = HashMap::new();
        for cell in &mesh.cells {
            let mut cell_points = cell.points.clone();
            cell_points.resize(target.nnode(), 0);
            for e in 0..target.nedge() {
                let pa = cell.points[target.edge_node_id(e, 0)];
                let pb = cell.points[target.edge_node_id(e, 1)];
                let key = if pa < pb { (pa, pb) } else { (pb, pa) };
                let point_id = match edge_to_point.get(&key) {
                    Some(existing) => *existing,
                    None => {
                        let new_id = points.len();
                        let coords = mesh.points[pa]
                            .coords
                            .iter()
                            .zip(&mesh.points[pb].coords)
                            .map(|(xa, xb)| 0.5 * (xa + xb))
                            .collect();
                        points.push(Point {
                            id: new_id,
                            marker: 0,
                            coords,
                        });
                        edge_to_point.insert(key, new_id);
                        new_id
                    }
                };
                cell_points[target.edge_node_id(e, 2)] = point_id;
            }
            cells.push(Cell {
                id: cell.id,
                attribute: cell.attribute,
                kind: target,
                points: cell_points,
            });
        }
        Ok(Mesh {
            ndim: mesh.ndim,
            points,
            cells,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
