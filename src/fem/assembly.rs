use super::{FunctionSpace, KrylovSolver, KrylovStatus, MeshGeometry, SpaceKind, SparseOperator};
use crate::StrError;
use gemlab::integ;
use russell_lab::{Matrix, Vector};

/// Assembles the consistent mass matrix of a CG1 space
///
/// ```text
/// G_ij = ∫ ψ_i ψ_j dx
/// ```
pub fn assemble_mass_matrix(geo: &MeshGeometry, cg1: &FunctionSpace) -> Result<SparseOperator, StrError> {
    if cg1.kind != SpaceKind::Cg1 {
        return Err("the mass matrix requires a CG1 space");
    }
    let nnode = geo.ndim + 1;
    let mut kk = Matrix::new(nnode, nnode);
    let mut triplets = Vec::with_capacity(geo.ncell() * nnode * nnode);
    for (cell_id, dofs) in cg1.cell_dofs.iter().enumerate() {
        let mut pad = geo.scratchpad(cell_id, 1)?;
        let ips = integ::default_points(pad.kind);
        let mut args = integ::CommonArgs::new(&mut pad, ips);
        integ::mat_01_nsn(&mut kk, &mut args, |_, _, _| Ok(1.0))?;
        for m in 0..nnode {
            for n in 0..nnode {
                triplets.push((dofs[m], dofs[n], kk.get(m, n)));
            }
        }
    }
    SparseOperator::from_triplets(cg1.ndof, cg1.ndof, &triplets)
}

/// Computes the integral of each basis function of a CG1 or DG0 space
///
/// ```text
/// CG1:  ∫ ψ_i dx
/// DG0:  |T|
/// ```
pub fn assemble_basis_integrals(geo: &MeshGeometry, space: &FunctionSpace) -> Result<Vector, StrError> {
    match space.kind {
        SpaceKind::Cg1 => {
            let mut integrals = Vector::new(space.ndof);
            assemble_cell_integrals(&mut integrals, geo, space, &Vector::filled(geo.ncell(), 1.0))?;
            Ok(integrals)
        }
        SpaceKind::Dg0 => {
            let mut integrals = Vector::new(space.ndof);
            for cell_id in 0..space.ncell() {
                integrals[cell_id] = geo.volume(cell_id);
            }
            Ok(integrals)
        }
        SpaceKind::Cg2 => Err("basis integrals are available for CG1 and DG0 spaces only"),
    }
}

/// Integrates cellwise-constant values against the CG1 basis functions
///
/// ```text
/// b_i = Σ_T c_T ∫_T ψ_i dx
/// ```
pub fn assemble_cell_integrals(
    b: &mut Vector,
    geo: &MeshGeometry,
    cg1: &FunctionSpace,
    cell_values: &Vector,
) -> Result<(), StrError> {
    if cg1.kind != SpaceKind::Cg1 {
        return Err("the cell integrals require a CG1 space");
    }
    if cell_values.dim() != geo.ncell() {
        return Err("the number of cell values must equal the number of cells");
    }
    if b.dim() != cg1.ndof {
        return Err("the vector is incompatible with the CG1 space");
    }
    b.fill(0.0);
    for (cell_id, dofs) in cg1.cell_dofs.iter().enumerate() {
        let integrals = &geo.cells[cell_id].shape_integrals;
        for (m, dof) in dofs.iter().enumerate() {
            b[*dof] += cell_values[cell_id] * integrals[m];
        }
    }
    Ok(())
}

/// Assembles the derivative matrices mapping trial-space fields onto CG1 test functions
///
/// Returns one matrix per space direction k:
///
/// ```text
/// (D_k)_ij = ∫ ψ_i (∂φ_j/∂x_k) dx
/// ```
///
/// where φ_j are the CG1 or CG2 trial functions and ψ_i are the CG1 test functions.
/// The trial shape drives the integration; the corner shape supplies the test functions.
pub fn assemble_derivative_matrices(
    geo: &MeshGeometry,
    trial: &FunctionSpace,
    cg1: &FunctionSpace,
) -> Result<Vec<SparseOperator>, StrError> {
    if cg1.kind != SpaceKind::Cg1 {
        return Err("the test space of the derivative matrices must be CG1");
    }
    if trial.kind == SpaceKind::Dg0 {
        return Err("the trial space of the derivative matrices must be CG1 or CG2");
    }
    let ndim = geo.ndim;
    let n_test = ndim + 1;
    let n_trial = trial.cell_dofs[0].len();
    let mut kk = Matrix::new(n_test, n_trial * ndim);
    let mut triplets = vec![Vec::with_capacity(geo.ncell() * n_test * n_trial); ndim];
    for cell_id in 0..geo.ncell() {
        let mut pad_b = geo.scratchpad(cell_id, 1)?;
        let mut pad = geo.scratchpad(cell_id, trial.degree())?;
        let ips = integ::default_points(pad.kind);
        let mut args = integ::CommonArgs::new(&mut pad, ips);
        integ::mat_04_nsb(&mut kk, &mut pad_b, &mut args, |_, _, _, _| Ok(1.0))?;
        let test_dofs = &cg1.cell_dofs[cell_id];
        let trial_dofs = &trial.cell_dofs[cell_id];
        for k in 0..ndim {
            for m in 0..n_test {
                for n in 0..n_trial {
                    triplets[k].push((test_dofs[m], trial_dofs[n], kk.get(m, k + n * ndim)));
                }
            }
        }
    }
    let mut matrices = Vec::with_capacity(ndim);
    for k in 0..ndim {
        matrices.push(SparseOperator::from_triplets(cg1.ndof, trial.ndof, &triplets[k])?);
    }
    Ok(matrices)
}

/// Computes the L2 projection of cellwise-constant values onto the CG1 space
///
/// Solves `G · x = b` with `b_i = Σ_T c_T ∫_T ψ_i dx`, where G is the CG1 mass matrix.
pub fn project_cells_to_cg1(
    x: &mut Vector,
    solver: &mut KrylovSolver,
    mass: &SparseOperator,
    geo: &MeshGeometry,
    cg1: &FunctionSpace,
    cell_values: &Vector,
) -> Result<KrylovStatus, StrError> {
    let mut rhs = Vector::new(cg1.ndof);
    assemble_cell_integrals(&mut rhs, geo, cg1, cell_values)?;
    solver.solve(mass, x, &rhs)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{nodal_values, ParamKrylov, SampleMeshes};
    use russell_lab::{approx_eq, vec_approx_eq, Vector};

    #[test]
    fn assemble_mass_matrix_works() {
        let mesh = SampleMeshes::unit_square_tri3(2);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let dg0 = FunctionSpace::new(&mesh, SpaceKind::Dg0).unwrap();
        assert_eq!(
            assemble_mass_matrix(&geo, &dg0).err(),
            Some("the mass matrix requires a CG1 space")
        );
        let mass = assemble_mass_matrix(&geo, &cg1).unwrap();
        assert_eq!(mass.dims(), (9, 9));

        // 1ᵀ G 1 = total area
        let ones = Vector::filled(9, 1.0);
        let mut g_ones = Vector::new(9);
        mass.mat_vec_mul(&mut g_ones, 1.0, &ones).unwrap();
        approx_eq(g_ones.as_data().iter().sum::<f64>(), 1.0, 1e-14);

        // G 1 equals the basis integrals
        let integrals = assemble_basis_integrals(&geo, &cg1).unwrap();
        vec_approx_eq(&g_ones, integrals.as_data(), 1e-15);

        // corner point 0 touches two triangles of area 1/8: ∫_T L_a L_a dx = |T| / 6
        approx_eq(integrals[0], 2.0 * (1.0 / 8.0) / 3.0, 1e-15);
        let mut e0 = Vector::new(9);
        e0[0] = 1.0;
        let mut g_e0 = Vector::new(9);
        mass.mat_vec_mul(&mut g_e0, 1.0, &e0).unwrap();
        approx_eq(g_e0[0], 2.0 * (1.0 / 8.0) / 6.0, 1e-15);
    }

    #[test]
    fn assemble_cell_integrals_captures_errors() {
        let mesh = SampleMeshes::unit_square_tri3(1);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let dg0 = FunctionSpace::new(&mesh, SpaceKind::Dg0).unwrap();
        let mut b = Vector::new(4);
        assert_eq!(
            assemble_cell_integrals(&mut b, &geo, &dg0, &Vector::new(2)).err(),
            Some("the cell integrals require a CG1 space")
        );
        assert_eq!(
            assemble_cell_integrals(&mut b, &geo, &cg1, &Vector::new(3)).err(),
            Some("the number of cell values must equal the number of cells")
        );
        let mut wrong = Vector::new(3);
        assert_eq!(
            assemble_cell_integrals(&mut wrong, &geo, &cg1, &Vector::new(2)).err(),
            Some("the vector is incompatible with the CG1 space")
        );
        assemble_cell_integrals(&mut b, &geo, &cg1, &Vector::from(&[3.0, 6.0])).unwrap();
        // point 0 touches both triangles of area 1/2
        approx_eq(b[0], (3.0 + 6.0) * 0.5 / 3.0, 1e-15);
    }

    #[test]
    fn assemble_basis_integrals_works() {
        let mesh = SampleMeshes::unit_cube_tet4(1);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let dg0 = FunctionSpace::new(&mesh, SpaceKind::Dg0).unwrap();
        let volumes = assemble_basis_integrals(&geo, &dg0).unwrap();
        vec_approx_eq(&volumes, &[1.0 / 6.0; 6], 1e-15);
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let integrals = assemble_basis_integrals(&geo, &cg1).unwrap();
        approx_eq(integrals.as_data().iter().sum::<f64>(), 1.0, 1e-14);
        let quadratic = SampleMeshes::with_midside_points(&mesh).unwrap();
        let cg2 = FunctionSpace::new(&quadratic, SpaceKind::Cg2).unwrap();
        assert_eq!(
            assemble_basis_integrals(&geo, &cg2).err(),
            Some("basis integrals are available for CG1 and DG0 spaces only")
        );
    }

    #[test]
    fn derivative_matrices_reproduce_linear_gradients() {
        // D_k u = ∫ (∂u/∂x_k) ψ_i dx = g_k ∫ ψ_i dx  for u = c + g · x
        let g = [0.5, -2.0, 3.0];
        let f = |x: &[f64]| 1.0 + x.iter().zip(&g).map(|(xi, gi)| xi * gi).sum::<f64>();
        for linear in [SampleMeshes::unit_square_tri3(2), SampleMeshes::unit_cube_tet4(1)] {
            let quadratic = SampleMeshes::with_midside_points(&linear).unwrap();
            let geo = MeshGeometry::new(&quadratic).unwrap();
            let cg1 = FunctionSpace::new(&quadratic, SpaceKind::Cg1).unwrap();
            let integrals = assemble_basis_integrals(&geo, &cg1).unwrap();
            for kind in [SpaceKind::Cg1, SpaceKind::Cg2] {
                let trial = FunctionSpace::new(&quadratic, kind).unwrap();
                let u = nodal_values(&trial.dof_coords, f);
                let dd = assemble_derivative_matrices(&geo, &trial, &cg1).unwrap();
                assert_eq!(dd.len(), geo.ndim);
                let mut b = Vector::new(cg1.ndof);
                for k in 0..geo.ndim {
                    dd[k].mat_vec_mul(&mut b, 1.0, &u).unwrap();
                    for i in 0..cg1.ndof {
                        approx_eq(b[i], g[k] * integrals[i], 1e-14);
                    }
                }
            }
        }
    }

    #[test]
    fn derivative_matrices_capture_errors() {
        let mesh = SampleMeshes::unit_square_tri3(1);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let dg0 = FunctionSpace::new(&mesh, SpaceKind::Dg0).unwrap();
        assert_eq!(
            assemble_derivative_matrices(&geo, &dg0, &cg1).err(),
            Some("the trial space of the derivative matrices must be CG1 or CG2")
        );
        assert_eq!(
            assemble_derivative_matrices(&geo, &cg1, &dg0).err(),
            Some("the test space of the derivative matrices must be CG1")
        );
    }

    #[test]
    fn project_cells_to_cg1_works() {
        // constant cell values are projected exactly
        let mesh = SampleMeshes::unit_square_tri3(3);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let mass = assemble_mass_matrix(&geo, &cg1).unwrap();
        let mut solver = KrylovSolver::new(ParamKrylov::sample(), cg1.ndof).unwrap();
        let cell_values = Vector::filled(geo.ncell(), 0.25);
        let mut x = Vector::new(cg1.ndof);
        let status = project_cells_to_cg1(&mut x, &mut solver, &mass, &geo, &cg1, &cell_values).unwrap();
        assert!(status.converged);
        vec_approx_eq(&x, &vec![0.25; cg1.ndof], 1e-9);
        assert_eq!(
            project_cells_to_cg1(&mut x, &mut solver, &mass, &geo, &cg1, &Vector::new(2)).err(),
            Some("the number of cell values must equal the number of cells")
        );
    }
}
