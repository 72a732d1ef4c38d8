use super::{magnitude, remove_trace, StrainRateReconstructor, SymTensorField, TopHatFilter};
use crate::base::{ParamKrylov, TensorLayout};
use crate::fem::{assemble_derivative_matrices, vec_add_mul_elem, vec_mul_elem, FunctionSpace, MeshGeometry, SparseOperator};
use crate::StrError;
use russell_lab::{vec_copy, Vector};

/// Holds the operators and the scratch data used to build the Germano identity tensors
///
/// ```text
/// Lij = F(u_i u_j) - F(u_i) F(u_j)
/// Mij = 2 Δ² (F(|S| Sij) - α² |S_f| S_fij)
/// ```
pub struct TensorWorkspace {
    /// Packed layout
    pub layout: TensorLayout,

    /// Test filter
    pub filter: TopHatFilter,

    /// Rate-of-strain reconstructor
    pub strain: StrainRateReconstructor,

    /// Squared filter width on the CG1 space
    pub delta_cg1_sq: Vector,

    /// Ratio between the test-filter and the grid-filter widths
    pub alpha: f64,

    /// Rate of strain of the unfiltered velocity
    pub sij: SymTensorField,

    /// Rate of strain of the filtered velocity
    pub sijf: SymTensorField,

    /// Magnitude of sij
    pub mag_s: Vector,

    /// Magnitude of sijf
    pub mag_sf: Vector,

    /// Derivative matrices with CG1 trial and test functions (mixed-model source)
    pub(super) derivatives_cg1: Vec<SparseOperator>,

    /// Scratch vectors
    pub(super) product: Vector,
    pub(super) dummy: Vector,
    pub(super) dummy2: Vector,
}

impl TensorWorkspace {
    /// Allocates a new instance
    pub fn new(
        geo: &MeshGeometry,
        velocity_space: &FunctionSpace,
        cg1: &FunctionSpace,
        delta_cg1_sq: Vector,
        alpha: f64,
        solver_param: ParamKrylov,
    ) -> Result<Self, StrError> {
        if delta_cg1_sq.dim() != cg1.ndof {
            return Err("delta_cg1_sq must have one value per CG1 DOF");
        }
        if alpha <= 0.0 {
            return Err("alpha must be > 0.0");
        }
        let layout = TensorLayout::from_ndim(geo.ndim)?;
        let n = cg1.ndof;
        Ok(TensorWorkspace {
            layout,
            filter: TopHatFilter::new(geo, cg1)?,
            strain: StrainRateReconstructor::new(geo, velocity_space, cg1, solver_param)?,
            delta_cg1_sq,
            alpha,
            sij: SymTensorField::new(layout, n),
            sijf: SymTensorField::new(layout, n),
            mag_s: Vector::new(n),
            mag_sf: Vector::new(n),
            derivatives_cg1: assemble_derivative_matrices(geo, cg1, cg1)?,
            product: Vector::new(n),
            dummy: Vector::new(n),
            dummy2: Vector::new(n),
        })
    }

    /// Returns the magnitude of the unfiltered rate of strain computed by the last [TensorWorkspace::compute_mij]
    pub fn mag_s(&self) -> &Vector {
        &self.mag_s
    }

    /// Computes Lij = F(u_a u_b) - F(u_a) F(u_b) (traceless)
    ///
    /// `u` and `uf` are the CG1 velocity and its filtered counterpart.
    pub fn compute_lij(&mut self, lij: &mut SymTensorField, u: &[Vector], uf: &[Vector]) -> Result<(), StrError> {
        self.lij_kernel(lij, None, u, uf)
    }

    /// Computes Lij and keeps F(u_a u_b) in qij (scale-dependent model)
    pub fn compute_lij_keeping_filtered(
        &mut self,
        lij: &mut SymTensorField,
        qij: &mut SymTensorField,
        u: &[Vector],
        uf: &[Vector],
    ) -> Result<(), StrError> {
        self.lij_kernel(lij, Some(qij), u, uf)
    }

    /// Computes Mij = 2 Δ² (F(|S| Sij) - α² |S_f| S_fij)
    ///
    /// `u_nf` and `u_f` are the unfiltered and filtered velocities in the velocity space.
    /// The magnitude |S| remains available via [TensorWorkspace::mag_s].
    pub fn compute_mij(&mut self, mij: &mut SymTensorField, u_nf: &[Vector], u_f: &[Vector]) -> Result<(), StrError> {
        self.mij_kernel(mij, None, u_nf, u_f)
    }

    /// Computes Mij and keeps F(|S| Sij) in nij (scale-dependent model)
    pub fn compute_mij_keeping_filtered(
        &mut self,
        mij: &mut SymTensorField,
        nij: &mut SymTensorField,
        u_nf: &[Vector],
        u_f: &[Vector],
    ) -> Result<(), StrError> {
        self.mij_kernel(mij, Some(nij), u_nf, u_f)
    }

    /// Computes the second filter level of the kept F(u_a u_b)
    ///
    /// ```text
    /// Qij ← F(Qij) - uf_a uf_b
    /// ```
    pub fn compute_qij(&mut self, qij: &mut SymTensorField, uf: &[Vector]) -> Result<(), StrError> {
        self.check(qij, uf)?;
        for (k, (a, b)) in self.layout.pairs().iter().enumerate() {
            self.filter.apply_in_place(&mut qij.comps[k], 1.0, 1)?;
            vec_add_mul_elem(&mut qij.comps[k], -1.0, &uf[*a], &uf[*b])?;
        }
        Ok(())
    }

    /// Computes the second filter level of the kept F(|S| Sij)
    ///
    /// ```text
    /// Nij ← 2 Δ² (F(Nij) - α² |S_ff| S_ffij)
    /// ```
    ///
    /// where S_ff is reconstructed from `u_f` into the filtered-strain slot.
    pub fn compute_nij(&mut self, nij: &mut SymTensorField, u_f: &[Vector]) -> Result<(), StrError> {
        self.check(nij, u_f)?;
        self.strain.reconstruct(&mut self.sijf, self.filter.mass_matrix(), u_f)?;
        magnitude(&mut self.mag_sf, &self.sijf)?;
        let alpha_sq = self.alpha * self.alpha;
        for k in 0..self.layout.tensdim() {
            self.filter.apply_in_place(&mut nij.comps[k], 1.0, 1)?;
            vec_add_mul_elem(&mut nij.comps[k], -alpha_sq, &self.mag_sf, &self.sijf.comps[k])?;
            self.scale_by_two_delta_sq(&mut nij.comps[k]);
        }
        Ok(())
    }

    /// Checks the number of components of the input data
    pub(super) fn check(&self, out: &SymTensorField, velocity: &[Vector]) -> Result<(), StrError> {
        if out.layout != self.layout {
            return Err("the tensor layout is incompatible with the mesh");
        }
        if velocity.len() != self.layout.ndim() {
            return Err("the number of velocity components must equal ndim");
        }
        Ok(())
    }

    fn lij_kernel(
        &mut self,
        lij: &mut SymTensorField,
        mut qij: Option<&mut SymTensorField>,
        u: &[Vector],
        uf: &[Vector],
    ) -> Result<(), StrError> {
        self.check(lij, u)?;
        self.check(lij, uf)?;
        for (k, (a, b)) in self.layout.pairs().iter().enumerate() {
            vec_mul_elem(&mut self.product, &u[*a], &u[*b])?;
            self.filter.apply(&mut lij.comps[k], &self.product, 1.0, 1)?;
            if let Some(q) = qij.as_mut() {
                vec_copy(&mut q.comps[k], &lij.comps[k])?;
            }
            vec_add_mul_elem(&mut lij.comps[k], -1.0, &uf[*a], &uf[*b])?;
        }
        remove_trace(lij);
        Ok(())
    }

    fn mij_kernel(
        &mut self,
        mij: &mut SymTensorField,
        mut nij: Option<&mut SymTensorField>,
        u_nf: &[Vector],
        u_f: &[Vector],
    ) -> Result<(), StrError> {
        self.check(mij, u_nf)?;
        self.check(mij, u_f)?;
        let mass = self.filter.mass_matrix();
        self.strain.reconstruct(&mut self.sij, mass, u_nf)?;
        self.strain.reconstruct(&mut self.sijf, mass, u_f)?;
        magnitude(&mut self.mag_s, &self.sij)?;
        magnitude(&mut self.mag_sf, &self.sijf)?;
        let alpha_sq = self.alpha * self.alpha;
        for k in 0..self.layout.tensdim() {
            vec_mul_elem(&mut self.product, &self.mag_s, &self.sij.comps[k])?;
            self.filter.apply(&mut mij.comps[k], &self.product, 1.0, 1)?;
            if let Some(n) = nij.as_mut() {
                vec_copy(&mut n.comps[k], &mij.comps[k])?;
            }
            vec_add_mul_elem(&mut mij.comps[k], -alpha_sq, &self.mag_sf, &self.sijf.comps[k])?;
            self.scale_by_two_delta_sq(&mut mij.comps[k]);
        }
        Ok(())
    }

    fn scale_by_two_delta_sq(&self, v: &mut Vector) {
        for i in 0..v.dim() {
            v[i] *= 2.0 * self.delta_cg1_sq[i];
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::TensorWorkspace;
    use crate::base::{nodal_values, ParamKrylov, SampleMeshes, TensorLayout, DEFAULT_ALPHA};
    use crate::fem::{FunctionSpace, MeshGeometry, SpaceKind};
    use crate::les::SymTensorField;
    use russell_lab::{approx_eq, vec_norm, Norm, Vector};

    struct Setup {
        cg1: FunctionSpace,
        workspace: TensorWorkspace,
    }

    fn setup(ndiv: usize, delta_sq: f64) -> Setup {
        let mesh = SampleMeshes::unit_square_tri3(ndiv);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let delta = Vector::filled(cg1.ndof, delta_sq);
        let workspace = TensorWorkspace::new(&geo, &cg1, &cg1, delta, DEFAULT_ALPHA, ParamKrylov::sample()).unwrap();
        Setup { cg1, workspace }
    }

    #[test]
    fn new_captures_errors() {
        let mesh = SampleMeshes::unit_square_tri3(1);
        let geo = MeshGeometry::new(&mesh).unwrap();
        let cg1 = FunctionSpace::new(&mesh, SpaceKind::Cg1).unwrap();
        let param = ParamKrylov::sample();
        assert_eq!(
            TensorWorkspace::new(&geo, &cg1, &cg1, Vector::new(1), 2.0, param).err(),
            Some("delta_cg1_sq must have one value per CG1 DOF")
        );
        assert_eq!(
            TensorWorkspace::new(&geo, &cg1, &cg1, Vector::new(4), 0.0, param).err(),
            Some("alpha must be > 0.0")
        );
    }

    #[test]
    fn uniform_flow_gives_zero_tensors() {
        let Setup { cg1, mut workspace } = setup(3, 0.01);
        let u = vec![Vector::filled(cg1.ndof, 1.5), Vector::filled(cg1.ndof, -0.5)];
        let mut lij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        let mut qij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        let mut mij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        let mut nij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        workspace.compute_lij_keeping_filtered(&mut lij, &mut qij, &u, &u).unwrap();
        workspace.compute_mij_keeping_filtered(&mut mij, &mut nij, &u, &u).unwrap();
        for k in 0..3 {
            assert!(vec_norm(&lij.comps[k], Norm::Max) < 1e-14);
            assert!(vec_norm(&mij.comps[k], Norm::Max) < 1e-14);
            assert!(vec_norm(&workspace.sij.comps[k], Norm::Max) < 1e-14);
        }
        assert!(vec_norm(workspace.mag_s(), Norm::Max) < 1e-14);

        // F(u_a u_b) is kept
        approx_eq(qij.comps[1][0], -0.75, 1e-14);
        workspace.compute_qij(&mut qij, &u).unwrap();
        workspace.compute_nij(&mut nij, &u).unwrap();
        for k in 0..3 {
            assert!(vec_norm(&qij.comps[k], Norm::Max) < 1e-14);
            assert!(vec_norm(&nij.comps[k], Norm::Max) < 1e-14);
        }
    }

    #[test]
    fn lij_is_traceless_and_non_negative_along_the_stretch() {
        let Setup { cg1, mut workspace } = setup(4, 0.01);
        let u = vec![nodal_values(&cg1.dof_coords, |x| x[0]), Vector::new(cg1.ndof)];
        let mut uf = vec![Vector::new(cg1.ndof), Vector::new(cg1.ndof)];
        workspace.filter.apply(&mut uf[0], &u[0], 1.0, 1).unwrap();
        let mut lij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        workspace.compute_lij(&mut lij, &u, &uf).unwrap();
        for i in 0..cg1.ndof {
            approx_eq(lij.comps[0][i] + lij.comps[2][i], 0.0, 1e-14);
            approx_eq(lij.comps[1][i], 0.0, 1e-15);
            assert!(lij.comps[0][i] >= -1e-15);
        }
        assert!(vec_norm(&lij.comps[0], Norm::Max) > 0.0);
    }

    #[test]
    fn mij_matches_simple_shear() {
        // u = (γ y, 0) ⇒ S_xy = γ/2, |S| = γ and Mij = 2 Δ² γ S (1 - α²)
        let gamma = 2.0;
        let delta_sq = 0.01;
        let Setup { cg1, mut workspace } = setup(3, delta_sq);
        let u = vec![nodal_values(&cg1.dof_coords, |x| gamma * x[1]), Vector::new(cg1.ndof)];
        let mut mij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        workspace.compute_mij(&mut mij, &u, &u).unwrap();
        let correct = 2.0 * delta_sq * gamma * (0.5 * gamma) * (1.0 - DEFAULT_ALPHA * DEFAULT_ALPHA);
        for i in 0..cg1.ndof {
            approx_eq(workspace.mag_s()[i], gamma, 1e-8);
            approx_eq(mij.comps[0][i], 0.0, 1e-8);
            approx_eq(mij.comps[1][i], correct, 1e-8);
            approx_eq(mij.comps[2][i], 0.0, 1e-8);
        }
    }

    #[test]
    fn kernels_capture_errors() {
        let Setup { cg1, mut workspace } = setup(1, 0.01);
        let u = vec![Vector::new(cg1.ndof)];
        let mut lij = SymTensorField::new(TensorLayout::TwoDim, cg1.ndof);
        assert_eq!(
            workspace.compute_lij(&mut lij, &u, &u).err(),
            Some("the number of velocity components must equal ndim")
        );
        let u = vec![Vector::new(cg1.ndof), Vector::new(cg1.ndof)];
        let mut wrong = SymTensorField::new(TensorLayout::ThreeDim, cg1.ndof);
        assert_eq!(
            workspace.compute_mij(&mut wrong, &u, &u).err(),
            Some("the tensor layout is incompatible with the mesh")
        );
    }
}
