use super::{remove_trace, SymTensorField, TensorWorkspace};
use crate::base::GRID_FILTER_WEIGHT;
use crate::fem::{vec_add_mul_elem, vec_mul_elem};
use crate::StrError;
use russell_lab::{vec_update, Vector};

// Kernels of the mixed (scale-similarity) models. G denotes the grid filter
// (weight 0.75) and F the test filter.
impl TensorWorkspace {
    /// Computes the Leonard tensor G(u_a u_b) - G(u_a) G(u_b) (traceless)
    pub fn compute_leonard(&mut self, lij: &mut SymTensorField, u: &[Vector]) -> Result<(), StrError> {
        self.check(lij, u)?;
        let w = GRID_FILTER_WEIGHT;
        for (k, (a, b)) in self.layout.pairs().iter().enumerate() {
            vec_mul_elem(&mut self.product, &u[*a], &u[*b])?;
            self.filter.apply(&mut lij.comps[k], &self.product, w, 1)?;
            self.filter.apply(&mut self.dummy, &u[*a], w, 1)?;
            self.filter.apply(&mut self.dummy2, &u[*b], w, 1)?;
            vec_add_mul_elem(&mut lij.comps[k], -1.0, &self.dummy, &self.dummy2)?;
        }
        remove_trace(lij);
        Ok(())
    }

    /// Computes the momentum source of the mixed models from the Leonard tensor of the CG1 velocity
    ///
    /// ```text
    /// source_a = Σ_b D_b L_ab        with    (D_b)_ij = ∫ ψ_i (∂ψ_j/∂x_b) dx
    /// ```
    ///
    /// Each row a of the Leonard tensor is paired with the derivative along the column b;
    /// e.g., in 3D, source_y = D_x L_xy + D_y L_yy + D_z L_yz. The Leonard tensor is left in `lij`.
    pub fn compute_mixed_les_source(
        &mut self,
        source: &mut [Vector],
        lij: &mut SymTensorField,
        u: &[Vector],
    ) -> Result<(), StrError> {
        self.compute_leonard(lij, u)?;
        self.tensor_divergence(source, lij)
    }

    /// Computes the weak divergence of a symmetric tensor: source_a = Σ_b D_b T_ab
    pub fn tensor_divergence(&mut self, source: &mut [Vector], tij: &SymTensorField) -> Result<(), StrError> {
        let ndim = self.layout.ndim();
        if tij.layout != self.layout {
            return Err("the tensor layout is incompatible with the mesh");
        }
        if source.len() != ndim {
            return Err("one source vector per velocity component is required");
        }
        for a in 0..ndim {
            source[a].fill(0.0);
            for b in 0..ndim {
                let k = self.layout.index(a, b);
                self.derivatives_cg1[b].mat_vec_mul(&mut self.dummy, 1.0, &tij.comps[k])?;
                vec_update(&mut source[a], 1.0, &self.dummy)?;
            }
        }
        Ok(())
    }

    /// Computes the scale-similarity tensor of the DMM2 model (Vreman et al.)
    ///
    /// ```text
    /// Hij = F(G(uf_a uf_b)) - F(G(uf_a)) F(G(uf_b)) - F(G(u_a u_b)) + F(G(u_a) G(u_b))
    /// ```
    pub fn compute_hij_dmm2(&mut self, hij: &mut SymTensorField, u: &[Vector], uf: &[Vector]) -> Result<(), StrError> {
        self.check(hij, u)?;
        self.check(hij, uf)?;
        let w = GRID_FILTER_WEIGHT;
        for (k, (a, b)) in self.layout.pairs().iter().enumerate() {
            let h = &mut hij.comps[k];

            // F(G(uf_a uf_b))
            vec_mul_elem(&mut self.product, &uf[*a], &uf[*b])?;
            self.filter.apply(h, &self.product, w, 1)?;
            self.filter.apply_in_place(h, 1.0, 1)?;

            // - F(G(uf_a)) F(G(uf_b))
            self.filter.apply(&mut self.dummy, &uf[*a], w, 1)?;
            self.filter.apply_in_place(&mut self.dummy, 1.0, 1)?;
            self.filter.apply(&mut self.dummy2, &uf[*b], w, 1)?;
            self.filter.apply_in_place(&mut self.dummy2, 1.0, 1)?;
            vec_add_mul_elem(h, -1.0, &self.dummy, &self.dummy2)?;

            // - F(G(u_a u_b))
            vec_mul_elem(&mut self.product, &u[*a], &u[*b])?;
            self.filter.apply(&mut self.dummy, &self.product, w, 1)?;
            self.filter.apply_in_place(&mut self.dummy, 1.0, 1)?;
            vec_update(h, -1.0, &self.dummy)?;

            // + F(G(u_a) G(u_b))
            self.filter.apply(&mut self.dummy, &u[*a], w, 1)?;
            self.filter.apply(&mut self.dummy2, &u[*b], w, 1)?;
            vec_mul_elem(&mut self.product, &self.dummy, &self.dummy2)?;
            self.filter.apply(&mut self.dummy, &self.product, 1.0, 1)?;
            vec_update(h, 1.0, &self.dummy)?;
        }
        Ok(())
    }

    /// Computes the scale-similarity tensor of the DMM1 model (Zang et al.)
    ///
    /// ```text
    /// Hij = F(G(u_a) G(u_b)) - F(G(u_a)) F(G(u_b))
    /// ```
    pub fn compute_hij_dmm1(&mut self, hij: &mut SymTensorField, u: &[Vector]) -> Result<(), StrError> {
        self.check(hij, u)?;
        let w = GRID_FILTER_WEIGHT;
        for (k, (a, b)) in self.layout.pairs().iter().enumerate() {
            let h = &mut hij.comps[k];
            self.filter.apply(&mut self.dummy, &u[*a], w, 1)?;
            self.filter.apply(&mut self.dummy2, &u[*b], w, 1)?;
            vec_mul_elem(h, &self.dummy, &self.dummy2)?;
            self.filter.apply_in_place(h, 1.0, 1)?;
            self.filter.apply_in_place(&mut self.dummy, 1.0, 1)?;
            self.filter.apply_in_place(&mut self.dummy2, 1.0, 1)?;
            vec_add_mul_elem(h, -1.0, &self.dummy, &self.dummy2)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
