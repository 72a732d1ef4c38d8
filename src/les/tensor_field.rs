use crate::base::TensorLayout;
use crate::fem::vec_sqrt_clamped;
use crate::StrError;
use russell_lab::Vector;

/// Holds a symmetric rank-2 tensor field stored as packed nodal components
///
/// See [TensorLayout] for the order of the components.
#[derive(Clone, Debug)]
pub struct SymTensorField {
    /// Packed layout
    pub layout: TensorLayout,

    /// Nodal values of each packed component (tensdim × ndof)
    pub comps: Vec<Vector>,
}

impl SymTensorField {
    /// Allocates a new field with zero components
    pub fn new(layout: TensorLayout, ndof: usize) -> Self {
        SymTensorField {
            layout,
            comps: (0..layout.tensdim()).map(|_| Vector::new(ndof)).collect(),
        }
    }

    /// Returns the number of DOFs of each component
    pub fn ndof(&self) -> usize {
        self.comps[0].dim()
    }

    /// Sets all components to a value
    pub fn fill(&mut self, value: f64) {
        for comp in &mut self.comps {
            comp.fill(value);
        }
    }

    /// Copies all components from another field
    pub fn set_from(&mut self, other: &SymTensorField) -> Result<(), StrError> {
        if self.layout != other.layout || self.ndof() != other.ndof() {
            return Err("tensor fields are incompatible");
        }
        for (a, b) in self.comps.iter_mut().zip(&other.comps) {
            a.as_mut_data().copy_from_slice(b.as_data());
        }
        Ok(())
    }
}

/// Computes the double contraction of two symmetric tensor fields at each DOF
///
/// ```text
/// out = A : B = Σ_k m_k A_k B_k
/// ```
///
/// where m_k are the multiplicities of the packed components.
pub fn contraction(out: &mut Vector, a: &SymTensorField, b: &SymTensorField) -> Result<(), StrError> {
    debug_assert_eq!(a.layout, b.layout);
    let n = out.dim();
    if a.ndof() != n || b.ndof() != n {
        return Err("tensor fields are incompatible with the output vector");
    }
    out.fill(0.0);
    for (k, m) in a.layout.multiplicity().iter().enumerate() {
        let (ak, bk) = (&a.comps[k], &b.comps[k]);
        for i in 0..n {
            out[i] += m * ak[i] * bk[i];
        }
    }
    Ok(())
}

/// Computes the magnitude of a symmetric tensor field at each DOF
///
/// ```text
/// out = sqrt(2 A : A)
/// ```
pub fn magnitude(out: &mut Vector, a: &SymTensorField) -> Result<(), StrError> {
    contraction(out, a, a)?;
    out.scale(2.0);
    vec_sqrt_clamped(out);
    Ok(())
}

/// Removes the trace from a symmetric tensor field
///
/// Subtracts `tr(A) / ndim` from each diagonal component; off-diagonal components are untouched.
pub fn remove_trace(a: &mut SymTensorField) {
    let diagonal = a.layout.diagonal();
    let ndim = a.layout.ndim() as f64;
    for i in 0..a.ndof() {
        let mean = diagonal.iter().map(|k| a.comps[*k][i]).sum::<f64>() / ndim;
        for k in diagonal {
            a.comps[*k][i] -= mean;
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
