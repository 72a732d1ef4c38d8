use crate::StrError;

/// Velocity index pairs (a, b) of the packed 2D components (xx, xy, yy)
pub const PAIRS_2D: [(usize, usize); 3] = [(0, 0), (0, 1), (1, 1)];

/// Velocity index pairs (a, b) of the packed 3D components (xx, xy, xz, yy, yz, zz)
pub const PAIRS_3D: [(usize, usize); 6] = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];

/// Positions of the diagonal components in the packed 2D layout
pub const DIAGONAL_2D: [usize; 2] = [0, 2];

/// Positions of the diagonal components in the packed 3D layout
pub const DIAGONAL_3D: [usize; 3] = [0, 3, 5];

/// Multiplicities of the packed 2D components in a full double contraction
pub const MULTIPLICITY_2D: [f64; 3] = [1.0, 2.0, 1.0];

/// Multiplicities of the packed 3D components in a full double contraction
pub const MULTIPLICITY_3D: [f64; 6] = [1.0, 2.0, 2.0, 1.0, 2.0, 1.0];

/// Defines the packed storage of symmetric rank-2 tensors
///
/// Only the independent components are stored, in the following fixed order:
///
/// ```text
/// 2D: (xx, xy, yy)
/// 3D: (xx, xy, xz, yy, yz, zz)
/// ```
///
/// Every tensor-valued field (Lij, Mij, Sij, ...) uses this order; hence, index `k`
/// refers to the same physical component everywhere.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TensorLayout {
    /// Three components (xx, xy, yy)
    TwoDim,

    /// Six components (xx, xy, xz, yy, yz, zz)
    ThreeDim,
}

impl TensorLayout {
    /// Returns the layout corresponding to the space dimension
    pub fn from_ndim(ndim: usize) -> Result<Self, StrError> {
        match ndim {
            2 => Ok(TensorLayout::TwoDim),
            3 => Ok(TensorLayout::ThreeDim),
            _ => Err("ndim must be 2 or 3"),
        }
    }

    /// Returns the space dimension
    pub fn ndim(&self) -> usize {
        match self {
            TensorLayout::TwoDim => 2,
            TensorLayout::ThreeDim => 3,
        }
    }

    /// Returns the number of packed components (tensdim)
    pub fn tensdim(&self) -> usize {
        match self {
            TensorLayout::TwoDim => 3,
            TensorLayout::ThreeDim => 6,
        }
    }

    /// Returns the velocity index pairs (a, b) of each packed component
    pub fn pairs(&self) -> &'static [(usize, usize)] {
        match self {
            TensorLayout::TwoDim => &PAIRS_2D,
            TensorLayout::ThreeDim => &PAIRS_3D,
        }
    }

    /// Returns the positions of the diagonal components
    pub fn diagonal(&self) -> &'static [usize] {
        match self {
            TensorLayout::TwoDim => &DIAGONAL_2D,
            TensorLayout::ThreeDim => &DIAGONAL_3D,
        }
    }

    /// Returns the multiplicity of each packed component in a double contraction
    ///
    /// Off-diagonal components appear twice in the full sum over (i, j).
    pub fn multiplicity(&self) -> &'static [f64] {
        match self {
            TensorLayout::TwoDim => &MULTIPLICITY_2D,
            TensorLayout::ThreeDim => &MULTIPLICITY_3D,
        }
    }

    /// Returns the packed index of the (i, j) component
    ///
    /// **Note:** i and j must be smaller than ndim.
    pub fn index(&self, i: usize, j: usize) -> usize {
        let (a, b) = if i <= j { (i, j) } else { (j, i) };
        let n = self.ndim();
        debug_assert!(b < n);
        a * n - (a * a - a) / 2 + (b - a)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::TensorLayout;

    #[test]
    fn from_ndim_works() {
        assert_eq!(TensorLayout::from_ndim(2), Ok(TensorLayout::TwoDim));
        assert_eq!(TensorLayout::from_ndim(3), Ok(TensorLayout::ThreeDim));
        assert_eq!(TensorLayout::from_ndim(1).err(), Some("ndim must be 2 or 3"));
    }

    #[test]
    fn layout_is_consistent() {
        for layout in [TensorLayout::TwoDim, TensorLayout::ThreeDim] {
            let n = layout.tensdim();
            assert_eq!(layout.pairs().len(), n);
            assert_eq!(layout.multiplicity().len(), n);
            assert_eq!(layout.diagonal().len(), layout.ndim());
            for k in 0..n {
                let (a, b) = layout.pairs()[k];
                let diagonal = layout.diagonal().contains(&k);
                assert_eq!(diagonal, a == b);
                assert_eq!(layout.multiplicity()[k], if diagonal { 1.0 } else { 2.0 });
                assert_eq!(layout.index(a, b), k);
                assert_eq!(layout.index(b, a), k);
            }
            // full sum over (i,j) has ndim² terms
            let total: f64 = layout.multiplicity().iter().sum();
            assert_eq!(total as usize, layout.ndim() * layout.ndim());
        }
    }

    #[test]
    fn index_works() {
        let layout = TensorLayout::ThreeDim;
        assert_eq!(layout.index(0, 0), 0);
        assert_eq!(layout.index(1, 0), 1);
        assert_eq!(layout.index(2, 0), 2);
        assert_eq!(layout.index(1, 1), 3);
        assert_eq!(layout.index(2, 1), 4);
        assert_eq!(layout.index(2, 2), 5);
        let layout = TensorLayout::TwoDim;
        assert_eq!(layout.index(1, 0), 1);
        assert_eq!(layout.index(1, 1), 2);
    }
}
