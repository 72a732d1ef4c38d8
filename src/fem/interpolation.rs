use super::{simplex_kind, FunctionSpace, SpaceKind};
use crate::StrError;
use russell_lab::{vec_copy, Vector};

/// Interpolates a field from one space onto another space of the same mesh
///
/// Supported pairs:
///
/// * identical spaces (copy)
/// * CG2 → CG1 (values at the corner points)
/// * CG1 → CG2 (corner values and mid-edge averages; exact for the piecewise-linear source)
pub fn interpolate(
    target: &mut Vector,
    target_space: &FunctionSpace,
    source: &Vector,
    source_space: &FunctionSpace,
) -> Result<(), StrError> {
    if target.dim() != target_space.ndof || source.dim() != source_space.ndof {
        return Err("vectors are incompatible with the function spaces");
    }
    if target_space.ncell() != source_space.ncell() {
        return Err("function spaces must be defined on the same mesh");
    }
    if target_space.same_as(source_space) {
        return vec_copy(target, source);
    }
    let ncorner = target_space.ndim + 1;
    match (source_space.kind, target_space.kind) {
        (SpaceKind::Cg2, SpaceKind::Cg1) => {
            for (target_dofs, source_dofs) in target_space.cell_dofs.iter().zip(&source_space.cell_dofs) {
                for m in 0..ncorner {
                    target[target_dofs[m]] = source[source_dofs[m]];
                }
            }
        }
        (SpaceKind::Cg1, SpaceKind::Cg2) => {
            let kind = simplex_kind(target_space.ndim, 2);
            for (target_dofs, source_dofs) in target_space.cell_dofs.iter().zip(&source_space.cell_dofs) {
                for m in 0..ncorner {
                    target[target_dofs[m]] = source[source_dofs[m]];
                }
                for e in 0..kind.nedge() {
                    let (a, b, mid) = (kind.edge_node_id(e, 0), kind.edge_node_id(e, 1), kind.edge_node_id(e, 2));
                    target[target_dofs[mid]] = 0.5 * (source[source_dofs[a]] + source[source_dofs[b]]);
                }
            }
        }
        _ => return Err("interpolation between these function spaces is not available"),
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
