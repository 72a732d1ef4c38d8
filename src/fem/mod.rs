//! Implements the finite element services consumed by the turbulence models
//!
//! This is a compact field-algebra backend for simplicial meshes: function spaces (CG1, CG2, DG0),
//! matrix assembly, sparse operators, an iterative solver, Dirichlet conditions, interpolation
//! and a managed CG1 field recomputed from cellwise expressions.

mod assembly;
mod cg1_function;
mod dirichlet_bc;
mod field_ops;
mod function_space;
mod geometry;
mod interpolation;
mod krylov_solver;
mod sparse_operator;
pub use crate::fem::assembly::*;
pub use crate::fem::cg1_function::*;
pub use crate::fem::dirichlet_bc::*;
pub use crate::fem::field_ops::*;
pub use crate::fem::function_space::*;
pub use crate::fem::geometry::*;
pub use crate::fem::interpolation::*;
pub use crate::fem::krylov_solver::*;
pub use crate::fem::sparse_operator::*;
