//! Subgrid-scale turbulence models for finite element flow solvers
//!
//! Two eddy-viscosity closures are available:
//!
//! * the dynamic Smagorinsky model with Lagrangian averaging of the Germano identity terms
//! * the WALE (wall-adapting local eddy-viscosity) model
//!
//! Both follow the same plug-in contract ([les::LesModel]): set up once from the host mesh,
//! velocity space and boundary conditions, then update once per time step, leaving the
//! eddy viscosity available as a nodal CG1 field.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod fem;
pub mod les;
pub mod prelude;
