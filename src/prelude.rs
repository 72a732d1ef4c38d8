//! Makes available common structures needed to attach a turbulence model to a flow solver
//!
//! You may write `use lesfem::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Config, LesKind, NutMethod, ParamDynamicSmagorinsky, ParamKrylov, ParamWale, SampleMeshes};
pub use crate::fem::{BcValue, DirichletBc, FunctionSpace, MeshGeometry, SpaceKind};
pub use crate::les::{les_setup, DynamicLagrangian, LesInput, LesModel, NoModel, Velocity, Wale};
