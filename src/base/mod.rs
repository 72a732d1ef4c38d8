//! Implements the base structures shared by the turbulence models

mod config;
mod constants;
mod enums;
mod run_summary;
mod sample_meshes;
mod tensor_layout;
mod testing;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::enums::*;
pub use crate::base::run_summary::*;
pub use crate::base::sample_meshes::*;
pub use crate::base::tensor_layout::*;

#[allow(unused_imports)]
pub(crate) use crate::base::testing::*;
