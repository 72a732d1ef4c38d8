//! Implements the subgrid-scale models and their kernels
//!
//! The dynamic Lagrangian model is built from small kernels (filter, tensor algebra,
//! strain-rate reconstruction, Lij/Mij builders and the Lagrangian averager), each owning
//! only the data it needs. The WALE model is stateless apart from its eddy-viscosity field.

mod dynamic_lagrangian;
mod lagrangian_averager;
mod les_model;
mod scale_similarity;
mod strain_rate;
mod stress_tensors;
mod tensor_field;
mod top_hat_filter;
mod wale;
pub use crate::les::dynamic_lagrangian::*;
pub use crate::les::lagrangian_averager::*;
pub use crate::les::les_model::*;
pub use crate::les::strain_rate::*;
pub use crate::les::stress_tensors::*;
pub use crate::les::tensor_field::*;
pub use crate::les::top_hat_filter::*;
pub use crate::les::wale::*;
