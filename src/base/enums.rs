use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Defines the available subgrid-scale models
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum LesKind {
    /// No subgrid-scale model (the eddy viscosity stays zero)
    NoModel,

    /// Dynamic Smagorinsky model with Lagrangian averaging
    DynamicLagrangian,

    /// Wall-adapting local eddy-viscosity model
    Wale,
}

/// Defines how a cellwise expression is mapped onto the nodal CG1 field
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum NutMethod {
    /// Volume-weighted average of the cell values sharing each node
    WeightedAverage,

    /// L2 projection using the CG1 mass matrix (solved iteratively)
    L2Projection,
}

impl FromStr for LesKind {
    type Err = StrError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "nomodel" => Ok(LesKind::NoModel),
            "dynamic" | "dynamiclagrangian" => Ok(LesKind::DynamicLagrangian),
            "wale" => Ok(LesKind::Wale),
            _ => Err("unknown LES model; use none, dynamic or wale"),
        }
    }
}

impl fmt::Display for LesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LesKind::NoModel => write!(f, "NoModel"),
            LesKind::DynamicLagrangian => write!(f, "DynamicLagrangian"),
            LesKind::Wale => write!(f, "Wale"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
