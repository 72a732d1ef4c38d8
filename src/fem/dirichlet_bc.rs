use super::FunctionSpace;
use crate::StrError;
use russell_lab::Vector;
use std::fmt;

/// Defines a function of the coordinates returning true for the DOFs of a constrained region
pub type SubDomain = fn(&[f64]) -> bool;

/// Defines the prescribed value of a Dirichlet boundary condition
#[derive(Clone, Copy)]
pub enum BcValue {
    /// Same value at all constrained DOFs
    Constant(f64),

    /// Value given as a function of the coordinates
    Space(fn(&[f64]) -> f64),
}

impl BcValue {
    /// Evaluates the value at a point
    pub fn eval(&self, x: &[f64]) -> f64 {
        match self {
            BcValue::Constant(value) => *value,
            BcValue::Space(f) => f(x),
        }
    }

    /// Returns true if the value is the constant zero
    pub fn is_homogeneous(&self) -> bool {
        match self {
            BcValue::Constant(value) => *value == 0.0,
            BcValue::Space(_) => false,
        }
    }
}

impl fmt::Debug for BcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcValue::Constant(value) => write!(f, "Constant({})", value),
            BcValue::Space(_) => write!(f, "Space(fn)"),
        }
    }
}

/// Holds a Dirichlet boundary condition attached to the DOFs of a function space
#[derive(Clone)]
pub struct DirichletBc {
    /// Prescribed value
    value: BcValue,

    /// Region selecting the constrained DOFs
    sub_domain: SubDomain,

    /// Constrained DOFs
    dofs: Vec<usize>,

    /// Values at the constrained DOFs
    values: Vec<f64>,

    /// Number of DOFs of the space
    ndof: usize,
}

impl DirichletBc {
    /// Allocates a new instance
    ///
    /// The constrained DOFs are those whose coordinates satisfy `sub_domain`.
    /// Only CG spaces are accepted.
    pub fn new(space: &FunctionSpace, value: BcValue, sub_domain: SubDomain) -> Result<Self, StrError> {
        if space.degree() == 0 {
            return Err("Dirichlet conditions require a CG space");
        }
        let mut dofs = Vec::new();
        let mut values = Vec::new();
        for (dof, x) in space.dof_coords.iter().enumerate() {
            if sub_domain(x) {
                dofs.push(dof);
                values.push(value.eval(x));
            }
        }
        Ok(DirichletBc {
            value,
            sub_domain,
            dofs,
            values,
            ndof: space.ndof,
        })
    }

    /// Returns the prescribed value
    pub fn value(&self) -> BcValue {
        self.value
    }

    /// Returns the region selecting the constrained DOFs
    pub fn user_sub_domain(&self) -> SubDomain {
        self.sub_domain
    }

    /// Returns the constrained DOFs
    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    /// Returns true if the prescribed value is zero (e.g., no-slip walls)
    pub fn is_homogeneous(&self) -> bool {
        self.value.is_homogeneous()
    }

    /// Sets the prescribed values into a field
    pub fn apply(&self, field: &mut Vector) -> Result<(), StrError> {
        if field.dim() != self.ndof {
            return Err("the field is incompatible with the Dirichlet condition");
        }
        for (dof, value) in self.dofs.iter().zip(&self.values) {
            field[*dof] = *value;
        }
        Ok(())
    }

    /// Returns a copy of this condition attached to another space
    pub fn rebuild_on(&self, space: &FunctionSpace) -> Result<Self, StrError> {
        DirichletBc::new(space, self.value, self.sub_domain)
    }
}

impl fmt::Debug for DirichletBc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirichletBc {{ value: {:?}, ndof_constrained: {} }}", self.value, self.dofs.len())
    }
}

/// Returns the eddy-viscosity conditions derived from the velocity conditions
///
/// The eddy viscosity vanishes where the velocity has a homogeneous (no-slip) condition.
/// Inflow and other non-homogeneous velocity conditions leave the eddy viscosity free.
pub fn derived_bcs(space: &FunctionSpace, velocity_bcs: &[DirichletBc]) -> Result<Vec<DirichletBc>, StrError> {
    let mut bcs = Vec::new();
    for bc in velocity_bcs {
        if bc.is_homogeneous() {
            bcs.push(DirichletBc::new(space, BcValue::Constant(0.0), bc.user_sub_domain())?);
        }
    }
    Ok(bcs)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
