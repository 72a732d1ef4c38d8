use super::{NutMethod, DEFAULT_ALPHA, DEFAULT_CS, DEFAULT_CW};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Holds parameters for the dynamic Smagorinsky model with Lagrangian averaging
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ParamDynamicSmagorinsky {
    /// Smagorinsky constant used to seed the Lagrangian averages at the first computation
    pub cs: f64,

    /// Number of time steps between two computations of the dynamic coefficient
    pub cs_comp_step: usize,

    /// Initial value of the JLM average
    pub jlm_init: f64,

    /// Initial value of the JMM average
    pub jmm_init: f64,

    /// Ratio between the test-filter and the grid-filter widths
    pub alpha: f64,
}

/// Holds parameters for the WALE model
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ParamWale {
    /// WALE constant Cw
    pub cw: f64,
}

/// Holds parameters for the iterative (conjugate gradient) solver
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ParamKrylov {
    /// Relative tolerance on the residual norm (relative to the norm of the right-hand side)
    pub tol_rel: f64,

    /// Absolute tolerance on the residual norm
    pub tol_abs: f64,

    /// Maximum number of iterations
    pub n_max_iterations: usize,
}

/// Holds configuration data for the turbulence models
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Parameters of the dynamic Lagrangian model
    pub dynamic_smagorinsky: ParamDynamicSmagorinsky,

    /// Parameters of the WALE model
    pub wale: ParamWale,

    /// Mapping of the eddy-viscosity expression onto the CG1 space
    pub nut_method: NutMethod,

    /// Solver used to reconstruct the rate-of-strain components
    pub strain_solver: ParamKrylov,

    /// Solver used by the L2 projections (delta field and eddy viscosity)
    pub nut_solver: ParamKrylov,
}

impl ParamDynamicSmagorinsky {
    /// Returns the default parameters
    pub fn sample() -> Self {
        ParamDynamicSmagorinsky {
            cs: DEFAULT_CS,
            cs_comp_step: 1,
            jlm_init: 0.0,
            jmm_init: 1.0,
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.cs < 0.0 {
            return Err("cs must be ≥ 0.0");
        }
        if self.cs_comp_step < 1 {
            return Err("cs_comp_step must be ≥ 1");
        }
        if self.jmm_init < 0.0 {
            return Err("jmm_init must be ≥ 0.0");
        }
        if self.alpha <= 0.0 {
            return Err("alpha must be > 0.0");
        }
        Ok(())
    }
}

impl Default for ParamDynamicSmagorinsky {
    fn default() -> Self {
        ParamDynamicSmagorinsky::sample()
    }
}

impl ParamWale {
    /// Returns the default parameters
    pub fn sample() -> Self {
        ParamWale { cw: DEFAULT_CW }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if !self.cw.is_finite() || self.cw < 0.0 {
            return Err("cw must be ≥ 0.0");
        }
        Ok(())
    }
}

impl Default for ParamWale {
    fn default() -> Self {
        ParamWale::sample()
    }
}

impl ParamKrylov {
    /// Returns the default parameters
    pub fn sample() -> Self {
        ParamKrylov {
            tol_rel: 1e-10,
            tol_abs: 1e-30,
            n_max_iterations: 500,
        }
    }

    /// Checks the parameters
    pub fn validate(&self) -> Result<(), StrError> {
        if self.tol_rel <= 0.0 && self.tol_abs <= 0.0 {
            return Err("at least one Krylov tolerance must be > 0.0");
        }
        if self.n_max_iterations < 1 {
            return Err("n_max_iterations must be ≥ 1");
        }
        Ok(())
    }
}

impl Default for ParamKrylov {
    fn default() -> Self {
        ParamKrylov::sample()
    }
}

impl Config {
    /// Allocates a new instance with default parameters
    pub fn new() -> Self {
        Config {
            dynamic_smagorinsky: ParamDynamicSmagorinsky::sample(),
            wale: ParamWale::sample(),
            nut_method: NutMethod::WeightedAverage,
            strain_solver: ParamKrylov::sample(),
            nut_solver: ParamKrylov::sample(),
        }
    }

    /// Parses a JSON string; missing keys take their default values
    pub fn from_json(text: &str) -> Result<Self, StrError> {
        let config: Config = serde_json::from_str(text).map_err(|_| "cannot parse JSON configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON file
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<Path> + ?Sized,
    {
        let text = fs::read_to_string(full_path).map_err(|_| "cannot read JSON configuration file")?;
        Config::from_json(&text)
    }

    /// Checks all parameters
    pub fn validate(&self) -> Result<(), StrError> {
        self.dynamic_smagorinsky.validate()?;
        self.wale.validate()?;
        self.strain_solver.validate()?;
        self.nut_solver.validate()
    }

    /// Sets the parameters of the dynamic Lagrangian model
    pub fn set_dynamic_smagorinsky(&mut self, param: ParamDynamicSmagorinsky) -> Result<&mut Self, StrError> {
        param.validate()?;
        self.dynamic_smagorinsky = param;
        Ok(self)
    }

    /// Sets the number of time steps between two computations of the dynamic coefficient
    pub fn set_cs_comp_step(&mut self, value: usize) -> Result<&mut Self, StrError> {
        if value < 1 {
            return Err("cs_comp_step must be ≥ 1");
        }
        self.dynamic_smagorinsky.cs_comp_step = value;
        Ok(self)
    }

    /// Sets the WALE constant
    pub fn set_cw(&mut self, value: f64) -> Result<&mut Self, StrError> {
        let param = ParamWale { cw: value };
        param.validate()?;
        self.wale = param;
        Ok(self)
    }

    /// Sets the method used to compute the nodal eddy viscosity
    pub fn set_nut_method(&mut self, method: NutMethod) -> Result<&mut Self, StrError> {
        self.nut_method = method;
        Ok(self)
    }

    /// Sets the parameters of the rate-of-strain solver
    pub fn set_strain_solver(&mut self, param: ParamKrylov) -> Result<&mut Self, StrError> {
        param.validate()?;
        self.strain_solver = param;
        Ok(self)
    }

    /// Sets the parameters of the projection solver
    pub fn set_nut_solver(&mut self, param: ParamKrylov) -> Result<&mut Self, StrError> {
        param.validate()?;
        self.nut_solver = param;
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration data\n").unwrap();
        write!(f, "==================\n").unwrap();
        write!(f, "dynamic_smagorinsky = {:?}\n", self.dynamic_smagorinsky).unwrap();
        write!(f, "wale = {:?}\n", self.wale).unwrap();
        write!(f, "nut_method = {:?}\n", self.nut_method).unwrap();
        write!(f, "strain_solver = {:?}\n", self.strain_solver).unwrap();
        write!(f, "nut_solver = {:?}\n", self.nut_solver).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Config, ParamDynamicSmagorinsky, ParamKrylov, ParamWale};
    use crate::base::{NutMethod, DEFAULT_ALPHA, DEFAULT_CS, DEFAULT_CW};
    use crate::StrError;

    #[test]
    fn new_works() {
        let config = Config::new();
        assert_eq!(config.dynamic_smagorinsky.cs, DEFAULT_CS);
        assert_eq!(config.dynamic_smagorinsky.cs_comp_step, 1);
        assert_eq!(config.dynamic_smagorinsky.alpha, DEFAULT_ALPHA);
        assert_eq!(config.nut_method, NutMethod::WeightedAverage);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn setters_work() -> Result<(), StrError> {
        let mut config = Config::new();
        config
            .set_cs_comp_step(5)?
            .set_cw(0.5)?
            .set_nut_method(NutMethod::L2Projection)?
            .set_strain_solver(ParamKrylov {
                tol_rel: 1e-8,
                tol_abs: 0.0,
                n_max_iterations: 10,
            })?;
        assert_eq!(config.dynamic_smagorinsky.cs_comp_step, 5);
        assert_eq!(config.wale.cw, 0.5);
        assert_eq!(config.nut_method, NutMethod::L2Projection);
        assert_eq!(config.strain_solver.n_max_iterations, 10);
        Ok(())
    }

    #[test]
    fn setters_capture_errors() {
        let mut config = Config::new();
        assert_eq!(config.set_cs_comp_step(0).err(), Some("cs_comp_step must be ≥ 1"));
        assert_eq!(config.set_cw(-1.0).err(), Some("cw must be ≥ 0.0"));
        assert_eq!(config.set_cw(f64::NAN).err(), Some("cw must be ≥ 0.0"));
        assert_eq!(config.wale.cw, DEFAULT_CW);
        let mut param = ParamDynamicSmagorinsky::sample();
        param.alpha = 0.0;
        assert_eq!(config.set_dynamic_smagorinsky(param).err(), Some("alpha must be > 0.0"));
        param.alpha = 2.0;
        param.jmm_init = -1.0;
        assert_eq!(config.set_dynamic_smagorinsky(param).err(), Some("jmm_init must be ≥ 0.0"));
        let krylov = ParamKrylov {
            tol_rel: 0.0,
            tol_abs: 0.0,
            n_max_iterations: 10,
        };
        assert_eq!(
            config.set_nut_solver(krylov).err(),
            Some("at least one Krylov tolerance must be > 0.0")
        );
    }

    #[test]
    fn wale_validate_captures_errors() {
        assert_eq!(ParamWale::sample().validate(), Ok(()));
        assert_eq!(ParamWale { cw: 0.0 }.validate(), Ok(()));
        for cw in [-0.1, f64::NAN, f64::INFINITY] {
            assert_eq!(ParamWale { cw }.validate().err(), Some("cw must be ≥ 0.0"));
            let mut config = Config::new();
            config.wale.cw = cw;
            assert_eq!(config.validate().err(), Some("cw must be ≥ 0.0"));
        }
    }

    #[test]
    fn from_json_works() {
        let text = r#"{
            "dynamic_smagorinsky": { "cs": 0.2, "cs_comp_step": 3 },
            "wale": { "cw": 0.5 },
            "nut_method": "L2Projection"
        }"#;
        let config = Config::from_json(text).unwrap();
        assert_eq!(config.dynamic_smagorinsky.cs, 0.2);
        assert_eq!(config.dynamic_smagorinsky.cs_comp_step, 3);
        assert_eq!(config.dynamic_smagorinsky.jmm_init, 1.0);
        assert_eq!(config.dynamic_smagorinsky.alpha, DEFAULT_ALPHA);
        assert_eq!(config.wale.cw, 0.5);
        assert_eq!(config.nut_method, NutMethod::L2Projection);
        assert_eq!(config.strain_solver.n_max_iterations, 500);
    }

    #[test]
    fn from_json_captures_errors() {
        assert_eq!(
            Config::from_json("{ not json").err(),
            Some("cannot parse JSON configuration")
        );
        assert_eq!(
            Config::from_json(r#"{ "dynamic_smagorinsky": { "cs_comp_step": 0 } }"#).err(),
            Some("cs_comp_step must be ≥ 1")
        );
        assert_eq!(
            Config::read_json("/tmp/lesfem/__does_not_exist__.json").err(),
            Some("cannot read JSON configuration file")
        );
    }

    #[test]
    fn display_works() {
        let config = Config::new();
        let text = format!("{}", config);
        assert!(text.starts_with("Configuration data\n==================\n"));
        assert!(text.contains("nut_method = WeightedAverage\n"));
    }
}
