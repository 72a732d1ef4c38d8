/// Upper bound of the dynamic coefficient Cs² = JLM / JMM
pub const CS2_MAX: f64 = 0.1;

/// Lower bound of the Lagrangian average JLM
///
/// Keeps the coefficient ratio away from zero and negative values.
pub const JLM_MIN: f64 = 1e-32;

/// Default ratio between the test-filter and the grid-filter widths
pub const DEFAULT_ALPHA: f64 = 2.5;

/// Weight of the (coarser) grid filter used by the mixed models
pub const GRID_FILTER_WEIGHT: f64 = 0.75;

/// Scales the filter width in the Lagrangian relaxation time
///
/// ```text
/// T = 1.5 Δ (JLM JMM)^(-1/8)
/// ```
pub const RELAXATION_TIME_FACTOR: f64 = 1.5;

/// Default Smagorinsky constant used to seed the Lagrangian averages
pub const DEFAULT_CS: f64 = 0.1677;

/// Default WALE constant
pub const DEFAULT_CW: f64 = 0.325;

/// Defines the directory where the result files of the demo runner are saved
pub const DEFAULT_OUT_DIR: &str = "/tmp/lesfem/results";
