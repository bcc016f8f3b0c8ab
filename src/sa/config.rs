//! Annealing control-loop configuration and cooling schedules.

use serde::{Deserialize, Serialize};

/// Cooling schedule for temperature reduction.
///
/// Every schedule is a pure function of the current temperature, so a
/// restored temperature continues the exact same sequence.
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed decrement per temperature level
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoolingSchedule {
    /// Geometric (exponential) cooling: `T_{k+1} = alpha * T_k`.
    ///
    /// Most widely used. AMOSA's reference setting is `alpha = 0.8`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// Linear cooling: `T_{k+1} = max(0, T_k - decrement)`.
    Linear {
        /// Amount subtracted at each temperature level. Must be positive.
        decrement: f64,
    },

    /// Lundy-Mees cooling: `T_{k+1} = T_k / (1 + beta * T_k)`.
    ///
    /// Cools fast at high T, slow at low T.
    ///
    /// Reference: Lundy & Mees (1986)
    LundyMees {
        /// Cooling parameter. Typically `(T_0 - T_min) / (steps * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.8 }
    }
}

impl CoolingSchedule {
    /// Temperature after one cooling step from `temperature`.
    pub fn next(&self, temperature: f64) -> f64 {
        match *self {
            // subnormals flush to zero so a stopping temperature of 0 is reached
            CoolingSchedule::Geometric { alpha } => {
                let next = temperature * alpha;
                if next.abs() < f64::MIN_POSITIVE {
                    0.0
                } else {
                    next
                }
            }
            CoolingSchedule::Linear { decrement } => (temperature - decrement).max(0.0),
            CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
        }
    }

    /// Validates the schedule parameters.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            CoolingSchedule::Geometric { alpha } => {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err(format!("geometric alpha must be in (0, 1), got {alpha}"));
                }
            }
            CoolingSchedule::Linear { decrement } => {
                if !(decrement > 0.0 && decrement.is_finite()) {
                    return Err(format!("linear decrement must be positive, got {decrement}"));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if !(beta > 0.0 && beta.is_finite()) {
                    return Err(format!("lundy-mees beta must be positive, got {beta}"));
                }
            }
        }
        Ok(())
    }
}

/// Configuration for the annealing control loop.
///
/// # Examples
///
/// ```
/// use u_amosa::sa::{SaConfig, CoolingSchedule};
///
/// let config = SaConfig::default()
///     .with_initial_temperature(100.0)
///     .with_stopping_temperature(0.001)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.95 })
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SaConfig {
    /// Temperature in effect after initialization.
    pub initial_temperature: f64,

    /// The run terminates once the temperature is at or below this value.
    pub stopping_temperature: f64,

    /// Cooling schedule applied after every temperature level.
    pub cooling: CoolingSchedule,

    /// Random seed for reproducibility. `None` draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 200.0,
            stopping_temperature: 1e-7,
            cooling: CoolingSchedule::default(),
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_stopping_temperature(mut self, t: f64) -> Self {
        self.stopping_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.initial_temperature.is_finite() {
            return Err("initial_temperature must be finite".into());
        }
        if !(self.stopping_temperature >= 0.0 && self.stopping_temperature.is_finite()) {
            return Err(format!(
                "stopping_temperature must be finite and >= 0, got {}",
                self.stopping_temperature
            ));
        }
        if let CoolingSchedule::LundyMees { .. } = self.cooling {
            if self.stopping_temperature <= 0.0 {
                return Err(
                    "lundy-mees cooling never reaches a stopping_temperature of 0".into(),
                );
            }
        }
        self.cooling.validate()
    }
}
