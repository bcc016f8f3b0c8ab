//! AMOSA configuration.

use crate::sa::{CoolingSchedule, SaConfig};

/// Configuration for the AMOSA algorithm.
///
/// # Defaults
///
/// The reference settings of Bandyopadhyay et al. (2008):
///
/// ```
/// use u_amosa::amosa::AmosaConfig;
///
/// let config = AmosaConfig::default();
/// assert_eq!(config.soft_limit, 100);
/// assert_eq!(config.hard_limit, 10);
/// assert_eq!(config.iterations_per_temperature, 500);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_amosa::amosa::AmosaConfig;
///
/// let config = AmosaConfig::default()
///     .with_limits(20, 10)
///     .with_alpha(0.9)
///     .with_iterations_per_temperature(100)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AmosaConfig {
    /// Oversampling factor: `gamma * soft_limit` random solutions seed the
    /// archive. Must be `>= 1`, typically 2.
    pub gamma: f64,

    /// Archive size that triggers clustering.
    pub soft_limit: usize,

    /// Archive size after clustering and at termination.
    pub hard_limit: usize,

    /// Temperature after initialization.
    pub initial_temperature: f64,

    /// The run terminates once the temperature is at or below this value.
    pub stopping_temperature: f64,

    /// Cooling schedule. AMOSA uses geometric cooling.
    pub cooling: CoolingSchedule,

    /// Moves performed at each temperature level.
    pub iterations_per_temperature: usize,

    /// Hill-climbing rounds applied to each initial solution.
    pub hill_climb_iterations: usize,

    /// Whether to evaluate the initial solutions in parallel.
    ///
    /// Only effective with the `parallel` feature. Moves are always
    /// sequential.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for AmosaConfig {
    fn default() -> Self {
        Self {
            gamma: 2.0,
            soft_limit: 100,
            hard_limit: 10,
            initial_temperature: 200.0,
            stopping_temperature: 1e-7,
            cooling: CoolingSchedule::Geometric { alpha: 0.8 },
            iterations_per_temperature: 500,
            hill_climb_iterations: 20,
            parallel: false,
            seed: None,
        }
    }
}

impl AmosaConfig {
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the soft and hard archive limits.
    pub fn with_limits(mut self, soft_limit: usize, hard_limit: usize) -> Self {
        self.soft_limit = soft_limit;
        self.hard_limit = hard_limit;
        self
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_stopping_temperature(mut self, t: f64) -> Self {
        self.stopping_temperature = t;
        self
    }

    /// Uses geometric cooling with rate `alpha`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.cooling = CoolingSchedule::Geometric { alpha };
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_iterations_per_temperature(mut self, n: usize) -> Self {
        self.iterations_per_temperature = n;
        self
    }

    pub fn with_hill_climb_iterations(mut self, n: usize) -> Self {
        self.hill_climb_iterations = n;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of random solutions drawn at initialization.
    pub fn initial_size(&self) -> usize {
        (self.gamma * self.soft_limit as f64) as usize
    }

    /// The control-loop part of this configuration.
    pub fn annealing(&self) -> SaConfig {
        SaConfig {
            initial_temperature: self.initial_temperature,
            stopping_temperature: self.stopping_temperature,
            cooling: self.cooling,
            seed: self.seed,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.gamma >= 1.0 && self.gamma.is_finite()) {
            return Err(format!("gamma must be >= 1, got {}", self.gamma));
        }
        if self.soft_limit == 0 {
            return Err("soft_limit must be positive".into());
        }
        if self.hard_limit == 0 {
            return Err("hard_limit must be positive".into());
        }
        if self.hard_limit > self.soft_limit {
            return Err(format!(
                "hard_limit ({}) must not exceed soft_limit ({})",
                self.hard_limit, self.soft_limit
            ));
        }
        if self.iterations_per_temperature == 0 {
            return Err("iterations_per_temperature must be positive".into());
        }
        self.annealing().validate()
    }
}
