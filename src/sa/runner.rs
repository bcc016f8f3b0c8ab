//! Annealing control loop.
//!
//! [`Annealer`] is a small state machine:
//! `Uninitialized → Initialized → Terminated`.
//!
//! 1. The first [`step`](Annealer::step) initializes the engine and sets
//!    the initial temperature
//! 2. Every further step checks the termination conditions (temperature at
//!    or below the stopping temperature, or an external condition); if none
//!    holds it runs one temperature level on the engine and cools
//! 3. Once terminated, stepping again is an error

use std::io::{Read, Write};

use tracing::debug;

use super::checkpoint::Checkpoint;
use super::config::SaConfig;
use super::types::{AnnealingEngine, AnnealingStatus, Progress};
use crate::error::{AmosaError, Result};
use crate::random::{create_rng, AnnealRng, RngState};

type TerminationCondition = Box<dyn FnMut(&Progress) -> bool + Send>;

/// Drives an [`AnnealingEngine`] through temperature levels.
pub struct Annealer<E: AnnealingEngine> {
    pub(crate) engine: E,
    config: SaConfig,
    temperature: f64,
    status: AnnealingStatus,
    steps: usize,
    rng: AnnealRng,
    termination: Option<TerminationCondition>,
}

impl<E: AnnealingEngine> Annealer<E> {
    /// Creates a control loop around `engine`.
    ///
    /// # Errors
    ///
    /// [`AmosaError::InvalidConfig`] when `config` fails validation.
    pub fn new(engine: E, config: SaConfig) -> Result<Self> {
        config.validate().map_err(AmosaError::InvalidConfig)?;

        let rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };

        Ok(Self {
            engine,
            temperature: config.initial_temperature,
            config,
            status: AnnealingStatus::Uninitialized,
            steps: 0,
            rng,
            termination: None,
        })
    }

    /// Adds an external termination condition, checked once per step
    /// before the temperature level runs.
    pub fn with_termination<F>(mut self, condition: F) -> Self
    where
        F: FnMut(&Progress) -> bool + Send + 'static,
    {
        self.termination = Some(Box::new(condition));
        self
    }

    /// Advances the run by one transition.
    ///
    /// # Errors
    ///
    /// - [`AmosaError::Terminated`] if the run already terminated
    /// - any error raised by the engine; a failed initialization leaves the
    ///   run uninitialized
    pub fn step(&mut self) -> Result<()> {
        match self.status {
            AnnealingStatus::Uninitialized => {
                self.engine.initialize(&mut self.rng)?;
                self.temperature = self.config.initial_temperature;
                self.status = AnnealingStatus::Initialized;
                debug!(
                    temperature = self.temperature,
                    evaluations = self.engine.evaluations(),
                    "annealing initialized"
                );
                Ok(())
            }
            AnnealingStatus::Initialized => {
                if self.should_terminate() {
                    self.engine.terminate();
                    self.status = AnnealingStatus::Terminated;
                    debug!(
                        temperature = self.temperature,
                        steps = self.steps,
                        evaluations = self.engine.evaluations(),
                        "annealing terminated"
                    );
                    return Ok(());
                }

                self.engine.iterate(self.temperature, &mut self.rng)?;
                self.temperature = self.config.cooling.next(self.temperature);
                self.steps += 1;
                Ok(())
            }
            AnnealingStatus::Terminated => Err(AmosaError::Terminated),
        }
    }

    /// Steps until the run terminates.
    pub fn run(&mut self) -> Result<()> {
        while !self.is_terminated() {
            self.step()?;
        }
        Ok(())
    }

    fn should_terminate(&mut self) -> bool {
        if self.temperature <= self.config.stopping_temperature {
            return true;
        }
        let progress = self.progress();
        self.termination
            .as_mut()
            .is_some_and(|condition| condition(&progress))
    }

    pub fn progress(&self) -> Progress {
        Progress {
            temperature: self.temperature,
            steps: self.steps,
            evaluations: self.engine.evaluations(),
        }
    }

    pub fn status(&self) -> AnnealingStatus {
        self.status
    }

    pub fn is_initialized(&self) -> bool {
        self.status != AnnealingStatus::Uninitialized
    }

    pub fn is_terminated(&self) -> bool {
        self.status == AnnealingStatus::Terminated
    }

    /// Whether the run terminated above the stopping temperature, i.e.
    /// because an external condition fired.
    pub fn stopped_early(&self) -> bool {
        self.is_terminated() && self.temperature > self.config.stopping_temperature
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Temperature levels completed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn current(&self) -> Option<&E::Point> {
        self.engine.current()
    }

    /// The engine's published result.
    pub fn result(&self) -> Vec<E::Point> {
        self.engine.result()
    }

    /// Captures the run between two steps.
    ///
    /// # Errors
    ///
    /// [`AmosaError::NotInitialized`] before the first step.
    pub fn checkpoint(&self) -> Result<Checkpoint<E::State>> {
        if self.status == AnnealingStatus::Uninitialized {
            return Err(AmosaError::NotInitialized);
        }
        Ok(Checkpoint {
            status: self.status,
            temperature: self.temperature,
            steps: self.steps,
            rng: RngState::capture(&self.rng),
            engine: self.engine.save_state()?,
        })
    }

    /// Resumes from a checkpoint.
    ///
    /// On error nothing changes; the run keeps its pre-call state.
    pub fn restore(&mut self, checkpoint: Checkpoint<E::State>) -> Result<()> {
        if checkpoint.status == AnnealingStatus::Uninitialized {
            return Err(AmosaError::Checkpoint(
                "checkpoint does not describe an initialized run".into(),
            ));
        }
        if !checkpoint.temperature.is_finite() {
            return Err(AmosaError::Checkpoint(format!(
                "temperature must be finite, got {}",
                checkpoint.temperature
            )));
        }

        self.engine.restore_state(checkpoint.engine)?;
        self.status = checkpoint.status;
        self.temperature = checkpoint.temperature;
        self.steps = checkpoint.steps;
        self.rng = checkpoint.rng.restore();
        debug!(
            temperature = self.temperature,
            steps = self.steps,
            "annealing restored from checkpoint"
        );
        Ok(())
    }

    /// Writes [`checkpoint`](Self::checkpoint) as JSON.
    pub fn write_checkpoint<W: Write>(&self, writer: W) -> Result<()> {
        self.checkpoint()?.write_to(writer)
    }

    /// Reads a JSON checkpoint and [`restore`](Self::restore)s it.
    pub fn read_checkpoint<R: Read>(&mut self, reader: R) -> Result<()> {
        let checkpoint = Checkpoint::read_from(reader)?;
        self.restore(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::CoolingSchedule;
    use rand::Rng;
    use serde::{Deserialize, Serialize};

    // ---- Random walk on a line: the scaffold's default singleton result ----

    #[derive(Default)]
    struct Walk {
        position: Option<f64>,
        evaluations: usize,
        levels: Vec<f64>,
        terminated: bool,
    }

    #[derive(Serialize, Deserialize)]
    struct WalkState {
        position: f64,
        evaluations: usize,
    }

    impl AnnealingEngine for Walk {
        type Point = f64;
        type State = WalkState;

        fn initialize(&mut self, rng: &mut AnnealRng) -> Result<()> {
            self.position = Some(rng.random_range(-1.0..1.0));
            self.evaluations += 1;
            Ok(())
        }

        fn iterate(&mut self, temperature: f64, rng: &mut AnnealRng) -> Result<()> {
            self.levels.push(temperature);
            if let Some(p) = self.position.as_mut() {
                *p += rng.random_range(-1.0..1.0);
            }
            self.evaluations += 1;
            Ok(())
        }

        fn terminate(&mut self) {
            self.terminated = true;
        }

        fn current(&self) -> Option<&f64> {
            self.position.as_ref()
        }

        fn evaluations(&self) -> usize {
            self.evaluations
        }

        fn save_state(&self) -> Result<WalkState> {
            let position = self.position.ok_or(AmosaError::NotInitialized)?;
            Ok(WalkState {
                position,
                evaluations: self.evaluations,
            })
        }

        fn restore_state(&mut self, state: WalkState) -> Result<()> {
            if !state.position.is_finite() {
                return Err(AmosaError::Checkpoint("position must be finite".into()));
            }
            self.position = Some(state.position);
            self.evaluations = state.evaluations;
            Ok(())
        }
    }

    fn config() -> SaConfig {
        SaConfig::default()
            .with_initial_temperature(200.0)
            .with_stopping_temperature(1.0)
            .with_cooling(CoolingSchedule::Geometric { alpha: 0.8 })
            .with_seed(42)
    }

    #[test]
    fn test_lifecycle() {
        let mut annealer = Annealer::new(Walk::default(), config()).unwrap();
        assert_eq!(annealer.status(), AnnealingStatus::Uninitialized);
        assert!(annealer.current().is_none());

        annealer.step().unwrap();
        assert_eq!(annealer.status(), AnnealingStatus::Initialized);
        assert_eq!(annealer.temperature(), 200.0);

        annealer.run().unwrap();
        assert!(annealer.is_terminated());
        assert!(annealer.engine().terminated);
        assert!(annealer.temperature() <= 1.0);
        assert!(!annealer.stopped_early());
    }

    #[test]
    fn test_step_after_termination_fails() {
        let mut annealer = Annealer::new(Walk::default(), config()).unwrap();
        annealer.run().unwrap();
        assert!(matches!(annealer.step(), Err(AmosaError::Terminated)));
    }

    #[test]
    fn test_temperature_levels_follow_schedule() {
        let mut annealer = Annealer::new(Walk::default(), config()).unwrap();
        for _ in 0..4 {
            annealer.step().unwrap();
        }
        // init + 3 levels
        assert_eq!(annealer.steps(), 3);
        assert!((annealer.temperature() - 102.4).abs() < 1e-9);
        assert_eq!(annealer.engine().levels, vec![200.0, 200.0 * 0.8, 200.0 * 0.8 * 0.8]);
    }

    #[test]
    fn test_result_is_singleton_current() {
        let mut annealer = Annealer::new(Walk::default(), config()).unwrap();
        assert!(annealer.result().is_empty());
        annealer.run().unwrap();
        let result = annealer.result();
        assert_eq!(result.len(), 1);
        assert_eq!(Some(&result[0]), annealer.current());
    }

    #[test]
    fn test_stops_at_or_below_stopping_temperature() {
        // 200 * 0.5^3 = 25 exactly, the stopping temperature
        let config = config()
            .with_cooling(CoolingSchedule::Geometric { alpha: 0.5 })
            .with_stopping_temperature(25.0);
        let mut annealer = Annealer::new(Walk::default(), config).unwrap();
        annealer.run().unwrap();
        assert_eq!(annealer.steps(), 3);
        assert_eq!(annealer.temperature(), 25.0);
    }

    #[test]
    fn test_external_termination() {
        let mut annealer = Annealer::new(Walk::default(), config())
            .unwrap()
            .with_termination(|progress| progress.steps >= 2);
        annealer.run().unwrap();
        assert_eq!(annealer.steps(), 2);
        assert!(annealer.stopped_early());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = config().with_cooling(CoolingSchedule::Geometric { alpha: 1.0 });
        let result = Annealer::new(Walk::default(), bad);
        assert!(matches!(result, Err(AmosaError::InvalidConfig(_))));
    }

    #[test]
    fn test_checkpoint_before_initialization_fails() {
        let annealer = Annealer::new(Walk::default(), config()).unwrap();
        assert!(matches!(annealer.checkpoint(), Err(AmosaError::NotInitialized)));
    }

    #[test]
    fn test_checkpoint_resume_matches_uninterrupted_run() {
        let mut uninterrupted = Annealer::new(Walk::default(), config()).unwrap();
        uninterrupted.run().unwrap();

        let mut first = Annealer::new(Walk::default(), config()).unwrap();
        for _ in 0..5 {
            first.step().unwrap();
        }
        let mut buf = Vec::new();
        first.write_checkpoint(&mut buf).unwrap();

        // a different seed proves the stream comes from the checkpoint
        let mut resumed = Annealer::new(Walk::default(), config().with_seed(9)).unwrap();
        resumed.read_checkpoint(buf.as_slice()).unwrap();
        resumed.run().unwrap();

        assert_eq!(resumed.steps(), uninterrupted.steps());
        assert_eq!(
            resumed.current().map(|p| p.to_bits()),
            uninterrupted.current().map(|p| p.to_bits())
        );
        assert_eq!(resumed.temperature().to_bits(), uninterrupted.temperature().to_bits());
    }

    #[test]
    fn test_failed_restore_keeps_state() {
        let mut annealer = Annealer::new(Walk::default(), config()).unwrap();
        annealer.step().unwrap();
        annealer.step().unwrap();
        let before = annealer.checkpoint().unwrap();

        let mut bad = annealer.checkpoint().unwrap();
        bad.temperature = 1.0;
        bad.engine.position = f64::INFINITY;
        assert!(annealer.restore(bad).is_err());

        let after = annealer.checkpoint().unwrap();
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.rng, before.rng);
        assert_eq!(after.engine.position, before.engine.position);

        assert!(annealer.read_checkpoint(&b"not json"[..]).is_err());
        assert_eq!(annealer.temperature(), before.temperature);
    }
}
