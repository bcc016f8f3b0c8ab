//! Deterministic random source shared by the control loop and the engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The random stream type used for every stochastic decision in a run.
pub type AnnealRng = ChaCha8Rng;

/// Creates a seeded random stream.
pub fn create_rng(seed: u64) -> AnnealRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Exact position of an [`AnnealRng`] stream.
///
/// Restoring a snapshot yields a generator that produces the same draws
/// the captured one would have produced next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: [u8; 32],
    pub stream: u64,
    pub word_pos: u128,
}

impl RngState {
    pub fn capture(rng: &AnnealRng) -> Self {
        Self {
            seed: rng.get_seed(),
            stream: rng.get_stream(),
            word_pos: rng.get_word_pos(),
        }
    }

    pub fn restore(&self) -> AnnealRng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos(self.word_pos);
        rng
    }
}
