//! Seeded prompt generator.

use crate::strategies::generate_batch;
use loadtest_core::{RandomSource, Strategy};

/// Question generator that produces deterministic prompt batches.
///
/// Every call to [`generate`](Self::generate) advances the internal stream,
/// so a sequence of calls yields a sequence of different batches. Two
/// generators built from the same seed yield the same sequence.
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    /// Seed the generator was created with
    seed: u64,
    /// Seeded random source for parameter draws
    rng: RandomSource,
}

impl QuestionGenerator {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: RandomSource::new(seed),
        }
    }

    /// Seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Produce a batch of prompts for `strategy`.
    pub fn generate(&mut self, strategy: Strategy) -> Vec<String> {
        generate_batch(strategy, &mut self.rng)
    }

    /// Prompt at `index` of a fresh batch.
    ///
    /// An out-of-range index is not an error: a random prompt from the same
    /// batch is returned instead.
    pub fn question(&mut self, strategy: Strategy, index: usize) -> String {
        let mut batch = self.generate(strategy);
        let idx = if index < batch.len() {
            index
        } else {
            self.rng.int_range(batch.len())
        };
        batch.swap_remove(idx)
    }

    /// A random prompt from a fresh batch.
    pub fn random_question(&mut self, strategy: Strategy) -> String {
        let mut batch = self.generate(strategy);
        let idx = self.rng.int_range(batch.len());
        batch.swap_remove(idx)
    }
}
