//! Prompt template families.
//!
//! Each strategy draws a small set of parameters from the caller's
//! [`RandomSource`] and substitutes them into a fixed list of
//! [`BATCH_SIZE`] templates. Two different seeds almost always produce
//! different parameters, which keeps concurrent actors from sending
//! byte-identical prompts and hitting a response cache.

pub mod geographical;
pub mod historical;
pub mod hypothetical;
pub mod mathematical;
pub mod technical;

use loadtest_core::{RandomSource, Strategy};

/// Number of prompts in every batch.
pub const BATCH_SIZE: usize = 8;

/// Prompts taken from each concrete strategy when mixing.
const MIXED_PER_STRATEGY: usize = 2;

/// Produce one batch for `strategy`, advancing `rng`.
pub fn generate_batch(strategy: Strategy, rng: &mut RandomSource) -> Vec<String> {
    match strategy {
        Strategy::Historical => historical::questions(rng),
        Strategy::Mathematical => mathematical::questions(rng),
        Strategy::Geographical => geographical::questions(rng),
        Strategy::Hypothetical => hypothetical::questions(rng),
        Strategy::Technical => technical::questions(rng),
        Strategy::Mixed => mixed_questions(rng),
    }
}

/// Two distinct prompts from each concrete strategy, capped at [`BATCH_SIZE`].
///
/// Every sub-strategy gets its own source seeded from `rng`, so its
/// parameters are independent of the ones used by its neighbours. With five
/// strategies the cap drops the technical pair.
fn mixed_questions(rng: &mut RandomSource) -> Vec<String> {
    let mut questions = Vec::with_capacity(Strategy::CONCRETE.len() * MIXED_PER_STRATEGY);

    for strategy in Strategy::CONCRETE {
        let mut sub = RandomSource::new(rng.next_u64());
        let batch = generate_batch(strategy, &mut sub);
        for idx in rng.sample_distinct(batch.len(), MIXED_PER_STRATEGY) {
            questions.push(batch[idx].clone());
        }
    }

    questions.truncate(BATCH_SIZE);
    questions
}
