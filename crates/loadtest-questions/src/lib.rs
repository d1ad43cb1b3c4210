//! Prompt synthesis for the chat-loadtest simulation engine.
//!
//! This crate provides the [`QuestionGenerator`], which turns a seed and a
//! [`Strategy`](loadtest_core::Strategy) into batches of natural-language
//! prompts. Prompts embed seed-derived parameters (years, operands, places,
//! sizes, hash fragments), so actors seeded differently send different text
//! and defeat response caching on the service under test.
//!
//! # Architecture
//!
//! ```text
//!   seed
//!    │
//!    ▼
//! ┌───────────────────┐      ┌──────────────────────────┐
//! │ QuestionGenerator │─────▶│ strategies::generate_batch│
//! │  - RandomSource   │      │  historical, mathematical │
//! └───────────────────┘      │  geographical, technical  │
//!                            │  hypothetical, mixed      │
//!                            └────────────┬─────────────┘
//!                                         ▼
//!                                 Vec<String> (8 prompts)
//! ```
//!
//! # Example
//!
//! ```rust
//! use loadtest_core::Strategy;
//! use loadtest_questions::QuestionGenerator;
//!
//! let mut generator = QuestionGenerator::new(42);
//! let batch = generator.generate(Strategy::Historical);
//! assert_eq!(batch.len(), 8);
//!
//! // Out-of-range indices fall back to a random prompt from the batch.
//! let prompt = generator.question(Strategy::Mixed, 100);
//! assert!(!prompt.is_empty());
//! ```

pub mod generator;
pub mod strategies;

pub use generator::QuestionGenerator;
pub use strategies::BATCH_SIZE;
