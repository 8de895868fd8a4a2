//! Retrieval-augmented answering.
//!
//! Retrieves the chunks closest to a question, stuffs them into the
//! prompt as context and asks the model backend for an answer.

pub mod answer;

pub use answer::{Answer, AnswerOptions, Answerer, NullSink, TokenSink};
