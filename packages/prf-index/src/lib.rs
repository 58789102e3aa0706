//! In-memory inverted index backing the feedback reranker: analyzed fields, stored term vectors
//! and boosted disjunctive search under a caller-chosen similarity.

pub mod analyzer;
pub mod index;

mod error;

pub use analyzer::Analyzer;
pub use error::{Error, Result};
pub use index::{Document, FieldValue, InMemoryIndex};
