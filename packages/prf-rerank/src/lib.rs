//! BM25 pseudo-relevance feedback: mine the top of a first-pass ranking for informative terms,
//! build a weighted expansion query and re-score the collection against it.

pub mod feature;
pub mod feedback;
pub mod query;
pub mod rerank;
pub mod similarity;

mod error;

use std::collections::HashSet;

pub use error::{Error, Result};
pub use feature::{FeatureSet, TermFeature};
pub use feedback::FeedbackDocuments;
pub use query::{WeightedQuery, WeightedTerm};
pub use rerank::{Bm25PrfReranker, RerankContext, RerankOutcome};
pub use similarity::{Bm25Similarity, NeutralSimilarity, Similarity, TermMatch};

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredDocument {
	pub doc_id: String,
	pub score: f32,
}
impl ScoredDocument {
	pub fn new(doc_id: impl Into<String>, score: f32) -> Self {
		Self { doc_id: doc_id.into(), score }
	}
}

/// Splits raw query text into analyzed terms, in order.
pub trait Tokenizer
where
	Self: Send + Sync,
{
	fn tokenize(&self, text: &str) -> Vec<String>;
}

pub trait TermStatistics
where
	Self: Send + Sync,
{
	/// Number of documents whose `field` contains `term`.
	fn document_frequency(&self, field: &str, term: &str) -> u64;

	/// Distinct terms stored for `doc_id` in `field`.
	///
	/// Fails with [`Error::TermVectorUnavailable`] when the document has no stored vector for
	/// the field or it cannot be read.
	fn term_vector(&self, doc_id: &str, field: &str) -> Result<HashSet<String>>;

	fn total_document_count(&self) -> u64;
}

pub trait IndexSearcher
where
	Self: TermStatistics,
{
	/// Scoring configuration searches run under unless told otherwise.
	fn similarity(&self) -> Similarity;

	/// Top `top_n` documents for `query` scored under `similarity`.
	///
	/// Must not change the handle's own [`IndexSearcher::similarity`].
	fn search(
		&self,
		query: &WeightedQuery,
		similarity: &Similarity,
		top_n: usize,
	) -> Result<Vec<ScoredDocument>>;
}
