use std::sync::Arc;

use crate::{
	IndexSearcher, Result, ScoredDocument, TermStatistics, Tokenizer,
	feedback::FeedbackDocuments,
	query::WeightedQuery,
	similarity::{NeutralSimilarity, Similarity},
};

#[derive(Clone, Debug)]
pub struct RerankContext {
	pub query_id: String,
	pub query_text: String,
	/// Number of results requested from the expanded search.
	pub hits: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RerankOutcome {
	/// Ranking produced by the expanded query.
	Expanded(Vec<ScoredDocument>),
	/// The input ranking, unchanged.
	Fallback(Vec<ScoredDocument>),
}
impl RerankOutcome {
	pub fn documents(&self) -> &[ScoredDocument] {
		match self {
			Self::Expanded(docs) | Self::Fallback(docs) => docs,
		}
	}

	pub fn into_documents(self) -> Vec<ScoredDocument> {
		match self {
			Self::Expanded(docs) | Self::Fallback(docs) => docs,
		}
	}

	pub fn is_fallback(&self) -> bool {
		matches!(self, Self::Fallback(_))
	}
}

/// Re-ranks a first-pass result list with a relevance-weighted expansion of its query.
pub struct Bm25PrfReranker {
	tokenizer: Arc<dyn Tokenizer>,
	field: String,
	fb_docs: usize,
	fb_terms: usize,
	output_query: bool,
}
impl Bm25PrfReranker {
	pub fn new(cfg: &prf_config::Prf, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
		prf_config::validate_prf(cfg)?;

		Ok(Self {
			tokenizer,
			field: cfg.field.trim().to_string(),
			fb_docs: cfg.fb_docs as usize,
			fb_terms: cfg.fb_terms as usize,
			output_query: cfg.output_query,
		})
	}

	pub fn field(&self) -> &str {
		&self.field
	}

	/// Run label encoding the feedback depth and expansion size.
	pub fn tag(&self) -> String {
		format!("BM25PRF(fbDocs={},fbTerms={})", self.fb_docs, self.fb_terms)
	}

	/// Builds the expanded query for `query_terms` from the top of `docs`.
	pub fn expand<S>(
		&self,
		stats: &S,
		query_terms: &[String],
		docs: &[ScoredDocument],
	) -> WeightedQuery
	where
		S: ?Sized + TermStatistics,
	{
		let feedback =
			FeedbackDocuments::collect(stats, &self.field, query_terms, docs, self.fb_docs);
		let mut features = feedback.features(stats, &self.field);
		let candidates = features.len();

		features.prune_to_size(self.fb_terms);

		tracing::debug!(
			field = self.field.as_str(),
			num_rel_docs = feedback.num_rel_docs(),
			candidates,
			kept = features.len(),
			"Feedback features extracted."
		);

		WeightedQuery::from_features(self.field.as_str(), &features)
	}

	/// Scores the collection against the expanded query under neutral scoring.
	///
	/// A failed expanded search, or an expansion with nothing to search for, yields
	/// [`RerankOutcome::Fallback`] carrying `docs` unchanged. The only error is an active scorer
	/// that is not a usable BM25 configuration.
	pub fn rerank<S>(
		&self,
		searcher: &S,
		docs: Vec<ScoredDocument>,
		ctx: &RerankContext,
	) -> Result<RerankOutcome>
	where
		S: ?Sized + IndexSearcher,
	{
		let neutral = NeutralSimilarity::from_active(&searcher.similarity())?;
		let query_terms = self.tokenizer.tokenize(&ctx.query_text);
		let expanded = self.expand(searcher, &query_terms, &docs);

		if self.output_query {
			let original =
				WeightedQuery::from_terms(self.field.as_str(), query_terms.iter().cloned());

			tracing::info!(qid = ctx.query_id.as_str(), "QID: {}", ctx.query_id);
			tracing::info!(qid = ctx.query_id.as_str(), "Original Query: {original}");
			tracing::info!(qid = ctx.query_id.as_str(), "Running new query: {expanded}");
		}

		if expanded.is_empty() {
			tracing::info!(
				qid = ctx.query_id.as_str(),
				tag = %self.tag(),
				"Expanded query is empty, keeping the original ranking."
			);

			return Ok(RerankOutcome::Fallback(docs));
		}

		let similarity = Similarity::from(neutral);

		match searcher.search(&expanded, &similarity, ctx.hits) {
			Ok(hits) => Ok(RerankOutcome::Expanded(hits)),
			Err(err) => {
				tracing::warn!(
					error = %err,
					qid = ctx.query_id.as_str(),
					tag = %self.tag(),
					"Expanded search failed, keeping the original ranking."
				);

				Ok(RerankOutcome::Fallback(docs))
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Whitespace;
	impl Tokenizer for Whitespace {
		fn tokenize(&self, text: &str) -> Vec<String> {
			text.split_whitespace().map(str::to_lowercase).collect()
		}
	}

	fn prf(fb_docs: u32, fb_terms: u32) -> prf_config::Prf {
		prf_config::Prf {
			field: "contents".to_string(),
			fb_docs,
			fb_terms,
			output_query: false,
		}
	}

	#[test]
	fn tag_encodes_feedback_settings() {
		let reranker =
			Bm25PrfReranker::new(&prf(10, 20), Arc::new(Whitespace)).expect("valid settings");

		assert_eq!(reranker.tag(), "BM25PRF(fbDocs=10,fbTerms=20)");
	}

	#[test]
	fn rejects_zero_feedback_settings() {
		assert!(Bm25PrfReranker::new(&prf(0, 20), Arc::new(Whitespace)).is_err());
		assert!(Bm25PrfReranker::new(&prf(10, 0), Arc::new(Whitespace)).is_err());
	}

	#[test]
	fn outcome_exposes_documents() {
		let docs = vec![ScoredDocument::new("d1", 1.0)];
		let outcome = RerankOutcome::Fallback(docs.clone());

		assert!(outcome.is_fallback());
		assert_eq!(outcome.documents(), docs.as_slice());
		assert_eq!(outcome.into_documents(), docs);
	}
}
