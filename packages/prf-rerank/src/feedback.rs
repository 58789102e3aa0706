use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
	ScoredDocument, TermStatistics,
	feature::{FeatureSet, TermFeature},
};

/// Term sets of the pseudo-relevant documents and the candidate vocabulary drawn from them.
#[derive(Clone, Debug, Default)]
pub struct FeedbackDocuments {
	vocabulary: HashSet<String>,
	doc_terms: Vec<HashSet<String>>,
}
impl FeedbackDocuments {
	/// Mines the first `min(fb_docs, docs.len())` documents.
	///
	/// A document whose term vector cannot be read contributes nothing but still counts as
	/// considered.
	pub fn collect<S>(
		stats: &S,
		field: &str,
		query_terms: &[String],
		docs: &[ScoredDocument],
		fb_docs: usize,
	) -> Self
	where
		S: ?Sized + TermStatistics,
	{
		let num_rel_docs = docs.len().min(fb_docs);
		let doc_terms = fetch_term_vectors(stats, field, &docs[..num_rel_docs]);
		let mut vocabulary: HashSet<String> = query_terms.iter().cloned().collect();

		for terms in &doc_terms {
			vocabulary.extend(terms.iter().cloned());
		}

		Self { vocabulary, doc_terms }
	}

	pub fn vocabulary(&self) -> &HashSet<String> {
		&self.vocabulary
	}

	pub fn num_rel_docs(&self) -> usize {
		self.doc_terms.len()
	}

	/// Number of mined documents containing `term`.
	pub fn relevant_document_frequency(&self, term: &str) -> usize {
		self.doc_terms.iter().filter(|terms| terms.contains(term)).count()
	}

	/// Statistics for every candidate term.
	pub fn features<S>(&self, stats: &S, field: &str) -> FeatureSet
	where
		S: ?Sized + TermStatistics,
	{
		let num_rel_docs = self.num_rel_docs() as u64;
		let mut num_docs = stats.total_document_count();

		if num_docs < num_rel_docs {
			tracing::warn!(
				num_docs,
				num_rel_docs,
				"Corpus size is smaller than the feedback set, using the feedback set size."
			);

			num_docs = num_rel_docs;
		}

		let mut features = FeatureSet::new();

		for term in &self.vocabulary {
			let df = stats.document_frequency(field, term);
			let df_rel = self.relevant_document_frequency(term) as u64;

			features.add_feature(term.clone(), TermFeature::new(df, df_rel, num_docs, num_rel_docs));
		}

		features
	}
}

fn term_vector_or_empty<S>(stats: &S, field: &str, doc: &ScoredDocument) -> HashSet<String>
where
	S: ?Sized + TermStatistics,
{
	match stats.term_vector(&doc.doc_id, field) {
		Ok(terms) => terms,
		Err(err) => {
			tracing::warn!(
				error = %err,
				doc_id = doc.doc_id.as_str(),
				field,
				"Skipping feedback document without a readable term vector."
			);

			HashSet::new()
		},
	}
}

#[cfg(not(feature = "parallel"))]
fn fetch_term_vectors<S>(stats: &S, field: &str, docs: &[ScoredDocument]) -> Vec<HashSet<String>>
where
	S: ?Sized + TermStatistics,
{
	docs.iter().map(|doc| term_vector_or_empty(stats, field, doc)).collect()
}

#[cfg(feature = "parallel")]
fn fetch_term_vectors<S>(stats: &S, field: &str, docs: &[ScoredDocument]) -> Vec<HashSet<String>>
where
	S: ?Sized + TermStatistics,
{
	docs.par_iter().map(|doc| term_vector_or_empty(stats, field, doc)).collect()
}
