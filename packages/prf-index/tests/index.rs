use std::sync::Arc;

use prf_index::{Analyzer, Document, InMemoryIndex};
use prf_rerank::{
	Bm25PrfReranker, Error, IndexSearcher, NeutralSimilarity, RerankContext, RerankOutcome,
	Similarity, WeightedQuery,
};

const CORPUS: [(&str, &str); 4] = [
	("d1", "Halloween picture, costume."),
	("d2", "Halloween picture party"),
	("d3", "Party music!"),
	("d4", "music concert tickets"),
];

fn build_index(store_term_vectors: bool) -> InMemoryIndex {
	let analyzer = Analyzer::new();
	let mut index = InMemoryIndex::new(Similarity::bm25(0.9, 0.4));

	for (id, text) in CORPUS {
		let doc = Document::new(id).field("contents", analyzer.analyze(text), store_term_vectors);

		index.add_document(doc).expect("Failed to index document.");
	}

	index
}

fn reranker(fb_docs: u32, fb_terms: u32) -> Bm25PrfReranker {
	let cfg = prf_config::Prf {
		field: "contents".to_string(),
		fb_docs,
		fb_terms,
		output_query: true,
	};

	Bm25PrfReranker::new(&cfg, Arc::new(Analyzer::new())).expect("Failed to build reranker.")
}

fn first_pass(index: &InMemoryIndex, text: &str) -> Vec<prf_rerank::ScoredDocument> {
	let query = WeightedQuery::from_terms("contents", Analyzer::new().analyze(text));

	index.search(&query, &index.similarity(), 1_000).expect("First-pass search failed.")
}

fn ctx(text: &str) -> RerankContext {
	RerankContext { query_id: "q1".to_string(), query_text: text.to_string(), hits: 1_000 }
}

fn ids(outcome: &RerankOutcome) -> Vec<&str> {
	outcome.documents().iter().map(|doc| doc.doc_id.as_str()).collect()
}

#[test]
fn expands_and_rescores_from_the_first_pass() {
	let index = build_index(true);
	let docs = first_pass(&index, "Halloween");

	assert_eq!(docs.iter().map(|doc| doc.doc_id.as_str()).collect::<Vec<_>>(), ["d1", "d2"]);

	let outcome =
		reranker(2, 20).rerank(&index, docs, &ctx("Halloween")).expect("Rerank failed.");

	assert!(!outcome.is_fallback());
	assert_eq!(ids(&outcome), ["d1", "d2", "d3"]);

	// halloween and picture weigh ln 25 each, costume ln 5 and party zero.
	let scores: Vec<f32> = outcome.documents().iter().map(|doc| doc.score).collect();

	assert!((scores[0] - 3_125_f32.ln()).abs() < 1e-4, "{scores:?}");
	assert!((scores[1] - 625_f32.ln()).abs() < 1e-4, "{scores:?}");
	assert!(scores[2].abs() < 1e-6, "{scores:?}");
}

#[test]
fn expansion_is_limited_to_the_term_budget() {
	let index = build_index(true);
	let docs = first_pass(&index, "halloween");
	let query = reranker(2, 2).expand(&index, &["halloween".to_string()], &docs);
	let terms: Vec<&str> = query.clauses().iter().map(|clause| clause.term.as_str()).collect();

	assert_eq!(terms, ["halloween", "picture"]);
}

#[test]
fn rerank_leaves_the_active_similarity_untouched() {
	let index = build_index(true);
	let docs = first_pass(&index, "halloween");

	reranker(2, 20).rerank(&index, docs, &ctx("halloween")).expect("Rerank failed.");

	assert_eq!(index.similarity(), Similarity::bm25(0.9, 0.4));
}

#[test]
fn missing_term_vectors_keep_only_query_terms() {
	let index = build_index(false);
	let docs = first_pass(&index, "halloween");
	let outcome =
		reranker(2, 20).rerank(&index, docs, &ctx("halloween")).expect("Rerank failed.");

	assert!(!outcome.is_fallback());
	assert_eq!(ids(&outcome), ["d1", "d2"]);
	assert!(outcome.documents().iter().all(|doc| doc.score < 0.0));
}

#[test]
fn query_term_in_every_document_is_kept_when_a_vector_is_missing() {
	let analyzer = Analyzer::new();
	let mut index = InMemoryIndex::new(Similarity::bm25(0.9, 0.4));

	for (id, text, store_term_vector) in
		[("d1", "the cat", false), ("d2", "the dog", true), ("d3", "the bird", true)]
	{
		let doc = Document::new(id).field("contents", analyzer.analyze(text), store_term_vector);

		index.add_document(doc).expect("Failed to index document.");
	}

	let docs = first_pass(&index, "the");
	let reranker = reranker(2, 100);
	let query = reranker.expand(&index, &["the".to_string()], &docs);

	assert_eq!(query.weight("the"), Some(0.0));
	assert!(query.weight("dog").is_some());

	let outcome = reranker.rerank(&index, docs, &ctx("the")).expect("Rerank failed.");

	assert!(!outcome.is_fallback());
	assert_eq!(outcome.documents().len(), 3);
}

#[test]
fn empty_query_and_ranking_fall_back() {
	let index = build_index(true);
	let outcome = reranker(2, 20).rerank(&index, Vec::new(), &ctx("  ")).expect("Rerank failed.");

	assert_eq!(outcome, RerankOutcome::Fallback(Vec::new()));
}

#[test]
fn non_bm25_active_scorer_is_rejected() {
	let mut index = build_index(true);
	let docs = first_pass(&index, "halloween");
	let neutral =
		NeutralSimilarity::from_active(&index.similarity()).expect("BM25 settings are valid.");

	index.set_similarity(Similarity::from(neutral));

	let err = reranker(2, 20)
		.rerank(&index, docs, &ctx("halloween"))
		.expect_err("Expected a scoring configuration error.");

	assert!(matches!(err, Error::InvalidScoringConfiguration { .. }));
}
