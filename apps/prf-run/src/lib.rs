use std::{
	fmt::{self, Display, Formatter},
	fs,
	path::{Path, PathBuf},
	sync::Arc,
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use prf_config::Config;
use prf_index::{Analyzer, Document, InMemoryIndex};
use prf_rerank::{
	Bm25PrfReranker, IndexSearcher, RerankContext, ScoredDocument, Similarity, WeightedQuery,
};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON Lines corpus, one `{"id", "contents"}` object per line.
	#[arg(long, value_name = "FILE")]
	pub corpus: PathBuf,
	/// JSON query set, `{"queries": [{"id", "query"}]}`.
	#[arg(long, short = 'q', value_name = "FILE")]
	pub queries: PathBuf,
	/// Run file to write; stdout when omitted.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct CorpusDocument {
	pub id: String,
	pub contents: String,
}

#[derive(Debug, Deserialize)]
pub struct QuerySet {
	pub queries: Vec<Query>,
}

#[derive(Debug, Deserialize)]
pub struct Query {
	pub id: String,
	pub query: String,
}

/// One ranked line of a TREC run file.
#[derive(Clone, Debug, PartialEq)]
pub struct RunLine {
	pub qid: String,
	pub doc_id: String,
	pub rank: usize,
	pub score: f32,
	pub tag: String,
}
impl Display for RunLine {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{} Q0 {} {} {:.6} {}", self.qid, self.doc_id, self.rank, self.score, self.tag)
	}
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = prf_config::load(&args.config)?;

	init_tracing(&config)?;

	let corpus = load_corpus(&args.corpus)?;
	let queries = load_queries(&args.queries)?;
	let lines = execute(&config, corpus, &queries)?;
	let mut body = String::new();

	for line in &lines {
		body.push_str(&line.to_string());
		body.push('\n');
	}

	match &args.output {
		Some(path) => {
			fs::write(path, body)?;

			tracing::info!(path = %path.display(), lines = lines.len(), "Run file written.");
		},
		None => print!("{body}"),
	}

	Ok(())
}

/// Indexes `corpus`, then runs first-pass BM25 and the feedback rerank for every query.
pub fn execute(
	config: &Config,
	corpus: Vec<CorpusDocument>,
	queries: &QuerySet,
) -> color_eyre::Result<Vec<RunLine>> {
	let analyzer = Arc::new(Analyzer::new());
	let index = build_index(config, &analyzer, corpus)?;
	let reranker = Bm25PrfReranker::new(&config.prf, analyzer.clone())?;
	let hits = config.search.hits as usize;
	let tag = reranker.tag();
	let mut lines = Vec::new();

	tracing::info!(docs = index.len(), queries = queries.queries.len(), %tag, "Run started.");

	for query in &queries.queries {
		let started = Instant::now();
		let terms = analyzer.analyze(&query.query);
		let first_pass = index.search(
			&WeightedQuery::from_terms(reranker.field(), terms),
			&index.similarity(),
			hits,
		)?;
		let first_pass_hits = first_pass.len();
		let ctx = RerankContext {
			query_id: query.id.clone(),
			query_text: query.query.clone(),
			hits,
		};
		let outcome = reranker.rerank(&index, first_pass, &ctx)?;
		let fallback = outcome.is_fallback();
		let docs = outcome.into_documents();

		tracing::info!(
			qid = query.id.as_str(),
			first_pass_hits,
			reranked_hits = docs.len(),
			fallback,
			elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0,
			"Query reranked."
		);

		lines.extend(run_lines(&query.id, docs, &tag));
	}

	Ok(lines)
}

pub fn load_corpus(path: &Path) -> color_eyre::Result<Vec<CorpusDocument>> {
	let raw = fs::read_to_string(path)?;
	let mut docs = Vec::new();

	for (index, line) in raw.lines().enumerate() {
		if line.trim().is_empty() {
			continue;
		}

		let doc: CorpusDocument = serde_json::from_str(line)
			.map_err(|err| eyre::eyre!("Invalid corpus line {}: {err}", index + 1))?;

		docs.push(doc);
	}

	if docs.is_empty() {
		return Err(eyre::eyre!("Corpus must include at least one document."));
	}

	Ok(docs)
}

pub fn load_queries(path: &Path) -> color_eyre::Result<QuerySet> {
	let raw = fs::read_to_string(path)?;
	let queries: QuerySet = serde_json::from_str(&raw)?;

	if queries.queries.is_empty() {
		return Err(eyre::eyre!("Query set must include at least one query."));
	}
	if let Some(query) = queries.queries.iter().find(|query| query.id.trim().is_empty()) {
		return Err(eyre::eyre!("Query id must be non-empty for query {:?}.", query.query));
	}

	Ok(queries)
}

fn build_index(
	config: &Config,
	analyzer: &Analyzer,
	corpus: Vec<CorpusDocument>,
) -> color_eyre::Result<InMemoryIndex> {
	let mut index = InMemoryIndex::new(Similarity::bm25(config.bm25.k1, config.bm25.b));

	for doc in corpus {
		let terms = analyzer.analyze(&doc.contents);

		index.add_document(Document::new(doc.id).field(config.prf.field.as_str(), terms, true))?;
	}

	Ok(index)
}

fn run_lines(qid: &str, docs: Vec<ScoredDocument>, tag: &str) -> Vec<RunLine> {
	docs.into_iter()
		.enumerate()
		.map(|(rank, doc)| RunLine {
			qid: qid.to_string(),
			doc_id: doc.doc_id,
			rank: rank + 1,
			score: doc.score,
			tag: tag.to_string(),
		})
		.collect()
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
