use std::collections::{HashMap, HashSet};

use prf_rerank::{
	IndexSearcher, ScoredDocument, Similarity, TermMatch, TermStatistics, WeightedQuery,
};

use crate::{Error, Result};

/// One analyzed field of a document awaiting indexing.
#[derive(Clone, Debug)]
pub struct FieldValue {
	pub name: String,
	pub terms: Vec<String>,
	pub store_term_vector: bool,
}

#[derive(Clone, Debug)]
pub struct Document {
	pub id: String,
	pub fields: Vec<FieldValue>,
}
impl Document {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), fields: Vec::new() }
	}

	pub fn field<I, S>(
		mut self,
		name: impl Into<String>,
		terms: I,
		store_term_vector: bool,
	) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields.push(FieldValue {
			name: name.into(),
			terms: terms.into_iter().map(Into::into).collect(),
			store_term_vector,
		});

		self
	}
}

#[derive(Debug)]
struct StoredDocument {
	id: String,
	term_vectors: HashMap<String, HashSet<String>>,
}

#[derive(Debug, Default)]
struct FieldIndex {
	postings: HashMap<String, Vec<(usize, u32)>>,
	doc_lens: HashMap<usize, u32>,
	total_len: u64,
}
impl FieldIndex {
	fn avg_doc_len(&self, num_docs: usize) -> f32 {
		if num_docs == 0 {
			return 0.0;
		}

		(self.total_len as f64 / num_docs as f64) as f32
	}
}

/// Append-only in-memory inverted index.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
	docs: Vec<StoredDocument>,
	by_id: HashMap<String, usize>,
	fields: HashMap<String, FieldIndex>,
	similarity: Similarity,
}
impl InMemoryIndex {
	pub fn new(similarity: Similarity) -> Self {
		Self { similarity, ..Self::default() }
	}

	pub fn set_similarity(&mut self, similarity: Similarity) {
		self.similarity = similarity;
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	pub fn add_document(&mut self, doc: Document) -> Result<()> {
		if doc.id.trim().is_empty() {
			return Err(Error::InvalidDocument {
				message: "document id must be non-empty".to_string(),
			});
		}
		if self.by_id.contains_key(&doc.id) {
			return Err(Error::DuplicateDocument { doc_id: doc.id });
		}

		let ord = self.docs.len();
		let mut term_vectors = HashMap::new();

		for value in doc.fields {
			let mut freqs: HashMap<String, u32> = HashMap::new();

			for term in &value.terms {
				*freqs.entry(term.clone()).or_insert(0) += 1;
			}

			let field = self.fields.entry(value.name.clone()).or_default();
			let len = value.terms.len() as u32;

			*field.doc_lens.entry(ord).or_insert(0) += len;
			field.total_len += u64::from(len);

			if value.store_term_vector {
				let stored: &mut HashSet<String> =
					term_vectors.entry(value.name.clone()).or_default();

				stored.extend(freqs.keys().cloned());
			}

			for (term, freq) in freqs {
				let postings = field.postings.entry(term).or_default();

				match postings.last_mut() {
					// Same field name given twice for one document.
					Some((last, tf)) if *last == ord => *tf += freq,
					_ => postings.push((ord, freq)),
				}
			}
		}

		self.by_id.insert(doc.id.clone(), ord);
		self.docs.push(StoredDocument { id: doc.id, term_vectors });

		Ok(())
	}
}
impl TermStatistics for InMemoryIndex {
	fn document_frequency(&self, field: &str, term: &str) -> u64 {
		self.fields
			.get(field)
			.and_then(|index| index.postings.get(term))
			.map(|postings| postings.len() as u64)
			.unwrap_or(0)
	}

	fn term_vector(&self, doc_id: &str, field: &str) -> prf_rerank::Result<HashSet<String>> {
		let unavailable = |message: &str| prf_rerank::Error::TermVectorUnavailable {
			doc_id: doc_id.to_string(),
			field: field.to_string(),
			message: message.to_string(),
		};
		let Some(&ord) = self.by_id.get(doc_id) else {
			return Err(unavailable("unknown document"));
		};

		self.docs[ord]
			.term_vectors
			.get(field)
			.cloned()
			.ok_or_else(|| unavailable("no term vector stored for this field"))
	}

	fn total_document_count(&self) -> u64 {
		self.docs.len() as u64
	}
}
impl IndexSearcher for InMemoryIndex {
	fn similarity(&self) -> Similarity {
		self.similarity
	}

	fn search(
		&self,
		query: &WeightedQuery,
		similarity: &Similarity,
		top_n: usize,
	) -> prf_rerank::Result<Vec<ScoredDocument>> {
		let Some(field) = self.fields.get(query.field()) else {
			return Err(prf_rerank::Error::SearchExecution {
				message: format!("Field {} is not indexed.", query.field()),
			});
		};

		if top_n == 0 || query.is_empty() {
			return Ok(Vec::new());
		}

		let num_docs = self.docs.len();
		let avg_doc_len = field.avg_doc_len(num_docs);
		let mut accumulators: HashMap<usize, (f32, usize)> = HashMap::new();

		for clause in query.clauses() {
			let Some(postings) = field.postings.get(&clause.term) else { continue };
			let doc_freq = postings.len() as u64;

			for &(ord, tf) in postings {
				let doc_len = field.doc_lens.get(&ord).copied().unwrap_or(0) as f32;
				let contribution = similarity.score(&TermMatch {
					freq: tf as f32,
					doc_len,
					avg_doc_len,
					doc_freq,
					num_docs: num_docs as u64,
					boost: clause.weight,
				});
				let acc = accumulators.entry(ord).or_insert((0.0, 0));

				acc.0 += contribution;
				acc.1 += 1;
			}
		}

		let max_overlap = query.len();
		let mut hits: Vec<ScoredDocument> = accumulators
			.into_iter()
			.filter_map(|(ord, (score, overlap))| {
				let score = score * similarity.coord(overlap, max_overlap);

				score.is_finite().then(|| ScoredDocument::new(self.docs[ord].id.as_str(), score))
			})
			.collect();

		hits.sort_unstable_by(|a, b| {
			b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id))
		});
		hits.truncate(top_n);

		tracing::debug!(
			field = query.field(),
			clauses = query.len(),
			hits = hits.len(),
			similarity = %similarity,
			"Search completed."
		);

		Ok(hits)
	}
}
