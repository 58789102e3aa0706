use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{Error, Result};

/// Statistics for one (clause, document) match handed to a scoring function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TermMatch {
	pub freq: f32,
	pub doc_len: f32,
	pub avg_doc_len: f32,
	pub doc_freq: u64,
	pub num_docs: u64,
	pub boost: f32,
}

/// Scoring configuration a search runs under.
///
/// Passed to every search call; the index handle's own configuration is never replaced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Similarity {
	Bm25(Bm25Similarity),
	Neutral(NeutralSimilarity),
}
impl Similarity {
	pub fn bm25(k1: f32, b: f32) -> Self {
		Self::Bm25(Bm25Similarity { k1, b })
	}

	/// Contribution of a single clause to a document's score.
	pub fn score(&self, m: &TermMatch) -> f32 {
		match self {
			Self::Bm25(sim) => sim.score(m),
			Self::Neutral(sim) => sim.score(m),
		}
	}

	/// Multiplier applied to a document's summed clause scores.
	pub fn coord(&self, overlap: usize, max_overlap: usize) -> f32 {
		match self {
			Self::Bm25(_) => 1.0,
			Self::Neutral(sim) => sim.coord(overlap, max_overlap),
		}
	}

	pub fn is_neutral(&self) -> bool {
		matches!(self, Self::Neutral(_))
	}
}
impl Default for Similarity {
	fn default() -> Self {
		Self::Bm25(Bm25Similarity::default())
	}
}
impl Display for Similarity {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::Bm25(sim) => write!(f, "BM25(k1={},b={})", sim.k1, sim.b),
			Self::Neutral(_) => f.write_str("SimpleSimilarity"),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bm25Similarity {
	pub k1: f32,
	pub b: f32,
}
impl Bm25Similarity {
	pub fn idf(&self, doc_freq: u64, num_docs: u64) -> f32 {
		let df = doc_freq as f64;
		let n = num_docs as f64;

		(1.0 + (n - df + 0.5) / (df + 0.5)).ln() as f32
	}

	pub fn tf(&self, freq: f32, doc_len: f32, avg_doc_len: f32) -> f32 {
		if freq <= 0.0 {
			return 0.0;
		}

		let norm = if avg_doc_len > 0.0 {
			1.0 - self.b + self.b * doc_len / avg_doc_len
		} else {
			1.0
		};

		freq * (self.k1 + 1.0) / (freq + self.k1 * norm)
	}

	pub fn score(&self, m: &TermMatch) -> f32 {
		m.boost * self.idf(m.doc_freq, m.num_docs) * self.tf(m.freq, m.doc_len, m.avg_doc_len)
	}
}
impl Default for Bm25Similarity {
	fn default() -> Self {
		Self { k1: 0.9, b: 0.4 }
	}
}

/// TF-IDF shaped scorer whose every normalization factor is the identity, leaving the clause
/// boost as the only weighting.
///
/// `k1` and `b` are copied from the BM25 configuration it replaces and are informational only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeutralSimilarity {
	k1: f32,
	b: f32,
}
impl NeutralSimilarity {
	/// Derives the neutral configuration from the handle's active one.
	///
	/// Rejects anything but a usable BM25 configuration.
	pub fn from_active(active: &Similarity) -> Result<Self> {
		let Similarity::Bm25(bm25) = active else {
			return Err(Error::InvalidScoringConfiguration {
				message: format!("Expected a BM25 scorer, found {active}."),
			});
		};

		if !bm25.k1.is_finite() || bm25.k1 < 0.0 {
			return Err(Error::InvalidScoringConfiguration {
				message: format!("BM25 k1 must be finite and non-negative, found {}.", bm25.k1),
			});
		}
		if !bm25.b.is_finite() || !(0.0..=1.0).contains(&bm25.b) {
			return Err(Error::InvalidScoringConfiguration {
				message: format!("BM25 b must be within 0.0-1.0, found {}.", bm25.b),
			});
		}

		Ok(Self { k1: bm25.k1, b: bm25.b })
	}

	pub fn k1(&self) -> f32 {
		self.k1
	}

	pub fn b(&self) -> f32 {
		self.b
	}

	/// Raw frequency, no square root.
	pub fn tf(&self, freq: f32) -> f32 {
		freq
	}

	pub fn idf(&self, _doc_freq: u64, _num_docs: u64) -> f32 {
		1.0
	}

	pub fn length_norm(&self, _doc_len: f32) -> f32 {
		1.0
	}

	pub fn query_norm(&self, _sum_of_squared_weights: f32) -> f32 {
		1.0
	}

	pub fn coord(&self, _overlap: usize, _max_overlap: usize) -> f32 {
		1.0
	}

	pub fn sloppy_freq(&self, _distance: u32) -> f32 {
		1.0
	}

	pub fn score_payload(&self, _payload: &[u8]) -> f32 {
		1.0
	}

	pub fn encode_norm(&self, _norm: f32) -> u64 {
		1
	}

	pub fn decode_norm(&self, _norm: u64) -> f32 {
		1.0
	}

	/// Classic TF-IDF composition: query weight times field weight.
	pub fn score(&self, m: &TermMatch) -> f32 {
		let idf = self.idf(m.doc_freq, m.num_docs);
		let query_weight = m.boost * idf * self.query_norm(m.boost * m.boost * idf * idf);
		let field_weight = self.tf(m.freq)
			* idf * self.decode_norm(self.encode_norm(self.length_norm(m.doc_len)));

		query_weight * field_weight
	}
}
impl From<NeutralSimilarity> for Similarity {
	fn from(sim: NeutralSimilarity) -> Self {
		Self::Neutral(sim)
	}
}
