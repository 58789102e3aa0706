use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::feature::FeatureSet;

#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTerm {
	pub term: String,
	pub weight: f32,
}

/// Disjunction of boosted term clauses over one field.
///
/// A document matching any clause is a hit; its score is the sum of the matching clauses'
/// contributions. Weights may be negative and then lower the score of matching documents.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedQuery {
	field: String,
	clauses: Vec<WeightedTerm>,
}
impl WeightedQuery {
	/// Unboosted query over `terms`, duplicates collapsed, first occurrence wins.
	pub fn from_terms<I, S>(field: impl Into<String>, terms: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut clauses: Vec<WeightedTerm> = Vec::new();

		for term in terms {
			let term = term.into();

			if clauses.iter().any(|clause| clause.term == term) {
				continue;
			}

			clauses.push(WeightedTerm { term, weight: 1.0 });
		}

		Self { field: field.into(), clauses }
	}

	/// One clause per feature, boosted by its relevance weight, in offer-weight order.
	///
	/// A weight that is not a finite number becomes `0.0`; the clause still matches but adds
	/// nothing to the score.
	pub fn from_features(field: impl Into<String>, features: &FeatureSet) -> Self {
		let field = field.into();
		let mut clauses = Vec::with_capacity(features.len());

		for (term, feature) in features.ordered() {
			let mut weight = feature.relevance_weight() as f32;

			if !weight.is_finite() {
				tracing::warn!(
					field = field.as_str(),
					term,
					df = feature.df,
					df_rel = feature.df_rel,
					num_docs = feature.num_docs,
					num_docs_rel = feature.num_docs_rel,
					"Feedback term has a non-finite weight, keeping it with zero weight."
				);

				weight = 0.0;
			}

			clauses.push(WeightedTerm { term: term.to_string(), weight });
		}

		Self { field, clauses }
	}

	pub fn field(&self) -> &str {
		&self.field
	}

	pub fn clauses(&self) -> &[WeightedTerm] {
		&self.clauses
	}

	pub fn len(&self) -> usize {
		self.clauses.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clauses.is_empty()
	}

	pub fn weight(&self, term: &str) -> Option<f32> {
		self.clauses.iter().find(|clause| clause.term == term).map(|clause| clause.weight)
	}
}
impl Display for WeightedQuery {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		for (idx, clause) in self.clauses.iter().enumerate() {
			if idx > 0 {
				f.write_str(" ")?;
			}

			if clause.weight == 1.0 {
				write!(f, "{}:{}", self.field, clause.term)?;
			} else {
				write!(f, "({}:{})^{}", self.field, clause.term, clause.weight)?;
			}
		}

		Ok(())
	}
}
