use std::{
	cmp::Ordering,
	collections::HashMap,
};

/// Term statistics captured for one candidate during a single rerank call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermFeature {
	/// Corpus-wide count of documents containing the term.
	pub df: u64,
	/// Count of pseudo-relevant documents containing the term.
	pub df_rel: u64,
	/// Corpus size.
	pub num_docs: u64,
	/// Number of pseudo-relevant documents considered.
	pub num_docs_rel: u64,
}
impl TermFeature {
	pub fn new(df: u64, df_rel: u64, num_docs: u64, num_docs_rel: u64) -> Self {
		Self { df, df_rel, num_docs, num_docs_rel }
	}

	/// Robertson/Sparck-Jones log-odds relevance weight with 0.5 smoothing on every cell of the
	/// contingency table.
	pub fn relevance_weight(&self) -> f64 {
		let df = self.df as f64;
		let df_rel = self.df_rel as f64;
		let num_docs = self.num_docs as f64;
		let num_docs_rel = self.num_docs_rel as f64;

		((df_rel + 0.5) * (num_docs - df - num_docs_rel + df_rel + 0.5)
			/ ((df - df_rel + 0.5) * (num_docs_rel - df_rel + 0.5)))
			.ln()
	}

	/// Selection key only; never used as a query boost.
	pub fn offer_weight(&self) -> f64 {
		self.relevance_weight() * self.df_rel as f64
	}
}

/// Candidate terms of one query and their statistics.
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
	features: HashMap<String, TermFeature>,
}
impl FeatureSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_feature(&mut self, term: impl Into<String>, feature: TermFeature) {
		self.features.insert(term.into(), feature);
	}

	pub fn get(&self, term: &str) -> Option<&TermFeature> {
		self.features.get(term)
	}

	pub fn contains(&self, term: &str) -> bool {
		self.features.contains_key(term)
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &TermFeature)> {
		self.features.iter().map(|(term, feature)| (term.as_str(), feature))
	}

	/// Returns `0.0` for terms that are not in the set.
	pub fn relevance_weight(&self, term: &str) -> f64 {
		self.features.get(term).map(TermFeature::relevance_weight).unwrap_or(0.0)
	}

	/// Returns `0.0` for terms that are not in the set.
	pub fn offer_weight(&self, term: &str) -> f64 {
		self.features.get(term).map(TermFeature::offer_weight).unwrap_or(0.0)
	}

	/// Terms by offer weight descending, then term ascending.
	pub fn ordered(&self) -> Vec<(&str, &TermFeature)> {
		let mut entries: Vec<(&str, &TermFeature, f64)> = self
			.features
			.iter()
			.map(|(term, feature)| (term.as_str(), feature, ranking_key(feature)))
			.collect();

		entries.sort_by(|a, b| compare_ranked(a.2, a.0, b.2, b.0));

		entries.into_iter().map(|(term, feature, _)| (term, feature)).collect()
	}

	/// Keeps the `k` terms with the highest offer weight.
	pub fn prune_to_size(&mut self, k: usize) -> &mut Self {
		if self.features.len() <= k {
			return self;
		}

		let keep: Vec<String> =
			self.ordered().into_iter().take(k).map(|(term, _)| term.to_string()).collect();
		let mut pruned = HashMap::with_capacity(keep.len());

		for term in keep {
			if let Some((term, feature)) = self.features.remove_entry(term.as_str()) {
				pruned.insert(term, feature);
			}
		}

		self.features = pruned;

		self
	}
}

// NaN ranks below every real weight; negative zero ties with zero.
fn ranking_key(feature: &TermFeature) -> f64 {
	let weight = feature.offer_weight();

	if weight.is_nan() {
		f64::NEG_INFINITY
	} else if weight == 0.0 {
		0.0
	} else {
		weight
	}
}

fn compare_ranked(a_weight: f64, a_term: &str, b_weight: f64, b_term: &str) -> Ordering {
	b_weight.total_cmp(&a_weight).then_with(|| a_term.cmp(b_term))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn set_of(entries: &[(&str, TermFeature)]) -> FeatureSet {
		let mut set = FeatureSet::new();

		for (term, feature) in entries {
			set.add_feature(*term, *feature);
		}

		set
	}

	#[test]
	fn relevance_weight_matches_reference_values() {
		// 1000 - 100 - 5 + 3 + 0.5 = 898.5
		let feature = TermFeature::new(100, 3, 1_000, 5);
		let expected = ((3.5_f64 * 898.5) / (97.5 * 2.5)).ln();

		assert!((feature.relevance_weight() - expected).abs() < 1e-12);
		assert!((feature.relevance_weight() - 2.5574).abs() < 1e-3);
		assert!((feature.offer_weight() - 7.6723).abs() < 1e-3);
	}

	#[test]
	fn smoothing_keeps_saturated_cells_finite() {
		// df == df_rel and num_docs_rel == df_rel leave 0.5 in both denominator factors.
		let feature = TermFeature::new(4, 4, 1_000, 4);
		let expected = ((4.5_f64 * 996.5) / (0.5 * 0.5)).ln();

		assert!(feature.relevance_weight().is_finite());
		assert!((feature.relevance_weight() - expected).abs() < 1e-12);
	}

	#[test]
	fn common_terms_get_negative_weight() {
		let feature = TermFeature::new(900, 1, 1_000, 5);

		assert!(feature.relevance_weight() < 0.0);
		assert!(feature.offer_weight() < 0.0);
	}

	#[test]
	fn unseen_in_feedback_has_zero_offer_weight() {
		let feature = TermFeature::new(10, 0, 1_000, 5);

		assert_eq!(feature.offer_weight(), 0.0);
	}

	#[test]
	fn absent_term_has_zero_weights() {
		let set = set_of(&[("picture", TermFeature::new(50, 2, 1_000, 2))]);

		assert_eq!(set.relevance_weight("missing"), 0.0);
		assert_eq!(set.offer_weight("missing"), 0.0);
		assert!(set.relevance_weight("picture") > 0.0);
	}

	#[test]
	fn prune_keeps_highest_offer_weights() {
		let mut set = set_of(&[
			("a", TermFeature::new(10, 3, 1_000, 3)),
			("b", TermFeature::new(500, 1, 1_000, 3)),
			("c", TermFeature::new(20, 2, 1_000, 3)),
			("d", TermFeature::new(30, 0, 1_000, 3)),
		]);
		let expected: Vec<String> =
			set.ordered().into_iter().take(2).map(|(term, _)| term.to_string()).collect();

		set.prune_to_size(2);

		assert_eq!(set.len(), 2);

		for term in &expected {
			assert!(set.contains(term), "Missing {term} after pruning.");
		}

		assert_eq!(expected, vec!["a".to_string(), "c".to_string()]);
	}

	#[test]
	fn prune_to_larger_size_keeps_everything() {
		let mut set = set_of(&[
			("a", TermFeature::new(10, 3, 1_000, 3)),
			("b", TermFeature::new(500, 1, 1_000, 3)),
		]);

		set.prune_to_size(10);

		assert_eq!(set.len(), 2);
	}

	#[test]
	fn prune_is_idempotent() {
		let mut set = set_of(&[
			("a", TermFeature::new(10, 3, 1_000, 3)),
			("b", TermFeature::new(500, 1, 1_000, 3)),
			("c", TermFeature::new(20, 2, 1_000, 3)),
		]);

		set.prune_to_size(2);

		let first: Vec<(String, TermFeature)> =
			set.ordered().into_iter().map(|(term, feature)| (term.to_string(), *feature)).collect();

		set.prune_to_size(2);
		set.prune_to_size(5);

		let second: Vec<(String, TermFeature)> =
			set.ordered().into_iter().map(|(term, feature)| (term.to_string(), *feature)).collect();

		assert_eq!(first, second);
	}

	#[test]
	fn prune_to_zero_empties_the_set() {
		let mut set = set_of(&[("a", TermFeature::new(10, 3, 1_000, 3))]);

		set.prune_to_size(0);

		assert!(set.is_empty());
	}

	#[test]
	fn equal_offer_weights_break_ties_by_term() {
		let feature = TermFeature::new(10, 1, 1_000, 2);
		let mut set = set_of(&[("zeta", feature), ("alpha", feature), ("mu", feature)]);
		let order: Vec<&str> = set.ordered().into_iter().map(|(term, _)| term).collect();

		assert_eq!(order, vec!["alpha", "mu", "zeta"]);

		set.prune_to_size(2);

		assert!(set.contains("alpha"));
		assert!(set.contains("mu"));
		assert!(!set.contains("zeta"));
	}

	#[test]
	fn zero_offer_weights_tie_regardless_of_sign() {
		let set = set_of(&[
			("beta", TermFeature::new(5, 0, 1_000, 3)),
			("alpha", TermFeature::new(900, 0, 1_000, 3)),
		]);
		let order: Vec<&str> = set.ordered().into_iter().map(|(term, _)| term).collect();

		assert!(set.relevance_weight("alpha") < 0.0);
		assert!(set.relevance_weight("beta") > 0.0);
		assert_eq!(order, vec!["alpha", "beta"]);
	}

	#[test]
	fn inconsistent_statistics_sort_last() {
		// df_rel > df makes the log argument negative.
		let set = set_of(&[
			("broken", TermFeature::new(0, 3, 4, 3)),
			("fine", TermFeature::new(1, 1, 4, 3)),
		]);
		let order: Vec<&str> = set.ordered().into_iter().map(|(term, _)| term).collect();

		assert!(set.offer_weight("broken").is_nan());
		assert_eq!(order, vec!["fine", "broken"]);
	}
}
