use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
	#[serde(default)]
	pub service: Service,
	pub bm25: Bm25,
	pub prf: Prf,
	pub search: Search,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: default_log_level() }
	}
}

/// Parameters of the first-pass BM25 scorer.
///
/// The feedback stage reads them back from the active scorer but never applies them to the
/// expanded query.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Bm25 {
	pub k1: f32,
	pub b: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Prf {
	/// Indexed field mined for feedback terms and scored against by the expanded query.
	pub field: String,
	/// Number of top-ranked documents treated as pseudo-relevant.
	pub fb_docs: u32,
	/// Number of terms kept after pruning.
	pub fb_terms: u32,
	/// Log the original and expanded queries before the expanded search runs.
	#[serde(default)]
	pub output_query: bool,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Search {
	pub hits: u32,
}

fn default_log_level() -> String {
	"info".to_string()
}
