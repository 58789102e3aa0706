use unicode_segmentation::UnicodeSegmentation;

use prf_rerank::Tokenizer;

/// Unicode word segmentation followed by lowercasing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Analyzer;
impl Analyzer {
	pub fn new() -> Self {
		Self
	}

	pub fn analyze(&self, text: &str) -> Vec<String> {
		text.unicode_words().map(str::to_lowercase).collect()
	}
}
impl Tokenizer for Analyzer {
	fn tokenize(&self, text: &str) -> Vec<String> {
		self.analyze(text)
	}
}
