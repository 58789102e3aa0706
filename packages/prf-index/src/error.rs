pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Document {doc_id} is already indexed.")]
	DuplicateDocument { doc_id: String },
	#[error("Invalid document: {message}")]
	InvalidDocument { message: String },
}
