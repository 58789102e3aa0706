pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Term vector unavailable for document {doc_id} in field {field}: {message}")]
	TermVectorUnavailable { doc_id: String, field: String, message: String },
	#[error("Search execution failed: {message}")]
	SearchExecution { message: String },
	#[error("Invalid scoring configuration: {message}")]
	InvalidScoringConfiguration { message: String },
	#[error(transparent)]
	Config(#[from] prf_config::Error),
}
