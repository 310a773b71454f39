use thiserror::Error;

/// Problems with the issue document, reported once at load time.
#[derive(Debug, Error)]
pub enum DataError {
	#[error("Malformed issue document: {0}")]
	Malformed(#[from] serde_json::Error),

	#[error("Issue text must not be empty")]
	EmptyIssue,

	#[error("Category #{0} has an empty name")]
	EmptyCategoryName(usize),

	#[error("Category '{0}' appears more than once")]
	DuplicateCategory(String),
}

/// The canvas backend could not be brought up.
#[derive(Debug, Error)]
pub enum RenderError {
	#[error("No browser window available")]
	NoWindow,

	#[error("2d context unavailable: {0}")]
	Context(String),

	#[error("Browser call failed: {0}")]
	Browser(String),
}
