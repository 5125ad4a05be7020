use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid front matter in '{document}': {message}")]
    FrontMatter { document: String, message: String },

    #[error("Schema error in '{document}', field '{field}': {message}")]
    Schema {
        document: String,
        field: String,
        message: String,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Duplicate slug '{slug}' in '{document}'")]
    DuplicateSlug { slug: String, document: String },

    #[error("Build failed: {0}")]
    Build(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl AppError {
    /// Build a schema error for `field` of `document`.
    pub fn schema(
        document: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AppError::Schema {
            document: document.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}
