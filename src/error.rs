use thiserror::Error;

/// Failures raised while laying out or serializing the paginated document.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no vocabulary words found")]
    NoVocabulary,
    #[error("card cannot fit on any page: {0}")]
    Unplaceable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum VocabDeckError {
    #[error("invalid lesson document: {0}")]
    InvalidLesson(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Every paginated-render failure is reported through this one variant.
    #[error("PDF generation failed: {0}")]
    Generation(#[source] LayoutError),
}

impl From<LayoutError> for VocabDeckError {
    fn from(value: LayoutError) -> Self {
        VocabDeckError::Generation(value)
    }
}
