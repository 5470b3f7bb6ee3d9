use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResumeError {
    #[error("Empty file content")]
    Empty,

    #[error("No filename provided")]
    MissingFilename,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text from file")]
    NoText,
}
