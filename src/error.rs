use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// A required collaborator or argument was missing or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The map text could not be parsed.
    #[error("malformed map at line {line}: {message}")]
    MapFormat { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
