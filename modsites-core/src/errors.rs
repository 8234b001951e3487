use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// A record violates a structural invariant. The record is rejected as a whole.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Malformed input at line {line} of {source_name}: {reason}")]
    MalformedLine {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Corrupted file. 0 sites found in the file: {0}")]
    EmptySiteSet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
