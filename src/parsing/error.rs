use thiserror::Error;

pub type PResult<T> = Result<T, ParsingError>;

/// Line-level failures. They are recovered where they occur and only surface through edits.
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("Unparseable time token: {0:?}")]
    UnparseableTimeToken(String),
}
