use std::io;

use thiserror::Error;

use crate::classify::Category;

/// Reasons a line or unit is skipped. None of these stop a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("malformed line: {0}")]
    MalformedLine(&'static str),

    #[error("malformed unit: {0}")]
    MalformedUnit(&'static str),

    #[error("unrecognized grammar path ({0})")]
    UnrecognizedGrammarPath(Category),
}

/// Fatal decode failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read lexicon stream: {0}")]
    Io(#[from] io::Error),
}
