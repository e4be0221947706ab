use thiserror::Error;

/// Errors raised while building a [crate::Field2D].
/// These are setup-time mistakes, so nothing in the per-frame
/// query path ever returns them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("invalid tile size {width}x{height}")]
    InvalidTileSize { width: i32, height: i32 },
    #[error("grid data has {found} cells, expected {expected}")]
    DataLength { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors raised while decoding a textual map source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("map source is empty")]
    Empty,
    #[error("line {line}: expected {expected} cells, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}, column {column}: {token:?} is not a tile code")]
    BadToken {
        line: usize,
        column: usize,
        token: String,
    },
    #[error("line {line}, column {column}: no tile code for {ch:?}")]
    UnknownChar {
        line: usize,
        column: usize,
        ch: char,
    },
    #[error("malformed map definition: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("failed to encode map definition: {0}")]
    Encode(#[from] ron::Error),
    #[error(transparent)]
    Field(#[from] FieldError),
}
