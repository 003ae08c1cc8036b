//! Error types for reading and writing CoNLL-U.

use layered_treex::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConlluError {
    /// A token line could not be understood.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The file could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Building or reading the trees failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

pub type ConlluResult<T> = Result<T, ConlluError>;
