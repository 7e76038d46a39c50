use thiserror::Error;

/// Errors raised by the hash kernel.
///
/// All of them describe caller mistakes. Nothing here is transient, so
/// none of them are worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The resolved argument type has no hashing routine.
    #[error("Function {function} hasn't supported type {data_type}")]
    NotImplemented {
        function: &'static str,
        data_type: String,
    },

    /// The declared argument type does not match its physical column.
    #[error("Illegal column {column} of argument of function {function}")]
    IllegalColumn {
        function: &'static str,
        column: String,
    },

    /// An argument column is not as long as the batch.
    #[error(
        "Argument column '{column}' size {size} doesn't match result column size {expected} of function {function}"
    )]
    SizeMismatch {
        function: &'static str,
        column: String,
        size: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, HashError>;
