//! Errors raised while constructing the fundamental types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid account name: {0:?}")]
    InvalidAccountName(String),

    #[error("vote side is invalid: {0}")]
    InvalidSide(u8),
}
