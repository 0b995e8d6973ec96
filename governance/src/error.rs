use referendum_store::StoreError;
use referendum_types::AccountName;
use thiserror::Error;

/// Every way a referendum action can be rejected. All of them abort the
/// action before anything is written.
#[derive(Debug, Error)]
pub enum ReferendumError {
    #[error("missing required authority of {0}")]
    Unauthorized(AccountName),

    #[error("referendum has not been initialized")]
    NotInitialized,

    #[error("voting has finished")]
    VotingClosed,

    #[error("user must stake before they can vote: {0}")]
    NotStaked(AccountName),

    #[error("vote side is invalid: {0}")]
    InvalidSide(u8),

    #[error("user has already voted: {0}")]
    AlreadyVoted(AccountName),

    #[error("user has not voted: {0}")]
    NotVoted(AccountName),

    #[error("invalid referendum parameters: {0}")]
    InvalidParams(String),

    #[error("a deferred action from {0} is already pending")]
    DeferredExists(AccountName),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
