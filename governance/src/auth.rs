//! The authorization seam.
//!
//! Proving that a caller controls an account is the host's business; the
//! engine only asks and trusts the answer.

use referendum_types::AccountName;

pub trait Authorizer {
    /// Whether `caller` may act with the authority of `required`.
    fn authorize(&self, caller: &AccountName, required: &AccountName) -> bool;
}

/// Grants authority only to the account itself. Used where the caller's
/// identity was already established upstream (e.g. the operator CLI).
#[derive(Clone, Copy, Debug, Default)]
pub struct SignerAuthorizer;

impl Authorizer for SignerAuthorizer {
    fn authorize(&self, caller: &AccountName, required: &AccountName) -> bool {
        caller == required
    }
}
