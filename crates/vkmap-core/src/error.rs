use thiserror::Error;

/// Validation errors raised when remote records are turned into domain types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VkmapError {
    #[error("Invalid identity: {0} (identities must be positive)")]
    InvalidIdentity(i64),

    #[error("Unknown subscription type: {0}")]
    UnknownSubscriptionType(String),
}
