//! vkmap-core: Shared types and error handling for the vkmap crawler.
//!
//! This crate provides the foundational types used across all vkmap components:
//! - Identities and profile records for the two node kinds (User, Group)
//! - Subscription entries as returned by the remote API, tagged by kind
//! - Edge labels for graph relationships (SUBSCRIBED_TO, FOLLOW)
//! - Common error types

pub mod error;
pub mod types;

pub use error::VkmapError;
pub use types::{
    EdgeLabel, GroupProfile, NodeKind, NodeRef, Sex, SubscriptionEntry, SubscriptionKind, UserId,
    UserProfile,
};
