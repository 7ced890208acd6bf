//! Core domain types for the vkmap social graph.
//!
//! These types represent nodes and edges of the crawled network: users and
//! groups keyed by their numeric identity, and the two relationship kinds
//! recorded between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VkmapError;

// ── Identities ────────────────────────────────────────────────────

/// Numeric identity of a user. Immutable primary key of a `:User` node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Validate a raw identity taken from a remote record.
    pub fn new(raw: i64) -> Result<Self, VkmapError> {
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(VkmapError::InvalidIdentity(raw))
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Node Types ────────────────────────────────────────────────────

/// The two node labels stored in the graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    User,
    Group,
}

impl NodeKind {
    /// Neo4j label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
        }
    }
}

/// A reference to a node by kind and numeric identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: i64,
}

impl NodeRef {
    pub fn user(id: UserId) -> Self {
        Self {
            kind: NodeKind::User,
            id: id.0,
        }
    }

    pub fn group(id: i64) -> Self {
        Self {
            kind: NodeKind::Group,
            id,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.label(), self.id)
    }
}

/// Sex code as reported by the remote API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Unspecified,
    Female,
    Male,
}

impl Sex {
    /// Map the API's numeric code (1 female, 2 male). Anything else is unspecified.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Female,
            2 => Self::Male,
            _ => Self::Unspecified,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Unspecified => 0,
            Self::Female => 1,
            Self::Male => 2,
        }
    }
}

/// Profile attributes of a user, as fetched from the remote API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    /// Display name: first and last name joined by a space.
    pub name: String,
    /// Human-readable handle.
    pub screen_name: Option<String>,
    pub sex: Option<Sex>,
    pub home_town: Option<String>,
    /// City title.
    pub city: Option<String>,
    pub followers_count: Option<u64>,
}

/// A group (community, public page or event).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupProfile {
    pub id: i64,
    pub name: String,
    pub screen_name: Option<String>,
}

/// What a subscription points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    Profile,
    Group,
}

impl SubscriptionKind {
    /// Classify the API's `type` field. Pages, groups and events are all groups.
    pub fn from_api_type(raw: &str) -> Result<Self, VkmapError> {
        match raw {
            "profile" => Ok(Self::Profile),
            "page" | "group" | "event" => Ok(Self::Group),
            other => Err(VkmapError::UnknownSubscriptionType(other.to_string())),
        }
    }
}

/// One entry of a user's subscription list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionEntry {
    pub id: i64,
    /// Display name for profiles, group name for groups.
    pub name: String,
    pub screen_name: Option<String>,
    pub kind: SubscriptionKind,
}

impl SubscriptionEntry {
    /// The graph node this subscription points at.
    pub fn target(&self) -> NodeRef {
        match self.kind {
            SubscriptionKind::Profile => NodeRef {
                kind: NodeKind::User,
                id: self.id,
            },
            SubscriptionKind::Group => NodeRef::group(self.id),
        }
    }
}

// ── Edge Types ────────────────────────────────────────────────────

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeLabel {
    /// Origin subscribes to the target (user or group).
    SubscribedTo,
    /// Target is a follower of the origin.
    Follow,
}

impl EdgeLabel {
    /// Cypher relationship type string.
    pub fn cypher(&self) -> &'static str {
        match self {
            Self::SubscribedTo => "SUBSCRIBED_TO",
            Self::Follow => "FOLLOW",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cypher())
    }
}
