//! Graph Persister: the write seam between the crawler and the graph store.
//!
//! Every operation merges by key, so re-issuing a write for a node reached on
//! a second path is harmless.

use async_trait::async_trait;
use vkmap_core::{EdgeLabel, GroupProfile, NodeRef, UserId, UserProfile};
use vkmap_graph::{GraphClient, GraphError};

/// Idempotent writes the crawler issues.
#[async_trait]
pub trait GraphSink: Send + Sync {
    /// Create or overwrite a user with its full profile.
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), GraphError>;

    /// Create a user or overwrite only its name and handle.
    async fn upsert_user_summary(
        &self,
        id: UserId,
        name: &str,
        screen_name: Option<&str>,
    ) -> Result<(), GraphError>;

    /// Create or overwrite a group.
    async fn upsert_group(&self, group: &GroupProfile) -> Result<(), GraphError>;

    /// Ensure exactly one `label` edge from `from` to `to`, creating a stub
    /// target if needed.
    async fn upsert_edge(&self, from: UserId, to: NodeRef, label: EdgeLabel)
        -> Result<(), GraphError>;
}

#[async_trait]
impl GraphSink for GraphClient {
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), GraphError> {
        GraphClient::upsert_user(self, user).await
    }

    async fn upsert_user_summary(
        &self,
        id: UserId,
        name: &str,
        screen_name: Option<&str>,
    ) -> Result<(), GraphError> {
        GraphClient::upsert_user_summary(self, id, name, screen_name).await
    }

    async fn upsert_group(&self, group: &GroupProfile) -> Result<(), GraphError> {
        GraphClient::upsert_group(self, group).await
    }

    async fn upsert_edge(
        &self,
        from: UserId,
        to: NodeRef,
        label: EdgeLabel,
    ) -> Result<(), GraphError> {
        GraphClient::upsert_edge(self, from, to, label).await
    }
}

#[async_trait]
impl<S: GraphSink + ?Sized> GraphSink for &S {
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), GraphError> {
        (**self).upsert_user(user).await
    }

    async fn upsert_user_summary(
        &self,
        id: UserId,
        name: &str,
        screen_name: Option<&str>,
    ) -> Result<(), GraphError> {
        (**self).upsert_user_summary(id, name, screen_name).await
    }

    async fn upsert_group(&self, group: &GroupProfile) -> Result<(), GraphError> {
        (**self).upsert_group(group).await
    }

    async fn upsert_edge(
        &self,
        from: UserId,
        to: NodeRef,
        label: EdgeLabel,
    ) -> Result<(), GraphError> {
        (**self).upsert_edge(from, to, label).await
    }
}
