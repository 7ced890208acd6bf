//! Write operations for the social graph.
//!
//! All mutations use MERGE (upsert) semantics so a node or edge reached more
//! than once during a crawl converges to a single entity. Nodes are
//! identified by (label, id). Attributes follow last-write-wins.

use neo4rs::query;

use vkmap_core::{EdgeLabel, GroupProfile, NodeRef, UserId, UserProfile};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    // ── Node Upserts ─────────────────────────────────────────────

    /// Upsert a User node with its full profile attributes.
    pub async fn upsert_user(&self, user: &UserProfile) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:User {id: $id})
             SET n.name = $name, n.screen_name = $screen_name, n.sex = $sex,
                 n.home_town = $home_town, n.city = $city,
                 n.followers_count = $followers_count",
        )
        .param("id", user.id.0)
        .param("name", user.name.clone())
        .param("screen_name", opt_string(&user.screen_name))
        .param("sex", user.sex.map(|s| s.code()).unwrap_or(0))
        .param("home_town", opt_string(&user.home_town))
        .param("city", opt_string(&user.city))
        .param("followers_count", opt_count(user.followers_count));

        self.run(q).await
    }

    /// Upsert a User node touching only its name and handle.
    ///
    /// Used when a user is known only from someone's subscription list, so
    /// that attributes fetched from a full profile are left intact.
    pub async fn upsert_user_summary(
        &self,
        id: UserId,
        name: &str,
        screen_name: Option<&str>,
    ) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:User {id: $id})
             SET n.name = $name, n.screen_name = $screen_name",
        )
        .param("id", id.0)
        .param("name", name.to_string())
        .param("screen_name", screen_name.unwrap_or_default().to_string());

        self.run(q).await
    }

    /// Upsert a Group node.
    pub async fn upsert_group(&self, group: &GroupProfile) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:Group {id: $id})
             SET n.name = $name, n.screen_name = $screen_name",
        )
        .param("id", group.id)
        .param("name", group.name.clone())
        .param("screen_name", opt_string(&group.screen_name));

        self.run(q).await
    }

    // ── Edge Upserts ─────────────────────────────────────────────

    /// Upsert a directed edge from a user to another node.
    ///
    /// Both endpoints are merged in the same statement; a target that was
    /// never upserted with attributes is created as a stub holding only `id`.
    /// Merging the relationship guarantees at most one edge per
    /// (from, to, label).
    pub async fn upsert_edge(
        &self,
        from: UserId,
        to: NodeRef,
        label: EdgeLabel,
    ) -> Result<(), GraphError> {
        let cypher = edge_cypher(to, label);
        let q = query(&cypher).param("from_id", from.0).param("to_id", to.id);

        self.run(q).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build the MERGE statement for an edge. Labels and relationship types
/// come from closed enums, never from input.
fn edge_cypher(to: NodeRef, label: EdgeLabel) -> String {
    let to_label = to.kind.label();
    let rel_type = label.cypher();
    format!(
        "MERGE (a:User {{id: $from_id}})
         MERGE (b:{to_label} {{id: $to_id}})
         MERGE (a)-[:{rel_type}]->(b)"
    )
}

fn opt_string(opt: &Option<String>) -> String {
    opt.clone().unwrap_or_default()
}

fn opt_count(opt: Option<u64>) -> i64 {
    opt.and_then(|c| i64::try_from(c).ok()).unwrap_or(0)
}
