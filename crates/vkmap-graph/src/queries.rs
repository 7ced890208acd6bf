//! Read operations for inspecting what a crawl has written.
//!
//! The crawl itself is write-only; these queries back verification tooling
//! and the integration tests.

use neo4rs::query;

use vkmap_core::{EdgeLabel, NodeKind, NodeRef, UserId};

use crate::client::{GraphClient, GraphError};

/// A lightweight record returned from node queries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeRecord {
    pub id: i64,
    pub label: String,
    pub properties: serde_json::Value,
}

/// An outgoing edge of a user node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EdgeRecord {
    pub rel_type: String,
    pub source_id: i64,
    pub target_id: i64,
    pub target_label: String,
}

impl GraphClient {
    /// Get a node by kind and id.
    pub async fn get_node(&self, kind: NodeKind, id: i64) -> Result<NodeRecord, GraphError> {
        let label = kind.label();
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             RETURN n"
        );

        let q = query(&cypher).param("id", id);

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Ok(neo4j_node_to_record(&node, label))
            }
            None => Err(GraphError::NotFound {
                label: label.to_string(),
                id,
            }),
        }
    }

    /// Count nodes of a given kind carrying the given id (0 or 1 when keyed).
    pub async fn count_nodes(&self, kind: NodeKind, id: i64) -> Result<i64, GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{id: $id}})
             RETURN count(n) AS cnt",
            label = kind.label()
        );

        let q = query(&cypher).param("id", id);

        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Count edges of one type between a user and another node.
    pub async fn count_edges(
        &self,
        from: UserId,
        to: NodeRef,
        label: EdgeLabel,
    ) -> Result<i64, GraphError> {
        let cypher = format!(
            "MATCH (a:User {{id: $from_id}})-[r:{rel_type}]->(b:{to_label} {{id: $to_id}})
             RETURN count(r) AS cnt",
            rel_type = label.cypher(),
            to_label = to.kind.label()
        );

        let q = query(&cypher).param("from_id", from.0).param("to_id", to.id);

        match self.query_one(q).await? {
            Some(row) => Ok(row.get::<i64>("cnt").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// List all outgoing edges of a user.
    pub async fn outgoing_edges(&self, from: UserId) -> Result<Vec<EdgeRecord>, GraphError> {
        let q = query(
            "MATCH (a:User {id: $from_id})-[r]->(b)
             RETURN type(r) AS rel_type, b.id AS target_id, labels(b) AS labels
             ORDER BY rel_type, target_id",
        )
        .param("from_id", from.0);

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let rel_type: String = row.get("rel_type").unwrap_or_default();
            let target_id: i64 = row.get("target_id").unwrap_or_default();
            let labels: Vec<String> = row.get("labels").unwrap_or_default();
            results.push(EdgeRecord {
                rel_type,
                source_id: from.0,
                target_id,
                target_label: labels.first().cloned().unwrap_or_default(),
            });
        }
        Ok(results)
    }
}

/// Convert a neo4rs::Node to our lightweight NodeRecord.
fn neo4j_node_to_record(node: &neo4rs::Node, label: &str) -> NodeRecord {
    let id: i64 = node.get("id").unwrap_or_default();

    let mut props = serde_json::Map::new();
    for key in &["name", "screen_name", "home_town", "city"] {
        if let Ok(v) = node.get::<String>(key) {
            props.insert((*key).to_string(), serde_json::Value::String(v));
        }
    }
    for key in &["sex", "followers_count"] {
        if let Ok(v) = node.get::<i64>(key) {
            props.insert((*key).to_string(), serde_json::Value::from(v));
        }
    }

    NodeRecord {
        id,
        label: label.to_string(),
        properties: serde_json::Value::Object(props),
    }
}
