//! vkmap-graph: Neo4j client for the crawled social graph.
//!
//! This crate is the single mutation point for the Neo4j store. All writes
//! are MERGE statements keyed on the numeric identity, so re-crawling the
//! same part of the network converges instead of duplicating nodes.

pub mod client;
pub mod mutations;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
