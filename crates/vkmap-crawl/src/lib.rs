//! vkmap-crawl: Social graph crawler for the vkmap Neo4j store.
//!
//! Resolves a seed handle through the VK API, walks its followers and
//! subscriptions to a bounded depth, and merges every user, group and
//! relationship it sees into the graph. Also exports a single profile to a
//! JSON file without touching the graph.

pub mod api;
pub mod config;
mod dto;
pub mod error;
pub mod export;
pub mod fetch;
pub mod persist;
pub mod traversal;

pub use api::{ApiTransport, HttpTransport, Params};
pub use error::{CrawlError, FetchError};
pub use fetch::{Fetched, VkFetcher};
pub use persist::GraphSink;
pub use traversal::{CrawlOptions, CrawlStats, Crawler};
