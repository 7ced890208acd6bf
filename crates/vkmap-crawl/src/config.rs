//! Configuration for the vkmap crawler.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`VKMAP__` prefix, `__` separator)
//! 2. Config file (`vkmap.toml` by default)
//! 3. Defaults
//!
//! The access token additionally falls back to `VK_ACCESS_TOKEN`.

use serde::Deserialize;
use vkmap_graph::GraphConfig;

use crate::error::{CrawlError, Result};

/// Environment variable consulted when no token is configured.
pub const ACCESS_TOKEN_ENV: &str = "VK_ACCESS_TOKEN";

/// Largest page the API hands out for followers and subscriptions.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vk: VkSettings,

    #[serde(default)]
    pub crawl: CrawlSettings,

    #[serde(default)]
    pub neo4j: GraphConfig,
}

/// Remote API access settings.
#[derive(Clone, Deserialize)]
pub struct VkSettings {
    /// Access credential sent with every call.
    #[serde(default)]
    pub access_token: String,

    /// Base endpoint; the method name is appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `v` parameter.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Items requested per follower/subscription page (at most 100).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl VkSettings {
    /// The configured page size clamped to what one API page can hold.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl std::fmt::Debug for VkSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = if self.access_token.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("VkSettings")
            .field("access_token", &token)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Traversal settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// Depth bound: nodes at this distance from the seed are written but not expanded.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Skip expanding a node that was already expanded on another path.
    #[serde(default)]
    pub dedupe: bool,
}

fn default_base_url() -> String {
    "https://api.vk.com/method/".to_string()
}

fn default_api_version() -> String {
    "5.131".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_max_depth() -> u32 {
    2
}

impl Default for VkSettings {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            dedupe: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from `<file_prefix>.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("VKMAP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CrawlError::Config(e.to_string()))?;

        let mut app: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| CrawlError::Config(e.to_string()))?;

        app.vk.access_token =
            resolve_token(&app.vk.access_token, std::env::var(ACCESS_TOKEN_ENV).ok());
        Ok(app)
    }
}

/// Prefer the configured token; otherwise use the legacy environment variable.
fn resolve_token(configured: &str, from_env: Option<String>) -> String {
    if configured.is_empty() {
        from_env.unwrap_or_default()
    } else {
        configured.to_string()
    }
}
