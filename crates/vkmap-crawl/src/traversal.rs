//! Traversal Driver: bounded breadth-first crawl from a seed handle.
//!
//! The crawl is a FIFO worklist of `(identity, depth)`. Expanding a node
//! writes its profile, its subscriptions (with `SUBSCRIBED_TO` edges) and its
//! followers (with `FOLLOW` edges), then enqueues each follower one level
//! deeper. Nodes at `max_depth` are written as someone's follower but never
//! expanded. Requests and writes are issued one at a time, in order.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use uuid::Uuid;
use vkmap_core::{
    EdgeLabel, GroupProfile, NodeRef, SubscriptionEntry, SubscriptionKind, UserId, UserProfile,
};
use vkmap_graph::GraphError;

use crate::api::ApiTransport;
use crate::config::CrawlSettings;
use crate::error::Result;
use crate::fetch::{Fetched, VkFetcher};
use crate::persist::GraphSink;

/// Knobs for a single crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Nodes at this many hops from the seed are not expanded.
    pub max_depth: u32,
    /// Expand each identity at most once. Off by default: a node reachable
    /// over two paths is expanded, and its writes re-issued, twice.
    pub dedupe: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            dedupe: false,
        }
    }
}

impl From<&CrawlSettings> for CrawlOptions {
    fn from(settings: &CrawlSettings) -> Self {
        Self {
            max_depth: settings.max_depth,
            dedupe: settings.dedupe,
        }
    }
}

/// Counters reported at the end of a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub seed: Option<UserId>,
    pub nodes_expanded: usize,
    pub users_written: usize,
    pub groups_written: usize,
    pub edges_written: usize,
    pub restricted: usize,
    pub transient_failures: usize,
    pub failed_fetches: usize,
    pub write_failures: usize,
}

/// Walks the remote graph and mirrors it into a [`GraphSink`].
pub struct Crawler<A, S> {
    fetcher: VkFetcher<A>,
    sink: S,
    options: CrawlOptions,
}

impl<A: ApiTransport, S: GraphSink> Crawler<A, S> {
    pub fn new(fetcher: VkFetcher<A>, sink: S, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            sink,
            options,
        }
    }

    pub fn fetcher(&self) -> &VkFetcher<A> {
        &self.fetcher
    }

    /// Resolve `seed_handle` and crawl outward from it.
    ///
    /// Fails only if the seed cannot be resolved; every later failure is
    /// logged, counted, and skipped.
    pub async fn crawl(&self, seed_handle: &str) -> Result<CrawlStats> {
        let crawl_id = Uuid::new_v4();
        let seed = self.fetcher.resolve_identity(seed_handle).await?;
        tracing::info!(
            crawl_id = %crawl_id,
            seed_handle,
            seed = %seed,
            max_depth = self.options.max_depth,
            dedupe = self.options.dedupe,
            "Starting crawl"
        );

        let stats = self.crawl_from(seed).await;

        tracing::info!(
            crawl_id = %crawl_id,
            seed = %seed,
            nodes_expanded = stats.nodes_expanded,
            users = stats.users_written,
            groups = stats.groups_written,
            edges = stats.edges_written,
            restricted = stats.restricted,
            transient = stats.transient_failures,
            failed = stats.failed_fetches,
            write_failures = stats.write_failures,
            "Crawl complete"
        );
        Ok(stats)
    }

    /// Crawl outward from an already-resolved identity.
    pub async fn crawl_from(&self, seed: UserId) -> CrawlStats {
        let mut stats = CrawlStats {
            seed: Some(seed),
            ..Default::default()
        };
        let mut queue = VecDeque::from([(seed, 0u32)]);
        let mut expanded = HashSet::new();

        while let Some((id, depth)) = queue.pop_front() {
            if depth >= self.options.max_depth {
                continue;
            }
            if self.options.dedupe && !expanded.insert(id) {
                tracing::debug!(user_id = %id, depth, "Already expanded, skipping");
                continue;
            }

            for follower in self.expand(id, depth, &mut stats).await {
                queue.push_back((follower, depth + 1));
            }
        }

        stats
    }

    /// Write one node and its neighbourhood; return the followers to visit next.
    async fn expand(&self, id: UserId, depth: u32, stats: &mut CrawlStats) -> Vec<UserId> {
        stats.nodes_expanded += 1;
        tracing::debug!(user_id = %id, depth, "Expanding node");

        if let Some(profile) = self.profile(id, stats).await {
            self.write_user(&profile, stats).await;
        }

        let fetched = self.fetcher.fetch_subscriptions(id).await;
        let subscriptions = self
            .settle(id, "subscriptions", fetched, stats)
            .unwrap_or_default();
        for entry in &subscriptions {
            self.write_subscription(id, entry, stats).await;
        }

        let fetched = self.fetcher.fetch_followers(id).await;
        let followers = self
            .settle(id, "followers", fetched, stats)
            .unwrap_or_default();
        for &follower in &followers {
            if let Some(profile) = self.profile(follower, stats).await {
                self.write_user(&profile, stats).await;
            }
            self.write_edge(id, NodeRef::user(follower), EdgeLabel::Follow, stats)
                .await;
        }

        tracing::debug!(
            user_id = %id,
            depth,
            subscriptions = subscriptions.len(),
            followers = followers.len(),
            "Node expanded"
        );
        followers
    }

    async fn profile(&self, id: UserId, stats: &mut CrawlStats) -> Option<UserProfile> {
        let fetched = self.fetcher.fetch_profile(id).await;
        self.settle(id, "profile", fetched, stats)
    }

    /// Count and log a fetch that came back without data; pass data through.
    fn settle<T>(
        &self,
        id: UserId,
        what: &'static str,
        fetched: Fetched<T>,
        stats: &mut CrawlStats,
    ) -> Option<T> {
        match fetched {
            Fetched::Found(value) => Some(value),
            Fetched::Restricted => {
                stats.restricted += 1;
                tracing::info!(user_id = %id, what, "Profile is private, no data");
                None
            }
            Fetched::Transient(e) => {
                stats.transient_failures += 1;
                tracing::warn!(
                    user_id = %id,
                    what,
                    error = %e,
                    "Transient fetch failure, skipping"
                );
                None
            }
            Fetched::Failed(e) => {
                stats.failed_fetches += 1;
                tracing::warn!(user_id = %id, what, error = %e, "Fetch failed, skipping");
                None
            }
        }
    }

    async fn write_user(&self, profile: &UserProfile, stats: &mut CrawlStats) {
        let result = self.sink.upsert_user(profile).await;
        record_write(result, stats, &NodeRef::user(profile.id), |s| {
            s.users_written += 1;
        });
    }

    async fn write_subscription(
        &self,
        from: UserId,
        entry: &SubscriptionEntry,
        stats: &mut CrawlStats,
    ) {
        let target = entry.target();
        match entry.kind {
            SubscriptionKind::Profile => {
                let result = self
                    .sink
                    .upsert_user_summary(
                        UserId(entry.id),
                        &entry.name,
                        entry.screen_name.as_deref(),
                    )
                    .await;
                record_write(result, stats, &target, |s| s.users_written += 1);
            }
            SubscriptionKind::Group => {
                let group = GroupProfile {
                    id: entry.id,
                    name: entry.name.clone(),
                    screen_name: entry.screen_name.clone(),
                };
                let result = self.sink.upsert_group(&group).await;
                record_write(result, stats, &target, |s| s.groups_written += 1);
            }
        }
        self.write_edge(from, target, EdgeLabel::SubscribedTo, stats)
            .await;
    }

    async fn write_edge(
        &self,
        from: UserId,
        to: NodeRef,
        label: EdgeLabel,
        stats: &mut CrawlStats,
    ) {
        let result = self.sink.upsert_edge(from, to, label).await;
        record_write(result, stats, &to, |s| s.edges_written += 1);
    }
}

fn record_write(
    result: std::result::Result<(), GraphError>,
    stats: &mut CrawlStats,
    node: &NodeRef,
    on_success: impl FnOnce(&mut CrawlStats),
) {
    match result {
        Ok(()) => on_success(stats),
        Err(e) => {
            stats.write_failures += 1;
            tracing::warn!(node = %node, error = %e, "Graph write failed");
        }
    }
}
