//! Flat-file export of a single profile and its first-page neighbours.
//!
//! Independent of the graph store: resolves a handle, fetches the profile,
//! and, when the user has followers, writes the profile together with its
//! follower ids and subscriptions to a pretty-printed JSON file.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vkmap_core::{SubscriptionEntry, UserId, UserProfile};

use crate::api::ApiTransport;
use crate::error::{CrawlError, Result};
use crate::fetch::{Fetched, VkFetcher};

/// The exported document.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileExport {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub followers: Vec<UserId>,
    pub subscriptions: Vec<SubscriptionEntry>,
    pub fetched_at: DateTime<Utc>,
}

/// What an export run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The file was written.
    Written { followers: usize, subscriptions: usize },
    /// The user has no followers; nothing was written.
    NoFollowers,
}

/// Gather the export document for `handle`, or `None` if the user has no followers.
pub async fn collect_export<A: ApiTransport>(
    fetcher: &VkFetcher<A>,
    handle: &str,
) -> Result<Option<ProfileExport>> {
    let id = fetcher.resolve_identity(handle).await?;
    let profile = match fetcher.fetch_profile(id).await {
        Fetched::Found(profile) => profile,
        Fetched::Restricted => return Ok(None),
        Fetched::Transient(e) | Fetched::Failed(e) => return Err(CrawlError::Fetch(e)),
    };

    if profile.followers_count.unwrap_or(0) == 0 {
        return Ok(None);
    }

    let followers = fetcher.fetch_followers(id).await.or_empty();
    let subscriptions = fetcher.fetch_subscriptions(id).await.or_empty();

    Ok(Some(ProfileExport {
        profile,
        followers,
        subscriptions,
        fetched_at: Utc::now(),
    }))
}

/// Export `handle` to `output` as JSON.
pub async fn export_profile<A: ApiTransport>(
    fetcher: &VkFetcher<A>,
    handle: &str,
    output: &Path,
) -> Result<ExportOutcome> {
    let Some(export) = collect_export(fetcher, handle).await? else {
        tracing::info!(handle, "User has no followers, nothing exported");
        return Ok(ExportOutcome::NoFollowers);
    };

    write_json(&export, output)?;
    tracing::info!(
        handle,
        output = %output.display(),
        followers = export.followers.len(),
        subscriptions = export.subscriptions.len(),
        "Profile exported"
    );

    Ok(ExportOutcome::Written {
        followers: export.followers.len(),
        subscriptions: export.subscriptions.len(),
    })
}

fn write_json(export: &ProfileExport, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(output, json)?;
    Ok(())
}
