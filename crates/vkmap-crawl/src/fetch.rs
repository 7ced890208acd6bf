//! Graph Fetcher: typed reads of profiles, followers and subscriptions.
//!
//! Every neighbour lookup returns a [`Fetched`] so the caller decides what a
//! private profile or a timed-out call means for the traversal. Only handle
//! resolution returns a hard error.

use vkmap_core::{SubscriptionEntry, UserId, UserProfile};

use crate::api::{ApiTransport, Params};
use crate::config::MAX_PAGE_SIZE;
use crate::dto::{
    from_payload, FollowersPageDto, SubscriptionItemDto, SubscriptionsPageDto, UserDto,
};
use crate::error::{CrawlError, FetchError, Result, CODE_INVALID_USER_ID};

/// Profile fields requested from `users.get`.
const PROFILE_FIELDS: &str = "screen_name,sex,home_town,city,followers_count";

/// Outcome of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// The call succeeded.
    Found(T),
    /// The profile is private; no data is available.
    Restricted,
    /// A condition that may clear up later (timeout, network, rate limit).
    Transient(FetchError),
    /// Any other failure of this call.
    Failed(FetchError),
}

impl<T> Fetched<T> {
    /// Classify a call result.
    fn from_result(result: std::result::Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Found(value),
            Err(e) if e.is_restricted() => Self::Restricted,
            Err(e) if e.is_transient() => Self::Transient(e),
            Err(e) => Self::Failed(e),
        }
    }

    /// The fetched value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// Degrade anything but success to an empty value.
    pub fn or_empty(self) -> T {
        self.found().unwrap_or_default()
    }
}

/// Reads the remote graph through an [`ApiTransport`].
pub struct VkFetcher<A> {
    api: A,
    page_size: u32,
}

impl<A: ApiTransport> VkFetcher<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Request fewer than a full page of neighbours per call.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &A {
        &self.api
    }

    /// Translate a handle into a numeric identity.
    pub async fn resolve_identity(&self, handle: &str) -> Result<UserId> {
        let params: Params = vec![("user_ids", handle.to_string())];
        let payload = match self.api.call("users.get", &params).await {
            Ok(payload) => payload,
            Err(FetchError::Api { code, .. }) if code == CODE_INVALID_USER_ID => {
                return Err(CrawlError::Resolution {
                    handle: handle.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let users: Vec<UserDto> = from_payload(payload)?;
        let first = users.into_iter().next().ok_or_else(|| CrawlError::Resolution {
            handle: handle.to_string(),
        })?;
        UserId::new(first.id).map_err(|_| CrawlError::Resolution {
            handle: handle.to_string(),
        })
    }

    /// Fetch a user's profile attributes.
    pub async fn fetch_profile(&self, id: UserId) -> Fetched<UserProfile> {
        Fetched::from_result(self.try_profile(id).await)
    }

    /// Fetch the first page of a user's followers.
    pub async fn fetch_followers(&self, id: UserId) -> Fetched<Vec<UserId>> {
        Fetched::from_result(self.try_followers(id).await)
    }

    /// Fetch the first page of a user's subscriptions (users and groups).
    pub async fn fetch_subscriptions(&self, id: UserId) -> Fetched<Vec<SubscriptionEntry>> {
        Fetched::from_result(self.try_subscriptions(id).await)
    }

    async fn try_profile(&self, id: UserId) -> std::result::Result<UserProfile, FetchError> {
        let params: Params = vec![
            ("user_ids", id.to_string()),
            ("fields", PROFILE_FIELDS.to_string()),
        ];
        let payload = self.api.call("users.get", &params).await?;
        let users: Vec<UserDto> = from_payload(payload)?;
        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::Decode(format!("users.get returned no profile for {id}")))?;
        user.into_domain()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn try_followers(&self, id: UserId) -> std::result::Result<Vec<UserId>, FetchError> {
        let params: Params = vec![
            ("user_id", id.to_string()),
            ("count", self.page_size.to_string()),
        ];
        let payload = self.api.call("users.getFollowers", &params).await?;
        let page: FollowersPageDto = from_payload(payload)?;
        Ok(page
            .items
            .into_iter()
            .take(self.page_size as usize)
            .filter_map(|raw| match UserId::new(raw) {
                Ok(follower) => Some(follower),
                Err(e) => {
                    tracing::warn!(user_id = %id, error = %e, "Skipping follower");
                    None
                }
            })
            .collect())
    }

    async fn try_subscriptions(
        &self,
        id: UserId,
    ) -> std::result::Result<Vec<SubscriptionEntry>, FetchError> {
        let params: Params = vec![
            ("user_id", id.to_string()),
            ("extended", "1".to_string()),
            ("count", self.page_size.to_string()),
        ];
        let payload = self.api.call("users.getSubscriptions", &params).await?;
        let page: SubscriptionsPageDto = from_payload(payload)?;
        Ok(page
            .items
            .into_iter()
            .take(self.page_size as usize)
            .filter_map(|raw| decode_subscription(id, raw))
            .collect())
    }
}

/// Decode one subscription item, skipping (with a warning) what doesn't fit.
fn decode_subscription(owner: UserId, raw: serde_json::Value) -> Option<SubscriptionEntry> {
    let decoded = serde_json::from_value::<SubscriptionItemDto>(raw)
        .map_err(|e| e.to_string())
        .and_then(|dto| dto.into_domain().map_err(|e| e.to_string()));
    match decoded {
        Ok(entry) => Some(entry),
        Err(error) => {
            tracing::warn!(user_id = %owner, %error, "Skipping subscription item");
            None
        }
    }
}
