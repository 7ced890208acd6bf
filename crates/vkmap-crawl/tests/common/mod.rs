//! In-memory stand-ins for the remote API and the graph store.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use vkmap_core::{EdgeLabel, GroupProfile, NodeKind, NodeRef, UserId, UserProfile};
use vkmap_crawl::{ApiTransport, FetchError, GraphSink, Params};
use vkmap_graph::GraphError;

// ── Scripted API ─────────────────────────────────────────────────

/// A scripted VK API. Unknown numeric ids get a generated profile and no
/// neighbours; unknown handles fail with error 113.
#[derive(Default)]
pub struct FakeVk {
    handles: HashMap<String, i64>,
    users: HashMap<i64, Value>,
    followers: HashMap<i64, Vec<i64>>,
    subscriptions: HashMap<i64, Vec<Value>>,
    restricted: HashSet<i64>,
    timeouts: HashSet<i64>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeVk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(mut self, handle: &str, id: i64) -> Self {
        self.handles.insert(handle.to_string(), id);
        self
    }

    pub fn user(mut self, id: i64, first_name: &str, last_name: &str) -> Self {
        self.users.insert(
            id,
            json!({
                "id": id,
                "first_name": first_name,
                "last_name": last_name,
                "screen_name": format!("id{id}"),
                "sex": 1,
                "city": {"id": 1, "title": "Moscow"},
                "followers_count": self.followers.get(&id).map_or(0, Vec::len),
            }),
        );
        self
    }

    pub fn user_json(mut self, id: i64, value: Value) -> Self {
        self.users.insert(id, value);
        self
    }

    pub fn followers(mut self, id: i64, followers: &[i64]) -> Self {
        self.followers.insert(id, followers.to_vec());
        self
    }

    pub fn group_subscription(mut self, id: i64, group_id: i64, name: &str) -> Self {
        self.subscriptions.entry(id).or_default().push(json!({
            "id": group_id,
            "type": "page",
            "name": name,
            "screen_name": format!("club{group_id}"),
        }));
        self
    }

    pub fn profile_subscription(mut self, id: i64, target: i64, first: &str, last: &str) -> Self {
        self.subscriptions.entry(id).or_default().push(json!({
            "id": target,
            "type": "profile",
            "first_name": first,
            "last_name": last,
            "screen_name": format!("id{target}"),
        }));
        self
    }

    /// Followers and subscriptions of `id` fail with error 30.
    pub fn restrict(mut self, id: i64) -> Self {
        self.restricted.insert(id);
        self
    }

    /// Every call about `id` times out.
    pub fn time_out(mut self, id: i64) -> Self {
        self.timeouts.insert(id);
        self
    }

    /// Number of calls to `method` that targeted `target`.
    pub fn calls_to(&self, method: &str, target: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, t)| m == method && t == target)
            .count()
    }

    /// Targets of every call to `method`, in call order.
    pub fn targets(&self, method: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, t)| t.clone())
            .collect()
    }

    fn profile_of(&self, id: i64) -> Value {
        self.users.get(&id).cloned().unwrap_or_else(|| {
            json!({
                "id": id,
                "first_name": "User",
                "last_name": id.to_string(),
                "followers_count": self.followers.get(&id).map_or(0, Vec::len),
            })
        })
    }

    fn guard(&self, id: i64, neighbours: bool) -> Result<(), FetchError> {
        if self.timeouts.contains(&id) {
            return Err(FetchError::Timeout("operation timed out".to_string()));
        }
        if neighbours && self.restricted.contains(&id) {
            return Err(FetchError::Api {
                code: 30,
                message: "This profile is private".to_string(),
            });
        }
        Ok(())
    }
}

fn param<'a>(params: &'a Params, key: &str) -> &'a str {
    params
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or_default()
}

#[async_trait]
impl ApiTransport for FakeVk {
    async fn call(&self, method: &str, params: &Params) -> Result<Value, FetchError> {
        let target = match method {
            "users.get" => param(params, "user_ids"),
            _ => param(params, "user_id"),
        };
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), target.to_string()));

        let id = match target.parse::<i64>() {
            Ok(id) => id,
            Err(_) => match self.handles.get(target) {
                Some(&id) => id,
                None => {
                    return Err(FetchError::Api {
                        code: 113,
                        message: "Invalid user id".to_string(),
                    })
                }
            },
        };

        match method {
            "users.get" => {
                self.guard(id, false)?;
                Ok(json!([self.profile_of(id)]))
            }
            "users.getFollowers" => {
                self.guard(id, true)?;
                let items = self.followers.get(&id).cloned().unwrap_or_default();
                Ok(json!({"count": items.len(), "items": items}))
            }
            "users.getSubscriptions" => {
                self.guard(id, true)?;
                let items = self.subscriptions.get(&id).cloned().unwrap_or_default();
                Ok(json!({"count": items.len(), "items": items}))
            }
            other => Err(FetchError::Api {
                code: 3,
                message: format!("Unknown method passed: {other}"),
            }),
        }
    }
}

// ── Merge-by-key graph ───────────────────────────────────────────

/// Snapshot of everything written, comparable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphState {
    pub users: BTreeMap<i64, UserProfile>,
    pub groups: BTreeMap<i64, GroupProfile>,
    /// (from, target label, to, relationship type)
    pub edges: BTreeSet<(i64, &'static str, i64, &'static str)>,
}

/// A graph sink with the same merge semantics as the Cypher statements.
#[derive(Default)]
pub struct MemoryGraph {
    state: Mutex<GraphState>,
    fail_writes: bool,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> GraphState {
        self.state.lock().unwrap().clone()
    }

    pub fn user(&self, id: i64) -> Option<UserProfile> {
        self.state.lock().unwrap().users.get(&id).cloned()
    }

    pub fn group(&self, id: i64) -> Option<GroupProfile> {
        self.state.lock().unwrap().groups.get(&id).cloned()
    }

    pub fn has_edge(&self, from: i64, to: NodeRef, label: EdgeLabel) -> bool {
        self.state
            .lock()
            .unwrap()
            .edges
            .contains(&(from, to.kind.label(), to.id, label.cypher()))
    }

    /// Edges of `label` leaving `from`.
    pub fn edges_from(&self, from: i64, label: EdgeLabel) -> Vec<i64> {
        self.state
            .lock()
            .unwrap()
            .edges
            .iter()
            .filter(|(f, _, _, l)| *f == from && *l == label.cypher())
            .map(|(_, _, to, _)| *to)
            .collect()
    }

    fn check(&self) -> Result<(), GraphError> {
        if self.fail_writes {
            Err(GraphError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

fn stub(id: i64) -> UserProfile {
    UserProfile {
        id: UserId(id),
        name: String::new(),
        screen_name: None,
        sex: None,
        home_town: None,
        city: None,
        followers_count: None,
    }
}

#[async_trait]
impl GraphSink for MemoryGraph {
    async fn upsert_user(&self, user: &UserProfile) -> Result<(), GraphError> {
        self.check()?;
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.id.0, user.clone());
        Ok(())
    }

    async fn upsert_user_summary(
        &self,
        id: UserId,
        name: &str,
        screen_name: Option<&str>,
    ) -> Result<(), GraphError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let user = state.users.entry(id.0).or_insert_with(|| stub(id.0));
        user.name = name.to_string();
        user.screen_name = screen_name.map(str::to_string);
        Ok(())
    }

    async fn upsert_group(&self, group: &GroupProfile) -> Result<(), GraphError> {
        self.check()?;
        self.state
            .lock()
            .unwrap()
            .groups
            .insert(group.id, group.clone());
        Ok(())
    }

    async fn upsert_edge(
        &self,
        from: UserId,
        to: NodeRef,
        label: EdgeLabel,
    ) -> Result<(), GraphError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.users.entry(from.0).or_insert_with(|| stub(from.0));
        match to.kind {
            NodeKind::User => {
                state.users.entry(to.id).or_insert_with(|| stub(to.id));
            }
            NodeKind::Group => {
                state.groups.entry(to.id).or_insert_with(|| GroupProfile {
                    id: to.id,
                    name: String::new(),
                    screen_name: None,
                });
            }
        }
        state
            .edges
            .insert((from.0, to.kind.label(), to.id, label.cypher()));
        Ok(())
    }
}
