//! Map-backed collaborators.
//!
//! Hosts that load platform data up front (and the test suites) use these
//! instead of calling back into the platform per item.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::error::ResolveError;
use crate::platform::{FileResolver, IdentityResolver, MembershipResolver, TagStore};

#[derive(Debug, Default)]
pub struct MapFileResolver {
    paths: HashMap<i64, String>,
    failing: HashSet<i64>,
}

impl MapFileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_id: i64, path: impl Into<String>) -> Self {
        self.paths.insert(file_id, path.into());
        self
    }

    /// Make lookups of `file_id` fail with a non-NotFound error.
    pub fn with_failure(mut self, file_id: i64) -> Self {
        self.failing.insert(file_id);
        self
    }
}

impl FileResolver for MapFileResolver {
    fn resolve_by_id(&self, file_id: i64) -> Result<String, ResolveError> {
        if self.failing.contains(&file_id) {
            return Err(ResolveError::Failed(format!("storage for file {} unreachable", file_id)));
        }
        self.paths
            .get(&file_id)
            .cloned()
            .ok_or_else(|| ResolveError::not_found("file", file_id))
    }
}

#[derive(Debug, Default)]
pub struct MapIdentityResolver {
    users: HashMap<String, String>,
}

impl MapIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.users.insert(user_id.into(), display_name.into());
        self
    }
}

impl IdentityResolver for MapIdentityResolver {
    fn display_name_for_user(&self, user_id: &str) -> Option<String> {
        self.users.get(user_id).cloned()
    }
}

/// Circle directory that also counts session starts and stops.
#[derive(Debug, Default)]
pub struct MapMembershipResolver {
    circles: HashMap<String, String>,
    started: AtomicUsize,
    stopped: AtomicUsize,
}

impl MapMembershipResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circle(mut self, circle_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.circles.insert(circle_id.into(), display_name.into());
        self
    }

    pub fn sessions_started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn sessions_stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MembershipResolver for MapMembershipResolver {
    fn start_session(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_session(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }

    fn display_name_for_circle(&self, circle_id: &str) -> Result<String, ResolveError> {
        self.circles
            .get(circle_id)
            .cloned()
            .ok_or_else(|| ResolveError::not_found("circle", circle_id))
    }
}

#[derive(Debug, Default)]
struct TagTable {
    names: HashMap<i64, String>,
    last_id: i64,
}

/// Tag storage that rejects duplicate names, like the platform does.
#[derive(Debug, Default)]
pub struct InMemoryTagStore {
    table: RwLock<TagTable>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            if let Err(e) = store.create_tag(name) {
                log::warn!("TAG_SEED_SKIPPED name={} error={}", name, e);
            }
        }
        store
    }
}

impl TagStore for InMemoryTagStore {
    fn create_tag(&self, name: &str) -> Result<i64, ResolveError> {
        let mut table = self.table.write();
        if table.names.values().any(|n| n == name) {
            return Err(ResolveError::already_exists("Tag", name));
        }
        table.last_id += 1;
        let id = table.last_id;
        table.names.insert(id, name.to_string());
        Ok(id)
    }

    fn tag_exists(&self, tag_id: i64) -> bool {
        self.table.read().names.contains_key(&tag_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_resolver() {
        let files = MapFileResolver::new().with_file(1, "/alice/files/a.pdf").with_failure(2);
        assert_eq!(files.resolve_by_id(1).unwrap(), "/alice/files/a.pdf");
        assert!(!files.resolve_by_id(2).unwrap_err().is_not_found());
        assert!(files.resolve_by_id(3).unwrap_err().is_not_found());
    }

    #[test]
    fn test_tag_store_rejects_duplicates() {
        let tags = InMemoryTagStore::with_tags(&["pending", "approved"]);
        assert!(tags.tag_exists(1));
        assert!(tags.tag_exists(2));
        assert!(!tags.tag_exists(3));
        assert_eq!(
            tags.create_tag("pending"),
            Err(ResolveError::already_exists("Tag", "pending"))
        );
        assert_eq!(tags.create_tag("rejected").unwrap(), 3);
    }
}
