use std::sync::Arc;
use tracing::info;

use super::{KeyedTtlCache, ResourceCache};
use crate::api::{Course, UserProfile};

/// One call to drop every cache that mirrors mutable server state
///
/// Used on logout and global refresh. Image caches are keyed by URL content
/// hash and are left alone; the token store has its own lifecycle.
#[derive(Debug, Clone)]
pub struct CacheCoordinator {
    courses: Arc<ResourceCache<Vec<Course>>>,
    users: Arc<KeyedTtlCache<UserProfile>>,
}

impl CacheCoordinator {
    pub fn new(
        courses: Arc<ResourceCache<Vec<Course>>>,
        users: Arc<KeyedTtlCache<UserProfile>>,
    ) -> Self {
        Self { courses, users }
    }

    pub fn invalidate_all(&self) {
        self.courses.invalidate();
        self.users.invalidate_all();
        info!("Course and user caches invalidated");
    }
}
