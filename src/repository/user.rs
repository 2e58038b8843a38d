use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, ProfileUpdate, RemoteResponse, UserProfile};
use crate::cache::{KeyedSource, KeyedTtlCache};
use crate::utils::Result;

/// `GET /users/{id}`
#[derive(Debug, Clone)]
pub struct ApiUserSource {
    client: ApiClient,
}

impl ApiUserSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyedSource<UserProfile> for ApiUserSource {
    async fn load(&self, id: &str) -> RemoteResponse<UserProfile> {
        self.client.get(&format!("users/{}", id)).await
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    client: ApiClient,
    cache: Arc<KeyedTtlCache<UserProfile>>,
}

impl UserRepository {
    pub fn new(client: ApiClient, cache: Arc<KeyedTtlCache<UserProfile>>) -> Self {
        Self { client, cache }
    }

    pub async fn user(&self, id: &str) -> Result<UserProfile> {
        self.cache.fetch(id).await
    }

    pub fn cached_user(&self, id: &str) -> Option<UserProfile> {
        self.cache.peek(id)
    }

    /// Edit a profile; only that user's cache entry is dropped
    pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<UserProfile> {
        let profile: UserProfile = self
            .client
            .put(&format!("users/{}", id), update)
            .await
            .into_result()?;
        self.cache.invalidate(id);
        info!(user_id = %id, "Profile updated");
        Ok(profile)
    }
}
