//! Composition root: every shared component is built exactly once here.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::api::{ApiClient, Course, Material, UserProfile};
use crate::app::Config;
use crate::auth::{Authorizer, FileTokenStorage, TokenStore};
use crate::cache::image::{HttpImageFetcher, ImageFetcher};
use crate::cache::{CacheCoordinator, ImageCache, KeyedTtlCache, ResourceCache};
use crate::constants::USER_CACHE_TTL_MS;
use crate::repository::{
    ApiCourseSource, ApiMaterialSource, ApiUserSource, AuthRepository, CourseRepository,
    MaterialRepository, UserRepository,
};
use crate::utils::SystemClock;

/// Process-wide client state
#[derive(Debug, Clone)]
pub struct CampusCore {
    tokens: Arc<TokenStore>,
    client: ApiClient,
    coordinator: CacheCoordinator,
    images: Arc<ImageCache>,
    auth: AuthRepository,
    courses: CourseRepository,
    materials: MaterialRepository,
    users: UserRepository,
}

impl CampusCore {
    /// Build from configuration: file-backed token, HTTP image fetcher
    pub fn from_config(config: &Config) -> Result<Self> {
        let token_file = config.storage.resolve_token_file()?;
        let cache_dir = config.storage.resolve_cache_dir()?;
        debug!(token_file = %token_file.display(), cache_dir = %cache_dir.display(), "Building core");

        let tokens = Arc::new(TokenStore::new(
            Arc::new(FileTokenStorage::new(token_file)),
            Arc::new(SystemClock),
        ));
        let fetcher = Arc::new(
            HttpImageFetcher::new(&config.images).context("Failed to create image fetcher")?,
        );

        Self::assemble(config, tokens, &cache_dir, fetcher)
    }

    /// Build from explicit parts
    pub fn assemble(
        config: &Config,
        tokens: Arc<TokenStore>,
        cache_dir: &Path,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Result<Self> {
        let client = ApiClient::new(&config.api, Authorizer::new(tokens.clone()))
            .context("Failed to create API client")?;

        let course_cache: Arc<ResourceCache<Vec<Course>>> = Arc::new(ResourceCache::new(
            "courses",
            Arc::new(ApiCourseSource::new(client.clone())),
        ));
        let material_cache: Arc<ResourceCache<Vec<Material>>> = Arc::new(ResourceCache::new(
            "materials",
            Arc::new(ApiMaterialSource::new(client.clone())),
        ));
        let user_cache: Arc<KeyedTtlCache<UserProfile>> = Arc::new(KeyedTtlCache::new(
            "users",
            Arc::new(ApiUserSource::new(client.clone())),
            Arc::new(SystemClock),
            USER_CACHE_TTL_MS,
        ));

        let coordinator = CacheCoordinator::new(course_cache.clone(), user_cache.clone());
        let images = Arc::new(
            ImageCache::new(cache_dir, &config.images, fetcher)
                .with_context(|| format!("Failed to open image cache in {}", cache_dir.display()))?,
        );

        Ok(Self {
            auth: AuthRepository::new(client.clone(), tokens.clone(), coordinator.clone()),
            courses: CourseRepository::new(client.clone(), course_cache),
            materials: MaterialRepository::new(client.clone(), material_cache),
            users: UserRepository::new(client.clone(), user_cache),
            tokens,
            client,
            coordinator,
            images,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn coordinator(&self) -> &CacheCoordinator {
        &self.coordinator
    }

    pub fn images(&self) -> &Arc<ImageCache> {
        &self.images
    }

    pub fn auth(&self) -> &AuthRepository {
        &self.auth
    }

    pub fn courses(&self) -> &CourseRepository {
        &self.courses
    }

    pub fn materials(&self) -> &MaterialRepository {
        &self.materials
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }
}
