use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, Material, MaterialDraft, RemoteResponse};
use crate::cache::{ResourceCache, ResourceSource};
use crate::utils::Result;

/// `GET /materials`
#[derive(Debug, Clone)]
pub struct ApiMaterialSource {
    client: ApiClient,
}

impl ApiMaterialSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSource<Vec<Material>> for ApiMaterialSource {
    async fn load(&self) -> RemoteResponse<Vec<Material>> {
        self.client.get("materials").await
    }
}

#[derive(Debug, Clone)]
pub struct MaterialRepository {
    client: ApiClient,
    cache: Arc<ResourceCache<Vec<Material>>>,
}

impl MaterialRepository {
    pub fn new(client: ApiClient, cache: Arc<ResourceCache<Vec<Material>>>) -> Self {
        Self { client, cache }
    }

    pub async fn materials(&self) -> Result<Vec<Material>> {
        self.cache.fetch().await
    }

    pub fn cached_materials(&self) -> Option<Vec<Material>> {
        self.cache.peek()
    }

    /// Materials of one course, filtered from the cached list
    pub async fn materials_for_course(&self, course_id: &str) -> Result<Vec<Material>> {
        let materials = self.materials().await?;
        Ok(materials
            .into_iter()
            .filter(|m| m.course_id == course_id)
            .collect())
    }

    /// Register an uploaded file as course material
    pub async fn add_material(&self, draft: &MaterialDraft) -> Result<Material> {
        let material: Material = self.client.post("materials", draft).await.into_result()?;
        self.cache.invalidate();
        info!(material_id = %material.id, course_id = %draft.course_id, "Material added");
        Ok(material)
    }

    pub async fn delete_material(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("materials/{}", id))
            .await
            .into_ack()?;
        self.cache.invalidate();
        info!(material_id = %id, "Material deleted");
        Ok(())
    }
}
