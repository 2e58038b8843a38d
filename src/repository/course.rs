use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, Course, CourseDraft, RemoteResponse};
use crate::cache::{ResourceCache, ResourceSource};
use crate::utils::Result;

/// `GET /courses`
#[derive(Debug, Clone)]
pub struct ApiCourseSource {
    client: ApiClient,
}

impl ApiCourseSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSource<Vec<Course>> for ApiCourseSource {
    async fn load(&self) -> RemoteResponse<Vec<Course>> {
        self.client.get("courses").await
    }
}

/// Course list reads through the cache; any successful edit drops the
/// whole list.
#[derive(Debug, Clone)]
pub struct CourseRepository {
    client: ApiClient,
    cache: Arc<ResourceCache<Vec<Course>>>,
}

impl CourseRepository {
    pub fn new(client: ApiClient, cache: Arc<ResourceCache<Vec<Course>>>) -> Self {
        Self { client, cache }
    }

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.cache.fetch().await
    }

    pub fn cached_courses(&self) -> Option<Vec<Course>> {
        self.cache.peek()
    }

    /// Bypass the cached list once
    pub async fn refresh(&self) -> Result<Vec<Course>> {
        self.cache.invalidate();
        self.cache.fetch().await
    }

    pub async fn course(&self, id: &str) -> Result<Option<Course>> {
        let courses = self.courses().await?;
        Ok(courses.into_iter().find(|c| c.id == id))
    }

    pub async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        let course: Course = self.client.post("courses", draft).await.into_result()?;
        self.cache.invalidate();
        info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    pub async fn update_course(&self, id: &str, draft: &CourseDraft) -> Result<Course> {
        let course: Course = self
            .client
            .put(&format!("courses/{}", id), draft)
            .await
            .into_result()?;
        self.cache.invalidate();
        info!(course_id = %id, "Course updated");
        Ok(course)
    }

    pub async fn delete_course(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("courses/{}", id))
            .await
            .into_ack()?;
        self.cache.invalidate();
        info!(course_id = %id, "Course deleted");
        Ok(())
    }
}
