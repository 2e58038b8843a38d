// Gateway module for repository - follows the Train Station Pattern
// All external access must go through this gateway

mod auth;
mod course;
mod material;
mod user;

pub use auth::AuthRepository;
pub use course::{ApiCourseSource, CourseRepository};
pub use material::{ApiMaterialSource, MaterialRepository};
pub use user::{ApiUserSource, UserRepository};

#[cfg(test)]
pub(crate) fn test_client(
    server: &wiremock::MockServer,
) -> (crate::api::ApiClient, std::sync::Arc<crate::auth::TokenStore>) {
    use crate::app::ApiConfig;
    use crate::auth::{Authorizer, TokenStore};
    use std::sync::Arc;

    let tokens = Arc::new(TokenStore::in_memory());
    let config = ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
    };
    let client = crate::api::ApiClient::new(&config, Authorizer::new(tokens.clone()))
        .expect("client builds");
    (client, tokens)
}
