use std::sync::Arc;
use tracing::info;

use crate::api::{ApiClient, Credentials, LoginResponse};
use crate::auth::TokenStore;
use crate::cache::CacheCoordinator;
use crate::utils::Result;

/// Login and logout
#[derive(Debug, Clone)]
pub struct AuthRepository {
    client: ApiClient,
    tokens: Arc<TokenStore>,
    coordinator: CacheCoordinator,
}

impl AuthRepository {
    pub fn new(client: ApiClient, tokens: Arc<TokenStore>, coordinator: CacheCoordinator) -> Self {
        Self {
            client,
            tokens,
            coordinator,
        }
    }

    /// Exchange credentials for a session token and store it
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let response: LoginResponse = self
            .client
            .post("auth/login", credentials)
            .await
            .into_result()?;
        self.tokens.save(&response.token);
        info!(email = %credentials.email, "Logged in");
        Ok(())
    }

    /// Drop the token and every cache of server state
    pub fn logout(&self) {
        self.tokens.clear();
        self.coordinator.invalidate_all();
        info!("Logged out");
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.has_valid_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Course, UserProfile};
    use crate::auth::jwt;
    use crate::cache::{KeyedTtlCache, ResourceCache};
    use crate::constants::USER_CACHE_TTL_MS;
    use crate::repository::{test_client, ApiCourseSource, ApiUserSource};
    use crate::utils::SystemClock;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup(
        client: ApiClient,
        tokens: Arc<TokenStore>,
    ) -> (
        AuthRepository,
        Arc<ResourceCache<Vec<Course>>>,
        Arc<KeyedTtlCache<UserProfile>>,
    ) {
        let courses: Arc<ResourceCache<Vec<Course>>> = Arc::new(ResourceCache::new(
            "courses",
            Arc::new(ApiCourseSource::new(client.clone())),
        ));
        let users: Arc<KeyedTtlCache<UserProfile>> = Arc::new(KeyedTtlCache::new(
            "users",
            Arc::new(ApiUserSource::new(client.clone())),
            Arc::new(SystemClock),
            USER_CACHE_TTL_MS,
        ));
        let coordinator = CacheCoordinator::new(courses.clone(), users.clone());
        (AuthRepository::new(client, tokens, coordinator), courses, users)
    }

    #[tokio::test]
    async fn test_login_stores_token_used_by_later_requests() {
        let server = MockServer::start().await;
        let token = jwt::encode_unsigned(&json!({ "sub": "u1", "exp": 4_102_444_800_i64 }));

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "ada@example.edu", "password": "hunter2" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "token": token } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/courses"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, tokens) = test_client(&server);
        let (auth, courses, _) = setup(client, tokens);
        assert!(!auth.is_logged_in());

        auth.login(&Credentials {
            email: "ada@example.edu".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

        assert!(auth.is_logged_in());
        courses.fetch().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_login_stores_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid credentials" })),
            )
            .mount(&server)
            .await;

        let (client, tokens) = test_client(&server);
        let (auth, _, _) = setup(client, tokens);

        let err = auth
            .login(&Credentials {
                email: "ada@example.edu".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.message(), "invalid credentials");
        assert!(!auth.is_logged_in());
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "u1", "name": "Ada", "email": "ada@example.edu" }
            })))
            .mount(&server)
            .await;

        let (client, tokens) = test_client(&server);
        tokens.save(&jwt::encode_unsigned(&json!({ "exp": 4_102_444_800_i64 })));
        let (auth, courses, users) = setup(client, tokens.clone());

        courses.fetch().await.unwrap();
        users.fetch("u1").await.unwrap();

        auth.logout();
        assert!(!auth.is_logged_in());
        assert_eq!(tokens.get(), None);
        assert!(!courses.is_warm());
        assert!(users.peek("u1").is_none());
    }
}
