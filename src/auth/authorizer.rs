use std::sync::Arc;

use super::TokenStore;

/// Decorates outbound API requests with the session credential
///
/// The header is always attached. A missing token yields an empty bearer
/// value and the server decides whether to reject the request.
#[derive(Debug, Clone)]
pub struct Authorizer {
    tokens: Arc<TokenStore>,
}

impl Authorizer {
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        Self { tokens }
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        let token = self.tokens.get().unwrap_or_default();
        format!("Bearer {}", token)
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }
}
