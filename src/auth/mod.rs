// Gateway module for auth - follows the Train Station Pattern
// All external access must go through this gateway

mod authorizer;
pub mod jwt;
mod token_store;

pub use authorizer::Authorizer;
pub use token_store::{FileTokenStorage, MemoryTokenStorage, TokenStorage, TokenStore};
