pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod repository;
pub mod runtime;
pub mod utils;

pub use app::{Config, load_config};
pub use cache::{CacheCoordinator, ImageCache, KeyedTtlCache, ResourceCache};
pub use runtime::CampusCore;
pub use utils::CampusError;
