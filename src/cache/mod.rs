// Gateway module for cache - follows the Train Station Pattern
// All external access must go through this gateway

mod coordinator;
pub mod image;
mod keyed_ttl;
mod single_slot;

pub use coordinator::CacheCoordinator;
pub use image::{ImageCache, ImageSlot, ImageState, TargetSize};
pub use keyed_ttl::{KeyedSource, KeyedTtlCache};
pub use single_slot::{ResourceCache, ResourceSource};
