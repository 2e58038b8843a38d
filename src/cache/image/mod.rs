// Gateway module for the image cache
mod decode;
mod disk;
mod fetcher;
mod key;
mod loader;
mod memory;
mod slot;

pub use decode::{decode, sample_size, TargetSize};
pub use disk::{DiskTier, DiskUsage};
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use key::cache_key;
pub use loader::{ImageCache, ImageCacheStats};
pub use memory::MemoryTier;
pub use slot::{ImageSlot, ImageState};
