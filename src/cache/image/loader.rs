//! Two-tier image cache: bounded memory LRU in front of a content-addressed
//! disk store, with the network as the last resort.

use image::DynamicImage;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::decode::{decode, TargetSize};
use super::disk::{DiskTier, DiskUsage};
use super::fetcher::ImageFetcher;
use super::key::cache_key;
use super::memory::MemoryTier;
use crate::app::ImageConfig;
use crate::utils::{CampusError, Result};

#[derive(Debug, Default)]
struct Counters {
    memory_hits: AtomicU64,
    disk_reads: AtomicU64,
    disk_hits: AtomicU64,
    network_fetches: AtomicU64,
    disk_write_failures: AtomicU64,
}

/// Snapshot of image cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCacheStats {
    pub memory_hits: u64,
    pub disk_reads: u64,
    pub disk_hits: u64,
    pub network_fetches: u64,
    pub disk_write_failures: u64,
    pub memory_entries: usize,
    pub memory_capacity: usize,
    pub disk: DiskUsage,
}

/// Image cache shared by every image request in the process
pub struct ImageCache {
    memory: MemoryTier,
    disk: DiskTier,
    fetcher: Arc<dyn ImageFetcher>,
    jpeg_quality: u8,
    counters: Counters,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("memory", &self.memory)
            .field("disk", &self.disk)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Create a cache whose disk tier lives under `cache_dir/image_cache`
    pub fn new(
        cache_dir: &Path,
        config: &ImageConfig,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Result<Self> {
        Ok(Self {
            memory: MemoryTier::new(config.memory_capacity),
            disk: DiskTier::new(cache_dir)?,
            fetcher,
            jpeg_quality: config.jpeg_quality,
            counters: Counters::default(),
        })
    }

    /// Load the image at `url`, decoded for `target` when given
    ///
    /// Memory, then disk, then network. Every failure comes back as an
    /// `Err`; a failed disk read or decode falls through to the network.
    pub async fn load(&self, url: &str, target: Option<TargetSize>) -> Result<Arc<DynamicImage>> {
        if url.trim().is_empty() {
            return Err(CampusError::BlankUrl);
        }

        let key = cache_key(url);

        if let Some(image) = self.memory.get(&key) {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            trace!(%url, "Image memory hit");
            return Ok(image);
        }

        if let Some(image) = self.load_from_disk(&key, target).await {
            self.counters.disk_hits.fetch_add(1, Ordering::Relaxed);
            debug!(%url, "Image disk hit");
            let image = Arc::new(image);
            self.memory.put(key, image.clone());
            return Ok(image);
        }

        let image = Arc::new(self.load_from_network(url, target).await?);
        self.persist(&key, image.clone()).await;
        self.memory.put(key, image.clone());
        Ok(image)
    }

    async fn load_from_disk(&self, key: &str, target: Option<TargetSize>) -> Option<DynamicImage> {
        if !self.disk.contains(key) {
            return None;
        }
        self.counters.disk_reads.fetch_add(1, Ordering::Relaxed);

        let disk = self.disk.clone();
        let key = key.to_string();
        let outcome = tokio::task::spawn_blocking(move || -> Result<Option<DynamicImage>> {
            match disk.read(&key)? {
                Some(bytes) => decode(&bytes, target).map(Some),
                None => Ok(None),
            }
        })
        .await;

        match outcome {
            Ok(Ok(image)) => image,
            Ok(Err(e)) => {
                warn!(error = %e, "Cached image unreadable, falling back to network");
                None
            }
            Err(e) => {
                warn!(error = %e, "Disk read task failed");
                None
            }
        }
    }

    async fn load_from_network(&self, url: &str, target: Option<TargetSize>) -> Result<DynamicImage> {
        self.counters.network_fetches.fetch_add(1, Ordering::Relaxed);
        let bytes = self.fetcher.fetch(url).await?;
        debug!(%url, bytes = bytes.len(), "Image downloaded");

        tokio::task::spawn_blocking(move || decode(&bytes, target))
            .await
            .map_err(|e| CampusError::Decode(e.to_string()))?
    }

    /// Best effort: a failed write never fails the load
    async fn persist(&self, key: &str, image: Arc<DynamicImage>) {
        let disk = self.disk.clone();
        let key = key.to_string();
        let quality = self.jpeg_quality;

        let outcome =
            tokio::task::spawn_blocking(move || disk.write(&key, &image, quality)).await;

        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(e) => e.to_string(),
        };
        self.counters
            .disk_write_failures
            .fetch_add(1, Ordering::Relaxed);
        warn!(error = %failure, "Failed to write image to disk cache");
    }

    /// Whether `url` is currently decoded in memory (does not count as a use)
    pub fn is_in_memory(&self, url: &str) -> bool {
        self.memory.contains(&cache_key(url))
    }

    pub fn is_on_disk(&self, url: &str) -> bool {
        self.disk.contains(&cache_key(url))
    }

    /// Drop every decoded image; the disk tier is kept
    pub fn clear_memory(&self) {
        self.memory.clear();
        debug!("Image memory tier cleared");
    }

    /// Wipe the disk tier directory
    pub fn clear_disk(&self) -> Result<()> {
        self.disk.clear()?;
        debug!(dir = %self.disk.dir().display(), "Image disk tier cleared");
        Ok(())
    }

    pub fn disk_dir(&self) -> &Path {
        self.disk.dir()
    }

    pub fn stats(&self) -> Result<ImageCacheStats> {
        Ok(ImageCacheStats {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            disk_reads: self.counters.disk_reads.load(Ordering::Relaxed),
            disk_hits: self.counters.disk_hits.load(Ordering::Relaxed),
            network_fetches: self.counters.network_fetches.load(Ordering::Relaxed),
            disk_write_failures: self.counters.disk_write_failures.load(Ordering::Relaxed),
            memory_entries: self.memory.len(),
            memory_capacity: self.memory.capacity(),
            disk: self.disk.usage()?,
        })
    }
}
