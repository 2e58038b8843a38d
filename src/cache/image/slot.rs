use image::DynamicImage;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::decode::TargetSize;
use super::loader::ImageCache;

/// Display state of one image element
#[derive(Debug, Clone)]
pub enum ImageState {
    Idle,
    Loading,
    Loaded(Arc<DynamicImage>),
    Error(String),
}

impl ImageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImageState::Loaded(_) | ImageState::Error(_))
    }
}

/// State machine for one on-screen image
///
/// A newer request for a different URL supersedes an older one: when the
/// older load finishes its result is dropped instead of replacing the state
/// that now belongs to the newer URL.
#[derive(Debug)]
pub struct ImageSlot {
    current_url: Mutex<Option<String>>,
    state: watch::Sender<ImageState>,
}

impl Default for ImageSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSlot {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ImageState::Idle);
        Self {
            current_url: Mutex::new(None),
            state,
        }
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<ImageState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ImageState {
        self.state.borrow().clone()
    }

    pub fn current_url(&self) -> Option<String> {
        self.current_url.lock().clone()
    }

    /// Load `url` into this slot
    ///
    /// Returns `false` when the result was discarded because another URL was
    /// requested in the meantime.
    pub async fn load(&self, cache: &ImageCache, url: &str, target: Option<TargetSize>) -> bool {
        {
            let mut current = self.current_url.lock();
            *current = Some(url.to_string());
            self.state.send_replace(ImageState::Loading);
        }

        let result = cache.load(url, target).await;

        let current = self.current_url.lock();
        if current.as_deref() != Some(url) {
            debug!(%url, "Discarding superseded image result");
            return false;
        }

        let next = match result {
            Ok(image) => ImageState::Loaded(image),
            Err(e) => ImageState::Error(e.message()),
        };
        self.state.send_replace(next);
        true
    }

    /// Forget the current URL and go back to idle
    pub fn reset(&self) {
        let mut current = self.current_url.lock();
        *current = None;
        self.state.send_replace(ImageState::Idle);
    }
}
