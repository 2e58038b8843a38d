use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::app::ImageConfig;
use crate::utils::{CampusError, Result};

/// Network primitive for raw image bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// reqwest-backed fetcher with bounded connect and read timeouts
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    user_agent: String,
}

impl HttpImageFetcher {
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .build()
            .map_err(|e| CampusError::Config(format!("Failed to build image client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        debug!(%url, "Downloading image");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| CampusError::ImageNetwork(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| CampusError::ImageNetwork(e.to_string()))?;

        response
            .bytes()
            .await
            .map_err(|e| CampusError::ImageNetwork(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// PNG bytes of a solid image
    pub fn png(width: u32, height: u32) -> Bytes {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([20, 120, 220]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        Bytes::from(bytes)
    }

    /// In-process fetcher serving canned bodies and counting requests
    #[derive(Default)]
    pub struct FakeFetcher {
        bodies: Mutex<HashMap<String, Bytes>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        calls: Mutex<Vec<String>>,
        pub started: Notify,
    }

    impl FakeFetcher {
        pub fn serve(&self, url: &str, body: Bytes) {
            self.bodies.lock().insert(url.to_string(), body);
        }

        /// Hold requests for `url` until the returned gate is notified
        pub fn gate(&self, url: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.gates.lock().insert(url.to_string(), gate.clone());
            gate
        }

        pub fn calls(&self) -> usize {
            self.calls.lock().len()
        }

        pub fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl ImageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Bytes> {
            self.calls.lock().push(url.to_string());
            self.started.notify_one();

            let gate = self.gates.lock().get(url).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let body = self.bodies.lock().get(url).cloned();
            body.ok_or_else(|| CampusError::ImageNetwork(format!("404 for {}", url)))
        }
    }
}
