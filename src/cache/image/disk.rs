use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::constants::IMAGE_CACHE_DIR_NAME;
use crate::utils::{CampusError, Result};

/// Flat on-disk tier: one JPEG file per content-hash key
///
/// Unbounded, no TTL. Only a full wipe removes entries.
#[derive(Debug, Clone)]
pub struct DiskTier {
    dir: PathBuf,
}

/// Disk usage summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub entries: usize,
    pub bytes: u64,
}

impl DiskTier {
    /// Tier rooted at `<cache_dir>/image_cache`
    pub fn new(cache_dir: &Path) -> Result<Self> {
        let dir = cache_dir.join(IMAGE_CACHE_DIR_NAME);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Raw bytes for `key`, `None` when not cached
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `image` as JPEG at `quality`
    pub fn write(&self, key: &str, image: &DynamicImage, quality: u8) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("part");

        {
            let file = fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality)
                .encode_image(&rgb)
                .map_err(|e| CampusError::Io(format!("JPEG encode failed: {}", e)))?;
            writer.flush()?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Remove every cached file and recreate the empty directory
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn usage(&self) -> Result<DiskUsage> {
        let mut usage = DiskUsage::default();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                usage.entries += 1;
                usage.bytes += metadata.len();
            }
        }
        Ok(usage)
    }
}
