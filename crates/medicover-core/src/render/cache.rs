//! Generated image cache.
//!
//! Images live in a single directory and are keyed by file name alone; an
//! existing file is a cache hit. An optional `<stem>.areas.json` sidecar holds
//! the region areas (JSON array of m²) for the stats panel.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::MapRequest;
use crate::stats::CoverageStats;

/// URL prefix the web server mounts the cache directory on.
pub const IMAGE_URL_PREFIX: &str = "/generatedImages";

#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ImageCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, request: &MapRequest) -> PathBuf {
        self.dir.join(request.image_name())
    }

    pub fn areas_path_for(&self, request: &MapRequest) -> PathBuf {
        self.dir
            .join(format!("{}.areas.json", request.image_stem()))
    }

    /// Public URL of the image.
    pub fn url_for(&self, request: &MapRequest) -> String {
        format!("{}/{}", IMAGE_URL_PREFIX, request.image_name())
    }

    /// Path of the cached image, if it exists.
    pub fn lookup(&self, request: &MapRequest) -> Option<PathBuf> {
        let path = self.path_for(request);
        if path.is_file() {
            debug!(path = %path.display(), "image cache hit");
            Some(path)
        } else {
            None
        }
    }

    /// Coverage stats from the areas sidecar, if present and readable.
    pub fn stats_for(&self, request: &MapRequest) -> Option<CoverageStats> {
        let path = self.areas_path_for(request);
        let data = fs::read(&path).ok()?;
        match serde_json::from_slice::<Vec<f64>>(&data) {
            Ok(areas) => CoverageStats::from_areas(&areas),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid areas sidecar");
                None
            }
        }
    }

    /// Natural image size read from the PNG header, if the file is a PNG.
    pub fn image_size(&self, request: &MapRequest) -> Option<(u32, u32)> {
        let mut header = [0u8; 24];
        let mut file = File::open(self.path_for(request)).ok()?;
        file.read_exact(&mut header).ok()?;
        png_dimensions(&header)
    }
}

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Width and height from the IHDR chunk that must follow the PNG signature.
pub(crate) fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    Some((width, height))
}

#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 6, 0, 0, 0]);
    data
}
