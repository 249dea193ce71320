//! Resource loading and caching for mark assets.

use common::error::{RenderError, RenderResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Decoded image data.
#[derive(Clone, Debug)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
}

impl ImageData {
    /// Create from raw RGBA data.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Decode from encoded bytes.
    pub fn decode(bytes: &[u8]) -> RenderResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| RenderError::decode(err.to_string()))?;
        let rgba = img.to_rgba8();

        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            data: rgba.into_raw(),
        })
    }

    /// Get memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }
}

/// Loads and caches external assets referenced by marks.
///
/// Assets are keyed by URL. Bytes can be registered up front (the common
/// path for embedded or pre-fetched assets); unregistered URLs fall back to
/// the filesystem. Decoded images are cached, so repeated loads of one URL
/// return the same `Arc`.
pub struct ResourceLoader {
    images: RwLock<HashMap<String, Arc<ImageData>>>,
    registered: RwLock<HashMap<String, Vec<u8>>>,
}

impl ResourceLoader {
    pub fn new() -> Self {
        Self {
            images: RwLock::new(HashMap::new()),
            registered: RwLock::new(HashMap::new()),
        }
    }

    /// Register encoded bytes for a URL ahead of any load.
    pub fn register(&self, url: impl Into<String>, bytes: Vec<u8>) {
        self.registered.write().insert(url.into(), bytes);
    }

    /// Load and decode the image at `url`, caching the result.
    pub fn load_image(&self, url: &str) -> RenderResult<Arc<ImageData>> {
        if let Some(cached) = self.images.read().get(url) {
            return Ok(cached.clone());
        }

        let bytes = match self.registered.read().get(url) {
            Some(bytes) => bytes.clone(),
            None => std::fs::read(url).map_err(|_| {
                RenderError::resource(format!("asset not found: {url}"))
            })?,
        };

        let data = Arc::new(ImageData::decode(&bytes)?);
        self.images.write().insert(url.to_string(), data.clone());
        Ok(data)
    }

    /// Whether a decoded image is cached for `url`.
    pub fn is_cached(&self, url: &str) -> bool {
        self.images.read().contains_key(url)
    }

    /// Number of cached decoded images.
    pub fn cached_count(&self) -> usize {
        self.images.read().len()
    }

    /// Drop every cached and registered asset.
    pub fn clear(&self) {
        self.images.write().clear();
        self.registered.write().clear();
    }
}

impl Default for ResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG: 1x1 opaque red pixel.
    fn red_pixel_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_registered_load_and_cache() {
        let loader = ResourceLoader::new();
        loader.register("memory://dot", red_pixel_png());

        let first = loader.load_image("memory://dot").unwrap();
        assert_eq!((first.width, first.height), (1, 1));
        assert!(loader.is_cached("memory://dot"));

        let second = loader.load_image("memory://dot").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.cached_count(), 1);
    }

    #[test]
    fn test_missing_asset() {
        let loader = ResourceLoader::new();
        let err = loader.load_image("memory://absent").unwrap_err();
        assert!(matches!(err, RenderError::Resource(_)));
    }

    #[test]
    fn test_decode_garbage() {
        let loader = ResourceLoader::new();
        loader.register("memory://bad", vec![0, 1, 2, 3]);
        let err = loader.load_image("memory://bad").unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }
}
