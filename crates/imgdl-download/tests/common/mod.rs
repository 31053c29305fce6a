//! Shared helpers for integration tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbaImage};
use imgdl_core::{DownloaderConfig, DownloaderSettings, FetchError, FetchPort, ThumbSizes};

/// Serves canned bodies by exact URL; anything else is a 404.
#[derive(Default)]
pub struct CannedFetcher {
    bodies: HashMap<String, Bytes>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: Bytes) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchPort for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::status(url, 404))
    }
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Bytes {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    Bytes::from(buf.into_inner())
}

pub fn png(width: u32, height: u32) -> Bytes {
    encode(DynamicImage::new_rgb8(width, height), ImageFormat::Png)
}

#[allow(dead_code)]
pub fn transparent_png(width: u32, height: u32) -> Bytes {
    encode(
        DynamicImage::ImageRgba8(RgbaImage::new(width, height)),
        ImageFormat::Png,
    )
}

pub fn config(store: &Path, thumbs: Option<ThumbSizes>) -> DownloaderConfig {
    DownloaderSettings {
        store_path: Some(store.to_path_buf()),
        n_workers: Some(4),
        thumbs_size: thumbs,
        ..Default::default()
    }
    .resolve()
    .unwrap()
}

/// Decoded dimensions and channel count of a stored file, checking that it is
/// a JPEG.
pub fn inspect(path: &Path) -> (u32, u32, u8) {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    let image = image::load_from_memory(&bytes).unwrap();
    (image.width(), image.height(), image.color().channel_count())
}
