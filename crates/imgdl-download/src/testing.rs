//! Fake fetch port for unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

use imgdl_core::{FetchError, FetchPort};

/// Returns canned bodies per exact URL and records every call.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, Result<Bytes, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, body: impl Into<Bytes>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn with_error(self, url: &str, error: FetchError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FetchPort for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::status(url, 404)))
    }
}

/// A solid RGB image encoded as PNG.
pub fn png(width: u32, height: u32) -> Bytes {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    Bytes::from(buf.into_inner())
}
