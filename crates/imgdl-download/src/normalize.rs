//! Image normalization: decode anything, store RGB JPEG.
//!
//! Every stored file, original or thumbnail, goes through the same steps:
//! decode with the format sniffed from the content, flatten to 8-bit RGB,
//! optionally shrink to fit a box, then encode as baseline JPEG at the
//! encoder's default quality.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};

use imgdl_core::{DownloadError, ThumbnailSpec};

/// A decoded image together with the container format it came in.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub format: Option<ImageFormat>,
    pub image: DynamicImage,
}

/// Decode raw bytes, guessing the format from their content.
pub fn decode(bytes: &[u8]) -> Result<SourceImage, DownloadError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DownloadError::decode(e.to_string()))?;
    let format = reader.format();
    if format.is_none() {
        return Err(DownloadError::decode("unrecognized image format"));
    }
    let image = reader
        .decode()
        .map_err(|e| DownloadError::decode(e.to_string()))?;
    Ok(SourceImage { format, image })
}

/// Flatten to 8-bit RGB.
///
/// PNG and GIF images with transparency are composited onto white first;
/// anything else simply loses its alpha channel.
pub fn canonicalize(source: &SourceImage) -> RgbImage {
    let composite = matches!(source.format, Some(ImageFormat::Png | ImageFormat::Gif))
        && source.image.color().has_alpha();

    if composite {
        flatten_on_white(&source.image)
    } else {
        source.image.to_rgb8()
    }
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
    })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    let blended = (c * a + 255 * (255 - a) + 127) / 255;
    // blended <= 255 for all inputs
    u8::try_from(blended).unwrap_or(u8::MAX)
}

/// Size that fits `(width, height)` inside `(max_width, max_height)` while
/// keeping the aspect ratio.
///
/// Never enlarges and never collapses a side to zero.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }
    let scale = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height));
    let side = |len: u32, max: u32| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (f64::from(len) * scale).round() as u32;
        scaled.clamp(1, max.max(1))
    };
    (side(width, max_width), side(height, max_height))
}

/// Shrink a copy of `image` to fit the thumbnail box with a Lanczos3 filter.
pub fn thumbnail(image: &RgbImage, spec: &ThumbnailSpec) -> RgbImage {
    let (width, height) = fit_within(image.width(), image.height(), spec.width, spec.height);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Encode as JPEG at the encoder's default quality.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, DownloadError> {
    let mut buf = Vec::new();
    JpegEncoder::new(&mut buf)
        .encode_image(image)
        .map_err(|e| DownloadError::decode(format!("JPEG encoding failed: {e}")))?;
    Ok(buf)
}

/// Full pipeline for raw bytes: decode, flatten, optionally shrink, encode.
pub fn normalize(bytes: &[u8], target: Option<&ThumbnailSpec>) -> Result<Vec<u8>, DownloadError> {
    let rgb = canonicalize(&decode(bytes)?);
    match target {
        Some(spec) => encode_jpeg(&thumbnail(&rgb, spec)),
        None => encode_jpeg(&rgb),
    }
}
