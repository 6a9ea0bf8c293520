use std::path::Path;

use anyhow::{Context, Result, bail};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, info};

use crate::image_buf::PixelBuffer;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

pub fn is_supported_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Load a standard image (JPEG, PNG, TIFF) as an RGBA8 buffer.
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    load_image_scaled(path, None)
}

/// Load a standard image, optionally resizing so the longest edge
/// fits within `max_edge` pixels.
pub fn load_image_scaled(path: &Path, max_edge: Option<u32>) -> Result<PixelBuffer> {
    info!(?path, "loading image file");
    let t0 = std::time::Instant::now();

    let img =
        image::open(path).with_context(|| format!("failed to open image: {}", path.display()))?;
    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        width = img.width(),
        height = img.height(),
        "image decode"
    );

    let img = match max_edge {
        Some(max) if img.width().max(img.height()) > max => {
            let t1 = std::time::Instant::now();
            let resized = img.resize(max, max, image::imageops::FilterType::Triangle);
            debug!(
                elapsed_ms = t1.elapsed().as_millis(),
                width = resized.width(),
                height = resized.height(),
                "u8 resize"
            );
            resized.into_rgba8()
        }
        _ => img.into_rgba8(),
    };

    let (width, height) = img.dimensions();
    Ok(PixelBuffer::from_data(width, height, img.into_raw())?)
}

/// Encode `buf` to `path`, picking the format from the extension.
///
/// JPEG has no alpha channel, so it is dropped for `.jpg`/`.jpeg`.
pub fn save_image(buf: &PixelBuffer, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unknown output format: {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !is_supported_extension(ext) {
        bail!("unsupported output format: {}", path.display());
    }

    let rgba = RgbaImage::from_raw(buf.width, buf.height, buf.data.clone())
        .context("failed to create image from buffer")?;
    let dynamic = DynamicImage::ImageRgba8(rgba);
    let t0 = std::time::Instant::now();
    match format {
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(dynamic.into_rgb8()).save_with_format(path, format)
        }
        _ => dynamic.save_with_format(path, format),
    }
    .with_context(|| format!("failed to write image: {}", path.display()))?;
    debug!(elapsed_ms = t0.elapsed().as_millis(), ?path, "image encode");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                data.extend([v, 255 - v, 64, 128]);
            }
        }
        PixelBuffer::from_data(width, height, data).unwrap()
    }

    #[test]
    fn extension_detection() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("PNG"));
        assert!(is_supported_extension("Tif"));
        assert!(!is_supported_extension("heic"));
        assert!(!is_supported_extension("mp4"));
    }

    #[test]
    fn png_roundtrip_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let buf = checker(5, 3);
        save_image(&buf, &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded, buf);
    }

    #[test]
    fn jpeg_output_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save_image(&checker(16, 16), &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (16, 16));
        assert!(loaded.data.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn scaled_load_limits_longest_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        save_image(&checker(64, 32), &path).unwrap();
        let loaded = load_image_scaled(&path, Some(16)).unwrap();
        assert_eq!(loaded.dimensions(), (16, 8));
    }

    #[test]
    fn unsupported_output_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_image(&checker(2, 2), &dir.path().join("out.xyz")).is_err());
    }

    #[test]
    fn missing_file_fails() {
        assert!(load_image(Path::new("/nonexistent/filmgrade/photo.jpg")).is_err());
    }
}
