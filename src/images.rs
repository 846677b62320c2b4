//! Temp-image store
//!
//! Uploaded and URL-fetched images land here under fresh UUID names, get
//! validated before inference, are served back by the `/images/{name}` route,
//! and are swept once they outlive the retention window.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};

/// Retention window for stored images.
pub const MAX_IMAGE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Timeout for fetching an image from a URL.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Pick a file extension by sniffing the image bytes.
fn extension_for(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(image::ImageFormat::Png) => "png",
        Ok(image::ImageFormat::Gif) => "gif",
        Ok(image::ImageFormat::WebP) => "webp",
        Ok(image::ImageFormat::Bmp) => "bmp",
        // JPEG doubles as the fallback; validation decides usability
        _ => "jpg",
    }
}

/// Save raw image bytes into the store under a fresh UUID name.
pub fn save_uploaded_image(data: &[u8], dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create image directory {:?}", dir))?;

    let filename = format!("{}.{}", uuid::Uuid::new_v4(), extension_for(data));
    let path = dir.join(filename);
    std::fs::write(&path, data).with_context(|| format!("failed to write image {:?}", path))?;

    tracing::info!("Stored image at {:?}", path);
    Ok(path)
}

/// Download an image from a URL into the store.
pub fn download_image(url: &str, dir: &Path) -> Result<PathBuf> {
    tracing::info!("Downloading image from {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;
    let data = client
        .get(url)
        .send()
        .with_context(|| format!("request to {} failed", url))?
        .error_for_status()
        .with_context(|| format!("{} returned an error status", url))?
        .bytes()
        .with_context(|| format!("failed to read image body from {}", url))?;

    save_uploaded_image(&data, dir)
}

/// True when the file decodes as an image.
pub fn validate_image(path: &Path) -> bool {
    match image::open(path) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Invalid image file {:?}: {}", path, e);
            false
        }
    }
}

/// Delete stored images older than `max_age`. Returns the number removed.
pub fn cleanup_temp_images(dir: &Path, max_age: Duration) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut deleted = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let age = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok());
        if let Some(age) = age {
            if age > max_age && std::fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
    }

    if deleted > 0 {
        tracing::info!("Cleaned up {} temporary images", deleted);
    }
    deleted
}
