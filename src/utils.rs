//! Shared utility functions

use std::path::{Path, PathBuf};

use eyre::Result;

/// Expand a `~/` prefix to the user's home directory.
///
/// Returns the path unchanged if it doesn't start with `~/` or if the home
/// directory cannot be determined.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(rest) = s.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    path.to_path_buf()
}

/// Resolve a HuggingFace Hub cache directory to its snapshot path.
///
/// HuggingFace stores models in `<model_dir>/snapshots/<hash>/`. This function
/// checks for that structure and returns the snapshot path, or the original
/// path if no snapshots directory exists.
pub fn resolve_hf_snapshot(model_dir: &Path) -> Result<PathBuf> {
    let snapshots_dir = model_dir.join("snapshots");
    if snapshots_dir.exists() {
        let snapshot = std::fs::read_dir(&snapshots_dir)?
            .filter_map(|e| e.ok())
            .find(|e| e.path().is_dir())
            .ok_or_else(|| eyre::eyre!("No snapshot found in {:?}", snapshots_dir))?;
        Ok(snapshot.path())
    } else {
        Ok(model_dir.to_path_buf())
    }
}

/// Resolve a model repo id (e.g. "Salesforce/blip2-opt-2.7b") by searching
/// the user-level HuggingFace Hub cache directories.
///
/// Checks `HUGGINGFACE_HUB_CACHE`, then `HF_HOME`, then
/// `~/.cache/huggingface/hub`. Returns the resolved path with snapshots
/// navigated, or None if not found.
pub fn resolve_from_hub_cache(repo_id: &str) -> Option<PathBuf> {
    // slashes become -- in the hub layout
    let hf_dir_name = format!("models--{}", repo_id.replace('/', "--"));
    let cache_roots = [
        std::env::var("HUGGINGFACE_HUB_CACHE")
            .map(PathBuf::from)
            .ok(),
        std::env::var("HF_HOME")
            .map(|h| PathBuf::from(h).join("hub"))
            .ok(),
        dirs::home_dir().map(|h| h.join(".cache/huggingface/hub")),
    ];

    for root in cache_roots.iter().flatten() {
        let model_dir = root.join(&hf_dir_name);
        if model_dir.exists() {
            if let Ok(resolved) = resolve_hf_snapshot(&model_dir) {
                tracing::info!("Found model in HuggingFace cache: {:?}", resolved);
                return Some(resolved);
            }
        }
    }

    None
}

/// Validate a stored image name before touching the filesystem.
///
/// Stored images are named `<uuid>.<ext>`, so anything outside alphanumerics,
/// hyphens, underscores, and dots is rejected, as is a leading dot.
pub fn is_safe_image_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Content type for a stored image, by file extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_leaves_plain_paths_alone() {
        let path = Path::new("/var/tmp/images");
        assert_eq!(expand_tilde(path), PathBuf::from("/var/tmp/images"));
        assert_eq!(expand_tilde(Path::new("relative/dir")), PathBuf::from("relative/dir"));
    }

    #[test]
    fn expand_tilde_resolves_home_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/models")), home.join("models"));
        }
    }

    #[test]
    fn hf_snapshot_resolution() {
        let dir = tempfile::tempdir().unwrap();
        // No snapshots directory: path passes through
        assert_eq!(resolve_hf_snapshot(dir.path()).unwrap(), dir.path());

        // With a snapshot hash directory, that directory wins
        let snapshot = dir.path().join("snapshots/abc123");
        std::fs::create_dir_all(&snapshot).unwrap();
        assert_eq!(resolve_hf_snapshot(dir.path()).unwrap(), snapshot);
    }

    #[test]
    fn safe_image_names() {
        assert!(is_safe_image_name("550e8400-e29b-41d4-a716-446655440000.jpg"));
        assert!(is_safe_image_name("photo_1.png"));
        assert!(!is_safe_image_name(""));
        assert!(!is_safe_image_name(".."));
        assert!(!is_safe_image_name(".hidden"));
        assert!(!is_safe_image_name("../../etc/passwd"));
        assert!(!is_safe_image_name("a/b.png"));
        assert!(!is_safe_image_name("a\\b.png"));
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
