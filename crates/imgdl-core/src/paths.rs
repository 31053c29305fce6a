//! Content-addressed storage layout.
//!
//! Every URL maps to a file name derived from the SHA-1 of its UTF-8 bytes:
//!
//! ```text
//! {store_root}/{sha1}.jpg
//! {store_root}/thumbs/{spec_name}/{sha1}.jpg
//! ```
//!
//! This layout is the durable contract other tools rely on to look an image
//! up by URL, so it must never change shape.

use std::fs;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

use crate::config::ThumbnailSpec;
use crate::error::ConfigError;

const THUMBS_DIR: &str = "thumbs";
const EXTENSION: &str = "jpg";

/// Lowercase hex SHA-1 of the URL bytes.
///
/// The URL is hashed verbatim: case or whitespace differences produce
/// different digests.
pub fn url_digest(url: &str) -> String {
    format!("{:x}", Sha1::digest(url.as_bytes()))
}

/// Resolves on-disk locations for originals and thumbnails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Build a resolver without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build a resolver and make sure the store root and one directory per
    /// thumbnail spec exist.
    ///
    /// Creation is idempotent. A path that exists but is not a directory is
    /// rejected.
    pub fn create(root: impl Into<PathBuf>, specs: &[ThumbnailSpec]) -> Result<Self, ConfigError> {
        let resolver = Self::new(root);
        ensure_dir(&resolver.root)?;
        for spec in specs {
            ensure_dir(&resolver.thumb_dir(&spec.name))?;
        }
        Ok(resolver)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the canonical original for `url`.
    pub fn image_path(&self, url: &str) -> PathBuf {
        self.root.join(file_name(url))
    }

    /// Path of the `spec_name` thumbnail for `url`.
    pub fn thumb_path(&self, url: &str, spec_name: &str) -> PathBuf {
        self.thumb_dir(spec_name).join(file_name(url))
    }

    fn thumb_dir(&self, spec_name: &str) -> PathBuf {
        self.root.join(THUMBS_DIR).join(spec_name)
    }
}

fn file_name(url: &str) -> String {
    format!("{}.{EXTENSION}", url_digest(url))
}

fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(ConfigError::StoreDirectory {
                path: path.to_path_buf(),
                reason: "exists but is not a directory".to_string(),
            });
        }
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| ConfigError::StoreDirectory {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_sha1() {
        // sha1("abc")
        assert_eq!(url_digest("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(url_digest("").len(), 40);
    }

    #[test]
    fn image_path_is_stable_and_case_sensitive() {
        let resolver = PathResolver::new("/store");
        let a = resolver.image_path("https://x/a.png");
        assert_eq!(a, resolver.image_path("https://x/a.png"));
        assert_ne!(a, resolver.image_path("https://x/A.png"));
        assert_ne!(a, resolver.image_path("https://x/a.png "));

        let expected = format!("/store/{}.jpg", url_digest("https://x/a.png"));
        assert_eq!(a, PathBuf::from(expected));
    }

    #[test]
    fn thumb_path_nests_under_spec_name() {
        let resolver = PathResolver::new("/store");
        let digest = url_digest("https://x/a.png");
        assert_eq!(
            resolver.thumb_path("https://x/a.png", "100"),
            PathBuf::from(format!("/store/thumbs/100/{digest}.jpg"))
        );
    }

    #[test]
    fn create_makes_thumb_dirs_idempotently() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("imgs");
        let specs = vec![
            ThumbnailSpec::new("small", 50, 50),
            ThumbnailSpec::new("big", 200, 200),
        ];

        PathResolver::create(&root, &specs).unwrap();
        PathResolver::create(&root, &specs).unwrap();

        assert!(root.is_dir());
        assert!(root.join("thumbs/small").is_dir());
        assert!(root.join("thumbs/big").is_dir());
    }

    #[test]
    fn create_rejects_file_as_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("not-a-dir");
        fs::write(&root, b"x").unwrap();

        let err = PathResolver::create(&root, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::StoreDirectory { .. }));
    }

    #[test]
    fn expand_home_leaves_plain_paths_alone() {
        let path = Path::new("relative/imgs");
        assert_eq!(expand_home(path).unwrap(), PathBuf::from("relative/imgs"));
    }
}
