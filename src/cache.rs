//! Thumbnail cache for log images.
//!
//! Decoding and resampling a large photo is the slowest part of a build, and
//! the dev loop rebuilds on every save. This module lets the image pass skip
//! that work when a source image hasn't changed since its thumbnail was made.
//!
//! # Design
//!
//! The cache is **content-addressed**: each source image is keyed by its file
//! name and remembered together with the SHA-256 of its contents. Content
//! rather than mtime, so it survives `git checkout` (which resets
//! modification times).
//!
//! A cache hit requires:
//! 1. An entry for the source name with a matching `source_hash`
//! 2. If the entry names a thumbnail, that file still exists on disk
//!
//! A source whose contents changed is re-planned, so a replaced photo never
//! keeps serving the thumbnail of the old one. Sources that were small
//! enough to publish as is are cached too (with no thumbnail), which skips
//! the dimension read on later builds.
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<log-images>/.thumbnails.json`, next to
//! the thumbnails it describes. Asset copies skip dotfiles, so it never
//! reaches the published site.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the log-images directory.
pub const MANIFEST_FILENAME: &str = ".thumbnails.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// What is known about one source image.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    /// File name of the derived thumbnail, if one was needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// On-disk manifest mapping source image names to their cache entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
    #[serde(skip)]
    dirty: bool,
}

impl CacheManifest {
    /// Create an empty manifest (first build, or after corruption).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load from the log-images directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(dir: &Path) -> Self {
        let path = manifest_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Ignoring unreadable thumbnail cache {}: {}", path.display(), e);
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the log-images directory. Does nothing when no entry changed.
    pub fn save(&mut self, dir: &Path) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(dir), json)?;
        self.dirty = false;
        Ok(())
    }

    /// Look up a source image by name and content hash.
    ///
    /// Returns the entry only if the hash matches **and** any recorded
    /// thumbnail is still present in `dir`.
    pub fn find_cached(&self, source_name: &str, source_hash: &str, dir: &Path) -> Option<&CacheEntry> {
        let entry = self.entries.get(source_name)?;
        if entry.source_hash != source_hash {
            return None;
        }
        match &entry.thumbnail {
            Some(thumb) if !dir.join(thumb).exists() => None,
            _ => Some(entry),
        }
    }

    /// Record the outcome for a source image, replacing any older entry.
    pub fn insert(&mut self, source_name: String, source_hash: String, thumbnail: Option<String>) {
        let entry = CacheEntry {
            source_hash,
            thumbnail,
        };
        if self.entries.get(&source_name) != Some(&entry) {
            self.entries.insert(source_name, entry);
            self.dirty = true;
        }
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} checked ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} checked", self.misses)
        }
    }
}

/// Resolve the cache manifest path for a log-images directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILENAME)
}
