//! Storage key → public URL resolution.
//!
//! Preview payloads and cover images reference files by storage key
//! (`shots/login.png`), not by URL. Before anything is rendered each key is
//! resolved against the configured public bucket. Keys that cannot be
//! resolved are dropped from the slide list rather than rendered as broken
//! images; if that empties the list the page shows its "no images"
//! placeholder instead of a carousel.

use crate::config::StorageConfig;
use crate::types::Slide;

/// Turns a storage key into a directly fetchable URL.
pub trait StorageResolver {
    /// Public URL for `key` in `bucket`, or `None` when it cannot be resolved.
    fn public_url(&self, key: &str, bucket: &str) -> Option<String>;
}

/// Resolver for a hosted object store exposing public buckets under
/// `{base_url}/storage/v1/object/public/{bucket}/{key}`.
///
/// - Blank keys are unresolvable.
/// - Keys that already are `http://` or `https://` URLs pass through.
/// - Without a `base_url`, relative keys are unresolvable.
#[derive(Debug, Clone)]
pub struct BucketResolver {
    base_url: String,
}

impl BucketResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.base_url)
    }
}

impl StorageResolver for BucketResolver {
    fn public_url(&self, key: &str, bucket: &str) -> Option<String> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        if is_absolute_url(key) {
            return Some(key.to_string());
        }
        if self.base_url.is_empty() {
            return None;
        }
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return None;
        }
        Some(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, key
        ))
    }
}

pub(crate) fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Resolve every slide's key, dropping slides that cannot be resolved.
///
/// Order and captions are preserved.
pub fn resolve_slides<R: StorageResolver + ?Sized>(
    slides: Vec<Slide>,
    resolver: &R,
    bucket: &str,
) -> Vec<Slide> {
    slides
        .into_iter()
        .filter_map(|slide| {
            resolver
                .public_url(&slide.src, bucket)
                .filter(|url| !url.is_empty())
                .map(|src| Slide {
                    src,
                    caption: slide.caption,
                })
        })
        .collect()
}
