//! Shared types used across both pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → generate)
//! and read from the exported project list, so they must stay stable.

use serde::{Deserialize, Serialize};

/// A portfolio project, as exported from the hosted project list.
///
/// Read-only: nothing in the pipeline mutates a project after loading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Cover image key, used as the carousel fallback when the preview is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
}

/// A titled group of feature bullets shown under the carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub category: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// One carousel slide. `src` is never empty once a slide leaves the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub src: String,
    #[serde(default)]
    pub caption: String,
}

impl Slide {
    pub fn new(src: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            caption: caption.into(),
        }
    }
}
