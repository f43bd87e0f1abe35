//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by the user's `config.toml` in the content root.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_title = "Projects"
//!
//! [storage]
//! base_url = ""             # Hosted storage origin; empty = relative keys unresolvable
//! bucket = "projects"       # Public bucket holding preview images
//!
//! [carousel]
//! interval_ms = 7500        # Autoplay interval
//! swipe_threshold = 40      # Minimum touch travel (px) for a swipe
//!
//! [loading]
//! min_delay_ms = 300        # Minimum time the loading view stays up
//!
//! [nav]
//! sections = [{ id = "projects", title = "Projects" }]
//!
//! [theme]
//! carousel_aspect = "16 / 9"
//! thumbnail_size = "4.5rem"
//! content_width = "64rem"
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"    # Nav, captions, bullets
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//!
//! [processing]
//! max_processes = 4         # Max parallel preview fetches (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [storage]
//! base_url = "https://xyz.supabase.co"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Title of the index page and suffix of every page title.
    pub site_title: String,
    /// Where preview images live.
    pub storage: StorageConfig,
    /// Carousel behavior.
    pub carousel: CarouselConfig,
    /// Loading view settings.
    pub loading: LoadingConfig,
    /// In-page sections linked from the site nav.
    pub nav: NavConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Layout settings.
    pub theme: ThemeConfig,
    /// Parallel fetch settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Projects".to_string(),
            storage: StorageConfig::default(),
            carousel: CarouselConfig::default(),
            loading: LoadingConfig::default(),
            nav: NavConfig::default(),
            colors: ColorConfig::default(),
            theme: ThemeConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be greater than 0".into(),
            ));
        }
        if self.carousel.swipe_threshold == 0 {
            return Err(ConfigError::Validation(
                "carousel.swipe_threshold must be greater than 0".into(),
            ));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.bucket must not be empty".into(),
            ));
        }
        let base = self.storage.base_url.trim();
        if !base.is_empty() && !crate::storage::is_absolute_url(base) {
            return Err(ConfigError::Validation(
                "storage.base_url must start with http:// or https://".into(),
            ));
        }
        if let Some(section) = self.nav.sections.iter().find(|s| s.id.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "nav section '{}' has an empty id",
                section.title
            )));
        }
        Ok(())
    }
}

/// Hosted storage settings used to turn image keys into public URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Storage origin, e.g. `https://xyz.supabase.co`. Empty disables
    /// resolution of relative keys; absolute URLs still work.
    pub base_url: String,
    /// Public bucket name.
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bucket: "projects".to_string(),
        }
    }
}

/// Carousel behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Autoplay interval in milliseconds.
    pub interval_ms: u64,
    /// Minimum horizontal touch travel in pixels for a swipe.
    pub swipe_threshold: u32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: crate::carousel::DEFAULT_INTERVAL_MS,
            swipe_threshold: crate::carousel::SWIPE_THRESHOLD as u32,
        }
    }
}

/// Loading view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    /// Minimum time the loading view is shown, even when data is ready.
    pub min_delay_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self { min_delay_ms: 300 }
    }
}

/// Site navigation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// Sections of the home page, linked from every page's nav.
    pub sections: Vec<NavSection>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            sections: vec![NavSection {
                id: "projects".to_string(),
                title: "Projects".to_string(),
            }],
        }
    }
}

/// A named anchor on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavSection {
    pub id: String,
    pub title: String,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel preview fetches.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// CSS aspect ratio of the carousel viewport.
    pub carousel_aspect: String,
    /// Edge length of thumbnail strip images (CSS value).
    pub thumbnail_size: String,
    /// Maximum width of the page content column (CSS value).
    pub content_width: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            carousel_aspect: "16 / 9".to_string(),
            thumbnail_size: "4.5rem".to_string(),
            content_width: "64rem".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Muted/secondary text color (nav, captions, feature bullets).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Simple Folio Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at content/config.toml. Unknown keys will cause an error.

# Title of the index page, also appended to every page title.
site_title = "Projects"

# ---------------------------------------------------------------------------
# Storage
# ---------------------------------------------------------------------------
[storage]
# Origin of the hosted storage service. Image keys in projects.json and
# previews.json resolve to {base_url}/storage/v1/object/public/{bucket}/{key}.
# Leave empty to only accept absolute http(s) URLs; relative keys are then
# dropped from the carousel.
base_url = ""

# Public bucket holding preview images.
bucket = "projects"

# ---------------------------------------------------------------------------
# Carousel
# ---------------------------------------------------------------------------
[carousel]
# Time between automatic slide changes, in milliseconds.
# Hovering the carousel pauses it.
interval_ms = 7500

# Minimum horizontal touch travel, in pixels, for a swipe to change slides.
swipe_threshold = 40

# ---------------------------------------------------------------------------
# Loading view
# ---------------------------------------------------------------------------
[loading]
# Minimum time the loading view stays up, to avoid a flash of loading state.
min_delay_ms = 300

# ---------------------------------------------------------------------------
# Navigation
# ---------------------------------------------------------------------------
[nav]
# Sections of the home page linked from the site nav. On the home page the
# links scroll in place; elsewhere they navigate to /#id.
sections = [{ id = "projects", title = "Projects" }]

# ---------------------------------------------------------------------------
# Theme / layout
# ---------------------------------------------------------------------------
[theme]
# Aspect ratio of the carousel viewport (CSS aspect-ratio value).
carousel_aspect = "16 / 9"

# Edge length of images in the thumbnail strip (CSS value).
thumbnail_size = "4.5rem"

# Maximum width of the page content column (CSS value).
content_width = "64rem"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Nav, captions, feature bullets
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel preview fetches.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --carousel-aspect: {carousel_aspect};
    --thumbnail-size: {thumbnail_size};
    --content-width: {content_width};
}}"#,
        carousel_aspect = theme.carousel_aspect,
        thumbnail_size = theme.thumbnail_size,
        content_width = theme.content_width,
    )
}
