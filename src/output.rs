//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every project leads
//! with its positional index and name; its slug, cover and any problems
//! found while normalizing its preview are shown as indented context lines.
//! Nothing a visitor would notice (a dropped screenshot, a missing preview
//! row) goes unreported, even though the site itself degrades silently.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Projects
//! 001 Lumen (3 slides)
//!     Slug: lumen
//!     Overview: A lighting planner for small venues.
//! 002 Tide Tables (2 slides)
//!     Slug: tide_tables
//!     Warning: 1 preview entry dropped (no image source)
//! 003 Quiet Hours (1 slide)
//!     Slug: quiet_hours
//!     Preview: none, showing cover
//! 004 Ledger (no images)
//!     Slug: ledger
//!
//! Sections
//! 001 Projects
//! 002 About
//!     Source: about.md
//!
//! Config
//!     config.toml
//!     previews.json
//!     assets/
//! ```
//!
//! ## Fetch progress
//!
//! ```text
//! Fetched Lumen
//! Fetched Quiet Hours (no preview row)
//! Failed Ledger: connection reset
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! Not found → 404.html
//! 001 Lumen → lumen/index.html
//! 002 Tide Tables → tide_tables/index.html
//! Generated 2 project pages
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects. The one exception is [`format_scan_output`],
//! which checks the content root for the optional files it lists.

use crate::page::PageData;
use crate::scan::{FetchEvent, Manifest, PREVIEWS_FILE};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `1 slide`, `2 slides`, or `no images`.
fn slide_count(n: usize) -> String {
    match n {
        0 => "no images".to_string(),
        1 => "1 slide".to_string(),
        n => format!("{} slides", n),
    }
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

/// First line of a markdown overview, without emphasis markers.
fn overview_preview(markdown: &str, max: usize) -> String {
    let first = markdown
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let plain: String = first
        .trim_start_matches('#')
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    truncate_desc(plain.trim(), max)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
    }
}

/// Context lines describing how a page's preview was assembled.
fn page_context(page: &PageData) -> Vec<String> {
    let mut lines = vec![format!("    Slug: {}", page.slug)];

    if let Some(overview) = &page.project.overview {
        let preview = overview_preview(overview, 60);
        if !preview.is_empty() {
            lines.push(format!("    Overview: {}", preview));
        }
    }
    if page.used_fallback {
        lines.push("    Preview: none, showing cover".to_string());
    }
    if page.dropped > 0 {
        lines.push(format!(
            "    Warning: {} dropped (no image source)",
            plural(page.dropped, "preview entry", "preview entries")
        ));
    }
    if page.unresolved > 0 {
        lines.push(format!(
            "    Warning: {} not resolvable to a URL",
            plural(page.unresolved, "image key", "image keys")
        ));
    }
    lines
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output: projects, home sections, config inventory.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Projects".to_string()];

    for (i, page) in manifest.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            page.project.name,
            slide_count(page.slides.len())
        ));
        lines.extend(page_context(page));
    }

    if !manifest.sections.is_empty() {
        lines.push(String::new());
        lines.push("Sections".to_string());
        for (i, section) in manifest.sections.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), section.title));
            if section.body.is_some() {
                lines.push(format!("    Source: {}.md", section.id));
            }
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    for file in ["config.toml", PREVIEWS_FILE] {
        if source_root.join(file).exists() {
            lines.push(format!("    {}", file));
        }
    }
    if source_root.join(crate::generate::ASSETS_DIR).is_dir() {
        lines.push(format!("    {}/", crate::generate::ASSETS_DIR));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

/// Format a single fetch progress event as display lines.
pub fn format_fetch_event(event: &FetchEvent) -> Vec<String> {
    match event {
        FetchEvent::Fetched {
            name, found: true, ..
        } => vec![format!("Fetched {}", name)],
        FetchEvent::Fetched {
            name, found: false, ..
        } => vec![format!("Fetched {} (no preview row)", name)],
        FetchEvent::Failed { name, error } => vec![format!("Failed {}: {}", name, error)],
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output showing generated HTML files.
pub fn format_generate_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec![
        "Home \u{2192} index.html".to_string(),
        "Not found \u{2192} 404.html".to_string(),
    ];

    for (i, page) in manifest.pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}/index.html",
            format_index(i + 1),
            page.project.name,
            page.slug
        ));
    }

    lines.push(format!(
        "Generated {}",
        plural(manifest.pages.len(), "project page", "project pages")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &Manifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
