//! # Simple Folio
//!
//! A static site generator for project portfolios. A project list and a
//! preview table, both exported as JSON from the hosted database, become a
//! home page of project cards plus one page per project with a screenshot
//! carousel, a markdown overview and a feature list.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (projects + previews → resolved pages)
//! 2. Generate  manifest  →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON: every slide URL in it is final, and
//! every degraded page (dropped entries, missing previews, unresolvable keys)
//! is recorded there so the CLI can report it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: loads content, fetches previews in parallel, produces the manifest |
//! | [`generate`] | Stage 2: renders the final HTML site from the manifest using Maud |
//! | [`page`] | Per-project controller: slug → project → preview fetch → view, with stale-fetch rejection |
//! | [`preview`] | Normalizes the loosely-shaped `preview` column into an ordered slide list |
//! | [`carousel`] | Carousel state machine: index, pause, swipe, autoplay timer |
//! | [`storage`] | Turns storage keys into public bucket URLs |
//! | [`source`] | Preview table access behind the [`source::PreviewSource`] trait |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared types serialized in the manifest (`Project`, `Slide`, `Feature`) |
//! | [`naming`] | Project name ↔ URL slug convention |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Degrade, Don't Fail
//!
//! Real preview data is messy. A preview entry with no usable source is
//! skipped, a project with no preview row shows its cover, a key that can't
//! be resolved is dropped from the carousel, and a project with nothing at
//! all still gets a page with a "no images" placeholder. Only operational
//! problems (unreadable files, invalid config, duplicate slugs) stop a build.
//!
//! ## One Carousel, Two Runtimes
//!
//! [`carousel::Carousel`] decides the initial markup at build time and is the
//! reference for `static/carousel.js`, which drives the same transitions in
//! the browser: wrap-around navigation, hover pause, a swipe threshold, and
//! an autoplay timer that restarts only when the slide count, interval or
//! pause state changes. Manual navigation keeps the running cadence, and the
//! timer never runs for a single slide.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). All interpolation
//! is auto-escaped, which matters here: captions and project names come
//! straight from database exports. Project overviews are markdown from the
//! same exports; raw HTML inside them is rendered as text.

pub mod carousel;
pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod page;
pub mod preview;
pub mod scan;
pub mod source;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
