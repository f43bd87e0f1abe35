//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scan manifest and renders the
//! final static site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): home sections plus a grid of project cards
//! - **Project pages** (`/{slug}/index.html`): carousel, overview, features
//! - **Not-found page** (`/404.html`): shown for unknown slugs
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── lumen/
//! │   └── index.html
//! ├── tide_tables/
//! │   └── index.html
//! └── ...                # plus everything from content/assets/
//! ```
//!
//! ## Carousel Markup
//!
//! Every slide is rendered up front. The current slide carries `is-active`;
//! the others stay in the DOM, visually suppressed, so cross-fades work and
//! in-flight image loads survive navigation. Prev/next buttons, the
//! thumbnail strip and the carousel script are only emitted for two or more
//! slides. Interval and swipe threshold travel to the script as `data-`
//! attributes.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors and layout injected from config)
//! - `static/carousel.js`: Autoplay, hover pause, swipe and thumbnail navigation

use crate::carousel::Carousel;
use crate::config::{self, NavSection, SiteConfig};
use crate::naming::is_path_safe;
use crate::page::{PageData, View};
use crate::scan::Manifest;
use crate::types::{Feature, Slide};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Parser, html as md_html};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Refusing to write page for slug '{0}' outside the output directory")]
    UnsafeSlug(String),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/carousel.js");

/// Name of the static-asset directory inside the content root.
pub const ASSETS_DIR: &str = "assets";

/// One entry in the site nav's project list.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub title: String,
    pub slug: String,
}

/// Everything shared by all pages of one build.
pub struct SiteContext<'a> {
    pub config: &'a SiteConfig,
    pub css: String,
    pub projects: Vec<NavEntry>,
}

impl<'a> SiteContext<'a> {
    pub fn new(config: &'a SiteConfig, projects: Vec<NavEntry>) -> Self {
        let css = format!(
            "{}\n\n{}\n\n{}",
            config::generate_color_css(&config.colors),
            config::generate_theme_css(&config.theme),
            CSS_STATIC
        );
        Self {
            config,
            css,
            projects,
        }
    }

    fn page_title(&self, title: &str) -> String {
        format!("{} · {}", title, self.config.site_title)
    }
}

/// Read the scan manifest and write the site into `output_dir`.
pub fn generate(
    manifest_path: &Path,
    output_dir: &Path,
    source_dir: &Path,
) -> Result<Manifest, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    write_site(&manifest, output_dir, source_dir)?;
    Ok(manifest)
}

/// Render every page of `manifest` into `output_dir`.
pub fn write_site(
    manifest: &Manifest,
    output_dir: &Path,
    source_dir: &Path,
) -> Result<(), GenerateError> {
    if let Some(page) = manifest.pages.iter().find(|p| !is_path_safe(&p.slug)) {
        return Err(GenerateError::UnsafeSlug(page.slug.clone()));
    }

    let nav = manifest
        .pages
        .iter()
        .map(|p| NavEntry {
            title: p.project.name.clone(),
            slug: p.slug.clone(),
        })
        .collect();
    let ctx = SiteContext::new(&manifest.config, nav);

    fs::create_dir_all(output_dir)?;
    copy_assets(&source_dir.join(ASSETS_DIR), output_dir)?;

    let index_html = render_index(manifest, &ctx);
    fs::write(output_dir.join("index.html"), index_html.into_string())?;

    let not_found_html = render_not_found(&ctx);
    fs::write(output_dir.join("404.html"), not_found_html.into_string())?;

    for page in &manifest.pages {
        let page_dir = output_dir.join(&page.slug);
        fs::create_dir_all(&page_dir)?;
        let html = render_project_page(page, &ctx);
        fs::write(page_dir.join("index.html"), html.into_string())?;
    }

    Ok(())
}

/// Copy `content/assets/` into the output root. A missing directory is fine.
fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<(), GenerateError> {
    if !assets_dir.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(assets_dir).min_depth(1) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(assets_dir) else {
            continue;
        };
        let dst = output_dir.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
        } else {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dst)?;
        }
    }
    Ok(())
}

/// Render whatever a page controller says should be on screen.
///
/// Used by `simple-folio render <slug>`.
pub fn render_view(view: View<'_>, ctx: &SiteContext) -> Markup {
    match view {
        View::Loading => render_loading(ctx),
        View::NotFound => render_not_found(ctx),
        View::Empty(page) | View::Content(page) => render_project_page(page, ctx),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb and navigation
fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Link target for a home-page section.
///
/// On the home page the link scrolls in place; everywhere else it navigates
/// home first.
pub fn section_href(section_id: &str, current_path: &str) -> String {
    if current_path.is_empty() {
        format!("#{section_id}")
    } else {
        format!("/#{section_id}")
    }
}

/// Renders the navigation menu (hamburger style, slides from right).
///
/// `current_path` is the slug of the page being rendered, or empty for home.
pub fn render_nav(projects: &[NavEntry], sections: &[NavSection], current_path: &str) -> Markup {
    html! {
        input.nav-toggle type="checkbox" id="nav-toggle";
        label.nav-hamburger for="nav-toggle" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        div.nav-panel {
            label.nav-close for="nav-toggle" { "×" }
            ul {
                @for section in sections {
                    li.nav-section {
                        a href=(section_href(&section.id, current_path)) { (section.title) }
                    }
                }
                li.nav-separator role="separator" {}
                @for entry in projects {
                    @let is_current = entry.slug == current_path;
                    li class=[is_current.then_some("current")] {
                        a href={ "/" (entry.slug) "/" } { (entry.title) }
                    }
                }
            }
        }
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

/// Markdown from exported data: raw HTML is shown as text, never passed through.
fn untrusted_markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

/// Renders the slide carousel, or the "no images" placeholder.
pub fn render_carousel(slides: &[Slide], title: &str, config: &config::CarouselConfig) -> Markup {
    if slides.is_empty() {
        return html! {
            div.carousel-empty role="status" { "No images yet" }
        };
    }

    let carousel = Carousel::new(slides.len(), config.interval_ms);
    let controls = carousel.shows_controls();
    html! {
        section.carousel
            aria-roledescription="carousel"
            aria-label={ (title) " screenshots" }
            data-interval=(carousel.interval_ms())
            data-swipe-threshold=(config.swipe_threshold)
            data-count=(slides.len())
        {
            div.carousel-viewport {
                @for (idx, slide) in slides.iter().enumerate() {
                    @let active = carousel.is_active(idx);
                    figure.carousel-slide.is-active[active]
                        data-index=(idx)
                        aria-hidden=(if active { "false" } else { "true" })
                    {
                        img src=(slide.src)
                            alt=(slide_alt(slide, title, idx))
                            loading=(if idx == 0 { "eager" } else { "lazy" });
                        @if !slide.caption.is_empty() {
                            figcaption { (slide.caption) }
                        }
                    }
                }
            }
            @if controls {
                button.carousel-prev type="button" data-action="prev" aria-label="Previous slide" { "‹" }
                button.carousel-next type="button" data-action="next" aria-label="Next slide" { "›" }
                div.carousel-thumbs role="tablist" {
                    @for (idx, slide) in slides.iter().enumerate() {
                        @let active = carousel.is_active(idx);
                        button.carousel-thumb.is-active[active]
                            type="button"
                            role="tab"
                            data-index=(idx)
                            aria-selected=(if active { "true" } else { "false" })
                            aria-label={ "Show slide " (idx + 1) }
                        {
                            img src=(slide.src) alt="" loading="lazy";
                        }
                    }
                }
            }
        }
    }
}

fn slide_alt(slide: &Slide, title: &str, idx: usize) -> String {
    if slide.caption.is_empty() {
        format!("{} screenshot {}", title, idx + 1)
    } else {
        slide.caption.clone()
    }
}

fn render_features(features: &[Feature]) -> Markup {
    html! {
        div.feature-grid {
            @for feature in features {
                div.feature {
                    h3 { (feature.category) }
                    @if !feature.bullets.is_empty() {
                        ul {
                            @for bullet in &feature.bullets {
                                li { (bullet) }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: configured sections, with the project grid in the
/// `projects` section.
fn render_index(manifest: &Manifest, ctx: &SiteContext) -> Markup {
    let nav = render_nav(&ctx.projects, &ctx.config.nav.sections, "");

    let breadcrumb = html! {
        a href="/" { (ctx.config.site_title) }
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        main.index-page {
            @for section in &manifest.sections {
                section.home-section id=(section.id) {
                    h2 { (section.title) }
                    @if section.id == PROJECTS_SECTION {
                        (render_project_grid(&manifest.pages))
                    }
                    @if let Some(body) = &section.body {
                        article.section-body {
                            (PreEscaped(markdown_to_html(body)))
                        }
                    }
                }
            }
            @if !manifest.sections.iter().any(|s| s.id == PROJECTS_SECTION) {
                section.home-section id=(PROJECTS_SECTION) {
                    (render_project_grid(&manifest.pages))
                }
            }
        }
    };

    base_document(&ctx.config.site_title, &ctx.css, None, content)
}

/// Id of the home section that holds the project grid.
pub const PROJECTS_SECTION: &str = "projects";

fn render_project_grid(pages: &[PageData]) -> Markup {
    html! {
        div.project-grid {
            @for page in pages {
                a.project-card href={ "/" (page.slug) "/" } {
                    @if let Some(cover) = &page.cover {
                        img src=(cover) alt=(page.project.name) loading="lazy";
                    } @else {
                        span.project-card-blank {}
                    }
                    span.project-title { (page.project.name) }
                }
            }
        }
    }
}

/// Renders a project detail page.
fn render_project_page(page: &PageData, ctx: &SiteContext) -> Markup {
    let nav = render_nav(&ctx.projects, &ctx.config.nav.sections, &page.slug);
    let title = &page.project.name;
    let has_controls = page.slides.len() > 1;

    let breadcrumb = html! {
        a href="/" { (ctx.config.site_title) }
        " › "
        (title)
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        main.project-page {
            header.project-header {
                h1 { (title) }
            }
            (render_carousel(&page.slides, title, &ctx.config.carousel))
            @if let Some(overview) = page.project.overview.as_deref().filter(|o| !o.trim().is_empty()) {
                section.project-overview id="overview" {
                    h2 { "Overview" }
                    article { (PreEscaped(untrusted_markdown_to_html(overview))) }
                }
            }
            @if !page.features.is_empty() {
                section.project-features id="features" {
                    h2 { "Features" }
                    (render_features(&page.features))
                }
            }
        }
        @if has_controls {
            script { (PreEscaped(JS)) }
        }
    };

    base_document(&ctx.page_title(title), &ctx.css, Some("project-view"), content)
}

/// Renders the page shown for an unknown slug.
fn render_not_found(ctx: &SiteContext) -> Markup {
    let nav = render_nav(&ctx.projects, &ctx.config.nav.sections, "404");

    let breadcrumb = html! {
        a href="/" { (ctx.config.site_title) }
    };

    let content = html! {
        (site_header(breadcrumb, nav))
        main.not-found-page {
            h1 { "Project not found" }
            p { "There is no project at this address." }
            p { a href={ (section_href(PROJECTS_SECTION, "404")) } { "Back to all projects" } }
        }
    };

    base_document(&ctx.page_title("Not found"), &ctx.css, None, content)
}

/// Renders the placeholder shown while a project is still resolving.
fn render_loading(ctx: &SiteContext) -> Markup {
    let content = html! {
        main.loading-page aria-busy="true" {
            div.loading-indicator role="status" { "Loading…" }
        }
    };
    base_document(&ctx.page_title("Loading"), &ctx.css, None, content)
}

// ============================================================================
// Tests
// ============================================================================
