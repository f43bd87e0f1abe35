//! Content loading and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads the content directory, fetches every
//! project's preview row, and produces a manifest of fully resolved pages
//! that the generate stage renders without further lookups.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml        # Site configuration (optional)
//! ├── projects.json      # Project list (required)
//! ├── previews.json      # Preview table export (optional)
//! ├── about.md           # Body of the home section with id "about" (optional)
//! └── assets/            # Copied verbatim to the output root
//! ```
//!
//! ## Fetching
//!
//! Each project gets its own [`PageController`]. Preview fetches run in
//! parallel on the rayon pool; progress is reported through an optional
//! channel so the CLI can print while work is still in flight. Results are
//! committed back on the calling thread, where the controllers live, and a
//! result whose ticket is no longer current is dropped.
//!
//! ## Validation
//!
//! - `projects.json` must exist and parse
//! - Every project name must produce a non-empty slug
//! - No two projects may share a slug

use crate::config::{self, NavSection, SiteConfig};
use crate::naming::{is_path_safe, project_slug};
use crate::page::{FetchTicket, PageController, PageData, lookup};
use crate::source::{JsonTableSource, PreviewRow, PreviewSource, SourceError};
use crate::storage::{BucketResolver, StorageResolver};
use crate::types::Project;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

pub const PROJECTS_FILE: &str = "projects.json";
pub const PREVIEWS_FILE: &str = "previews.json";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Preview source error: {0}")]
    Source(#[from] SourceError),
    #[error("Project list not found: {0}")]
    MissingProjects(PathBuf),
    #[error("Project {0} has a name that produces an empty slug")]
    EmptySlug(u64),
    #[error("Two projects share the slug '{0}'")]
    DuplicateSlug(String),
    #[error("Project {id} has slug '{slug}', which is not a plain directory name")]
    UnsafeSlug { id: u64, slug: String },
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    /// One entry per project, in project-list order.
    pub pages: Vec<PageData>,
    /// Home page sections, in nav order.
    pub sections: Vec<HomeSection>,
    pub config: SiteConfig,
}

/// A section of the home page. The body comes from `content/{id}.md`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSection {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
}

/// A single page visit: the controller plus what rendering it needs.
#[derive(Debug)]
pub struct PageVisit {
    pub controller: PageController,
    pub projects: Vec<Project>,
    pub config: SiteConfig,
}

/// Progress reported while preview fetches are in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    Fetched {
        name: String,
        slug: String,
        found: bool,
    },
    /// The fetch failed; the page falls back to the project's own cover.
    Failed { name: String, error: String },
}

pub fn scan(root: &Path, events: Option<Sender<FetchEvent>>) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config, events)
}

/// Scan with a config the caller has already loaded.
pub fn scan_with_config(
    root: &Path,
    config: SiteConfig,
    events: Option<Sender<FetchEvent>>,
) -> Result<Manifest, ScanError> {
    let projects = load_projects(root)?;
    validate_slugs(&projects)?;
    let source = JsonTableSource::load(&root.join(PREVIEWS_FILE))?;
    let resolver = BucketResolver::from_config(&config.storage);

    let sections = home_sections(&config.nav.sections, root)?;

    let pages = build_pages(&projects, &source, &resolver, &config, events.as_ref());
    Ok(Manifest {
        pages,
        sections,
        config,
    })
}

/// Resolve a single slug the way a page visit would.
///
/// Unknown slugs are not an error: the returned controller reports
/// [`crate::page::View::NotFound`].
pub fn scan_page(root: &Path, slug: &str) -> Result<PageVisit, ScanError> {
    let config = config::load_config(root)?;
    let projects = load_projects(root)?;
    let source = JsonTableSource::load(&root.join(PREVIEWS_FILE))?;
    let resolver = BucketResolver::from_config(&config.storage);

    let mut controller = PageController::new(
        slug,
        &config.storage.bucket,
        config.loading.min_delay_ms,
        0,
    );
    if let Some(ticket) = controller.resolve(lookup(Some(&projects), slug)) {
        let row = source.fetch(ticket.project_id())?;
        controller.commit(ticket, row, &resolver);
    }
    Ok(PageVisit {
        controller,
        projects,
        config,
    })
}

/// Home sections from config, with markdown bodies from `content/{id}.md`.
pub fn home_sections(sections: &[NavSection], root: &Path) -> Result<Vec<HomeSection>, ScanError> {
    sections
        .iter()
        .map(|s| -> Result<HomeSection, ScanError> {
            let md_path = root.join(format!("{}.md", s.id));
            let body = if md_path.is_file() {
                Some(fs::read_to_string(&md_path)?).filter(|b| !b.trim().is_empty())
            } else {
                None
            };
            Ok(HomeSection {
                id: s.id.clone(),
                title: s.title.clone(),
                body,
            })
        })
        .collect()
}

/// Load and parse `projects.json` from the content root.
pub fn load_projects(root: &Path) -> Result<Vec<Project>, ScanError> {
    let path = root.join(PROJECTS_FILE);
    if !path.exists() {
        return Err(ScanError::MissingProjects(path));
    }
    let content = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

fn validate_slugs(projects: &[Project]) -> Result<(), ScanError> {
    let mut seen = HashSet::new();
    for project in projects {
        let slug = project_slug(&project.name);
        if slug.is_empty() {
            return Err(ScanError::EmptySlug(project.id));
        }
        if !is_path_safe(&slug) {
            return Err(ScanError::UnsafeSlug {
                id: project.id,
                slug,
            });
        }
        if !seen.insert(slug.clone()) {
            return Err(ScanError::DuplicateSlug(slug));
        }
    }
    Ok(())
}

/// Drive one controller per project through resolve → fetch → commit.
pub fn build_pages<S, R>(
    projects: &[Project],
    source: &S,
    resolver: &R,
    config: &SiteConfig,
    events: Option<&Sender<FetchEvent>>,
) -> Vec<PageData>
where
    S: PreviewSource + ?Sized,
    R: StorageResolver + ?Sized,
{
    let mut controllers: Vec<PageController> = projects
        .iter()
        .map(|p| {
            PageController::new(
                &project_slug(&p.name),
                &config.storage.bucket,
                config.loading.min_delay_ms,
                0,
            )
        })
        .collect();

    let tickets: Vec<(usize, FetchTicket)> = controllers
        .iter_mut()
        .enumerate()
        .filter_map(|(idx, controller)| {
            let found = lookup(Some(projects), controller.slug());
            controller.resolve(found).map(|ticket| (idx, ticket))
        })
        .collect();

    let results: Vec<(usize, FetchTicket, Option<PreviewRow>)> = tickets
        .into_par_iter()
        .map(|(idx, ticket)| {
            let project = &projects[idx];
            let row = match source.fetch(ticket.project_id()) {
                Ok(row) => {
                    notify(
                        events,
                        FetchEvent::Fetched {
                            name: project.name.clone(),
                            slug: project_slug(&project.name),
                            found: row.is_some(),
                        },
                    );
                    row
                }
                Err(e) => {
                    notify(
                        events,
                        FetchEvent::Failed {
                            name: project.name.clone(),
                            error: e.to_string(),
                        },
                    );
                    None
                }
            };
            (idx, ticket, row)
        })
        .collect();

    for (idx, ticket, row) in results {
        controllers[idx].commit(ticket, row, resolver);
    }

    controllers
        .into_iter()
        .filter_map(PageController::into_page)
        .collect()
}

fn notify(events: Option<&Sender<FetchEvent>>, event: FetchEvent) {
    if let Some(tx) = events {
        // The printer may have gone away; progress is best effort.
        let _ = tx.send(event);
    }
}
