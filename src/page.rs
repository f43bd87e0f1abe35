//! Project page controller.
//!
//! Drives one project page from a slug to a renderable view:
//!
//! ```text
//! ResolvingProject ──(no match)──────────────▶ NotFound
//!        │
//!        └─(match)──▶ LoadingImages ──(fetch committed)──▶ Ready
//! ```
//!
//! The project list and the preview fetch are independent reads that may
//! complete in any order. Every fetch is issued with a [`FetchTicket`]
//! carrying the controller's generation at the time; resolving to a
//! different project (or losing the project) bumps the generation, so a late
//! result for a superseded fetch is discarded on [`PageController::commit`]
//! instead of overwriting the current page.
//!
//! The view also honors a minimum loading delay: until `min_delay_ms` has
//! passed since the controller started, [`PageController::view`] reports
//! [`View::Loading`] even if everything is ready.

use crate::naming::{find_by_slug, project_slug};
use crate::preview::normalize_with_report;
use crate::source::PreviewRow;
use crate::storage::{StorageResolver, resolve_slides};
use crate::types::{Feature, Project, Slide};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of matching a slug against the project list.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectLookup {
    /// The project list hasn't loaded yet.
    Pending,
    /// The list loaded and nothing matches.
    Missing,
    Found(Project),
}

/// Match `slug` against a project list that may still be loading.
pub fn lookup(projects: Option<&[Project]>, slug: &str) -> ProjectLookup {
    match projects {
        None => ProjectLookup::Pending,
        Some(list) => match find_by_slug(list, slug) {
            Some(project) => ProjectLookup::Found(project.clone()),
            None => ProjectLookup::Missing,
        },
    }
}

/// Handle for one in-flight preview fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    project_id: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }
}

/// Everything a project page needs to render, with URLs already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    pub project: Project,
    pub slug: String,
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Resolved cover URL, used for index cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Preview entries skipped for lack of a source.
    #[serde(default)]
    pub dropped: usize,
    /// Slides removed because their storage key didn't resolve.
    #[serde(default)]
    pub unresolved: usize,
    /// The carousel shows only the fallback cover.
    #[serde(default)]
    pub used_fallback: bool,
}

impl PageData {
    /// Build page data from a fetched row (or its absence).
    ///
    /// The row's cover and features take precedence over the project list's.
    pub fn build<R: StorageResolver + ?Sized>(
        project: Project,
        row: Option<PreviewRow>,
        resolver: &R,
        bucket: &str,
    ) -> Self {
        let (preview, row_image, row_features) = match row {
            Some(row) => (row.preview, row.image, row.features),
            None => (Value::Null, None, None),
        };
        let cover_key = row_image
            .filter(|s| !s.trim().is_empty())
            .or_else(|| project.image.clone());

        let normalized = normalize_with_report(&preview, cover_key.as_deref());
        let before = normalized.slides.len();
        let slides = resolve_slides(normalized.slides, resolver, bucket);
        let unresolved = before - slides.len();

        let cover = cover_key.and_then(|key| resolver.public_url(&key, bucket));
        let features = row_features
            .or_else(|| project.features.clone())
            .unwrap_or_default();

        Self {
            slug: project_slug(&project.name),
            project,
            slides,
            features,
            cover,
            dropped: normalized.dropped,
            unresolved,
            used_fallback: normalized.used_fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    ResolvingProject,
    NotFound,
    LoadingImages(Project),
    Ready(PageData),
}

/// What the page should display right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Loading,
    NotFound,
    /// Project resolved, but no slide survived normalization and resolution.
    Empty(&'a PageData),
    Content(&'a PageData),
}

#[derive(Debug)]
pub struct PageController {
    slug: String,
    bucket: String,
    phase: Phase,
    generation: u64,
    started_ms: u64,
    min_delay_ms: u64,
}

impl PageController {
    pub fn new(slug: &str, bucket: &str, min_delay_ms: u64, now_ms: u64) -> Self {
        Self {
            slug: slug.to_string(),
            bucket: bucket.to_string(),
            phase: Phase::ResolvingProject,
            generation: 0,
            started_ms: now_ms,
            min_delay_ms,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn current_project_id(&self) -> Option<u64> {
        match &self.phase {
            Phase::LoadingImages(project) => Some(project.id),
            Phase::Ready(data) => Some(data.project.id),
            _ => None,
        }
    }

    /// Feed a project-list lookup result.
    ///
    /// Returns a ticket when a new preview fetch must be started. Resolving
    /// to the project already shown starts nothing.
    pub fn resolve(&mut self, found: ProjectLookup) -> Option<FetchTicket> {
        match found {
            ProjectLookup::Pending => {
                if self.phase != Phase::ResolvingProject {
                    self.generation += 1;
                    self.phase = Phase::ResolvingProject;
                }
                None
            }
            ProjectLookup::Missing => {
                self.generation += 1;
                self.phase = Phase::NotFound;
                None
            }
            ProjectLookup::Found(project) => {
                if self.current_project_id() == Some(project.id) {
                    return None;
                }
                self.generation += 1;
                let ticket = FetchTicket {
                    generation: self.generation,
                    project_id: project.id,
                };
                self.phase = Phase::LoadingImages(project);
                Some(ticket)
            }
        }
    }

    /// Whether a ticket still belongs to the current fetch.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && self.current_project_id() == Some(ticket.project_id)
    }

    /// Commit a fetch result. Stale tickets are discarded and leave the page
    /// untouched; returns whether the result was applied.
    pub fn commit<R: StorageResolver + ?Sized>(
        &mut self,
        ticket: FetchTicket,
        row: Option<PreviewRow>,
        resolver: &R,
    ) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        let project = match &self.phase {
            Phase::LoadingImages(project) => project.clone(),
            Phase::Ready(data) => data.project.clone(),
            _ => return false,
        };
        self.phase = Phase::Ready(PageData::build(project, row, resolver, &self.bucket));
        true
    }

    /// The view to display at `now_ms`.
    pub fn view(&self, now_ms: u64) -> View<'_> {
        if now_ms < self.started_ms.saturating_add(self.min_delay_ms) {
            return View::Loading;
        }
        match &self.phase {
            Phase::ResolvingProject | Phase::LoadingImages(_) => View::Loading,
            Phase::NotFound => View::NotFound,
            Phase::Ready(data) if data.slides.is_empty() => View::Empty(data),
            Phase::Ready(data) => View::Content(data),
        }
    }

    /// Time at which the minimum loading delay ends.
    pub fn ready_at(&self) -> u64 {
        self.started_ms.saturating_add(self.min_delay_ms)
    }

    /// Consume the controller, yielding its page data once ready.
    pub fn into_page(self) -> Option<PageData> {
        match self.phase {
            Phase::Ready(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BucketResolver;
    use serde_json::json;

    fn project(id: u64, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            overview: None,
            image: None,
            features: None,
        }
    }

    fn row(project_id: u64, preview: Value) -> PreviewRow {
        PreviewRow {
            project_id,
            preview,
            image: None,
            features: None,
        }
    }

    fn resolver() -> BucketResolver {
        BucketResolver::new("https://s.example.com")
    }

    fn controller(slug: &str) -> PageController {
        PageController::new(slug, "projects", 0, 0)
    }

    fn url(key: &str) -> String {
        format!("https://s.example.com/storage/v1/object/public/projects/{key}")
    }

    #[test]
    fn lookup_distinguishes_pending_missing_found() {
        let list = vec![project(1, "Lumen")];
        assert_eq!(lookup(None, "lumen"), ProjectLookup::Pending);
        assert_eq!(lookup(Some(&list), "nope"), ProjectLookup::Missing);
        assert_eq!(lookup(Some(&list), "lumen"), ProjectLookup::Found(list[0].clone()));
    }

    #[test]
    fn starts_loading() {
        assert_eq!(controller("lumen").view(0), View::Loading);
    }

    #[test]
    fn pending_list_keeps_loading() {
        let mut c = controller("lumen");
        assert_eq!(c.resolve(ProjectLookup::Pending), None);
        assert_eq!(c.view(1000), View::Loading);
    }

    #[test]
    fn missing_project_is_not_found() {
        let mut c = controller("nope");
        assert_eq!(c.resolve(ProjectLookup::Missing), None);
        assert_eq!(c.view(1000), View::NotFound);
    }

    #[test]
    fn found_project_loads_then_shows_content() {
        let mut c = controller("lumen");
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        assert_eq!(ticket.project_id(), 1);
        assert_eq!(c.view(1000), View::Loading);

        assert!(c.commit(ticket, Some(row(1, json!(["a.png", "b.png"]))), &resolver()));
        match c.view(1000) {
            View::Content(data) => {
                assert_eq!(data.slug, "lumen");
                assert_eq!(data.slides.len(), 2);
                assert_eq!(data.slides[0].src, url("a.png"));
            }
            other => panic!("expected content, got {other:?}"),
        }
    }

    #[test]
    fn superseded_fetch_does_not_alter_slides() {
        let mut c = controller("lumen");
        let first = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        let second = c.resolve(ProjectLookup::Found(project(2, "Tide"))).unwrap();

        assert!(c.commit(second, Some(row(2, json!("tide.png"))), &resolver()));
        assert!(!c.commit(first, Some(row(1, json!("lumen.png"))), &resolver()));

        match c.view(0) {
            View::Content(data) => {
                assert_eq!(data.project.id, 2);
                assert_eq!(data.slides, vec![Slide::new(url("tide.png"), "")]);
            }
            other => panic!("expected content, got {other:?}"),
        }
    }

    #[test]
    fn stale_fetch_arriving_first_is_discarded_and_page_keeps_loading() {
        let mut c = controller("lumen");
        let first = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        let _second = c.resolve(ProjectLookup::Found(project(2, "Tide"))).unwrap();
        assert!(!c.commit(first, Some(row(1, json!("lumen.png"))), &resolver()));
        assert_eq!(c.view(0), View::Loading);
    }

    #[test]
    fn losing_the_project_invalidates_in_flight_fetch() {
        let mut c = controller("lumen");
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        c.resolve(ProjectLookup::Missing);
        assert!(!c.commit(ticket, Some(row(1, json!("a.png"))), &resolver()));
        assert_eq!(c.view(0), View::NotFound);
    }

    #[test]
    fn resolving_same_project_again_does_not_refetch() {
        let mut c = controller("lumen");
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        assert_eq!(c.resolve(ProjectLookup::Found(project(1, "Lumen"))), None);
        assert!(c.is_current(&ticket));
    }

    #[test]
    fn missing_row_falls_back_to_project_cover() {
        let mut c = controller("lumen");
        let mut p = project(1, "Lumen");
        p.image = Some("cover.png".to_string());
        let ticket = c.resolve(ProjectLookup::Found(p)).unwrap();
        c.commit(ticket, None, &resolver());
        match c.view(0) {
            View::Content(data) => {
                assert_eq!(data.slides, vec![Slide::new(url("cover.png"), "")]);
                assert!(data.used_fallback);
                assert_eq!(data.cover.as_deref(), Some(url("cover.png").as_str()));
            }
            other => panic!("expected content, got {other:?}"),
        }
    }

    #[test]
    fn row_cover_wins_over_project_cover() {
        let mut p = project(1, "Lumen");
        p.image = Some("old.png".to_string());
        let mut r = row(1, Value::Null);
        r.image = Some("new.png".to_string());
        let data = PageData::build(p, Some(r), &resolver(), "projects");
        assert_eq!(data.slides[0].src, url("new.png"));
    }

    #[test]
    fn row_features_win_over_project_features() {
        let mut p = project(1, "Lumen");
        p.features = Some(vec![Feature {
            category: "Old".into(),
            bullets: vec![],
        }]);
        let mut r = row(1, Value::Null);
        r.features = Some(vec![Feature {
            category: "New".into(),
            bullets: vec!["x".into()],
        }]);
        let data = PageData::build(p, Some(r), &resolver(), "projects");
        assert_eq!(data.features[0].category, "New");
    }

    #[test]
    fn unresolvable_slides_leave_empty_view() {
        let mut c = PageController::new("lumen", "projects", 0, 0);
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        c.commit(ticket, Some(row(1, json!(["a.png"]))), &BucketResolver::new(""));
        match c.view(0) {
            View::Empty(data) => assert_eq!(data.unresolved, 1),
            other => panic!("expected empty, got {other:?}"),
        }
    }

    #[test]
    fn no_preview_and_no_cover_is_empty() {
        let mut c = controller("lumen");
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        c.commit(ticket, Some(row(1, Value::Null)), &resolver());
        assert!(matches!(c.view(0), View::Empty(_)));
    }

    #[test]
    fn minimum_delay_holds_loading_view() {
        let mut c = PageController::new("nope", "projects", 300, 1000);
        c.resolve(ProjectLookup::Missing);
        assert_eq!(c.view(1000), View::Loading);
        assert_eq!(c.view(1299), View::Loading);
        assert_eq!(c.view(1300), View::NotFound);
        assert_eq!(c.ready_at(), 1300);
    }

    #[test]
    fn list_going_back_to_pending_invalidates_fetch() {
        let mut c = controller("lumen");
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        c.resolve(ProjectLookup::Pending);
        assert!(!c.commit(ticket, Some(row(1, json!("a.png"))), &resolver()));
        assert_eq!(c.view(0), View::Loading);
    }

    #[test]
    fn into_page_only_when_ready() {
        let mut c = controller("lumen");
        let ticket = c.resolve(ProjectLookup::Found(project(1, "Lumen"))).unwrap();
        c.commit(ticket, Some(row(1, json!("a.png"))), &resolver());
        assert_eq!(c.into_page().unwrap().slides.len(), 1);
        assert!(controller("x").into_page().is_none());
    }
}
