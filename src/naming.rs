//! Project slugs.
//!
//! Every project page lives at `/{slug}/`, where the slug is derived from the
//! project name: trimmed, lowercased, and with each space replaced by an
//! underscore. The same derivation is used when a slug comes back in through
//! a URL, so lookups are a plain string comparison.
//!
//! - `"Tide Tables"` → `"tide_tables"`
//! - `"  Lumen  "` → `"lumen"`
//! - `"A  B"` → `"a__b"` (each space is kept as its own underscore)

use crate::types::Project;

/// Derive the URL slug for a project name.
pub fn project_slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Find the project whose derived slug matches `slug`.
///
/// The incoming slug is trimmed and lowercased first so hand-typed URLs with
/// capitals still resolve.
pub fn find_by_slug<'a>(projects: &'a [Project], slug: &str) -> Option<&'a Project> {
    let wanted = slug.trim().to_lowercase();
    projects.iter().find(|p| project_slug(&p.name) == wanted)
}

/// A slug is used as an output directory name, so it must stay a single
/// path component: no separators and no leading dot.
pub fn is_path_safe(slug: &str) -> bool {
    !slug.is_empty() && !slug.starts_with('.') && !slug.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: u64, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            overview: None,
            image: None,
            features: None,
        }
    }

    #[test]
    fn single_word_is_lowercased() {
        assert_eq!(project_slug("Lumen"), "lumen");
    }

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(project_slug("Tide Tables App"), "tide_tables_app");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(project_slug("  Lumen  "), "lumen");
    }

    #[test]
    fn repeated_spaces_are_not_collapsed() {
        assert_eq!(project_slug("A  B"), "a__b");
    }

    #[test]
    fn dashes_and_punctuation_survive() {
        assert_eq!(project_slug("Half-Life Tracker!"), "half-life_tracker!");
    }

    #[test]
    fn empty_name_gives_empty_slug() {
        assert_eq!(project_slug("   "), "");
    }

    #[test]
    fn find_by_slug_matches_derived_slug() {
        let projects = vec![project(1, "Lumen"), project(2, "Tide Tables")];
        let found = find_by_slug(&projects, "tide_tables").unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn find_by_slug_ignores_case_of_incoming_slug() {
        let projects = vec![project(1, "Tide Tables")];
        assert!(find_by_slug(&projects, "Tide_Tables").is_some());
    }

    #[test]
    fn find_by_slug_returns_none_on_miss() {
        let projects = vec![project(1, "Lumen")];
        assert!(find_by_slug(&projects, "nope").is_none());
    }

    #[test]
    fn path_safe_slugs() {
        assert!(is_path_safe("tide_tables"));
        assert!(is_path_safe("v1.2"));
        assert!(!is_path_safe("../escaped"));
        assert!(!is_path_safe("/etc"));
        assert!(!is_path_safe("a\\b"));
        assert!(!is_path_safe(".hidden"));
        assert!(!is_path_safe(""));
    }
}
