//! Preview rows from the hosted project database.
//!
//! The site never talks to the database directly at render time. Instead the
//! preview table is exported to `previews.json` in the content directory:
//!
//! ```json
//! [
//!   { "project_id": 1, "preview": [{"file": "a.png", "desc": "Home"}], "image": "cover.png" },
//!   { "project_id": 2, "preview": "only.png" }
//! ]
//! ```
//!
//! [`PreviewSource`] is the query seam: given a project id, return at most
//! one row. A missing row is a normal outcome, not an error.

use crate::types::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of the preview table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub project_id: u64,
    /// Untyped on purpose; see [`crate::preview`] for the accepted shapes.
    #[serde(default)]
    pub preview: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
}

/// Query interface for preview rows. Implementations must be shareable across
/// the fetch pool.
pub trait PreviewSource: Sync {
    fn fetch(&self, project_id: u64) -> Result<Option<PreviewRow>, SourceError>;
}

/// Preview table loaded from an exported JSON file.
#[derive(Debug, Default)]
pub struct JsonTableSource {
    rows: HashMap<u64, PreviewRow>,
}

impl JsonTableSource {
    /// Load `previews.json`. A missing file is an empty table.
    ///
    /// When the export holds several rows for one project, the first wins.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let rows: Vec<PreviewRow> = serde_json::from_str(&content)?;
        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<PreviewRow>) -> Self {
        let mut table = HashMap::with_capacity(rows.len());
        for row in rows {
            table.entry(row.project_id).or_insert(row);
        }
        Self { rows: table }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PreviewSource for JsonTableSource {
    fn fetch(&self, project_id: u64) -> Result<Option<PreviewRow>, SourceError> {
        Ok(self.rows.get(&project_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_table() {
        let tmp = TempDir::new().unwrap();
        let source = JsonTableSource::load(&tmp.path().join("previews.json")).unwrap();
        assert!(source.is_empty());
        assert_eq!(source.fetch(1).unwrap(), None);
    }

    #[test]
    fn loads_rows_by_project_id() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("previews.json");
        fs::write(
            &path,
            r#"[
                {"project_id": 1, "preview": "a.png", "image": "cover.png"},
                {"project_id": 2, "preview": [{"url": "b.png"}]}
            ]"#,
        )
        .unwrap();

        let source = JsonTableSource::load(&path).unwrap();
        assert_eq!(source.len(), 2);
        let row = source.fetch(1).unwrap().unwrap();
        assert_eq!(row.preview, json!("a.png"));
        assert_eq!(row.image.as_deref(), Some("cover.png"));
        assert_eq!(source.fetch(2).unwrap().unwrap().preview, json!([{"url": "b.png"}]));
    }

    #[test]
    fn absent_preview_column_is_null() {
        let rows: Vec<PreviewRow> = serde_json::from_str(r#"[{"project_id": 3}]"#).unwrap();
        assert_eq!(rows[0].preview, Value::Null);
    }

    #[test]
    fn absent_row_is_not_an_error() {
        let source = JsonTableSource::from_rows(vec![]);
        assert!(source.fetch(42).unwrap().is_none());
    }

    #[test]
    fn first_row_wins_for_duplicate_ids() {
        let rows = vec![
            PreviewRow {
                project_id: 1,
                preview: json!("first.png"),
                image: None,
                features: None,
            },
            PreviewRow {
                project_id: 1,
                preview: json!("second.png"),
                image: None,
                features: None,
            },
        ];
        let source = JsonTableSource::from_rows(rows);
        assert_eq!(source.fetch(1).unwrap().unwrap().preview, json!("first.png"));
    }

    #[test]
    fn malformed_json_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("previews.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonTableSource::load(&path), Err(SourceError::Json(_))));
    }
}
