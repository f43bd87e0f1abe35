//! Preview normalization: loosely-typed storage payloads → carousel slides.
//!
//! The hosted preview table has never had a consistent schema. Over time it
//! has held all of these shapes for the `preview` column:
//!
//! ```text
//! "shots/a.png"                                  single path
//! ["shots/a.png", "shots/b.png"]                 flat list of paths
//! [{"file": "a.png", "desc": "Login"}, ...]      objects, file/desc naming
//! [{"url": "a.png", "caption": "Login"}, ...]    objects, url/caption naming
//! [["a.png", {"file": "b.png"}]]                 accidental double nesting
//! null                                           nothing uploaded yet
//! ```
//!
//! The payload is decoded exactly once, at the boundary, into [`PreviewRaw`],
//! a closed set of variants. Everything downstream only sees [`Slide`]s.
//!
//! ## Rules
//!
//! 1. An array whose first element is itself an array is flattened one level.
//! 2. A non-empty string is one slide with an empty caption.
//! 3. In a list, a string element is a source; an object element takes its
//!    source from `file`, then `url`, and its caption from `desc`, then
//!    `caption`. Elements with no usable source are skipped.
//! 4. Any other shape produces no slides.
//! 5. When nothing survived and a fallback cover exists, the cover becomes
//!    the only slide.
//!
//! Normalization is total: it never fails and never panics.

use crate::types::Slide;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A preview payload after boundary decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewRaw {
    /// A bare path string.
    Single(String),
    /// A list of entries, possibly with captions.
    List(Vec<PreviewItem>),
    /// Null, numbers, booleans, bare objects: nothing usable.
    Invalid,
}

/// One element of a preview list.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewItem {
    Path(String),
    Object {
        src: Option<String>,
        caption: Option<String>,
    },
    Invalid,
}

impl PreviewRaw {
    /// Decode an arbitrary JSON value, applying the one-level flatten.
    pub fn decode(value: &Value) -> Self {
        match flatten_nested(value).as_ref() {
            Value::String(s) => PreviewRaw::Single(s.clone()),
            Value::Array(items) => PreviewRaw::List(items.iter().map(PreviewItem::decode).collect()),
            _ => PreviewRaw::Invalid,
        }
    }
}

impl PreviewItem {
    fn decode(value: &Value) -> Self {
        match value {
            Value::String(s) => PreviewItem::Path(s.clone()),
            Value::Object(map) => PreviewItem::Object {
                src: first_string(map, &["file", "url"]),
                caption: first_string(map, &["desc", "caption"]),
            },
            _ => PreviewItem::Invalid,
        }
    }

    /// `None` when the entry has no usable source.
    fn into_slide(self) -> Option<Slide> {
        match self {
            PreviewItem::Path(src) if !src.is_empty() => Some(Slide::new(src, "")),
            PreviewItem::Object {
                src: Some(src),
                caption,
            } => Some(Slide::new(src, caption.unwrap_or_default())),
            _ => None,
        }
    }
}

/// Result of normalizing one payload, with counts for console reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub slides: Vec<Slide>,
    /// List entries skipped for lack of a usable source.
    pub dropped: usize,
    /// True when the slide list is just the fallback cover.
    pub used_fallback: bool,
}

/// Normalize a preview payload into slides, falling back to the cover image.
pub fn normalize(preview: &Value, fallback_cover: Option<&str>) -> Vec<Slide> {
    normalize_with_report(preview, fallback_cover).slides
}

/// Same as [`normalize`], but also reports what was dropped along the way.
pub fn normalize_with_report(preview: &Value, fallback_cover: Option<&str>) -> Normalized {
    let mut out = Normalized::default();

    match PreviewRaw::decode(preview) {
        PreviewRaw::Single(src) if !src.is_empty() => out.slides.push(Slide::new(src, "")),
        PreviewRaw::Single(_) | PreviewRaw::Invalid => {}
        PreviewRaw::List(items) => {
            for item in items {
                match item.into_slide() {
                    Some(slide) => out.slides.push(slide),
                    None => out.dropped += 1,
                }
            }
        }
    }

    if out.slides.is_empty()
        && let Some(cover) = fallback_cover.filter(|c| !c.is_empty())
    {
        out.slides.push(Slide::new(cover, ""));
        out.used_fallback = true;
    }

    out
}

/// Flatten one level when the first element of an array is itself an array.
fn flatten_nested(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Array(items) if matches!(items.first(), Some(Value::Array(_))) => {
            let flat = items
                .iter()
                .flat_map(|item| match item {
                    Value::Array(inner) => inner.clone(),
                    other => vec![other.clone()],
                })
                .collect();
            Cow::Owned(Value::Array(flat))
        }
        _ => Cow::Borrowed(value),
    }
}

/// First non-empty string among `keys`, in priority order.
fn first_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn srcs(slides: &[Slide]) -> Vec<&str> {
        slides.iter().map(|s| s.src.as_str()).collect()
    }

    #[test]
    fn single_string_is_one_slide() {
        assert_eq!(normalize(&json!("a.png"), None), vec![Slide::new("a.png", "")]);
    }

    #[test]
    fn mixed_list_keeps_order_and_captions() {
        let preview = json!([{"file": "a.png", "desc": "A"}, {"url": "b.png"}, "c.png"]);
        assert_eq!(
            normalize(&preview, None),
            vec![
                Slide::new("a.png", "A"),
                Slide::new("b.png", ""),
                Slide::new("c.png", ""),
            ]
        );
    }

    #[test]
    fn empty_list_uses_fallback_cover() {
        assert_eq!(
            normalize(&json!([]), Some("cover.png")),
            vec![Slide::new("cover.png", "")]
        );
    }

    #[test]
    fn null_without_cover_is_empty() {
        assert!(normalize(&Value::Null, None).is_empty());
    }

    #[test]
    fn one_level_nesting_is_flattened() {
        assert_eq!(normalize(&json!([["a.png"]]), None), vec![Slide::new("a.png", "")]);
    }

    #[test]
    fn flatten_concatenates_all_inner_lists() {
        let preview = json!([["a.png", "b.png"], ["c.png"], "d.png"]);
        assert_eq!(srcs(&normalize(&preview, None)), ["a.png", "b.png", "c.png", "d.png"]);
    }

    #[test]
    fn flatten_only_applies_when_first_element_is_a_list() {
        // The nested list is not the first element, so it is an invalid entry.
        let preview = json!(["a.png", ["b.png"]]);
        assert_eq!(srcs(&normalize(&preview, None)), ["a.png"]);
    }

    #[test]
    fn deeper_nesting_is_flattened_only_once() {
        assert!(normalize(&json!([[["a.png"]]]), None).is_empty());
    }

    #[test]
    fn file_wins_over_url() {
        let preview = json!([{"file": "f.png", "url": "u.png"}]);
        assert_eq!(srcs(&normalize(&preview, None)), ["f.png"]);
    }

    #[test]
    fn empty_file_falls_back_to_url() {
        let preview = json!([{"file": "", "url": "u.png"}]);
        assert_eq!(srcs(&normalize(&preview, None)), ["u.png"]);
    }

    #[test]
    fn desc_wins_over_caption() {
        let preview = json!([{"file": "a.png", "desc": "D", "caption": "C"}]);
        assert_eq!(normalize(&preview, None)[0].caption, "D");
    }

    #[test]
    fn caption_used_when_desc_missing() {
        let preview = json!([{"url": "a.png", "caption": "C"}]);
        assert_eq!(normalize(&preview, None)[0].caption, "C");
    }

    #[test]
    fn non_string_fields_are_treated_as_absent() {
        let preview = json!([{"file": 12, "url": "u.png", "desc": false}]);
        assert_eq!(normalize(&preview, None), vec![Slide::new("u.png", "")]);
    }

    #[test]
    fn entries_without_source_are_skipped_and_counted() {
        let preview = json!(["", {"desc": "orphan"}, 7, null, "ok.png"]);
        let report = normalize_with_report(&preview, None);
        assert_eq!(srcs(&report.slides), ["ok.png"]);
        assert_eq!(report.dropped, 4);
        assert!(!report.used_fallback);
    }

    #[test]
    fn all_entries_dropped_falls_back_to_cover() {
        let preview = json!([{"desc": "no source"}]);
        let report = normalize_with_report(&preview, Some("cover.png"));
        assert_eq!(report.slides, vec![Slide::new("cover.png", "")]);
        assert!(report.used_fallback);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn cover_ignored_when_preview_has_slides() {
        assert_eq!(srcs(&normalize(&json!("a.png"), Some("cover.png"))), ["a.png"]);
    }

    #[test]
    fn empty_cover_is_not_a_fallback() {
        assert!(normalize(&Value::Null, Some("")).is_empty());
    }

    #[test]
    fn empty_string_preview_uses_cover() {
        assert_eq!(srcs(&normalize(&json!(""), Some("cover.png"))), ["cover.png"]);
    }

    #[test]
    fn malformed_shapes_never_panic() {
        let shapes = [
            json!(null),
            json!(0),
            json!(3.5),
            json!(true),
            json!({}),
            json!({"file": "a.png"}),
            json!([[]]),
            json!([[], []]),
            json!([null, [null], {"url": null}]),
            json!([{"file": ["a.png"]}, {"url": {"nested": "x"}}]),
            json!([[{"caption": "only"}], 1, "x.png"]),
        ];
        for shape in &shapes {
            let slides = normalize(shape, None);
            assert!(slides.iter().all(|s| !s.src.is_empty()), "empty src from {shape}");
        }
    }

    #[test]
    fn bare_object_decodes_as_invalid() {
        assert_eq!(PreviewRaw::decode(&json!({"file": "a.png"})), PreviewRaw::Invalid);
    }

    #[test]
    fn decode_produces_tagged_items() {
        let raw = PreviewRaw::decode(&json!(["a.png", {"url": "b.png", "caption": "B"}, 3]));
        assert_eq!(
            raw,
            PreviewRaw::List(vec![
                PreviewItem::Path("a.png".into()),
                PreviewItem::Object {
                    src: Some("b.png".into()),
                    caption: Some("B".into()),
                },
                PreviewItem::Invalid,
            ])
        );
    }
}
