//! Outline normalization.
//!
//! The outline generator's raw JSON is untrusted model output. This module
//! is the single defensive boundary that coerces it into a typed
//! [`SlideOutline`]; downstream code may assume well-typed data. Only a
//! structurally unusable top level is rejected — individual slide entries
//! always degrade to defaults instead of failing the run.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{SlideOutline, SlideRole, SlideSpec};

/// Normalize raw generator output into a [`SlideOutline`].
///
/// Fails only when the top-level value is not an object or its `slides`
/// entry is missing or not a list.
pub fn normalize(raw: &Value) -> Result<SlideOutline> {
    let root = raw
        .as_object()
        .ok_or_else(|| Error::OutlineFormatError("top-level value is not an object".to_string()))?;

    let entries = root
        .get("slides")
        .ok_or_else(|| Error::OutlineFormatError("missing \"slides\" list".to_string()))?
        .as_array()
        .ok_or_else(|| Error::OutlineFormatError("\"slides\" is not a list".to_string()))?;

    let slides: Vec<SlideSpec> = entries.iter().map(normalize_slide).collect();

    Ok(SlideOutline {
        title: root
            .get("presentation_title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        subtitle: root
            .get("presentation_subtitle")
            .and_then(Value::as_str)
            .map(str::to_string),
        slides,
    })
}

/// Normalize one slide entry.
///
/// Missing or mistyped fields default (absent text, empty bullets, role
/// `content`); a non-object entry yields an all-defaults content slide.
/// Non-string bullet items are dropped.
fn normalize_slide(entry: &Value) -> SlideSpec {
    let role = entry
        .get("slide_type")
        .and_then(Value::as_str)
        .map(SlideRole::from_slide_type)
        .unwrap_or(SlideRole::Content);

    SlideSpec {
        role,
        title: entry.get("title").and_then(Value::as_str).map(str::to_string),
        subtitle: entry
            .get("subtitle")
            .and_then(Value::as_str)
            .map(str::to_string),
        bullets: entry
            .get("bullets")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        notes: entry.get("notes").and_then(Value::as_str).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_top_level() {
        for raw in [json!([1, 2]), json!("outline"), json!(42), json!(null)] {
            let err = normalize(&raw).unwrap_err();
            assert!(matches!(err, Error::OutlineFormatError(_)));
        }
    }

    #[test]
    fn test_rejects_missing_slides() {
        let raw = json!({ "presentation_title": "T" });
        assert!(matches!(
            normalize(&raw).unwrap_err(),
            Error::OutlineFormatError(_)
        ));
    }

    #[test]
    fn test_rejects_non_list_slides() {
        let raw = json!({ "slides": "three of them" });
        assert!(matches!(
            normalize(&raw).unwrap_err(),
            Error::OutlineFormatError(_)
        ));
    }

    #[test]
    fn test_empty_slides_accepted() {
        let outline = normalize(&json!({ "slides": [] })).unwrap();
        assert!(outline.slides.is_empty());
        assert_eq!(outline.title, "");
        assert_eq!(outline.subtitle, None);
    }

    #[test]
    fn test_full_outline() {
        let raw = json!({
            "presentation_title": "Quarterly Review",
            "presentation_subtitle": "Q3 results",
            "slides": [
                {
                    "slide_type": "title",
                    "title": "Quarterly Review",
                    "subtitle": "Q3 results"
                },
                {
                    "slide_type": "content",
                    "title": "Highlights",
                    "bullets": ["Revenue up", "Costs down"],
                    "notes": "Keep it short."
                }
            ]
        });
        let outline = normalize(&raw).unwrap();
        assert_eq!(outline.title, "Quarterly Review");
        assert_eq!(outline.subtitle.as_deref(), Some("Q3 results"));
        assert_eq!(outline.slides.len(), 2);
        assert_eq!(outline.slides[0].role, SlideRole::Title);
        assert_eq!(outline.slides[0].subtitle.as_deref(), Some("Q3 results"));
        assert_eq!(outline.slides[1].role, SlideRole::Content);
        assert_eq!(outline.slides[1].bullets, vec!["Revenue up", "Costs down"]);
        assert_eq!(outline.slides[1].notes.as_deref(), Some("Keep it short."));
    }

    #[test]
    fn test_unknown_slide_type_becomes_content() {
        let raw = json!({
            "slides": [
                { "slide_type": "summary", "title": "S" },
                { "slide_type": "picture", "title": "P" },
                { "slide_type": 7, "title": "N" },
                { "title": "missing type" }
            ]
        });
        let outline = normalize(&raw).unwrap();
        assert_eq!(outline.slides.len(), 4);
        for slide in &outline.slides {
            assert_eq!(slide.role, SlideRole::Content);
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let raw = json!({ "slides": [{ "slide_type": "content" }] });
        let slide = &normalize(&raw).unwrap().slides[0];
        assert_eq!(slide.title, None);
        assert_eq!(slide.subtitle, None);
        assert_eq!(slide.notes, None);
        assert!(slide.bullets.is_empty());
    }

    #[test]
    fn test_non_list_bullets_default_empty() {
        let raw = json!({
            "slides": [{ "slide_type": "content", "bullets": "not a list" }]
        });
        let slide = &normalize(&raw).unwrap().slides[0];
        assert!(slide.bullets.is_empty());
    }

    #[test]
    fn test_non_string_bullet_items_dropped() {
        let raw = json!({
            "slides": [{ "bullets": ["A", 5, null, "B", ["C"]] }]
        });
        let slide = &normalize(&raw).unwrap().slides[0];
        assert_eq!(slide.bullets, vec!["A", "B"]);
    }

    #[test]
    fn test_non_object_slide_entry_defaults_to_content() {
        let raw = json!({ "slides": ["just text", 12] });
        let outline = normalize(&raw).unwrap();
        assert_eq!(outline.slides.len(), 2);
        assert_eq!(outline.slides[0].role, SlideRole::Content);
        assert_eq!(outline.slides[0].title, None);
        assert!(outline.slides[0].bullets.is_empty());
    }

    #[test]
    fn test_slide_order_preserved() {
        let raw = json!({
            "slides": [
                { "slide_type": "title" },
                { "slide_type": "section" },
                { "slide_type": "content" },
                { "slide_type": "section" }
            ]
        });
        let roles: Vec<SlideRole> = normalize(&raw)
            .unwrap()
            .slides
            .iter()
            .map(|s| s.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                SlideRole::Title,
                SlideRole::Section,
                SlideRole::Content,
                SlideRole::Section
            ]
        );
    }

    #[test]
    fn test_empty_string_title_preserved() {
        // Present-but-empty is not the same as missing.
        let raw = json!({ "slides": [{ "title": "" }] });
        let slide = &normalize(&raw).unwrap().slides[0];
        assert_eq!(slide.title.as_deref(), Some(""));
    }
}
