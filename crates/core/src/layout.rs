//! Layout resolution.
//!
//! Maps semantic slide roles onto whatever layouts a template happens to
//! offer, by case-insensitive name matching with a deterministic fallback
//! chain. Matching is first-match-wins in layout order, not best-match.

use crate::types::{LayoutBinding, LayoutMap, SlideRole, TemplateLayout};

/// Ordered layout-name substrings accepted per role.
const LAYOUT_NAME_HINTS: &[(SlideRole, &[&str])] = &[
    (SlideRole::Title, &["Title Slide", "Title"]),
    (SlideRole::Section, &["Section Header", "Section"]),
    (
        SlideRole::Content,
        &["Title and Content", "Content", "Two Content", "Comparison"],
    ),
    (
        SlideRole::Picture,
        &["Picture with Caption", "Title and Picture"],
    ),
    (SlideRole::Blank, &["Blank"]),
];

/// Resolve a template's layouts into role bindings.
///
/// Scans layouts in template order; the first layout whose name contains one
/// of a role's hints wins that role. One layout may win several roles.
/// Afterwards, unresolved roles fall back: `title` to layout 0, `content` to
/// layout 1 (or 0 for a single-layout template), `section` to the `title`
/// binding. `picture` and `blank` get no fallback and may stay absent.
pub fn resolve(layouts: &[TemplateLayout]) -> LayoutMap {
    let mut map = LayoutMap::default();

    for (index, layout) in layouts.iter().enumerate() {
        let layout_name = layout.name.to_lowercase();
        for (role, hints) in LAYOUT_NAME_HINTS {
            if map.is_bound(*role) {
                continue;
            }
            if hints
                .iter()
                .any(|hint| layout_name.contains(&hint.to_lowercase()))
            {
                map.bind(*role, binding_for(index, layout));
            }
        }
    }

    if !map.is_bound(SlideRole::Title) {
        if let Some(layout) = layouts.first() {
            map.bind(SlideRole::Title, binding_for(0, layout));
        }
    }

    if !map.is_bound(SlideRole::Content) && !layouts.is_empty() {
        let index = if layouts.len() > 1 { 1 } else { 0 };
        map.bind(SlideRole::Content, binding_for(index, &layouts[index]));
    }

    if !map.is_bound(SlideRole::Section) {
        if let Some(binding) = map.get(SlideRole::Title).cloned() {
            map.bind(SlideRole::Section, binding);
        }
    }

    log::debug!(
        "Resolved layout bindings: title={:?} section={:?} content={:?} picture={:?} blank={:?}",
        map.get(SlideRole::Title).map(|b| b.layout_index),
        map.get(SlideRole::Section).map(|b| b.layout_index),
        map.get(SlideRole::Content).map(|b| b.layout_index),
        map.get(SlideRole::Picture).map(|b| b.layout_index),
        map.get(SlideRole::Blank).map(|b| b.layout_index),
    );

    map
}

fn binding_for(index: usize, layout: &TemplateLayout) -> LayoutBinding {
    LayoutBinding {
        layout_index: index,
        name: layout.name.clone(),
        placeholders: layout.placeholders.clone(),
    }
}
