//! Slide population.
//!
//! Builds the output deck from a normalized outline: one slide per spec, in
//! outline order. Placeholder discovery is positional-by-kind on each new
//! slide, and any text without a matching placeholder is skipped silently,
//! since templates vary in which placeholders their layouts expose.

use crate::deck::{Deck, DeckSlide};
use crate::error::{Error, Result};
use crate::types::{LayoutBinding, LayoutMap, PlaceholderKind, SlideOutline, SlideRole, SlideSpec};

/// Append and fill one slide per outline entry.
///
/// The deck is only mutated in memory here; persisting it is the caller's
/// (orchestrator's) job. Fails when a slide's role has no layout binding or
/// the deck rejects the layout index; missing placeholders never fail.
pub fn populate<D: Deck>(outline: &SlideOutline, layouts: &LayoutMap, deck: &mut D) -> Result<()> {
    for (position, spec) in outline.slides.iter().enumerate() {
        let binding = select_binding(layouts, spec.role).ok_or_else(|| {
            Error::DeckError(format!(
                "no layout binding for role \"{}\" (slide {})",
                spec.role.as_str(),
                position + 1
            ))
        })?;

        let slide = deck.add_slide(binding.layout_index)?;
        match spec.role {
            SlideRole::Title => fill_title_slide(slide, spec),
            SlideRole::Section => fill_section_slide(slide, spec),
            _ => fill_content_slide(slide, spec),
        }
        write_notes(slide, spec);

        log::debug!(
            "Added {} slide {} on layout {} (\"{}\")",
            spec.role.as_str(),
            position + 1,
            binding.layout_index,
            binding.name
        );
    }

    Ok(())
}

/// Pick the layout binding for a role.
///
/// `section` falls through to the `title` binding; anything that is not
/// `title` or `section` uses the `content` binding.
fn select_binding(layouts: &LayoutMap, role: SlideRole) -> Option<&LayoutBinding> {
    match role {
        SlideRole::Title => layouts.get(SlideRole::Title),
        SlideRole::Section => layouts
            .get(SlideRole::Section)
            .or_else(|| layouts.get(SlideRole::Title)),
        _ => layouts.get(SlideRole::Content),
    }
}

fn fill_title_slide<S: DeckSlide>(slide: &mut S, spec: &SlideSpec) {
    if let Some(title) = &spec.title {
        if let Some(index) = find_kind(slide, PlaceholderKind::Title) {
            slide.set_text(index, title);
        }
    }
    if let Some(subtitle) = &spec.subtitle {
        if !subtitle.is_empty() {
            if let Some(index) = find_kind(slide, PlaceholderKind::Body) {
                slide.set_text(index, subtitle);
            }
        }
    }
}

fn fill_section_slide<S: DeckSlide>(slide: &mut S, spec: &SlideSpec) {
    if let Some(title) = &spec.title {
        if let Some(index) = find_kind(slide, PlaceholderKind::Title) {
            slide.set_text(index, title);
        }
    }
}

fn fill_content_slide<S: DeckSlide>(slide: &mut S, spec: &SlideSpec) {
    if let Some(title) = &spec.title {
        if let Some(index) = find_kind(slide, PlaceholderKind::Title) {
            slide.set_text(index, title);
        }
    }
    if !spec.bullets.is_empty() {
        match find_content_target(slide) {
            Some(index) => write_bullets(slide, index, &spec.bullets),
            None => log::debug!("no content placeholder on slide; bullets skipped"),
        }
    }
}

/// Write bullets as flat paragraphs at indent level 0.
///
/// The placeholder keeps an implicit first paragraph after clearing, so the
/// first bullet overwrites it and later bullets append.
fn write_bullets<S: DeckSlide>(slide: &mut S, placeholder_index: u32, bullets: &[String]) {
    slide.clear_text(placeholder_index);
    for (i, bullet) in bullets.iter().enumerate() {
        if i == 0 {
            slide.set_paragraph(placeholder_index, 0, bullet, 0);
        } else {
            slide.add_paragraph(placeholder_index, bullet, 0);
        }
    }
}

fn write_notes<S: DeckSlide>(slide: &mut S, spec: &SlideSpec) {
    let Some(notes) = spec.notes.as_deref() else {
        return;
    };
    if notes.is_empty() {
        return;
    }
    let formatted = format_notes(notes);
    if !formatted.is_empty() {
        slide.set_notes(&formatted);
    }
}

/// First placeholder of the given kind, in shape order.
fn find_kind<S: DeckSlide>(slide: &S, kind: PlaceholderKind) -> Option<u32> {
    slide
        .placeholders()
        .iter()
        .find(|p| p.kind == kind)
        .map(|p| p.index)
}

/// First placeholder that can receive bulleted content, in shape order.
fn find_content_target<S: DeckSlide>(slide: &S) -> Option<u32> {
    slide
        .placeholders()
        .iter()
        .find(|p| p.kind.is_content_target())
        .map(|p| p.index)
}

/// Format speaker notes: trim each line, drop blank lines, rejoin.
pub fn format_notes(notes: &str) -> String {
    notes
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::mock::MockDeck;
    use crate::layout::resolve;
    use crate::types::{PlaceholderDescriptor, TemplateLayout};

    fn title_layout() -> TemplateLayout {
        TemplateLayout::new(
            "Title Slide",
            vec![
                PlaceholderDescriptor::new(0, PlaceholderKind::Title, "Title 1"),
                PlaceholderDescriptor::new(1, PlaceholderKind::Body, "Subtitle 2"),
            ],
        )
    }

    fn content_layout() -> TemplateLayout {
        TemplateLayout::new(
            "Title and Content",
            vec![
                PlaceholderDescriptor::new(0, PlaceholderKind::Title, "Title 1"),
                PlaceholderDescriptor::new(1, PlaceholderKind::Object, "Content Placeholder 2"),
            ],
        )
    }

    fn outline_with(slides: Vec<SlideSpec>) -> SlideOutline {
        SlideOutline {
            title: String::new(),
            subtitle: None,
            slides,
        }
    }

    #[test]
    fn test_three_bullets_three_paragraphs_level_zero() {
        let layouts = vec![title_layout(), content_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Content).with_bullets(vec![
            "A".to_string(),
            "B".to_string(),
            "C".to_string(),
        ])]);
        populate(&outline, &map, &mut deck).unwrap();

        let placeholder = &deck.slides[0].placeholders[1];
        assert!(placeholder.cleared);
        assert_eq!(placeholder.paragraphs.len(), 3);
        let texts: Vec<&str> = placeholder
            .paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert!(placeholder.paragraphs.iter().all(|p| p.level == 0));
    }

    #[test]
    fn test_slides_appended_in_outline_order() {
        let layouts = vec![title_layout(), content_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![
            SlideSpec::new(SlideRole::Title).with_title("Deck"),
            SlideSpec::new(SlideRole::Section).with_title("Part One"),
            SlideSpec::new(SlideRole::Content).with_title("Details"),
        ]);
        populate(&outline, &map, &mut deck).unwrap();

        assert_eq!(deck.slide_count(), 3);
        // title -> layout 0, section -> aliased title layout 0, content -> layout 1
        let layout_indexes: Vec<usize> = deck.slides.iter().map(|s| s.layout_index).collect();
        assert_eq!(layout_indexes, vec![0, 0, 1]);
    }

    #[test]
    fn test_title_slide_sets_title_and_subtitle() {
        let layouts = vec![title_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Title)
            .with_title("My Deck")
            .with_subtitle("An overview")]);
        populate(&outline, &map, &mut deck).unwrap();

        let slide = &deck.slides[0];
        assert_eq!(slide.placeholders[0].paragraphs[0].text, "My Deck");
        assert_eq!(slide.placeholders[1].paragraphs[0].text, "An overview");
    }

    #[test]
    fn test_empty_subtitle_not_written() {
        let layouts = vec![title_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Title)
            .with_title("My Deck")
            .with_subtitle("")]);
        populate(&outline, &map, &mut deck).unwrap();

        let subtitle = &deck.slides[0].placeholders[1];
        assert_eq!(subtitle.paragraphs[0].text, "");
        assert!(!subtitle.cleared);
    }

    #[test]
    fn test_missing_placeholders_silently_skipped() {
        let layouts = vec![TemplateLayout::new("Bare", Vec::new())];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Content)
            .with_title("Ignored")
            .with_bullets(vec!["A".to_string()])]);
        populate(&outline, &map, &mut deck).unwrap();

        assert_eq!(deck.slide_count(), 1);
        assert!(deck.slides[0].placeholders.is_empty());
    }

    #[test]
    fn test_section_slide_fills_title_only() {
        // A section spec may arrive with bullets attached; they are ignored.
        let layouts = vec![TemplateLayout::new(
            "Section Header",
            vec![
                PlaceholderDescriptor::new(0, PlaceholderKind::Title, "Title 1"),
                PlaceholderDescriptor::new(1, PlaceholderKind::Body, "Text Placeholder 2"),
            ],
        )];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Section)
            .with_title("Part Two")
            .with_subtitle("unused")
            .with_bullets(vec!["stray".to_string()])]);
        populate(&outline, &map, &mut deck).unwrap();

        let slide = &deck.slides[0];
        assert_eq!(slide.placeholders[0].paragraphs[0].text, "Part Two");
        assert_eq!(slide.placeholders[1].paragraphs[0].text, "");
        assert!(!slide.placeholders[1].cleared);
    }

    #[test]
    fn test_section_falls_back_to_title_binding() {
        let layouts = vec![title_layout()];
        let mut map = LayoutMap::default();
        map.bind(
            SlideRole::Title,
            LayoutBinding {
                layout_index: 0,
                name: "Title Slide".to_string(),
                placeholders: Vec::new(),
            },
        );
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Section).with_title("Part")]);
        populate(&outline, &map, &mut deck).unwrap();
        assert_eq!(deck.slides[0].layout_index, 0);
    }

    #[test]
    fn test_unexpected_role_uses_content_binding() {
        let layouts = vec![title_layout(), content_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![
            SlideSpec::new(SlideRole::Picture).with_title("Treated as content")
        ]);
        populate(&outline, &map, &mut deck).unwrap();
        assert_eq!(deck.slides[0].layout_index, 1);
    }

    #[test]
    fn test_unbound_role_is_an_error() {
        let mut deck = MockDeck::new(vec![content_layout()]);
        let outline = outline_with(vec![SlideSpec::new(SlideRole::Content)]);
        let err = populate(&outline, &LayoutMap::default(), &mut deck).unwrap_err();
        assert!(matches!(err, Error::DeckError(_)));
        assert_eq!(deck.slide_count(), 0);
    }

    #[test]
    fn test_first_content_target_wins() {
        let layouts = vec![TemplateLayout::new(
            "Two Content",
            vec![
                PlaceholderDescriptor::new(0, PlaceholderKind::Title, "Title 1"),
                PlaceholderDescriptor::new(1, PlaceholderKind::Body, "Content 2"),
                PlaceholderDescriptor::new(2, PlaceholderKind::Body, "Content 3"),
            ],
        )];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![
            SlideSpec::new(SlideRole::Content).with_bullets(vec!["only here".to_string()])
        ]);
        populate(&outline, &map, &mut deck).unwrap();

        let slide = &deck.slides[0];
        assert_eq!(slide.placeholders[1].paragraphs[0].text, "only here");
        assert_eq!(slide.placeholders[2].paragraphs[0].text, "");
    }

    #[test]
    fn test_notes_trimmed_and_blank_lines_dropped() {
        let layouts = vec![content_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![SlideSpec::new(SlideRole::Content)
            .with_notes("  first line \n\n   \n second line  ")]);
        populate(&outline, &map, &mut deck).unwrap();
        assert_eq!(
            deck.slides[0].notes.as_deref(),
            Some("first line\nsecond line")
        );
    }

    #[test]
    fn test_blank_notes_not_written() {
        let layouts = vec![content_layout()];
        let map = resolve(&layouts);
        let mut deck = MockDeck::new(layouts);

        let outline = outline_with(vec![
            SlideSpec::new(SlideRole::Content).with_notes("  \n   \n ")
        ]);
        populate(&outline, &map, &mut deck).unwrap();
        assert_eq!(deck.slides[0].notes, None);
    }

    #[test]
    fn test_format_notes() {
        assert_eq!(format_notes("a\nb"), "a\nb");
        assert_eq!(format_notes("  a  \n\n  b  "), "a\nb");
        assert_eq!(format_notes("\n\n"), "");
        assert_eq!(format_notes("single"), "single");
    }
}
