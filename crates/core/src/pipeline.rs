//! Pipeline orchestration.
//!
//! Sequences a full document-to-deck run: segmentation, the external
//! outline call, normalization, layout resolution, population, and the one
//! side-effecting write. Fails fast; the deck file is only written after
//! population has completed in memory.

use std::path::Path;

use crate::deck::Deck;
use crate::error::Result;
use crate::generator::OutlineGenerator;
use crate::types::{DocParagraph, TemplateLayout};
use crate::{layout, outline, populate, segment};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Title of the segmented document.
    pub document_title: String,

    /// Number of sections the document segmented into.
    pub section_count: usize,

    /// Number of slides written to the deck.
    pub slide_count: usize,
}

/// Run the pipeline and persist the deck to `output`.
///
/// All collaborators arrive as parameters; nothing here reads process-wide
/// state. Any stage failure propagates immediately and leaves the deck
/// unsaved.
pub fn run<G, D>(
    paragraphs: &[DocParagraph],
    template_layouts: &[TemplateLayout],
    generator: &G,
    deck: &mut D,
    output: &Path,
) -> Result<RunSummary>
where
    G: OutlineGenerator + ?Sized,
    D: Deck,
{
    let tree = segment::segment(paragraphs);
    let section_count = tree.sections.len();
    log::info!(
        "Segmented document: title \"{}\", {} section(s)",
        tree.title,
        section_count
    );

    let raw = generator.generate(&tree)?;
    let outline = outline::normalize(&raw)?;
    log::info!("Outline proposes {} slide(s)", outline.slides.len());

    let layout_map = layout::resolve(template_layouts);
    populate::populate(&outline, &layout_map, deck)?;

    deck.save(output)?;
    log::info!(
        "Saved deck with {} slide(s) to {}",
        deck.slide_count(),
        output.display()
    );

    Ok(RunSummary {
        document_title: tree.title,
        section_count,
        slide_count: deck.slide_count(),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{json, Value};

    use super::*;
    use crate::deck::mock::MockDeck;
    use crate::error::Error;
    use crate::types::{DocumentTree, PlaceholderDescriptor, PlaceholderKind};

    struct StubGenerator {
        value: Value,
        seen_title: RefCell<Option<String>>,
    }

    impl StubGenerator {
        fn new(value: Value) -> Self {
            Self {
                value,
                seen_title: RefCell::new(None),
            }
        }
    }

    impl OutlineGenerator for StubGenerator {
        fn generate(&self, document: &DocumentTree) -> Result<Value> {
            *self.seen_title.borrow_mut() = Some(document.title.clone());
            Ok(self.value.clone())
        }
    }

    struct FailingGenerator;

    impl OutlineGenerator for FailingGenerator {
        fn generate(&self, _document: &DocumentTree) -> Result<Value> {
            Err(Error::GenerationError("connection refused".to_string()))
        }
    }

    fn layouts() -> Vec<TemplateLayout> {
        vec![
            TemplateLayout::new(
                "Title Slide",
                vec![
                    PlaceholderDescriptor::new(0, PlaceholderKind::Title, "Title 1"),
                    PlaceholderDescriptor::new(1, PlaceholderKind::Body, "Subtitle 2"),
                ],
            ),
            TemplateLayout::new(
                "Title and Content",
                vec![
                    PlaceholderDescriptor::new(0, PlaceholderKind::Title, "Title 1"),
                    PlaceholderDescriptor::new(1, PlaceholderKind::Object, "Content Placeholder 2"),
                ],
            ),
        ]
    }

    fn document() -> Vec<DocParagraph> {
        vec![
            DocParagraph::new("Project Phoenix", "Title"),
            DocParagraph::new("Intro", "Heading 1"),
            DocParagraph::new("Intro content", "Normal"),
            DocParagraph::new("Background", "Heading 2"),
            DocParagraph::new("Background content", "Normal"),
        ]
    }

    fn outline_value() -> Value {
        json!({
            "presentation_title": "Project Phoenix",
            "slides": [
                { "slide_type": "title", "title": "Project Phoenix" },
                { "slide_type": "section", "title": "Intro" },
                {
                    "slide_type": "content",
                    "title": "Background",
                    "bullets": ["A", "B", "C"],
                    "notes": " remember this \n"
                }
            ]
        })
    }

    #[test]
    fn test_full_run_builds_and_saves() {
        let generator = StubGenerator::new(outline_value());
        let mut deck = MockDeck::new(layouts());

        let summary = run(
            &document(),
            &layouts(),
            &generator,
            &mut deck,
            Path::new("out.pptx"),
        )
        .unwrap();

        assert_eq!(summary.document_title, "Project Phoenix");
        assert_eq!(summary.section_count, 2);
        assert_eq!(summary.slide_count, 3);
        assert_eq!(
            generator.seen_title.borrow().as_deref(),
            Some("Project Phoenix")
        );

        // title -> layout 0, section -> aliased title, content -> layout 1
        let layout_indexes: Vec<usize> = deck.slides.iter().map(|s| s.layout_index).collect();
        assert_eq!(layout_indexes, vec![0, 0, 1]);
        assert_eq!(deck.slides[2].notes.as_deref(), Some("remember this"));
        assert_eq!(
            deck.saved_to.borrow().as_slice(),
            &[Path::new("out.pptx").to_path_buf()]
        );
    }

    #[test]
    fn test_generator_failure_aborts_before_save() {
        let mut deck = MockDeck::new(layouts());
        let err = run(
            &document(),
            &layouts(),
            &FailingGenerator,
            &mut deck,
            Path::new("out.pptx"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::GenerationError(_)));
        assert_eq!(deck.slide_count(), 0);
        assert!(deck.saved_to.borrow().is_empty());
    }

    #[test]
    fn test_malformed_outline_aborts_before_save() {
        let generator = StubGenerator::new(json!(["not", "an", "outline"]));
        let mut deck = MockDeck::new(layouts());
        let err = run(
            &document(),
            &layouts(),
            &generator,
            &mut deck,
            Path::new("out.pptx"),
        )
        .unwrap_err();

        assert!(matches!(err, Error::OutlineFormatError(_)));
        assert!(deck.saved_to.borrow().is_empty());
    }

    #[test]
    fn test_repeated_runs_produce_identical_decks() {
        let generator = StubGenerator::new(outline_value());
        let mut first = MockDeck::new(layouts());
        let mut second = MockDeck::new(layouts());

        run(
            &document(),
            &layouts(),
            &generator,
            &mut first,
            Path::new("a.pptx"),
        )
        .unwrap();
        run(
            &document(),
            &layouts(),
            &generator,
            &mut second,
            Path::new("b.pptx"),
        )
        .unwrap();

        assert_eq!(first.slides, second.slides);
    }
}
