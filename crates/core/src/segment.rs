//! Document segmentation.
//!
//! Turns the flat paragraph list of a source document into a
//! [`DocumentTree`]: a title plus ordered heading/content sections.

use crate::types::{DocParagraph, DocumentTree, ParagraphStyle, Section};

/// How many leading paragraphs are scanned for a title-styled paragraph.
const TITLE_STYLE_SCAN: usize = 3;

/// How many leading paragraphs are scanned for the fallback title text.
const TITLE_FALLBACK_SCAN: usize = 5;

/// Segment a document's paragraphs into a title and ordered sections.
///
/// A heading-styled paragraph opens a new section; following non-empty
/// paragraphs become its content. Content appearing before the first heading
/// is not kept.
pub fn segment(paragraphs: &[DocParagraph]) -> DocumentTree {
    let mut tree = DocumentTree::new(extract_title(paragraphs));
    tree.sections = build_sections(paragraphs);
    tree
}

/// Extract the document title.
///
/// The first few paragraphs are checked for an explicit "Title" style or a
/// top-level heading; failing that, the first non-empty text among the
/// leading paragraphs is used. Returns "" when neither is found.
fn extract_title(paragraphs: &[DocParagraph]) -> String {
    for paragraph in paragraphs.iter().take(TITLE_STYLE_SCAN) {
        match ParagraphStyle::from_style_name(&paragraph.style_name) {
            ParagraphStyle::Title | ParagraphStyle::Heading(1) => {
                return paragraph.text.trim().to_string();
            }
            _ => {}
        }
    }

    for paragraph in paragraphs.iter().take(TITLE_FALLBACK_SCAN) {
        let text = paragraph.text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    String::new()
}

/// Build the ordered section list.
fn build_sections(paragraphs: &[DocParagraph]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for paragraph in paragraphs {
        match ParagraphStyle::from_style_name(&paragraph.style_name) {
            ParagraphStyle::Heading(level) => {
                if let Some(finished) = current.take() {
                    sections.push(finished);
                }
                current = Some(Section::new(level, paragraph.text.trim()));
            }
            _ => {
                let text = paragraph.text.trim();
                if !text.is_empty() {
                    if let Some(section) = current.as_mut() {
                        section.add_paragraph(text);
                    }
                    // Content before the first heading is dropped.
                }
            }
        }
    }

    if let Some(finished) = current.take() {
        sections.push(finished);
    }

    sections
}
