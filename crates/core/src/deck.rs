//! Output deck abstraction.
//!
//! The populator drives any deck backend through these traits: slides are
//! appended by layout index, placeholders are addressed by their placeholder
//! index, and text is edited at paragraph granularity. Mutating a
//! placeholder that does not exist is reported by a `false` return, never an
//! error, because templates vary in which placeholders their layouts expose.

use std::path::Path;

use crate::error::Result;
use crate::types::PlaceholderDescriptor;

/// One slide under construction.
pub trait DeckSlide {
    /// Placeholders present on this slide, in shape order.
    fn placeholders(&self) -> Vec<PlaceholderDescriptor>;

    /// Replace a placeholder's entire text with a single paragraph.
    /// Returns false when no placeholder has the given index.
    fn set_text(&mut self, placeholder_index: u32, text: &str) -> bool;

    /// Reset a placeholder to a single empty paragraph.
    /// Returns false when no placeholder has the given index.
    fn clear_text(&mut self, placeholder_index: u32) -> bool;

    /// Overwrite one paragraph of a placeholder at the given indent level.
    /// Writing one past the last paragraph appends instead.
    /// Returns false when no placeholder has the given index.
    fn set_paragraph(
        &mut self,
        placeholder_index: u32,
        paragraph: usize,
        text: &str,
        level: u8,
    ) -> bool;

    /// Append a paragraph to a placeholder at the given indent level.
    /// Returns false when no placeholder has the given index.
    fn add_paragraph(&mut self, placeholder_index: u32, text: &str, level: u8) -> bool;

    /// Attach speaker notes to this slide, replacing any previous notes.
    fn set_notes(&mut self, notes: &str);
}

/// A deck being built against a template.
pub trait Deck {
    /// Slide handle type.
    type Slide: DeckSlide;

    /// Append a new slide using the template layout at `layout_index`.
    fn add_slide(&mut self, layout_index: usize) -> Result<&mut Self::Slide>;

    /// Number of slides added so far.
    fn slide_count(&self) -> usize;

    /// Persist the deck to `path`.
    fn save(&self, path: &Path) -> Result<()>;
}
