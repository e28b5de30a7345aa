//! PPTX template analysis and deck writing.
//!
//! A template presentation (.pptx) is parsed into a layout inventory, then
//! a deck is staged slide by slide and written back out as a new package
//! that keeps the template's theme, masters, and layouts.

pub mod parts;
pub mod template;
pub mod writer;

pub use template::{LayoutPart, PlaceholderShape, Template};
pub use writer::{DeckWriter, SlideDraft};
