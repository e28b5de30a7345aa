//! Core domain types, document segmentation, layout resolution, and slide
//! population for document-to-deck conversion.

pub mod deck;
pub mod error;
pub mod generator;
pub mod layout;
pub mod outline;
pub mod pipeline;
pub mod populate;
pub mod segment;
pub mod types;

pub use deck::{Deck, DeckSlide};
pub use error::{Error, Result};
pub use generator::OutlineGenerator;
pub use layout::resolve;
pub use outline::normalize;
pub use pipeline::{run, RunSummary};
pub use populate::{format_notes, populate};
pub use segment::segment;
pub use types::{
    DocParagraph, DocumentTree, LayoutBinding, LayoutMap, ParagraphStyle, PlaceholderDescriptor,
    PlaceholderKind, Section, SectionHeading, SlideOutline, SlideRole, SlideSpec, TemplateLayout,
};
