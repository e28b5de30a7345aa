//! DOCX paragraph extraction.
//!
//! Reads the body paragraphs of a Word document together with their
//! resolved style names, which drive segmentation downstream.

pub mod parser;

pub use parser::DocxParser;
