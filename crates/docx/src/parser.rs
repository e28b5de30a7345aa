//! DOCX file parser implementation.

use deck_core::{DocParagraph, Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use zip::ZipArchive;

/// Style tables store built-in heading names in lowercase ("heading 1").
static BUILTIN_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^heading ([1-9])$").unwrap());

/// Parser for DOCX (Word) files.
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a DOCX file from disk.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<DocParagraph>> {
        let file = File::open(path)
            .map_err(|e| Error::DocumentOpenError(format!("{}: {}", path.display(), e)))?;
        self.parse(BufReader::new(file))
    }

    /// Parse a DOCX document from a reader, returning its body paragraphs
    /// in document order with resolved style names.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<DocParagraph>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::DocumentOpenError(format!("not a DOCX archive: {}", e)))?;

        // The styles part is optional; without it style ids stand in for names.
        let styles = match self.read_file_from_archive(&mut archive, "word/styles.xml") {
            Ok(content) => parse_style_names(&content)?,
            Err(_) => HashMap::new(),
        };

        let document = self
            .read_file_from_archive(&mut archive, "word/document.xml")
            .map_err(|e| Error::DocumentOpenError(e.to_string()))?;

        parse_paragraphs(&document, &styles)
    }

    /// Read a file from the ZIP archive as a string.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read file '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse word/styles.xml into a style id to style name map.
///
/// Names are canonicalized so built-in styles match how Word displays
/// them ("heading 1" becomes "Heading 1").
fn parse_style_names(xml_content: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml_content);

    let mut styles = HashMap::new();
    let mut current_style_id: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"style" => {
                        current_style_id = None;
                        for attr in e.attributes().flatten() {
                            if local_name(attr.key.as_ref()) == b"styleId" {
                                current_style_id =
                                    Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    b"name" => {
                        if let Some(style_id) = &current_style_id {
                            for attr in e.attributes().flatten() {
                                if local_name(attr.key.as_ref()) == b"val" {
                                    let name = String::from_utf8_lossy(&attr.value);
                                    styles
                                        .insert(style_id.clone(), canonical_style_name(&name));
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()) == b"style" {
                    current_style_id = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("styles parsing error: {}", e))),
            _ => {}
        }
    }

    Ok(styles)
}

/// Parse word/document.xml into paragraphs.
///
/// Runs within a paragraph are concatenated, with tab and break elements
/// folded into the text. Paragraphs inside tables are skipped so the
/// result mirrors the document body flow.
fn parse_paragraphs(
    xml_content: &str,
    styles: &HashMap<String, String>,
) -> Result<Vec<DocParagraph>> {
    let mut reader = Reader::from_str(xml_content);

    let mut paragraphs = Vec::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    let mut table_depth = 0usize;
    let mut current_text = String::new();
    let mut current_style: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"tbl" => table_depth += 1,
                    b"p" if table_depth == 0 => {
                        in_paragraph = true;
                        current_text.clear();
                        current_style = None;
                    }
                    b"pStyle" if in_paragraph => {
                        for attr in e.attributes().flatten() {
                            if local_name(attr.key.as_ref()) == b"val" {
                                current_style =
                                    Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    b"t" if in_paragraph => in_text = true,
                    b"tab" if in_paragraph => current_text.push('\t'),
                    b"br" | b"cr" if in_paragraph => current_text.push('\n'),
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    current_text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" if in_paragraph => {
                    let text: String = current_text.nfc().collect();
                    let style_name = resolve_style_name(current_style.as_deref(), styles);
                    paragraphs.push(DocParagraph::new(text, style_name));
                    in_paragraph = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("document parsing error: {}", e))),
            _ => {}
        }
    }

    log::debug!("Parsed {} paragraphs from document", paragraphs.len());

    Ok(paragraphs)
}

/// Resolve a paragraph style id to a display name.
///
/// Unstyled paragraphs carry the default "Normal" style. An id missing
/// from the style table falls back to the id itself.
fn resolve_style_name(style_id: Option<&str>, styles: &HashMap<String, String>) -> String {
    match style_id {
        None => "Normal".to_string(),
        Some(id) => styles
            .get(id)
            .cloned()
            .unwrap_or_else(|| canonical_style_name(id)),
    }
}

/// Canonicalize built-in style names to their display form.
fn canonical_style_name(raw: &str) -> String {
    if let Some(caps) = BUILTIN_HEADING_RE.captures(raw) {
        return format!("Heading {}", &caps[1]);
    }
    if raw.eq_ignore_ascii_case("title") {
        return "Title".to_string();
    }
    raw.to_string()
}

/// Strip the namespace prefix from an XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
