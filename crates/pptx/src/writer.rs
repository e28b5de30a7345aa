//! Deck writer over a parsed template.
//!
//! Slides are staged in memory and the whole package is assembled on save:
//! every template part is carried over (three of them patched) and the new
//! slide, notes, and relationship parts are appended. Part numbers,
//! relationship ids, and slide ids all continue after the template's own
//! maxima so existing content is never disturbed.

use deck_core::{Deck, DeckSlide, Error, PlaceholderDescriptor, Result, TemplateLayout};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::parts;
use crate::parts::SlideShape;
use crate::template::{local_name, parse_relationships, required_entry, PlaceholderShape, Template};

/// Lowest slide id PowerPoint assigns in a presentation's slide id list.
const FIRST_SLIDE_ID: u32 = 256;

/// A slide staged for writing.
pub struct SlideDraft {
    layout_index: usize,
    placeholders: Vec<DraftPlaceholder>,
    notes: Option<String>,
}

struct DraftPlaceholder {
    shape: PlaceholderShape,
    paragraphs: Vec<(String, u8)>,
}

impl SlideDraft {
    fn placeholder_mut(&mut self, index: u32) -> Option<&mut DraftPlaceholder> {
        self.placeholders
            .iter_mut()
            .find(|p| p.shape.index == index)
    }
}

impl DeckSlide for SlideDraft {
    fn placeholders(&self) -> Vec<PlaceholderDescriptor> {
        self.placeholders
            .iter()
            .map(|p| PlaceholderDescriptor::new(p.shape.index, p.shape.kind, p.shape.name.clone()))
            .collect()
    }

    fn set_text(&mut self, placeholder_index: u32, text: &str) -> bool {
        match self.placeholder_mut(placeholder_index) {
            Some(placeholder) => {
                placeholder.paragraphs = vec![(text.to_string(), 0)];
                true
            }
            None => false,
        }
    }

    fn clear_text(&mut self, placeholder_index: u32) -> bool {
        match self.placeholder_mut(placeholder_index) {
            Some(placeholder) => {
                placeholder.paragraphs = vec![(String::new(), 0)];
                true
            }
            None => false,
        }
    }

    fn set_paragraph(
        &mut self,
        placeholder_index: u32,
        paragraph: usize,
        text: &str,
        level: u8,
    ) -> bool {
        match self.placeholder_mut(placeholder_index) {
            Some(placeholder) => {
                if paragraph < placeholder.paragraphs.len() {
                    placeholder.paragraphs[paragraph] = (text.to_string(), level);
                } else {
                    placeholder.paragraphs.push((text.to_string(), level));
                }
                true
            }
            None => false,
        }
    }

    fn add_paragraph(&mut self, placeholder_index: u32, text: &str, level: u8) -> bool {
        match self.placeholder_mut(placeholder_index) {
            Some(placeholder) => {
                placeholder.paragraphs.push((text.to_string(), level));
                true
            }
            None => false,
        }
    }

    fn set_notes(&mut self, notes: &str) {
        self.notes = Some(notes.to_string());
    }
}

/// Writes a deck based on a template presentation.
pub struct DeckWriter {
    template: Template,
    slides: Vec<SlideDraft>,
    slide_number_base: u32,
    notes_number_base: u32,
    rel_id_base: u32,
    slide_id_base: u32,
}

impl DeckWriter {
    /// Open a template from disk and prepare a writer over it.
    pub fn open(template_path: &Path) -> Result<Self> {
        Self::from_template(Template::open(template_path)?)
    }

    /// Prepare a writer over an already parsed template.
    pub fn from_template(template: Template) -> Result<Self> {
        let mut max_slide = 0u32;
        let mut max_notes = 0u32;
        for (name, _) in template.entries() {
            if let Some(n) = part_number(name, "ppt/slides/slide", ".xml") {
                max_slide = max_slide.max(n);
            }
            if let Some(n) = part_number(name, "ppt/notesSlides/notesSlide", ".xml") {
                max_notes = max_notes.max(n);
            }
        }

        let pres_rels_xml = required_entry(template.entries(), "ppt/_rels/presentation.xml.rels")?;
        let max_rel = parse_relationships(&pres_rels_xml)?
            .iter()
            .filter_map(|r| rel_number(&r.id))
            .max()
            .unwrap_or(0);

        let pres_xml = required_entry(template.entries(), "ppt/presentation.xml")?;
        let max_slide_id = parse_max_slide_id(&pres_xml)?;

        Ok(Self {
            template,
            slides: Vec::new(),
            slide_number_base: max_slide + 1,
            notes_number_base: max_notes + 1,
            rel_id_base: max_rel + 1,
            slide_id_base: (max_slide_id + 1).max(FIRST_SLIDE_ID),
        })
    }

    /// Layout descriptors of the underlying template, in master order.
    pub fn template_layouts(&self) -> Vec<TemplateLayout> {
        self.template.layouts()
    }

    /// Assemble the deck package into `target`.
    pub fn write_to<W: Write + Seek>(&self, target: W) -> Result<()> {
        let mut content_overrides: Vec<(String, String)> = Vec::new();
        let mut new_rels: Vec<(String, String, String)> = Vec::new();
        let mut slide_id_entries: Vec<(u32, String)> = Vec::new();
        let mut new_parts: Vec<(String, String)> = Vec::new();

        let notes_master_target = self
            .template
            .notes_master_path()
            .and_then(|p| p.strip_prefix("ppt/"))
            .map(|p| format!("../{}", p));
        let mut notes_count = 0u32;

        for (i, slide) in self.slides.iter().enumerate() {
            let slide_number = self.slide_number_base + i as u32;
            let slide_part = format!("ppt/slides/slide{}.xml", slide_number);
            let rel_id = format!("rId{}", self.rel_id_base + i as u32);

            let shapes: Vec<SlideShape<'_>> = slide
                .placeholders
                .iter()
                .map(|p| SlideShape {
                    name: &p.shape.name,
                    xml_type: p.shape.xml_type.as_deref(),
                    xml_idx: p.shape.xml_idx.as_deref(),
                    paragraphs: &p.paragraphs,
                })
                .collect();
            new_parts.push((slide_part.clone(), parts::slide_xml(&shapes)?));
            content_overrides.push((
                format!("/{}", slide_part),
                parts::SLIDE_CONTENT_TYPE.to_string(),
            ));
            new_rels.push((
                rel_id.clone(),
                parts::SLIDE_REL_TYPE.to_string(),
                format!("slides/slide{}.xml", slide_number),
            ));
            slide_id_entries.push((self.slide_id_base + i as u32, rel_id));

            let layout_path = &self.template.layout_parts()[slide.layout_index].path;
            let layout_target = match layout_path.strip_prefix("ppt/") {
                Some(stripped) => format!("../{}", stripped),
                None => format!("/{}", layout_path),
            };

            let notes_target = match (&slide.notes, &notes_master_target) {
                (Some(notes), Some(master_target)) => {
                    let notes_number = self.notes_number_base + notes_count;
                    notes_count += 1;
                    let notes_part = format!("ppt/notesSlides/notesSlide{}.xml", notes_number);
                    new_parts.push((notes_part.clone(), parts::notes_xml(notes)?));
                    new_parts.push((
                        format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", notes_number),
                        parts::notes_rels_xml(
                            master_target,
                            &format!("../slides/slide{}.xml", slide_number),
                        )?,
                    ));
                    content_overrides.push((
                        format!("/{}", notes_part),
                        parts::NOTES_SLIDE_CONTENT_TYPE.to_string(),
                    ));
                    Some(format!("../notesSlides/notesSlide{}.xml", notes_number))
                }
                (Some(_), None) => {
                    log::warn!(
                        "Template has no notes master; dropping speaker notes for slide {}",
                        slide_number
                    );
                    None
                }
                _ => None,
            };

            new_parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", slide_number),
                parts::slide_rels_xml(&layout_target, notes_target.as_deref())?,
            ));
        }

        let mut zip = ZipWriter::new(target);
        let options = FileOptions::default();

        for (name, data) in self.template.entries() {
            let patched = if self.slides.is_empty() {
                None
            } else {
                match name.as_str() {
                    "[Content_Types].xml" => Some(parts::add_content_type_overrides(
                        &String::from_utf8_lossy(data),
                        &content_overrides,
                    )?),
                    "ppt/_rels/presentation.xml.rels" => Some(parts::add_relationships(
                        &String::from_utf8_lossy(data),
                        &new_rels,
                    )?),
                    "ppt/presentation.xml" => Some(parts::append_slide_ids(
                        &String::from_utf8_lossy(data),
                        &slide_id_entries,
                    )?),
                    _ => None,
                }
            };

            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
            match patched {
                Some(content) => zip.write_all(content.as_bytes())?,
                None => zip.write_all(data)?,
            }
        }

        for (name, content) in &new_parts {
            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;

        log::info!("Wrote deck with {} slides", self.slides.len());

        Ok(())
    }
}

impl Deck for DeckWriter {
    type Slide = SlideDraft;

    fn add_slide(&mut self, layout_index: usize) -> Result<&mut SlideDraft> {
        let layout = self
            .template
            .layout_parts()
            .get(layout_index)
            .ok_or_else(|| {
                Error::DeckError(format!(
                    "layout index {} out of range ({} layouts)",
                    layout_index,
                    self.template.layout_parts().len()
                ))
            })?;

        // Date, footer, and slide number placeholders stay on the layout.
        let placeholders = layout
            .placeholders
            .iter()
            .filter(|p| p.kind.carried_onto_slides())
            .map(|p| DraftPlaceholder {
                shape: p.clone(),
                paragraphs: vec![(String::new(), 0)],
            })
            .collect();

        let draft_index = self.slides.len();
        self.slides.push(SlideDraft {
            layout_index,
            placeholders,
            notes: None,
        });
        Ok(&mut self.slides[draft_index])
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| Error::DeckError(format!("cannot write deck to {}: {}", path.display(), e)))?;
        self.write_to(file)
    }
}

/// Extract the number of a package part within a numbered family.
fn part_number(path: &str, prefix: &str, suffix: &str) -> Option<u32> {
    path.strip_prefix(prefix)
        .and_then(|s| s.strip_suffix(suffix))
        .and_then(|s| s.parse().ok())
}

/// Extract the numeric part of a relationship id such as "rId12".
fn rel_number(rel_id: &str) -> Option<u32> {
    rel_id.strip_prefix("rId").and_then(|s| s.parse().ok())
}

/// Largest slide id already present in presentation.xml, 0 when none.
fn parse_max_slide_id(xml_content: &str) -> Result<u32> {
    let mut reader = Reader::from_str(xml_content);
    let mut max_id = 0u32;

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()) == b"sldId" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"id" {
                            if let Ok(id) = String::from_utf8_lossy(&attr.value).parse::<u32>() {
                                max_id = max_id.max(id);
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("presentation parsing error: {}", e))),
            _ => {}
        }
    }

    Ok(max_id)
}
