//! PPTX template analysis.
//!
//! Opens a template presentation and inventories the slide layouts of its
//! first slide master, in master order, together with their placeholders.

use deck_core::{Error, PlaceholderDescriptor, PlaceholderKind, Result, TemplateLayout};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// A relationship entry from a .rels part.
#[derive(Debug, Clone)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// A placeholder shape on a slide layout, with the raw `p:ph` attributes
/// preserved so cloned copies round-trip onto new slides.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderShape {
    pub index: u32,
    pub kind: PlaceholderKind,
    pub name: String,
    pub xml_type: Option<String>,
    pub xml_idx: Option<String>,
}

/// A slide layout part within the template package.
#[derive(Debug, Clone)]
pub struct LayoutPart {
    pub path: String,
    pub name: String,
    pub placeholders: Vec<PlaceholderShape>,
}

/// A parsed PPTX template.
///
/// Holds every package part in archive order, so a deck written from this
/// template carries the template's theme, masters, and layouts unchanged.
pub struct Template {
    entries: Vec<(String, Vec<u8>)>,
    layouts: Vec<LayoutPart>,
    notes_master_path: Option<String>,
}

impl Template {
    /// Open and parse a template from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::TemplateOpenError(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a template from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::TemplateOpenError(format!("not a PPTX archive: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read archive entry: {}", e)))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push((file.name().to_string(), data));
        }

        let pres_rels_xml = required_entry(&entries, "ppt/_rels/presentation.xml.rels")?;
        let pres_rels = parse_relationships(&pres_rels_xml)?;

        let master_rel = pres_rels
            .iter()
            .find(|r| r.rel_type.ends_with("/slideMaster"))
            .ok_or_else(|| {
                Error::TemplateOpenError("presentation has no slide master".to_string())
            })?;
        let master_path = resolve_part_path("ppt", &master_rel.target);

        let notes_master_path = pres_rels
            .iter()
            .find(|r| r.rel_type.ends_with("/notesMaster"))
            .map(|r| resolve_part_path("ppt", &r.target));

        let master_xml = required_entry(&entries, &master_path)?;
        let layout_ids = parse_layout_order(&master_xml)?;

        let master_rels_xml = required_entry(&entries, &rels_path_for(&master_path))?;
        let master_rels = parse_relationships(&master_rels_xml)?;
        let master_dir = parent_dir(&master_path);

        let mut layouts = Vec::with_capacity(layout_ids.len());
        for rel_id in &layout_ids {
            let target = master_rels
                .iter()
                .find(|r| &r.id == rel_id)
                .map(|r| r.target.clone())
                .ok_or_else(|| {
                    Error::TemplateOpenError(format!(
                        "slide master references unknown relationship '{}'",
                        rel_id
                    ))
                })?;
            let layout_path = resolve_part_path(master_dir, &target);
            let layout_xml = required_entry(&entries, &layout_path)?;
            let (name, placeholders) = parse_layout(&layout_xml)?;
            layouts.push(LayoutPart {
                path: layout_path,
                name,
                placeholders,
            });
        }

        log::debug!(
            "Template parsed: {} layouts, notes master {}",
            layouts.len(),
            if notes_master_path.is_some() {
                "present"
            } else {
                "absent"
            }
        );

        Ok(Self {
            entries,
            layouts,
            notes_master_path,
        })
    }

    /// Layout descriptors for layout resolution, in master order.
    pub fn layouts(&self) -> Vec<TemplateLayout> {
        self.layouts
            .iter()
            .map(|l| {
                TemplateLayout::new(
                    l.name.clone(),
                    l.placeholders
                        .iter()
                        .map(|p| PlaceholderDescriptor::new(p.index, p.kind, p.name.clone()))
                        .collect(),
                )
            })
            .collect()
    }

    pub(crate) fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    pub(crate) fn layout_parts(&self) -> &[LayoutPart] {
        &self.layouts
    }

    pub(crate) fn notes_master_path(&self) -> Option<&str> {
        self.notes_master_path.as_deref()
    }
}

/// Look up a required package part as text.
pub(crate) fn required_entry(entries: &[(String, Vec<u8>)], name: &str) -> Result<String> {
    entries
        .iter()
        .find(|(entry_name, _)| entry_name == name)
        .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
        .ok_or_else(|| Error::TemplateOpenError(format!("missing template part '{}'", name)))
}

/// Parse a .rels part into relationship entries.
pub(crate) fn parse_relationships(xml_content: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml_content);

    let mut relationships = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()) == b"Relationship" {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        relationships.push(Relationship {
                            id,
                            rel_type,
                            target,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("relationship parsing error: {}", e))),
            _ => {}
        }
    }

    Ok(relationships)
}

/// Extract the layout relationship ids from a slide master, in list order.
fn parse_layout_order(xml_content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml_content);

    let mut ids = Vec::new();
    let mut in_layout_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if local_name(e.name().as_ref()) == b"sldLayoutIdLst" {
                    in_layout_list = true;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if in_layout_list && local_name(e.name().as_ref()) == b"sldLayoutId" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"r:id" {
                            ids.push(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()) == b"sldLayoutIdLst" {
                    in_layout_list = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("slide master parsing error: {}", e))),
            _ => {}
        }
    }

    Ok(ids)
}

/// Parse a slide layout part into its display name and placeholder shapes.
fn parse_layout(xml_content: &str) -> Result<(String, Vec<PlaceholderShape>)> {
    let mut reader = Reader::from_str(xml_content);

    let mut layout_name = String::new();
    let mut placeholders = Vec::new();
    let mut in_shape = false;
    let mut shape_name = String::new();
    let mut ph_attrs: Option<(Option<String>, Option<String>)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match local_name(e.name().as_ref()) {
                    b"cSld" => {
                        for attr in e.attributes().flatten() {
                            if local_name(attr.key.as_ref()) == b"name" {
                                layout_name = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                    }
                    b"sp" => {
                        in_shape = true;
                        shape_name.clear();
                        ph_attrs = None;
                    }
                    b"cNvPr" if in_shape => {
                        for attr in e.attributes().flatten() {
                            if local_name(attr.key.as_ref()) == b"name" {
                                shape_name = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                    }
                    b"ph" if in_shape => {
                        let mut ph_type = None;
                        let mut ph_idx = None;
                        for attr in e.attributes().flatten() {
                            match local_name(attr.key.as_ref()) {
                                b"type" => {
                                    ph_type =
                                        Some(String::from_utf8_lossy(&attr.value).to_string())
                                }
                                b"idx" => {
                                    ph_idx =
                                        Some(String::from_utf8_lossy(&attr.value).to_string())
                                }
                                _ => {}
                            }
                        }
                        ph_attrs = Some((ph_type, ph_idx));
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if local_name(e.name().as_ref()) == b"sp" && in_shape {
                    if let Some((ph_type, ph_idx)) = ph_attrs.take() {
                        let index = ph_idx
                            .as_deref()
                            .and_then(|i| i.parse::<u32>().ok())
                            .unwrap_or(0);
                        placeholders.push(PlaceholderShape {
                            index,
                            kind: PlaceholderKind::from_xml_type(ph_type.as_deref()),
                            name: std::mem::take(&mut shape_name),
                            xml_type: ph_type,
                            xml_idx: ph_idx,
                        });
                    }
                    in_shape = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("slide layout parsing error: {}", e))),
            _ => {}
        }
    }

    Ok((layout_name, placeholders))
}

/// Resolve a relationship target against the directory of its source part.
pub(crate) fn resolve_part_path(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// The .rels part path for a package part.
pub(crate) fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// The directory of a package part.
pub(crate) fn parent_dir(part_path: &str) -> &str {
    match part_path.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    }
}

/// Strip the namespace prefix from an XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_layouts_follow_master_order() {
        let template = Template::from_reader(fixture::template_archive(true, 0)).unwrap();

        let layouts = template.layouts();
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].name, "Title Slide");
        assert_eq!(layouts[1].name, "Title and Content");
    }

    #[test]
    fn test_layout_placeholders_are_inventoried() {
        let template = Template::from_reader(fixture::template_archive(true, 0)).unwrap();

        let layouts = template.layouts();
        let title_layout = &layouts[0];
        assert_eq!(title_layout.placeholders.len(), 3);
        assert_eq!(title_layout.placeholders[0].kind, PlaceholderKind::Title);
        assert_eq!(title_layout.placeholders[0].index, 0);
        assert_eq!(title_layout.placeholders[1].kind, PlaceholderKind::Body);
        assert_eq!(title_layout.placeholders[1].index, 1);
        assert_eq!(title_layout.placeholders[2].kind, PlaceholderKind::Footer);
        assert_eq!(title_layout.placeholders[2].index, 10);
    }

    #[test]
    fn test_untyped_placeholder_is_text_kind() {
        let template = Template::from_reader(fixture::template_archive(true, 0)).unwrap();

        let layouts = template.layouts();
        let content_layout = &layouts[1];
        assert_eq!(content_layout.placeholders[1].kind, PlaceholderKind::Text);
        assert_eq!(content_layout.placeholders[1].name, "Content Placeholder 2");
    }

    #[test]
    fn test_raw_placeholder_attributes_preserved() {
        let template = Template::from_reader(fixture::template_archive(true, 0)).unwrap();

        let title_ph = &template.layout_parts()[0].placeholders[0];
        assert_eq!(title_ph.xml_type.as_deref(), Some("ctrTitle"));
        assert_eq!(title_ph.xml_idx, None);

        let body_ph = &template.layout_parts()[1].placeholders[1];
        assert_eq!(body_ph.xml_type, None);
        assert_eq!(body_ph.xml_idx.as_deref(), Some("1"));
    }

    #[test]
    fn test_notes_master_detection() {
        let with = Template::from_reader(fixture::template_archive(true, 0)).unwrap();
        let without = Template::from_reader(fixture::template_archive(false, 0)).unwrap();

        assert_eq!(
            with.notes_master_path(),
            Some("ppt/notesMasters/notesMaster1.xml")
        );
        assert_eq!(without.notes_master_path(), None);
    }

    #[test]
    fn test_non_archive_input_is_template_open_error() {
        let result = Template::from_reader(Cursor::new(b"not a zip".to_vec()));

        assert!(matches!(result, Err(Error::TemplateOpenError(_))));
    }

    #[test]
    fn test_missing_presentation_rels_is_template_open_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("docProps/core.xml", zip::write::FileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut writer, b"<x/>").unwrap();
        let archive = writer.finish().unwrap();

        let result = Template::from_reader(archive);

        assert!(matches!(result, Err(Error::TemplateOpenError(_))));
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(
            resolve_part_path("ppt/slideMasters", "../slideLayouts/slideLayout1.xml"),
            "ppt/slideLayouts/slideLayout1.xml"
        );
        assert_eq!(
            resolve_part_path("ppt", "slideMasters/slideMaster1.xml"),
            "ppt/slideMasters/slideMaster1.xml"
        );
        assert_eq!(
            resolve_part_path("ppt", "/ppt/notesMasters/notesMaster1.xml"),
            "ppt/notesMasters/notesMaster1.xml"
        );
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(
            rels_path_for("ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
        assert_eq!(
            rels_path_for("ppt/slideMasters/slideMaster1.xml"),
            "ppt/slideMasters/_rels/slideMaster1.xml.rels"
        );
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sldLayoutId"), b"sldLayoutId");
        assert_eq!(local_name(b"Relationship"), b"Relationship");
    }
}
