//! XML part generation and patching for deck assembly.
//!
//! New slide, notes, and relationship parts are generated as strings;
//! existing package parts (content types, presentation, presentation
//! relationships) are patched by replaying their events through a writer
//! and injecting new entries before the closing tag.

use deck_core::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Write as FmtWrite;
use std::io::Cursor;

use crate::template::local_name;

pub(crate) const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub(crate) const NOTES_SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

pub(crate) const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const SLIDE_LAYOUT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const NOTES_SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
pub(crate) const NOTES_MASTER_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesMaster";

/// A placeholder shape to render onto a new slide.
pub(crate) struct SlideShape<'a> {
    pub name: &'a str,
    pub xml_type: Option<&'a str>,
    pub xml_idx: Option<&'a str>,
    pub paragraphs: &'a [(String, u8)],
}

/// Generate the XML for a new slide part.
pub(crate) fn slide_xml(shapes: &[SlideShape<'_>]) -> Result<String> {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<p:sld xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" "#,
    );
    xml.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");

    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str("<a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/>"#);
    xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
    xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm>");
    xml.push_str("</p:grpSpPr>");

    // id 1 is the group shape, so placeholder ids start at 2
    for (position, shape) in shapes.iter().enumerate() {
        write_placeholder_shape(&mut xml, (position + 2) as u32, shape)?;
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:sld>");

    Ok(xml)
}

fn write_placeholder_shape(xml: &mut String, id: u32, shape: &SlideShape<'_>) -> Result<()> {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape(shape.name))
        .map_err(|e| Error::XmlError(e.to_string()))?;
    xml.push_str("<p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>");
    xml.push_str("<p:nvPr><p:ph");
    if let Some(ph_type) = shape.xml_type {
        write!(xml, r#" type="{}""#, escape(ph_type))
            .map_err(|e| Error::XmlError(e.to_string()))?;
    }
    if let Some(ph_idx) = shape.xml_idx {
        write!(xml, r#" idx="{}""#, escape(ph_idx))
            .map_err(|e| Error::XmlError(e.to_string()))?;
    }
    xml.push_str("/></p:nvPr>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr/>");

    xml.push_str("<p:txBody>");
    xml.push_str("<a:bodyPr/>");
    xml.push_str("<a:lstStyle/>");
    for (text, level) in shape.paragraphs {
        write_paragraph(xml, text, *level)?;
    }
    xml.push_str("</p:txBody>");

    xml.push_str("</p:sp>");

    Ok(())
}

fn write_paragraph(xml: &mut String, text: &str, level: u8) -> Result<()> {
    if text.is_empty() {
        xml.push_str("<a:p><a:endParaRPr lang=\"en-US\"/></a:p>");
        return Ok(());
    }

    xml.push_str("<a:p>");
    if level > 0 {
        write!(xml, r#"<a:pPr lvl="{}"/>"#, level).map_err(|e| Error::XmlError(e.to_string()))?;
    }
    xml.push_str("<a:r>");
    xml.push_str("<a:rPr lang=\"en-US\" dirty=\"0\"/>");
    write!(xml, "<a:t>{}</a:t>", escape(text)).map_err(|e| Error::XmlError(e.to_string()))?;
    xml.push_str("</a:r>");
    xml.push_str("</a:p>");

    Ok(())
}

/// Generate the XML for a notes slide part, one paragraph per notes line.
pub(crate) fn notes_xml(notes: &str) -> Result<String> {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<p:notes xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" "#,
    );
    xml.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");
    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str("<a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>");
    xml.push_str("<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm>");
    xml.push_str("</p:grpSpPr>");

    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    xml.push_str(r#"<p:cNvPr id="2" name="Notes Placeholder"/>"#);
    xml.push_str("<p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>");
    xml.push_str("<p:nvPr><p:ph type=\"body\" idx=\"1\"/></p:nvPr>");
    xml.push_str("</p:nvSpPr>");
    xml.push_str("<p:spPr/>");
    xml.push_str("<p:txBody>");
    xml.push_str("<a:bodyPr/>");
    xml.push_str("<a:lstStyle/>");
    for line in notes.lines() {
        write_paragraph(&mut xml, line, 0)?;
    }
    xml.push_str("</p:txBody>");
    xml.push_str("</p:sp>");

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
    xml.push_str("</p:notes>");

    Ok(xml)
}

/// Generate the relationships part for a new slide.
pub(crate) fn slide_rels_xml(layout_target: &str, notes_target: Option<&str>) -> Result<String> {
    let mut xml = String::with_capacity(512);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{}" Target="{}"/>"#,
        SLIDE_LAYOUT_REL_TYPE,
        escape(layout_target)
    )
    .map_err(|e| Error::XmlError(e.to_string()))?;
    if let Some(target) = notes_target {
        write!(
            xml,
            r#"<Relationship Id="rId2" Type="{}" Target="{}"/>"#,
            NOTES_SLIDE_REL_TYPE,
            escape(target)
        )
        .map_err(|e| Error::XmlError(e.to_string()))?;
    }
    xml.push_str("</Relationships>");

    Ok(xml)
}

/// Generate the relationships part for a new notes slide.
pub(crate) fn notes_rels_xml(notes_master_target: &str, slide_target: &str) -> Result<String> {
    let mut xml = String::with_capacity(512);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    write!(
        xml,
        r#"<Relationship Id="rId1" Type="{}" Target="{}"/>"#,
        NOTES_MASTER_REL_TYPE,
        escape(notes_master_target)
    )
    .map_err(|e| Error::XmlError(e.to_string()))?;
    write!(
        xml,
        r#"<Relationship Id="rId2" Type="{}" Target="{}"/>"#,
        SLIDE_REL_TYPE,
        escape(slide_target)
    )
    .map_err(|e| Error::XmlError(e.to_string()))?;
    xml.push_str("</Relationships>");

    Ok(xml)
}

/// Append Override entries to a [Content_Types].xml part.
pub(crate) fn add_content_type_overrides(
    xml_content: &str,
    overrides: &[(String, String)],
) -> Result<String> {
    patch_before_close(xml_content, b"Types", |writer| {
        for (part_name, content_type) in overrides {
            let mut elem = BytesStart::new("Override");
            elem.push_attribute(("PartName", part_name.as_str()));
            elem.push_attribute(("ContentType", content_type.as_str()));
            emit(writer, Event::Empty(elem))?;
        }
        Ok(())
    })
}

/// Append Relationship entries to a .rels part.
pub(crate) fn add_relationships(
    xml_content: &str,
    additions: &[(String, String, String)],
) -> Result<String> {
    patch_before_close(xml_content, b"Relationships", |writer| {
        for (id, rel_type, target) in additions {
            let mut elem = BytesStart::new("Relationship");
            elem.push_attribute(("Id", id.as_str()));
            elem.push_attribute(("Type", rel_type.as_str()));
            elem.push_attribute(("Target", target.as_str()));
            emit(writer, Event::Empty(elem))?;
        }
        Ok(())
    })
}

/// Append slide id entries to the presentation's slide id list.
///
/// Handles an existing list, a self-closed empty list, and a presentation
/// without any list, in which case one is inserted before the slide size
/// element as the schema requires.
pub(crate) fn append_slide_ids(xml_content: &str, entries: &[(u32, String)]) -> Result<String> {
    let mut reader = Reader::from_str(xml_content);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut injected = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("presentation patching error: {}", e)))?;
        match event {
            Event::Eof => break,
            Event::End(e) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                write_slide_id_entries(&mut writer, entries)?;
                injected = true;
                emit(&mut writer, Event::End(e))?;
            }
            Event::Empty(e) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                emit(&mut writer, Event::Start(BytesStart::new(name.as_str())))?;
                write_slide_id_entries(&mut writer, entries)?;
                emit(&mut writer, Event::End(BytesEnd::new(name.as_str())))?;
                injected = true;
            }
            Event::Empty(e) if !injected && local_name(e.name().as_ref()) == b"sldSz" => {
                emit(&mut writer, Event::Start(BytesStart::new("p:sldIdLst")))?;
                write_slide_id_entries(&mut writer, entries)?;
                emit(&mut writer, Event::End(BytesEnd::new("p:sldIdLst")))?;
                injected = true;
                emit(&mut writer, Event::Empty(e))?;
            }
            other => emit(&mut writer, other)?,
        }
    }

    if !injected {
        return Err(Error::XmlError(
            "presentation has no slide id list or slide size element".to_string(),
        ));
    }

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_slide_id_entries(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    entries: &[(u32, String)],
) -> Result<()> {
    for (slide_id, rel_id) in entries {
        let mut elem = BytesStart::new("p:sldId");
        elem.push_attribute(("id", slide_id.to_string().as_str()));
        elem.push_attribute(("r:id", rel_id.as_str()));
        emit(writer, Event::Empty(elem))?;
    }
    Ok(())
}

/// Replay a part's events, injecting new entries before the named closing tag.
fn patch_before_close<F>(xml_content: &str, element: &[u8], mut inject: F) -> Result<String>
where
    F: FnMut(&mut Writer<Cursor<Vec<u8>>>) -> Result<()>,
{
    let mut reader = Reader::from_str(xml_content);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("part patching error: {}", e)))?;
        match event {
            Event::Eof => break,
            Event::End(e) if local_name(e.name().as_ref()) == element => {
                inject(&mut writer)?;
                emit(&mut writer, Event::End(e))?;
            }
            other => emit(&mut writer, other)?,
        }
    }

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("part patching error: {}", e)))
}
