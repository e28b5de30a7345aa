//! Domain types for document segmentation, layout resolution, and slide outlines.

use serde::{Deserialize, Serialize};

/// A paragraph read from the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocParagraph {
    /// Raw paragraph text (untrimmed).
    pub text: String,

    /// Resolved paragraph style name, e.g. "Heading 1", "Title", "Normal".
    pub style_name: String,
}

impl DocParagraph {
    /// Create a new paragraph with the given text and style name.
    pub fn new(text: impl Into<String>, style_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_name: style_name.into(),
        }
    }
}

/// Classification of a paragraph style for segmentation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParagraphStyle {
    /// Explicit document title style.
    Title,
    /// A heading at the given level (1-based).
    Heading(u32),
    /// Anything else: plain body content.
    Body,
}

impl ParagraphStyle {
    /// Classify a style name.
    ///
    /// Style names starting with "Heading" carry their level as the trailing
    /// whitespace-separated token; a missing or non-integer token degrades to
    /// level 1 rather than failing the paragraph.
    pub fn from_style_name(style_name: &str) -> Self {
        let name = style_name.trim();
        if name == "Title" {
            return Self::Title;
        }
        if name.starts_with("Heading") {
            let level = name
                .split_whitespace()
                .last()
                .and_then(|token| token.parse::<u32>().ok())
                .unwrap_or(1);
            return Self::Heading(level.max(1));
        }
        Self::Body
    }
}

/// A heading that opens a document section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeading {
    /// Heading level, 1-based.
    pub level: u32,

    /// Trimmed heading text.
    pub text: String,
}

/// A contiguous run of content under one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// The heading that opened this section.
    pub heading: SectionHeading,

    /// Non-empty, trimmed content paragraphs in source order.
    pub paragraphs: Vec<String>,
}

impl Section {
    /// Create an empty section under the given heading.
    pub fn new(level: u32, text: impl Into<String>) -> Self {
        Self {
            heading: SectionHeading {
                level,
                text: text.into(),
            },
            paragraphs: Vec::new(),
        }
    }

    /// Append a content paragraph to this section.
    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.paragraphs.push(text.into());
    }
}

/// The segmented representation of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Document title ("" when none could be determined).
    pub title: String,

    /// Sections in source order.
    pub sections: Vec<Section>,
}

impl DocumentTree {
    /// Create a tree with the given title and no sections.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }
}

/// Semantic category of a slide, independent of any template's layout naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideRole {
    /// Opening title slide.
    Title,
    /// Section divider slide.
    Section,
    /// Regular bulleted content slide.
    Content,
    /// Picture-focused slide.
    Picture,
    /// Blank slide.
    Blank,
}

impl SlideRole {
    /// Map a generator-supplied `slide_type` string onto a role.
    ///
    /// Generators only ever get the three supported roles back; anything
    /// unrecognized becomes `Content` so a run never aborts on free-form output.
    pub fn from_slide_type(slide_type: &str) -> Self {
        match slide_type {
            "title" => Self::Title,
            "section" => Self::Section,
            "content" => Self::Content,
            _ => Self::Content,
        }
    }

    /// Lowercase name of this role, as used in layout hints and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Section => "section",
            Self::Content => "content",
            Self::Picture => "picture",
            Self::Blank => "blank",
        }
    }
}

/// One slide of the validated outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    /// Normalized role (title, section, or content).
    pub role: SlideRole,

    /// Slide title text.
    pub title: Option<String>,

    /// Subtitle text (title slides only).
    pub subtitle: Option<String>,

    /// Bullet texts in display order.
    pub bullets: Vec<String>,

    /// Raw speaker notes, formatted at population time.
    pub notes: Option<String>,
}

impl SlideSpec {
    /// Create an empty slide spec with the given role.
    pub fn new(role: SlideRole) -> Self {
        Self {
            role,
            title: None,
            subtitle: None,
            bullets: Vec::new(),
            notes: None,
        }
    }

    /// Set the slide title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the slide subtitle.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the bullet list.
    pub fn with_bullets(mut self, bullets: Vec<String>) -> Self {
        self.bullets = bullets;
        self
    }

    /// Set the speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The validated, typed outline derived from untrusted generator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutline {
    /// Presentation title proposed by the generator.
    pub title: String,

    /// Presentation subtitle, when proposed.
    pub subtitle: Option<String>,

    /// Slides in deck order.
    pub slides: Vec<SlideSpec>,
}

/// Semantic kind of a placeholder shape, using the conventional placeholder
/// numbering shared by the major presentation toolkits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKind {
    /// Slide title, including centered titles on title layouts.
    Title = 1,
    /// Body text, including the subtitle placeholder on title layouts.
    Body = 2,
    /// Generic text placeholder (no explicit type in the layout XML).
    Text = 3,
    /// Embedded object / generic content.
    Object = 7,
    /// Chart.
    Chart = 8,
    /// Media clip.
    Media = 10,
    /// Table.
    Table = 12,
    /// Slide number field.
    SlideNumber = 13,
    /// Header field.
    Header = 14,
    /// Footer field.
    Footer = 15,
    /// Date field.
    Date = 16,
    /// Picture.
    Picture = 18,
    /// Any other placeholder kind (diagrams, clip art, ...).
    Other = 0,
}

impl PlaceholderKind {
    /// Classify from the `type` attribute of a `p:ph` element.
    ///
    /// A placeholder with no `type` attribute is a generic text placeholder.
    pub fn from_xml_type(xml_type: Option<&str>) -> Self {
        match xml_type {
            None => Self::Text,
            Some("title") | Some("ctrTitle") => Self::Title,
            Some("body") | Some("subTitle") => Self::Body,
            Some("obj") => Self::Object,
            Some("chart") => Self::Chart,
            Some("media") => Self::Media,
            Some("tbl") => Self::Table,
            Some("sldNum") => Self::SlideNumber,
            Some("hdr") => Self::Header,
            Some("ftr") => Self::Footer,
            Some("dt") => Self::Date,
            Some("pic") => Self::Picture,
            Some(_) => Self::Other,
        }
    }

    /// Whether this kind can receive bulleted body content.
    pub fn is_content_target(&self) -> bool {
        matches!(
            self,
            Self::Body | Self::Text | Self::Object | Self::Chart | Self::Picture
        )
    }

    /// Whether new slides inherit this placeholder from their layout.
    ///
    /// Date, footer, and slide-number placeholders stay on the layout.
    pub fn carried_onto_slides(&self) -> bool {
        !matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }
}

/// Metadata describing one placeholder slot on a layout or slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderDescriptor {
    /// Placeholder index (the `idx` attribute; 0 when absent).
    pub index: u32,

    /// Semantic kind.
    pub kind: PlaceholderKind,

    /// Display name of the shape, e.g. "Title 1".
    pub name: String,
}

impl PlaceholderDescriptor {
    /// Create a descriptor.
    pub fn new(index: u32, kind: PlaceholderKind, name: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            name: name.into(),
        }
    }
}

/// One slide layout offered by a template, in master order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLayout {
    /// Layout display name, e.g. "Title and Content".
    pub name: String,

    /// Placeholders in shape order.
    pub placeholders: Vec<PlaceholderDescriptor>,
}

impl TemplateLayout {
    /// Create a layout description.
    pub fn new(name: impl Into<String>, placeholders: Vec<PlaceholderDescriptor>) -> Self {
        Self {
            name: name.into(),
            placeholders,
        }
    }
}

/// A resolved association between a slide role and a concrete layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutBinding {
    /// Index of the layout in the template's layout order.
    pub layout_index: usize,

    /// Display name of the bound layout.
    pub name: String,

    /// The layout's placeholder inventory, in shape order.
    pub placeholders: Vec<PlaceholderDescriptor>,
}

/// Role → layout bindings for one template.
///
/// `picture` and `blank` are opportunistic and may stay unbound; `title` and
/// `content` are always bound when the template has at least one layout, and
/// `section` whenever `title` is (see the resolver's fallback chain).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMap {
    title: Option<LayoutBinding>,
    section: Option<LayoutBinding>,
    content: Option<LayoutBinding>,
    picture: Option<LayoutBinding>,
    blank: Option<LayoutBinding>,
}

impl LayoutMap {
    /// Get the binding for a role, if any.
    pub fn get(&self, role: SlideRole) -> Option<&LayoutBinding> {
        match role {
            SlideRole::Title => self.title.as_ref(),
            SlideRole::Section => self.section.as_ref(),
            SlideRole::Content => self.content.as_ref(),
            SlideRole::Picture => self.picture.as_ref(),
            SlideRole::Blank => self.blank.as_ref(),
        }
    }

    /// Whether a role already has a binding.
    pub fn is_bound(&self, role: SlideRole) -> bool {
        self.get(role).is_some()
    }

    /// Bind a role to a layout, replacing any previous binding.
    pub fn bind(&mut self, role: SlideRole, binding: LayoutBinding) {
        let slot = match role {
            SlideRole::Title => &mut self.title,
            SlideRole::Section => &mut self.section,
            SlideRole::Content => &mut self.content,
            SlideRole::Picture => &mut self.picture,
            SlideRole::Blank => &mut self.blank,
        };
        *slot = Some(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_classification() {
        assert_eq!(
            ParagraphStyle::from_style_name("Title"),
            ParagraphStyle::Title
        );
        assert_eq!(
            ParagraphStyle::from_style_name("Heading 1"),
            ParagraphStyle::Heading(1)
        );
        assert_eq!(
            ParagraphStyle::from_style_name("Heading 4"),
            ParagraphStyle::Heading(4)
        );
        assert_eq!(
            ParagraphStyle::from_style_name("Normal"),
            ParagraphStyle::Body
        );
        assert_eq!(
            ParagraphStyle::from_style_name("List Paragraph"),
            ParagraphStyle::Body
        );
    }

    #[test]
    fn test_malformed_heading_level_defaults_to_one() {
        assert_eq!(
            ParagraphStyle::from_style_name("Heading One"),
            ParagraphStyle::Heading(1)
        );
        assert_eq!(
            ParagraphStyle::from_style_name("Heading 2a"),
            ParagraphStyle::Heading(1)
        );
        assert_eq!(
            ParagraphStyle::from_style_name("Heading"),
            ParagraphStyle::Heading(1)
        );
    }

    #[test]
    fn test_unknown_slide_type_coerces_to_content() {
        assert_eq!(SlideRole::from_slide_type("title"), SlideRole::Title);
        assert_eq!(SlideRole::from_slide_type("section"), SlideRole::Section);
        assert_eq!(SlideRole::from_slide_type("content"), SlideRole::Content);
        assert_eq!(SlideRole::from_slide_type("summary"), SlideRole::Content);
        assert_eq!(SlideRole::from_slide_type("Title"), SlideRole::Content);
        assert_eq!(SlideRole::from_slide_type(""), SlideRole::Content);
    }

    #[test]
    fn test_placeholder_kind_from_xml_type() {
        assert_eq!(
            PlaceholderKind::from_xml_type(Some("ctrTitle")),
            PlaceholderKind::Title
        );
        assert_eq!(
            PlaceholderKind::from_xml_type(Some("subTitle")),
            PlaceholderKind::Body
        );
        assert_eq!(PlaceholderKind::from_xml_type(None), PlaceholderKind::Text);
        assert_eq!(
            PlaceholderKind::from_xml_type(Some("obj")),
            PlaceholderKind::Object
        );
        assert_eq!(
            PlaceholderKind::from_xml_type(Some("dgm")),
            PlaceholderKind::Other
        );
    }

    #[test]
    fn test_content_target_kinds() {
        assert!(PlaceholderKind::Body.is_content_target());
        assert!(PlaceholderKind::Text.is_content_target());
        assert!(PlaceholderKind::Object.is_content_target());
        assert!(PlaceholderKind::Chart.is_content_target());
        assert!(PlaceholderKind::Picture.is_content_target());
        assert!(!PlaceholderKind::Title.is_content_target());
        assert!(!PlaceholderKind::Footer.is_content_target());
    }

    #[test]
    fn test_layout_placeholders_stay_on_layout() {
        assert!(!PlaceholderKind::Date.carried_onto_slides());
        assert!(!PlaceholderKind::Footer.carried_onto_slides());
        assert!(!PlaceholderKind::SlideNumber.carried_onto_slides());
        assert!(PlaceholderKind::Title.carried_onto_slides());
        assert!(PlaceholderKind::Body.carried_onto_slides());
    }

    #[test]
    fn test_layout_map_bind_and_get() {
        let mut map = LayoutMap::default();
        assert!(!map.is_bound(SlideRole::Title));

        map.bind(
            SlideRole::Title,
            LayoutBinding {
                layout_index: 0,
                name: "Title Slide".to_string(),
                placeholders: Vec::new(),
            },
        );
        assert!(map.is_bound(SlideRole::Title));
        assert_eq!(map.get(SlideRole::Title).unwrap().layout_index, 0);
        assert!(map.get(SlideRole::Blank).is_none());
    }
}
