//! Test harness for doctpl.
//!
//! Builds small but valid DOCX packages in memory and reads rendered output
//! back, so engine tests can describe documents run by run instead of
//! shipping binary fixtures.
//!
//! ```rust
//! use doctpl_test::{DocxBuilder, DocxInspector, Paragraph};
//!
//! let bytes = DocxBuilder::new()
//!     .paragraph(Paragraph::new().text("Dear ").text("{{").tag("name").text("}}"))
//!     .build();
//!
//! let inspector = DocxInspector::open(&bytes);
//! assert_eq!(inspector.paragraphs(), vec!["Dear {{name}}".to_string()]);
//! ```

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Style id and name of the character style marking template tags.
pub const TAG_STYLE: &str = "TemplateTag";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, Clone)]
struct RunSpec {
    text: String,
    style: Option<String>,
    highlight: Option<String>,
}

#[derive(Debug, Clone)]
enum Inline {
    Run(RunSpec),
    /// Runs wrapped in a run-level container such as `w:hyperlink`.
    Wrapped {
        open: String,
        close: String,
        inner: Vec<Inline>,
    },
    Raw(String),
}

impl Inline {
    fn write_xml(&self, out: &mut String) {
        match self {
            Inline::Run(run) => run.write_xml(out),
            Inline::Wrapped { open, close, inner } => {
                out.push_str(open);
                for inline in inner {
                    inline.write_xml(out);
                }
                out.push_str(close);
            }
            Inline::Raw(xml) => out.push_str(xml),
        }
    }
}

impl RunSpec {
    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:r>");
        if self.style.is_some() || self.highlight.is_some() {
            out.push_str("<w:rPr>");
            if let Some(style) = &self.style {
                out.push_str(&format!(r#"<w:rStyle w:val="{}"/>"#, escape(style)));
            }
            if let Some(color) = &self.highlight {
                out.push_str(&format!(r#"<w:highlight w:val="{}"/>"#, escape(color)));
            }
            out.push_str("</w:rPr>");
        }
        write_run_text(&self.text, out);
        out.push_str("</w:r>");
    }
}

/// A paragraph described as a sequence of runs.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    inlines: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an unstyled run.
    pub fn text(self, text: &str) -> Self {
        self.push(text, None, None)
    }

    /// Appends a run in the [`TAG_STYLE`] character style.
    pub fn tag(self, text: &str) -> Self {
        self.push(text, Some(TAG_STYLE), None)
    }

    /// Appends a run referencing an arbitrary style id.
    pub fn styled(self, style: &str, text: &str) -> Self {
        self.push(text, Some(style), None)
    }

    /// Appends an unstyled run that is already highlighted.
    pub fn highlighted(self, text: &str, color: &str) -> Self {
        self.push(text, None, Some(color))
    }

    /// Appends the runs of `inner` inside an internal `w:hyperlink`.
    pub fn hyperlink(self, inner: Paragraph) -> Self {
        self.wrap(r#"<w:hyperlink w:anchor="top">"#, "</w:hyperlink>", inner)
    }

    /// Appends the runs of `inner` as a tracked insertion (`w:ins`).
    pub fn inserted(self, inner: Paragraph) -> Self {
        self.wrap(
            r#"<w:ins w:id="1" w:author="doctpl" w:date="2024-01-01T00:00:00Z">"#,
            "</w:ins>",
            inner,
        )
    }

    /// Appends the runs of `inner` inside an inline content control.
    pub fn content_control(self, inner: Paragraph) -> Self {
        self.wrap(
            "<w:sdt><w:sdtPr/><w:sdtContent>",
            "</w:sdtContent></w:sdt>",
            inner,
        )
    }

    /// Appends raw paragraph-level XML, e.g. a hand-written `w:r`.
    pub fn raw(mut self, xml: &str) -> Self {
        self.inlines.push(Inline::Raw(xml.to_string()));
        self
    }

    fn wrap(mut self, open: &str, close: &str, inner: Paragraph) -> Self {
        self.inlines.push(Inline::Wrapped {
            open: open.to_string(),
            close: close.to_string(),
            inner: inner.inlines,
        });
        self
    }

    fn push(mut self, text: &str, style: Option<&str>, highlight: Option<&str>) -> Self {
        self.inlines.push(Inline::Run(RunSpec {
            text: text.to_string(),
            style: style.map(str::to_string),
            highlight: highlight.map(str::to_string),
        }));
        self
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:p>");
        for inline in &self.inlines {
            inline.write_xml(out);
        }
        out.push_str("</w:p>");
    }
}

fn write_run_text(text: &str, out: &mut String) {
    let mut pending = String::new();
    let flush = |pending: &mut String, out: &mut String| {
        if !pending.is_empty() {
            out.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape(pending)
            ));
            pending.clear();
        }
    };
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(&mut pending, out);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(&mut pending, out);
                out.push_str("<w:br/>");
            }
            _ => pending.push(ch),
        }
    }
    flush(&mut pending, out);
}

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Paragraph),
    Table(Table),
    ContentControl(Vec<Paragraph>),
}

impl Block {
    fn write_xml(&self, out: &mut String) {
        match self {
            Block::Paragraph(p) => p.write_xml(out),
            Block::Table(t) => t.write_xml(out),
            Block::ContentControl(paragraphs) => {
                out.push_str("<w:sdt><w:sdtPr/><w:sdtContent>");
                for p in paragraphs {
                    p.write_xml(out);
                }
                out.push_str("</w:sdtContent></w:sdt>");
            }
        }
    }
}

/// A table cell holding paragraphs and nested tables.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    blocks: Vec<Block>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, paragraph: Paragraph) -> Self {
        self.blocks.push(Block::Paragraph(paragraph));
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.blocks.push(Block::Table(table));
        self
    }
}

/// A table described row by row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<w:tbl><w:tblPr/>");
        for row in &self.rows {
            out.push_str("<w:tr>");
            for cell in row {
                out.push_str("<w:tc>");
                if cell.blocks.is_empty() {
                    out.push_str("<w:p/>");
                }
                for block in &cell.blocks {
                    block.write_xml(out);
                }
                out.push_str("</w:tc>");
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl>");
    }
}

/// Builds a DOCX package in memory.
///
/// The [`TAG_STYLE`] character style is declared by default; call
/// [`without_tag_style`](Self::without_tag_style) to build a template that
/// lacks it.
#[derive(Debug, Clone)]
pub struct DocxBuilder {
    blocks: Vec<Block>,
    styles: Vec<(String, String)>,
    header: Vec<Paragraph>,
    footer: Vec<Paragraph>,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            styles: vec![(TAG_STYLE.to_string(), TAG_STYLE.to_string())],
            header: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn without_tag_style(mut self) -> Self {
        self.styles.retain(|(id, _)| id != TAG_STYLE);
        self
    }

    /// Declares a character style with the given id and display name.
    pub fn style(mut self, id: &str, name: &str) -> Self {
        self.styles.push((id.to_string(), name.to_string()));
        self
    }

    pub fn paragraph(mut self, paragraph: Paragraph) -> Self {
        self.blocks.push(Block::Paragraph(paragraph));
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.blocks.push(Block::Table(table));
        self
    }

    /// Appends paragraphs wrapped in a block-level content control.
    pub fn content_control(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.blocks.push(Block::ContentControl(paragraphs));
        self
    }

    pub fn header(mut self, paragraph: Paragraph) -> Self {
        self.header.push(paragraph);
        self
    }

    pub fn footer(mut self, paragraph: Paragraph) -> Self {
        self.footer.push(paragraph);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut entries: Vec<(&str, String)> = vec![
            ("[Content_Types].xml", self.content_types()),
            ("_rels/.rels", package_rels()),
            ("word/document.xml", self.document_xml()),
            ("word/styles.xml", self.styles_xml()),
            ("word/_rels/document.xml.rels", self.document_rels()),
        ];
        if !self.header.is_empty() {
            entries.push(("word/header1.xml", part_xml("w:hdr", &self.header)));
        }
        if !self.footer.is_empty() {
            entries.push(("word/footer1.xml", part_xml("w:ftr", &self.footer)));
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(name, options).expect("start zip entry");
            writer
                .write_all(content.as_bytes())
                .expect("write zip entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    fn document_xml(&self) -> String {
        let mut out = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>"#
        );
        for block in &self.blocks {
            block.write_xml(&mut out);
        }
        out.push_str("<w:sectPr>");
        if !self.header.is_empty() {
            out.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader1"/>"#);
        }
        if !self.footer.is_empty() {
            out.push_str(r#"<w:footerReference w:type="default" r:id="rIdFooter1"/>"#);
        }
        out.push_str("</w:sectPr></w:body></w:document>");
        out
    }

    fn styles_xml(&self) -> String {
        let mut out = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="{W_NS}">"#
        );
        out.push_str(
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
        );
        for (id, name) in &self.styles {
            out.push_str(&format!(
                r#"<w:style w:type="character" w:customStyle="1" w:styleId="{}"><w:name w:val="{}"/></w:style>"#,
                escape(id),
                escape(name)
            ));
        }
        out.push_str("</w:styles>");
        out
    }

    fn content_types(&self) -> String {
        let mut out = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        );
        if !self.header.is_empty() {
            out.push_str(r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#);
        }
        if !self.footer.is_empty() {
            out.push_str(r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#);
        }
        out.push_str("</Types>");
        out
    }

    fn document_rels(&self) -> String {
        let mut out = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        if !self.header.is_empty() {
            out.push_str(r#"<Relationship Id="rIdHeader1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#);
        }
        if !self.footer.is_empty() {
            out.push_str(r#"<Relationship Id="rIdFooter1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#);
        }
        out.push_str("</Relationships>");
        out
    }
}

fn package_rels() -> String {
    String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
    )
}

fn part_xml(root: &str, paragraphs: &[Paragraph]) -> String {
    let mut out = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><{root} xmlns:w="{W_NS}" xmlns:r="{R_NS}">"#
    );
    for p in paragraphs {
        p.write_xml(&mut out);
    }
    out.push_str(&format!("</{root}>"));
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A run read back from a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunInfo {
    pub text: String,
    pub style: Option<String>,
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct PartContent {
    paragraphs: Vec<String>,
    runs: Vec<RunInfo>,
}

/// Reads a DOCX package back for assertions.
///
/// Panics on malformed input: it is meant for tests only.
#[derive(Debug, Clone)]
pub struct DocxInspector {
    entries: BTreeMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl DocxInspector {
    pub fn open(bytes: &[u8]) -> Self {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid zip package");
        let mut entries = BTreeMap::new();
        let mut order = Vec::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).expect("readable zip entry");
            let mut data = Vec::new();
            file.read_to_end(&mut data).expect("read zip entry");
            order.push(file.name().to_string());
            entries.insert(file.name().to_string(), data);
        }
        Self { entries, order }
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn document_xml(&self) -> String {
        self.entries
            .get("word/document.xml")
            .map(|d| String::from_utf8_lossy(d).into_owned())
            .expect("package has word/document.xml")
    }

    /// Texts of every paragraph of the main document, tables included, in
    /// XML order.
    pub fn paragraphs(&self) -> Vec<String> {
        self.part("word/document.xml").paragraphs
    }

    /// Texts of every paragraph of another part, e.g. `word/header1.xml`.
    pub fn part_paragraphs(&self, name: &str) -> Vec<String> {
        self.part(name).paragraphs
    }

    /// The main document's paragraphs joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs().join("\n")
    }

    pub fn runs(&self) -> Vec<RunInfo> {
        self.part("word/document.xml").runs
    }

    /// Texts of highlighted runs of the main document.
    pub fn highlighted(&self) -> Vec<String> {
        self.runs()
            .into_iter()
            .filter(|r| r.highlight.is_some())
            .map(|r| r.text)
            .collect()
    }

    fn part(&self, name: &str) -> PartContent {
        let data = self
            .entries
            .get(name)
            .unwrap_or_else(|| panic!("package has no {name}"));
        read_part(data)
    }
}

fn attr_val(start: &BytesStart<'_>) -> Option<String> {
    start
        .attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == b"w:val")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn read_part(data: &[u8]) -> PartContent {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut content = PartContent::default();
    let mut paragraph: Option<String> = None;
    let mut run: Option<RunInfo> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event_into(&mut buf).expect("well-formed XML");
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(String::new()),
                b"w:r" => run = Some(RunInfo::default()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => content.paragraphs.push(String::new()),
                b"w:r" => content.runs.push(RunInfo::default()),
                b"w:rStyle" => {
                    if let Some(r) = run.as_mut() {
                        r.style = attr_val(&e);
                    }
                }
                b"w:highlight" => {
                    if let Some(r) = run.as_mut() {
                        r.highlight = attr_val(&e);
                    }
                }
                name @ (b"w:tab" | b"w:br" | b"w:cr") => {
                    let ch = if name == b"w:tab" { '\t' } else { '\n' };
                    if let Some(r) = run.as_mut() {
                        r.text.push(ch);
                        if let Some(p) = paragraph.as_mut() {
                            p.push(ch);
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    let text = t.unescape().expect("valid text");
                    if let Some(r) = run.as_mut() {
                        r.text.push_str(&text);
                    }
                    if let Some(p) = paragraph.as_mut() {
                        p.push_str(&text);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        content.paragraphs.push(p);
                    }
                }
                b"w:r" => {
                    if let Some(r) = run.take() {
                        content.runs.push(r);
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    content
}
