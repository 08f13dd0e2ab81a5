//! WordprocessingML (DOCX) adapter.
//!
//! A DOCX file is a zip package. The main document part, headers and footers
//! are parsed into XML trees; every other entry is carried through untouched.
//! Style lookup reads `word/styles.xml`.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::{Element, Node, XmlPart};
use super::{DocumentModel, ParagraphRef, RunRef, TableRef};
use crate::error::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Run property elements that follow `w:highlight` in the schema sequence.
const AFTER_HIGHLIGHT: &[&str] = &[
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
    "w:eastAsianLayout",
    "w:specVanish",
    "w:oMath",
    "w:rPrChange",
];

/// Elements whose children are runs of the enclosing paragraph.
const RUN_CONTAINERS: &[&str] = &[
    "w:hyperlink",
    "w:ins",
    "w:moveTo",
    "w:smartTag",
    "w:fldSimple",
    "w:customXml",
    "w:dir",
    "w:bdo",
];

/// Elements whose children are blocks of the enclosing container.
const BLOCK_CONTAINERS: &[&str] = &["w:customXml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Table,
}

struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    part: Option<usize>,
}

/// A style declared in the style table.
#[derive(Debug, Clone)]
struct StyleDef {
    id: String,
    name: Option<String>,
}

/// An opened DOCX package.
pub struct DocxDocument {
    entries: Vec<Entry>,
    parts: Vec<XmlPart>,
    styles: Vec<StyleDef>,
}

impl DocxDocument {
    /// Opens a package from its bytes.
    ///
    /// Fails when the bytes are not a zip archive, when the main document
    /// part is absent, or when any parsed part is not well-formed.
    pub fn open(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry {
                name,
                data,
                is_dir,
                part: None,
            });
        }

        let body_idx = entries
            .iter()
            .position(|e| e.name == DOCUMENT_PART)
            .ok_or_else(|| DocumentError::MissingPart(DOCUMENT_PART.to_string()))?;

        let mut part_order = vec![body_idx];
        for prefix in ["word/header", "word/footer"] {
            let mut found: Vec<usize> = entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.name.starts_with(prefix) && e.name.ends_with(".xml"))
                .map(|(i, _)| i)
                .collect();
            found.sort_by(|a, b| entries[*a].name.cmp(&entries[*b].name));
            part_order.extend(found);
        }

        let mut parts = Vec::with_capacity(part_order.len());
        for entry_idx in part_order {
            let entry = &mut entries[entry_idx];
            parts.push(XmlPart::parse(&entry.name, &entry.data)?);
            entry.part = Some(parts.len() - 1);
            entry.data = Vec::new();
        }

        let styles = match entries.iter().find(|e| e.name == STYLES_PART) {
            Some(entry) => parse_styles(&XmlPart::parse(STYLES_PART, &entry.data)?),
            None => Vec::new(),
        };

        log::debug!(
            "opened docx package: {} entries, {} text parts, {} styles",
            entries.len(),
            parts.len(),
            styles.len()
        );

        Ok(Self {
            entries,
            parts,
            styles,
        })
    }

    /// Path to the element holding block content (paragraphs and tables).
    fn container_path(&self, part: usize) -> Option<Vec<usize>> {
        let root = &self.parts[part].root;
        if part == 0 {
            root.elements()
                .find(|(_, el)| el.name == "w:body")
                .map(|(i, _)| vec![i])
        } else {
            Some(Vec::new())
        }
    }

    fn blocks(&self, kind: BlockKind) -> Vec<(usize, Vec<usize>)> {
        let mut out = Vec::new();
        for part in 0..self.parts.len() {
            let Some(base) = self.container_path(part) else {
                continue;
            };
            let Some(container) = self.parts[part].root.at(&base) else {
                continue;
            };
            let mut found = Vec::new();
            collect_blocks(container, &base, &mut found);
            out.extend(
                found
                    .into_iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, path)| (part, path)),
            );
        }
        out
    }

    fn element(&self, part: usize, path: &[usize]) -> Option<&Element> {
        self.parts.get(part)?.root.at(path)
    }

    fn element_mut(&mut self, part: usize, path: &[usize]) -> Option<&mut Element> {
        self.parts.get_mut(part)?.root.at_mut(path)
    }

    fn collect_table_paragraphs(&self, part: usize, path: &[usize], out: &mut Vec<ParagraphRef>) {
        let Some(table) = self.element(part, path) else {
            return;
        };
        for (ri, row) in table.elements().filter(|(_, el)| el.name == "w:tr") {
            for (ci, cell) in row.elements().filter(|(_, el)| el.name == "w:tc") {
                let cell_path: Vec<usize> = path.iter().copied().chain([ri, ci]).collect();
                let mut blocks = Vec::new();
                collect_blocks(cell, &cell_path, &mut blocks);
                let mut nested = Vec::new();
                for (kind, block_path) in blocks {
                    match kind {
                        BlockKind::Paragraph => out.push(ParagraphRef {
                            part,
                            path: block_path,
                        }),
                        BlockKind::Table => nested.push(block_path),
                    }
                }
                for nested_path in nested {
                    self.collect_table_paragraphs(part, &nested_path, out);
                }
            }
        }
    }
}

impl DocumentModel for DocxDocument {
    fn paragraphs(&self) -> Vec<ParagraphRef> {
        self.blocks(BlockKind::Paragraph)
            .into_iter()
            .map(|(part, path)| ParagraphRef { part, path })
            .collect()
    }

    fn tables(&self) -> Vec<TableRef> {
        self.blocks(BlockKind::Table)
            .into_iter()
            .map(|(part, path)| TableRef { part, path })
            .collect()
    }

    fn table_paragraphs(&self, table: &TableRef) -> Vec<ParagraphRef> {
        let mut out = Vec::new();
        self.collect_table_paragraphs(table.part, &table.path, &mut out);
        out
    }

    fn runs_of(&self, paragraph: &ParagraphRef) -> Vec<RunRef> {
        let Some(p) = self.element(paragraph.part, &paragraph.path) else {
            return Vec::new();
        };
        let mut runs = Vec::new();
        collect_runs(p, &paragraph.path, &mut runs);
        runs.into_iter()
            .map(|path| RunRef {
                part: paragraph.part,
                path,
            })
            .collect()
    }

    fn style_named(&self, name: &str) -> Option<String> {
        self.styles
            .iter()
            .find(|s| s.name.as_deref() == Some(name))
            .or_else(|| self.styles.iter().find(|s| s.id == name))
            .map(|s| s.id.clone())
    }

    fn run_text(&self, run: &RunRef) -> String {
        let Some(r) = self.element(run.part, &run.path) else {
            return String::new();
        };
        r.elements()
            .map(|(_, child)| child)
            .filter(|child| is_text_element(child))
            .map(|child| match child.name.as_str() {
                "w:t" => child.text_content(),
                "w:tab" => "\t".to_string(),
                _ => "\n".to_string(),
            })
            .collect()
    }

    fn set_run_text(&mut self, run: &RunRef, text: &str) {
        let Some(r) = self.element_mut(run.part, &run.path) else {
            return;
        };
        let first = r
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(el) if is_text_element(el)));
        let mut kept = Vec::with_capacity(r.children.len());
        let mut insert_at = None;
        for (i, node) in std::mem::take(&mut r.children).into_iter().enumerate() {
            if Some(i) == first {
                insert_at = Some(kept.len());
            }
            if !matches!(&node, Node::Element(el) if is_text_element(el)) {
                kept.push(node);
            }
        }
        let tail = kept.split_off(insert_at.unwrap_or(kept.len()));
        kept.extend(text_nodes(text));
        kept.extend(tail);
        r.children = kept;
    }

    fn run_style(&self, run: &RunRef) -> Option<String> {
        self.element(run.part, &run.path)?
            .child("w:rPr")?
            .child("w:rStyle")?
            .attr("w:val")
            .map(str::to_string)
    }

    fn run_highlight(&self, run: &RunRef) -> Option<String> {
        self.element(run.part, &run.path)?
            .child("w:rPr")?
            .child("w:highlight")?
            .attr("w:val")
            .map(str::to_string)
    }

    fn highlight_run(&mut self, run: &RunRef, color: &str) {
        let Some(r) = self.element_mut(run.part, &run.path) else {
            return;
        };
        if r.child("w:rPr").is_none() {
            r.children.insert(0, Node::Element(Element::new("w:rPr")));
        }
        let Some(props) = r.child_mut("w:rPr") else {
            return;
        };
        if let Some(existing) = props.child_mut("w:highlight") {
            existing.set_attr("w:val", color);
            return;
        }
        let highlight = Node::Element(Element::new("w:highlight").with_attr("w:val", color));
        let position = props.children.iter().position(|node| {
            matches!(node, Node::Element(el) if AFTER_HIGHLIGHT.contains(&el.name.as_str()))
        });
        match position {
            Some(idx) => props.children.insert(idx, highlight),
            None => props.children.push(highlight),
        }
    }

    fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in &self.entries {
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            match entry.part {
                Some(idx) => writer.write_all(&self.parts[idx].to_bytes()?)?,
                None => writer.write_all(&entry.data)?,
            }
        }
        Ok(writer.finish()?.into_inner())
    }
}

/// Run children that make up the run's text. A `w:br` with a page or
/// column type is layout, not text.
fn is_text_element(el: &Element) -> bool {
    match el.name.as_str() {
        "w:t" | "w:tab" | "w:cr" => true,
        "w:br" => matches!(el.attr("w:type"), None | Some("textWrapping")),
        _ => false,
    }
}

/// Run children spelling `text`, with tabs and newlines as elements.
fn text_nodes(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                flush_text(&mut nodes, &mut pending);
                let name = if ch == '\t' { "w:tab" } else { "w:br" };
                nodes.push(Node::Element(Element::new(name)));
            }
            _ => pending.push(ch),
        }
    }
    flush_text(&mut nodes, &mut pending);
    nodes
}

fn flush_text(nodes: &mut Vec<Node>, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let mut t = Element::new("w:t");
    if pending.starts_with(char::is_whitespace) || pending.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    t.children.push(Node::Text(std::mem::take(pending)));
    nodes.push(Node::Element(t));
}

/// Paragraphs and tables under `container`, looking through content
/// controls and custom XML wrappers.
fn collect_blocks(container: &Element, base: &[usize], out: &mut Vec<(BlockKind, Vec<usize>)>) {
    for (i, el) in container.elements() {
        let mut path = base.to_vec();
        path.push(i);
        match el.name.as_str() {
            "w:p" => out.push((BlockKind::Paragraph, path)),
            "w:tbl" => out.push((BlockKind::Table, path)),
            "w:sdt" => {
                if let Some((ci, content)) = sdt_content(el) {
                    path.push(ci);
                    collect_blocks(content, &path, out);
                }
            }
            name if BLOCK_CONTAINERS.contains(&name) => collect_blocks(el, &path, out),
            _ => {}
        }
    }
}

/// Runs under `container` in document order, descending into hyperlinks,
/// tracked insertions, content controls and similar wrappers. Deleted text
/// (`w:del`) is not part of the document and is skipped.
fn collect_runs(container: &Element, base: &[usize], out: &mut Vec<Vec<usize>>) {
    for (i, el) in container.elements() {
        let mut path = base.to_vec();
        path.push(i);
        match el.name.as_str() {
            "w:r" => out.push(path),
            "w:sdt" => {
                if let Some((ci, content)) = sdt_content(el) {
                    path.push(ci);
                    collect_runs(content, &path, out);
                }
            }
            name if RUN_CONTAINERS.contains(&name) => collect_runs(el, &path, out),
            _ => {}
        }
    }
}

fn sdt_content(sdt: &Element) -> Option<(usize, &Element)> {
    sdt.elements().find(|(_, el)| el.name == "w:sdtContent")
}

fn parse_styles(part: &XmlPart) -> Vec<StyleDef> {
    part.root
        .elements()
        .filter(|(_, el)| el.name == "w:style")
        .filter_map(|(_, el)| {
            let id = el.attr("w:styleId")?.to_string();
            let name = el
                .child("w:name")
                .and_then(|n| n.attr("w:val"))
                .map(str::to_string);
            Some(StyleDef { id, name })
        })
        .collect()
}
