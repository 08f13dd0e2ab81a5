//! Document model abstraction.
//!
//! The engine never walks a concrete document format directly. It talks to a
//! [`DocumentModel`], which exposes the paragraph/run tree, style lookup by
//! name, text mutation and serialization. [`DocxDocument`] is the adapter for
//! WordprocessingML packages.
//!
//! ## Traversal Order
//!
//! [`DocumentModel::all_paragraphs`] yields top-level paragraphs first, then
//! every table's rows, cells and cell paragraphs (nested tables follow their
//! cell's own paragraphs). Consolidation, highlighting and substitution all
//! use this order.
//!
//! ## Handles
//!
//! [`ParagraphRef`], [`TableRef`] and [`RunRef`] are positions inside the
//! document tree. Mutations performed through the model only rewrite the
//! content of a run, so handles obtained before a mutation stay valid.

mod docx;
pub mod xml;

pub use docx::DocxDocument;

use crate::error::DocumentError;

/// Position of a paragraph in a document part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParagraphRef {
    pub(crate) part: usize,
    pub(crate) path: Vec<usize>,
}

/// Position of a table in a document part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub(crate) part: usize,
    pub(crate) path: Vec<usize>,
}

/// Position of a run in a document part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunRef {
    pub(crate) part: usize,
    pub(crate) path: Vec<usize>,
}

/// A mutable paragraph/run tree with style lookup and serialization.
pub trait DocumentModel {
    /// Top-level paragraphs in document order.
    fn paragraphs(&self) -> Vec<ParagraphRef>;

    /// Top-level tables in document order.
    fn tables(&self) -> Vec<TableRef>;

    /// Paragraphs of a table, row by row and cell by cell.
    fn table_paragraphs(&self, table: &TableRef) -> Vec<ParagraphRef>;

    /// Runs of a paragraph in order.
    fn runs_of(&self, paragraph: &ParagraphRef) -> Vec<RunRef>;

    /// Looks up a style by its display name and returns its style id.
    fn style_named(&self, name: &str) -> Option<String>;

    /// Text of a run, with tabs and line breaks rendered as `\t` and `\n`.
    fn run_text(&self, run: &RunRef) -> String;

    /// Replaces the text of a run, keeping its formatting.
    fn set_run_text(&mut self, run: &RunRef, text: &str);

    /// Style id referenced by a run, if any.
    fn run_style(&self, run: &RunRef) -> Option<String>;

    /// Highlight color of a run, if any.
    fn run_highlight(&self, run: &RunRef) -> Option<String>;

    /// Marks a run with a highlight color.
    fn highlight_run(&mut self, run: &RunRef, color: &str);

    /// Serializes the document back to its binary format.
    fn to_bytes(&self) -> Result<Vec<u8>, DocumentError>;

    /// Every paragraph: top-level paragraphs, then table paragraphs.
    fn all_paragraphs(&self) -> Vec<ParagraphRef> {
        let mut out = self.paragraphs();
        for table in self.tables() {
            out.extend(self.table_paragraphs(&table));
        }
        out
    }

    /// Every run, in [`all_paragraphs`](Self::all_paragraphs) order.
    fn all_runs(&self) -> Vec<RunRef> {
        self.all_paragraphs()
            .iter()
            .flat_map(|p| self.runs_of(p))
            .collect()
    }

    /// Text of a paragraph as the concatenation of its runs.
    fn paragraph_text(&self, paragraph: &ParagraphRef) -> String {
        self.runs_of(paragraph)
            .iter()
            .map(|r| self.run_text(r))
            .collect()
    }
}
