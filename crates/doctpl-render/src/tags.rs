//! Tag discovery.
//!
//! A tag is a free variable of a `{{ ... }}` expression found in paragraph
//! text. `{{ fio | genitive }}` uses the tag `fio`; `{{ "день" | noun_plural(days) }}`
//! uses `days`. Expressions are located by scanning for delimiter pairs and
//! then compiled with minijinja to ask for their undeclared variables.

use std::collections::BTreeSet;

use minijinja::Environment;

use crate::document::DocumentModel;
use crate::error::Result;

/// Opening expression delimiter.
pub const OPEN: &str = "{{";
/// Closing expression delimiter.
pub const CLOSE: &str = "}}";

/// A `{{ ... }}` expression located in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// Text between the delimiters, untrimmed.
    pub expr: String,
}

impl TagSpan {
    /// The expression as a standalone template source.
    pub fn source(&self) -> String {
        format!("{OPEN}{}{CLOSE}", self.expr)
    }
}

/// Finds every delimited expression in `text`, left to right.
///
/// An opening delimiter without a matching closing one is ordinary text.
pub fn find_spans(text: &str) -> Vec<TagSpan> {
    let mut spans = Vec::new();
    let mut offset = 0;
    while let Some(open) = text[offset..].find(OPEN) {
        let start = offset + open;
        let inner = start + OPEN.len();
        let Some(close) = text[inner..].find(CLOSE) else {
            break;
        };
        let end = inner + close + CLOSE.len();
        spans.push(TagSpan {
            start,
            end,
            expr: text[inner..inner + close].to_string(),
        });
        offset = end;
    }
    spans
}

/// Free top-level variables of one expression.
///
/// # Errors
///
/// [`RenderError::Template`](crate::RenderError::Template) when the
/// expression does not parse.
pub fn expression_tags(span: &TagSpan) -> Result<BTreeSet<String>> {
    let source = span.source();
    // Parsing does not resolve filter names, so an empty environment will do.
    let env = Environment::empty();
    let template = env.template_from_str(&source)?;
    Ok(template.undeclared_variables(false).into_iter().collect())
}

/// Tags used anywhere in `text`.
pub fn text_tags(text: &str) -> Result<BTreeSet<String>> {
    let mut tags = BTreeSet::new();
    for span in find_spans(text) {
        tags.extend(expression_tags(&span)?);
    }
    Ok(tags)
}

/// Collects the tags of every paragraph, table paragraphs included.
///
/// Paragraph text is the concatenation of its runs, so a tag split across
/// runs is found whether or not the document was consolidated.
pub fn extract_tags(doc: &dyn DocumentModel) -> Result<BTreeSet<String>> {
    let mut tags = BTreeSet::new();
    for paragraph in doc.all_paragraphs() {
        tags.extend(text_tags(&doc.paragraph_text(&paragraph))?);
    }
    Ok(tags)
}
