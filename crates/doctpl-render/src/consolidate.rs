//! Run consolidation.
//!
//! Word processors split text into runs wherever formatting, spell-check
//! state or edit history changes, so a tag typed as `{{ name }}` may end up
//! spread over several runs. Template authors mark tags with a dedicated
//! character style; consolidation folds every stretch of consecutive
//! tag-styled runs into the first run of the stretch so that each tag is one
//! contiguous token again.

use crate::document::{DocumentModel, RunRef};
use crate::error::{RenderError, Result};

/// Merges consecutive runs styled `tag_style` into one run.
///
/// Runs are visited in [`DocumentModel::all_paragraphs`] order. The first
/// tag-styled run of a stretch becomes the open run; each following
/// tag-styled run has its text appended to the open run and is emptied. Any
/// other run, and every paragraph boundary, closes the open run. Runs without
/// the tag style are never modified.
///
/// Returns the number of runs folded into an earlier one.
///
/// # Errors
///
/// [`RenderError::StyleNotFound`] when the document declares no style named
/// `tag_style`.
pub fn consolidate_runs(doc: &mut dyn DocumentModel, tag_style: &str) -> Result<usize> {
    let style_id = doc
        .style_named(tag_style)
        .ok_or_else(|| RenderError::StyleNotFound(tag_style.to_string()))?;

    let mut merged = 0;
    for paragraph in doc.all_paragraphs() {
        let mut open: Option<(RunRef, String)> = None;
        for run in doc.runs_of(&paragraph) {
            if doc.run_style(&run).as_deref() != Some(style_id.as_str()) {
                flush(doc, open.take());
                continue;
            }
            let text = doc.run_text(&run);
            match open.as_mut() {
                Some((_, buffer)) => {
                    buffer.push_str(&text);
                    doc.set_run_text(&run, "");
                    merged += 1;
                }
                None => open = Some((run, text)),
            }
        }
        flush(doc, open);
    }

    log::debug!("consolidated {merged} tag runs (style '{tag_style}')");
    Ok(merged)
}

fn flush(doc: &mut dyn DocumentModel, open: Option<(RunRef, String)>) {
    if let Some((run, text)) = open {
        if doc.run_text(&run) != text {
            doc.set_run_text(&run, &text);
        }
    }
}
