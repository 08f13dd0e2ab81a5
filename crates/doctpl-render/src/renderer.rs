//! Render modes.
//!
//! A [`DocxRender`] wraps one freshly opened template and is consumed by the
//! render it performs:
//!
//! | Mode | Filters | Consolidation | Highlighting |
//! |------|---------|---------------|--------------|
//! | [`render`](DocxRender::render) | on | no | none |
//! | [`draft`](DocxRender::draft) | off | yes | every run holding `{{` or `}}` |
//! | [`partial`](DocxRender::partial) | on, defaults skipped | yes | opening run of each defaulted tag |
//!
//! Draft renders are usually given `tag -> field name` so that the output
//! shows where each field goes. Partial renders fill what the user has
//! entered and show defaults, marked, for the rest.
//!
//! ```rust
//! use doctpl_render::{Context, Engine};
//! use doctpl_test::{DocxBuilder, DocxInspector, Paragraph};
//!
//! let template = DocxBuilder::new()
//!     .paragraph(Paragraph::new().text("Hello, ").tag("{{ name }}"))
//!     .build();
//! let engine = Engine::default();
//! let ctx: Context = [("name", "Ann")].into_iter().collect();
//! let out = engine.open(&template).unwrap().render(&ctx).unwrap();
//! assert_eq!(DocxInspector::open(out.get_ref()).text(), "Hello, Ann");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Cursor;

use crate::consolidate::consolidate_runs;
use crate::context::Context;
use crate::document::{DocumentModel, DocxDocument, RunRef};
use crate::engine::Engine;
use crate::error::{RenderError, Result};
use crate::tags::{extract_tags, text_tags, CLOSE, OPEN};
use crate::template::{substitute, Evaluator};

/// Fallback display text per tag, used by partial renders.
pub type Defaults = BTreeMap<String, String>;

/// Operation being performed, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Full,
    Draft,
    Partial,
    Prepare,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderMode::Full => "full",
            RenderMode::Draft => "draft",
            RenderMode::Partial => "partial",
            RenderMode::Prepare => "prepare",
        })
    }
}

fn logged<T>(mode: RenderMode, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        log::error!("{mode} render failed: {err}");
    }
    result
}

/// One template opened for one render.
pub struct DocxRender<'e> {
    doc: DocxDocument,
    engine: &'e Engine,
}

impl<'e> DocxRender<'e> {
    pub fn open(bytes: &[u8], engine: &'e Engine) -> Result<Self> {
        let doc = DocxDocument::open(bytes).map_err(RenderError::from);
        let doc = match doc {
            Ok(doc) => doc,
            Err(err) => {
                log::error!("cannot open template: {err}");
                return Err(err);
            }
        };
        Ok(Self { doc, engine })
    }

    pub fn document(&self) -> &DocxDocument {
        &self.doc
    }

    /// Tags used by the template.
    pub fn tags(&self) -> Result<BTreeSet<String>> {
        extract_tags(&self.doc)
    }

    /// Substitutes every expression whose tags are all in `context`.
    pub fn render(self, context: &Context) -> Result<Cursor<Vec<u8>>> {
        logged(RenderMode::Full, self.render_full(context))
    }

    /// Highlights every tag and substitutes with filters disabled.
    pub fn draft(self, context: &Context) -> Result<Cursor<Vec<u8>>> {
        logged(RenderMode::Draft, self.render_draft(context))
    }

    /// Substitutes `context`, filling and marking the remaining tags from
    /// `defaults`.
    pub fn partial(self, context: &Context, defaults: &Defaults) -> Result<Cursor<Vec<u8>>> {
        logged(RenderMode::Partial, self.render_partial(context, defaults))
    }

    /// Consolidates tag runs and returns the normalized template.
    pub fn prepare(mut self) -> Result<Cursor<Vec<u8>>> {
        let result = consolidate_runs(&mut self.doc, &self.engine.config().tag_style)
            .and_then(|_| self.finish());
        logged(RenderMode::Prepare, result)
    }

    fn render_full(mut self, context: &Context) -> Result<Cursor<Vec<u8>>> {
        let env = self.engine.environment(self.engine.filter_context());
        substitute(&mut self.doc, &Evaluator::new(&env, context))?;
        self.finish()
    }

    fn render_draft(mut self, context: &Context) -> Result<Cursor<Vec<u8>>> {
        let config = self.engine.config();
        consolidate_runs(&mut self.doc, &config.tag_style)?;
        for run in self.doc.all_runs() {
            let text = self.doc.run_text(&run);
            if text.contains(OPEN) || text.contains(CLOSE) {
                self.doc.highlight_run(&run, &config.highlight);
            }
        }
        let env = self
            .engine
            .environment(self.engine.filter_context().with_enabled(false));
        substitute(&mut self.doc, &Evaluator::new(&env, context))?;
        self.finish()
    }

    fn render_partial(mut self, context: &Context, defaults: &Defaults) -> Result<Cursor<Vec<u8>>> {
        let config = self.engine.config();
        consolidate_runs(&mut self.doc, &config.tag_style)?;

        let using_defaults: BTreeSet<String> = extract_tags(&self.doc)?
            .into_iter()
            .filter(|tag| !context.contains(tag) && defaults.contains_key(tag))
            .collect();
        log::debug!("partial render: {} tags use defaults", using_defaults.len());
        self.highlight_defaulted(&using_defaults)?;

        let mut filters = self.engine.filter_context();
        let mut context = context.clone();
        for tag in &using_defaults {
            if let Some(text) = defaults.get(tag) {
                filters.skip_value(text.clone());
                context.insert(tag.clone(), text.clone());
            }
        }
        let env = self.engine.environment(filters);
        substitute(&mut self.doc, &Evaluator::new(&env, &context))?;
        self.finish()
    }

    /// Highlights, for each tag-styled run naming a tag in `tags`, the
    /// nearest run at or before it that holds an opening delimiter.
    fn highlight_defaulted(&mut self, tags: &BTreeSet<String>) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let config = self.engine.config();
        let style_id = self
            .doc
            .style_named(&config.tag_style)
            .ok_or_else(|| RenderError::StyleNotFound(config.tag_style.clone()))?;

        let runs: Vec<RunRef> = self.doc.all_runs();
        let texts: Vec<String> = runs.iter().map(|r| self.doc.run_text(r)).collect();
        let mut marked = BTreeSet::new();
        for (i, run) in runs.iter().enumerate() {
            if self.doc.run_style(run).as_deref() != Some(style_id.as_str())
                || !names_tag(&texts[i], tags)
            {
                continue;
            }
            if let Some(j) = (0..=i).rev().find(|&j| texts[j].contains(OPEN)) {
                marked.insert(j);
            }
        }
        for j in marked {
            self.doc.highlight_run(&runs[j], &config.highlight);
        }
        Ok(())
    }

    fn finish(self) -> Result<Cursor<Vec<u8>>> {
        Ok(Cursor::new(self.doc.to_bytes()?))
    }
}

/// Whether a tag run names one of `tags`, either as bare text or through an
/// expression it contains.
fn names_tag(text: &str, tags: &BTreeSet<String>) -> bool {
    if tags.contains(text.trim()) {
        return true;
    }
    text_tags(text)
        .map(|found| found.iter().any(|t| tags.contains(t)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_tag() {
        let tags: BTreeSet<String> = ["fio".to_string()].into();
        assert!(names_tag(" fio ", &tags));
        assert!(names_tag("{{ fio | genitive }}", &tags));
        assert!(!names_tag("{{ other }}", &tags));
        assert!(!names_tag("{{ broken | }}", &tags));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(RenderMode::Partial.to_string(), "partial");
    }
}
