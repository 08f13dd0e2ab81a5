//! Expression evaluation and substitution into the document.
//!
//! Each `{{ ... }}` expression of a paragraph is compiled and rendered on its
//! own with minijinja, using an environment that carries the linguistic
//! filters. An expression is only rendered when every variable it uses is
//! bound in the context; otherwise it stays in the document verbatim, so a
//! partially known context never blanks out placeholders.
//!
//! ## Placement
//!
//! An expression may be spread over several runs. Its result is written into
//! the run holding the opening `{{`, inheriting that run's formatting and
//! highlight, and the remainder of the expression is removed from the runs
//! that follow. Runs are never added or deleted.
//!
//! All results of a document are computed before the first run is modified,
//! so an evaluation error leaves the document untouched.

mod splice;

use std::collections::BTreeSet;

use minijinja::{Environment, Value};

use crate::context::Context;
use crate::document::{DocumentModel, RunRef};
use crate::error::Result;
use crate::tags::{expression_tags, find_spans, TagSpan};

use splice::{splice, Replacement};

/// Renders single expressions against one context.
pub struct Evaluator<'env> {
    env: &'env Environment<'static>,
    bound: BTreeSet<String>,
    context: Value,
}

impl<'env> Evaluator<'env> {
    pub fn new(env: &'env Environment<'static>, context: &Context) -> Self {
        Self {
            env,
            bound: context.tags().map(str::to_string).collect(),
            context: context.to_value(),
        }
    }

    /// Renders `span`, or returns `None` when it uses an unbound variable.
    pub fn evaluate(&self, span: &TagSpan) -> Result<Option<String>> {
        let unbound = expression_tags(span)?
            .iter()
            .any(|tag| !self.bound.contains(tag));
        if unbound {
            return Ok(None);
        }
        Ok(Some(self.env.render_str(&span.source(), &self.context)?))
    }
}

/// Outcome of a substitution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Substitution {
    /// Expressions replaced by their value.
    pub rendered: usize,
    /// Expressions left in place for lack of a value.
    pub unresolved: usize,
}

struct ParagraphEdit {
    runs: Vec<RunRef>,
    texts: Vec<String>,
}

/// Evaluates every expression of the document and writes the results back.
pub fn substitute(doc: &mut dyn DocumentModel, evaluator: &Evaluator<'_>) -> Result<Substitution> {
    let mut stats = Substitution::default();
    let mut edits = Vec::new();

    for paragraph in doc.all_paragraphs() {
        let runs = doc.runs_of(&paragraph);
        let texts: Vec<String> = runs.iter().map(|r| doc.run_text(r)).collect();
        let joined: String = texts.concat();

        let mut replacements = Vec::new();
        for span in find_spans(&joined) {
            match evaluator.evaluate(&span)? {
                Some(text) => {
                    stats.rendered += 1;
                    replacements.push(Replacement {
                        start: span.start,
                        end: span.end,
                        text,
                    });
                }
                None => stats.unresolved += 1,
            }
        }
        if replacements.is_empty() {
            continue;
        }
        let spliced = splice(&texts, &replacements);
        let changed: Vec<(RunRef, String)> = runs
            .into_iter()
            .zip(spliced)
            .zip(&texts)
            .filter(|((_, new), old)| new != *old)
            .map(|((run, new), _)| (run, new))
            .collect();
        let (runs, texts) = changed.into_iter().unzip();
        edits.push(ParagraphEdit { runs, texts });
    }

    for edit in edits {
        for (run, text) in edit.runs.iter().zip(&edit.texts) {
            doc.set_run_text(run, text);
        }
    }

    log::debug!(
        "substituted {} expressions, {} left unresolved",
        stats.rendered,
        stats.unresolved
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocxDocument;
    use crate::error::RenderError;
    use doctpl_test::{DocxBuilder, DocxInspector, Paragraph};

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        env.add_filter("shout", |s: String| s.to_uppercase());
        env
    }

    fn context(pairs: &[(&str, &str)]) -> Context {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_evaluate_bound_and_unbound() {
        let env = env();
        let ctx = context(&[("a", "x")]);
        let evaluator = Evaluator::new(&env, &ctx);
        let span = &find_spans("{{ a | shout }}")[0];
        assert_eq!(evaluator.evaluate(span).unwrap().as_deref(), Some("X"));
        let span = &find_spans("{{ a ~ b }}")[0];
        assert_eq!(evaluator.evaluate(span).unwrap(), None);
    }

    #[test]
    fn test_substitute_split_expression() {
        let bytes = DocxBuilder::new()
            .paragraph(Paragraph::new().text("Hello {{").text(" name ").text("}}!"))
            .build();
        let mut doc = DocxDocument::open(&bytes).unwrap();
        let env = env();
        let ctx = context(&[("name", "Ann")]);
        let stats = substitute(&mut doc, &Evaluator::new(&env, &ctx)).unwrap();
        assert_eq!(stats, Substitution { rendered: 1, unresolved: 0 });

        let out = DocxInspector::open(&doc.to_bytes().unwrap());
        assert_eq!(out.paragraphs(), vec!["Hello Ann!"]);
        let runs: Vec<String> = out.runs().into_iter().map(|r| r.text).collect();
        assert_eq!(runs, vec!["Hello Ann", "", "!"]);
    }

    #[test]
    fn test_unbound_expressions_stay_literal() {
        let bytes = DocxBuilder::new()
            .paragraph(Paragraph::new().text("{{ a }} and {{ b }}"))
            .build();
        let mut doc = DocxDocument::open(&bytes).unwrap();
        let env = env();
        let ctx = context(&[("a", "1")]);
        let stats = substitute(&mut doc, &Evaluator::new(&env, &ctx)).unwrap();
        assert_eq!(stats.unresolved, 1);
        let out = DocxInspector::open(&doc.to_bytes().unwrap());
        assert_eq!(out.paragraphs(), vec!["1 and {{ b }}"]);
    }

    #[test]
    fn test_error_leaves_document_untouched() {
        let bytes = DocxBuilder::new()
            .paragraph(Paragraph::new().text("{{ a }}"))
            .paragraph(Paragraph::new().text("{{ a | missing_filter }}"))
            .build();
        let mut doc = DocxDocument::open(&bytes).unwrap();
        let env = env();
        let ctx = context(&[("a", "1")]);
        let err = substitute(&mut doc, &Evaluator::new(&env, &ctx)).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
        let first = doc.all_paragraphs().remove(0);
        assert_eq!(doc.paragraph_text(&first), "{{ a }}");
    }
}
