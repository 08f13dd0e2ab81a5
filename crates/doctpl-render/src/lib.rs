//! # doctpl-render - DOCX Template Rendering
//!
//! `doctpl-render` fills word-processor templates. A template is an ordinary
//! DOCX file whose placeholders are written as `{{ expressions }}` in a
//! dedicated character style (`TemplateTag` by default). The crate finds those
//! placeholders, substitutes values through a small set of linguistic filters,
//! and checks that a template's tags match the field schema maintained next
//! to it.
//!
//! ## Core Concepts
//!
//! - [`Engine`]: configuration plus morphological analyzer, shared by renders
//! - [`DocxRender`]: one opened template, consumed by a full, draft or partial render
//! - [`Context`]: tag to value mapping for one render
//! - [`FilterContext`]: per-render filter switches and skip values
//! - [`check`]: tag/field consistency check
//!
//! ## Quick Start
//!
//! ```rust
//! use doctpl_render::{Context, Engine, LexiconAnalyzer};
//! use doctpl_test::{DocxBuilder, DocxInspector, Paragraph};
//!
//! let lexicon = LexiconAnalyzer::from_yaml_str(r#"
//! - lemma: день
//!   forms:
//!     "sing,nomn": день
//!     "sing,gent": дня
//!     "plur,gent": дней
//! "#).unwrap();
//! let engine = Engine::default().with_analyzer(lexicon);
//!
//! let template = DocxBuilder::new()
//!     .paragraph(Paragraph::new().text("Срок: ").tag(r#"{{ n }} {{ "день" | noun_plural(n) }}"#))
//!     .build();
//!
//! let ctx: Context = [("n", 5)].into_iter().collect();
//! let out = engine.open(&template).unwrap().render(&ctx).unwrap();
//! assert_eq!(DocxInspector::open(out.get_ref()).text(), "Срок: 5 дней");
//! ```
//!
//! ## Filters
//!
//! | Filter | Example |
//! |--------|---------|
//! | `fio_short` | `иванов иван петрович` → `Иванов И.П.` |
//! | `fio_title` | `иванов иван петрович` → `Иванов Иван Петрович` |
//! | `genitive`, `dative`, `ablt`, `loct`, `inflect(case)` | case inflection |
//! | `noun_plural(n)`, `adj_plural(n)` | numeral agreement |
//! | `currency_to_words` | `3.24` → `три рубля, 24 копейки` |
//! | `split(sep)` | `a b` → `["a", "b"]` |
//!
//! Inflection needs a [`MorphAnalyzer`]. The engine ships no dictionary:
//! [`LexiconAnalyzer`] loads one from YAML, and without one every word is
//! left in the form it was typed.

pub mod config;
pub mod consistency;
pub mod consolidate;
pub mod context;
pub mod document;
mod engine;
mod error;
pub mod filters;
pub mod morph;
pub mod renderer;
pub mod spellout;
pub mod tags;
pub mod template;

pub use config::EngineConfig;
pub use consistency::{check, ConsistencyError, ConsistencyReport, TagDiff};
pub use consolidate::consolidate_runs;
pub use context::Context;
pub use document::{DocumentModel, DocxDocument};
pub use engine::Engine;
pub use error::{DocumentError, RenderError, Result};
pub use filters::{FilterContext, FilterKind};
pub use morph::{Grammeme, LexiconAnalyzer, MorphAnalyzer, NullAnalyzer, Parse};
pub use renderer::{Defaults, DocxRender, RenderMode};
pub use tags::extract_tags;
