//! Shared, immutable engine state.

use std::fmt;
use std::sync::Arc;

use minijinja::{AutoEscape, Environment};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::filters::{register_filters, FilterContext};
use crate::morph::{MorphAnalyzer, NullAnalyzer};
use crate::renderer::DocxRender;

/// Configuration plus morphological analyzer.
///
/// An `Engine` is cheap to clone and can be shared between threads; every
/// render builds its own template environment and [`FilterContext`] from it.
///
/// ```rust
/// use doctpl_render::{Engine, EngineConfig, LexiconAnalyzer};
///
/// let lexicon = LexiconAnalyzer::from_yaml_str("[]").unwrap();
/// let engine = Engine::new(EngineConfig::default()).with_analyzer(lexicon);
/// assert_eq!(engine.config().tag_style, "TemplateTag");
/// ```
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    analyzer: Arc<dyn MorphAnalyzer>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// An engine whose analyzer knows no words.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            analyzer: Arc::new(NullAnalyzer),
        }
    }

    pub fn with_analyzer(self, analyzer: impl MorphAnalyzer + 'static) -> Self {
        self.with_shared_analyzer(Arc::new(analyzer))
    }

    pub fn with_shared_analyzer(mut self, analyzer: Arc<dyn MorphAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyzer(&self) -> Arc<dyn MorphAnalyzer> {
        Arc::clone(&self.analyzer)
    }

    /// Filters enabled, nothing skipped, labels from the configuration.
    pub fn filter_context(&self) -> FilterContext {
        FilterContext::new().with_spelled_label(self.config.spelled_label.clone())
    }

    /// A template environment with every filter bound to `filters`.
    ///
    /// Output is never escaped: values land in document text, not markup.
    pub fn environment(&self, filters: FilterContext) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        register_filters(&mut env, Arc::new(filters), self.analyzer());
        env
    }

    /// Opens a template for one render.
    pub fn open(&self, bytes: &[u8]) -> Result<DocxRender<'_>> {
        DocxRender::open(bytes, self)
    }
}
