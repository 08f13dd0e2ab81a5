//! Linguistic filters for template expressions.
//!
//! Filters are registered by name on the minijinja environment built for
//! each render:
//!
//! | Filter | Effect |
//! |--------|--------|
//! | `fio_short` | `иванов иван петрович` → `Иванов И.П.` |
//! | `fio_title` | `иванов иван петрович` → `Иванов Иван Петрович` |
//! | `genitive`, `dative`, `ablt`, `loct` | inflect every word into that case |
//! | `inflect(case)` | inflect every word into a case given by code |
//! | `noun_plural(n)` | noun form agreeing with the numeral `n` |
//! | `adj_plural(n)` | adjective form agreeing with the numeral `n` |
//! | `currency_to_words` | `3.24` → `три рубля, 24 копейки` |
//! | `split(sep=none)` | split a string into a list |
//!
//! ## Skipping
//!
//! Every filter consults its [`FilterContext`] first and returns its input
//! unchanged when filters are disabled, the input is empty, or the input is
//! one of the context's skip values. Draft renders disable filters so that
//! field labels are shown verbatim; partial renders register default texts as
//! skip values so that placeholders are not inflected.

mod currency;
mod grammar;
mod names;
mod split;

pub use currency::currency_to_words;
pub use grammar::{inflect, inflect_all, pluralize_adjective, pluralize_noun};
pub use names::{short_name, title_case};
pub use split::split_text;

use std::collections::HashSet;
use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind, Value};

use crate::config::DEFAULT_SPELLED_LABEL;
use crate::morph::{Grammeme, MorphAnalyzer};

/// Per-render filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterContext {
    enabled: bool,
    skip: HashSet<String>,
    spelled_label: String,
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterContext {
    /// Filters enabled, nothing skipped.
    pub fn new() -> Self {
        Self {
            enabled: true,
            skip: HashSet::new(),
            spelled_label: DEFAULT_SPELLED_LABEL.to_string(),
        }
    }

    /// Every filter passes its input through.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_spelled_label(mut self, label: impl Into<String>) -> Self {
        self.spelled_label = label.into();
        self
    }

    /// Exempts a literal value from filtering.
    pub fn skip_value(&mut self, value: impl Into<String>) {
        self.skip.insert(value.into());
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_skip_value(&self, value: &str) -> bool {
        self.skip.contains(value)
    }

    pub fn spelled_label(&self) -> &str {
        &self.spelled_label
    }

    /// The shared skip predicate.
    pub fn should_skip(&self, input: &str) -> bool {
        !self.enabled || input.is_empty() || self.skip.contains(input)
    }
}

/// Template-facing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    FioShort,
    FioTitle,
    Genitive,
    Dative,
    Ablt,
    Loct,
    Inflect,
    NounPlural,
    AdjPlural,
    CurrencyToWords,
    Split,
}

impl FilterKind {
    pub const ALL: [FilterKind; 11] = [
        FilterKind::FioShort,
        FilterKind::FioTitle,
        FilterKind::Genitive,
        FilterKind::Dative,
        FilterKind::Ablt,
        FilterKind::Loct,
        FilterKind::Inflect,
        FilterKind::NounPlural,
        FilterKind::AdjPlural,
        FilterKind::CurrencyToWords,
        FilterKind::Split,
    ];

    /// Name under which the filter is registered.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::FioShort => "fio_short",
            FilterKind::FioTitle => "fio_title",
            FilterKind::Genitive => "genitive",
            FilterKind::Dative => "dative",
            FilterKind::Ablt => "ablt",
            FilterKind::Loct => "loct",
            FilterKind::Inflect => "inflect",
            FilterKind::NounPlural => "noun_plural",
            FilterKind::AdjPlural => "adj_plural",
            FilterKind::CurrencyToWords => "currency_to_words",
            FilterKind::Split => "split",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Target case of the fixed-case wrappers.
    pub fn case(self) -> Option<Grammeme> {
        match self {
            FilterKind::Genitive => Some(Grammeme::Gent),
            FilterKind::Dative => Some(Grammeme::Datv),
            FilterKind::Ablt => Some(Grammeme::Ablt),
            FilterKind::Loct => Some(Grammeme::Loct),
            _ => None,
        }
    }
}

/// Integer value of a numeral argument.
///
/// Accepts integers, floats (truncated) and numeric strings.
pub fn count_of(value: &Value) -> Option<i64> {
    if let Some(s) = value.as_str() {
        let s = s.trim();
        return s
            .parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64));
    }
    if let Ok(n) = i64::try_from(value.clone()) {
        return Some(n);
    }
    f64::try_from(value.clone())
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
}

/// Applies a string filter to a value; non-string values pass through.
fn map_str(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value.as_str() {
        Some(s) => Value::from(f(s)),
        None => value,
    }
}

/// Registers every [`FilterKind`] on `env`.
///
/// The closures share `ctx` and `analyzer`; build a fresh environment per
/// render so that each render sees its own context.
pub fn register_filters(
    env: &mut Environment<'static>,
    ctx: Arc<FilterContext>,
    analyzer: Arc<dyn MorphAnalyzer>,
) {
    for kind in FilterKind::ALL {
        let ctx = Arc::clone(&ctx);
        let analyzer = Arc::clone(&analyzer);
        match kind {
            FilterKind::FioShort => env.add_filter(kind.name(), move |value: Value| {
                map_str(value, |s| short_name(&ctx, s))
            }),
            FilterKind::FioTitle => env.add_filter(kind.name(), move |value: Value| {
                map_str(value, |s| title_case(&ctx, s))
            }),
            FilterKind::Genitive | FilterKind::Dative | FilterKind::Ablt | FilterKind::Loct => {
                let Some(case) = kind.case() else {
                    continue;
                };
                env.add_filter(kind.name(), move |value: Value| {
                    map_str(value, |s| inflect_all(&ctx, analyzer.as_ref(), s, case))
                })
            }
            FilterKind::Inflect => env.add_filter(
                kind.name(),
                move |value: Value, case: String| -> Result<Value, Error> {
                    let case: Grammeme = case.parse().map_err(|e| {
                        Error::new(ErrorKind::InvalidOperation, format!("inflect: {e}"))
                    })?;
                    Ok(map_str(value, |s| {
                        inflect_all(&ctx, analyzer.as_ref(), s, case)
                    }))
                },
            ),
            FilterKind::NounPlural => {
                env.add_filter(kind.name(), move |value: Value, n: Value| {
                    map_str(value, |s| match count_of(&n) {
                        Some(n) => pluralize_noun(&ctx, analyzer.as_ref(), s, n),
                        None => s.to_string(),
                    })
                })
            }
            FilterKind::AdjPlural => {
                env.add_filter(kind.name(), move |value: Value, n: Value| {
                    map_str(value, |s| match count_of(&n) {
                        Some(n) => pluralize_adjective(&ctx, analyzer.as_ref(), s, n),
                        None => s.to_string(),
                    })
                })
            }
            FilterKind::CurrencyToWords => env.add_filter(kind.name(), move |value: Value| {
                currency_to_words(&ctx, &value)
            }),
            FilterKind::Split => {
                env.add_filter(kind.name(), move |value: Value, sep: Option<String>| {
                    match value.as_str() {
                        Some(s) => Value::from(split_text(&ctx, s, sep.as_deref())),
                        None => Value::from(vec![value]),
                    }
                })
            }
        }
    }
}
