//! Morphological analysis for case and number agreement.
//!
//! Filters that inflect words go through the [`MorphAnalyzer`] trait. The
//! engine carries no inflection tables itself: [`LexiconAnalyzer`] reads them
//! from a YAML lexicon supplied by the deployment, and any other analyzer
//! (a dictionary service, a binding to a native library) can be plugged in
//! through [`Engine::with_analyzer`](crate::Engine::with_analyzer).
//!
//! ## Lexicon Format
//!
//! ```yaml
//! - lemma: день
//!   tags: masc
//!   forms:
//!     "sing,nomn": день
//!     "sing,gent": дня
//!     "plur,gent": дней
//! ```
//!
//! `tags` lists grammemes shared by every form and may be omitted. Form keys
//! are comma separated grammeme codes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{RenderError, Result};

/// Grammatical category a [`Grammeme`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Case,
    Number,
    Gender,
}

/// Grammeme codes, following OpenCorpora naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grammeme {
    /// Nominative.
    Nomn,
    /// Genitive.
    Gent,
    /// Dative.
    Datv,
    /// Accusative.
    Accs,
    /// Instrumental.
    Ablt,
    /// Prepositional.
    Loct,
    /// Vocative.
    Voct,
    Sing,
    Plur,
    Masc,
    Femn,
    Neut,
}

impl Grammeme {
    pub const CASES: [Grammeme; 7] = [
        Grammeme::Nomn,
        Grammeme::Gent,
        Grammeme::Datv,
        Grammeme::Accs,
        Grammeme::Ablt,
        Grammeme::Loct,
        Grammeme::Voct,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Grammeme::Nomn => "nomn",
            Grammeme::Gent => "gent",
            Grammeme::Datv => "datv",
            Grammeme::Accs => "accs",
            Grammeme::Ablt => "ablt",
            Grammeme::Loct => "loct",
            Grammeme::Voct => "voct",
            Grammeme::Sing => "sing",
            Grammeme::Plur => "plur",
            Grammeme::Masc => "masc",
            Grammeme::Femn => "femn",
            Grammeme::Neut => "neut",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Grammeme::Sing | Grammeme::Plur => Category::Number,
            Grammeme::Masc | Grammeme::Femn | Grammeme::Neut => Category::Gender,
            _ => Category::Case,
        }
    }

    /// Parses a comma separated grammeme list such as `"sing,gent"`.
    pub fn parse_set(list: &str) -> std::result::Result<GrammemeSet, UnknownGrammeme> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Grammeme::from_str)
            .collect()
    }
}

impl fmt::Display for Grammeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for an unrecognized grammeme code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGrammeme(pub String);

impl fmt::Display for UnknownGrammeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown grammeme '{}'", self.0)
    }
}

impl std::error::Error for UnknownGrammeme {}

impl FromStr for Grammeme {
    type Err = UnknownGrammeme;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let g = match s {
            "nomn" => Grammeme::Nomn,
            "gent" => Grammeme::Gent,
            "datv" => Grammeme::Datv,
            "accs" => Grammeme::Accs,
            "ablt" => Grammeme::Ablt,
            "loct" => Grammeme::Loct,
            "voct" => Grammeme::Voct,
            "sing" => Grammeme::Sing,
            "plur" => Grammeme::Plur,
            "masc" => Grammeme::Masc,
            "femn" => Grammeme::Femn,
            "neut" => Grammeme::Neut,
            other => return Err(UnknownGrammeme(other.to_string())),
        };
        Ok(g)
    }
}

pub type GrammemeSet = BTreeSet<Grammeme>;

/// One reading of a word form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    /// The form as found in the lexicon.
    pub word: String,
    /// Dictionary form identifying the lexeme.
    pub lemma: String,
    pub tag: GrammemeSet,
}

impl Parse {
    pub fn has(&self, grammeme: Grammeme) -> bool {
        self.tag.contains(&grammeme)
    }
}

/// Word analysis and inflection.
pub trait MorphAnalyzer: Send + Sync {
    /// All readings of `word`, most likely first.
    fn parse(&self, word: &str) -> Vec<Parse>;

    /// The form of `parse`'s lexeme carrying `target`.
    ///
    /// Grammemes in `target` replace those of the same category in the
    /// parse's tag. Returns `None` when the lexeme has no such form.
    fn inflect(&self, parse: &Parse, target: &GrammemeSet) -> Option<String>;
}

/// Analyzer that knows no words. Every inflection falls back to the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnalyzer;

impl MorphAnalyzer for NullAnalyzer {
    fn parse(&self, _word: &str) -> Vec<Parse> {
        Vec::new()
    }

    fn inflect(&self, _parse: &Parse, _target: &GrammemeSet) -> Option<String> {
        None
    }
}

/// The tag a form must carry to satisfy `target` when inflecting from `base`.
///
/// Plural forms carry no gender, so requesting `plur` drops it.
pub fn target_tag(base: &GrammemeSet, target: &GrammemeSet) -> GrammemeSet {
    let mut tag: GrammemeSet = base
        .iter()
        .copied()
        .filter(|g| !target.iter().any(|t| t.category() == g.category()))
        .collect();
    tag.extend(target.iter().copied());
    if tag.contains(&Grammeme::Plur) {
        tag.retain(|g| g.category() != Category::Gender);
    }
    tag
}

#[derive(Debug, Deserialize)]
struct LexemeEntry {
    lemma: String,
    #[serde(default)]
    tags: Option<String>,
    forms: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Lexeme {
    lemma: String,
    forms: Vec<(GrammemeSet, String)>,
}

/// Analyzer backed by a YAML lexicon.
///
/// Lookups are case-insensitive; returned forms are spelled as in the
/// lexicon. Lexemes are consulted in file order, so list the preferred
/// reading of an ambiguous form first.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    lexemes: Vec<Lexeme>,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let entries: Vec<LexemeEntry> = serde_yaml::from_str(source)?;
        let mut lexemes = Vec::with_capacity(entries.len());
        for entry in entries {
            let shared = match &entry.tags {
                Some(tags) => parse_grammemes(&entry.lemma, tags)?,
                None => GrammemeSet::new(),
            };
            let mut forms = Vec::with_capacity(entry.forms.len());
            for (key, form) in entry.forms {
                let mut tag = parse_grammemes(&entry.lemma, &key)?;
                tag.extend(shared.iter().copied());
                forms.push((tag, form));
            }
            lexemes.push(Lexeme {
                lemma: entry.lemma,
                forms,
            });
        }
        Ok(Self { lexemes })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| RenderError::Lexicon(format!("{}: {e}", path.display())))?;
        let analyzer = Self::from_yaml_str(&source)?;
        log::debug!(
            "loaded lexicon {} ({} lexemes)",
            path.display(),
            analyzer.len()
        );
        Ok(analyzer)
    }

    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }
}

fn parse_grammemes(lemma: &str, list: &str) -> Result<GrammemeSet> {
    Grammeme::parse_set(list).map_err(|e| RenderError::Lexicon(format!("lexeme '{lemma}': {e}")))
}

impl MorphAnalyzer for LexiconAnalyzer {
    fn parse(&self, word: &str) -> Vec<Parse> {
        let needle = word.to_lowercase();
        let mut out = Vec::new();
        for lexeme in &self.lexemes {
            for (tag, form) in &lexeme.forms {
                if form.to_lowercase() == needle {
                    out.push(Parse {
                        word: form.clone(),
                        lemma: lexeme.lemma.clone(),
                        tag: tag.clone(),
                    });
                }
            }
        }
        out
    }

    fn inflect(&self, parse: &Parse, target: &GrammemeSet) -> Option<String> {
        let wanted = target_tag(&parse.tag, target);
        let lexeme = self.lexemes.iter().find(|l| {
            l.lemma == parse.lemma && l.forms.iter().any(|(tag, form)| *tag == parse.tag && *form == parse.word)
        })?;

        if let Some((_, form)) = lexeme.forms.iter().find(|(tag, _)| *tag == wanted) {
            return Some(form.clone());
        }
        lexeme
            .forms
            .iter()
            .filter(|(tag, _)| tag.is_superset(&wanted))
            .min_by_key(|(tag, _)| tag.len())
            .map(|(_, form)| form.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXICON: &str = r#"
- lemma: день
  tags: masc
  forms:
    "sing,nomn": день
    "sing,gent": дня
    "plur,nomn": дни
    "plur,gent": дней
- lemma: новый
  forms:
    "masc,sing,nomn": новый
    "femn,sing,nomn": новая
    "masc,sing,gent": нового
    "plur,nomn": новые
    "plur,gent": новых
"#;

    fn analyzer() -> LexiconAnalyzer {
        LexiconAnalyzer::from_yaml_str(LEXICON).unwrap()
    }

    fn set(list: &str) -> GrammemeSet {
        Grammeme::parse_set(list).unwrap()
    }

    #[test]
    fn test_grammeme_codes_round_trip() {
        for g in Grammeme::CASES {
            assert_eq!(g.code().parse::<Grammeme>().unwrap(), g);
        }
        assert!("instr".parse::<Grammeme>().is_err());
    }

    #[test]
    fn test_target_tag_replaces_category() {
        let tag = target_tag(&set("masc,sing,nomn"), &set("gent"));
        assert_eq!(tag, set("masc,sing,gent"));
        let plural = target_tag(&set("masc,sing,nomn"), &set("plur,gent"));
        assert_eq!(plural, set("plur,gent"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let parses = analyzer().parse("День");
        assert_eq!(parses.len(), 1);
        assert_eq!(parses[0].lemma, "день");
        assert!(parses[0].has(Grammeme::Nomn));
        assert!(parses[0].has(Grammeme::Masc));
    }

    #[test]
    fn test_inflect_noun() {
        let a = analyzer();
        let parse = &a.parse("день")[0];
        assert_eq!(a.inflect(parse, &set("gent")).as_deref(), Some("дня"));
        assert_eq!(a.inflect(parse, &set("plur,gent")).as_deref(), Some("дней"));
        assert_eq!(a.inflect(parse, &set("datv")), None);
    }

    #[test]
    fn test_inflect_adjective_to_plural_drops_gender() {
        let a = analyzer();
        let parse = &a.parse("новый")[0];
        assert_eq!(a.inflect(parse, &set("plur,gent")).as_deref(), Some("новых"));
        assert_eq!(a.inflect(parse, &set("sing,nomn")).as_deref(), Some("новый"));
    }

    #[test]
    fn test_unknown_grammeme_in_lexicon_is_error() {
        let err = LexiconAnalyzer::from_yaml_str("- lemma: x\n  forms:\n    \"sing,xxx\": x\n")
            .unwrap_err();
        assert!(matches!(err, RenderError::Lexicon(msg) if msg.contains("xxx")));
    }

    #[test]
    fn test_null_analyzer_knows_nothing() {
        assert!(NullAnalyzer.parse("день").is_empty());
    }
}
