//! Case inflection and numeral agreement.
//!
//! Lookups that fail fall back to the input word: a template with an unknown
//! surname still renders, just uninflected.

use super::FilterContext;
use crate::morph::{Grammeme, GrammemeSet, MorphAnalyzer};
use crate::spellout::plural_index;

/// Carries the capitalization of `original` over to `form`.
fn match_case(original: &str, form: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return form.to_uppercase();
    }
    match (original.chars().next(), form.chars().next()) {
        (Some(o), Some(f)) if o.is_uppercase() && !f.is_uppercase() => {
            let mut out: String = f.to_uppercase().collect();
            out.push_str(&form[f.len_utf8()..]);
            out
        }
        _ => form.to_string(),
    }
}

fn inflect_with(
    analyzer: &dyn MorphAnalyzer,
    word: &str,
    target: &[Grammeme],
    require_nominative: bool,
) -> Option<String> {
    let parses = analyzer.parse(word);
    let parse = if require_nominative {
        parses.iter().find(|p| p.has(Grammeme::Nomn))
    } else {
        parses.first()
    }?;
    let target: GrammemeSet = target.iter().copied().collect();
    analyzer
        .inflect(parse, &target)
        .map(|form| match_case(word, &form))
}

/// Puts one word into `case`.
///
/// Uses the first reading of the word in the nominative. A word without such
/// a reading, or whose lexeme lacks the requested form, is returned as is.
pub fn inflect(analyzer: &dyn MorphAnalyzer, word: &str, case: Grammeme) -> String {
    if word.is_empty() {
        return String::new();
    }
    match inflect_with(analyzer, word, &[case], true) {
        Some(form) => form,
        None => {
            log::debug!("no nominative form of '{word}' inflectable to {case}");
            word.to_string()
        }
    }
}

/// Puts every space separated word of `phrase` into `case`.
pub fn inflect_all(
    ctx: &FilterContext,
    analyzer: &dyn MorphAnalyzer,
    phrase: &str,
    case: Grammeme,
) -> String {
    if ctx.should_skip(phrase) {
        return phrase.to_string();
    }
    phrase
        .split(' ')
        .map(|word| inflect(analyzer, word, case))
        .collect::<Vec<_>>()
        .join(" ")
}

fn agreeing_form(analyzer: &dyn MorphAnalyzer, word: &str, target: &[Grammeme]) -> String {
    inflect_with(analyzer, word, target, false).unwrap_or_else(|| word.to_string())
}

/// Noun form agreeing with the numeral `n`: `1 день`, `2 дня`, `5 дней`.
pub fn pluralize_noun(
    ctx: &FilterContext,
    analyzer: &dyn MorphAnalyzer,
    word: &str,
    n: i64,
) -> String {
    if ctx.should_skip(word) {
        return word.to_string();
    }
    let target: &[Grammeme] = match plural_index(n) {
        0 => &[Grammeme::Sing, Grammeme::Nomn],
        1 => &[Grammeme::Gent],
        _ => &[Grammeme::Plur, Grammeme::Gent],
    };
    agreeing_form(analyzer, word, target)
}

/// Adjective form agreeing with the numeral `n`: `1 календарный`, `2 календарных`.
pub fn pluralize_adjective(
    ctx: &FilterContext,
    analyzer: &dyn MorphAnalyzer,
    word: &str,
    n: i64,
) -> String {
    if ctx.should_skip(word) {
        return word.to_string();
    }
    let target: &[Grammeme] = if plural_index(n) == 0 {
        &[Grammeme::Sing, Grammeme::Nomn]
    } else {
        &[Grammeme::Plur, Grammeme::Gent]
    };
    agreeing_form(analyzer, word, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::{LexiconAnalyzer, NullAnalyzer};

    const LEXICON: &str = r#"
- lemma: иванов
  tags: masc
  forms:
    "sing,nomn": иванов
    "sing,gent": иванова
    "sing,datv": иванову
- lemma: иванова
  tags: femn
  forms:
    "sing,nomn": иванова
    "sing,gent": ивановой
- lemma: неделя
  tags: femn
  forms:
    "sing,nomn": неделя
    "sing,gent": недели
    "plur,gent": недель
"#;

    fn analyzer() -> LexiconAnalyzer {
        LexiconAnalyzer::from_yaml_str(LEXICON).unwrap()
    }

    #[test]
    fn test_inflect_prefers_nominative_reading() {
        let a = analyzer();
        assert_eq!(inflect(&a, "иванова", Grammeme::Gent), "ивановой");
        assert_eq!(inflect(&a, "иванов", Grammeme::Datv), "иванову");
    }

    #[test]
    fn test_inflect_keeps_capitalization() {
        let a = analyzer();
        assert_eq!(inflect(&a, "Иванов", Grammeme::Gent), "Иванова");
        assert_eq!(inflect(&a, "ИВАНОВ", Grammeme::Gent), "ИВАНОВА");
    }

    #[test]
    fn test_inflect_falls_back_to_input() {
        let a = analyzer();
        assert_eq!(inflect(&a, "смирнов", Grammeme::Gent), "смирнов");
        assert_eq!(inflect(&a, "иванов", Grammeme::Ablt), "иванов");
        assert_eq!(inflect(&NullAnalyzer, "день", Grammeme::Gent), "день");
    }

    #[test]
    fn test_inflect_all_keeps_spacing() {
        let a = analyzer();
        let ctx = FilterContext::new();
        assert_eq!(
            inflect_all(&ctx, &a, "иванов  смирнов", Grammeme::Gent),
            "иванова  смирнов"
        );
    }

    #[test]
    fn test_pluralize_feminine_noun() {
        let a = analyzer();
        let ctx = FilterContext::new();
        assert_eq!(pluralize_noun(&ctx, &a, "неделя", 1), "неделя");
        assert_eq!(pluralize_noun(&ctx, &a, "неделя", 3), "недели");
        assert_eq!(pluralize_noun(&ctx, &a, "неделя", 12), "недель");
    }

    #[test]
    fn test_pluralize_skips() {
        let a = analyzer();
        let mut ctx = FilterContext::new();
        ctx.skip_value("Срок");
        assert_eq!(pluralize_noun(&ctx, &a, "Срок", 5), "Срок");
        assert_eq!(pluralize_adjective(&ctx, &a, "", 5), "");
    }
}
