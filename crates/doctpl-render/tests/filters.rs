//! Linguistic filters against a small lexicon.

use doctpl_render::filters::{
    currency_to_words, inflect_all, pluralize_adjective, pluralize_noun, short_name, split_text,
    title_case,
};
use doctpl_render::{Engine, FilterContext, Grammeme, LexiconAnalyzer};
use minijinja::{context, Value};
use proptest::prelude::*;

const LEXICON: &str = include_str!("fixtures/lexicon.yaml");

fn lexicon() -> LexiconAnalyzer {
    LexiconAnalyzer::from_yaml_str(LEXICON).unwrap()
}

// ============================================================================
// Case inflection
// ============================================================================

#[test]
fn test_masculine_full_name_in_every_case() {
    let a = lexicon();
    let ctx = FilterContext::new();
    let name = "иванов иван петрович";
    let cases = [
        (Grammeme::Gent, "иванова ивана петровича"),
        (Grammeme::Datv, "иванову ивану петровичу"),
        (Grammeme::Ablt, "ивановым иваном петровичем"),
        (Grammeme::Loct, "иванове иване петровиче"),
    ];
    for (case, expected) in cases {
        assert_eq!(inflect_all(&ctx, &a, name, case), expected, "case {case}");
    }
}

#[test]
fn test_feminine_full_name_in_every_case() {
    let a = lexicon();
    let ctx = FilterContext::new();
    let name = "иванова ирина петровна";
    let cases = [
        (Grammeme::Gent, "ивановой ирины петровны"),
        (Grammeme::Datv, "ивановой ирине петровне"),
        (Grammeme::Ablt, "ивановой ириной петровной"),
        (Grammeme::Loct, "ивановой ирине петровне"),
    ];
    for (case, expected) in cases {
        assert_eq!(inflect_all(&ctx, &a, name, case), expected, "case {case}");
    }
}

#[test]
fn test_case_filters_through_the_engine() {
    let engine = Engine::default().with_analyzer(lexicon());
    let env = engine.environment(engine.filter_context());
    let render = |src: &str| {
        env.render_str(src, context! { fio => "Иванов Иван Петрович" })
            .unwrap()
    };
    assert_eq!(render("{{ fio | genitive }}"), "Иванова Ивана Петровича");
    assert_eq!(render("{{ fio | dative }}"), "Иванову Ивану Петровичу");
    assert_eq!(render("{{ fio | ablt }}"), "Ивановым Иваном Петровичем");
    assert_eq!(render("{{ fio | loct }}"), "Иванове Иване Петровиче");
    assert_eq!(render("{{ fio | inflect('accs') }}"), "Иванова Ивана Петровича");
    assert_eq!(render("{{ fio | genitive | fio_short }}"), "Иванова И.П.");
}

// ============================================================================
// Numeral agreement
// ============================================================================

#[test]
fn test_noun_agrees_with_numeral() {
    let a = lexicon();
    let ctx = FilterContext::new();
    for n in [1, 21, 31, 41, 51, 61, 71, 81, 101] {
        assert_eq!(pluralize_noun(&ctx, &a, "день", n), "день", "n = {n}");
    }
    for n in [2, 3, 4, 22, 23, 24] {
        assert_eq!(pluralize_noun(&ctx, &a, "день", n), "дня", "n = {n}");
    }
    for n in (5..=20).chain(25..=30).chain([100]) {
        assert_eq!(pluralize_noun(&ctx, &a, "день", n), "дней", "n = {n}");
    }
}

#[test]
fn test_adjective_agrees_with_numeral() {
    let a = lexicon();
    let ctx = FilterContext::new();
    for n in [1, 21, 31, 101] {
        assert_eq!(
            pluralize_adjective(&ctx, &a, "календарный", n),
            "календарный",
            "n = {n}"
        );
    }
    for n in (2..=20).chain([100]) {
        assert_eq!(
            pluralize_adjective(&ctx, &a, "календарный", n),
            "календарных",
            "n = {n}"
        );
    }
}

#[test]
fn test_plural_filters_accept_numeric_strings_and_reject_words() {
    let engine = Engine::default().with_analyzer(lexicon());
    let env = engine.environment(engine.filter_context());
    let out = env
        .render_str(
            r#"{{ n }} {{ "календарный" | adj_plural(n) }} {{ "день" | noun_plural(n) }}"#,
            context! { n => "14" },
        )
        .unwrap();
    assert_eq!(out, "14 календарных дней");
    let out = env
        .render_str(r#"{{ "день" | noun_plural(n) }}"#, context! { n => "несколько" })
        .unwrap();
    assert_eq!(out, "день");
}

// ============================================================================
// Names, currency, split
// ============================================================================

#[test]
fn test_name_formatting() {
    let ctx = FilterContext::new();
    assert_eq!(short_name(&ctx, "иванов иван петрович"), "Иванов И.П.");
    assert_eq!(title_case(&ctx, "иванов иван петрович"), "Иванов Иван Петрович");
}

#[test]
fn test_currency_in_words() {
    let ctx = FilterContext::new();
    let spell = |v: Value| currency_to_words(&ctx, &v).to_string();
    assert_eq!(spell(Value::from(1.00)), "один рубль, 00 копеек");
    assert_eq!(
        spell(Value::from(1_001_000)),
        "один миллион одна тысяча рублей, 00 копеек"
    );
    assert_eq!(spell(Value::from(3.24)), "три рубля, 24 копейки");
    assert_eq!(
        spell(Value::from(1021)),
        "одна тысяча двадцать один рубль, 00 копеек"
    );
    assert_eq!(
        spell(Value::from(2135)),
        "две тысячи сто тридцать пять рублей, 00 копеек"
    );
    assert_eq!(
        spell(Value::from(1_000_000_001_i64)),
        "один миллиард один рубль, 00 копеек"
    );
}

#[test]
fn test_split_default_and_explicit() {
    let ctx = FilterContext::new();
    let line = "Иванов Иван, Сидоров Петр";
    assert_eq!(
        split_text(&ctx, line, None),
        vec!["Иванов", "Иван,", "Сидоров", "Петр"]
    );
    assert_eq!(
        split_text(&ctx, line, Some(",")),
        vec!["Иванов Иван", " Сидоров Петр"]
    );
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Values in the skip-set pass unchanged through every string filter.
    #[test]
    fn test_skip_values_pass_through_every_filter(value in "[А-Яа-я ]{1,30}", n in 0i64..1000) {
        let a = lexicon();
        let mut ctx = FilterContext::new();
        ctx.skip_value(value.clone());

        prop_assert_eq!(short_name(&ctx, &value), value.clone());
        prop_assert_eq!(title_case(&ctx, &value), value.clone());
        for case in Grammeme::CASES {
            prop_assert_eq!(inflect_all(&ctx, &a, &value, case), value.clone());
        }
        prop_assert_eq!(pluralize_noun(&ctx, &a, &value, n), value.clone());
        prop_assert_eq!(pluralize_adjective(&ctx, &a, &value, n), value.clone());
        prop_assert_eq!(split_text(&ctx, &value, None), vec![value.clone()]);
        prop_assert_eq!(
            currency_to_words(&ctx, &Value::from(value.clone())).to_string(),
            format!("Spelled({value})")
        );
    }

    /// Disabled filters are the identity on strings.
    #[test]
    fn test_disabled_filters_are_identity(value in "\\PC{0,40}") {
        let a = lexicon();
        let ctx = FilterContext::disabled();
        prop_assert_eq!(short_name(&ctx, &value), value.clone());
        prop_assert_eq!(inflect_all(&ctx, &a, &value, Grammeme::Gent), value.clone());
    }

    /// Every amount below the limit is spelled with a two-digit kopeck part.
    #[test]
    fn test_spelled_amounts_end_with_kopecks(cents in 0u64..10_000_000_000) {
        let ctx = FilterContext::new();
        let amount = cents as f64 / 100.0;
        let words = currency_to_words(&ctx, &Value::from(amount)).to_string();
        let kopecks = format!(", {:02} ", cents % 100);
        prop_assert!(words.contains(&kopecks), "{} -> {}", amount, words);
    }
}
