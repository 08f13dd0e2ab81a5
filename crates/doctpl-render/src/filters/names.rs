//! Personal name formatting.

use super::FilterContext;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `"иванов иван петрович"` → `"Иванов И.П."`.
///
/// The first token is the surname; every further token contributes its
/// capitalized initial followed by a dot.
pub fn short_name(ctx: &FilterContext, full: &str) -> String {
    if ctx.should_skip(full) {
        return full.to_string();
    }
    let mut tokens = full.split_whitespace();
    let Some(surname) = tokens.next() else {
        return full.to_string();
    };
    let initials: String = tokens
        .filter_map(|t| t.chars().next())
        .flat_map(|c| c.to_uppercase().chain(std::iter::once('.')))
        .collect();
    if initials.is_empty() {
        capitalize(surname)
    } else {
        format!("{} {initials}", capitalize(surname))
    }
}

/// Capitalizes every word and lowercases the rest.
///
/// A word starts at any letter following a non-letter, so hyphenated parts
/// are capitalized too: `"салтыков-щедрин"` → `"Салтыков-Щедрин"`.
pub fn title_case(ctx: &FilterContext, full: &str) -> String {
    if ctx.should_skip(full) {
        return full.to_string();
    }
    let mut out = String::with_capacity(full.len());
    let mut in_word = false;
    for c in full.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        let ctx = FilterContext::new();
        assert_eq!(short_name(&ctx, "иванов иван петрович"), "Иванов И.П.");
        assert_eq!(short_name(&ctx, "ИВАНОВА  ирина"), "Иванова И.");
        assert_eq!(short_name(&ctx, "петров"), "Петров");
        assert_eq!(short_name(&ctx, ""), "");
        assert_eq!(short_name(&ctx, "   "), "   ");
    }

    #[test]
    fn test_title_case() {
        let ctx = FilterContext::new();
        assert_eq!(title_case(&ctx, "иванов иван петрович"), "Иванов Иван Петрович");
        assert_eq!(title_case(&ctx, "салтыков-щедрин"), "Салтыков-Щедрин");
        assert_eq!(title_case(&ctx, "O'NEIL"), "O'Neil");
    }

    #[test]
    fn test_skip_values_are_untouched() {
        let mut ctx = FilterContext::new();
        ctx.skip_value("ФИО сотрудника");
        assert_eq!(short_name(&ctx, "ФИО сотрудника"), "ФИО сотрудника");
        assert_eq!(title_case(&ctx, "ФИО сотрудника"), "ФИО сотрудника");
    }
}
