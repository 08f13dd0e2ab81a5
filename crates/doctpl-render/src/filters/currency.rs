//! Amounts in words.

use minijinja::Value;

use super::FilterContext;
use crate::spellout::{rubles_in_words, SPELLOUT_LIMIT};

fn amount_of(value: &Value) -> Option<f64> {
    match value.as_str() {
        Some(s) => s.trim().parse::<f64>().ok(),
        None => f64::try_from(value.clone()).ok(),
    }
}

/// Spells a ruble amount, e.g. `3.24` → `"три рубля, 24 копейки"`.
///
/// - Filters disabled, absent input or a skip value: `"<label>(<input>)"`,
///   where the label defaults to `Spelled`.
/// - Input that is not a number: `""`.
/// - Amounts of magnitude 10^14 and above: the input, unmodified.
pub fn currency_to_words(ctx: &FilterContext, amount: &Value) -> Value {
    let absent = amount.is_undefined() || amount.is_none();
    let text = if absent {
        String::new()
    } else {
        amount.to_string()
    };
    if !ctx.is_enabled() || absent || ctx.is_skip_value(&text) {
        return Value::from(format!("{}({text})", ctx.spelled_label()));
    }
    let Some(number) = amount_of(amount) else {
        return Value::from("");
    };
    let rounded = (number * 100.0).round() / 100.0;
    if rounded.abs() >= SPELLOUT_LIMIT {
        return amount.clone();
    }
    match rubles_in_words(rounded) {
        Some(words) => Value::from(words),
        None => Value::from(""),
    }
}
