use super::FilterContext;

/// Splits `line` into parts.
///
/// Without a separator (or with an empty one) the line is split on runs of
/// whitespace and empty parts are dropped. An explicit separator splits
/// exactly, keeping empty parts. Skipped input yields a single part holding
/// the input.
pub fn split_text(ctx: &FilterContext, line: &str, separator: Option<&str>) -> Vec<String> {
    if ctx.should_skip(line) {
        return vec![line.to_string()];
    }
    match separator {
        Some(sep) if !sep.is_empty() => line.split(sep).map(str::to_string).collect(),
        _ => line.split_whitespace().map(str::to_string).collect(),
    }
}
