//! Writing expression results back into runs.

/// A byte range of a paragraph's text and the text that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Replacement {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Applies `replacements` to a paragraph split into `runs`.
///
/// Offsets refer to the concatenation of `runs`. Each replacement text lands
/// in the run where its range starts; the rest of the range is removed from
/// that run and the runs after it. Replacements must be sorted and must not
/// overlap.
pub(crate) fn splice(runs: &[String], replacements: &[Replacement]) -> Vec<String> {
    let mut out = Vec::with_capacity(runs.len());
    let mut run_start = 0;
    for run in runs {
        let run_end = run_start + run.len();
        let mut text = String::with_capacity(run.len());
        let mut cursor = run_start;
        for rep in replacements {
            if rep.end <= run_start || rep.start >= run_end {
                continue;
            }
            if rep.start >= run_start {
                text.push_str(&run[cursor - run_start..rep.start - run_start]);
                text.push_str(&rep.text);
            }
            cursor = cursor.max(rep.end.min(run_end));
        }
        text.push_str(&run[cursor - run_start..]);
        out.push(text);
        run_start = run_end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rep(start: usize, end: usize, text: &str) -> Replacement {
        Replacement {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_replacement_within_one_run() {
        let out = splice(&runs(&["Dear {{ x }}!"]), &[rep(5, 12, "Bob")]);
        assert_eq!(out, vec!["Dear Bob!"]);
    }

    #[test]
    fn test_replacement_spanning_runs_lands_in_first() {
        // "a {{" | " x " | "}} b"
        let out = splice(&runs(&["a {{", " x ", "}} b"]), &[rep(2, 9, "V")]);
        assert_eq!(out, vec!["a V", "", " b"]);
    }

    #[test]
    fn test_several_replacements() {
        // "{{a}}-{{b}}"
        let out = splice(&runs(&["{{a}}-{{", "b}}"]), &[rep(0, 5, "1"), rep(6, 11, "2")]);
        assert_eq!(out, vec!["1-2", ""]);
    }

    #[test]
    fn test_empty_runs_are_kept() {
        let out = splice(&runs(&["{{a}}", "", "tail"]), &[rep(0, 5, "x")]);
        assert_eq!(out, vec!["x", "", "tail"]);
    }

    #[test]
    fn test_no_replacements_is_identity() {
        let input = runs(&["a", "b"]);
        assert_eq!(splice(&input, &[]), input);
    }
}
