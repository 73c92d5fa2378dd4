// src/pool/substitute.rs

//! Index-template substitution for per-job arguments.

/// Replace every occurrence of `token` in every argument with `index`.
///
/// An empty token disables substitution; the arguments come back as a fresh
/// copy.
pub fn substitute(args: &[String], token: &str, index: u64) -> Vec<String> {
    if token.is_empty() {
        return args.to_vec();
    }
    let replacement = index.to_string();
    args.iter()
        .map(|arg| arg.replace(token, &replacement))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_token_is_identity() {
        let args = strings(&["{}", "a{}b", ""]);
        assert_eq!(substitute(&args, "", 9), args);
    }

    #[test]
    fn replaces_every_occurrence_in_every_argument() {
        let args = strings(&["{}", "file-{}.{}", "plain"]);
        assert_eq!(
            substitute(&args, "{}", 12),
            strings(&["12", "file-12.12", "plain"])
        );
    }

    #[test]
    fn adjacent_occurrences_are_all_replaced() {
        let args = strings(&["%%%%"]);
        assert_eq!(substitute(&args, "%%", 3), strings(&["33"]));
        assert_eq!(substitute(&strings(&["XXX"]), "X", 0), strings(&["000"]));
    }

    #[test]
    fn overlapping_matches_replace_left_to_right() {
        // "aaa" with token "aa": the leftmost match wins, the trailing "a"
        // stays.
        assert_eq!(substitute(&strings(&["aaa"]), "aa", 7), strings(&["7a"]));
    }
}
