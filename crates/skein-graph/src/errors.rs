//! Deterministic error-collection capping.

/// Cap an error collection at `max` entries with a truncation sentinel.
///
/// - `max == usize::MAX` (or any cap at or above the length) returns the
///   collection unchanged.
/// - `max == 0` returns an empty collection.
/// - `max == 1` replaces everything with `"errors truncated: N total"`.
/// - Otherwise the first `max - 1` entries are kept and
///   `"errors truncated: showing <shown> of <total>"` is appended.
pub fn cap_errors(errors: Vec<String>, max: usize) -> Vec<String> {
    if max == 0 {
        return Vec::new();
    }
    let total = errors.len();
    if total <= max {
        return errors;
    }
    if max == 1 {
        return vec![format!("errors truncated: {total} total")];
    }
    let shown = max - 1;
    let mut capped: Vec<String> = errors.into_iter().take(shown).collect();
    capped.push(format!("errors truncated: showing {shown} of {total}"));
    capped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("e{i}")).collect()
    }

    #[test]
    fn unbounded_cap_returns_as_is() {
        assert_eq!(cap_errors(errs(3), usize::MAX), errs(3));
    }

    #[test]
    fn zero_cap_returns_empty() {
        assert!(cap_errors(errs(3), 0).is_empty());
    }

    #[test]
    fn under_cap_returns_as_is() {
        assert_eq!(cap_errors(errs(3), 3), errs(3));
        assert_eq!(cap_errors(errs(2), 3), errs(2));
    }

    #[test]
    fn cap_of_one_replaces_with_total() {
        assert_eq!(cap_errors(errs(5), 1), vec!["errors truncated: 5 total"]);
    }

    #[test]
    fn cap_keeps_prefix_and_appends_sentinel() {
        let capped = cap_errors(errs(5), 3);
        assert_eq!(
            capped,
            vec![
                "e0".to_string(),
                "e1".to_string(),
                "errors truncated: showing 2 of 5".to_string(),
            ]
        );
    }
}
