//! Verdict Extractor: recovers the structured decision from the reasoning
//! engine's free-text answer.
//!
//! Absence of the verdict line is not an error; it means "no
//! determination". The changed flag is opt-in: anything short of an
//! explicit "yes" counts as not changed.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Verdict, VerdictChanged};

static VERDICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)final verdict\s*[:\-]\s*(guilty|not guilty)").unwrap()
});

static CHANGED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)verdict changed\s*[:\-]\s*(yes|no)").unwrap()
});

/// Parses the final verdict and changed flag out of unstructured output.
pub fn extract_final_verdict(output: &str) -> (Option<Verdict>, VerdictChanged) {
    let final_verdict = VERDICT_RE
        .captures(output)
        .and_then(|caps| Verdict::parse(&caps[1]));

    let changed = match CHANGED_RE.captures(output) {
        Some(caps) if caps[1].eq_ignore_ascii_case("yes") => VerdictChanged::Changed,
        _ => VerdictChanged::NotChanged,
    };

    (final_verdict, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_guilty_and_changed() {
        let output = "…after due consideration.\n\nFinal Verdict: Guilty\nVerdict Changed: Yes\n";
        let (verdict, changed) = extract_final_verdict(output);
        assert_eq!(verdict, Some(Verdict::Guilty));
        assert_eq!(changed, VerdictChanged::Changed);
    }

    #[test]
    fn matching_is_case_insensitive_with_either_separator() {
        let (verdict, changed) =
            extract_final_verdict("FINAL VERDICT - not guilty\nverdict changed - NO");
        assert_eq!(verdict, Some(Verdict::NotGuilty));
        assert_eq!(changed, VerdictChanged::NotChanged);
    }

    #[test]
    fn missing_lines_mean_no_determination_and_not_changed() {
        let (verdict, changed) = extract_final_verdict("The court finds the arguments unclear.");
        assert_eq!(verdict, None);
        assert_eq!(changed, VerdictChanged::NotChanged);
    }

    #[test]
    fn changed_requires_an_explicit_yes() {
        let (_, changed) = extract_final_verdict("Final Verdict: Guilty\nVerdict Changed: no");
        assert_eq!(changed, VerdictChanged::NotChanged);

        let (_, changed) = extract_final_verdict("Final Verdict: Guilty\nVerdict Changed: maybe");
        assert_eq!(changed, VerdictChanged::NotChanged);
    }

    #[test]
    fn not_guilty_is_not_mistaken_for_guilty() {
        let (verdict, _) = extract_final_verdict("Final Verdict: Not Guilty");
        assert_eq!(verdict, Some(Verdict::NotGuilty));
    }
}
