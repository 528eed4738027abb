//! Match predicates over extracted metadata values.

use derive_more::Display;

/// How an extracted value is compared against the target strings.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum MatchPolicy {
    /// The value contains at least one target as a substring.
    #[default]
    #[display("contains")]
    Contains,
    /// The value equals at least one target exactly.
    #[display("exact")]
    Exact,
}

/// A match predicate: a [`MatchPolicy`] plus the target strings it applies.
///
/// Comparisons are case-sensitive and literal; there is no globbing or
/// regex. An empty value never matches, and empty targets are discarded on
/// construction, since `""` is a substring of everything.
///
/// # Examples
///
/// ```
/// use exifsift_pipeline::{MatchPolicy, Matcher};
///
/// let matcher = Matcher::new(MatchPolicy::Contains, ["beach", "dunes"]);
/// assert!(matcher.is_match("sunset beach"));
/// assert!(!matcher.is_match("Beach"));
/// assert!(!matcher.is_match(""));
///
/// let matcher = Matcher::new(MatchPolicy::Exact, ["beach"]);
/// assert!(matcher.is_match("beach"));
/// assert!(!matcher.is_match("sunset beach"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matcher {
    policy: MatchPolicy,
    targets: Vec<String>,
}
impl Matcher {
    pub fn new(policy: MatchPolicy, targets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let targets = targets.into_iter().map(Into::into).filter(|t: &String| !t.is_empty()).collect();
        Self { policy, targets }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// A matcher without targets can never match anything.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_match(&self, found: &str) -> bool {
        if found.is_empty() {
            return false;
        }
        match self.policy {
            MatchPolicy::Contains => self.targets.iter().any(|target| found.contains(target.as_str())),
            MatchPolicy::Exact => self.targets.iter().any(|target| found == target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MatchPolicy::Contains, &["beach"], "sunset beach", true)]
    #[case(MatchPolicy::Contains, &["beach"], "city", false)]
    #[case(MatchPolicy::Contains, &["city", "beach"], "beach", true)]
    #[case(MatchPolicy::Contains, &["beach"], "BEACH", false)]
    #[case(MatchPolicy::Contains, &["be*ch"], "beach", false)]
    #[case(MatchPolicy::Contains, &["be*ch"], "a be*ch", true)]
    #[case(MatchPolicy::Contains, &["beach"], "", false)]
    #[case(MatchPolicy::Exact, &["beach"], "beach", true)]
    #[case(MatchPolicy::Exact, &["beach"], "sunset beach", false)]
    #[case(MatchPolicy::Exact, &["city", "beach"], "city", true)]
    #[case(MatchPolicy::Exact, &["beach"], "beach ", false)]
    #[case(MatchPolicy::Exact, &["beach"], "", false)]
    fn test_is_match(
        #[case] policy: MatchPolicy,
        #[case] targets: &[&str],
        #[case] found: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(Matcher::new(policy, targets.iter().copied()).is_match(found), expected);
    }

    #[rstest]
    #[case(MatchPolicy::Contains)]
    #[case(MatchPolicy::Exact)]
    fn test_empty_targets_never_match(#[case] policy: MatchPolicy) {
        let matcher = Matcher::new(policy, ["", ""]);
        assert!(matcher.is_empty());
        assert!(!matcher.is_match("anything"));
        assert!(!matcher.is_match(""));
    }

    #[test]
    fn test_empty_targets_are_dropped() {
        let matcher = Matcher::new(MatchPolicy::Contains, ["", "beach"]);
        assert_eq!(matcher.targets(), ["beach".to_string()]);
        assert!(!matcher.is_match("city"));
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(MatchPolicy::Contains.to_string(), "contains");
        assert_eq!(MatchPolicy::Exact.to_string(), "exact");
    }
}
