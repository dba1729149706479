//! Record matching policies

use crate::models::Person;

/// Decides whether a record matches a (non-blank) query
///
/// The pipeline never inspects names itself; swapping the matcher changes
/// the filtering policy without touching debounce or publication logic.
pub trait RecordMatcher: Send + Sync {
    fn matches(&self, person: &Person, query: &str) -> bool;

    /// Name of the policy, used in logs
    fn name(&self) -> &'static str;
}

/// Case-insensitive substring match over full names and initials
#[derive(Debug, Clone, Copy, Default)]
pub struct NameCombinationMatcher;

impl RecordMatcher for NameCombinationMatcher {
    fn matches(&self, person: &Person, query: &str) -> bool {
        person.matches(query)
    }

    fn name(&self) -> &'static str {
        "name_combination"
    }
}

/// Adapter turning a closure into a matcher
pub struct FnMatcher<F> {
    name: &'static str,
    predicate: F,
}

impl<F> FnMatcher<F>
where
    F: Fn(&Person, &str) -> bool + Send + Sync,
{
    pub fn new(name: &'static str, predicate: F) -> Self {
        Self { name, predicate }
    }
}

impl<F> RecordMatcher for FnMatcher<F>
where
    F: Fn(&Person, &str) -> bool + Send + Sync,
{
    fn matches(&self, person: &Person, query: &str) -> bool {
        (self.predicate)(person, query)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_combination_matcher_delegates() {
        let matcher = NameCombinationMatcher;
        let person = Person::new("Nisreen", "Hendi");

        assert!(matcher.matches(&person, "n h"));
        assert!(matcher.matches(&person, "NISREEN"));
        assert!(!matcher.matches(&person, "Omar"));
    }

    #[test]
    fn test_fn_matcher() {
        let last_name_only = FnMatcher::new("last_name_exact", |p: &Person, q: &str| {
            p.last_name == q
        });
        let person = Person::new("Aya", "Hendi");

        assert!(last_name_only.matches(&person, "Hendi"));
        assert!(!last_name_only.matches(&person, "hendi"));
        assert_eq!(last_name_only.name(), "last_name_exact");
    }
}
