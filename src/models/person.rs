use serde::{Deserialize, Serialize};

/// A searchable person record
///
/// Records are immutable values with no identity beyond equality of their
/// name fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    /// Create a new person
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The name forms a query is compared against.
    ///
    /// In order: names concatenated, names space-separated, initials
    /// concatenated, initials space-separated. An empty name contributes an
    /// empty initial.
    pub fn name_combinations(&self) -> [String; 4] {
        let first_initial = initial(&self.first_name);
        let last_initial = initial(&self.last_name);

        [
            format!("{}{}", self.first_name, self.last_name),
            format!("{} {}", self.first_name, self.last_name),
            format!("{}{}", first_initial, last_initial),
            format!("{} {}", first_initial, last_initial),
        ]
    }

    /// Check whether `query` is a case-insensitive substring of any name
    /// combination.
    ///
    /// Blank queries are not special-cased here; the pipeline short-circuits
    /// them before any matching happens.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name_combinations()
            .iter()
            .any(|combination| combination.to_lowercase().contains(&needle))
    }
}

fn initial(name: &str) -> String {
    name.chars().next().map(String::from).unwrap_or_default()
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_name_variants() {
        let person = Person::new("Tarek", "Hendi");

        for query in ["tarek", "TAREK", "Tarek Hendi", "TH", "t h", "kHen", "hendi"] {
            assert!(person.matches(query), "expected {:?} to match", query);
        }
    }

    #[test]
    fn test_rejects_unrelated_query() {
        let person = Person::new("Tarek", "Hendi");

        assert!(!person.matches("xyz"));
        assert!(!person.matches("Tarek  Hendi"));
        assert!(!person.matches("HT"));
    }

    #[test]
    fn test_display_is_first_then_last() {
        assert_eq!(Person::new("Aya", "Hendi").to_string(), "Aya Hendi");
    }

    #[test]
    fn test_name_combinations() {
        let person = Person::new("Omar", "Hendi");
        let combos = person.name_combinations();

        assert_eq!(combos[0], "OmarHendi");
        assert_eq!(combos[1], "Omar Hendi");
        assert_eq!(combos[2], "OH");
        assert_eq!(combos[3], "O H");
    }

    #[test]
    fn test_empty_names_are_total() {
        let person = Person::new("", "");

        assert!(person.matches(" "));
        assert!(!person.matches("a"));
    }

    #[test]
    fn test_serde_uses_snake_case_fields() {
        let json = serde_json::to_value(Person::new("Aya", "Hendi")).unwrap();
        assert_eq!(json["first_name"], "Aya");
        assert_eq!(json["last_name"], "Hendi");
    }
}
