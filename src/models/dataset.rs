use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::person::Person;

/// Immutable, ordered collection of records
///
/// Cloning is cheap; all clones share the same backing slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Person>", into = "Vec<Person>")]
pub struct Dataset {
    people: Arc<[Person]>,
}

impl Dataset {
    /// Create a dataset from an ordered list of people
    pub fn new(people: Vec<Person>) -> Self {
        Self {
            people: people.into(),
        }
    }

    /// Shared handle to the records, in dataset order
    pub fn people(&self) -> Arc<[Person]> {
        Arc::clone(&self.people)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.people.iter()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Keep the records accepted by `predicate`, preserving dataset order
    pub fn filter<F>(&self, mut predicate: F) -> Vec<Person>
    where
        F: FnMut(&Person) -> bool,
    {
        self.people
            .iter()
            .filter(|person| predicate(person))
            .cloned()
            .collect()
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<Person>> for Dataset {
    fn from(people: Vec<Person>) -> Self {
        Self::new(people)
    }
}

impl From<Dataset> for Vec<Person> {
    fn from(dataset: Dataset) -> Self {
        dataset.people.to_vec()
    }
}

impl FromIterator<Person> for Dataset {
    fn from_iter<I: IntoIterator<Item = Person>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Person;
    type IntoIter = std::slice::Iter<'a, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hendis() -> Dataset {
        ["Tarek", "Omar", "Ammar", "Nisreen", "Aya"]
            .into_iter()
            .map(|first| Person::new(first, "Hendi"))
            .collect()
    }

    #[test]
    fn test_filter_preserves_order() {
        let dataset = hendis();
        let filtered = dataset.filter(|p| p.first_name.contains('a'));

        let names: Vec<_> = filtered.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Tarek", "Omar", "Ammar"]);
    }

    #[test]
    fn test_clones_share_storage() {
        let dataset = hendis();
        let clone = dataset.clone();

        assert!(Arc::ptr_eq(&dataset.people(), &clone.people()));
        assert_eq!(clone.len(), 5);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let dataset = Dataset::new(vec![Person::new("Aya", "Hendi")]);
        let json = serde_json::to_string(&dataset).unwrap();
        assert_eq!(json, r#"[{"first_name":"Aya","last_name":"Hendi"}]"#);

        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dataset);
    }
}
