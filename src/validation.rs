//! Validation outcomes for a [`crate::resource::Resource`], keyed by
//! property name (or, for whole-resource validators, by a synthetic
//! `_name` key). Grounded on `plastron.rdfmapping.validation`.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(msg) => Some(msg),
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationOutcome::Valid => write!(f, "valid"),
            ValidationOutcome::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

/// All validation outcomes for one resource, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ValidationResults(BTreeMap<String, ValidationOutcome>);

impl ValidationResults {
    pub fn new() -> Self {
        ValidationResults::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, outcome: ValidationOutcome) {
        self.0.insert(key.into(), outcome);
    }

    pub fn get(&self, key: &str) -> Option<&ValidationOutcome> {
        self.0.get(key)
    }

    pub fn ok(&self) -> bool {
        self.0.values().all(ValidationOutcome::is_valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ValidationOutcome)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_valid())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &ValidationOutcome)> {
        self.0
            .iter()
            .filter(|(_, v)| v.is_valid())
            .map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_when_all_valid() {
        let mut r = ValidationResults::new();
        r.insert("title", ValidationOutcome::Valid);
        r.insert("handle", ValidationOutcome::Valid);
        assert!(r.ok());
        assert_eq!(r.failures().count(), 0);
    }

    #[test]
    fn test_not_ok_with_a_failure() {
        let mut r = ValidationResults::new();
        r.insert("title", ValidationOutcome::Valid);
        r.insert("handle", ValidationOutcome::Invalid("is not a handle URI".into()));
        assert!(!r.ok());
        let (name, outcome) = r.failures().next().unwrap();
        assert_eq!(name, "handle");
        assert_eq!(outcome.message(), Some("is not a handle URI"));
    }
}
