// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;

/// A point of interest outside of the [Graph](crate::Graph), like a hospital
/// or a power plant. Facilities are [snapped](crate::Locate) onto the graph
/// before routing.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    /// Identifier of the facility, also used to break ties between
    /// equally-good destinations (lowest id wins).
    pub id: i64,
    pub x: f64,
    pub y: f64,

    /// Arbitrary attributes, used only for [filtering](Filter) and labeling.
    pub attributes: HashMap<String, String>,
}

impl Facility {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            attributes: HashMap::default(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Gets the value of an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns a human-readable label: the `name` attribute, falling back to the id.
    pub fn label(&self) -> String {
        match self.get("name") {
            Some(name) => name.to_string(),
            None => format!("#{}", self.id),
        }
    }
}

/// Predicate deciding which destination [Facilities](Facility) take part in matching.
#[derive(Default)]
pub enum Filter {
    /// Accept every facility.
    #[default]
    All,

    /// Accept facilities whose attribute `key` is exactly `value`.
    Equals { key: String, value: String },

    /// Accept facilities whose attribute `key` is any of `values`.
    OneOf { key: String, values: Vec<String> },

    /// Accept facilities for which the function returns `true`.
    Custom(Box<dyn Fn(&Facility) -> bool + Send + Sync>),
}

impl Filter {
    pub fn equals(key: &str, value: &str) -> Self {
        Self::Equals {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn custom<F: Fn(&Facility) -> bool + Send + Sync + 'static>(f: F) -> Self {
        Self::Custom(Box::new(f))
    }

    /// Returns `true` if the facility is accepted by this filter.
    pub fn accepts(&self, f: &Facility) -> bool {
        match self {
            Self::All => true,
            Self::Equals { key, value } => f.get(key) == Some(value.as_str()),
            Self::OneOf { key, values } => f
                .get(key)
                .is_some_and(|actual| values.iter().any(|v| v == actual)),
            Self::Custom(predicate) => predicate(f),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Equals { key, value } => write!(f, "{key} == {value:?}"),
            Self::OneOf { key, values } => write!(f, "{key} in {values:?}"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant() -> Facility {
        Facility::new(7, 0.0, 0.0)
            .with_attribute("name", "Diablo")
            .with_attribute("county", "KING")
    }

    #[test]
    fn attributes() {
        let f = plant();
        assert_eq!(f.get("county"), Some("KING"));
        assert_eq!(f.get("state"), None);
        assert_eq!(f.label(), "Diablo");
        assert_eq!(Facility::new(3, 0.0, 0.0).label(), "#3");
    }

    #[test]
    fn filters() {
        let f = plant();
        assert!(Filter::All.accepts(&f));
        assert!(Filter::equals("county", "KING").accepts(&f));
        assert!(!Filter::equals("county", "PIERCE").accepts(&f));
        assert!(!Filter::equals("state", "KING").accepts(&f));
        assert!(Filter::OneOf {
            key: "county".into(),
            values: vec!["PIERCE".into(), "KING".into()],
        }
        .accepts(&f));
        assert!(!Filter::custom(|f| f.id > 10).accepts(&f));
        assert_eq!(format!("{:?}", Filter::equals("county", "KING")), "county == \"KING\"");
    }
}
