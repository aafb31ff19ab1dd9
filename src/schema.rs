//! Relation schemas carried through estimation.
//!
//! A [`Relation`] is what the estimator derives for every plan node: a tuple count and the ordered
//! attributes it produces, each with its number of distinct values.

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use itertools::Itertools;

/// A named attribute and its distinct-value count.
///
/// Equality and hashing only look at the name, the value count is statistics carried alongside.
#[derive(Clone, Debug)]
pub struct Attribute {
    name: String,
    value_count: u64,
}

impl Attribute {
    pub fn new<S: Into<String>>(name: S, value_count: u64) -> Self {
        Self {
            name: name.into(),
            value_count,
        }
    }

    /// Attribute reference without statistics, as used by predicates and projection lists.
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self::new(name, 0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    pub fn with_value_count(&self, value_count: u64) -> Self {
        Self {
            name: self.name.clone(),
            value_count,
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Attribute {}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Tuple count plus ordered attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relation {
    tuple_count: u64,
    attributes: Vec<Attribute>,
}

impl Relation {
    pub fn new(tuple_count: u64) -> Self {
        Self {
            tuple_count,
            attributes: vec![],
        }
    }

    pub fn with_attributes<I>(tuple_count: u64, attributes: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        Self {
            tuple_count,
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn tuple_count(&self) -> u64 {
        self.tuple_count
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Caps every distinct-value count at the tuple count.
    pub(crate) fn clamp_value_counts(mut self) -> Self {
        let tuple_count = self.tuple_count;
        for attr in &mut self.attributes {
            attr.value_count = attr.value_count.min(tuple_count);
        }
        self
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "T={} [{}]",
            self.tuple_count,
            self.attributes
                .iter()
                .map(|a| format!("{}:{}", a.name(), a.value_count()))
                .join(", ")
        )
    }
}
