use std::fmt::{Display, Formatter};

use crate::schema::Attribute;

/// Equality predicate used by selections and joins.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Predicate {
    /// `attr = "value"`, the literal is opaque to the optimizer.
    ValueEquals { attribute: Attribute, value: String },
    /// `left = right`.
    AttributeEquals { left: Attribute, right: Attribute },
}

impl Predicate {
    pub fn value_equals<A: Into<String>, V: Into<String>>(attribute: A, value: V) -> Self {
        Self::ValueEquals {
            attribute: Attribute::named(attribute),
            value: value.into(),
        }
    }

    pub fn attribute_equals<L: Into<String>, R: Into<String>>(left: L, right: R) -> Self {
        Self::AttributeEquals {
            left: Attribute::named(left),
            right: Attribute::named(right),
        }
    }

    pub fn left_attribute(&self) -> &Attribute {
        match self {
            Self::ValueEquals { attribute, .. } => attribute,
            Self::AttributeEquals { left, .. } => left,
        }
    }

    /// `None` for `attr = value` predicates.
    pub fn right_attribute(&self) -> Option<&Attribute> {
        match self {
            Self::ValueEquals { .. } => None,
            Self::AttributeEquals { right, .. } => Some(right),
        }
    }

    pub fn equals_value(&self) -> bool {
        matches!(self, Self::ValueEquals { .. })
    }

    /// Every attribute the predicate names, left first.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        std::iter::once(self.left_attribute()).chain(self.right_attribute())
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValueEquals { attribute, value } => write!(f, "{}=\"{}\"", attribute, value),
            Self::AttributeEquals { left, right } => write!(f, "{}={}", left, right),
        }
    }
}
