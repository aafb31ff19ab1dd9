use crate::predicate::Predicate;

/// Logical equi-join.
///
/// The predicate is always of `attr = attr` shape, with one attribute produced by each input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    predicate: Predicate,
}

impl Join {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}
