use crate::predicate::Predicate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    predicate: Predicate,
}

impl Selection {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}
