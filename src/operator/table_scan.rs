use crate::catalog::NamedRelation;
use crate::schema::Relation;

/// Leaf operator reading a base relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableScan {
    relation: NamedRelation,
}

impl TableScan {
    pub fn new(relation: NamedRelation) -> Self {
        Self { relation }
    }

    pub fn table_name(&self) -> &str {
        self.relation.name()
    }

    pub fn named_relation(&self) -> &NamedRelation {
        &self.relation
    }

    /// Catalogue statistics of the scanned relation.
    pub fn relation(&self) -> &Relation {
        self.relation.relation()
    }
}
