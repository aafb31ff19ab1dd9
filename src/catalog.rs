//! Base relations and their statistics.

use std::collections::HashMap;

use crate::error::{OptError, OptResult};
use crate::schema::{Attribute, Relation};

/// A base relation as scanned by a plan leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedRelation {
    name: String,
    relation: Relation,
}

impl NamedRelation {
    pub fn new<S: Into<String>>(name: S, relation: Relation) -> Self {
        Self {
            name: name.into(),
            relation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }
}

/// Name to base relation mapping.
///
/// Attribute names are unique across the whole catalogue, registering an attribute name already
/// owned by another relation is rejected.
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    relations: HashMap<String, NamedRelation>,
    attribute_owners: HashMap<String, String>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers relation `name` with `tuple_count` tuples and the given `(attribute, V)` pairs.
    pub fn create_relation<S, I, A>(
        &mut self,
        name: S,
        tuple_count: u64,
        attributes: I,
    ) -> OptResult<&NamedRelation>
    where
        S: Into<String>,
        I: IntoIterator<Item = (A, u64)>,
        A: Into<String>,
    {
        let name = name.into();
        if self.relations.contains_key(&name) {
            return Err(OptError::DuplicateRelation(name).into());
        }

        let mut relation = Relation::new(tuple_count);
        let mut owned = vec![];
        for (attr_name, value_count) in attributes {
            let attr_name = attr_name.into();
            let taken = self
                .attribute_owners
                .get(&attr_name)
                .cloned()
                .or_else(|| relation.contains(&attr_name).then(|| name.clone()));
            if let Some(owner) = taken {
                return Err(OptError::DuplicateAttribute {
                    attribute: attr_name,
                    owner,
                }
                .into());
            }
            relation.add_attribute(Attribute::new(attr_name.clone(), value_count));
            owned.push(attr_name);
        }

        for attr_name in owned {
            self.attribute_owners.insert(attr_name, name.clone());
        }
        let named = self
            .relations
            .entry(name.clone())
            .or_insert_with(|| NamedRelation::new(name, relation));
        Ok(&*named)
    }

    pub fn lookup(&self, name: &str) -> OptResult<NamedRelation> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| OptError::UnknownRelation(name.to_string()).into())
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
