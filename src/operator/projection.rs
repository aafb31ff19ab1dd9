use crate::schema::Attribute;

/// Keeps the listed attributes, in list order. Duplicate tuples are not eliminated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    attributes: Vec<Attribute>,
}

impl Projection {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}
