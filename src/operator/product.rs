/// Cartesian product of two inputs with disjoint attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Product;
