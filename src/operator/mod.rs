//! Logical operators of the relational algebra.
//!
//! Operators only carry their own arguments, inputs are kept by
//! [`PlanNode`](crate::plan::PlanNode).

mod join;
pub use join::*;
mod logical;
pub use logical::*;
mod product;
pub use product::*;
mod projection;
pub use projection::*;
mod selection;
pub use selection::*;
mod table_scan;
pub use table_scan::*;
