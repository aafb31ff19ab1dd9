//! ## Background
//!
//! A cost based optimizer for a small relational algebra of scans, selections, projections,
//! cartesian products and equi-joins. It accepts a *canonical* logical plan, the direct
//! translation of a query with every selection and projection on top of a tree of products, and
//! returns an equivalent plan with a lower estimated cost.
//!
//! The cost of a plan is the sum of the estimated output cardinalities of all of its nodes. Output
//! cardinalities are derived bottom up from the tuple counts and distinct-value counts of the base
//! relations with the textbook selectivity formulas, see [`cost::Estimator`].
//!
//! ## Design
//!
//! ### Rewriting
//!
//! Selections referencing a single base relation are pushed down onto its scan, and each scan is
//! projected onto the attributes still referenced by pending predicates or by the plan output.
//! The remaining predicates turn cartesian product/selection pairs into joins; the order in which
//! they are applied decides the shape of the resulting bushy plan.
//!
//! ### Search
//!
//! Every ordering of the remaining predicates is turned into a candidate plan and costed, the
//! cheapest candidate wins. This is factorial in the number of join predicates, which is fine for
//! the handful found in a toy query; above a configurable limit a greedy search is used instead,
//! similar in spirit to the bottom-up strategy of [1].
//!
//! ## Reference
//!
//! 1. Selinger, P. Griffiths, et al. "Access path selection in a relational database management
//! system." Readings in Artificial Intelligence and Databases. Morgan Kaufmann, 1989. 511-522.

#[macro_use]
extern crate prettytable;

pub mod catalog;
pub mod cost;
pub mod error;
pub mod operator;
pub mod optimizer;
pub mod plan;
pub mod predicate;
pub mod schema;
