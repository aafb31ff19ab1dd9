use log::trace;

use crate::cost::Cost;
use crate::error::{OptError, OptResult};
use crate::operator::{LogicalOperator, Projection, TableScan};
use crate::plan::{Plan, PlanNode, PlanNodeId};
use crate::predicate::Predicate;
use crate::schema::{Attribute, Relation};

/// Derives the output relation of every plan node and sums their tuple counts.
///
/// Selectivity rules, with `T` the tuple count and `V(R, A)` the distinct values of `A` in `R`:
///
/// | operator | output tuple count |
/// |---|---|
/// | scan of `R` | `T(R)` |
/// | `π_L(R)` | `T(R)` |
/// | `σ_{A=c}(R)` | `T(R) / V(R,A)`, `V(A) = 1` |
/// | `σ_{A=B}(R)` | `T(R) / max(V(R,A), V(R,B))`, `V(A) = V(B) = min(V(R,A), V(R,B))` |
/// | `R × S` | `T(R) * T(S)` |
/// | `R ⋈_{A=B} S` | `T(R) * T(S) / max(V(R,A), V(S,B))`, `V(A) = V(B) = min(V(R,A), V(S,B), T)` |
///
/// Divisions floor, a zero divisor yields zero tuples. Every distinct-value count of a derived
/// relation is capped at its tuple count.
///
/// The accumulator is reset by each call to [`Estimator::cost`], an estimator must not be shared
/// by concurrent estimations.
#[derive(Debug, Default)]
pub struct Estimator {
    total_cost: Cost,
}

impl Estimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimates every node of `plan` and returns the summed output tuple counts.
    pub fn cost(&mut self, plan: &Plan) -> OptResult<Cost> {
        self.cost_node(&plan.root())
    }

    /// Same as [`Estimator::cost`] for the subtree rooted at `node`.
    pub fn cost_node(&mut self, node: &PlanNode) -> OptResult<Cost> {
        self.total_cost = Cost::default();
        self.visit(node)?;
        Ok(self.total_cost)
    }

    fn visit(&mut self, node: &PlanNode) -> OptResult<()> {
        for input in node.inputs() {
            self.visit(input)?;
        }
        node.check_arity()?;

        let output = match node.operator() {
            LogicalOperator::Scan(scan) => Self::visit_scan(scan),
            LogicalOperator::Project(projection) => {
                Self::visit_project(projection, &node.input()?.output()?)
            }
            LogicalOperator::Select(selection) => {
                Self::visit_select(node.id(), selection.predicate(), &node.input()?.output()?)?
            }
            LogicalOperator::Product(_) => {
                Self::visit_product(&node.left()?.output()?, &node.right()?.output()?)
            }
            LogicalOperator::Join(join) => Self::visit_join(
                node.id(),
                join.predicate(),
                &node.left()?.output()?,
                &node.right()?.output()?,
            )?,
        }
        .clamp_value_counts();

        trace!("Estimated node {} {}: {}", node.id(), node.operator(), output);
        self.total_cost += Cost::from(output.tuple_count());
        node.set_output(output);
        Ok(())
    }

    fn visit_scan(scan: &TableScan) -> Relation {
        let input = scan.relation();
        Relation::with_attributes(input.tuple_count(), input.attributes().iter().cloned())
    }

    fn visit_project(projection: &Projection, input: &Relation) -> Relation {
        let attributes = projection
            .attributes()
            .iter()
            .filter_map(|attr| input.attribute(attr.name()).cloned());
        Relation::with_attributes(input.tuple_count(), attributes)
    }

    fn visit_select(node: PlanNodeId, predicate: &Predicate, input: &Relation) -> OptResult<Relation> {
        let left = resolve(node, predicate.left_attribute(), &[input])?;
        let (tuple_count, value_count, right) = match predicate.right_attribute() {
            None => (floor_div(input.tuple_count(), left.value_count()), 1, None),
            Some(right) => {
                let right = resolve(node, right, &[input])?;
                let max = left.value_count().max(right.value_count());
                let min = left.value_count().min(right.value_count());
                (floor_div(input.tuple_count(), max), min, Some(right))
            }
        };

        let attributes = input.attributes().iter().map(|attr| {
            if attr == left || Some(attr) == right {
                attr.with_value_count(value_count)
            } else {
                attr.clone()
            }
        });
        Ok(Relation::with_attributes(tuple_count, attributes))
    }

    fn visit_product(left: &Relation, right: &Relation) -> Relation {
        Relation::with_attributes(
            left.tuple_count().saturating_mul(right.tuple_count()),
            left.attributes().iter().chain(right.attributes()).cloned(),
        )
    }

    fn visit_join(
        node: PlanNodeId,
        predicate: &Predicate,
        left: &Relation,
        right: &Relation,
    ) -> OptResult<Relation> {
        let left_attr = resolve(node, predicate.left_attribute(), &[left, right])?;
        let right_attr = match predicate.right_attribute() {
            Some(attr) => resolve(node, attr, &[left, right])?,
            None => left_attr,
        };

        let max = left_attr.value_count().max(right_attr.value_count());
        let tuple_count = join_tuple_count(left.tuple_count(), right.tuple_count(), max);
        let value_count = left_attr
            .value_count()
            .min(right_attr.value_count())
            .min(tuple_count);

        let attributes = left.attributes().iter().chain(right.attributes()).map(|attr| {
            if attr == left_attr || attr == right_attr {
                attr.with_value_count(value_count)
            } else {
                attr.clone()
            }
        });
        Ok(Relation::with_attributes(tuple_count, attributes))
    }
}

/// Looks `attr` up in the first relation that produces it.
fn resolve<'a>(node: PlanNodeId, attr: &Attribute, inputs: &[&'a Relation]) -> OptResult<&'a Attribute> {
    inputs
        .iter()
        .find_map(|relation| relation.attribute(attr.name()))
        .ok_or_else(|| {
            OptError::UnknownAttribute {
                attribute: attr.name().to_string(),
                node,
            }
            .into()
        })
}

fn floor_div(numerator: u64, denominator: u64) -> u64 {
    numerator.checked_div(denominator).unwrap_or(0)
}

/// `left * right / max_values`, exact up to a quotient of `u64::MAX`.
fn join_tuple_count(left: u64, right: u64, max_values: u64) -> u64 {
    let product = u128::from(left) * u128::from(right);
    product
        .checked_div(u128::from(max_values))
        .map_or(0, |count| u64::try_from(count).unwrap_or(u64::MAX))
}
