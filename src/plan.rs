use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::mem::swap;
use std::rc::Rc;

use anyhow::ensure;
use itertools::Itertools;
use prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR;
use prettytable::Table;
use smallvec::SmallVec;

use crate::catalog::NamedRelation;
use crate::error::{OptError, OptResult};
use crate::operator::{Join, LogicalOperator, Product, Projection, Selection, TableScan};
use crate::predicate::Predicate;
use crate::schema::{Attribute, Relation};

pub type PlanNodeId = u32;

pub type PlanNodeRef = Rc<PlanNode>;

/// One node in a plan.
///
/// Nodes are immutable after construction except for the `output` slot, which the
/// [`Estimator`](crate::cost::Estimator) fills with the derived relation. Re-estimation
/// overwrites the slot with an identical value, so a subtree can be shared by several plans.
#[derive(Debug)]
pub struct PlanNode {
    id: PlanNodeId,
    operator: LogicalOperator,
    inputs: SmallVec<[PlanNodeRef; 2]>,
    output: RefCell<Option<Relation>>,
}

/// The `eq` should ignore `id` and the estimated output.
impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator && self.inputs == other.inputs
    }
}

/// A query plan.
///
/// Plans handled by the optimizer are trees: every node except the root has exactly one parent.
#[derive(PartialEq, Debug, Clone)]
pub struct Plan {
    root: PlanNodeRef,
}

/// Breath first iterator of a single root plan.
///
/// Nodes are told apart by address, ids are only unique per builder.
struct BFSPlanNodeIter {
    visited: HashSet<*const PlanNode>,
    cur_level: Vec<PlanNodeRef>,
    next_level: Vec<PlanNodeRef>,
}

impl Iterator for BFSPlanNodeIter {
    type Item = PlanNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur_level.is_empty() {
            swap(&mut self.cur_level, &mut self.next_level);
        }

        if let Some(p) = self.cur_level.pop() {
            for input in &p.inputs {
                if self.visited.insert(Rc::as_ptr(input)) {
                    self.next_level.push(input.clone());
                }
            }

            Some(p)
        } else {
            None
        }
    }
}

impl Plan {
    pub fn new(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    pub fn bfs_iterator(&self) -> impl Iterator<Item = PlanNodeRef> {
        let mut visited = HashSet::new();
        visited.insert(Rc::as_ptr(&self.root));

        BFSPlanNodeIter {
            cur_level: vec![self.root.clone()],
            next_level: vec![],
            visited,
        }
    }

    /// Names of the scanned base relations, sorted.
    pub fn table_names(&self) -> Vec<String> {
        self.bfs_iterator()
            .filter_map(|node| {
                node.operator()
                    .as_scan()
                    .map(|scan| scan.table_name().to_string())
            })
            .sorted()
            .collect()
    }

    /// Renders every node with its estimated tuple count and attribute statistics.
    ///
    /// Nodes that have not been estimated show `?`.
    pub fn explain(&self) -> String {
        let mut table = Table::new();
        table.set_format(*FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.set_titles(row!["id", "operator", "tuples", "attributes"]);

        let mut stack = vec![(0usize, self.root.clone())];
        while let Some((depth, node)) = stack.pop() {
            let (tuples, attributes) = match node.output.borrow().as_ref() {
                Some(output) => (
                    output.tuple_count().to_string(),
                    output
                        .attributes()
                        .iter()
                        .map(|a| format!("{}({})", a.name(), a.value_count()))
                        .join(" "),
                ),
                None => ("?".to_string(), "?".to_string()),
            };
            table.add_row(row![
                node.id,
                format!("{}{}", "  ".repeat(depth), node.operator),
                r->tuples,
                attributes
            ]);
            for input in node.inputs.iter().rev() {
                stack.push((depth + 1, input.clone()));
            }
        }

        table.to_string()
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.root.fmt(f)
    }
}

impl PlanNode {
    pub fn new<I>(id: PlanNodeId, operator: LogicalOperator, inputs: I) -> Self
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        Self {
            id,
            operator,
            inputs: inputs.into_iter().collect(),
            output: RefCell::new(None),
        }
    }

    pub fn operator(&self) -> &LogicalOperator {
        &self.operator
    }

    pub fn id(&self) -> PlanNodeId {
        self.id
    }

    pub fn inputs(&self) -> &[PlanNodeRef] {
        &self.inputs
    }

    /// Fails unless the node has as many inputs as its operator takes.
    pub fn check_arity(&self) -> OptResult<()> {
        let expected = self.operator.arity();
        ensure!(
            self.inputs.len() == expected,
            OptError::WrongArity {
                node: self.id,
                expected,
                actual: self.inputs.len(),
            }
        );
        Ok(())
    }

    pub fn input_at(&self, idx: usize) -> OptResult<&PlanNodeRef> {
        self.inputs.get(idx).ok_or_else(|| {
            OptError::MissingInput {
                node: self.id,
                idx,
            }
            .into()
        })
    }

    /// Single input of a unary node.
    pub fn input(&self) -> OptResult<&PlanNodeRef> {
        self.input_at(0)
    }

    pub fn left(&self) -> OptResult<&PlanNodeRef> {
        self.input_at(0)
    }

    pub fn right(&self) -> OptResult<&PlanNodeRef> {
        self.input_at(1)
    }

    /// Relation derived by the last estimation of this node.
    pub fn output(&self) -> OptResult<Relation> {
        self.output
            .borrow()
            .clone()
            .ok_or_else(|| OptError::MissingOutput(self.id).into())
    }

    pub fn has_output(&self) -> bool {
        self.output.borrow().is_some()
    }

    pub fn set_output(&self, output: Relation) {
        *self.output.borrow_mut() = Some(output);
    }
}

impl Display for PlanNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operator)?;
        if !self.inputs.is_empty() {
            write!(f, " ({})", self.inputs.iter().join(", "))?;
        }
        Ok(())
    }
}

/// Hands out plan node ids, unique per generator.
#[derive(Debug, Default)]
pub struct PlanNodeIdGen {
    next: Cell<PlanNodeId>,
}

impl PlanNodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> PlanNodeId {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }
}

/// Creates logical plan nodes with fresh ids.
///
/// Every node built through the same builder gets a distinct id, so subtrees built separately
/// (e.g. both sides of a product) can be combined into one plan.
#[derive(Debug, Default)]
pub struct LogicalPlanBuilder {
    id_gen: PlanNodeIdGen,
}

impl LogicalPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn node<I>(&self, operator: LogicalOperator, inputs: I) -> PlanNodeRef
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        Rc::new(PlanNode::new(self.id_gen.next(), operator, inputs))
    }

    pub fn scan(&self, relation: NamedRelation) -> PlanNodeRef {
        self.node(LogicalOperator::Scan(TableScan::new(relation)), [])
    }

    pub fn project<I>(&self, input: PlanNodeRef, attributes: I) -> PlanNodeRef
    where
        I: IntoIterator<Item = Attribute>,
    {
        let projection = Projection::new(attributes.into_iter().collect());
        self.node(LogicalOperator::Project(projection), [input])
    }

    pub fn select(&self, input: PlanNodeRef, predicate: Predicate) -> PlanNodeRef {
        self.node(
            LogicalOperator::Select(Selection::new(predicate)),
            [input],
        )
    }

    pub fn product(&self, left: PlanNodeRef, right: PlanNodeRef) -> PlanNodeRef {
        self.node(LogicalOperator::Product(Product), [left, right])
    }

    pub fn join(&self, left: PlanNodeRef, right: PlanNodeRef, predicate: Predicate) -> PlanNodeRef {
        self.node(LogicalOperator::Join(Join::new(predicate)), [left, right])
    }

    pub fn build(&self, root: PlanNodeRef) -> Plan {
        Plan::new(root)
    }
}
