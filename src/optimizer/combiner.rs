use log::warn;

use crate::cost::Estimator;
use crate::error::{OptError, OptResult};
use crate::optimizer::ingest::QueryShape;
use crate::plan::{LogicalPlanBuilder, PlanNodeRef};
use crate::predicate::Predicate;
use crate::schema::Attribute;

/// Inputs matched by a predicate.
enum Matched {
    /// Every attribute of the predicate lives in this block.
    Single(PlanNodeRef),
    Pair(PlanNodeRef, PlanNodeRef),
}

/// Composes blocks into one plan for a fixed predicate ordering.
///
/// Each predicate in turn becomes a selection over the block holding all of its attributes, or a
/// join of the two blocks holding one attribute each. The result replaces its inputs at the end of
/// the block list, projected onto the attributes still needed. Blocks left over once the
/// predicates are consumed are combined with cartesian products, first two first.
pub(crate) struct Combiner<'a> {
    builder: &'a LogicalPlanBuilder,
    shape: &'a QueryShape,
    estimator: Estimator,
}

impl<'a> Combiner<'a> {
    pub(crate) fn new(builder: &'a LogicalPlanBuilder, shape: &'a QueryShape) -> Self {
        Self {
            builder,
            shape,
            estimator: Estimator::new(),
        }
    }

    /// Combines `blocks` applying `predicates` in order and returns the root of the new plan.
    ///
    /// Blocks are only used as inputs of new nodes, never modified.
    pub(crate) fn combine(
        &mut self,
        mut blocks: Vec<PlanNodeRef>,
        mut predicates: Vec<Predicate>,
    ) -> OptResult<PlanNodeRef> {
        let mut idx = 0;
        while idx < predicates.len() {
            let matched = match take_inputs(&mut blocks, &predicates[idx])? {
                Some(matched) => matched,
                None => {
                    warn!("Skipping predicate {} matching no input", predicates[idx]);
                    idx += 1;
                    continue;
                }
            };

            let predicate = predicates.remove(idx);
            let node = match matched {
                Matched::Single(block) => self.builder.select(block, predicate),
                Matched::Pair(left, right) => self.builder.join(left, right, predicate),
            };
            self.estimator.cost_node(&node)?;

            let needed = self.shape.needed_attributes(predicates.iter());
            let node = self.prune(node, |attr| needed.contains(attr))?;
            blocks.push(node);
        }

        while blocks.len() > 1 {
            let left = blocks.remove(0);
            let right = blocks.remove(0);
            let product = self.builder.product(left, right);
            self.estimator.cost_node(&product)?;
            blocks.push(product);
        }

        let root = blocks.pop().ok_or(OptError::EmptyPlan)?;
        self.apply_root_projection(root)
    }

    /// Projects `node` onto its attributes accepted by `needed`, unless that keeps all or none.
    fn prune<F>(&mut self, node: PlanNodeRef, needed: F) -> OptResult<PlanNodeRef>
    where
        F: Fn(&Attribute) -> bool,
    {
        let available = node.output()?;
        let keep: Vec<Attribute> = available
            .attributes()
            .iter()
            .filter(|attr| needed(*attr))
            .cloned()
            .collect();

        if keep.is_empty() || keep.len() == available.attributes().len() {
            return Ok(node);
        }

        let project = self.builder.project(node, keep);
        self.estimator.cost_node(&project)?;
        Ok(project)
    }

    fn apply_root_projection(&mut self, root: PlanNodeRef) -> OptResult<PlanNodeRef> {
        let projection = match self.shape.root_projection() {
            Some(projection) => projection,
            None => return Ok(root),
        };

        let output = root.output()?;
        let names = output.attributes().iter().map(Attribute::name);
        if names.eq(projection.iter().map(Attribute::name)) {
            return Ok(root);
        }

        let project = self.builder.project(root, projection.iter().cloned());
        self.estimator.cost_node(&project)?;
        Ok(project)
    }
}

/// Removes and returns the blocks `predicate` applies to.
///
/// Returns `None`, leaving `blocks` untouched, when some attribute of the predicate is produced by
/// no block.
fn take_inputs(blocks: &mut Vec<PlanNodeRef>, predicate: &Predicate) -> OptResult<Option<Matched>> {
    let left_idx = match find_block(blocks, predicate.left_attribute())? {
        Some(idx) => idx,
        None => return Ok(None),
    };
    let left = blocks.remove(left_idx);

    let right_attr = match predicate.right_attribute() {
        Some(attr) if !left.output()?.contains(attr.name()) => attr,
        _ => return Ok(Some(Matched::Single(left))),
    };

    match find_block(blocks, right_attr)? {
        Some(right_idx) => {
            let right = blocks.remove(right_idx);
            Ok(Some(Matched::Pair(left, right)))
        }
        None => {
            blocks.insert(left_idx, left);
            Ok(None)
        }
    }
}

fn find_block(blocks: &[PlanNodeRef], attr: &Attribute) -> OptResult<Option<usize>> {
    for (idx, block) in blocks.iter().enumerate() {
        if block.output()?.contains(attr.name()) {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}
