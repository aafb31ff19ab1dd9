use itertools::Itertools;
use log::debug;

use crate::cost::Estimator;
use crate::error::OptResult;
use crate::optimizer::ingest::QueryShape;
use crate::plan::{LogicalPlanBuilder, PlanNodeRef};
use crate::predicate::Predicate;
use crate::schema::{Attribute, Relation};

/// Builds one block per scan: the scan, the selections that only touch its attributes, and a
/// projection dropping attributes nobody needs any more.
pub(crate) struct BlockBuilder<'a> {
    builder: &'a LogicalPlanBuilder,
    shape: &'a QueryShape,
    estimator: Estimator,
}

impl<'a> BlockBuilder<'a> {
    pub(crate) fn new(builder: &'a LogicalPlanBuilder, shape: &'a QueryShape) -> Self {
        Self {
            builder,
            shape,
            estimator: Estimator::new(),
        }
    }

    /// Returns the blocks in scan order.
    ///
    /// Predicates attached to a block are removed from `predicates`.
    pub(crate) fn build(&mut self, predicates: &mut Vec<Predicate>) -> OptResult<Vec<PlanNodeRef>> {
        let scans = self.shape.scans().to_vec();
        scans
            .into_iter()
            .map(|scan| self.build_block(scan, predicates))
            .collect()
    }

    fn build_block(
        &mut self,
        scan: PlanNodeRef,
        predicates: &mut Vec<Predicate>,
    ) -> OptResult<PlanNodeRef> {
        let mut block = scan;
        self.estimator.cost_node(&block)?;

        let mut idx = 0;
        while idx < predicates.len() {
            if is_local(&predicates[idx], &block.output()?) {
                let predicate = predicates.remove(idx);
                block = self.builder.select(block, predicate);
                self.estimator.cost_node(&block)?;
            } else {
                idx += 1;
            }
        }

        let needed = self.shape.needed_attributes(predicates.iter());
        let available = block.output()?;
        let keep: Vec<Attribute> = available
            .attributes()
            .iter()
            .filter(|attr| needed.contains(*attr))
            .cloned()
            .collect();

        if keep.is_empty() || keep.len() == available.attributes().len() {
            return Ok(block);
        }

        debug!("Projecting block {} onto [{}]", block, keep.iter().join(","));
        let project = self.builder.project(block, keep);
        self.estimator.cost_node(&project)?;
        Ok(project)
    }
}

/// Whether every attribute of `predicate` is produced by `relation`.
fn is_local(predicate: &Predicate, relation: &Relation) -> bool {
    predicate.attributes().all(|attr| relation.contains(attr.name()))
}
