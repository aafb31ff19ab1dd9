use itertools::Itertools;
use log::debug;

use crate::cost::{Cost, Estimator};
use crate::error::OptResult;
use crate::optimizer::combiner::Combiner;
use crate::optimizer::sink::CandidateSink;
use crate::plan::{Plan, PlanNodeRef};
use crate::predicate::Predicate;

/// How predicate orderings are explored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Every permutation of the predicates, `k!` candidates.
    #[default]
    Exhaustive,
    /// Grows the ordering one predicate at a time, keeping the cheapest extension.
    Greedy,
}

/// Costs candidate orderings and remembers the cheapest plan.
///
/// The first candidate wins ties.
pub(crate) struct CandidateSearch<'a> {
    combiner: Combiner<'a>,
    blocks: &'a [PlanNodeRef],
    estimator: Estimator,
    best: Option<(Cost, Plan)>,
}

impl<'a> CandidateSearch<'a> {
    pub(crate) fn new(combiner: Combiner<'a>, blocks: &'a [PlanNodeRef]) -> Self {
        Self {
            combiner,
            blocks,
            estimator: Estimator::new(),
            best: None,
        }
    }

    /// Searches orderings of `predicates`, reporting every candidate to `sink`.
    pub(crate) fn run(
        &mut self,
        strategy: SearchStrategy,
        predicates: &[Predicate],
        sink: &mut dyn CandidateSink,
    ) -> OptResult<()> {
        if predicates.is_empty() {
            self.evaluate(vec![], sink)?;
            return Ok(());
        }

        match strategy {
            SearchStrategy::Exhaustive => self.exhaustive(predicates, sink),
            SearchStrategy::Greedy => self.greedy(predicates, sink),
        }
    }

    pub(crate) fn into_best(self) -> Option<(Cost, Plan)> {
        self.best
    }

    fn exhaustive(&mut self, predicates: &[Predicate], sink: &mut dyn CandidateSink) -> OptResult<()> {
        for ordering in predicates.iter().cloned().permutations(predicates.len()) {
            self.evaluate(ordering, sink)?;
        }
        Ok(())
    }

    fn greedy(&mut self, predicates: &[Predicate], sink: &mut dyn CandidateSink) -> OptResult<()> {
        let mut chosen: Vec<Predicate> = Vec::with_capacity(predicates.len());
        let mut rest = predicates.to_vec();

        while !rest.is_empty() {
            let mut cheapest: Option<(Cost, usize)> = None;
            for idx in 0..rest.len() {
                let ordering = chosen
                    .iter()
                    .chain(std::iter::once(&rest[idx]))
                    .chain(rest[..idx].iter())
                    .chain(rest[idx + 1..].iter())
                    .cloned()
                    .collect();
                let cost = self.evaluate(ordering, sink)?;
                if cheapest.map_or(true, |(best, _)| cost < best) {
                    cheapest = Some((cost, idx));
                }
            }

            let idx = cheapest.map_or(0, |(_, idx)| idx);
            chosen.push(rest.remove(idx));
        }

        Ok(())
    }

    /// Builds and costs the plan for one ordering.
    fn evaluate(&mut self, ordering: Vec<Predicate>, sink: &mut dyn CandidateSink) -> OptResult<Cost> {
        debug!("Trying predicate ordering [{}]", ordering.iter().join(", "));
        let root = self.combiner.combine(self.blocks.to_vec(), ordering)?;
        let plan = Plan::new(root);
        let cost = self.estimator.cost(&plan)?;
        sink.on_candidate(cost, &plan);

        if self.best.as_ref().map_or(true, |(best, _)| cost < *best) {
            self.best = Some((cost, plan));
        }
        Ok(cost)
    }
}
