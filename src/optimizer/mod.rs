//! Cost based rewriting of canonical plans.
//!
//! Optimization runs in four steps:
//!
//! 1. [`QueryShape`] collects the scans, predicates and required output of the input plan.
//! 2. The block builder pushes every selection local to one scan down onto that scan, and projects
//!    each scan onto the attributes still needed.
//! 3. For each ordering of the remaining predicates, the combiner turns blocks into a bushy plan
//!    of selections, joins and projections, closing with cartesian products.
//! 4. Each candidate is costed by the [`Estimator`](crate::cost::Estimator) and the cheapest wins.

mod block;
mod combiner;
mod ingest;
pub use ingest::*;
mod search;
pub use search::SearchStrategy;
mod sink;
pub use sink::*;

use anyhow::ensure;
use log::{info, warn};

use crate::cost::Estimator;
use crate::error::{OptError, OptResult};
use crate::plan::{LogicalPlanBuilder, Plan};

use self::block::BlockBuilder;
use self::combiner::Combiner;
use self::search::CandidateSearch;

#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    pub strategy: SearchStrategy,
    /// Exhaustive search falls back to greedy above this many predicates.
    pub max_exhaustive_predicates: usize,
    /// Print `Found plan with cost: <cost>` to stdout for every candidate.
    pub report_candidates: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Exhaustive,
            max_exhaustive_predicates: 8,
            report_candidates: true,
        }
    }
}

impl OptimizerConfig {
    fn strategy_for(&self, predicate_count: usize) -> SearchStrategy {
        match self.strategy {
            SearchStrategy::Exhaustive if predicate_count > self.max_exhaustive_predicates => {
                warn!(
                    "{} predicates exceed exhaustive search limit {}, using greedy search",
                    predicate_count, self.max_exhaustive_predicates
                );
                SearchStrategy::Greedy
            }
            strategy => strategy,
        }
    }
}

/// Rewrites a canonical plan into the cheapest equivalent plan found.
///
/// Holds no state between calls, every [`Optimizer::optimise`] starts from scratch.
#[derive(Clone, Debug, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimizes `plan`, reporting candidates as configured.
    ///
    /// The returned plan is estimated and shares no node with `plan`.
    pub fn optimise(&self, plan: &Plan) -> OptResult<Plan> {
        if self.config.report_candidates {
            self.optimise_with_sink(plan, &mut StdoutSink)
        } else {
            self.optimise_with_sink(plan, &mut LogSink)
        }
    }

    pub fn optimise_with_sink(&self, plan: &Plan, sink: &mut dyn CandidateSink) -> OptResult<Plan> {
        let builder = LogicalPlanBuilder::new();
        let shape = QueryShape::ingest(plan, &builder)?;
        ensure!(!shape.scans().is_empty(), OptError::EmptyPlan);

        let mut predicates = shape.predicates().to_vec();
        let blocks = BlockBuilder::new(&builder, &shape).build(&mut predicates)?;

        let strategy = self.config.strategy_for(predicates.len());
        let mut search = CandidateSearch::new(Combiner::new(&builder, &shape), &blocks);
        search.run(strategy, &predicates, sink)?;
        let (_, best) = search.into_best().ok_or(OptError::NoCandidate)?;

        // Blocks are shared by all candidates, refresh the winner's outputs.
        let cost = Estimator::new().cost(&best)?;
        info!("Optimised plan with cost {}: {}", cost, best);
        Ok(best)
    }
}
