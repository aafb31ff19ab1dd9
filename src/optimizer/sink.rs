use log::debug;

use crate::cost::Cost;
use crate::plan::Plan;

/// Receives every candidate plan the search costs.
pub trait CandidateSink {
    fn on_candidate(&mut self, cost: Cost, plan: &Plan);
}

impl<F> CandidateSink for F
where
    F: FnMut(Cost, &Plan),
{
    fn on_candidate(&mut self, cost: Cost, plan: &Plan) {
        self(cost, plan)
    }
}

/// Writes `Found plan with cost: <cost>` to stdout for each candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl CandidateSink for StdoutSink {
    fn on_candidate(&mut self, cost: Cost, _plan: &Plan) {
        println!("Found plan with cost: {}", cost);
    }
}

/// Logs candidates at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl CandidateSink for LogSink {
    fn on_candidate(&mut self, cost: Cost, plan: &Plan) {
        debug!("Found plan with cost {}: {}", cost, plan);
    }
}
