// Scheduler glue: one clearing pass over every market per cycle

use crate::market::{self, ClearingReport};
use crate::types::LocationId;
use crate::world::World;

/// Aggregate outcome of one cycle across all markets.
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub cycle: u64,
    pub reports: Vec<ClearingReport>,
}

impl CycleSummary {
    pub fn trade_count(&self) -> usize {
        self.reports.iter().map(|r| r.trades.len()).sum()
    }

    pub fn volume(&self) -> i64 {
        self.reports.iter().map(ClearingReport::volume).sum()
    }

    pub fn report_for(&self, market: LocationId) -> Option<&ClearingReport> {
        self.reports.iter().find(|r| r.market == Some(market))
    }
}

/// Clear every hub once, in location order, then advance the cycle.
///
/// Markets never interleave: each is drained completely before the next starts.
pub fn run_clearing_cycle(world: &mut World) -> CycleSummary {
    let cycle = world.cycle;
    let hubs: Vec<LocationId> = world
        .locations
        .iter()
        .filter(|(_, l)| l.kind.is_hub())
        .map(|(id, _)| id)
        .collect();

    let reports: Vec<ClearingReport> = hubs
        .into_iter()
        .map(|hub| market::clear_market(world, hub))
        .collect();

    let summary = CycleSummary { cycle, reports };

    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "cycle",
        cycle = cycle,
        markets = summary.reports.len() as u64,
        trades = summary.trade_count() as u64,
        volume = summary.volume(),
    );

    world.cycle += 1;
    summary
}
