use serde::{Deserialize, Serialize};

use crate::market::book::{BookEntry, build_buyers, build_sellers};
use crate::market::eligibility::{eligible_quantity, is_legitimate_bid};
use crate::market::intent::TradeIntent;
use crate::market::settlement::{Trade, settle};
use crate::types::{LocationId, Participant, Price};
use crate::world::World;

/// Outcome of one clearing pass at one market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingReport {
    /// None when the location was not a market
    pub market: Option<LocationId>,
    pub trades: Vec<Trade>,
    /// Scans of the buyer list, counting the final one that found nothing
    pub passes: u32,
}

impl ClearingReport {
    pub fn volume(&self) -> i64 {
        self.trades.iter().map(|t| t.quantity).sum()
    }
}

// === SECOND-PRICE AUCTION ===

/// Highest bid for the same commodity that could set the price against `seller`:
/// from a different owner than both parties, still open, and affordable.
fn next_best_bid(
    world: &World,
    buyers: &[BookEntry],
    bid: &TradeIntent,
    seller: Participant,
) -> Option<Price> {
    buyers
        .iter()
        .filter(|e| {
            e.handle.commodity == bid.commodity
                && e.handle.owner != bid.owner
                && e.handle.owner != seller
        })
        .filter_map(|e| world.intent(e.handle))
        .filter(|i| i.is_active() && is_legitimate_bid(world, i))
        .map(|i| i.limit_price)
        .max()
}

/// Pair one buyer against every compatible seller in priority order.
/// Returns true if anything traded.
fn serve_buyer(
    world: &mut World,
    buyer: &BookEntry,
    buyers: &[BookEntry],
    sellers: &[BookEntry],
    trades: &mut Vec<Trade>,
) -> bool {
    let mut traded = false;

    for entry in sellers {
        let Some(bid) = world.intent(buyer.handle).cloned() else {
            break;
        };
        if !bid.is_active() {
            break;
        }
        if entry.handle.owner == bid.owner || entry.handle.commodity != bid.commodity {
            continue;
        }
        let Some(ask) = world.intent(entry.handle).cloned() else {
            continue;
        };
        if !ask.is_active() {
            continue;
        }

        let price = match next_best_bid(world, buyers, &bid, ask.owner) {
            Some(competing) => competing.saturating_add(1).max(ask.limit_price),
            None => ask.limit_price,
        };
        if bid.limit_price < price || ask.limit_price > bid.limit_price {
            continue;
        }

        let quantity = eligible_quantity(world, &bid, price).min(eligible_quantity(world, &ask, price));
        if quantity <= 0 {
            continue;
        }

        if let Some(trade) = settle(world, buyer.handle, entry.handle, price, quantity) {
            trades.push(trade);
            traded = true;
        }
    }

    traded
}

/// Run the market at `location` to its fixed point.
///
/// Buyers are served highest bid first. Any trade restarts the scan from the
/// top, since a filled bid can no longer hold the price up for the others.
/// Stops after a full scan without a trade; every trade shrinks the
/// outstanding quantity, so this always terminates.
pub fn clear_market(world: &mut World, location: LocationId) -> ClearingReport {
    let Some(loc) = world.get_location_mut(location) else {
        return ClearingReport::default();
    };
    if !loc.kind.is_hub() {
        return ClearingReport::default();
    }
    for stats in loc.stats.values_mut() {
        stats.cycle_volume = 0;
    }

    let sellers = build_sellers(world, location, None);
    let buyers = build_buyers(world, location, None);

    let mut trades = Vec::new();
    let mut passes = 1;
    let mut index = 0;
    while index < buyers.len() {
        if serve_buyer(world, &buyers[index], &buyers, &sellers, &mut trades) {
            passes += 1;
            index = 0;
        } else {
            index += 1;
        }
    }

    let report = ClearingReport {
        market: Some(location),
        trades,
        passes,
    };

    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "clearing",
        cycle = world.cycle,
        market = ?location,
        buyers = buyers.len() as u64,
        sellers = sellers.len() as u64,
        trades = report.trades.len() as u64,
        volume = report.volume(),
        passes = report.passes,
    );

    report
}
