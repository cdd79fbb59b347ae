use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::market::intent::{IntentKind, IntentRef, TradeIntent};
use crate::types::{CommodityId, LocationId, Participant, Price, Quantity};
use crate::world::World;

// === ORDER BOOK ===

/// One line of a book: a handle to the live intent plus its sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub handle: IntentRef,
    pub limit_price: Price,
    pub seq: u64,
}

impl From<&TradeIntent> for BookEntry {
    fn from(intent: &TradeIntent) -> Self {
        Self {
            handle: IntentRef::from(intent),
            limit_price: intent.limit_price,
            seq: intent.seq,
        }
    }
}

/// Active intents of `kind` pooled at `market`, minus those owned by `exclude`.
fn gather(
    world: &World,
    market: LocationId,
    kind: IntentKind,
    exclude: Option<Participant>,
) -> Vec<BookEntry> {
    let hub = Participant::Hub(market);
    let owners = world
        .eligible_agents_at(market)
        .into_iter()
        .map(Participant::Agent)
        .chain(std::iter::once(hub))
        .filter(|owner| Some(*owner) != exclude);

    let mut entries = Vec::new();
    for owner in owners {
        let Some(list) = world.intents_of(owner) else {
            continue;
        };
        entries.extend(list.active().filter(|i| i.kind == kind).map(BookEntry::from));
    }
    entries
}

/// Asks at `market`, lowest limit first, oldest first among equals.
pub fn build_sellers(world: &World, market: LocationId, exclude: Option<Participant>) -> Vec<BookEntry> {
    let mut sellers = gather(world, market, IntentKind::Sell, exclude);
    sellers.sort_by_key(|e| (e.limit_price, e.seq));
    sellers
}

/// Bids at `market`, highest limit first, oldest first among equals.
pub fn build_buyers(world: &World, market: LocationId, exclude: Option<Participant>) -> Vec<BookEntry> {
    let mut buyers = gather(world, market, IntentKind::Buy, exclude);
    buyers.sort_by_key(|e| (Reverse(e.limit_price), e.seq));
    buyers
}

// === MARKET REPORT ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct CommodityQuote {
    pub commodity: CommodityId,
    pub best_bid: Option<Price>,
    pub bid_depth: Quantity,
    pub best_ask: Option<Price>,
    pub ask_depth: Quantity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct MarketReport {
    pub quotes: Vec<CommodityQuote>,
}

/// What `viewer` can see of the book at `market`: never their own orders and
/// never orders placed as hidden from reports.
pub fn market_report(world: &World, market: LocationId, viewer: Option<Participant>) -> MarketReport {
    if !world.get_location(market).is_some_and(|l| l.kind.is_hub()) {
        return MarketReport::default();
    }

    let mut quotes: BTreeMap<CommodityId, CommodityQuote> = BTreeMap::new();
    let visible = |entry: &BookEntry| {
        world
            .intent(entry.handle)
            .filter(|i| !i.anonymity.hides_from_reports())
            .map(|i| (i.commodity, i.limit_price, i.quantity))
    };

    for (commodity, price, qty) in build_buyers(world, market, viewer).iter().filter_map(visible) {
        let quote = quotes.entry(commodity).or_insert_with(|| CommodityQuote {
            commodity,
            ..Default::default()
        });
        quote.best_bid = Some(quote.best_bid.map_or(price, |b| b.max(price)));
        quote.bid_depth += qty;
    }
    for (commodity, price, qty) in build_sellers(world, market, viewer).iter().filter_map(visible) {
        let quote = quotes.entry(commodity).or_insert_with(|| CommodityQuote {
            commodity,
            ..Default::default()
        });
        quote.best_ask = Some(quote.best_ask.map_or(price, |a| a.min(price)));
        quote.ask_depth += qty;
    }

    MarketReport {
        quotes: quotes.into_values().collect(),
    }
}
