use crate::market::intent::{IntentKind, TradeIntent};
use crate::types::{Participant, Price, Quantity};
use crate::world::World;

/// How much of `intent` its owner can actually back at `unit_price`.
///
/// Buyers are capped by spendable currency, sellers by stock on hand, both
/// net of the intent's reserve. Hub intents are taken at face value.
pub fn eligible_quantity(world: &World, intent: &TradeIntent, unit_price: Price) -> Quantity {
    let requested = intent.quantity.max(0);
    if let Participant::Hub(_) = intent.owner {
        return requested;
    }

    match intent.kind {
        IntentKind::Buy => {
            if unit_price <= 0 {
                return requested;
            }
            let spendable = (world.currency_held(intent.owner) - intent.reserve).max(0);
            requested.min(spendable / unit_price)
        }
        IntentKind::Sell => {
            let spare = (world.quantity_held(intent.owner, intent.commodity) - intent.reserve).max(0);
            requested.min(spare)
        }
    }
}

/// A bid counts toward price formation only if its owner could fill at least
/// one unit at their own limit.
pub fn is_legitimate_bid(world: &World, intent: &TradeIntent) -> bool {
    intent.kind == IntentKind::Buy && eligible_quantity(world, intent, intent.limit_price) > 0
}
