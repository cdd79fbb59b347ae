use serde::{Deserialize, Serialize};

use crate::config::CommodityEffect;
use crate::market::intent::{IntentKind, IntentRef};
use crate::notice::{self, Recipient};
use crate::types::{AgentId, Anonymity, CommodityId, LocationId, Participant, Price, Quantity};
use crate::world::World;

// === TRADES ===

/// A settled trade as recorded in a clearing report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub market: LocationId,
    pub buyer: Participant,
    pub seller: Participant,
    pub commodity: CommodityId,
    pub quantity: Quantity,
    pub unit_price: Price,
    /// What the buyer paid, after any discount
    pub total_price: Quantity,
    /// Cut of `total_price` routed to the garrison
    pub tariff: Quantity,
}

impl Trade {
    pub fn seller_proceeds(&self) -> Quantity {
        self.total_price - self.tariff
    }
}

/// Location whose garrison and tax rate govern a trade between these parties.
fn trade_location(world: &World, buyer: Participant, seller: Participant) -> Option<LocationId> {
    match (buyer, seller) {
        (Participant::Hub(loc), _) | (_, Participant::Hub(loc)) => Some(loc),
        (Participant::Agent(id), _) => {
            let here = world.get_agent(id)?.location;
            Some(world.market_hub(here).unwrap_or(here))
        }
    }
}

/// `pct` percent of `amount`, rounded toward zero. `pct` is within 0..=100.
fn percent_of(amount: Quantity, pct: i64) -> Quantity {
    (i128::from(amount) * i128::from(pct) / 100) as Quantity
}

fn tariff_due(world: &World, market: LocationId, seller: Participant, total: Quantity) -> Quantity {
    let rate = world.tax_rate_pct(market);
    if !matches!(seller, Participant::Agent(_))
        || world.garrison_at(market).is_none()
        || rate <= 0
        || world.administers_market(seller, market)
    {
        return 0;
    }

    let tariff = percent_of(total, rate);
    if world.has_tax_avoidance(seller) {
        tariff / 2
    } else {
        tariff
    }
}

/// Execute one matched trade of `quantity` units at `unit_price`.
///
/// Returns None when nothing changes hands, including when the total does not
/// fit in a `Quantity`. Panics if the pair is malformed
/// or the transfer would leave a negative quantity or balance.
pub fn settle(
    world: &mut World,
    buyer: IntentRef,
    seller: IntentRef,
    unit_price: Price,
    quantity: Quantity,
) -> Option<Trade> {
    if quantity <= 0 {
        return None;
    }
    assert!(
        buyer.kind == IntentKind::Buy && seller.kind == IntentKind::Sell,
        "matched pair must be a buy against a sell: {buyer:?} / {seller:?}"
    );
    assert_eq!(
        buyer.commodity, seller.commodity,
        "matched pair must trade the same commodity"
    );
    assert_ne!(buyer.owner, seller.owner, "an owner cannot trade with itself");

    let commodity = buyer.commodity;
    let buyer_anonymity = world.intent(buyer)?.anonymity;
    let seller_anonymity = world.intent(seller)?.anonymity;
    let market = trade_location(world, buyer.owner, seller.owner)?;
    for party in [buyer.owner, seller.owner] {
        if let Participant::Agent(id) = party {
            world.get_agent(id)?;
        }
    }

    let mut total = unit_price.checked_mul(quantity)?;
    if seller.owner.is_hub() {
        let discount = world.trade_discount_pct(buyer.owner);
        total -= percent_of(total, discount);
    }
    let tariff = tariff_due(world, market, seller.owner, total);
    let garrison = world.garrison_at(market);

    // === TRANSFER ===

    for handle in [buyer, seller] {
        let intent = world.intent_mut(handle)?;
        intent.quantity -= quantity;
        assert!(
            intent.quantity >= 0,
            "intent quantity went negative after settlement: {handle:?}"
        );
    }

    if let Participant::Agent(id) = buyer.owner {
        if let Some(agent) = world.get_agent_mut(id) {
            agent.currency -= total;
            *agent.goods.entry(commodity).or_insert(0) += quantity;
            assert!(agent.currency >= 0, "buyer {id:?} overdrew currency");
        }
    }
    if let Participant::Agent(id) = seller.owner {
        if let Some(agent) = world.get_agent_mut(id) {
            agent.currency += total - tariff;
            assert!(agent.currency >= 0, "seller {id:?} went into debt selling {commodity}");
            let held = agent.goods.entry(commodity).or_insert(0);
            *held -= quantity;
            assert!(*held >= 0, "seller {id:?} oversold commodity {commodity}");
        }
    }
    if tariff > 0 {
        if let Some(agent) = garrison.and_then(|g| world.get_agent_mut(g)) {
            agent.currency += tariff;
        }
    }

    // === SIDE EFFECTS ===

    let effect = world.config.effect_for(commodity);
    if let Some(loc) = world.get_location_mut(market) {
        if effect == Some(CommodityEffect::PopulationShift) {
            if seller.owner.is_hub() {
                loc.population = (loc.population - quantity).max(0);
            } else if buyer.owner.is_hub() {
                loc.population += quantity;
            }
        }

        let stats = loc.stats.entry(commodity).or_default();
        stats.last_price = Some(unit_price);
        stats.cycle_volume += quantity;
        stats.total_volume += quantity;
        stats.trades += 1;
    }

    let trade = Trade {
        market,
        buyer: buyer.owner,
        seller: seller.owner,
        commodity,
        quantity,
        unit_price,
        total_price: total,
        tariff,
    };

    #[cfg(feature = "instrument")]
    {
        tracing::info!(
            target: "trade",
            cycle = world.cycle,
            market = ?market,
            commodity = commodity,
            quantity = quantity,
            unit_price = unit_price,
            total_price = total,
            tariff = tariff,
            hub_buyer = buyer.owner.is_hub(),
            hub_seller = seller.owner.is_hub(),
        );
        if tariff > 0 {
            tracing::info!(target: "tariff", cycle = world.cycle, market = ?market, tariff = tariff);
        }
    }

    notify(world, &trade, buyer_anonymity, seller_anonymity, garrison);
    Some(trade)
}

fn notify(
    world: &mut World,
    trade: &Trade,
    buyer_anonymity: Anonymity,
    seller_anonymity: Anonymity,
    garrison: Option<AgentId>,
) {
    let what = world.config.commodity_name(trade.commodity);
    let buyer_name = world.participant_name(trade.buyer);
    let seller_name = world.participant_name(trade.seller);
    let buyer_shown = notice::shown_name(&buyer_name, buyer_anonymity);
    let seller_shown = notice::shown_name(&seller_name, seller_anonymity);

    let mut outgoing = Vec::new();
    if let Participant::Agent(id) = trade.buyer {
        outgoing.push((
            Recipient::Agent(id),
            notice::bought_text(trade.quantity, &what, seller_shown, trade.total_price),
        ));
    }
    if let Participant::Agent(id) = trade.seller {
        outgoing.push((
            Recipient::Agent(id),
            notice::sold_text(trade.quantity, &what, buyer_shown, trade.seller_proceeds(), trade.tariff),
        ));
    }
    if let Some(garrison) = garrison.filter(|_| trade.tariff > 0) {
        outgoing.push((Recipient::Agent(garrison), notice::tariff_text(trade.tariff, seller_shown)));
    }
    if !buyer_anonymity.hides_from_reports() && !seller_anonymity.hides_from_reports() {
        outgoing.push((
            Recipient::Observers(trade.market),
            notice::observed_text(buyer_shown, trade.quantity, &what, seller_shown, trade.unit_price),
        ));
    }

    for (recipient, text) in outgoing {
        world.emit(recipient, text);
    }
}
