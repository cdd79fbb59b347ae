// World state for the market clearing engine

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::config::ClearingConfig;
use crate::error::MarketError;
use crate::market::{
    self, ClearingReport, IntentKind, IntentList, IntentRef, MarketReport, TradeIntent,
};
use crate::notice::{Notice, Recipient};
use crate::tick::{self, CycleSummary};
use crate::types::{
    AgentId, AgentStatus, Anonymity, CommodityId, LocationId, LocationKind, Participant, Price,
    Quantity,
};

// ============================================================================
// Agents
// ============================================================================

/// Traits of an agent that change what it pays or owes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Halves tariffs on sales
    pub tax_avoidance: bool,
    /// Percent off purchases from hub sellers
    pub trade_discount_pct: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub location: LocationId,
    pub status: AgentStatus,
    pub currency: Quantity,
    pub goods: HashMap<CommodityId, Quantity>,
    pub capabilities: Capabilities,
    pub intents: IntentList,
}

impl Agent {
    pub fn held(&self, commodity: CommodityId) -> Quantity {
        self.goods.get(&commodity).copied().unwrap_or(0)
    }
}

// ============================================================================
// Locations
// ============================================================================

/// Trade statistics for one commodity at one market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    pub last_price: Option<Price>,
    /// Units traded during the most recent clearing pass
    pub cycle_volume: Quantity,
    pub total_volume: Quantity,
    pub trades: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
    /// Enclosing location, None at the top of the map
    pub parent: Option<LocationId>,
    pub garrison: Option<AgentId>,
    pub tax_rate_pct: i64,
    /// Agent with administrative control over the market here
    pub administrator: Option<AgentId>,
    pub population: i64,
    /// Orders the location itself stands behind as hub
    pub intents: IntentList,
    pub stats: HashMap<CommodityId, MarketStats>,
}

// ============================================================================
// World
// ============================================================================

/// Complete state the clearing engine reads and mutates
#[derive(Debug, Clone)]
pub struct World {
    pub cycle: u64,
    pub config: ClearingConfig,
    pub locations: SlotMap<LocationId, Location>,
    pub agents: SlotMap<AgentId, Agent>,
    notices: Vec<Notice>,
    next_seq: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(ClearingConfig::default())
    }
}

impl World {
    pub fn new(config: ClearingConfig) -> Self {
        Self {
            cycle: 0,
            config,
            locations: SlotMap::with_key(),
            agents: SlotMap::with_key(),
            notices: Vec::new(),
            next_seq: 0,
        }
    }

    // === Location Management ===

    /// Add a location, optionally nested inside another. Returns None if the parent is unknown.
    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        kind: LocationKind,
        parent: Option<LocationId>,
    ) -> Option<LocationId> {
        if let Some(parent) = parent {
            if !self.locations.contains_key(parent) {
                return None;
            }
        }
        let name = name.into();
        Some(self.locations.insert_with_key(|id| Location {
            id,
            name,
            kind,
            parent,
            garrison: None,
            tax_rate_pct: 0,
            administrator: None,
            population: 0,
            intents: IntentList::default(),
            stats: HashMap::new(),
        }))
    }

    pub fn get_location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    pub fn get_location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(id)
    }

    // === Agent Management ===

    /// Add an agent at a location, returns its ID
    pub fn add_agent(&mut self, name: impl Into<String>, location: LocationId) -> Option<AgentId> {
        if !self.locations.contains_key(location) {
            return None;
        }
        let name = name.into();
        Some(self.agents.insert_with_key(|id| Agent {
            id,
            name,
            location,
            status: AgentStatus::Free,
            currency: 0,
            goods: HashMap::new(),
            capabilities: Capabilities::default(),
            intents: IntentList::default(),
        }))
    }

    pub fn get_agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Display name of a participant as used in notices
    pub fn participant_name(&self, who: Participant) -> String {
        match who {
            Participant::Agent(id) => self.agents.get(id).map(|a| a.name.clone()),
            Participant::Hub(id) => self.locations.get(id).map(|l| l.name.clone()),
        }
        .unwrap_or_else(|| "unknown".to_string())
    }

    // === Inventory & Capabilities ===

    /// Hubs hold an unlimited amount of everything.
    pub fn quantity_held(&self, owner: Participant, commodity: CommodityId) -> Quantity {
        match owner {
            Participant::Agent(id) => self.agents.get(id).map_or(0, |a| a.held(commodity)),
            Participant::Hub(_) => Quantity::MAX,
        }
    }

    pub fn currency_held(&self, owner: Participant) -> Quantity {
        match owner {
            Participant::Agent(id) => self.agents.get(id).map_or(0, |a| a.currency),
            Participant::Hub(_) => Quantity::MAX,
        }
    }

    pub fn has_tax_avoidance(&self, owner: Participant) -> bool {
        owner
            .agent()
            .and_then(|id| self.agents.get(id))
            .is_some_and(|a| a.capabilities.tax_avoidance)
    }

    pub fn trade_discount_pct(&self, owner: Participant) -> i64 {
        owner
            .agent()
            .and_then(|id| self.agents.get(id))
            .map_or(0, |a| a.capabilities.trade_discount_pct.clamp(0, 100))
    }

    // === Topology ===

    pub fn market_hub(&self, location: LocationId) -> Option<LocationId> {
        market::resolve(self, location)
    }

    pub fn garrison_at(&self, location: LocationId) -> Option<AgentId> {
        self.locations
            .get(location)?
            .garrison
            .filter(|g| self.agents.contains_key(*g))
    }

    pub fn tax_rate_pct(&self, location: LocationId) -> i64 {
        self.locations
            .get(location)
            .map_or(0, |l| l.tax_rate_pct.clamp(0, 100))
    }

    pub fn administers_market(&self, owner: Participant, location: LocationId) -> bool {
        match owner {
            Participant::Agent(id) => self
                .locations
                .get(location)
                .is_some_and(|l| l.administrator == Some(id)),
            Participant::Hub(hub) => hub == location,
        }
    }

    // === Presence ===

    /// Free agents whose position resolves to `market`, in insertion order.
    pub fn eligible_agents_at(&self, market: LocationId) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|(_, a)| a.status == AgentStatus::Free)
            .filter(|(_, a)| self.market_hub(a.location) == Some(market))
            .map(|(id, _)| id)
            .collect()
    }

    // === Intents ===

    pub fn intents_of(&self, owner: Participant) -> Option<&IntentList> {
        match owner {
            Participant::Agent(id) => self.agents.get(id).map(|a| &a.intents),
            Participant::Hub(id) => self.locations.get(id).map(|l| &l.intents),
        }
    }

    fn intents_of_mut(&mut self, owner: Participant) -> Option<&mut IntentList> {
        match owner {
            Participant::Agent(id) => self.agents.get_mut(id).map(|a| &mut a.intents),
            Participant::Hub(id) => self.locations.get_mut(id).map(|l| &mut l.intents),
        }
    }

    pub fn intent(&self, handle: IntentRef) -> Option<&TradeIntent> {
        self.intents_of(handle.owner)?
            .get(handle.kind, handle.commodity)
    }

    pub(crate) fn intent_mut(&mut self, handle: IntentRef) -> Option<&mut TradeIntent> {
        self.intents_of_mut(handle.owner)?
            .get_mut(handle.kind, handle.commodity)
    }

    /// Create or replace the owner's standing order for (kind, commodity).
    ///
    /// A quantity of 0 withdraws the order: it stays stored but never trades.
    /// Hub orders are only accepted from locations that are markets.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_intent(
        &mut self,
        owner: Participant,
        kind: IntentKind,
        commodity: CommodityId,
        quantity: Quantity,
        limit_price: Price,
        reserve: Quantity,
        anonymity: Anonymity,
    ) -> Result<IntentRef, MarketError> {
        if quantity < 0 || reserve < 0 {
            return Err(MarketError::NegativeQuantity { quantity, reserve });
        }
        if limit_price < 1 {
            return Err(MarketError::InvalidLimitPrice(limit_price));
        }
        if commodity == self.config.currency {
            return Err(MarketError::CurrencyNotTradable(commodity));
        }

        if let Participant::Hub(id) = owner {
            if market::market_of(self, owner).is_none() {
                return Err(if self.locations.contains_key(id) {
                    MarketError::NotAMarket(id)
                } else {
                    MarketError::UnknownLocation(id)
                });
            }
        }

        let seq = self.next_seq;
        let list = self.intents_of_mut(owner).ok_or(match owner {
            Participant::Agent(id) => MarketError::UnknownAgent(id),
            Participant::Hub(id) => MarketError::UnknownLocation(id),
        })?;
        let intent = TradeIntent {
            owner,
            kind,
            commodity,
            quantity,
            limit_price,
            reserve,
            anonymity,
            seq,
        };
        let handle = IntentRef::from(&intent);
        list.upsert(intent);
        self.next_seq += 1;

        Ok(handle)
    }

    /// Every intent the owner has on file, inert ones included.
    pub fn list_standing_intents(&self, owner: Participant) -> Vec<TradeIntent> {
        self.intents_of(owner)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    // === Clearing ===

    /// Run one full matching pass at `location`. No-op unless it is a hub.
    pub fn clear_market(&mut self, location: LocationId) -> ClearingReport {
        market::clear_market(self, location)
    }

    /// Clear every market once and advance the cycle counter.
    pub fn clear_all_markets(&mut self) -> CycleSummary {
        tick::run_clearing_cycle(self)
    }

    pub fn market_report(&self, location: LocationId, viewer: Option<Participant>) -> MarketReport {
        market::market_report(self, location, viewer)
    }

    // === Notices ===

    pub fn emit(&mut self, recipient: Recipient, text: impl Into<String>) {
        let notice = Notice {
            cycle: self.cycle,
            recipient,
            text: text.into(),
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "notice",
            cycle = notice.cycle,
            recipient = ?notice.recipient,
            text = notice.text.as_str(),
        );

        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
