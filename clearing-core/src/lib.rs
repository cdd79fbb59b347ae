// Market clearing engine for a persistent simulated world
//
// Module structure:
// - types       IDs, participants, location kinds, anonymity
// - config      Commodity names, currency, per-commodity side effects
// - error       Validation errors of the exposed operations
// - world       World aggregate: locations, agents, intents, notices
// - market/     Intents, market location, order books, eligibility,
//               second-price matching, settlement
// - notice      Trade notification text
// - tick        One clearing pass over every market per cycle
// - snapshot    Flat views handed across the WASM boundary

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod market;
pub mod notice;
pub mod snapshot;
pub mod tick;
pub mod types;
pub mod world;

#[cfg(feature = "instrument")]
pub use instrument;

pub use config::{ClearingConfig, CommodityEffect};
pub use error::MarketError;
pub use market::{
    BookEntry, ClearingReport, CommodityQuote, IntentKind, IntentList, IntentRef, MarketReport,
    Trade, TradeIntent, build_buyers, build_sellers, clear_market, eligible_quantity,
    is_legitimate_bid, market_of, market_report, resolve, settle,
};
pub use notice::{Notice, Recipient};
pub use snapshot::*;
pub use tick::{CycleSummary, run_clearing_cycle};
pub use types::*;
pub use world::{Agent, Capabilities, Location, MarketStats, World};

// ============================================================================
// WASM API - Exchange
// ============================================================================

fn js_error(err: MarketError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn participant(id: u64, is_hub: bool) -> Participant {
    if is_hub {
        Participant::Hub(LocationId::from_u64(id))
    } else {
        Participant::Agent(AgentId::from_u64(id))
    }
}

#[wasm_bindgen]
pub struct Exchange {
    world: World,
}

#[wasm_bindgen]
impl Exchange {
    /// Create an exchange, optionally configured from a JSON document
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Exchange, JsValue> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let config = match config_json {
            Some(json) => ClearingConfig::from_json(&json).map_err(js_error)?,
            None => ClearingConfig::default(),
        };
        Ok(Self {
            world: World::new(config),
        })
    }

    #[wasm_bindgen]
    pub fn get_cycle(&self) -> u64 {
        self.world.cycle
    }

    #[wasm_bindgen]
    pub fn add_location(
        &mut self,
        name: &str,
        kind: LocationKind,
        parent: Option<u64>,
    ) -> Result<u64, JsValue> {
        let parent = parent.map(LocationId::from_u64);
        self.world
            .add_location(name, kind, parent)
            .map(KeyToU64::to_u64)
            .ok_or_else(|| js_error(MarketError::UnknownLocation(parent.unwrap_or_default())))
    }

    /// Set who guards and taxes a market, and who administers it
    #[wasm_bindgen]
    pub fn configure_market(
        &mut self,
        location: u64,
        garrison: Option<u64>,
        tax_rate_pct: i64,
        administrator: Option<u64>,
    ) -> Result<(), JsValue> {
        let id = LocationId::from_u64(location);
        let loc = self
            .world
            .get_location_mut(id)
            .ok_or_else(|| js_error(MarketError::UnknownLocation(id)))?;
        loc.garrison = garrison.map(AgentId::from_u64);
        loc.tax_rate_pct = tax_rate_pct;
        loc.administrator = administrator.map(AgentId::from_u64);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn add_agent(&mut self, name: &str, location: u64, currency: i64) -> Result<u64, JsValue> {
        let location = LocationId::from_u64(location);
        let id = self
            .world
            .add_agent(name, location)
            .ok_or_else(|| js_error(MarketError::UnknownLocation(location)))?;
        if let Some(agent) = self.world.get_agent_mut(id) {
            agent.currency = currency;
        }
        Ok(id.to_u64())
    }

    #[wasm_bindgen]
    pub fn set_holding(&mut self, agent: u64, commodity: u32, quantity: i64) -> Result<(), JsValue> {
        let id = AgentId::from_u64(agent);
        let agent = self
            .world
            .get_agent_mut(id)
            .ok_or_else(|| js_error(MarketError::UnknownAgent(id)))?;
        agent.goods.insert(commodity, quantity);
        Ok(())
    }

    /// Create or replace a standing order
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen]
    pub fn submit_intent(
        &mut self,
        owner: u64,
        owner_is_hub: bool,
        kind: IntentKind,
        commodity: u32,
        quantity: i64,
        limit_price: i64,
        reserve: i64,
        anonymity: Anonymity,
    ) -> Result<(), JsValue> {
        self.world
            .submit_intent(
                participant(owner, owner_is_hub),
                kind,
                commodity,
                quantity,
                limit_price,
                reserve,
                anonymity,
            )
            .map(|_| ())
            .map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn clear_market(&mut self, location: u64) -> ClearingSnapshot {
        let report = self.world.clear_market(LocationId::from_u64(location));
        ClearingSnapshot::from_report(self.world.cycle, &report)
    }

    #[wasm_bindgen]
    pub fn clear_all_markets(&mut self) -> ClearingSnapshot {
        ClearingSnapshot::from(&self.world.clear_all_markets())
    }

    #[wasm_bindgen]
    pub fn list_standing_intents(&self, owner: u64, owner_is_hub: bool) -> IntentListSnapshot {
        IntentListSnapshot {
            intents: self
                .world
                .list_standing_intents(participant(owner, owner_is_hub))
                .iter()
                .map(IntentSnapshot::from)
                .collect(),
        }
    }

    #[wasm_bindgen]
    pub fn market_report(&self, location: u64, viewer: Option<u64>) -> MarketReport {
        let viewer = viewer.map(|id| Participant::Agent(AgentId::from_u64(id)));
        self.world.market_report(LocationId::from_u64(location), viewer)
    }

    /// Drain pending notices as a JS array
    #[wasm_bindgen]
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        let notices = self.world.take_notices();
        serde_wasm_bindgen::to_value(&notices).map_err(JsValue::from)
    }
}

impl Exchange {
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
