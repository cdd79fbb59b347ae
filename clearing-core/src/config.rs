use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::types::CommodityId;

/// Location-level side effect triggered when a commodity changes hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommodityEffect {
    /// The commodity is drawn from (or returned to) the local population:
    /// a hub selling it shrinks the population, a hub buying it grows it.
    PopulationShift,
}

/// Engine-wide settings. Everything has a default so a partial JSON document loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearingConfig {
    /// Commodity that serves as currency. It is held as a balance, never traded.
    pub currency: CommodityId,
    /// Display names used in notices
    pub commodity_names: HashMap<CommodityId, String>,
    /// Per-commodity side effects applied at settlement
    pub effects: HashMap<CommodityId, CommodityEffect>,
}

impl Default for ClearingConfig {
    fn default() -> Self {
        Self {
            currency: 1,
            commodity_names: HashMap::new(),
            effects: HashMap::new(),
        }
    }
}

impl ClearingConfig {
    pub fn from_json(json: &str) -> Result<Self, MarketError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_name(mut self, commodity: CommodityId, name: impl Into<String>) -> Self {
        self.commodity_names.insert(commodity, name.into());
        self
    }

    pub fn with_effect(mut self, commodity: CommodityId, effect: CommodityEffect) -> Self {
        self.effects.insert(commodity, effect);
        self
    }

    pub fn commodity_name(&self, commodity: CommodityId) -> String {
        self.commodity_names
            .get(&commodity)
            .cloned()
            .unwrap_or_else(|| format!("commodity #{commodity}"))
    }

    pub fn effect_for(&self, commodity: CommodityId) -> Option<CommodityEffect> {
        self.effects.get(&commodity).copied()
    }
}
