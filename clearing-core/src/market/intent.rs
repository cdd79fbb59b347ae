use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{Anonymity, CommodityId, Participant, Price, Quantity};

// === INTENTS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum IntentKind {
    Buy,
    Sell,
}

/// A standing order, re-evaluated every clearing cycle until filled or replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub owner: Participant,
    pub kind: IntentKind,
    pub commodity: CommodityId,
    /// Units still wanted (BUY) or offered (SELL)
    pub quantity: Quantity,
    /// Maximum for BUY, minimum for SELL
    pub limit_price: Price,
    /// Currency (BUY) or commodity units (SELL) the owner will not trade away
    pub reserve: Quantity,
    pub anonymity: Anonymity,
    /// World-wide creation order, lower is older
    pub seq: u64,
}

impl TradeIntent {
    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }
}

/// Handle to a live intent. An owner has at most one intent per (kind, commodity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntentRef {
    pub owner: Participant,
    pub kind: IntentKind,
    pub commodity: CommodityId,
}

impl From<&TradeIntent> for IntentRef {
    fn from(intent: &TradeIntent) -> Self {
        Self {
            owner: intent.owner,
            kind: intent.kind,
            commodity: intent.commodity,
        }
    }
}

/// The standing intents of one owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentList {
    intents: Vec<TradeIntent>,
}

impl IntentList {
    /// Insert, or overwrite the existing intent with the same kind and commodity.
    pub fn upsert(&mut self, intent: TradeIntent) {
        match self
            .intents
            .iter_mut()
            .find(|i| i.kind == intent.kind && i.commodity == intent.commodity)
        {
            Some(slot) => *slot = intent,
            None => self.intents.push(intent),
        }
    }

    pub fn get(&self, kind: IntentKind, commodity: CommodityId) -> Option<&TradeIntent> {
        self.intents
            .iter()
            .find(|i| i.kind == kind && i.commodity == commodity)
    }

    pub fn get_mut(&mut self, kind: IntentKind, commodity: CommodityId) -> Option<&mut TradeIntent> {
        self.intents
            .iter_mut()
            .find(|i| i.kind == kind && i.commodity == commodity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TradeIntent> {
        self.intents.iter()
    }

    /// Intents with quantity left. Inert ones stay stored but are skipped.
    pub fn active(&self) -> impl Iterator<Item = &TradeIntent> {
        self.intents.iter().filter(|i| i.is_active())
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
