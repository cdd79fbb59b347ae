use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::market::{ClearingReport, IntentKind, Trade, TradeIntent};
use crate::tick::CycleSummary;
use crate::types::{Anonymity, CommodityId, KeyToU64, Participant, Price, Quantity};

// ============================================================================
// Snapshots - Flat, u64-keyed views for the JS side
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ParticipantView {
    pub id: u64,
    pub is_hub: bool,
}

impl From<Participant> for ParticipantView {
    fn from(p: Participant) -> Self {
        match p {
            Participant::Agent(id) => Self {
                id: id.to_u64(),
                is_hub: false,
            },
            Participant::Hub(id) => Self {
                id: id.to_u64(),
                is_hub: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct IntentSnapshot {
    pub owner: ParticipantView,
    pub kind: IntentKind,
    pub commodity: CommodityId,
    pub quantity: Quantity,
    pub limit_price: Price,
    pub reserve: Quantity,
    pub anonymity: Anonymity,
    pub seq: u64,
}

impl From<&TradeIntent> for IntentSnapshot {
    fn from(i: &TradeIntent) -> Self {
        Self {
            owner: i.owner.into(),
            kind: i.kind,
            commodity: i.commodity,
            quantity: i.quantity,
            limit_price: i.limit_price,
            reserve: i.reserve,
            anonymity: i.anonymity,
            seq: i.seq,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct IntentListSnapshot {
    pub intents: Vec<IntentSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct TradeSnapshot {
    pub market: u64,
    pub buyer: ParticipantView,
    pub seller: ParticipantView,
    pub commodity: CommodityId,
    pub quantity: Quantity,
    pub unit_price: Price,
    pub total_price: Quantity,
    pub tariff: Quantity,
}

impl From<&Trade> for TradeSnapshot {
    fn from(t: &Trade) -> Self {
        Self {
            market: t.market.to_u64(),
            buyer: t.buyer.into(),
            seller: t.seller.into(),
            commodity: t.commodity,
            quantity: t.quantity,
            unit_price: t.unit_price,
            total_price: t.total_price,
            tariff: t.tariff,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ClearingSnapshot {
    pub cycle: u64,
    pub trades: Vec<TradeSnapshot>,
    pub volume: Quantity,
}

impl ClearingSnapshot {
    pub fn from_report(cycle: u64, report: &ClearingReport) -> Self {
        Self {
            cycle,
            trades: report.trades.iter().map(TradeSnapshot::from).collect(),
            volume: report.volume(),
        }
    }
}

impl From<&CycleSummary> for ClearingSnapshot {
    fn from(summary: &CycleSummary) -> Self {
        Self {
            cycle: summary.cycle,
            trades: summary
                .reports
                .iter()
                .flat_map(|r| r.trades.iter().map(TradeSnapshot::from))
                .collect(),
            volume: summary.volume(),
        }
    }
}
