use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct LocationId;
    pub struct AgentId;
}

pub type CommodityId = u32;
pub type Price = i64;
pub type Quantity = i64;

/// Trait for converting SlotMap keys to u64 for WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
    fn from_u64(raw: u64) -> Self;
}

impl KeyToU64 for LocationId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }

    fn from_u64(raw: u64) -> Self {
        slotmap::KeyData::from_ffi(raw).into()
    }
}

impl KeyToU64 for AgentId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }

    fn from_u64(raw: u64) -> Self {
        slotmap::KeyData::from_ffi(raw).into()
    }
}

// ============================================================================
// Participant - Who owns a standing intent
// ============================================================================

/// Owner of a trade intent.
///
/// Agents hold finite currency and goods. A hub is a market location trading
/// on its own account: an unlimited source and sink that is always eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participant {
    Agent(AgentId),
    Hub(LocationId),
}

impl Participant {
    pub fn is_hub(&self) -> bool {
        matches!(self, Participant::Hub(_))
    }

    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Participant::Agent(id) => Some(*id),
            Participant::Hub(_) => None,
        }
    }
}

// ============================================================================
// Location Kind
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum LocationKind {
    Region,
    City,
    /// Dedicated trading sub-location inside a larger place
    TradingPost,
    Building,
    Ship,
}

impl LocationKind {
    /// Cities and trading posts pool the orders of everyone inside them.
    pub fn is_hub(&self) -> bool {
        matches!(self, LocationKind::City | LocationKind::TradingPost)
    }
}

// ============================================================================
// Agent Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum AgentStatus {
    #[default]
    Free,
    Prisoner,
    InTransit,
}

// ============================================================================
// Anonymity - How much a trade reveals about its parties
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Anonymity {
    #[default]
    Open,
    /// Name replaced by "someone" for the counterparty and observers
    HideIdentity,
    /// Identity hidden and the trade left out of location reports
    HideFromReports,
}

impl Anonymity {
    pub fn hides_identity(&self) -> bool {
        !matches!(self, Anonymity::Open)
    }

    pub fn hides_from_reports(&self) -> bool {
        matches!(self, Anonymity::HideFromReports)
    }
}
