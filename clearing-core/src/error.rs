use crate::types::{AgentId, CommodityId, LocationId, Price, Quantity};

/// Validation failures of the exposed market operations.
///
/// Routine non-matches during clearing are not errors and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    #[error("Agent {0:?} not found")]
    UnknownAgent(AgentId),

    #[error("Location {0:?} not found")]
    UnknownLocation(LocationId),

    #[error("Location {0:?} is not a market and cannot trade as a hub")]
    NotAMarket(LocationId),

    #[error("Quantity must not be negative: quantity {quantity}, reserve {reserve}")]
    NegativeQuantity { quantity: Quantity, reserve: Quantity },

    #[error("Limit price must be at least 1, got {0}")]
    InvalidLimitPrice(Price),

    #[error("Commodity {0} is the currency and cannot be traded")]
    CurrencyNotTradable(CommodityId),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        MarketError::Config(err.to_string())
    }
}
