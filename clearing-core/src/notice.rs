// Trade notifications, rendered with each party's anonymity in mind

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, Anonymity, LocationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    Agent(AgentId),
    /// Everyone watching the market at a location
    Observers(LocationId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub cycle: u64,
    pub recipient: Recipient,
    pub text: String,
}

const UNNAMED: &str = "someone";

/// Name as shown to anyone other than the party itself.
pub fn shown_name(name: &str, anonymity: Anonymity) -> &str {
    if anonymity.hides_identity() { UNNAMED } else { name }
}

pub fn bought_text(qty: i64, what: &str, seller: &str, total: i64) -> String {
    format!("Bought {qty} {what} from {seller} for {total} gold.")
}

pub fn sold_text(qty: i64, what: &str, buyer: &str, net: i64, tariff: i64) -> String {
    if tariff > 0 {
        format!("Sold {qty} {what} to {buyer} for {net} gold after {tariff} gold in tariffs.")
    } else {
        format!("Sold {qty} {what} to {buyer} for {net} gold.")
    }
}

pub fn observed_text(buyer: &str, qty: i64, what: &str, seller: &str, price: i64) -> String {
    format!("{buyer} bought {qty} {what} from {seller} at {price} gold each.")
}

pub fn tariff_text(tariff: i64, seller: &str) -> String {
    format!("Collected {tariff} gold in tariffs from {seller}.")
}
