use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order types accepted by the matching server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::Stop => "STOP",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIMIT" => Ok(OrderType::Limit),
            "MARKET" => Ok(OrderType::Market),
            "STOP" => Ok(OrderType::Stop),
            _ => Err(format!("Unsupported order type: {}", s)),
        }
    }
}

/// Value of the `type` discriminator on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    AddOrder,
    ModifyOrder,
    CancelOrder,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::AddOrder => "ADD_ORDER",
            MessageType::ModifyOrder => "MODIFY_ORDER",
            MessageType::CancelOrder => "CANCEL_ORDER",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD_ORDER" => Ok(MessageType::AddOrder),
            "MODIFY_ORDER" => Ok(MessageType::ModifyOrder),
            "CANCEL_ORDER" => Ok(MessageType::CancelOrder),
            _ => Err(format!("Unsupported message type: {}", s)),
        }
    }
}
