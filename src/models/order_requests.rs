use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{MessageType, OrderType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOrder {
    pub instrument: String,
    pub price: f64,
    pub quantity: i32,
    pub is_buy: bool,
    pub order_type: OrderType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOrder {
    pub order_id: u32,
    pub instrument: String,
    pub new_price: f64,
    pub new_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrder {
    pub order_id: u32,
    pub instrument: String,
}

/// One order operation, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderMessage {
    AddOrder(AddOrder),
    ModifyOrder(ModifyOrder),
    CancelOrder(CancelOrder),
}

impl OrderMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            OrderMessage::AddOrder(_) => MessageType::AddOrder,
            OrderMessage::ModifyOrder(_) => MessageType::ModifyOrder,
            OrderMessage::CancelOrder(_) => MessageType::CancelOrder,
        }
    }

    /// The flat field record, without the `type` tag.
    pub fn fields(&self) -> Map<String, Value> {
        match self {
            OrderMessage::AddOrder(o) => create_add_order_message(
                &o.instrument,
                o.price,
                o.quantity,
                o.is_buy,
                &o.order_type.to_string(),
            ),
            OrderMessage::ModifyOrder(o) => {
                create_modify_order_message(o.order_id, &o.instrument, o.new_price, o.new_quantity)
            }
            OrderMessage::CancelOrder(o) => create_cancel_order_message(o.order_id, &o.instrument),
        }
    }
}

// The builders take the order type as a plain string so test data can carry
// values the server is expected to reject.
pub fn create_add_order_message(
    instrument: &str,
    price: f64,
    quantity: i32,
    is_buy: bool,
    order_type: &str,
) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("instrument".to_string(), instrument.into());
    record.insert("price".to_string(), price.into());
    record.insert("quantity".to_string(), quantity.into());
    record.insert("isBuy".to_string(), is_buy.into());
    record.insert("orderType".to_string(), order_type.into());
    record
}

pub fn create_modify_order_message(
    order_id: u32,
    instrument: &str,
    new_price: f64,
    new_quantity: i32,
) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("orderId".to_string(), order_id.into());
    record.insert("instrument".to_string(), instrument.into());
    record.insert("newPrice".to_string(), new_price.into());
    record.insert("newQuantity".to_string(), new_quantity.into());
    record
}

pub fn create_cancel_order_message(order_id: u32, instrument: &str) -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("orderId".to_string(), order_id.into());
    record.insert("instrument".to_string(), instrument.into());
    record
}
