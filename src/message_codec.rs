//! JSON encoding of order messages.
//!
//! Outbound records are encoded as given. The parsing side mirrors the
//! matching server's acceptance rules and is only used to check payloads
//! before they go out.

use std::fmt;

use serde_json::{Map, Value};

use crate::models::{AddOrder, CancelOrder, MessageType, ModifyOrder, OrderMessage, OrderType};

/// Merge `{"type": message_type}` with `message_data` and encode it.
///
/// Record fields are inserted after the tag, so a `type` key inside the
/// record replaces it.
pub fn encode_message(
    message_type: &str,
    message_data: &Map<String, Value>,
) -> Result<String, serde_json::Error> {
    let mut message = Map::new();
    message.insert("type".to_string(), Value::String(message_type.to_string()));
    for (key, value) in message_data {
        message.insert(key.clone(), value.clone());
    }
    serde_json::to_string(&Value::Object(message))
}

#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    NotAnObject,
    MissingType,
    UnsupportedType(String),
    MissingField {
        message_type: MessageType,
        field: &'static str,
    },
    UnsupportedOrderType(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parsing error: {}", e),
            Self::NotAnObject => write!(f, "Invalid JSON format: not an object"),
            Self::MissingType => write!(f, "Missing or invalid 'type' field"),
            Self::UnsupportedType(t) => write!(f, "Unsupported message type: {}", t),
            Self::MissingField {
                message_type,
                field,
            } => write!(
                f,
                "Missing or invalid field '{}' for {}",
                field, message_type
            ),
            Self::UnsupportedOrderType(t) => write!(f, "Unsupported order type: {}", t),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err)
    }
}

/// Decode a payload into its flat record, `type` included.
pub fn decode_message(raw: &str) -> Result<Map<String, Value>, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(message) = value else {
        return Err(DecodeError::NotAnObject);
    };
    if !message.get("type").is_some_and(Value::is_string) {
        return Err(DecodeError::MissingType);
    }
    Ok(message)
}

/// Parse a payload into a typed message using the server's field rules.
pub fn parse_order_message(raw: &str) -> Result<OrderMessage, DecodeError> {
    let message = decode_message(raw)?;
    let type_name = message["type"].as_str().unwrap_or_default();
    let message_type: MessageType = type_name
        .parse()
        .map_err(|_| DecodeError::UnsupportedType(type_name.to_string()))?;
    let fields = Fields {
        message: &message,
        message_type,
    };

    match message_type {
        MessageType::AddOrder => {
            // Every field is checked before the order type is looked up.
            let instrument = fields.string("instrument")?;
            let price = fields.number("price")?;
            let quantity = fields.int("quantity")?;
            let is_buy = fields.boolean("isBuy")?;
            let order_type = fields.string("orderType")?;
            let order_type: OrderType = order_type
                .parse()
                .map_err(|_| DecodeError::UnsupportedOrderType(order_type.to_string()))?;
            Ok(OrderMessage::AddOrder(AddOrder {
                instrument: instrument.to_string(),
                price,
                quantity,
                is_buy,
                order_type,
            }))
        }
        MessageType::ModifyOrder => Ok(OrderMessage::ModifyOrder(ModifyOrder {
            order_id: fields.uint("orderId")?,
            instrument: fields.string("instrument")?.to_string(),
            new_price: fields.number("newPrice")?,
            new_quantity: fields.int("newQuantity")?,
        })),
        MessageType::CancelOrder => Ok(OrderMessage::CancelOrder(CancelOrder {
            order_id: fields.uint("orderId")?,
            instrument: fields.string("instrument")?.to_string(),
        })),
    }
}

struct Fields<'a> {
    message: &'a Map<String, Value>,
    message_type: MessageType,
}

impl<'a> Fields<'a> {
    fn missing(&self, field: &'static str) -> DecodeError {
        DecodeError::MissingField {
            message_type: self.message_type,
            field,
        }
    }

    fn string(&self, field: &'static str) -> Result<&'a str, DecodeError> {
        self.message
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing(field))
    }

    fn number(&self, field: &'static str) -> Result<f64, DecodeError> {
        self.message
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| self.missing(field))
    }

    fn int(&self, field: &'static str) -> Result<i32, DecodeError> {
        self.message
            .get(field)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.missing(field))
    }

    fn uint(&self, field: &'static str) -> Result<u32, DecodeError> {
        self.message
            .get(field)
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.missing(field))
    }

    fn boolean(&self, field: &'static str) -> Result<bool, DecodeError> {
        self.message
            .get(field)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.missing(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::create_add_order_message;
    use serde_json::json;

    #[test]
    fn test_encode_add_order_scenario() {
        let record = create_add_order_message("AAPL", 150.25, 100, true, "LIMIT");
        let payload = encode_message("ADD_ORDER", &record).unwrap();
        let decoded: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(
            decoded,
            json!({
                "type": "ADD_ORDER",
                "instrument": "AAPL",
                "price": 150.25,
                "quantity": 100,
                "isBuy": true,
                "orderType": "LIMIT"
            })
        );
    }

    #[test]
    fn test_encode_is_union_of_tag_and_record() {
        let mut record = Map::new();
        record.insert("a".to_string(), json!(1));
        record.insert("b".to_string(), json!("x"));
        record.insert("c".to_string(), Value::Null);

        let decoded = decode_message(&encode_message("WHATEVER", &record).unwrap()).unwrap();
        assert_eq!(decoded.len(), record.len() + 1);
        assert_eq!(decoded["type"], "WHATEVER");
        for (key, value) in &record {
            assert_eq!(&decoded[key.as_str()], value);
        }
    }

    #[test]
    fn test_record_type_field_wins() {
        let mut record = Map::new();
        record.insert("type".to_string(), json!("CANCEL_ORDER"));
        let payload = encode_message("ADD_ORDER", &record).unwrap();
        assert_eq!(payload, r#"{"type":"CANCEL_ORDER"}"#);
    }

    #[test]
    fn test_encode_empty_record() {
        let payload = encode_message("CANCEL_ORDER", &Map::new()).unwrap();
        assert_eq!(payload, r#"{"type":"CANCEL_ORDER"}"#);
    }

    #[test]
    fn test_decode_rejects_non_object_and_missing_type() {
        assert!(matches!(decode_message("[1,2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(decode_message(r#"{"type":5}"#), Err(DecodeError::MissingType)));
        assert!(matches!(decode_message("{not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_parse_modify_order() {
        let raw = r#"{"type":"MODIFY_ORDER","orderId":12345,"instrument":"AAPL","newPrice":155.5,"newQuantity":150}"#;
        let message = parse_order_message(raw).unwrap();
        assert_eq!(
            message,
            OrderMessage::ModifyOrder(ModifyOrder {
                order_id: 12345,
                instrument: "AAPL".to_string(),
                new_price: 155.5,
                new_quantity: 150,
            })
        );
    }

    #[test]
    fn test_parse_accepts_integer_price() {
        let raw = r#"{"type":"ADD_ORDER","instrument":"AAPL","price":150,"quantity":1,"isBuy":false,"orderType":"MARKET"}"#;
        match parse_order_message(raw).unwrap() {
            OrderMessage::AddOrder(order) => {
                assert_eq!(order.price, 150.0);
                assert_eq!(order.order_type, OrderType::Market);
                assert!(!order.is_buy);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let negative_id = r#"{"type":"CANCEL_ORDER","orderId":-1,"instrument":"AAPL"}"#;
        match parse_order_message(negative_id) {
            Err(DecodeError::MissingField { message_type, field }) => {
                assert_eq!(message_type, MessageType::CancelOrder);
                assert_eq!(field, "orderId");
            }
            other => panic!("unexpected result {:?}", other),
        }

        let fractional_qty = r#"{"type":"ADD_ORDER","instrument":"AAPL","price":1.0,"quantity":1.5,"isBuy":true,"orderType":"LIMIT"}"#;
        assert!(matches!(
            parse_order_message(fractional_qty),
            Err(DecodeError::MissingField { field: "quantity", .. })
        ));

        let bad_order_type = r#"{"type":"ADD_ORDER","instrument":"AAPL","price":1.0,"quantity":1,"isBuy":true,"orderType":"ICEBERG"}"#;
        let err = parse_order_message(bad_order_type).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported order type: ICEBERG");
    }

    #[test]
    fn test_missing_field_reported_before_bad_order_type() {
        let raw = r#"{"type":"ADD_ORDER","price":1.0,"quantity":1,"isBuy":true,"orderType":"ICEBERG"}"#;
        match parse_order_message(raw) {
            Err(DecodeError::MissingField { message_type, field }) => {
                assert_eq!(message_type, MessageType::AddOrder);
                assert_eq!(field, "instrument");
            }
            other => panic!("unexpected result {:?}", other),
        }

        let bad_is_buy = r#"{"type":"ADD_ORDER","instrument":"AAPL","price":1.0,"quantity":1,"isBuy":"yes","orderType":"ICEBERG"}"#;
        assert!(matches!(
            parse_order_message(bad_is_buy),
            Err(DecodeError::MissingField { field: "isBuy", .. })
        ));
    }

    #[test]
    fn test_payload_keeps_type_first_and_record_order() {
        let record = create_add_order_message("AAPL", 150.25, 100, true, "LIMIT");
        let payload = encode_message("ADD_ORDER", &record).unwrap();
        assert_eq!(
            payload,
            r#"{"type":"ADD_ORDER","instrument":"AAPL","price":150.25,"quantity":100,"isBuy":true,"orderType":"LIMIT"}"#
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = parse_order_message(r#"{"type":"QUOTE"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedType(ref t) if t == "QUOTE"));
    }
}
