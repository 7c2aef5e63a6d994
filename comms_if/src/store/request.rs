//! # Shopping request parsing
//!
//! Requests reach the trolley as JSON objects, either through the remote
//! store's request queue or from a request script. A request is one of:
//!
//! - a shopping list: `{"request_id": "r1", "cart": {"pdt4": 2}}`
//! - a recall to the home position: `{"request_id": "r1", "action": "home"}`

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// Internal
use super::{Cart, ProductId};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A request submitted by a user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TrolleyRequest {
    /// Identifier the request's cart, status and confirmation flags are
    /// keyed by
    pub request_id: String,

    /// What the user asked for
    pub action: RequestAction,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The action carried by a request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum RequestAction {
    /// Return to the home position
    Home,

    /// Add these quantities to the request's cart and run the shopping trip
    Cart(Cart),
}

/// Possible request parsing errors.
#[derive(Debug, Error)]
pub enum RequestParseError {
    #[error("Request contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Request has no \"request_id\" string field")]
    MissingRequestId,

    #[error("Request action \"{0}\" is not recognised")]
    UnknownAction(String),

    #[error("Cart entry \"{0}\" does not have an integer quantity")]
    InvalidQuantity(String),

    #[error("Request has neither an \"action\" nor a \"cart\" field")]
    NoActionOrCart,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrolleyRequest {
    /// Parse a request from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, RequestParseError> {
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(RequestParseError::InvalidJson(e)),
        };

        let request_id = match val["request_id"].as_str() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(RequestParseError::MissingRequestId),
        };

        // An explicit action takes precedence over a cart
        if let Some(action) = val["action"].as_str() {
            return match action {
                "home" => Ok(TrolleyRequest {
                    request_id,
                    action: RequestAction::Home,
                }),
                other => Err(RequestParseError::UnknownAction(other.to_string())),
            };
        }

        if let Some(cart_obj) = val["cart"].as_object() {
            let mut cart = Cart::new();

            for (id, qty) in cart_obj.iter() {
                let qty = match qty.as_i64() {
                    Some(q) => q,
                    None => return Err(RequestParseError::InvalidQuantity(id.clone())),
                };

                cart.insert(ProductId::new(id), qty);
            }

            return Ok(TrolleyRequest {
                request_id,
                action: RequestAction::Cart(cart),
            });
        }

        Err(RequestParseError::NoActionOrCart)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_cart_request() {
        let req =
            TrolleyRequest::from_json(r#"{"request_id": "r1", "cart": {"pdt4": 2, "pdt1": 1}}"#)
                .unwrap();

        assert_eq!(req.request_id, "r1");

        match req.action {
            RequestAction::Cart(cart) => {
                assert_eq!(cart.get(&ProductId::new("pdt4")), Some(&2));
                assert_eq!(cart.get(&ProductId::new("pdt1")), Some(&1));
            }
            other => panic!("Expected a cart action, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_home_request() {
        let req = TrolleyRequest::from_json(r#"{"request_id": "r2", "action": "home"}"#).unwrap();

        assert!(matches!(req.action, RequestAction::Home));
    }

    #[test]
    fn test_parse_invalid_requests() {
        assert!(matches!(
            TrolleyRequest::from_json("not json"),
            Err(RequestParseError::InvalidJson(_))
        ));
        assert!(matches!(
            TrolleyRequest::from_json(r#"{"cart": {"pdt1": 1}}"#),
            Err(RequestParseError::MissingRequestId)
        ));
        assert!(matches!(
            TrolleyRequest::from_json(r#"{"request_id": "r1", "action": "dance"}"#),
            Err(RequestParseError::UnknownAction(_))
        ));
        assert!(matches!(
            TrolleyRequest::from_json(r#"{"request_id": "r1", "cart": {"pdt1": "two"}}"#),
            Err(RequestParseError::InvalidQuantity(_))
        ));
        assert!(matches!(
            TrolleyRequest::from_json(r#"{"request_id": "r1"}"#),
            Err(RequestParseError::NoActionOrCart)
        ));
    }
}
