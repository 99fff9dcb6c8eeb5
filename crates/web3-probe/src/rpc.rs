//! JSON-RPC 2.0 envelopes and hex quantity helpers.
//!
//! EIP-1193 providers take `{ method, params }` directly, but legacy
//! providers only expose `sendAsync(payload, callback)` with full JSON-RPC
//! envelopes, so both shapes live here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use web3_probe_error::{Result, Web3Error};

/// RPC request payload
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<T: Serialize> {
    /// JSON-RPC version
    pub jsonrpc: &'static str,
    /// Method name
    pub method: String,
    /// Parameters
    pub params: T,
    /// Request ID
    pub id: u64,
}

impl<T: Serialize> JsonRpcRequest<T> {
    /// Creates a new JSON-RPC request
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// RPC response payload
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct JsonRpcResponse<T = Value> {
    /// Response ID
    #[serde(default)]
    pub id: Option<Value>,
    /// Result (if successful); `Some(null)` when the result is a JSON `null`
    #[serde(default, deserialize_with = "present")]
    pub result: Option<T>,
    /// Error (if failed)
    pub error: Option<JsonRpcError>,
}

impl<T> JsonRpcResponse<T> {
    /// Collapses the envelope into the result or a typed error
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        self.result.ok_or_else(|| Web3Error::Rpc {
            code: -1,
            message: "No result in response".to_string(),
        })
    }
}

/// Keeps a present `result` field, even `null`, apart from a missing one
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// RPC error object, also the shape of EIP-1193 `ProviderRpcError`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    #[serde(default)]
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<JsonRpcError> for Web3Error {
    fn from(err: JsonRpcError) -> Self {
        Web3Error::from_rpc(err.code, err.message)
    }
}

/// Parses a `0x`-prefixed hex quantity
pub fn parse_quantity(value: &str) -> Result<u128> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| Web3Error::InvalidQuantity(format!("missing 0x prefix: {value}")))?;
    if digits.is_empty() {
        return Err(Web3Error::InvalidQuantity(format!("no digits: {value}")));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Web3Error::InvalidQuantity(format!("not a hex number: {value}")));
    }
    u128::from_str_radix(digits, 16).map_err(|e| Web3Error::InvalidQuantity(format!("{value}: {e}")))
}

/// Parses a hex quantity that must fit in a `u64`
pub fn parse_quantity_u64(value: &str) -> Result<u64> {
    let wide = parse_quantity(value)?;
    u64::try_from(wide).map_err(|_| Web3Error::InvalidQuantity(format!("{value} overflows u64")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_rpc_request() {
        let request = JsonRpcRequest::new("eth_chainId", Vec::<()>::new(), 7);

        assert_eq!(request.jsonrpc, "2.0");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({"jsonrpc": "2.0", "method": "eth_chainId", "params": [], "id": 7})
        );
    }

    #[test]
    fn test_response_result() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": "0x1"})).unwrap();
        assert_eq!(response.into_result().unwrap(), json!("0x1"));
    }

    #[test]
    fn test_response_error_maps_code() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 4001, "message": "User denied account authorization"}
        }))
        .unwrap();
        assert!(response.into_result().unwrap_err().is_user_rejection());
    }

    #[test]
    fn test_response_null_result() {
        // eth_getTransactionReceipt answers null while the tx is pending
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_response_missing_result() {
        let response: JsonRpcResponse = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(response.into_result().is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x1").unwrap(), 1);
        assert_eq!(parse_quantity("0xde0b6b3a7640000").unwrap(), 1_000_000_000_000_000_000);
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("12").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_parse_quantity_rejects_sign() {
        assert!(parse_quantity("0x+1").is_err());
        assert!(parse_quantity("0x-1").is_err());
        assert!(parse_quantity("0x 1").is_err());
    }

    #[test]
    fn test_parse_quantity_u64_overflow() {
        assert_eq!(parse_quantity_u64("0xffffffffffffffff").unwrap(), u64::MAX);
        assert!(parse_quantity_u64("0x10000000000000000").is_err());
    }
}
