//! # web3-probe Error
//!
//! Error types shared by the web3-probe crates. Provider failures arrive as
//! EIP-1193 / JSON-RPC error objects (`{ code, message }`); [`Web3Error::from_rpc`]
//! maps the well-known codes onto typed variants so callers can branch on
//! them instead of on raw integers.
//!
//! ## Example
//!
//! ```
//! use web3_probe_error::{ErrorCode, Web3Error};
//!
//! let err = Web3Error::from_rpc(4001, "User rejected the request.");
//! assert!(err.is_user_rejection());
//! assert_eq!(err.code(), ErrorCode::UserRejected);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED: i64 = 4001;
/// EIP-1193: the requested method and/or account has not been authorized.
pub const UNAUTHORIZED: i64 = 4100;
/// EIP-1193: the provider does not support the requested method.
pub const UNSUPPORTED_METHOD: i64 = 4200;
/// EIP-1193: the provider is disconnected from all chains.
pub const DISCONNECTED: i64 = 4900;
/// EIP-1193: the provider is not connected to the requested chain.
pub const CHAIN_DISCONNECTED: i64 = 4901;
/// JSON-RPC 2.0: method not found.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Errors raised while talking to an injected provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Web3Error {
    // ============ Provider (EIP-1193) Errors ============
    /// The user declined the request in the wallet prompt
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    /// The method or account has not been authorized by the user
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The provider does not implement the method (4200 or -32601)
    #[error("Unsupported method: {message}")]
    UnsupportedMethod {
        /// The code the provider used
        code: i64,
        /// Error message
        message: String,
    },

    /// The provider is disconnected from all chains
    #[error("Provider disconnected: {0}")]
    Disconnected(String),

    /// The provider is not connected to the requested chain
    #[error("Chain disconnected: {0}")]
    ChainDisconnected(String),

    /// Any other RPC error response
    #[error("RPC error: code={code}, message={message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    // ============ Local Errors ============
    /// An operation did not finish in time
    #[error("Operation '{operation}' timed out after {millis}ms")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// The timeout in milliseconds
        millis: u64,
    },

    /// Invalid account address
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The rejected input
        address: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid hex quantity in a response
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// The provider object could not carry the request at all
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for web3-probe operations
pub type Result<T> = std::result::Result<T, Web3Error>;

impl Web3Error {
    /// Builds an error from a provider error object.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            USER_REJECTED => Web3Error::UserRejected(message),
            UNAUTHORIZED => Web3Error::Unauthorized(message),
            UNSUPPORTED_METHOD | METHOD_NOT_FOUND => Web3Error::UnsupportedMethod { code, message },
            DISCONNECTED => Web3Error::Disconnected(message),
            CHAIN_DISCONNECTED => Web3Error::ChainDisconnected(message),
            code => Web3Error::Rpc { code, message },
        }
    }

    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Web3Error::UserRejected(_) => ErrorCode::UserRejected,
            Web3Error::Unauthorized(_) => ErrorCode::Unauthorized,
            Web3Error::UnsupportedMethod { .. } => ErrorCode::UnsupportedMethod,
            Web3Error::Disconnected(_) => ErrorCode::Disconnected,
            Web3Error::ChainDisconnected(_) => ErrorCode::ChainDisconnected,
            Web3Error::Rpc { .. } => ErrorCode::Rpc,
            Web3Error::Timeout { .. } => ErrorCode::Timeout,
            Web3Error::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            Web3Error::InvalidQuantity(_) => ErrorCode::InvalidQuantity,
            Web3Error::Json(_) => ErrorCode::Json,
            Web3Error::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Web3Error::Transport(_) => ErrorCode::Transport,
        }
    }

    /// Returns the raw provider code, if this error came from one
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Web3Error::UserRejected(_) => Some(USER_REJECTED),
            Web3Error::Unauthorized(_) => Some(UNAUTHORIZED),
            Web3Error::UnsupportedMethod { code, .. } => Some(*code),
            Web3Error::Disconnected(_) => Some(DISCONNECTED),
            Web3Error::ChainDisconnected(_) => Some(CHAIN_DISCONNECTED),
            Web3Error::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True if the user said no
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Web3Error::UserRejected(_))
    }

    /// True if the provider lacks the method
    pub fn is_unsupported_method(&self) -> bool {
        matches!(self, Web3Error::UnsupportedMethod { .. })
    }

    /// Returns true if repeating the request could succeed without user action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Web3Error::Disconnected(_)
                | Web3Error::ChainDisconnected(_)
                | Web3Error::Timeout { .. }
                | Web3Error::Transport(_)
        )
    }
}

impl From<serde_json::Error> for Web3Error {
    fn from(err: serde_json::Error) -> Self {
        Web3Error::Json(err.to_string())
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[repr(u32)]
pub enum ErrorCode {
    /// User rejected
    UserRejected = 1001,
    /// Unauthorized
    Unauthorized = 1002,
    /// Unsupported method
    UnsupportedMethod = 1003,
    /// Disconnected
    Disconnected = 2001,
    /// Chain disconnected
    ChainDisconnected = 2002,
    /// Other RPC error
    Rpc = 2003,
    /// Timeout
    Timeout = 3001,
    /// Invalid address
    InvalidAddress = 4001,
    /// Invalid quantity
    InvalidQuantity = 4002,
    /// JSON error
    Json = 4003,
    /// Invalid configuration
    InvalidConfig = 4004,
    /// Transport error
    Transport = 5001,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rpc_known_codes() {
        assert!(Web3Error::from_rpc(4001, "no").is_user_rejection());
        assert_eq!(Web3Error::from_rpc(4100, "x").code(), ErrorCode::Unauthorized);
        assert!(Web3Error::from_rpc(4200, "x").is_unsupported_method());
        assert!(Web3Error::from_rpc(-32601, "x").is_unsupported_method());
        assert_eq!(Web3Error::from_rpc(4900, "x").code(), ErrorCode::Disconnected);
        assert_eq!(Web3Error::from_rpc(4901, "x").code(), ErrorCode::ChainDisconnected);
    }

    #[test]
    fn test_unsupported_method_keeps_provider_code() {
        let eip1193 = Web3Error::from_rpc(4200, "not supported");
        let json_rpc = Web3Error::from_rpc(-32601, "method not found");

        assert_eq!(eip1193.rpc_code(), Some(4200));
        assert_eq!(json_rpc.rpc_code(), Some(-32601));
        assert_eq!(json_rpc.code(), ErrorCode::UnsupportedMethod);
        assert!(json_rpc.to_string().contains("method not found"));
    }

    #[test]
    fn test_from_rpc_unknown_code() {
        let err = Web3Error::from_rpc(-32000, "header not found");
        assert_eq!(
            err,
            Web3Error::Rpc {
                code: -32000,
                message: "header not found".into()
            }
        );
        assert_eq!(err.rpc_code(), Some(-32000));
        assert!(err.to_string().contains("header not found"));
    }

    #[test]
    fn test_rpc_code_local_errors() {
        let err = Web3Error::Timeout {
            operation: "eth_requestAccounts".into(),
            millis: 500,
        };
        assert_eq!(err.rpc_code(), None);
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_retryable() {
        assert!(Web3Error::Disconnected("x".into()).is_retryable());
        assert!(Web3Error::Transport("x".into()).is_retryable());
        assert!(!Web3Error::UserRejected("x".into()).is_retryable());
        assert!(!Web3Error::InvalidQuantity("x".into()).is_retryable());
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<u64, _> = serde_json::from_str("\"nope\"");
        let err: Web3Error = parse.unwrap_err().into();
        assert_eq!(err.code(), ErrorCode::Json);
    }
}
