//! Account addresses as returned by `eth_accounts` / `eth_requestAccounts`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};
use web3_probe_error::{Result, Web3Error};

/// A 20-byte account address.
///
/// Parses from hex with or without the `0x` prefix and displays in EIP-55
/// checksum form. All-lowercase and all-uppercase input is accepted as-is;
/// mixed-case input must carry a valid checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Wraps raw address bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parses a hex address string
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Web3Error::InvalidAddress {
            address: input.to_string(),
            reason: reason.to_string(),
        };

        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        if digits.len() != 40 {
            return Err(invalid("expected 40 hex digits"));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| invalid(&e.to_string()))?;
        let address = Self(bytes);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.checksum_digits() != digits {
            return Err(invalid("bad EIP-55 checksum"));
        }

        Ok(address)
    }

    /// Returns the EIP-55 checksummed form with `0x` prefix
    pub fn to_checksum(&self) -> String {
        format!("0x{}", self.checksum_digits())
    }

    fn checksum_digits(&self) -> String {
        let lower = hex::encode(self.0);

        let mut hasher = Keccak::v256();
        let mut hash = [0u8; 32];
        hasher.update(lower.as_bytes());
        hasher.finalize(&mut hash);

        lower
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let nibble = (hash[i / 2] >> if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = Web3Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors from EIP-55.
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for expected in CHECKSUMMED {
            let address = Address::parse(&expected.to_lowercase()).unwrap();
            assert_eq!(address.to_checksum(), expected);
        }
    }

    #[test]
    fn test_parse_accepts_checksummed() {
        for input in CHECKSUMMED {
            assert!(Address::parse(input).is_ok());
        }
    }

    #[test]
    fn test_parse_without_prefix() {
        let address = Address::parse("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(address.to_string(), CHECKSUMMED[0]);
    }

    #[test]
    fn test_parse_rejects_bad_checksum() {
        let err = Address::parse("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(Address::parse("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
    }

    #[test]
    fn test_serde_uses_checksum() {
        let address = Address::parse(CHECKSUMMED[1]).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED[1]));

        let back: Address = serde_json::from_str(&json.to_lowercase()).unwrap();
        assert_eq!(back, address);
    }
}
