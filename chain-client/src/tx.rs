//! Transaction building and validation
//!
//! Normalizes a caller-supplied draft into the canonical wire object the
//! node expects: lowercase `0x` addresses, hex quantities, hex payload
//! data, and a small integer `type` tag selecting how the node treats
//! the payload. All validation happens here, before any network round
//! trip.

use crate::{ClientConfig, ClientError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Address length in bytes
pub const ADDRESS_BYTES: usize = 20;

/// Transaction hash length in bytes
pub const HASH_BYTES: usize = 32;

/// Transaction kind tags recognized by the node
///
/// The record kinds come from the node's content-record extension: the
/// payload is record content rather than contract input, and the node
/// tracks origin and ownership per content hash.
pub mod kind {
    /// Plain value transfer
    pub const TRANSFER: u8 = 0;

    /// Confirm a new piece of record content, establishing its origin
    pub const RECORD_CONFIRMATION: u8 = 3;

    /// Authorize another account over recorded content
    pub const RECORD_AUTHORIZATION: u8 = 4;

    /// Transfer ownership of recorded content
    pub const RECORD_TRANSFER: u8 = 5;
}

/// 20-byte account address
///
/// Parses `0x`-prefixed hex, case-insensitive; displays canonical
/// lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s)
            .ok_or_else(|| ClientError::InvalidAddress(format!("missing 0x prefix: {}", s)))?;
        if digits.len() != ADDRESS_BYTES * 2 {
            return Err(ClientError::InvalidAddress(format!(
                "expected {} hex chars, got {}: {}",
                ADDRESS_BYTES * 2,
                digits.len(),
                s
            )));
        }
        let bytes = hex::decode(digits)
            .map_err(|_| ClientError::InvalidAddress(format!("invalid hex: {}", s)))?;
        let mut out = [0u8; ADDRESS_BYTES];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 32-byte transaction hash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash([u8; HASH_BYTES]);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s).ok_or_else(|| {
            ClientError::Serialization(format!("transaction hash missing 0x prefix: {}", s))
        })?;
        let bytes = hex::decode(digits)
            .map_err(|_| ClientError::Serialization(format!("invalid transaction hash: {}", s)))?;
        if bytes.len() != HASH_BYTES {
            return Err(ClientError::Serialization(format!(
                "expected {}-byte transaction hash, got {} bytes",
                HASH_BYTES,
                bytes.len()
            )));
        }
        let mut out = [0u8; HASH_BYTES];
        out.copy_from_slice(&bytes);
        Ok(TxHash(out))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Encode UTF-8 text as canonical `0x`-prefixed lowercase hex
///
/// This is the single encoding path for payload data; the builder and
/// the client facade both route through it.
pub fn encode_text(text: &str) -> String {
    format!("0x{}", hex::encode(text.as_bytes()))
}

/// Decode a `0x`-prefixed (or bare) hex string to bytes
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits = strip_hex_prefix(s).unwrap_or(s);
    hex::decode(digits).map_err(|e| ClientError::Serialization(format!("invalid hex: {}", e)))
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Transaction value accepted as an integer or a numeric string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(u128),
    Text(String),
}

impl Amount {
    /// Parse to a non-negative integer
    ///
    /// Strings may be decimal or `0x`-prefixed hex quantities.
    pub fn parse(&self) -> Result<u128> {
        match self {
            Amount::Integer(n) => Ok(*n),
            Amount::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ClientError::InvalidAmount("empty amount".to_string()));
                }
                let parsed = match strip_hex_prefix(trimmed) {
                    Some(digits) => u128::from_str_radix(digits, 16),
                    None => trimmed.parse::<u128>(),
                };
                parsed.map_err(|_| {
                    ClientError::InvalidAmount(format!("not a non-negative integer: {}", s))
                })
            }
        }
    }
}

impl From<u128> for Amount {
    fn from(n: u128) -> Self {
        Amount::Integer(n)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

/// Raw transaction input, as supplied by a caller
///
/// Field names and shapes follow the node's `sendTransaction` argument
/// object; `data` given as plain text is hex-encoded during build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxDraft {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Amount>,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl TxDraft {
    /// Plain value transfer (kind 0)
    pub fn transfer(from: &str, to: &str, value: impl Into<Amount>) -> Self {
        Self {
            from: from.to_string(),
            to: Some(to.to_string()),
            value: Some(value.into()),
            kind: kind::TRANSFER,
            data: None,
        }
    }

    /// Payload-tagged submission carrying record content
    pub fn record(from: &str, kind: u8, data: &str) -> Self {
        Self {
            from: from.to_string(),
            to: None,
            value: None,
            kind,
            data: Some(data.to_string()),
        }
    }

    /// Set the recipient
    pub fn with_to(mut self, to: &str) -> Self {
        self.to = Some(to.to_string());
        self
    }
}

/// Canonical wire transaction, ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Hex quantity, e.g. `0x3b9aca00`
    pub value: String,
    #[serde(rename = "type")]
    pub kind: u8,
    /// Hex payload, `0x` when empty
    pub data: String,
}

/// Validate and normalize a draft into a canonical wire transaction
pub fn build(draft: &TxDraft, config: &ClientConfig) -> Result<TransactionRequest> {
    let from: Address = draft.from.parse()?;

    if !config.allowed_kinds.contains(&draft.kind) {
        return Err(ClientError::UnsupportedKind(draft.kind));
    }

    let to = match draft.to.as_deref() {
        Some(s) => Some(s.parse::<Address>()?),
        None => None,
    };
    if draft.kind == kind::TRANSFER && to.is_none() {
        return Err(ClientError::InvalidAddress(
            "value transfer requires a recipient".to_string(),
        ));
    }

    let value = match &draft.value {
        Some(amount) => amount.parse()?,
        None => 0,
    };

    let data = match draft.data.as_deref() {
        None | Some("") => "0x".to_string(),
        Some(s) if strip_hex_prefix(s).is_some() => {
            // already hex; validate and re-emit canonical lowercase
            format!("0x{}", hex::encode(decode_hex(s)?))
        }
        Some(text) => encode_text(text),
    };

    Ok(TransactionRequest {
        from,
        to,
        value: format!("0x{:x}", value),
        kind: draft.kind,
        data,
    })
}
