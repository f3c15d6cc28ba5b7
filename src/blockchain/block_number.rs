//! Block selector as it appears in JSON-RPC parameters.
//!
//! Accepts the named tags (`earliest`, `latest`, `pending`, `finalized`,
//! `safe`) or a `0x`-prefixed hex quantity. Tags are encoded as negative
//! sentinels so the type stays a plain integer.

use std::fmt;
use std::str::FromStr;

use alloy::eips::BlockNumberOrTag;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockNumber(pub i64);

impl BlockNumber {
    pub const SAFE: Self = Self(-4);
    pub const FINALIZED: Self = Self(-3);
    pub const LATEST: Self = Self(-2);
    pub const PENDING: Self = Self(-1);
    pub const EARLIEST: Self = Self(0);

    fn tag(&self) -> Option<&'static str> {
        match *self {
            Self::SAFE => Some("safe"),
            Self::FINALIZED => Some("finalized"),
            Self::LATEST => Some("latest"),
            Self::PENDING => Some("pending"),
            Self::EARLIEST => Some("earliest"),
            _ => None,
        }
    }
}

impl Default for BlockNumber {
    fn default() -> Self {
        Self::LATEST
    }
}

/// Errors from parsing a block selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockNumberError {
    #[error("empty hex string")]
    Empty,

    #[error("hex string without 0x prefix: {0}")]
    MissingPrefix(String),

    #[error("hex number with leading zero digits: {0}")]
    LeadingZero(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("hex number > 64 bits: {0}")]
    Overflow(String),

    #[error("block number larger than int64: {0}")]
    TooLarge(u64),
}

fn decode_quantity(input: &str) -> Result<u64, BlockNumberError> {
    if input.is_empty() {
        return Err(BlockNumberError::Empty);
    }
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| BlockNumberError::MissingPrefix(input.to_string()))?;
    if digits.is_empty() {
        return Err(BlockNumberError::InvalidHex(input.to_string()));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(BlockNumberError::LeadingZero(input.to_string()));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BlockNumberError::InvalidHex(input.to_string()));
    }
    if digits.len() > 16 {
        return Err(BlockNumberError::Overflow(input.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| BlockNumberError::InvalidHex(input.to_string()))
}

impl FromStr for BlockNumber {
    type Err = BlockNumberError;

    /// Parse a tag or hex quantity. Surrounding whitespace and one pair of
    /// double quotes are stripped first, so raw JSON tokens are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut input = s.trim();
        if input.len() >= 2 && input.starts_with('"') && input.ends_with('"') {
            input = &input[1..input.len() - 1];
        }

        match input {
            "earliest" => return Ok(Self::EARLIEST),
            "latest" => return Ok(Self::LATEST),
            "pending" => return Ok(Self::PENDING),
            "finalized" => return Ok(Self::FINALIZED),
            "safe" => return Ok(Self::SAFE),
            _ => {}
        }

        let number = decode_quantity(input)?;
        if number > i64::MAX as u64 {
            return Err(BlockNumberError::TooLarge(number));
        }
        Ok(Self(number as i64))
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => f.write_str(tag),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

impl<'de> Deserialize<'de> for BlockNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for BlockNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<BlockNumber> for BlockNumberOrTag {
    fn from(number: BlockNumber) -> Self {
        match number {
            BlockNumber::SAFE => BlockNumberOrTag::Safe,
            BlockNumber::FINALIZED => BlockNumberOrTag::Finalized,
            BlockNumber::LATEST => BlockNumberOrTag::Latest,
            BlockNumber::PENDING => BlockNumberOrTag::Pending,
            BlockNumber::EARLIEST => BlockNumberOrTag::Earliest,
            BlockNumber(n) => BlockNumberOrTag::Number(n as u64),
        }
    }
}
