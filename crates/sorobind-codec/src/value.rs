//! Native value model: the decoded counterpart of a tagged wire value.

use serde::Serialize;
use stellar_xdr::curr::ScVal;

/// A decoded contract-level value.
///
/// Every variant corresponds to one wire tag, so the tag is the type hint:
/// re-encoding a `Native` needs no extra schema information. Integers wider
/// than 32 bits always travel through the wide-integer path; 256-bit values
/// are carried as decimal strings since no native machine type holds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
#[serde(rename_all = "lowercase")]
pub enum Native {
    Void,
    Bool(bool),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    U128(u128),
    I128(i128),
    U256(String),
    I256(String),
    Address(String),
    String(String),
    Symbol(String),
    Bytes(Vec<u8>),
    Vec(Vec<Native>),
    Map(Vec<MapEntry>),
    /// Wire values carried through opaquely: executable references,
    /// timepoints, durations, and ledger-key nonces.
    #[serde(skip_serializing)]
    Opaque(Box<ScVal>),
}

/// A key-value entry in a decoded map.
///
/// Order is preserved from the wire; key uniqueness is guaranteed by the
/// ledger's map representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub key: Native,
    pub value: Native,
}

impl Native {
    /// Build a map entry list from (key, value) pairs.
    pub fn map_from_pairs(pairs: Vec<(Native, Native)>) -> Native {
        Native::Map(
            pairs
                .into_iter()
                .map(|(key, value)| MapEntry { key, value })
                .collect(),
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Native::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Native::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Native::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Native::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Native::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Native::U128(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Native::I128(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            Native::Address(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::String(v) | Native::Symbol(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Native::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec(&self) -> Option<&[Native]> {
        match self {
            Native::Vec(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[MapEntry]> {
        match self {
            Native::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a map value by key. Linear scan; wire maps are small.
    pub fn map_get(&self, key: &Native) -> Option<&Native> {
        self.as_map()?
            .iter()
            .find(|e| &e.key == key)
            .map(|e| &e.value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
