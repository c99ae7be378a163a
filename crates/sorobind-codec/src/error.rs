//! Codec error types.

use std::fmt;

/// Errors that can occur while converting between wire and native values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The wire value carries a tag this codec does not convert.
    ///
    /// A hard error rather than a default: silently coercing an unknown tag
    /// risks data loss for financial values.
    UnsupportedTag(&'static str),
    /// Invalid base64 or structurally invalid XDR.
    MalformedWireFormat(String),
    /// A numeric value could not be parsed or does not fit its wire type.
    InvalidNumber {
        kind: &'static str,
        value: String,
        reason: String,
    },
    /// An address is not a valid G... account or C... contract strkey.
    InvalidAddress { address: String, reason: String },
    /// A string, symbol, bytes, vec, or map exceeds its wire size limit.
    Overlong(&'static str),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnsupportedTag(tag) => {
                write!(f, "unsupported wire value tag: {}", tag)
            }
            CodecError::MalformedWireFormat(msg) => {
                write!(f, "malformed wire format: {}", msg)
            }
            CodecError::InvalidNumber {
                kind,
                value,
                reason,
            } => write!(f, "invalid {} value '{}': {}", kind, value, reason),
            CodecError::InvalidAddress { address, reason } => {
                write!(f, "invalid address '{}': {}", address, reason)
            }
            CodecError::Overlong(what) => {
                write!(f, "{} exceeds its wire size limit", what)
            }
        }
    }
}

impl std::error::Error for CodecError {}
