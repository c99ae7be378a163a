//! Invocation error types and contract-error resolution.

use std::fmt;

use sorobind_codec::CodecError;

/// Errors surfaced by the invocation engine.
#[derive(Debug, Clone)]
pub enum InvokeError {
    /// The wallet signer is not connected.
    SignerUnavailable,
    /// The wallet signer is connected but returned no public key.
    SignerUnconfigured,
    /// Source account not found on the network.
    AccountNotFound(String),
    /// simulateTransaction reported an error; no retry is attempted.
    SimulationFailed(String),
    /// State restoration needed before this call can succeed.
    RestoreRequired(String),
    /// Multi-party or delegated authorization was requested by simulation.
    /// Explicitly reported so operators can distinguish "not implemented"
    /// from a network failure.
    UnsupportedAuthorization(String),
    /// sendTransaction rejected the envelope.
    SubmissionFailed { status: String, message: String },
    /// The contract rejected the call with a declared error code.
    ContractError { code: u32, message: String },
    /// Transaction signing failure.
    SigningFailed(String),
    /// HTTP / network failure.
    Network(String),
    /// JSON-RPC error response from the node.
    RpcError { code: i64, message: String },
    /// Unexpected response format from the RPC collaborator.
    InvalidResponse(String),
    /// XDR serialization/deserialization error.
    Xdr(String),
    /// Argument or result value conversion failure.
    Codec(CodecError),
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::SignerUnavailable => write!(f, "wallet signer not connected"),
            InvokeError::SignerUnconfigured => {
                write!(f, "wallet signer returned no public key")
            }
            InvokeError::AccountNotFound(addr) => write!(f, "account not found: {}", addr),
            InvokeError::SimulationFailed(msg) => write!(f, "simulation failed: {}", msg),
            InvokeError::RestoreRequired(preamble) => {
                write!(
                    f,
                    "state restoration required before this call can succeed (restorePreamble: {})",
                    preamble
                )
            }
            InvokeError::UnsupportedAuthorization(msg) => {
                write!(f, "unsupported authorization: {}", msg)
            }
            InvokeError::SubmissionFailed { status, message } => {
                write!(f, "submission failed (status {}): {}", status, message)
            }
            InvokeError::ContractError { code, message } => {
                write!(f, "contract error {}: {}", code, message)
            }
            InvokeError::SigningFailed(msg) => write!(f, "signing failed: {}", msg),
            InvokeError::Network(msg) => write!(f, "network error: {}", msg),
            InvokeError::RpcError { code, message } => {
                write!(f, "RPC error (code {}): {}", code, message)
            }
            InvokeError::InvalidResponse(msg) => write!(f, "invalid RPC response: {}", msg),
            InvokeError::Xdr(msg) => write!(f, "XDR error: {}", msg),
            InvokeError::Codec(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InvokeError {}

impl From<CodecError> for InvokeError {
    fn from(e: CodecError) -> Self {
        InvokeError::Codec(e)
    }
}

impl From<reqwest::Error> for InvokeError {
    fn from(e: reqwest::Error) -> Self {
        InvokeError::Network(e.to_string())
    }
}

/// Resolve a `ContractError(N)` pattern in a failure message against the
/// contract's declared error table.
///
/// Returns `None` when the pattern is absent or the code is out of range of
/// the table; the raw failure is surfaced instead in that case.
pub fn resolve_contract_error(message: &str, table: &[String]) -> Option<InvokeError> {
    const PATTERN: &str = "ContractError(";

    let start = message.find(PATTERN)? + PATTERN.len();
    let rest = &message[start..];
    let end = rest.find(')')?;
    let code: u32 = rest[..end].parse().ok()?;

    let declared = table.get(code as usize)?;
    Some(InvokeError::ContractError {
        code,
        message: declared.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
