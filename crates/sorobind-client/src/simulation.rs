//! Parse `simulateTransaction` results and classify authorization demands.

use serde_json::Value;
use stellar_xdr::curr::{Limits, ReadXdr, SorobanAuthorizationEntry, SorobanCredentials};

use crate::error::InvokeError;

/// A successful dry run of a contract call.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Return value of the call, base64 XDR encoded
    pub return_value: Option<String>,
    /// Authorization entries the call requires
    pub auth: Vec<SorobanAuthorizationEntry>,
    /// Base64 `SorobanTransactionData` (footprint + resources)
    pub transaction_data: String,
    /// Minimum resource fee in stroops
    pub min_resource_fee: u64,
    /// Diagnostic events, base64 XDR encoded
    pub events: Vec<String>,
    /// Ledger the simulation ran against
    pub latest_ledger: u64,
}

/// Outcome of a dry run: usable simulation or a definitive failure.
#[derive(Debug, Clone)]
pub enum SimulationOutcome {
    Success(Simulation),
    Failed { error: String },
}

/// What signing the simulated call demands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No authorization entries: a read-only call.
    None,
    /// A single entry satisfied by the transaction source's signature.
    SourceAccount,
    /// Multi-party or delegated authorization this engine does not handle.
    Unsupported(String),
}

/// Classify the auth entries returned by simulation.
///
/// Exactly one source-account-credentialed entry is the only shape we can
/// satisfy by signing the outer transaction. Anything else needs per-entry
/// signatures and is reported as unsupported rather than silently submitted
/// to fail on-chain.
pub fn classify_auth(entries: &[SorobanAuthorizationEntry]) -> AuthRequirement {
    if entries.is_empty() {
        return AuthRequirement::None;
    }

    if entries.len() > 1 {
        return AuthRequirement::Unsupported(format!(
            "{} authorization entries returned; only a single source-account entry is supported",
            entries.len()
        ));
    }

    match &entries[0].credentials {
        SorobanCredentials::SourceAccount => AuthRequirement::SourceAccount,
        SorobanCredentials::Address(_) => AuthRequirement::Unsupported(
            "address-credentialed (delegated) authorization is not supported".to_string(),
        ),
    }
}

/// Parse a simulateTransaction result JSON into a `SimulationOutcome`.
///
/// A `restorePreamble` in the response means ledger state must be restored
/// before the call can succeed; that is surfaced as a hard error since this
/// engine does not submit restore transactions.
pub fn parse_simulation(result: &Value) -> Result<SimulationOutcome, InvokeError> {
    if let Some(error) = result.get("error") {
        let error_str = error.as_str().unwrap_or("unknown simulation error");
        return Ok(SimulationOutcome::Failed {
            error: error_str.to_string(),
        });
    }

    if let Some(restore) = result.get("restorePreamble") {
        let preamble = serde_json::to_string(restore).unwrap_or_default();
        return Err(InvokeError::RestoreRequired(preamble));
    }

    let transaction_data = result
        .get("transactionData")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let min_resource_fee = result
        .get("minResourceFee")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let latest_ledger = result
        .get("latestLedger")
        .and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        })
        .unwrap_or(0);

    let events: Vec<String> = result
        .get("events")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|e| e.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();

    // First entry of the results array carries the return value and auth.
    let (return_value, auth_b64) =
        if let Some(first) = result.get("results").and_then(|v| v.as_array()).and_then(|a| a.first())
        {
            let ret = first.get("xdr").and_then(|v| v.as_str()).map(String::from);
            let auth_entries: Vec<String> = first
                .get("auth")
                .and_then(|v| v.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|e| e.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            (ret, auth_entries)
        } else {
            (None, vec![])
        };

    let mut auth = Vec::with_capacity(auth_b64.len());
    for entry_b64 in &auth_b64 {
        let entry = SorobanAuthorizationEntry::from_xdr_base64(entry_b64, Limits::none())
            .map_err(|e| InvokeError::Xdr(format!("auth entry: {}", e)))?;
        auth.push(entry);
    }

    Ok(SimulationOutcome::Success(Simulation {
        return_value,
        auth,
        transaction_data,
        min_resource_fee,
        events,
        latest_ledger,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stellar_xdr::curr::{
        ContractId, Hash, InvokeContractArgs, ScAddress, ScSymbol, ScVal,
        SorobanAddressCredentials, SorobanAuthorizedFunction, SorobanAuthorizedInvocation,
        Uint256, VecM, WriteXdr,
    };

    fn source_account_entry() -> SorobanAuthorizationEntry {
        SorobanAuthorizationEntry {
            credentials: SorobanCredentials::SourceAccount,
            root_invocation: SorobanAuthorizedInvocation {
                function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                    contract_address: ScAddress::Contract(ContractId(Hash([0u8; 32]))),
                    function_name: ScSymbol("transfer".to_string().try_into().unwrap()),
                    args: VecM::default(),
                }),
                sub_invocations: VecM::default(),
            },
        }
    }

    fn address_entry() -> SorobanAuthorizationEntry {
        let mut entry = source_account_entry();
        entry.credentials = SorobanCredentials::Address(SorobanAddressCredentials {
            address: ScAddress::Account(stellar_xdr::curr::AccountId(
                stellar_xdr::curr::PublicKey::PublicKeyTypeEd25519(Uint256([0u8; 32])),
            )),
            nonce: 1,
            signature_expiration_ledger: 100,
            signature: ScVal::Void,
        });
        entry
    }

    #[test]
    fn classify_no_entries_is_read_only() {
        assert_eq!(classify_auth(&[]), AuthRequirement::None);
    }

    #[test]
    fn classify_single_source_account_entry() {
        assert_eq!(
            classify_auth(&[source_account_entry()]),
            AuthRequirement::SourceAccount
        );
    }

    #[test]
    fn classify_multiple_entries_is_unsupported() {
        let req = classify_auth(&[source_account_entry(), source_account_entry()]);
        match req {
            AuthRequirement::Unsupported(msg) => {
                assert!(msg.contains("2 authorization entries"), "msg: {}", msg)
            }
            other => panic!("expected Unsupported, got {:?}", other),
        }
    }

    #[test]
    fn classify_address_credentials_is_unsupported() {
        let req = classify_auth(&[address_entry()]);
        match req {
            AuthRequirement::Unsupported(msg) => {
                assert!(msg.contains("delegated"), "msg: {}", msg)
            }
            other => panic!("expected Unsupported, got {:?}", other),
        }
    }

    #[test]
    fn parse_success_with_auth() {
        let auth_b64 = source_account_entry()
            .to_xdr_base64(Limits::none())
            .unwrap();
        let result = json!({
            "transactionData": "AAAA",
            "minResourceFee": "12345",
            "events": ["event1"],
            "results": [{
                "auth": [auth_b64],
                "xdr": "AAAB"
            }],
            "latestLedger": 999
        });
        match parse_simulation(&result).unwrap() {
            SimulationOutcome::Success(sim) => {
                assert_eq!(sim.return_value, Some("AAAB".to_string()));
                assert_eq!(sim.auth.len(), 1);
                assert_eq!(sim.min_resource_fee, 12345);
                assert_eq!(sim.transaction_data, "AAAA");
                assert_eq!(sim.events, vec!["event1"]);
                assert_eq!(sim.latest_ledger, 999);
            }
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[test]
    fn parse_success_without_results_array() {
        let result = json!({
            "transactionData": "",
            "minResourceFee": "0",
            "latestLedger": "77"
        });
        match parse_simulation(&result).unwrap() {
            SimulationOutcome::Success(sim) => {
                assert!(sim.return_value.is_none());
                assert!(sim.auth.is_empty());
                assert_eq!(sim.latest_ledger, 77);
            }
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[test]
    fn parse_failure() {
        let result = json!({
            "error": "host invocation failed: ContractError(3)"
        });
        match parse_simulation(&result).unwrap() {
            SimulationOutcome::Failed { error } => {
                assert!(error.contains("ContractError(3)"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn parse_restore_preamble_is_hard_error() {
        let result = json!({
            "restorePreamble": {
                "transactionData": "BBBB",
                "minResourceFee": "500"
            }
        });
        match parse_simulation(&result).unwrap_err() {
            InvokeError::RestoreRequired(preamble) => {
                assert!(preamble.contains("BBBB"), "preamble: {}", preamble)
            }
            other => panic!("expected RestoreRequired, got {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_malformed_auth_entry() {
        let result = json!({
            "results": [{
                "auth": ["!!not-xdr!!"],
                "xdr": "AAAB"
            }]
        });
        assert!(matches!(
            parse_simulation(&result),
            Err(InvokeError::Xdr(_))
        ));
    }
}
