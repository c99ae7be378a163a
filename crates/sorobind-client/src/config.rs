//! Network configuration: explicit values, environment fallbacks, defaults.

use crate::error::InvokeError;

/// Everything the engine needs to reach one contract on one network.
///
/// The core never hard-codes these; they are resolved once at setup and
/// passed in.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub network_passphrase: String,
    pub contract_id: String,
}

impl NetworkConfig {
    /// Resolve a configuration for a named network.
    ///
    /// Each field comes from, in order: the explicit argument, the
    /// `SOROBIND_*` environment variable, then the network default. The
    /// contract ID has no default and must come from one of the first two.
    pub fn resolve(
        network: &str,
        rpc_url: Option<&str>,
        contract_id: Option<&str>,
    ) -> Result<NetworkConfig, InvokeError> {
        let rpc_url = resolve_field(rpc_url, "SOROBIND_RPC_URL")
            .map(Ok)
            .unwrap_or_else(|| default_rpc_url(network))?;

        let network_passphrase = resolve_field(None, "SOROBIND_NETWORK_PASSPHRASE")
            .map(Ok)
            .unwrap_or_else(|| default_passphrase(network))?;

        let contract_id = resolve_field(contract_id, "SOROBIND_CONTRACT_ID").ok_or_else(|| {
            InvokeError::InvalidResponse(
                "no contract ID configured; pass one or set SOROBIND_CONTRACT_ID".to_string(),
            )
        })?;

        Ok(NetworkConfig {
            rpc_url,
            network_passphrase,
            contract_id,
        })
    }
}

fn resolve_field(explicit: Option<&str>, env_var: &str) -> Option<String> {
    if let Some(value) = explicit {
        return Some(value.to_string());
    }
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn default_rpc_url(network: &str) -> Result<String, InvokeError> {
    match network {
        "testnet" => Ok("https://soroban-testnet.stellar.org".to_string()),
        "mainnet" => Ok("https://soroban-rpc.mainnet.stellar.gateway.fm".to_string()),
        "futurenet" => Ok("https://rpc-futurenet.stellar.org".to_string()),
        other => Err(InvokeError::InvalidResponse(format!(
            "no default RPC URL for network '{}'; pass one or set SOROBIND_RPC_URL",
            other
        ))),
    }
}

fn default_passphrase(network: &str) -> Result<String, InvokeError> {
    match network {
        "testnet" => Ok("Test SDF Network ; September 2015".to_string()),
        "mainnet" => Ok("Public Global Stellar Network ; September 2015".to_string()),
        "futurenet" => Ok("Test SDF Future Network ; October 2022".to_string()),
        other => Err(InvokeError::InvalidResponse(format!(
            "no default passphrase for network '{}'; set SOROBIND_NETWORK_PASSPHRASE",
            other
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
