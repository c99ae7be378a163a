//! Ledger RPC capability and its JSON-RPC implementation.

use serde_json::{json, Value};

use crate::error::InvokeError;

/// Account state returned by the ledger.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// Account ID (G... address)
    pub account_id: String,
    /// Current sequence number
    pub sequence: i64,
}

/// Response from `sendTransaction`.
#[derive(Debug, Clone)]
pub struct SendTransactionResponse {
    /// Transaction hash
    pub hash: String,
    /// Status: "PENDING", "DUPLICATE", "ERROR", "TRY_AGAIN_LATER"
    pub status: String,
    /// Error result XDR (present when status is "ERROR")
    pub error_result_xdr: Option<String>,
}

/// Response from `getTransaction`.
#[derive(Debug, Clone)]
pub struct GetTransactionResponse {
    /// Status: "SUCCESS", "FAILED", "NOT_FOUND"
    pub status: String,
    /// Ledger number where the transaction was included
    pub ledger: Option<u64>,
    /// Host function return value, base64 XDR encoded
    pub return_value: Option<String>,
}

/// The RPC capability the invocation engine depends on.
///
/// Implementations must be reusable across concurrent invocations: all
/// methods take `&self` and no per-call state may be mutated.
pub trait LedgerRpc {
    /// Fetch account information (id + sequence number) from the network.
    fn get_account(&self, account_id: &str) -> Result<AccountInfo, InvokeError>;

    /// Submit an envelope for a side-effect-free dry run.
    fn simulate_transaction(&self, tx_xdr_base64: &str) -> Result<Value, InvokeError>;

    /// Submit a signed envelope for inclusion in the ledger.
    fn send_transaction(&self, tx_xdr_base64: &str)
        -> Result<SendTransactionResponse, InvokeError>;

    /// Poll transaction status by hash.
    fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse, InvokeError>;
}

/// JSON-RPC 2.0 client for a Soroban RPC endpoint.
pub struct JsonRpcClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl JsonRpcClient {
    /// Create a new RPC client pointing at the given URL.
    pub fn new(url: &str) -> Self {
        JsonRpcClient {
            client: reqwest::blocking::Client::new(),
            url: url.to_string(),
        }
    }

    /// Send a JSON-RPC request and return the parsed JSON body.
    fn send_request(&self, body: &Value) -> Result<Value, InvokeError> {
        let resp = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| InvokeError::Network(format!("reading response body: {}", e)))?;

        if !status.is_success() {
            return Err(InvokeError::Network(format!("HTTP {}: {}", status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| InvokeError::InvalidResponse(format!("invalid JSON: {}", e)))
    }
}

impl LedgerRpc for JsonRpcClient {
    fn get_account(&self, account_id: &str) -> Result<AccountInfo, InvokeError> {
        let body = build_jsonrpc_request("getAccount", json!({ "address": account_id }));
        let response = self.send_request(&body)?;
        parse_account_response(&response, account_id)
    }

    fn simulate_transaction(&self, tx_xdr_base64: &str) -> Result<Value, InvokeError> {
        let body = build_jsonrpc_request(
            "simulateTransaction",
            json!({ "transaction": tx_xdr_base64 }),
        );
        let response = self.send_request(&body)?;
        parse_result(&response)
    }

    fn send_transaction(
        &self,
        tx_xdr_base64: &str,
    ) -> Result<SendTransactionResponse, InvokeError> {
        let body =
            build_jsonrpc_request("sendTransaction", json!({ "transaction": tx_xdr_base64 }));
        let response = self.send_request(&body)?;
        parse_send_transaction_response(&response)
    }

    fn get_transaction(&self, hash: &str) -> Result<GetTransactionResponse, InvokeError> {
        let body = build_jsonrpc_request("getTransaction", json!({ "hash": hash }));
        let response = self.send_request(&body)?;
        parse_get_transaction_response(&response)
    }
}

/// Build a JSON-RPC 2.0 request body.
pub(crate) fn build_jsonrpc_request(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    })
}

/// Extract the `result` field, surfacing JSON-RPC level errors.
pub(crate) fn parse_result(response: &Value) -> Result<Value, InvokeError> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(InvokeError::RpcError { code, message });
    }

    let result = response
        .get("result")
        .ok_or_else(|| InvokeError::InvalidResponse("missing 'result' field".to_string()))?;

    Ok(result.clone())
}

/// Parse a `getAccount` response into `AccountInfo`.
pub(crate) fn parse_account_response(
    response: &Value,
    account_id: &str,
) -> Result<AccountInfo, InvokeError> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();

        // Account not found typically returns a specific error
        if message.contains("not found") || code == -32600 {
            return Err(InvokeError::AccountNotFound(account_id.to_string()));
        }
        return Err(InvokeError::RpcError { code, message });
    }

    let result = response
        .get("result")
        .ok_or_else(|| InvokeError::InvalidResponse("missing 'result' field".to_string()))?;

    let id = result
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or(account_id)
        .to_string();

    let sequence = result
        .get("sequence")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            InvokeError::InvalidResponse("missing or invalid 'sequence' field".to_string())
        })?;

    Ok(AccountInfo {
        account_id: id,
        sequence,
    })
}

/// Parse a `sendTransaction` response.
pub(crate) fn parse_send_transaction_response(
    response: &Value,
) -> Result<SendTransactionResponse, InvokeError> {
    let result = parse_result(response)?;

    let hash = result
        .get("hash")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let status = result
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let error_result_xdr = result
        .get("errorResultXdr")
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(SendTransactionResponse {
        hash,
        status,
        error_result_xdr,
    })
}

/// Parse a `getTransaction` response.
pub(crate) fn parse_get_transaction_response(
    response: &Value,
) -> Result<GetTransactionResponse, InvokeError> {
    let result = parse_result(response)?;

    let status = result
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let ledger = result.get("ledger").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    });

    let return_value = result
        .get("returnValue")
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(GetTransactionResponse {
        status,
        ledger,
        return_value,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
