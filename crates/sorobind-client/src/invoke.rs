//! The invocation engine: build, simulate, authorize, sign, submit, poll.

use std::time::{Duration, Instant};

use sorobind_codec::{from_xdr_base64, native_to_scval, Native};
use tracing::{debug, info, warn};

use crate::error::{resolve_contract_error, InvokeError};
use crate::rpc::{GetTransactionResponse, LedgerRpc};
use crate::signer::WalletSigner;
use crate::simulation::{classify_auth, parse_simulation, AuthRequirement, SimulationOutcome};
use crate::transaction::{assemble_transaction, build_invoke_envelope, envelope_to_base64};

/// Default base fee in stroops.
pub const DEFAULT_BASE_FEE: u32 = 100;

/// A single contract method call.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Contract method name
    pub method: String,
    /// Method arguments, in declaration order
    pub args: Vec<Native>,
    /// Base fee in stroops; resource fees from simulation are added on top
    pub fee: u32,
    /// When false, stop after simulation even if the call would write state
    pub sign_and_send: bool,
}

impl InvokeRequest {
    pub fn new(method: &str) -> Self {
        InvokeRequest {
            method: method.to_string(),
            args: Vec::new(),
            fee: DEFAULT_BASE_FEE,
            sign_and_send: true,
        }
    }

    pub fn arg(mut self, value: Native) -> Self {
        self.args.push(value);
        self
    }

    pub fn args(mut self, values: Vec<Native>) -> Self {
        self.args = values;
        self
    }

    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    pub fn sign_and_send(mut self, sign_and_send: bool) -> Self {
        self.sign_and_send = sign_and_send;
        self
    }
}

/// Where a submitted transaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Not yet observed in a closed ledger. Non-terminal: ask again later.
    NotFound,
    Success,
    Failed,
}

impl TransactionStatus {
    fn from_rpc(status: &str) -> TransactionStatus {
        match status {
            "SUCCESS" => TransactionStatus::Success,
            "FAILED" => TransactionStatus::Failed,
            _ => TransactionStatus::NotFound,
        }
    }
}

/// How an invocation ended.
#[derive(Debug, Clone)]
pub enum InvokeOutcome {
    /// The call terminated after simulation; no ledger write occurred.
    Simulated { result: Option<Native> },
    /// The call was signed and submitted.
    Committed {
        hash: String,
        status: TransactionStatus,
        result: Option<Native>,
        ledger: Option<u64>,
    },
}

/// Polling bounds for transaction confirmation.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Wall-clock deadline measured from submission
    pub timeout: Duration,
    /// First wait between polls; grows by half after every poll
    pub initial_interval_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            timeout: Duration::from_secs(10),
            initial_interval_ms: 1000,
        }
    }
}

/// Grow the wait interval by ratio 1.5, uncapped.
fn next_backoff(wait_ms: u64) -> u64 {
    wait_ms + wait_ms / 2
}

/// A client bound to one contract on one network.
///
/// Holds only immutable configuration; every `invoke` call owns its own
/// envelope, polling loop, and deadline, so a single client is safely
/// reusable across concurrent invocations.
pub struct ContractClient<R: LedgerRpc, S: WalletSigner> {
    rpc: R,
    signer: S,
    contract_id: String,
    network_passphrase: String,
    error_messages: Vec<String>,
    poll: PollPolicy,
}

impl<R: LedgerRpc, S: WalletSigner> ContractClient<R, S> {
    pub fn new(rpc: R, signer: S, contract_id: &str, network_passphrase: &str) -> Self {
        ContractClient {
            rpc,
            signer,
            contract_id: contract_id.to_string(),
            network_passphrase: network_passphrase.to_string(),
            error_messages: Vec::new(),
            poll: PollPolicy::default(),
        }
    }

    /// Set the contract's declared error table, ordered by error code.
    pub fn with_error_messages(mut self, messages: Vec<String>) -> Self {
        self.error_messages = messages;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Run one contract call end to end.
    ///
    /// Builds an envelope against the signer's account, simulates it, and
    /// either returns the simulated result (read-only calls, or
    /// `sign_and_send == false`) or assembles, signs, submits, and polls
    /// until a terminal status or the deadline.
    pub fn invoke(&self, request: &InvokeRequest) -> Result<InvokeOutcome, InvokeError> {
        if !self.signer.is_connected() {
            return Err(InvokeError::SignerUnavailable);
        }
        let source = self
            .signer
            .public_key()
            .ok_or(InvokeError::SignerUnconfigured)?;

        let account = self.rpc.get_account(&source)?;
        let sequence = account.sequence + 1;

        let mut args = Vec::with_capacity(request.args.len());
        for arg in &request.args {
            args.push(native_to_scval(arg)?);
        }

        let envelope = build_invoke_envelope(
            &source,
            &self.contract_id,
            &request.method,
            args,
            request.fee,
            sequence,
        )?;
        let envelope_b64 = envelope_to_base64(&envelope)?;

        debug!(method = %request.method, contract = %self.contract_id, "simulating call");
        let sim_json = self.rpc.simulate_transaction(&envelope_b64)?;
        let sim = match parse_simulation(&sim_json)? {
            SimulationOutcome::Success(sim) => sim,
            SimulationOutcome::Failed { error } => {
                return Err(resolve_contract_error(&error, &self.error_messages)
                    .unwrap_or(InvokeError::SimulationFailed(error)));
            }
        };

        // Read-only calls and explicit dry runs terminate here.
        if sim.auth.is_empty() || !request.sign_and_send {
            let result = decode_return_value(sim.return_value.as_deref())?;
            return Ok(InvokeOutcome::Simulated { result });
        }

        if let AuthRequirement::Unsupported(msg) = classify_auth(&sim.auth) {
            return Err(InvokeError::UnsupportedAuthorization(msg));
        }

        let assembled = assemble_transaction(
            envelope,
            &sim.transaction_data,
            &sim.auth,
            sim.min_resource_fee,
            request.fee,
        )?;
        let unsigned_b64 = envelope_to_base64(&assembled)?;
        let signed_b64 = self
            .signer
            .sign_transaction(&unsigned_b64, &self.network_passphrase)?;

        let sent = self.rpc.send_transaction(&signed_b64)?;
        if sent.status == "ERROR" {
            let message = sent
                .error_result_xdr
                .unwrap_or_else(|| "transaction rejected".to_string());
            return Err(
                resolve_contract_error(&message, &self.error_messages).unwrap_or(
                    InvokeError::SubmissionFailed {
                        status: sent.status,
                        message,
                    },
                ),
            );
        }
        info!(hash = %sent.hash, status = %sent.status, "transaction submitted");

        let response = self.poll_transaction(&sent.hash)?;
        let status = TransactionStatus::from_rpc(&response.status);

        // The polled return value is authoritative; the simulated one covers
        // nodes that omit it from getTransaction.
        let result = if status == TransactionStatus::Success {
            match &response.return_value {
                Some(b64) => decode_return_value(Some(b64))?,
                None => decode_return_value(sim.return_value.as_deref())?,
            }
        } else {
            None
        };

        Ok(InvokeOutcome::Committed {
            hash: sent.hash,
            status,
            result,
            ledger: response.ledger,
        })
    }

    /// Poll until the transaction leaves NOT_FOUND or the deadline passes.
    ///
    /// Deadline expiry is not an error: the last observed response is
    /// returned and the caller is expected to ask again later.
    fn poll_transaction(&self, hash: &str) -> Result<GetTransactionResponse, InvokeError> {
        let deadline = Instant::now() + self.poll.timeout;
        let mut wait_ms = self.poll.initial_interval_ms;

        let mut response = self.rpc.get_transaction(hash)?;
        while response.status == "NOT_FOUND" && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(wait_ms));
            wait_ms = next_backoff(wait_ms);
            response = self.rpc.get_transaction(hash)?;
        }

        if response.status == "NOT_FOUND" {
            warn!(
                hash = %hash,
                "transaction not confirmed before deadline; query its status manually later"
            );
        }

        Ok(response)
    }
}

fn decode_return_value(b64: Option<&str>) -> Result<Option<Native>, InvokeError> {
    match b64 {
        Some(b64) => Ok(Some(from_xdr_base64(b64)?)),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
