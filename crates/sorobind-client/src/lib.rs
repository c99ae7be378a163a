//! Contract invocation engine for Soroban: build a call envelope, simulate
//! it, gate on the authorization the simulation demands, then sign, submit,
//! and poll with bounded exponential backoff.
//!
//! The engine is generic over its two collaborators, [`LedgerRpc`] and
//! [`WalletSigner`], so generated method stubs can run against the real
//! network or against fakes.

pub mod config;
pub mod error;
pub mod invoke;
pub mod rpc;
pub mod signer;
pub mod simulation;
pub mod transaction;

pub use config::NetworkConfig;
pub use error::{resolve_contract_error, InvokeError};
pub use invoke::{
    ContractClient, InvokeOutcome, InvokeRequest, PollPolicy, TransactionStatus, DEFAULT_BASE_FEE,
};
pub use rpc::{
    AccountInfo, GetTransactionResponse, JsonRpcClient, LedgerRpc, SendTransactionResponse,
};
pub use signer::{LocalKeySigner, WalletSigner};
pub use simulation::{
    classify_auth, parse_simulation, AuthRequirement, Simulation, SimulationOutcome,
};
