//! Build and assemble Stellar `TransactionEnvelope`s for contract calls.

use stellar_xdr::curr::{
    ContractId, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits, Memo,
    MuxedAccount, Operation, OperationBody, Preconditions, ReadXdr, ScAddress, ScSymbol, ScVal,
    SequenceNumber, SorobanAuthorizationEntry, SorobanTransactionData, Transaction,
    TransactionEnvelope, TransactionExt, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

use crate::error::InvokeError;

/// Build an unsigned `TransactionEnvelope` invoking `method` on `contract_id`.
///
/// The resulting envelope has no signatures and no preconditions and is
/// suitable for `simulateTransaction`.
pub fn build_invoke_envelope(
    source_account: &str,
    contract_id: &str,
    method: &str,
    args: Vec<ScVal>,
    fee: u32,
    sequence_number: i64,
) -> Result<TransactionEnvelope, InvokeError> {
    let contract_address = contract_address_from_string(contract_id)?;

    let function_name: ScSymbol = method
        .to_string()
        .try_into()
        .map_err(|e| InvokeError::Xdr(format!("method name: {:?}", e)))?;

    let invoke_args = InvokeContractArgs {
        contract_address,
        function_name,
        args: args
            .try_into()
            .map_err(|e| InvokeError::Xdr(format!("args: {}", e)))?,
    };

    let invoke_op = InvokeHostFunctionOp {
        host_function: HostFunction::InvokeContract(invoke_args),
        auth: VecM::default(),
    };

    let operation = Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(invoke_op),
    };

    let operations = vec![operation]
        .try_into()
        .map_err(|e| InvokeError::Xdr(format!("operations: {}", e)))?;

    let source_key = account_key_from_string(source_account)?;

    let tx = Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(source_key)),
        fee,
        seq_num: SequenceNumber(sequence_number),
        cond: Preconditions::None,
        memo: Memo::None,
        operations,
        ext: TransactionExt::V0,
    };

    Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    }))
}

/// Assemble a transaction by applying simulation results.
///
/// Takes the unsigned envelope and the simulation output, then:
/// 1. Sets `SorobanTransactionData` on the transaction extension
/// 2. Updates the fee to `base_fee + min_resource_fee`
/// 3. Populates auth entries on the `InvokeHostFunctionOp`
pub fn assemble_transaction(
    envelope: TransactionEnvelope,
    transaction_data_b64: &str,
    auth_entries: &[SorobanAuthorizationEntry],
    min_resource_fee: u64,
    base_fee: u32,
) -> Result<TransactionEnvelope, InvokeError> {
    let TransactionEnvelope::Tx(mut v1) = envelope else {
        return Err(InvokeError::Xdr("expected Tx envelope variant".to_string()));
    };

    if !transaction_data_b64.is_empty() {
        let soroban_data =
            SorobanTransactionData::from_xdr_base64(transaction_data_b64, Limits::none())
                .map_err(|e| InvokeError::Xdr(format!("transaction data: {}", e)))?;
        v1.tx.ext = TransactionExt::V1(soroban_data);
    }

    // Fee is base + min resource, capped at u32::MAX.
    let total_fee = (base_fee as u64).saturating_add(min_resource_fee);
    v1.tx.fee = u32::try_from(total_fee.min(u32::MAX as u64)).unwrap_or(u32::MAX);

    // VecM doesn't implement DerefMut, so we rebuild the operations vec.
    if !auth_entries.is_empty() {
        let mut ops: Vec<Operation> = v1.tx.operations.to_vec();
        if let OperationBody::InvokeHostFunction(ref mut op) = ops[0].body {
            op.auth = auth_entries
                .to_vec()
                .try_into()
                .map_err(|e| InvokeError::Xdr(format!("auth vec: {}", e)))?;
        }
        v1.tx.operations = ops
            .try_into()
            .map_err(|e| InvokeError::Xdr(format!("operations: {}", e)))?;
    }

    Ok(TransactionEnvelope::Tx(v1))
}

/// Serialize a `TransactionEnvelope` to base64 XDR.
pub fn envelope_to_base64(envelope: &TransactionEnvelope) -> Result<String, InvokeError> {
    envelope
        .to_xdr_base64(Limits::none())
        .map_err(|e| InvokeError::Xdr(format!("serialize envelope: {}", e)))
}

/// Deserialize a `TransactionEnvelope` from base64 XDR.
pub fn envelope_from_base64(b64: &str) -> Result<TransactionEnvelope, InvokeError> {
    TransactionEnvelope::from_xdr_base64(b64, Limits::none())
        .map_err(|e| InvokeError::Xdr(format!("deserialize envelope: {}", e)))
}

fn contract_address_from_string(contract_id: &str) -> Result<ScAddress, InvokeError> {
    match stellar_strkey::Strkey::from_string(contract_id) {
        Ok(stellar_strkey::Strkey::Contract(c)) => Ok(ScAddress::Contract(ContractId(Hash(c.0)))),
        Ok(_) => Err(InvokeError::InvalidResponse(format!(
            "expected C... contract address, got: {}",
            contract_id
        ))),
        Err(e) => Err(InvokeError::InvalidResponse(format!(
            "invalid contract address {}: {}",
            contract_id, e
        ))),
    }
}

fn account_key_from_string(account_id: &str) -> Result<[u8; 32], InvokeError> {
    match stellar_strkey::Strkey::from_string(account_id) {
        Ok(stellar_strkey::Strkey::PublicKeyEd25519(pk)) => Ok(pk.0),
        Ok(_) => Err(InvokeError::InvalidResponse(format!(
            "expected G... account address, got: {}",
            account_id
        ))),
        Err(e) => Err(InvokeError::InvalidResponse(format!(
            "invalid account address {}: {}",
            account_id, e
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
