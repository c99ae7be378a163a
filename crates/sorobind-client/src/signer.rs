//! Wallet signing capability and a local ed25519 keypair implementation.

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use stellar_strkey::Strkey;
use stellar_xdr::curr::{
    DecoratedSignature, Limits, ReadXdr, Signature, SignatureHint, TransactionEnvelope, WriteXdr,
};

use crate::error::InvokeError;

/// The signing capability the invocation engine depends on.
///
/// Abstracts over local keypairs and external wallets so the engine never
/// touches key material directly.
pub trait WalletSigner {
    /// Whether the signer is currently able to sign.
    fn is_connected(&self) -> bool;

    /// The public key (G... address) the signer signs as, if configured.
    fn public_key(&self) -> Option<String>;

    /// Sign a base64 XDR transaction envelope for the given network and
    /// return the signed envelope, base64 XDR encoded.
    fn sign_transaction(
        &self,
        envelope_xdr: &str,
        network_passphrase: &str,
    ) -> Result<String, InvokeError>;
}

/// A signer backed by a local ed25519 secret key.
pub struct LocalKeySigner {
    signing_key: SigningKey,
}

impl LocalKeySigner {
    /// Create a signer from a Stellar secret key (`S...` format).
    pub fn from_secret(secret: &str) -> Result<Self, InvokeError> {
        let signing_key = decode_secret_key(secret)?;
        Ok(LocalKeySigner { signing_key })
    }
}

impl WalletSigner for LocalKeySigner {
    fn is_connected(&self) -> bool {
        true
    }

    fn public_key(&self) -> Option<String> {
        let pk = self.signing_key.verifying_key();
        Some(
            Strkey::PublicKeyEd25519(stellar_strkey::ed25519::PublicKey(pk.to_bytes()))
                .to_string(),
        )
    }

    fn sign_transaction(
        &self,
        envelope_xdr: &str,
        network_passphrase: &str,
    ) -> Result<String, InvokeError> {
        let envelope = TransactionEnvelope::from_xdr_base64(envelope_xdr, Limits::none())
            .map_err(|e| InvokeError::Xdr(format!("deserialize envelope: {}", e)))?;

        let signed =
            sign_transaction_envelope(envelope, &self.signing_key, network_passphrase)?;

        signed
            .to_xdr_base64(Limits::none())
            .map_err(|e| InvokeError::Xdr(format!("serialize signed envelope: {}", e)))
    }
}

/// Decode a Stellar secret key (`S...` format) into an ed25519 `SigningKey`.
pub fn decode_secret_key(secret: &str) -> Result<SigningKey, InvokeError> {
    match Strkey::from_string(secret) {
        Ok(Strkey::PrivateKeyEd25519(sk)) => Ok(SigningKey::from_bytes(&sk.0)),
        Ok(_) => Err(InvokeError::SigningFailed(
            "expected S... secret key, got different key type".into(),
        )),
        Err(e) => Err(InvokeError::SigningFailed(format!(
            "invalid secret key format: {}",
            e
        ))),
    }
}

/// Sign a `TransactionEnvelope` with the given keypair and network passphrase.
///
/// Computes `SHA256(SHA256(passphrase) || EnvelopeTypeTx [0x00000002] || tx_xdr)`,
/// signs the 32-byte hash with ed25519, and appends a `DecoratedSignature`.
pub fn sign_transaction_envelope(
    envelope: TransactionEnvelope,
    signing_key: &SigningKey,
    network_passphrase: &str,
) -> Result<TransactionEnvelope, InvokeError> {
    let TransactionEnvelope::Tx(mut v1) = envelope else {
        return Err(InvokeError::SigningFailed(
            "expected Tx envelope variant".into(),
        ));
    };

    let tx_hash = compute_transaction_hash(&v1.tx, network_passphrase)?;
    let signature = signing_key.sign(&tx_hash);

    // Hint is the last 4 bytes of the public key.
    let public_key = signing_key.verifying_key();
    let pk_bytes = public_key.as_bytes();
    let hint = SignatureHint([pk_bytes[28], pk_bytes[29], pk_bytes[30], pk_bytes[31]]);

    let sig_bytes: Vec<u8> = signature.to_bytes().to_vec();
    let decorated = DecoratedSignature {
        hint,
        signature: Signature(
            sig_bytes
                .try_into()
                .map_err(|e| InvokeError::SigningFailed(format!("signature: {}", e)))?,
        ),
    };

    let sigs: Vec<DecoratedSignature> = vec![decorated];
    v1.signatures = sigs
        .try_into()
        .map_err(|e| InvokeError::SigningFailed(format!("signatures vec: {}", e)))?;

    Ok(TransactionEnvelope::Tx(v1))
}

/// Compute the Stellar transaction hash:
/// `SHA256( SHA256(network_passphrase) || EnvelopeTypeTx (0x00000002 BE) || tx_xdr )`
pub(crate) fn compute_transaction_hash(
    tx: &stellar_xdr::curr::Transaction,
    network_passphrase: &str,
) -> Result<[u8; 32], InvokeError> {
    // Network ID = SHA256(passphrase)
    let network_id: [u8; 32] = Sha256::digest(network_passphrase.as_bytes()).into();

    // EnvelopeType::Tx = 2 as big-endian i32
    let envelope_type_tx: [u8; 4] = 2_i32.to_be_bytes();

    let tx_xdr = tx
        .to_xdr(Limits::none())
        .map_err(|e| InvokeError::SigningFailed(format!("serialize tx: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(network_id);
    hasher.update(envelope_type_tx);
    hasher.update(&tx_xdr);
    let hash: [u8; 32] = hasher.finalize().into();

    Ok(hash)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
