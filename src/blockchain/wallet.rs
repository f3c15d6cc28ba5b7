//! Wallet management and transaction signing.
//!
//! # Security
//! - Keys are never logged
//! - Keys are only serialized by the keystore when bootstrapping key files

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::blockchain::transaction::{SignedTransaction, UnsignedTransaction};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A private key and the address derived from it.
///
/// Signing is pure computation; the wallet performs no I/O.
#[derive(Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "Wallet loaded");

        Ok(Self { signer })
    }

    /// Generate a wallet with a fresh random key.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Hex encoding of the private key, without 0x prefix.
    pub(crate) fn private_key_hex(&self) -> String {
        alloy::hex::encode(self.signer.to_bytes())
    }

    /// Sign a transaction for `chain_id`.
    ///
    /// The fee model selects the signature scheme: legacy fees produce an
    /// EIP-155 legacy transaction, dynamic fees an EIP-1559 transaction.
    pub fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        chain_id: u64,
    ) -> BlockchainResult<SignedTransaction> {
        let hash = unsigned.signing_hash(chain_id);
        let signature = self.sign_hash(&hash)?;
        Ok(SignedTransaction::new(
            unsigned.clone(),
            chain_id,
            self.address(),
            signature,
        ))
    }

    /// Sign a 32-byte hash.
    pub fn sign_hash(&self, hash: &B256) -> BlockchainResult<alloy::primitives::Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| BlockchainError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
