//! Transaction building and signing.
//!
//! # Responsibilities
//! - Build value transfers with proper gas estimation
//! - Fetch the pending nonce and fee parameters
//! - Hand the unsigned transaction to the wallet for signing

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, Signature, TxHash, TxKind, B256, U256};

use crate::blockchain::fees::FeeEstimator;
use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::types::{BlockchainError, BlockchainResult, FeeMode, FeeModel};
use crate::blockchain::wallet::Wallet;
use crate::config::schema::FeeConfig;

/// Fields of a value transfer before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    pub recipient: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub fee: FeeModel,
}

impl UnsignedTransaction {
    fn legacy(&self, chain_id: u64, gas_price: u128) -> TxLegacy {
        TxLegacy {
            chain_id: Some(chain_id),
            nonce: self.nonce,
            gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.recipient),
            value: self.value,
            input: Bytes::new(),
        }
    }

    fn eip1559(&self, chain_id: u64, tip_cap: u128, fee_cap: u128) -> TxEip1559 {
        TxEip1559 {
            chain_id,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            max_fee_per_gas: fee_cap,
            max_priority_fee_per_gas: tip_cap,
            to: TxKind::Call(self.recipient),
            value: self.value,
            ..Default::default()
        }
    }

    /// Hash the signature commits to, bound to `chain_id`.
    pub fn signing_hash(&self, chain_id: u64) -> B256 {
        match self.fee {
            FeeModel::Legacy { gas_price } => self.legacy(chain_id, gas_price).signature_hash(),
            FeeModel::DynamicFee { tip_cap, fee_cap } => {
                self.eip1559(chain_id, tip_cap, fee_cap).signature_hash()
            }
        }
    }

    fn into_envelope(&self, chain_id: u64, signature: Signature) -> TxEnvelope {
        match self.fee {
            FeeModel::Legacy { gas_price } => {
                TxEnvelope::from(self.legacy(chain_id, gas_price).into_signed(signature))
            }
            FeeModel::DynamicFee { tip_cap, fee_cap } => TxEnvelope::from(
                self.eip1559(chain_id, tip_cap, fee_cap)
                    .into_signed(signature),
            ),
        }
    }
}

/// A transfer signed for one chain.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    unsigned: UnsignedTransaction,
    chain_id: u64,
    from: Address,
    signature: Signature,
    envelope: TxEnvelope,
}

impl SignedTransaction {
    pub(crate) fn new(
        unsigned: UnsignedTransaction,
        chain_id: u64,
        from: Address,
        signature: Signature,
    ) -> Self {
        let envelope = unsigned.into_envelope(chain_id, signature);
        Self {
            unsigned,
            chain_id,
            from,
            signature,
            envelope,
        }
    }

    pub fn hash(&self) -> TxHash {
        *self.envelope.tx_hash()
    }

    /// EIP-2718 encoding for `eth_sendRawTransaction`.
    pub fn raw(&self) -> Bytes {
        Bytes::from(self.envelope.encoded_2718())
    }

    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    pub fn nonce(&self) -> u64 {
        self.unsigned.nonce
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Address of the wallet that signed.
    pub fn from(&self) -> Address {
        self.from
    }

    /// Check the signature over the unsigned fields recovers `address`
    /// for `chain_id`.
    pub fn verify(&self, address: Address, chain_id: u64) -> bool {
        let hash = self.unsigned.signing_hash(chain_id);
        self.signature
            .recover_address_from_prehash(&hash)
            .map(|recovered| recovered == address)
            .unwrap_or(false)
    }
}

/// Transaction builder for value transfers.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    fees: FeeEstimator,
    /// Safety margin added to estimated gas, in percent.
    gas_limit_margin_percent: u64,
    /// Gas limit when no estimate is requested.
    transfer_gas_limit: u64,
}

impl TxBuilder {
    pub fn new(config: &FeeConfig) -> Self {
        Self {
            fees: FeeEstimator::new(config),
            gas_limit_margin_percent: config.gas_limit_margin_percent,
            transfer_gas_limit: config.transfer_gas_limit,
        }
    }

    pub fn fees(&self) -> &FeeEstimator {
        &self.fees
    }

    /// Assemble an unsigned transfer with the fixed transfer gas limit.
    pub fn build(
        &self,
        recipient: Address,
        value: U256,
        nonce: u64,
        fee: FeeModel,
    ) -> UnsignedTransaction {
        UnsignedTransaction {
            nonce,
            recipient,
            value,
            gas_limit: self.transfer_gas_limit,
            fee,
        }
    }

    /// Build and sign a transfer from `wallet` to `recipient`.
    ///
    /// The nonce is the wallet's pending nonce, so callers must not run two
    /// assemblies for the same wallet concurrently. The chain ID is queried
    /// when not supplied.
    pub async fn assemble<R: LedgerRpc + ?Sized>(
        &self,
        recipient: Address,
        value: U256,
        chain_id: Option<u64>,
        wallet: &Wallet,
        rpc: &R,
    ) -> BlockchainResult<SignedTransaction> {
        let from = wallet.address();

        let nonce = rpc
            .get_pending_nonce(from)
            .await
            .map_err(BlockchainError::NonceFetch)?;

        let gas_limit = if self.fees.mode() == FeeMode::Dynamic {
            let estimated = rpc
                .estimate_gas(from, recipient, value, Bytes::new())
                .await
                .map_err(BlockchainError::GasEstimation)?;
            self.with_margin(estimated)
        } else {
            self.transfer_gas_limit
        };

        let fee = self.fees.quote(rpc).await?;
        let unsigned = UnsignedTransaction {
            gas_limit,
            ..self.build(recipient, value, nonce, fee)
        };

        let chain_id = match chain_id {
            Some(id) => id,
            None => rpc.get_chain_id().await.map_err(BlockchainError::ChainId)?,
        };

        tracing::debug!(
            from = %from,
            to = %recipient,
            nonce,
            gas_limit = unsigned.gas_limit,
            chain_id,
            "Transaction built"
        );

        wallet.sign(&unsigned, chain_id)
    }

    fn with_margin(&self, gas: u64) -> u64 {
        gas.saturating_mul(100 + self.gas_limit_margin_percent) / 100
    }
}
