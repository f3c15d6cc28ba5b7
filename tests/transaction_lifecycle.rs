//! Build, sign and submit against a scripted ledger.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{address, Address, U256};

use devnet_faucet::blockchain::{submitter, BlockchainError, BroadcastRejection, TxBuilder, Wallet};
use devnet_faucet::config::{FeeConfig, FeeMode};

mod common;
use common::{node_error, transport_error, MockLedger, DEV_KEY};

const RECIPIENT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

fn builder(mode: FeeMode) -> TxBuilder {
    TxBuilder::new(&FeeConfig {
        mode,
        ..FeeConfig::default()
    })
}

fn wallet() -> Wallet {
    Wallet::from_private_key(DEV_KEY).unwrap()
}

fn decode(raw: &[u8]) -> TxEnvelope {
    let mut buf = raw;
    TxEnvelope::decode_2718(&mut buf).unwrap()
}

#[tokio::test]
async fn test_legacy_transfer_end_to_end() {
    let ledger = MockLedger::new();
    let wallet = wallet();

    let signed = builder(FeeMode::Legacy)
        .assemble(RECIPIENT, U256::from(1_000u64), None, &wallet, &ledger)
        .await
        .unwrap();
    assert!(signed.verify(wallet.address(), 10));

    let submission = submitter::submit(&signed, &ledger).await.unwrap();
    assert_eq!(submission.submitted_nonce, 5);
    assert_eq!(submission.submitter, wallet.address());
    assert_eq!(submission.tx_hash, signed.hash());

    let broadcasts = ledger.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let envelope = decode(&broadcasts[0]);
    assert!(envelope.is_legacy());
    assert_eq!(envelope.nonce(), 5);
    assert_eq!(envelope.gas_price(), Some(20));
    assert_eq!(envelope.gas_limit(), 21_000);
    assert_eq!(envelope.chain_id(), Some(10));
    assert_eq!(envelope.to(), Some(RECIPIENT));
    assert_eq!(envelope.value(), U256::from(1_000u64));

    // Legacy transfers use the fixed limit without a simulation.
    assert_eq!(ledger.calls("estimate_gas"), 0);
}

#[tokio::test]
async fn test_dynamic_transfer_end_to_end() {
    let ledger = MockLedger::new();
    let wallet = wallet();

    let signed = builder(FeeMode::Dynamic)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet, &ledger)
        .await
        .unwrap();
    submitter::submit(&signed, &ledger).await.unwrap();

    let envelope = decode(&ledger.broadcasts()[0]);
    assert!(envelope.is_eip1559());
    assert_eq!(envelope.nonce(), 5);
    assert_eq!(envelope.max_priority_fee_per_gas(), Some(10));
    assert_eq!(envelope.max_fee_per_gas(), 40);
    assert_eq!(envelope.gas_limit(), 25_200);
    assert_eq!(envelope.chain_id(), Some(10));
}

#[tokio::test]
async fn test_configured_chain_id_skips_query() {
    let ledger = MockLedger::new();
    let wallet = wallet();

    let signed = builder(FeeMode::Static)
        .assemble(RECIPIENT, U256::from(1u64), Some(31337), &wallet, &ledger)
        .await
        .unwrap();

    assert_eq!(signed.chain_id(), 31337);
    assert_eq!(ledger.calls("get_chain_id"), 0);
    assert_eq!(ledger.calls("suggest_gas_price"), 0);
    assert!(signed.verify(wallet.address(), 31337));
    assert!(!signed.verify(wallet.address(), 10));
}

#[tokio::test]
async fn test_nonce_failure_stops_before_fees() {
    let ledger = MockLedger::new().with_pending_nonce(Err(transport_error()));

    let err = builder(FeeMode::Dynamic)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet(), &ledger)
        .await
        .unwrap_err();

    assert!(matches!(err, BlockchainError::NonceFetch(_)));
    assert!(err.is_retryable());
    assert_eq!(ledger.calls("estimate_gas"), 0);
    assert_eq!(ledger.calls("suggest_gas_price"), 0);
}

#[tokio::test]
async fn test_stage_errors_are_named() {
    let wallet = wallet();

    let ledger = MockLedger::new().with_gas(Err(node_error("execution reverted")));
    let err = builder(FeeMode::Dynamic)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::GasEstimation(_)));
    assert!(!err.is_retryable());

    let ledger = MockLedger::new().with_gas_price(Err(transport_error()));
    let err = builder(FeeMode::Legacy)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::FeeQuery(_)));

    let ledger = MockLedger::new().with_chain_id(Err(transport_error()));
    let err = builder(FeeMode::Legacy)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::ChainId(_)));
    assert_eq!(ledger.calls("broadcast_transaction"), 0);
}

#[tokio::test]
async fn test_gas_price_cap() {
    // 600 gwei against the default 500 gwei cap.
    let ledger = MockLedger::new().with_gas_price(Ok(600_000_000_000));

    let err = builder(FeeMode::Legacy)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet(), &ledger)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BlockchainError::GasPriceTooHigh { current_gwei: 600, max_gwei: 500 }
    ));
}

#[tokio::test]
async fn test_broadcast_rejection_is_classified_and_not_retried() {
    let ledger = MockLedger::new().with_broadcast(Err(node_error("nonce too low: next nonce 7")));
    let signed = builder(FeeMode::Legacy)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet(), &ledger)
        .await
        .unwrap();

    let err = submitter::submit(&signed, &ledger).await.unwrap_err();

    match &err {
        BlockchainError::Broadcast { reason, .. } => assert_eq!(*reason, BroadcastRejection::NonceTooLow),
        other => panic!("expected broadcast error, got {}", other),
    }
    assert!(err.to_string().contains("nonce too low"));
    assert_eq!(ledger.calls("broadcast_transaction"), 1);
}

#[tokio::test]
async fn test_underpriced_broadcast_is_retryable() {
    let ledger = MockLedger::new().with_broadcast(Err(node_error("replacement transaction underpriced")));
    let signed = builder(FeeMode::Legacy)
        .assemble(RECIPIENT, U256::from(1u64), None, &wallet(), &ledger)
        .await
        .unwrap();

    let err = submitter::submit(&signed, &ledger).await.unwrap_err();
    assert!(err.is_retryable());
}
