//! Fee pricing for legacy and EIP-1559 transactions.

use crate::blockchain::rpc::LedgerRpc;
use crate::blockchain::types::{BlockchainError, BlockchainResult, FeeMode, FeeModel};
use crate::config::schema::FeeConfig;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Turns observed network fee data into transaction fee fields.
#[derive(Debug, Clone)]
pub struct FeeEstimator {
    mode: FeeMode,
    /// Fixed legacy price used by [`FeeMode::Static`].
    static_gas_price: u128,
    /// Applied to the observed legacy price (1.0 = pass-through).
    gas_price_multiplier: f64,
    /// Maximum price per gas in gwei; 0 disables the check.
    max_gas_price_gwei: u64,
}

impl FeeEstimator {
    pub fn new(config: &FeeConfig) -> Self {
        Self {
            mode: config.mode,
            static_gas_price: config.static_gas_price_wei,
            gas_price_multiplier: config.gas_price_multiplier,
            max_gas_price_gwei: config.max_gas_price_gwei,
        }
    }

    pub fn mode(&self) -> FeeMode {
        self.mode
    }

    /// Legacy gas price from the node's suggestion.
    pub fn estimate_legacy(&self, observed_gas_price: u128) -> u128 {
        if self.gas_price_multiplier == 1.0 {
            return observed_gas_price;
        }
        (observed_gas_price as f64 * self.gas_price_multiplier) as u128
    }

    /// Tip and fee cap from the observed base fee.
    ///
    /// The tip is half the base fee and the cap twice the base fee, so the
    /// cap never falls below the tip.
    pub fn estimate_dynamic(&self, observed_base_fee: u128) -> (u128, u128) {
        let tip_cap = observed_base_fee / 2;
        let fee_cap = observed_base_fee.saturating_mul(2);
        (tip_cap, fee_cap)
    }

    /// Fixed legacy price for environments that should not query fees.
    pub fn static_legacy(&self) -> u128 {
        self.static_gas_price
    }

    /// Price a transaction according to the configured mode.
    pub async fn quote<R: LedgerRpc + ?Sized>(&self, rpc: &R) -> BlockchainResult<FeeModel> {
        let fee = match self.mode {
            FeeMode::Static => FeeModel::legacy(self.static_legacy()),
            FeeMode::Legacy => {
                let observed = rpc
                    .suggest_gas_price()
                    .await
                    .map_err(BlockchainError::FeeQuery)?;
                FeeModel::legacy(self.estimate_legacy(observed))
            }
            FeeMode::Dynamic => {
                let observed = rpc
                    .suggest_gas_price()
                    .await
                    .map_err(BlockchainError::FeeQuery)?;
                let (tip_cap, fee_cap) = self.estimate_dynamic(observed);
                FeeModel::dynamic(tip_cap, fee_cap)?
            }
        };

        self.check_cap(&fee)?;
        tracing::debug!(mode = ?self.mode, fee = ?fee, "Fee quoted");
        Ok(fee)
    }

    fn check_cap(&self, fee: &FeeModel) -> BlockchainResult<()> {
        if self.max_gas_price_gwei == 0 {
            return Ok(());
        }
        let max_wei = u128::from(self.max_gas_price_gwei).saturating_mul(WEI_PER_GWEI);
        if fee.max_price_per_gas() > max_wei {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: fee.max_price_per_gas() / WEI_PER_GWEI,
                max_gwei: self.max_gas_price_gwei,
            });
        }
        Ok(())
    }
}
