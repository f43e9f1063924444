//! Flash Swap Executor
//!
//! Hands a sized trade to the deployed flash swap contract. The contract
//! borrows the base token on one venue, swaps through the other and
//! repays inside a single transaction, so there is no leg risk here:
//! the call either lands or reverts as a whole.
//!
//! `DryRunExecutor` is the default; it logs what would be sent.
//!
//! Created: 2026-10-17

use crate::contracts::IFlashSwap;
use crate::error::ArbError;
use crate::types::ExecutionReceipt;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::DynProvider;
use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Entry point of the flash swap contract
#[async_trait]
pub trait FlashExecutor: Send + Sync {
    /// Borrow `amount` of `base_token` and run the cross-venue swap.
    /// `start_on_venue_a` names the venue of the first swap, where the
    /// borrowed base is sold for quote.
    async fn execute_flash_trade(
        &self,
        base_token: Address,
        amount: U256,
        start_on_venue_a: bool,
    ) -> Result<ExecutionReceipt, ArbError>;
}

/// Sends `testFlashSwap` transactions through a signing provider
pub struct ContractExecutor {
    provider: DynProvider,
    contract: Address,
    gas_limit: u64,
    gas_price: u128,
    timeout: Duration,
}

impl ContractExecutor {
    pub fn new(
        provider: DynProvider,
        contract: Address,
        gas_limit: u64,
        gas_price: u128,
        timeout: Duration,
    ) -> Self {
        warn!("⚠️ Executor in LIVE mode - flash swaps will be sent to {:?}", contract);
        Self {
            provider,
            contract,
            gas_limit,
            gas_price,
            timeout,
        }
    }
}

#[async_trait]
impl FlashExecutor for ContractExecutor {
    async fn execute_flash_trade(
        &self,
        base_token: Address,
        amount: U256,
        start_on_venue_a: bool,
    ) -> Result<ExecutionReceipt, ArbError> {
        let started = Instant::now();
        let submitted_at = Utc::now();
        let flash = IFlashSwap::new(self.contract, self.provider.clone());

        debug!(
            "testFlashSwap({:?}, {}, {}) gas {} @ {} wei",
            base_token, amount, start_on_venue_a, self.gas_limit, self.gas_price
        );

        let pending = flash
            .testFlashSwap(base_token, amount, start_on_venue_a)
            .gas(self.gas_limit)
            .gas_price(self.gas_price)
            .send()
            .await
            .map_err(|e| ArbError::Execution(format!("send failed: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        info!("Flash swap submitted: {:?}", tx_hash);

        let receipt = tokio::time::timeout(self.timeout, pending.get_receipt())
            .await
            .map_err(|_| {
                ArbError::Execution(format!(
                    "no receipt for {:?} after {}s",
                    tx_hash,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ArbError::Execution(format!("confirmation failed: {}", e)))?;

        if !receipt.status() {
            return Err(ArbError::Execution(format!("transaction {:?} reverted", tx_hash)));
        }

        Ok(ExecutionReceipt {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            submitted_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Logs the call instead of sending it
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    contract: Address,
}

impl DryRunExecutor {
    pub fn new(contract: Address) -> Self {
        info!("Executor in DRY RUN mode - flash swaps will be simulated");
        Self { contract }
    }
}

#[async_trait]
impl FlashExecutor for DryRunExecutor {
    async fn execute_flash_trade(
        &self,
        base_token: Address,
        amount: U256,
        start_on_venue_a: bool,
    ) -> Result<ExecutionReceipt, ArbError> {
        info!(
            "🔬 DRY RUN: would call {:?}.testFlashSwap({:?}, {}, {})",
            self.contract, base_token, amount, start_on_venue_a
        );
        Ok(ExecutionReceipt {
            tx_hash: B256::ZERO,
            block_number: None,
            gas_used: 0,
            submitted_at: Utc::now(),
            elapsed_ms: 0,
        })
    }
}
