//! RPC-backed venue client
//!
//! Talks to a V2 fork's factory, pair and router through an alloy
//! provider. Swap notifications come from an `eth_subscribe` log filter
//! on the pair address, so the provider must be a pubsub (WS) connection.
//!
//! Created: 2026-10-17

use super::VenueClient;
use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02, IERC20};
use crate::types::Token;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::Filter;
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

pub struct RpcVenue {
    provider: DynProvider,
    factory: Address,
    router: Address,
}

impl RpcVenue {
    pub fn new(provider: DynProvider, factory: Address, router: Address) -> Self {
        Self {
            provider,
            factory,
            router,
        }
    }
}

#[async_trait]
impl VenueClient for RpcVenue {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address> {
        let factory = IUniswapV2Factory::new(self.factory, self.provider.clone());
        let pair = factory
            .getPair(token_a, token_b)
            .call()
            .await
            .with_context(|| format!("getPair failed on factory {:?}", self.factory))?;
        Ok(pair)
    }

    async fn get_reserves(&self, pool: Address) -> Result<(U256, U256)> {
        let pair = IUniswapV2Pair::new(pool, self.provider.clone());
        let reserves = pair
            .getReserves()
            .call()
            .await
            .with_context(|| format!("getReserves failed on pool {:?}", pool))?;
        Ok((U256::from(reserves.reserve0), U256::from(reserves.reserve1)))
    }

    async fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let router = IUniswapV2Router02::new(self.router, self.provider.clone());
        let amounts = router
            .getAmountsOut(amount_in, path.to_vec())
            .call()
            .await
            .context("getAmountsOut failed")?;
        Ok(amounts)
    }

    async fn get_amounts_in(&self, amount_out: U256, path: &[Address]) -> Result<Vec<U256>> {
        let router = IUniswapV2Router02::new(self.router, self.provider.clone());
        let amounts = router
            .getAmountsIn(amount_out, path.to_vec())
            .call()
            .await
            .context("getAmountsIn failed")?;
        Ok(amounts)
    }

    async fn subscribe_swaps(&self, pool: Address) -> Result<BoxStream<'static, ()>> {
        let filter = Filter::new()
            .address(pool)
            .event_signature(IUniswapV2Pair::Swap::SIGNATURE_HASH);
        let subscription = self
            .provider
            .subscribe_logs(&filter)
            .await
            .with_context(|| format!("Swap log subscription failed for pool {:?}", pool))?;
        debug!("Subscribed to Swap events on {:?}", pool);
        Ok(subscription.into_stream().map(|_| ()).boxed())
    }
}

/// Read ERC20 decimals and symbol for one side of the pair
pub async fn load_token(provider: &DynProvider, address: Address) -> Result<Token> {
    let erc20 = IERC20::new(address, provider.clone());
    let decimals = erc20
        .decimals()
        .call()
        .await
        .with_context(|| format!("decimals() failed for {:?}", address))?;
    let symbol = erc20
        .symbol()
        .call()
        .await
        .with_context(|| format!("symbol() failed for {:?}", address))?;
    Ok(Token::new(address, decimals, symbol))
}
