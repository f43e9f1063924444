//! Test doubles
//!
//! `MockVenue` behaves like a V2 fork: reserves held in memory, router
//! quotes computed with the same constant-product maths the real router
//! uses, Swap events pushed through channels. `MockExecutor` stands in for
//! the flash swap contract.

use crate::arbitrage::executor::FlashExecutor;
use crate::error::ArbError;
use crate::pool::calculator::{get_amount_in, get_amount_out};
use crate::types::{ExecutionReceipt, Token, TokenPair, VenueId};
use crate::venue::{Venue, VenueClient, VenuePair};
use alloy::primitives::{address, Address, B256, U256};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};
use tokio_stream::wrappers::UnboundedReceiverStream;

pub const POOL_A: Address = address!("00000000000000000000000000000000000000a1");
pub const POOL_B: Address = address!("00000000000000000000000000000000000000b2");

/// WETH/DAI on Polygon, both 18 decimals
pub fn test_pair() -> TokenPair {
    TokenPair::new(
        Token::new(address!("7ceB23fD6bC0adD59E62ac25578270cFf1b9f619"), 18, "WETH"),
        Token::new(address!("8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"), 18, "DAI"),
    )
}

pub struct MockVenue {
    pair: TokenPair,
    pool: Mutex<Address>,
    /// (base, quote)
    reserves: Mutex<(U256, U256)>,
    fail_reserves: AtomicBool,
    fail_router: AtomicBool,
    fail_subscribe: AtomicBool,
    reserve_reads: AtomicUsize,
    router_calls: AtomicUsize,
    subscriptions: AtomicUsize,
    feeds: Mutex<Vec<mpsc::UnboundedSender<()>>>,
}

impl MockVenue {
    /// Reserves given in whole tokens (18 decimals)
    pub fn new(pair: &TokenPair, base: u64, quote: u64) -> Arc<Self> {
        Arc::new(Self {
            pair: pair.clone(),
            pool: Mutex::new(POOL_A),
            reserves: Mutex::new((Self::units(base), Self::units(quote))),
            fail_reserves: AtomicBool::new(false),
            fail_router: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            reserve_reads: AtomicUsize::new(0),
            router_calls: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
            feeds: Mutex::new(Vec::new()),
        })
    }

    pub fn units(whole: u64) -> U256 {
        U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
    }

    pub fn set_pool(&self, pool: Address) {
        *self.pool.lock().unwrap() = pool;
    }

    pub fn set_reserves(&self, base: U256, quote: U256) {
        *self.reserves.lock().unwrap() = (base, quote);
    }

    pub fn fail_reserves(&self, fail: bool) {
        self.fail_reserves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_router(&self, fail: bool) {
        self.fail_router.store(fail, Ordering::SeqCst);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn reserve_reads(&self) -> usize {
        self.reserve_reads.load(Ordering::SeqCst)
    }

    pub fn router_calls(&self) -> usize {
        self.router_calls.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// Deliver one Swap notification to every live subscriber
    pub fn emit_swap(&self) {
        self.feeds
            .lock()
            .unwrap()
            .retain(|tx| tx.send(()).is_ok());
    }

    /// Number of subscribers still listening
    pub fn live_feeds(&self) -> usize {
        let mut feeds = self.feeds.lock().unwrap();
        feeds.retain(|tx| !tx.is_closed());
        feeds.len()
    }

    /// End every open subscription stream
    pub fn close_feeds(&self) {
        self.feeds.lock().unwrap().clear();
    }

    /// (reserve_in, reserve_out) for a router path
    fn path_reserves(&self, path: &[Address]) -> Result<(U256, U256)> {
        let (base, quote) = *self.reserves.lock().unwrap();
        match path {
            [from, to] if *from == self.pair.base.address && *to == self.pair.quote.address => {
                Ok((base, quote))
            }
            [from, to] if *from == self.pair.quote.address && *to == self.pair.base.address => {
                Ok((quote, base))
            }
            _ => bail!("UniswapV2Library: INVALID_PATH"),
        }
    }

    fn check_router(&self) -> Result<()> {
        self.router_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_router.load(Ordering::SeqCst) {
            bail!("execution reverted");
        }
        Ok(())
    }
}

#[async_trait]
impl VenueClient for MockVenue {
    async fn get_pair(&self, _token_a: Address, _token_b: Address) -> Result<Address> {
        Ok(*self.pool.lock().unwrap())
    }

    async fn get_reserves(&self, _pool: Address) -> Result<(U256, U256)> {
        self.reserve_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reserves.load(Ordering::SeqCst) {
            bail!("connection reset");
        }
        let (base, quote) = *self.reserves.lock().unwrap();
        if self.pair.base_is_token0() {
            Ok((base, quote))
        } else {
            Ok((quote, base))
        }
    }

    async fn get_amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        self.check_router()?;
        let (reserve_in, reserve_out) = self.path_reserves(path)?;
        let out = get_amount_out(amount_in, reserve_in, reserve_out)
            .ok_or_else(|| anyhow!("UniswapV2Library: INSUFFICIENT_INPUT_AMOUNT"))?;
        Ok(vec![amount_in, out])
    }

    async fn get_amounts_in(&self, amount_out: U256, path: &[Address]) -> Result<Vec<U256>> {
        self.check_router()?;
        let (reserve_in, reserve_out) = self.path_reserves(path)?;
        let amount_in = get_amount_in(amount_out, reserve_in, reserve_out)
            .ok_or_else(|| anyhow!("UniswapV2Library: INSUFFICIENT_LIQUIDITY"))?;
        Ok(vec![amount_in, amount_out])
    }

    async fn subscribe_swaps(&self, _pool: Address) -> Result<BoxStream<'static, ()>> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            bail!("subscription refused");
        }
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().unwrap().push(tx);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

/// Two mock venues wired into a `VenuePair`, reserves in whole tokens
pub fn mock_venues(
    pair: &TokenPair,
    a: (u64, u64),
    b: (u64, u64),
) -> (VenuePair, Arc<MockVenue>, Arc<MockVenue>) {
    let mock_a = MockVenue::new(pair, a.0, a.1);
    let mock_b = MockVenue::new(pair, b.0, b.1);
    mock_b.set_pool(POOL_B);
    let venues = VenuePair::new(
        Venue::new(VenueId::A, "Uniswap", POOL_A, mock_a.clone()),
        Venue::new(VenueId::B, "Sushiswap", POOL_B, mock_b.clone()),
    );
    (venues, mock_a, mock_b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Succeed,
    Fail,
    /// Block until `release()` then succeed
    Hold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecCall {
    pub base_token: Address,
    pub amount: U256,
    pub start_on_venue_a: bool,
}

pub struct MockExecutor {
    mode: Mutex<ExecMode>,
    calls: Mutex<Vec<ExecCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    release: Notify,
}

impl MockExecutor {
    pub fn new(mode: ExecMode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            release: Notify::new(),
        })
    }

    pub fn set_mode(&self, mode: ExecMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlashExecutor for MockExecutor {
    async fn execute_flash_trade(
        &self,
        base_token: Address,
        amount: U256,
        start_on_venue_a: bool,
    ) -> Result<ExecutionReceipt, ArbError> {
        self.calls.lock().unwrap().push(ExecCall {
            base_token,
            amount,
            start_on_venue_a,
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let mode = *self.mode.lock().unwrap();
        if mode == ExecMode::Hold {
            self.release.notified().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match mode {
            ExecMode::Fail => Err(ArbError::Execution("execution reverted: K".into())),
            _ => Ok(ExecutionReceipt {
                tx_hash: B256::repeat_byte(0xab),
                block_number: Some(1),
                gas_used: 210_000,
                submitted_at: Utc::now(),
                elapsed_ms: 0,
            }),
        }
    }
}
