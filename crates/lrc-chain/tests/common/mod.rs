#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lrc_chain::{AccountSnapshotWords, ChainError, ContractCaller, MarketCall};
use lrc_markets::Address;
use num_bigint::BigInt;

/// In-memory contract transport that counts calls and tracks concurrency.
#[derive(Default)]
pub struct FakeChain {
    pub accounts: HashMap<(Address, Address), AccountSnapshotWords>,
    pub market_values: HashMap<(Address, MarketCall), BigInt>,
    pub reverting: HashSet<Address>,
    pub delay: Duration,

    pub account_calls: AtomicUsize,
    pub market_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub blocks_seen: Mutex<Vec<u64>>,
}

impl FakeChain {
    pub fn with_account(mut self, market: Address, account: Address, supply: u64, borrow: u64) -> Self {
        self.accounts.insert(
            (market, account),
            AccountSnapshotWords {
                error_code: BigInt::from(0),
                token_balance: BigInt::from(supply),
                borrow_balance: BigInt::from(borrow),
                exchange_rate_mantissa: BigInt::from(0),
            },
        );
        self
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

pub fn account(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn account_hex(n: u8) -> String {
    account(n).to_string().to_lowercase()
}

#[async_trait]
impl ContractCaller for FakeChain {
    async fn account_snapshot(
        &self,
        market: Address,
        account: Address,
        block: u64,
    ) -> Result<AccountSnapshotWords, ChainError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        self.blocks_seen.lock().unwrap().push(block);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.reverting.contains(&account) {
            return Err(ChainError::Call {
                call: "getAccountSnapshot",
                market,
                block,
                message: "execution reverted".into(),
            });
        }
        Ok(self
            .accounts
            .get(&(market, account))
            .cloned()
            .unwrap_or_default())
    }

    async fn market_value(
        &self,
        market: Address,
        call: MarketCall,
        block: u64,
    ) -> Result<BigInt, ChainError> {
        self.market_calls.fetch_add(1, Ordering::SeqCst);
        self.blocks_seen.lock().unwrap().push(block);
        self.market_values
            .get(&(market, call))
            .cloned()
            .ok_or_else(|| ChainError::Call {
                call: call.method(),
                market,
                block,
                message: "no such method".into(),
            })
    }
}
