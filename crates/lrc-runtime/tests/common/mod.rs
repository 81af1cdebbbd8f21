#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lrc_chain::{AccountSnapshotWords, ChainError, ContractCaller, MarketCall};
use lrc_config::{load_layered_yaml_from_strings, ReconConfig};
use lrc_markets::{Address, MarketSymbol};
use num_bigint::BigInt;
use serde_json::{json, Value};

pub const USDC_TICKER: &str = "qiUSDCn";

pub fn usdc() -> Address {
    MarketSymbol::Usdc.address().unwrap()
}

pub fn account(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn account_hex(n: u8) -> String {
    account(n).to_string().to_lowercase()
}

/// In-memory chain. `cash` reads one unit higher from `diverge_from` on.
#[derive(Default)]
pub struct FakeChain {
    pub accounts: HashMap<(Address, Address), (u64, u64)>,
    pub market_values: HashMap<(Address, MarketCall), u64>,
    pub diverge_from: Option<u64>,
    pub account_calls: AtomicUsize,
    pub blocks_seen: Mutex<Vec<u64>>,
}

impl FakeChain {
    pub fn with_account(mut self, market: Address, account: Address, supply: u64, borrow: u64) -> Self {
        self.accounts.insert((market, account), (supply, borrow));
        self
    }

    /// Contract side of [`usdc_market_row`].
    pub fn with_usdc_market(mut self) -> Self {
        let m = usdc();
        for (call, raw) in [
            (MarketCall::TotalBorrows, 5_000_000),
            (MarketCall::TotalSupply, 1_000_000_000),
            (MarketCall::TotalReserves, 1_000_000),
            (MarketCall::Cash, 7_000_000),
            (MarketCall::ExchangeRateStored, 201_234_567_891_234),
            (MarketCall::BorrowIndex, 1_000_000_000_000_000_000),
            (MarketCall::BorrowRatePerSecond, 0),
            (MarketCall::SupplyRatePerSecond, 0),
        ] {
            self.market_values.insert((m, call), raw);
        }
        self
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
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
        let (supply, borrow) = self.accounts.get(&(market, account)).copied().unwrap_or_default();
        Ok(AccountSnapshotWords {
            error_code: BigInt::from(0),
            token_balance: BigInt::from(supply),
            borrow_balance: BigInt::from(borrow),
            exchange_rate_mantissa: BigInt::from(0),
        })
    }

    async fn market_value(
        &self,
        market: Address,
        call: MarketCall,
        block: u64,
    ) -> Result<BigInt, ChainError> {
        self.blocks_seen.lock().unwrap().push(block);
        let raw = self
            .market_values
            .get(&(market, call))
            .copied()
            .ok_or_else(|| ChainError::Call {
                call: call.method(),
                market,
                block,
                message: "execution reverted".into(),
            })?;
        let bump = match (call, self.diverge_from) {
            (MarketCall::Cash, Some(from)) if block >= from => 1_000_000,
            _ => 0,
        };
        Ok(BigInt::from(raw + bump))
    }
}

/// Subgraph market row matching [`FakeChain::with_usdc_market`].
pub fn usdc_market_row(cash: &str) -> Value {
    json!({
        "symbol": USDC_TICKER,
        "id": usdc().to_string().to_lowercase(),
        "borrowRateAPY": "0",
        "supplyRateAPY": "0",
        "cash": cash,
        "reserves": "1",
        "totalBorrows": "5",
        "totalSupply": "10",
        "exchangeRate": "0.0201234567891234",
        "borrowIndex": "1"
    })
}

pub fn usdc_info_row(borrowers: u64, suppliers: u64) -> Value {
    json!({
        "symbol": USDC_TICKER,
        "id": usdc().to_string().to_lowercase(),
        "borrowersCount": borrowers.to_string(),
        "suppliersCount": suppliers.to_string(),
        "underlyingDecimals": 6
    })
}

pub fn usdc_account_row(id: &str, supply: &str, stored_borrow: &str) -> Value {
    json!({
        "id": id,
        "tokens": [{
            "totalSupplyAmount": supply,
            "storedBorrowBalance": stored_borrow,
            "accountBorrowIndex": "1",
            "market": { "borrowIndex": "1" },
            "symbol": USDC_TICKER
        }]
    })
}

pub fn config(subgraph_url: &str, partner_url: Option<&str>, out: &Path) -> ReconConfig {
    let partner = partner_url
        .map(|u| format!("partner:\n  url: \"{u}\"\n"))
        .unwrap_or_default();
    let yaml = format!(
        r#"
subgraph:
  url: "{subgraph_url}"
  page_size: 100
chain:
  rpc_url: "http://127.0.0.1:1"
  batch_size: 4
output:
  report_dir: "{reports}"
  cache_dir: "{cache}"
{partner}"#,
        reports = out.join("reports").display(),
        cache = out.join("cache").display(),
    );
    let loaded = load_layered_yaml_from_strings(&[&yaml]).unwrap();
    ReconConfig::from_loaded(&loaded, |_| None).unwrap()
}
