use std::collections::BTreeMap;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use lrc_decimal::Amount;
use lrc_markets::{
    normalize_account, Address, MarketInfo, MarketValues, RawAccountSnapshot, RawSnapshots,
};
use num_bigint::Sign;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::caller::{ContractCaller, MarketCall};
use crate::error::ChainError;
use crate::rates::{rate_to_apy, EXCHANGE_RATE_EXTRA_DECIMALS, MANTISSA_DECIMALS};

/// In-flight account reads per market.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Cached, batched reads against lending-market contracts.
///
/// Account snapshots are returned as raw integers; shifting them by market
/// decimals is the comparator's job. Market figures are converted here.
pub struct ContractReader<C> {
    caller: C,
    batch_size: usize,
    cache: SnapshotCache,
}

impl<C: ContractCaller> ContractReader<C> {
    pub fn new(caller: C, batch_size: usize) -> Self {
        Self {
            caller,
            batch_size: batch_size.max(1),
            cache: SnapshotCache::new(),
        }
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Must be called before reading at a different block.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("snapshot cache cleared");
    }

    /// Raw `{supply, borrow}` of `account` in `market` at `block`.
    ///
    /// First lookup per (market, account) hits the contract; later ones are
    /// served from the cache regardless of `block`.
    pub async fn get_account_snapshot(
        &self,
        block: u64,
        market: Address,
        account: &str,
    ) -> Result<RawAccountSnapshot, ChainError> {
        let key = normalize_account(account);
        if let Some(hit) = self.cache.account(market, &key) {
            return Ok(hit);
        }

        let address: Address = key
            .parse()
            .map_err(|_| ChainError::InvalidAccount(key.clone()))?;
        let words = self.caller.account_snapshot(market, address, block).await?;

        if words.error_code.sign() != Sign::NoSign {
            return Err(ChainError::ProtocolError {
                market,
                account: key,
                block,
                code: words.error_code.to_string(),
            });
        }

        let snapshot = RawAccountSnapshot {
            supply: words.token_balance,
            borrow: words.borrow_balance,
        };
        self.cache.insert_account(market, key, snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshots for many accounts of one market, at most `batch_size` in
    /// flight. Completion order is irrelevant; the first failure aborts the
    /// whole market.
    pub async fn get_account_snapshots<I>(
        &self,
        block: u64,
        market: Address,
        accounts: I,
    ) -> Result<RawSnapshots, ChainError>
    where
        I: IntoIterator<Item = String>,
    {
        let reads = accounts.into_iter().map(|account| async move {
            let snapshot = self.get_account_snapshot(block, market, &account).await?;
            Ok::<_, ChainError>((normalize_account(&account), snapshot))
        });

        let snapshots: BTreeMap<_, _> = stream::iter(reads)
            .buffer_unordered(self.batch_size)
            .try_collect()
            .await?;

        debug!(%market, block, accounts = snapshots.len(), "account snapshots read");
        Ok(snapshots)
    }

    /// The eight market figures at `block`, converted to decimals.
    pub async fn get_market_values(
        &self,
        block: u64,
        info: &MarketInfo,
    ) -> Result<MarketValues, ChainError> {
        let market = info.address;
        if let Some(hit) = self.cache.market(market) {
            return Ok(hit);
        }

        let c = &self.caller;
        let (
            total_borrows,
            total_supply,
            reserves,
            cash,
            exchange_rate,
            borrow_index,
            borrow_rate,
            supply_rate,
        ) = tokio::try_join!(
            c.market_value(market, MarketCall::TotalBorrows, block),
            c.market_value(market, MarketCall::TotalSupply, block),
            c.market_value(market, MarketCall::TotalReserves, block),
            c.market_value(market, MarketCall::Cash, block),
            c.market_value(market, MarketCall::ExchangeRateStored, block),
            c.market_value(market, MarketCall::BorrowIndex, block),
            c.market_value(market, MarketCall::BorrowRatePerSecond, block),
            c.market_value(market, MarketCall::SupplyRatePerSecond, block),
        )?;

        let ud = info.underlying_decimals;
        let borrow_rate = Amount::from_raw(&borrow_rate, MANTISSA_DECIMALS);
        let supply_rate = Amount::from_raw(&supply_rate, MANTISSA_DECIMALS);

        let values = MarketValues {
            symbol: info.symbol,
            address: market,
            borrow_apy: rate_to_apy(&borrow_rate)?.truncate(MANTISSA_DECIMALS),
            supply_apy: rate_to_apy(&supply_rate)?.truncate(MANTISSA_DECIMALS),
            cash: Amount::from_raw(&cash, ud),
            reserves: Amount::from_raw(&reserves, ud),
            total_borrows: Amount::from_raw(&total_borrows, ud),
            total_supply: Amount::from_raw(&total_supply, info.decimals),
            exchange_rate: Amount::from_raw(&exchange_rate, EXCHANGE_RATE_EXTRA_DECIMALS + ud)
                .truncate(MANTISSA_DECIMALS),
            borrow_index: Amount::from_raw(&borrow_index, MANTISSA_DECIMALS),
        };

        self.cache.insert_market(values.clone());
        Ok(values)
    }
}
