use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use lrc_markets::{Address, MarketValues, RawAccountSnapshot};

/// Run-scoped memo of contract reads.
///
/// Keyed by (market, lowercased account) and by market. The block is NOT
/// part of the key: one cache serves one block, and whoever moves to another
/// block must [`clear`](SnapshotCache::clear) it first.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    accounts: Mutex<HashMap<(Address, String), RawAccountSnapshot>>,
    markets: Mutex<HashMap<Address, MarketValues>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, market: Address, account: &str) -> Option<RawAccountSnapshot> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        accounts.get(&(market, account.to_string())).cloned()
    }

    pub fn insert_account(&self, market: Address, account: String, snapshot: RawAccountSnapshot) {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        accounts.insert((market, account), snapshot);
    }

    pub fn market(&self, market: Address) -> Option<MarketValues> {
        let markets = self.markets.lock().unwrap_or_else(PoisonError::into_inner);
        markets.get(&market).cloned()
    }

    pub fn insert_market(&self, values: MarketValues) {
        let mut markets = self.markets.lock().unwrap_or_else(PoisonError::into_inner);
        markets.insert(values.address, values);
    }

    pub fn len(&self) -> usize {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        let markets = self.markets.lock().unwrap_or_else(PoisonError::into_inner);
        accounts.len() + markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.markets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn clear_drops_every_entry() {
        let cache = SnapshotCache::new();
        let m = Address::repeat_byte(1);
        cache.insert_account(
            m,
            "0xabc".into(),
            RawAccountSnapshot {
                supply: BigInt::from(1),
                borrow: BigInt::from(2),
            },
        );
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.account(m, "0xabc").unwrap().borrow, BigInt::from(2));
        assert!(cache.account(Address::repeat_byte(2), "0xabc").is_none());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.account(m, "0xabc").is_none());
    }
}
