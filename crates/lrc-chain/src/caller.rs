use std::sync::Arc;

use async_trait::async_trait;
use lrc_markets::Address;
use num_bigint::BigInt;

use crate::error::ChainError;

/// The four words returned by `getAccountSnapshot`, undecoded.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AccountSnapshotWords {
    pub error_code: BigInt,
    /// Protocol-token balance (supply side).
    pub token_balance: BigInt,
    /// Stored borrow balance with interest accrued to the block.
    pub borrow_balance: BigInt,
    pub exchange_rate_mantissa: BigInt,
}

/// Zero-argument market-level view calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarketCall {
    TotalBorrows,
    TotalSupply,
    TotalReserves,
    Cash,
    ExchangeRateStored,
    BorrowIndex,
    BorrowRatePerSecond,
    SupplyRatePerSecond,
}

impl MarketCall {
    pub const ALL: [MarketCall; 8] = [
        MarketCall::TotalBorrows,
        MarketCall::TotalSupply,
        MarketCall::TotalReserves,
        MarketCall::Cash,
        MarketCall::ExchangeRateStored,
        MarketCall::BorrowIndex,
        MarketCall::BorrowRatePerSecond,
        MarketCall::SupplyRatePerSecond,
    ];

    /// Solidity method name.
    pub fn method(&self) -> &'static str {
        match self {
            MarketCall::TotalBorrows => "totalBorrows",
            MarketCall::TotalSupply => "totalSupply",
            MarketCall::TotalReserves => "totalReserves",
            MarketCall::Cash => "getCash",
            MarketCall::ExchangeRateStored => "exchangeRateStored",
            MarketCall::BorrowIndex => "borrowIndex",
            MarketCall::BorrowRatePerSecond => "borrowRatePerTimestamp",
            MarketCall::SupplyRatePerSecond => "supplyRatePerTimestamp",
        }
    }
}

/// Read-only contract transport. Every call is pinned to `block`.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    async fn account_snapshot(
        &self,
        market: Address,
        account: Address,
        block: u64,
    ) -> Result<AccountSnapshotWords, ChainError>;

    async fn market_value(
        &self,
        market: Address,
        call: MarketCall,
        block: u64,
    ) -> Result<BigInt, ChainError>;
}

#[async_trait]
impl<T: ContractCaller + ?Sized> ContractCaller for Arc<T> {
    async fn account_snapshot(
        &self,
        market: Address,
        account: Address,
        block: u64,
    ) -> Result<AccountSnapshotWords, ChainError> {
        self.as_ref().account_snapshot(market, account, block).await
    }

    async fn market_value(
        &self,
        market: Address,
        call: MarketCall,
        block: u64,
    ) -> Result<BigInt, ChainError> {
        self.as_ref().market_value(market, call, block).await
    }
}
