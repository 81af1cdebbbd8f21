use alloy::primitives::U256;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::BlockId;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use lrc_markets::Address;
use num_bigint::{BigInt, Sign};

use crate::caller::{AccountSnapshotWords, ContractCaller, MarketCall};
use crate::error::ChainError;

sol! {
    #[sol(rpc)]
    interface IQiToken {
        function getAccountSnapshot(address account)
            external
            view
            returns (
                uint256 errorCode,
                uint256 tokenBalance,
                uint256 borrowBalance,
                uint256 exchangeRateMantissa
            );
        function totalBorrows() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function totalReserves() external view returns (uint256);
        function getCash() external view returns (uint256);
        function exchangeRateStored() external view returns (uint256);
        function borrowIndex() external view returns (uint256);
        function borrowRatePerTimestamp() external view returns (uint256);
        function supplyRatePerTimestamp() external view returns (uint256);
    }
}

/// JSON-RPC transport over HTTP. Cheap to clone.
#[derive(Clone)]
pub struct AlloyCaller {
    provider: DynProvider,
}

impl AlloyCaller {
    pub fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let url = rpc_url
            .parse::<Url>()
            .map_err(|e| ChainError::InvalidRpcUrl(format!("{rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider })
    }

    pub fn from_provider(provider: DynProvider) -> Self {
        Self { provider }
    }
}

fn to_bigint(v: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &v.to_be_bytes::<32>())
}

fn call_failed(
    call: &'static str,
    market: Address,
    block: u64,
    err: alloy::contract::Error,
) -> ChainError {
    ChainError::Call {
        call,
        market,
        block,
        message: err.to_string(),
    }
}

#[async_trait]
impl ContractCaller for AlloyCaller {
    async fn account_snapshot(
        &self,
        market: Address,
        account: Address,
        block: u64,
    ) -> Result<AccountSnapshotWords, ChainError> {
        let token = IQiToken::new(market, &self.provider);
        let out = token
            .getAccountSnapshot(account)
            .block(BlockId::number(block))
            .call()
            .await
            .map_err(|e| call_failed("getAccountSnapshot", market, block, e))?;

        Ok(AccountSnapshotWords {
            error_code: to_bigint(out.errorCode),
            token_balance: to_bigint(out.tokenBalance),
            borrow_balance: to_bigint(out.borrowBalance),
            exchange_rate_mantissa: to_bigint(out.exchangeRateMantissa),
        })
    }

    async fn market_value(
        &self,
        market: Address,
        call: MarketCall,
        block: u64,
    ) -> Result<BigInt, ChainError> {
        let token = IQiToken::new(market, &self.provider);
        let at = BlockId::number(block);

        let out = match call {
            MarketCall::TotalBorrows => token.totalBorrows().block(at).call().await,
            MarketCall::TotalSupply => token.totalSupply().block(at).call().await,
            MarketCall::TotalReserves => token.totalReserves().block(at).call().await,
            MarketCall::Cash => token.getCash().block(at).call().await,
            MarketCall::ExchangeRateStored => token.exchangeRateStored().block(at).call().await,
            MarketCall::BorrowIndex => token.borrowIndex().block(at).call().await,
            MarketCall::BorrowRatePerSecond => token.borrowRatePerTimestamp().block(at).call().await,
            MarketCall::SupplyRatePerSecond => token.supplyRatePerTimestamp().block(at).call().await,
        }
        .map_err(|e| call_failed(call.method(), market, block, e))?;

        Ok(to_bigint(out))
    }
}
