use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ApiError;

/// Rows per account page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const ACCOUNTS_QUERY: &str = r#"query Accounts($lastId: ID!, $first: Int!, $block: Int!) {
  accounts(orderBy: id, first: $first, where: { id_gt: $lastId }, block: { number: $block }) {
    id
    tokens {
      totalSupplyAmount: cTokenBalance
      storedBorrowBalance
      accountBorrowIndex
      market {
        borrowIndex
      }
      symbol
    }
  }
}"#;

const MARKETS_QUERY: &str = r#"query Markets($block: Int!) {
  markets(block: { number: $block }) {
    symbol
    id
    borrowRateAPY
    supplyRateAPY
    cash
    reserves
    totalBorrows
    totalSupply
    exchangeRate
    borrowIndex
  }
}"#;

const MARKETS_INFO_QUERY: &str = r#"query MarketsInfo($block: Int!) {
  markets(block: { number: $block }) {
    borrowersCount
    suppliersCount
    symbol
    id
    underlyingDecimals
  }
}"#;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// One account row. Decimal fields stay strings until normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphAccount {
    pub id: String,
    #[serde(default)]
    pub tokens: Vec<SubgraphAccountToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphAccountToken {
    /// Protocol-token balance.
    pub total_supply_amount: Option<String>,
    pub stored_borrow_balance: Option<String>,
    pub account_borrow_index: Option<String>,
    pub market: Option<SubgraphTokenMarket>,
    /// On-chain protocol-token ticker.
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphTokenMarket {
    pub borrow_index: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphMarket {
    pub symbol: String,
    pub id: String,
    #[serde(rename = "borrowRateAPY")]
    pub borrow_rate_apy: Option<String>,
    #[serde(rename = "supplyRateAPY")]
    pub supply_rate_apy: Option<String>,
    pub cash: Option<String>,
    pub reserves: Option<String>,
    pub total_borrows: Option<String>,
    pub total_supply: Option<String>,
    pub exchange_rate: Option<String>,
    pub borrow_index: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphMarketInfo {
    pub symbol: String,
    pub id: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub borrowers_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub suppliers_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub underlying_decimals: u64,
}

/// GraphQL `BigInt`/`Int` fields arrive as either strings or numbers.
fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match NumOrString::deserialize(d)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountsData {
    accounts: Vec<SubgraphAccount>,
}

#[derive(Debug, Deserialize)]
struct MarketsData<T> {
    markets: Vec<T>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Block-pinned GraphQL client for the lending-protocol subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: reqwest::Client,
    url: String,
    page_size: usize,
}

impl SubgraphClient {
    pub fn new(url: String) -> Self {
        Self::with_client(reqwest::Client::new(), url, DEFAULT_PAGE_SIZE)
    }

    pub fn with_client(http: reqwest::Client, url: String, page_size: usize) -> Self {
        Self {
            http,
            url,
            page_size: page_size.max(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Every account with its per-market token rows, as of `block`.
    ///
    /// Pages are fetched sequentially; each page is pinned to the same block
    /// and starts after the last id of the previous one. A page shorter than
    /// the page size ends the walk.
    pub async fn fetch_accounts(&self, block: u64) -> Result<Vec<SubgraphAccount>, ApiError> {
        let mut out: Vec<SubgraphAccount> = Vec::new();
        let mut last_id = String::new();

        loop {
            let page: AccountsData = self
                .query(
                    ACCOUNTS_QUERY,
                    json!({ "lastId": last_id, "first": self.page_size, "block": block }),
                )
                .await?;

            let rows = page.accounts.len();
            if let Some(last) = page.accounts.last() {
                if last.id <= last_id {
                    return Err(ApiError::StalledCursor(last_id));
                }
                last_id = last.id.clone();
            }
            out.extend(page.accounts);
            debug!(block, rows, total = out.len(), "subgraph accounts page");

            if rows < self.page_size {
                break;
            }
        }

        Ok(out)
    }

    /// Market-level figures as indexed at `block`.
    pub async fn fetch_markets(&self, block: u64) -> Result<Vec<SubgraphMarket>, ApiError> {
        let data: MarketsData<SubgraphMarket> =
            self.query(MARKETS_QUERY, json!({ "block": block })).await?;
        Ok(data.markets)
    }

    /// Counts and underlying decimals per market at `block`.
    pub async fn fetch_markets_info(
        &self,
        block: u64,
    ) -> Result<Vec<SubgraphMarketInfo>, ApiError> {
        let data: MarketsData<SubgraphMarketInfo> =
            self.query(MARKETS_INFO_QUERY, json!({ "block": block })).await?;
        Ok(data.markets)
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ApiError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|source| ApiError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| ApiError::Http {
            url: self.url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse<T> =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                what: "subgraph response".to_string(),
                source,
            })?;

        if !parsed.errors.is_empty() {
            let messages: Vec<_> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(ApiError::GraphQl(messages.join("; ")));
        }
        parsed.data.ok_or(ApiError::MissingData("subgraph data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_info_counts_accept_strings_and_numbers() {
        let row: SubgraphMarketInfo = serde_json::from_value(json!({
            "symbol": "qiUSDC",
            "id": "0xbeb5d47a3f720ec0a390d04b4d41ed7d9688bc7f",
            "borrowersCount": "12",
            "suppliersCount": 40,
            "underlyingDecimals": 6
        }))
        .unwrap();
        assert_eq!(row.borrowers_count, 12);
        assert_eq!(row.suppliers_count, 40);
        assert_eq!(row.underlying_decimals, 6);
    }

    #[test]
    fn account_token_reads_aliased_supply_field() {
        let row: SubgraphAccountToken = serde_json::from_value(json!({
            "totalSupplyAmount": "10.5",
            "storedBorrowBalance": "0",
            "accountBorrowIndex": "1",
            "market": { "borrowIndex": "1.2" },
            "symbol": "qiAVAX"
        }))
        .unwrap();
        assert_eq!(row.total_supply_amount.as_deref(), Some("10.5"));
        assert_eq!(
            row.market.unwrap().borrow_index.as_deref(),
            Some("1.2")
        );
    }
}
