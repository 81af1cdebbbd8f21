use std::collections::BTreeMap;

use lrc_decimal::Amount;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// One account's per-market balances, keyed by canonical market name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartnerAccount {
    #[serde(default)]
    pub supply: BTreeMap<String, Amount>,
    #[serde(default)]
    pub borrows: BTreeMap<String, Amount>,
}

/// Account address (as sent) -> balances.
pub type PartnerAccounts = BTreeMap<String, PartnerAccount>;

/// REST client for the lending protocol's own users endpoint.
#[derive(Debug, Clone)]
pub struct PartnerClient {
    http: reqwest::Client,
    base_url: String,
}

impl PartnerClient {
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url.trim_end_matches('/'))
    }

    /// All accounts with balances as of `block`.
    pub async fn fetch_accounts(&self, block: u64) -> Result<PartnerAccounts, ApiError> {
        let url = self.users_url();
        let resp = self
            .http
            .get(&url)
            .query(&[("block", block)])
            .send()
            .await
            .map_err(|source| ApiError::Http {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| ApiError::Http {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let accounts: PartnerAccounts =
            serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                what: "partner users response".to_string(),
                source,
            })?;
        debug!(block, accounts = accounts.len(), "partner accounts fetched");
        Ok(accounts)
    }
}
