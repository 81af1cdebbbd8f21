//! lrc-api
//!
//! HTTP data sources compared against the chain:
//!
//! - [`SubgraphClient`]: GraphQL indexing API. Every request is pinned to a
//!   historical block; account pagination walks a strictly increasing id
//!   cursor, one page at a time.
//! - [`PartnerClient`]: the lending protocol's own REST API.
//! - [`ResponseCache`]: read-through, block-numbered JSON files in front of
//!   the expensive fetches.
//!
//! Responses are decoded into explicit schema structs and normalized by the
//! `parse_*` functions into the source-agnostic model from `lrc-markets`.

mod cache;
mod error;
mod parse;
mod partner;
mod subgraph;

pub use cache::{ResponseCache, GRAPH_ACCOUNTS, GRAPH_MARKETS, PARTNER_ACCOUNTS};
pub use error::ApiError;
pub use parse::{
    adjust_borrow, parse_markets_info, parse_partner_accounts, parse_subgraph_accounts,
    parse_subgraph_markets, BorrowIndexAnomaly, ParsedAccounts,
};
pub use partner::{PartnerAccount, PartnerAccounts, PartnerClient};
pub use subgraph::{
    SubgraphAccount, SubgraphAccountToken, SubgraphClient, SubgraphMarket, SubgraphMarketInfo,
    SubgraphTokenMarket, DEFAULT_PAGE_SIZE,
};
