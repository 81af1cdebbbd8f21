//! lrc-markets
//!
//! Market registry and the source-agnostic account/market model shared by
//! every data source (subgraph, partner API, contract reads).
//!
//! The registry is a closed, hard-coded enumeration. Lookups are total:
//! unknown input maps to [`MarketSymbol::NotApplicable`] so that loops over
//! upstream data can skip unmapped markets instead of failing.

mod registry;
mod types;

pub use registry::{
    address_for_symbol, symbol_for_address, symbol_for_name, symbol_for_onchain_ticker,
    MarketSymbol,
};
pub use types::*;

pub use alloy::primitives::Address;
