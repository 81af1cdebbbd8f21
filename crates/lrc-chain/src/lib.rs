//! lrc-chain
//!
//! Block-pinned, read-only access to lending-market contracts.
//!
//! - [`ContractCaller`] is the transport seam: one raw `eth_call` per method,
//!   always at an explicit historical block. [`AlloyCaller`] is the JSON-RPC
//!   implementation; tests plug in an in-memory fake.
//! - [`ContractReader`] batches account reads with bounded concurrency,
//!   converts market figures to decimals, and memoizes results in a
//!   [`SnapshotCache`].
//!
//! IMPORTANT: the account cache is keyed by (market, account) only, not by
//! block. A reader serves exactly one block at a time; anything that moves
//! to a new block (the bisection driver in particular) must call
//! [`ContractReader::clear_cache`] first or it will read stale balances.

mod alloy_caller;
mod cache;
mod caller;
mod error;
mod rates;
mod reader;

pub use alloy_caller::AlloyCaller;
pub use cache::SnapshotCache;
pub use caller::{AccountSnapshotWords, ContractCaller, MarketCall};
pub use error::ChainError;
pub use rates::{rate_to_apy, DAYS_PER_YEAR, SECONDS_PER_DAY};
pub use reader::{ContractReader, DEFAULT_BATCH_SIZE};
