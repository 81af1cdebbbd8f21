//! lrc-reconcile
//!
//! Comparator between a data source and on-chain ground truth, or between
//! two data sources.
//!
//! - Market values: exact equality on eight figures per market.
//! - Account values: every API account is classified per leg as right,
//!   wrongful, missing or wrong-value against its contract snapshot.
//! - Account sets: per-market exclusive borrowers/suppliers of two sources.
//! - Missing resolution: arbitrates exclusive accounts with a contract read.
//!
//! Deterministic, pure logic. No IO. Contract reads are fetched beforehand
//! and passed in; identical inputs yield identical outputs.

mod accounts;
mod diff;
mod markets;
mod types;

pub use accounts::{classify_leg, find_wrongful_balance_accounts};
pub use diff::{compare_accounts, exclusive, resolve_market_missing, resolve_missing};
pub use markets::{compare_field, compare_market_values};
pub use types::*;
