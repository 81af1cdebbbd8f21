use lrc_decimal::DecimalError;
use lrc_markets::Address;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Transport failure or revert. Never converted into a zero balance.
    #[error("{call} on {market} at block {block} failed: {message}")]
    Call {
        call: &'static str,
        market: Address,
        block: u64,
        message: String,
    },
    /// `getAccountSnapshot` returned a non-zero protocol error code.
    #[error("getAccountSnapshot({account}) on {market} at block {block} returned error code {code}")]
    ProtocolError {
        market: Address,
        account: String,
        block: u64,
        code: String,
    },
    #[error("invalid rpc url: {0}")]
    InvalidRpcUrl(String),
    #[error("invalid account address: {0}")]
    InvalidAccount(String),
    #[error("market value conversion failed: {0}")]
    Decimal(#[from] DecimalError),
}
