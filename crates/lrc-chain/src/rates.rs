use lrc_decimal::{Amount, DecimalError};
use num_bigint::BigInt;

pub const SECONDS_PER_DAY: u32 = 86_400;
pub const DAYS_PER_YEAR: u32 = 365;

/// Fixed-point precision of rates, indexes and other mantissas.
pub const MANTISSA_DECIMALS: u32 = 18;

/// Exchange-rate mantissas carry `18 - 8` extra digits on top of the
/// underlying decimals.
pub const EXCHANGE_RATE_EXTRA_DECIMALS: u32 = 10;

/// Daily-compounded APY from a per-second rate:
/// `(rate * SECONDS_PER_DAY + 1) ^ DAYS_PER_YEAR - 1`.
///
/// Exact; callers floor the result to the precision they report.
pub fn rate_to_apy(rate_per_second: &Amount) -> Result<Amount, DecimalError> {
    let daily = rate_per_second.checked_mul(&Amount::from_raw(&BigInt::from(SECONDS_PER_DAY), 0))?;
    daily
        .checked_add(&Amount::one())?
        .checked_pow(DAYS_PER_YEAR)?
        .checked_sub(&Amount::one())
}
