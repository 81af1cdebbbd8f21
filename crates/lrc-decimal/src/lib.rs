//! lrc-decimal
//!
//! Exact decimal amounts for balance reconciliation.
//!
//! # Motivation
//!
//! Every value compared by the reconciler (balances, indexes, rates, exchange
//! rates) arrives either as a base-10 string from an HTTP source or as a raw
//! integer from a contract call that must be shifted by a per-market decimal
//! count. Comparing those with floats would report phantom mismatches, so all
//! values are held as arbitrary-precision [`BigDecimal`]s and compared exactly.
//!
//! # The NaN sentinel
//!
//! Upstream sources sometimes omit a field or send something unparseable. Such
//! a value becomes [`Amount::NaN`] instead of an error or a silent zero:
//!
//! - For comparison, NaN is *empty*, exactly like zero ([`Amount::is_empty`],
//!   [`Amount::matches`]).
//! - For arithmetic, NaN is rejected with [`DecimalError::NotANumber`]. It is
//!   never coerced to zero.
//!
//! # Precision
//!
//! Multiplication, subtraction and powers are exact. The only place digits
//! are dropped is an explicit floor truncation ([`Amount::truncate`],
//! [`Amount::mul_div_floor`]), which rounds toward negative infinity.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Arithmetic failures. Comparison never fails; only arithmetic does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    /// An operand was the NaN sentinel.
    #[error("arithmetic on a not-a-number amount")]
    NotANumber,
    /// The divisor was exactly zero.
    #[error("division by zero")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// An exact decimal value, or the NaN sentinel for an unparseable/absent input.
///
/// The scale is not part of the type: it is whatever the producing operation
/// yields. Equality is by value, so `5` equals `5.000` but not `5.000001`.
#[derive(Clone, Debug)]
pub enum Amount {
    Value(BigDecimal),
    NaN,
}

impl Amount {
    pub fn zero() -> Self {
        Amount::Value(BigDecimal::zero())
    }

    pub fn one() -> Self {
        Amount::Value(BigDecimal::one())
    }

    pub fn from_decimal(value: BigDecimal) -> Self {
        Amount::Value(value)
    }

    /// Interpret a raw on-chain integer as a fixed-point number with `decimals`
    /// fractional digits, e.g. `from_raw(50_000_000, 6) == 50`.
    pub fn from_raw(raw: &BigInt, decimals: u32) -> Self {
        Amount::Value(BigDecimal::new(raw.clone(), i64::from(decimals)))
    }

    /// Lenient parse: anything that is not a base-10 number becomes NaN.
    pub fn parse(raw: &str) -> Self {
        match BigDecimal::from_str(raw.trim()) {
            Ok(v) => Amount::Value(v),
            Err(_) => Amount::NaN,
        }
    }

    /// Parse an optional field; a missing field is NaN.
    pub fn parse_opt(raw: Option<&str>) -> Self {
        raw.map(Amount::parse).unwrap_or(Amount::NaN)
    }

    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Amount::Value(v) => Some(v),
            Amount::NaN => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Amount::NaN)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Amount::Value(v) => v.is_zero(),
            Amount::NaN => false,
        }
    }

    /// `true` for zero and for NaN.
    pub fn is_empty(&self) -> bool {
        self.is_nan() || self.is_zero()
    }

    /// `true` only for a real value strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        match self {
            Amount::Value(v) => v.sign() == Sign::Plus,
            Amount::NaN => false,
        }
    }

    /// Exact equality. NaN equals nothing, not even NaN.
    pub fn equals(&self, other: &Amount) -> bool {
        match (self, other) {
            (Amount::Value(a), Amount::Value(b)) => a == b,
            _ => false,
        }
    }

    /// Reconciliation equality: exactly equal, or both empty.
    ///
    /// `matches(0, NaN)` is true: a source that reports nothing for a leg
    /// agrees with a source that reports an explicit zero.
    pub fn matches(&self, other: &Amount) -> bool {
        self.equals(other) || (self.is_empty() && other.is_empty())
    }

    /// Floor to `decimals` fractional digits. NaN stays NaN.
    ///
    /// Idempotent, and rounds toward negative infinity: `1.999 -> 1.99`.
    pub fn truncate(&self, decimals: u32) -> Amount {
        match self {
            Amount::Value(v) => {
                let (digits, scale) = v.as_bigint_and_exponent();
                let target = i64::from(decimals);
                if scale <= target {
                    return self.clone();
                }
                let divisor = pow10((scale - target) as usize);
                Amount::Value(BigDecimal::new(digits.div_floor(&divisor), target))
            }
            Amount::NaN => Amount::NaN,
        }
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, DecimalError> {
        let (a, b) = both(self, other)?;
        Ok(Amount::Value(a + b))
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, DecimalError> {
        let (a, b) = both(self, other)?;
        Ok(Amount::Value(a - b))
    }

    pub fn checked_mul(&self, other: &Amount) -> Result<Amount, DecimalError> {
        let (a, b) = both(self, other)?;
        Ok(Amount::Value(a * b))
    }

    /// Exact integer power. The scale grows linearly with `exp`.
    pub fn checked_pow(&self, exp: u32) -> Result<Amount, DecimalError> {
        let v = self.as_decimal().ok_or(DecimalError::NotANumber)?;
        let (digits, scale) = v.as_bigint_and_exponent();
        let raised = num_traits::pow(digits, exp as usize);
        Ok(Amount::Value(BigDecimal::new(raised, scale * i64::from(exp))))
    }

    /// `floor(a * b / c)` at `decimals` fractional digits, computed on
    /// integers so nothing is lost before the final floor.
    ///
    /// A zero divisor is an error, never an infinite or zero result.
    pub fn mul_div_floor(
        a: &Amount,
        b: &Amount,
        c: &Amount,
        decimals: u32,
    ) -> Result<Amount, DecimalError> {
        let (a, b) = both(a, b)?;
        let c = c.as_decimal().ok_or(DecimalError::NotANumber)?;
        if c.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }

        let (ai, a_scale) = a.as_bigint_and_exponent();
        let (bi, b_scale) = b.as_bigint_and_exponent();
        let (ci, c_scale) = c.as_bigint_and_exponent();

        // a*b/c * 10^decimals == ai*bi * 10^(c_scale - a_scale - b_scale + decimals) / ci
        let shift = c_scale - a_scale - b_scale + i64::from(decimals);
        let product = ai * bi;
        let (num, den) = if shift >= 0 {
            (product * pow10(shift as usize), ci)
        } else {
            (product, ci * pow10(shift.unsigned_abs() as usize))
        };

        Ok(Amount::Value(BigDecimal::new(
            num.div_floor(&den),
            i64::from(decimals),
        )))
    }
}

fn both<'a>(
    a: &'a Amount,
    b: &'a Amount,
) -> Result<(&'a BigDecimal, &'a BigDecimal), DecimalError> {
    match (a, b) {
        (Amount::Value(a), Amount::Value(b)) => Ok((a, b)),
        _ => Err(DecimalError::NotANumber),
    }
}

fn pow10(exp: usize) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp)
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

// ---------------------------------------------------------------------------
// Display: plain notation, no exponent, no trailing fractional zeros
// ---------------------------------------------------------------------------

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Value(v) => {
                let (digits, scale) = v.as_bigint_and_exponent();
                f.write_str(&plain_string(&digits, scale))
            }
            Amount::NaN => f.write_str("NaN"),
        }
    }
}

fn plain_string(digits: &BigInt, scale: i64) -> String {
    if digits.is_zero() {
        return "0".to_string();
    }
    let sign = if digits.sign() == Sign::Minus { "-" } else { "" };
    let magnitude = digits.magnitude().to_string();

    if scale <= 0 {
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        return format!("{sign}{magnitude}{zeros}");
    }

    let scale = scale as usize;
    let padded = if magnitude.len() <= scale {
        format!("{}{}", "0".repeat(scale - magnitude.len() + 1), magnitude)
    } else {
        magnitude
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    }
}

// ---------------------------------------------------------------------------
// Serde: strings out, strings or JSON numbers in
// ---------------------------------------------------------------------------

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Ok(Amount::parse(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::Value(BigDecimal::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::Value(BigDecimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // Shortest round-trip rendering, then an exact parse.
        Ok(Amount::parse(&v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount::NaN)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
