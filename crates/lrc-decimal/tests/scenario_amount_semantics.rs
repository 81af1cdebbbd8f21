use lrc_decimal::*;
use num_bigint::BigInt;

#[test]
fn scenario_zero_and_nan_are_both_empty_and_match() {
    let zero = Amount::zero();
    let nan = Amount::NaN;

    assert!(zero.is_empty());
    assert!(nan.is_empty());
    assert!(zero.matches(&nan));
    assert!(nan.matches(&zero));
    assert!(nan.matches(&Amount::NaN));

    // matching is not equality
    assert!(!nan.equals(&Amount::NaN));
    assert!(!zero.equals(&nan));
}

#[test]
fn scenario_nonzero_never_matches_empty() {
    let v = Amount::parse("0.000001");
    assert!(!v.matches(&Amount::zero()));
    assert!(!v.matches(&Amount::NaN));
}

#[test]
fn scenario_equality_ignores_scale_but_not_value() {
    assert!(Amount::parse("5").equals(&Amount::parse("5.000")));
    assert!(!Amount::parse("5").equals(&Amount::parse("5.000001")));
}

#[test]
fn scenario_truncate_is_idempotent_floor() {
    let a = Amount::parse("1.999");
    let once = a.truncate(2);
    assert!(once.equals(&Amount::parse("1.99")));
    assert!(once.truncate(2).equals(&once));
}

#[test]
fn scenario_exchange_rate_conversion_matches_raw_shift() {
    // 200_000_000_000_000_000_000_000_000 raw, underlying 18 decimals -> shift 28
    let raw: BigInt = "200000000000000000000000000".parse().unwrap();
    let rate = Amount::from_raw(&raw, 10 + 18).truncate(18);
    assert_eq!(rate.to_string(), "0.02");
}

#[test]
fn scenario_borrow_adjustment_is_exact_before_floor() {
    // stored 100 at account index 1.0, market index 1.1, 6 underlying decimals
    let adjusted = Amount::mul_div_floor(
        &Amount::parse("100"),
        &Amount::parse("1.1"),
        &Amount::parse("1.0"),
        6,
    )
    .unwrap();
    assert!(adjusted.equals(&Amount::parse("110")));

    // a third is floored, never rounded up
    let third = Amount::mul_div_floor(
        &Amount::parse("1"),
        &Amount::parse("2"),
        &Amount::parse("3"),
        6,
    )
    .unwrap();
    assert_eq!(third.to_string(), "0.666666");
}

#[test]
fn scenario_nan_arithmetic_is_an_error_not_zero() {
    let err = Amount::NaN.checked_mul(&Amount::one()).unwrap_err();
    assert_eq!(err, DecimalError::NotANumber);

    let err = Amount::mul_div_floor(&Amount::one(), &Amount::NaN, &Amount::one(), 6).unwrap_err();
    assert_eq!(err, DecimalError::NotANumber);
}
