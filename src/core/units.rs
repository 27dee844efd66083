//! Conversion between decimal ETH amounts and integer wei.
//!
//! Parsing is exact on the decimal string, never through `f64`. Digits past
//! the 18th decimal place round to the nearest wei, ties away from zero.

use alloy_primitives::U256;
use alloy_primitives::utils::format_ether;

use crate::config::ETH_DECIMALS;
use crate::core::error::AmountError;

/// Parse a user-entered ETH amount into wei.
///
/// Accepts an optional leading `+`, digits and at most one `.`; the result
/// must be strictly positive after rounding.
pub fn parse_amount(input: &str) -> Result<U256, AmountError> {
    parse_units(input, ETH_DECIMALS)
}

/// Parse a positive decimal string scaled by `10^decimals`.
pub fn parse_units(input: &str, decimals: usize) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    if let Some(negated) = trimmed.strip_prefix('-') {
        // A well-formed negative number is a sign problem, not a syntax one.
        split_decimal(negated)?;
        return Err(AmountError::NotPositive);
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (whole, fraction) = split_decimal(unsigned)?;

    let kept_len = fraction.len().min(decimals);
    let (kept, dropped) = fraction.split_at(kept_len);

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(kept);
    digits.extend(std::iter::repeat_n('0', decimals - kept_len));
    let digits = digits.trim_start_matches('0');

    let mut value = if digits.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)?
    };

    if dropped.as_bytes().first().is_some_and(|&d| d >= b'5') {
        value = value
            .checked_add(U256::from(1u8))
            .ok_or(AmountError::Overflow)?;
    }

    if value.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(value)
}

/// Split `"12.34"` into `("12", "34")`, validating that both halves are digits.
fn split_decimal(s: &str) -> Result<(&str, &str), AmountError> {
    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Malformed);
    }
    Ok((whole, fraction))
}

/// Wei to ETH as a float, for display and USD conversion only.
pub fn wei_to_eth(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or_default()
}
