use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Rounding direction for proportional conversions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// `a * b / denominator` with a u128 intermediate
///
/// Fails with `MathOverflow` when the result does not fit in u64 or the
/// denominator is zero.
pub fn mul_div(a: u64, b: u128, denominator: u128, rounding: Rounding) -> Result<u64> {
    let numerator = (a as u128)
        .checked_mul(b)
        .ok_or(error!(VaultError::MathOverflow))?;

    let mut quotient = numerator
        .checked_div(denominator)
        .ok_or(error!(VaultError::MathOverflow))?;

    if rounding == Rounding::Ceil && numerator % denominator != 0 {
        quotient = quotient
            .checked_add(1)
            .ok_or(error!(VaultError::MathOverflow))?;
    }

    u64::try_from(quotient).map_err(|_| error!(VaultError::MathOverflow))
}

/// Absolute change from `current` to `proposed`, in basis points of `current`
pub fn deviation_bps(current: u64, proposed: u64) -> Result<u128> {
    let delta = current.abs_diff(proposed) as u128;
    delta
        .checked_mul(crate::constants::BPS_DENOMINATOR)
        .ok_or(error!(VaultError::MathOverflow))?
        .checked_div(current as u128)
        .ok_or(error!(VaultError::MathOverflow))
}
