//! Constant-product quotes used to size `amount_out` when building instruction buffers.

use polkadot_sdk::sp_core::U256;

/// Pool fee numerator over [`FEE_DENOMINATOR`] (0.3% fee).
pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1000;

/// Output of a fee-charging XYK pool for `amount_in`.
///
/// `out = in * 997 * r_out / (r_in * 1000 + in * 997)`
///
/// `None` when either reserve is empty or an intermediate product overflows.
pub fn v2_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256) -> Option<U256> {
  if reserve_in.is_zero() || reserve_out.is_zero() {
    return None;
  }
  let amount_in_with_fee = amount_in.checked_mul(U256::from(FEE_NUMERATOR))?;
  let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
  let denominator = reserve_in
    .checked_mul(U256::from(FEE_DENOMINATOR))?
    .checked_add(amount_in_with_fee)?;
  numerator.checked_div(denominator)
}

/// Constant-product check a pool performs after a swap, with the input side charged the
/// fee: `(b0*1000 - in0*3) * (b1*1000 - in1*3) >= r0 * r1 * 1000^2`.
pub fn k_holds(
  balances: (U256, U256),
  amounts_in: (U256, U256),
  reserves: (U256, U256),
) -> Option<bool> {
  let fee = U256::from(FEE_DENOMINATOR - FEE_NUMERATOR);
  let scale = U256::from(FEE_DENOMINATOR);
  let adjusted0 = balances
    .0
    .checked_mul(scale)?
    .checked_sub(amounts_in.0.checked_mul(fee)?)?;
  let adjusted1 = balances
    .1
    .checked_mul(scale)?
    .checked_sub(amounts_in.1.checked_mul(fee)?)?;
  let lhs = adjusted0.checked_mul(adjusted1)?;
  let rhs = reserves
    .0
    .checked_mul(reserves.1)?
    .checked_mul(scale.checked_mul(scale)?)?;
  Some(lhs >= rhs)
}
