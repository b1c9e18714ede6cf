use polkadot_sdk::sp_core::H160;
use primitives::Balance;
use scale_info::prelude::vec::Vec;

#[cfg(feature = "runtime-benchmarks")]
use {polkadot_sdk::sp_core::U256, primitives::Instruction};

/// Result of a raw call into the contract world.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOutcome {
  /// `false` when the callee reverted or the call could not be made at all.
  pub success: bool,
  /// Raw return data.
  pub output: Vec<u8>,
}

impl CallOutcome {
  pub fn succeeded(output: Vec<u8>) -> Self {
    Self {
      success: true,
      output,
    }
  }

  pub fn failed() -> Self {
    Self::default()
  }
}

/// Raw external call into a contract: `(target, value, payload) -> (success, returndata)`.
///
/// Payloads are built by `primitives::abi`; implementors only move bytes and value.
pub trait RawCall<AccountId> {
  fn raw_call(caller: &AccountId, target: H160, value: Balance, input: &[u8]) -> CallOutcome;
}

/// Without a contract host every call fails.
impl<AccountId> RawCall<AccountId> for () {
  fn raw_call(_: &AccountId, _: H160, _: Balance, _: &[u8]) -> CallOutcome {
    CallOutcome::failed()
  }
}

/// Maps an account to the address it has in the contract world.
pub trait AddressMapping<AccountId> {
  fn to_address(account: &AccountId) -> H160;
}

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper {
  /// Deploy contracts for a `hops`-long route funded for `executor` and return its records.
  fn setup_route(executor: H160, hops: u32) -> Vec<Instruction>;

  /// Deploy a token holding `amount` for `holder` and return its address.
  fn setup_token(holder: H160, amount: U256) -> H160;
}
