//! Ecosystem Constants for the Route Executor
//!
//! Pallet identifiers and fixed parameters shared between the pallet, its runtime
//! configuration and the off-chain tooling that builds instruction buffers.

use polkadot_sdk::sp_core::H160;

/// Balance type alias for consistency across the workspace
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// Used with `PalletId::into_account_truncating()` to derive the executor's sovereign account.
pub mod pallet_ids {
  /// Route Executor pallet ID (privileged swap dispatcher)
  pub const ROUTE_EXECUTOR_PALLET_ID: &[u8; 8] = b"routexec";
}

/// Parameters fixing the executor's wire contract and limits.
pub mod params {
  use super::H160;

  /// Width of the big-endian block height header at the front of every buffer.
  pub const HEIGHT_LEN: usize = 8;

  /// Width of one packed instruction record.
  pub const RECORD_LEN: usize = 105;

  /// Default upper bound on records in a single dispatch.
  pub const MAX_RECORDS_PER_DISPATCH: u32 = 32;

  /// Token address that selects the native currency in recovery requests.
  pub const NATIVE_SENTINEL: H160 = H160([0u8; 20]);
}
