//! Route Executor Pallet
//!
//! Owner-gated executor for packed instruction buffers. A buffer is bound to exactly one
//! block by its height header and carries fixed-width records; every record pre-funds a
//! constant-product pool with a token transfer and then calls the pool's swap entry point.
//! The whole buffer runs inside one storage layer: the first failing call discards the
//! effects of every record before it.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::*;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

const LOG_TARGET: &str = "runtime::route-executor";

#[frame::pallet]
pub mod pallet {
  use super::*;
  use frame::prelude::*;
  use polkadot_sdk::frame_support::{
    PalletId,
    storage::with_storage_layer,
    traits::{fungible, tokens::Preservation},
  };
  use polkadot_sdk::sp_core::{H160, U256};
  use polkadot_sdk::sp_runtime::traits::{AccountIdConversion, SaturatedConversion};
  use primitives::{Balance, BufferError, Instruction, InstructionBuffer, abi, params};
  use scale_info::prelude::vec::Vec;

  #[pallet::config]
  pub trait Config: frame_system::Config {
    /// Native currency held by the executor account
    type Currency: fungible::Inspect<Self::AccountId, Balance = Balance>
      + fungible::Mutate<Self::AccountId>;

    /// Outbound calls into token and pool contracts
    type RawCall: RawCall<Self::AccountId>;

    /// Contract-world address of an account
    type AddressMapping: AddressMapping<Self::AccountId>;

    /// Pallet ID for account derivation
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Maximum number of records accepted in one buffer, usually
    /// `params::MAX_RECORDS_PER_DISPATCH`
    #[pallet::constant]
    type MaxRecords: Get<u32>;

    /// Weight information
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::types::BenchmarkHelper;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// The only account allowed to dispatch buffers and recover assets.
  /// Written by genesis and never changed afterwards.
  #[pallet::storage]
  #[pallet::getter(fn owner)]
  pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Every record of a buffer was executed
    Dispatched { height: u64, records: u32 },
    /// Native currency (zero token address) or a token was withdrawn to the owner
    Recovered {
      token: H160,
      amount: U256,
      to: T::AccountId,
    },
    /// Native currency was sent to the executor account
    Received { from: T::AccountId, amount: Balance },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Caller is not the recorded owner
    NotOwner,
    /// Buffer height does not match the current block
    StaleBlock,
    /// Buffer has no height header or a partial trailing record
    MalformedBuffer,
    /// Record direction flag is neither 0 nor 1
    InvalidDirection,
    /// Buffer carries more records than `MaxRecords`
    TooManyRecords,
    /// A token or native currency transfer failed
    TransferFailed,
    /// A pool swap call failed
    SwapFailed,
  }

  impl<T: Config> From<BufferError> for Error<T> {
    fn from(error: BufferError) -> Self {
      match error {
        BufferError::TooShort | BufferError::Misaligned { .. } => Error::<T>::MalformedBuffer,
        BufferError::InvalidDirection { .. } => Error::<T>::InvalidDirection,
      }
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::MaxRecords::get() > 0,
        "MaxRecords must admit at least one record"
      );
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Run a packed instruction buffer.
    ///
    /// - `buffer`: 8-byte big-endian block height followed by 105-byte records.
    ///
    /// The height must equal the current block number. Records run in order; each one
    /// transfers `amount_in` of `token_in` to `pool`, then calls the pool's swap with the
    /// executor as recipient and an empty callback payload. Any failing call reverts the
    /// whole buffer.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::dispatch(
      primitives::record_count(buffer.len()).min(T::MaxRecords::get())
    ))]
    pub fn dispatch(origin: OriginFor<T>, buffer: Vec<u8>) -> DispatchResult {
      Self::ensure_owner(origin)?;
      let parsed = InstructionBuffer::parse(&buffer).map_err(Error::<T>::from)?;
      let height = Self::ensure_fresh(&parsed)?;
      let records = Self::execute_buffer(&parsed)?;
      Self::deposit_event(Event::Dispatched { height, records });
      Ok(())
    }

    /// Withdraw `amount` to the owner: native currency when `token` is the zero address,
    /// otherwise through the token's `transfer`.
    #[pallet::call_index(1)]
    #[pallet::weight(if *token == params::NATIVE_SENTINEL {
      T::WeightInfo::recover_native()
    } else {
      T::WeightInfo::recover_token()
    })]
    pub fn recover(origin: OriginFor<T>, token: H160, amount: U256) -> DispatchResult {
      let who = Self::ensure_owner(origin)?;
      with_storage_layer(|| Self::do_recover(&who, token, amount))?;
      Self::deposit_event(Event::Recovered {
        token,
        amount,
        to: who,
      });
      Ok(())
    }

    /// Send native currency to the executor account. Open to any signed origin.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::receive())]
    pub fn receive(origin: OriginFor<T>, amount: Balance) -> DispatchResult {
      let from = ensure_signed(origin)?;
      <T::Currency as fungible::Mutate<T::AccountId>>::transfer(
        &from,
        &Self::account_id(),
        amount,
        Preservation::Preserve,
      )?;
      Self::deposit_event(Event::Received { from, amount });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Get pallet account ID
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Contract-world address of the executor; swap proceeds are sent here.
    pub fn address() -> H160 {
      T::AddressMapping::to_address(&Self::account_id())
    }

    /// Signed origin that matches the recorded owner.
    pub fn ensure_owner(origin: OriginFor<T>) -> Result<T::AccountId, DispatchError> {
      let who = ensure_signed(origin)?;
      ensure!(
        Owner::<T>::get().as_ref() == Some(&who),
        Error::<T>::NotOwner
      );
      Ok(who)
    }

    /// Returns the buffer's height if it is the current block number.
    pub fn ensure_fresh(buffer: &InstructionBuffer<'_>) -> Result<u64, DispatchError> {
      let height = buffer.height();
      let now: u64 = frame_system::Pallet::<T>::block_number().saturated_into();
      ensure!(height == now, Error::<T>::StaleBlock);
      Ok(height)
    }

    /// Execute every record of `parsed` atomically; returns the number of records run.
    ///
    /// Does not check ownership or height, callers are expected to have done so.
    pub fn execute_buffer(parsed: &InstructionBuffer<'_>) -> Result<u32, DispatchError> {
      ensure!(
        parsed.len() <= T::MaxRecords::get(),
        Error::<T>::TooManyRecords
      );
      let executor = Self::account_id();
      let recipient = Self::address();
      with_storage_layer(|| -> DispatchResult {
        for (index, instruction) in parsed.instructions().enumerate() {
          let instruction = instruction.map_err(Error::<T>::from)?;
          Self::execute_instruction(&executor, recipient, &instruction, index as u32)?;
        }
        Ok(())
      })?;
      Ok(parsed.len())
    }

    /// Transfer then swap for a single record.
    fn execute_instruction(
      executor: &T::AccountId,
      recipient: H160,
      instruction: &Instruction,
      index: u32,
    ) -> DispatchResult {
      let transfer = abi::encode_transfer(instruction.pool, instruction.amount_in);
      let outcome = T::RawCall::raw_call(executor, instruction.token_in, 0, &transfer);
      if !outcome.success || !abi::transfer_succeeded(&outcome.output) {
        log::warn!(
          target: LOG_TARGET,
          "record {}: transfer of {} via token {:?} to pool {:?} failed",
          index,
          instruction.amount_in,
          instruction.token_in,
          instruction.pool,
        );
        return Err(Error::<T>::TransferFailed.into());
      }
      let (amount0_out, amount1_out) = instruction.amounts_out();
      let swap = abi::encode_swap(amount0_out, amount1_out, recipient, &[]);
      if !T::RawCall::raw_call(executor, instruction.pool, 0, &swap).success {
        log::warn!(
          target: LOG_TARGET,
          "record {}: swap on pool {:?} for ({}, {}) failed",
          index,
          instruction.pool,
          amount0_out,
          amount1_out,
        );
        return Err(Error::<T>::SwapFailed.into());
      }
      log::debug!(
        target: LOG_TARGET,
        "record {}: {} in via {:?}, ({}, {}) out of {:?}",
        index,
        instruction.amount_in,
        instruction.token_in,
        amount0_out,
        amount1_out,
        instruction.pool,
      );
      Ok(())
    }

    fn do_recover(to: &T::AccountId, token: H160, amount: U256) -> DispatchResult {
      let executor = Self::account_id();
      if token == params::NATIVE_SENTINEL {
        let amount = Self::native_amount(amount).ok_or(Error::<T>::TransferFailed)?;
        <T::Currency as fungible::Mutate<T::AccountId>>::transfer(
          &executor,
          to,
          amount,
          Preservation::Expendable,
        )
        .map_err(|e| {
          log::warn!(target: LOG_TARGET, "native recovery of {} failed: {:?}", amount, e);
          Error::<T>::TransferFailed
        })?;
        return Ok(());
      }
      let input = abi::encode_transfer(T::AddressMapping::to_address(to), amount);
      let outcome = T::RawCall::raw_call(&executor, token, 0, &input);
      ensure!(
        outcome.success && abi::transfer_succeeded(&outcome.output),
        Error::<T>::TransferFailed
      );
      Ok(())
    }

    /// Native amounts above the balance type's range can never be covered.
    fn native_amount(amount: U256) -> Option<Balance> {
      if amount > U256::from(Balance::MAX) {
        return None;
      }
      Some(amount.low_u128())
    }
  }

  /// Genesis configuration
  #[pallet::genesis_config]
  pub struct GenesisConfig<T: Config> {
    pub owner: Option<T::AccountId>,
  }

  impl<T: Config> Default for GenesisConfig<T> {
    fn default() -> Self {
      Self { owner: None }
    }
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some(owner) = &self.owner {
        Owner::<T>::put(owner);
      }
      // Executor account must exist at zero balance so it can always be paid
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
