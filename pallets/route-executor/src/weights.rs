#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn dispatch(r: u32) -> Weight;
  fn recover_native() -> Weight;
  fn recover_token() -> Weight;
  fn receive() -> Weight;
}

/// Per-record cost covers two outbound calls; the contract host charges its own
/// execution on top of this.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
  fn dispatch(r: u32) -> Weight {
    Weight::from_parts(12_000_000, 1500)
      .saturating_add(Weight::from_parts(45_000_000, 6000).saturating_mul(r.into()))
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().reads(4_u64.saturating_mul(r.into())))
      .saturating_add(T::DbWeight::get().writes(4_u64.saturating_mul(r.into())))
  }
  fn recover_native() -> Weight {
    Weight::from_parts(30_000_000, 3600)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(2))
  }
  fn recover_token() -> Weight {
    Weight::from_parts(35_000_000, 4000)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(2))
  }
  fn receive() -> Weight {
    Weight::from_parts(25_000_000, 3600)
      .saturating_add(T::DbWeight::get().reads(2))
      .saturating_add(T::DbWeight::get().writes(2))
  }
}

impl WeightInfo for () {
  fn dispatch(r: u32) -> Weight {
    Weight::from_parts(12_000_000, 1500)
      .saturating_add(Weight::from_parts(45_000_000, 6000).saturating_mul(r.into()))
      .saturating_add(RocksDbWeight::get().reads(2))
      .saturating_add(RocksDbWeight::get().reads(4_u64.saturating_mul(r.into())))
      .saturating_add(RocksDbWeight::get().writes(4_u64.saturating_mul(r.into())))
  }
  fn recover_native() -> Weight {
    Weight::from_parts(30_000_000, 3600)
  }
  fn recover_token() -> Weight {
    Weight::from_parts(35_000_000, 4000)
  }
  fn receive() -> Weight {
    Weight::from_parts(25_000_000, 3600)
  }
}
