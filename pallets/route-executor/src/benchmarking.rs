extern crate alloc;

use crate::{types::BenchmarkHelper, *};
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::{
  Get,
  fungible::{Inspect, Mutate},
};
use polkadot_sdk::frame_system::RawOrigin;
use polkadot_sdk::sp_core::U256;
use polkadot_sdk::sp_runtime::traits::SaturatedConversion;
use primitives::{BufferBuilder, params};

fn set_owner<T: Config>() -> T::AccountId {
  let caller: T::AccountId = whitelisted_caller();
  Owner::<T>::put(caller.clone());
  caller
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn dispatch(r: Linear<0, { T::MaxRecords::get() }>) {
    let caller = set_owner::<T>();
    let route = T::BenchmarkHelper::setup_route(Pallet::<T>::address(), r);
    let height: u64 = polkadot_sdk::frame_system::Pallet::<T>::block_number().saturated_into();
    let buffer = BufferBuilder::new(height).extend(route.iter()).build();

    #[extrinsic_call]
    dispatch(RawOrigin::Signed(caller), buffer);
  }

  #[benchmark]
  fn recover_native() {
    let caller = set_owner::<T>();
    let amount = T::Currency::minimum_balance().saturating_mul(100);
    T::Currency::mint_into(&Pallet::<T>::account_id(), amount)
      .expect("Failed to fund executor");

    #[extrinsic_call]
    recover(
      RawOrigin::Signed(caller.clone()),
      params::NATIVE_SENTINEL,
      U256::from(amount),
    );

    assert!(T::Currency::balance(&caller) >= amount);
  }

  #[benchmark]
  fn recover_token() {
    let caller = set_owner::<T>();
    let amount = U256::from(1_000_000u64);
    let token = T::BenchmarkHelper::setup_token(Pallet::<T>::address(), amount);

    #[extrinsic_call]
    recover(RawOrigin::Signed(caller), token, amount);
  }

  #[benchmark]
  fn receive() {
    let caller: T::AccountId = whitelisted_caller();
    let ed = T::Currency::minimum_balance();
    T::Currency::mint_into(&caller, ed.saturating_mul(1000)).expect("Failed to fund caller");
    let amount = ed.saturating_mul(10);

    #[extrinsic_call]
    receive(RawOrigin::Signed(caller), amount);

    assert!(T::Currency::balance(&Pallet::<T>::account_id()) >= amount);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
