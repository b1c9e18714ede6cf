use crate as pallet_route_executor;
use crate::types::{AddressMapping, CallOutcome, RawCall};

use codec::{Decode, Encode};
use hex_literal::hex;
use polkadot_sdk::frame_support::pallet_prelude::ValueQuery;
use polkadot_sdk::frame_support::{
  Blake2_128Concat, PalletId, construct_runtime, derive_impl,
  storage::with_storage_layer,
  storage_alias,
  traits::{ConstU32, ConstU128, Get, fungible::Mutate},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_core::{H160, U256};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{Balance, abi, quote};
use std::cell::RefCell;

pub const OWNER: u64 = 1;
pub const ALICE: u64 = 2;
pub const BOB: u64 = 3;
pub const INITIAL_BALANCE: Balance = 10_000;
pub const EXECUTOR_NATIVE: Balance = 1_000;
pub const START_BLOCK: u64 = 7;
pub const MAX_RECORDS: u32 = 4;

pub const TOKEN_A: H160 = H160(hex!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"));
pub const TOKEN_B: H160 = H160(hex!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));
pub const TOKEN_C: H160 = H160(hex!("6b175474e89094c44da98b954eedeac495271d0f"));
pub const VOID_TOKEN: H160 = H160([0xd0; 20]);
pub const FALSE_TOKEN: H160 = H160([0xe0; 20]);
pub const REVERTING_TOKEN: H160 = H160([0xf0; 20]);
/// token0 = A, token1 = B
pub const POOL_AB: H160 = H160(hex!("b4e16d0168e52d35cacd2c6185b44281ec28c9dc"));
/// token0 = A, token1 = C
pub const POOL_AC: H160 = H160(hex!("a478c2975ab1ea89e8196811f51a7b7ade33eb11"));
/// token0 = A, token1 = VOID
pub const POOL_AV: H160 = H160([0x3a; 20]);

const REVERT: DispatchError = DispatchError::Other("revert");

thread_local! {
  // Every raw call made by the pallet, in order, including reverted ones
  pub static CALL_TRACE: RefCell<Vec<(H160, Vec<u8>)>> = const { RefCell::new(Vec::new()) };
}

pub fn call_trace() -> Vec<(H160, Vec<u8>)> {
  CALL_TRACE.with(|t| t.borrow().clone())
}

pub fn clear_call_trace() {
  CALL_TRACE.with(|t| t.borrow_mut().clear());
}

/// How a mock token answers `transfer`.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq)]
pub enum TokenKind {
  /// Moves funds and returns `true`
  Standard,
  /// Moves funds and returns no data
  ReturnsNothing,
  /// Moves nothing and returns `false`
  ReturnsFalse,
  /// Always reverts
  Reverts,
}

#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq)]
pub struct MockPair {
  pub token0: H160,
  pub token1: H160,
  pub reserve0: U256,
  pub reserve1: U256,
}

// Contract state lives in storage so nested storage layers roll it back
#[storage_alias]
pub type Tokens = StorageMap<MockContracts, Blake2_128Concat, H160, TokenKind>;

#[storage_alias]
pub type TokenBalances =
  StorageDoubleMap<MockContracts, Blake2_128Concat, H160, Blake2_128Concat, H160, U256, ValueQuery>;

#[storage_alias]
pub type Pairs = StorageMap<MockContracts, Blake2_128Concat, H160, MockPair>;

pub fn deploy_token(token: H160, kind: TokenKind) {
  Tokens::insert(token, kind);
}

pub fn mint_tokens(token: H160, holder: H160, amount: u128) {
  TokenBalances::mutate(token, holder, |b| *b = b.saturating_add(U256::from(amount)));
}

pub fn deploy_pair(pool: H160, token0: H160, token1: H160, reserve0: u128, reserve1: u128) {
  Pairs::insert(
    pool,
    MockPair {
      token0,
      token1,
      reserve0: U256::from(reserve0),
      reserve1: U256::from(reserve1),
    },
  );
  mint_tokens(token0, pool, reserve0);
  mint_tokens(token1, pool, reserve1);
}

pub fn token_balance(token: H160, holder: H160) -> U256 {
  TokenBalances::get(token, holder)
}

/// `balanceOf(holder)` answered by the token contract itself.
pub fn balance_of(token: H160, holder: H160) -> Option<U256> {
  let outcome = MockContractHost::raw_call(&OWNER, token, 0, &abi::encode_balance_of(holder));
  if !outcome.success {
    return None;
  }
  outcome.output.get(..abi::WORD).map(U256::from_big_endian)
}

pub fn reserves(pool: H160) -> Option<(U256, U256)> {
  Pairs::get(pool).map(|pair| (pair.reserve0, pair.reserve1))
}

/// Contract host for tests: ERC20-like tokens and constant-product pairs.
pub struct MockContractHost;

impl RawCall<u64> for MockContractHost {
  fn raw_call(caller: &u64, target: H160, value: Balance, input: &[u8]) -> CallOutcome {
    CALL_TRACE.with(|t| t.borrow_mut().push((target, input.to_vec())));
    let caller = MockAddressMapping::to_address(caller);
    match with_storage_layer(|| execute(caller, target, value, input)) {
      Ok(output) => CallOutcome::succeeded(output),
      Err(_) => CallOutcome::failed(),
    }
  }
}

fn execute(
  caller: H160,
  target: H160,
  value: Balance,
  input: &[u8],
) -> Result<Vec<u8>, DispatchError> {
  // Nothing here is payable
  if value != 0 {
    return Err(REVERT);
  }
  if let Some(kind) = Tokens::get(target) {
    return token_call(target, kind, caller, input);
  }
  if let Some(pair) = Pairs::get(target) {
    return pair_call(target, pair, input);
  }
  Err(REVERT)
}

fn token_call(
  token: H160,
  kind: TokenKind,
  caller: H160,
  input: &[u8],
) -> Result<Vec<u8>, DispatchError> {
  match abi::selector(input).ok_or(REVERT)? {
    abi::TRANSFER_SELECTOR => {
      let to = abi::read_address(input, 0).ok_or(REVERT)?;
      let amount = abi::read_u256(input, 1).ok_or(REVERT)?;
      match kind {
        TokenKind::Reverts => Err(REVERT),
        TokenKind::ReturnsFalse => Ok(abi::bool_word(false).to_vec()),
        TokenKind::Standard => {
          move_tokens(token, caller, to, amount)?;
          Ok(abi::bool_word(true).to_vec())
        }
        TokenKind::ReturnsNothing => {
          move_tokens(token, caller, to, amount)?;
          Ok(Vec::new())
        }
      }
    }
    abi::BALANCE_OF_SELECTOR => {
      let owner = abi::read_address(input, 0).ok_or(REVERT)?;
      Ok(abi::u256_word(TokenBalances::get(token, owner)).to_vec())
    }
    _ => Err(REVERT),
  }
}

fn move_tokens(token: H160, from: H160, to: H160, amount: U256) -> Result<(), DispatchError> {
  if to.is_zero() {
    return Err(REVERT);
  }
  let remaining = TokenBalances::get(token, from)
    .checked_sub(amount)
    .ok_or(REVERT)?;
  TokenBalances::insert(token, from, remaining);
  TokenBalances::mutate(token, to, |b| *b = b.saturating_add(amount));
  Ok(())
}

fn pair_call(pool: H160, pair: MockPair, input: &[u8]) -> Result<Vec<u8>, DispatchError> {
  if abi::selector(input) != Some(abi::SWAP_SELECTOR) {
    return Err(REVERT);
  }
  let amount0_out = abi::read_u256(input, 0).ok_or(REVERT)?;
  let amount1_out = abi::read_u256(input, 1).ok_or(REVERT)?;
  let to = abi::read_address(input, 2).ok_or(REVERT)?;
  let data = abi::read_bytes(input, 3).ok_or(REVERT)?;
  // Flash swaps are not modelled
  if !data.is_empty() || (amount0_out.is_zero() && amount1_out.is_zero()) {
    return Err(REVERT);
  }
  if amount0_out >= pair.reserve0 || amount1_out >= pair.reserve1 {
    return Err(REVERT);
  }
  if !amount0_out.is_zero() {
    move_tokens(pair.token0, pool, to, amount0_out)?;
  }
  if !amount1_out.is_zero() {
    move_tokens(pair.token1, pool, to, amount1_out)?;
  }
  let balance0 = TokenBalances::get(pair.token0, pool);
  let balance1 = TokenBalances::get(pair.token1, pool);
  let amount0_in = balance0.saturating_sub(pair.reserve0 - amount0_out);
  let amount1_in = balance1.saturating_sub(pair.reserve1 - amount1_out);
  if amount0_in.is_zero() && amount1_in.is_zero() {
    return Err(REVERT);
  }
  let k = quote::k_holds(
    (balance0, balance1),
    (amount0_in, amount1_in),
    (pair.reserve0, pair.reserve1),
  );
  if k != Some(true) {
    return Err(REVERT);
  }
  Pairs::insert(
    pool,
    MockPair {
      reserve0: balance0,
      reserve1: balance1,
      ..pair
    },
  );
  Ok(Vec::new())
}

pub struct MockAddressMapping;

impl AddressMapping<u64> for MockAddressMapping {
  fn to_address(account: &u64) -> H160 {
    let mut bytes = [0xee; 20];
    bytes[12..].copy_from_slice(&account.to_be_bytes());
    H160(bytes)
  }
}

pub fn address_of(account: u64) -> H160 {
  MockAddressMapping::to_address(&account)
}

pub fn executor() -> u64 {
  RouteExecutor::account_id()
}

pub fn executor_address() -> H160 {
  RouteExecutor::address()
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    RouteExecutor: pallet_route_executor,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

pub struct RouteExecutorPalletId;
impl Get<PalletId> for RouteExecutorPalletId {
  fn get() -> PalletId {
    PalletId(*primitives::pallet_ids::ROUTE_EXECUTOR_PALLET_ID)
  }
}

impl pallet_route_executor::Config for Test {
  type Currency = Balances;
  type RawCall = MockContractHost;
  type AddressMapping = MockAddressMapping;
  type PalletId = RouteExecutorPalletId;
  type MaxRecords = ConstU32<MAX_RECORDS>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = RouteExecutorBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct RouteExecutorBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::types::BenchmarkHelper for RouteExecutorBenchmarkHelper {
  fn setup_route(executor: H160, hops: u32) -> Vec<primitives::Instruction> {
    const RESERVE: u128 = 1_000_000_000_000;
    let token = |i: u32| H160::from_low_u64_be(0x7000_0000 + u64::from(i));
    let pool = |i: u32| H160::from_low_u64_be(0x9000_0000 + u64::from(i));
    let mut amount_in = U256::from(1_000_000u64);
    mint_tokens(token(0), executor, 1_000_000);
    let mut route = Vec::new();
    for hop in 0..hops {
      deploy_token(token(hop), TokenKind::Standard);
      deploy_token(token(hop + 1), TokenKind::Standard);
      deploy_pair(pool(hop), token(hop), token(hop + 1), RESERVE, RESERVE);
      let amount_out =
        quote::v2_amount_out(amount_in, U256::from(RESERVE), U256::from(RESERVE))
          .unwrap_or_default();
      route.push(primitives::Instruction {
        direction: primitives::Direction::for_output(false),
        pool: pool(hop),
        token_in: token(hop),
        amount_in,
        amount_out,
      });
      amount_in = amount_out;
    }
    route
  }

  fn setup_token(holder: H160, amount: U256) -> H160 {
    let token = H160::from_low_u64_be(0x7fff_ffff);
    deploy_token(token, TokenKind::Standard);
    TokenBalances::insert(token, holder, amount);
    token
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  new_test_ext_with_owner(Some(OWNER))
}

pub fn new_test_ext_with_owner(owner: Option<u64>) -> polkadot_sdk::sp_io::TestExternalities {
  let mut storage = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();
  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: vec![
      (OWNER, INITIAL_BALANCE),
      (ALICE, INITIAL_BALANCE),
      (BOB, INITIAL_BALANCE),
    ],
    ..Default::default()
  }
  .assimilate_storage(&mut storage)
  .unwrap();
  pallet_route_executor::GenesisConfig::<Test> { owner }
    .assimilate_storage(&mut storage)
    .unwrap();
  let mut ext: polkadot_sdk::sp_io::TestExternalities = storage.into();

  clear_call_trace();

  ext.execute_with(|| {
    System::set_block_number(START_BLOCK);
    Balances::mint_into(&executor(), EXECUTOR_NATIVE).unwrap();

    for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
      deploy_token(token, TokenKind::Standard);
    }
    deploy_token(VOID_TOKEN, TokenKind::ReturnsNothing);
    deploy_token(FALSE_TOKEN, TokenKind::ReturnsFalse);
    deploy_token(REVERTING_TOKEN, TokenKind::Reverts);

    deploy_pair(POOL_AB, TOKEN_A, TOKEN_B, 2_000_000, 1_000_000);
    deploy_pair(POOL_AC, TOKEN_A, TOKEN_C, 2_000_000, 2_000_000);
    deploy_pair(POOL_AV, TOKEN_A, VOID_TOKEN, 2_000_000, 1_000_000);

    mint_tokens(TOKEN_B, executor_address(), 10_000);
    mint_tokens(VOID_TOKEN, executor_address(), 10_000);
  });
  ext
}
