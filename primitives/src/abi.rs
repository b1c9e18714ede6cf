//! Contract call payloads.
//!
//! External calls are issued raw: a 4-byte selector followed by 32-byte argument words.
//! Only the handful of entry points the executor touches are covered here.

use alloc::vec::Vec;
use polkadot_sdk::sp_core::{H160, U256};

pub const WORD: usize = 32;
pub const SELECTOR_LEN: usize = 4;

/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
/// `swap(uint256,uint256,address,bytes)`
pub const SWAP_SELECTOR: [u8; 4] = [0x02, 0x2c, 0x0d, 0x9f];
/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Number of head words in a `swap` call; the `bytes` tail starts right after them.
const SWAP_HEAD_WORDS: usize = 4;

pub fn u256_word(value: U256) -> [u8; WORD] {
  let mut word = [0u8; WORD];
  for (i, byte) in word.iter_mut().enumerate() {
    *byte = value.byte(WORD - 1 - i);
  }
  word
}

pub fn address_word(address: H160) -> [u8; WORD] {
  let mut word = [0u8; WORD];
  word[WORD - 20..].copy_from_slice(address.as_bytes());
  word
}

fn usize_word(value: usize) -> [u8; WORD] {
  u256_word(U256::from(value as u64))
}

/// `transfer(to, amount)`
pub fn encode_transfer(to: H160, amount: U256) -> Vec<u8> {
  let mut input = Vec::with_capacity(SELECTOR_LEN + 2 * WORD);
  input.extend_from_slice(&TRANSFER_SELECTOR);
  input.extend_from_slice(&address_word(to));
  input.extend_from_slice(&u256_word(amount));
  input
}

/// `swap(amount0_out, amount1_out, to, data)`
///
/// `data` is written as a proper dynamic `bytes` tail: offset word, length word, then the
/// payload right-padded to a word boundary. An empty payload still gets its length word.
pub fn encode_swap(amount0_out: U256, amount1_out: U256, to: H160, data: &[u8]) -> Vec<u8> {
  let padded = data.len().div_ceil(WORD) * WORD;
  let mut input = Vec::with_capacity(SELECTOR_LEN + (SWAP_HEAD_WORDS + 1) * WORD + padded);
  input.extend_from_slice(&SWAP_SELECTOR);
  input.extend_from_slice(&u256_word(amount0_out));
  input.extend_from_slice(&u256_word(amount1_out));
  input.extend_from_slice(&address_word(to));
  input.extend_from_slice(&usize_word(SWAP_HEAD_WORDS * WORD));
  input.extend_from_slice(&usize_word(data.len()));
  input.extend_from_slice(data);
  input.resize(input.len() + (padded - data.len()), 0);
  input
}

/// `balanceOf(owner)`
pub fn encode_balance_of(owner: H160) -> Vec<u8> {
  let mut input = Vec::with_capacity(SELECTOR_LEN + WORD);
  input.extend_from_slice(&BALANCE_OF_SELECTOR);
  input.extend_from_slice(&address_word(owner));
  input
}

pub fn selector(input: &[u8]) -> Option<[u8; 4]> {
  input
    .get(..SELECTOR_LEN)
    .and_then(|slice| <[u8; 4]>::try_from(slice).ok())
}

/// The `index`-th argument word of a call payload.
pub fn read_word(input: &[u8], index: usize) -> Option<&[u8]> {
  let start = SELECTOR_LEN.checked_add(index.checked_mul(WORD)?)?;
  input.get(start..start.checked_add(WORD)?)
}

/// Reads an address argument; the 12 high bytes of the word must be clear.
pub fn read_address(input: &[u8], index: usize) -> Option<H160> {
  let word = read_word(input, index)?;
  if word[..WORD - 20].iter().any(|b| *b != 0) {
    return None;
  }
  Some(H160::from_slice(&word[WORD - 20..]))
}

pub fn read_u256(input: &[u8], index: usize) -> Option<U256> {
  read_word(input, index).map(U256::from_big_endian)
}

/// Reads a dynamic `bytes` argument whose offset sits in head word `index`.
pub fn read_bytes(input: &[u8], index: usize) -> Option<&[u8]> {
  let args = input.get(SELECTOR_LEN..)?;
  let offset = word_to_usize(read_word(input, index)?)?;
  let len_word = args.get(offset..offset.checked_add(WORD)?)?;
  let len = word_to_usize(len_word)?;
  let start = offset.checked_add(WORD)?;
  args.get(start..start.checked_add(len)?)
}

fn word_to_usize(word: &[u8]) -> Option<usize> {
  let value = U256::from_big_endian(word);
  if value > U256::from(u32::MAX) {
    return None;
  }
  Some(value.low_u64() as usize)
}

/// Success rule for token `transfer` return data: nothing returned (void tokens) or a
/// single `true` word.
pub fn transfer_succeeded(output: &[u8]) -> bool {
  if output.is_empty() {
    return true;
  }
  output
    .get(..WORD)
    .map(|word| U256::from_big_endian(word) == U256::one())
    .unwrap_or(false)
}

/// ABI `bool` return word.
pub fn bool_word(value: bool) -> [u8; WORD] {
  u256_word(U256::from(value as u8))
}
