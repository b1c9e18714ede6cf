//! Packed instruction buffer.
//!
//! Layout:
//!
//! ```text
//! [0, 8)          target block height, big-endian u64
//! [8, 8 + 105k)   k records:
//!     [0, 1)      direction flag
//!     [1, 21)     pool address
//!     [21, 41)    input-token address
//!     [41, 73)    input amount, big-endian u256
//!     [73, 105)   output amount, big-endian u256
//! ```
//!
//! There is no length prefix; records run until the buffer is exhausted.

use crate::abi::u256_word;
use crate::ecosystem::params::{HEIGHT_LEN, RECORD_LEN};
use alloc::vec::Vec;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use core::slice::ChunksExact;
use polkadot_sdk::sp_core::{H160, U256};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

const FLAG_OFFSET: usize = 0;
const POOL_OFFSET: usize = 1;
const TOKEN_IN_OFFSET: usize = 21;
const AMOUNT_IN_OFFSET: usize = 41;
const AMOUNT_OUT_OFFSET: usize = 73;

/// Which of the pool's two output slots receives `amount_out`.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum Direction {
  /// Flag 0: the pool is asked for `(0, amount_out)`.
  Token1Out,
  /// Flag 1: the pool is asked for `(amount_out, 0)`.
  Token0Out,
}

impl Direction {
  pub fn from_flag(flag: u8) -> Option<Self> {
    match flag {
      0 => Some(Direction::Token1Out),
      1 => Some(Direction::Token0Out),
      _ => None,
    }
  }

  pub fn flag(self) -> u8 {
    match self {
      Direction::Token1Out => 0,
      Direction::Token0Out => 1,
    }
  }

  /// Direction for a swap whose output token is (or is not) the pool's `token0`.
  pub fn for_output(token_out_is_token0: bool) -> Self {
    if token_out_is_token0 {
      Direction::Token0Out
    } else {
      Direction::Token1Out
    }
  }
}

/// Decoding failures for an instruction buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BufferError {
  /// Fewer than `HEIGHT_LEN` bytes, so there is no height header.
  TooShort,
  /// The body is not a whole number of records.
  Misaligned { trailing: usize },
  /// A record carries a flag other than 0 or 1.
  InvalidDirection { index: u32, flag: u8 },
}

/// One decoded 105-byte record: pre-fund `pool` with `amount_in` of `token_in`,
/// then ask it to emit `amount_out` on the slot chosen by `direction`.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct Instruction {
  pub direction: Direction,
  pub pool: H160,
  pub token_in: H160,
  pub amount_in: U256,
  pub amount_out: U256,
}

impl Instruction {
  /// Decode a single record. `index` is only used for error reporting.
  pub fn decode_record(record: &[u8; RECORD_LEN], index: u32) -> Result<Self, BufferError> {
    let flag = record[FLAG_OFFSET];
    let direction =
      Direction::from_flag(flag).ok_or(BufferError::InvalidDirection { index, flag })?;
    Ok(Self {
      direction,
      pool: H160::from_slice(&record[POOL_OFFSET..TOKEN_IN_OFFSET]),
      token_in: H160::from_slice(&record[TOKEN_IN_OFFSET..AMOUNT_IN_OFFSET]),
      amount_in: U256::from_big_endian(&record[AMOUNT_IN_OFFSET..AMOUNT_OUT_OFFSET]),
      amount_out: U256::from_big_endian(&record[AMOUNT_OUT_OFFSET..RECORD_LEN]),
    })
  }

  pub fn encode_record(&self) -> [u8; RECORD_LEN] {
    let mut record = [0u8; RECORD_LEN];
    record[FLAG_OFFSET] = self.direction.flag();
    record[POOL_OFFSET..TOKEN_IN_OFFSET].copy_from_slice(self.pool.as_bytes());
    record[TOKEN_IN_OFFSET..AMOUNT_IN_OFFSET].copy_from_slice(self.token_in.as_bytes());
    record[AMOUNT_IN_OFFSET..AMOUNT_OUT_OFFSET].copy_from_slice(&u256_word(self.amount_in));
    record[AMOUNT_OUT_OFFSET..RECORD_LEN].copy_from_slice(&u256_word(self.amount_out));
    record
  }

  /// The `(amount0Out, amount1Out)` pair handed to the pool's swap entry point.
  pub fn amounts_out(&self) -> (U256, U256) {
    match self.direction {
      Direction::Token1Out => (U256::zero(), self.amount_out),
      Direction::Token0Out => (self.amount_out, U256::zero()),
    }
  }
}

/// Read the big-endian height header, if the buffer is long enough to carry one.
pub fn read_height(buffer: &[u8]) -> Option<u64> {
  let header: [u8; HEIGHT_LEN] = buffer.get(..HEIGHT_LEN)?.try_into().ok()?;
  Some(u64::from_be_bytes(header))
}

/// Number of whole records a buffer of `len` bytes carries. Used for weight hints
/// before the buffer is validated.
pub fn record_count(len: usize) -> u32 {
  (len.saturating_sub(HEIGHT_LEN) / RECORD_LEN) as u32
}

/// A buffer whose header has been read and whose body is a whole number of records.
#[derive(Clone, Copy, Debug)]
pub struct InstructionBuffer<'a> {
  height: u64,
  body: &'a [u8],
}

impl<'a> InstructionBuffer<'a> {
  pub fn parse(buffer: &'a [u8]) -> Result<Self, BufferError> {
    let height = read_height(buffer).ok_or(BufferError::TooShort)?;
    let body = &buffer[HEIGHT_LEN..];
    let trailing = body.len() % RECORD_LEN;
    if trailing != 0 {
      return Err(BufferError::Misaligned { trailing });
    }
    Ok(Self { height, body })
  }

  pub fn height(&self) -> u64 {
    self.height
  }

  /// Number of records in the body.
  pub fn len(&self) -> u32 {
    (self.body.len() / RECORD_LEN) as u32
  }

  pub fn is_empty(&self) -> bool {
    self.body.is_empty()
  }

  /// Records in buffer order, decoded lazily.
  pub fn instructions(&self) -> InstructionStream<'a> {
    InstructionStream {
      records: self.body.chunks_exact(RECORD_LEN),
      index: 0,
    }
  }
}

/// Cursor over the records of an [`InstructionBuffer`].
pub struct InstructionStream<'a> {
  records: ChunksExact<'a, u8>,
  index: u32,
}

impl Iterator for InstructionStream<'_> {
  type Item = Result<Instruction, BufferError>;

  fn next(&mut self) -> Option<Self::Item> {
    let chunk = self.records.next()?;
    let index = self.index;
    self.index = self.index.saturating_add(1);
    // chunks_exact only yields full records
    let record: &[u8; RECORD_LEN] = chunk.try_into().ok()?;
    Some(Instruction::decode_record(record, index))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.records.size_hint()
  }
}

/// Packs a height header and records into a dispatch buffer.
#[derive(Clone, Debug)]
pub struct BufferBuilder {
  bytes: Vec<u8>,
}

impl BufferBuilder {
  pub fn new(height: u64) -> Self {
    let mut bytes = Vec::with_capacity(HEIGHT_LEN + RECORD_LEN);
    bytes.extend_from_slice(&height.to_be_bytes());
    Self { bytes }
  }

  pub fn push(mut self, instruction: &Instruction) -> Self {
    self.bytes.extend_from_slice(&instruction.encode_record());
    self
  }

  pub fn extend<'i>(mut self, instructions: impl IntoIterator<Item = &'i Instruction>) -> Self {
    for instruction in instructions {
      self = self.push(instruction);
    }
    self
  }

  pub fn build(self) -> Vec<u8> {
    self.bytes
  }
}
