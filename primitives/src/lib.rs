#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod abi;
pub mod ecosystem;
pub mod instruction;
pub mod quote;

pub use ecosystem::*;
pub use instruction::*;
pub use polkadot_sdk::sp_core::{H160, U256};
