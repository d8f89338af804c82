#![no_std]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std implementation of the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various platforms.
//! [OneWire] trait defines the basic operations required for 1-Wire communication, such as resetting the bus, writing and reading bytes, and writing and reading bits.
//! It also includes an asynchronous version of the trait, [OneWireAsync], for use in async environments.
//!
//! Bytes travel least-significant bit first. Multi-byte transfers keep wire order: the first byte
//! written is `bytes[0]`, and the first byte read lands in `buf[0]`.
//!
//! The crate also provides the ROM search algorithm for discovering devices on the 1-Wire bus, implemented in [OneWireSearch].

pub mod consts;
mod error;
mod search;
mod traits;
mod traits_async;
mod utils;
pub use error::OneWireError;
pub use search::{OneWireSearch, OneWireSearchKind};
pub use traits::{OneWire, OneWireStatus};
pub use traits_async::OneWireAsync;
pub use utils::OneWireCrc;

pub use consts::{
    ONEWIRE_ALARM_SEARCH_CMD, ONEWIRE_MATCH_ROM_CMD, ONEWIRE_MATCH_ROM_CMD_OD, ONEWIRE_READ_ROM_CMD,
    ONEWIRE_SEARCH_CMD, ONEWIRE_SKIP_ROM_CMD, ONEWIRE_SKIP_ROM_CMD_OD,
};

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
