//! Storage descriptions and canonical values shared by the `h5verify` crates.
//!
//! Nothing in here touches the native HDF5 library: a [`RawColumn`] is an owned,
//! widened copy of what a container holds, [`TypeInfo`] is the element type the
//! container declares for it, and [`Value`] is what both the decoder and the
//! expected literals produce.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

mod raw;
mod storage;
mod value;

pub use self::raw::{RawColumn, RawData};
pub use self::storage::{EnumMap, Encoding, StorageError, StrPad, TypeInfo};
pub use self::value::{Element, Value, ValueKind};
