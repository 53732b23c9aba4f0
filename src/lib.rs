//! Verification of HDF5 files written by other tools.
//!
//! A [`Verifier`] holds an ordered list of [`Check`]s, each naming a dataset,
//! an attribute or a compound record together with the value it should hold.
//! Running it against a [`Source`] reads every target, decodes it into a
//! canonical [`Value`] with a [`ValueDecoder`], compares it to the expected
//! literal with a [`Comparator`] and yields one [`CheckResult`] per check,
//! which a [`Reporter`] turns into text.
//!
//! Reading real files requires the `hdf5` feature (see [`H5Source`]); without
//! it, checks can be run against a [`MemorySource`].

#[macro_use]
mod macros;

mod check;
mod compare;
mod decode;
mod error;
mod report;

pub mod suite;

cfg_if::cfg_if! {
    if #[cfg(feature = "hdf5")] {
        mod h5;
        pub use crate::h5::H5Source;
    }
}

pub use crate::check::{Check, Expect, Field, MemorySource, Source, Stored, Target, Verifier};
pub use crate::compare::{Comparator, Tolerance};
pub use crate::decode::ValueDecoder;
pub use crate::error::{Error, Result};
pub use crate::report::{CheckResult, Failure, Reporter, Summary};

pub use h5verify_types::{
    Element, EnumMap, Encoding, RawColumn, RawData, StorageError, StrPad, TypeInfo, Value,
    ValueKind,
};

pub mod types {
    pub use h5verify_types::*;
}
