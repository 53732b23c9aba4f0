use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use ndarray::ShapeError;

use h5verify_types::StorageError;

/// The error type for reading, decoding and verifying stored values.
#[derive(Clone, PartialEq, Eq)]
pub enum Error {
    /// The input file could not be opened; nothing else can be checked.
    FileOpen { path: PathBuf, reason: String },
    /// A stored object could not be turned into a canonical value.
    Decode(String),
    /// The HDF5 library failed while reading a single object.
    Library(String),
}

/// A type for results generated by this crate where the `Err` type is set to
/// `h5verify::Error`.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

impl Error {
    /// Only a file that cannot be opened stops a run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FileOpen { .. })
    }

    pub fn description(&self) -> &str {
        match self {
            Error::FileOpen { reason, .. } => reason,
            Error::Decode(desc) | Error::Library(desc) => desc,
        }
    }
}

impl From<&str> for Error {
    fn from(desc: &str) -> Self {
        Error::Decode(desc.into())
    }
}

impl From<String> for Error {
    fn from(desc: String) -> Self {
        Error::Decode(desc)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<ShapeError> for Error {
    fn from(err: ShapeError) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(feature = "hdf5")]
impl From<hdf5::Error> for Error {
    fn from(err: hdf5::Error) -> Self {
        Error::Library(err.to_string())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FileOpen { path, reason } => {
                write!(f, "unable to open {}: {}", path.display(), reason)
            }
            Error::Decode(desc) => f.write_str(desc),
            Error::Library(desc) => write!(f, "HDF5 error: {}", desc),
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
pub mod tests {
    use std::path::PathBuf;

    use ndarray::{ArrayD, IxDyn};

    use h5verify_types::EnumMap;

    use super::{Error, Result};

    #[test]
    pub fn test_conversions() {
        let err: Error = "missing column".into();
        assert_eq!(err, Error::Decode("missing column".into()));
        assert!(!err.is_fatal());

        let err = Error::from(EnumMap::new(vec![(1, "a"), (1, "b")]).unwrap_err());
        assert_eq!(err.to_string(), "enum mapping error: code 1 is mapped twice");

        let res: Result<ArrayD<i64>> =
            ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1, 2, 3]).map_err(Into::into);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    pub fn test_display() {
        let err = Error::FileOpen { path: PathBuf::from("missing.h5"), reason: "no such file".into() };
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "unable to open missing.h5: no such file");
        assert_eq!(err.description(), "no such file");
        assert_eq!(format!("{:?}", Error::Library("H5Dread(): boom".into())), "HDF5 error: H5Dread(): boom");
    }

    #[test]
    pub fn test_fail_ensure() {
        fn check(n: usize) -> Result<usize> {
            ensure!(n > 0, "value must be positive, got {}", n);
            if n > 10 {
                fail!("value {} is too large", n);
            }
            Ok(n)
        }
        assert_eq!(check(3).unwrap(), 3);
        assert_eq!(check(0).unwrap_err().to_string(), "value must be positive, got 0");
        assert_eq!(check(11).unwrap_err(), Error::Decode("value 11 is too large".into()));
    }
}
