//! The interop suite: what the companion writer puts into its test file.

use std::io::{self, Write};

use ndarray::array;

use crate::check::{Check, Source, Verifier};
use crate::compare::Comparator;
use crate::error::Result;
use crate::report::{Reporter, Summary};

/// File verified by the `verify-h5` binary, relative to the working directory.
pub const DEFAULT_FILE: &str = "test_interop.h5";

pub fn interop() -> Verifier {
    Verifier::new(Comparator::default())
        .check(Check::dataset("vec_double", vec![1.1, 2.2, 3.3]))
        .check(Check::dataset("vec_int", vec![1, 2, 3, 4, 5]))
        .check(Check::dataset("vec_logical", vec![1, 0, 1]).logical())
        .check(Check::dataset("vec_char", vec!["apple", "banana", "cherry"]))
        .check(Check::dataset("matrix_int", array![[1, 3, 5], [2, 4, 6]]))
        .check(
            Check::record("dataframe")
                .column("id", vec![1, 2, 3])
                .column("score", vec![10.5, 20.5, 15.5])
                .column("label", vec!["A", "B", "C"]),
        )
        .check(Check::attribute("dset_with_attr", "unit", "meters"))
        .check(Check::attribute("dset_with_attr", "scale", 1.5))
}

/// Runs `verifier` and writes the report; `name` is the file the source was
/// opened from. A source that failed to open is reported as the only, fatal,
/// line.
pub fn report<S, W>(
    verifier: &Verifier,
    name: &str,
    source: Result<S>,
    out: W,
) -> io::Result<Summary>
where
    S: Source,
    W: Write,
{
    let mut reporter = Reporter::new(out);
    match source {
        Ok(source) => {
            reporter.opened(name)?;
            for result in verifier.run(&source) {
                reporter.record(&result)?;
            }
        }
        Err(err) => reporter.fatal(&err)?,
    }
    reporter.finish()
}

/// Verifies the file at `path` against the interop suite.
#[cfg(feature = "hdf5")]
pub fn run<P: AsRef<std::path::Path>, W: Write>(path: P, out: W) -> io::Result<Summary> {
    let path = path.as_ref();
    report(&interop(), &path.display().to_string(), crate::h5::H5Source::open(path), out)
}
