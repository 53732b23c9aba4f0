use std::fmt::{self, Display};
use std::io::{self, Write};

use h5verify_types::{Value, ValueKind};

use crate::error::Error;

/// Why a check did not pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Failure {
    Shape { expected: Vec<usize>, actual: Vec<usize> },
    Kind { expected: ValueKind, actual: ValueKind },
    /// `first` is the n-dimensional index of the first differing element.
    Values { mismatched: usize, total: usize, first: Vec<usize> },
    /// Names of the failing columns of a compound record.
    Columns(Vec<String>),
    Error(Error),
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Failure::Shape { expected, actual } => {
                write!(f, "shape mismatch: expected {:?}, got {:?}", expected, actual)
            }
            Failure::Kind { expected, actual } => {
                write!(f, "kind mismatch: expected {}, got {}", expected, actual)
            }
            Failure::Values { mismatched, total, first } => write!(
                f,
                "{} of {} elements differ (first at {:?})",
                mismatched, total, first
            ),
            Failure::Columns(names) => write!(f, "columns differ: {}", names.join(", ")),
            Failure::Error(err) => write!(f, "{}", err),
        }
    }
}

/// Outcome of a single check. Compound checks carry one sub-result per column.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    pub message: String,
    pub failure: Option<Failure>,
    pub columns: Vec<CheckResult>,
}

impl CheckResult {
    /// A passing check keeps only its element count; values are not retained.
    pub fn pass(name: &str, actual: &Value) -> Self {
        let message = match actual.len() {
            1 => "1 element matches".to_owned(),
            n => format!("{} elements match", n),
        };
        Self {
            name: name.into(),
            expected: None,
            actual: None,
            message,
            failure: None,
            columns: vec![],
        }
    }

    pub fn fail(name: &str, expected: Value, actual: Value, failure: Failure) -> Self {
        Self {
            name: name.into(),
            expected: Some(expected),
            actual: Some(actual),
            message: failure.to_string(),
            failure: Some(failure),
            columns: vec![],
        }
    }

    /// A check that never got to comparing because reading or decoding failed.
    pub fn error(name: &str, expected: Option<Value>, err: Error) -> Self {
        let failure = Failure::Error(err);
        Self {
            name: name.into(),
            expected,
            actual: None,
            message: failure.to_string(),
            failure: Some(failure),
            columns: vec![],
        }
    }

    /// Folds per-column results into one record result; passes iff every column passes.
    pub fn record(name: &str, columns: Vec<CheckResult>) -> Self {
        let failed: Vec<String> =
            columns.iter().filter(|c| !c.passed()).map(|c| c.name.clone()).collect();
        let (message, failure) = if failed.is_empty() {
            (format!("{} columns match", columns.len()), None)
        } else {
            let failure = Failure::Columns(failed);
            (failure.to_string(), Some(failure))
        };
        Self { name: name.into(), expected: None, actual: None, message, failure, columns }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// What a finished run amounts to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: Vec<String>,
    /// The run stopped before any check (the file could not be opened).
    pub fatal: bool,
}

impl Summary {
    pub fn success(&self) -> bool {
        !self.fatal && self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed.len()
    }
}

/// Line-oriented sink for check results.
pub struct Reporter<W: Write> {
    out: W,
    summary: Summary,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, summary: Summary::default() }
    }

    pub fn record(&mut self, result: &CheckResult) -> io::Result<()> {
        self.write_result(result, 0)?;
        if result.passed() {
            self.summary.passed += 1;
        } else {
            self.summary.failed.push(result.name.clone());
        }
        Ok(())
    }

    pub fn opened(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "Successfully opened {}", name)
    }

    /// Reports an error that ends the run; nothing else gets printed afterwards.
    pub fn fatal(&mut self, err: &Error) -> io::Result<()> {
        self.summary.fatal = true;
        writeln!(self.out, "FAILURE: {}", err)
    }

    pub fn finish(mut self) -> io::Result<Summary> {
        if self.summary.failed.is_empty() && !self.summary.fatal {
            writeln!(self.out, "ALL TESTS PASSED")?;
        } else if !self.summary.failed.is_empty() {
            writeln!(
                self.out,
                "{} of {} checks FAILED: {}",
                self.summary.failed.len(),
                self.summary.total(),
                self.summary.failed.join(", ")
            )?;
        }
        self.out.flush()?;
        Ok(self.summary)
    }

    fn write_result(&mut self, result: &CheckResult, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        if result.passed() {
            writeln!(self.out, "{}Verified {}", indent, result.name)?;
        } else {
            writeln!(self.out, "{}FAILURE: {}: {}", indent, result.name, result.message)?;
            if let Some(expected) = &result.expected {
                writeln!(self.out, "{}  Expected: {}", indent, expected)?;
            }
            if let Some(actual) = &result.actual {
                writeln!(self.out, "{}  Got: {}", indent, actual)?;
            }
        }
        for column in &result.columns {
            self.write_result(column, depth + 1)?;
        }
        Ok(())
    }
}
