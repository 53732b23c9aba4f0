use ndarray::{ArrayD, Dimension};

use h5verify_types::Value;

use crate::error::Result;
use crate::report::{CheckResult, Failure};

/// Element-wise closeness for floating point values.
///
/// Two values `a` (actual) and `e` (expected) are close if
/// `|a - e| <= atol + rtol * |e|`. Identical values (infinities included) are
/// always close; NaN is only close to NaN when `equal_nan` is set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    rtol: f64,
    atol: f64,
    equal_nan: bool,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { rtol: 1e-5, atol: 1e-8, equal_nan: false }
    }
}

impl Tolerance {
    pub fn exact() -> Self {
        Self { rtol: 0.0, atol: 0.0, equal_nan: false }
    }

    pub fn rtol(mut self, rtol: f64) -> Self {
        self.rtol = rtol;
        self
    }

    pub fn atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn equal_nan(mut self, equal_nan: bool) -> Self {
        self.equal_nan = equal_nan;
        self
    }

    pub fn get_rtol(&self) -> f64 {
        self.rtol
    }

    pub fn get_atol(&self) -> f64 {
        self.atol
    }

    pub fn get_equal_nan(&self) -> bool {
        self.equal_nan
    }

    pub fn is_close(&self, actual: f64, expected: f64) -> bool {
        if actual == expected {
            return true;
        }
        if actual.is_nan() && expected.is_nan() {
            return self.equal_nan;
        }
        if !actual.is_finite() || !expected.is_finite() {
            return false;
        }
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }
}

/// Decides whether an actual value matches an expected one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Comparator {
    tolerance: Tolerance,
}

impl Comparator {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Compares shapes first, then elements.
    ///
    /// Integer, boolean and text elements must be identical. Mixed numeric
    /// kinds are compared as `f64`: within tolerance when the expected value is
    /// floating point, exactly otherwise. Booleans count as 0/1. Values that
    /// hold a single element each are compatible regardless of their shapes.
    pub fn compare(&self, actual: &Value, expected: &Value, name: &str) -> CheckResult {
        match self.diff(actual, expected) {
            None => CheckResult::pass(name, actual),
            Some(failure) => CheckResult::fail(name, expected.clone(), actual.clone(), failure),
        }
    }

    /// Compares the columns of a compound record independently.
    ///
    /// Each item is a column name, the decoded column (or the error that
    /// prevented decoding it) and the expected column value.
    pub fn compare_record<'a, I>(&self, name: &str, columns: I) -> CheckResult
    where
        I: IntoIterator<Item = (&'a str, Result<Value>, &'a Value)>,
    {
        let results = columns
            .into_iter()
            .map(|(column, actual, expected)| match actual {
                Ok(actual) => self.compare(&actual, expected, column),
                Err(err) => CheckResult::error(column, Some(expected.clone()), err),
            })
            .collect();
        CheckResult::record(name, results)
    }

    fn diff(&self, actual: &Value, expected: &Value) -> Option<Failure> {
        let single = actual.len() == 1 && expected.len() == 1;
        if actual.shape() != expected.shape() && !single {
            return Some(Failure::Shape {
                expected: expected.shape().to_vec(),
                actual: actual.shape().to_vec(),
            });
        }
        match (actual, expected) {
            (Value::Integer(a), Value::Integer(e)) => diff(a, e, |x, y| x == y),
            (Value::Boolean(a), Value::Boolean(e)) => diff(a, e, |x, y| x == y),
            (Value::Text(a), Value::Text(e)) => diff(a, e, |x, y| x == y),
            (Value::Boolean(a), Value::Integer(e)) => diff(&a.mapv(i64::from), e, |x, y| x == y),
            (Value::Integer(a), Value::Boolean(e)) => diff(a, &e.mapv(i64::from), |x, y| x == y),
            (Value::Text(_), _) | (_, Value::Text(_)) => {
                Some(Failure::Kind { expected: expected.kind(), actual: actual.kind() })
            }
            (_, Value::Float(_)) => {
                let (a, e) = (as_floats(actual), as_floats(expected));
                diff(&a, &e, |x, y| self.tolerance.is_close(*x, *y))
            }
            _ => diff(&as_floats(actual), &as_floats(expected), |x, y| x == y),
        }
    }
}

fn as_floats(value: &Value) -> ArrayD<f64> {
    match value {
        Value::Integer(a) => a.mapv(|x| x as f64),
        Value::Float(a) => a.clone(),
        Value::Boolean(a) => a.mapv(|x| if x { 1.0 } else { 0.0 }),
        Value::Text(a) => a.mapv(|_| f64::NAN),
    }
}

/// Iterates both arrays in logical (row-major) order; shapes are already known
/// to agree or to hold one element each.
fn diff<A, F>(actual: &ArrayD<A>, expected: &ArrayD<A>, eq: F) -> Option<Failure>
where
    F: Fn(&A, &A) -> bool,
{
    let mut mismatched = 0;
    let mut first = None;
    for ((index, a), e) in actual.indexed_iter().zip(expected.iter()) {
        if !eq(a, e) {
            mismatched += 1;
            if first.is_none() {
                first = Some(index.slice().to_vec());
            }
        }
    }
    first.map(|first| Failure::Values { mismatched, total: expected.len(), first })
}
