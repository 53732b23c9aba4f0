use std::collections::HashMap;

use h5verify_types::{RawColumn, TypeInfo, Value};

use crate::compare::Comparator;
use crate::decode::ValueDecoder;
use crate::error::Result;
use crate::report::CheckResult;

/// A named column of a compound record.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub raw: RawColumn,
    pub info: TypeInfo,
}

impl Field {
    pub fn new(name: &str, raw: RawColumn, info: TypeInfo) -> Self {
        Self { name: name.into(), raw, info }
    }
}

/// A dataset or attribute as found in a container, not yet decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum Stored {
    Array { raw: RawColumn, info: TypeInfo },
    /// Columns of a compound type, in declaration order; all share one shape.
    Record(Vec<Field>),
}

impl Stored {
    pub fn array(raw: RawColumn, info: TypeInfo) -> Self {
        Stored::Array { raw, info }
    }

    pub fn record(fields: Vec<Field>) -> Self {
        Stored::Record(fields)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Stored::Record(_))
    }
}

/// Something that can hand out stored datasets and attributes by path.
pub trait Source {
    fn dataset(&self, path: &str) -> Result<Stored>;

    /// `object` is a dataset or group path; `/` (or an empty string) is the root.
    fn attribute(&self, object: &str, name: &str) -> Result<Stored>;
}

fn normalize(path: &str) -> &str {
    match path.trim_matches('/') {
        "" => "/",
        path => path,
    }
}

/// An in-memory container.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    datasets: HashMap<String, Stored>,
    attributes: HashMap<(String, String), Stored>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, path: &str, stored: Stored) -> Self {
        self.insert_dataset(path, stored);
        self
    }

    pub fn with_attribute(mut self, object: &str, name: &str, stored: Stored) -> Self {
        self.insert_attribute(object, name, stored);
        self
    }

    pub fn insert_dataset(&mut self, path: &str, stored: Stored) -> Option<Stored> {
        self.datasets.insert(normalize(path).into(), stored)
    }

    pub fn insert_attribute(&mut self, object: &str, name: &str, stored: Stored) -> Option<Stored> {
        self.attributes.insert((normalize(object).into(), name.into()), stored)
    }

    pub fn len(&self) -> usize {
        self.datasets.len() + self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Source for MemorySource {
    fn dataset(&self, path: &str) -> Result<Stored> {
        match self.datasets.get(normalize(path)) {
            Some(stored) => Ok(stored.clone()),
            None => fail!("dataset '{}' not found", path),
        }
    }

    fn attribute(&self, object: &str, name: &str) -> Result<Stored> {
        let key = (normalize(object).to_owned(), name.to_owned());
        match self.attributes.get(&key) {
            Some(stored) => Ok(stored.clone()),
            None => fail!("attribute '{}' not found on '{}'", name, object),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Dataset(String),
    Attribute { object: String, name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expect {
    Value(Value),
    /// Expected columns by name; the record may hold more columns than listed.
    Record(Vec<(String, Value)>),
}

/// One named expectation about a dataset or an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Check {
    name: String,
    target: Target,
    expect: Expect,
    decoder: ValueDecoder,
}

impl Check {
    /// Expects the dataset at `path` to hold `expected`; the check is named after the path.
    pub fn dataset<V: Into<Value>>(path: &str, expected: V) -> Self {
        Self {
            name: path.into(),
            target: Target::Dataset(path.into()),
            expect: Expect::Value(expected.into()),
            decoder: ValueDecoder::new(),
        }
    }

    /// Expects attribute `name` of `object` to hold `expected`; named `object@name`.
    pub fn attribute<V: Into<Value>>(object: &str, name: &str, expected: V) -> Self {
        Self {
            name: format!("{}@{}", object, name),
            target: Target::Attribute { object: object.into(), name: name.into() },
            expect: Expect::Value(expected.into()),
            decoder: ValueDecoder::new(),
        }
    }

    /// Expects a compound dataset; add columns with [`Check::column`].
    pub fn record(path: &str) -> Self {
        Self {
            name: path.into(),
            target: Target::Dataset(path.into()),
            expect: Expect::Record(vec![]),
            decoder: ValueDecoder::new(),
        }
    }

    /// Adds an expected column. Turns a plain check into a record check.
    pub fn column<V: Into<Value>>(mut self, name: &str, expected: V) -> Self {
        if let Expect::Value(_) = self.expect {
            self.expect = Expect::Record(vec![]);
        }
        if let Expect::Record(columns) = &mut self.expect {
            columns.push((name.into(), expected.into()));
        }
        self
    }

    /// Decodes integer 0/1 codes as booleans.
    pub fn logical(mut self) -> Self {
        self.decoder = self.decoder.logical(true);
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn expect(&self) -> &Expect {
        &self.expect
    }

    pub fn run<S: Source + ?Sized>(&self, source: &S, comparator: &Comparator) -> CheckResult {
        let stored = match &self.target {
            Target::Dataset(path) => source.dataset(path),
            Target::Attribute { object, name } => source.attribute(object, name),
        };
        let stored = match stored {
            Ok(stored) => stored,
            Err(err) => {
                let expected = match &self.expect {
                    Expect::Value(value) => Some(value.clone()),
                    Expect::Record(_) => None,
                };
                return CheckResult::error(&self.name, expected, err);
            }
        };
        match (&self.expect, stored) {
            (Expect::Value(expected), Stored::Array { raw, info }) => {
                match self.decoder.decode(&raw, &info) {
                    Ok(actual) => comparator.compare(&actual, expected, &self.name),
                    Err(err) => CheckResult::error(&self.name, Some(expected.clone()), err),
                }
            }
            (Expect::Value(expected), Stored::Record(fields)) => CheckResult::error(
                &self.name,
                Some(expected.clone()),
                format!("expected a plain array, found a record with {} columns", fields.len())
                    .into(),
            ),
            (Expect::Record(columns), Stored::Record(fields)) => {
                let columns = columns.iter().map(|(name, expected)| {
                    let actual = match fields.iter().find(|f| &f.name == name) {
                        Some(field) => self.decoder.decode(&field.raw, &field.info),
                        None => Err(format!("column '{}' not found", name).into()),
                    };
                    (name.as_str(), actual, expected)
                });
                comparator.compare_record(&self.name, columns)
            }
            (Expect::Record(_), Stored::Array { info, .. }) => CheckResult::error(
                &self.name,
                None,
                format!("expected a record, found a plain {} array", info).into(),
            ),
        }
    }
}

/// Runs an ordered list of checks against a source.
#[derive(Clone, Debug, Default)]
pub struct Verifier {
    comparator: Comparator,
    checks: Vec<Check>,
}

impl Verifier {
    pub fn new(comparator: Comparator) -> Self {
        Self { comparator, checks: vec![] }
    }

    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// One result per check, in order. A failing check never stops the others.
    pub fn run<S: Source + ?Sized>(&self, source: &S) -> Vec<CheckResult> {
        self.checks.iter().map(|check| check.run(source, &self.comparator)).collect()
    }
}

#[cfg(test)]
pub mod tests {
    use pretty_assertions::assert_eq;

    use h5verify_types::{EnumMap, Encoding, RawColumn, RawData, StrPad, TypeInfo, Value};

    use super::{Check, Expect, Field, MemorySource, Source, Stored, Target, Verifier};
    use crate::compare::{Comparator, Tolerance};
    use crate::error::Error;
    use crate::report::Failure;

    fn int32() -> TypeInfo {
        TypeInfo::Integer { signed: true, size: 4 }
    }

    fn float64() -> TypeInfo {
        TypeInfo::Float { size: 8 }
    }

    fn frame(scores: Vec<f64>) -> Stored {
        Stored::record(vec![
            Field::new("id", RawColumn::vector(RawData::Int(vec![1, 2, 3])), int32()),
            Field::new("score", RawColumn::vector(RawData::Float(scores)), float64()),
            Field::new(
                "label",
                RawColumn::vector(RawData::Int(vec![1, 2, 3])),
                TypeInfo::Enum(EnumMap::from_levels(vec!["A", "B", "C"]).unwrap()),
            ),
        ])
    }

    fn frame_check() -> Check {
        Check::record("dataframe")
            .column("id", vec![1, 2, 3])
            .column("score", vec![10.5, 20.5, 15.5])
            .column("label", vec!["A", "B", "C"])
    }

    #[test]
    pub fn test_memory_source() {
        let raw = RawColumn::vector(RawData::Int(vec![1]));
        let src = MemorySource::new()
            .with_dataset("/group/sub/data", Stored::array(raw.clone(), int32()))
            .with_attribute("/", "version", Stored::array(raw.clone(), int32()));
        assert_eq!(src.len(), 2);
        assert!(!src.is_empty());
        assert_eq!(src.dataset("group/sub/data").unwrap(), Stored::array(raw.clone(), int32()));
        assert_eq!(src.dataset("/group/sub/data/").unwrap(), Stored::array(raw.clone(), int32()));
        assert_eq!(src.attribute("", "version").unwrap(), Stored::array(raw, int32()));
        assert_err!(src.dataset("group/sub"), "^dataset 'group/sub' not found$");
        assert_err!(src.attribute("/", "scale"), "^attribute 'scale' not found on '/'$");
        assert!(!src.dataset("group/sub/data").unwrap().is_record());
    }

    #[test]
    pub fn test_check_builders() {
        let c = Check::attribute("dset_with_attr", "unit", "meters");
        assert_eq!(c.name(), "dset_with_attr@unit");
        assert_eq!(
            c.target(),
            &Target::Attribute { object: "dset_with_attr".into(), name: "unit".into() }
        );
        assert_eq!(c.expect(), &Expect::Value(Value::from("meters")));

        let c = Check::dataset("a/b", vec![1]).named("b").column("x", vec![2]);
        assert_eq!(c.name(), "b");
        assert_eq!(c.expect(), &Expect::Record(vec![("x".into(), Value::from(vec![2]))]));
    }

    #[test]
    pub fn test_record_passes() {
        let src = MemorySource::new().with_dataset("dataframe", frame(vec![10.5, 20.5, 15.5]));
        let result = frame_check().run(&src, &Comparator::default());
        assert!(result.passed(), "{}", result.message);
        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.message, "3 columns match");
        let label = &result.columns[2];
        assert_eq!((label.message.as_str(), label.actual.as_ref()), ("3 elements match", None));
    }

    #[test]
    pub fn test_record_corrupt_column() {
        let src = MemorySource::new().with_dataset("dataframe", frame(vec![10.5, 20.5, 99.0]));
        let result = frame_check().run(&src, &Comparator::default());
        assert_eq!(result.failure, Some(Failure::Columns(vec!["score".into()])));
        assert!(result.columns[0].passed());
        assert!(!result.columns[1].passed());
        assert!(result.columns[2].passed());
    }

    #[test]
    pub fn test_record_missing_column() {
        let src = MemorySource::new().with_dataset("dataframe", frame(vec![10.5, 20.5, 15.5]));
        let result = frame_check().column("weight", vec![1.0]).run(&src, &Comparator::default());
        assert_eq!(result.failure, Some(Failure::Columns(vec!["weight".into()])));
        assert_eq!(result.columns[3].message, "column 'weight' not found");
        assert!(result.columns[..3].iter().all(|c| c.passed()));
    }

    #[test]
    pub fn test_record_vs_array() {
        let src = MemorySource::new()
            .with_dataset("dataframe", frame(vec![10.5, 20.5, 15.5]))
            .with_dataset("vec_int", Stored::array(RawColumn::vector(RawData::Int(vec![1])), int32()));
        let c = Comparator::default();

        let result = Check::dataset("dataframe", vec![1]).run(&src, &c);
        assert_eq!(result.message, "expected a plain array, found a record with 3 columns");
        let result = Check::record("vec_int").column("id", vec![1]).run(&src, &c);
        assert_eq!(result.message, "expected a record, found a plain int32 array");
    }

    #[test]
    pub fn test_missing_and_undecodable() {
        let info = TypeInfo::Enum(EnumMap::new(vec![(0, "small"), (1, "medium"), (2, "large")]).unwrap());
        let src = MemorySource::new()
            .with_dataset("sizes", Stored::array(RawColumn::vector(RawData::Int(vec![0, 3])), info));
        let c = Comparator::default();

        let result = Check::dataset("sizes", vec!["small", "large"]).run(&src, &c);
        assert_eq!(
            result.failure,
            Some(Failure::Error(Error::Decode("enum code 3 at index 1 has no label in the mapping".into())))
        );
        assert_eq!(result.expected, Some(Value::from(vec!["small", "large"])));
        assert_eq!(result.actual, None);

        let result = Check::dataset("nope", 1).run(&src, &c);
        assert_eq!(result.message, "dataset 'nope' not found");
    }

    #[test]
    pub fn test_verifier() {
        let text = TypeInfo::fixed_string(6, Encoding::Ascii, StrPad::NullPad);
        let src = MemorySource::new()
            .with_dataset(
                "vec_char",
                Stored::array(RawColumn::vector(RawData::fixed_strings(6, ["apple", "banana"])), text),
            )
            .with_dataset(
                "vec_logical",
                Stored::array(RawColumn::vector(RawData::Int(vec![1, 0, 1])), int32()),
            );
        let verifier = Verifier::new(Comparator::new(Tolerance::exact()))
            .check(Check::dataset("vec_char", vec!["apple", "banana"]))
            .check(Check::dataset("vec_logical", vec![true, false, true]).logical())
            .check(Check::dataset("vec_logical", vec![1, 0, 0]).named("vec_logical_raw"));
        assert_eq!(verifier.checks().len(), 3);
        assert_eq!(verifier.comparator(), &Comparator::new(Tolerance::exact()));

        let results = verifier.run(&src);
        let passed: Vec<_> = results.iter().map(|r| (r.name.as_str(), r.passed())).collect();
        assert_eq!(passed, vec![("vec_char", true), ("vec_logical", true), ("vec_logical_raw", false)]);
    }
}
