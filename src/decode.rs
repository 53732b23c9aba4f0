use ndarray::{ArrayD, IxDyn};

use h5verify_types::{EnumMap, Encoding, RawColumn, RawData, StrPad, TypeInfo, Value};

use crate::error::{Error, Result};

/// Turns raw stored columns into canonical values.
///
/// Decoding is all-or-nothing: the first element that cannot be decoded fails
/// the whole column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueDecoder {
    logical: bool,
}

impl ValueDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat integer 0/1 codes as booleans (R logicals are stored as native ints).
    pub fn logical(mut self, logical: bool) -> Self {
        self.logical = logical;
        self
    }

    pub fn is_logical(&self) -> bool {
        self.logical
    }

    pub fn decode(&self, raw: &RawColumn, info: &TypeInfo) -> Result<Value> {
        if let RawData::FixedString { width, bytes } = &raw.data {
            ensure!(
                if *width == 0 { bytes.is_empty() } else { bytes.len() % width == 0 },
                "fixed string buffer of {} bytes is not a multiple of width {}",
                bytes.len(),
                width
            );
        }
        let (size, len) = (raw.size(), raw.data.len());
        ensure!(size == len, "buffer holds {} elements but shape {:?} needs {}", len, raw.shape, size);

        let value = match (info, &raw.data) {
            (TypeInfo::Integer { .. }, RawData::Int(v)) => self.integers(raw, v.clone())?,
            (TypeInfo::Integer { signed: false, .. }, RawData::UInt(v)) => {
                let v = widen_unsigned(v)?;
                self.integers(raw, v)?
            }
            (TypeInfo::Float { .. }, RawData::Float(v)) => {
                ensure!(!self.logical, "a float column cannot be read as logical");
                Value::Float(shaped(raw, v.clone())?)
            }
            (TypeInfo::Boolean, RawData::Bool(v)) => Value::Boolean(shaped(raw, v.clone())?),
            (TypeInfo::Enum(map), RawData::Int(v)) => Value::Text(shaped(raw, labels(map, v)?)?),
            (TypeInfo::Enum(map), RawData::UInt(v)) => {
                let v = widen_unsigned(v)?;
                Value::Text(shaped(raw, labels(map, &v)?)?)
            }
            (
                TypeInfo::Text { encoding, padding, width: Some(expected) },
                RawData::FixedString { width, bytes },
            ) => {
                ensure!(
                    expected == width,
                    "fixed string width {} does not match declared width {}",
                    width,
                    expected
                );
                Value::Text(shaped(raw, fixed_strings(*encoding, *padding, *width, bytes)?)?)
            }
            (TypeInfo::Text { encoding, width: None, .. }, RawData::VarLenString(v)) => {
                Value::Text(shaped(raw, varlen_strings(*encoding, v)?)?)
            }
            (info, data) => fail!("stored {} does not match declared type {}", data, info),
        };
        if self.logical && !matches!(value, Value::Boolean(_)) {
            fail!("a {} column cannot be read as logical", info);
        }
        Ok(value)
    }

    fn integers(&self, raw: &RawColumn, v: Vec<i64>) -> Result<Value> {
        if !self.logical {
            return Ok(Value::Integer(shaped(raw, v)?));
        }
        let mut flags = Vec::with_capacity(v.len());
        for (i, code) in v.into_iter().enumerate() {
            match code {
                0 => flags.push(false),
                1 => flags.push(true),
                _ => fail!("logical code {} at index {} is neither 0 nor 1", code, i),
            }
        }
        Ok(Value::Boolean(shaped(raw, flags)?))
    }
}

fn shaped<A>(raw: &RawColumn, v: Vec<A>) -> Result<ArrayD<A>> {
    Ok(ArrayD::from_shape_vec(IxDyn(&raw.shape), v)?)
}

fn widen_unsigned(v: &[u64]) -> Result<Vec<i64>> {
    v.iter()
        .enumerate()
        .map(|(i, &x)| {
            i64::try_from(x)
                .map_err(|_| Error::from(format!("unsigned value {} at index {} overflows int64", x, i)))
        })
        .collect()
}

fn labels(map: &EnumMap, codes: &[i64]) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(codes.len());
    for (i, &code) in codes.iter().enumerate() {
        match map.label(code) {
            Some(label) => out.push(label.to_owned()),
            None => fail!("enum code {} at index {} has no label in the mapping", code, i),
        }
    }
    Ok(out)
}

fn fixed_strings(encoding: Encoding, padding: StrPad, width: usize, bytes: &[u8]) -> Result<Vec<String>> {
    if width == 0 {
        return Ok(Vec::new());
    }
    bytes
        .chunks(width)
        .enumerate()
        .map(|(i, chunk)| {
            encoding
                .decode(padding.trim(chunk))
                .map_err(|err| Error::from(format!("string at index {}: {}", i, err)))
        })
        .collect()
}

fn varlen_strings(encoding: Encoding, items: &[Option<Vec<u8>>]) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            Some(bytes) => out.push(
                encoding.decode(bytes).map_err(|err| format!("string at index {}: {}", i, err))?,
            ),
            None => fail!("string at index {} is missing (null pointer)", i),
        }
    }
    Ok(out)
}
