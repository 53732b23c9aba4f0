use std::fmt::{self, Display};

/// Element buffer of a stored column in the widened in-memory layout.
#[derive(Clone, Debug, PartialEq)]
pub enum RawData {
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    /// Contiguous fixed-width elements, padding included.
    FixedString { width: usize, bytes: Vec<u8> },
    /// `None` stands for a null string pointer.
    VarLenString(Vec<Option<Vec<u8>>>),
}

impl RawData {
    /// Number of elements held by the buffer.
    pub fn len(&self) -> usize {
        match self {
            RawData::Int(v) => v.len(),
            RawData::UInt(v) => v.len(),
            RawData::Float(v) => v.len(),
            RawData::Bool(v) => v.len(),
            RawData::FixedString { width: 0, .. } => 0,
            RawData::FixedString { width, bytes } => bytes.len() / width,
            RawData::VarLenString(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fixed_strings<I, S>(width: usize, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut bytes = Vec::new();
        for item in items {
            let item = item.as_ref();
            let n = item.len().min(width);
            bytes.extend_from_slice(&item[..n]);
            bytes.resize(bytes.len() + width - n, 0);
        }
        RawData::FixedString { width, bytes }
    }

    pub fn varlen_strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        RawData::VarLenString(items.into_iter().map(|s| Some(s.as_ref().to_vec())).collect())
    }
}

impl Display for RawData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RawData::Int(_) => write!(f, "int64 buffer"),
            RawData::UInt(_) => write!(f, "uint64 buffer"),
            RawData::Float(_) => write!(f, "float64 buffer"),
            RawData::Bool(_) => write!(f, "bool buffer"),
            RawData::FixedString { width, .. } => write!(f, "fixed string buffer (len {})", width),
            RawData::VarLenString(_) => write!(f, "var len string buffer"),
        }
    }
}

/// A stored column as read from the container, before decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct RawColumn {
    pub shape: Vec<usize>,
    pub data: RawData,
}

impl RawColumn {
    pub fn new(shape: &[usize], data: RawData) -> Self {
        Self { shape: shape.to_vec(), data }
    }

    /// One-dimensional column whose shape is taken from the buffer length.
    pub fn vector(data: RawData) -> Self {
        Self { shape: vec![data.len()], data }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements implied by the shape.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}
