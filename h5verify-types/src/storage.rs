use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::str;

use ascii::{AsAsciiStrError, AsciiStr};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    DuplicateCode(i64),
    DuplicateLabel(String),
    AsciiError(AsAsciiStrError),
    Utf8Error { valid_up_to: usize },
}

impl From<AsAsciiStrError> for StorageError {
    fn from(err: AsAsciiStrError) -> Self {
        StorageError::AsciiError(err)
    }
}

impl From<str::Utf8Error> for StorageError {
    fn from(err: str::Utf8Error) -> Self {
        StorageError::Utf8Error { valid_up_to: err.valid_up_to() }
    }
}

impl StdError for StorageError {}

impl Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StorageError::DuplicateCode(code) => {
                write!(f, "enum mapping error: code {} is mapped twice", code)
            }
            StorageError::DuplicateLabel(label) => {
                write!(f, "enum mapping error: label {:?} is mapped twice", label)
            }
            StorageError::AsciiError(err) => write!(f, "text error: {}", err),
            StorageError::Utf8Error { valid_up_to } => {
                write!(f, "text error: invalid utf-8 after byte {}", valid_up_to)
            }
        }
    }
}

/// Character set declared for a stored string type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Utf8,
}

impl Encoding {
    /// Decodes already unpadded bytes into an owned string.
    pub fn decode(self, bytes: &[u8]) -> Result<String, StorageError> {
        match self {
            Encoding::Ascii => Ok(AsciiStr::from_ascii(bytes)?.as_str().to_owned()),
            Encoding::Utf8 => Ok(str::from_utf8(bytes)?.to_owned()),
        }
    }
}

/// Padding convention of a fixed-width string type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrPad {
    NullTerm,
    NullPad,
    SpacePad,
}

impl StrPad {
    pub fn trim(self, bytes: &[u8]) -> &[u8] {
        match self {
            StrPad::NullTerm => match bytes.iter().position(|&c| c == 0) {
                Some(pos) => &bytes[..pos],
                None => bytes,
            },
            StrPad::NullPad => {
                let len = bytes.iter().rev().skip_while(|&&c| c == 0).count();
                &bytes[..len]
            }
            StrPad::SpacePad => {
                let len = bytes.iter().rev().skip_while(|&&c| c == b' ').count();
                &bytes[..len]
            }
        }
    }
}

/// Bijective mapping from the integer codes of an enumerated type to its labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumMap {
    labels: BTreeMap<i64, String>,
}

impl EnumMap {
    pub fn new<I, S>(members: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut labels = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for (code, label) in members {
            let label = label.into();
            if !seen.insert(label.clone()) {
                return Err(StorageError::DuplicateLabel(label));
            }
            if labels.insert(code, label).is_some() {
                return Err(StorageError::DuplicateCode(code));
            }
        }
        Ok(Self { labels })
    }

    /// Builds the mapping of an R factor: labels are coded from 1 in level order.
    pub fn from_levels<I, S>(levels: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(levels.into_iter().zip(1..).map(|(label, code)| (code, label)))
    }

    pub fn label(&self, code: i64) -> Option<&str> {
        self.labels.get(&code).map(String::as_str)
    }

    pub fn code(&self, label: &str) -> Option<i64> {
        self.labels.iter().find(|(_, l)| l.as_str() == label).map(|(&c, _)| c)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Element type of a stored column, as declared by the container's type metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeInfo {
    Integer { signed: bool, size: usize },
    Float { size: usize },
    Boolean,
    /// `width` is `None` for variable-length strings.
    Text { encoding: Encoding, padding: StrPad, width: Option<usize> },
    Enum(EnumMap),
}

impl TypeInfo {
    pub fn fixed_string(width: usize, encoding: Encoding, padding: StrPad) -> Self {
        TypeInfo::Text { encoding, padding, width: Some(width) }
    }

    pub fn varlen_string(encoding: Encoding) -> Self {
        TypeInfo::Text { encoding, padding: StrPad::NullTerm, width: None }
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeInfo::Integer { signed: true, size } => write!(f, "int{}", size * 8),
            TypeInfo::Integer { signed: false, size } => write!(f, "uint{}", size * 8),
            TypeInfo::Float { size } => write!(f, "float{}", size * 8),
            TypeInfo::Boolean => write!(f, "bool"),
            TypeInfo::Text { encoding: Encoding::Ascii, width: Some(n), .. } => {
                write!(f, "string (len {})", n)
            }
            TypeInfo::Text { encoding: Encoding::Utf8, width: Some(n), .. } => {
                write!(f, "unicode (len {})", n)
            }
            TypeInfo::Text { encoding: Encoding::Ascii, width: None, .. } => {
                write!(f, "string (var len)")
            }
            TypeInfo::Text { encoding: Encoding::Utf8, width: None, .. } => {
                write!(f, "unicode (var len)")
            }
            TypeInfo::Enum(map) => write!(f, "enum ({} labels)", map.len()),
        }
    }
}
