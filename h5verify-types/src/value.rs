use std::fmt::{self, Debug, Display};

use ndarray::{Array, ArrayD, ArrayViewD, Dimension, IxDyn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Text => write!(f, "text"),
        }
    }
}

/// Decoded, comparison-ready form of a stored column or of an expected literal.
///
/// The shape is part of the value: a scalar is a 0-dimensional array, a vector
/// of length one is not the same shape as a scalar (comparison treats them as
/// compatible, equality here does not).
#[derive(Clone, PartialEq)]
pub enum Value {
    Integer(ArrayD<i64>),
    Float(ArrayD<f64>),
    Boolean(ArrayD<bool>),
    Text(ArrayD<String>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Value::Integer(a) => a.shape(),
            Value::Float(a) => a.shape(),
            Value::Boolean(a) => a.shape(),
            Value::Text(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

fn fmt_array<A, F>(view: ArrayViewD<A>, f: &mut fmt::Formatter, elem: &F) -> fmt::Result
where
    F: Fn(&A, &mut fmt::Formatter) -> fmt::Result,
{
    if view.ndim() == 0 {
        return match view.iter().next() {
            Some(x) => elem(x, f),
            None => Ok(()),
        };
    }
    f.write_str("[")?;
    for (i, sub) in view.outer_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        fmt_array(sub, f, elem)?;
    }
    f.write_str("]")
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(a) => fmt_array(a.view(), f, &|x, f| Display::fmt(x, f)),
            Value::Float(a) => fmt_array(a.view(), f, &|x, f| Debug::fmt(x, f)),
            Value::Boolean(a) => fmt_array(a.view(), f, &|x, f| Display::fmt(x, f)),
            Value::Text(a) => fmt_array(a.view(), f, &|x, f| Debug::fmt(x, f)),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{:?}({})", self.kind(), self.shape(), self)
    }
}

/// Element types that can be lifted into a [`Value`].
pub trait Element: Clone {
    fn into_value(array: ArrayD<Self>) -> Value;
}

macro_rules! impl_element {
    ($variant:ident, $target:ty; $($ty:ty),+) => {
        $(
            impl Element for $ty {
                fn into_value(array: ArrayD<Self>) -> Value {
                    Value::$variant(array.mapv(<$target>::from))
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Element::into_value(ArrayD::from_elem(IxDyn(&[]), value))
                }
            }
        )+
    };
}

impl_element!(Integer, i64; i8, i16, i32, i64, u8, u16, u32);
impl_element!(Float, f64; f32, f64);
impl_element!(Boolean, bool; bool);
impl_element!(Text, String; String, &'static str);

impl<A: Element> From<Vec<A>> for Value {
    fn from(values: Vec<A>) -> Self {
        A::into_value(Array::from(values).into_dyn())
    }
}

impl<A: Element> From<&[A]> for Value {
    fn from(values: &[A]) -> Self {
        A::into_value(Array::from(values.to_vec()).into_dyn())
    }
}

impl<A: Element, D: Dimension> From<Array<A, D>> for Value {
    fn from(array: Array<A, D>) -> Self {
        A::into_value(array.into_dyn())
    }
}
