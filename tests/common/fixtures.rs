use h5verify::{EnumMap, Encoding, Field, MemorySource, RawColumn, RawData, Stored, TypeInfo};

pub fn int32() -> TypeInfo {
    TypeInfo::Integer { signed: true, size: 4 }
}

pub fn float64() -> TypeInfo {
    TypeInfo::Float { size: 8 }
}

pub fn utf8() -> TypeInfo {
    TypeInfo::varlen_string(Encoding::Utf8)
}

pub fn ints(values: &[i64]) -> Stored {
    Stored::array(RawColumn::vector(RawData::Int(values.to_vec())), int32())
}

pub fn floats(values: &[f64]) -> Stored {
    Stored::array(RawColumn::vector(RawData::Float(values.to_vec())), float64())
}

pub fn strings(values: &[&str]) -> Stored {
    Stored::array(RawColumn::vector(RawData::varlen_strings(values)), utf8())
}

/// The data frame as the writer stores it: `label` is a factor, coded from 1.
pub fn dataframe(scores: &[f64]) -> Stored {
    let levels = EnumMap::from_levels(vec!["A", "B", "C"]).unwrap();
    Stored::record(vec![
        Field::new("id", RawColumn::vector(RawData::Int(vec![1, 2, 3])), int32()),
        Field::new("score", RawColumn::vector(RawData::Float(scores.to_vec())), float64()),
        Field::new("label", RawColumn::vector(RawData::Int(vec![1, 2, 3])), TypeInfo::Enum(levels)),
    ])
}

/// Everything the interop suite expects, laid out like the writer lays it out.
pub fn interop_source() -> MemorySource {
    MemorySource::new()
        .with_dataset("vec_double", floats(&[1.1, 2.2, 3.3]))
        .with_dataset("vec_int", ints(&[1, 2, 3, 4, 5]))
        .with_dataset("vec_logical", ints(&[1, 0, 1]))
        .with_dataset("vec_char", strings(&["apple", "banana", "cherry"]))
        .with_dataset(
            "matrix_int",
            Stored::array(RawColumn::new(&[2, 3], RawData::Int(vec![1, 3, 5, 2, 4, 6])), int32()),
        )
        .with_dataset("dataframe", dataframe(&[10.5, 20.5, 15.5]))
        .with_dataset("dset_with_attr", floats(&[1.0, 2.0, 3.0]))
        .with_attribute("dset_with_attr", "unit", strings(&["meters"]))
        .with_attribute("dset_with_attr", "scale", floats(&[1.5]))
}
