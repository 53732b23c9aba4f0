//! Reading stored columns out of an HDF5 file.
//!
//! Every object is read with a single raw `H5Dread`/`H5Aread` into a memory
//! type derived from the file type: integers widened to 64 bits, floats to
//! `f64`, everything else kept as declared. The byte buffer is then split into
//! owned columns, so nothing downstream ever sees a library pointer.

use std::ffi::CStr;
use std::mem;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use hdf5::types::{CompoundField, CompoundType, EnumType, FloatSize, IntSize, TypeDescriptor as TD};
use hdf5::{Container, Datatype, File};
use hdf5_sys::h5::H5free_memory;
use hdf5_sys::h5a::H5Aread;
use hdf5_sys::h5d::H5Dread;
use hdf5_sys::h5p::H5P_DEFAULT;
use hdf5_sys::h5s::H5S_ALL;

use h5verify_types::{EnumMap, Encoding, RawColumn, RawData, StrPad, TypeInfo};

use crate::check::{Field, Source, Stored};
use crate::error::{Error, Result};

/// A read-only HDF5 file; closed when dropped.
pub struct H5Source {
    file: File,
    path: PathBuf,
}

impl H5Source {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        hdf5::silence_errors(true);
        match File::open(path) {
            Ok(file) => Ok(Self { file, path: path.to_owned() }),
            Err(err) => Err(Error::FileOpen { path: path.to_owned(), reason: err.to_string() }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for H5Source {
    fn dataset(&self, path: &str) -> Result<Stored> {
        let name = path.trim_matches('/');
        ensure!(!name.is_empty() && self.file.link_exists(name), "dataset '{}' not found", path);
        let dataset = self.file.dataset(name)?;
        read_container(&dataset, false)
    }

    fn attribute(&self, object: &str, name: &str) -> Result<Stored> {
        let location = object.trim_matches('/');
        let attr = if location.is_empty() {
            ensure!(has_attr(&self.file, name)?, "attribute '{}' not found on '{}'", name, object);
            self.file.attr(name)?
        } else {
            ensure!(self.file.link_exists(location), "object '{}' not found", object);
            match self.file.dataset(location) {
                Ok(dataset) => {
                    ensure!(has_attr(&dataset, name)?, "attribute '{}' not found on '{}'", name, object);
                    dataset.attr(name)?
                }
                Err(_) => {
                    let group = self.file.group(location)?;
                    ensure!(has_attr(&group, name)?, "attribute '{}' not found on '{}'", name, object);
                    group.attr(name)?
                }
            }
        };
        read_container(&attr, true)
    }
}

fn has_attr(location: &hdf5::Location, name: &str) -> Result<bool> {
    Ok(location.attr_names()?.iter().any(|n| n == name))
}

fn read_container(obj: &Container, is_attr: bool) -> Result<Stored> {
    let shape = obj.shape();
    let n: usize = shape.iter().product();
    match obj.dtype()?.to_descriptor()? {
        TD::Compound(compound) => {
            let mut fields = compound.fields;
            fields.sort_by_key(|f| f.index);
            let mem_fields = fields
                .iter()
                .map(|f| Ok(CompoundField::new(&f.name, memory_type(&f.ty)?, 0, f.index)))
                .collect::<Result<Vec<_>>>()?;
            let layout = CompoundType { fields: mem_fields, size: 0 }.to_c_repr();
            let infos = fields.iter().map(|f| type_info(&f.ty)).collect::<Result<Vec<_>>>()?;

            let bytes = read_bytes(obj, is_attr, &TD::Compound(layout.clone()), n)?;
            let mut columns = Vec::with_capacity(fields.len());
            for ((file_field, mem_field), info) in fields.iter().zip(&layout.fields).zip(infos) {
                let data = column(&mem_field.ty, &bytes, mem_field.offset, layout.size, n)?;
                columns.push(Field::new(&file_field.name, RawColumn::new(&shape, data), info));
            }
            Ok(Stored::record(columns))
        }
        desc => {
            let info = type_info(&desc)?;
            let mem = memory_type(&desc)?;
            let bytes = read_bytes(obj, is_attr, &mem, n)?;
            let data = column(&mem, &bytes, 0, mem.size(), n)?;
            Ok(Stored::array(RawColumn::new(&shape, data), info))
        }
    }
}

/// In-memory counterpart of a file type; anything not listed cannot be decoded.
fn memory_type(desc: &TD) -> Result<TD> {
    match desc {
        TD::Integer(_) => Ok(TD::Integer(IntSize::U8)),
        TD::Unsigned(_) => Ok(TD::Unsigned(IntSize::U8)),
        TD::Float(_) => Ok(TD::Float(FloatSize::U8)),
        TD::Boolean
        | TD::Enum(_)
        | TD::FixedAscii(_)
        | TD::FixedUnicode(_)
        | TD::VarLenAscii
        | TD::VarLenUnicode => Ok(desc.clone()),
        _ => fail!("unsupported stored type: {}", desc),
    }
}

fn type_info(desc: &TD) -> Result<TypeInfo> {
    Ok(match desc {
        TD::Integer(size) => TypeInfo::Integer { signed: true, size: *size as usize },
        TD::Unsigned(size) => TypeInfo::Integer { signed: false, size: *size as usize },
        TD::Float(size) => TypeInfo::Float { size: *size as usize },
        TD::Boolean => TypeInfo::Boolean,
        TD::Enum(tp) => TypeInfo::Enum(enum_map(tp)?),
        // fixed strings are converted to null-padded on read
        TD::FixedAscii(n) => TypeInfo::fixed_string(*n, Encoding::Ascii, StrPad::NullPad),
        TD::FixedUnicode(n) => TypeInfo::fixed_string(*n, Encoding::Utf8, StrPad::NullPad),
        TD::VarLenAscii => TypeInfo::varlen_string(Encoding::Ascii),
        TD::VarLenUnicode => TypeInfo::varlen_string(Encoding::Utf8),
        _ => fail!("unsupported stored type: {}", desc),
    })
}

fn sign_extend(value: u64, size: usize) -> i64 {
    let shift = 64 - 8 * size as u32;
    ((value << shift) as i64) >> shift
}

fn enum_map(tp: &EnumType) -> Result<EnumMap> {
    let size = tp.size as usize;
    let mut members = Vec::with_capacity(tp.members.len());
    for member in &tp.members {
        let code = if tp.signed {
            sign_extend(member.value, size)
        } else {
            i64::try_from(member.value)
                .map_err(|_| format!("enum code {} of '{}' overflows int64", member.value, member.name))?
        };
        members.push((code, member.name.clone()));
    }
    Ok(EnumMap::new(members)?)
}

fn read_bytes(obj: &Container, is_attr: bool, mem: &TD, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0_u8; n * mem.size()];
    if buf.is_empty() {
        return Ok(buf);
    }
    let dtype = Datatype::from_descriptor(mem)?;
    let (obj_id, tp_id, ptr) = (obj.id(), dtype.id(), buf.as_mut_ptr());
    hdf5::sync::sync(|| {
        hdf5::h5check(unsafe {
            if is_attr {
                H5Aread(obj_id, tp_id, ptr.cast())
            } else {
                H5Dread(obj_id, tp_id, H5S_ALL, H5S_ALL, H5P_DEFAULT, ptr.cast())
            }
        })
    })?;
    Ok(buf)
}

fn word<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut out = [0_u8; N];
    out.copy_from_slice(chunk);
    out
}

/// Zero-extends a native-endian integer of `chunk.len()` bytes.
fn read_uint(chunk: &[u8]) -> u64 {
    let mut out = [0_u8; 8];
    if cfg!(target_endian = "little") {
        out[..chunk.len()].copy_from_slice(chunk);
    } else {
        out[8 - chunk.len()..].copy_from_slice(chunk);
    }
    u64::from_ne_bytes(out)
}

/// Copies a library-allocated C string and releases it; null stays `None`.
unsafe fn take_string(ptr: *mut c_char) -> Option<Vec<u8>> {
    if ptr.is_null() {
        return None;
    }
    let bytes = CStr::from_ptr(ptr).to_bytes().to_vec();
    hdf5::sync::sync(|| unsafe { H5free_memory(ptr.cast()) });
    Some(bytes)
}

/// Extracts one column of `n` elements laid out every `stride` bytes from `offset`.
fn column(mem: &TD, bytes: &[u8], offset: usize, stride: usize, n: usize) -> Result<RawData> {
    let size = mem.size();
    let at = |i: usize| &bytes[i * stride + offset..i * stride + offset + size];
    Ok(match mem {
        TD::Integer(_) => RawData::Int((0..n).map(|i| i64::from_ne_bytes(word(at(i)))).collect()),
        TD::Unsigned(_) => RawData::UInt((0..n).map(|i| u64::from_ne_bytes(word(at(i)))).collect()),
        TD::Float(_) => RawData::Float((0..n).map(|i| f64::from_ne_bytes(word(at(i)))).collect()),
        TD::Boolean => RawData::Bool((0..n).map(|i| at(i)[0] != 0).collect()),
        TD::Enum(tp) if tp.signed => {
            RawData::Int((0..n).map(|i| sign_extend(read_uint(at(i)), size)).collect())
        }
        TD::Enum(_) => RawData::UInt((0..n).map(|i| read_uint(at(i))).collect()),
        TD::FixedAscii(width) | TD::FixedUnicode(width) => {
            let bytes = (0..n).flat_map(|i| at(i).iter().copied()).collect();
            RawData::FixedString { width: *width, bytes }
        }
        TD::VarLenAscii | TD::VarLenUnicode => {
            debug_assert_eq!(size, mem::size_of::<usize>());
            let ptrs = (0..n).map(|i| usize::from_ne_bytes(word(at(i))) as *mut c_char);
            RawData::VarLenString(ptrs.map(|ptr| unsafe { take_string(ptr) }).collect())
        }
        _ => fail!("unsupported stored type: {}", mem),
    })
}

#[cfg(test)]
pub mod tests {
    use hdf5::types::{EnumMember, EnumType, IntSize, TypeDescriptor as TD};

    use h5verify_types::{Encoding, StrPad, TypeInfo};

    use super::{enum_map, memory_type, read_uint, sign_extend, type_info};

    #[test]
    pub fn test_sign_extend() {
        assert_eq!(sign_extend(0xff, 1), -1);
        assert_eq!(sign_extend(0x7f, 1), 127);
        assert_eq!(sign_extend(0xffff_fffe, 4), -2);
        assert_eq!(sign_extend(u64::MAX, 8), -1);
        assert_eq!(read_uint(&3_u16.to_ne_bytes()), 3);
        assert_eq!(read_uint(&(-1_i32).to_ne_bytes()), 0xffff_ffff);
    }

    #[test]
    pub fn test_memory_type() {
        assert_eq!(memory_type(&TD::Integer(IntSize::U4)).unwrap(), TD::Integer(IntSize::U8));
        assert_eq!(memory_type(&TD::Unsigned(IntSize::U1)).unwrap(), TD::Unsigned(IntSize::U8));
        assert_eq!(memory_type(&TD::FixedAscii(6)).unwrap(), TD::FixedAscii(6));
        assert_err!(
            memory_type(&TD::VarLenArray(Box::new(TD::Boolean))),
            r"unsupported stored type: \[bool\] \(var len\)"
        );
    }

    #[test]
    pub fn test_type_info() {
        assert_eq!(
            type_info(&TD::Integer(IntSize::U4)).unwrap(),
            TypeInfo::Integer { signed: true, size: 4 }
        );
        assert_eq!(
            type_info(&TD::FixedUnicode(3)).unwrap(),
            TypeInfo::fixed_string(3, Encoding::Utf8, StrPad::NullPad)
        );
        assert_eq!(type_info(&TD::VarLenAscii).unwrap(), TypeInfo::varlen_string(Encoding::Ascii));
    }

    #[test]
    pub fn test_enum_map() {
        let tp = EnumType {
            size: IntSize::U4,
            signed: true,
            members: vec![
                EnumMember { name: "neg".into(), value: 0xffff_ffff },
                EnumMember { name: "one".into(), value: 1 },
            ],
        };
        let map = enum_map(&tp).unwrap();
        assert_eq!(map.label(-1), Some("neg"));
        assert_eq!(map.label(1), Some("one"));

        let tp = EnumType {
            size: IntSize::U8,
            signed: false,
            members: vec![EnumMember { name: "big".into(), value: u64::MAX }],
        };
        assert_err!(enum_map(&tp), "enum code 18446744073709551615 of 'big' overflows int64");
    }
}
