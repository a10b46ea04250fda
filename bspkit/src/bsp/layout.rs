use std::{fmt, ops::Range};

use glam::{Vec2, Vec3, Vec4};

use crate::{
    binaries::Endian,
    error::{BspError, Result},
    format::MapType,
};

/// How a field is stored in the record bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    Vec2F32,
    Vec2I32,
    Vec3F32,
    Vec3I16,
    Vec3I32,
    Vec4F32,
    /// NUL padded string of a fixed byte width.
    Str(usize),
}

impl Encoding {
    pub const fn width(self) -> usize {
        match self {
            Encoding::I8 | Encoding::U8 => 1,
            Encoding::I16 | Encoding::U16 => 2,
            Encoding::I32 | Encoding::U32 | Encoding::F32 => 4,
            Encoding::Vec3I16 => 6,
            Encoding::Vec2F32 | Encoding::Vec2I32 => 8,
            Encoding::Vec3F32 | Encoding::Vec3I32 => 12,
            Encoding::Vec4F32 => 16,
            Encoding::Str(len) => len,
        }
    }
}

/// Where a present field lives inside its record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    pub offset: usize,
    pub encoding: Encoding,
}

impl FieldLayout {
    pub const fn at(offset: usize, encoding: Encoding) -> Self {
        Self { offset, encoding }
    }

    pub const fn width(&self) -> usize {
        self.encoding.width()
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width()
    }
}

/// A kind of fixed-stride record (face, plane, ...) and its per-format layout
/// tables.
///
/// Both functions are pure. `layout` is total: a field that a format does
/// not store resolves to `None`. `struct_length` is `None` when the record
/// kind does not exist in the format at all, which makes any lump of it
/// uninterpretable.
pub trait RecordKind {
    type Field: Copy + fmt::Debug + 'static;

    const NAME: &'static str;
    const FIELDS: &'static [Self::Field];

    fn struct_length(format: MapType, lump_version: i32) -> Option<usize>;

    fn layout(field: Self::Field, format: MapType, lump_version: i32) -> Option<FieldLayout>;
}

pub fn resolve<K: RecordKind>(
    field: K::Field,
    format: MapType,
    lump_version: i32,
) -> Option<FieldLayout> {
    K::layout(field, format, lump_version)
}

pub fn struct_length<K: RecordKind>(format: MapType, lump_version: i32) -> Result<usize> {
    K::struct_length(format, lump_version).ok_or(BspError::UnsupportedFormat {
        kind: K::NAME,
        format,
    })
}

/// A value type a field can be read as.
///
/// `decode` and `encode` receive exactly the field's bytes and return
/// `None`/`false` when the encoding cannot carry this value type.
pub trait FieldValue: Sized {
    fn sentinel() -> Self;

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self>;

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool;
}

fn decode_int(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<i64> {
    Some(match encoding {
        Encoding::I8 => bytes[0] as i8 as i64,
        Encoding::U8 => bytes[0] as i64,
        Encoding::I16 => endian.read_i16(bytes) as i64,
        Encoding::U16 => endian.read_u16(bytes) as i64,
        Encoding::I32 => endian.read_i32(bytes) as i64,
        Encoding::U32 => endian.read_u32(bytes) as i64,
        _ => return None,
    })
}

// Values wider than the field keep their low bytes.
fn encode_int(encoding: Encoding, bytes: &mut [u8], endian: Endian, value: i64) -> bool {
    match encoding {
        Encoding::I8 | Encoding::U8 => bytes[0] = value as u8,
        Encoding::I16 | Encoding::U16 => endian.write_u16(bytes, value as u16),
        Encoding::I32 | Encoding::U32 => endian.write_u32(bytes, value as u32),
        _ => return false,
    }
    true
}

impl FieldValue for i64 {
    fn sentinel() -> Self {
        -1
    }

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self> {
        decode_int(encoding, bytes, endian)
    }

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool {
        encode_int(encoding, bytes, endian, *self)
    }
}

impl FieldValue for i32 {
    fn sentinel() -> Self {
        -1
    }

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self> {
        decode_int(encoding, bytes, endian).map(|v| v as i32)
    }

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool {
        encode_int(encoding, bytes, endian, *self as i64)
    }
}

impl FieldValue for f32 {
    fn sentinel() -> Self {
        f32::NAN
    }

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self> {
        match encoding {
            Encoding::F32 => Some(endian.read_f32(bytes)),
            _ => None,
        }
    }

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool {
        match encoding {
            Encoding::F32 => {
                endian.write_f32(bytes, *self);
                true
            }
            _ => false,
        }
    }
}

fn read_floats<const N: usize>(bytes: &[u8], endian: Endian) -> [f32; N] {
    std::array::from_fn(|i| endian.read_f32(&bytes[i * 4..]))
}

fn write_floats(bytes: &mut [u8], endian: Endian, values: &[f32]) {
    for (i, v) in values.iter().enumerate() {
        endian.write_f32(&mut bytes[i * 4..], *v);
    }
}

impl FieldValue for Vec2 {
    fn sentinel() -> Self {
        Vec2::NAN
    }

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self> {
        match encoding {
            Encoding::Vec2F32 => Some(Vec2::from_array(read_floats(bytes, endian))),
            Encoding::Vec2I32 => Some(Vec2::new(
                endian.read_i32(bytes) as f32,
                endian.read_i32(&bytes[4..]) as f32,
            )),
            _ => None,
        }
    }

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool {
        match encoding {
            Encoding::Vec2F32 => write_floats(bytes, endian, &self.to_array()),
            Encoding::Vec2I32 => {
                endian.write_i32(bytes, self.x as i32);
                endian.write_i32(&mut bytes[4..], self.y as i32);
            }
            _ => return false,
        }
        true
    }
}

impl FieldValue for Vec3 {
    fn sentinel() -> Self {
        Vec3::NAN
    }

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self> {
        match encoding {
            Encoding::Vec3F32 => Some(Vec3::from_array(read_floats(bytes, endian))),
            Encoding::Vec3I16 => Some(Vec3::from_array(std::array::from_fn(|i| {
                endian.read_i16(&bytes[i * 2..]) as f32
            }))),
            Encoding::Vec3I32 => Some(Vec3::from_array(std::array::from_fn(|i| {
                endian.read_i32(&bytes[i * 4..]) as f32
            }))),
            _ => None,
        }
    }

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool {
        match encoding {
            Encoding::Vec3F32 => write_floats(bytes, endian, &self.to_array()),
            Encoding::Vec3I16 => {
                for (i, v) in self.to_array().iter().enumerate() {
                    endian.write_i16(&mut bytes[i * 2..], *v as i16);
                }
            }
            Encoding::Vec3I32 => {
                for (i, v) in self.to_array().iter().enumerate() {
                    endian.write_i32(&mut bytes[i * 4..], *v as i32);
                }
            }
            _ => return false,
        }
        true
    }
}

impl FieldValue for Vec4 {
    fn sentinel() -> Self {
        Vec4::NAN
    }

    fn decode(encoding: Encoding, bytes: &[u8], endian: Endian) -> Option<Self> {
        match encoding {
            Encoding::Vec4F32 => Some(Vec4::from_array(read_floats(bytes, endian))),
            _ => None,
        }
    }

    fn encode(&self, encoding: Encoding, bytes: &mut [u8], endian: Endian) -> bool {
        match encoding {
            Encoding::Vec4F32 => {
                write_floats(bytes, endian, &self.to_array());
                true
            }
            _ => false,
        }
    }
}

impl FieldValue for String {
    fn sentinel() -> Self {
        String::new()
    }

    fn decode(encoding: Encoding, bytes: &[u8], _endian: Endian) -> Option<Self> {
        match encoding {
            Encoding::Str(_) => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            _ => None,
        }
    }

    /// Keeps at least one terminating NUL; longer strings are cut.
    fn encode(&self, encoding: Encoding, bytes: &mut [u8], _endian: Endian) -> bool {
        match encoding {
            Encoding::Str(len) if len > 0 => {
                let src = self.as_bytes();
                let n = src.len().min(len - 1);
                bytes.fill(0);
                bytes[..n].copy_from_slice(&src[..n]);
                true
            }
            _ => false,
        }
    }
}

/// Checks that a kind's tables agree with each other for every format and
/// the given lump versions.
#[cfg(test)]
pub(crate) fn assert_consistent_tables<K: RecordKind>(versions: &[i32]) {
    for format in MapType::ALL {
        for &version in versions {
            match K::struct_length(format, version) {
                Some(stride) => {
                    assert!(stride > 0);
                    for &field in K::FIELDS {
                        if let Some(layout) = K::layout(field, format, version) {
                            assert!(
                                layout.range().end <= stride,
                                "{} {:?} at {:?} overruns the {} byte stride of {:?} v{}",
                                K::NAME,
                                field,
                                layout.range(),
                                stride,
                                format,
                                version
                            );
                        }
                    }
                }
                None => {
                    for &field in K::FIELDS {
                        assert_eq!(
                            K::layout(field, format, version),
                            None,
                            "{} {:?} is laid out for {:?} v{} which has no {} records",
                            K::NAME,
                            field,
                            format,
                            version,
                            K::NAME
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn int_widths() {
        let mut bytes = [0u8; 4];
        assert!(65535i32.encode(Encoding::U16, &mut bytes[..2], Endian::Little));
        assert_eq!(i32::decode(Encoding::U16, &bytes[..2], Endian::Little), Some(65535));
        assert_eq!(i32::decode(Encoding::I16, &bytes[..2], Endian::Little), Some(-1));

        assert!((-2i64).encode(Encoding::I8, &mut bytes[..1], Endian::Big));
        assert_eq!(i64::decode(Encoding::I8, &bytes[..1], Endian::Big), Some(-2));
        assert_eq!(i64::decode(Encoding::U8, &bytes[..1], Endian::Big), Some(254));

        assert!(u32::MAX as i64 == i64::decode(Encoding::U32, &[0xFF; 4], Endian::Big).unwrap());
    }

    #[test]
    fn mismatched_value_type() {
        let mut bytes = [0u8; 12];
        assert_eq!(f32::decode(Encoding::I32, &bytes[..4], Endian::Little), None);
        assert!(!1.0f32.encode(Encoding::I32, &mut bytes[..4], Endian::Little));
        assert!(!Vec3::ONE.encode(Encoding::F32, &mut bytes[..4], Endian::Little));
        assert_eq!(bytes, [0u8; 12]);
    }

    #[test]
    fn vectors() {
        let mut bytes = [0u8; 12];
        let v = Vec3::new(1.0, -2.0, 3.5);
        assert!(v.encode(Encoding::Vec3F32, &mut bytes, Endian::Big));
        assert_eq!(Vec3::decode(Encoding::Vec3F32, &bytes, Endian::Big), Some(v));

        let v = Vec3::new(-4.0, 5.0, 32767.0);
        assert!(v.encode(Encoding::Vec3I16, &mut bytes[..6], Endian::Little));
        assert_eq!(Vec3::decode(Encoding::Vec3I16, &bytes[..6], Endian::Little), Some(v));

        let v = Vec2::new(16.0, 8.0);
        assert!(v.encode(Encoding::Vec2I32, &mut bytes[..8], Endian::Little));
        assert_eq!(Vec2::decode(Encoding::Vec2I32, &bytes[..8], Endian::Little), Some(v));
    }

    #[test]
    fn strings() {
        let mut bytes = [0xAAu8; 8];
        assert!("brick".to_string().encode(Encoding::Str(8), &mut bytes, Endian::Little));
        assert_eq!(&bytes, b"brick\0\0\0");
        assert_eq!(
            String::decode(Encoding::Str(8), &bytes, Endian::Little).as_deref(),
            Some("brick")
        );

        assert!("overlong_name".to_string().encode(Encoding::Str(8), &mut bytes, Endian::Little));
        assert_eq!(&bytes, b"overlon\0");
    }

    #[test]
    fn sentinels() {
        assert_eq!(i32::sentinel(), -1);
        assert_eq!(i64::sentinel(), -1);
        assert!(f32::sentinel().is_nan());
        assert!(Vec3::sentinel().is_nan());
        assert!(Vec2::sentinel().is_nan());
        assert!(String::sentinel().is_empty());
    }
}
