use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of a whole file. Fixed once at load; every field access on the
/// file goes through the same value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn is_big(self) -> bool {
        self == Endian::Big
    }

    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Little => LittleEndian::read_u16(buf),
            Endian::Big => BigEndian::read_u16(buf),
        }
    }

    pub fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            Endian::Little => LittleEndian::read_i16(buf),
            Endian::Big => BigEndian::read_i16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Little => LittleEndian::read_u32(buf),
            Endian::Big => BigEndian::read_u32(buf),
        }
    }

    pub fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            Endian::Little => LittleEndian::read_i32(buf),
            Endian::Big => BigEndian::read_i32(buf),
        }
    }

    pub fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Endian::Little => LittleEndian::read_f32(buf),
            Endian::Big => BigEndian::read_f32(buf),
        }
    }

    pub fn write_u16(self, buf: &mut [u8], v: u16) {
        match self {
            Endian::Little => LittleEndian::write_u16(buf, v),
            Endian::Big => BigEndian::write_u16(buf, v),
        }
    }

    pub fn write_i16(self, buf: &mut [u8], v: i16) {
        match self {
            Endian::Little => LittleEndian::write_i16(buf, v),
            Endian::Big => BigEndian::write_i16(buf, v),
        }
    }

    pub fn write_u32(self, buf: &mut [u8], v: u32) {
        match self {
            Endian::Little => LittleEndian::write_u32(buf, v),
            Endian::Big => BigEndian::write_u32(buf, v),
        }
    }

    pub fn write_i32(self, buf: &mut [u8], v: i32) {
        match self {
            Endian::Little => LittleEndian::write_i32(buf, v),
            Endian::Big => BigEndian::write_i32(buf, v),
        }
    }

    pub fn write_f32(self, buf: &mut [u8], v: f32) {
        match self {
            Endian::Little => LittleEndian::write_f32(buf, v),
            Endian::Big => BigEndian::write_f32(buf, v),
        }
    }

    /// Converts a value read straight out of the file (native layout) into
    /// host order.
    pub fn to_native(self, v: i32) -> i32 {
        match self {
            Endian::Little => i32::from_le(v),
            Endian::Big => i32::from_be(v),
        }
    }

    pub fn to_native_u16(self, v: u16) -> u16 {
        match self {
            Endian::Little => u16::from_le(v),
            Endian::Big => u16::from_be(v),
        }
    }
}

/// Reads a plain-old-data directory record at `offset`. Returns `None` when
/// the record would run past the end of `data`.
pub fn read_pod<T: bytemuck::Pod>(data: &[u8], offset: usize) -> Option<T> {
    let end = offset.checked_add(std::mem::size_of::<T>())?;
    data.get(offset..end).map(bytemuck::pod_read_unaligned)
}

#[cfg(test)]
mod binaries_tests {
    use super::*;

    #[test]
    fn endian_round_trip() {
        let mut buf = [0u8; 4];
        Endian::Big.write_i32(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(Endian::Big.read_i32(&buf), 0x0102_0304);
        assert_eq!(Endian::Little.read_i32(&buf), 0x0403_0201);

        Endian::Little.write_f32(&mut buf, 1.5);
        assert_eq!(Endian::Little.read_f32(&buf), 1.5);
    }

    #[test]
    fn read_pod_bounds() {
        let data = [1u8, 0, 0, 0, 2, 0];
        let raw = read_pod::<[i32; 1]>(&data, 0).unwrap();
        assert_eq!(Endian::Little.to_native(raw[0]), 1);
        assert_eq!(read_pod::<[i32; 1]>(&data, 4), None);
        assert_eq!(read_pod::<[i32; 1]>(&data, usize::MAX), None);
    }
}
