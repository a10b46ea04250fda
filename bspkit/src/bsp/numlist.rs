use crate::{
    binaries::Endian,
    error::{BspError, Result},
    format::{quake1, quake2, source, MapType},
};

/// Element type of a [`NumList`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl NumType {
    pub const fn width(self) -> usize {
        match self {
            NumType::Int8 | NumType::UInt8 => 1,
            NumType::Int16 | NumType::UInt16 => 2,
            NumType::Int32 | NumType::UInt32 => 4,
        }
    }

    pub const fn min(self) -> i64 {
        match self {
            NumType::Int8 => i8::MIN as i64,
            NumType::Int16 => i16::MIN as i64,
            NumType::Int32 => i32::MIN as i64,
            NumType::UInt8 | NumType::UInt16 | NumType::UInt32 => 0,
        }
    }

    pub const fn max(self) -> i64 {
        match self {
            NumType::Int8 => i8::MAX as i64,
            NumType::UInt8 => u8::MAX as i64,
            NumType::Int16 => i16::MAX as i64,
            NumType::UInt16 => u16::MAX as i64,
            NumType::Int32 => i32::MAX as i64,
            NumType::UInt32 => u32::MAX as i64,
        }
    }

    pub fn fits(self, value: i64) -> bool {
        (self.min()..=self.max()).contains(&value)
    }

    fn decode(self, bytes: &[u8], endian: Endian) -> i64 {
        match self {
            NumType::Int8 => bytes[0] as i8 as i64,
            NumType::UInt8 => bytes[0] as i64,
            NumType::Int16 => endian.read_i16(bytes) as i64,
            NumType::UInt16 => endian.read_u16(bytes) as i64,
            NumType::Int32 => endian.read_i32(bytes) as i64,
            NumType::UInt32 => endian.read_u32(bytes) as i64,
        }
    }

    /// Caller has checked [`NumType::fits`].
    fn encode(self, bytes: &mut [u8], endian: Endian, value: i64) {
        match self {
            NumType::Int8 | NumType::UInt8 => bytes[0] = value as u8,
            NumType::Int16 | NumType::UInt16 => endian.write_u16(bytes, value as u16),
            NumType::Int32 | NumType::UInt32 => endian.write_u32(bytes, value as u32),
        }
    }
}

/// A packed list of integers of one width, read and written as `i64`.
pub struct NumList<B> {
    data: B,
    ty: NumType,
    endian: Endian,
}

impl<B: AsRef<[u8]>> NumList<B> {
    pub fn new(data: B, ty: NumType, endian: Endian) -> Result<Self> {
        let len = data.as_ref().len();
        if len % ty.width() != 0 {
            return Err(BspError::malformed(
                "NumList",
                format!("{len} bytes is not a multiple of the {:?} width", ty),
            ));
        }
        Ok(Self::from_parts(data, ty, endian))
    }

    pub(crate) fn from_parts(data: B, ty: NumType, endian: Endian) -> Self {
        Self { data, ty, endian }
    }

    pub fn num_type(&self) -> NumType {
        self.ty
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().len() / self.ty.width()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn element(&self, index: usize) -> Result<std::ops::Range<usize>> {
        let count = self.len();
        if index >= count {
            return Err(BspError::OutOfRangeIndex {
                lump: "NumList",
                index,
                count,
            });
        }
        let width = self.ty.width();
        Ok(index * width..(index + 1) * width)
    }

    pub fn get(&self, index: usize) -> Result<i64> {
        let range = self.element(index)?;
        Ok(self.ty.decode(&self.data.as_ref()[range], self.endian))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = i64> + '_ {
        let (ty, endian) = (self.ty, self.endian);
        self.data
            .as_ref()
            .chunks_exact(ty.width())
            .map(move |chunk| ty.decode(chunk, endian))
    }

    pub fn to_owned_list(&self) -> NumList<Vec<u8>> {
        NumList::from_parts(self.as_bytes().to_vec(), self.ty, self.endian)
    }
}

impl<B: AsRef<[u8]>> std::fmt::Debug for NumList<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumList")
            .field("ty", &self.ty)
            .field("len", &self.len())
            .field("endian", &self.endian)
            .finish()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> NumList<B> {
    /// Fails with [`BspError::Overflow`] when `value` is outside the element
    /// range; the list is left untouched.
    pub fn set(&mut self, index: usize, value: i64) -> Result<()> {
        self.check(value)?;
        let range = self.element(index)?;
        self.ty
            .encode(&mut self.data.as_mut()[range], self.endian, value);
        Ok(())
    }

    fn check(&self, value: i64) -> Result<()> {
        if self.ty.fits(value) {
            Ok(())
        } else {
            Err(BspError::Overflow {
                value,
                ty: self.ty,
            })
        }
    }
}

impl NumList<Vec<u8>> {
    pub fn empty(ty: NumType, endian: Endian) -> Self {
        Self::from_parts(Vec::new(), ty, endian)
    }

    pub fn push(&mut self, value: i64) -> Result<()> {
        self.check(value)?;
        let start = self.data.len();
        self.data.resize(start + self.ty.width(), 0);
        self.ty.encode(&mut self.data[start..], self.endian, value);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, value: i64) -> Result<()> {
        self.check(value)?;
        let count = self.len();
        if index > count {
            return Err(BspError::OutOfRangeIndex {
                lump: "NumList",
                index,
                count,
            });
        }
        let mut element = [0u8; 4];
        let width = self.ty.width();
        self.ty.encode(&mut element[..width], self.endian, value);
        let at = index * width;
        self.data.splice(at..at, element[..width].iter().copied());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<i64> {
        let value = self.get(index)?;
        let range = self.element(index)?;
        self.data.drain(range);
        Ok(value)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Lump index and element type of the mark surfaces (leaf faces) list.
pub fn index_for_mark_surfaces_lump(format: MapType) -> Option<(usize, NumType)> {
    match format {
        quake1!() => Some((11, NumType::UInt16)),
        quake2!() => Some((9, NumType::UInt16)),
        source!() | MapType::Source17 => Some((16, NumType::UInt16)),
        MapType::Vindictus => Some((16, NumType::UInt32)),
        MapType::Nightfire => Some((12, NumType::UInt32)),
        MapType::Quake3 | MapType::Raven => Some((5, NumType::Int32)),
        MapType::FAKK | MapType::MOHAA => Some((7, NumType::Int32)),
        MapType::STEF2 | MapType::STEF2Demo => Some((9, NumType::Int32)),
        _ => None,
    }
}

/// Signed edge indices; a negative entry walks the edge backwards.
pub fn index_for_surf_edges_lump(format: MapType) -> Option<(usize, NumType)> {
    match format {
        quake1!() => Some((13, NumType::Int32)),
        quake2!() => Some((12, NumType::Int32)),
        source!() | MapType::Source17 | MapType::Vindictus => Some((13, NumType::Int32)),
        _ => None,
    }
}

pub fn index_for_mark_brushes_lump(format: MapType) -> Option<(usize, NumType)> {
    match format {
        quake2!() => Some((10, NumType::UInt16)),
        source!() | MapType::Source17 => Some((17, NumType::UInt16)),
        MapType::Vindictus => Some((17, NumType::UInt32)),
        MapType::Nightfire => Some((13, NumType::UInt32)),
        MapType::Quake3 | MapType::Raven => Some((6, NumType::Int32)),
        MapType::FAKK | MapType::MOHAA => Some((6, NumType::Int32)),
        MapType::STEF2 | MapType::STEF2Demo => Some((8, NumType::Int32)),
        _ => None,
    }
}

/// Triangle indices of draw surfaces.
pub fn index_for_indices_lump(format: MapType) -> Option<(usize, NumType)> {
    match format {
        MapType::Quake3 | MapType::Raven => Some((11, NumType::Int32)),
        MapType::Nightfire => Some((6, NumType::UInt32)),
        MapType::FAKK | MapType::MOHAA => Some((5, NumType::Int32)),
        MapType::STEF2 | MapType::STEF2Demo => Some((7, NumType::Int32)),
        MapType::CoD => Some((8, NumType::UInt16)),
        _ => None,
    }
}

/// Offsets into the texdata string data.
pub fn index_for_tex_table_lump(format: MapType) -> Option<(usize, NumType)> {
    match format {
        source!() | MapType::Source17 | MapType::Vindictus => Some((44, NumType::Int32)),
        _ => None,
    }
}

pub fn index_for_displacement_triangles_lump(format: MapType) -> Option<(usize, NumType)> {
    match format {
        source!() | MapType::Source17 | MapType::Vindictus => Some((48, NumType::UInt16)),
        _ => None,
    }
}
