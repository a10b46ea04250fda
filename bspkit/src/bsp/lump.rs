use std::{fmt, marker::PhantomData};

use crate::{
    binaries::Endian,
    error::{BspError, Result},
    format::MapType,
};

use super::{
    layout::{struct_length, RecordKind},
    record::Record,
};

/// What a lump needs from its file to interpret records: the format, the
/// lump's own version from the directory and the file's byte order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LumpContext {
    pub format: MapType,
    pub version: i32,
    pub endian: Endian,
}

impl LumpContext {
    pub fn new(format: MapType, version: i32, endian: Endian) -> Self {
        Self {
            format,
            version,
            endian,
        }
    }
}

/// A run of fixed-stride records of kind `K`.
///
/// Records are views into the lump's own bytes; writes through
/// [`Lump::get_mut`] land in the backing storage. An owned `Lump<Vec<u8>, K>`
/// can also grow and shrink.
pub struct Lump<B, K> {
    data: B,
    stride: usize,
    ctx: LumpContext,
    _kind: PhantomData<fn() -> K>,
}

impl<B: AsRef<[u8]>, K: RecordKind> Lump<B, K> {
    pub fn new(data: B, ctx: LumpContext) -> Result<Self> {
        let stride = struct_length::<K>(ctx.format, ctx.version)?;
        Self::with_stride(data, stride, ctx)
    }

    pub fn with_stride(data: B, stride: usize, ctx: LumpContext) -> Result<Self> {
        if stride == 0 {
            return Err(BspError::malformed(K::NAME, "record stride is zero"));
        }
        let len = data.as_ref().len();
        if len % stride != 0 {
            return Err(BspError::malformed(
                K::NAME,
                format!("{len} bytes is not a multiple of the {stride} byte record"),
            ));
        }
        Ok(Self::from_parts(data, stride, ctx))
    }

    pub(crate) fn from_parts(data: B, stride: usize, ctx: LumpContext) -> Self {
        Self {
            data,
            stride,
            ctx,
            _kind: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn context(&self) -> LumpContext {
        self.ctx
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn check_index(&self, index: usize) -> Result<std::ops::Range<usize>> {
        let count = self.len();
        if index >= count {
            return Err(BspError::OutOfRangeIndex {
                lump: K::NAME,
                index,
                count,
            });
        }
        Ok(index * self.stride..(index + 1) * self.stride)
    }

    pub fn get(&self, index: usize) -> Result<Record<&[u8], K>> {
        let range = self.check_index(index)?;
        Ok(Record::new(&self.data.as_ref()[range], self.ctx))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Record<&[u8], K>> + '_ {
        let ctx = self.ctx;
        self.data
            .as_ref()
            .chunks_exact(self.stride)
            .map(move |chunk| Record::new(chunk, ctx))
    }

    /// Detached copy of the lump that can be resized.
    pub fn to_owned_lump(&self) -> Lump<Vec<u8>, K> {
        Lump::from_parts(self.as_bytes().to_vec(), self.stride, self.ctx)
    }
}

impl<B: AsRef<[u8]>, K: RecordKind> fmt::Debug for Lump<B, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lump")
            .field("kind", &K::NAME)
            .field("len", &self.len())
            .field("stride", &self.stride)
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>, K: RecordKind> Lump<B, K> {
    pub fn get_mut(&mut self, index: usize) -> Result<Record<&mut [u8], K>> {
        let range = self.check_index(index)?;
        Ok(Record::new(&mut self.data.as_mut()[range], self.ctx))
    }

    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = Record<&mut [u8], K>> + '_ {
        let ctx = self.ctx;
        self.data
            .as_mut()
            .chunks_exact_mut(self.stride)
            .map(move |chunk| Record::new(chunk, ctx))
    }
}

impl<K: RecordKind> Lump<Vec<u8>, K> {
    pub fn empty(ctx: LumpContext) -> Result<Self> {
        Self::new(Vec::new(), ctx)
    }

    fn check_record(&self, record: &[u8]) -> Result<()> {
        if record.len() != self.stride {
            return Err(BspError::malformed(
                K::NAME,
                format!(
                    "record of {} bytes does not match the {} byte stride",
                    record.len(),
                    self.stride
                ),
            ));
        }
        Ok(())
    }

    pub fn push(&mut self, record: &[u8]) -> Result<()> {
        self.check_record(record)?;
        self.data.extend_from_slice(record);
        Ok(())
    }

    /// Appends an all-zero record and returns it for filling in.
    pub fn push_zeroed(&mut self) -> Record<&mut [u8], K> {
        let start = self.data.len();
        self.data.resize(start + self.stride, 0);
        Record::new(&mut self.data[start..], self.ctx)
    }

    pub fn insert(&mut self, index: usize, record: &[u8]) -> Result<()> {
        self.check_record(record)?;
        let count = self.len();
        if index > count {
            return Err(BspError::OutOfRangeIndex {
                lump: K::NAME,
                index,
                count,
            });
        }
        let at = index * self.stride;
        self.data.splice(at..at, record.iter().copied());
        Ok(())
    }

    /// Removes a record and returns its bytes.
    pub fn remove(&mut self, index: usize) -> Result<Vec<u8>> {
        let range = self.check_index(index)?;
        Ok(self.data.drain(range).collect())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
