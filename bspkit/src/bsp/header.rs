use std::ops::Range;

use crate::{
    binaries::{read_pod, Endian},
    error::{BspError, Result},
    format::MapType,
};

use super::consts::{HEADER_LUMPS, SOURCE_HEADER_SIZE};

/// Where one lump lies in the file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LumpInfo {
    pub offset: usize,
    pub length: usize,
    /// Per-lump version. Only Valve directories store one; zero elsewhere.
    pub version: i32,
    pub ident: [u8; 4],
}

impl LumpInfo {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Locates lumps inside a file. [`HeaderReader`] reads them from the file's
/// own directory; tools with other sources (packed or split files) can
/// provide their own.
pub trait BspReader {
    fn format(&self) -> MapType;

    fn is_big_endian(&self) -> bool;

    fn endian(&self) -> Endian {
        if self.is_big_endian() {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Fails with [`BspError::InvalidLumpIndex`] when the directory has no
    /// entry `index`.
    fn lump_info(&self, index: usize) -> Result<LumpInfo>;
}

#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct RawLump {
    file_ofs: i32,
    file_len: i32,
}

// https://developer.valvesoftware.com/wiki/BSP_(Source)
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct RawSourceLump {
    file_ofs: i32,
    file_len: i32,
    version: i32,
    four_cc: [u8; 4],
}

/// Left 4 Dead 2 moved the version to the front.
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct RawL4D2Lump {
    version: i32,
    file_ofs: i32,
    file_len: i32,
    four_cc: [u8; 4],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Directory {
    /// `count` (offset, length) pairs starting at byte `at`.
    Pairs { at: usize, count: usize },
    Source { l4d2: bool },
    /// Formats that address lumps another way: the Call of Duty 2/4 lump
    /// table, WAD directories and encrypted headers. No entries are read.
    None,
}

impl Directory {
    fn for_format(format: MapType) -> Self {
        let pairs = |at, count| Directory::Pairs { at, count };
        match format {
            MapType::Quake | MapType::GoldSrc => pairs(4, 15),
            MapType::Nightfire => pairs(4, 18),
            MapType::Quake2 => pairs(8, 19),
            MapType::Daikatana => pairs(8, 21),
            MapType::SiN => pairs(8, 20),
            MapType::SoF => pairs(8, 22),
            MapType::Quake3 => pairs(8, 17),
            MapType::Raven => pairs(8, 18),
            MapType::CoD => pairs(8, 33),
            // Ritual formats store a checksum after the version.
            MapType::FAKK => pairs(12, 20),
            MapType::MOHAA => pairs(12, 28),
            MapType::STEF2 | MapType::STEF2Demo => pairs(12, 30),
            MapType::L4D2 => Directory::Source { l4d2: true },
            MapType::Source17
            | MapType::Source18
            | MapType::Source19
            | MapType::Source20
            | MapType::Source21
            | MapType::Source22
            | MapType::Source23
            | MapType::Source27
            | MapType::Vindictus
            | MapType::DMoMaM => Directory::Source { l4d2: false },
            MapType::CoD2
            | MapType::CoD4
            | MapType::Doom
            | MapType::Hexen
            | MapType::TacticalInterventionEncrypted => Directory::None,
        }
    }

    fn len(self) -> usize {
        match self {
            Directory::Pairs { count, .. } => count,
            Directory::Source { .. } => HEADER_LUMPS,
            Directory::None => 0,
        }
    }

    fn end(self) -> usize {
        match self {
            Directory::Pairs { at, count } => at + count * std::mem::size_of::<RawLump>(),
            Directory::Source { .. } => 8 + HEADER_LUMPS * std::mem::size_of::<RawSourceLump>(),
            Directory::None => 0,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    offset: i32,
    length: i32,
    version: i32,
    ident: [u8; 4],
}

/// Reads the lump directory at the head of a file.
///
/// The directory is copied out at construction, so the reader does not
/// borrow the file.
#[derive(Clone, Debug)]
pub struct HeaderReader {
    format: MapType,
    endian: Endian,
    entries: Vec<Entry>,
}

impl HeaderReader {
    /// Detects the format from the signature and reads its directory.
    pub fn new(data: &[u8]) -> Result<Self> {
        let (format, endian) = Self::detect_format(data)?;
        Self::with_format(data, format, endian)
    }

    /// Reads the directory of `data` as `format`, skipping detection.
    pub fn with_format(data: &[u8], format: MapType, endian: Endian) -> Result<Self> {
        let directory = Directory::for_format(format);
        if data.len() < directory.end() {
            return Err(BspError::malformed(
                "header",
                format!(
                    "{} byte file is shorter than the {format:?} directory ({} bytes)",
                    data.len(),
                    directory.end()
                ),
            ));
        }

        let mut entries = Vec::with_capacity(directory.len());
        match directory {
            Directory::Pairs { at, count } => {
                for i in 0..count {
                    let raw: RawLump = read_pod(data, at + i * std::mem::size_of::<RawLump>())
                        .ok_or_else(|| BspError::malformed("header", "truncated directory"))?;
                    entries.push(Entry {
                        offset: endian.to_native(raw.file_ofs),
                        length: endian.to_native(raw.file_len),
                        version: 0,
                        ident: [0; 4],
                    });
                }
            }
            Directory::Source { l4d2 } => {
                let stride = std::mem::size_of::<RawSourceLump>();
                for i in 0..HEADER_LUMPS {
                    let at = 8 + i * stride;
                    let entry = if l4d2 {
                        read_pod::<RawL4D2Lump>(data, at).map(|raw| Entry {
                            offset: endian.to_native(raw.file_ofs),
                            length: endian.to_native(raw.file_len),
                            version: endian.to_native(raw.version),
                            ident: raw.four_cc,
                        })
                    } else {
                        read_pod::<RawSourceLump>(data, at).map(|raw| Entry {
                            offset: endian.to_native(raw.file_ofs),
                            length: endian.to_native(raw.file_len),
                            version: endian.to_native(raw.version),
                            ident: raw.four_cc,
                        })
                    };
                    entries.push(
                        entry.ok_or_else(|| BspError::malformed("header", "truncated directory"))?,
                    );
                }
            }
            Directory::None => {}
        }

        log::debug!("{format:?} {endian:?} header with {} lumps", entries.len());
        Ok(Self {
            format,
            endian,
            entries,
        })
    }

    /// Classifies a file by its leading signature.
    ///
    /// Some formats share a signature with another: SiN reads as Raven, SoF
    /// as Quake 3 and Vindictus as Source 20. Those need the format forced
    /// through [`HeaderReader::with_format`].
    ///
    /// Call of Duty 2 and 4, Doom, Hexen and encrypted Tactical Intervention
    /// files are recognized but their directories are not read: the
    /// resulting reader has no entries and every [`BspReader::lump_info`]
    /// call fails with [`BspError::InvalidLumpIndex`]. Open them through
    /// [`Bsp::with_reader`](crate::Bsp::with_reader) with a reader that
    /// knows their layout.
    pub fn detect_format(data: &[u8]) -> Result<(MapType, Endian)> {
        let ident: [u8; 4] = read_pod(data, 0).ok_or(BspError::UnrecognizedFileFormat([0; 4]))?;
        let unrecognized = BspError::UnrecognizedFileFormat(ident);

        // Quake lineage files start with a bare version number.
        match i32::from_le_bytes(ident) {
            29 => return Ok((MapType::Quake, Endian::Little)),
            30 => return Ok((MapType::GoldSrc, Endian::Little)),
            42 => return Ok((MapType::Nightfire, Endian::Little)),
            _ => {}
        }

        let endian = match &ident {
            b"PSBV" => Endian::Big,
            _ => Endian::Little,
        };
        match &ident {
            b"IWAD" | b"PWAD" => return Ok((MapType::Doom, Endian::Little)),
            b"2015" | b"EALA" => return Ok((MapType::MOHAA, Endian::Little)),
            b"EF2!" => return Ok((MapType::STEF2, Endian::Little)),
            _ => {}
        }

        let version = data
            .get(4..8)
            .map(|b| endian.read_i32(b))
            .ok_or(unrecognized.clone())?;
        let format = match (&ident, version) {
            (b"VBSP" | b"PSBV", 17) => MapType::Source17,
            (b"VBSP" | b"PSBV", 18) => MapType::Source18,
            (b"VBSP" | b"PSBV", 19) => MapType::Source19,
            (b"VBSP" | b"PSBV", 20) => MapType::Source20,
            (b"VBSP" | b"PSBV", 21) if reads_as_l4d2(data, endian) => MapType::L4D2,
            (b"VBSP" | b"PSBV", 21) => MapType::Source21,
            (b"VBSP" | b"PSBV", 22) => MapType::Source22,
            (b"VBSP" | b"PSBV", 23) => MapType::Source23,
            (b"VBSP" | b"PSBV", 27) => MapType::Source27,
            (b"VBSP" | b"PSBV", 0x40014) => MapType::DMoMaM,
            (b"IBSP", 4) => MapType::CoD2,
            (b"IBSP", 22) => MapType::CoD4,
            (b"IBSP", 38) => MapType::Quake2,
            (b"IBSP", 41) => MapType::Daikatana,
            (b"IBSP", 46 | 47) => MapType::Quake3,
            (b"IBSP", 59) => MapType::CoD,
            (b"RBSP", 1) => MapType::Raven,
            (b"FAKK", 12 | 19) => MapType::FAKK,
            (b"FAKK", 20) => MapType::STEF2Demo,
            _ => return Err(unrecognized),
        };
        Ok((format, endian))
    }
}

/// Version 21 files come in two directory orderings; L4D2 moved the lump
/// version in front of the offset. An entry is plausible when it is empty or
/// starts past the header. The L4D2 ordering wins only when every entry is
/// plausible under it and some entry is not under the usual one.
fn reads_as_l4d2(data: &[u8], endian: Endian) -> bool {
    let plausible = |offset: i32, length: i32| {
        length == 0 || (length > 0 && offset >= SOURCE_HEADER_SIZE as i32)
    };
    let (mut usual, mut l4d2) = (true, true);
    for i in 0..HEADER_LUMPS {
        let at = 8 + i * std::mem::size_of::<RawSourceLump>();
        let Some(words) = data.get(at..at + 12) else {
            break;
        };
        let [a, b, c] = [0, 4, 8].map(|o| endian.read_i32(&words[o..o + 4]));
        usual &= plausible(a, b);
        l4d2 &= plausible(b, c);
    }
    l4d2 && !usual
}

impl BspReader for HeaderReader {
    fn format(&self) -> MapType {
        self.format
    }

    fn is_big_endian(&self) -> bool {
        self.endian.is_big()
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn lump_info(&self, index: usize) -> Result<LumpInfo> {
        let entry = self.entries.get(index).ok_or(BspError::InvalidLumpIndex {
            index,
            format: self.format,
        })?;
        let offset = usize::try_from(entry.offset).map_err(|_| {
            BspError::malformed("header", format!("lump {index} has offset {}", entry.offset))
        })?;
        let length = usize::try_from(entry.length).map_err(|_| {
            BspError::malformed("header", format!("lump {index} has length {}", entry.length))
        })?;
        Ok(LumpInfo {
            offset,
            length,
            version: entry.version,
            ident: entry.ident,
        })
    }
}
