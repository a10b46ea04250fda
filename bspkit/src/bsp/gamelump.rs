use std::{fmt, ops::Range};

use ahash::AHashMap;

use crate::{
    binaries::{read_pod, Endian},
    error::{BspError, Result},
    format::{source, MapType},
};

/// Four character game lump id, stored in the file as an integer. Shown in
/// its big-endian character order, so the static prop lump reads `sprp`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct GameLumpTag(pub [u8; 4]);

impl GameLumpTag {
    pub const STATIC_PROPS: GameLumpTag = GameLumpTag(*b"sprp");
    pub const DETAIL_PROPS: GameLumpTag = GameLumpTag(*b"dprp");
    pub const DETAIL_PROP_LIGHTING: GameLumpTag = GameLumpTag(*b"dplt");
    pub const DETAIL_PROP_LIGHTING_HDR: GameLumpTag = GameLumpTag(*b"dplh");

    pub fn from_id(id: i32) -> Self {
        GameLumpTag(id.to_be_bytes())
    }

    pub fn id(self) -> i32 {
        i32::from_be_bytes(self.0)
    }
}

impl fmt::Display for GameLumpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GameLumpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameLumpTag({self})")
    }
}

#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct RawGameLump {
    id: i32,
    flags: u16,
    version: u16,
    file_ofs: i32,
    file_len: i32,
}

/// Vindictus widens flags and version to full integers.
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct RawVindictusGameLump {
    id: i32,
    flags: i32,
    version: i32,
    file_ofs: i32,
    file_len: i32,
}

/// One directory entry, with its offset already made relative to the start
/// of the game lump.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameLumpEntry {
    pub tag: GameLumpTag,
    pub flags: i32,
    pub version: i32,
    pub offset: usize,
    pub length: usize,
}

impl GameLumpEntry {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Parsed game lump directory.
#[derive(Clone, Debug, Default)]
pub struct GameLumpDirectory {
    entries: Vec<GameLumpEntry>,
    by_tag: AHashMap<GameLumpTag, usize>,
}

impl GameLumpDirectory {
    /// Parses the directory at the head of a game lump.
    ///
    /// `data` is the whole game lump and `base` its offset in the file. Entry
    /// offsets are normally file-absolute; some compilers wrote them relative
    /// to the lump instead. One reading applies to the whole directory: the
    /// relative one is used only when some entry does not fit as absolute
    /// and every entry fits as relative. Empty entries fit either way.
    pub fn parse(data: &[u8], base: usize, format: MapType, endian: Endian) -> Result<Self> {
        const LUMP: &str = "GameLump";

        let count = read_pod::<i32>(data, 0)
            .map(|c| endian.to_native(c))
            .ok_or_else(|| BspError::malformed(LUMP, "missing entry count"))?;
        let count = usize::try_from(count)
            .map_err(|_| BspError::malformed(LUMP, format!("negative entry count {count}")))?;

        let stride = match format {
            MapType::Vindictus => std::mem::size_of::<RawVindictusGameLump>(),
            _ => std::mem::size_of::<RawGameLump>(),
        };
        let directory_end = count
            .checked_mul(stride)
            .and_then(|n| n.checked_add(4))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| {
                BspError::malformed(
                    LUMP,
                    format!("{count} entries overrun the {} byte lump", data.len()),
                )
            })?;

        let mut raw_entries = Vec::with_capacity(count);
        for at in (4..directory_end).step_by(stride) {
            let (id, flags, version, file_ofs, file_len) = match format {
                MapType::Vindictus => {
                    let raw: RawVindictusGameLump = read_pod(data, at)
                        .ok_or_else(|| BspError::malformed(LUMP, "truncated entry"))?;
                    (
                        endian.to_native(raw.id),
                        endian.to_native(raw.flags),
                        endian.to_native(raw.version),
                        endian.to_native(raw.file_ofs),
                        endian.to_native(raw.file_len),
                    )
                }
                _ => {
                    let raw: RawGameLump = read_pod(data, at)
                        .ok_or_else(|| BspError::malformed(LUMP, "truncated entry"))?;
                    (
                        endian.to_native(raw.id),
                        endian.to_native_u16(raw.flags) as i32,
                        endian.to_native_u16(raw.version) as i32,
                        endian.to_native(raw.file_ofs),
                        endian.to_native(raw.file_len),
                    )
                }
            };
            let tag = GameLumpTag::from_id(id);
            let (Ok(offset), Ok(length)) = (usize::try_from(file_ofs), usize::try_from(file_len))
            else {
                return Err(BspError::malformed(
                    LUMP,
                    format!("entry {tag} has negative offset {file_ofs} or length {file_len}"),
                ));
            };
            raw_entries.push(GameLumpEntry {
                tag,
                flags,
                version,
                offset,
                length,
            });
        }

        let shift = offset_shift(&raw_entries, base, data.len())?;
        let mut entries = Vec::with_capacity(count);
        let mut by_tag = AHashMap::with_capacity(count);
        for mut entry in raw_entries {
            entry.offset = entry.offset.saturating_sub(shift).min(data.len());
            by_tag.entry(entry.tag).or_insert(entries.len());
            entries.push(entry);
        }

        Ok(Self { entries, by_tag })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GameLumpEntry] {
        &self.entries
    }

    /// First entry carrying `tag`.
    pub fn get(&self, tag: GameLumpTag) -> Option<&GameLumpEntry> {
        self.by_tag.get(&tag).map(|&i| &self.entries[i])
    }

    pub fn tags(&self) -> impl Iterator<Item = GameLumpTag> + '_ {
        self.entries.iter().map(|e| e.tag)
    }
}

/// What to subtract from stored offsets to make them lump-relative: `base`
/// for file-absolute directories, zero for lump-relative ones.
fn offset_shift(entries: &[GameLumpEntry], base: usize, region: usize) -> Result<usize> {
    let fits = |entry: &GameLumpEntry, shift: usize| {
        entry.length == 0
            || entry
                .offset
                .checked_sub(shift)
                .and_then(|rel| rel.checked_add(entry.length))
                .is_some_and(|end| end <= region)
    };

    let Some(stray) = entries.iter().find(|entry| !fits(*entry, base)) else {
        return Ok(base);
    };
    if entries.iter().all(|entry| fits(entry, 0)) {
        log::warn!(
            "game lump at {base} stores lump-relative offsets (entry {} at {})",
            stray.tag,
            stray.offset
        );
        return Ok(0);
    }
    Err(BspError::malformed(
        "GameLump",
        format!(
            "entry {} at {}+{} lies outside the {region} byte lump at {base}",
            stray.tag, stray.offset, stray.length
        ),
    ))
}

/// Lump index of the game lump, which only Valve formats have.
pub fn index_for_game_lump(format: MapType) -> Option<usize> {
    match format {
        source!() | MapType::Source17 | MapType::Vindictus => Some(35),
        _ => None,
    }
}

/// A game lump: its bytes plus the parsed directory.
pub struct GameLump<'d, B> {
    data: B,
    directory: &'d GameLumpDirectory,
}

impl<'d, B: AsRef<[u8]>> GameLump<'d, B> {
    pub fn new(data: B, directory: &'d GameLumpDirectory) -> Self {
        Self { data, directory }
    }

    pub fn directory(&self) -> &'d GameLumpDirectory {
        self.directory
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn entry(&self, tag: GameLumpTag) -> Result<&'d GameLumpEntry> {
        self.directory.get(tag).ok_or(BspError::NotFound(tag))
    }

    /// The bytes of the first entry carrying `tag`.
    pub fn lookup(&self, tag: GameLumpTag) -> Result<&[u8]> {
        let range = self.entry(tag)?.range();
        self.data
            .as_ref()
            .get(range)
            .ok_or_else(|| BspError::malformed("GameLump", format!("entry {tag} out of bounds")))
    }
}

impl<'d, B: AsRef<[u8]> + AsMut<[u8]>> GameLump<'d, B> {
    pub fn lookup_mut(&mut self, tag: GameLumpTag) -> Result<&mut [u8]> {
        let range = self.entry(tag)?.range();
        self.data
            .as_mut()
            .get_mut(range)
            .ok_or_else(|| BspError::malformed("GameLump", format!("entry {tag} out of bounds")))
    }
}

#[cfg(test)]
mod gamelump_tests {
    use super::*;

    fn entry(tag: &[u8; 4], version: u16, ofs: i32, len: i32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&i32::from_be_bytes(*tag).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&version.to_le_bytes());
        out.extend_from_slice(&ofs.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out
    }

    fn lump(entries: &[Vec<u8>], size: usize) -> Vec<u8> {
        let mut data = (entries.len() as i32).to_le_bytes().to_vec();
        for e in entries {
            data.extend_from_slice(e);
        }
        data.resize(size, 0);
        data
    }

    #[test]
    fn tag_display() {
        assert_eq!(GameLumpTag::STATIC_PROPS.to_string(), "sprp");
        assert_eq!(GameLumpTag::from_id(0x73707270), GameLumpTag::STATIC_PROPS);
        assert_eq!(GameLumpTag([0, b'a', b'b', b'c']).to_string(), "\\x00abc");
    }

    #[test]
    fn absolute_offset_at_file_start() {
        let mut data = lump(&[entry(b"sprp", 10, 20, 40)], 80);
        for (i, b) in data[20..60].iter_mut().enumerate() {
            *b = i as u8;
        }
        let dir = GameLumpDirectory::parse(&data, 0, MapType::Source20, Endian::Little).unwrap();
        let gl = GameLump::new(&data[..], &dir);
        assert_eq!(gl.lookup(GameLumpTag::STATIC_PROPS).unwrap(), &data[20..60]);
        assert_eq!(gl.entry(GameLumpTag::STATIC_PROPS).unwrap().version, 10);
    }

    #[test]
    fn absolute_offset_translated_by_base() {
        let mut data = lump(&[entry(b"sprp", 6, 1020, 40)], 80);
        data[20] = 0xAB;
        let dir = GameLumpDirectory::parse(&data, 1000, MapType::Source20, Endian::Little).unwrap();
        assert_eq!(dir.get(GameLumpTag::STATIC_PROPS).unwrap().range(), 20..60);
        let gl = GameLump::new(&data[..], &dir);
        assert_eq!(gl.lookup(GameLumpTag::STATIC_PROPS).unwrap()[0], 0xAB);
    }

    #[test]
    fn relative_offset_fallback() {
        crate::ensure_env_logger_initialized();
        let data = lump(&[entry(b"dprp", 4, 24, 16)], 64);
        let dir = GameLumpDirectory::parse(&data, 5000, MapType::Source20, Endian::Little).unwrap();
        assert_eq!(dir.get(GameLumpTag::DETAIL_PROPS).unwrap().offset, 24);
    }

    #[test]
    fn offsets_are_read_one_way_per_directory() {
        crate::ensure_env_logger_initialized();
        // 36 would also fit as absolute (36 - 30), but 20 only fits as
        // relative, so both are relative.
        let data = lump(&[entry(b"sprp", 4, 36, 8), entry(b"dprp", 4, 20, 8)], 64);
        let dir = GameLumpDirectory::parse(&data, 30, MapType::Source20, Endian::Little).unwrap();
        assert_eq!(dir.get(GameLumpTag::STATIC_PROPS).unwrap().range(), 36..44);
        assert_eq!(dir.get(GameLumpTag::DETAIL_PROPS).unwrap().range(), 20..28);

        let data = lump(&[entry(b"sprp", 4, 36, 8), entry(b"dprp", 4, 0, 0)], 64);
        let dir = GameLumpDirectory::parse(&data, 30, MapType::Source20, Endian::Little).unwrap();
        assert_eq!(dir.get(GameLumpTag::STATIC_PROPS).unwrap().range(), 6..14);
        assert!(dir.get(GameLumpTag::DETAIL_PROPS).unwrap().range().is_empty());
    }

    #[test]
    fn out_of_bounds_entry() {
        let data = lump(&[entry(b"sprp", 4, 1060, 40)], 64);
        let err = GameLumpDirectory::parse(&data, 1000, MapType::Source20, Endian::Little)
            .unwrap_err();
        assert!(matches!(err, BspError::MalformedLump { .. }));
    }

    #[test]
    fn first_duplicate_wins() {
        let data = lump(
            &[entry(b"sprp", 4, 36, 4), entry(b"sprp", 5, 40, 4)],
            48,
        );
        let dir = GameLumpDirectory::parse(&data, 0, MapType::Source20, Endian::Little).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get(GameLumpTag::STATIC_PROPS).unwrap().version, 4);
    }

    #[test]
    fn missing_tag() {
        let data = lump(&[], 4);
        let dir = GameLumpDirectory::parse(&data, 0, MapType::Source20, Endian::Little).unwrap();
        assert!(dir.is_empty());
        let gl = GameLump::new(&data[..], &dir);
        assert_eq!(
            gl.lookup(GameLumpTag::STATIC_PROPS),
            Err(BspError::NotFound(GameLumpTag::STATIC_PROPS))
        );
    }

    #[test]
    fn vindictus_entries_are_wide() {
        let mut data = 1i32.to_le_bytes().to_vec();
        for v in [i32::from_be_bytes(*b"sprp"), 0, 7, 24, 8] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.resize(32, 0xCC);
        let dir = GameLumpDirectory::parse(&data, 0, MapType::Vindictus, Endian::Little).unwrap();
        let entry = dir.get(GameLumpTag::STATIC_PROPS).unwrap();
        assert_eq!(entry.version, 7);
        assert_eq!(entry.range(), 24..32);
    }

    #[test]
    fn mutable_lookup() {
        let mut data = lump(&[entry(b"sprp", 4, 20, 4)], 24);
        let dir = GameLumpDirectory::parse(&data, 0, MapType::Source20, Endian::Little).unwrap();
        let mut gl = GameLump::new(&mut data[..], &dir);
        gl.lookup_mut(GameLumpTag::STATIC_PROPS).unwrap()[3] = 9;
        assert_eq!(data[23], 9);
    }
}
