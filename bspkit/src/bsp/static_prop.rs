use std::ops::Range;

use flagset::FlagSet;
use glam::Vec3;

use crate::{
    binaries::Endian,
    error::{BspError, Result},
    format::MapType,
};

use super::{
    consts::{StaticPropFlags, STATIC_PROP_NAME_LENGTH},
    layout::{struct_length, Encoding, FieldLayout, RecordKind},
    lump::{Lump, LumpContext},
    numlist::{NumList, NumType},
    record::{record_fields, Record},
};

/// A prop placed in the Valve `sprp` game lump. Its lump version is the
/// game lump entry's version, which fixes the stride.
pub struct StaticProp;

record_fields!(StaticProp, StaticPropField {
    origin, set_origin: Vec3 => Origin;
    angles, set_angles: Vec3 => Angles;
    /// Index into the model dictionary.
    model, set_model: i32 => Model;
    first_leaf, set_first_leaf: i32 => FirstLeaf;
    num_leaves, set_num_leaves: i32 => NumLeaves;
    solidity, set_solidity: i32 => Solidity;
    flags, set_flags: i32 => Flags;
    skin, set_skin: i32 => Skin;
    min_fade_distance, set_min_fade_distance: f32 => MinFadeDistance;
    max_fade_distance, set_max_fade_distance: f32 => MaxFadeDistance;
    lighting_origin, set_lighting_origin: Vec3 => LightingOrigin;
    forced_fade_scale, set_forced_fade_scale: f32 => ForcedFadeScale;
    min_dx_level, set_min_dx_level: i32 => MinDxLevel;
    max_dx_level, set_max_dx_level: i32 => MaxDxLevel;
    uniform_scale, set_uniform_scale: f32 => UniformScale;
});

impl RecordKind for StaticProp {
    type Field = StaticPropField;

    const NAME: &'static str = "StaticProp";
    const FIELDS: &'static [StaticPropField] = StaticPropField::ALL;

    fn struct_length(format: MapType, lump_version: i32) -> Option<usize> {
        if !format.is_source() {
            return None;
        }
        match lump_version {
            4 => Some(56),
            5 => Some(60),
            6 => Some(64),
            7 | 8 => Some(68),
            9 => Some(72),
            10 => Some(76),
            11 => Some(80),
            _ => None,
        }
    }

    fn layout(field: StaticPropField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        use Encoding::*;

        Self::struct_length(format, lump_version)?;
        let (offset, encoding) = match field {
            StaticPropField::Origin => (0, Vec3F32),
            StaticPropField::Angles => (12, Vec3F32),
            StaticPropField::Model => (24, U16),
            StaticPropField::FirstLeaf => (26, U16),
            StaticPropField::NumLeaves => (28, U16),
            StaticPropField::Solidity => (30, U8),
            StaticPropField::Flags => (31, U8),
            StaticPropField::Skin => (32, I32),
            StaticPropField::MinFadeDistance => (36, F32),
            StaticPropField::MaxFadeDistance => (40, F32),
            StaticPropField::LightingOrigin => (44, Vec3F32),
            StaticPropField::ForcedFadeScale if lump_version >= 5 => (56, F32),
            StaticPropField::MinDxLevel if matches!(lump_version, 6 | 7) => (60, U16),
            StaticPropField::MaxDxLevel if matches!(lump_version, 6 | 7) => (62, U16),
            StaticPropField::UniformScale if lump_version >= 11 => (76, F32),
            _ => return None,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

impl<B: AsRef<[u8]>> Record<B, StaticProp> {
    pub fn prop_flags(&self) -> FlagSet<StaticPropFlags> {
        FlagSet::new_truncated(self.flags() as u8)
    }

    pub fn leaf_range(&self) -> Option<Range<usize>> {
        let first = usize::try_from(self.first_leaf()).ok()?;
        let count = usize::try_from(self.num_leaves()).ok()?;
        Some(first..first + count)
    }
}

/// Where the three sections of a `sprp` game lump lie, relative to its
/// start.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticPropsLayout {
    pub names: Vec<String>,
    pub leaves: Range<usize>,
    pub props: Range<usize>,
    pub stride: usize,
    pub ctx: LumpContext,
}

fn read_count(data: &[u8], at: usize, endian: Endian, what: &str) -> Result<usize> {
    let count = data
        .get(at..at + 4)
        .map(|b| endian.read_i32(b))
        .ok_or_else(|| BspError::malformed(StaticProp::NAME, format!("missing {what} count")))?;
    usize::try_from(count)
        .map_err(|_| BspError::malformed(StaticProp::NAME, format!("negative {what} count {count}")))
}

fn section(data: &[u8], start: usize, count: usize, width: usize, what: &str) -> Result<Range<usize>> {
    count
        .checked_mul(width)
        .and_then(|n| n.checked_add(start))
        .filter(|end| *end <= data.len())
        .map(|end| start..end)
        .ok_or_else(|| {
            BspError::malformed(
                StaticProp::NAME,
                format!("{count} {what} entries overrun the {} byte lump", data.len()),
            )
        })
}

impl StaticPropsLayout {
    /// Parses the model dictionary, leaf list and prop records. `ctx.version`
    /// is the game lump entry's version.
    pub fn parse(data: &[u8], ctx: LumpContext) -> Result<Self> {
        let stride = struct_length::<StaticProp>(ctx.format, ctx.version)?;

        let count = read_count(data, 0, ctx.endian, "dictionary")?;
        let dictionary = section(data, 4, count, STATIC_PROP_NAME_LENGTH, "dictionary")?;
        let names = data[dictionary.clone()]
            .chunks_exact(STATIC_PROP_NAME_LENGTH)
            .map(|name| {
                let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
                String::from_utf8_lossy(&name[..end]).into_owned()
            })
            .collect();

        let count = read_count(data, dictionary.end, ctx.endian, "leaf")?;
        let leaves = section(data, dictionary.end + 4, count, NumType::UInt16.width(), "leaf")?;

        let count = read_count(data, leaves.end, ctx.endian, "prop")?;
        let props = section(data, leaves.end + 4, count, stride, "prop")?;
        if props.end != data.len() {
            log::debug!(
                "{} trailing bytes after static props v{}",
                data.len() - props.end,
                ctx.version
            );
        }

        Ok(Self {
            names,
            leaves,
            props,
            stride,
            ctx,
        })
    }

    /// Views over `data`, the same bytes the layout was parsed from.
    pub fn view<'a>(&'a self, data: &'a [u8]) -> StaticProps<'a> {
        StaticProps {
            names: &self.names,
            leaves: NumList::from_parts(&data[self.leaves.clone()], NumType::UInt16, self.ctx.endian),
            props: Lump::from_parts(&data[self.props.clone()], self.stride, self.ctx),
        }
    }
}

/// Decoded `sprp` game lump.
#[derive(Debug)]
pub struct StaticProps<'a> {
    /// Model dictionary.
    pub names: &'a [String],
    /// Leaf indices referenced by each prop's leaf run.
    pub leaves: NumList<&'a [u8]>,
    pub props: Lump<&'a [u8], StaticProp>,
}

impl<'a> StaticProps<'a> {
    pub fn version(&self) -> i32 {
        self.props.context().version
    }

    pub fn model_name<B: AsRef<[u8]>>(&self, prop: &Record<B, StaticProp>) -> Option<&'a str> {
        let index = usize::try_from(prop.model()).ok()?;
        self.names.get(index).map(String::as_str)
    }
}

#[cfg(test)]
pub(crate) mod static_prop_tests {
    use super::*;
    use crate::bsp::layout::assert_consistent_tables;

    /// A `sprp` lump with the given model names, leaves and `count` zeroed
    /// props whose model index is their position.
    pub(crate) fn sprp(names: &[&str], leaves: &[u16], count: usize, version: i32) -> Vec<u8> {
        let stride = StaticProp::struct_length(MapType::Source20, version).unwrap();
        let mut out = (names.len() as i32).to_le_bytes().to_vec();
        for name in names {
            let mut padded = [0u8; STATIC_PROP_NAME_LENGTH];
            padded[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&padded);
        }
        out.extend_from_slice(&(leaves.len() as i32).to_le_bytes());
        for leaf in leaves {
            out.extend_from_slice(&leaf.to_le_bytes());
        }
        out.extend_from_slice(&(count as i32).to_le_bytes());
        for i in 0..count {
            let mut prop = vec![0u8; stride];
            prop[24..26].copy_from_slice(&(i as u16).to_le_bytes());
            out.extend_from_slice(&prop);
        }
        out
    }

    #[test]
    fn tables() {
        assert_consistent_tables::<StaticProp>(&[3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn parse_sections() {
        let data = sprp(&["models/a.mdl", "models/b.mdl"], &[3, 4, 5], 2, 6);
        let layout = StaticPropsLayout::parse(
            &data,
            LumpContext::new(MapType::Source20, 6, Endian::Little),
        )
        .unwrap();
        assert_eq!(layout.names, ["models/a.mdl", "models/b.mdl"]);
        assert_eq!(layout.stride, 64);

        let props = layout.view(&data);
        assert_eq!(props.version(), 6);
        assert_eq!(props.leaves.iter().collect::<Vec<_>>(), [3, 4, 5]);
        assert_eq!(props.props.len(), 2);
        let prop = props.props.get(1).unwrap();
        assert_eq!(props.model_name(&prop), Some("models/b.mdl"));
        assert_eq!(prop.min_dx_level(), 0);
        assert!(prop.uniform_scale().is_nan());
    }

    #[test]
    fn fields_by_version() {
        assert_eq!(
            StaticProp::layout(StaticPropField::ForcedFadeScale, MapType::Source20, 4),
            None
        );
        assert_eq!(
            StaticProp::layout(StaticPropField::MinDxLevel, MapType::Source20, 8),
            None
        );
        assert!(StaticProp::layout(StaticPropField::MinDxLevel, MapType::Source20, 7).is_some());
        assert_eq!(StaticProp::struct_length(MapType::Quake3, 5), None);
    }

    #[test]
    fn unsupported_version() {
        let data = sprp(&[], &[], 0, 5);
        assert_eq!(
            StaticPropsLayout::parse(&data, LumpContext::new(MapType::Source20, 3, Endian::Little)),
            Err(BspError::UnsupportedFormat {
                kind: "StaticProp",
                format: MapType::Source20
            })
        );
    }

    #[test]
    fn truncated_props() {
        let mut data = sprp(&["m.mdl"], &[], 2, 5);
        data.truncate(data.len() - 1);
        let err = StaticPropsLayout::parse(
            &data,
            LumpContext::new(MapType::Source20, 5, Endian::Little),
        )
        .unwrap_err();
        assert!(matches!(err, BspError::MalformedLump { lump: "StaticProp", .. }));
    }

    #[test]
    fn flags() {
        let mut data = sprp(&["m.mdl"], &[], 1, 5);
        let at = data.len() - 60 + 31;
        data[at] = 0x5;
        let layout = StaticPropsLayout::parse(
            &data,
            LumpContext::new(MapType::Source20, 5, Endian::Little),
        )
        .unwrap();
        let props = layout.view(&data);
        let prop = props.props.get(0).unwrap();
        let flags = prop.prop_flags();
        assert!(flags.contains(StaticPropFlags::FADES));
        assert!(flags.contains(StaticPropFlags::NoDraw));
        assert!(!flags.contains(StaticPropFlags::NoShadow));
    }
}
