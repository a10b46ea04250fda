use flagset::FlagSet;

use crate::format::{quake2, quake3, source, MapType};

use super::{
    consts::Contents,
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// Convex volume bounded by a run of brush sides.
pub struct Brush;

record_fields!(Brush, BrushField {
    first_side, set_first_side: i32 => FirstSide;
    num_sides, set_num_sides: i32 => NumSides;
    /// Shader index, Quake 3 and Call of Duty families.
    texture, set_texture: i32 => Texture;
    contents, set_contents: i32 => Contents;
});

impl Brush {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake2!() => Some(14),
            source!() | MapType::Source17 | MapType::Vindictus => Some(18),
            MapType::Nightfire => Some(15),
            MapType::Quake3 | MapType::Raven => Some(8),
            MapType::FAKK | MapType::MOHAA => Some(12),
            MapType::STEF2 | MapType::STEF2Demo => Some(13),
            MapType::CoD => Some(4),
            _ => None,
        }
    }
}

impl RecordKind for Brush {
    type Field = BrushField;

    const NAME: &'static str = "Brush";
    const FIELDS: &'static [BrushField] = BrushField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake2!() | source!() | MapType::Source17 | MapType::Vindictus => Some(12),
            MapType::Nightfire | quake3!() => Some(12),
            MapType::CoD => Some(4),
            _ => None,
        }
    }

    fn layout(field: BrushField, format: MapType, _lump_version: i32) -> Option<FieldLayout> {
        let (offset, encoding) = match (field, format) {
            (BrushField::NumSides, MapType::CoD) => (0, Encoding::U16),
            (BrushField::Texture, MapType::CoD) => (2, Encoding::U16),

            (BrushField::Contents, MapType::Nightfire) => (0, Encoding::I32),
            (BrushField::FirstSide, MapType::Nightfire) => (4, Encoding::I32),
            (BrushField::NumSides, MapType::Nightfire) => (8, Encoding::I32),

            (
                BrushField::FirstSide,
                quake2!() | source!() | MapType::Source17 | MapType::Vindictus | quake3!(),
            ) => (0, Encoding::I32),
            (
                BrushField::NumSides,
                quake2!() | source!() | MapType::Source17 | MapType::Vindictus | quake3!(),
            ) => (4, Encoding::I32),
            (
                BrushField::Contents,
                quake2!() | source!() | MapType::Source17 | MapType::Vindictus,
            ) => (8, Encoding::I32),
            (BrushField::Texture, quake3!()) => (8, Encoding::I32),
            _ => return None,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

impl<B: AsRef<[u8]>> Record<B, Brush> {
    /// Known content bits; unknown bits are dropped.
    pub fn contents_flags(&self) -> FlagSet<Contents> {
        FlagSet::new_truncated(self.contents())
    }

    pub fn side_range(&self) -> Option<std::ops::Range<usize>> {
        let first = usize::try_from(self.first_side()).ok()?;
        let count = usize::try_from(self.num_sides()).ok()?;
        Some(first..first.checked_add(count)?)
    }
}

/// One bounding plane of a brush.
pub struct BrushSide;

record_fields!(BrushSide, BrushSideField {
    plane, set_plane: i32 => Plane;
    /// Texinfo index in Quake 2 and Valve maps, shader index elsewhere.
    texture, set_texture: i32 => Texture;
    face, set_face: i32 => Face;
    displacement, set_displacement: i32 => Displacement;
    /// Non-zero for bevel planes added for collision.
    bevel, set_bevel: i32 => Bevel;
});

impl BrushSide {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake2!() => Some(15),
            source!() | MapType::Source17 | MapType::Vindictus => Some(19),
            MapType::Nightfire => Some(16),
            MapType::Quake3 | MapType::Raven => Some(9),
            MapType::FAKK | MapType::MOHAA => Some(11),
            MapType::STEF2 | MapType::STEF2Demo => Some(12),
            MapType::CoD => Some(3),
            _ => None,
        }
    }
}

impl RecordKind for BrushSide {
    type Field = BrushSideField;

    const NAME: &'static str = "BrushSide";
    const FIELDS: &'static [BrushSideField] = BrushSideField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake2!() => Some(4),
            source!() | MapType::Source17 => Some(8),
            MapType::Vindictus => Some(16),
            MapType::Nightfire => Some(8),
            MapType::Raven => Some(12),
            MapType::Quake3
            | MapType::FAKK
            | MapType::MOHAA
            | MapType::STEF2
            | MapType::STEF2Demo
            | MapType::CoD => Some(8),
            _ => None,
        }
    }

    fn layout(field: BrushSideField, format: MapType, _lump_version: i32) -> Option<FieldLayout> {
        use Encoding::{I16, I32, U16};

        let (offset, encoding) = match (field, format) {
            (BrushSideField::Plane, quake2!() | source!() | MapType::Source17) => (0, U16),
            (BrushSideField::Texture, quake2!() | source!() | MapType::Source17) => (2, I16),
            (BrushSideField::Displacement, source!() | MapType::Source17) => (4, I16),
            (BrushSideField::Bevel, source!() | MapType::Source17) => (6, I16),

            (BrushSideField::Plane, MapType::Vindictus) => (0, I32),
            (BrushSideField::Texture, MapType::Vindictus) => (4, I32),
            (BrushSideField::Displacement, MapType::Vindictus) => (8, I32),
            (BrushSideField::Bevel, MapType::Vindictus) => (12, I32),

            (BrushSideField::Face, MapType::Nightfire) => (0, I32),
            (BrushSideField::Plane, MapType::Nightfire) => (4, I32),

            (BrushSideField::Plane, quake3!() | MapType::CoD) => (0, I32),
            (BrushSideField::Texture, quake3!() | MapType::CoD) => (4, I32),
            (BrushSideField::Face, MapType::Raven) => (8, I32),
            _ => return None,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

#[cfg(test)]
mod brush_tests {
    use super::*;
    use crate::{
        binaries::Endian,
        bsp::{layout::assert_consistent_tables, lump::{Lump, LumpContext}},
    };

    #[test]
    fn tables() {
        assert_consistent_tables::<Brush>(&[0]);
        assert_consistent_tables::<BrushSide>(&[0]);
    }

    #[test]
    fn source_brush_contents() {
        let mut bytes = vec![0u8; 24];
        bytes[12..16].copy_from_slice(&6i32.to_le_bytes());
        bytes[16..20].copy_from_slice(&4i32.to_le_bytes());
        bytes[20..24].copy_from_slice(&(0x1 | 0x8000000 | 0x4000_0000_u32 as i32).to_le_bytes());

        let lump = Lump::<_, Brush>::new(
            &bytes[..],
            LumpContext::new(MapType::Source20, 0, Endian::Little),
        )
        .unwrap();
        let brush = lump.get(1).unwrap();
        assert_eq!(brush.side_range(), Some(6..10));
        assert_eq!(brush.texture(), -1);
        let flags = brush.contents_flags();
        assert!(flags.contains(Contents::SOLID));
        assert!(flags.contains(Contents::DETAIL));
        assert!(!flags.contains(Contents::WATER));
    }

    #[test]
    fn cod_brush() {
        let bytes = [5u8, 0, 2, 0];
        let lump = Lump::<_, Brush>::new(
            &bytes[..],
            LumpContext::new(MapType::CoD, 0, Endian::Little),
        )
        .unwrap();
        let brush = lump.get(0).unwrap();
        assert_eq!(brush.num_sides(), 5);
        assert_eq!(brush.texture(), 2);
        assert_eq!(brush.first_side(), -1);
        assert_eq!(brush.side_range(), None);
    }

    #[test]
    fn brush_side_layouts() {
        let mut bytes = vec![0u8; 8];
        let mut lump = Lump::<_, BrushSide>::new(
            &mut bytes[..],
            LumpContext::new(MapType::Source21, 0, Endian::Little),
        )
        .unwrap();
        let mut side = lump.get_mut(0).unwrap();
        side.set_plane(40000);
        side.set_displacement(-1);
        side.set_face(3);
        assert_eq!(side.plane(), 40000);
        assert_eq!(side.displacement(), -1);
        assert_eq!(side.face(), -1);
        assert_eq!(bytes, [0x40, 0x9C, 0, 0, 0xFF, 0xFF, 0, 0]);
    }

    #[test]
    fn quake3_family_brush_side_strides() {
        assert_eq!(BrushSide::struct_length(MapType::Raven, 0), Some(12));
        for format in [
            MapType::Quake3,
            MapType::FAKK,
            MapType::MOHAA,
            MapType::STEF2,
            MapType::STEF2Demo,
            MapType::CoD,
        ] {
            assert_eq!(BrushSide::struct_length(format, 0), Some(8), "{format:?}");
        }

        let mut bytes = vec![0u8; 24];
        bytes[12..16].copy_from_slice(&7i32.to_le_bytes());
        bytes[20..24].copy_from_slice(&9i32.to_le_bytes());
        let lump = Lump::<_, BrushSide>::new(
            &bytes[..],
            LumpContext::new(MapType::Raven, 0, Endian::Little),
        )
        .unwrap();
        assert_eq!(lump.len(), 2);
        let side = lump.get(1).unwrap();
        assert_eq!(side.plane(), 7);
        assert_eq!(side.face(), 9);
    }
}
