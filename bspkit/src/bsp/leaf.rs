use flagset::FlagSet;
use glam::Vec3;

use crate::format::{quake1, quake2, MapType};

use super::{
    consts::Contents,
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// BSP tree leaf: a convex region with its visibility cluster and the runs
/// of faces and brushes that touch it.
pub struct Leaf;

record_fields!(Leaf, LeafField {
    contents, set_contents: i32 => Contents;
    cluster, set_cluster: i32 => Cluster;
    area, set_area: i32 => Area;
    mins, set_mins: Vec3 => Mins;
    maxs, set_maxs: Vec3 => Maxs;
    /// Start of this leaf's run in the mark surfaces list.
    first_mark_face, set_first_mark_face: i32 => FirstMarkFace;
    num_mark_faces, set_num_mark_faces: i32 => NumMarkFaces;
    first_mark_brush, set_first_mark_brush: i32 => FirstMarkBrush;
    num_mark_brushes, set_num_mark_brushes: i32 => NumMarkBrushes;
    water_data, set_water_data: i32 => WaterData;
});

/// Valve formats from version 19 on dropped the inline ambient lighting from
/// leaves, but only flag it through the lump version.
fn drops_ambient_lighting(format: MapType) -> bool {
    matches!(
        format,
        MapType::Source19
            | MapType::Source20
            | MapType::Source21
            | MapType::Source22
            | MapType::Source23
            | MapType::Source27
            | MapType::L4D2
            | MapType::TacticalInterventionEncrypted
            | MapType::DMoMaM
    )
}

impl Leaf {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() => Some(10),
            quake2!() => Some(8),
            MapType::Source17 | MapType::Source18 => Some(10),
            f if drops_ambient_lighting(f) => Some(10),
            MapType::Quake3 | MapType::Raven => Some(4),
            MapType::Nightfire => Some(11),
            _ => None,
        }
    }
}

impl RecordKind for Leaf {
    type Field = LeafField;

    const NAME: &'static str = "Leaf";
    const FIELDS: &'static [LeafField] = LeafField::ALL;

    fn struct_length(format: MapType, lump_version: i32) -> Option<usize> {
        match format {
            quake1!() | quake2!() => Some(28),
            MapType::Source17 | MapType::Source18 => Some(56),
            f if drops_ambient_lighting(f) => Some(if lump_version == 0 { 56 } else { 32 }),
            MapType::Quake3 | MapType::Raven | MapType::Nightfire => Some(48),
            _ => None,
        }
    }

    fn layout(field: LeafField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        use Encoding::*;

        Self::struct_length(format, lump_version)?;
        let valve = matches!(format, MapType::Source17 | MapType::Source18)
            || drops_ambient_lighting(format);
        let (offset, encoding) = match field {
            LeafField::Contents => match format {
                MapType::Quake3 | MapType::Raven => return None,
                _ => (0, I32),
            },
            LeafField::Cluster => match format {
                quake2!() => (4, I16),
                MapType::Quake3 | MapType::Raven => (0, I32),
                _ if valve => (4, I16),
                _ => return None,
            },
            LeafField::Area => match format {
                quake2!() => (6, I16),
                MapType::Quake3 | MapType::Raven => (4, I32),
                _ if valve => (6, I16),
                _ => return None,
            },
            LeafField::Mins | LeafField::Maxs => {
                let (at, encoding) = match format {
                    MapType::Quake3 | MapType::Raven => (8, Vec3I32),
                    MapType::Nightfire => (8, Vec3F32),
                    _ => (8, Vec3I16),
                };
                let second = if matches!(field, LeafField::Maxs) {
                    encoding.width()
                } else {
                    0
                };
                (at + second, encoding)
            }
            LeafField::FirstMarkFace => match format {
                MapType::Quake3 | MapType::Raven | MapType::Nightfire => (32, I32),
                _ => (20, U16),
            },
            LeafField::NumMarkFaces => match format {
                MapType::Quake3 | MapType::Raven | MapType::Nightfire => (36, I32),
                _ => (22, U16),
            },
            LeafField::FirstMarkBrush => match format {
                quake1!() => return None,
                MapType::Quake3 | MapType::Raven | MapType::Nightfire => (40, I32),
                _ => (24, U16),
            },
            LeafField::NumMarkBrushes => match format {
                quake1!() => return None,
                MapType::Quake3 | MapType::Raven | MapType::Nightfire => (44, I32),
                _ => (26, U16),
            },
            LeafField::WaterData => match format {
                _ if valve => (28, I16),
                _ => return None,
            },
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

impl<B: AsRef<[u8]>> Record<B, Leaf> {
    pub fn contents_flags(&self) -> FlagSet<Contents> {
        FlagSet::new_truncated(self.contents())
    }
}
