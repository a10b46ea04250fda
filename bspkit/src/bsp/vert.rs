use glam::{Vec2, Vec3};

use crate::format::{quake1, quake2, source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::record_fields,
};

/// Map vertex. A bare position in Quake, Valve and Nightfire maps; a full
/// draw vertex with texture and lightmap coordinates in the Quake 3 and
/// Call of Duty families.
pub struct Vertex;

record_fields!(Vertex, VertexField {
    position, set_position: Vec3 => Position;
    /// Texture coordinates.
    uv0, set_uv0: Vec2 => Uv0;
    /// Lightmap coordinates.
    uv1, set_uv1: Vec2 => Uv1;
    normal, set_normal: Vec3 => Normal;
});

impl Vertex {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() => Some(3),
            quake2!() => Some(2),
            source!() | MapType::Source17 | MapType::Vindictus => Some(3),
            MapType::Nightfire => Some(4),
            MapType::Quake3 | MapType::Raven => Some(10),
            MapType::FAKK | MapType::MOHAA => Some(4),
            MapType::CoD => Some(7),
            _ => None,
        }
    }
}

impl RecordKind for Vertex {
    type Field = VertexField;

    const NAME: &'static str = "Vertex";
    const FIELDS: &'static [VertexField] = VertexField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake1!()
            | quake2!()
            | source!()
            | MapType::Source17
            | MapType::Vindictus
            | MapType::Nightfire => Some(12),
            MapType::Quake3 | MapType::FAKK | MapType::MOHAA | MapType::CoD => Some(44),
            // four lightmap coordinate sets and four colors
            MapType::Raven => Some(80),
            _ => None,
        }
    }

    fn layout(field: VertexField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        let stride = Self::struct_length(format, lump_version)?;
        let offset = match (field, format) {
            (VertexField::Position, _) => 0,
            (_, _) if stride == 12 => return None,
            (VertexField::Normal, MapType::CoD) => 12,
            (VertexField::Uv0, MapType::CoD) => 28,
            (VertexField::Uv1, MapType::CoD) => 36,
            (VertexField::Uv0, _) => 12,
            (VertexField::Uv1, _) => 20,
            (VertexField::Normal, MapType::Raven) => 52,
            (VertexField::Normal, _) => 28,
        };
        let encoding = match field {
            VertexField::Position | VertexField::Normal => Encoding::Vec3F32,
            VertexField::Uv0 | VertexField::Uv1 => Encoding::Vec2F32,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}
