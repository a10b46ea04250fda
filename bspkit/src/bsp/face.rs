use std::ops::Range;

use glam::Vec2;

use crate::format::{cod, quake1, quake2, quake3, source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// A drawable surface.
///
/// Quake and Valve faces are polygons bounded by a run of surfedges. The
/// Quake 3 family, Call of Duty and Nightfire store triangle soups instead:
/// a run of vertices and a run of indices into them.
///
/// The original face lump of Valve maps (and the simple surfaces of Call of
/// Duty 4) has the same layout, holding the faces before BSP splitting.
pub struct Face;

record_fields!(Face, FaceField {
    plane, set_plane: i32 => Plane;
    /// Non-zero when the face points away from its plane.
    side, set_side: i32 => Side;
    /// Start of this face's run in the surfedge list.
    first_edge, set_first_edge: i32 => FirstEdge;
    num_edges, set_num_edges: i32 => NumEdges;
    texture, set_texture: i32 => Texture;
    first_vertex, set_first_vertex: i32 => FirstVertex;
    num_vertices, set_num_vertices: i32 => NumVertices;
    material, set_material: i32 => Material;
    texture_info, set_texture_info: i32 => TextureInfo;
    /// Displacement info index, `-1` for a flat face.
    displacement, set_displacement: i32 => Displacement;
    /// Index of the original face this face was split from.
    original, set_original: i32 => Original;
    flags, set_flags: i32 => Flags;
    first_index, set_first_index: i32 => FirstIndex;
    num_indices, set_num_indices: i32 => NumIndices;
    light_styles, set_light_styles: i32 => LightStyles;
    light_maps, set_light_maps: i32 => LightMaps;
    /// Control point grid size of a patch surface.
    patch_size, set_patch_size: Vec2 => PatchSize;
});

impl Face {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            MapType::FAKK | MapType::MOHAA => Some(3),
            MapType::STEF2 | MapType::STEF2Demo => Some(5),
            quake2!() | MapType::CoD => Some(6),
            quake1!() | source!() | MapType::Source17 | MapType::Vindictus | MapType::CoD2 => {
                Some(7)
            }
            MapType::Nightfire | MapType::CoD4 => Some(9),
            MapType::Quake3 | MapType::Raven => Some(13),
            _ => None,
        }
    }

    pub fn index_for_original_faces_lump(format: MapType) -> Option<usize> {
        match format {
            source!() | MapType::Source17 | MapType::Vindictus => Some(27),
            MapType::CoD4 => Some(47),
            _ => None,
        }
    }
}

impl RecordKind for Face {
    type Field = FaceField;

    const NAME: &'static str = "Face";
    const FIELDS: &'static [FaceField] = FaceField::ALL;

    fn struct_length(format: MapType, lump_version: i32) -> Option<usize> {
        Some(match format {
            MapType::CoD | MapType::CoD2 => 16,
            quake1!() | MapType::Quake2 | MapType::Daikatana => 20,
            MapType::CoD4 => 24,
            MapType::SiN => 36,
            MapType::SoF => 40,
            MapType::Nightfire => 48,
            MapType::Source17 => 104,
            source!() => 56,
            MapType::Vindictus if lump_version == 2 => 76,
            MapType::Vindictus => 72,
            MapType::Quake3 => 104,
            MapType::FAKK | MapType::MOHAA => 108,
            MapType::STEF2 | MapType::STEF2Demo => 132,
            MapType::Raven => 148,
            _ => return None,
        })
    }

    fn layout(field: FaceField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        use Encoding::*;
        use MapType::*;

        let (offset, encoding) = match (field, format) {
            (FaceField::Plane, quake1!() | quake2!() | source!()) => (0, U16),
            (FaceField::Plane, Source17) => (32, U16),
            (FaceField::Plane, Nightfire | Vindictus) => (0, I32),

            (FaceField::Side, quake1!() | quake2!()) => (2, U16),
            (FaceField::Side, source!()) => (2, U8),
            (FaceField::Side, Vindictus) => (4, U8),
            (FaceField::Side, Source17) => (34, U8),

            (FaceField::FirstEdge, quake1!() | quake2!() | source!()) => (4, I32),
            (FaceField::FirstEdge, Vindictus) => (8, I32),
            (FaceField::FirstEdge, Source17) => (36, I32),

            (FaceField::NumEdges, quake1!() | quake2!() | source!()) => (8, U16),
            (FaceField::NumEdges, Vindictus) => (12, I32),
            (FaceField::NumEdges, Source17) => (40, U16),

            (FaceField::Texture, cod!()) => (0, I16),
            (FaceField::Texture, quake3!()) => (0, I32),
            (FaceField::Texture, quake2!()) => (10, U16),
            (FaceField::Texture, Nightfire) => (24, I32),

            (FaceField::FirstVertex, CoD | CoD2 | Nightfire) => (4, I32),
            (FaceField::FirstVertex, quake3!() | CoD4) => (12, I32),

            (FaceField::NumVertices, CoD | CoD2) => (8, I16),
            (FaceField::NumVertices, Nightfire) => (8, I32),
            (FaceField::NumVertices, quake3!()) => (16, I32),
            (FaceField::NumVertices, CoD4) => (16, I16),

            (FaceField::Material, Nightfire) => (28, I32),

            (FaceField::TextureInfo, quake1!() | source!()) => (10, U16),
            (FaceField::TextureInfo, Vindictus) => (16, I32),
            (FaceField::TextureInfo, Nightfire) => (32, I32),
            (FaceField::TextureInfo, Source17) => (42, U16),

            (FaceField::Displacement, source!()) => (12, I16),
            (FaceField::Displacement, Vindictus) => (20, I32),
            (FaceField::Displacement, Source17) => (44, I16),

            (FaceField::Original, source!()) => (44, I32),
            (FaceField::Original, Vindictus) if lump_version == 2 => (60, I32),
            (FaceField::Original, Vindictus) => (56, I32),
            (FaceField::Original, Source17) => (96, I32),

            (FaceField::Flags, quake3!()) => (8, I32),
            (FaceField::Flags, Nightfire) => (20, I32),

            (FaceField::FirstIndex, CoD | CoD2 | Nightfire) => (12, I32),
            (FaceField::FirstIndex, quake3!() | CoD4) => (20, I32),

            (FaceField::NumIndices, CoD | CoD2) => (10, I16),
            (FaceField::NumIndices, Nightfire) => (16, I32),
            (FaceField::NumIndices, CoD4) => (18, I16),
            (FaceField::NumIndices, quake3!()) => (24, I32),

            (FaceField::LightStyles, Nightfire) => (40, I32),
            (FaceField::LightMaps, Nightfire) => (44, I32),

            (FaceField::PatchSize, quake3!()) => (96, Vec2I32),

            _ => return None,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

fn run(first: i32, count: i32) -> Option<Range<usize>> {
    let first = usize::try_from(first).ok()?;
    let count = usize::try_from(count).ok()?;
    Some(first..first.checked_add(count)?)
}

impl<B: AsRef<[u8]>> Record<B, Face> {
    /// This face's run in the surfedge list. `None` when the format stores no
    /// edges or the run is negative.
    pub fn edge_range(&self) -> Option<Range<usize>> {
        run(self.first_edge(), self.num_edges())
    }

    pub fn vertex_range(&self) -> Option<Range<usize>> {
        run(self.first_vertex(), self.num_vertices())
    }

    pub fn index_range(&self) -> Option<Range<usize>> {
        run(self.first_index(), self.num_indices())
    }
}
