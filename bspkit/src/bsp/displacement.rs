use flagset::FlagSet;
use glam::Vec3;

use crate::format::{source, MapType};

use super::{
    consts::DispTri,
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// Valve displacement surface header.
pub struct DispInfo;

record_fields!(DispInfo, DispInfoField {
    /// Start position used for orientation.
    start_position, set_start_position: Vec3 => StartPosition;
    /// Index into the displacement vertices.
    first_vertex, set_first_vertex: i32 => FirstVertex;
    /// Index into the displacement triangle tags.
    first_triangle, set_first_triangle: i32 => FirstTriangle;
    /// Subdivision power, 2 to 4.
    power, set_power: i32 => Power;
    min_tessellation, set_min_tessellation: i32 => MinTessellation;
    smoothing_angle, set_smoothing_angle: f32 => SmoothingAngle;
    contents, set_contents: i32 => Contents;
    /// Face this displacement was built from.
    face, set_face: i32 => Face;
    first_lightmap_alpha, set_first_lightmap_alpha: i32 => FirstLightmapAlpha;
    first_lightmap_sample_position, set_first_lightmap_sample_position: i32 => FirstLightmapSamplePosition;
});

fn is_valve(format: MapType) -> bool {
    matches!(format, source!() | MapType::Source17)
}

impl DispInfo {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        is_valve(format).then_some(26)
    }
}

impl RecordKind for DispInfo {
    type Field = DispInfoField;

    const NAME: &'static str = "DispInfo";
    const FIELDS: &'static [DispInfoField] = DispInfoField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        is_valve(format).then_some(176)
    }

    fn layout(field: DispInfoField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        Self::struct_length(format, lump_version)?;
        Some(match field {
            DispInfoField::StartPosition => FieldLayout::at(0, Encoding::Vec3F32),
            DispInfoField::FirstVertex => FieldLayout::at(12, Encoding::I32),
            DispInfoField::FirstTriangle => FieldLayout::at(16, Encoding::I32),
            DispInfoField::Power => FieldLayout::at(20, Encoding::I32),
            DispInfoField::MinTessellation => FieldLayout::at(24, Encoding::I32),
            DispInfoField::SmoothingAngle => FieldLayout::at(28, Encoding::F32),
            DispInfoField::Contents => FieldLayout::at(32, Encoding::I32),
            DispInfoField::Face => FieldLayout::at(36, Encoding::U16),
            DispInfoField::FirstLightmapAlpha => FieldLayout::at(38, Encoding::I32),
            DispInfoField::FirstLightmapSamplePosition => FieldLayout::at(42, Encoding::I32),
        })
    }
}

impl<B: AsRef<[u8]>> Record<B, DispInfo> {
    /// Vertices per side, `2^power + 1`.
    pub fn side_length(&self) -> Option<usize> {
        let power = u32::try_from(self.power()).ok().filter(|p| *p < 16)?;
        Some((1 << power) + 1)
    }

    pub fn vertex_count(&self) -> Option<usize> {
        self.side_length().map(|n| n * n)
    }

    pub fn triangle_count(&self) -> Option<usize> {
        self.side_length().map(|n| (n - 1) * (n - 1) * 2)
    }
}

/// Displacement vertex: an offset direction and distance from the flat
/// surface, plus a blend alpha.
pub struct DispVertex;

record_fields!(DispVertex, DispVertexField {
    normal, set_normal: Vec3 => Normal;
    distance, set_distance: f32 => Distance;
    alpha, set_alpha: f32 => Alpha;
});

impl DispVertex {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        is_valve(format).then_some(33)
    }
}

impl RecordKind for DispVertex {
    type Field = DispVertexField;

    const NAME: &'static str = "DispVertex";
    const FIELDS: &'static [DispVertexField] = DispVertexField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        is_valve(format).then_some(20)
    }

    fn layout(field: DispVertexField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        Self::struct_length(format, lump_version)?;
        Some(match field {
            DispVertexField::Normal => FieldLayout::at(0, Encoding::Vec3F32),
            DispVertexField::Distance => FieldLayout::at(12, Encoding::F32),
            DispVertexField::Alpha => FieldLayout::at(16, Encoding::F32),
        })
    }
}

impl<B: AsRef<[u8]>> Record<B, DispVertex> {
    /// Offset from the flat surface position.
    pub fn offset(&self) -> Vec3 {
        self.normal() * self.distance()
    }
}

/// Decodes one entry of the displacement triangles list.
pub fn triangle_tags(value: i64) -> FlagSet<DispTri> {
    FlagSet::new_truncated(value as u16)
}

#[cfg(test)]
mod displacement_tests {
    use super::*;
    use crate::{
        binaries::Endian,
        bsp::{layout::assert_consistent_tables, lump::{Lump, LumpContext}},
    };

    #[test]
    fn tables() {
        assert_consistent_tables::<DispInfo>(&[0]);
        assert_consistent_tables::<DispVertex>(&[0]);
    }

    #[test]
    fn disp_info() {
        let mut bytes = vec![0u8; 176 * 2];
        let mut lump = Lump::<_, DispInfo>::new(
            &mut bytes[..],
            LumpContext::new(MapType::Source20, 0, Endian::Little),
        )
        .unwrap();
        assert_eq!(lump.len(), 2);
        let mut info = lump.get_mut(1).unwrap();
        info.set_power(3);
        info.set_face(513);
        info.set_first_lightmap_alpha(77);
        assert_eq!(info.vertex_count(), Some(81));
        assert_eq!(info.triangle_count(), Some(128));
        assert_eq!(info.face(), 513);
        assert_eq!(&bytes[176 + 36..176 + 42], &[1, 2, 77, 0, 0, 0]);
    }

    #[test]
    fn disp_vertex_offset() {
        let mut lump = Lump::<Vec<u8>, DispVertex>::empty(LumpContext::new(
            MapType::Source19,
            0,
            Endian::Little,
        ))
        .unwrap();
        {
            let mut v = lump.push_zeroed();
            v.set_normal(Vec3::Z);
            v.set_distance(12.0);
            v.set_alpha(255.0);
        }
        assert_eq!(lump.get(0).unwrap().offset(), Vec3::new(0.0, 0.0, 12.0));
        assert_eq!(lump.get(0).unwrap().alpha(), 255.0);
    }

    #[test]
    fn triangle_tag_bits() {
        let tags = triangle_tags(0x3);
        assert!(tags.contains(DispTri::TagSurface));
        assert!(tags.contains(DispTri::TagWalkable));
        assert!(!tags.contains(DispTri::TagBuildable));
    }
}
