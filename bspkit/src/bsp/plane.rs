use glam::Vec3;

use crate::format::{cod, quake1, quake2, quake3, source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// Splitting plane, `normal . p = distance`.
pub struct Plane;

record_fields!(Plane, PlaneField {
    normal, set_normal: Vec3 => Normal;
    distance, set_distance: f32 => Distance;
    /// Axis hint written by the compiler (0-2 axial, 3-5 closest axis).
    /// Not stored by the Quake 3 and Call of Duty families.
    plane_type, set_plane_type: i32 => Type;
});

impl Plane {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() | quake2!() | source!() | MapType::Source17 | MapType::Vindictus => Some(1),
            MapType::Nightfire => Some(1),
            MapType::FAKK | MapType::MOHAA | MapType::STEF2 | MapType::STEF2Demo => Some(1),
            MapType::Quake3 | MapType::Raven | MapType::CoD => Some(2),
            MapType::CoD2 | MapType::CoD4 => Some(4),
            _ => None,
        }
    }
}

impl RecordKind for Plane {
    type Field = PlaneField;

    const NAME: &'static str = "Plane";
    const FIELDS: &'static [PlaneField] = PlaneField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake1!()
            | quake2!()
            | source!()
            | MapType::Source17
            | MapType::Vindictus
            | MapType::Nightfire => Some(20),
            quake3!() | cod!() => Some(16),
            _ => None,
        }
    }

    fn layout(field: PlaneField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        let stride = Self::struct_length(format, lump_version)?;
        match field {
            PlaneField::Normal => Some(FieldLayout::at(0, Encoding::Vec3F32)),
            PlaneField::Distance => Some(FieldLayout::at(12, Encoding::F32)),
            PlaneField::Type if stride == 20 => Some(FieldLayout::at(16, Encoding::I32)),
            PlaneField::Type => None,
        }
    }
}

impl<B: AsRef<[u8]>> Record<B, Plane> {
    /// Signed distance from `point` to the plane.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal().dot(point) - self.distance()
    }
}
