use glam::Vec3;

use crate::format::{source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::record_fields,
};

/// Valve cubemap sample point.
pub struct Cubemap;

record_fields!(Cubemap, CubemapField {
    origin, set_origin: Vec3 => Origin;
    /// Power of two resolution, 0 for the default.
    size, set_size: i32 => Size;
});

impl Cubemap {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            source!() | MapType::Source17 | MapType::Vindictus => Some(42),
            _ => None,
        }
    }
}

impl RecordKind for Cubemap {
    type Field = CubemapField;

    const NAME: &'static str = "Cubemap";
    const FIELDS: &'static [CubemapField] = CubemapField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            source!() | MapType::Source17 | MapType::Vindictus => Some(16),
            _ => None,
        }
    }

    fn layout(field: CubemapField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        Self::struct_length(format, lump_version)?;
        Some(match field {
            CubemapField::Origin => FieldLayout::at(0, Encoding::Vec3I32),
            CubemapField::Size => FieldLayout::at(12, Encoding::I32),
        })
    }
}
