use glam::Vec3;

use crate::format::{quake1, quake2, quake3, source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// Brush model. Model 0 is the world; the rest belong to brush entities.
pub struct Model;

record_fields!(Model, ModelField {
    mins, set_mins: Vec3 => Mins;
    maxs, set_maxs: Vec3 => Maxs;
    origin, set_origin: Vec3 => Origin;
    head_node, set_head_node: i32 => HeadNode;
    first_face, set_first_face: i32 => FirstFace;
    num_faces, set_num_faces: i32 => NumFaces;
    first_brush, set_first_brush: i32 => FirstBrush;
    num_brushes, set_num_brushes: i32 => NumBrushes;
});

impl Model {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() => Some(14),
            quake2!() => Some(13),
            source!() | MapType::Source17 | MapType::Vindictus => Some(14),
            MapType::Quake3 | MapType::Raven => Some(7),
            MapType::FAKK | MapType::MOHAA => Some(13),
            MapType::STEF2 | MapType::STEF2Demo => Some(15),
            _ => None,
        }
    }
}

impl RecordKind for Model {
    type Field = ModelField;

    const NAME: &'static str = "Model";
    const FIELDS: &'static [ModelField] = ModelField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            // four hull head nodes and the visleaf count
            quake1!() => Some(64),
            quake2!() | source!() | MapType::Source17 | MapType::Vindictus => Some(48),
            quake3!() => Some(40),
            _ => None,
        }
    }

    fn layout(field: ModelField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        let stride = Self::struct_length(format, lump_version)?;
        let (offset, encoding) = match (field, stride) {
            (ModelField::Mins, _) => (0, Encoding::Vec3F32),
            (ModelField::Maxs, _) => (12, Encoding::Vec3F32),
            (ModelField::Origin, 64 | 48) => (24, Encoding::Vec3F32),
            (ModelField::HeadNode, 64 | 48) => (36, Encoding::I32),
            (ModelField::FirstFace, 64) => (56, Encoding::I32),
            (ModelField::NumFaces, 64) => (60, Encoding::I32),
            (ModelField::FirstFace, 48) => (40, Encoding::I32),
            (ModelField::NumFaces, 48) => (44, Encoding::I32),
            (ModelField::FirstFace, _) => (24, Encoding::I32),
            (ModelField::NumFaces, _) => (28, Encoding::I32),
            (ModelField::FirstBrush, 40) => (32, Encoding::I32),
            (ModelField::NumBrushes, 40) => (36, Encoding::I32),
            _ => return None,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

impl<B: AsRef<[u8]>> Record<B, Model> {
    pub fn center(&self) -> Vec3 {
        (self.mins() + self.maxs()) * 0.5
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;
    use crate::{
        binaries::Endian,
        bsp::{layout::assert_consistent_tables, lump::{Lump, LumpContext}},
    };

    #[test]
    fn tables() {
        assert_consistent_tables::<Model>(&[0]);
    }

    #[test]
    fn layouts_by_family() {
        let mut bytes = vec![0u8; 64];
        let mut lump = Lump::<_, Model>::new(
            &mut bytes[..],
            LumpContext::new(MapType::Quake, 0, Endian::Little),
        )
        .unwrap();
        lump.get_mut(0).unwrap().set_num_faces(11);
        assert_eq!(&bytes[60..64], &11i32.to_le_bytes());

        let mut bytes = vec![0u8; 40];
        let mut lump = Lump::<_, Model>::new(
            &mut bytes[..],
            LumpContext::new(MapType::MOHAA, 0, Endian::Little),
        )
        .unwrap();
        let mut model = lump.get_mut(0).unwrap();
        model.set_mins(Vec3::splat(-16.0));
        model.set_maxs(Vec3::splat(48.0));
        model.set_num_brushes(2);
        assert_eq!(model.center(), Vec3::splat(16.0));
        assert!(model.origin().is_nan());
        assert_eq!(model.num_brushes(), 2);
        assert_eq!(model.head_node(), -1);
    }
}
