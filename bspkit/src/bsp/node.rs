use glam::Vec3;

use crate::format::{quake1, quake2, quake3, source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// Interior BSP tree node. A negative child `c` is leaf `-1 - c`.
pub struct Node;

record_fields!(Node, NodeField {
    plane, set_plane: i32 => Plane;
    child1, set_child1: i32 => Child1;
    child2, set_child2: i32 => Child2;
    mins, set_mins: Vec3 => Mins;
    maxs, set_maxs: Vec3 => Maxs;
    first_face, set_first_face: i32 => FirstFace;
    num_faces, set_num_faces: i32 => NumFaces;
    area, set_area: i32 => Area;
});

/// Where a node child points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeChild {
    Node(usize),
    Leaf(usize),
}

impl NodeChild {
    pub fn from_raw(child: i32) -> Self {
        if child < 0 {
            NodeChild::Leaf((-1 - child as i64) as usize)
        } else {
            NodeChild::Node(child as usize)
        }
    }
}

impl Node {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() => Some(5),
            quake2!() => Some(4),
            source!() | MapType::Source17 | MapType::Vindictus => Some(5),
            MapType::Quake3 | MapType::Raven => Some(3),
            MapType::Nightfire => Some(8),
            MapType::FAKK | MapType::MOHAA => Some(9),
            MapType::STEF2 | MapType::STEF2Demo => Some(11),
            _ => None,
        }
    }
}

impl RecordKind for Node {
    type Field = NodeField;

    const NAME: &'static str = "Node";
    const FIELDS: &'static [NodeField] = NodeField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake1!() => Some(24),
            quake2!() => Some(28),
            source!() | MapType::Source17 => Some(32),
            MapType::Vindictus => Some(48),
            quake3!() | MapType::Nightfire => Some(36),
            _ => None,
        }
    }

    fn layout(field: NodeField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        use Encoding::*;

        Self::struct_length(format, lump_version)?;
        let (offset, encoding) = match (field, format) {
            (NodeField::Plane, _) => (0, I32),

            (NodeField::Child1, quake1!()) => (4, I16),
            (NodeField::Child2, quake1!()) => (6, I16),
            (NodeField::Mins, quake1!()) => (8, Vec3I16),
            (NodeField::Maxs, quake1!()) => (14, Vec3I16),
            (NodeField::FirstFace, quake1!()) => (20, U16),
            (NodeField::NumFaces, quake1!()) => (22, U16),

            (NodeField::Child1, _) => (4, I32),
            (NodeField::Child2, _) => (8, I32),

            (NodeField::Mins, quake2!() | source!() | MapType::Source17) => (12, Vec3I16),
            (NodeField::Maxs, quake2!() | source!() | MapType::Source17) => (18, Vec3I16),
            (NodeField::FirstFace, quake2!() | source!() | MapType::Source17) => (24, U16),
            (NodeField::NumFaces, quake2!() | source!() | MapType::Source17) => (26, U16),
            (NodeField::Area, source!() | MapType::Source17) => (28, I16),

            (NodeField::Mins, MapType::Vindictus) => (12, Vec3I32),
            (NodeField::Maxs, MapType::Vindictus) => (24, Vec3I32),
            (NodeField::FirstFace, MapType::Vindictus) => (36, I32),
            (NodeField::NumFaces, MapType::Vindictus) => (40, I32),
            (NodeField::Area, MapType::Vindictus) => (44, I16),

            (NodeField::Mins, quake3!()) => (12, Vec3I32),
            (NodeField::Maxs, quake3!()) => (24, Vec3I32),
            (NodeField::Mins, MapType::Nightfire) => (12, Vec3F32),
            (NodeField::Maxs, MapType::Nightfire) => (24, Vec3F32),
            _ => return None,
        };
        Some(FieldLayout::at(offset, encoding))
    }
}

impl<B: AsRef<[u8]>> Record<B, Node> {
    pub fn children(&self) -> [NodeChild; 2] {
        [
            NodeChild::from_raw(self.child1()),
            NodeChild::from_raw(self.child2()),
        ]
    }
}

#[cfg(test)]
mod node_tests {
    use super::*;
    use crate::{
        binaries::Endian,
        bsp::{layout::assert_consistent_tables, lump::{Lump, LumpContext}},
    };

    #[test]
    fn tables() {
        assert_consistent_tables::<Node>(&[0]);
    }

    #[test]
    fn quake_node_children() {
        let mut bytes = vec![0u8; 24];
        let mut lump = Lump::<_, Node>::new(
            &mut bytes[..],
            LumpContext::new(MapType::Quake, 0, Endian::Little),
        )
        .unwrap();
        let mut node = lump.get_mut(0).unwrap();
        node.set_child1(3);
        node.set_child2(-1);
        node.set_mins(Vec3::new(-64.0, -32.0, 0.0));
        node.set_area(2);
        assert_eq!(node.children(), [NodeChild::Node(3), NodeChild::Leaf(0)]);
        assert_eq!(node.mins(), Vec3::new(-64.0, -32.0, 0.0));
        assert_eq!(node.area(), -1);
        assert_eq!(&bytes[4..8], &[3, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn source_node_area() {
        let mut bytes = vec![0u8; 32];
        bytes[28..30].copy_from_slice(&7i16.to_le_bytes());
        bytes[8..12].copy_from_slice(&(-5i32).to_le_bytes());
        let lump = Lump::<_, Node>::new(
            &bytes[..],
            LumpContext::new(MapType::Source20, 0, Endian::Little),
        )
        .unwrap();
        let node = lump.get(0).unwrap();
        assert_eq!(node.area(), 7);
        assert_eq!(node.children()[1], NodeChild::Leaf(4));
    }
}
