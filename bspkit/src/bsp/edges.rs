use crate::format::{quake1, quake2, source, MapType};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// A pair of vertex indices. Faces reference edges through the surfedge
/// list, where a negative entry walks the edge backwards.
pub struct Edge;

record_fields!(Edge, EdgeField {
    first_vertex, set_first_vertex: i32 => FirstVertex;
    second_vertex, set_second_vertex: i32 => SecondVertex;
});

impl Edge {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() => Some(12),
            quake2!() => Some(11),
            source!() | MapType::Source17 | MapType::Vindictus => Some(12),
            _ => None,
        }
    }
}

impl RecordKind for Edge {
    type Field = EdgeField;

    const NAME: &'static str = "Edge";
    const FIELDS: &'static [EdgeField] = EdgeField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake1!() | quake2!() | source!() | MapType::Source17 => Some(4),
            MapType::Vindictus => Some(8),
            _ => None,
        }
    }

    fn layout(field: EdgeField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        let wide = Self::struct_length(format, lump_version)? == 8;
        let (width, encoding) = if wide {
            (4, Encoding::I32)
        } else {
            (2, Encoding::U16)
        };
        Some(match field {
            EdgeField::FirstVertex => FieldLayout::at(0, encoding),
            EdgeField::SecondVertex => FieldLayout::at(width, encoding),
        })
    }
}

impl<B: AsRef<[u8]>> Record<B, Edge> {
    /// Vertex indices in walk order for a surfedge entry.
    pub fn walk(&self, surf_edge: i64) -> [i32; 2] {
        if surf_edge < 0 {
            [self.second_vertex(), self.first_vertex()]
        } else {
            [self.first_vertex(), self.second_vertex()]
        }
    }
}
