pub mod brush;
pub mod consts;
pub mod cubemap;
pub mod displacement;
pub mod edges;
pub mod face;
pub mod gamelump;
pub mod header;
pub mod layout;
pub mod leaf;
pub mod lump;
pub mod model;
pub mod node;
pub mod numlist;
pub mod plane;
pub mod record;
pub mod static_prop;
pub mod textures;
pub mod vert;

pub use header::{BspReader, HeaderReader, LumpInfo};
pub use layout::{Encoding, FieldLayout, FieldValue, RecordKind};
pub use lump::{Lump, LumpContext};
pub use numlist::{NumList, NumType};
pub use record::Record;

// Layouts are per format and, for some lumps, per lump version. A record is
// a window of `struct_length(format, version)` bytes; every named field is
// looked up in its kind's table and reads as a sentinel where the table has
// no entry.
//
// https://developer.valvesoftware.com/wiki/BSP_(Source)
// https://www.mralligator.com/q3/
