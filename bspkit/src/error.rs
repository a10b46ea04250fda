use thiserror::Error;

use crate::{
    bsp::{gamelump::GameLumpTag, numlist::NumType},
    format::MapType,
};

pub type Result<T> = std::result::Result<T, BspError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BspError {
    /// The record kind (or lump) does not exist at all for this format.
    #[error("{kind} does not exist in map type {format:?} or has not been implemented")]
    UnsupportedFormat { kind: &'static str, format: MapType },

    #[error("malformed {lump} lump: {reason}")]
    MalformedLump { lump: &'static str, reason: String },

    #[error("index {index} is out of range for {lump} with {count} elements")]
    OutOfRangeIndex {
        lump: &'static str,
        index: usize,
        count: usize,
    },

    #[error("value {value} does not fit in a {ty:?} element")]
    Overflow { value: i64, ty: NumType },

    #[error("game lump {0} not found")]
    NotFound(GameLumpTag),

    #[error("unrecognized file format, signature `{0:02X?}`")]
    UnrecognizedFileFormat([u8; 4]),

    #[error("lump index {index} is not in the directory of this {format:?} file")]
    InvalidLumpIndex { index: usize, format: MapType },
}

impl BspError {
    pub(crate) fn malformed(lump: &'static str, reason: impl Into<String>) -> Self {
        BspError::MalformedLump {
            lump,
            reason: reason.into(),
        }
    }
}
