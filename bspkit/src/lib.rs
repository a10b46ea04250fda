//! Typed, in-place access to the lumps of BSP map files across the Quake,
//! Valve, Ritual, Raven, Call of Duty and Nightfire lineages.
//!
//! A [`Bsp`] owns the file bytes and hands out [`Lump`] views of typed
//! [`Record`]s. Each record reads and writes its fields straight from the
//! file using the layout its format and lump version call for; fields a
//! format does not store read as a sentinel and ignore writes.

pub mod binaries;
pub mod bsp;
pub mod bsp_file;
pub mod error;
pub mod format;

pub use binaries::Endian;
pub use bsp::{
    gamelump::{GameLump, GameLumpDirectory, GameLumpEntry, GameLumpTag},
    header::{BspReader, HeaderReader, LumpInfo},
    lump::{Lump, LumpContext},
    numlist::{NumList, NumType},
    record::Record,
    static_prop::StaticProps,
};
pub use bsp_file::{Bsp, LoadOptions, LumpRole};
pub use error::{BspError, Result};
pub use format::MapType;

// Tests run concurrently, so the logger is installed once for all of them.
#[cfg(test)]
static LOGGER_INIT: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
pub(crate) fn ensure_env_logger_initialized() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
