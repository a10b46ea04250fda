// Format families for the layout tables. Each expands to an or-pattern so a
// table row can name a whole family at once.

macro_rules! quake1 {
    () => {
        $crate::format::MapType::Quake | $crate::format::MapType::GoldSrc
    };
}

macro_rules! quake2 {
    () => {
        $crate::format::MapType::Quake2
            | $crate::format::MapType::Daikatana
            | $crate::format::MapType::SiN
            | $crate::format::MapType::SoF
    };
}

/// Source formats sharing the common Valve layouts. Source 17 and Vindictus
/// diverge too often to be included.
macro_rules! source {
    () => {
        $crate::format::MapType::Source18
            | $crate::format::MapType::Source19
            | $crate::format::MapType::Source20
            | $crate::format::MapType::Source21
            | $crate::format::MapType::Source22
            | $crate::format::MapType::Source23
            | $crate::format::MapType::Source27
            | $crate::format::MapType::L4D2
            | $crate::format::MapType::TacticalInterventionEncrypted
            | $crate::format::MapType::DMoMaM
    };
}

macro_rules! quake3 {
    () => {
        $crate::format::MapType::Quake3
            | $crate::format::MapType::Raven
            | $crate::format::MapType::STEF2
            | $crate::format::MapType::STEF2Demo
            | $crate::format::MapType::MOHAA
            | $crate::format::MapType::FAKK
    };
}

macro_rules! cod {
    () => {
        $crate::format::MapType::CoD | $crate::format::MapType::CoD2 | $crate::format::MapType::CoD4
    };
}

pub(crate) use {cod, quake1, quake2, quake3, source};

/// The binary layout a file was written with. Carries no behaviour of its
/// own; every layout table in the crate is keyed on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapType {
    Quake,
    GoldSrc,
    Quake2,
    Daikatana,
    SiN,
    SoF,
    Quake3,
    Raven,
    FAKK,
    MOHAA,
    STEF2,
    STEF2Demo,
    CoD,
    CoD2,
    CoD4,
    Nightfire,
    Source17,
    Source18,
    Source19,
    Source20,
    Source21,
    Source22,
    Source23,
    Source27,
    L4D2,
    Vindictus,
    TacticalInterventionEncrypted,
    DMoMaM,
    Doom,
    Hexen,
}

impl MapType {
    pub const ALL: [MapType; 30] = [
        MapType::Quake,
        MapType::GoldSrc,
        MapType::Quake2,
        MapType::Daikatana,
        MapType::SiN,
        MapType::SoF,
        MapType::Quake3,
        MapType::Raven,
        MapType::FAKK,
        MapType::MOHAA,
        MapType::STEF2,
        MapType::STEF2Demo,
        MapType::CoD,
        MapType::CoD2,
        MapType::CoD4,
        MapType::Nightfire,
        MapType::Source17,
        MapType::Source18,
        MapType::Source19,
        MapType::Source20,
        MapType::Source21,
        MapType::Source22,
        MapType::Source23,
        MapType::Source27,
        MapType::L4D2,
        MapType::Vindictus,
        MapType::TacticalInterventionEncrypted,
        MapType::DMoMaM,
        MapType::Doom,
        MapType::Hexen,
    ];

    /// Any Valve-derived format, including the third party branches.
    pub fn is_source(self) -> bool {
        matches!(self, source!() | MapType::Source17 | MapType::Vindictus)
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn all_is_unique() {
        for (i, a) in MapType::ALL.iter().enumerate() {
            for b in &MapType::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn families() {
        assert!(MapType::Vindictus.is_source());
        assert!(MapType::Source17.is_source());
        assert!(MapType::L4D2.is_source());
        assert!(!MapType::Quake3.is_source());
        assert!(matches!(MapType::GoldSrc, quake1!()));
        assert!(matches!(MapType::SoF, quake2!()));
        assert!(!matches!(MapType::Source17, source!()));
    }
}
