use flagset::flags;

/// Directory size of every Valve-derived format.
pub const HEADER_LUMPS: usize = 64;

/// Byte size of a Valve header: ident, version, the lump directory, then the
/// map revision.
pub const SOURCE_HEADER_SIZE: usize = 8 + HEADER_LUMPS * 16 + 4;

/// Width of one name in the static prop model dictionary.
pub const STATIC_PROP_NAME_LENGTH: usize = 128;

flags! {
    /// Brush and leaf contents shared by the Quake 2 and Valve lineages.
    pub enum Contents: i32 {
        SOLID = 0x1,           //an eye is never valid in a solid
        WINDOW = 0x2,          //translucent, but not watery (glass)
        AUX = 0x4,
        GRATE = 0x8,           //alpha-tested "grate" textures
        SLIME = 0x10,
        WATER = 0x20,
        MIST = 0x40,
        OPAQUE = 0x80,         //block AI line of sight
        TESTFOGVOLUME = 0x100,
        UNUSED = 0x200,
        UNUSED6 = 0x400,
        TEAM1 = 0x800,
        TEAM2 = 0x1000,
        IgnoreNodrawOpaque = 0x2000,
        MOVEABLE = 0x4000,
        AREAPORTAL = 0x8000,
        PLAYERCLIP = 0x10000,
        MONSTERCLIP = 0x20000,
        Current0 = 0x40000,
        Current90 = 0x80000,
        Current180 = 0x100000,
        Current270 = 0x200000,
        CurrentUp = 0x400000,
        CurrentDown = 0x800000,
        ORIGIN = 0x1000000,    //removed before bsping an entity
        MONSTER = 0x2000000,
        DEBRIS = 0x4000000,
        DETAIL = 0x8000000,
        TRANSLUCENT = 0x10000000,
        LADDER = 0x20000000,
        HITBOX = 0x40000000,
    }

    /// Displacement triangle tags.
    pub enum DispTri: u16 {
        TagSurface = 0x1,
        TagWalkable = 0x2,
        TagBuildable = 0x4,
        FlagSurfprop1 = 0x8,
        FlagSurfprop2 = 0x10,
    }

    pub enum StaticPropFlags: u8 {
        FADES = 0x1,
        UseLightingOrigin = 0x2,
        NoDraw = 0x4,
        IgnoreNormals = 0x8,
        NoShadow = 0x10,
        ScreenSpaceFade = 0x20,
        NoPerVertexLighting = 0x40,
        NoSelfShadowing = 0x80,
    }
}
