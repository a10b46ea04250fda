use glam::Vec3;

use crate::{
    binaries::Endian,
    error::{BspError, Result},
    format::{cod, quake1, quake2, source, MapType},
};

use super::{
    layout::{Encoding, FieldLayout, RecordKind},
    record::{record_fields, Record},
};

/// Fixed-stride texture or shader record.
///
/// Quake 2 era formats keep the projection axes next to the texture name;
/// Quake 3 era formats keep surface flags and contents instead. Nightfire
/// stores bare 64 byte names, and uses the same layout for its materials.
pub struct Texture;

record_fields!(Texture, TextureField {
    name, set_name: String => Name;
    /// Alpha mask shader, MoHAA only.
    mask, set_mask: String => Mask;
    flags, set_flags: i32 => Flags;
    contents, set_contents: i32 => Contents;
    value, set_value: i32 => Value;
    /// Next frame of an animated texture.
    next, set_next: i32 => Next;
    u_axis, set_u_axis: Vec3 => UAxis;
    u_shift, set_u_shift: f32 => UShift;
    v_axis, set_v_axis: Vec3 => VAxis;
    v_shift, set_v_shift: f32 => VShift;
});

impl Texture {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake2!() => Some(5),
            MapType::Quake3 | MapType::Raven => Some(1),
            MapType::FAKK | MapType::MOHAA | MapType::STEF2 | MapType::STEF2Demo => Some(0),
            cod!() => Some(0),
            MapType::Nightfire => Some(2),
            _ => None,
        }
    }

    pub fn index_for_material_lump(format: MapType) -> Option<usize> {
        match format {
            MapType::Nightfire => Some(3),
            _ => None,
        }
    }
}

/// The leading `u_axis, u_shift, v_axis, v_shift` block shared by texture
/// projections.
fn projection(first: usize, axis: ProjectionAxis) -> FieldLayout {
    match axis {
        ProjectionAxis::UAxis => FieldLayout::at(first, Encoding::Vec3F32),
        ProjectionAxis::UShift => FieldLayout::at(first + 12, Encoding::F32),
        ProjectionAxis::VAxis => FieldLayout::at(first + 16, Encoding::Vec3F32),
        ProjectionAxis::VShift => FieldLayout::at(first + 28, Encoding::F32),
    }
}

enum ProjectionAxis {
    UAxis,
    UShift,
    VAxis,
    VShift,
}

impl RecordKind for Texture {
    type Field = TextureField;

    const NAME: &'static str = "Texture";
    const FIELDS: &'static [TextureField] = TextureField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            MapType::Nightfire => Some(64),
            MapType::Quake2 | MapType::Daikatana | MapType::SoF => Some(76),
            MapType::SiN => Some(180),
            MapType::Quake3 | MapType::Raven | cod!() => Some(72),
            MapType::FAKK | MapType::STEF2 | MapType::STEF2Demo => Some(76),
            MapType::MOHAA => Some(140),
            _ => None,
        }
    }

    fn layout(field: TextureField, format: MapType, _lump_version: i32) -> Option<FieldLayout> {
        use TextureField::*;

        match (field, format) {
            (Name, MapType::Nightfire) => Some(FieldLayout::at(0, Encoding::Str(64))),

            (UAxis, quake2!()) => Some(projection(0, ProjectionAxis::UAxis)),
            (UShift, quake2!()) => Some(projection(0, ProjectionAxis::UShift)),
            (VAxis, quake2!()) => Some(projection(0, ProjectionAxis::VAxis)),
            (VShift, quake2!()) => Some(projection(0, ProjectionAxis::VShift)),
            (Flags, quake2!()) => Some(FieldLayout::at(32, Encoding::I32)),
            (Value, MapType::Quake2 | MapType::Daikatana | MapType::SoF) => {
                Some(FieldLayout::at(36, Encoding::I32))
            }
            (Name, MapType::Quake2 | MapType::Daikatana | MapType::SoF) => {
                Some(FieldLayout::at(40, Encoding::Str(32)))
            }
            (Next, MapType::Quake2 | MapType::Daikatana | MapType::SoF) => {
                Some(FieldLayout::at(72, Encoding::I32))
            }
            (Name, MapType::SiN) => Some(FieldLayout::at(36, Encoding::Str(64))),
            (Next, MapType::SiN) => Some(FieldLayout::at(100, Encoding::I32)),

            (
                Name,
                MapType::Quake3
                | MapType::Raven
                | MapType::FAKK
                | MapType::MOHAA
                | MapType::STEF2
                | MapType::STEF2Demo
                | cod!(),
            ) => Some(FieldLayout::at(0, Encoding::Str(64))),
            (
                Flags,
                MapType::Quake3
                | MapType::Raven
                | MapType::FAKK
                | MapType::MOHAA
                | MapType::STEF2
                | MapType::STEF2Demo
                | cod!(),
            ) => Some(FieldLayout::at(64, Encoding::I32)),
            (
                Contents,
                MapType::Quake3
                | MapType::Raven
                | MapType::FAKK
                | MapType::MOHAA
                | MapType::STEF2
                | MapType::STEF2Demo
                | cod!(),
            ) => Some(FieldLayout::at(68, Encoding::I32)),
            (Mask, MapType::MOHAA) => Some(FieldLayout::at(76, Encoding::Str(64))),

            _ => None,
        }
    }
}

/// Texture projection. Quake points it at a miptex, Valve formats at a
/// [`TexData`] record and add a second projection for lightmaps.
pub struct TexInfo;

record_fields!(TexInfo, TexInfoField {
    u_axis, set_u_axis: Vec3 => UAxis;
    u_shift, set_u_shift: f32 => UShift;
    v_axis, set_v_axis: Vec3 => VAxis;
    v_shift, set_v_shift: f32 => VShift;
    lightmap_u_axis, set_lightmap_u_axis: Vec3 => LightmapUAxis;
    lightmap_u_shift, set_lightmap_u_shift: f32 => LightmapUShift;
    lightmap_v_axis, set_lightmap_v_axis: Vec3 => LightmapVAxis;
    lightmap_v_shift, set_lightmap_v_shift: f32 => LightmapVShift;
    flags, set_flags: i32 => Flags;
    /// Miptex index in Quake, texdata index in Valve formats.
    texture, set_texture: i32 => Texture;
});

impl TexInfo {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            quake1!() => Some(6),
            source!() | MapType::Source17 | MapType::Vindictus => Some(6),
            MapType::Nightfire => Some(17),
            _ => None,
        }
    }
}

impl RecordKind for TexInfo {
    type Field = TexInfoField;

    const NAME: &'static str = "TexInfo";
    const FIELDS: &'static [TexInfoField] = TexInfoField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            quake1!() => Some(40),
            source!() | MapType::Source17 | MapType::Vindictus => Some(72),
            MapType::Nightfire => Some(32),
            _ => None,
        }
    }

    fn layout(field: TexInfoField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        let stride = Self::struct_length(format, lump_version)?;
        match (field, stride) {
            (TexInfoField::UAxis, _) => Some(projection(0, ProjectionAxis::UAxis)),
            (TexInfoField::UShift, _) => Some(projection(0, ProjectionAxis::UShift)),
            (TexInfoField::VAxis, _) => Some(projection(0, ProjectionAxis::VAxis)),
            (TexInfoField::VShift, _) => Some(projection(0, ProjectionAxis::VShift)),
            (TexInfoField::LightmapUAxis, 72) => Some(projection(32, ProjectionAxis::UAxis)),
            (TexInfoField::LightmapUShift, 72) => Some(projection(32, ProjectionAxis::UShift)),
            (TexInfoField::LightmapVAxis, 72) => Some(projection(32, ProjectionAxis::VAxis)),
            (TexInfoField::LightmapVShift, 72) => Some(projection(32, ProjectionAxis::VShift)),
            (TexInfoField::Flags, 72) => Some(FieldLayout::at(64, Encoding::I32)),
            (TexInfoField::Texture, 72) => Some(FieldLayout::at(68, Encoding::I32)),
            (TexInfoField::Texture, 40) => Some(FieldLayout::at(32, Encoding::I32)),
            (TexInfoField::Flags, 40) => Some(FieldLayout::at(36, Encoding::I32)),
            _ => None,
        }
    }
}

impl<B: AsRef<[u8]>> Record<B, TexInfo> {
    /// Texture space coordinates of a world position.
    pub fn project(&self, point: Vec3) -> glam::Vec2 {
        glam::Vec2::new(
            self.u_axis().dot(point) + self.u_shift(),
            self.v_axis().dot(point) + self.v_shift(),
        )
    }
}

/// Valve texture metadata: the material name (through the string table) and
/// its dimensions.
pub struct TexData;

record_fields!(TexData, TexDataField {
    reflectivity, set_reflectivity: Vec3 => Reflectivity;
    /// Index into the texdata string table.
    name_string_table_id, set_name_string_table_id: i32 => NameStringTableId;
    width, set_width: i32 => Width;
    height, set_height: i32 => Height;
    view_width, set_view_width: i32 => ViewWidth;
    view_height, set_view_height: i32 => ViewHeight;
});

impl TexData {
    pub fn index_for_lump(format: MapType) -> Option<usize> {
        match format {
            source!() | MapType::Source17 | MapType::Vindictus => Some(2),
            _ => None,
        }
    }
}

impl RecordKind for TexData {
    type Field = TexDataField;

    const NAME: &'static str = "TexData";
    const FIELDS: &'static [TexDataField] = TexDataField::ALL;

    fn struct_length(format: MapType, _lump_version: i32) -> Option<usize> {
        match format {
            source!() | MapType::Source17 | MapType::Vindictus => Some(32),
            _ => None,
        }
    }

    fn layout(field: TexDataField, format: MapType, lump_version: i32) -> Option<FieldLayout> {
        Self::struct_length(format, lump_version)?;
        Some(match field {
            TexDataField::Reflectivity => FieldLayout::at(0, Encoding::Vec3F32),
            TexDataField::NameStringTableId => FieldLayout::at(12, Encoding::I32),
            TexDataField::Width => FieldLayout::at(16, Encoding::I32),
            TexDataField::Height => FieldLayout::at(20, Encoding::I32),
            TexDataField::ViewWidth => FieldLayout::at(24, Encoding::I32),
            TexDataField::ViewHeight => FieldLayout::at(28, Encoding::I32),
        })
    }
}

/// Quake miptex directory: a count followed by one offset per texture.
pub fn index_for_miptex_lump(format: MapType) -> Option<usize> {
    match format {
        quake1!() => Some(2),
        _ => None,
    }
}

/// Valve texdata string data, addressed through the texdata string table.
pub fn index_for_tex_string_data_lump(format: MapType) -> Option<usize> {
    match format {
        source!() | MapType::Source17 | MapType::Vindictus => Some(43),
        _ => None,
    }
}

const MIPTEX_NAME_LENGTH: usize = 16;

/// Names of the textures in a Quake miptex lump, in directory order.
///
/// Entries with a negative offset are textures stripped from the file and
/// read as empty names.
pub fn miptex_names(data: &[u8], endian: Endian) -> Result<Vec<String>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let count = data
        .get(..4)
        .map(|b| endian.read_i32(b))
        .ok_or_else(|| BspError::malformed("miptex", "truncated texture count"))?;
    let count = usize::try_from(count)
        .map_err(|_| BspError::malformed("miptex", format!("negative texture count {count}")))?;
    let table_end = count
        .checked_mul(4)
        .and_then(|n| n.checked_add(4))
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            BspError::malformed("miptex", format!("{count} offsets do not fit in the lump"))
        })?;

    data[4..table_end]
        .chunks_exact(4)
        .map(|b| {
            let offset = endian.read_i32(b);
            if offset < 0 {
                return Ok(String::new());
            }
            let start = offset as usize;
            let name = data.get(start..start + MIPTEX_NAME_LENGTH).ok_or_else(|| {
                BspError::malformed("miptex", format!("texture at {offset} overruns the lump"))
            })?;
            Ok(nul_terminated(name))
        })
        .collect()
}

/// Resolves string table offsets against the texdata string data.
pub fn string_table_names(
    strings: &[u8],
    offsets: impl IntoIterator<Item = i64>,
) -> Result<Vec<String>> {
    offsets
        .into_iter()
        .map(|offset| {
            usize::try_from(offset)
                .ok()
                .and_then(|start| strings.get(start..))
                .map(nul_terminated)
                .ok_or_else(|| {
                    BspError::malformed(
                        "texdata string data",
                        format!("string offset {offset} is outside {} bytes", strings.len()),
                    )
                })
        })
        .collect()
}

fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
