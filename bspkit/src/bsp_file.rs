use std::{cell::OnceCell, fmt, ops::Range};

use crate::{
    binaries::Endian,
    bsp::{
        brush::{Brush, BrushSide},
        cubemap::Cubemap,
        displacement::{DispInfo, DispVertex},
        edges::Edge,
        face::Face,
        gamelump::{index_for_game_lump, GameLump, GameLumpDirectory, GameLumpTag},
        header::{BspReader, HeaderReader, LumpInfo},
        layout::RecordKind,
        leaf::Leaf,
        lump::{Lump, LumpContext},
        model::Model,
        node::Node,
        numlist::{
            index_for_displacement_triangles_lump, index_for_indices_lump,
            index_for_mark_brushes_lump, index_for_mark_surfaces_lump, index_for_surf_edges_lump,
            index_for_tex_table_lump, NumList, NumType,
        },
        plane::Plane,
        static_prop::{StaticProp, StaticProps, StaticPropsLayout},
        textures::{
            index_for_miptex_lump, index_for_tex_string_data_lump, miptex_names,
            string_table_names, TexData, TexInfo, Texture,
        },
        vert::Vertex,
    },
    error::{BspError, Result},
    format::MapType,
};

/// Every collection a [`Bsp`] can hand out. Each is resolved at most once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LumpRole {
    Planes,
    Faces,
    OriginalFaces,
    Edges,
    Vertices,
    Textures,
    Materials,
    TexInfos,
    TexDatas,
    Brushes,
    BrushSides,
    Nodes,
    Leaves,
    Models,
    DispInfos,
    DispVertices,
    Cubemaps,
    MarkSurfaces,
    SurfEdges,
    MarkBrushes,
    Indices,
    TexTable,
    DisplacementTriangles,
    GameLump,
    StaticProps,
}

impl LumpRole {
    pub const COUNT: usize = 25;
}

/// Overrides for files whose signature is shared by more than one format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub format: Option<MapType>,
    pub endian: Option<Endian>,
}

impl LoadOptions {
    pub fn with_format(mut self, format: MapType) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }
}

/// Where a role's view lies in the file, worked out on first access.
enum Resolved {
    Records {
        range: Range<usize>,
        stride: usize,
        ctx: LumpContext,
    },
    Numbers {
        range: Range<usize>,
        ty: NumType,
    },
    Game {
        range: Range<usize>,
        directory: GameLumpDirectory,
    },
    StaticProps {
        /// The `sprp` entry, file-absolute.
        range: Range<usize>,
        layout: StaticPropsLayout,
    },
}

struct LumpCache([OnceCell<Resolved>; LumpRole::COUNT]);

impl LumpCache {
    fn new() -> Self {
        LumpCache(std::array::from_fn(|_| OnceCell::new()))
    }

    fn get(&self, role: LumpRole) -> Option<&Resolved> {
        self.0[role as usize].get()
    }

    fn cell(&self, role: LumpRole) -> &OnceCell<Resolved> {
        &self.0[role as usize]
    }
}

/// A loaded file.
///
/// Owns the file bytes. Every collection accessor borrows from the `Bsp`, so
/// no view can outlive it, and writes through a `*_mut` accessor land
/// directly in the owned bytes. Lump ranges and layouts are resolved on first
/// access and cached for the life of the value; failed resolutions are not
/// cached.
///
/// `Bsp` is `Send` but not `Sync`. Sharing one between threads needs
/// external synchronization.
pub struct Bsp {
    data: Vec<u8>,
    reader: Box<dyn BspReader + Send>,
    format: MapType,
    endian: Endian,
    cache: LumpCache,
}

macro_rules! record_lumps {
    ($( $(#[$meta:meta])* $name:ident, $name_mut:ident: $kind:ty => $role:ident, $index:path; )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self) -> Result<Lump<&[u8], $kind>> {
                let (range, stride, ctx) = self.records::<$kind>(LumpRole::$role, $index)?;
                Ok(Lump::from_parts(&self.data[range], stride, ctx))
            }

            pub fn $name_mut(&mut self) -> Result<Lump<&mut [u8], $kind>> {
                let (range, stride, ctx) = self.records::<$kind>(LumpRole::$role, $index)?;
                Ok(Lump::from_parts(&mut self.data[range], stride, ctx))
            }
        )*
    };
}

macro_rules! number_lumps {
    ($( $(#[$meta:meta])* $name:ident, $name_mut:ident => $role:ident, $index:path; )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self) -> Result<NumList<&[u8]>> {
                let (range, ty) = self.numbers(LumpRole::$role, $index)?;
                Ok(NumList::from_parts(&self.data[range], ty, self.endian))
            }

            pub fn $name_mut(&mut self) -> Result<NumList<&mut [u8]>> {
                let (range, ty) = self.numbers(LumpRole::$role, $index)?;
                Ok(NumList::from_parts(&mut self.data[range], ty, self.endian))
            }
        )*
    };
}

impl Bsp {
    /// Detects the format from the file signature and reads its directory.
    pub fn load(data: Vec<u8>) -> Result<Self> {
        Self::load_with(data, LoadOptions::default())
    }

    pub fn load_with(data: Vec<u8>, options: LoadOptions) -> Result<Self> {
        let detected = HeaderReader::detect_format(&data);
        let format = match options.format {
            Some(format) => format,
            None => detected.clone()?.0,
        };
        let endian = options
            .endian
            .or_else(|| detected.ok().map(|(_, endian)| endian))
            .unwrap_or_default();
        let reader = HeaderReader::with_format(&data, format, endian)?;
        Ok(Self::with_reader(data, reader))
    }

    /// Uses `reader` to locate lumps instead of the file's own header.
    pub fn with_reader(data: Vec<u8>, reader: impl BspReader + Send + 'static) -> Self {
        let format = reader.format();
        let endian = reader.endian();
        log::debug!("loaded {} byte {format:?} file", data.len());
        Self {
            data,
            reader: Box::new(reader),
            format,
            endian,
            cache: LumpCache::new(),
        }
    }

    pub fn format(&self) -> MapType {
        self.format
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn is_big_endian(&self) -> bool {
        self.endian.is_big()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Whether `role` has been resolved and cached.
    pub fn is_resolved(&self, role: LumpRole) -> bool {
        self.cache.get(role).is_some()
    }

    pub fn lump_info(&self, index: usize) -> Result<LumpInfo> {
        self.reader.lump_info(index)
    }

    /// Raw bytes of directory entry `index`.
    pub fn lump_bytes(&self, index: usize) -> Result<&[u8]> {
        let range = self.lump_range("lump", index)?.0;
        Ok(&self.data[range])
    }

    pub fn lump_bytes_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        let range = self.lump_range("lump", index)?.0;
        Ok(&mut self.data[range])
    }

    fn lump_range(&self, lump: &'static str, index: usize) -> Result<(Range<usize>, LumpInfo)> {
        let info = self.reader.lump_info(index)?;
        let range = info
            .offset
            .checked_add(info.length)
            .filter(|end| *end <= self.data.len())
            .map(|end| info.offset..end)
            .ok_or_else(|| {
                BspError::malformed(
                    lump,
                    format!(
                        "lump {index} at {}+{} overruns the {} byte file",
                        info.offset,
                        info.length,
                        self.data.len()
                    ),
                )
            })?;
        Ok((range, info))
    }

    fn resolve(
        &self,
        role: LumpRole,
        init: impl FnOnce() -> Result<Resolved>,
    ) -> Result<&Resolved> {
        let cell = self.cache.cell(role);
        if let Some(resolved) = cell.get() {
            log::trace!("{role:?} cached");
            return Ok(resolved);
        }
        let resolved = init()?;
        Ok(cell.get_or_init(|| resolved))
    }

    fn records<K: RecordKind>(
        &self,
        role: LumpRole,
        index_for_lump: fn(MapType) -> Option<usize>,
    ) -> Result<(Range<usize>, usize, LumpContext)> {
        let resolved = self.resolve(role, || {
            let index = index_for_lump(self.format).ok_or(BspError::UnsupportedFormat {
                kind: K::NAME,
                format: self.format,
            })?;
            let (range, info) = self.lump_range(K::NAME, index)?;
            let ctx = LumpContext::new(self.format, info.version, self.endian);
            let lump = Lump::<_, K>::new(&self.data[range.clone()], ctx)?;
            log::debug!(
                "{role:?} from lump {index} at {range:?}: {} x {} bytes, v{}",
                lump.len(),
                lump.stride(),
                info.version
            );
            Ok(Resolved::Records {
                range,
                stride: lump.stride(),
                ctx,
            })
        })?;
        match resolved {
            Resolved::Records { range, stride, ctx } => Ok((range.clone(), *stride, *ctx)),
            _ => Err(BspError::malformed(K::NAME, "cached as another lump kind")),
        }
    }

    fn numbers(
        &self,
        role: LumpRole,
        index_for_lump: fn(MapType) -> Option<(usize, NumType)>,
    ) -> Result<(Range<usize>, NumType)> {
        let resolved = self.resolve(role, || {
            let (index, ty) = index_for_lump(self.format).ok_or(BspError::UnsupportedFormat {
                kind: "NumList",
                format: self.format,
            })?;
            let (range, _) = self.lump_range("NumList", index)?;
            let list = NumList::new(&self.data[range.clone()], ty, self.endian)?;
            log::debug!("{role:?} from lump {index} at {range:?}: {} x {ty:?}", list.len());
            Ok(Resolved::Numbers { range, ty })
        })?;
        match resolved {
            Resolved::Numbers { range, ty } => Ok((range.clone(), *ty)),
            _ => Err(BspError::malformed("NumList", "cached as another lump kind")),
        }
    }

    fn game_lump_directory(&self) -> Result<(Range<usize>, &GameLumpDirectory)> {
        let resolved = self.resolve(LumpRole::GameLump, || {
            let index = index_for_game_lump(self.format).ok_or(BspError::UnsupportedFormat {
                kind: "GameLump",
                format: self.format,
            })?;
            let (range, _) = self.lump_range("GameLump", index)?;
            let directory = GameLumpDirectory::parse(
                &self.data[range.clone()],
                range.start,
                self.format,
                self.endian,
            )?;
            log::debug!(
                "game lump {index} at {range:?}: {} entries",
                directory.len()
            );
            Ok(Resolved::Game { range, directory })
        })?;
        match resolved {
            Resolved::Game { range, directory } => Ok((range.clone(), directory)),
            _ => Err(BspError::malformed("GameLump", "cached as another lump kind")),
        }
    }

    pub fn game_lump(&self) -> Result<GameLump<'_, &[u8]>> {
        let (range, directory) = self.game_lump_directory()?;
        Ok(GameLump::new(&self.data[range], directory))
    }

    pub fn game_lump_mut(&mut self) -> Result<GameLump<'_, &mut [u8]>> {
        let range = self.game_lump_directory()?.0;
        let Self { data, cache, .. } = self;
        match cache.get(LumpRole::GameLump) {
            Some(Resolved::Game { directory, .. }) => {
                Ok(GameLump::new(&mut data[range], directory))
            }
            _ => Err(BspError::malformed("GameLump", "not resolved")),
        }
    }

    fn static_props_layout(&self) -> Result<(Range<usize>, &StaticPropsLayout)> {
        let resolved = self.resolve(LumpRole::StaticProps, || {
            if !self.format.is_source() {
                return Err(BspError::UnsupportedFormat {
                    kind: StaticProp::NAME,
                    format: self.format,
                });
            }
            let (game, directory) = self.game_lump_directory()?;
            let entry = directory
                .get(GameLumpTag::STATIC_PROPS)
                .ok_or(BspError::NotFound(GameLumpTag::STATIC_PROPS))?;
            let range = game.start + entry.offset..game.start + entry.offset + entry.length;
            let ctx = LumpContext::new(self.format, entry.version, self.endian);
            let layout = StaticPropsLayout::parse(&self.data[range.clone()], ctx)?;
            log::debug!(
                "static props v{} at {range:?}: {} models, {} props",
                entry.version,
                layout.names.len(),
                layout.props.len() / layout.stride
            );
            Ok(Resolved::StaticProps { range, layout })
        })?;
        match resolved {
            Resolved::StaticProps { range, layout } => Ok((range.clone(), layout)),
            _ => Err(BspError::malformed(StaticProp::NAME, "cached as another lump kind")),
        }
    }

    /// The `sprp` game lump: model dictionary, leaf list and props.
    pub fn static_props(&self) -> Result<StaticProps<'_>> {
        let (range, layout) = self.static_props_layout()?;
        Ok(layout.view(&self.data[range]))
    }

    /// The prop records of the `sprp` game lump, writable.
    pub fn static_props_mut(&mut self) -> Result<Lump<&mut [u8], StaticProp>> {
        let (range, layout) = self.static_props_layout()?;
        let props = range.start + layout.props.start..range.start + layout.props.end;
        let (stride, ctx) = (layout.stride, layout.ctx);
        Ok(Lump::from_parts(&mut self.data[props], stride, ctx))
    }

    /// Texture names in the order texture references index them: miptex
    /// order in Quake, string table order in Valve formats and texture lump
    /// order everywhere else. Read afresh on every call.
    pub fn texture_names(&self) -> Result<Vec<String>> {
        if let Some(index) = index_for_miptex_lump(self.format) {
            let (range, _) = self.lump_range("miptex", index)?;
            return miptex_names(&self.data[range], self.endian);
        }
        if let Some(index) = index_for_tex_string_data_lump(self.format) {
            let offsets = self.tex_table()?;
            let (range, _) = self.lump_range("texdata string data", index)?;
            return string_table_names(&self.data[range], offsets.iter());
        }
        Ok(self.textures()?.iter().map(|texture| texture.name()).collect())
    }

    record_lumps! {
        planes, planes_mut: Plane => Planes, Plane::index_for_lump;
        faces, faces_mut: Face => Faces, Face::index_for_lump;
        /// Faces before BSP splitting.
        original_faces, original_faces_mut: Face => OriginalFaces, Face::index_for_original_faces_lump;
        edges, edges_mut: Edge => Edges, Edge::index_for_lump;
        vertices, vertices_mut: Vertex => Vertices, Vertex::index_for_lump;
        textures, textures_mut: Texture => Textures, Texture::index_for_lump;
        /// Nightfire's material names, stored as texture records.
        materials, materials_mut: Texture => Materials, Texture::index_for_material_lump;
        tex_infos, tex_infos_mut: TexInfo => TexInfos, TexInfo::index_for_lump;
        tex_datas, tex_datas_mut: TexData => TexDatas, TexData::index_for_lump;
        brushes, brushes_mut: Brush => Brushes, Brush::index_for_lump;
        brush_sides, brush_sides_mut: BrushSide => BrushSides, BrushSide::index_for_lump;
        nodes, nodes_mut: Node => Nodes, Node::index_for_lump;
        leaves, leaves_mut: Leaf => Leaves, Leaf::index_for_lump;
        models, models_mut: Model => Models, Model::index_for_lump;
        disp_infos, disp_infos_mut: DispInfo => DispInfos, DispInfo::index_for_lump;
        disp_vertices, disp_vertices_mut: DispVertex => DispVertices, DispVertex::index_for_lump;
        cubemaps, cubemaps_mut: Cubemap => Cubemaps, Cubemap::index_for_lump;
    }

    number_lumps! {
        /// Face indices referenced by leaves.
        mark_surfaces, mark_surfaces_mut => MarkSurfaces, index_for_mark_surfaces_lump;
        surf_edges, surf_edges_mut => SurfEdges, index_for_surf_edges_lump;
        mark_brushes, mark_brushes_mut => MarkBrushes, index_for_mark_brushes_lump;
        indices, indices_mut => Indices, index_for_indices_lump;
        tex_table, tex_table_mut => TexTable, index_for_tex_table_lump;
        displacement_triangles, displacement_triangles_mut => DisplacementTriangles, index_for_displacement_triangles_lump;
    }
}

impl fmt::Debug for Bsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bsp")
            .field("format", &self.format)
            .field("endian", &self.endian)
            .field("len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod bsp_file_tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        bsp::{
            consts::SOURCE_HEADER_SIZE,
            header::header_tests::{quake_header, source_header},
            static_prop::static_prop_tests::sprp,
        },
        ensure_env_logger_initialized,
    };

    fn plane(normal: [f32; 3], distance: f32, ty: i32) -> Vec<u8> {
        let mut out = Vec::new();
        for v in normal {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&distance.to_le_bytes());
        out.extend_from_slice(&ty.to_le_bytes());
        out
    }

    /// A Quake file whose only lump is one plane.
    fn quake_file() -> Vec<u8> {
        let mut data = quake_header(&[(1, 124, 20)]);
        data.extend(plane([0.0, 0.0, 1.0], 64.0, 2));
        data
    }

    struct SourceFile {
        data: Vec<u8>,
        lumps: Vec<(usize, i32, i32, i32)>,
        body: Vec<u8>,
    }

    impl SourceFile {
        fn new() -> Self {
            Self {
                data: Vec::new(),
                lumps: Vec::new(),
                body: Vec::new(),
            }
        }

        fn offset(&self) -> usize {
            SOURCE_HEADER_SIZE + self.body.len()
        }

        fn lump(mut self, index: usize, version: i32, bytes: &[u8]) -> Self {
            let ofs = self.offset() as i32;
            self.lumps.push((index, ofs, bytes.len() as i32, version));
            self.body.extend_from_slice(bytes);
            self
        }

        /// Game lump holding one `sprp` entry.
        fn game_lump(self, sprp_version: i32, sprp: &[u8]) -> Self {
            let start = self.offset();
            let mut bytes = 1i32.to_le_bytes().to_vec();
            bytes.extend_from_slice(&i32::from_be_bytes(*b"sprp").to_le_bytes());
            bytes.extend_from_slice(&0u16.to_le_bytes());
            bytes.extend_from_slice(&(sprp_version as u16).to_le_bytes());
            bytes.extend_from_slice(&((start + 20) as i32).to_le_bytes());
            bytes.extend_from_slice(&(sprp.len() as i32).to_le_bytes());
            bytes.extend_from_slice(sprp);
            self.lump(35, 0, &bytes)
        }

        fn build(mut self) -> Vec<u8> {
            self.data = source_header(20, &self.lumps);
            self.data.extend_from_slice(&self.body);
            self.data
        }
    }

    #[test]
    fn quake_planes() {
        ensure_env_logger_initialized();
        let bsp = Bsp::load(quake_file()).unwrap();
        assert_eq!(bsp.format(), MapType::Quake);
        assert!(!bsp.is_big_endian());

        let planes = bsp.planes().unwrap();
        assert_eq!(planes.len(), 1);
        let plane = planes.get(0).unwrap();
        assert_eq!(plane.normal(), Vec3::Z);
        assert_eq!(plane.distance(), 64.0);
        assert_eq!(plane.plane_type(), 2);
    }

    #[test]
    fn cache_law() {
        ensure_env_logger_initialized();
        let mut bsp = Bsp::load(quake_file()).unwrap();
        assert!(!bsp.is_resolved(LumpRole::Planes));
        {
            let a = bsp.planes().unwrap();
            let b = bsp.planes().unwrap();
            assert!(bsp.is_resolved(LumpRole::Planes));
            assert_eq!(a.as_bytes().as_ptr(), b.as_bytes().as_ptr());
            assert_eq!(a.as_bytes().len(), b.as_bytes().len());
        }

        bsp.planes_mut()
            .unwrap()
            .get_mut(0)
            .unwrap()
            .set_distance(-8.0);
        assert_eq!(bsp.planes().unwrap().get(0).unwrap().distance(), -8.0);
        assert_eq!(&bsp.lump_bytes(1).unwrap()[12..16], &(-8.0f32).to_le_bytes());
    }

    #[test]
    fn unsupported_roles() {
        ensure_env_logger_initialized();
        let bsp = Bsp::load(quake_file()).unwrap();
        assert_eq!(
            bsp.disp_infos().unwrap_err(),
            BspError::UnsupportedFormat {
                kind: "DispInfo",
                format: MapType::Quake
            }
        );
        assert!(matches!(
            bsp.static_props(),
            Err(BspError::UnsupportedFormat { kind: "StaticProp", .. })
        ));
        assert!(matches!(
            bsp.game_lump(),
            Err(BspError::UnsupportedFormat { kind: "GameLump", .. })
        ));
        assert!(!bsp.is_resolved(LumpRole::DispInfos));
    }

    #[test]
    fn lump_overrunning_file() {
        ensure_env_logger_initialized();
        let mut data = quake_header(&[(1, 124, 40)]);
        data.extend(plane([1.0, 0.0, 0.0], 0.0, 0));
        let bsp = Bsp::load(data).unwrap();
        assert!(matches!(
            bsp.planes(),
            Err(BspError::MalformedLump { lump: "Plane", .. })
        ));
        assert!(bsp.lump_bytes(1).is_err());
        assert!(matches!(
            bsp.lump_bytes(15),
            Err(BspError::InvalidLumpIndex { index: 15, .. })
        ));
    }

    #[test]
    fn failure_is_isolated_and_not_cached() {
        ensure_env_logger_initialized();
        let data = SourceFile::new()
            .lump(1, 0, &plane([0.0, 1.0, 0.0], 16.0, 1))
            .lump(7, 0, &[0u8; 57])
            .build();
        let bsp = Bsp::load(data).unwrap();

        let first = bsp.faces().unwrap_err();
        assert!(matches!(first, BspError::MalformedLump { lump: "Face", .. }));
        assert!(!bsp.is_resolved(LumpRole::Faces));
        assert_eq!(bsp.faces().unwrap_err(), first);

        assert_eq!(bsp.planes().unwrap().get(0).unwrap().normal(), Vec3::Y);
        assert!(bsp.is_resolved(LumpRole::Planes));
    }

    #[test]
    fn face_edge_run() {
        ensure_env_logger_initialized();
        let mut face = vec![0u8; 56];
        face[8..10].copy_from_slice(&3u16.to_le_bytes());
        let data = SourceFile::new()
            .lump(7, 0, &face)
            .lump(12, 0, &[0u8; 130 * 4])
            .lump(13, 0, &[0u8; 130 * 4])
            .build();
        let mut bsp = Bsp::load(data).unwrap();
        assert_eq!(bsp.format(), MapType::Source20);

        bsp.faces_mut()
            .unwrap()
            .get_mut(0)
            .unwrap()
            .set_first_edge(120);
        let faces = bsp.faces().unwrap();
        let face = faces.get(0).unwrap();
        assert_eq!(face.first_edge(), 120);
        let run = face.edge_range().unwrap();
        assert_eq!(run, 120..123);
        assert!(run.end <= bsp.edges().unwrap().len());
        assert!(run.end <= bsp.surf_edges().unwrap().len());
    }

    #[test]
    fn number_lists() {
        ensure_env_logger_initialized();
        let data = SourceFile::new()
            .lump(13, 0, &[5, 0, 0, 0, 0xFB, 0xFF, 0xFF, 0xFF])
            .lump(16, 0, &[1, 0, 2])
            .build();
        let mut bsp = Bsp::load(data).unwrap();

        let surf_edges = bsp.surf_edges().unwrap();
        assert_eq!(surf_edges.num_type(), NumType::Int32);
        assert_eq!(surf_edges.iter().collect::<Vec<_>>(), [5, -5]);

        bsp.surf_edges_mut().unwrap().set(1, -9).unwrap();
        assert_eq!(bsp.surf_edges().unwrap().get(1), Ok(-9));

        assert!(matches!(
            bsp.mark_surfaces(),
            Err(BspError::MalformedLump { lump: "NumList", .. })
        ));
        assert!(matches!(
            bsp.indices(),
            Err(BspError::UnsupportedFormat { kind: "NumList", .. })
        ));
    }

    #[test]
    fn texture_names_per_family() {
        ensure_env_logger_initialized();
        let mut miptex = vec![0u8; 12 + 16];
        miptex[0..4].copy_from_slice(&2i32.to_le_bytes());
        miptex[4..8].copy_from_slice(&12i32.to_le_bytes());
        miptex[8..12].copy_from_slice(&(-1i32).to_le_bytes());
        miptex[12..19].copy_from_slice(b"*water1");
        let mut data = quake_header(&[(2, 124, miptex.len() as i32)]);
        data.extend(miptex);
        let bsp = Bsp::load(data).unwrap();
        assert_eq!(bsp.texture_names().unwrap(), ["*water1", ""]);

        let strings = b"DEV/DEV_MEASUREGENERIC01\0TOOLS/TOOLSSKYBOX\0";
        let mut table = 25i32.to_le_bytes().to_vec();
        table.extend_from_slice(&0i32.to_le_bytes());
        let data = SourceFile::new()
            .lump(43, 0, strings)
            .lump(44, 0, &table)
            .build();
        let bsp = Bsp::load(data).unwrap();
        assert_eq!(
            bsp.texture_names().unwrap(),
            ["TOOLS/TOOLSSKYBOX", "DEV/DEV_MEASUREGENERIC01"]
        );

        let data = SourceFile::new()
            .lump(43, 0, b"NODRAW\0")
            .lump(44, 0, &64i32.to_le_bytes())
            .build();
        assert!(matches!(
            Bsp::load(data).unwrap().texture_names(),
            Err(BspError::MalformedLump { lump: "texdata string data", .. })
        ));
    }

    #[test]
    fn static_props_through_game_lump() {
        ensure_env_logger_initialized();
        let props = sprp(&["models/a.mdl", "models/b.mdl"], &[7, 9], 2, 5);
        let data = SourceFile::new()
            .lump(1, 0, &plane([0.0, 0.0, 1.0], 0.0, 2))
            .game_lump(5, &props)
            .build();
        let mut bsp = Bsp::load(data).unwrap();

        {
            let game = bsp.game_lump().unwrap();
            assert_eq!(game.lookup(GameLumpTag::STATIC_PROPS).unwrap(), &props[..]);
            assert_eq!(game.entry(GameLumpTag::STATIC_PROPS).unwrap().version, 5);
            assert!(matches!(
                game.lookup(GameLumpTag::DETAIL_PROPS),
                Err(BspError::NotFound(_))
            ));
        }

        {
            let props = bsp.static_props().unwrap();
            assert_eq!(props.version(), 5);
            assert_eq!(props.leaves.iter().collect::<Vec<_>>(), [7, 9]);
            assert_eq!(props.props.len(), 2);
            let prop = props.props.get(1).unwrap();
            assert_eq!(props.model_name(&prop), Some("models/b.mdl"));
        }
        assert!(bsp.is_resolved(LumpRole::GameLump));

        bsp.static_props_mut()
            .unwrap()
            .get_mut(0)
            .unwrap()
            .set_origin(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            bsp.static_props().unwrap().props.get(0).unwrap().origin(),
            Vec3::new(1.0, 2.0, 3.0)
        );

        bsp.game_lump_mut()
            .unwrap()
            .lookup_mut(GameLumpTag::STATIC_PROPS)
            .unwrap()[0] = 3;
        assert_eq!(bsp.static_props().unwrap().names.len(), 2);
    }

    #[test]
    fn missing_static_props() {
        ensure_env_logger_initialized();
        let data = SourceFile::new().lump(35, 0, &0i32.to_le_bytes()).build();
        let bsp = Bsp::load(data).unwrap();
        assert!(bsp.game_lump().unwrap().directory().is_empty());
        assert_eq!(
            bsp.static_props().unwrap_err(),
            BspError::NotFound(GameLumpTag::STATIC_PROPS)
        );
    }

    #[test]
    fn forced_format() {
        ensure_env_logger_initialized();
        let data = SourceFile::new().build();
        let bsp = Bsp::load_with(data, LoadOptions::default().with_format(MapType::Vindictus))
            .unwrap();
        assert_eq!(bsp.format(), MapType::Vindictus);
        assert_eq!(bsp.endian(), Endian::Little);

        assert_eq!(
            Bsp::load(b"NOPE\0\0\0\0".to_vec()).unwrap_err(),
            BspError::UnrecognizedFileFormat(*b"NOPE")
        );
    }

    #[test]
    fn custom_reader() {
        struct OneLump;

        impl BspReader for OneLump {
            fn format(&self) -> MapType {
                MapType::Quake2
            }

            fn is_big_endian(&self) -> bool {
                false
            }

            fn lump_info(&self, index: usize) -> Result<LumpInfo> {
                match index {
                    1 => Ok(LumpInfo {
                        offset: 0,
                        length: 20,
                        version: 0,
                        ident: [0; 4],
                    }),
                    _ => Err(BspError::InvalidLumpIndex {
                        index,
                        format: MapType::Quake2,
                    }),
                }
            }
        }

        ensure_env_logger_initialized();
        let bsp = Bsp::with_reader(plane([1.0, 0.0, 0.0], 4.0, 0), OneLump);
        assert_eq!(bsp.planes().unwrap().get(0).unwrap().distance(), 4.0);
        assert!(matches!(
            bsp.edges(),
            Err(BspError::InvalidLumpIndex { index: 11, .. })
        ));
    }
}
