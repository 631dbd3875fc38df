use binrw::binread;
use glam::{Mat4, Vec2, Vec3};
use serde_derive::Serialize;

use crate::{
    ensure_format,
    format::{
        bmd::{
            common::{
                read_rgba16, read_rgba8, read_string_table, table_name, Color, RemapTable,
            },
            material::{
                AlphaTest, BlendInfo, ColorChannelControl, DepthMode, FogBlock, GxMaterial,
                IndTexMatrix, IndTexStage, LightChannel, Material, MaterialMode, RopInfo,
                SFogInfo, SwapTable, TevCombine, TevIndirect, TevOrder, TevStage, TexGen,
                TexMatrix, TexMatrixCalc, TexMatrixSrt,
            },
        },
        error::Result,
        gx::{
            AttenuationFunction, ColorSrc, CullMode, DiffuseFunction, IndTexScale, KonstAlphaSel,
            KonstColorSel, PostTexGenMatrix, TexCoordId, TexGenMatrix, TexGenSrc, TexGenType,
            TexMapId, TexMatrixProjection, TexMtxMapMode,
        },
    },
    util::cursor::ByteCursor,
};

const MATERIAL_ENTRY_SIZE: u64 = 0x14C;
const INDIRECT_ENTRY_SIZE: u64 = 0x138;

/// MAT3 header: material count followed by table offsets relative to the
/// section start. Tables the decoder has no use for are kept for layout only.
#[binread]
#[derive(Clone, Debug)]
struct SMat3Header {
    count: u16,
    #[br(temp)]
    _pad: u16,
    entry_table: u32,
    remap_table: u32,
    name_table: u32,
    indirect_table: u32,
    cull_mode_table: u32,
    mat_color_table: u32,
    color_chan_count_table: u32,
    color_chan_table: u32,
    amb_color_table: u32,
    _light_table: u32,
    _tex_gen_count_table: u32,
    tex_gen_table: u32,
    post_tex_gen_table: u32,
    tex_mtx_table: u32,
    _post_tex_mtx_table: u32,
    texture_table: u32,
    tev_order_table: u32,
    color_register_table: u32,
    konst_color_table: u32,
    _tev_count_table: u32,
    tev_stage_table: u32,
    swap_mode_table: u32,
    swap_table_table: u32,
    fog_table: u32,
    alpha_test_table: u32,
    blend_table: u32,
    z_mode_table: u32,
    _z_compare_table: u32,
    _dither_table: u32,
    _nbt_scale_table: u32,
}

/// Material entry header bytes after the mode.
#[binread]
#[derive(Copy, Clone, Debug)]
struct SMaterialIndices {
    mode: MaterialMode,
    cull_mode: u8,
    color_chan_count: u8,
    #[br(temp)]
    _tex_gen_count: u8,
    #[br(temp)]
    _tev_count: u8,
    #[br(temp)]
    _z_compare: u8,
    z_mode: u8,
    #[br(temp)]
    _dither: u8,
}

#[binread]
#[derive(Copy, Clone, Debug)]
struct STexGen {
    kind: TexGenType,
    source: TexGenSrc,
    matrix: u8,
    #[br(temp, assert(pad == 0xFF, "texgen pad {:#04X}", pad))]
    pad: u8,
}

#[binread]
#[derive(Copy, Clone, Debug)]
struct STexMatrix {
    projection: TexMatrixProjection,
    info: u8,
    #[br(temp, assert(sentinel0 == 0xFFFF, "texture matrix sentinel {:#06X}", sentinel0))]
    sentinel0: u16,
    center: [f32; 3],
    scale: [f32; 2],
    rotation: i16,
    #[br(temp, assert(sentinel1 == 0xFFFF, "texture matrix sentinel {:#06X}", sentinel1))]
    sentinel1: u16,
    translation: [f32; 2],
    effect_matrix: [f32; 16],
}

#[binread]
#[derive(Copy, Clone, Debug)]
struct SColorChannelControl {
    #[br(map = |v: u8| v != 0)]
    lighting_enabled: bool,
    mat_color_source: ColorSrc,
    lit_mask: u8,
    diffuse_function: DiffuseFunction,
    attenuation: u8,
    amb_color_source: ColorSrc,
}

/// Materials in logical (remapped) order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Mat3 {
    pub materials: Vec<Material>,
}

/// Resolves table offsets against the section start.
struct Tables {
    start: u64,
    header: SMat3Header,
}

impl Tables {
    #[inline]
    fn at(&self, table: u32, index: u64, stride: u64) -> u64 {
        self.start + table as u64 + index * stride
    }

    /// Sections without indirect data point the indirect table at the name table.
    #[inline]
    fn has_indirect(&self) -> bool { self.header.indirect_table != self.header.name_table }
}

impl Mat3 {
    pub fn read(cur: &mut ByteCursor, start: u64, _size: u64) -> Result<Self> {
        let header = cur.read_record_at::<SMat3Header>(start + 0x08)?;
        let tables = Tables { start, header };
        let h = &tables.header;

        let remap = RemapTable::read(cur, tables.at(h.remap_table, 0, 0), h.count)?;
        let names = read_string_table(cur, tables.at(h.name_table, 0, 0))?;
        let mut materials = Vec::with_capacity(h.count as usize);
        for i in 0..h.count as usize {
            let name = table_name(cur, &names, i)?;
            let entry = tables.at(h.entry_table, remap.storage_index(i), MATERIAL_ENTRY_SIZE);
            let material = read_material(cur, &tables, i, name, entry)?;
            log::debug!(
                "MAT3: {} {:?}, {} TEV stages, {} texgens",
                material.name,
                material.mode,
                material.gx.tev_stages.len(),
                material.gx.tex_gens.len()
            );
            materials.push(material);
        }
        Ok(Self { materials })
    }
}

fn read_material(
    cur: &mut ByteCursor,
    tables: &Tables,
    index: usize,
    name: String,
    entry: u64,
) -> Result<Material> {
    let h = &tables.header;
    let indices = cur.read_record_at::<SMaterialIndices>(entry)?;

    let mut color_mat_regs = [Color::WHITE; 2];
    let mut color_amb_regs = [Color::WHITE; 2];
    for j in 0..2 {
        color_mat_regs[j] = read_indexed_color(
            cur,
            entry + 0x08 + j as u64 * 2,
            tables.at(h.mat_color_table, 0, 0),
            4,
            read_rgba8,
            Color::WHITE,
        )?;
        color_amb_regs[j] = read_indexed_color(
            cur,
            entry + 0x14 + j as u64 * 2,
            tables.at(h.amb_color_table, 0, 0),
            4,
            read_rgba8,
            Color::WHITE,
        )?;
    }

    cur.seek(tables.at(h.color_chan_count_table, indices.color_chan_count as u64, 1))?;
    let channel_count = cur.read_u8()?;
    ensure_format!(cur, channel_count <= 2, "{channel_count} light channels");
    let mut light_channels = Vec::with_capacity(channel_count as usize);
    for j in 0..channel_count as u64 {
        let color = read_channel_control(cur, tables, entry + 0x0C + j * 4)?;
        let alpha = read_channel_control(cur, tables, entry + 0x0E + j * 4)?;
        light_channels.push(LightChannel { color, alpha });
    }

    let mut tex_gens = Vec::new();
    for j in 0..8 {
        cur.seek(entry + 0x28 + j as u64 * 2)?;
        let tex_gen_index = cur.read_i16()?;
        if tex_gen_index < 0 {
            continue;
        }
        let record_at = tables.at(h.tex_gen_table, tex_gen_index as u64, 4);
        let record = cur.read_record_at::<STexGen>(record_at)?;
        let matrix = TexGenMatrix::for_slot(j);
        let stored = TexGenMatrix(record.matrix);
        if stored != matrix && stored != TexGenMatrix::IDENTITY {
            return Err(cur.invariant_at(
                record_at + 2,
                format!("texgen {j} uses matrix {} instead of {}", stored.0, matrix.0),
            ));
        }

        let mut post_matrix = PostTexGenMatrix::PTIDENTITY;
        cur.seek(entry + 0x38 + j as u64 * 2)?;
        let post_index = cur.read_i16()?;
        if h.post_tex_gen_table != 0 && post_index >= 0 {
            let post = cur
                .read_record_at::<STexGen>(tables.at(h.post_tex_gen_table, post_index as u64, 4))?;
            post_matrix = PostTexGenMatrix(post.matrix);
            ensure_format!(cur, post_matrix.is_valid(), "invalid post texgen matrix {}", post.matrix);
        }
        tex_gens.push(TexGen {
            kind: record.kind,
            source: record.source,
            matrix,
            normalize: false,
            post_matrix,
        });
    }

    let mut tex_matrices: [Option<TexMatrix>; 10] = Default::default();
    for (j, slot) in tex_matrices.iter_mut().enumerate() {
        cur.seek(entry + 0x48 + j as u64 * 2)?;
        let tex_mtx_index = cur.read_i16()?;
        if h.tex_mtx_table == 0 || tex_mtx_index < 0 {
            continue;
        }
        *slot = Some(read_tex_matrix(cur, tables.at(h.tex_mtx_table, tex_mtx_index as u64, 0x64))?);
    }
    if tex_matrices[8].is_some() || tex_matrices[9].is_some() {
        return Err(cur.invariant_at(entry + 0x58, "texture matrix in slot 8 or 9".to_string()));
    }

    let mut texture_indices = [None; 8];
    for (j, slot) in texture_indices.iter_mut().enumerate() {
        cur.seek(entry + 0x84 + j as u64 * 2)?;
        let texture_index = cur.read_u16()?;
        if texture_index == 0xFFFF {
            continue;
        }
        cur.seek(tables.at(h.texture_table, texture_index as u64, 2))?;
        *slot = Some(cur.read_u16()?);
    }

    let mut color_constants = [Color::WHITE; 4];
    let mut color_registers = [Color::TRANSPARENT; 4];
    for j in 0..4 {
        color_constants[j] = read_indexed_color(
            cur,
            entry + 0x94 + j as u64 * 2,
            tables.at(h.konst_color_table, 0, 0),
            4,
            read_rgba8,
            Color::WHITE,
        )?;
        color_registers[j] = read_indexed_color(
            cur,
            entry + 0xDC + j as u64 * 2,
            tables.at(h.color_register_table, 0, 0),
            8,
            read_rgba16,
            Color::TRANSPARENT,
        )?;
    }

    // The indirect table is indexed by logical material index.
    let indirect_entry = tables.at(h.indirect_table, index as u64, INDIRECT_ENTRY_SIZE);
    let mut ind_tex_stages = Vec::new();
    let mut ind_tex_matrices = Vec::new();
    if tables.has_indirect() {
        cur.seek(indirect_entry)?;
        let enabled = cur.read_u8()?;
        ensure_format!(cur, enabled <= 1, "indirect flag {enabled}");
        let stage_count = cur.read_u8()?;
        ensure_format!(cur, stage_count <= 4, "{stage_count} indirect stages");
        for j in 0..stage_count as u64 {
            cur.seek(indirect_entry + 0x04 + j * 4)?;
            let tex_coord = cur.read_record::<TexCoordId>()?;
            let tex_map = cur.read_record::<TexMapId>()?;
            cur.seek(indirect_entry + 0x68 + j * 4)?;
            let scale_s = cur.read_record::<IndTexScale>()?;
            let scale_t = cur.read_record::<IndTexScale>()?;
            ind_tex_stages.push(IndTexStage { tex_coord, tex_map, scale_s, scale_t });
            if j < 3 {
                let m = cur.read_record_at::<IndTexMatrix>(indirect_entry + 0x14 + j * 0x1C)?;
                ind_tex_matrices.push(m.coefficients());
            }
        }
    }

    let mut tev_stages = Vec::new();
    for j in 0..16u64 {
        cur.seek(entry + 0xE4 + j * 2)?;
        let stage_index = cur.read_i16()?;
        if stage_index < 0 {
            continue;
        }
        let combine =
            cur.read_record_at::<TevCombine>(tables.at(h.tev_stage_table, stage_index as u64, 0x14))?;
        cur.seek(entry + 0xBC + j * 2)?;
        let order_index = cur.read_u16()?;
        let order = cur.read_record_at::<TevOrder>(tables.at(h.tev_order_table, order_index as u64, 4))?;
        let konst_color_sel = cur.read_record_at::<KonstColorSel>(entry + 0x9C + j)?;
        let konst_alpha_sel = cur.read_record_at::<KonstAlphaSel>(entry + 0xAC + j)?;

        cur.seek(entry + 0x104 + j * 2)?;
        let swap_mode_index = cur.read_u16()?;
        cur.seek(tables.at(h.swap_mode_table, swap_mode_index as u64, 4))?;
        let ras_sel = cur.read_u8()?;
        let tex_sel = cur.read_u8()?;
        ensure_format!(cur, ras_sel < 4 && tex_sel < 4, "swap selection {ras_sel}/{tex_sel}");
        let ras_swap_table = read_swap_table(cur, tables, entry, ras_sel)?;
        let tex_swap_table = read_swap_table(cur, tables, entry, tex_sel)?;

        let indirect = if tables.has_indirect() {
            cur.read_record_at::<TevIndirect>(indirect_entry + 0x78 + j * 0x0C)?
        } else {
            TevIndirect::default()
        };
        tev_stages.push(TevStage {
            combine,
            order,
            konst_color_sel,
            konst_alpha_sel,
            ras_swap_table,
            tex_swap_table,
            indirect,
        });
    }

    cur.seek(entry + 0x144)?;
    let fog_index = cur.read_u16()?;
    let alpha_test_index = cur.read_u16()?;
    let blend_index = cur.read_u16()?;
    let alpha_test =
        cur.read_record_at::<AlphaTest>(tables.at(h.alpha_test_table, alpha_test_index as u64, 8))?;
    let blend = cur.read_record_at::<BlendInfo>(tables.at(h.blend_table, blend_index as u64, 4))?;
    let cull_mode =
        cur.read_record_at::<CullMode>(tables.at(h.cull_mode_table, indices.cull_mode as u64, 4))?;
    let depth =
        cur.read_record_at::<DepthMode>(tables.at(h.z_mode_table, indices.z_mode as u64, 4))?;
    let fog = FogBlock::from(
        cur.read_record_at::<SFogInfo>(tables.at(h.fog_table, fog_index as u64, 0x2C))?,
    );

    let rop_info = RopInfo {
        fog_type: fog.fog_type,
        fog_adj_enabled: fog.adj_enabled,
        depth_test: depth.test,
        depth_func: depth.func,
        depth_write: depth.write,
        blend_mode: blend.mode,
        blend_src_factor: blend.src_factor,
        blend_dst_factor: blend.dst_factor,
        blend_logic_op: blend.logic_op,
        color_update: true,
        alpha_update: false,
    };

    Ok(Material {
        index,
        name,
        mode: indices.mode,
        translucent: indices.mode == MaterialMode::Translucent,
        texture_indices,
        tex_matrices,
        ind_tex_matrices,
        gx: GxMaterial {
            cull_mode,
            light_channels,
            tex_gens,
            tev_stages,
            ind_tex_stages,
            alpha_test,
            rop_info,
        },
        color_mat_regs,
        color_amb_regs,
        color_constants,
        color_registers,
        fog,
    })
}

/// Follows the u16 index stored at `field` into `table`. 0xFFFF selects
/// `default`.
fn read_indexed_color(
    cur: &mut ByteCursor,
    field: u64,
    table: u64,
    stride: u64,
    read: fn(&mut ByteCursor) -> Result<Color>,
    default: Color,
) -> Result<Color> {
    cur.seek(field)?;
    let index = cur.read_u16()?;
    if index == 0xFFFF {
        return Ok(default);
    }
    cur.seek(table + index as u64 * stride)?;
    read(cur)
}

fn read_channel_control(
    cur: &mut ByteCursor,
    tables: &Tables,
    field: u64,
) -> Result<ColorChannelControl> {
    cur.seek(field)?;
    let index = cur.read_u16()?;
    if index == 0xFFFF {
        return Ok(ColorChannelControl::default());
    }
    let record_at = tables.at(tables.header.color_chan_table, index as u64, 8);
    let record = cur.read_record_at::<SColorChannelControl>(record_at)?;
    let Some(attenuation_function) = AttenuationFunction::from_raw(record.attenuation) else {
        return Err(cur.invariant_at(
            record_at + 4,
            format!("unknown attenuation function {}", record.attenuation),
        ));
    };
    Ok(ColorChannelControl {
        lighting_enabled: record.lighting_enabled,
        mat_color_source: record.mat_color_source,
        amb_color_source: record.amb_color_source,
        lit_mask: record.lit_mask,
        diffuse_function: record.diffuse_function,
        attenuation_function,
    })
}

fn read_tex_matrix(cur: &mut ByteCursor, at: u64) -> Result<TexMatrix> {
    let raw = cur.read_record_at::<STexMatrix>(at)?;
    let map_mode = match TexMtxMapMode::from_repr(raw.info & 0x3F) {
        Some(
            TexMtxMapMode::ProjmapBasic
            | TexMtxMapMode::ViewProjmapBasic
            | TexMtxMapMode::Unknown04
            | TexMtxMapMode::Unknown05,
        )
        | None => {
            return Err(cur.invariant_at(
                at + 1,
                format!("unsupported texture matrix mapping mode {:#04X}", raw.info & 0x3F),
            ));
        }
        Some(mode) => mode,
    };
    let calc = if raw.info & 0x80 != 0 { TexMatrixCalc::Maya } else { TexMatrixCalc::Standard };
    let srt = TexMatrixSrt {
        center: Vec3::from(raw.center),
        scale: Vec2::from(raw.scale),
        rotation: raw.rotation as f32 / 0x7FFF as f32,
        translation: Vec2::from(raw.translation),
    };
    Ok(TexMatrix {
        projection: raw.projection,
        info: raw.info,
        map_mode,
        calc,
        srt,
        effect_matrix: Mat4::from_cols_array(&raw.effect_matrix),
        matrix: srt.matrix(calc),
    })
}

fn read_swap_table(cur: &mut ByteCursor, tables: &Tables, entry: u64, sel: u8) -> Result<SwapTable> {
    cur.seek(entry + 0x124 + sel as u64 * 2)?;
    let index = cur.read_u16()?;
    cur.read_record_at::<SwapTable>(tables.at(tables.header.swap_table_table, index as u64, 4))
}
