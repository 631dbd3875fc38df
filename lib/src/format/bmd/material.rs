//! Decoded MAT3 material state.
//!
//! Fixed-size sub-records that are stored verbatim in the material tables
//! are read straight into these types with `binrw`; everything derived from
//! several tables is assembled by [`super::mat3`].

use std::f32::consts::PI;

use binrw::binread;
use glam::{Mat4, Vec2, Vec3};
use serde_derive::Serialize;

use crate::format::{
    bmd::common::Color,
    gx::{
        AlphaOp, AttenuationFunction, BlendFactor, BlendMode, ColorChannelId, ColorSrc,
        CombineAlphaInput, CombineColorInput, CompareType, CullMode, DiffuseFunction, FogType,
        IndTexAlphaSel, IndTexBiasSel, IndTexFormat, IndTexMtxId, IndTexScale, IndTexStageId,
        IndTexWrap, KonstAlphaSel, KonstColorSel, LogicOp, PostTexGenMatrix, RasColorChannelId,
        Register, TevBias, TevColorChan, TevOp, TevScale, TexCoordId, TexGenMatrix, TexGenSrc,
        TexGenType, TexMapId, TexMatrixProjection, TexMtxMapMode,
    },
};

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum MaterialMode {
    Opaque = 1,
    /// Alpha-tested ("tex edge").
    Edge = 2,
    Translucent = 4,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ColorChannelControl {
    pub lighting_enabled: bool,
    pub mat_color_source: ColorSrc,
    pub amb_color_source: ColorSrc,
    pub lit_mask: u8,
    pub diffuse_function: DiffuseFunction,
    pub attenuation_function: AttenuationFunction,
}

impl Default for ColorChannelControl {
    fn default() -> Self {
        Self {
            lighting_enabled: false,
            mat_color_source: ColorSrc::Register,
            amb_color_source: ColorSrc::Register,
            lit_mask: 0,
            diffuse_function: DiffuseFunction::Clamp,
            attenuation_function: AttenuationFunction::None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LightChannel {
    pub color: ColorChannelControl,
    pub alpha: ColorChannelControl,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TexGen {
    pub kind: TexGenType,
    pub source: TexGenSrc,
    pub matrix: TexGenMatrix,
    pub normalize: bool,
    pub post_matrix: PostTexGenMatrix,
}

/// Which SRT composition a texture matrix uses.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexMatrixCalc {
    Maya,
    Standard,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TexMatrixSrt {
    pub center: Vec3,
    pub scale: Vec2,
    /// In half turns.
    pub rotation: f32,
    pub translation: Vec2,
}

impl TexMatrixSrt {
    pub fn matrix(&self, calc: TexMatrixCalc) -> Mat4 {
        match calc {
            TexMatrixCalc::Maya => self.maya_matrix(),
            TexMatrixCalc::Standard => self.standard_matrix(),
        }
    }

    /// Maya's texture placement: rotation about (0.5, 0.5) with V flipped.
    pub fn maya_matrix(&self) -> Mat4 {
        let theta = self.rotation * PI;
        let (sin, cos) = theta.sin_cos();
        let (s, t) = (self.scale, self.translation);
        let mut m = Mat4::IDENTITY.to_cols_array_2d();
        m[0][0] = s.x * cos;
        m[1][0] = s.x * sin;
        m[3][0] = s.x * ((-0.5 * cos) - (0.5 * sin - 0.5) - t.x);
        m[0][1] = s.y * -sin;
        m[1][1] = s.y * cos;
        m[3][1] = s.y * ((-0.5 * cos) + (0.5 * sin - 0.5) + t.y) + 1.0;
        Mat4::from_cols_array_2d(&m)
    }

    /// Scale and rotate about `center`, then translate.
    pub fn standard_matrix(&self) -> Mat4 {
        let theta = self.rotation * PI;
        let (sin, cos) = theta.sin_cos();
        let (s, t, c) = (self.scale, self.translation, self.center);
        let mut m = Mat4::IDENTITY.to_cols_array_2d();
        m[0][0] = s.x * cos;
        m[1][0] = s.x * -sin;
        m[3][0] = t.x + c.x - (m[0][0] * c.x + m[1][0] * c.y);
        m[0][1] = s.y * sin;
        m[1][1] = s.y * cos;
        // m01 weights the S centre so (cS, cT) maps to itself plus translation
        m[3][1] = t.y + c.y - (m[0][1] * c.x + m[1][1] * c.y);
        Mat4::from_cols_array_2d(&m)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TexMatrix {
    pub projection: TexMatrixProjection,
    pub info: u8,
    pub map_mode: TexMtxMapMode,
    pub calc: TexMatrixCalc,
    pub srt: TexMatrixSrt,
    /// Supplied by the game at runtime for environment and projection maps.
    pub effect_matrix: Mat4,
    pub matrix: Mat4,
}

/// Color and alpha combiner settings of one TEV stage (0x14 bytes).
#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TevCombine {
    #[br(temp)]
    _unk0: u8,
    pub color_in: [CombineColorInput; 4],
    pub color_op: TevOp,
    pub color_bias: TevBias,
    pub color_scale: TevScale,
    #[br(map = |v: u8| v != 0)]
    pub color_clamp: bool,
    pub color_reg: Register,
    pub alpha_in: [CombineAlphaInput; 4],
    pub alpha_op: TevOp,
    pub alpha_bias: TevBias,
    pub alpha_scale: TevScale,
    #[br(map = |v: u8| v != 0)]
    pub alpha_clamp: bool,
    pub alpha_reg: Register,
    #[br(temp)]
    _unk1: u8,
}

#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TevOrder {
    pub tex_coord: TexCoordId,
    pub tex_map: TexMapId,
    #[br(map = |c: ColorChannelId| RasColorChannelId::from(c))]
    pub channel: RasColorChannelId,
    #[br(temp, assert(pad == 0xFF, "TEV order pad {:#04X}", pad))]
    pad: u8,
}

#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SwapTable {
    pub r: TevColorChan,
    pub g: TevColorChan,
    pub b: TevColorChan,
    pub a: TevColorChan,
}

impl Default for SwapTable {
    fn default() -> Self {
        Self { r: TevColorChan::R, g: TevColorChan::G, b: TevColorChan::B, a: TevColorChan::A }
    }
}

/// Per-stage indirect texturing parameters (0x0C bytes).
#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TevIndirect {
    pub stage: IndTexStageId,
    pub format: IndTexFormat,
    pub bias_sel: IndTexBiasSel,
    pub matrix: IndTexMtxId,
    pub wrap_s: IndTexWrap,
    pub wrap_t: IndTexWrap,
    #[br(map = |v: u8| v != 0)]
    pub add_prev: bool,
    #[br(map = |v: u8| v != 0)]
    pub use_orig_lod: bool,
    pub alpha_sel: IndTexAlphaSel,
}

impl Default for TevIndirect {
    fn default() -> Self {
        Self {
            stage: IndTexStageId::Stage0,
            format: IndTexFormat::Bits8,
            bias_sel: IndTexBiasSel::None,
            matrix: IndTexMtxId::Off,
            wrap_s: IndTexWrap::Off,
            wrap_t: IndTexWrap::Off,
            add_prev: false,
            use_orig_lod: false,
            alpha_sel: IndTexAlphaSel::Off,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TevStage {
    pub combine: TevCombine,
    pub order: TevOrder,
    pub konst_color_sel: KonstColorSel,
    pub konst_alpha_sel: KonstAlphaSel,
    pub ras_swap_table: SwapTable,
    pub tex_swap_table: SwapTable,
    pub indirect: TevIndirect,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndTexStage {
    pub tex_coord: TexCoordId,
    pub tex_map: TexMapId,
    pub scale_s: IndTexScale,
    pub scale_t: IndTexScale,
}

/// Indirect texture matrix (0x1C bytes): 2x3 matrix and power-of-two scale.
#[binread]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndTexMatrix {
    pub m: [f32; 6],
    pub exponent: i8,
}

impl IndTexMatrix {
    /// `[p00, p01, p02, scale, p10, p11, p12, 0]`, each entry pre-multiplied
    /// by `2^exponent`.
    pub fn coefficients(&self) -> [f32; 8] {
        let s = 2f32.powi(self.exponent as i32);
        let m = self.m;
        [m[0] * s, m[1] * s, m[2] * s, s, m[3] * s, m[4] * s, m[5] * s, 0.0]
    }
}

#[binread]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AlphaTest {
    pub compare_a: CompareType,
    #[br(map = |v: u8| v as f32 / 255.0)]
    pub reference_a: f32,
    pub op: AlphaOp,
    pub compare_b: CompareType,
    #[br(map = |v: u8| v as f32 / 255.0)]
    pub reference_b: f32,
}

#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BlendInfo {
    pub mode: BlendMode,
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub logic_op: LogicOp,
}

#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DepthMode {
    #[br(map = |v: u8| v != 0)]
    pub test: bool,
    pub func: CompareType,
    #[br(map = |v: u8| v != 0)]
    pub write: bool,
}

/// Raster output state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RopInfo {
    pub fog_type: FogType,
    pub fog_adj_enabled: bool,
    pub depth_test: bool,
    pub depth_func: CompareType,
    pub depth_write: bool,
    pub blend_mode: BlendMode,
    pub blend_src_factor: BlendFactor,
    pub blend_dst_factor: BlendFactor,
    pub blend_logic_op: LogicOp,
    pub color_update: bool,
    pub alpha_update: bool,
}

/// Fog record as stored (0x2C bytes).
#[binread]
#[derive(Copy, Clone, Debug)]
pub(super) struct SFogInfo {
    pub fog_type: FogType,
    #[br(map = |v: u8| v != 0)]
    pub adj_enabled: bool,
    pub adj_center: u16,
    pub start_z: f32,
    pub end_z: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub color: [u8; 4],
    pub adj_table: [u16; 10],
}

/// `[A, B, C]` for orthographic projection.
pub fn orthographic_fog(start: f32, end: f32, near: f32, far: f32) -> [f32; 3] {
    [(far - near) / (end - start), 0.0, (start - near) / (end - start)]
}

/// `[A, B, C]` for perspective projection.
pub fn perspective_fog(start: f32, end: f32, near: f32, far: f32) -> [f32; 3] {
    [(far * near) / ((far - near) * (end - start)), far / (far - near), start / (end - start)]
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FogBlock {
    pub fog_type: FogType,
    pub adj_enabled: bool,
    pub adj_center: u16,
    pub start_z: f32,
    pub end_z: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub color: Color,
    pub adj_table: [u16; 10],
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl From<SFogInfo> for FogBlock {
    fn from(info: SFogInfo) -> Self {
        let range = (info.start_z, info.end_z, info.near_z, info.far_z);
        let [a, b, c] = if info.fog_type.is_orthographic() {
            orthographic_fog(range.0, range.1, range.2, range.3)
        } else {
            perspective_fog(range.0, range.1, range.2, range.3)
        };
        Self {
            fog_type: info.fog_type,
            adj_enabled: info.adj_enabled,
            adj_center: info.adj_center,
            start_z: info.start_z,
            end_z: info.end_z,
            near_z: info.near_z,
            far_z: info.far_z,
            color: Color::from_rgba8(info.color),
            adj_table: info.adj_table,
            a,
            b,
            c,
        }
    }
}

/// Fixed-function GX pipeline state of a material.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GxMaterial {
    pub cull_mode: CullMode,
    pub light_channels: Vec<LightChannel>,
    pub tex_gens: Vec<TexGen>,
    pub tev_stages: Vec<TevStage>,
    pub ind_tex_stages: Vec<IndTexStage>,
    pub alpha_test: AlphaTest,
    pub rop_info: RopInfo,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Material {
    pub index: usize,
    pub name: String,
    pub mode: MaterialMode,
    pub translucent: bool,
    /// Texture slots into TEX1's sampler list.
    pub texture_indices: [Option<u16>; 8],
    /// Slots 8 and 9 are always `None`.
    pub tex_matrices: [Option<TexMatrix>; 10],
    pub ind_tex_matrices: Vec<[f32; 8]>,
    pub gx: GxMaterial,
    pub color_mat_regs: [Color; 2],
    pub color_amb_regs: [Color; 2],
    pub color_constants: [Color; 4],
    pub color_registers: [Color; 4],
    pub fog: FogBlock,
}
