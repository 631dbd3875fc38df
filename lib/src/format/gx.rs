//! GX (GameCube graphics hardware) enumerations as they appear in J3D files.
//!
//! Every enum here is read as a single validated byte (or word, for
//! [`CullMode`]); a value outside the hardware's set fails the decode.

use binrw::binread;
use serde_derive::Serialize;
use strum::FromRepr;

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexGenType {
    Mtx3x4 = 0,
    Mtx2x4 = 1,
    Bump0 = 2,
    Bump1 = 3,
    Bump2 = 4,
    Bump3 = 5,
    Bump4 = 6,
    Bump5 = 7,
    Bump6 = 8,
    Bump7 = 9,
    Srtg = 10,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexGenSrc {
    Position = 0,
    Normal = 1,
    Binormal = 2,
    Tangent = 3,
    Tex0 = 4,
    Tex1 = 5,
    Tex2 = 6,
    Tex3 = 7,
    Tex4 = 8,
    Tex5 = 9,
    Tex6 = 10,
    Tex7 = 11,
    TexCoord0 = 12,
    TexCoord1 = 13,
    TexCoord2 = 14,
    TexCoord3 = 15,
    TexCoord4 = 16,
    TexCoord5 = 17,
    TexCoord6 = 18,
    Color0 = 19,
    Color1 = 20,
}

/// Texgen matrix selector (`GX_TEXMTX0..9`, `GX_IDENTITY`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TexGenMatrix(pub u8);

impl TexGenMatrix {
    pub const TEXMTX0: TexGenMatrix = TexGenMatrix(30);
    pub const IDENTITY: TexGenMatrix = TexGenMatrix(60);

    /// Matrix paired with texgen `slot`. Texgens and texture matrices are
    /// assigned in lockstep, three matrix rows apart.
    pub fn for_slot(slot: usize) -> Self { TexGenMatrix(Self::TEXMTX0.0 + slot as u8 * 3) }
}

/// Post-transform matrix selector (`GX_PTTEXMTX0..19`, `GX_PTIDENTITY`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PostTexGenMatrix(pub u8);

impl PostTexGenMatrix {
    pub const PTTEXMTX0: PostTexGenMatrix = PostTexGenMatrix(64);
    pub const PTIDENTITY: PostTexGenMatrix = PostTexGenMatrix(125);

    pub fn is_valid(self) -> bool {
        self == Self::PTIDENTITY
            || (self.0 >= Self::PTTEXMTX0.0 && (self.0 - Self::PTTEXMTX0.0) % 3 == 0 && self.0 < 124)
    }
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexMatrixProjection {
    St = 0,
    Stq = 1,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, FromRepr)]
pub enum TexMtxMapMode {
    None = 0x00,
    EnvmapBasic = 0x01,
    ProjmapBasic = 0x02,
    ViewProjmapBasic = 0x03,
    Unknown04 = 0x04,
    Unknown05 = 0x05,
    EnvmapOld = 0x06,
    Envmap = 0x07,
    Projmap = 0x08,
    ViewProjmap = 0x09,
    EnvmapOldEffectMtx = 0x0A,
    EnvmapEffectMtx = 0x0B,
}

/// TEV color combiner input.
#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CombineColorInput {
    CPrev = 0,
    APrev = 1,
    C0 = 2,
    A0 = 3,
    C1 = 4,
    A1 = 5,
    C2 = 6,
    A2 = 7,
    TexC = 8,
    TexA = 9,
    RasC = 10,
    RasA = 11,
    One = 12,
    Half = 13,
    Konst = 14,
    Zero = 15,
}

/// TEV alpha combiner input.
#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CombineAlphaInput {
    APrev = 0,
    A0 = 1,
    A1 = 2,
    A2 = 3,
    TexA = 4,
    RasA = 5,
    Konst = 6,
    Zero = 7,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TevOp {
    Add = 0,
    Sub = 1,
    CompR8Gt = 8,
    CompR8Eq = 9,
    CompGr16Gt = 10,
    CompGr16Eq = 11,
    CompBgr24Gt = 12,
    CompBgr24Eq = 13,
    CompRgb8Gt = 14,
    CompRgb8Eq = 15,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TevBias {
    Zero = 0,
    AddHalf = 1,
    SubHalf = 2,
    // Set by the SDK when the op is a comparison
    Compare = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TevScale {
    Scale1 = 0,
    Scale2 = 1,
    Scale4 = 2,
    Divide2 = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Register {
    Prev = 0,
    Reg0 = 1,
    Reg1 = 2,
    Reg2 = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexCoordId {
    TexCoord0 = 0,
    TexCoord1 = 1,
    TexCoord2 = 2,
    TexCoord3 = 3,
    TexCoord4 = 4,
    TexCoord5 = 5,
    TexCoord6 = 6,
    TexCoord7 = 7,
    Null = 0xFF,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexMapId {
    TexMap0 = 0,
    TexMap1 = 1,
    TexMap2 = 2,
    TexMap3 = 3,
    TexMap4 = 4,
    TexMap5 = 5,
    TexMap6 = 6,
    TexMap7 = 7,
    Null = 0xFF,
}

/// Channel id as stored in a TEV order record.
#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ColorChannelId {
    Color0 = 0,
    Color1 = 1,
    Alpha0 = 2,
    Alpha1 = 3,
    Color0A0 = 4,
    Color1A1 = 5,
    ColorZero = 6,
    AlphaBump = 7,
    AlphaBumpN = 8,
    ColorNull = 0xFF,
}

/// Rasterized color channel a TEV stage actually consumes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RasColorChannelId {
    Color0A0,
    Color1A1,
    AlphaBump,
    AlphaBumpN,
    ColorZero,
}

impl From<ColorChannelId> for RasColorChannelId {
    fn from(id: ColorChannelId) -> Self {
        match id {
            ColorChannelId::Color0 | ColorChannelId::Alpha0 | ColorChannelId::Color0A0 => {
                RasColorChannelId::Color0A0
            }
            ColorChannelId::Color1 | ColorChannelId::Alpha1 | ColorChannelId::Color1A1 => {
                RasColorChannelId::Color1A1
            }
            ColorChannelId::AlphaBump => RasColorChannelId::AlphaBump,
            ColorChannelId::AlphaBumpN => RasColorChannelId::AlphaBumpN,
            ColorChannelId::ColorZero | ColorChannelId::ColorNull => RasColorChannelId::ColorZero,
        }
    }
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum KonstColorSel {
    Const1 = 0x00,
    Const7_8 = 0x01,
    Const3_4 = 0x02,
    Const5_8 = 0x03,
    Const1_2 = 0x04,
    Const3_8 = 0x05,
    Const1_4 = 0x06,
    Const1_8 = 0x07,
    K0 = 0x0C,
    K1 = 0x0D,
    K2 = 0x0E,
    K3 = 0x0F,
    K0R = 0x10,
    K1R = 0x11,
    K2R = 0x12,
    K3R = 0x13,
    K0G = 0x14,
    K1G = 0x15,
    K2G = 0x16,
    K3G = 0x17,
    K0B = 0x18,
    K1B = 0x19,
    K2B = 0x1A,
    K3B = 0x1B,
    K0A = 0x1C,
    K1A = 0x1D,
    K2A = 0x1E,
    K3A = 0x1F,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum KonstAlphaSel {
    Const1 = 0x00,
    Const7_8 = 0x01,
    Const3_4 = 0x02,
    Const5_8 = 0x03,
    Const1_2 = 0x04,
    Const3_8 = 0x05,
    Const1_4 = 0x06,
    Const1_8 = 0x07,
    K0R = 0x10,
    K1R = 0x11,
    K2R = 0x12,
    K3R = 0x13,
    K0G = 0x14,
    K1G = 0x15,
    K2G = 0x16,
    K3G = 0x17,
    K0B = 0x18,
    K1B = 0x19,
    K2B = 0x1A,
    K3B = 0x1B,
    K0A = 0x1C,
    K1A = 0x1D,
    K2A = 0x1E,
    K3A = 0x1F,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TevColorChan {
    R = 0,
    G = 1,
    B = 2,
    A = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexStageId {
    Stage0 = 0,
    Stage1 = 1,
    Stage2 = 2,
    Stage3 = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexFormat {
    Bits8 = 0,
    Bits5 = 1,
    Bits4 = 2,
    Bits3 = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexBiasSel {
    None = 0,
    S = 1,
    T = 2,
    St = 3,
    U = 4,
    Su = 5,
    Tu = 6,
    Stu = 7,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexAlphaSel {
    Off = 0,
    S = 1,
    T = 2,
    U = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexMtxId {
    Off = 0,
    Mtx0 = 1,
    Mtx1 = 2,
    Mtx2 = 3,
    S0 = 5,
    S1 = 6,
    S2 = 7,
    T0 = 9,
    T1 = 10,
    T2 = 11,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexWrap {
    Off = 0,
    Wrap256 = 1,
    Wrap128 = 2,
    Wrap64 = 3,
    Wrap32 = 4,
    Wrap16 = 5,
    Wrap0 = 6,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum IndTexScale {
    Scale1 = 0,
    Scale2 = 1,
    Scale4 = 2,
    Scale8 = 3,
    Scale16 = 4,
    Scale32 = 5,
    Scale64 = 6,
    Scale128 = 7,
    Scale256 = 8,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CompareType {
    Never = 0,
    Less = 1,
    Equal = 2,
    LEqual = 3,
    Greater = 4,
    NEqual = 5,
    GEqual = 6,
    Always = 7,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum AlphaOp {
    And = 0,
    Or = 1,
    Xor = 2,
    Xnor = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BlendMode {
    None = 0,
    Blend = 1,
    Logic = 2,
    Subtract = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BlendFactor {
    Zero = 0,
    One = 1,
    SrcColor = 2,
    InvSrcColor = 3,
    SrcAlpha = 4,
    InvSrcAlpha = 5,
    DstAlpha = 6,
    InvDstAlpha = 7,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum LogicOp {
    Clear = 0,
    And = 1,
    RevAnd = 2,
    Copy = 3,
    InvAnd = 4,
    Noop = 5,
    Xor = 6,
    Or = 7,
    Nor = 8,
    Equiv = 9,
    Inv = 10,
    RevOr = 11,
    InvCopy = 12,
    InvOr = 13,
    Nand = 14,
    Set = 15,
}

#[binread]
#[repr(u32)]
#[br(repr(u32))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CullMode {
    None = 0,
    Front = 1,
    Back = 2,
    All = 3,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FogType {
    None = 0x00,
    PerspLin = 0x02,
    PerspExp = 0x04,
    PerspExp2 = 0x05,
    PerspRevExp = 0x06,
    PerspRevExp2 = 0x07,
    OrthoLin = 0x0A,
    OrthoExp = 0x0C,
    OrthoExp2 = 0x0D,
    OrthoRevExp = 0x0E,
    OrthoRevExp2 = 0x0F,
}

impl FogType {
    /// Bit 3 of the fog type selects orthographic projection.
    #[inline]
    pub fn is_orthographic(self) -> bool { (self as u8 >> 3) & 1 != 0 }
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ColorSrc {
    Register = 0,
    Vertex = 1,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum DiffuseFunction {
    None = 0,
    Sign = 1,
    Clamp = 2,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum AttenuationFunction {
    None,
    Spec,
    Spot,
}

impl AttenuationFunction {
    /// On disk the function is the SDK's two-bit attenuation select; the
    /// "spec disabled" variant collapses into `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 | 2 => Some(AttenuationFunction::None),
            1 => Some(AttenuationFunction::Spec),
            3 => Some(AttenuationFunction::Spot),
            _ => None,
        }
    }
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TexFormat {
    I4 = 0x0,
    I8 = 0x1,
    Ia4 = 0x2,
    Ia8 = 0x3,
    Rgb565 = 0x4,
    Rgb5a3 = 0x5,
    Rgba8 = 0x6,
    C4 = 0x8,
    C8 = 0x9,
    C14x2 = 0xA,
    Cmpr = 0xE,
}

impl TexFormat {
    /// Tile dimensions in texels.
    pub fn block_size(self) -> (u32, u32) {
        match self {
            TexFormat::I4 | TexFormat::C4 | TexFormat::Cmpr => (8, 8),
            TexFormat::I8 | TexFormat::Ia4 | TexFormat::C8 => (8, 4),
            TexFormat::Ia8
            | TexFormat::Rgb565
            | TexFormat::Rgb5a3
            | TexFormat::Rgba8
            | TexFormat::C14x2 => (4, 4),
        }
    }

    pub fn bits_per_pixel(self) -> u32 {
        match self {
            TexFormat::I4 | TexFormat::C4 | TexFormat::Cmpr => 4,
            TexFormat::I8 | TexFormat::Ia4 | TexFormat::C8 => 8,
            TexFormat::Ia8 | TexFormat::Rgb565 | TexFormat::Rgb5a3 | TexFormat::C14x2 => 16,
            TexFormat::Rgba8 => 32,
        }
    }

    /// Size in bytes of one mip level, padded out to whole tiles.
    pub fn level_size(self, width: u32, height: u32) -> u64 {
        let (bw, bh) = self.block_size();
        let tiles_x = width.div_ceil(bw) as u64;
        let tiles_y = height.div_ceil(bh) as u64;
        tiles_x * tiles_y * (bw * bh * self.bits_per_pixel() / 8) as u64
    }

    /// Size in bytes of the full mip chain.
    pub fn image_size(self, width: u32, height: u32, mip_count: u32) -> u64 {
        let (mut w, mut h) = (width, height);
        let mut size = 0;
        for _ in 0..mip_count.max(1) {
            size += self.level_size(w, h);
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        size
    }

    pub fn is_palettized(self) -> bool {
        matches!(self, TexFormat::C4 | TexFormat::C8 | TexFormat::C14x2)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, FromRepr)]
pub enum TexPalette {
    Ia8 = 0,
    Rgb565 = 1,
    Rgb5a3 = 2,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum WrapMode {
    Clamp = 0,
    Repeat = 1,
    Mirror = 2,
}

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum TexFilter {
    Near = 0,
    Linear = 1,
    NearMipNear = 2,
    LinMipNear = 3,
    NearMipLin = 4,
    LinMipLin = 5,
}
