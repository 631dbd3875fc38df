use std::collections::BTreeMap;

use serde_derive::Serialize;
use strum::FromRepr;

use crate::{
    format::{bmd::common::Color, error::Result},
    util::cursor::ByteCursor,
};

/// GX vertex attribute (`GXAttr`).
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, FromRepr)]
pub enum VertexAttr {
    PosMtxIdx = 0,
    Tex0MtxIdx = 1,
    Tex1MtxIdx = 2,
    Tex2MtxIdx = 3,
    Tex3MtxIdx = 4,
    Tex4MtxIdx = 5,
    Tex5MtxIdx = 6,
    Tex6MtxIdx = 7,
    Tex7MtxIdx = 8,
    Position = 9,
    Normal = 10,
    Color0 = 11,
    Color1 = 12,
    Tex0 = 13,
    Tex1 = 14,
    Tex2 = 15,
    Tex3 = 16,
    Tex4 = 17,
    Tex5 = 18,
    Tex6 = 19,
    Tex7 = 20,
    PosMtxArray = 21,
    NrmMtxArray = 22,
    TexMtxArray = 23,
    LightArray = 24,
    Nbt = 25,
    Null = 0xFF,
}

impl VertexAttr {
    #[inline]
    pub fn is_color(self) -> bool { matches!(self, VertexAttr::Color0 | VertexAttr::Color1) }
}

/// Data arrays are stored in this order. The third slot is the NBT array,
/// which shares the normal attribute.
const DATA_SLOTS: [VertexAttr; 13] = [
    VertexAttr::Position,
    VertexAttr::Normal,
    VertexAttr::Normal,
    VertexAttr::Color0,
    VertexAttr::Color1,
    VertexAttr::Tex0,
    VertexAttr::Tex1,
    VertexAttr::Tex2,
    VertexAttr::Tex3,
    VertexAttr::Tex4,
    VertexAttr::Tex5,
    VertexAttr::Tex6,
    VertexAttr::Tex7,
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ComponentCount {
    PositionXy,
    PositionXyz,
    NormalXyz,
    NormalNbt,
    NormalNbt3,
    ColorRgb,
    ColorRgba,
    TexS,
    TexSt,
}

impl ComponentCount {
    fn decode(attr: VertexAttr, raw: u32) -> Option<Self> {
        Some(match (attr, raw) {
            (VertexAttr::Position, 0) => ComponentCount::PositionXy,
            (VertexAttr::Position, 1) => ComponentCount::PositionXyz,
            (VertexAttr::Normal | VertexAttr::Nbt, 0) => ComponentCount::NormalXyz,
            (VertexAttr::Normal | VertexAttr::Nbt, 1) => ComponentCount::NormalNbt,
            (VertexAttr::Normal | VertexAttr::Nbt, 2) => ComponentCount::NormalNbt3,
            (VertexAttr::Color0 | VertexAttr::Color1, 0) => ComponentCount::ColorRgb,
            (VertexAttr::Color0 | VertexAttr::Color1, 1) => ComponentCount::ColorRgba,
            (a, 0) if (VertexAttr::Tex0..=VertexAttr::Tex7).contains(&a) => ComponentCount::TexS,
            (a, 1) if (VertexAttr::Tex0..=VertexAttr::Tex7).contains(&a) => ComponentCount::TexSt,
            _ => return None,
        })
    }

    pub fn components(self) -> usize {
        match self {
            ComponentCount::TexS => 1,
            ComponentCount::PositionXy | ComponentCount::TexSt => 2,
            ComponentCount::PositionXyz | ComponentCount::NormalXyz | ComponentCount::ColorRgb => 3,
            ComponentCount::ColorRgba => 4,
            ComponentCount::NormalNbt | ComponentCount::NormalNbt3 => 9,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ComponentType {
    U8,
    S8,
    U16,
    S16,
    F32,
    Rgb565,
    Rgb8,
    Rgbx8,
    Rgba4,
    Rgba6,
    Rgba8,
}

impl ComponentType {
    fn decode(attr: VertexAttr, raw: u32) -> Option<Self> {
        let table: &[ComponentType] = if attr.is_color() {
            &[
                ComponentType::Rgb565,
                ComponentType::Rgb8,
                ComponentType::Rgbx8,
                ComponentType::Rgba4,
                ComponentType::Rgba6,
                ComponentType::Rgba8,
            ]
        } else {
            &[ComponentType::U8, ComponentType::S8, ComponentType::U16, ComponentType::S16, ComponentType::F32]
        };
        table.get(raw as usize).copied()
    }

    /// Bytes per scalar component, or per whole color for packed color types.
    pub fn size(self) -> usize {
        match self {
            ComponentType::U8 | ComponentType::S8 => 1,
            ComponentType::U16 | ComponentType::S16 | ComponentType::Rgb565 | ComponentType::Rgba4 => 2,
            ComponentType::Rgb8 | ComponentType::Rgba6 => 3,
            ComponentType::F32 | ComponentType::Rgbx8 | ComponentType::Rgba8 => 4,
        }
    }

    pub fn is_color(self) -> bool {
        matches!(
            self,
            ComponentType::Rgb565
                | ComponentType::Rgb8
                | ComponentType::Rgbx8
                | ComponentType::Rgba4
                | ComponentType::Rgba6
                | ComponentType::Rgba8
        )
    }
}

/// One attribute's data array inside VTX1.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VertexArray<'a> {
    pub attr: VertexAttr,
    pub comp_type: ComponentType,
    pub comp_count: ComponentCount,
    pub comp_shift: u8,
    #[serde(skip)]
    pub data: &'a [u8],
    /// Absolute offset of `data` in the model buffer.
    pub offset: u64,
    pub size: u64,
}

impl VertexArray<'_> {
    /// Bytes per element.
    pub fn stride(&self) -> usize {
        if self.comp_type.is_color() {
            self.comp_type.size()
        } else {
            self.comp_type.size() * self.comp_count.components()
        }
    }

    /// Number of whole elements in the array.
    pub fn len(&self) -> usize { self.data.len() / self.stride() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Scalar component `component` of element `index`, with fixed-point
    /// types scaled by `1 / 2^shift`.
    pub fn read_component(&self, index: usize, component: usize) -> Option<f32> {
        if self.comp_type.is_color() || component >= self.comp_count.components() {
            return None;
        }
        let size = self.comp_type.size();
        let at = index * self.stride() + component * size;
        let bytes = self.data.get(at..at + size)?;
        let scale = (1u32 << self.comp_shift.min(31)) as f32;
        Some(match self.comp_type {
            ComponentType::U8 => bytes[0] as f32 / scale,
            ComponentType::S8 => bytes[0] as i8 as f32 / scale,
            ComponentType::U16 => u16::from_be_bytes([bytes[0], bytes[1]]) as f32 / scale,
            ComponentType::S16 => i16::from_be_bytes([bytes[0], bytes[1]]) as f32 / scale,
            ComponentType::F32 => f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            _ => return None,
        })
    }

    /// Color of element `index`. Formats without alpha read as opaque.
    pub fn read_color(&self, index: usize) -> Option<Color> {
        let stride = self.stride();
        let at = index * stride;
        let b = self.data.get(at..at + stride)?;
        let unorm = |v: u32, max: u32| v as f32 / max as f32;
        Some(match self.comp_type {
            ComponentType::Rgb565 => {
                let v = u16::from_be_bytes([b[0], b[1]]) as u32;
                Color::new(unorm(v >> 11, 0x1F), unorm((v >> 5) & 0x3F, 0x3F), unorm(v & 0x1F, 0x1F), 1.0)
            }
            ComponentType::Rgb8 | ComponentType::Rgbx8 => Color::from_rgba8([b[0], b[1], b[2], 0xFF]),
            ComponentType::Rgba4 => {
                let v = u16::from_be_bytes([b[0], b[1]]) as u32;
                Color::new(
                    unorm(v >> 12, 0xF),
                    unorm((v >> 8) & 0xF, 0xF),
                    unorm((v >> 4) & 0xF, 0xF),
                    unorm(v & 0xF, 0xF),
                )
            }
            ComponentType::Rgba6 => {
                let v = u32::from_be_bytes([0, b[0], b[1], b[2]]);
                Color::new(
                    unorm(v >> 18, 0x3F),
                    unorm((v >> 12) & 0x3F, 0x3F),
                    unorm((v >> 6) & 0x3F, 0x3F),
                    unorm(v & 0x3F, 0x3F),
                )
            }
            ComponentType::Rgba8 => Color::from_rgba8([b[0], b[1], b[2], b[3]]),
            _ => return None,
        })
    }
}

/// Vertex attribute arrays keyed by attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Vtx1<'a> {
    pub vertex_arrays: BTreeMap<VertexAttr, VertexArray<'a>>,
}

/// End of the data array in `slot`: the next nonzero offset in a later slot,
/// or the section size. Offsets are assumed to be non-decreasing.
pub fn data_end(offsets: &[u32], slot: usize, section_size: u32) -> u32 {
    offsets.iter().skip(slot + 1).copied().find(|&o| o != 0).unwrap_or(section_size)
}

impl<'a> Vtx1<'a> {
    pub fn read(cur: &mut ByteCursor<'a>, start: u64, size: u64) -> Result<Self> {
        cur.seek(start + 0x08)?;
        let format_offset = cur.read_u32()? as u64;
        let offsets = cur.read_record::<[u32; 13]>()?;

        let mut vertex_arrays = BTreeMap::new();
        let mut record = start + format_offset;
        loop {
            cur.seek(record)?;
            let raw_attr = cur.read_u32()?;
            if raw_attr == VertexAttr::Null as u32 {
                break;
            }
            let raw_count = cur.read_u32()?;
            let raw_type = cur.read_u32()?;
            let comp_shift = cur.read_u8()?;
            record += 0x10;

            let Some(attr) = VertexAttr::from_repr(raw_attr) else {
                log::debug!("VTX1: ignoring unknown attribute {raw_attr}");
                continue;
            };
            let Some(slot) = DATA_SLOTS.iter().position(|&a| a == attr) else {
                log::debug!("VTX1: no data slot for {attr:?}");
                continue;
            };
            let Some(comp_count) = ComponentCount::decode(attr, raw_count) else {
                return Err(cur.invariant(format!("invalid component count {raw_count} for {attr:?}")));
            };
            let Some(comp_type) = ComponentType::decode(attr, raw_type) else {
                return Err(cur.invariant(format!("invalid component type {raw_type} for {attr:?}")));
            };

            let data_start = offsets[slot] as u64;
            let data_end = data_end(&offsets, slot, size as u32) as u64;
            let data = cur.slice(start + data_start..start + data_end)?;
            vertex_arrays.insert(attr, VertexArray {
                attr,
                comp_type,
                comp_count,
                comp_shift,
                data,
                offset: start + data_start,
                size: data_end - data_start,
            });
        }
        Ok(Self { vertex_arrays })
    }
}
