use binrw::binread;
use serde_derive::Serialize;

use crate::{
    ensure_format,
    format::{
        bmd::common::{read_string_table, table_name},
        error::Result,
        gx::{TexFilter, TexFormat, TexPalette, WrapMode},
    },
    util::cursor::ByteCursor,
};

/// BTI image header (0x20 bytes). Offsets are relative to the header.
#[binread]
#[derive(Clone, Debug)]
struct SBtiHeader {
    format: TexFormat,
    alpha: u8,
    width: u16,
    height: u16,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    #[br(temp)]
    _palettes_enabled: u8,
    palette_format: u8,
    palette_count: u16,
    palette_offset: u32,
    #[br(temp)]
    _unused: u32,
    min_filter: TexFilter,
    mag_filter: TexFilter,
    min_lod: u8,
    max_lod: u8,
    mip_count: u8,
    #[br(temp)]
    _pad: u8,
    lod_bias: i16,
    data_offset: u32,
}

/// A distinct texture image. Pixel and palette bytes borrow the source buffer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Texture<'a> {
    pub name: String,
    pub format: TexFormat,
    /// Transparency hint: 0 opaque, 1 one-bit alpha, 2 translucent.
    pub alpha: u8,
    pub width: u16,
    pub height: u16,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: TexFilter,
    pub mag_filter: TexFilter,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    pub mip_count: u8,
    #[serde(skip)]
    pub data: Option<&'a [u8]>,
    pub palette_format: Option<TexPalette>,
    pub palette_count: u16,
    #[serde(skip)]
    pub palette_data: Option<&'a [u8]>,
}

/// Material-facing texture slot. Sampling state comes from its own header even
/// when the pixels are shared with an earlier texture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sampler {
    pub index: usize,
    pub name: String,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: TexFilter,
    pub mag_filter: TexFilter,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
    /// Index into [`Tex1::textures`].
    pub texture_index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Tex1<'a> {
    pub textures: Vec<Texture<'a>>,
    pub samplers: Vec<Sampler>,
}

impl<'a> Tex1<'a> {
    pub fn read(cur: &mut ByteCursor<'a>, start: u64, _size: u64) -> Result<Self> {
        cur.seek(start + 0x08)?;
        let count = cur.read_u16()?;
        cur.skip(2)?;
        let header_table = start + cur.read_u32()? as u64;
        let name_table = start + cur.read_u32()? as u64;

        let names = read_string_table(cur, name_table)?;
        let mut textures: Vec<Texture<'a>> = Vec::new();
        let mut samplers = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let name = table_name(cur, &names, i)?;
            let header_at = header_table + i as u64 * 0x20;
            let texture = read_texture(cur, header_at, name)?;

            let existing = texture
                .data
                .and_then(|data| textures.iter().position(|t| t.data == Some(data)));
            let texture_index = match existing {
                Some(index) => {
                    log::debug!("TEX1: {} shares pixels with {}", texture.name, textures[index].name);
                    index
                }
                None => {
                    textures.push(texture.clone());
                    textures.len() - 1
                }
            };
            samplers.push(Sampler {
                index: i,
                name: texture.name,
                wrap_s: texture.wrap_s,
                wrap_t: texture.wrap_t,
                min_filter: texture.min_filter,
                mag_filter: texture.mag_filter,
                min_lod: texture.min_lod,
                max_lod: texture.max_lod,
                lod_bias: texture.lod_bias,
                texture_index,
            });
        }
        Ok(Self { textures, samplers })
    }
}

fn read_texture<'a>(cur: &mut ByteCursor<'a>, header_at: u64, name: String) -> Result<Texture<'a>> {
    let header = cur.read_record_at::<SBtiHeader>(header_at)?;
    if header.min_lod != 0 {
        return Err(cur.invariant_at(
            header_at + 0x16,
            format!("texture {name} has min LOD {}", header.min_lod),
        ));
    }

    let data = match header.data_offset {
        0 => None,
        offset => {
            let data_start = header_at + offset as u64;
            let len = header.format.image_size(
                header.width as u32,
                header.height as u32,
                header.mip_count as u32,
            );
            Some(cur.slice(data_start..data_start + len)?)
        }
    };

    let mut palette_format = None;
    let mut palette_data = None;
    if header.palette_count > 0 {
        palette_format = TexPalette::from_repr(header.palette_format);
        ensure_format!(
            cur,
            palette_format.is_some(),
            "texture {name} has unknown palette format {}",
            header.palette_format
        );
        if !header.format.is_palettized() {
            log::debug!("texture {name}: {:?} carries an unused palette", header.format);
        }
        if header.palette_offset != 0 {
            let palette_start = header_at + header.palette_offset as u64;
            palette_data =
                Some(cur.slice(palette_start..palette_start + header.palette_count as u64 * 2)?);
        }
    }

    Ok(Texture {
        name,
        format: header.format,
        alpha: header.alpha,
        width: header.width,
        height: header.height,
        wrap_s: header.wrap_s,
        wrap_t: header.wrap_t,
        min_filter: header.min_filter,
        mag_filter: header.mag_filter,
        min_lod: header.min_lod as f32 / 8.0,
        max_lod: header.max_lod as f32 / 8.0,
        lod_bias: header.lod_bias as f32 / 100.0,
        mip_count: header.mip_count,
        data,
        palette_format,
        palette_count: header.palette_count,
        palette_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{bmd::test_util::*, error::J3dError};

    fn read(data: &[u8]) -> Result<Tex1<'_>> {
        let (mut cur, size) = enter(data);
        Tex1::read(&mut cur, 0, size)
    }

    #[test]
    fn shared_pixels_keep_sampler_state() {
        let data = tex1_section(&[
            TextureFixture::new("grass", 0x11),
            TextureFixture { wrap: (0, 2), ..TextureFixture::new("grass_clamp", 0x11) },
            TextureFixture::new("rock", 0x22),
        ]);
        let tex1 = read(&data).unwrap();
        assert_eq!(tex1.textures.len(), 2);
        assert_eq!(tex1.samplers.len(), 3);

        let indices: Vec<_> = tex1.samplers.iter().map(|s| s.texture_index).collect();
        assert_eq!(indices, [0, 0, 1]);
        assert_eq!(tex1.samplers[1].name, "grass_clamp");
        assert_eq!(tex1.samplers[1].wrap_s, WrapMode::Clamp);
        assert_eq!(tex1.samplers[1].wrap_t, WrapMode::Mirror);
        assert_eq!(tex1.textures[0].wrap_s, WrapMode::Repeat);

        let grass = &tex1.textures[0];
        assert_eq!(grass.name, "grass");
        assert_eq!(grass.format, TexFormat::I8);
        assert_eq!((grass.width, grass.height), (8, 4));
        assert_eq!(grass.data, Some(&[0x11u8; 32][..]));
        assert_eq!(tex1.textures[1].data, Some(&[0x22u8; 32][..]));
        assert_eq!(grass.palette_format, None);
    }

    #[test]
    fn palette_entries() {
        let palette = vec![0x7F, 0xFF, 0x80, 0x00];
        let data = tex1_section(&[TextureFixture {
            palette: Some((2, palette.clone())),
            ..TextureFixture::new("tinted", 0x33)
        }]);
        let tex1 = read(&data).unwrap();
        let texture = &tex1.textures[0];
        assert_eq!(texture.palette_format, Some(TexPalette::Rgb5a3));
        assert_eq!(texture.palette_count, 2);
        assert_eq!(texture.palette_data, Some(&palette[..]));
        assert_eq!(texture.data, Some(&[0x33u8; 32][..]));
    }

    #[test]
    fn unknown_palette_format() {
        let data = tex1_section(&[TextureFixture {
            palette: Some((7, vec![0; 4])),
            ..TextureFixture::new("t", 0)
        }]);
        assert!(matches!(read(&data), Err(J3dError::FormatInvariant { section, .. }) if section == *b"TEX1"));
    }

    #[test]
    fn lod_scaling() {
        let data = tex1_section(&[TextureFixture::new("t", 0)]);
        let sampler = &read(&data).unwrap().samplers[0];
        assert_eq!(sampler.min_lod, 0.0);
        assert_eq!(sampler.max_lod, 1.0);
        assert_eq!(sampler.lod_bias, -0.5);
        assert_eq!(sampler.min_filter, TexFilter::Linear);
    }

    #[test]
    fn textures_without_data_are_distinct() {
        let data = tex1_section(&[
            TextureFixture { data: None, ..TextureFixture::new("a", 0) },
            TextureFixture { data: None, ..TextureFixture::new("b", 0) },
        ]);
        let tex1 = read(&data).unwrap();
        assert_eq!(tex1.textures.len(), 2);
        assert!(tex1.textures.iter().all(|t| t.data.is_none()));
        assert_eq!(tex1.samplers[1].texture_index, 1);
    }

    #[test]
    fn nonzero_min_lod() {
        let data = tex1_section(&[TextureFixture { min_lod: 1, ..TextureFixture::new("t", 0) }]);
        assert!(matches!(read(&data), Err(J3dError::FormatInvariant { .. })));
    }

    #[test]
    fn pixel_data_past_section() {
        let mut data = tex1_section(&[TextureFixture::new("t", 0)]);
        let header = be_u32(&data, 0x0C) as usize;
        data[header + 0x1C..header + 0x20].copy_from_slice(&0x1000u32.to_be_bytes());
        let err = read(&data).unwrap_err();
        assert!(matches!(err, J3dError::OutOfBounds { section, .. } if section == *b"TEX1"));
    }
}
