//! J3D binary model (BMD / BDL) decoding.

pub mod common;
pub mod drw1;
pub mod evp1;
pub mod inf1;
pub mod jnt1;
pub mod mat3;
pub mod material;
pub mod tex1;
pub mod vtx1;

#[cfg(test)]
pub(crate) mod test_util;

use binrw::binread;
use serde_derive::Serialize;

use crate::{
    format::{
        bmd::{drw1::Drw1, evp1::Evp1, inf1::Inf1, jnt1::Jnt1, mat3::Mat3, tex1::Tex1, vtx1::Vtx1},
        error::{J3dError, Result},
        FourCC,
    },
    util::cursor::ByteCursor,
};

pub const K_MAGIC_J3D2: FourCC = FourCC(*b"J3D2");

// Scene hierarchy
pub const K_CHUNK_INF1: FourCC = FourCC(*b"INF1");
// Vertex attribute arrays
pub const K_CHUNK_VTX1: FourCC = FourCC(*b"VTX1");
// Skinning envelopes
pub const K_CHUNK_EVP1: FourCC = FourCC(*b"EVP1");
// Draw matrix bindings
pub const K_CHUNK_DRW1: FourCC = FourCC(*b"DRW1");
// Joints
pub const K_CHUNK_JNT1: FourCC = FourCC(*b"JNT1");
// Shape display lists
pub const K_CHUNK_SHP1: FourCC = FourCC(*b"SHP1");
// Materials
pub const K_CHUNK_MAT3: FourCC = FourCC(*b"MAT3");
// Precompiled material display lists (BDL)
pub const K_CHUNK_MDL3: FourCC = FourCC(*b"MDL3");
// Textures
pub const K_CHUNK_TEX1: FourCC = FourCC(*b"TEX1");

#[binread]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum J3dKind {
    #[br(magic = b"bmd3")]
    Bmd3,
    #[br(magic = b"bdl4")]
    Bdl4,
}

#[binread]
#[br(magic = b"J3D2")]
#[derive(Clone, Debug)]
struct SFileHeader {
    kind: J3dKind,
    file_size: u32,
    section_count: u32,
    #[br(temp)]
    _reserved: [u8; 16],
}

/// Decoded model. Byte payloads borrow the source buffer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BmdModel<'a> {
    pub kind: J3dKind,
    pub inf1: Inf1<'a>,
    pub vtx1: Vtx1<'a>,
    pub evp1: Evp1,
    pub drw1: Drw1,
    pub jnt1: Jnt1,
    pub mat3: Mat3,
    pub tex1: Tex1<'a>,
}

impl<'a> BmdModel<'a> {
    pub fn slice(data: &'a [u8]) -> Result<BmdModel<'a>> {
        let mut cur = ByteCursor::new(data, K_MAGIC_J3D2);
        let header = cur.read_record_at::<SFileHeader>(0)?;
        if header.file_size as u64 != cur.len() {
            log::debug!("J3D2: header size {:#x}, buffer size {:#x}", header.file_size, cur.len());
        }

        let mut inf1: Option<Inf1> = None;
        let mut vtx1: Option<Vtx1> = None;
        let mut evp1: Option<Evp1> = None;
        let mut drw1: Option<Drw1> = None;
        let mut jnt1: Option<Jnt1> = None;
        let mut mat3: Option<Mat3> = None;
        let mut tex1: Option<Tex1> = None;
        let mut start = 0x20u64;
        for _ in 0..header.section_count {
            let tag = cur.read_record_at::<FourCC>(start)?;
            cur.set_section(tag);
            let size = cur.read_u32()? as u64;
            cur.enter_section(tag, start, size)?;
            if size < 8 {
                return Err(cur.invariant_at(start + 4, format!("section size {size:#x}")));
            }
            log::debug!("{tag}: offset {start:#x}, size {size:#x}");
            match tag {
                K_CHUNK_INF1 => store(&mut inf1, Inf1::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_VTX1 => store(&mut vtx1, Vtx1::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_EVP1 => store(&mut evp1, Evp1::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_DRW1 => store(&mut drw1, Drw1::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_JNT1 => store(&mut jnt1, Jnt1::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_MAT3 => store(&mut mat3, Mat3::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_TEX1 => store(&mut tex1, Tex1::read(&mut cur, start, size)?, tag, start)?,
                K_CHUNK_SHP1 | K_CHUNK_MDL3 => log::debug!("{tag}: unsupported, skipping"),
                _ => log::debug!("{tag}: unknown section, skipping"),
            }
            start += size;
            cur.leave_section(start)?;
        }

        let Some(inf1) = inf1 else { return Err(J3dError::MissingSection(K_CHUNK_INF1)) };
        let Some(vtx1) = vtx1 else { return Err(J3dError::MissingSection(K_CHUNK_VTX1)) };
        let Some(evp1) = evp1 else { return Err(J3dError::MissingSection(K_CHUNK_EVP1)) };
        let Some(drw1) = drw1 else { return Err(J3dError::MissingSection(K_CHUNK_DRW1)) };
        let Some(jnt1) = jnt1 else { return Err(J3dError::MissingSection(K_CHUNK_JNT1)) };
        let Some(mat3) = mat3 else { return Err(J3dError::MissingSection(K_CHUNK_MAT3)) };
        let Some(tex1) = tex1 else { return Err(J3dError::MissingSection(K_CHUNK_TEX1)) };

        Ok(BmdModel { kind: header.kind, inf1, vtx1, evp1, drw1, jnt1, mat3, tex1 })
    }
}

fn store<T>(slot: &mut Option<T>, value: T, tag: FourCC, start: u64) -> Result<()> {
    if slot.is_some() {
        return Err(J3dError::FormatInvariant {
            section: tag,
            offset: start,
            message: format!("duplicate {tag} section"),
        });
    }
    *slot = Some(value);
    Ok(())
}
