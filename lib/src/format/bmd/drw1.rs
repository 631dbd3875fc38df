use binrw::binread;
use serde_derive::Serialize;

use crate::{format::error::Result, util::cursor::ByteCursor};

#[binread]
#[repr(u8)]
#[br(repr(u8))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum DrawMatrixKind {
    /// `param` is a joint index.
    Joint = 0,
    /// `param` is an EVP1 envelope index.
    Envelope = 1,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DrawMatrix {
    pub kind: DrawMatrixKind,
    pub param: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Drw1 {
    pub matrices: Vec<DrawMatrix>,
}

impl Drw1 {
    pub fn read(cur: &mut ByteCursor, start: u64, _size: u64) -> Result<Self> {
        cur.seek(start + 0x08)?;
        let count = cur.read_u16()?;
        cur.skip(2)?;
        let kind_table = start + cur.read_u32()? as u64;
        let param_table = start + cur.read_u32()? as u64;

        let mut matrices = Vec::with_capacity(count as usize);
        for i in 0..count as u64 {
            let kind = cur.read_record_at::<DrawMatrixKind>(kind_table + i)?;
            cur.seek(param_table + i * 2)?;
            let param = cur.read_u16()?;
            matrices.push(DrawMatrix { kind, param });
        }
        Ok(Self { matrices })
    }
}
