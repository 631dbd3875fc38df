use serde_derive::Serialize;
use strum::FromRepr;

use crate::{format::error::Result, util::cursor::ByteCursor};

/// Joint transform composition convention selected by the exporter.
#[repr(u16)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, FromRepr)]
pub enum ScalingRule {
    Basic = 0,
    SoftImage = 1,
    Maya = 2,
}

/// Model information: scene graph bytes and load flags.
///
/// The scene graph is kept as the raw node stream; walking it is left to the
/// renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Inf1<'a> {
    pub load_flags: u16,
    pub matrix_group_count: u32,
    pub vertex_count: u32,
    #[serde(skip)]
    pub hierarchy: &'a [u8],
}

impl<'a> Inf1<'a> {
    pub fn read(cur: &mut ByteCursor<'a>, start: u64, size: u64) -> Result<Self> {
        cur.seek(start + 0x08)?;
        let load_flags = cur.read_u16()?;
        cur.skip(2)?;
        let matrix_group_count = cur.read_u32()?;
        let vertex_count = cur.read_u32()?;
        let hierarchy_offset = cur.read_u32()? as u64;
        let hierarchy = cur.slice(start + hierarchy_offset..start + size)?;
        Ok(Self { load_flags, matrix_group_count, vertex_count, hierarchy })
    }

    pub fn scaling_rule(&self) -> Option<ScalingRule> { ScalingRule::from_repr(self.load_flags & 0x0F) }
}
