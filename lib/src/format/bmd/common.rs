use encoding_rs::SHIFT_JIS;
use serde_derive::Serialize;

use crate::{format::error::Result, util::cursor::ByteCursor};

/// Normalized RGBA color.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self { Self { r, g, b, a } }

    #[inline]
    pub fn from_rgba8(v: [u8; 4]) -> Self {
        Self::new(v[0] as f32 / 255.0, v[1] as f32 / 255.0, v[2] as f32 / 255.0, v[3] as f32 / 255.0)
    }
}

pub fn read_rgba8(cur: &mut ByteCursor) -> Result<Color> {
    Ok(Color::from_rgba8(cur.read_record::<[u8; 4]>()?))
}

/// RGB with a trailing pad byte; alpha is forced opaque.
pub fn read_rgbx8(cur: &mut ByteCursor) -> Result<Color> {
    let [r, g, b, _] = cur.read_record::<[u8; 4]>()?;
    Ok(Color::from_rgba8([r, g, b, 0xFF]))
}

/// Signed 16-bit TEV register color. Channels may leave 0..1.
pub fn read_rgba16(cur: &mut ByteCursor) -> Result<Color> {
    let [r, g, b, a] = cur.read_record::<[i16; 4]>()?;
    Ok(Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0))
}

/// Maps logical (presentation) indices to record indices in a fixed-stride
/// table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemapTable(Vec<u16>);

impl RemapTable {
    pub fn read(cur: &mut ByteCursor, offset: u64, count: u16) -> Result<Self> {
        cur.seek(offset)?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(cur.read_u16()?);
        }
        Ok(Self(entries))
    }

    #[inline]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Panics if `logical` is not below [`len`](Self::len).
    #[inline]
    pub fn storage_index(&self, logical: usize) -> u64 { self.0[logical] as u64 }
}

/// JSystem string table key.
pub fn name_hash(name: &[u8]) -> u16 {
    name.iter().fold(0u16, |hash, &c| hash.wrapping_mul(3).wrapping_add(c as u16))
}

/// Reads a name table at absolute offset `offset`.
///
/// ```text
/// u16 count, u16 pad, { u16 hash, u16 offset }[count], strings...
/// ```
///
/// String offsets are relative to the table. Names are Shift-JIS.
pub fn read_string_table(cur: &mut ByteCursor, offset: u64) -> Result<Vec<String>> {
    cur.seek(offset)?;
    let count = cur.read_u16()?;
    let mut names = Vec::with_capacity(count as usize);
    for i in 0..count as u64 {
        cur.seek(offset + 4 + i * 4)?;
        let hash = cur.read_u16()?;
        let string_offset = cur.read_u16()?;
        cur.seek(offset + string_offset as u64)?;
        let raw = cur.read_cstring()?;
        let (name, _) = SHIFT_JIS.decode_without_bom_handling(raw);
        if name_hash(raw) != hash {
            log::warn!(
                "{}: name {:?} hash mismatch ({:#06X} != {:#06X})",
                cur.section(),
                name,
                name_hash(raw),
                hash
            );
        }
        names.push(name.into_owned());
    }
    Ok(names)
}

/// Looks up entry `index` of a decoded name table.
pub fn table_name(cur: &ByteCursor, names: &[String], index: usize) -> Result<String> {
    names
        .get(index)
        .cloned()
        .ok_or_else(|| cur.invariant(format!("name table has no entry {index} ({} names)", names.len())))
}
