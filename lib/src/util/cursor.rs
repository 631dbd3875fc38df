use std::{io, io::Cursor, ops::Range};

use binrw::{BinRead, Endian};
use zerocopy::BigEndian;

use crate::{
    format::{
        error::{J3dError, Result},
        FourCC,
    },
    util::read::{read_f32, read_i16, read_u16, read_u32, read_u8},
};

/// Big-endian random access reader over an immutable buffer.
///
/// While a section is entered, the readable window ends at the section's
/// declared end: any read or seek past it fails with
/// [`J3dError::OutOfBounds`] tagged with that section. Offsets are always
/// absolute within the full buffer.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    reader: Cursor<&'a [u8]>,
    section: FourCC,
    root: FourCC,
}

impl<'a> ByteCursor<'a> {
    /// `section` tags errors raised outside any entered section.
    pub fn new(data: &'a [u8], section: FourCC) -> Self {
        Self { data, reader: Cursor::new(data), section, root: section }
    }

    /// Total size of the underlying buffer.
    #[inline]
    pub fn len(&self) -> u64 { self.data.len() as u64 }

    #[inline]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// End of the readable window.
    #[inline]
    pub fn limit(&self) -> u64 { self.reader.get_ref().len() as u64 }

    #[inline]
    pub fn section(&self) -> FourCC { self.section }

    /// Tags subsequent errors with `tag` without changing the window.
    #[inline]
    pub fn set_section(&mut self, tag: FourCC) { self.section = tag; }

    #[inline]
    pub fn tell(&self) -> u64 { self.reader.position() }

    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.limit() {
            return Err(self.out_of_bounds(pos));
        }
        self.reader.set_position(pos);
        Ok(())
    }

    pub fn skip(&mut self, count: u64) -> Result<()> {
        let pos = self.tell().checked_add(count).ok_or_else(|| self.out_of_bounds(u64::MAX))?;
        self.seek(pos)
    }

    /// Restricts reads to `start..start + size` (plus everything before it) and
    /// tags subsequent errors with `tag`.
    pub fn enter_section(&mut self, tag: FourCC, start: u64, size: u64) -> Result<()> {
        self.section = tag;
        let end = match start.checked_add(size) {
            Some(end) if end <= self.len() => end,
            _ => return Err(J3dError::OutOfBounds { section: tag, offset: start, limit: self.len() }),
        };
        self.reader = Cursor::new(&self.data[..end as usize]);
        self.reader.set_position(start);
        Ok(())
    }

    /// Lifts the section window, restores the container tag and places the
    /// cursor at `end`.
    pub fn leave_section(&mut self, end: u64) -> Result<()> {
        self.reader = Cursor::new(self.data);
        self.section = self.root;
        self.seek(end)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let pos = self.tell();
        read_u8(&mut self.reader).map_err(|e| self.map_io(e, pos))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let pos = self.tell();
        read_u16::<BigEndian, _>(&mut self.reader).map_err(|e| self.map_io(e, pos))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let pos = self.tell();
        read_i16::<BigEndian, _>(&mut self.reader).map_err(|e| self.map_io(e, pos))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let pos = self.tell();
        read_u32::<BigEndian, _>(&mut self.reader).map_err(|e| self.map_io(e, pos))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let pos = self.tell();
        read_f32::<BigEndian, _>(&mut self.reader).map_err(|e| self.map_io(e, pos))
    }

    /// Reads a fixed-layout record at the current position.
    pub fn read_record<T>(&mut self) -> Result<T>
    where T: for<'b> BinRead<Args<'b> = ()> {
        let pos = self.tell();
        T::read_options(&mut self.reader, Endian::Big, ()).map_err(|e| self.map_binrw(e, pos))
    }

    /// Reads a fixed-layout record at `pos`.
    pub fn read_record_at<T>(&mut self, pos: u64) -> Result<T>
    where T: for<'b> BinRead<Args<'b> = ()> {
        self.seek(pos)?;
        self.read_record()
    }

    /// Returns the bytes in `range` without copying.
    pub fn slice(&self, range: Range<u64>) -> Result<&'a [u8]> {
        if range.start > range.end {
            return Err(self.invariant_at(
                range.start,
                format!("inverted byte range {:#x}..{:#x}", range.start, range.end),
            ));
        }
        if range.end > self.limit() {
            return Err(self.out_of_bounds(range.end));
        }
        Ok(&self.data[range.start as usize..range.end as usize])
    }

    /// Reads a NUL-terminated byte string, returning it without the terminator.
    pub fn read_cstring(&mut self) -> Result<&'a [u8]> {
        let start = self.tell();
        let window = self.slice(start..self.limit())?;
        let Some(len) = window.iter().position(|&b| b == 0) else {
            return Err(self.out_of_bounds(self.limit()));
        };
        self.seek(start + len as u64 + 1)?;
        Ok(&window[..len])
    }

    pub fn out_of_bounds(&self, offset: u64) -> J3dError {
        J3dError::OutOfBounds { section: self.section, offset, limit: self.limit() }
    }

    pub fn invariant(&self, message: String) -> J3dError { self.invariant_at(self.tell(), message) }

    pub fn invariant_at(&self, offset: u64, message: String) -> J3dError {
        J3dError::FormatInvariant { section: self.section, offset, message }
    }

    fn map_io(&self, err: io::Error, pos: u64) -> J3dError {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => self.out_of_bounds(pos),
            _ => self.invariant_at(pos, err.to_string()),
        }
    }

    fn map_binrw(&self, err: binrw::Error, pos: u64) -> J3dError {
        match err {
            binrw::Error::Io(e) => self.map_io(e, pos),
            binrw::Error::Backtrace(bt) => self.map_binrw(*bt.error, pos),
            binrw::Error::AssertFail { pos, message } => self.invariant_at(pos, message),
            binrw::Error::NoVariantMatch { pos } => {
                self.invariant_at(pos, "unknown enumeration value".to_string())
            }
            binrw::Error::BadMagic { pos, .. } => {
                self.invariant_at(pos, "unexpected magic".to_string())
            }
            e => self.invariant_at(pos, e.to_string()),
        }
    }
}
