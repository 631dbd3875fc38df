use std::{io, io::Read};

use zerocopy::ByteOrder;

#[inline(always)]
pub fn read_u8<R>(reader: &mut R) -> io::Result<u8>
where R: Read + ?Sized {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[inline(always)]
pub fn read_u16<O, R>(reader: &mut R) -> io::Result<u16>
where
    O: ByteOrder,
    R: Read + ?Sized,
{
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(O::read_u16(&buf))
}

#[inline(always)]
pub fn read_i16<O, R>(reader: &mut R) -> io::Result<i16>
where
    O: ByteOrder,
    R: Read + ?Sized,
{
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(O::read_i16(&buf))
}

#[inline(always)]
pub fn read_u32<O, R>(reader: &mut R) -> io::Result<u32>
where
    O: ByteOrder,
    R: Read + ?Sized,
{
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(O::read_u32(&buf))
}

#[inline(always)]
pub fn read_f32<O, R>(reader: &mut R) -> io::Result<f32>
where
    O: ByteOrder,
    R: Read + ?Sized,
{
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(O::read_f32(&buf))
}
