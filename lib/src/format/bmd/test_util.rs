//! Synthetic BMD buffers for unit tests.
//!
//! Every builder returns a complete section (tag and size included) padded to
//! 0x20 bytes, so sections can be decoded on their own at offset 0 or chained
//! into a container with [`container`].

use super::common::name_hash;
use crate::{format::FourCC, util::cursor::ByteCursor};

#[derive(Default)]
pub struct Writer {
    pub buf: Vec<u8>,
}

impl Writer {
    pub fn pos(&self) -> u32 { self.buf.len() as u32 }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn i8(&mut self, v: i8) -> &mut Self { self.u8(v as u8) }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend(v.to_be_bytes());
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self { self.u16(v as u16) }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend(v.to_be_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.extend(v.to_be_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    pub fn fill(&mut self, count: usize, v: u8) -> &mut Self {
        self.buf.resize(self.buf.len() + count, v);
        self
    }

    pub fn align(&mut self, n: usize) -> &mut Self {
        let len = self.buf.len().next_multiple_of(n);
        self.buf.resize(len, 0);
        self
    }

    pub fn patch_u32(&mut self, at: u32, v: u32) {
        self.buf[at as usize..at as usize + 4].copy_from_slice(&v.to_be_bytes());
    }

    /// Aligns to 4 and stores the current position into the header field at `at`.
    pub fn mark(&mut self, at: u32) -> u32 {
        self.align(4);
        let pos = self.pos();
        self.patch_u32(at, pos);
        pos
    }
}

pub fn begin(tag: &[u8; 4]) -> Writer {
    let mut w = Writer::default();
    w.bytes(tag).u32(0);
    w
}

pub fn finish(mut w: Writer) -> Vec<u8> {
    w.align(0x20);
    let size = w.pos();
    w.patch_u32(4, size);
    w.buf
}

/// Cursor positioned inside a standalone section that starts at offset 0.
pub fn enter(data: &[u8]) -> (ByteCursor<'_>, u64) {
    let tag = FourCC([data[0], data[1], data[2], data[3]]);
    let mut cur = ByteCursor::new(data, tag);
    cur.enter_section(tag, 0, data.len() as u64).unwrap();
    (cur, data.len() as u64)
}

pub fn be_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Grows a finished section by `extra` zero bytes.
pub fn pad_section(mut section: Vec<u8>, extra: usize) -> Vec<u8> {
    section.resize(section.len() + extra, 0);
    let size = section.len() as u32;
    section[4..8].copy_from_slice(&size.to_be_bytes());
    section
}

pub fn string_table(names: &[&str]) -> Vec<u8> {
    let mut w = Writer::default();
    w.u16(names.len() as u16).u16(0xFFFF);
    let mut offset = 4 + names.len() * 4;
    for name in names {
        w.u16(name_hash(name.as_bytes())).u16(offset as u16);
        offset += name.len() + 1;
    }
    for name in names {
        w.bytes(name.as_bytes()).u8(0);
    }
    w.buf
}

pub fn container(kind: &[u8; 4], sections: &[Vec<u8>]) -> Vec<u8> {
    let mut w = Writer::default();
    w.bytes(b"J3D2").bytes(kind).u32(0).u32(sections.len() as u32);
    w.bytes(b"SVR3").fill(12, 0xFF);
    for section in sections {
        w.bytes(section);
    }
    let size = w.pos();
    w.patch_u32(8, size);
    w.buf
}

pub fn stub_section(tag: &[u8; 4], len: usize) -> Vec<u8> {
    let mut w = begin(tag);
    w.fill(len, 0xAB);
    finish(w)
}

pub const HIERARCHY: [u8; 8] = [0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

pub fn inf1_section() -> Vec<u8> {
    let mut w = begin(b"INF1");
    w.u16(0x0002).u16(0xFFFF).u32(1).u32(3).u32(0x18);
    w.bytes(&HIERARCHY);
    finish(w)
}

pub const POSITIONS: [[f32; 3]; 3] = [[0.0, 1.0, 2.0], [-1.5, 0.25, 8.0], [100.0, -4.0, 0.5]];

/// POS (F32 xyz), CLR0 (RGBA8), an NBT record with no data slot and TEX0
/// (S16 st, shift 8).
pub fn vtx1_section() -> Vec<u8> {
    let mut w = begin(b"VTX1");
    w.u32(0x40).fill(13 * 4, 0);
    // attr, count, type, shift
    for (attr, cnt, ty, shift) in [(9u32, 1u32, 4u32, 0u8), (13, 1, 3, 8), (25, 0, 4, 0), (11, 1, 5, 0)] {
        w.u32(attr).u32(cnt).u32(ty).u8(shift).fill(3, 0xFF);
    }
    w.u32(0xFF).u32(1).u32(0).u8(0).fill(3, 0xFF);
    w.align(0x20);
    let pos = w.pos();
    w.patch_u32(0x0C, pos);
    for p in POSITIONS {
        w.f32(p[0]).f32(p[1]).f32(p[2]);
    }
    w.align(0x20);
    let clr = w.pos();
    w.patch_u32(0x0C + 3 * 4, clr);
    w.bytes(&[0xFF, 0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x80, 0x00, 0x00, 0xFF, 0x00]);
    w.align(0x20);
    let tex = w.pos();
    w.patch_u32(0x0C + 5 * 4, tex);
    w.i16(256).i16(-128).i16(0).i16(512).i16(64).i16(32);
    finish(w)
}

pub fn evp1_section(counts: &[u8], indices: &[u16], weights: &[f32], inverse_binds: usize) -> Vec<u8> {
    let mut w = begin(b"EVP1");
    w.u16(counts.len() as u16).u16(0xFFFF).fill(16, 0);
    w.mark(0x0C);
    w.bytes(counts);
    w.mark(0x10);
    for &index in indices {
        w.u16(index);
    }
    w.mark(0x14);
    for &weight in weights {
        w.f32(weight);
    }
    w.mark(0x18);
    for i in 0..inverse_binds {
        for n in 0..12 {
            w.f32((i * 100 + n) as f32);
        }
    }
    finish(w)
}

pub fn drw1_section(kinds: &[u8], params: &[u16]) -> Vec<u8> {
    let mut w = begin(b"DRW1");
    w.u16(kinds.len() as u16).u16(0xFFFF).u32(0).u32(0);
    w.mark(0x0C);
    w.bytes(kinds);
    w.mark(0x10);
    for &param in params {
        w.u16(param);
    }
    finish(w)
}

#[derive(Clone)]
pub struct JointFixture {
    pub matrix_flags: u16,
    pub calc_flags: u8,
    pub scale: [f32; 3],
    pub rotation: [i16; 3],
    pub translation: [f32; 3],
    pub radius: f32,
}

impl Default for JointFixture {
    fn default() -> Self {
        Self {
            matrix_flags: 0x0100,
            calc_flags: 0,
            scale: [1.0; 3],
            rotation: [0; 3],
            translation: [0.0; 3],
            radius: 10.0,
        }
    }
}

/// Joint records are written in storage order.
pub fn jnt1_section(joints: &[JointFixture], remap: &[u16], names: &[&str]) -> Vec<u8> {
    let mut w = begin(b"JNT1");
    w.u16(remap.len() as u16).u16(0xFFFF).fill(12, 0);
    w.align(0x20);
    let table = w.pos();
    w.patch_u32(0x0C, table);
    for j in joints {
        w.u16(j.matrix_flags).u8(j.calc_flags).u8(0xFF);
        w.f32(j.scale[0]).f32(j.scale[1]).f32(j.scale[2]);
        w.i16(j.rotation[0]).i16(j.rotation[1]).i16(j.rotation[2]).u16(0xFFFF);
        w.f32(j.translation[0]).f32(j.translation[1]).f32(j.translation[2]);
        w.f32(j.radius);
        w.f32(-j.radius).f32(-j.radius).f32(-j.radius);
        w.f32(j.radius).f32(j.radius).f32(j.radius);
    }
    w.mark(0x10);
    for &r in remap {
        w.u16(r);
    }
    w.mark(0x14);
    w.bytes(&string_table(names));
    finish(w)
}

#[derive(Clone)]
pub struct MaterialFixture {
    pub name: &'static str,
    pub mode: u8,
    pub attenuation: u8,
    pub texgen_matrix: u8,
    pub tex_mtx_info: u8,
    pub tex_mtx_rotation: i16,
    pub tex_mtx_scale: [f32; 2],
    pub tex_mtx_translation: [f32; 2],
    pub tex_mtx_in_slot8: bool,
    pub fog_type: u8,
    /// start, end, near, far
    pub fog: [f32; 4],
}

impl Default for MaterialFixture {
    fn default() -> Self {
        Self {
            name: "mat",
            mode: 1,
            attenuation: 1,
            texgen_matrix: 30,
            tex_mtx_info: 0x80,
            tex_mtx_rotation: 0,
            tex_mtx_scale: [1.0, 1.0],
            tex_mtx_translation: [0.0, 0.0],
            tex_mtx_in_slot8: false,
            fog_type: 0x02,
            fog: [100.0, 1000.0, 1.0, 10000.0],
        }
    }
}

/// Each material owns entry `i` of every per-material table (texgen, texture
/// matrix, fog, indirect); the other tables hold one shared entry.
pub fn mat3_section(mats: &[MaterialFixture], indirect: bool) -> Vec<u8> {
    let mut w = begin(b"MAT3");
    w.u16(mats.len() as u16).u16(0xFFFF).fill(0x84 - 0x0C, 0);

    w.mark(0x0C);
    for (i, m) in mats.iter().enumerate() {
        material_entry(&mut w, i as u16, m);
    }
    w.mark(0x10);
    for i in 0..mats.len() {
        w.u16(i as u16);
    }
    let names = w.mark(0x14);
    let names_table: Vec<&str> = mats.iter().map(|m| m.name).collect();
    w.bytes(&string_table(&names_table));
    if indirect {
        w.mark(0x18);
        for _ in mats {
            indirect_entry(&mut w);
        }
    } else {
        w.patch_u32(0x18, names);
    }
    w.mark(0x1C);
    w.u32(2);
    w.mark(0x20);
    w.bytes(&[0xFF, 0x80, 0x40, 0xFF]);
    w.mark(0x24);
    w.u8(1);
    w.mark(0x28);
    w.u8(1).u8(1).u8(0x03).u8(2).u8(mats.first().map_or(1, |m| m.attenuation)).u8(0).u16(0xFFFF);
    w.mark(0x2C);
    w.bytes(&[0x32, 0x32, 0x32, 0xFF]);
    w.mark(0x34);
    w.u8(1);
    w.mark(0x38);
    for m in mats {
        w.u8(1).u8(4).u8(m.texgen_matrix).u8(0xFF);
    }
    w.mark(0x40);
    for m in mats {
        w.u8(0).u8(m.tex_mtx_info).u16(0xFFFF);
        w.f32(0.5).f32(0.5).f32(0.0);
        w.f32(m.tex_mtx_scale[0]).f32(m.tex_mtx_scale[1]);
        w.i16(m.tex_mtx_rotation).u16(0xFFFF);
        w.f32(m.tex_mtx_translation[0]).f32(m.tex_mtx_translation[1]);
        for n in 0..16 {
            w.f32(if n % 5 == 0 { 1.0 } else { 0.0 });
        }
    }
    w.mark(0x48);
    w.u16(3);
    w.mark(0x4C);
    w.bytes(&[0x00, 0x00, 0x04, 0xFF]);
    w.mark(0x50);
    w.i16(0x00FF).i16(0).i16(-255).i16(0x00FF);
    w.mark(0x54);
    w.bytes(&[0x10, 0x20, 0x30, 0x40]);
    w.mark(0x58);
    w.u8(1);
    w.mark(0x5C);
    w.bytes(&[0xFF, 0x0F, 0x08, 0x0A, 0x0F, 0x00, 0x00, 0x00, 0x01, 0x00]);
    w.bytes(&[0x07, 0x04, 0x05, 0x07, 0x00, 0x00, 0x00, 0x01, 0x00, 0xFF]);
    w.mark(0x60);
    w.bytes(&[0x00, 0x01, 0xFF, 0xFF]);
    w.mark(0x64);
    w.bytes(&[0x00, 0x01, 0x02, 0x03, 0x03, 0x03, 0x03, 0x03]);
    w.mark(0x68);
    for m in mats {
        w.u8(m.fog_type).u8(0).u16(320);
        w.f32(m.fog[0]).f32(m.fog[1]).f32(m.fog[2]).f32(m.fog[3]);
        w.bytes(&[0x80, 0x80, 0x80, 0xFF]);
        for n in 0..10 {
            w.u16(n);
        }
    }
    w.mark(0x6C);
    w.bytes(&[0x04, 0x80, 0x00, 0x07, 0xFF, 0xFF, 0xFF, 0xFF]);
    w.mark(0x70);
    w.bytes(&[0x01, 0x04, 0x05, 0x03]);
    w.mark(0x74);
    w.bytes(&[0x01, 0x03, 0x01, 0xFF]);
    w.mark(0x78);
    w.bytes(&[0x01, 0xFF, 0xFF, 0xFF]);
    w.mark(0x7C);
    w.u8(1);
    w.mark(0x80);
    w.u8(0);
    finish(w)
}

fn material_entry(w: &mut Writer, i: u16, m: &MaterialFixture) {
    let start = w.pos();
    w.u8(m.mode).u8(0).u8(0).u8(0).u8(0).u8(0).u8(0).u8(0);
    // material colors, color channels, ambient colors, lights
    w.u16(0).u16(0xFFFF);
    w.u16(0).u16(0xFFFF).u16(0xFFFF).u16(0xFFFF);
    w.u16(0).u16(0xFFFF);
    w.fill(16, 0xFF);
    // texgens, post texgens
    w.u16(i).fill(14, 0xFF);
    w.fill(16, 0xFF);
    // texture matrices
    w.u16(i).fill(14, 0xFF);
    w.u16(if m.tex_mtx_in_slot8 { i } else { 0xFFFF }).u16(0xFFFF);
    // post texture matrices
    w.fill(40, 0xFF);
    // textures
    w.u16(0).fill(14, 0xFF);
    // konst colors, konst selections
    w.u16(0).fill(6, 0xFF);
    w.fill(16, 0x0C);
    w.fill(16, 0x1C);
    // tev orders, color registers, tev stages
    w.u16(0).fill(30, 0xFF);
    w.u16(0).fill(6, 0xFF);
    w.u16(0).fill(30, 0xFF);
    // swap modes, swap tables, unknown
    w.u16(0).fill(30, 0xFF);
    w.u16(0).u16(1).u16(0).u16(0);
    w.fill(24, 0xFF);
    // fog, alpha test, blend, nbt scale
    w.u16(i).u16(0).u16(0).u16(0xFFFF);
    debug_assert_eq!(w.pos() - start, 0x14C);
}

fn indirect_entry(w: &mut Writer) {
    let start = w.pos();
    w.u8(1).u8(1).u16(0xFFFF);
    for _ in 0..4 {
        w.bytes(&[0x00, 0x01, 0xFF, 0xFF]);
    }
    for _ in 0..3 {
        w.f32(0.5).f32(0.0).f32(0.0).f32(0.0).f32(0.5).f32(0.0);
        w.i8(1).fill(3, 0xFF);
    }
    for _ in 0..4 {
        w.bytes(&[0x00, 0x01, 0xFF, 0xFF]);
    }
    for _ in 0..16 {
        w.bytes(&[0x00, 0x00, 0x03, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]).fill(3, 0xFF);
    }
    debug_assert_eq!(w.pos() - start, 0x138);
}

#[derive(Clone)]
pub struct TextureFixture {
    pub name: &'static str,
    pub wrap: (u8, u8),
    pub min_lod: u8,
    /// I8 8x4, one level: 32 bytes.
    pub data: Option<Vec<u8>>,
    /// Palette format and entries, two bytes each.
    pub palette: Option<(u8, Vec<u8>)>,
}

impl TextureFixture {
    pub fn new(name: &'static str, fill: u8) -> Self {
        Self { name, wrap: (1, 1), min_lod: 0, data: Some(vec![fill; 32]), palette: None }
    }
}

pub fn tex1_section(textures: &[TextureFixture]) -> Vec<u8> {
    let mut w = begin(b"TEX1");
    w.u16(textures.len() as u16).u16(0xFFFF).u32(0).u32(0);
    w.align(0x20);
    let headers = w.pos();
    w.patch_u32(0x0C, headers);
    for t in textures {
        let (palette_format, palette_count) = match &t.palette {
            Some((format, entries)) => (*format, (entries.len() / 2) as u16),
            None => (0, 0),
        };
        w.u8(0x01).u8(0x00).u16(8).u16(4).u8(t.wrap.0).u8(t.wrap.1);
        w.u8(t.palette.is_some() as u8).u8(palette_format).u16(palette_count).u32(0);
        w.u32(0).u8(1).u8(1).u8(t.min_lod).u8(8).u8(1).u8(0xFF).i16(-50).u32(0);
    }
    w.mark(0x10);
    let names: Vec<&str> = textures.iter().map(|t| t.name).collect();
    w.bytes(&string_table(&names));
    for (i, t) in textures.iter().enumerate() {
        let Some(data) = &t.data else { continue };
        w.align(0x20);
        let header = headers + i as u32 * 0x20;
        let offset = w.pos() - header;
        w.patch_u32(header + 0x1C, offset);
        w.bytes(data);
    }
    for (i, t) in textures.iter().enumerate() {
        let Some((_, entries)) = &t.palette else { continue };
        w.align(0x20);
        let header = headers + i as u32 * 0x20;
        let offset = w.pos() - header;
        w.patch_u32(header + 0x0C, offset);
        w.bytes(entries);
    }
    finish(w)
}

pub fn sample_joints() -> Vec<JointFixture> {
    vec![
        JointFixture { translation: [1.0, 0.0, 0.0], ..Default::default() },
        JointFixture { translation: [2.0, 0.0, 0.0], rotation: [0, 0x7FFF, 0], ..Default::default() },
        JointFixture { translation: [0.0, 0.0, 0.0], calc_flags: 1, ..Default::default() },
    ]
}

/// Every decoded section plus SHP1/MDL3 stubs and an unknown tag, in file order.
pub fn sample_sections() -> Vec<Vec<u8>> {
    vec![
        inf1_section(),
        vtx1_section(),
        evp1_section(&[2, 0, 1], &[5, 1, 3], &[0.25, 0.75, 1.0], 6),
        drw1_section(&[0, 1, 0], &[0, 2, 1]),
        jnt1_section(&sample_joints(), &[2, 0, 1], &["root", "body", "head"]),
        stub_section(b"SHP1", 0x40),
        mat3_section(
            &[
                MaterialFixture { name: "opa", ..Default::default() },
                MaterialFixture { name: "xlu", mode: 4, fog_type: 0x0A, ..Default::default() },
            ],
            true,
        ),
        stub_section(b"MDL3", 0x20),
        tex1_section(&[
            TextureFixture::new("grass", 0x11),
            TextureFixture { wrap: (0, 2), ..TextureFixture::new("grass_clamp", 0x11) },
            TextureFixture::new("rock", 0x22),
        ]),
        stub_section(b"EXT1", 0x10),
    ]
}

pub fn sample_model() -> Vec<u8> { container(b"bmd3", &sample_sections()) }
