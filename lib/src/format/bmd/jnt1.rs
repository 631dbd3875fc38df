use std::f32::consts::PI;

use binrw::binread;
use glam::{EulerRot, Quat, Vec3};
use serde_derive::Serialize;

use crate::{
    ensure_format,
    format::{
        bmd::common::{read_string_table, table_name, RemapTable},
        error::Result,
    },
    util::cursor::ByteCursor,
};

#[binread]
#[derive(Clone, Debug)]
struct SJointRecord {
    matrix_flags: u16,
    calc_flags: u8,
    #[br(temp)]
    _pad0: u8,
    scale: [f32; 3],
    rotation: [i16; 3],
    #[br(temp)]
    _pad1: u16,
    translation: [f32; 3],
    radius: f32,
    bbox_min: [f32; 3],
    bbox_max: [f32; 3],
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct JointTransform {
    pub scale: Vec3,
    /// Euler angles in radians.
    pub rotation: Vec3,
    /// `rotation` applied X, then Y, then Z.
    pub orientation: Quat,
    pub translation: Vec3,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Joint {
    pub name: String,
    pub matrix_flags: u16,
    /// Maya / SoftImage scaling compatibility flags.
    pub calc_flags: u8,
    pub transform: JointTransform,
    pub bounding_radius: f32,
    pub bbox: Aabb,
}

/// Joints in logical (remapped) order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Jnt1 {
    pub joints: Vec<Joint>,
}

/// Stored angles are fractions of a half turn.
#[inline]
pub fn angle_from_raw(raw: i16) -> f32 { raw as f32 / 0x7FFF as f32 * PI }

impl Jnt1 {
    pub fn read(cur: &mut ByteCursor, start: u64, _size: u64) -> Result<Self> {
        cur.seek(start + 0x08)?;
        let count = cur.read_u16()?;
        let sentinel = cur.read_u16()?;
        ensure_format!(cur, sentinel == 0xFFFF, "unexpected JNT1 header sentinel {sentinel:#06X}");
        let joint_table = start + cur.read_u32()? as u64;
        let remap_table = start + cur.read_u32()? as u64;
        let name_table = start + cur.read_u32()? as u64;

        let remap = RemapTable::read(cur, remap_table, count)?;
        let names = read_string_table(cur, name_table)?;
        let mut joints = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let name = table_name(cur, &names, i)?;
            let record =
                cur.read_record_at::<SJointRecord>(joint_table + remap.storage_index(i) * 0x40)?;
            let rotation = Vec3::from(record.rotation.map(angle_from_raw));
            joints.push(Joint {
                name,
                matrix_flags: record.matrix_flags & 0x00FF,
                calc_flags: record.calc_flags,
                transform: JointTransform {
                    scale: Vec3::from(record.scale),
                    rotation,
                    orientation: Quat::from_euler(EulerRot::ZYX, rotation.z, rotation.y, rotation.x),
                    translation: Vec3::from(record.translation),
                },
                bounding_radius: record.radius,
                bbox: Aabb { min: Vec3::from(record.bbox_min), max: Vec3::from(record.bbox_max) },
            });
        }
        Ok(Self { joints })
    }
}
