use glam::{Mat4, Vec4};
use serde_derive::Serialize;

use crate::{format::error::Result, util::cursor::ByteCursor};

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct WeightedBone {
    pub index: u16,
    /// Not normalized.
    pub weight: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Envelope {
    pub weighted_bones: Vec<WeightedBone>,
}

/// Skinning envelopes and inverse bind matrices.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Evp1 {
    pub envelopes: Vec<Envelope>,
    /// Indexed by bone; `max bone index + 1` entries, none without weighted bones.
    pub inverse_binds: Vec<Mat4>,
}

/// Expands a row-major 3x4 affine matrix into a column-major [`Mat4`] with
/// translation in the last column.
pub fn affine_from_rows(m: &[f32; 12]) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(m[0], m[4], m[8], 0.0),
        Vec4::new(m[1], m[5], m[9], 0.0),
        Vec4::new(m[2], m[6], m[10], 0.0),
        Vec4::new(m[3], m[7], m[11], 1.0),
    )
}

impl Evp1 {
    pub fn read(cur: &mut ByteCursor, start: u64, _size: u64) -> Result<Self> {
        cur.seek(start + 0x08)?;
        let count = cur.read_u16()?;
        cur.skip(2)?;
        let count_table = start + cur.read_u32()? as u64;
        let index_table = start + cur.read_u32()? as u64;
        let weight_table = start + cur.read_u32()? as u64;
        let inverse_bind_table = start + cur.read_u32()? as u64;

        // Entries of all envelopes are packed back to back in the index and
        // weight tables.
        let mut weighted_bone_id = 0u64;
        let mut max_bone: Option<u16> = None;
        let mut envelopes = Vec::with_capacity(count as usize);
        for i in 0..count as u64 {
            cur.seek(count_table + i)?;
            let bone_count = cur.read_u8()?;
            let mut weighted_bones = Vec::with_capacity(bone_count as usize);
            for _ in 0..bone_count {
                cur.seek(index_table + weighted_bone_id * 2)?;
                let index = cur.read_u16()?;
                cur.seek(weight_table + weighted_bone_id * 4)?;
                let weight = cur.read_f32()?;
                weighted_bones.push(WeightedBone { index, weight });
                max_bone = max_bone.max(Some(index));
                weighted_bone_id += 1;
            }
            envelopes.push(Envelope { weighted_bones });
        }

        let bind_count = max_bone.map_or(0, |m| m as u64 + 1);
        let mut inverse_binds = Vec::with_capacity(bind_count as usize);
        for i in 0..bind_count {
            let rows = cur.read_record_at::<[f32; 12]>(inverse_bind_table + i * 0x30)?;
            inverse_binds.push(affine_from_rows(&rows));
        }
        Ok(Self { envelopes, inverse_binds })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::format::{bmd::test_util::*, error::J3dError};

    #[test]
    fn running_bone_counter() {
        let data = evp1_section(&[2, 0, 1], &[5, 1, 3], &[0.25, 0.75, 1.0], 6);
        let (mut cur, size) = enter(&data);
        let evp1 = Evp1::read(&mut cur, 0, size).unwrap();
        let bones: Vec<Vec<(u16, f32)>> = evp1
            .envelopes
            .iter()
            .map(|e| e.weighted_bones.iter().map(|b| (b.index, b.weight)).collect())
            .collect();
        assert_eq!(bones, vec![vec![(5, 0.25), (1, 0.75)], vec![], vec![(3, 1.0)]]);
        assert_eq!(evp1.inverse_binds.len(), 6);
    }

    #[test]
    fn inverse_bind_layout() {
        let data = evp1_section(&[1], &[1], &[1.0], 2);
        let (mut cur, size) = enter(&data);
        let evp1 = Evp1::read(&mut cur, 0, size).unwrap();
        let m = evp1.inverse_binds[1];
        // Rows on disk: [100 101 102 103] [104 105 106 107] [108 109 110 111]
        assert_eq!(m.x_axis, Vec4::new(100.0, 104.0, 108.0, 0.0));
        assert_eq!(m.w_axis, Vec4::new(103.0, 107.0, 111.0, 1.0));
        assert_eq!(m.row(3), Vec4::new(0.0, 0.0, 0.0, 1.0));
        let identity = affine_from_rows(&[1.0, 0.0, 0.0, 5.0, 0.0, 1.0, 0.0, 6.0, 0.0, 0.0, 1.0, 7.0]);
        assert_eq!(identity.transform_point3(Vec3::ZERO), Vec3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn no_weighted_bones() {
        let data = evp1_section(&[0, 0], &[], &[], 0);
        let (mut cur, size) = enter(&data);
        let evp1 = Evp1::read(&mut cur, 0, size).unwrap();
        assert_eq!(evp1.envelopes.len(), 2);
        assert!(evp1.inverse_binds.is_empty());
    }

    #[test]
    fn bone_index_past_inverse_binds() {
        // Bone 40 needs 41 matrices but the section holds 2
        let data = evp1_section(&[1], &[40], &[1.0], 2);
        let (mut cur, size) = enter(&data);
        let err = Evp1::read(&mut cur, 0, size).unwrap_err();
        assert!(matches!(err, J3dError::OutOfBounds { section, .. } if section == *b"EVP1"));
    }
}
