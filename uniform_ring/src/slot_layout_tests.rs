//! Unit tests for slot_layout.rs
//!
//! Tests sizes, offsets and the byte image written for one slot.

use crate::slot_layout::*;
use glam::{Mat4, Vec3};

#[test]
fn test_slot_sizes() {
    assert_eq!(MATRIX_SIZE, 64);
    assert_eq!(SLOT_SIZE, 144);
    assert_eq!(std::mem::size_of::<SlotLayout>(), SLOT_SIZE);
}

#[test]
fn test_slot_offsets() {
    assert_eq!(SlotLayout::PROJECTION_OFFSET, 0);
    assert_eq!(SlotLayout::MODEL_VIEW_OFFSET, 64);
    assert_eq!(SlotLayout::FLAGS_OFFSET, 128);
}

#[test]
fn test_mat4_raw_bytes_are_column_major_floats() {
    let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let bytes = m.raw_bytes();

    assert_eq!(bytes.len(), MATRIX_SIZE);
    // Translation lives in column 3 -> floats 12..15
    assert_eq!(&bytes[48..52], &1.0f32.to_ne_bytes());
    assert_eq!(&bytes[52..56], &2.0f32.to_ne_bytes());
    assert_eq!(&bytes[56..60], &3.0f32.to_ne_bytes());
}

#[test]
fn test_array_matrices_match_mat4() {
    let m = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
    let flat: [f32; 16] = m.to_cols_array();
    let nested: [[f32; 4]; 4] = m.to_cols_array_2d();

    assert_eq!(flat.raw_bytes(), m.raw_bytes());
    assert_eq!(nested.raw_bytes(), m.raw_bytes());
}

#[test]
fn test_layout_bytes() {
    let projection = Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0);
    let model_view = Mat4::from_scale(Vec3::splat(2.0));

    let layout = SlotLayout::new(&projection, &model_view, SlotFlags::new(true, false));
    let bytes = layout.as_bytes();

    assert_eq!(bytes.len(), SLOT_SIZE);
    assert_eq!(&bytes[0..64], projection.raw_bytes());
    assert_eq!(&bytes[64..128], model_view.raw_bytes());
    assert_eq!(bytes[128], 1);
    assert_eq!(bytes[129], 0);
    assert!(bytes[130..].iter().all(|&b| b == 0));
}

#[test]
fn test_both_flags_set() {
    let layout = SlotLayout::new(&Mat4::IDENTITY, &Mat4::IDENTITY, SlotFlags::new(true, true));
    assert_eq!(&layout.flags[..2], &[1, 1]);
}

#[test]
fn test_default_flags_are_false() {
    assert_eq!(SlotFlags::default(), SlotFlags::new(false, false));
}

struct ShortMatrix([f32; 4]);

impl RawMatrix for ShortMatrix {
    fn raw_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.0)
    }
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "MATRIX_SIZE")]
fn test_short_raw_matrix_is_caught_in_debug() {
    SlotLayout::new(&ShortMatrix([1.0; 4]), &Mat4::IDENTITY, SlotFlags::default());
}
