/// Slot layout - byte layout of one uniform slot and the matrix collaborator
///
/// A slot holds, in order: the projection matrix, the model-view matrix and
/// a 16-byte flags region. The flags region is padded to 16 bytes whatever
/// the number of flags, to satisfy uniform buffer alignment.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Size of one matrix element in bytes
pub const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

/// Elements in a 4x4 matrix
pub const FLOATS_PER_MATRIX: usize = 16;

/// Size of one matrix in bytes
pub const MATRIX_SIZE: usize = FLOAT_SIZE * FLOATS_PER_MATRIX;

/// Matrices per slot (projection, model-view)
pub const NUMBER_OF_MATRICES: usize = 2;

/// Size of the trailing flags region in bytes
pub const FLAGS_REGION_SIZE: usize = 16;

/// Total size of one slot in bytes
pub const SLOT_SIZE: usize = MATRIX_SIZE * NUMBER_OF_MATRICES + FLAGS_REGION_SIZE;

/// Raw contiguous bytes of a 4x4 float matrix
///
/// The rotator copies these bytes untouched; row- or column-major order is
/// whatever the caller and its shaders agree on. `glam::Mat4` is column-major.
pub trait RawMatrix {
    /// Exactly `MATRIX_SIZE` bytes
    fn raw_bytes(&self) -> &[u8];
}

impl RawMatrix for Mat4 {
    fn raw_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl RawMatrix for [f32; FLOATS_PER_MATRIX] {
    fn raw_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl RawMatrix for [[f32; 4]; 4] {
    fn raw_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Boolean flags packed at the start of the flags region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotFlags {
    pub flag0: bool,
    pub flag1: bool,
}

impl SlotFlags {
    pub fn new(flag0: bool, flag1: bool) -> Self {
        Self { flag0, flag1 }
    }
}

/// Byte image of one slot, written in a single update
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SlotLayout {
    pub projection: [u8; MATRIX_SIZE],
    pub model_view: [u8; MATRIX_SIZE],
    pub flags: [u8; FLAGS_REGION_SIZE],
}

impl SlotLayout {
    /// Offset of the projection matrix
    pub const PROJECTION_OFFSET: usize = 0;
    /// Offset of the model-view matrix
    pub const MODEL_VIEW_OFFSET: usize = MATRIX_SIZE;
    /// Offset of the flags region
    pub const FLAGS_OFFSET: usize = MATRIX_SIZE * NUMBER_OF_MATRICES;

    /// Build the full slot image
    ///
    /// Unused flag bytes are zero so every byte of the slot is rewritten.
    /// Matrix bytes beyond `MATRIX_SIZE` are ignored; short inputs leave the
    /// remainder zeroed.
    pub fn new<P, M>(projection: &P, model_view: &M, flags: SlotFlags) -> Self
    where
        P: RawMatrix + ?Sized,
        M: RawMatrix + ?Sized,
    {
        let mut layout = Self::zeroed();
        copy_matrix(&mut layout.projection, projection.raw_bytes());
        copy_matrix(&mut layout.model_view, model_view.raw_bytes());
        layout.flags[0] = flags.flag0 as u8;
        layout.flags[1] = flags.flag1 as u8;
        layout
    }

    /// The slot as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

fn copy_matrix(dst: &mut [u8; MATRIX_SIZE], src: &[u8]) {
    debug_assert_eq!(src.len(), MATRIX_SIZE, "RawMatrix::raw_bytes must return MATRIX_SIZE bytes");
    let len = src.len().min(MATRIX_SIZE);
    dst[..len].copy_from_slice(&src[..len]);
}

#[cfg(test)]
#[path = "slot_layout_tests.rs"]
mod tests;
