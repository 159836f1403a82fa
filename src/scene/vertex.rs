/// Endpoint of a thick line segment, laid out for direct upload.
///
/// Layout: 32 bytes total.
/// - position: [f32; 2] = 8 bytes - Screen pixels
/// - thickness: f32 = 4 bytes - Line width in pixels
/// - _padding: f32 = 4 bytes - Keeps color 16-byte aligned
/// - color: [f32; 4] = 16 bytes - RGBA in [0, 1]
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub thickness: f32,
    pub _padding: f32,
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: [f32; 2], thickness: f32, color: [f32; 4]) -> Self {
        Self {
            position,
            thickness,
            _padding: 0.0,
            color,
        }
    }

    /// Both endpoints of one segment, for a line-list vertex buffer
    pub fn segment(from: [f32; 2], to: [f32; 2], thickness: f32, color: [f32; 4]) -> [Self; 2] {
        [
            Self::new(from, thickness, color),
            Self::new(to, thickness, color),
        ]
    }
}

/// Raw bytes of a vertex list
pub fn as_bytes(vertices: &[LineVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}
