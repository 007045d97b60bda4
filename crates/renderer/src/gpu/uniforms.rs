use bytemuck::{Pod, Zeroable};

/// CPU mirror of the `FrameParams` block injected by the fragment wrapper.
///
/// Layout must observe std140 rules: the vec2 sits at offset 0, the two
/// floats fill the rest of the 16-byte block.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _pad: f32,
}

unsafe impl Zeroable for FrameUniforms {}
unsafe impl Pod for FrameUniforms {}

impl FrameUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            time: 0.0,
            _pad: 0.0,
        }
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32];
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_occupies_one_std140_row() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 16);
        assert_eq!(std::mem::align_of::<FrameUniforms>(), 16);
    }
}
