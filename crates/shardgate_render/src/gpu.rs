//! Device limits for offscreen portal targets
//!
//! [`validate_descriptor`] is device-free so allocation limits can be checked
//! before a renderer touches the GPU.

use crate::error::RenderError;
use crate::renderer::TargetDescriptor;

/// Reject sizes the device cannot allocate
pub fn validate_descriptor(desc: &TargetDescriptor, limits: &wgpu::Limits) -> Result<(), RenderError> {
    if desc.width == 0 || desc.height == 0 {
        return Err(RenderError::Allocation(format!(
            "zero-sized target {}x{}",
            desc.width, desc.height
        )));
    }
    let max = limits.max_texture_dimension_2d;
    if desc.width > max || desc.height > max {
        return Err(RenderError::Allocation(format!(
            "{}x{} exceeds max texture dimension {}",
            desc.width, desc.height, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetFormat;

    fn desc(width: u32, height: u32) -> TargetDescriptor {
        TargetDescriptor {
            width,
            height,
            format: TargetFormat::HalfFloat,
            depth: true,
        }
    }

    #[test]
    fn test_validate_against_limits() {
        let limits = wgpu::Limits::downlevel_defaults();
        let max = limits.max_texture_dimension_2d;
        assert!(validate_descriptor(&desc(max, max), &limits).is_ok());
        assert!(matches!(
            validate_descriptor(&desc(max + 1, 16), &limits),
            Err(RenderError::Allocation(_))
        ));
        assert!(validate_descriptor(&desc(0, 16), &limits).is_err());
    }
}
