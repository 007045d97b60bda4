use std::fmt;

use crate::error::{FetchError, SurfaceError};

/// Opaque reference to a shader source.
///
/// References are produced by a catalog (name resolution) and interpreted by
/// the [`SourceProvider`] that fetches them; the core never looks inside.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderRef(String);

impl ShaderRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShaderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShaderRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ShaderRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fetches shader source text on behalf of the core.
///
/// Implementations live outside the renderer (file system, HTTP, test
/// doubles). Fetching runs on a worker thread, so providers must be shareable
/// across threads.
pub trait SourceProvider: Send + Sync {
    fn fetch_text(&self, reference: &ShaderRef) -> Result<String, FetchError>;
}

/// Receives lifecycle notifications from a [`crate::Surface`].
///
/// The default implementations ignore every event so callers only override
/// what they display.
pub trait SurfaceObserver {
    /// The drawable's physical size changed; emitted exactly once per
    /// distinct size.
    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// A freshly loaded program was installed and is now rendering.
    fn on_ready(&mut self) {}

    /// A load or switch attempt failed; emitted once per attempt.
    fn on_error(&mut self, error: &SurfaceError) {
        let _ = error;
    }
}

/// Drawable properties sampled by the driver once per frame.
///
/// The core derives physical pixels from the logical size and scale factor;
/// it reads these values and never writes back to the windowing system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawableMetrics {
    pub logical_width: f64,
    pub logical_height: f64,
    pub scale_factor: f64,
}

impl DrawableMetrics {
    pub fn new(logical_width: f64, logical_height: f64, scale_factor: f64) -> Self {
        Self {
            logical_width,
            logical_height,
            scale_factor,
        }
    }

    /// Convenience constructor when the host already reports physical pixels.
    pub fn from_physical(width: u32, height: u32) -> Self {
        Self::new(f64::from(width), f64::from(height), 1.0)
    }

    /// Physical pixel dimensions, floored the same way the canvas sizing the
    /// shaders were authored against floors them. A zero dimension means the
    /// drawable is not presentable this frame.
    pub fn physical_size(&self) -> (u32, u32) {
        let width = (self.logical_width * self.scale_factor).floor().max(0.0) as u32;
        let height = (self.logical_height * self.scale_factor).floor().max(0.0) as u32;
        (width, height)
    }
}

/// Initial settings for a [`crate::Surface`].
#[derive(Clone, Debug)]
pub struct SurfaceConfig {
    /// Swapchain size used until the first frame reports real metrics.
    pub initial_size: (u32, u32),
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            initial_size: (1920, 1080),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_scales_and_floors() {
        let metrics = DrawableMetrics::new(800.0, 600.0, 1.25);
        assert_eq!(metrics.physical_size(), (1000, 750));

        let fractional = DrawableMetrics::new(641.5, 480.2, 1.0);
        assert_eq!(fractional.physical_size(), (641, 480));
    }

    #[test]
    fn physical_constructor_uses_unit_scale() {
        let metrics = DrawableMetrics::from_physical(1920, 1080);
        assert_eq!(metrics.physical_size(), (1920, 1080));
    }

    #[test]
    fn zero_drawable_reports_zero() {
        let metrics = DrawableMetrics::new(0.0, 600.0, 2.0);
        assert_eq!(metrics.physical_size().0, 0);
    }

    #[test]
    fn shader_ref_round_trips() {
        let reference = ShaderRef::from("shaders/plasma.frag");
        assert_eq!(reference.as_str(), "shaders/plasma.frag");
        assert_eq!(reference.to_string(), "shaders/plasma.frag");
    }
}
