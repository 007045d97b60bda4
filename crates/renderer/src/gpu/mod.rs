//! GPU plumbing behind the surface lifecycle.
//!
//! - `context` owns wgpu instance/device/swapchain wiring and knows how to
//!   reconfigure when the drawable resizes or the surface is lost.
//! - `geometry` uploads the static full-screen quad shared by every program.
//! - `uniforms` mirrors the injected frame uniform block on the CPU.
//! - `pipeline` links validated stages into a render pipeline, capturing
//!   link failures as diagnostics instead of device errors.

pub(crate) mod context;
pub(crate) mod geometry;
pub(crate) mod pipeline;
pub(crate) mod uniforms;
