//! Core rendering engine for fragview.
//!
//! The crate compiles caller-supplied fragment shaders against a fixed
//! full-screen quad and drives the per-frame draw cycle. The overall flow:
//!
//! ```text
//!   playback / UI
//!        │ load_shader(reference)
//!        ▼
//!   Surface ──▶ fetch worker ──▶ compile ──▶ link ──▶ active program
//!        │                                               │
//!        └──── render_frame() every display refresh ◀────┘
//! ```
//!
//! [`Surface`] owns every GPU resource (context, quad, uniform block, active
//! program) and enforces the switch protocol: a new shader request fetches
//! and compiles off to the side while the previous program keeps rendering,
//! and only a confirmed-good replacement is swapped in. Overlapping requests
//! resolve last-requested-wins via generation tickets.
//!
//! Shader text is fetched through the [`SourceProvider`] seam and lifecycle
//! events flow back through [`SurfaceObserver`]; both are implemented
//! outside this crate.

mod clock;
mod compile;
mod error;
mod gpu;
mod surface;
mod types;
mod viewport;

pub use clock::RenderClock;
pub use compile::UniformUsage;
pub use error::{CompileDiagnostic, FetchError, ShaderStage, SurfaceError};
pub use surface::{RenderTarget, Surface, SurfacePhase};
pub use types::{DrawableMetrics, ShaderRef, SourceProvider, SurfaceConfig, SurfaceObserver};
