use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::clock::RenderClock;
use crate::compile::{compile_fragment_stage, compile_vertex_stage, CompiledStage};
use crate::error::{FetchError, SurfaceError};
use crate::gpu::context::GpuContext;
use crate::gpu::geometry::{QuadGeometry, QUAD_VERTEX_COUNT};
use crate::gpu::pipeline::{link, ProgramLayouts, ShaderProgram};
use crate::gpu::uniforms::FrameUniforms;
use crate::types::{DrawableMetrics, ShaderRef, SourceProvider, SurfaceConfig, SurfaceObserver};
use crate::viewport::ViewportTracker;

/// Windowing target a [`Surface`] renders into.
pub trait RenderTarget: HasDisplayHandle + HasWindowHandle {}

impl<T: HasDisplayHandle + HasWindowHandle + ?Sized> RenderTarget for T {}

/// Lifecycle phase of a [`Surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfacePhase {
    Uninitialized,
    Loading,
    Ready,
    SwitchingProgram,
    Failed,
}

/// Monotonic ticket dispenser enforcing last-requested-wins for shader
/// switches: a result may only install while its ticket is still current.
#[derive(Debug, Default)]
struct SwitchArbiter {
    generation: u64,
}

impl SwitchArbiter {
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn accepts(&self, ticket: u64) -> bool {
        ticket == self.generation
    }

    fn invalidate(&mut self) {
        self.generation += 1;
    }
}

/// A fetch in flight on a worker thread, tagged with its ticket.
struct PendingLoad {
    ticket: u64,
    reference: ShaderRef,
    receiver: Receiver<Result<String, FetchError>>,
}

/// GPU objects shared by every program on one context: the quad, the fixed
/// vertex stage, and the frame uniform block. Installed once per context.
struct SharedResources {
    layouts: ProgramLayouts,
    vertex: CompiledStage,
    quad: QuadGeometry,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: FrameUniforms,
}

impl SharedResources {
    fn install(device: &wgpu::Device, size: (u32, u32)) -> Result<Self, SurfaceError> {
        // The built-in vertex stage failing to validate means the host
        // shader front-end is broken, not the user shader.
        let vertex = compile_vertex_stage().map_err(|diagnostic| {
            SurfaceError::ResourceCreation(format!(
                "built-in vertex shader rejected: {diagnostic}"
            ))
        })?;

        let layouts = ProgramLayouts::new(device);
        let quad = QuadGeometry::new(device);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniform buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            layouts,
            vertex,
            quad,
            uniform_buffer,
            uniform_bind_group,
            uniforms: FrameUniforms::new(size.0, size.1),
        })
    }
}

/// One drawable's rendering engine.
///
/// Owns the graphics context, the active program, the geometry, and the
/// animation clock; constructed explicitly and torn down explicitly. The
/// driver calls [`Surface::render_frame`] once per display refresh and the
/// playback layer steers it through [`Surface::load_shader`].
pub struct Surface<W: RenderTarget> {
    target: Arc<W>,
    provider: Arc<dyn SourceProvider>,
    observer: Box<dyn SurfaceObserver>,
    config: SurfaceConfig,
    phase: SurfacePhase,
    gpu: Option<GpuContext>,
    shared: Option<SharedResources>,
    program: Option<ShaderProgram>,
    pending: Option<PendingLoad>,
    arbiter: SwitchArbiter,
    clock: RenderClock,
    viewport: ViewportTracker,
    running: bool,
}

impl<W: RenderTarget> Surface<W> {
    pub fn new(
        target: Arc<W>,
        provider: Arc<dyn SourceProvider>,
        observer: Box<dyn SurfaceObserver>,
        config: SurfaceConfig,
    ) -> Self {
        Self {
            target,
            provider,
            observer,
            config,
            phase: SurfacePhase::Uninitialized,
            gpu: None,
            shared: None,
            program: None,
            pending: None,
            arbiter: SwitchArbiter::default(),
            clock: RenderClock::start(),
            viewport: ViewportTracker::default(),
            running: false,
        }
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Reference of the currently rendering program, if any.
    pub fn current_shader(&self) -> Option<&ShaderRef> {
        self.program.as_ref().map(|program| &program.reference)
    }

    /// Requests `reference` as the active shader.
    ///
    /// Supersedes any switch still in flight; the previous program (if any)
    /// keeps rendering until the replacement is confirmed ready, and keeps
    /// rendering permanently if the replacement fails.
    pub fn load_shader(&mut self, reference: ShaderRef) {
        let ticket = self.arbiter.begin();

        if self.gpu.is_none() {
            match GpuContext::new(self.target.as_ref(), self.config.initial_size) {
                Ok(context) => self.gpu = Some(context),
                Err(err) => {
                    self.pending = None;
                    self.fail(SurfaceError::ContextUnavailable(format!("{err:#}")));
                    return;
                }
            }
        }

        tracing::info!(shader = %reference, "loading shader");
        let (sender, receiver) = bounded(1);
        let provider = Arc::clone(&self.provider);
        let fetch_reference = reference.clone();
        thread::spawn(move || {
            let _ = sender.send(provider.fetch_text(&fetch_reference));
        });

        self.pending = Some(PendingLoad {
            ticket,
            reference,
            receiver,
        });
        self.phase = if self.program.is_some() {
            SurfacePhase::SwitchingProgram
        } else {
            SurfacePhase::Loading
        };
    }

    /// Restarts elapsed time for the next frame. The active program and GPU
    /// resources are untouched.
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    /// Stops the render loop and releases every owned GPU resource. Any
    /// in-flight switch result is discarded when it eventually arrives.
    pub fn teardown(&mut self) {
        self.arbiter.invalidate();
        self.pending = None;
        self.running = false;
        self.program = None;
        self.shared = None;
        self.gpu = None;
        self.viewport.reset();
        self.phase = SurfacePhase::Uninitialized;
        tracing::debug!("surface torn down");
    }

    /// Runs one pass of the per-frame algorithm.
    ///
    /// Driven by the host's redraw callback. Missing resources make this a
    /// no-op pass rather than an error; the frame scheduler must never
    /// crash.
    pub fn render_frame(&mut self, metrics: DrawableMetrics) {
        self.poll_pending();

        if !self.running {
            return;
        }
        let physical = metrics.physical_size();
        if physical.0 == 0 || physical.1 == 0 {
            return;
        }

        let (Some(gpu), Some(shared), Some(program)) = (
            self.gpu.as_mut(),
            self.shared.as_mut(),
            self.program.as_ref(),
        ) else {
            return;
        };

        if let Some((width, height)) = self.viewport.observe(physical) {
            gpu.resize((width, height));
            shared.uniforms.set_resolution(width, height);
            self.observer.on_resize(width, height);
        }

        shared.uniforms.set_time(self.clock.elapsed_seconds());
        if program.uniforms.needs_upload() {
            gpu.queue.write_buffer(
                &shared.uniform_buffer,
                0,
                bytemuck::bytes_of(&shared.uniforms),
            );
        }

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::trace!("surface timeout; skipping frame");
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                let error = SurfaceError::ResourceCreation("surface out of memory".into());
                tracing::error!(%error, "stopping render loop");
                self.observer.on_error(&error);
                self.running = false;
                self.phase = SurfacePhase::Failed;
                return;
            }
            Err(other) => {
                tracing::warn!(error = ?other, "surface error; retrying next frame");
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &shared.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, shared.quad.vertex_buffer.slice(..));
            pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    /// Resolves a completed fetch, honoring last-requested-wins.
    fn poll_pending(&mut self) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };

        let outcome = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(FetchError::Io {
                reference: pending.reference.to_string(),
                message: "fetch worker exited without a result".into(),
            }),
        };

        let pending = self.pending.take().expect("pending load present");
        if !self.arbiter.accepts(pending.ticket) {
            tracing::debug!(shader = %pending.reference, "discarding superseded shader load");
            return;
        }

        match outcome {
            Ok(text) => self.install_program(pending.reference, &text),
            Err(err) => self.fail_switch(SurfaceError::Fetch(err)),
        }
    }

    /// Compiles, links, and installs a fetched shader as the active program.
    fn install_program(&mut self, reference: ShaderRef, source: &str) {
        let fragment = match compile_fragment_stage(source) {
            Ok(stage) => stage,
            Err(diagnostic) => {
                self.fail_switch(SurfaceError::Compile(diagnostic));
                return;
            }
        };

        if self.gpu.is_none() {
            // Torn down between fetch completion and install.
            return;
        }

        if self.shared.is_none() {
            let installed = {
                let gpu = self.gpu.as_ref().expect("context present");
                SharedResources::install(&gpu.device, gpu.size)
            };
            match installed {
                Ok(shared) => self.shared = Some(shared),
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        }

        let linked = {
            let gpu = self.gpu.as_ref().expect("context present");
            let shared = self.shared.as_ref().expect("shared resources present");
            link(
                &gpu.device,
                &shared.layouts,
                gpu.surface_format,
                &shared.vertex,
                &fragment,
                reference,
            )
        };

        match linked {
            Ok(program) => {
                tracing::info!(shader = %program.reference, "shader ready");
                // The superseded program is released only after the new one
                // is in place.
                let superseded = self.program.replace(program);
                drop(superseded);
                self.clock.reset();
                self.phase = SurfacePhase::Ready;
                self.running = true;
                self.observer.on_ready();
            }
            Err(diagnostic) => self.fail_switch(SurfaceError::Compile(diagnostic)),
        }
    }

    /// Recoverable failure: report once, keep the previous program on
    /// screen if there is one.
    fn fail_switch(&mut self, error: SurfaceError) {
        tracing::warn!(%error, "shader load failed");
        self.observer.on_error(&error);
        if self.program.is_some() {
            self.phase = SurfacePhase::Ready;
        } else {
            self.phase = SurfacePhase::Failed;
            self.running = false;
        }
    }

    /// Fatal failure: nothing renders until a fresh `load_shader` succeeds.
    fn fail(&mut self, error: SurfaceError) {
        tracing::error!(%error, "surface failure");
        self.observer.on_error(&error);
        self.phase = SurfacePhase::Failed;
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_ticket_supersedes_earlier() {
        let mut arbiter = SwitchArbiter::default();
        let first = arbiter.begin();
        let second = arbiter.begin();
        assert!(!arbiter.accepts(first));
        assert!(arbiter.accepts(second));
    }

    #[test]
    fn overlapping_requests_keep_only_the_last() {
        let mut arbiter = SwitchArbiter::default();
        let b = arbiter.begin();
        let c = arbiter.begin();
        // B resolves late: its result must be discarded even though it
        // finished after C was requested.
        assert!(!arbiter.accepts(b));
        assert!(arbiter.accepts(c));
    }

    #[test]
    fn teardown_invalidates_inflight_tickets() {
        let mut arbiter = SwitchArbiter::default();
        let ticket = arbiter.begin();
        arbiter.invalidate();
        assert!(!arbiter.accepts(ticket));
    }

    #[test]
    fn fetch_worker_reports_through_the_channel() {
        struct StaticProvider;

        impl SourceProvider for StaticProvider {
            fn fetch_text(&self, reference: &ShaderRef) -> Result<String, FetchError> {
                Ok(format!("// {reference}"))
            }
        }

        let provider: Arc<dyn SourceProvider> = Arc::new(StaticProvider);
        let (sender, receiver) = bounded(1);
        let reference = ShaderRef::from("shaders/demo.frag");
        let worker_provider = Arc::clone(&provider);
        let worker_reference = reference.clone();
        thread::spawn(move || {
            let _ = sender.send(worker_provider.fetch_text(&worker_reference));
        });

        let text = receiver
            .recv()
            .expect("worker result")
            .expect("fetch succeeds");
        assert_eq!(text, "// shaders/demo.frag");
    }
}
