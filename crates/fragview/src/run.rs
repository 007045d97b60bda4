use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use catalog::{ShaderCatalog, SourceClient};
use playback::Rotation;
use renderer::{DrawableMetrics, Surface, SurfaceConfig, SurfaceError, SurfaceObserver};
use tracing_subscriber::EnvFilter;
use viewconfig::{parse_size, ViewConfig};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::cli::Cli;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Logs core lifecycle events where the web app showed overlays.
struct UiObserver;

impl SurfaceObserver for UiObserver {
    fn on_resize(&mut self, width: u32, height: u32) {
        tracing::info!("surface resized to {width} x {height}");
    }

    fn on_ready(&mut self) {
        tracing::debug!("shader program ready");
    }

    fn on_error(&mut self, error: &SurfaceError) {
        if error.is_fatal() {
            tracing::error!(%error, "surface failure");
        } else {
            tracing::warn!(%error, "shader rejected; keeping previous program");
        }
    }
}

struct SessionSettings {
    auto_advance: Option<Duration>,
    surface_size: (u32, u32),
    order: Vec<String>,
}

fn resolve_settings(cli: &Cli) -> Result<SessionSettings> {
    let config = match &cli.config {
        Some(path) => ViewConfig::load(path)
            .with_context(|| format!("loading config '{}'", path.display()))?,
        None => {
            let default_path = Path::new("fragview.toml");
            if default_path.exists() {
                ViewConfig::load(default_path).context("loading fragview.toml")?
            } else {
                ViewConfig::default()
            }
        }
    };

    let mut auto_advance = config.rotation.auto.then_some(config.rotation.interval);
    if cli.no_auto {
        auto_advance = None;
    }
    if let Some(seconds) = cli.interval {
        auto_advance = (seconds > 0.0).then(|| Duration::from_secs_f32(seconds));
    }

    let surface_size = match &cli.size {
        Some(raw) => parse_size(raw).map_err(|err| anyhow!(err))?,
        None => config.surface.size,
    };

    Ok(SessionSettings {
        auto_advance,
        surface_size,
        order: config.rotation.order,
    })
}

/// Rotation order: configured names first, remaining catalog entries
/// appended alphabetically.
fn rotation_names(catalog: &ShaderCatalog, order: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    for name in order {
        if catalog.resolve(name).is_some() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        } else {
            tracing::warn!(shader = %name, "configured shader not found in catalog");
        }
    }
    for name in catalog.names() {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

pub fn run(cli: Cli) -> Result<()> {
    let settings = resolve_settings(&cli)?;
    let catalog = ShaderCatalog::discover(&cli.shader_dir)
        .with_context(|| format!("discovering shaders in '{}'", cli.shader_dir.display()))?;

    if cli.list {
        if catalog.is_empty() {
            println!("No shaders found in {}", cli.shader_dir.display());
        } else {
            println!("Available shaders:");
            for name in catalog.names() {
                println!("  {name}");
            }
        }
        return Ok(());
    }

    if catalog.is_empty() {
        bail!(
            "no .frag shaders found in '{}'; point --shader-dir at a shader directory",
            cli.shader_dir.display()
        );
    }

    let names = rotation_names(&catalog, &settings.order);
    let mut rotation = Rotation::new(names, settings.auto_advance, Instant::now())?;
    if let Some(initial) = &cli.shader {
        rotation
            .select(initial, Instant::now())
            .map_err(|err| anyhow!(err))?;
    }

    let provider = Arc::new(SourceClient::new()?);

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(settings.surface_size.0, settings.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("fragview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create window")?;
    let window = Arc::new(window);

    let mut surface = Surface::new(
        window.clone(),
        provider,
        Box::new(UiObserver),
        SurfaceConfig {
            initial_size: settings.surface_size,
        },
    );

    let initial = catalog
        .resolve(rotation.current())
        .cloned()
        .ok_or_else(|| anyhow!("shader '{}' missing from catalog", rotation.current()))?;
    surface.load_shader(initial);
    window.request_redraw();

    let loop_window = window.clone();
    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == loop_window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            surface.teardown();
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            handle_key(&event, &mut surface, &mut rotation, &catalog);
                        }
                        WindowEvent::RedrawRequested => {
                            surface.render_frame(drawable_metrics(&loop_window));
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    if let Some(name) = rotation.tick(Instant::now()) {
                        let name = name.to_string();
                        load_by_name(&catalog, &mut surface, &name);
                    }
                    // Keep redraws flowing at the display's refresh rate.
                    loop_window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

fn drawable_metrics(window: &Window) -> DrawableMetrics {
    let scale_factor = window.scale_factor();
    let logical = window.inner_size().to_logical::<f64>(scale_factor);
    DrawableMetrics::new(logical.width, logical.height, scale_factor)
}

fn handle_key(
    event: &KeyEvent,
    surface: &mut Surface<Window>,
    rotation: &mut Rotation,
    catalog: &ShaderCatalog,
) {
    if event.state != ElementState::Pressed || event.repeat {
        return;
    }

    match &event.logical_key {
        Key::Named(NamedKey::ArrowRight) => {
            let name = rotation.advance(Instant::now()).to_string();
            load_by_name(catalog, surface, &name);
        }
        Key::Named(NamedKey::ArrowLeft) => {
            let name = rotation.rewind(Instant::now()).to_string();
            load_by_name(catalog, surface, &name);
        }
        Key::Character(value) if value.as_str() == "r" => {
            surface.reset_clock();
        }
        _ => {}
    }
}

fn load_by_name(catalog: &ShaderCatalog, surface: &mut Surface<Window>, name: &str) {
    match catalog.resolve(name) {
        Some(reference) => {
            tracing::info!(shader = name, "switching shader");
            surface.load_shader(reference.clone());
        }
        None => tracing::warn!(shader = name, "shader missing from catalog"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::ShaderRef;

    #[test]
    fn rotation_order_prefers_configured_names() {
        let mut catalog = ShaderCatalog::new();
        catalog.insert("alpha", ShaderRef::new("shaders/alpha.frag"));
        catalog.insert("beta", ShaderRef::new("shaders/beta.frag"));
        catalog.insert("gamma", ShaderRef::new("shaders/gamma.frag"));

        let order = vec!["gamma".to_string(), "alpha".to_string()];
        assert_eq!(
            rotation_names(&catalog, &order),
            vec!["gamma", "alpha", "beta"]
        );
    }

    #[test]
    fn rotation_order_skips_unknown_and_duplicate_names() {
        let mut catalog = ShaderCatalog::new();
        catalog.insert("alpha", ShaderRef::new("shaders/alpha.frag"));

        let order = vec![
            "missing".to_string(),
            "alpha".to_string(),
            "alpha".to_string(),
        ];
        assert_eq!(rotation_names(&catalog, &order), vec!["alpha"]);
    }
}
