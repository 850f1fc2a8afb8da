use anyhow::{bail, Context, Result};
use meshindex::{cube, objparse, IndexedMesh, LoadOptions, TextureData};
use std::time::{Duration, Instant};
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, Event, KeyboardInput, MouseScrollDelta, StartCause,
    VirtualKeyCode, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, WindowBuilder};

mod camera;
mod config;
mod render;
mod scene;

use config::{ModelSource, ViewerConfig};

fn load_mesh(cfg: &ViewerConfig) -> Result<IndexedMesh> {
    let stream = match &cfg.model {
        ModelSource::Cube => cube::cube(),
        ModelSource::Obj(path) => {
            let opts = LoadOptions {
                flip_v: cfg.flip_v(),
            };
            objparse::load(path, &opts)
                .with_context(|| format!("loading model {}", path.display()))?
        }
    };
    let mesh = meshindex::index(&stream).context("indexing model")?;
    if mesh.indices.is_empty() {
        bail!("model has no triangles");
    }
    log::info!(
        "{} face-vertices -> {} unique vertices",
        stream.len(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

fn load_texture(cfg: &ViewerConfig) -> Result<TextureData> {
    match &cfg.texture {
        Some(path) => meshindex::texture::load(path)
            .with_context(|| format!("loading texture {}", path.display())),
        None => Ok(TextureData::white()),
    }
}

fn main() -> Result<()> {
    let cfg = match ViewerConfig::from_args(std::env::args().skip(1)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}\n{}", e, config::USAGE);
            std::process::exit(2);
        }
    };
    simple_logger::SimpleLogger::new()
        .with_level(cfg.log_level)
        .init()
        .context("setting up logging")?;

    let mesh = load_mesh(&cfg)?;
    let texture = load_texture(&cfg)?;

    let event_loop = EventLoop::new();
    let (w, h) = cfg.window_size;
    let window = WindowBuilder::new()
        .with_title("Playground")
        .with_inner_size(PhysicalSize::new(w, h))
        .with_resizable(true)
        .build(&event_loop)
        .context("opening window")?;
    // mouse look wants the cursor kept inside the window
    if let Err(e) = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    {
        log::warn!("could not grab the cursor: {}", e);
    }
    window.set_cursor_visible(false);

    let mut scene = scene::Scene::new(&cfg);
    let mut render_state = render::RenderState::create(&window, &mesh, &texture)?;
    let mut last_frame = Instant::now();

    // 60 fps
    const DUR: Duration = Duration::from_micros(16667);
    event_loop.run(move |event, _eloop, control_flow| match event {
        Event::NewEvents(StartCause::Init) => {
            *control_flow = ControlFlow::WaitUntil(Instant::now() + DUR)
        }
        // per-frame actions
        Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
            *control_flow = ControlFlow::WaitUntil(Instant::now() + DUR);
            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32();
            last_frame = now;

            scene.update(dt);
            render_state.update_lighting(scene.camera.position, scene.tint());
            let projview = scene.view_projection(render_state.aspect());
            match render_state.render(&projview, &scene.model) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.resize(render_state.size())
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("out of gpu memory");
                    *control_flow = ControlFlow::Exit
                }
                Err(e) => log::warn!("dropped a frame: {}", e),
            }
        }
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta: (dx, dy) },
            ..
        } => scene.mouse_moved(dx, dy),
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(code),
                        ..
                    },
                ..
            } => {
                if let (ElementState::Pressed, VirtualKeyCode::Escape) = (state, code) {
                    *control_flow = ControlFlow::Exit;
                }
                scene.input.input(state, code);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    // roughly one line per 20 pixels
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 20.0,
                };
                scene.camera.scroll(y);
            }
            WindowEvent::Resized(size) => {
                log::debug!("Resizing to {:?}", size);
                render_state.resize(size.into());
            }
            _ => {}
        },
        Event::LoopDestroyed => {
            log::info!("Closing time!");
        }
        _ => {}
    })
}
