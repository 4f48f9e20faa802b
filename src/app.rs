// app.rs
use std::sync::Arc;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::asset::{GltfLoader, ModelLoader, PlaceholderLoader};
use crate::error::ViewerError;
use crate::renderer::{GpuDevice, RenderDevice};
use crate::scene::{jungle, JungleLayout, Scene};
use crate::settings::RenderSettings;

/// Pixels of scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

pub struct App {
    settings: RenderSettings,
    window: Option<Arc<Window>>,
    gfx: Option<GpuDevice>,
    scene: Option<Scene>,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            window: None,
            gfx: None,
            scene: None,
            dragging: false,
            cursor: None,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn into_result(self) -> Result<(), ViewerError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let resolution = &self.settings.resolution;
        let attributes = Window::default_attributes()
            .with_title("Jungle")
            .with_inner_size(PhysicalSize::new(resolution.width, resolution.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let mut gfx = pollster::block_on(GpuDevice::new(Arc::clone(&window), &self.settings))?;

        let mut rng = match self.settings.vegetation.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let loader: &dyn ModelLoader = if self.settings.placeholder_models {
            log::info!("Using placeholder models");
            &PlaceholderLoader
        } else {
            &GltfLoader
        };
        let layout = JungleLayout::from_settings(&self.settings);
        let scene = jungle::build(&mut gfx, loader, &layout, &mut rng)?;

        window.request_redraw();
        self.window = Some(window);
        self.gfx = Some(gfx);
        self.scene = Some(scene);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{err}");
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(gfx) = self.gfx.as_mut() {
            release_scene(&mut self.scene, gfx);
        }
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

/// Releases the scene's targets once; later calls do nothing.
fn release_scene(scene: &mut Option<Scene>, gfx: &mut dyn RenderDevice) -> bool {
    match scene.take() {
        Some(scene) => {
            scene.release(gfx);
            true
        }
        None => false,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(gfx) = self.gfx.as_mut() {
                    gfx.resize(size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(gfx), Some(w)) = (self.gfx.as_mut(), &self.window) {
                    gfx.resize(w.inner_size());
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(gfx), Some(scene)) = (self.gfx.as_mut(), self.scene.as_mut()) else {
                    return;
                };
                if let Err(err) = scene.render_frame(gfx, true) {
                    self.fail(event_loop, err.into());
                    return;
                }
                self.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape {
                    self.shutdown(event_loop);
                } else if let Some(scene) = self.scene.as_mut() {
                    if scene.on_key(code) {
                        self.request_redraw();
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last), Some(scene)) =
                    (self.dragging, self.cursor, self.scene.as_mut())
                {
                    let delta = Vec2::new(
                        (position.x - last.x) as f32,
                        (position.y - last.y) as f32,
                    );
                    scene.camera_mut().queue_rotation(delta);
                }
                self.cursor = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                if let Some(scene) = self.scene.as_mut() {
                    scene.camera_mut().queue_zoom(lines);
                }
            }
            _ => {}
        }
    }
}
