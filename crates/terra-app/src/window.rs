//! Window creation and event handling via winit.
//!
//! [`AppState`] owns the scene, the clock and the GPU state and implements
//! winit's [`ApplicationHandler`]. Every `RedrawRequested` runs one frame and
//! requests the next, so the scene animates continuously until the window
//! closes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use terra_config::Config;
#[cfg(debug_assertions)]
use terra_debug::{DebugServer, debug_port};
use terra_debug::DebugState;
use terra_render::{
    DepthBuffer, DrawingBuffer, FrameEncoder, LoadRequest, RenderContext, RenderPassBuilder,
    SPACE_BLACK, SurfaceError, TextureLoader, TextureManager, Viewport,
    init_render_context_blocking,
};
use terra_scene::{
    Lights, OrbitControls, Scene, SceneRenderer, SystemClock, TextureRequest, animate,
    handle_resize,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::{AppError, FrameLoop, PointerState};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// GPU resources, created once the window exists.
struct Gpu {
    context: RenderContext,
    depth: DepthBuffer,
    textures: TextureManager,
    renderer: SceneRenderer,
}

/// Application context: scene, clock and renderer, plus the window
/// plumbing that drives them.
pub struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    scene: Scene,
    viewport: Viewport,
    drawing_buffer: DrawingBuffer,
    clock: SystemClock,
    frame_loop: FrameLoop,
    loader: TextureLoader,
    /// Loader id to the request it was issued for.
    pending_textures: HashMap<usize, TextureRequest>,
    textures_loaded: u32,
    controls: Option<OrbitControls>,
    pointer: PointerState,
    debug_state: Arc<Mutex<DebugState>>,
    #[cfg(debug_assertions)]
    debug_server: Option<DebugServer>,
    failure: Option<AppError>,
}

impl AppState {
    /// Build the scene from `config`. The clock starts now.
    pub fn new(config: Config) -> Self {
        let scene = Scene::build(&config);
        let controls = config
            .controls
            .orbit
            .then(|| OrbitControls::from_config(&config.controls, &scene.camera));
        let lights = scene
            .lights
            .as_ref()
            .map_or_else(|| config.lights.clone(), Lights::to_config);

        #[cfg(debug_assertions)]
        let debug_server = config
            .debug
            .debug_panel
            .then(|| DebugServer::new(debug_port(config.debug.debug_port)));

        Self {
            viewport: Viewport::new(config.window.width as f64, config.window.height as f64, 1.0),
            drawing_buffer: DrawingBuffer::new(config.window.width, config.window.height),
            window: None,
            gpu: None,
            scene,
            clock: SystemClock::new(),
            frame_loop: FrameLoop::new(),
            loader: TextureLoader::with_defaults(),
            pending_textures: HashMap::new(),
            textures_loaded: 0,
            controls,
            pointer: PointerState::new(),
            debug_state: Arc::new(Mutex::new(DebugState::with_lights(lights))),
            #[cfg(debug_assertions)]
            debug_server,
            failure: None,
            config,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current drawing-buffer size in pixels.
    pub fn buffer_size(&self) -> (u32, u32) {
        self.drawing_buffer.size()
    }

    /// Match camera, drawing buffer and (once it exists) the surface to
    /// `viewport`. Returns `false` for a collapsed viewport, which is ignored.
    pub fn apply_viewport(&mut self, viewport: Viewport) -> bool {
        if !handle_resize(
            &viewport,
            &mut self.scene.camera,
            &mut self.drawing_buffer,
            self.config.window.max_pixel_ratio,
        ) {
            return false;
        }
        self.viewport = viewport;

        let (width, height) = self.drawing_buffer.size();
        if let Some(gpu) = &mut self.gpu
            && gpu.context.size() != (width, height)
        {
            gpu.context.resize(width, height);
            gpu.depth.resize(&gpu.context.device, width, height);
            info!(
                "Viewport {:.0}x{:.0} (scale: {:.2}), drawing buffer {}x{}",
                viewport.width, viewport.height, viewport.device_pixel_ratio, width, height
            );
        }
        true
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);

        let size = window.inner_size();
        self.apply_viewport(Viewport::from_physical(
            size.width,
            size.height,
            window.scale_factor(),
        ));
        let (width, height) = self.drawing_buffer.size();

        let context =
            init_render_context_blocking(window.clone(), width, height, self.config.window.vsync)?;
        let depth = DepthBuffer::new(&context.device, width, height);
        let textures = TextureManager::new(&context.device, &context.queue);
        let renderer =
            SceneRenderer::new(&context.device, &textures, context.surface_format, &self.scene);
        self.gpu = Some(Gpu {
            context,
            depth,
            textures,
            renderer,
        });

        self.request_textures();
        self.start_debug_server();

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    /// Queue every texture the scene wants. Results arrive over later frames.
    fn request_textures(&mut self) {
        let texture_dir = self.config.assets.texture_dir.clone();
        for (id, request) in self.scene.texture_requests().into_iter().enumerate() {
            let path = request.path(&texture_dir);
            if self.loader.request(LoadRequest {
                id,
                path: path.clone(),
            }) {
                self.pending_textures.insert(id, request);
            } else {
                warn!("Texture loader unavailable, skipping {}", path.display());
            }
        }
        info!("Requested {} textures from {}", self.pending_textures.len(), texture_dir.display());
    }

    /// Upload finished decodes and attach them. A failed load only logs: the
    /// material keeps drawing without that map.
    fn receive_textures(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let results = self.loader.drain_results();
        if results.is_empty() {
            return;
        }

        for result in results {
            let Some(request) = self.pending_textures.remove(&result.id) else {
                continue;
            };
            let image = match result.image {
                Ok(image) => image,
                Err(e) => {
                    warn!(
                        "Texture {} unavailable, {:?} renders without its {:?} map: {e}",
                        result.path.display(),
                        request.role,
                        request.slot
                    );
                    continue;
                }
            };
            match gpu.textures.upload(
                &gpu.context.device,
                &gpu.context.queue,
                &request.texture_name(),
                &image,
                request.slot.color_space(),
            ) {
                Ok(handle) => {
                    if self.scene.attach_texture(&request, handle) {
                        self.textures_loaded += 1;
                    }
                }
                Err(e) => warn!("Texture {} upload failed: {e}", result.path.display()),
            }
        }

        let rebuilt = gpu
            .renderer
            .sync_materials(&gpu.context.device, &gpu.textures, &self.scene);
        debug!("Rebuilt {rebuilt} material bind groups");
        if self.loader.in_flight_count() == 0 {
            info!("Texture loading finished, {} maps attached", self.textures_loaded);
        }
    }

    #[cfg(debug_assertions)]
    fn start_debug_server(&mut self) {
        if let Some(debug_server) = &mut self.debug_server {
            if let Err(e) = debug_server.start(self.debug_state.clone()) {
                warn!("Failed to start debug server: {e}");
            } else {
                info!("Debug API started on port {}", debug_server.actual_port());
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn start_debug_server(&mut self) {}

    /// Pick up a quit command and light edits from the debug panel.
    fn poll_debug_state(&mut self, event_loop: &ActiveEventLoop) {
        let Ok(mut state) = self.debug_state.lock() else {
            return;
        };
        if state.quit_requested {
            info!("Quit requested via debug API");
            event_loop.exit();
        }
        if let Some(edits) = state.take_light_edits()
            && let Some(lights) = &mut self.scene.lights
        {
            *lights = Lights::from_config(&edits);
            debug!("Applied light edits from debug API");
        }
    }

    fn publish_debug_state(&self) {
        let Ok(mut state) = self.debug_state.lock() else {
            return;
        };
        let (buffer_width, buffer_height) = self.drawing_buffer.size();
        state.frame_count = self.frame_loop.frame_count();
        state.frame_time_ms = self.frame_loop.frame_time() * 1000.0;
        state.fps = self.frame_loop.fps();
        state.uptime_seconds = self.frame_loop.elapsed();
        state.window_width = self.viewport.width.round() as u32;
        state.window_height = self.viewport.height.round() as u32;
        state.buffer_width = buffer_width;
        state.buffer_height = buffer_height;
        state.camera_aspect = self.scene.camera.aspect;
        state.textures_loaded = self.textures_loaded;
    }

    fn update_controls(&mut self) {
        let drag = self.pointer.take_drag();
        let scroll = self.pointer.take_scroll();
        if let Some(controls) = &mut self.controls {
            controls.rotate(drag.x, drag.y);
            controls.zoom(scroll);
            controls.update(&mut self.scene.camera);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_debug_state(event_loop);
        self.receive_textures();
        self.update_controls();

        let Some(gpu) = &self.gpu else {
            return;
        };
        let scene = &mut self.scene;
        let mut outcome = Ok(());
        self.frame_loop.tick(
            &self.clock,
            |elapsed| {
                animate(scene, elapsed as f32);
                gpu.renderer.prepare(&gpu.context.queue, scene);
            },
            || outcome = draw_frame(gpu),
        );

        match outcome {
            Ok(()) => {}
            Err(SurfaceError::Timeout) => debug!("Surface timeout, frame skipped"),
            Err(SurfaceError::Lost) => warn!("Surface lost, frame skipped"),
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
                return;
            }
        }

        self.publish_debug_state();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn draw_frame(gpu: &Gpu) -> Result<(), SurfaceError> {
    let surface_texture = gpu.context.get_current_texture()?;
    let mut frame = FrameEncoder::new(
        &gpu.context.device,
        gpu.context.queue.clone(),
        surface_texture,
    );
    {
        let builder = RenderPassBuilder::new()
            .clear_color(SPACE_BLACK)
            .depth_clear(DepthBuffer::CLEAR_VALUE)
            .label("terra-scene-pass");
        let mut pass = frame.begin_render_pass(&builder, Some(&gpu.depth.view));
        gpu.renderer.render(&mut pass);
    }
    frame.submit();
    Ok(())
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            error!("Startup failed: {e}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                info!("Escape pressed, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.apply_viewport(Viewport::from_physical(
                    new_size.width,
                    new_size.height,
                    scale_factor,
                ));
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.apply_viewport(Viewport::from_physical(
                        size.width,
                        size.height,
                        scale_factor,
                    ));
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.pointer.on_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                self.pointer.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => self.pointer.on_scroll(delta),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.loader.shutdown();
        #[cfg(debug_assertions)]
        if let Some(debug_server) = &mut self.debug_server
            && let Err(e) = debug_server.stop()
        {
            warn!("Debug server shutdown: {e}");
        }
        info!(
            "Exiting after {} frames ({:.1}s)",
            self.frame_loop.frame_count(),
            self.frame_loop.elapsed()
        );
    }
}

/// Create an event loop and run the scene until the window closes.
///
/// # Errors
///
/// Returns [`AppError`] if the event loop cannot start, or if window or GPU
/// initialization failed.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config);
    event_loop.run_app(&mut app)?;
    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
