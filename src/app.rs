//! Window, event loop and the render loop state machine.
//!
//! Startup runs once when the window is resumed: create the GPU context,
//! build the lighting program, start loading the bump map, load the mesh,
//! wire up input and fix the projection. Natively this is driven to
//! completion on the tokio runtime; on the web it runs in `spawn_local` and
//! reports back through a [`DemoEvent::Initialized`] user event.
//!
//! After that every `RedrawRequested` draws exactly one frame and requests the
//! next one. Fatal startup errors stop the event loop and are returned by
//! [`run`].

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::Key,
    window::{Window, WindowId},
};

use crate::{
    config::DemoConfig,
    context::Context,
    input::{InputState, SliderId},
    render::Renderer,
    scene::Scene,
};

/// Where the render loop is in its life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    /// No context, program or mesh yet. Redraws are ignored.
    #[default]
    Uninitialized,
    /// Everything is built and the surface is configured.
    Ready,
    /// At least one frame has been presented.
    Rendering,
}

impl LoopState {
    pub fn initialized(self) -> Self {
        match self {
            LoopState::Uninitialized => LoopState::Ready,
            other => other,
        }
    }

    pub fn frame_presented(self) -> Self {
        match self {
            LoopState::Uninitialized => LoopState::Uninitialized,
            LoopState::Ready | LoopState::Rendering => LoopState::Rendering,
        }
    }

    pub fn can_draw(self) -> bool {
        self != LoopState::Uninitialized
    }
}

pub enum DemoEvent {
    #[allow(dead_code)]
    Initialized(Box<Demo>),
    #[allow(dead_code)]
    Slider(SliderId, f32),
    #[allow(dead_code)]
    Failed(anyhow::Error),
}

impl std::fmt::Debug for DemoEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Slider(id, value) => f.debug_tuple("Slider").field(id).field(value).finish(),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// The running demo: GPU context, renderer, scene state and input mapping.
pub struct Demo {
    ctx: Context,
    renderer: Renderer,
    scene: Scene,
    input: InputState,
}

impl Demo {
    async fn new(
        window: Arc<Window>,
        config: DemoConfig,
        #[cfg(not(target_arch = "wasm32"))] runtime: tokio::runtime::Handle,
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config.clear_colour).await?;
        let renderer = Renderer::new(
            &ctx.device,
            &ctx.queue,
            ctx.config.format,
            &config,
            #[cfg(not(target_arch = "wasm32"))]
            &runtime,
        )
        .await?;
        let input = InputState::new(config.rotation_step, &config.sliders);
        let [width, height] = ctx.size();
        let scene = Scene::new(&config, width, height);
        Ok(Self {
            ctx,
            renderer,
            scene,
            input,
        })
    }

    fn resize(&mut self, width: u32, height: u32) -> bool {
        self.ctx.resize(width, height)
    }

    fn on_key(&mut self, key: &str) {
        if self.input.on_key(key, &mut self.scene) {
            log::debug!("rotation now {:?}", self.scene.rotation.angles());
        }
    }

    fn on_slider(&mut self, slider: SliderId, value: f32) {
        self.input.on_slider(slider, value, &mut self.scene);
        log::debug!("{:?} set to {}, params {:?}", slider, value, self.scene.params);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.renderer.poll_texture(&self.ctx.device, &self.ctx.queue);
        self.renderer.render_frame(&self.ctx, &self.scene)
    }
}

/// Logs the frame rate every few seconds at debug level.
struct FrameClock {
    last_report: Instant,
    frames: u32,
}

impl FrameClock {
    const REPORT_EVERY: Duration = Duration::from_secs(5);

    fn new() -> Self {
        Self {
            last_report: Instant::now(),
            frames: 0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed >= Self::REPORT_EVERY {
            log::debug!("{:.1} fps", self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.last_report = Instant::now();
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: EventLoopProxy<DemoEvent>,
    config: DemoConfig,
    window: Option<Arc<Window>>,
    demo: Option<Demo>,
    state: LoopState,
    clock: FrameClock,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<DemoEvent>, config: DemoConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            config,
            window: None,
            demo: None,
            state: LoopState::Uninitialized,
            clock: FrameClock::new(),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Take over a fully built demo and draw the first frame.
    fn start(&mut self, mut demo: Demo) {
        let size = demo.ctx.window.inner_size();
        if !demo.resize(size.width, size.height) {
            // zero-sized at startup; configure with the initial size and let
            // the first Resized event fix it
            let [width, height] = demo.ctx.size();
            demo.resize(width, height);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let bound = crate::input::bind_dom_sliders(&self.config.sliders, move |id, value| {
                if proxy.send_event(DemoEvent::Slider(id, value)).is_err() {
                    log::warn!("event loop closed, dropping {:?} = {}", id, value);
                }
            });
            if let Err(e) = bound {
                log::warn!("sliders unavailable: {:#}", e);
            }
        }

        demo.ctx.window.request_redraw();
        self.demo = Some(demo);
        self.state = self.state.initialized();
        log::info!("demo ready");
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Arc<Window>> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("orange-bump");

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::Context as _;
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID))
                .with_context(|| format!("no #{} element in the page", CANVAS_ID))?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(Arc::new(event_loop.create_window(window_attributes)?))
    }
}

impl ApplicationHandler<DemoEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };
        self.window = Some(window.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let init = Demo::new(
                window,
                self.config.clone(),
                self.async_runtime.handle().clone(),
            );
            match self.async_runtime.block_on(init) {
                Ok(demo) => self.start(demo),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match Demo::new(window, config).await {
                    Ok(demo) => DemoEvent::Initialized(Box::new(demo)),
                    Err(e) => DemoEvent::Failed(e),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before the demo finished loading");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: DemoEvent) {
        match event {
            DemoEvent::Initialized(demo) => self.start(*demo),
            DemoEvent::Slider(id, value) => {
                if let Some(demo) = self.demo.as_mut() {
                    demo.on_slider(id, value);
                }
            }
            DemoEvent::Failed(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
            return;
        }

        let Some(demo) = self.demo.as_mut() else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                demo.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                if let Key::Character(key) = &event.logical_key {
                    demo.on_key(key.as_str());
                }
            }
            WindowEvent::RedrawRequested => {
                if !self.state.can_draw() {
                    return;
                }
                match demo.render() {
                    Ok(()) => {
                        self.state = self.state.frame_presented();
                        self.clock.tick();
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = demo.ctx.window.inner_size();
                        demo.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                demo.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Open the window and run the demo until it is closed.
///
/// Returns the first fatal error: no graphics device, a shader that does not
/// compile or link, or a mesh that cannot be loaded.
pub fn run(config: DemoConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow::anyhow!("cannot initialize console logging: {}", e))?;
    }

    let event_loop: EventLoop<DemoEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
