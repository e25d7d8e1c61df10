//! Flow control and application event loop.
//!
//! A "flow" is a self-contained part of the application that reacts to input,
//! updates itself every frame and describes what to draw. The [`App`] owns the
//! window, the GPU [`Context`] and all flows, and drives them from winit's
//! event loop.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait for scenes/states that handle events and rendering
//! - [`Out<E>`] is the output type for async work started by a hook
//!
//! # Lifecycle Flow
//!
//! Each frame:
//! 1. Window events are handed to the camera controller and to every flow
//! 2. `on_update` runs on every flow with the elapsed time
//! 3. The camera applies damping and its uniform is uploaded
//! 4. Every flow's `on_render` is collected and drawn with the Phong pipeline
//! 5. The frame is presented
//!
//! Futures returned through [`Out::FutEvent`] run on a tokio runtime. Their
//! results come back as custom events on the UI thread via `on_custom_events`.

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use futures::future::BoxFuture;
use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::model::DrawModel,
    render::Instanced,
    render::Render,
};

///
/// This is the Output Type for every lifecycle hook where the flow can start asynchronous work.
///
/// `Out::FutEvent` spawns each future on the async runtime and returns immediately. Once a future
/// resolves, its output is put in the event queue and handed to `on_custom_events`. It has no
/// side effects unless handled.
///
/// `Empty` is the default output used when no futures need to be handled.
///
pub enum Out<E> {
    FutEvent(Vec<BoxFuture<'static, E>>),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable scene or application state.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure context (camera, clear color, etc.)
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame
/// 4. `on_custom_events()` is called for events produced by the flows' futures
/// 5. `on_render()` is called each frame and specifies how to render `self`
///
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    ///
    /// This is the only place to modify the Context and configure things such as the default
    /// background colour or camera start position.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<E>;

    /// Update state every frame.
    ///
    /// Called every frame with the elapsed time `dt`. Use for animations
    /// and other per-frame logic.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<E>;

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<E>;

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// Return renderable objects for this flow.
    ///
    /// Called each frame. Collect your objects into a [`Render`] and return it.
    fn on_render(&self) -> Render<'_>;
}

impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`. This allows lazy initialization and resource loading.
pub type FlowConsturctor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

/// Application state bundle: GPU context, app state, and surface status.
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx.camera.controller.resize(height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx
                .depth_texture
                .resize(&self.ctx.device, width, height);
        }
    }

    fn render<Event>(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow<State, Event>>],
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            let mut basics: Vec<Instanced> = Vec::new();
            graphics_flows
                .iter()
                .for_each(|flow| flow.on_render().collect(&mut basics));

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attemted to render something with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<State: 'static, Event: 'static> {
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<Event>,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // This holds the constructors at the start.
    // We use Option to `take()` it after use.
    constructors: Option<Vec<FlowConsturctor<State, Event>>>,
    last_time: Instant,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: Send + 'static,
{
    fn new(
        event_loop: &EventLoop<Event>,
        constructors: Vec<FlowConsturctor<State, Event>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        })
    }
}

impl<State: 'static + Default, Event: Send + 'static> ApplicationHandler<Event>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Resumed is delivered again after suspension on some platforms.
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        let window_attributes = Window::default_attributes().with_title("clip-viewer");
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the main window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::<State>::new(window).await?;

            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        let (mut app_state, flows) = match self.async_runtime.block_on(init_future) {
            Ok(initialized) => initialized,
            Err(e) => {
                log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                event_loop.exit();
                return;
            }
        };
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);

        self.graphics_flows = flows;
        self.graphics_flows.iter_mut().for_each(|flow| {
            let events = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            handle_flow_output(&self.async_runtime, &self.proxy, events);
        });
        app_state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(app_state);
    }

    /// Results of spawned futures arrive here, on the UI thread.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: Event) {
        let Some(state) = &mut self.state else {
            return;
        };
        let result = self
            .graphics_flows
            .iter_mut()
            .fold(Some(event), |event, flow| {
                flow.on_custom_events(&state.ctx, &mut state.state, event?)
            });
        if result.is_some() {
            log::warn!("Warning! Custom event was not consumed this cycle");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // general stuff
        let fovy = state.ctx.projection.fovy();
        let ctx = &mut state.ctx;
        ctx.camera
            .controller
            .handle_window_events(&ctx.camera.camera, fovy, &event);

        self.graphics_flows.iter_mut().for_each(|f| {
            let events = f.on_window_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(&self.async_runtime, &self.proxy, events);
        });

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                self.graphics_flows.iter_mut().for_each(|f| {
                    let events = f.on_update(&state.ctx, &mut state.state, dt);
                    handle_flow_output(&self.async_runtime, &self.proxy, events);
                });

                // Update the camera
                let camera = &mut state.ctx.camera;
                camera.controller.update_camera(&mut camera.camera);
                state.ctx.write_camera();

                match state.render(&self.graphics_flows) {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output<Event: Send + 'static>(
    async_runtime: &tokio::runtime::Runtime,
    proxy: &EventLoopProxy<Event>,
    out: Out<Event>,
) {
    match out {
        // Each future reports back on its own, in completion order
        Out::FutEvent(futures) => {
            for fut in futures {
                let proxy = proxy.clone();
                async_runtime.spawn(async move {
                    let event = fut.await;
                    if let Err(err) = proxy.send_event(event) {
                        log::error!("Event loop was closed before the event could be delivered: {}", err);
                    }
                });
            }
        }
        Out::Empty => (),
    }
}

pub fn run<State: 'static + Default, Event: Send + 'static>(
    constructors: Vec<FlowConsturctor<State, Event>>,
) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop: EventLoop<Event> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, constructors)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
