//! The viewer as a [`GraphicsFlow`].
//!
//! Bootstraps the stage (camera, lights, fog, cones), requests the default
//! asset and then reacts to number keys and finished loads.

use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    camera::{Camera, CameraController, Projection},
    config::{hex_to_clear_colour, ViewerConfig},
    context::{Context, InitContext},
    data_structures::scene_graph::SceneNode,
    flow::{FlowConsturctor, GraphicsFlow, Out},
    pipelines::light::LightUniform,
    render::Render,
    resources::mesh::{mk_cone_field, upload_asset},
    viewer::{
        input,
        loader::{self, prepare_asset, ViewerEvent},
        session::{Loaded, Session},
    },
};

pub struct ViewerFlow {
    config: ViewerConfig,
    session: Session<Box<dyn SceneNode>>,
    cones: Box<dyn SceneNode>,
}

impl ViewerFlow {
    pub fn new(config: ViewerConfig, ctx: InitContext) -> Self {
        let mut cones = mk_cone_field(&config.cones, &ctx.device);
        // The cones never move, so their buffers are written once.
        cones.update_world_transform_all();
        cones.write_to_buffers(&ctx.queue);
        Self {
            session: Session::new(config.asset_root.clone()),
            config,
            cones,
        }
    }

    /// Requests `asset` and returns the future that loads it.
    fn load_asset(&mut self, asset: &str) -> Out<ViewerEvent> {
        let ticket = self.session.request(asset);
        Out::FutEvent(vec![loader::load(ticket)])
    }

    pub fn session(&self) -> &Session<Box<dyn SceneNode>> {
        &self.session
    }
}

/// Constructor for [`crate::flow::run`].
pub fn constructor(config: ViewerConfig) -> FlowConsturctor<(), ViewerEvent> {
    Box::new(move |ctx| {
        Box::pin(async move {
            Box::new(ViewerFlow::new(config, ctx)) as Box<dyn GraphicsFlow<(), ViewerEvent>>
        })
    })
}

impl GraphicsFlow<(), ViewerEvent> for ViewerFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<ViewerEvent> {
        ctx.clear_colour = hex_to_clear_colour(self.config.background);

        let camera = &self.config.camera;
        ctx.camera.camera = Camera::from_config(camera);
        ctx.camera.controller = CameraController::new(self.config.orbit.clone());
        ctx.camera.controller.resize(ctx.config.height);
        ctx.projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            cgmath::Deg(camera.fovy_degrees),
            camera.znear,
            camera.zfar,
        );
        ctx.write_camera();

        ctx.light.uniform = LightUniform::from_config(&self.config);
        ctx.write_light();

        let default_asset = self.config.default_asset.clone();
        self.load_asset(&default_asset)
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), dt: Duration) -> Out<ViewerEvent> {
        self.session.advance(dt.as_secs_f32());
        if let Some(model) = self.session.current_mut() {
            model.write_to_buffers(&ctx.queue);
        }
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _ctx: &Context,
        _: &mut (),
        event: &WindowEvent,
    ) -> Out<ViewerEvent> {
        let Some(code) = input::pressed_key_code(event) else {
            return Out::Empty;
        };
        let mut out = Out::Empty;
        input::dispatch_key(code, |asset| out = self.load_asset(asset));
        out
    }

    fn on_custom_events(
        &mut self,
        ctx: &Context,
        _: &mut (),
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        let ViewerEvent::Decoded { ticket, result } = event;
        let outcome = match result {
            Ok(asset) if self.session.is_latest(&ticket) => {
                let asset = prepare_asset(asset);
                let mut model = upload_asset(&asset, &ctx.device);
                model.update_world_transform_all();
                let outcome = self.session.complete(
                    &ticket,
                    Ok(Loaded {
                        model,
                        clips: asset.clips,
                    }),
                );
                if let Some(model) = self.session.current_mut() {
                    model.write_to_buffers(&ctx.queue);
                }
                outcome
            }
            // Superseded before upload; nothing to release.
            Ok(_) => self.session.discard(&ticket),
            Err(failure) => self.session.complete(&ticket, Err(failure)),
        };
        log::debug!("request {} for {} finished: {:?}", ticket.seq, ticket.asset, outcome);
        None
    }

    fn on_render(&self) -> Render<'_> {
        let mut renders = vec![Render::from(self.cones.as_ref())];
        if let Some(model) = self.session.current() {
            renders.push(Render::from(model.as_ref()));
        }
        Render::Composed(renders)
    }
}
