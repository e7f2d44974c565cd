use crate::overlay;
use crate::render;
use instant::Instant;
use scene_core::{AssetPresence, AssetSlot, ImagePixels, ModelMesh, PhaseEvent, Scene};
use scene_core::texture::TexturePixels;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub scene: Scene,
    pub gpu: Option<render::GpuState<'a>>,

    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,

    pub model: Rc<RefCell<AssetSlot<ModelMesh>>>,
    pub image: Rc<RefCell<AssetSlot<ImagePixels>>>,

    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;

        let presence = AssetPresence {
            model_ready: self.model.borrow().is_ready(),
            image_ready: self.image.borrow().is_ready(),
        };
        let report = self.scene.advance(dt.as_secs_f32(), presence);
        match report.event {
            Some(PhaseEvent::Revealed(kind)) => {
                log::info!("reveal: {:?} (beat {:.2})", kind, report.beat);
                overlay::show(&self.document);
            }
            Some(PhaseEvent::SwarmStarted) => overlay::hide(&self.document),
            None => {}
        }

        let w = self.canvas.width();
        let h = self.canvas.height();
        self.scene.set_viewport(w, h);

        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(w, h);
            g.upload_assets(&self.model.borrow(), &self.image.borrow());
            if let Err(e) = g.render(&self.scene) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    scene: &Scene,
    texture: &TexturePixels,
) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, scene, texture).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
