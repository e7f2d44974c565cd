#![cfg(target_arch = "wasm32")]
use instant::Instant;
use scene_core::{decode_image, decode_model, AssetSlot, RevealKind, Scene, SceneParams};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod frame;
mod loader;
mod overlay;
mod render;

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("scene-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, constants::CANVAS_ID)?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    wire_canvas_resize(&canvas);

    let mut params = SceneParams::default();
    params.apply_query(&dom::query_string());

    // Only the asset the reveal policy shows is fetched
    let model = Rc::new(RefCell::new(AssetSlot::Pending));
    let image = Rc::new(RefCell::new(AssetSlot::Pending));
    match params.reveal.kind() {
        RevealKind::Model => {
            loader::spawn_load("model", params.model_url.clone(), model.clone(), decode_model)
        }
        RevealKind::Image => {
            loader::spawn_load("image", params.image_url.clone(), image.clone(), decode_image)
        }
    }

    let mut scene = Scene::new(params);
    let texture = scene.generate_texture();
    scene.set_viewport(canvas.width(), canvas.height());

    let gpu = frame::init_gpu(&canvas, &scene, &texture).await;

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        scene,
        gpu,
        canvas,
        document,
        model,
        image,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
