use scene_core::{AssetError, AssetSlot};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

fn fetch_error(url: &str, reason: impl std::fmt::Debug) -> AssetError {
    AssetError::Fetch {
        url: url.to_string(),
        reason: format!("{:?}", reason),
    }
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    let window = web::window().ok_or_else(|| fetch_error(url, "no window"))?;
    let resp_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_error(url, e))?;
    let resp: web::Response = resp_value.dyn_into().map_err(|e| fetch_error(url, e))?;
    if !resp.ok() {
        return Err(fetch_error(url, format!("HTTP {}", resp.status())));
    }
    let promise = resp.array_buffer().map_err(|e| fetch_error(url, e))?;
    let buf = JsFuture::from(promise)
        .await
        .map_err(|e| fetch_error(url, e))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

/// Fetch and decode an asset once, off the frame loop, settling `slot` with
/// the outcome. Failures are logged and leave the slot permanently `Failed`.
pub fn spawn_load<T: 'static>(
    what: &'static str,
    url: String,
    slot: Rc<RefCell<AssetSlot<T>>>,
    decode: fn(&[u8]) -> Result<T, AssetError>,
) {
    spawn_local(async move {
        let result = match fetch_bytes(&url).await {
            Ok(bytes) => decode(&bytes),
            Err(e) => Err(e),
        };
        match &result {
            Ok(_) => log::info!("{} loaded from {}", what, url),
            Err(e) => log::error!("{} load failed: {}", what, e),
        }
        slot.borrow_mut().settle(result);
    });
}
