use crate::constants::CAPTION_ID;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(CAPTION_ID) {
        _ = el.class_list().add_1("visible");
        _ = el.class_list().remove_1("hidden");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(CAPTION_ID) {
        _ = el.class_list().remove_1("visible");
        _ = el.class_list().add_1("hidden");
    }
}
