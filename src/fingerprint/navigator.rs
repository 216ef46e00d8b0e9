//! Navigator, screen and timezone attributes.
//!
//! Read synchronously. Each property that is missing or throws falls back to
//! an empty/zero value instead of failing the whole read.

use js_sys::{Array, Intl, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{Navigator, Screen};

/// Plain browser attributes that need no hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigatorAttributes {
    pub user_agent: String,
    pub language: String,
    pub languages: Vec<String>,
    pub timezone: String,
    pub screen_resolution: String,
    pub screen_color_depth: u32,
    pub screen_pixel_depth: u32,
    pub available_screen_size: String,
    pub platform: String,
    pub hardware_concurrency: u32,
    pub device_memory: Option<f64>,
}

/// `"{width}x{height}"`, negative values clamped to zero.
pub fn format_dimensions(width: i32, height: i32) -> String {
    format!("{}x{}", width.max(0), height.max(0))
}

pub fn collect() -> NavigatorAttributes {
    let mut attrs = NavigatorAttributes {
        timezone: resolved_timezone(),
        screen_resolution: format_dimensions(0, 0),
        available_screen_size: format_dimensions(0, 0),
        ..Default::default()
    };

    let window = match web_sys::window() {
        Some(w) => w,
        None => {
            log::warn!("⚠️ No window, navigator attributes unavailable");
            return attrs;
        }
    };

    read_navigator(&window.navigator(), &mut attrs);

    match window.screen() {
        Ok(screen) => read_screen(&screen, &mut attrs),
        Err(e) => log::warn!("⚠️ window.screen unavailable: {:?}", e),
    }

    attrs
}

fn read_navigator(navigator: &Navigator, attrs: &mut NavigatorAttributes) {
    attrs.user_agent = navigator.user_agent().unwrap_or_default();
    attrs.language = navigator.language().unwrap_or_default();
    attrs.languages = navigator
        .languages()
        .iter()
        .filter_map(|lang| lang.as_string())
        .collect();
    attrs.platform = navigator.platform().unwrap_or_default();

    let cores = navigator.hardware_concurrency();
    attrs.hardware_concurrency = if cores.is_finite() && cores > 0.0 {
        cores as u32
    } else {
        0
    };

    // Chromium-only, not in web-sys
    attrs.device_memory = Reflect::get(navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|m| *m > 0.0);
}

fn read_screen(screen: &Screen, attrs: &mut NavigatorAttributes) {
    attrs.screen_resolution = format_dimensions(
        screen.width().unwrap_or(0),
        screen.height().unwrap_or(0),
    );
    attrs.available_screen_size = format_dimensions(
        screen.avail_width().unwrap_or(0),
        screen.avail_height().unwrap_or(0),
    );
    attrs.screen_color_depth = screen.color_depth().unwrap_or(0).max(0) as u32;
    attrs.screen_pixel_depth = screen.pixel_depth().unwrap_or(0).max(0) as u32;
}

/// `Intl.DateTimeFormat().resolvedOptions().timeZone`, or empty.
fn resolved_timezone() -> String {
    let format = Intl::DateTimeFormat::new(&Array::new(), &Object::new());
    Reflect::get(&format.resolved_options(), &JsValue::from_str("timeZone"))
        .ok()
        .and_then(|tz| tz.as_string())
        .unwrap_or_default()
}
