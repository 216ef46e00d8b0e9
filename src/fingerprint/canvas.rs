//! Canvas rendering collector.
//!
//! Draws fixed text, shapes and a gradient onto a 200x50 offscreen canvas
//! and hashes the PNG data URL. Font rasterization, anti-aliasing and
//! color management differ across GPU/driver/browser combinations, which is
//! where the entropy comes from.

use super::digest::short_hash;
use super::record::{CANVAS_ERROR, NO_CANVAS};
use crate::error::{IdentityError, Result};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub const CANVAS_WIDTH: u32 = 200;
pub const CANVAS_HEIGHT: u32 = 50;

const NAME: &str = "canvas";

/// Short hash of the rendered canvas, or a sentinel.
pub fn collect() -> String {
    match render() {
        Ok(Some(data_url)) => short_hash(&data_url),
        Ok(None) => NO_CANVAS.to_string(),
        Err(e) => {
            log::warn!("⚠️ Canvas fingerprint generation failed: {}", e);
            CANVAS_ERROR.to_string()
        }
    }
}

/// Render the probe image. `Ok(None)` when 2D canvas is unsupported.
fn render() -> Result<Option<String>> {
    let err = |e: JsValue| IdentityError::collector(NAME, &e);

    let document = match web_sys::window().and_then(|w| w.document()) {
        Some(d) => d,
        None => return Ok(None),
    };
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(err)?
        .dyn_into()
        .map_err(|_| IdentityError::Collector {
            collector: NAME,
            reason: "element is not a canvas".into(),
        })?;

    let ctx: CanvasRenderingContext2d = match canvas.get_context("2d").map_err(err)? {
        Some(ctx) => ctx.dyn_into().map_err(|_| IdentityError::Collector {
            collector: NAME,
            reason: "unexpected 2d context type".into(),
        })?,
        None => return Ok(None),
    };

    canvas.set_width(CANVAS_WIDTH);
    canvas.set_height(CANVAS_HEIGHT);

    ctx.set_text_baseline("top");
    ctx.set_font("14px Arial");
    set_fill_style(&ctx, &JsValue::from_str("#f60"))?;
    ctx.fill_rect(125.0, 1.0, 62.0, 20.0);
    set_fill_style(&ctx, &JsValue::from_str("#069"))?;
    ctx.fill_text("HunterHub 🎯 Canvas", 2.0, 15.0).map_err(err)?;
    set_fill_style(&ctx, &JsValue::from_str("rgba(102, 204, 0, 0.7)"))?;
    ctx.fill_text("フィンガープリント", 4.0, 45.0).map_err(err)?;

    let gradient = ctx.create_linear_gradient(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
    gradient.add_color_stop(0.0, "red").map_err(err)?;
    gradient.add_color_stop(1.0, "blue").map_err(err)?;
    set_fill_style(&ctx, &gradient)?;
    ctx.fill_rect(0.0, 25.0, CANVAS_WIDTH as f64, 25.0);

    canvas.to_data_url().map(Some).map_err(err)
}

// `fillStyle` accepts strings, gradients and patterns; set it through
// Reflect so one helper covers all of them.
fn set_fill_style(ctx: &CanvasRenderingContext2d, style: &JsValue) -> Result<()> {
    Reflect::set(ctx, &JsValue::from_str("fillStyle"), style)
        .map(|_| ())
        .map_err(|e| IdentityError::collector(NAME, &e))
}
