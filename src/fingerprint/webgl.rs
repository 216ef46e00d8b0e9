//! WebGL renderer collector.
//!
//! Hashes vendor/renderer strings (unmasked when `WEBGL_debug_renderer_info`
//! is exposed), version strings, a few capability limits and the sorted
//! extension list.

use super::digest::short_hash;
use super::record::{NO_WEBGL, WEBGL_ERROR};
use crate::error::{IdentityError, Result};
use js_sys::{Array, Int32Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGlRenderingContext as Gl};

/// `WEBGL_debug_renderer_info.UNMASKED_VENDOR_WEBGL`
const UNMASKED_VENDOR_WEBGL: u32 = 0x9245;
/// `WEBGL_debug_renderer_info.UNMASKED_RENDERER_WEBGL`
const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;

const DEBUG_RENDERER_INFO: &str = "WEBGL_debug_renderer_info";
const NAME: &str = "webgl";

/// Values read from a WebGL context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebGlInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
    pub max_texture_size: u32,
    pub max_viewport_dims: Vec<i32>,
    pub extensions: Vec<String>,
}

impl WebGlInfo {
    /// Short hash of the JSON form. Extensions are sorted first so driver
    /// enumeration order does not matter.
    pub fn digest(&self) -> String {
        let mut info = self.clone();
        info.extensions.sort();
        match serde_json::to_string(&info) {
            Ok(json) => short_hash(&json),
            Err(e) => {
                log::warn!("⚠️ WebGL info serialization failed: {}", e);
                WEBGL_ERROR.to_string()
            }
        }
    }
}

/// Short hash of the WebGL characteristics, or a sentinel.
pub fn collect() -> String {
    match query() {
        Ok(Some(info)) => info.digest(),
        Ok(None) => NO_WEBGL.to_string(),
        Err(e) => {
            log::warn!("⚠️ WebGL fingerprint generation failed: {}", e);
            WEBGL_ERROR.to_string()
        }
    }
}

fn query() -> Result<Option<WebGlInfo>> {
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

    let gl = match open_context(&canvas)? {
        Some(gl) => gl,
        None => return Ok(None),
    };

    let has_debug_info = gl.get_extension(DEBUG_RENDERER_INFO).map_err(err)?.is_some();
    let string_param = |param: u32| -> Result<String> {
        Ok(gl.get_parameter(param).map_err(err)?.as_string().unwrap_or_default())
    };

    let (mut vendor, mut renderer) = (String::new(), String::new());
    if has_debug_info {
        vendor = string_param(UNMASKED_VENDOR_WEBGL)?;
        renderer = string_param(UNMASKED_RENDERER_WEBGL)?;
    }
    if vendor.is_empty() {
        vendor = string_param(Gl::VENDOR)?;
    }
    if renderer.is_empty() {
        renderer = string_param(Gl::RENDERER)?;
    }

    let max_viewport_dims = gl
        .get_parameter(Gl::MAX_VIEWPORT_DIMS)
        .map_err(err)?
        .dyn_into::<Int32Array>()
        .map(|dims| dims.to_vec())
        .unwrap_or_default();

    let extensions = gl
        .get_supported_extensions()
        .map(|list: Array| list.iter().filter_map(|e| e.as_string()).collect())
        .unwrap_or_default();

    Ok(Some(WebGlInfo {
        vendor,
        renderer,
        version: string_param(Gl::VERSION)?,
        shading_language_version: string_param(Gl::SHADING_LANGUAGE_VERSION)?,
        max_texture_size: gl
            .get_parameter(Gl::MAX_TEXTURE_SIZE)
            .map_err(err)?
            .as_f64()
            .map_or(0, |n| n as u32),
        max_viewport_dims,
        extensions,
    }))
}

/// `webgl`, then the legacy `experimental-webgl` name.
fn open_context(canvas: &HtmlCanvasElement) -> Result<Option<Gl>> {
    for name in ["webgl", "experimental-webgl"] {
        let ctx = canvas
            .get_context(name)
            .map_err(|e| IdentityError::collector(NAME, &e))?;
        if let Some(ctx) = ctx {
            if let Ok(gl) = ctx.dyn_into::<Gl>() {
                return Ok(Some(gl));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> WebGlInfo {
        WebGlInfo {
            vendor: "Google Inc. (Intel)".into(),
            renderer: "ANGLE (Intel, Mesa Intel(R) UHD Graphics 620)".into(),
            version: "WebGL 1.0 (OpenGL ES 2.0 Chromium)".into(),
            shading_language_version: "WebGL GLSL ES 1.0".into(),
            max_texture_size: 16384,
            max_viewport_dims: vec![16384, 16384],
            extensions: vec!["OES_texture_float".into(), "ANGLE_instanced_arrays".into()],
        }
    }

    #[test]
    fn test_digest_ignores_extension_order() {
        let a = sample_info();
        let mut b = sample_info();
        b.extensions.reverse();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 16);
    }

    #[test]
    fn test_digest_tracks_renderer() {
        let a = sample_info();
        let mut b = sample_info();
        b.renderer = "ANGLE (NVIDIA, GeForce RTX 3060)".into();
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_limits_serialize_as_integers() {
        let json = serde_json::to_string(&sample_info()).unwrap();
        assert!(json.contains("\"maxTextureSize\":16384,"));
        assert!(!json.contains("16384.0"));
    }
}
