//! Web worker entry point for edgeproc frame processing.
//!
//! This crate compiles to a standalone WASM module that runs inside a
//! `Worker`. It receives one RGBA frame per message via `postMessage`,
//! calls [`edgeproc_pipeline::process`], and posts the packed plane
//! back.
//!
//! Frame pixels travel as raw `Uint8Array` buffers in both directions
//! to avoid the massive overhead of JSON-encoding megabytes of pixel
//! data as number arrays; only the small control fields (dimensions,
//! mode, errors) use JSON or plain JS values.
//!
//! Running the transform in a worker keeps the browser's main thread
//! free to pull camera frames and paint the preview.

use edgeproc_pipeline::{FrameConfig, OutputMode, PipelineError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Fixed readiness probe for the host.
///
/// The main thread calls this right after instantiating the module to
/// confirm the pipeline is loaded and callable before streaming real
/// frames; it takes no input and cannot fail.
#[wasm_bindgen]
#[must_use]
pub fn readiness() -> String {
    edgeproc_pipeline::readiness().to_string()
}

/// Message protocol: the main thread sends a JS object with:
/// - `rgbaPixels`: `Uint8Array` containing the raw RGBA frame bytes
/// - `width`, `height`: `f64` frame dimensions in pixels
/// - `useEdges`: `bool` selecting the edge map over the luma plane
/// - `configJson`: optional `String` with a JSON-serialized
///   [`FrameConfig`] overriding thresholds and blur sigma (its `mode`
///   is replaced by `useEdges`)
/// - `generation`: `f64` generation counter (passed through to the
///   response so the host can discard stale frames)
///
/// On success the worker responds with a JS object containing:
/// - `generation`: `f64` matching the request generation
/// - `ok`: `true`
/// - `pixels`: `Uint8Array` — the packed plane, `width * height` bytes
/// - `width`, `height`: `f64` — plane dimensions
///
/// On error the worker responds with:
/// - `generation`: `f64`
/// - `ok`: `false`
/// - `errorJson`: `String` — JSON-serialized [`PipelineError`]
///
/// # Worker entry point
///
/// Called automatically when the WASM module is instantiated in the
/// worker context.
#[wasm_bindgen(start)]
pub fn worker_main() {
    console_error_panic_hook::set_once();

    // Get the worker global scope.
    let global: web_sys::DedicatedWorkerGlobalScope = js_sys::global()
        .dyn_into()
        .expect_throw("not running in a DedicatedWorkerGlobalScope");

    // Set up the message handler.
    let onmessage =
        Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |event: web_sys::MessageEvent| {
            handle_message(event);
        });
    global.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget(); // leak — lives for the worker lifetime
}

/// Handle an incoming frame message from the main thread.
///
/// Extracts the frame buffer, dimensions, and mode, runs the transform,
/// and posts the result back.
#[allow(clippy::expect_used, clippy::needless_pass_by_value)]
fn handle_message(event: web_sys::MessageEvent) {
    let data = event.data();

    // Extract fields from the message object.
    let pixels_val = js_sys::Reflect::get(&data, &JsValue::from_str("rgbaPixels"))
        .expect_throw("missing rgbaPixels field");
    let width_val =
        js_sys::Reflect::get(&data, &JsValue::from_str("width")).expect_throw("missing width");
    let height_val =
        js_sys::Reflect::get(&data, &JsValue::from_str("height")).expect_throw("missing height");
    let use_edges_val = js_sys::Reflect::get(&data, &JsValue::from_str("useEdges"))
        .expect_throw("missing useEdges field");
    let generation_val = js_sys::Reflect::get(&data, &JsValue::from_str("generation"))
        .expect_throw("missing generation field");

    // Convert JS types to Rust types.
    let pixels_js: js_sys::Uint8Array = pixels_val
        .dyn_into()
        .expect_throw("rgbaPixels is not a Uint8Array");
    let rgba = pixels_js.to_vec();

    let generation = generation_val
        .as_f64()
        .expect_throw("generation is not a number");
    let use_edges = use_edges_val
        .as_bool()
        .expect_throw("useEdges is not a boolean");

    // Host dimensions arrive as JS numbers; reject anything that is not
    // an exact non-negative integer before it reaches the core.
    let (width, height) = match (
        frame_dimension(&width_val, "width"),
        frame_dimension(&height_val, "height"),
    ) {
        (Ok(w), Ok(h)) => (w, h),
        (Err(e), _) | (_, Err(e)) => {
            post_error_json(generation, &serialize_error(&e));
            return;
        }
    };

    // Optional config overrides (thresholds, blur sigma) as JSON.
    let mut config = match js_sys::Reflect::get(&data, &JsValue::from_str("configJson"))
        .ok()
        .and_then(|v| v.as_string())
    {
        Some(json) => match serde_json::from_str::<FrameConfig>(&json) {
            Ok(c) => c,
            Err(e) => {
                let err = PipelineError::InvalidInput(format!("failed to parse config: {e}"));
                post_error_json(generation, &serialize_error(&err));
                return;
            }
        },
        None => FrameConfig::default(),
    };
    config.mode = OutputMode::from_edges_flag(use_edges);

    // Run the transform (synchronous — blocks this worker thread only).
    match edgeproc_pipeline::process(&rgba, width, height, &config) {
        Ok(result) => post_success_response(generation, &result.plane, width, height),
        Err(e) => post_error_json(generation, &serialize_error(&e)),
    }
}

/// Parse a host-side dimension value into `u32`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn frame_dimension(value: &JsValue, name: &str) -> Result<u32, PipelineError> {
    let number = value
        .as_f64()
        .ok_or_else(|| PipelineError::InvalidInput(format!("{name} is not a number")))?;
    if !number.is_finite() || number.fract() != 0.0 || number < 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "{name} must be a non-negative integer, got {number}",
        )));
    }
    if number > f64::from(u32::MAX) {
        return Err(PipelineError::InvalidInput(format!(
            "{name} {number} is out of range",
        )));
    }
    Ok(number as u32)
}

/// Serialize a [`PipelineError`] for the response, with a JSON-string
/// fallback should serialization itself fail.
fn serialize_error(error: &PipelineError) -> String {
    serde_json::to_string(error).unwrap_or_else(|ser_err| format!("\"serialization error: {ser_err}\""))
}

/// Post a successful transform result back to the main thread.
///
/// The plane is sent as a raw `Uint8Array` (zero JSON overhead).
#[allow(clippy::expect_used)]
fn post_success_response(generation: f64, plane: &[u8], width: u32, height: u32) {
    let response = js_sys::Object::new();
    let set = |key: &str, val: &JsValue| {
        js_sys::Reflect::set(&response, &JsValue::from_str(key), val)
            .expect_throw("failed to set response field");
    };

    set("generation", &JsValue::from_f64(generation));
    set("ok", &JsValue::from_bool(true));
    set("pixels", &js_sys::Uint8Array::from(plane));
    set("width", &JsValue::from_f64(f64::from(width)));
    set("height", &JsValue::from_f64(f64::from(height)));

    let global: web_sys::DedicatedWorkerGlobalScope = js_sys::global()
        .dyn_into()
        .expect_throw("not in worker scope");
    global
        .post_message(&response)
        .expect_throw("failed to postMessage");
}

/// Post a pre-serialized error JSON back to the main thread.
fn post_error_json(generation: f64, error_json: &str) {
    let response = js_sys::Object::new();
    let _ = js_sys::Reflect::set(
        &response,
        &JsValue::from_str("generation"),
        &JsValue::from_f64(generation),
    );
    let _ = js_sys::Reflect::set(
        &response,
        &JsValue::from_str("ok"),
        &JsValue::from_bool(false),
    );
    let _ = js_sys::Reflect::set(
        &response,
        &JsValue::from_str("errorJson"),
        &JsValue::from_str(error_json),
    );

    if let Ok(global) = js_sys::global().dyn_into::<web_sys::DedicatedWorkerGlobalScope>() {
        let _ = global.post_message(&response);
    }
}
