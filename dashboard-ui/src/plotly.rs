//! Plotly.js bindings
//!
//! `Plotly` is the global installed by the script tag in `index.html`.

use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly, js_name = newPlot, catch)]
    fn plotly_new_plot(root: &str, data: &JsValue, layout: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

fn to_js(value: &impl serde::Serialize) -> Result<JsValue, String> {
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    js_sys::JSON::parse(&json).map_err(describe)
}

fn describe(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            js_sys::JSON::stringify(&err)
                .ok()
                .and_then(|s| s.as_string())
        })
        .unwrap_or_else(|| "unknown JavaScript error".to_string())
}

/// Draw `data` and `layout` into the element with id `mount`
pub async fn new_plot(mount: &str, data: &[Value], layout: &Value) -> Result<(), String> {
    let data = to_js(&data)?;
    let layout = to_js(layout)?;

    let promise = plotly_new_plot(mount, &data, &layout).map_err(describe)?;
    JsFuture::from(promise).await.map_err(describe)?;
    Ok(())
}
