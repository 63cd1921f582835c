//! `gloo-net` implementation of the core HTTP transport.
//!
//! Browser build: real `fetch` calls. Native builds (tests, `cargo check`
//! without `csr`): every send fails as unreachable, so pages degrade to their
//! "no response" message instead of panicking.
//!
//! ERROR HANDLING
//! ==============
//! Only a missing response is an error here. Non-2xx statuses are passed
//! through untouched; the core classifies them.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use portal::net::transport::{ApiRequest, ApiResponse, Transport, TransportError};

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl Transport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        #[cfg(feature = "csr")]
        {
            fetch(request).await
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(TransportError(format!("browser transport unavailable for {}", request.url)))
        }
    }
}

#[cfg(feature = "csr")]
async fn fetch(request: ApiRequest) -> Result<ApiResponse, TransportError> {
    use gloo_net::http::Request;
    use portal::net::transport::{Method, RequestBody};
    use secrecy::ExposeSecret;

    let mut builder = match request.method {
        Method::Get => Request::get(&request.url),
        Method::Post => Request::post(&request.url),
        Method::Put => Request::put(&request.url),
        Method::Delete => Request::delete(&request.url),
    };
    if !request.query.is_empty() {
        builder = builder.query(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    if let Some(token) = &request.bearer {
        builder = builder.header("Authorization", &format!("Bearer {}", token.expose_secret()));
    }
    let prepared = match request.body {
        RequestBody::Empty => builder.build(),
        RequestBody::Json(value) => builder.json(&value),
        RequestBody::Multipart(form) => builder.body(form_data(form)?),
    }
    .map_err(|e| TransportError(e.to_string()))?;

    let response = prepared.send().await.map_err(|e| TransportError(e.to_string()))?;
    let status = response.status();
    let body = response.binary().await.map_err(|e| TransportError(e.to_string()))?;
    Ok(ApiResponse { status, body })
}

#[cfg(feature = "csr")]
fn form_data(form: portal::net::transport::MultipartForm) -> Result<web_sys::FormData, TransportError> {
    let data = web_sys::FormData::new().map_err(js_error)?;
    for (name, value) in &form.fields {
        data.append_with_str(name, value).map_err(js_error)?;
    }
    if let Some((name, file)) = form.file {
        let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::of1(&bytes);
        let blob = web_sys::Blob::new_with_u8_array_sequence(&parts).map_err(js_error)?;
        data.append_with_blob_and_filename(&name, &blob, &file.file_name)
            .map_err(js_error)?;
    }
    Ok(data)
}

#[cfg(feature = "csr")]
fn js_error(err: wasm_bindgen::JsValue) -> TransportError {
    TransportError(format!("{err:?}"))
}
