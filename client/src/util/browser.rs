//! File input and download glue.
//!
//! Browser-only behavior; native builds read nothing and save nothing.

use portal::net::transport::FilePart;

/// Read the first selected file of an `<input type="file">`.
pub async fn read_selected_file(input: Option<leptos::web_sys::HtmlInputElement>) -> Option<FilePart> {
    #[cfg(feature = "csr")]
    {
        let file = input?.files()?.get(0)?;
        let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await.ok()?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        let content_type = Some(file.type_()).filter(|t| !t.is_empty());
        Some(FilePart { file_name: file.name(), content_type, bytes })
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = input;
        None
    }
}

/// Offer `bytes` to the user as a download named `file_name`.
pub fn save_bytes(file_name: &str, bytes: &[u8]) {
    #[cfg(feature = "csr")]
    {
        use wasm_bindgen::JsCast as _;

        let array = js_sys::Uint8Array::from(bytes);
        let parts = js_sys::Array::of1(&array);
        let Ok(blob) = web_sys::Blob::new_with_u8_array_sequence(&parts) else {
            return;
        };
        let Ok(url) = web_sys::Url::create_object_url_with_blob(&blob) else {
            return;
        };
        let anchor = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.create_element("a").ok())
            .and_then(|el| el.dyn_into::<web_sys::HtmlAnchorElement>().ok());
        if let Some(anchor) = anchor {
            anchor.set_href(&url);
            anchor.set_download(file_name);
            anchor.click();
        }
        let _ = web_sys::Url::revoke_object_url(&url);
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (file_name, bytes);
    }
}
