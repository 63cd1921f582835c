//! Raw HTTP transport seam.
//!
//! DESIGN
//! ======
//! The typed client in `api` only needs "send this request, give me status +
//! body". Keeping that behind a trait lets the browser use `gloo-net`, the CLI
//! use `reqwest`, and tests use a scripted mock without any of them knowing
//! about sessions or error taxonomy.

use secrecy::SecretString;

/// HTTP verbs used by the portal API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A file attached to a multipart request.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Multipart form: text fields plus at most one file field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<(String, FilePart)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

/// A fully-resolved outbound request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL, or a same-origin path when the base address is empty.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<SecretString>,
    pub body: RequestBody,
}

/// Status and raw body of a received response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// No response was received (connection refused, DNS, CORS, aborted body).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Sends one request and returns whatever status the server answered with.
///
/// Non-2xx statuses are *not* errors at this layer.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(feature = "reqwest-transport")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use secrecy::ExposeSecret;

    use super::{ApiRequest, ApiResponse, Method, MultipartForm, RequestBody, Transport, TransportError};

    /// `reqwest`-backed transport used by native front-ends.
    #[derive(Clone, Debug, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
        let mut out = reqwest::multipart::Form::new();
        for (name, value) in form.fields {
            out = out.text(name, value);
        }
        if let Some((name, file)) = form.file {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.content_type {
                part = part.mime_str(&mime).map_err(|e| TransportError(e.to_string()))?;
            }
            out = out.part(name, part);
        }
        Ok(out)
    }

    #[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
    #[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
    impl Transport for ReqwestTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            };
            let mut builder = self.client.request(method, &request.url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token.expose_secret());
            }
            builder = match request.body {
                RequestBody::Empty => builder,
                RequestBody::Json(value) => builder.json(&value),
                RequestBody::Multipart(form) => builder.multipart(build_form(form)?),
            };

            let response = builder.send().await.map_err(|e| TransportError(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|e| TransportError(e.to_string()))?;
            Ok(ApiResponse { status, body: body.to_vec() })
        }
    }
}
