//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::transport::{ApiRequest, ApiResponse, Transport, TransportError};

/// Replays queued responses in order and records every request it sees.
///
/// Each `send` yields once before answering so `tokio::join!` can interleave
/// two calls the way two quick clicks would.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_json(&self, status: u16, value: serde_json::Value) {
        self.push_text(status, &value.to_string());
    }

    pub(crate) fn push_text(&self, status: u16, body: &str) {
        self.push(Ok(ApiResponse { status, body: body.as_bytes().to_vec() }));
    }

    pub(crate) fn push_unreachable(&self) {
        self.push(Err(TransportError("connection refused".to_owned())));
    }

    fn push(&self, response: Result<ApiResponse, TransportError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        tokio::task::yield_now().await;
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_owned())))
    }
}
