use portal::net::transport::{Method, RequestBody};

use super::*;

#[cfg(not(feature = "csr"))]
#[tokio::test]
async fn native_build_reports_unreachable() {
    let request = ApiRequest {
        method: Method::Get,
        url: "/api/user/profile".to_owned(),
        query: Vec::new(),
        bearer: None,
        body: RequestBody::Empty,
    };

    let err = BrowserTransport.send(request).await.unwrap_err();

    assert!(err.0.contains("/api/user/profile"));
}
