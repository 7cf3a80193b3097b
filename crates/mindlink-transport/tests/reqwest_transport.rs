//! Integration tests for the `reqwest` transport.
//!
//! These tests spin up a real HTTP server on a random port and verify
//! that method, path, query, headers and body actually reach it, and
//! that non-2xx statuses come back as responses rather than errors.

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::RawQuery;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use mindlink_transport::{
        ApiRequest, HttpTransport, ReqwestTransport, TransportError,
    };

    /// Starts a small echo server and returns its base URL.
    async fn start_server() -> String {
        let app = Router::new()
            .route(
                "/api/echo/",
                post(|headers: HeaderMap, body: Bytes| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    format!("{auth}|{}", String::from_utf8_lossy(&body))
                }),
            )
            .route(
                "/api/query/",
                get(|RawQuery(q): RawQuery| async move {
                    q.unwrap_or_default()
                }),
            )
            .route(
                "/api/denied/",
                get(|| async { (StatusCode::UNAUTHORIZED, "nope") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/api")
    }

    #[tokio::test]
    async fn test_send_delivers_headers_and_body() {
        let base = start_server().await;
        let transport = ReqwestTransport::new(&base).expect("should build");

        let req = ApiRequest::post("/echo/")
            .with_header("Authorization", "Bearer abc")
            .with_json(br#"{"x":1}"#.to_vec());
        let resp = transport.send(req).await.expect("should respond");

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, br#"Bearer abc|{"x":1}"#.to_vec());
    }

    #[tokio::test]
    async fn test_send_encodes_query_parameters() {
        let base = start_server().await;
        let transport = ReqwestTransport::new(&base).expect("should build");

        let req = ApiRequest::get("/query/").with_query("q", "graph theory");
        let resp = transport.send(req).await.expect("should respond");

        let body = String::from_utf8(resp.body).unwrap();
        assert!(body == "q=graph+theory" || body == "q=graph%20theory");
    }

    #[tokio::test]
    async fn test_unauthorized_is_a_response_not_an_error() {
        let base = start_server().await;
        let transport = ReqwestTransport::new(&base).expect("should build");

        let resp = transport
            .send(ApiRequest::get("/denied/"))
            .await
            .expect("401 is still a response");

        assert!(resp.is_unauthorized());
        assert_eq!(resp.body, b"nope".to_vec());
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_unreachable() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport =
            ReqwestTransport::new(&format!("http://{addr}/api")).unwrap();
        let result = transport.send(ApiRequest::get("/ideas/")).await;

        assert!(
            matches!(result, Err(TransportError::Unreachable(_))),
            "expected Unreachable, got {result:?}"
        );
    }
}
