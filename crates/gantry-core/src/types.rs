//! Common HTTP types used throughout the facade.
//!
//! This module re-exports the request and response types that middleware,
//! handlers, and the facade wrapper all share.

use bytes::Bytes;
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;

/// The HTTP request type flowing through the facade.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type flowing through the facade.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed future, as returned by handlers and middleware.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// Creates a plain-text response with status 200.
    fn text(body: &str) -> Response;

    /// Creates a plain-text error response with the given status code.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON error envelope response.
    ///
    /// The envelope shape is `{"error": {"name": ..., "message": ...}}`.
    fn json_error(status: http::StatusCode, name: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn text(body: &str) -> Response {
        http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build text response")
    }

    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn json_error(status: http::StatusCode, name: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "name": name,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }
}
