//! Error-to-JSON rendering middleware.
//!
//! The chain machinery never catches errors; a local dev server that wants
//! structured error pages installs this stage instead. It wraps the rest
//! of the chain and rewrites any propagated error as a JSON envelope the
//! dev server can render, marked with a header so the transport can tell
//! a structured error from a handler's own 500.

use crate::context::MiddlewareContext;
use crate::middleware::Middleware;
use gantry_core::{
    BoxFuture, Env, ExecutionContext, FacadeError, FacadeResult, Request, Response, ResponseExt,
};
use http::{HeaderValue, StatusCode};

/// Header marking a response body as a rendered error envelope.
pub const ERROR_FORMAT_HEADER: &str = "x-worker-error-format";

/// Middleware that renders propagated errors as JSON responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorMiddleware;

impl JsonErrorMiddleware {
    /// Creates the error-rendering middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for JsonErrorMiddleware {
    fn name(&self) -> &'static str {
        "json_error"
    }

    fn handle<'a>(
        &'a self,
        request: Request,
        env: Env,
        _ctx: ExecutionContext,
        chain: MiddlewareContext<'a>,
    ) -> BoxFuture<'a, FacadeResult<Response>> {
        Box::pin(async move {
            match chain.next(request, env).await {
                Ok(response) => Ok(response),
                Err(err) => {
                    tracing::debug!(error = %err, "rendering propagated error as JSON");
                    let mut response = Response::json_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        error_name(&err),
                        &err.to_string(),
                    );
                    response
                        .headers_mut()
                        .insert(ERROR_FORMAT_HEADER, HeaderValue::from_static("json"));
                    Ok(response)
                }
            }
        })
    }
}

const fn error_name(err: &FacadeError) -> &'static str {
    match err {
        FacadeError::IllegalInvocation => "TypeError",
        _ => "Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MiddlewareChain, MiddlewareRegistry};
    use bytes::Bytes;
    use gantry_core::{Dispatcher, FetchFn};
    use http_body_util::{BodyExt, Full};
    use std::sync::Arc;

    fn chain_with_stage() -> MiddlewareChain {
        let mut registry = MiddlewareRegistry::new();
        registry.register([Arc::new(JsonErrorMiddleware::new()) as Arc<dyn Middleware>]);
        registry.seal()
    }

    fn noop_dispatcher() -> Dispatcher {
        Dispatcher::new(|_event| Box::pin(async { Ok(None) }))
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let terminal: FetchFn =
            Arc::new(|_req, _env, _ctx| Box::pin(async { Ok(Response::text("fine")) }));
        let dispatcher = noop_dispatcher();

        let response = chain_with_stage()
            .invoke(
                &dispatcher,
                terminal,
                request(),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(ERROR_FORMAT_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_error_becomes_json_envelope() {
        let terminal: FetchFn = Arc::new(|_req, _env, _ctx| {
            Box::pin(async { Err(anyhow::anyhow!("database is on fire").into()) })
        });
        let dispatcher = noop_dispatcher();

        let response = chain_with_stage()
            .invoke(
                &dispatcher,
                terminal,
                request(),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get(ERROR_FORMAT_HEADER).unwrap(), "json");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(envelope["error"]["name"], "Error");
        assert_eq!(envelope["error"]["message"], "database is on fire");
    }
}
