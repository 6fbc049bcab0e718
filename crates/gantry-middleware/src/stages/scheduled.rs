//! Scheduled-event test harness middleware.
//!
//! Local development has no timer source, so timer handlers are exercised
//! through the normal request entry point instead: a request to the
//! well-known sentinel path `/__scheduled` synthesizes a scheduled event
//! against the wrapped program and reports the outcome as an ordinary
//! response. A `cron` query parameter attributes an expression to the
//! event, e.g. `/__scheduled?cron=* * * * *`.
//!
//! Every other path passes through untouched.

use crate::context::MiddlewareContext;
use crate::middleware::Middleware;
use gantry_core::{
    BoxFuture, DispatchEvent, Env, ExecutionContext, FacadeError, FacadeResult, Request, Response,
    ResponseExt, ScheduledInit,
};
use http::StatusCode;
use serde::Deserialize;
use std::str::FromStr;

/// The sentinel path that triggers a synthesized scheduled event.
pub const SCHEDULED_PATH: &str = "/__scheduled";

#[derive(Debug, Default, Deserialize)]
struct ScheduledQuery {
    cron: Option<String>,
}

/// Middleware exposing the `/__scheduled` test route.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduledTestMiddleware;

impl ScheduledTestMiddleware {
    /// Creates the harness middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for ScheduledTestMiddleware {
    fn name(&self) -> &'static str {
        "scheduled_test"
    }

    fn handle<'a>(
        &'a self,
        request: Request,
        env: Env,
        _ctx: ExecutionContext,
        chain: MiddlewareContext<'a>,
    ) -> BoxFuture<'a, FacadeResult<Response>> {
        Box::pin(async move {
            if request.uri().path() != SCHEDULED_PATH {
                return chain.next(request, env).await;
            }

            let query: ScheduledQuery =
                serde_urlencoded::from_str(request.uri().query().unwrap_or(""))
                    .unwrap_or_default();

            if let Some(cron) = query.cron.as_deref() {
                if !cron.is_empty() {
                    if let Err(err) = validate_cron(cron) {
                        tracing::debug!(cron, "rejected scheduled test request");
                        return Ok(Response::error(StatusCode::BAD_REQUEST, &err.to_string()));
                    }
                }
            }

            tracing::debug!(cron = query.cron.as_deref(), "synthesizing scheduled event");
            chain
                .dispatch(DispatchEvent::Scheduled(ScheduledInit { cron: query.cron }))
                .await?;

            Ok(Response::text("Ran scheduled event"))
        })
    }
}

/// Validates a five-field cron expression.
///
/// `cron::Schedule` parses six- and seven-field expressions, so a zero
/// seconds field is prepended before parsing.
fn validate_cron(expr: &str) -> FacadeResult<()> {
    cron::Schedule::from_str(&format!("0 {expr}"))
        .map(|_| ())
        .map_err(|_| FacadeError::InvalidCron(expr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MiddlewareRegistry;
    use bytes::Bytes;
    use gantry_core::{Dispatcher, FetchFn};
    use http_body_util::{BodyExt, Full};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn request(uri: &str) -> Request {
        http::Request::builder()
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn body_of(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn harness_chain() -> crate::registry::MiddlewareChain {
        let mut registry = MiddlewareRegistry::new();
        registry.register([Arc::new(ScheduledTestMiddleware::new()) as Arc<dyn Middleware>]);
        registry.seal()
    }

    fn recording_dispatcher(
        count: Arc<AtomicUsize>,
        seen_cron: Arc<Mutex<Option<String>>>,
    ) -> Dispatcher {
        Dispatcher::new(move |event| {
            let count = count.clone();
            let seen_cron = seen_cron.clone();
            Box::pin(async move {
                if let DispatchEvent::Scheduled(init) = event {
                    count.fetch_add(1, Ordering::SeqCst);
                    *seen_cron.lock().unwrap() = init.cron;
                }
                Ok(None)
            })
        })
    }

    fn terminal(counter: Arc<AtomicUsize>) -> FetchFn {
        Arc::new(move |_req, _env, _ctx| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Response::text("handler"))
            })
        })
    }

    #[tokio::test]
    async fn test_sentinel_path_dispatches_and_reports() {
        let dispatched = Arc::new(AtomicUsize::new(0));
        let seen_cron = Arc::new(Mutex::new(None));
        let terminal_calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = recording_dispatcher(dispatched.clone(), seen_cron.clone());

        let chain = harness_chain();
        let response = chain
            .invoke(
                &dispatcher,
                terminal(terminal_calls.clone()),
                request("/__scheduled?cron=*%20*%20*%20*%20*"),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(body_of(response).await, "Ran scheduled event");
        assert_eq!(dispatched.load(Ordering::SeqCst), 1);
        assert_eq!(seen_cron.lock().unwrap().as_deref(), Some("* * * * *"));
        // The harness short-circuits; the fetch handler never runs.
        assert_eq!(terminal_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_cron_dispatches_without_expression() {
        let dispatched = Arc::new(AtomicUsize::new(0));
        let seen_cron = Arc::new(Mutex::new(None));
        let dispatcher = recording_dispatcher(dispatched.clone(), seen_cron.clone());

        let chain = harness_chain();
        let response = chain
            .invoke(
                &dispatcher,
                terminal(Arc::new(AtomicUsize::new(0))),
                request("/__scheduled"),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(dispatched.load(Ordering::SeqCst), 1);
        assert!(seen_cron.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_paths_pass_through() {
        let dispatched = Arc::new(AtomicUsize::new(0));
        let terminal_calls = Arc::new(AtomicUsize::new(0));
        let dispatcher =
            recording_dispatcher(dispatched.clone(), Arc::new(Mutex::new(None)));

        let chain = harness_chain();
        let response = chain
            .invoke(
                &dispatcher,
                terminal(terminal_calls.clone()),
                request("/api/items"),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(body_of(response).await, "handler");
        assert_eq!(dispatched.load(Ordering::SeqCst), 0);
        assert_eq!(terminal_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_cron_is_rejected_without_dispatching() {
        let dispatched = Arc::new(AtomicUsize::new(0));
        let dispatcher =
            recording_dispatcher(dispatched.clone(), Arc::new(Mutex::new(None)));

        let chain = harness_chain();
        let response = chain
            .invoke(
                &dispatcher,
                terminal(Arc::new(AtomicUsize::new(0))),
                request("/__scheduled?cron=not-a-cron"),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(dispatched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_error_propagates() {
        let dispatcher = Dispatcher::new(|_event| {
            Box::pin(async { Err(anyhow::anyhow!("boom").into()) })
        });

        let chain = harness_chain();
        let err = chain
            .invoke(
                &dispatcher,
                terminal(Arc::new(AtomicUsize::new(0))),
                request("/__scheduled"),
                Env::new(),
                ExecutionContext::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_validate_cron() {
        assert!(validate_cron("* * * * *").is_ok());
        assert!(validate_cron("*/30 * * * *").is_ok());
        assert!(validate_cron("nope").is_err());
    }
}
