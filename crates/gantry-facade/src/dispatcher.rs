//! Dispatcher construction.
//!
//! A [`Dispatcher`] is built once per invocation, bound to the program
//! shape being wrapped. Dispatch always targets the raw program: the fetch
//! kind reaches the terminal request path directly, and the scheduled kind
//! synthesizes a controller and calls the program's timer handler. The
//! middleware chain is never re-entered from here.

use chrono::Utc;
use gantry_core::{
    DispatchEvent, Dispatcher, Env, ExecutionContext, FacadeError, HandlerSet,
    ScheduledController, WorkerEntrypoint,
};
use std::sync::Arc;

/// Builds the dispatcher for a handler-set program.
///
/// `env` and `ctx` are the invocation's own values, captured before any
/// middleware had a chance to rewrite them; a synthesized event sees the
/// same environment the transport delivered.
pub(crate) fn handler_dispatcher(
    worker: Arc<HandlerSet>,
    env: Env,
    ctx: ExecutionContext,
) -> Dispatcher {
    Dispatcher::new(move |event| {
        let worker = worker.clone();
        let env = env.clone();
        let ctx = ctx.clone();
        Box::pin(async move {
            match event {
                DispatchEvent::Fetch(request) => {
                    let Some(fetch) = worker.fetch_handler().cloned() else {
                        return Err(FacadeError::FetchNotExported);
                    };
                    Ok(Some(fetch(request, env, ctx).await?))
                }
                DispatchEvent::Scheduled(init) => {
                    let Some(scheduled) = worker.scheduled_handler().cloned() else {
                        tracing::warn!(
                            "scheduled event dispatched to a program with no scheduled handler"
                        );
                        return Ok(None);
                    };
                    let controller = new_controller(init.cron);
                    scheduled(controller, env, ctx).await?;
                    Ok(None)
                }
            }
        })
    })
}

/// Builds the dispatcher for one entrypoint instance.
///
/// The instance already carries its environment and execution context, so
/// handlers are invoked with the event payload alone.
pub(crate) fn entrypoint_dispatcher(instance: Arc<dyn WorkerEntrypoint>) -> Dispatcher {
    Dispatcher::new(move |event| {
        let instance = instance.clone();
        Box::pin(async move {
            match event {
                DispatchEvent::Fetch(request) => match instance.fetch(request) {
                    Some(fut) => Ok(Some(fut.await?)),
                    None => Err(FacadeError::FetchNotDefined),
                },
                DispatchEvent::Scheduled(init) => {
                    let controller = new_controller(init.cron);
                    match instance.scheduled(controller) {
                        Some(fut) => {
                            fut.await?;
                            Ok(None)
                        }
                        None => {
                            tracing::warn!(
                                "scheduled event dispatched to an entrypoint with no scheduled method"
                            );
                            Ok(None)
                        }
                    }
                }
            }
        })
    })
}

fn new_controller(cron: Option<String>) -> ScheduledController {
    // Retry suppression is the timer source's concern; the facade only
    // guarantees the capability exists and is brand-checked.
    ScheduledController::new(Utc::now(), cron.unwrap_or_default(), || {})
}
