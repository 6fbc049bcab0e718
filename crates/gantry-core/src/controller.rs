//! Scheduled invocation controller.
//!
//! A [`ScheduledController`] describes one timer-triggered invocation: the
//! time the event was synthesized and the cron expression that (nominally)
//! produced it. It also carries a retry-suppression capability, `no_retry`,
//! which must not be detachable: the backing [`NoRetryHandle`] is branded
//! with an opaque token and refuses to run against any other controller.

use crate::error::{FacadeError, FacadeResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Opaque brand token tying a [`NoRetryHandle`] to its controller.
///
/// Identity is pointer identity of the owning `Arc`; the token carries no
/// data.
#[derive(Debug)]
pub struct ControllerBrand {
    _private: (),
}

/// Value object describing a timer-triggered invocation.
pub struct ScheduledController {
    scheduled_time: DateTime<Utc>,
    cron: String,
    brand: Arc<ControllerBrand>,
    no_retry: NoRetryHandle,
}

impl ScheduledController {
    /// Creates a controller with the given retry-suppression callback.
    ///
    /// The dispatcher passes a no-op callback; retry suppression itself is
    /// the timer source's concern, not the facade's.
    #[must_use]
    pub fn new(
        scheduled_time: DateTime<Utc>,
        cron: impl Into<String>,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let brand = Arc::new(ControllerBrand { _private: () });
        Self {
            scheduled_time,
            cron: cron.into(),
            no_retry: NoRetryHandle {
                brand: brand.clone(),
                callback: Arc::new(callback),
            },
            brand,
        }
    }

    /// The time the event was synthesized.
    #[must_use]
    pub fn scheduled_time(&self) -> DateTime<Utc> {
        self.scheduled_time
    }

    /// The cron expression associated with the event, possibly empty.
    #[must_use]
    pub fn cron(&self) -> &str {
        &self.cron
    }

    /// Suppresses retry of this invocation.
    ///
    /// # Errors
    ///
    /// Never fails when called on the controller itself; the error path
    /// exists because the backing capability is brand-checked (see
    /// [`NoRetryHandle::invoke`]).
    pub fn no_retry(&self) -> FacadeResult<()> {
        self.no_retry.invoke(self)
    }

    /// Returns the detached capability handle.
    ///
    /// The handle stays bound to this controller: invoking it against any
    /// other receiver fails the brand check.
    #[must_use]
    pub fn no_retry_handle(&self) -> NoRetryHandle {
        self.no_retry.clone()
    }
}

impl std::fmt::Debug for ScheduledController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledController")
            .field("scheduled_time", &self.scheduled_time)
            .field("cron", &self.cron)
            .finish_non_exhaustive()
    }
}

/// The retry-suppression capability of one [`ScheduledController`].
#[derive(Clone)]
pub struct NoRetryHandle {
    brand: Arc<ControllerBrand>,
    callback: Arc<dyn Fn() + Send + Sync>,
}

impl NoRetryHandle {
    /// Invokes the capability against a receiver controller.
    ///
    /// # Errors
    ///
    /// Returns [`FacadeError::IllegalInvocation`] if the receiver is not
    /// the controller this handle was issued for.
    pub fn invoke(&self, receiver: &ScheduledController) -> FacadeResult<()> {
        if !Arc::ptr_eq(&self.brand, &receiver.brand) {
            return Err(FacadeError::IllegalInvocation);
        }
        (self.callback)();
        Ok(())
    }
}

impl std::fmt::Debug for NoRetryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoRetryHandle").finish_non_exhaustive()
    }
}
