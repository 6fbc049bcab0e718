//! Error types for the facade.
//!
//! The facade distinguishes configuration errors (a program shape that can
//! never serve the request path) from handler runtime errors, which cross
//! the facade untouched. There is no retry, translation, or logging here;
//! errors reach whichever caller is most immediately awaiting.

use thiserror::Error;

/// Result type alias using [`FacadeError`].
pub type FacadeResult<T> = Result<T, FacadeError>;

/// Standard error type for the facade.
#[derive(Error, Debug)]
pub enum FacadeError {
    /// A handler-set program was asked to serve a request but exports no
    /// fetch handler. This is a configuration error, not a runtime one.
    #[error("handler does not export a fetch() function")]
    FetchNotExported,

    /// An entrypoint program was asked to serve a request but its type
    /// defines no fetch method.
    #[error("entrypoint does not define a fetch() method")]
    FetchNotDefined,

    /// A timer event fired against a program with no scheduled handler.
    ///
    /// This only applies to the direct transport surface; dispatching a
    /// scheduled event through middleware against such a program is a
    /// successful no-op instead.
    #[error("handler does not export a scheduled() function")]
    ScheduledNotExported,

    /// A capability method was invoked against a receiver it was not
    /// issued for.
    #[error("illegal invocation")]
    IllegalInvocation,

    /// A cron expression could not be parsed.
    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    /// An error produced by a handler or middleware. Carried transparently:
    /// the message observed by a caller is exactly the original message.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl FacadeError {
    /// Returns true if this error marks a misconfigured program shape.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::FetchNotExported | Self::FetchNotDefined | Self::ScheduledNotExported
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_message_is_transparent() {
        let err = FacadeError::from(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_configuration_classification() {
        assert!(FacadeError::FetchNotExported.is_configuration());
        assert!(FacadeError::FetchNotDefined.is_configuration());
        assert!(!FacadeError::IllegalInvocation.is_configuration());
        assert!(!FacadeError::from(anyhow::anyhow!("x")).is_configuration());
    }
}
