//! Best-effort field reads.
//!
//! Upstream jobs expose every field through a fallible, optional accessor.
//! These helpers collapse both failure modes into a default so that one
//! missing field never aborts the whole record. They do not log.

use std::future::Future;

use qtracker_hal::HalResult;

/// The value of `read`, or `default` on error or absence.
pub async fn safe_call<T, F>(read: F, default: T) -> T
where
    F: Future<Output = HalResult<Option<T>>>,
{
    safe_call_opt(read).await.unwrap_or(default)
}

/// The value of `read`, or `None` on error or absence.
pub async fn safe_call_opt<T, F>(read: F) -> Option<T>
where
    F: Future<Output = HalResult<Option<T>>>,
{
    read.await.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtracker_hal::HalError;

    #[tokio::test]
    async fn test_present_value_wins() {
        assert_eq!(safe_call(async { Ok(Some(2.5)) }, 0.0).await, 2.5);
    }

    #[tokio::test]
    async fn test_absent_value_defaults() {
        assert_eq!(safe_call(async { Ok(None) }, 0.0).await, 0.0);
    }

    #[tokio::test]
    async fn test_failed_read_defaults() {
        let read = async { Err::<Option<f64>, _>(HalError::FieldUnavailable("time_taken".into())) };
        assert_eq!(safe_call(read, 1.0).await, 1.0);
    }
}
