//! API key validation.
//!
//! A validator answers one question: does the provider accept this key? The answer is
//! asynchronous and may fail outright (network down, timeout). Callers treat any failure
//! the same as a rejected key; the error is only logged.

pub mod gemini;

pub use gemini::GeminiValidator;

use std::future::Future;

/// Checks a candidate API key against the upstream provider.
pub trait KeyValidator {
    /// Returns `Ok(true)` if the provider accepts `key`, `Ok(false)` if it rejects it,
    /// and `Err` if the check itself could not be completed.
    fn validate(&self, key: &str) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

impl<V: KeyValidator> KeyValidator for &V {
    fn validate(&self, key: &str) -> impl Future<Output = anyhow::Result<bool>> + Send {
        (**self).validate(key)
    }
}

/// Result of the most recent validation round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationOutcome {
    /// No validation has been requested yet
    #[default]
    NotRequested,
    /// A validation call is in flight
    Pending,
    /// The provider answered: `true` if the key was accepted
    Success(bool),
    /// The check could not be completed; holds the error message
    Failure(String),
}

impl ValidationOutcome {
    /// Whether this outcome counts as a valid key. Failures never do.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Success(true))
    }
}

/// Runs `validator` and collapses the result into an outcome.
pub async fn run_validation<V: KeyValidator>(validator: &V, key: &str) -> ValidationOutcome {
    match validator.validate(key).await {
        Ok(valid) => {
            tracing::info!("API key validation finished: valid={valid}");
            ValidationOutcome::Success(valid)
        }
        Err(e) => {
            tracing::error!("Error checking API key validity: {e}");
            ValidationOutcome::Failure(e.to_string())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockValidator;
    use super::*;

    #[tokio::test]
    async fn test_failure_is_never_valid() {
        let outcome = run_validation(&MockValidator::failing("connection refused"), "key").await;
        assert_eq!(outcome, ValidationOutcome::Failure("connection refused".to_string()));
        assert!(!outcome.is_valid());
    }

    #[tokio::test]
    async fn test_success_outcomes() {
        assert!(run_validation(&MockValidator::accepting(), "key").await.is_valid());
        assert_eq!(
            run_validation(&MockValidator::rejecting(), "key").await,
            ValidationOutcome::Success(false)
        );
        assert!(!ValidationOutcome::Pending.is_valid());
    }
}
