//! Error context utilities.

use super::types::ApiError;

/// Extension trait for turning lookups and fallible calls into [`ApiError`]s.
pub trait ErrorContext<T> {
    /// Wrap the error as an internal error with context.
    fn context(self, context: impl Into<String>) -> Result<T, ApiError>;

    /// Map to a not-found error naming `resource`.
    fn not_found(self, resource: &'static str) -> Result<T, ApiError>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ErrorContext<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::Internal(anyhow::Error::from(e).context(context.into())))
    }

    fn not_found(self, resource: &'static str) -> Result<T, ApiError> {
        self.map_err(|_| ApiError::NotFound(resource))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::Internal(anyhow::anyhow!(context.into())))
    }

    fn not_found(self, resource: &'static str) -> Result<T, ApiError> {
        self.ok_or(ApiError::NotFound(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_not_found() {
        let missing: Option<u8> = None;
        let err = missing.not_found("Category").unwrap_err();
        assert_eq!(err.to_string(), "Category not found");
    }

    #[test]
    fn test_result_context_is_internal() {
        let failed: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let err = failed.context("writing export").unwrap_err();
        assert!(err.is_server_error());
    }
}
