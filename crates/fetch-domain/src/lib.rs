//! # Fetch Domain Model
//!
//! Tagged response and error types shared by every data source and every
//! cache/network strategy. A cache lookup, a network request and a cache
//! write all report back through a [`SealedResponse`], so strategies can
//! route results without knowing where they came from.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

/// Failure kinds a data source can report.
///
/// The set is closed. Strategies forward or drop these values but never
/// create or interpret them; classification is up to the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestError {
    #[error("Unknown error")]
    Unknown,

    #[error("No internet connection")]
    NoInternet,

    #[error("Server error")]
    Server,

    #[error("HTTP error {code}: {message}")]
    Http { code: u16, message: String },
}

impl RequestError {
    /// Short, stable name of the error kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::NoInternet => "NO_INTERNET",
            Self::Server => "SERVER",
            Self::Http { .. } => "HTTP",
        }
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Outcome of a single data-source operation.
///
/// Exactly one variant is ever present. The payload is only reachable
/// through a `match` (or the accessors below, which match internally).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum SealedResponse<T> {
    Success(T),
    Error(RequestError),
}

impl<T> SealedResponse<T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Borrow the payload of a successful response
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error(_) => None,
        }
    }

    /// Take the payload of a successful response
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error(_) => None,
        }
    }

    pub const fn error(&self) -> Option<&RequestError> {
        match self {
            Self::Success(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Transform the payload, leaving errors untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SealedResponse<U> {
        match self {
            Self::Success(data) => SealedResponse::Success(f(data)),
            Self::Error(error) => SealedResponse::Error(error),
        }
    }

    pub fn into_result(self) -> Result<T, RequestError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Error(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, RequestError>> for SealedResponse<T> {
    fn from(result: Result<T, RequestError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    #[test]
    fn test_error_has_no_data() {
        let response: SealedResponse<String> = SealedResponse::Error(RequestError::Server);

        assert!(response.is_error());
        assert_eq!(response.data(), None);
        assert_eq!(response.error(), Some(&RequestError::Server));
    }

    #[test]
    fn test_map_keeps_error() {
        let response: SealedResponse<u32> = SealedResponse::Error(RequestError::NoInternet);

        let mapped = response.map(|n| n * 2);
        assert_eq!(mapped, SealedResponse::Error(RequestError::NoInternet));
    }

    #[test]
    fn test_result_conversion() {
        let body: String = Faker.fake();
        let response = SealedResponse::from(Ok::<_, RequestError>(body.clone()));

        assert_eq!(response.clone().into_data(), Some(body.clone()));
        assert_eq!(response.into_result(), Ok(body));
    }

    #[test]
    fn test_http_error_display() {
        let error = RequestError::Http {
            code: 503,
            message: "unavailable".to_string(),
        };

        assert_eq!(error.to_string(), "HTTP error 503: unavailable");
        assert_eq!(error.as_str(), "HTTP");
    }

    #[test]
    fn test_serde_shape() {
        let ok = SealedResponse::Success(vec![1, 2, 3]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success", "payload": [1, 2, 3] }));

        let err: SealedResponse<Vec<i32>> = SealedResponse::Error(RequestError::Http {
            code: 404,
            message: "missing".to_string(),
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "error",
                "payload": { "kind": "HTTP", "code": 404, "message": "missing" }
            })
        );

        let back: SealedResponse<Vec<i32>> = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
