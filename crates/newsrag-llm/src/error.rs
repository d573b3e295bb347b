#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication rejected by {provider} (status {status}), check the API key")]
    Auth { provider: &'static str, status: u16 },

    #[error("rate limited")]
    RateLimited,

    #[error("{provider} API request failed (status {status})")]
    Api { provider: &'static str, status: u16 },

    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: &'static str },

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    /// Map a non-success HTTP status to the matching error variant.
    #[must_use]
    pub fn from_status(provider: &'static str, status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Self::Auth {
                provider,
                status: status.as_u16(),
            },
            reqwest::StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            _ => Self::Api {
                provider,
                status: status.as_u16(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth() {
        let err = LlmError::from_status("openai", reqwest::StatusCode::UNAUTHORIZED);
        assert!(matches!(err, LlmError::Auth { status: 401, .. }));
    }

    #[test]
    fn forbidden_maps_to_auth() {
        let err = LlmError::from_status("openai", reqwest::StatusCode::FORBIDDEN);
        assert!(matches!(err, LlmError::Auth { status: 403, .. }));
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        let err = LlmError::from_status("openai", reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[test]
    fn server_error_maps_to_api() {
        let err = LlmError::from_status("openai", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "openai API request failed (status 502)");
    }
}
