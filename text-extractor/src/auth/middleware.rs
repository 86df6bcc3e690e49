use crate::{AppState, config::Config, errors::Error};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, trace};

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Check the request headers against the configured key.
///
/// The header value is compared byte for byte, so it is case sensitive and not trimmed.
pub(crate) fn authenticate(config: &Config, headers: &HeaderMap) -> Result<(), Error> {
    let Some(expected) = config.configured_api_key() else {
        debug!("Rejecting request: no api_key configured");
        return Err(Error::Unauthenticated);
    };

    match headers.get(API_KEY_HEADER) {
        Some(provided) if provided.as_bytes() == expected.as_bytes() => {
            trace!("API key accepted");
            Ok(())
        }
        Some(_) => {
            debug!("Rejecting request: API key mismatch");
            Err(Error::Unauthenticated)
        }
        None => {
            debug!("Rejecting request: missing {} header", API_KEY_HEADER);
            Err(Error::Unauthenticated)
        }
    }
}

/// Middleware that only lets requests with the configured API key through.
///
/// Runs before the handler extracts anything, so rejected uploads are never read or parsed.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    authenticate(&state.config, request.headers())?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_API_KEY, create_test_config};
    use axum::http::HeaderValue;

    fn headers_with_key(key: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(key).unwrap());
        headers
    }

    #[test]
    fn test_matching_key_accepted() {
        let config = create_test_config();
        assert!(authenticate(&config, &headers_with_key(TEST_API_KEY.as_bytes())).is_ok());
    }

    #[test]
    fn test_header_name_is_case_insensitive() {
        let config = create_test_config();
        let mut headers = HeaderMap::new();
        headers.insert("X-API-KEY", HeaderValue::from_static(TEST_API_KEY));

        assert!(authenticate(&config, &headers).is_ok());
    }

    #[test]
    fn test_missing_header_rejected() {
        let config = create_test_config();
        let result = authenticate(&config, &HeaderMap::new());
        assert!(matches!(result, Err(Error::Unauthenticated)));
    }

    #[test]
    fn test_value_is_compared_exactly() {
        let config = create_test_config();

        for key in [&b"TEST-API-KEY"[..], b"test-api-key ", b"test-api", b"test-api-key-extra", b""] {
            let result = authenticate(&config, &headers_with_key(key));
            assert!(matches!(result, Err(Error::Unauthenticated)), "accepted {:?}", String::from_utf8_lossy(key));
        }
    }

    #[test]
    fn test_unset_or_empty_key_rejects_everything() {
        let mut config = create_test_config();

        config.api_key = None;
        assert!(authenticate(&config, &HeaderMap::new()).is_err());
        assert!(authenticate(&config, &headers_with_key(b"")).is_err());

        config.api_key = Some(String::new());
        assert!(authenticate(&config, &HeaderMap::new()).is_err());
        assert!(authenticate(&config, &headers_with_key(b"")).is_err());
    }

    #[test]
    fn test_key_with_non_ascii_bytes() {
        let mut config = create_test_config();
        config.api_key = Some("clé-secrète".to_string());

        assert!(authenticate(&config, &headers_with_key("clé-secrète".as_bytes())).is_ok());
        assert!(authenticate(&config, &headers_with_key(b"cle-secrete")).is_err());
    }
}
