//! HTTP response building module
//!
//! Provides builders for JSON responses and the headers every response carries.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_TYPE, SERVER,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::HttpConfig;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Build JSON response
///
/// `pretty` selects indented output, used in debug mode.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    pretty: bool,
) -> Response<Full<Bytes>> {
    let serialized = if pretty {
        serde_json::to_vec_pretty(body)
    } else {
        serde_json::to_vec(body)
    };

    let json = match serialized {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_raw_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"error":"Internal server error"}"#,
            );
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build JSON response from a static body
pub fn build_raw_json(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(body.as_bytes())))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, "GET, POST, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, HEAD, OPTIONS")
            .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization")
            .header(ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Stamp the server name and, when enabled, the wildcard CORS origin
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, http: &HttpConfig) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&http.server_name) {
        headers.insert(SERVER, value);
    }
    if http.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn http_config(enable_cors: bool) -> HttpConfig {
        HttpConfig {
            server_name: "AgriSense/test".to_string(),
            enable_cors,
            max_body_size: 1024,
        }
    }

    #[tokio::test]
    async fn test_json_response_body_and_type() {
        let resp = json_response(StatusCode::CREATED, &serde_json::json!({"a": 1}), false);
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_json_response_pretty() {
        let resp = json_response(StatusCode::OK, &serde_json::json!({"a": 1}), true);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.contains(&b'\n'));
    }

    #[test]
    fn test_options_response_cors() {
        let resp = build_options_response(true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().contains_key(ACCESS_CONTROL_ALLOW_METHODS));

        let resp = build_options_response(false);
        assert!(!resp.headers().contains_key(ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[test]
    fn test_only_bodies_are_typed_json() {
        assert!(!build_options_response(true).headers().contains_key(CONTENT_TYPE));
        let resp = json_response(StatusCode::BAD_REQUEST, &serde_json::json!({}), false);
        assert_eq!(resp.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_common_headers() {
        let mut resp = build_raw_json(StatusCode::OK, "{}");
        apply_common_headers(&mut resp, &http_config(true));
        assert_eq!(resp.headers()[SERVER], "AgriSense/test");
        assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let mut resp = build_raw_json(StatusCode::OK, "{}");
        apply_common_headers(&mut resp, &http_config(false));
        assert!(!resp.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
