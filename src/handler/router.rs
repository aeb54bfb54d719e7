//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! body size checks, route matching, error mapping and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::api::{self, ApiError};
use crate::config::AppState;
use crate::http::{self, BoxError};
use crate::logger::{self, AccessLogEntry};

const GET_ALLOW: &str = "GET, HEAD, OPTIONS";
const POST_ALLOW: &str = "POST, OPTIONS";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    state.record_request();

    let access_log = state.access_log_enabled().then(|| access_entry(&req, remote_addr));
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = match route_request(req, &state).await {
        Ok(resp) => resp,
        Err(err) => {
            logger::log_api_error(method.as_str(), &path, &err);
            err.into_response(state.config.server.debug)
        }
    };
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(mut entry) = access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch by method and path
async fn route_request<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if req.method() == Method::OPTIONS {
        return Ok(http::build_options_response(state.config.http.enable_cors));
    }

    check_body_size(&req, state.config.http.max_body_size)?;

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    match (method, path.as_str()) {
        (Method::GET | Method::HEAD, "/health") => api::health(state),
        (Method::GET | Method::HEAD, "/status") => api::system_status(state).await,
        (Method::POST, "/predictDisease") => api::predict_disease(req.into_body(), state).await,
        (Method::POST, "/spray") => api::spray(req.into_body(), state).await,
        (method, "/health" | "/status") => Err(ApiError::MethodNotAllowed {
            method: method.to_string(),
            allow: GET_ALLOW,
        }),
        (method, "/predictDisease" | "/spray") => Err(ApiError::MethodNotAllowed {
            method: method.to_string(),
            allow: POST_ALLOW,
        }),
        (_, path) => Err(ApiError::NotFound {
            path: path.to_string(),
        }),
    }
}

/// Reject early when the declared Content-Length already exceeds the limit
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Result<(), ApiError> {
    let Some(content_length) = req.headers().get(CONTENT_LENGTH) else {
        return Ok(());
    };

    match content_length.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) if size > max_body_size => Err(ApiError::PayloadTooLarge {
            limit: max_body_size,
        }),
        Some(Ok(_)) => Ok(()),
        _ => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            Ok(())
        }
    }
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
