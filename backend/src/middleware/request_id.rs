use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
static CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Per-request identifier, available to handlers through request extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Propagates an inbound `x-request-id` (falling back to `x-correlation-id`)
/// and mints a fresh id when neither header is present. The id is echoed on
/// the response so callers can correlate logs.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = [&REQUEST_ID, &CORRELATION_ID]
        .into_iter()
        .find_map(|name| req.headers().get(name))
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }
    response
}
