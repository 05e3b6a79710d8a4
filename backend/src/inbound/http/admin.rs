//! Actix entry point for the admin surface.
//!
//! Every `/admin/...` request is authorised, translated into an
//! [`AdminRequest`] and handed to the dispatcher. Route resolution, parameter
//! validation and collaborator calls all live in `domain::admin`; this module
//! only maps between Actix and the dispatch layer.

use actix_web::http::header::CACHE_CONTROL;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt as _;

use crate::domain::Error;
use crate::domain::admin::{AdminRequest, Method, body_too_large, invalid_body};
use crate::domain::idempotency::IDEMPOTENCY_KEY_HEADER;

use super::ApiResult;
use super::auth::AdminSession;
use super::state::HttpState;

/// Register the admin catch-all resource.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use admin_gateway::inbound::http::admin;
///
/// let app = App::new().configure(admin::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(["/admin", "/admin/{tail:.*}"]).to(admin_entry));
}

/// Translate an Actix request into the dispatch layer's request value.
pub(crate) fn admin_request(req: &HttpRequest, body: &[u8]) -> AdminRequest {
    let mut request = AdminRequest::new(Method::from(req.method().as_str()), req.path())
        .with_query(req.query_string());
    if let Some(value) = req.headers().get(IDEMPOTENCY_KEY_HEADER) {
        request = request.with_idempotency_key(String::from_utf8_lossy(value.as_bytes()));
    }
    if !body.is_empty() {
        request = request.with_body(body.to_vec());
    }
    request
}

/// Collect the request body, refusing more than `limit` bytes.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::Bytes, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|err| invalid_body(format!("failed to read request body: {err}")))?;
        if body.len() + chunk.len() > limit {
            return Err(body_too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Authorise and dispatch one admin request.
pub async fn admin_entry(
    session: AdminSession,
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    tracing::debug!(subject = session.subject(), path = req.path(), "admin request");
    let body = read_body(payload, state.dispatcher.settings().max_body_bytes).await?;
    let request = admin_request(&req, &body);
    let payload = state.dispatcher.dispatch(&request).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, "no-store"))
        .json(payload))
}
