//! ETags for pedigree responses.
//!
//! A pedigree is derived data with no version column of its own, so the tag
//! is a SHA-256 over the serialised response body. Any change to an animal
//! in the tree changes the body and therefore the tag.

use axum::{
  body::Body,
  extract::Request,
  http::{
    HeaderMap,
    HeaderValue,
    Method,
    StatusCode,
    header::{ETAG, IF_NONE_MATCH},
  },
  middleware::Next,
  response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

/// Compute a quoted strong ETag for `body`.
pub fn compute_etag(body: &[u8]) -> String {
  let hash = Sha256::digest(body);
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Handles `*`, comma-separated lists and weak (`W/`) validators.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let Some(value) = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok())
  else {
    return false;
  };
  value.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || candidate.trim_start_matches("W/") == etag
  })
}

fn is_pedigree(req: &Request) -> bool {
  req.method() == Method::GET && req.uri().path().ends_with("/pedigree")
}

/// Middleware that tags successful pedigree responses and answers matching
/// conditional requests with `304 Not Modified`.
pub async fn pedigree_etag(req: Request, next: Next) -> Response {
  if !is_pedigree(&req) {
    return next.run(req).await;
  }
  let request_headers = req.headers().clone();

  let resp = next.run(req).await;
  if resp.status() != StatusCode::OK {
    return resp;
  }

  let (mut parts, body) = resp.into_parts();
  let bytes = match axum::body::to_bytes(body, usize::MAX).await {
    Ok(b) => b,
    Err(e) => {
      tracing::warn!("failed to buffer pedigree body: {e}");
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  };

  let etag = compute_etag(&bytes);
  let Ok(etag_value) = HeaderValue::from_str(&etag) else {
    return Response::from_parts(parts, Body::from(bytes));
  };

  if if_none_match(&request_headers, &etag) {
    return (StatusCode::NOT_MODIFIED, [(ETAG, etag_value)]).into_response();
  }

  parts.headers.insert(ETAG, etag_value);
  Response::from_parts(parts, Body::from(bytes))
}
