//! Caller identity extractor.
//!
//! Authentication itself is an external collaborator: an upstream layer
//! verifies credentials and asserts the caller's id in the `x-user-id`
//! header. This extractor only receives that identity; an absent header
//! means the caller is anonymous.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const IDENTITY_HEADER: &str = "x-user-id";

/// The authenticated caller, or `None` for anonymous requests.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Option<Uuid>);

impl Identity {
  /// The caller's id, rejecting anonymous callers with 401.
  pub fn require(self) -> Result<Uuid, ApiError> {
    self
      .0
      .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))
  }
}

impl<S> FromRequestParts<S> for Identity
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(IDENTITY_HEADER) else {
      return Ok(Self(None));
    };

    let id = value
      .to_str()
      .ok()
      .and_then(|s| Uuid::parse_str(s).ok())
      .ok_or_else(|| {
        ApiError::BadRequest(format!("invalid {IDENTITY_HEADER} header"))
      })?;

    Ok(Self(Some(id)))
  }
}
