//! Request body extraction
//!
//! Browser forms post `application/x-www-form-urlencoded`, scripted
//! clients post JSON; both decode into the same request types.

use axum::{
    Form, Json,
    body::Body,
    extract::{
        FromRequest, Request,
        rejection::{FormRejection, JsonRejection},
    },
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Largest body accepted, matching axum's default limit
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// A JSON or urlencoded request body
///
/// An empty body, or one with a content type other than the two above,
/// decodes to `T::default()`.
#[derive(Debug)]
pub struct IssueBody<T>(pub T);

/// Why a body could not be decoded
#[derive(Error, Debug)]
pub enum BodyError {
    #[error("failed to read request body: {0}")]
    Read(axum::Error),

    #[error("{0}")]
    Json(#[from] JsonRejection),

    #[error("{0}")]
    Form(#[from] FormRejection),
}

impl IntoResponse for BodyError {
    fn into_response(self) -> Response {
        tracing::warn!("Rejected request body: {}", self);
        let body = serde_json::json!({ "error": format!("invalid request body: {self}") });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(req: &Request) -> BodyKind {
    let Some(content_type) = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return BodyKind::Other;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

impl<S, T> FromRequest<S> for IssueBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = BodyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = body_kind(&req);
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(BodyError::Read)?;

        if bytes.is_empty() {
            return Ok(Self(T::default()));
        }

        match kind {
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_bytes(&bytes)?;
                Ok(Self(value))
            }
            BodyKind::Form => {
                let req = Request::from_parts(parts, Body::from(bytes));
                let Form(value) = Form::<T>::from_request(req, state).await?;
                Ok(Self(value))
            }
            BodyKind::Other => {
                tracing::debug!("Ignoring request body without a JSON or form content type");
                Ok(Self(T::default()))
            }
        }
    }
}
