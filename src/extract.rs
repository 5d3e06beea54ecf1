//! Request extractors that report failures as [`AppError`].

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Host, Request},
    http::{header, request::Parts},
    Json,
};
use serde_json::Value;

use crate::error::{AppError, NON_FIELD_ERRORS};
use crate::state::AppState;

/// A parsed but not yet validated JSON body.
#[derive(Debug)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => Err(AppError::UnsupportedMediaType),
            Err(JsonRejection::JsonSyntaxError(err)) => Err(AppError::field(
                NON_FIELD_ERRORS,
                format!("JSON parse error - {}", err.body_text()),
            )),
            Err(rejection) => Err(AppError::field(NON_FIELD_ERRORS, rejection.body_text())),
        }
    }
}

/// `scheme://host` of the incoming request, used to build absolute URLs.
///
/// The host comes from the `Host` header, falling back to the request URI.
/// `Forwarded`, `X-Forwarded-Host` and `X-Forwarded-Proto` are only
/// consulted when the state trusts proxy headers.
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);
impl BaseUrl {
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for BaseUrl {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let trusted = state.trusts_proxy_headers();
        let host = if trusted {
            Host::from_request_parts(parts, state)
                .await
                .ok()
                .map(|Host(host)| host)
        } else {
            direct_host(parts)
        };
        let host = host.ok_or_else(|| AppError::field(NON_FIELD_ERRORS, "Missing Host header."))?;

        let forwarded_https = trusted
            && parts
                .headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));
        let scheme = if forwarded_https { "https" } else { "http" };
        Ok(BaseUrl(format!("{scheme}://{host}")))
    }
}

fn direct_host(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|authority| authority.to_string()))
}
