use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::store::Identity;

/// Optional-auth middleware: every request gets an `Identity` extension.
/// A missing, malformed or expired bearer token resolves to `Anonymous`
/// rather than an error; endpoints that need a user enforce it themselves.
pub async fn identity_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let identity = match extract_bearer(&headers) {
        Some(token) => match validate_jwt(&token) {
            Ok(claims) => Identity::User {
                id: claims.sub,
                role: claims.role,
            },
            Err(reason) => {
                tracing::debug!("Rejected bearer token: {}", reason);
                Identity::Anonymous
            }
        },
        None => Identity::Anonymous,
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Reject anonymous callers with 401. Write endpoints and the profile
/// endpoints call this before touching the store.
pub fn require_user(identity: &Identity) -> Result<(String, crate::store::Role), ApiError> {
    match identity {
        Identity::User { id, role } => Ok((id.clone(), *role)),
        Identity::Anonymous => Err(ApiError::unauthorized("Authentication required")),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
