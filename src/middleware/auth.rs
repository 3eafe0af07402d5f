//! Bearer-token and role-gate extractors
//!
//! The auth chain is an ordered pair of checks that run before a handler
//! body executes and short-circuit with the matching status:
//!
//! 1. token verification: no `Authorization` header is 401, a malformed
//!    header or bad signature is 403;
//! 2. role gate: the user document is re-fetched by the identity claim on
//!    every request (no caching) and the stored role is matched against the
//!    gate. A missing document or role fails closed with 403.
//!
//! Handlers opt in by taking [`AuthenticatedUser`], [`MemberUser`] or
//! [`AdminUser`] as an argument.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::UserRole;

/// Verified token claims, with no role requirement.
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Err(ApiError::Unauthorized);
        }

        // Header present but not a usable bearer token is a 403, matching
        // the verification failure path.
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Forbidden)?;

        let claims = state
            .tokens
            .verify(bearer.token())
            .map_err(|_| ApiError::Forbidden)?;

        Ok(Self(claims))
    }
}

/// Token claims gated on role `member` or `admin`.
pub struct MemberUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for MemberUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let AuthenticatedUser(claims) =
            AuthenticatedUser::from_request_parts(parts, state).await?;

        let role = fetch_role(state, &claims).await?;
        if !role.grants_member_access() {
            return Err(ApiError::Forbidden);
        }

        Ok(Self(claims))
    }
}

/// Token claims gated on role `admin` only.
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let AuthenticatedUser(claims) =
            AuthenticatedUser::from_request_parts(parts, state).await?;

        let role = fetch_role(state, &claims).await?;
        if !role.grants_admin_access() {
            return Err(ApiError::Forbidden);
        }

        Ok(Self(claims))
    }
}

/// Look up the stored role for an identity claim.
///
/// A user document that vanished between login and this request, or one
/// written without a role, rejects the request instead of faulting.
async fn fetch_role(state: &AppState, claims: &Claims) -> Result<UserRole, ApiError> {
    let filter = claims.identity_filter().ok_or(ApiError::Forbidden)?;
    let user = state.users.find_one(filter, None).await?;
    stored_role(user)
}

/// Extract the role from a looked-up user document, failing closed when the
/// document is absent or was written without a role.
fn stored_role(user: Option<crate::models::User>) -> Result<UserRole, ApiError> {
    user.ok_or(ApiError::Forbidden)?
        .role
        .ok_or(ApiError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Json, Router,
    };
    use mongodb::Client;
    use tower::ServiceExt;

    use crate::auth::TokenService;

    async fn test_state() -> AppState {
        // The driver connects lazily, so no server is needed for tests that
        // never touch a collection.
        let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        AppState::new(client.database("fablya_test"), TokenService::new("test-secret"))
    }

    async fn whoami(AuthenticatedUser(claims): AuthenticatedUser) -> Json<Claims> {
        Json(claims)
    }

    fn app(state: AppState) -> Router {
        Router::new().route("/whoami", get(whoami)).with_state(state)
    }

    #[test]
    fn absent_user_or_role_fails_the_gate() {
        assert!(matches!(stored_role(None), Err(ApiError::Forbidden)));

        let roleless: crate::models::User =
            mongodb::bson::from_document(mongodb::bson::doc! { "email": "a@x.com" }).unwrap();
        assert!(matches!(stored_role(Some(roleless)), Err(ApiError::Forbidden)));

        let member: crate::models::User = mongodb::bson::from_document(
            mongodb::bson::doc! { "email": "a@x.com", "role": "member" },
        )
        .unwrap();
        assert_eq!(stored_role(Some(member)).unwrap(), UserRole::Member);
    }

    #[tokio::test]
    async fn missing_authorization_header_is_unauthorized() {
        let app = app(test_state().await);

        let response = app
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_forbidden() {
        let app = app(test_state().await);

        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn wrongly_signed_token_is_forbidden() {
        let app = app(test_state().await);

        let token = TokenService::new("other-secret")
            .sign(&Claims::for_email("a@x.com"))
            .unwrap();
        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn valid_token_reaches_the_handler_with_its_claims() {
        let state = test_state().await;
        let token = state.tokens.sign(&Claims::for_email("a@x.com")).unwrap();
        let app = app(state);

        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let claims: Claims = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(claims, Claims::for_email("a@x.com"));
    }
}
