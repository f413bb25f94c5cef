use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{cookies, jwt};
use crate::database::models::Role;
use crate::error::ApiError;
use crate::services::{AccessService, SessionService, UserService};

/// Resolved caller identity, attached to the request exactly once by the
/// authentication middleware and never visible before it completes.
///
/// Tagged union per identity kind: a registered principal backed by a user
/// row, or an ephemeral principal synthesized from a temporary access grant
/// with no account row behind it.
#[derive(Clone, Debug)]
pub enum Identity {
    Registered {
        id: Uuid,
        email: String,
        role: Role,
        agency_id: Uuid,
    },
    Ephemeral {
        access_id: Uuid,
        label: String,
        agency_id: Uuid,
    },
}

impl Identity {
    /// Tenant scope for every downstream query.
    pub fn agency_id(&self) -> Uuid {
        match self {
            Identity::Registered { agency_id, .. } => *agency_id,
            Identity::Ephemeral { agency_id, .. } => *agency_id,
        }
    }

    /// Ephemeral principals are always member-equivalent.
    pub fn role(&self) -> Role {
        match self {
            Identity::Registered { role, .. } => *role,
            Identity::Ephemeral { .. } => Role::Member,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Identity::Ephemeral { .. })
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::Registered { id, .. } => Some(*id),
            Identity::Ephemeral { .. } => None,
        }
    }
}

/// Demo path: self-contained token, no session store consultation. The
/// grant's active flag is the only revocation lever. Every failure is
/// swallowed so a stale demo cookie never blocks a real login.
async fn resolve_demo_identity(headers: &HeaderMap) -> Option<Identity> {
    let raw = cookies::get_cookie(headers, cookies::DEMO_COOKIE)?;
    let claims = jwt::verify_demo_token(&raw)?;

    let service = AccessService::new().await.ok()?;
    let grant = service.find_by_id(claims.access_id).await.ok()??;
    if !grant.is_valid_at(Utc::now()) {
        return None;
    }

    Some(Identity::Ephemeral {
        access_id: grant.id,
        label: grant.label,
        agency_id: grant.agency_id,
    })
}

/// Primary path, evaluated in strict order: cookie present, JWT valid,
/// session row unexpired, user row present and active. JWT expiry and
/// session expiry are independent AND-ed validity conditions; deleting the
/// session revokes the token before its JWT expiry.
async fn resolve_registered_identity(headers: &HeaderMap) -> Result<Identity, ApiError> {
    let token = cookies::get_cookie(headers, cookies::AUTH_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Authentication token missing"))?;

    let claims = jwt::verify_user_token(&token)
        .ok_or_else(|| ApiError::unauthorized("Authentication token invalid"))?;

    let sessions = SessionService::new().await?;
    sessions
        .find_valid(&token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Session expired"))?;

    let users = UserService::new().await?;
    let user = users
        .find_by_id(claims.user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::unauthorized("Account inactive or not found"))?;

    Ok(Identity::Registered {
        id: user.id,
        role: user.role(),
        email: user.email,
        agency_id: user.agency_id,
    })
}

/// Per-request authentication gate. Rejects with 401 on failure and never
/// partially populates the request extensions.
pub async fn authenticate(mut request: Request, next: Next) -> Result<Response, ApiError> {
    if let Some(identity) = resolve_demo_identity(request.headers()).await {
        request.extensions_mut().insert(identity);
        return Ok(next.run(request).await);
    }

    let identity = resolve_registered_identity(request.headers()).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Variant for routes that function with or without identity: on any
/// failure the request proceeds anonymously, never with an error.
pub async fn authenticate_optional(mut request: Request, next: Next) -> Response {
    if let Ok(identity) = resolve_registered_identity(request.headers()).await {
        request.extensions_mut().insert(identity);
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> Identity {
        Identity::Registered {
            id: Uuid::new_v4(),
            email: "ana@x.com".to_string(),
            role: Role::Owner,
            agency_id: Uuid::new_v4(),
        }
    }

    fn ephemeral() -> Identity {
        Identity::Ephemeral {
            access_id: Uuid::new_v4(),
            label: "client preview".to_string(),
            agency_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn ephemeral_identity_is_member_equivalent() {
        let identity = ephemeral();
        assert!(identity.is_ephemeral());
        assert_eq!(identity.role(), Role::Member);
        assert_eq!(identity.user_id(), None);
    }

    #[test]
    fn registered_identity_keeps_its_role() {
        let identity = registered();
        assert!(!identity.is_ephemeral());
        assert_eq!(identity.role(), Role::Owner);
        assert!(identity.user_id().is_some());
    }

    mod optional_gate {
        use super::*;
        use axum::{
            body::Body,
            http::{Request, StatusCode},
            middleware::from_fn,
            routing::get,
            Extension, Router,
        };
        use tower::ServiceExt;

        fn app() -> Router {
            Router::new()
                .route(
                    "/",
                    get(|identity: Option<Extension<Identity>>| async move {
                        if identity.is_some() {
                            "identified"
                        } else {
                            "anonymous"
                        }
                    }),
                )
                .layer(from_fn(authenticate_optional))
        }

        async fn body_text(response: axum::response::Response) -> String {
            let bytes = axum::body::to_bytes(response.into_body(), 1024)
                .await
                .expect("body");
            String::from_utf8(bytes.to_vec()).expect("utf8")
        }

        #[tokio::test]
        async fn missing_cookie_proceeds_anonymously() {
            let response = app()
                .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
                .await
                .expect("response");

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, "anonymous");
        }

        #[tokio::test]
        async fn garbage_cookie_proceeds_anonymously() {
            let request = Request::builder()
                .uri("/")
                .header("cookie", "auth_token=not.a.jwt")
                .body(Body::empty())
                .expect("request");

            let response = app().oneshot(request).await.expect("response");

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, "anonymous");
        }
    }
}
