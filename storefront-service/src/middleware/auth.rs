//! Bearer-token extractors for the two principal kinds.
//!
//! A request authenticates as exactly one principal: a customer token on an
//! admin route (or vice versa) is rejected, so a client can never act under
//! both identities at once.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};
use site_core::error::AppError;
use uuid::Uuid;

use crate::services::jwt::{Claims, JwtService, Role};

/// Authenticated customer making the request.
#[derive(Debug, Clone)]
pub struct CustomerContext {
    pub customer_id: Uuid,
    pub email: String,
}

/// Authenticated admin operator.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: Uuid,
    pub email: String,
}

fn bearer_claims<S>(parts: &Parts, state: &S) -> Result<Claims, AppError>
where
    JwtService: FromRef<S>,
{
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Missing bearer token")))?;

    let jwt = JwtService::from_ref(state);
    let claims = jwt.verify(token)?;
    Ok(claims)
}

fn subject_id(claims: &Claims) -> Result<Uuid, AppError> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthError(anyhow::anyhow!("Malformed token subject")))
}

#[async_trait]
impl<S> FromRequestParts<S> for CustomerContext
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;

        if claims.role != Role::Customer {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Customer session required"
            )));
        }

        let customer_id = subject_id(&claims)?;

        let span = tracing::Span::current();
        span.record("customer_id", claims.sub.as_str());

        Ok(CustomerContext {
            customer_id,
            email: claims.email,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;

        if claims.role != Role::Admin {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Admin session required"
            )));
        }

        let admin_id = subject_id(&claims)?;

        Ok(AdminContext {
            admin_id,
            email: claims.email,
        })
    }
}
