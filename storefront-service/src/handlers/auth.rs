//! Customer identity gate.
//!
//! Quick-auth merges login and signup into one call: the caller does not
//! need to know in advance whether the account exists.

use axum::{extract::State, http::StatusCode, Json};
use mongodb::bson::DateTime;
use site_core::error::AppError;
use site_core::utils::ValidatedJson;
use uuid::Uuid;

use crate::{
    dtos::auth::{
        AdminLoginRequest, AdminLoginResponse, CheckEmailRequest, CheckEmailResponse,
        QuickAuthRequest, QuickAuthResponse,
    },
    models::Customer,
    services::jwt::Role,
    utils::{
        normalize_email,
        password::{hash_password, password_strength, verify_password},
    },
    AppState,
};

use super::field_validation_error;

/// Check whether an account exists for an email.
///
/// Response shape is constant either way; nothing beyond existence leaks.
pub async fn check_email(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CheckEmailRequest>,
) -> Result<Json<CheckEmailResponse>, AppError> {
    let email = normalize_email(&req.email);
    let exists = state
        .repository
        .find_customer_by_email(&email)
        .await?
        .is_some();

    Ok(Json(CheckEmailResponse { exists }))
}

/// Authenticate an existing customer or create a new one.
pub async fn quick_auth(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<QuickAuthRequest>,
) -> Result<(StatusCode, Json<QuickAuthResponse>), AppError> {
    let email = normalize_email(&req.email);

    if let Some(customer) = state.repository.find_customer_by_email(&email).await? {
        // Login path. Profile fields on the request are ignored.
        verify_password(&customer.password_hash, &req.password)
            .map_err(|_| AppError::InvalidCredentials)?;

        let token = state
            .jwt
            .issue(customer.id, &customer.email, Role::Customer)?;

        tracing::info!(customer_id = %customer.id, "Customer logged in via quick-auth");

        return Ok((
            StatusCode::OK,
            Json(QuickAuthResponse {
                token,
                customer: customer.into(),
                created: false,
            }),
        ));
    }

    // Signup path: strength policy applies only when the credential is
    // first created.
    password_strength(&req.password).map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("password", e);
        AppError::ValidationError(errors)
    })?;

    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| field_validation_error("name", "Name is required for new accounts"))?
        .to_string();

    let now = DateTime::now();
    let customer = Customer {
        id: Uuid::new_v4(),
        email,
        password_hash: hash_password(&req.password)?,
        name,
        phone: req.phone,
        company: req.company,
        created_at: now,
        updated_at: now,
    };

    state.repository.create_customer(customer.clone()).await?;

    let token = state
        .jwt
        .issue(customer.id, &customer.email, Role::Customer)?;

    tracing::info!(customer_id = %customer.id, "Customer created via quick-auth");

    Ok((
        StatusCode::CREATED,
        Json(QuickAuthResponse {
            token,
            customer: customer.into(),
            created: true,
        }),
    ))
}

/// Admin dashboard login. Issues a token with the admin role; admin and
/// customer sessions never share a token.
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    let email = normalize_email(&req.email);

    let admin = state
        .repository
        .find_admin_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    verify_password(&admin.password_hash, &req.password)
        .map_err(|_| AppError::InvalidCredentials)?;

    let token = state.jwt.issue(admin.id, &admin.email, Role::Admin)?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(AdminLoginResponse {
        token,
        admin: admin.into(),
    }))
}
