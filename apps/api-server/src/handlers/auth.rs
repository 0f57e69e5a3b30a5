//! Account handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use folio_core::DomainError;
use folio_core::domain::Role;
use folio_core::ports::{AuthError, PasswordService, TokenService};
use folio_core::service::{NewAccount, ProfileChanges};
use folio_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UpdateProfileRequest};

use super::{convert, requester};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

fn auth_response(token: String, expires_in: i64) -> AuthResponse {
    AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: expires_in.max(0) as u64,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    let role: Role = req.role.trim().parse()?;

    let password_hash = password_service.hash(&req.password)?;
    let (user, _) = state
        .service
        .register(NewAccount {
            username: req.username,
            email: req.email,
            password_hash,
            role,
        })
        .await?;

    let token = token_service.generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Created().json(auth_response(token, token_service.expiration_seconds())))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = match state.service.find_user_by_username(&req.username).await {
        Ok(user) => user,
        Err(DomainError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
        Err(e) => return Err(e.into()),
    };

    if !password_service.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %user.username, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = token_service.generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Ok().json(auth_response(token, token_service.expiration_seconds())))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let (user, profile) = state.service.profile(&requester).await?;

    Ok(HttpResponse::Ok().json(convert::user(user, profile, requester.role)))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let req = body.into_inner();

    let profile = state
        .service
        .update_profile(
            &requester,
            ProfileChanges {
                bio: req.bio,
                avatar: req.avatar,
                website: req.website,
            },
        )
        .await?;
    let (user, _) = state.service.profile(&requester).await?;

    Ok(HttpResponse::Ok().json(convert::user(user, profile, requester.role)))
}
