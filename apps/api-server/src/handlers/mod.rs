//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod convert;
mod health;
mod posts;
mod taxonomy;

use actix_web::web;

use folio_core::{DomainError, Requester};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/profile", web::put().to(auth::update_profile)),
            )
            .route("/dashboard", web::get().to(posts::dashboard))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    // Registered before `/{slug}` so it is not taken for a slug
                    .route("/search", web::get().to(posts::search))
                    .route("/{slug}", web::get().to(posts::detail))
                    .route("/{slug}", web::put().to(posts::update))
                    .route("/{slug}", web::delete().to(posts::delete))
                    .route("/{slug}/comments", web::post().to(comments::add)),
            )
            .service(
                web::scope("/comments")
                    .route("/moderate", web::post().to(comments::moderate))
                    .route("/{id}", web::delete().to(comments::delete)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(taxonomy::list_categories))
                    .route("", web::post().to(taxonomy::create_category))
                    .route("/{slug}", web::put().to(taxonomy::update_category))
                    .route("/{slug}", web::delete().to(taxonomy::delete_category))
                    .route("/{slug}/posts", web::get().to(taxonomy::category_posts)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(taxonomy::list_tags))
                    .route("", web::post().to(taxonomy::create_tag))
                    .route("/{slug}", web::put().to(taxonomy::update_tag))
                    .route("/{slug}", web::delete().to(taxonomy::delete_tag))
                    .route("/{slug}/posts", web::get().to(taxonomy::tag_posts)),
            ),
    );
}

/// Resolve the token's user into a principal. A token for an account that
/// no longer exists is treated as unauthenticated.
async fn requester(state: &AppState, identity: &Identity) -> AppResult<Requester> {
    match state.service.requester(identity.user_id).await {
        Ok(requester) => Ok(requester),
        Err(DomainError::NotFound { .. }) => {
            tracing::debug!(
                user_id = %identity.user_id,
                username = %identity.username,
                "Token for a deleted account"
            );
            Err(AppError::Unauthorized(
                "The account for this token no longer exists.".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
