//! Category and tag handlers.

use actix_web::{HttpResponse, web};

use folio_core::service::CategoryInput;
use folio_shared::dto::{
    CategoryPostsResponse, CategoryRequest, CategoryResponse, PageQuery, TagPostsResponse,
    TagRequest, TagResponse,
};

use super::{convert, requester};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .service
        .list_categories()
        .await?
        .into_iter()
        .map(convert::category)
        .collect();
    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/categories/{slug}/posts
pub async fn category_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (category, posts) = state
        .service
        .posts_in_category(&slug, query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(CategoryPostsResponse {
        category: convert::category(category),
        posts: convert::page(posts, convert::post),
    }))
}

/// POST /api/categories
pub async fn create_category(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let req = body.into_inner();

    let category = state
        .service
        .create_category(
            &requester,
            CategoryInput {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(convert::category(category)))
}

/// PUT /api/categories/{slug}
pub async fn update_category(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let req = body.into_inner();

    let category = state
        .service
        .update_category(
            &requester,
            &slug,
            CategoryInput {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(convert::category(category)))
}

/// DELETE /api/categories/{slug}
pub async fn delete_category(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    state.service.delete_category(&requester, &slug).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/tags
pub async fn list_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags: Vec<TagResponse> = state
        .service
        .list_tags()
        .await?
        .into_iter()
        .map(convert::tag)
        .collect();
    Ok(HttpResponse::Ok().json(tags))
}

/// GET /api/tags/{slug}/posts
pub async fn tag_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (tag, posts) = state
        .service
        .posts_with_tag(&slug, query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(TagPostsResponse {
        tag: convert::tag(tag),
        posts: convert::page(posts, convert::post),
    }))
}

/// POST /api/tags
pub async fn create_tag(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    let tag = state.service.create_tag(&requester, &body.name).await?;
    Ok(HttpResponse::Created().json(convert::tag(tag)))
}

/// PUT /api/tags/{slug}
pub async fn update_tag(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    let tag = state
        .service
        .update_tag(&requester, &slug, &body.name)
        .await?;
    Ok(HttpResponse::Ok().json(convert::tag(tag)))
}

/// DELETE /api/tags/{slug}
pub async fn delete_tag(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    state.service.delete_tag(&requester, &slug).await?;
    Ok(HttpResponse::NoContent().finish())
}
