//! Post handlers.

use actix_web::{HttpResponse, web};

use folio_shared::dto::{PageQuery, PostRequest, PostResponse, SearchQuery};

use super::{convert, requester};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .service
        .list_published(query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(convert::page(page, convert::post)))
}

/// GET /api/posts/search?q=
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let page = state
        .service
        .search(&query.q, query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(convert::page(page, convert::post)))
}

/// GET /api/posts/{slug}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let requester = match identity.0 {
        Some(identity) => Some(requester(&state, &identity).await?),
        None => None,
    };

    let detail = state
        .service
        .post_detail(&slug, requester.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(convert::post_detail(detail)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let input = convert::post_input(body.into_inner())?;

    let post = state.service.create_post(&requester, input).await?;
    Ok(HttpResponse::Created().json(convert::post(post)))
}

/// PUT /api/posts/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let input = convert::post_input(body.into_inner())?;

    let post = state.service.update_post(&requester, &slug, input).await?;
    Ok(HttpResponse::Ok().json(convert::post(post)))
}

/// DELETE /api/posts/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    state.service.delete_post(&requester, &slug).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/dashboard
pub async fn dashboard(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    let posts: Vec<PostResponse> = state
        .service
        .dashboard(&requester)
        .await?
        .into_iter()
        .map(convert::post)
        .collect();
    Ok(HttpResponse::Ok().json(posts))
}
