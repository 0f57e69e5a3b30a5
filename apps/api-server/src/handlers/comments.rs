//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_shared::dto::{CommentRequest, ModerateCommentsRequest, ModerateCommentsResponse};

use super::{convert, requester};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{slug}/comments
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    let comment = state
        .service
        .add_comment(&requester, &slug, &body.content)
        .await?;
    Ok(HttpResponse::Created().json(convert::comment(comment)))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;

    state
        .service
        .delete_comment(&requester, id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/comments/moderate
pub async fn moderate(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ModerateCommentsRequest>,
) -> AppResult<HttpResponse> {
    let requester = requester(&state, &identity).await?;
    let ids = body
        .comment_ids
        .iter()
        .map(|id| convert::parse_id(id, "comment_ids"))
        .collect::<AppResult<Vec<_>>>()?;

    let updated = state
        .service
        .moderate_comments(&requester, &ids, body.approved)
        .await?;
    Ok(HttpResponse::Ok().json(ModerateCommentsResponse { updated }))
}
