//! Domain to wire conversions, and parsing of string ids and enums from
//! request bodies.

use uuid::Uuid;

use folio_core::domain::{Category, Comment, Page, Post, PostStatus, Profile, Role, Tag, User};
use folio_core::service::{PostDetail, PostInput};
use folio_shared::PageResponse;
use folio_shared::dto::{
    CategoryResponse, CommentResponse, PostDetailResponse, PostRequest, PostResponse,
    TagResponse, UserResponse,
};

use crate::middleware::error::{AppError, AppResult};

pub fn parse_id(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("{field} is not a valid id")))
}

pub fn post_input(req: PostRequest) -> AppResult<PostInput> {
    let status: PostStatus = req.status.parse()?;
    let category_id = req
        .category_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| parse_id(&id, "category_id"))
        .transpose()?;
    let tag_ids = req
        .tag_ids
        .iter()
        .map(|id| parse_id(id, "tag_ids"))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(PostInput {
        title: req.title,
        content: req.content,
        featured_image: req.featured_image,
        status,
        category_id,
        tag_ids,
    })
}

pub fn page<T, R>(page: Page<T>, f: impl FnMut(T) -> R) -> PageResponse<R> {
    let total_pages = page.total_pages();
    let page = page.map(f);
    PageResponse {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages,
    }
}

/// `role` is the effective role, which may differ from the stored one.
pub fn user(user: User, profile: Profile, role: Role) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        username: user.username,
        email: user.email,
        role: role.to_string(),
        is_staff: user.is_staff,
        bio: profile.bio,
        avatar: profile.avatar,
        website: profile.website,
        created_at: user.created_at.to_rfc3339(),
    }
}

pub fn post(post: Post) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        author_id: post.author_id.to_string(),
        title: post.title,
        slug: post.slug,
        content: post.content,
        featured_image: post.featured_image,
        status: post.status.to_string(),
        category_id: post.category_id.map(|id| id.to_string()),
        tag_ids: post.tag_ids.iter().map(Uuid::to_string).collect(),
        created_at: post.created_at.to_rfc3339(),
        updated_at: post.updated_at.to_rfc3339(),
    }
}

pub fn post_detail(detail: PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: post(detail.post),
        comments: detail.comments.into_iter().map(comment).collect(),
    }
}

pub fn comment(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id.to_string(),
        post_id: comment.post_id.to_string(),
        user_id: comment.user_id.to_string(),
        content: comment.content,
        is_approved: comment.is_approved,
        created_at: comment.created_at.to_rfc3339(),
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id.to_string(),
        name: category.name,
        slug: category.slug,
        description: category.description,
        created_at: category.created_at.to_rfc3339(),
    }
}

pub fn tag(tag: Tag) -> TagResponse {
    TagResponse {
        id: tag.id.to_string(),
        name: tag.name,
        slug: tag.slug,
        created_at: tag.created_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: &str) -> PostRequest {
        PostRequest {
            title: "T".into(),
            content: "C".into(),
            featured_image: None,
            status: status.into(),
            category_id: Some(String::new()),
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn test_post_input_parses_status_and_blank_category() {
        let input = post_input(request("published")).unwrap();
        assert_eq!(input.status, PostStatus::Published);
        assert!(input.category_id.is_none());
    }

    #[test]
    fn test_unknown_status_is_a_validation_error() {
        assert!(matches!(
            post_input(request("archived")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_tag_id_is_rejected() {
        let mut req = request("draft");
        req.tag_ids = vec!["nope".into()];
        assert!(matches!(post_input(req), Err(AppError::BadRequest(_))));
    }
}
