use crate::domain::{Post, PostStatus};

use super::Requester;

/// Decide whether `requester` may read `post`.
///
/// Published posts are public. Drafts are visible only to their author and
/// to staff; anonymous requesters never see drafts.
pub fn can_view(post: &Post, requester: Option<&Requester>) -> bool {
    match post.status {
        PostStatus::Published => true,
        PostStatus::Draft => requester.is_some_and(|r| r.is(post.author_id) || r.is_staff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use uuid::Uuid;

    fn requester(role: Role, is_staff: bool) -> Requester {
        Requester {
            user_id: Uuid::new_v4(),
            username: "someone".into(),
            is_staff,
            role,
        }
    }

    fn post_by(author: &Requester, status: PostStatus) -> Post {
        Post::new(
            author.user_id,
            "Title".into(),
            "title".into(),
            "Body".into(),
            status,
        )
    }

    #[test]
    fn test_published_visible_to_everyone() {
        let author = requester(Role::Author, false);
        let post = post_by(&author, PostStatus::Published);

        assert!(can_view(&post, None));
        assert!(can_view(&post, Some(&requester(Role::Reader, false))));
        assert!(can_view(&post, Some(&requester(Role::Author, false))));
    }

    #[test]
    fn test_draft_visible_to_author_and_staff_only() {
        let author = requester(Role::Author, false);
        let post = post_by(&author, PostStatus::Draft);

        assert!(can_view(&post, Some(&author)));
        assert!(can_view(&post, Some(&requester(Role::Reader, true))));
        assert!(!can_view(&post, None));
        assert!(!can_view(&post, Some(&requester(Role::Reader, false))));
        assert!(!can_view(&post, Some(&requester(Role::Author, false))));
    }

    #[test]
    fn test_admin_role_without_staff_flag_cannot_see_drafts() {
        let author = requester(Role::Author, false);
        let post = post_by(&author, PostStatus::Draft);
        assert!(!can_view(&post, Some(&requester(Role::Admin, false))));
    }
}
